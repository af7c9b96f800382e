//! `[serve]` section configuration.
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"   # use "0.0.0.0" for LAN access
//! port = 3000               # HTTP port, next free port is used when taken
//! ws_port = 35729           # live-reload WebSocket port
//! cors = true               # Access-Control-Allow-Origin: *
//! ```

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    pub interface: IpAddr,
    pub port: u16,
    pub ws_port: u16,
    pub cors: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 3000,
            ws_port: 35729,
            cors: true,
        }
    }
}
