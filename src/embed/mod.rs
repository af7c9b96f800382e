//! Embedded static resources.
//!
//! - `template` - typed placeholder substitution
//! - `serve` - dev server resources (hotreload.js)

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// URL the dev server answers with the reload client.
    pub const HOTRELOAD_URL: &str = "/__assetflow/hotreload.js";

    /// Variables for hotreload.js.
    pub struct HotreloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for HotreloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__ASSETFLOW_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Live-reload client with WebSocket port injection.
    pub const HOTRELOAD_JS: Template<HotreloadVars> =
        Template::new(include_str!("serve/hotreload.js"));

    /// `<script>` tag injected into served HTML.
    pub fn script_tag() -> String {
        format!(r#"<script src="{HOTRELOAD_URL}"></script>"#)
    }
}
