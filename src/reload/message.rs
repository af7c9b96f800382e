//! Live-reload message protocol.
//!
//! JSON objects tagged by `type`, sent from the dev server to the browser:
//!
//! - `reload`: full page reload (markup, scripts)
//! - `css`: re-fetch one stylesheet without reloading
//! - `error` / `clear_error`: show or hide the error overlay
//! - `connected`: handshake greeting

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HotReloadMessage {
    Reload {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    Css {
        /// URL path of the stylesheet, e.g. `/css/main.min.css`
        target: String,
    },

    Connected {
        version: String,
    },

    Error {
        /// Source file the error points at
        path: String,
        error: String,
    },

    #[serde(rename = "clear_error")]
    ClearError,
}

impl HotReloadMessage {
    pub fn reload(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    pub fn css(target: impl Into<String>) -> Self {
        Self::Css {
            target: target.into(),
        }
    }

    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn error(path: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Error {
            path: path.into(),
            error: error.into(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    #[cfg(test)]
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_message() {
        let json = HotReloadMessage::css("/css/main.min.css").to_json();
        assert_eq!(json, r#"{"type":"css","target":"/css/main.min.css"}"#);
    }

    #[test]
    fn test_reload_message() {
        let json = HotReloadMessage::reload("markup").to_json();
        assert_eq!(json, r#"{"type":"reload","reason":"markup"}"#);
        assert_eq!(
            HotReloadMessage::from_json(r#"{"type":"reload"}"#),
            Some(HotReloadMessage::Reload { reason: None })
        );
    }

    #[test]
    fn test_error_messages() {
        let json = HotReloadMessage::error("scss/main.scss", "expected \";\"").to_json();
        assert!(json.contains(r#""type":"error""#));
        assert!(json.contains(r#""path":"scss/main.scss""#));

        assert_eq!(HotReloadMessage::ClearError.to_json(), r#"{"type":"clear_error"}"#);
    }

    #[test]
    fn test_connected_carries_version() {
        match HotReloadMessage::connected() {
            HotReloadMessage::Connected { version } => assert!(!version.is_empty()),
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
