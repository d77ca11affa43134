//! IPC between content documents and the host
//!
//! Content posts JSON messages through `window.ipc.postMessage`; the host
//! answers by evaluating `window.laf._receive(name, payload)` in the target
//! document.

pub mod commands;

use laf_shell::ToolAction;
use serde::Deserialize;
use serde_json::Value;

/// IPC message from content to the host
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum IpcMessage {
    /// Close the sending window
    #[serde(alias = "exit_client")]
    Close,
    Relaunch,
    ClearCache,
    OpenLink {
        url: String,
    },
    GetVersion,

    // Presence
    PresenceBegin,
    PresenceUpdate {
        #[serde(default)]
        snapshot: Option<Value>,
    },

    // Settings tab
    SetConfig {
        id: String,
        value: Value,
    },
    ToolAction {
        action: ToolAction,
    },

    /// Answer from the prompt window
    PromptResult {
        id: u64,
        #[serde(default)]
        value: Option<String>,
    },

    Log {
        level: String,
        message: String,
    },
}

/// Message from the host to a content document
#[derive(Debug, Clone, PartialEq)]
pub enum HostMessage {
    /// Release pointer lock
    Esc,
    /// Stop the presence interval
    PresenceStop,
    /// Reply to `get_version`
    Version(String),
}

impl HostMessage {
    pub fn name(&self) -> &'static str {
        match self {
            HostMessage::Esc => "ESC",
            HostMessage::PresenceStop => "presence-stop",
            HostMessage::Version(_) => "GET_VERSION",
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            HostMessage::Esc | HostMessage::PresenceStop => Value::Null,
            HostMessage::Version(version) => Value::String(version.clone()),
        }
    }

    /// Script that delivers this message to the content bridge
    pub fn to_script(&self) -> String {
        format!(
            "window.laf && window.laf._receive({}, {});",
            Value::String(self.name().to_string()),
            self.payload()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_commands() {
        let msg: IpcMessage = serde_json::from_str(r#"{"cmd":"close"}"#).unwrap();
        assert!(matches!(msg, IpcMessage::Close));

        let msg: IpcMessage = serde_json::from_str(r#"{"cmd":"exit_client"}"#).unwrap();
        assert!(matches!(msg, IpcMessage::Close));

        let msg: IpcMessage =
            serde_json::from_str(r#"{"cmd":"set_config","id":"unlimitedFPS","value":false}"#)
                .unwrap();
        match msg {
            IpcMessage::SetConfig { id, value } => {
                assert_eq!(id, "unlimitedFPS");
                assert_eq!(value, json!(false));
            }
            other => panic!("unexpected {:?}", other),
        }

        let msg: IpcMessage =
            serde_json::from_str(r#"{"cmd":"tool_action","action":"clearCache"}"#).unwrap();
        assert!(matches!(
            msg,
            IpcMessage::ToolAction {
                action: ToolAction::ClearCache
            }
        ));
    }

    #[test]
    fn test_decode_optional_fields() {
        let msg: IpcMessage = serde_json::from_str(r#"{"cmd":"presence_update"}"#).unwrap();
        assert!(matches!(msg, IpcMessage::PresenceUpdate { snapshot: None }));

        let msg: IpcMessage =
            serde_json::from_str(r#"{"cmd":"prompt_result","id":3,"value":null}"#).unwrap();
        assert!(matches!(msg, IpcMessage::PromptResult { id: 3, value: None }));
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(serde_json::from_str::<IpcMessage>(r#"{"cmd":"format_disk"}"#).is_err());
    }

    #[test]
    fn test_host_message_script() {
        assert_eq!(
            HostMessage::Esc.to_script(),
            r#"window.laf && window.laf._receive("ESC", null);"#
        );
        assert_eq!(
            HostMessage::Version("1.2.3".into()).to_script(),
            r#"window.laf && window.laf._receive("GET_VERSION", "1.2.3");"#
        );
    }
}
