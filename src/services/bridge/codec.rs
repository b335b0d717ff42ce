//! NDJSON codec for bridge messages

use crate::error::Result;
use crate::events::{InboundMessage, OutboundMessage};

/// Encode an outbound message into NDJSON format (JSON + newline)
pub fn encode_outbound(message: &OutboundMessage) -> Result<String> {
    let mut json = serde_json::to_string(message)?;
    json.push('\n');
    Ok(json)
}

/// Decode a line of JSON into an InboundMessage
pub fn decode_inbound(line: &str) -> Result<InboundMessage> {
    let message: InboundMessage = serde_json::from_str(line.trim())?;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::bridge::{IgnoreMouseEvents, MouseForwardOptions};
    use crate::events::WindowControl;
    use crate::settings::SettingsPatch;

    #[test]
    fn test_encode_outbound_is_one_line() {
        let encoded = encode_outbound(&OutboundMessage::ToggleColor(false)).unwrap();
        assert!(encoded.ends_with('\n'));
        assert_eq!(encoded.matches('\n').count(), 1);
        assert!(encoded.contains("\"channel\":\"toggle-color\""));
        assert!(encoded.contains("\"payload\":false"));
    }

    #[test]
    fn test_decode_update_settings() {
        let message = decode_inbound(r#"{"channel":"update-settings","payload":{"opacity":0.3}}"#).unwrap();
        assert_eq!(
            message,
            InboundMessage::UpdateSettings(SettingsPatch {
                opacity: Some(0.3),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_decode_window_control_with_padding() {
        let message = decode_inbound("  {\"channel\":\"window-control\",\"payload\":\"close\"}\r\n").unwrap();
        assert_eq!(message, InboundMessage::WindowControl(WindowControl::Close));
    }

    #[test]
    fn test_decode_ignore_mouse_events_shapes() {
        let decode = |payload: &str| {
            decode_inbound(&format!(r#"{{"channel":"set-ignore-mouse-events","payload":{}}}"#, payload)).unwrap()
        };

        assert_eq!(
            decode("true"),
            InboundMessage::SetIgnoreMouseEvents(IgnoreMouseEvents { ignore: true, options: None })
        );
        assert_eq!(
            decode("[false]"),
            InboundMessage::SetIgnoreMouseEvents(IgnoreMouseEvents { ignore: false, options: None })
        );
        assert_eq!(
            decode(r#"[true,{"forward":true}]"#),
            InboundMessage::SetIgnoreMouseEvents(IgnoreMouseEvents {
                ignore: true,
                options: Some(MouseForwardOptions { forward: true }),
            })
        );
        assert_eq!(
            decode(r#"{"ignore":true,"options":{"forward":false}}"#),
            InboundMessage::SetIgnoreMouseEvents(IgnoreMouseEvents {
                ignore: true,
                options: Some(MouseForwardOptions { forward: false }),
            })
        );
    }

    #[test]
    fn test_decode_ignore_mouse_events_rejects_garbage() {
        assert!(decode_inbound(r#"{"channel":"set-ignore-mouse-events","payload":"yes"}"#).is_err());
        assert!(decode_inbound(r#"{"channel":"set-ignore-mouse-events","payload":[]}"#).is_err());
    }

    #[test]
    fn test_decode_rejects_unknown_channel() {
        assert!(decode_inbound(r#"{"channel":"reboot","payload":null}"#).is_err());
        assert!(decode_inbound("not json").is_err());
    }
}
