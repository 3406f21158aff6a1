//! Control channel commands posted by the page.

use serde_json::Value;

use crate::host::HostControl;

/// Whether `data` is the skip-waiting command.
///
/// Accepts `{"type": token}` or the bare string token.
pub fn is_skip_waiting(data: &Value, token: &str) -> bool {
    match data {
        Value::String(command) => command == token,
        Value::Object(fields) => fields.get("type").and_then(Value::as_str) == Some(token),
        _ => false,
    }
}

/// Handle one message. Returns whether it was acted on; nothing is sent back
/// to the page either way.
pub fn handle_message(data: &Value, token: &str, host: &dyn HostControl) -> bool {
    if is_skip_waiting(data, token) {
        tracing::info!("skip waiting requested by client");
        host.skip_waiting();
        return true;
    }

    tracing::debug!("ignoring unrecognized control message");
    false
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct CountingHost {
        skips: AtomicUsize,
    }

    impl HostControl for CountingHost {
        fn skip_waiting(&self) {
            self.skips.fetch_add(1, Ordering::SeqCst);
        }

        fn clients_claim(&self) {}
    }

    #[test]
    fn test_recognized_commands() {
        assert!(is_skip_waiting(&json!({"type": "SKIP_WAITING"}), "SKIP_WAITING"));
        assert!(is_skip_waiting(&json!("SKIP_WAITING"), "SKIP_WAITING"));
    }

    #[test]
    fn test_other_payloads_ignored() {
        for data in [
            json!(null),
            json!(""),
            json!({}),
            json!({"type": "skip_waiting"}),
            json!({"type": "CLAIM"}),
            json!({"kind": "SKIP_WAITING"}),
            json!(["SKIP_WAITING"]),
            json!(42),
        ] {
            assert!(!is_skip_waiting(&data, "SKIP_WAITING"), "{data}");
        }
    }

    #[test]
    fn test_handle_message_triggers_host() {
        let host = CountingHost::default();
        assert!(handle_message(&json!({"type": "SKIP_WAITING"}), "SKIP_WAITING", &host));
        assert!(!handle_message(&json!({"type": "PING"}), "SKIP_WAITING", &host));
        assert_eq!(host.skips.load(Ordering::SeqCst), 1);
    }
}
