//! Frame validation and parsing.

use super::types::{InboundMessage, OutboundMessage};

/// Parses a raw text frame, rejecting oversized, empty or malformed input.
///
/// The error side is the `error` event to send back.
pub fn parse_inbound(raw: &str, max_bytes: usize) -> Result<InboundMessage, OutboundMessage> {
    if raw.len() > max_bytes {
        return Err(OutboundMessage::invalid_message(format!(
            "Message exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(OutboundMessage::invalid_message("Empty message"));
    }

    serde_json::from_str(raw)
        .map_err(|e| OutboundMessage::invalid_message(format!("Failed to parse message: {e}")))
}
