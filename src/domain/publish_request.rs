//! Decoding of the form-encoded `Publish` call.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

use crate::error::RelayError;

/// The only action this endpoint implements.
pub const PUBLISH_ACTION: &str = "Publish";

/// A decoded `Action=Publish` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    /// Topic the message is published to.
    pub topic_arn: String,
    /// Opaque payload.
    pub message: String,
    /// Optional subject, forwarded in the notification envelope.
    pub subject: Option<String>,
}

impl PublishRequest {
    /// Decodes a form-encoded request body.
    ///
    /// `Action` is checked first, then `TopicArn` and `Message`. When a key
    /// repeats, its first value wins. Escapes that decode to invalid UTF-8
    /// are rejected rather than replaced, so payloads reach raw subscribers
    /// byte for byte.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MalformedRequest`] if the body is not valid
    /// form encoding or a required field is missing, and
    /// [`RelayError::UnsupportedAction`] if `Action` is not `Publish`.
    pub fn parse(body: &[u8]) -> Result<Self, RelayError> {
        let raw = std::str::from_utf8(body)
            .map_err(|_| RelayError::MalformedRequest("body is not valid UTF-8".to_string()))?;
        if let Some(position) = invalid_escape_at(raw) {
            return Err(RelayError::MalformedRequest(format!(
                "invalid percent-encoding at byte {position}"
            )));
        }
        let pairs = decode_pairs(raw)?;

        let action = required(&pairs, "Action")?;
        if action != PUBLISH_ACTION {
            return Err(RelayError::UnsupportedAction(action.to_string()));
        }

        Ok(Self {
            topic_arn: required(&pairs, "TopicArn")?.to_string(),
            message: required(&pairs, "Message")?.to_string(),
            subject: first_value(&pairs, "Subject").map(str::to_string),
        })
    }
}

fn decode_pairs(raw: &str) -> Result<Vec<(String, String)>, RelayError> {
    raw.split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            Ok::<_, RelayError>((decode_component(key)?, decode_component(value)?))
        })
        .collect()
}

fn decode_component(component: &str) -> Result<String, RelayError> {
    let spaced = component.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| {
            RelayError::MalformedRequest(format!(
                "percent-encoded bytes in {component:?} are not valid UTF-8"
            ))
        })
}

fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn required<'a>(pairs: &'a [(String, String)], key: &str) -> Result<&'a str, RelayError> {
    first_value(pairs, key)
        .ok_or_else(|| RelayError::MalformedRequest(format!("missing required field {key}")))
}

/// Returns the offset of the first `%` not followed by two hex digits.
fn invalid_escape_at(raw: &str) -> Option<usize> {
    let bytes = raw.as_bytes();
    bytes.iter().enumerate().find_map(|(i, &b)| {
        if b != b'%' {
            return None;
        }
        let valid = matches!(
            (bytes.get(i + 1), bytes.get(i + 2)),
            (Some(hi), Some(lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()
        );
        (!valid).then_some(i)
    })
}
