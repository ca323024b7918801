//! XML reply to a successful `Publish`.

use serde::Serialize;

use super::ProtocolId;

/// XML namespace declared on every reply.
pub const SNS_XML_NAMESPACE: &str = "http://sns.amazonaws.com/doc/2010-03-31/";

/// `PublishResponse` document.
///
/// The request identifier is written under
/// `ResponseMetadata/ResponseMetadata` for clients of the original relay
/// and under `ResponseMetadata/RequestId` for AWS SDKs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename = "PublishResponse")]
pub struct PublishResponse {
    #[serde(rename = "@xmlns")]
    namespace: &'static str,
    /// Result block carrying the message identifier.
    #[serde(rename = "PublishResult")]
    pub result: PublishResult,
    /// Metadata block carrying the request identifier.
    #[serde(rename = "ResponseMetadata")]
    pub metadata: ResponseMetadata,
}

/// `PublishResult` element.
#[derive(Debug, Clone, Serialize)]
pub struct PublishResult {
    /// Identifier assigned to the published message.
    #[serde(rename = "MessageId")]
    pub message_id: ProtocolId,
}

/// `ResponseMetadata` element.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseMetadata {
    /// Request identifier.
    #[serde(rename = "ResponseMetadata")]
    pub response_metadata: ProtocolId,
    /// Same request identifier, under the name SDKs look for.
    #[serde(rename = "RequestId")]
    pub request_id: ProtocolId,
}

impl PublishResponse {
    /// Builds a reply for `message_id`, identified by `request_id`.
    #[must_use]
    pub const fn new(message_id: ProtocolId, request_id: ProtocolId) -> Self {
        Self {
            namespace: SNS_XML_NAMESPACE,
            result: PublishResult { message_id },
            metadata: ResponseMetadata {
                response_metadata: request_id,
                request_id,
            },
        }
    }

    /// Returns the message identifier.
    #[must_use]
    pub const fn message_id(&self) -> ProtocolId {
        self.result.message_id
    }

    /// Returns the request identifier.
    #[must_use]
    pub const fn request_id(&self) -> ProtocolId {
        self.metadata.request_id
    }

    /// Serializes the reply as XML.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error message if encoding fails.
    pub fn to_xml(&self) -> Result<String, String> {
        quick_xml::se::to_string(self).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn xml_shape() {
        let message_id = ProtocolId::generate();
        let request_id = ProtocolId::generate();
        let Ok(xml) = PublishResponse::new(message_id, request_id).to_xml() else {
            panic!("serializable reply");
        };
        let expected = format!(
            "<PublishResponse xmlns=\"{SNS_XML_NAMESPACE}\">\
             <PublishResult><MessageId>{message_id}</MessageId></PublishResult>\
             <ResponseMetadata><ResponseMetadata>{request_id}</ResponseMetadata>\
             <RequestId>{request_id}</RequestId></ResponseMetadata>\
             </PublishResponse>"
        );
        assert_eq!(xml, expected);
    }

    #[test]
    fn accessors_return_ids() {
        let message_id = ProtocolId::generate();
        let request_id = ProtocolId::generate();
        let reply = PublishResponse::new(message_id, request_id);
        assert_eq!(reply.message_id(), message_id);
        assert_eq!(reply.request_id(), request_id);
        assert_ne!(reply.message_id(), reply.request_id());
    }
}
