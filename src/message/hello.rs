//! Hello handshakes, one request/response pair per transport (codes 1000-4999).

use serde::{Deserialize, Serialize};

use super::common::protocol_kinds;
use super::ProtocolKind;
use crate::registry::CodeFamily;

/// Declare hello structs carrying a single `message` field.
macro_rules! hello_structs {
    ($($(#[$meta:meta])* $ty:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
            #[serde(default)]
            pub struct $ty {
                pub message: String,
            }
        )+
    };
}

hello_structs! {
    /// Hello over UDP.
    UdpHelloRequest,
    UdpHelloResponse,
    /// Hello over TCP.
    TcpHelloRequest,
    TcpHelloResponse,
    /// Hello over the protobuf-object transport.
    JProtobufHelloRequest,
    JProtobufHelloResponse,
    /// Hello over the JSON text transport.
    JsonHelloRequest,
    JsonHelloResponse,
}

protocol_kinds! {
    CodeFamily::Handshake;
    UdpHelloRequest => "UdpHelloRequest",
    UdpHelloResponse => "UdpHelloResponse",
    TcpHelloRequest => "TcpHelloRequest",
    TcpHelloResponse => "TcpHelloResponse",
    JProtobufHelloRequest => "JProtobufHelloRequest",
    JProtobufHelloResponse => "JProtobufHelloResponse",
    JsonHelloRequest => "JsonHelloRequest",
    JsonHelloResponse => "JsonHelloResponse",
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Protocol;

    #[test]
    fn test_request_and_response_share_body_shape() {
        let request = TcpHelloRequest {
            message: "Hello, this is the client!".to_string(),
        };
        let body = request.encode().unwrap();

        let mut response = TcpHelloResponse::default();
        Protocol::decode(&mut response, &body).unwrap();
        assert_eq!(response.message, request.message);
    }

    #[test]
    fn test_hello_family() {
        assert_eq!(UdpHelloRequest::FAMILY, CodeFamily::Handshake);
        assert_eq!(JsonHelloResponse::NAME, "JsonHelloResponse");
    }
}
