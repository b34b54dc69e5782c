//! Gateway to provider messages (application block, 5000+).

use serde::{Deserialize, Serialize};

use super::common::protocol_kinds;
use super::ProtocolKind;
use crate::registry::CodeFamily;

/// Request forwarded by a gateway to a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayToProviderRequest {
    pub message: String,
}

/// Provider reply routed back through the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayToProviderResponse {
    pub message: String,
}

protocol_kinds! {
    CodeFamily::Application;
    GatewayToProviderRequest => "GatewayToProviderRequest",
    GatewayToProviderResponse => "GatewayToProviderResponse",
}
