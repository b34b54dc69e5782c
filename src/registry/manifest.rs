//! Code space manifest.
//!
//! The code table is part of the wire protocol: peers must agree on what
//! every code means. A [`Manifest`] is the serializable form of a
//! registry's table, exchanged out of band (deploy checks, handshake
//! payloads, CI) and compared with [`Manifest::diff`].
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "protocols": {
//!     "100": { "name": "Message", "family": "generic" },
//!     "1200": { "name": "UdpHelloRequest", "family": "handshake" }
//!   }
//! }
//! ```
//!
//! # Example
//!
//! ```
//! use protocol_registry::standard::standard_registry;
//!
//! let registry = standard_registry().unwrap();
//! let json = registry.manifest().to_json().unwrap();
//! assert!(json.contains("GatewayToProviderRequest"));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{CodeFamily, RegistryEntry};
use crate::error::Result;

/// Version of the code table layout.
///
/// Bump when an existing code changes meaning.
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// One code in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub family: CodeFamily,
}

/// Serializable description of a code table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Protocol version string.
    pub version: String,
    /// Entries by code, ascending.
    pub protocols: BTreeMap<u16, ManifestEntry>,
}

/// A disagreement between a local and a peer manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestMismatch {
    /// Different protocol versions.
    VersionMismatch { local: String, peer: String },
    /// The peer does not know a local code.
    MissingOnPeer { code: u16, name: String },
    /// The peer knows a code this side does not.
    MissingLocally { code: u16, name: String },
    /// Both sides know the code under different kinds.
    NameMismatch {
        code: u16,
        local: String,
        peer: String,
    },
}

impl ManifestMismatch {
    /// Whether the mismatch breaks decoding.
    ///
    /// One-sided codes are version skew: packets with them are dropped as
    /// unknown. A code meaning two different things corrupts traffic.
    pub fn is_breaking(&self) -> bool {
        matches!(
            self,
            ManifestMismatch::VersionMismatch { .. } | ManifestMismatch::NameMismatch { .. }
        )
    }
}

impl Manifest {
    /// Build a manifest at the current [`PROTOCOL_VERSION`].
    pub fn from_entries(entries: impl IntoIterator<Item = RegistryEntry>) -> Self {
        let protocols = entries
            .into_iter()
            .map(|entry| {
                (
                    entry.code,
                    ManifestEntry {
                        name: entry.name.to_string(),
                        family: entry.family,
                    },
                )
            })
            .collect();

        Self {
            version: PROTOCOL_VERSION.to_string(),
            protocols,
        }
    }

    /// Get the entry for a code.
    pub fn get(&self, code: u16) -> Option<&ManifestEntry> {
        self.protocols.get(&code)
    }

    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }

    /// Serialize to a single-line JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a manifest received from a peer.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// List every disagreement with `peer`, in code order.
    pub fn diff(&self, peer: &Manifest) -> Vec<ManifestMismatch> {
        let mut mismatches = Vec::new();

        if self.version != peer.version {
            mismatches.push(ManifestMismatch::VersionMismatch {
                local: self.version.clone(),
                peer: peer.version.clone(),
            });
        }

        for (&code, local) in &self.protocols {
            match peer.protocols.get(&code) {
                None => mismatches.push(ManifestMismatch::MissingOnPeer {
                    code,
                    name: local.name.clone(),
                }),
                Some(remote) if remote.name != local.name => {
                    mismatches.push(ManifestMismatch::NameMismatch {
                        code,
                        local: local.name.clone(),
                        peer: remote.name.clone(),
                    })
                }
                Some(_) => {}
            }
        }

        for (&code, remote) in &peer.protocols {
            if !self.protocols.contains_key(&code) {
                mismatches.push(ManifestMismatch::MissingLocally {
                    code,
                    name: remote.name.clone(),
                });
            }
        }

        mismatches
    }

    /// Check whether the two sides can talk without misreading packets.
    pub fn is_compatible_with(&self, peer: &Manifest) -> bool {
        let breaking: Vec<_> = self
            .diff(peer)
            .into_iter()
            .filter(ManifestMismatch::is_breaking)
            .collect();

        for mismatch in &breaking {
            tracing::warn!("Incompatible peer manifest: {:?}", mismatch);
        }
        breaking.is_empty()
    }
}
