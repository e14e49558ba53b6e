//! Desired-check specification and its wire definition.

use serde_json::{json, Map, Value};
use std::fmt;

/// Where matching packets originate. Exactly one selector per check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelector {
    /// Search from a named device.
    Device(String),
    /// Search from a host address.
    Host(String),
}

impl SourceSelector {
    /// Build the selector from the two mutually-exclusive caller fields.
    /// Supplying both or neither is a validation failure naming the fields.
    pub fn from_fields(
        source: Option<String>,
        source_host: Option<String>,
    ) -> Result<Self, SpecError> {
        match (source, source_host) {
            (Some(device), None) => Ok(SourceSelector::Device(device)),
            (None, Some(host)) => Ok(SourceSelector::Host(host)),
            (Some(_), Some(_)) => Err(SpecError::SourceConflict),
            (None, None) => Err(SpecError::SourceMissing),
        }
    }
}

/// Validation failures raised while constructing a [`CheckSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// Neither `source` nor `source_host` was supplied.
    SourceMissing,
    /// Both `source` and `source_host` were supplied.
    SourceConflict,
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecError::SourceMissing => {
                write!(f, "'source' or 'source_host' is mandatory in check data")
            }
            SpecError::SourceConflict => {
                write!(f, "either 'source' or 'source_host' is allowed in check data, not both")
            }
        }
    }
}

impl std::error::Error for SpecError {}

/// A desired existential check. Immutable once constructed; absent packet
/// predicates contribute no filter at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSpec {
    pub source: SourceSelector,
    pub ipv4_dst: Option<String>,
    pub ip_proto: Option<String>,
    pub tp_src: Option<u16>,
    pub tp_dst: Option<u16>,
    /// Display name; metadata only, never identity-bearing.
    pub name: Option<String>,
}

impl CheckSpec {
    pub fn new(source: SourceSelector) -> Self {
        Self {
            source,
            ipv4_dst: None,
            ip_proto: None,
            tp_src: None,
            tp_dst: None,
            name: None,
        }
    }

    /// The wire definition submitted on create and compared (canonically)
    /// against existing checks.
    pub fn to_definition(&self) -> Value {
        let source = match &self.source {
            SourceSelector::Device(device) => json!({ "deviceName": device }),
            SourceSelector::Host(host) => json!({ "hostIp": host }),
        };

        let mut packet_filters: Vec<Value> = Vec::new();
        if let Some(dst) = &self.ipv4_dst {
            packet_filters.push(json!({ "ipv4Dst": dst }));
        }
        if let Some(proto) = &self.ip_proto {
            packet_filters.push(json!({ "ipProto": proto }));
        }
        if let Some(src_port) = self.tp_src {
            packet_filters.push(json!({ "tpSrc": src_port }));
        }
        if let Some(dst_port) = self.tp_dst {
            packet_filters.push(json!({ "tpDst": dst_port }));
        }

        let mut from = Map::new();
        from.insert("type".to_string(), json!("EndpointFilter"));
        from.insert("source".to_string(), source);
        if !packet_filters.is_empty() {
            from.insert("packetFilters".to_string(), Value::Array(packet_filters));
        }

        json!({
            "checkType": "Existential",
            "name": self.name.clone().unwrap_or_default(),
            "filters": { "from": Value::Object(from) }
        })
    }
}
