use crate::constants::ENVELOPE_REQUIRED_FIELDS;
use crate::error::PublishError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Externally supplied descriptor of one outbound event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutboundEventEnvelope {
    pub source: String,
    pub detail_type: String,
    pub event_bus_name: String,
    pub detail: Value,
}

/// Transmittable form of an envelope: `detail` re-encoded to text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutboundEvent {
    pub source: String,
    pub detail_type: String,
    pub event_bus_name: String,
    pub detail: String,
}

impl OutboundEventEnvelope {
    /// Build an envelope from a decoded publish body
    ///
    /// All four fields are required. The three routing fields must be
    /// non-null strings and `Detail` must be non-null; every offending
    /// field is reported at once.
    pub fn from_body(body: &Value) -> Result<Self, PublishError> {
        let Some(map) = body.as_object() else {
            return Err(PublishError::malformed_envelope(
                ENVELOPE_REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect(),
            ));
        };

        let missing: Vec<String> = ENVELOPE_REQUIRED_FIELDS
            .iter()
            .filter(|field| match map.get(**field) {
                None | Some(Value::Null) => true,
                Some(Value::String(_)) => false,
                Some(_) => **field != "Detail",
            })
            .map(|field| field.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(PublishError::malformed_envelope(missing));
        }

        let text = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Ok(Self {
            source: text("Source"),
            detail_type: text("DetailType"),
            event_bus_name: text("EventBusName"),
            detail: map.get("Detail").cloned().unwrap_or(Value::Null),
        })
    }

    /// Serialize `detail` for transmission
    pub fn to_event(&self) -> Result<OutboundEvent, PublishError> {
        Ok(OutboundEvent {
            source: self.source.clone(),
            detail_type: self.detail_type.clone(),
            event_bus_name: self.event_bus_name.clone(),
            detail: serde_json::to_string(&self.detail)?,
        })
    }
}
