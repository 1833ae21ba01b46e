//! A previously-emitted call treated as evidence for another call.
//!
//! Compound events produce calls that support each other; wrapping a call
//! as evidence lets it flow through the same annotation and allocation
//! machinery as read-derived evidence.

use crate::evidence::breakend::CallPosition;

#[derive(Debug, Clone)]
pub struct VariantCallEvidence {
    pub id: String,
    pub event_id: Option<String>,
    pub position: CallPosition,
    pub qual: f32,
    pub breakend_sequence: Option<Vec<u8>>,
    pub breakend_quality: Option<Vec<u8>>,
}

impl VariantCallEvidence {
    pub fn evidence_id(&self) -> String {
        self.id.clone()
    }

    /// Identifier shared by both mates of the underlying event, falling
    /// back to the call id when no event id was recorded.
    pub fn common_identifier(&self) -> String {
        self.event_id.clone().unwrap_or_else(|| self.id.clone())
    }
}
