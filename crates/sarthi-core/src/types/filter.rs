//! Tenant scoping for every vector store read and write.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mandatory owner+frame scope, optionally narrowed to one material.
///
/// Every search and delete against the vector store takes one of these; there
/// is no way to express an unscoped query, which makes cross-tenant leakage
/// structurally impossible rather than a matter of call-site discipline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkFilter {
    owner_id: String,
    frame_id: String,
    material_id: Option<String>,
}

impl ChunkFilter {
    /// Scope to everything in one frame of one owner.
    pub fn frame(owner_id: impl Into<String>, frame_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            frame_id: frame_id.into(),
            material_id: None,
        }
    }

    /// Narrow the scope to a single material.
    pub fn material(
        owner_id: impl Into<String>,
        frame_id: impl Into<String>,
        material_id: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            frame_id: frame_id.into(),
            material_id: Some(material_id.into()),
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    pub fn material_id(&self) -> Option<&str> {
        self.material_id.as_deref()
    }

    /// Metadata equality conditions this filter implies. Backends turn these
    /// into their native filter syntax.
    pub fn conditions(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("user_id".to_string(), self.owner_id.clone());
        map.insert("frame_id".to_string(), self.frame_id.clone());
        if let Some(material_id) = &self.material_id {
            map.insert("material_id".to_string(), material_id.clone());
        }
        map
    }

    /// Whether a stored payload falls inside this scope.
    pub fn matches(&self, payload: &HashMap<String, serde_json::Value>) -> bool {
        self.conditions()
            .iter()
            .all(|(key, expected)| payload.get(key).and_then(|v| v.as_str()) == Some(expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_filter_requires_both_tenant_fields() {
        let filter = ChunkFilter::frame("owner-a", "frame-1");
        let conditions = filter.conditions();
        assert_eq!(conditions["user_id"], "owner-a");
        assert_eq!(conditions["frame_id"], "frame-1");
        assert!(!conditions.contains_key("material_id"));
    }

    #[test]
    fn matches_rejects_other_tenants() {
        let filter = ChunkFilter::frame("owner-a", "frame-1");
        let mut payload = HashMap::new();
        payload.insert("user_id".to_string(), serde_json::json!("owner-b"));
        payload.insert("frame_id".to_string(), serde_json::json!("frame-1"));
        assert!(!filter.matches(&payload));

        payload.insert("user_id".to_string(), serde_json::json!("owner-a"));
        assert!(filter.matches(&payload));
    }

    #[test]
    fn material_filter_narrows() {
        let filter = ChunkFilter::material("owner-a", "frame-1", "mat-2");
        let mut payload = HashMap::new();
        payload.insert("user_id".to_string(), serde_json::json!("owner-a"));
        payload.insert("frame_id".to_string(), serde_json::json!("frame-1"));
        payload.insert("material_id".to_string(), serde_json::json!("mat-1"));
        assert!(!filter.matches(&payload));
    }
}
