//! Activity log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::ActivityAction;

/// One append-only row describing a change to a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: i64,
    pub collection: String,
    pub document_id: String,
    pub action: ActivityAction,
    /// Username of whoever made the change, or `anonymous`/`system`.
    pub actor: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

/// Actor recorded when authentication is disabled.
pub const ANONYMOUS_ACTOR: &str = "anonymous";

/// Actor recorded for changes made by the store itself (e.g. stock updates).
pub const SYSTEM_ACTOR: &str = "system";
