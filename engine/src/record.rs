//! Quote records and remote-value normalization.

use crate::{RecordId, Timestamp};
use serde::{Deserialize, Serialize};

/// Category assigned to remote records that arrive without one.
pub const FALLBACK_CATEGORY: &str = "uncategorized";

/// A quote record in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Unique identifier for this record
    pub id: RecordId,
    /// The quote text
    pub text: String,
    /// Category the quote belongs to
    pub category: String,
    /// When this record was last mutated, local or remote (milliseconds since epoch)
    pub last_modified: Timestamp,
}

impl Quote {
    /// Create a new record.
    pub fn new(
        id: impl Into<RecordId>,
        text: impl Into<String>,
        category: impl Into<String>,
        last_modified: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            category: category.into(),
            last_modified,
        }
    }

    /// Stamp a local mutation.
    ///
    /// `last_modified` must increase strictly across mutations of the same
    /// record, even when the wall clock has not advanced past the previous
    /// stamp.
    pub fn touch(&mut self, now: Timestamp) {
        self.last_modified = now.max(self.last_modified.saturating_add(1));
    }

    /// Normalize a loosely-shaped remote JSON value into a record.
    ///
    /// The transport only guarantees "a JSON array mappable to quote
    /// records"; field-level cleanup happens here. An `id` may arrive as a
    /// string or an integer, `category` falls back to [`FALLBACK_CATEGORY`],
    /// and a missing `lastModified` becomes `0` so an existing local copy
    /// always outranks an unstamped remote one. Entries without a usable id
    /// or text yield `None`.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let obj = value.as_object()?;

        let id = match obj.get("id") {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => return None,
        };

        let text = obj.get("text")?.as_str()?.to_string();

        let category = obj
            .get("category")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or(FALLBACK_CATEGORY)
            .to_string();

        let last_modified = obj
            .get("lastModified")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        Some(Self {
            id,
            text,
            category,
            last_modified,
        })
    }
}
