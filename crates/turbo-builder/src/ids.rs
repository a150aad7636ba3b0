//! Newtype IDs for layout nodes.
//!
//! Node ids (rows, columns, widgets) come from an [`IdAllocator`] owned by
//! the page: a monotonic counter, so duplication-heavy edits can never
//! collide. Page ids are UUIDs since pages outlive a session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        /// A node identifier, unique within its page.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Prefix used by allocated ids.
            pub const PREFIX: &'static str = $prefix;

            /// Create an ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Counter value of an allocated id (`row-7` → 7).
            pub fn sequence(&self) -> Option<u64> {
                self.0
                    .strip_prefix(Self::PREFIX)
                    .and_then(|rest| rest.strip_prefix('-'))
                    .and_then(|n| n.parse().ok())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(RowId, "row");
define_id!(ColumnId, "col");
define_id!(WidgetId, "w");

/// Identifier of a page document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(String);

impl PageId {
    /// Create an ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random page ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Page-scoped id counter.
///
/// One counter serves every node type, so ids are unique across types too.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdAllocator {
    next_id: u64,
}

impl IdAllocator {
    /// Create an allocator whose next id follows `last`.
    pub fn starting_after(last: u64) -> Self {
        Self { next_id: last }
    }

    /// Last value handed out.
    pub fn position(&self) -> u64 {
        self.next_id
    }

    fn bump(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Allocate a row id.
    pub fn row_id(&mut self) -> RowId {
        RowId::new(format!("{}-{}", RowId::PREFIX, self.bump()))
    }

    /// Allocate a column id.
    pub fn column_id(&mut self) -> ColumnId {
        ColumnId::new(format!("{}-{}", ColumnId::PREFIX, self.bump()))
    }

    /// Allocate a widget id.
    pub fn widget_id(&mut self) -> WidgetId {
        WidgetId::new(format!("{}-{}", WidgetId::PREFIX, self.bump()))
    }

    /// Make sure future ids come after `sequence`.
    pub fn observe(&mut self, sequence: u64) {
        self.next_id = self.next_id.max(sequence);
    }

    /// Never move behind another allocator's position.
    pub fn catch_up(&mut self, other: &IdAllocator) {
        self.observe(other.next_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_is_monotonic_across_kinds() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.row_id().as_str(), "row-1");
        assert_eq!(ids.column_id().as_str(), "col-2");
        assert_eq!(ids.widget_id().as_str(), "w-3");
        assert_eq!(ids.position(), 3);
    }

    #[test]
    fn test_sequence_parsing() {
        assert_eq!(RowId::new("row-42").sequence(), Some(42));
        assert_eq!(WidgetId::new("w-7").sequence(), Some(7));
        assert_eq!(WidgetId::new("widget-7").sequence(), None);
        assert_eq!(ColumnId::new("col-x").sequence(), None);
    }

    #[test]
    fn test_observe_and_catch_up() {
        let mut ids = IdAllocator::default();
        ids.observe(10);
        assert_eq!(ids.row_id().as_str(), "row-11");

        let mut behind = IdAllocator::starting_after(2);
        behind.catch_up(&ids);
        assert_eq!(behind.widget_id().as_str(), "w-12");

        ids.observe(3);
        assert_eq!(ids.position(), 11);
    }

    #[test]
    fn test_id_serializes_as_string() {
        let id = WidgetId::new("w-9");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"w-9\"");
    }

    #[test]
    fn test_page_id_generation() {
        assert_ne!(PageId::generate(), PageId::generate());
    }
}
