//! Per-key result of a batch lookup

use std::collections::HashMap;

/// Outcome for one key of a batch fetch
///
/// A plain backend only reports keys it found. A chain reports every
/// requested key and uses [`ValueSlot::NotFound`] for keys absent from every
/// tier. A stored empty value is `Found(vec![])`, never `NotFound`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSlot {
    /// Key was found with this value
    Found(Vec<u8>),
    /// Key was searched for and is absent
    NotFound,
}

impl ValueSlot {
    /// Check if the key was found
    pub fn is_found(&self) -> bool {
        matches!(self, ValueSlot::Found(_))
    }

    /// Borrow the value if present
    pub fn value(&self) -> Option<&[u8]> {
        match self {
            ValueSlot::Found(v) => Some(v),
            ValueSlot::NotFound => None,
        }
    }

    /// Extract the value, consuming the slot
    pub fn into_value(self) -> Option<Vec<u8>> {
        match self {
            ValueSlot::Found(v) => Some(v),
            ValueSlot::NotFound => None,
        }
    }
}

impl From<Option<Vec<u8>>> for ValueSlot {
    fn from(value: Option<Vec<u8>>) -> Self {
        match value {
            Some(v) => ValueSlot::Found(v),
            None => ValueSlot::NotFound,
        }
    }
}

/// Result of a batch fetch, keyed by the requested key
pub type FetchMap = HashMap<String, ValueSlot>;
