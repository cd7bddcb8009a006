use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a logical panel element.
///
/// Several groups may carry the same id when one logical element is
/// drawn as disjoint fragments. 8 bytes, Copy, Eq, Hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl ElementId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric id, as stored in the scene document.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ElementId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
