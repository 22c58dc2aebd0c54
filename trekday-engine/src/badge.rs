//! Stable presentation keys for linkage components.
//!
//! A badge is derived from the component's sorted member set, so the colour a
//! sub-route receives does not change when link declarations are reordered.
use serde::{Deserialize, Serialize};
use std::hash::Hasher;
use twox_hash::XxHash64;

use crate::catalog::DayNumber;

/// Deterministic identity of a linkage component for display grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentBadge(u64);

impl ComponentBadge {
    /// Hash the members after sorting; input order is irrelevant.
    #[must_use]
    pub fn for_component(members: &[DayNumber]) -> Self {
        let mut sorted = members.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let mut hasher = XxHash64::with_seed(0);
        for day in sorted {
            hasher.write(&day.get().to_le_bytes());
        }
        Self(hasher.finish())
    }

    #[must_use]
    pub const fn key(self) -> u64 {
        self.0
    }

    /// Slot in a palette of `palette_len` colours. Returns 0 for an empty palette.
    #[must_use]
    pub fn palette_slot(self, palette_len: usize) -> usize {
        if palette_len == 0 {
            return 0;
        }
        let len = u64::try_from(palette_len).unwrap_or(u64::MAX);
        usize::try_from(self.key() % len).unwrap_or(0)
    }
}
