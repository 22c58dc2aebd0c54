//! Linkage components: days bound together by link declarations.
//!
//! Declarations are pairwise, but the binding is transitive: if A links to B
//! and B links to C, all three share one component and are always selected
//! or deselected together.
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::badge::ComponentBadge;
use crate::catalog::{DayNumber, TrekDayCatalog};

/// Sorted member list of one component. Most sub-routes span a handful of days.
pub type LinkageComponent = SmallVec<[DayNumber; 4]>;

/// Unordered pair of days that must share selection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkDeclaration {
    pub day_a: DayNumber,
    pub day_b: DayNumber,
}

impl LinkDeclaration {
    #[must_use]
    pub const fn new(day_a: u32, day_b: u32) -> Self {
        Self {
            day_a: DayNumber(day_a),
            day_b: DayNumber(day_b),
        }
    }

    /// Returns true when both ends name the same day.
    #[must_use]
    pub fn is_self_link(&self) -> bool {
        self.day_a == self.day_b
    }
}

/// Raised when link configuration cannot be resolved against the catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkageError {
    #[error("link {missing} <-> {partner} references day {missing}, which is not in the catalog")]
    InvalidLinkConfig {
        missing: DayNumber,
        partner: DayNumber,
    },
}

/// Precomputed connected components of the declaration graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkageIndex {
    components: Vec<LinkageComponent>,
    component_ids: HashMap<DayNumber, usize>,
}

impl LinkageIndex {
    /// Resolve declarations into components.
    ///
    /// Self-links and repeated declarations are accepted and have no extra effect.
    ///
    /// # Errors
    ///
    /// Returns `LinkageError::InvalidLinkConfig` when a declaration references
    /// a day that is absent from the catalog.
    pub fn build(
        catalog: &TrekDayCatalog,
        declarations: &[LinkDeclaration],
    ) -> Result<Self, LinkageError> {
        for decl in declarations {
            for (day, partner) in [(decl.day_a, decl.day_b), (decl.day_b, decl.day_a)] {
                if !catalog.contains(day) {
                    return Err(LinkageError::InvalidLinkConfig {
                        missing: day,
                        partner,
                    });
                }
            }
        }

        let mut slots: HashMap<DayNumber, usize> = HashMap::new();
        let mut members: Vec<DayNumber> = Vec::new();
        for decl in declarations.iter().filter(|d| !d.is_self_link()) {
            for day in [decl.day_a, decl.day_b] {
                slots.entry(day).or_insert_with(|| {
                    members.push(day);
                    members.len() - 1
                });
            }
        }

        let mut sets = DisjointSet::new(members.len());
        for decl in declarations.iter().filter(|d| !d.is_self_link()) {
            sets.union(slots[&decl.day_a], slots[&decl.day_b]);
        }

        let mut grouped: HashMap<usize, LinkageComponent> = HashMap::new();
        for (idx, &day) in members.iter().enumerate() {
            grouped.entry(sets.find(idx)).or_default().push(day);
        }
        let mut components: Vec<LinkageComponent> = grouped
            .into_values()
            .map(|mut component| {
                component.sort_unstable();
                component
            })
            .collect();
        components.sort_unstable_by_key(|component| component[0]);

        let component_ids = components
            .iter()
            .enumerate()
            .flat_map(|(idx, component)| component.iter().map(move |&day| (day, idx)))
            .collect();

        Ok(Self {
            components,
            component_ids,
        })
    }

    /// The day's component: itself alone when undeclared, otherwise every
    /// day reachable through declarations (including itself).
    #[must_use]
    pub fn component_of(&self, day: DayNumber) -> LinkageComponent {
        self.component_ids
            .get(&day)
            .map_or_else(|| smallvec![day], |&idx| self.components[idx].clone())
    }

    /// Returns true when the day belongs to a multi-day component.
    #[must_use]
    pub fn is_linked(&self, day: DayNumber) -> bool {
        self.component_ids.contains_key(&day)
    }

    /// Days linked to `day`, excluding itself.
    pub fn partners(&self, day: DayNumber) -> impl Iterator<Item = DayNumber> + '_ {
        self.component_ids
            .get(&day)
            .into_iter()
            .flat_map(move |&idx| self.components[idx].iter().copied())
            .filter(move |&member| member != day)
    }

    /// Multi-day components, ordered by their smallest member.
    pub fn components(&self) -> impl Iterator<Item = &[DayNumber]> {
        self.components.iter().map(SmallVec::as_slice)
    }

    /// Presentation badge for every linked day, keyed by day.
    #[must_use]
    pub fn badges(&self) -> BTreeMap<DayNumber, ComponentBadge> {
        let mut badges = BTreeMap::new();
        for component in &self.components {
            let badge = ComponentBadge::for_component(component);
            for &day in component {
                badges.insert(day, badge);
            }
        }
        badges
    }

    /// Number of multi-day components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Union-find with path halving and union by size.
struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    fn find(&mut self, mut node: usize) -> usize {
        while self.parent[node] != node {
            self.parent[node] = self.parent[self.parent[node]];
            node = self.parent[node];
        }
        node
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut root_a, mut root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return;
        }
        if self.size[root_a] < self.size[root_b] {
            std::mem::swap(&mut root_a, &mut root_b);
        }
        self.parent[root_b] = root_a;
        self.size[root_a] += self.size[root_b];
    }
}
