//! Trekday Selection Engine
//!
//! Platform-agnostic decision logic for registering to a subset of days of a
//! multi-day itinerary. Days belong to quota-bearing categories and may be
//! bound into linked groups that are selected or deselected together.
//! This crate performs no I/O and renders nothing; callers own the selection
//! value and pass it into every call.

pub mod badge;
pub mod catalog;
pub mod config;
pub mod diff;
pub mod itinerary;
pub mod linkage;
pub mod ordering;
pub mod quota;
pub mod selection;
pub mod state;
pub mod wire;

// Re-export commonly used types
pub use badge::ComponentBadge;
pub use catalog::{CatalogError, Category, CategoryId, Day, DayNumber, Difficulty, TrekDayCatalog};
pub use config::{ConfigError, ItineraryConfig};
pub use diff::{NoChangeDetected, SelectionDiff, diff};
pub use itinerary::{Itinerary, ItineraryError};
pub use linkage::{LinkDeclaration, LinkageComponent, LinkageError, LinkageIndex};
pub use ordering::{canonical_order, date_span, ordered_day_numbers, ordered_selection};
pub use quota::{QuotaPolicy, QuotaScope, Remaining};
pub use selection::{
    InvariantViolation, Rejection, ToggleOutcome, ToggleReplay, apply_toggles, audit,
    blocked_days, repair_partial_components, requires_confirmation, toggle,
};
pub use state::SelectionState;
pub use wire::{ToggleRequest, ToggleResponse, WireAction, WireOutcome, WireReason, handle_toggle};

/// Trait for abstracting itinerary loading.
/// Platform-specific implementations should provide this
pub trait ItineraryLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the configuration document for an itinerary
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be found or parsed.
    fn load_itinerary_config(&self, itinerary_id: &str) -> Result<ItineraryConfig, Self::Error>;
}

/// Entry point for hosts that serve several itineraries from one source.
pub struct SelectionEngine<L>
where
    L: ItineraryLoader,
{
    loader: L,
}

impl<L> SelectionEngine<L>
where
    L: ItineraryLoader,
{
    /// Create a new engine over the provided loader
    pub const fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Load and build an itinerary.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded, or if it is
    /// structurally invalid (`ItineraryError`).
    pub fn open(&self, itinerary_id: &str) -> Result<Itinerary, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let config = self
            .loader
            .load_itinerary_config(itinerary_id)
            .map_err(Into::into)?;
        let itinerary = Itinerary::from_config(config)?;
        Ok(itinerary)
    }

    /// Load an itinerary and check a prior registration against it.
    /// Returns the itinerary, the seeded selection and any broken invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if the itinerary cannot be opened.
    pub fn open_for_edit(
        &self,
        itinerary_id: &str,
        prior_days: &[u32],
    ) -> Result<(Itinerary, SelectionState, Vec<InvariantViolation>), anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let itinerary = self.open(itinerary_id)?;
        let seeded = SelectionState::from_days(prior_days.iter().copied());
        let violations = itinerary.audit(&seeded);
        if !violations.is_empty() {
            log::warn!(
                "prior selection for '{itinerary_id}' breaks {} invariant(s)",
                violations.len()
            );
        }
        Ok((itinerary, seeded, violations))
    }
}
