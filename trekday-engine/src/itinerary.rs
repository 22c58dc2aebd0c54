//! Loaded itinerary: catalog, linkage and quota built once and shared by
//! every toggle against that itinerary.
use std::collections::BTreeMap;
use thiserror::Error;

use crate::catalog::{CatalogError, Day, DayNumber, TrekDayCatalog};
use crate::config::{ConfigError, ItineraryConfig};
use crate::diff::{SelectionDiff, diff};
use crate::linkage::{LinkageError, LinkageIndex};
use crate::ordering::{ordered_day_numbers, ordered_selection};
use crate::quota::QuotaPolicy;
use crate::selection::{
    InvariantViolation, Rejection, ToggleOutcome, ToggleReplay, apply_toggles, audit,
    blocked_days, repair_partial_components, requires_confirmation, toggle,
};
use crate::state::SelectionState;

/// Configuration-loading failures. Fatal to one itinerary's setup, never
/// raised per toggle.
#[derive(Debug, Error)]
pub enum ItineraryError {
    #[error("itinerary configuration could not be parsed: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Linkage(#[from] LinkageError),
}

#[derive(Debug, Clone)]
pub struct Itinerary {
    name: String,
    catalog: TrekDayCatalog,
    linkage: LinkageIndex,
    quota: QuotaPolicy,
}

impl Itinerary {
    /// Validate the document and build catalog, linkage and quota.
    ///
    /// # Errors
    ///
    /// Returns `ItineraryError` when validation fails, the catalog contains
    /// duplicates or dangling categories, or a link references a missing day.
    pub fn from_config(config: ItineraryConfig) -> Result<Self, ItineraryError> {
        config.validate()?;
        let ItineraryConfig {
            name,
            days,
            categories,
            links,
            max_selectable_days,
        } = config;

        let catalog = TrekDayCatalog::new(days, categories)?;
        let linkage = LinkageIndex::build(&catalog, &links)?;
        let quota = QuotaPolicy::from_catalog(&catalog, max_selectable_days);
        warn_unselectable_components(&name, &catalog, &linkage, &quota);
        log::debug!(
            "itinerary '{name}' loaded: {} days, {} linked groups",
            catalog.len(),
            linkage.len()
        );

        Ok(Self {
            name,
            catalog,
            linkage,
            quota,
        })
    }

    /// Parse, validate and build in one step.
    ///
    /// # Errors
    ///
    /// Returns `ItineraryError::Json` for malformed JSON, otherwise the same
    /// errors as [`Itinerary::from_config`].
    pub fn from_json(json: &str) -> Result<Self, ItineraryError> {
        Self::from_config(ItineraryConfig::from_json(json)?)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn catalog(&self) -> &TrekDayCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn linkage(&self) -> &LinkageIndex {
        &self.linkage
    }

    #[must_use]
    pub const fn quota(&self) -> &QuotaPolicy {
        &self.quota
    }

    #[must_use]
    pub fn toggle(&self, selection: &SelectionState, day: DayNumber) -> ToggleOutcome {
        toggle(selection, day, &self.catalog, &self.linkage, &self.quota)
    }

    #[must_use]
    pub fn requires_confirmation(&self, selection: &SelectionState, day: DayNumber) -> bool {
        requires_confirmation(selection, day, &self.linkage)
    }

    #[must_use]
    pub fn apply_toggles(&self, selection: &SelectionState, days: &[DayNumber]) -> ToggleReplay {
        apply_toggles(selection, days, &self.catalog, &self.linkage, &self.quota)
    }

    #[must_use]
    pub fn blocked_days(&self, selection: &SelectionState) -> BTreeMap<DayNumber, Rejection> {
        blocked_days(selection, &self.catalog, &self.linkage, &self.quota)
    }

    #[must_use]
    pub fn audit(&self, selection: &SelectionState) -> Vec<InvariantViolation> {
        audit(selection, &self.catalog, &self.linkage, &self.quota)
    }

    #[must_use]
    pub fn repair(&self, selection: &SelectionState) -> SelectionState {
        repair_partial_components(selection, &self.catalog, &self.linkage)
    }

    #[must_use]
    pub fn ordered_selection(&self, selection: &SelectionState) -> Vec<&Day> {
        ordered_selection(&self.catalog, selection)
    }

    #[must_use]
    pub fn ordered_day_numbers(&self, selection: &SelectionState) -> Vec<DayNumber> {
        ordered_day_numbers(&self.catalog, selection)
    }

    /// Compare a prior registration with an edited selection.
    #[must_use]
    pub fn diff(&self, original: &SelectionState, edited: &SelectionState) -> SelectionDiff {
        diff(original, edited)
    }
}

/// A component larger than one of its quotas can never be selected.
fn warn_unselectable_components(
    name: &str,
    catalog: &TrekDayCatalog,
    linkage: &LinkageIndex,
    quota: &QuotaPolicy,
) {
    for component in linkage.components() {
        let violated = quota.would_exceed(&SelectionState::empty(), component);
        if !violated.is_empty() {
            let scopes: Vec<String> = violated.iter().map(ToString::to_string).collect();
            log::warn!(
                "itinerary '{name}': linked days {:?} exceed {} and can never be selected",
                component.iter().map(|d| d.get()).collect::<Vec<_>>(),
                scopes.join(", ")
            );
        }
    }
    for category in catalog.categories() {
        if category.max_selectable_days.is_some()
            && catalog.days_in_category(&category.id).next().is_none()
        {
            log::warn!(
                "itinerary '{name}': category {} has a quota but no days",
                category.id
            );
        }
    }
}
