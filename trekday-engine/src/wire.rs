//! JSON request/response shapes for evaluating a toggle remotely.
use serde::{Deserialize, Serialize};

use crate::catalog::{CategoryId, DayNumber};
use crate::itinerary::Itinerary;
use crate::selection::{Rejection, ToggleOutcome};
use crate::state::SelectionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireAction {
    Toggle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub current_selection: Vec<DayNumber>,
    pub action: WireAction,
    pub day: DayNumber,
}

impl ToggleRequest {
    #[must_use]
    pub fn toggle(current_selection: &SelectionState, day: DayNumber) -> Self {
        Self {
            current_selection: current_selection.to_vec(),
            action: WireAction::Toggle,
            day,
        }
    }

    /// Parse a request from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the request shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireOutcome {
    Selected,
    Deselected,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireReason {
    QuotaExceeded,
    UnknownDay,
}

/// Response body. `category` is omitted for overall-cap rejections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub selection: Vec<DayNumber>,
    pub outcome: WireOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<WireReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl From<&ToggleOutcome> for ToggleResponse {
    fn from(outcome: &ToggleOutcome) -> Self {
        // Day numbers are unique, so ascending order is the canonical order.
        let selection = outcome.selection().to_vec();
        match outcome {
            ToggleOutcome::Selected { .. } => Self::accepted(selection, WireOutcome::Selected),
            ToggleOutcome::Deselected { .. } => Self::accepted(selection, WireOutcome::Deselected),
            ToggleOutcome::Rejected { reason, .. } => match reason {
                Rejection::QuotaExceeded { scope, limit } => Self {
                    selection,
                    outcome: WireOutcome::Rejected,
                    reason: Some(WireReason::QuotaExceeded),
                    category: scope.category().cloned(),
                    limit: Some(*limit),
                },
                Rejection::UnknownDay { .. } => Self {
                    selection,
                    outcome: WireOutcome::Rejected,
                    reason: Some(WireReason::UnknownDay),
                    category: None,
                    limit: None,
                },
            },
        }
    }
}

impl ToggleResponse {
    fn accepted(selection: Vec<DayNumber>, outcome: WireOutcome) -> Self {
        Self {
            selection,
            outcome,
            reason: None,
            category: None,
            limit: None,
        }
    }
}

/// Evaluate one request against a loaded itinerary.
#[must_use]
pub fn handle_toggle(itinerary: &Itinerary, request: &ToggleRequest) -> ToggleResponse {
    let current: SelectionState = request.current_selection.iter().copied().collect();
    let outcome = match request.action {
        WireAction::Toggle => itinerary.toggle(&current, request.day),
    };
    ToggleResponse::from(&outcome)
}
