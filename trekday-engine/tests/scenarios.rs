use trekday_engine::{
    CategoryId, DayNumber, Itinerary, QuotaScope, Rejection, SelectionState, ToggleOutcome,
};

fn reference() -> Itinerary {
    Itinerary::from_json(include_str!("../../assets/itineraries/reference.json"))
        .expect("reference itinerary loads")
}

fn days(values: &[u32]) -> SelectionState {
    SelectionState::from_days(values.iter().copied())
}

#[test]
fn first_day_is_selected_on_empty_selection() {
    let outcome = reference().toggle(&days(&[]), DayNumber(1));
    assert_eq!(
        outcome,
        ToggleOutcome::Selected {
            selection: days(&[1])
        }
    );
}

#[test]
fn second_category_day_fits_under_quota() {
    let outcome = reference().toggle(&days(&[1]), DayNumber(2));
    assert_eq!(
        outcome,
        ToggleOutcome::Selected {
            selection: days(&[1, 2])
        }
    );
}

#[test]
fn third_category_day_is_rejected_at_quota() {
    let outcome = reference().toggle(&days(&[1, 2]), DayNumber(3));
    assert_eq!(
        outcome,
        ToggleOutcome::Rejected {
            selection: days(&[1, 2]),
            reason: Rejection::QuotaExceeded {
                scope: QuotaScope::Category(CategoryId::new("Q")),
                limit: 2,
            },
        }
    );
}

#[test]
fn linked_day_pulls_in_its_partner() {
    let itinerary = reference();
    assert!(itinerary.requires_confirmation(&days(&[]), DayNumber(4)));
    let outcome = itinerary.toggle(&days(&[]), DayNumber(4));
    assert_eq!(
        outcome,
        ToggleOutcome::Selected {
            selection: days(&[4, 5])
        }
    );
}

#[test]
fn deselecting_either_partner_removes_both() {
    let outcome = reference().toggle(&days(&[4, 5]), DayNumber(5));
    assert_eq!(
        outcome,
        ToggleOutcome::Deselected {
            selection: days(&[])
        }
    );
}

#[test]
fn diff_reports_added_linked_days() {
    let report = reference().diff(&days(&[1, 2]), &days(&[1, 2, 4, 5]));
    assert_eq!(
        report.added.iter().copied().collect::<Vec<_>>(),
        vec![DayNumber(4), DayNumber(5)]
    );
    assert!(report.removed.is_empty());
    assert!(!report.unchanged);
    assert!(report.require_change().is_ok());
}

#[test]
fn scripted_session_replays_to_expected_state() {
    let itinerary = reference();
    let script: Vec<DayNumber> = [1, 2, 3, 4, 5, 2].into_iter().map(DayNumber).collect();
    let replay = itinerary.apply_toggles(&days(&[]), &script);
    assert_eq!(replay.rejected(), 1);
    assert_eq!(replay.selection, days(&[1]));
    assert!(itinerary.audit(&replay.selection).is_empty());
}

#[test]
fn alpine_sample_respects_glacier_block() {
    let itinerary = Itinerary::from_json(include_str!(
        "../../assets/itineraries/alpine-traverse.json"
    ))
    .expect("alpine itinerary loads");
    let outcome = itinerary.toggle(&days(&[]), DayNumber(7));
    assert_eq!(outcome.selection(), &days(&[6, 7, 8]));

    let blocked = itinerary.blocked_days(outcome.selection());
    assert!(!blocked.contains_key(&DayNumber(6)));
    assert_eq!(
        itinerary
            .ordered_day_numbers(outcome.selection())
            .into_iter()
            .map(DayNumber::get)
            .collect::<Vec<_>>(),
        vec![6, 7, 8]
    );
}
