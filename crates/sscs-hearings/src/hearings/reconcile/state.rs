use super::location::refresh_venue;
use super::{HearingSnapshot, Transition};
use crate::hearings::domain::{CaseState, SscsCaseDetails};
use crate::hearings::status::HmcStatus;

/// Applies a resolved transition to the fetched case in memory.
///
/// Returns the state the case ended in. Callers only reach this for
/// transitions that write.
pub(super) fn apply_transition(
    case: &mut SscsCaseDetails,
    snapshot: &HearingSnapshot,
    transition: &Transition,
) -> CaseState {
    match transition {
        Transition::HandlingError => {
            record_status(case, snapshot, HmcStatus::Exception);
            case.apply_state(CaseState::HandlingError);
        }
        Transition::Cancelled { state, .. } => {
            record_status(case, snapshot, HmcStatus::Cancelled);
            case.apply_state(*state);
        }
        Transition::Listed {
            state,
            venue,
            start,
            end,
        } => {
            record_status(case, snapshot, snapshot.hmc_status);
            let hearing = case.data.hearings.entry(&snapshot.hearing_id);
            hearing.start = *start;
            hearing.end = *end;
            refresh_venue(&mut case.data, &snapshot.hearing_id, venue);
            if let Some(state) = state {
                case.apply_state(*state);
            }
        }
        Transition::NoChange => {}
    }

    case.case_state()
}

fn record_status(case: &mut SscsCaseDetails, snapshot: &HearingSnapshot, status: HmcStatus) {
    let hearing = case.data.hearings.entry(&snapshot.hearing_id);
    hearing.hearing_status = Some(status);
    if let Some(version) = snapshot.version_number {
        hearing.version_number = Some(version);
    }
}
