use std::sync::Arc;

use tracing::{info, instrument};

use super::state::apply_transition;
use super::{resolve, HearingSnapshot};
use crate::hearings::ccd::CcdCaseService;
use crate::hearings::domain::{CaseId, CaseState, HearingId};
use crate::hearings::error::HearingsError;
use crate::hearings::hmc::HmcHearingApi;
use crate::hearings::message::HmcMessage;
use crate::hearings::status::EventType;
use crate::hearings::venues::VenueDirectory;

/// Result of reconciling one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Updated {
        case_id: CaseId,
        state: CaseState,
        event: EventType,
    },
    Unchanged {
        case_id: CaseId,
    },
}

/// Drives a hearing notification through fetch, resolve, mutate and a
/// single case submission.
pub struct HearingsJourneyService<C, H> {
    ccd: Arc<C>,
    hmc: Arc<H>,
    venues: Arc<VenueDirectory>,
}

impl<C, H> HearingsJourneyService<C, H>
where
    C: CcdCaseService + 'static,
    H: HmcHearingApi + 'static,
{
    pub fn new(ccd: Arc<C>, hmc: Arc<H>, venues: Arc<VenueDirectory>) -> Self {
        Self { ccd, hmc, venues }
    }

    #[instrument(
        skip_all,
        fields(case_ref = %message.case_ref, hearing_id = %message.hearing_id)
    )]
    pub async fn process(&self, message: &HmcMessage) -> Result<ReconcileOutcome, HearingsError> {
        let case_id = CaseId::parse(&message.case_ref)?;
        let hearing_id = HearingId(message.hearing_id.trim().to_string());

        let hearing = self.hmc.get_hearing(&hearing_id).await?;
        let snapshot = HearingSnapshot::from_message(message).with_hearing(&hearing);
        let resolution = resolve(&snapshot, &self.venues)?;

        let Some(event) = resolution.event.filter(|_| resolution.writes()) else {
            info!(
                hmc_status = %snapshot.hmc_status,
                transition = ?resolution.transition,
                "hearing notification needs no case change"
            );
            return Ok(ReconcileOutcome::Unchanged { case_id });
        };

        let mut case = self
            .ccd
            .get_case(case_id)
            .await
            .map_err(|source| HearingsError::CaseFetch { case_id, source })?
            .ok_or(HearingsError::CaseNotFound(case_id))?;

        let state = apply_transition(&mut case, &snapshot, &resolution.transition);

        self.ccd
            .update_case(&case, event)
            .await
            .map_err(|source| HearingsError::UpdateFailed { case_id, source })?;

        info!(
            state = state.label(),
            event = %event.event_type,
            "case updated from hearing notification"
        );
        Ok(ReconcileOutcome::Updated {
            case_id,
            state,
            event: event.event_type,
        })
    }
}
