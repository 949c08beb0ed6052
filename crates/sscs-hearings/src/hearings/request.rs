use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use super::ccd::CcdCaseService;
use super::domain::{CaseHearing, CaseId, HearingId, SscsCaseDetails};
use super::error::HearingsError;
use super::hmc::{HearingCancelRequest, HearingRequestPayload, HmcHearingApi, RequestDetails};
use super::mapping::{channels, map_parties, CaseMapper};
use super::message::{HearingRequest, HearingRoute, HearingState};
use super::status::{CancellationReason, CcdEvent, EventType, HmcStatus};

const HEARING_REQUESTED: CcdEvent = CcdEvent {
    event_type: EventType::HearingRequested,
    summary: "Hearing requested",
    description: "A hearing has been requested from the hearings platform",
};

const HEARING_UPDATE_REQUESTED: CcdEvent = CcdEvent {
    event_type: EventType::UpdateCaseOnly,
    summary: "Hearing update requested",
    description: "An update to the hearing has been sent to the hearings platform",
};

const HEARING_CANCELLATION_REQUESTED: CcdEvent = CcdEvent {
    event_type: EventType::UpdateCaseOnly,
    summary: "Hearing cancellation requested",
    description: "Cancellation of the hearing has been sent to the hearings platform",
};

/// Builds the hearing request body for a case. `version` is the platform
/// version of the hearing being amended, absent on create.
pub fn build_hearing_request(
    mapper: &CaseMapper,
    case: &SscsCaseDetails,
    version: Option<i64>,
) -> Result<HearingRequestPayload, HearingsError> {
    let preferred_channel = channels(&case.data).first().copied();
    let parties = map_parties(&case.data, preferred_channel);

    Ok(HearingRequestPayload {
        request_details: RequestDetails {
            version_number: version,
        },
        hearing_details: mapper.hearing_details(&case.data),
        case_details: mapper.case_details(case)?,
        party_details: parties.into_iter().map(|party| party.details).collect(),
    })
}

/// What a hearing request message led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HearingRequestOutcome {
    Requested { hearing_id: HearingId },
    UpdateRequested { hearing_id: HearingId },
    CancellationRequested { hearing_id: HearingId },
    Skipped { reason: &'static str },
}

/// Turns hearing request messages into platform calls and records the
/// result on the case.
pub struct HearingsService<C, H> {
    ccd: Arc<C>,
    hmc: Arc<H>,
    mapper: CaseMapper,
}

impl<C, H> HearingsService<C, H>
where
    C: CcdCaseService + 'static,
    H: HmcHearingApi + 'static,
{
    pub fn new(ccd: Arc<C>, hmc: Arc<H>, mapper: CaseMapper) -> Self {
        Self { ccd, hmc, mapper }
    }

    #[instrument(
        skip_all,
        fields(case_id = %request.ccd_case_id, state = ?request.hearing_state)
    )]
    pub async fn process(
        &self,
        request: &HearingRequest,
    ) -> Result<HearingRequestOutcome, HearingsError> {
        if request.hearing_route != HearingRoute::ListAssist {
            info!(route = ?request.hearing_route, "hearing route not handled here");
            return Ok(HearingRequestOutcome::Skipped {
                reason: "not a list assist hearing",
            });
        }

        let case_id = CaseId::parse(&request.ccd_case_id)?;
        match request.hearing_state {
            HearingState::CreateHearing => self.create(case_id).await,
            HearingState::UpdateHearing => self.update(case_id).await,
            HearingState::CancelHearing => {
                self.cancel(case_id, request.cancellation_reason.as_deref())
                    .await
            }
            HearingState::UpdatedCase | HearingState::PartyNotified => {
                info!("no hearing action required");
                Ok(HearingRequestOutcome::Skipped {
                    reason: "no hearing action",
                })
            }
        }
    }

    async fn create(&self, case_id: CaseId) -> Result<HearingRequestOutcome, HearingsError> {
        let mut case = self.fetch(case_id).await?;
        if let Some(active) = case.data.hearings.latest_active() {
            info!(hearing_id = %active.hearing_id, "case already has an active hearing");
            return Ok(HearingRequestOutcome::Skipped {
                reason: "active hearing exists",
            });
        }

        let payload = build_hearing_request(&self.mapper, &case, None)?;
        let response = self.hmc.create_hearing(&payload).await?;
        let hearing_id = response.hearing_request_id.clone();

        case.data.hearings.upsert(CaseHearing {
            version_number: Some(response.version_number),
            hearing_status: Some(HmcStatus::HearingRequested),
            hearing_requested: Some(
                response
                    .time_stamp
                    .unwrap_or_else(|| Utc::now().naive_utc()),
            ),
            ..CaseHearing::new(hearing_id.clone())
        });
        self.submit(&case, HEARING_REQUESTED).await?;

        info!(%hearing_id, "hearing requested");
        Ok(HearingRequestOutcome::Requested { hearing_id })
    }

    async fn update(&self, case_id: CaseId) -> Result<HearingRequestOutcome, HearingsError> {
        let mut case = self.fetch(case_id).await?;
        let (hearing_id, version) = active_hearing(&case)?;

        let payload = build_hearing_request(&self.mapper, &case, version)?;
        let response = self.hmc.update_hearing(&hearing_id, &payload).await?;

        let hearing = case.data.hearings.entry(&hearing_id);
        hearing.version_number = Some(response.version_number);
        hearing.hearing_status = Some(response.status);
        self.submit(&case, HEARING_UPDATE_REQUESTED).await?;

        info!(%hearing_id, version = response.version_number, "hearing update requested");
        Ok(HearingRequestOutcome::UpdateRequested { hearing_id })
    }

    async fn cancel(
        &self,
        case_id: CaseId,
        reason: Option<&str>,
    ) -> Result<HearingRequestOutcome, HearingsError> {
        let mut case = self.fetch(case_id).await?;
        let (hearing_id, _) = active_hearing(&case)?;

        let reason = match reason.and_then(CancellationReason::from_code) {
            Some(reason) => reason,
            None => {
                warn!(?reason, "unrecognised cancellation reason, sending `other`");
                CancellationReason::Other
            }
        };
        let request = HearingCancelRequest {
            cancellation_reason_codes: vec![reason.code().to_string()],
        };
        let response = self.hmc.cancel_hearing(&hearing_id, &request).await?;

        let hearing = case.data.hearings.entry(&hearing_id);
        hearing.version_number = Some(response.version_number);
        hearing.hearing_status = Some(HmcStatus::CancellationRequested);
        self.submit(&case, HEARING_CANCELLATION_REQUESTED).await?;

        info!(%hearing_id, reason = reason.code(), "hearing cancellation requested");
        Ok(HearingRequestOutcome::CancellationRequested { hearing_id })
    }

    async fn fetch(&self, case_id: CaseId) -> Result<SscsCaseDetails, HearingsError> {
        self.ccd
            .get_case(case_id)
            .await
            .map_err(|source| HearingsError::CaseFetch { case_id, source })?
            .ok_or(HearingsError::CaseNotFound(case_id))
    }

    async fn submit(&self, case: &SscsCaseDetails, event: CcdEvent) -> Result<(), HearingsError> {
        self.ccd
            .update_case(case, event)
            .await
            .map_err(|source| HearingsError::UpdateFailed {
                case_id: case.id,
                source,
            })
    }
}

fn active_hearing(case: &SscsCaseDetails) -> Result<(HearingId, Option<i64>), HearingsError> {
    case.data
        .hearings
        .latest_active()
        .map(|hearing| (hearing.hearing_id.clone(), hearing.version_number))
        .ok_or(HearingsError::NoActiveHearing { case_id: case.id })
}
