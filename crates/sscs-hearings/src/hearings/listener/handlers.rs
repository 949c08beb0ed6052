use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use super::{Delivery, Disposition, MessageHandler};
use crate::hearings::ccd::CcdCaseService;
use crate::hearings::hmc::HmcHearingApi;
use crate::hearings::message::{HearingRequest, HmcEnvelope, HmcMessage};
use crate::hearings::reconcile::{HearingsJourneyService, ReconcileOutcome};
use crate::hearings::request::{HearingRequestOutcome, HearingsService};

/// Consumes the hearings platform topic. Notifications for other services
/// are completed untouched; anything that fails is abandoned for
/// redelivery.
pub struct HmcMessageHandler<C, H> {
    service_code: String,
    journey: Arc<HearingsJourneyService<C, H>>,
}

impl<C, H> HmcMessageHandler<C, H>
where
    C: CcdCaseService + 'static,
    H: HmcHearingApi + 'static,
{
    pub fn new(
        service_code: impl Into<String>,
        journey: Arc<HearingsJourneyService<C, H>>,
    ) -> Self {
        Self {
            service_code: service_code.into(),
            journey,
        }
    }
}

#[async_trait]
impl<C, H> MessageHandler for HmcMessageHandler<C, H>
where
    C: CcdCaseService + 'static,
    H: HmcHearingApi + 'static,
{
    async fn handle(&self, delivery: &Delivery) -> Disposition {
        let envelope: HmcEnvelope = match serde_json::from_slice(&delivery.body) {
            Ok(envelope) => envelope,
            Err(err) => {
                error!(
                    message_id = %delivery.message_id,
                    body = %delivery.body_text(),
                    error = %err,
                    "hearing notification without a service code"
                );
                return Disposition::Abandon;
            }
        };
        if !envelope.is_for_service(&self.service_code) {
            debug!(service = %envelope.hmcts_service_id, "notification for another service");
            return Disposition::Complete;
        }

        let message: HmcMessage = match serde_json::from_slice(&delivery.body) {
            Ok(message) => message,
            Err(err) => {
                error!(
                    message_id = %delivery.message_id,
                    body = %delivery.body_text(),
                    error = %err,
                    "malformed hearing notification"
                );
                return Disposition::Abandon;
            }
        };

        match self.journey.process(&message).await {
            Ok(ReconcileOutcome::Updated { case_id, state, .. }) => {
                info!(%case_id, state = state.label(), "hearing notification applied");
                Disposition::Complete
            }
            Ok(ReconcileOutcome::Unchanged { .. }) => Disposition::Complete,
            Err(err) if err.is_mapping() => {
                warn!(
                    message_id = %delivery.message_id,
                    hearing_id = %message.hearing_id,
                    error = %err,
                    "hearing notification could not be mapped"
                );
                Disposition::Abandon
            }
            Err(err) => {
                error!(
                    message_id = %delivery.message_id,
                    hearing_id = %message.hearing_id,
                    error = %err,
                    "hearing notification failed"
                );
                Disposition::Abandon
            }
        }
    }
}

/// Consumes the tribunal's hearing request queue.
pub struct HearingRequestHandler<C, H> {
    service: Arc<HearingsService<C, H>>,
}

impl<C, H> HearingRequestHandler<C, H>
where
    C: CcdCaseService + 'static,
    H: HmcHearingApi + 'static,
{
    pub fn new(service: Arc<HearingsService<C, H>>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<C, H> MessageHandler for HearingRequestHandler<C, H>
where
    C: CcdCaseService + 'static,
    H: HmcHearingApi + 'static,
{
    async fn handle(&self, delivery: &Delivery) -> Disposition {
        let request: HearingRequest = match serde_json::from_slice(&delivery.body) {
            Ok(request) => request,
            Err(err) => {
                error!(
                    message_id = %delivery.message_id,
                    body = %delivery.body_text(),
                    error = %err,
                    "malformed hearing request"
                );
                return Disposition::Abandon;
            }
        };

        match self.service.process(&request).await {
            Ok(HearingRequestOutcome::Skipped { reason }) => {
                debug!(case_id = %request.ccd_case_id, reason, "hearing request skipped");
                Disposition::Complete
            }
            Ok(_) => Disposition::Complete,
            Err(err) => {
                error!(
                    message_id = %delivery.message_id,
                    case_id = %request.ccd_case_id,
                    error = %err,
                    "hearing request failed"
                );
                Disposition::Abandon
            }
        }
    }
}
