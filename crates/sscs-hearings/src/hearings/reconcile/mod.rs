//! Hearing status reconciliation: platform notification in, one CCD case
//! event out.
//!
//! [`resolve`] is pure. It turns a [`HearingSnapshot`] into a [`Resolution`]
//! without touching CCD, so the same rules drive the listener and the
//! `inspect` command.

mod journey;
mod location;
mod state;

use chrono::NaiveDateTime;

pub use journey::{HearingsJourneyService, ReconcileOutcome};

use super::domain::{CaseState, HearingId};
use super::error::HearingsError;
use super::hmc::HearingGetResponse;
use super::message::HmcMessage;
use super::status::{
    CancellationReason, CcdEvent, HmcStatus, ListAssistCaseStatus, ListingStatus,
};
use super::venues::{VenueDetails, VenueDirectory, VenueError};

/// Everything known about a hearing at reconciliation time: the topic
/// message, enriched with the platform's current view of the hearing.
#[derive(Debug, Clone, PartialEq)]
pub struct HearingSnapshot {
    pub hearing_id: HearingId,
    pub hmc_status: HmcStatus,
    pub listing_status: Option<ListingStatus>,
    pub list_assist_case_status: Option<ListAssistCaseStatus>,
    pub cancellation_reasons: Vec<String>,
    pub version_number: Option<i64>,
    pub session_start: Option<NaiveDateTime>,
    pub session_end: Option<NaiveDateTime>,
    pub session_venue_id: Option<String>,
    pub message_venue_id: Option<String>,
}

impl HearingSnapshot {
    pub fn from_message(message: &HmcMessage) -> Self {
        let update = &message.hearing_update;
        Self {
            hearing_id: HearingId(message.hearing_id.trim().to_string()),
            hmc_status: update.hmc_status,
            listing_status: update.hearing_listing_status,
            list_assist_case_status: update.list_assist_case_status,
            cancellation_reasons: Vec::new(),
            version_number: None,
            session_start: update.next_hearing_date,
            session_end: None,
            session_venue_id: None,
            message_venue_id: non_blank(update.hearing_venue_id.as_deref()),
        }
    }

    /// Fills in cancellation reasons, version and the scheduled session from
    /// `GET /hearing/{id}`. Values already carried by the message win.
    pub fn with_hearing(mut self, hearing: &HearingGetResponse) -> Self {
        let response = &hearing.hearing_response;
        self.cancellation_reasons = hearing.cancellation_reasons();
        self.version_number = hearing.request_details.version_number;
        self.listing_status = self.listing_status.or(response.listing_status);
        self.list_assist_case_status = self
            .list_assist_case_status
            .or(response.la_case_status);

        if let Some(session) = hearing.first_session() {
            self.session_start = session.hearing_start_date_time.or(self.session_start);
            self.session_end = session.hearing_end_date_time;
            self.session_venue_id = non_blank(session.hearing_venue_id.as_deref());
        }
        self
    }

    pub fn with_cancellation_reason(mut self, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        if !reason.trim().is_empty() {
            self.cancellation_reasons.insert(0, reason.trim().to_string());
        }
        self
    }

    fn is_cancellation(&self) -> bool {
        self.hmc_status == HmcStatus::Cancelled
            || !self.cancellation_reasons.is_empty()
            || self.listing_status == Some(ListingStatus::Cancel)
    }

    fn is_fixed_listing(&self) -> bool {
        matches!(
            self.hmc_status,
            HmcStatus::Listed | HmcStatus::UpdateSubmitted
        ) && self.listing_status == Some(ListingStatus::Fixed)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Case change implied by a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The platform raised an exception against the hearing.
    HandlingError,
    /// The hearing was cancelled. `Unknown` means the reason was not
    /// recognised and nothing is written.
    Cancelled {
        state: CaseState,
        reason: Option<String>,
    },
    /// A fixed listing: the hearing entry and venue are refreshed, the state
    /// moves only when List Assist's case status implies one.
    Listed {
        state: Option<CaseState>,
        venue: VenueDetails,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    },
    NoChange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub transition: Transition,
    pub event: Option<CcdEvent>,
}

impl Resolution {
    fn no_change() -> Self {
        Self {
            transition: Transition::NoChange,
            event: None,
        }
    }

    /// Whether the case must be fetched and resubmitted.
    pub fn writes(&self) -> bool {
        match &self.transition {
            Transition::NoChange => false,
            Transition::Cancelled { state, .. } => *state != CaseState::Unknown,
            Transition::HandlingError | Transition::Listed { .. } => self.event.is_some(),
        }
    }

    /// State the case ends in, when the transition sets one.
    pub fn target_state(&self) -> Option<CaseState> {
        match &self.transition {
            Transition::HandlingError => Some(CaseState::HandlingError),
            Transition::Cancelled { state, .. } if *state != CaseState::Unknown => Some(*state),
            Transition::Listed { state, .. } => *state,
            _ => None,
        }
    }
}

/// Resolves the case change for a snapshot.
///
/// Order matters: an exception wins over everything, then cancellation,
/// then fixed listings.
pub fn resolve(
    snapshot: &HearingSnapshot,
    venues: &VenueDirectory,
) -> Result<Resolution, HearingsError> {
    if snapshot.hmc_status == HmcStatus::Exception {
        return Ok(Resolution {
            transition: Transition::HandlingError,
            event: HmcStatus::Exception.ccd_event(),
        });
    }

    if snapshot.is_cancellation() {
        let reason = snapshot.cancellation_reasons.first().cloned();
        let state = reason
            .as_deref()
            .map(CancellationReason::resolve_state)
            .unwrap_or(CaseState::Unknown);
        return Ok(Resolution {
            transition: Transition::Cancelled { state, reason },
            event: HmcStatus::Cancelled.ccd_event(),
        });
    }

    if snapshot.is_fixed_listing() {
        let epims_id = snapshot
            .session_venue_id
            .as_deref()
            .or(snapshot.message_venue_id.as_deref())
            .ok_or_else(|| VenueError::MissingEpims {
                hearing_id: snapshot.hearing_id.0.clone(),
            })?;
        let venue = venues.lookup(epims_id)?.clone();
        let state = snapshot
            .list_assist_case_status
            .and_then(ListAssistCaseStatus::case_state);

        return Ok(Resolution {
            transition: Transition::Listed {
                state,
                venue,
                start: snapshot.session_start,
                end: snapshot.session_end,
            },
            event: snapshot.hmc_status.ccd_event(),
        });
    }

    Ok(Resolution::no_change())
}
