//! Tribunal hearings: the case model, the hearings platform contract, and
//! the services that keep the two in step.

pub mod auth;
pub mod ccd;
pub mod domain;
mod error;
pub mod hmc;
pub mod listener;
pub mod mapping;
pub mod message;
pub mod reconcile;
pub mod request;
pub mod router;
pub mod status;
pub mod values;
pub mod venues;

#[cfg(test)]
mod tests;

pub use auth::{S2sServiceAuth, ServiceAuthError, ServiceAuthValidator, StaticServiceAuth};
pub use ccd::{CcdCaseService, CcdCredentials, CcdError, HttpCcdClient};
pub use domain::{CaseHearing, CaseHearings, CaseId, CaseState, HearingId, SscsCaseDetails};
pub use error::HearingsError;
pub use hmc::{HmcCredentials, HmcError, HmcHearingApi, HttpHmcClient};
pub use listener::{
    Delivery, Disposition, HearingRequestHandler, HmcMessageHandler, InMemoryQueue, Listener,
    ListenerError, MessageHandler, MessageSource, ServiceBusSource,
};
pub use mapping::CaseMapper;
pub use message::{HearingRequest, HmcEnvelope, HmcMessage};
pub use reconcile::{HearingsJourneyService, ReconcileOutcome};
pub use request::{build_hearing_request, HearingRequestOutcome, HearingsService};
pub use router::service_hearings_router;
pub use status::{CancellationReason, EventType, HmcStatus};
pub use values::{ServiceHearingValues, ServiceHearingValuesService, ServiceLinkedCase};
pub use venues::{VenueDirectory, VenueError};
