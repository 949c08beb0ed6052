use super::ccd::CcdError;
use super::domain::CaseId;
use super::hmc::HmcError;
use super::venues::VenueError;

/// Failures raised while reconciling or requesting hearings for a case.
#[derive(Debug, thiserror::Error)]
pub enum HearingsError {
    #[error("invalid case reference `{0}`")]
    InvalidCaseId(String),
    #[error("case {0} not found")]
    CaseNotFound(CaseId),
    #[error("failed to fetch case {case_id}: {source}")]
    CaseFetch {
        case_id: CaseId,
        #[source]
        source: CcdError,
    },
    #[error("failed to update case {case_id}: {source}")]
    UpdateFailed {
        case_id: CaseId,
        #[source]
        source: CcdError,
    },
    #[error(transparent)]
    Hmc(#[from] HmcError),
    #[error(transparent)]
    Venue(#[from] VenueError),
    #[error("case {case_id} has no active hearing")]
    NoActiveHearing { case_id: CaseId },
    #[error("case {case_id} is missing {field}")]
    IncompleteCase {
        case_id: CaseId,
        field: &'static str,
    },
}

impl HearingsError {
    /// Mapping failures: the inputs were readable but could not be turned
    /// into a hearing shape.
    pub fn is_mapping(&self) -> bool {
        matches!(
            self,
            Self::Venue(_) | Self::NoActiveHearing { .. } | Self::IncompleteCase { .. }
        )
    }
}
