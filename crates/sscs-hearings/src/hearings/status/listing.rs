use serde::{Deserialize, Deserializer, Serialize};

use super::lookup_key;
use crate::hearings::domain::CaseState;

/// Listing status of the hearing's sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    Draft,
    Provisional,
    Fixed,
    #[serde(rename = "CNCL")]
    Cancel,
    Unknown,
}

impl ListingStatus {
    pub fn from_label(value: &str) -> Self {
        match lookup_key(value).as_str() {
            "draft" => Self::Draft,
            "provisional" => Self::Provisional,
            "fixed" => Self::Fixed,
            "cncl" | "cancel" | "cancelled" => Self::Cancel,
            _ => Self::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for ListingStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_label(&raw))
    }
}

/// List Assist's view of the case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListAssistCaseStatus {
    CaseCreated,
    AwaitingListing,
    Listed,
    PendingRelisting,
    HearingCompleted,
    CaseClosed,
    Closed,
    Unknown,
}

impl ListAssistCaseStatus {
    pub fn from_label(value: &str) -> Self {
        match lookup_key(value).as_str() {
            "casecreated" => Self::CaseCreated,
            "awaitinglisting" => Self::AwaitingListing,
            "listed" => Self::Listed,
            "pendingrelisting" => Self::PendingRelisting,
            "hearingcompleted" => Self::HearingCompleted,
            "caseclosed" => Self::CaseClosed,
            "closed" => Self::Closed,
            _ => Self::Unknown,
        }
    }

    /// Case state implied by a fixed listing, if any.
    pub const fn case_state(self) -> Option<CaseState> {
        match self {
            Self::Listed => Some(CaseState::Hearing),
            Self::AwaitingListing => Some(CaseState::ReadyToList),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for ListAssistCaseStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_label(&raw))
    }
}
