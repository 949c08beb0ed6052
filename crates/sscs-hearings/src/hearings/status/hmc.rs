use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::lookup_key;

/// CCD event raised against a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    HearingBooked,
    UpdateCaseOnly,
    HandlingError,
    HearingRequested,
}

impl EventType {
    pub const fn ccd_id(self) -> &'static str {
        match self {
            Self::HearingBooked => "hearingBooked",
            Self::UpdateCaseOnly => "updateCaseOnly",
            Self::HandlingError => "handlingError",
            Self::HearingRequested => "hearingRequested",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ccd_id())
    }
}

/// Event type plus the free-text summary/description CCD records with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcdEvent {
    pub event_type: EventType,
    pub summary: &'static str,
    pub description: &'static str,
}

/// Hearing lifecycle status published by the hearings platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HmcStatus {
    HearingRequested,
    AwaitingListing,
    Listed,
    UpdateRequested,
    UpdateSubmitted,
    Exception,
    CancellationRequested,
    CancellationSubmitted,
    Cancelled,
    AwaitingActuals,
    Completed,
    Adjourned,
    Closed,
    Unknown,
}

const HEARING_BOOKED: CcdEvent = CcdEvent {
    event_type: EventType::HearingBooked,
    summary: "Hearing booked",
    description: "Hearing has been listed and hearing information has been updated",
};

const HEARING_UPDATED: CcdEvent = CcdEvent {
    event_type: EventType::UpdateCaseOnly,
    summary: "Hearing updated",
    description: "Hearing information has been updated by the listing service",
};

const HEARING_CANCELLED: CcdEvent = CcdEvent {
    event_type: EventType::UpdateCaseOnly,
    summary: "Hearing cancelled",
    description: "Hearing has been cancelled by the listing service",
};

const HEARING_EXCEPTION: CcdEvent = CcdEvent {
    event_type: EventType::HandlingError,
    summary: "Hearing exception",
    description: "An exception has been raised by the hearings platform",
};

impl HmcStatus {
    /// Parses a platform label; unrecognised labels map to `Unknown`.
    pub fn from_label(value: &str) -> Self {
        match lookup_key(value).as_str() {
            "hearingrequested" => Self::HearingRequested,
            "awaitinglisting" => Self::AwaitingListing,
            "listed" => Self::Listed,
            "updaterequested" => Self::UpdateRequested,
            "updatesubmitted" => Self::UpdateSubmitted,
            "exception" => Self::Exception,
            "cancellationrequested" => Self::CancellationRequested,
            "cancellationsubmitted" => Self::CancellationSubmitted,
            "cancelled" => Self::Cancelled,
            "awaitingactuals" => Self::AwaitingActuals,
            "completed" => Self::Completed,
            "adjourned" => Self::Adjourned,
            "closed" => Self::Closed,
            _ => Self::Unknown,
        }
    }

    /// CCD event to raise for this status, if it warrants a case change.
    pub const fn ccd_event(self) -> Option<CcdEvent> {
        match self {
            Self::Listed => Some(HEARING_BOOKED),
            Self::UpdateSubmitted => Some(HEARING_UPDATED),
            Self::Cancelled => Some(HEARING_CANCELLED),
            Self::Exception => Some(HEARING_EXCEPTION),
            _ => None,
        }
    }

    /// Wire code, as the platform and CCD spell it.
    pub const fn code(self) -> &'static str {
        match self {
            Self::HearingRequested => "HEARING_REQUESTED",
            Self::AwaitingListing => "AWAITING_LISTING",
            Self::Listed => "LISTED",
            Self::UpdateRequested => "UPDATE_REQUESTED",
            Self::UpdateSubmitted => "UPDATE_SUBMITTED",
            Self::Exception => "EXCEPTION",
            Self::CancellationRequested => "CANCELLATION_REQUESTED",
            Self::CancellationSubmitted => "CANCELLATION_SUBMITTED",
            Self::Cancelled => "CANCELLED",
            Self::AwaitingActuals => "AWAITING_ACTUALS",
            Self::Completed => "COMPLETED",
            Self::Adjourned => "ADJOURNED",
            Self::Closed => "CLOSED",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::HearingRequested => "Hearing requested",
            Self::AwaitingListing => "Awaiting listing",
            Self::Listed => "Listed",
            Self::UpdateRequested => "Update requested",
            Self::UpdateSubmitted => "Update submitted",
            Self::Exception => "Exception",
            Self::CancellationRequested => "Cancellation requested",
            Self::CancellationSubmitted => "Cancellation submitted",
            Self::Cancelled => "Cancelled",
            Self::AwaitingActuals => "Awaiting actuals",
            Self::Completed => "Completed",
            Self::Adjourned => "Adjourned",
            Self::Closed => "Closed",
            Self::Unknown => "Unknown",
        }
    }
}

impl<'de> Deserialize<'de> for HmcStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_label(&raw))
    }
}

impl fmt::Display for HmcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_actionable_statuses_carry_events() {
        let actionable = [
            (HmcStatus::Listed, EventType::HearingBooked),
            (HmcStatus::UpdateSubmitted, EventType::UpdateCaseOnly),
            (HmcStatus::Cancelled, EventType::UpdateCaseOnly),
            (HmcStatus::Exception, EventType::HandlingError),
        ];
        for (status, event_type) in actionable {
            let event = status.ccd_event().expect("actionable status has an event");
            assert_eq!(event.event_type, event_type);
            assert!(!event.summary.is_empty());
        }

        for status in [
            HmcStatus::HearingRequested,
            HmcStatus::AwaitingListing,
            HmcStatus::UpdateRequested,
            HmcStatus::CancellationSubmitted,
            HmcStatus::Completed,
            HmcStatus::Unknown,
        ] {
            assert!(status.ccd_event().is_none(), "{status} should be a no-op");
        }
    }

    #[test]
    fn unknown_labels_fall_through_to_sentinel() {
        let parsed: HmcStatus =
            serde_json::from_str("\"SOMETHING_NEW\"").expect("any string parses");
        assert_eq!(parsed, HmcStatus::Unknown);
        assert_eq!(HmcStatus::from_label("update_submitted"), HmcStatus::UpdateSubmitted);
    }

    #[test]
    fn serialises_to_platform_labels() {
        let value = serde_json::to_value(HmcStatus::UpdateSubmitted).expect("serialises");
        assert_eq!(value, serde_json::json!("UPDATE_SUBMITTED"));
        assert_eq!(EventType::HearingBooked.to_string(), "hearingBooked");
    }
}
