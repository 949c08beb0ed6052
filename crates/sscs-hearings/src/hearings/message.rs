use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::status::{HmcStatus, ListAssistCaseStatus, ListingStatus};

/// Hearing change notification published on the hearings platform topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HmcMessage {
    #[serde(rename = "hmctsServiceID", alias = "hmctsServiceCode")]
    pub hmcts_service_id: String,
    #[serde(rename = "caseRef")]
    pub case_ref: String,
    #[serde(rename = "hearingID")]
    pub hearing_id: String,
    #[serde(rename = "hearingUpdate")]
    pub hearing_update: HearingUpdate,
}

impl HmcMessage {
    pub fn is_for_service(&self, service_code: &str) -> bool {
        same_service(&self.hmcts_service_id, service_code)
    }
}

/// The addressing part of an [`HmcMessage`]. Read first so notifications
/// for other services are settled without parsing the rest of the body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HmcEnvelope {
    #[serde(rename = "hmctsServiceID", alias = "hmctsServiceCode")]
    pub hmcts_service_id: String,
}

impl HmcEnvelope {
    pub fn is_for_service(&self, service_code: &str) -> bool {
        same_service(&self.hmcts_service_id, service_code)
    }
}

fn same_service(message_code: &str, service_code: &str) -> bool {
    message_code.trim().eq_ignore_ascii_case(service_code)
}

/// Status snapshot carried by an [`HmcMessage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingUpdate {
    #[serde(default, with = "wire_datetime::option")]
    pub hearing_response_received_date_time: Option<NaiveDateTime>,
    #[serde(default, with = "wire_datetime::option")]
    pub hearing_event_broadcast_date_time: Option<NaiveDateTime>,
    #[serde(alias = "HMCStatus")]
    pub hmc_status: HmcStatus,
    #[serde(default, alias = "ListingStatus")]
    pub hearing_listing_status: Option<ListingStatus>,
    #[serde(default, with = "wire_datetime::option")]
    pub next_hearing_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub list_assist_case_status: Option<ListAssistCaseStatus>,
    #[serde(default, rename = "listAssistSessionID")]
    pub list_assist_session_id: Option<String>,
    #[serde(default, rename = "hearingVenueId")]
    pub hearing_venue_id: Option<String>,
    #[serde(default)]
    pub hearing_room_id: Option<String>,
    #[serde(default)]
    pub hearing_judge_id: Option<String>,
}

/// Which listing system owns a case's hearings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HearingRoute {
    ListAssist,
    Gaps,
    #[serde(other)]
    Unknown,
}

/// Action requested on the internal hearings queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HearingState {
    CreateHearing,
    UpdateHearing,
    CancelHearing,
    UpdatedCase,
    PartyNotified,
}

/// Message the tribunal's case workflows publish to ask for a hearing change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingRequest {
    pub ccd_case_id: String,
    pub hearing_route: HearingRoute,
    pub hearing_state: HearingState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
}

/// Timestamps on the hearings platform wire: local date-times, optionally
/// suffixed with an offset which is normalised to UTC.
pub(crate) mod wire_datetime {
    use chrono::{DateTime, NaiveDateTime};

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        raw.parse::<NaiveDateTime>()
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|value| value.naive_utc())
            })
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => {
                    serializer.collect_str(&value.format("%Y-%m-%dT%H:%M:%S%.f"))
                }
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid date-time `{raw}`"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_topic_message() {
        let raw = json!({
            "hmctsServiceID": "BBA3",
            "caseRef": "1665063539958254",
            "hearingID": "2000004567",
            "hearingUpdate": {
                "hearingResponseReceivedDateTime": "2024-05-01T10:15:00",
                "hearingEventBroadcastDateTime": "2024-05-01T10:15:01.123Z",
                "HMCStatus": "LISTED",
                "hearingListingStatus": "FIXED",
                "nextHearingDate": "2024-06-12T10:00:00",
                "listAssistCaseStatus": "Listed",
                "listAssistSessionID": "S-77",
                "hearingVenueId": "372653",
                "hearingRoomId": "Room 3",
                "hearingJudgeId": null
            }
        });

        let message: HmcMessage = serde_json::from_value(raw).expect("message parses");

        assert!(message.is_for_service("bba3"));
        let update = &message.hearing_update;
        assert_eq!(update.hmc_status, HmcStatus::Listed);
        assert_eq!(update.hearing_listing_status, Some(ListingStatus::Fixed));
        assert_eq!(
            update.list_assist_case_status,
            Some(ListAssistCaseStatus::Listed)
        );
        assert_eq!(update.hearing_venue_id.as_deref(), Some("372653"));
        assert!(update.hearing_event_broadcast_date_time.is_some());
        assert!(update.hearing_judge_id.is_none());
    }

    #[test]
    fn rejects_garbled_timestamps() {
        let raw = json!({
            "hmctsServiceID": "BBA3",
            "caseRef": "1",
            "hearingID": "2",
            "hearingUpdate": {"hmcStatus": "LISTED", "nextHearingDate": "tomorrow"}
        });

        assert!(serde_json::from_value::<HmcMessage>(raw).is_err());
    }

    #[test]
    fn hearing_request_tolerates_unknown_routes() {
        let request: HearingRequest = serde_json::from_value(json!({
            "ccdCaseId": "1665063539958254",
            "hearingRoute": "courtRoom",
            "hearingState": "cancelHearing",
            "cancellationReason": "withdraw"
        }))
        .expect("request parses");

        assert_eq!(request.hearing_route, HearingRoute::Unknown);
        assert_eq!(request.hearing_state, HearingState::CancelHearing);
    }
}
