//! Wire contract of the hearings management platform.
//!
//! The building blocks (`HearingWindow`, `CaseCategory`, `HearingLocation`,
//! `PartyDetails`, ...) are shared between the outbound hearing request and
//! the service hearing values served back to the platform.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::hearings::domain::HearingId;
use crate::hearings::message::wire_datetime;
use crate::hearings::status::{HmcStatus, ListAssistCaseStatus, ListingStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HearingChannel {
    #[serde(rename = "INTER")]
    FaceToFace,
    #[serde(rename = "VID")]
    Video,
    #[serde(rename = "TEL")]
    Telephone,
    #[serde(rename = "ONPPRS")]
    Paper,
    #[serde(rename = "NA")]
    NotAttending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HearingPriority {
    Urgent,
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartyType {
    #[serde(rename = "IND")]
    Individual,
    #[serde(rename = "ORG")]
    Organisation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryType {
    CaseType,
    CaseSubType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseCategory {
    pub category_type: CategoryType,
    pub category_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_parent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range_end: Option<NaiveDate>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "wire_datetime::option"
    )]
    pub first_date_time_must_be: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingLocation {
    pub location_type: String,
    pub location_id: String,
}

impl HearingLocation {
    pub fn court(epims_id: impl Into<String>) -> Self {
        Self {
            location_type: "court".to_string(),
            location_id: epims_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelPreference {
    #[serde(rename = "memberID")]
    pub member_id: String,
    pub member_type: String,
    pub requirement_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PanelRequirements {
    pub role_type: Vec<String>,
    pub authorisation_types: Vec<String>,
    pub authorisation_sub_type: Vec<String>,
    pub panel_preferences: Vec<PanelPreference>,
    pub panel_specialisms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnavailabilityRange {
    pub unavailable_from_date: NaiveDate,
    pub unavailable_to_date: NaiveDate,
    pub unavailability_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_hearing_channel: Option<HearingChannel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter_language: Option<String>,
    #[serde(default)]
    pub reasonable_adjustments: Vec<String>,
    #[serde(default)]
    pub vulnerable_flag: bool,
    #[serde(default)]
    pub hearing_channel_email: Vec<String>,
    #[serde(default)]
    pub hearing_channel_phone: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationDetails {
    pub name: String,
    pub organisation_type: String,
    #[serde(
        rename = "cftOrganisationID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cft_organisation_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyDetails {
    #[serde(rename = "partyID")]
    pub party_id: String,
    pub party_type: PartyType,
    pub party_role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub individual_details: Option<IndividualDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation_details: Option<OrganisationDetails>,
    #[serde(default)]
    pub unavailability_ranges: Vec<UnavailabilityRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_number: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingDetails {
    pub auto_list_flag: bool,
    pub hearing_type: String,
    pub hearing_window: HearingWindow,
    pub duration: u32,
    #[serde(default)]
    pub non_standard_hearing_duration_reasons: Vec<String>,
    pub hearing_priority_type: HearingPriority,
    pub number_of_physical_attendees: u32,
    pub hearing_in_welsh_flag: bool,
    pub hearing_locations: Vec<HearingLocation>,
    #[serde(default)]
    pub facilities_required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hearing_requester: Option<String>,
    pub private_hearing_required_flag: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_judge_contract_type: Option<String>,
    pub panel_requirements: PanelRequirements,
    pub hearing_is_linked_flag: bool,
    #[serde(default)]
    pub amend_reason_codes: Vec<String>,
    pub hearing_channels: Vec<HearingChannel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDetails {
    pub hmcts_service_code: String,
    pub case_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_case_reference: Option<String>,
    pub case_deep_link: String,
    pub hmcts_internal_case_name: String,
    pub public_case_name: String,
    pub case_additional_security_flag: bool,
    pub case_interpreter_required_flag: bool,
    pub case_categories: Vec<CaseCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_management_location_code: Option<String>,
    pub case_restricted_flag: bool,
    #[serde(rename = "caseSLAStartDate")]
    pub case_sla_start_date: NaiveDate,
}

/// Body of `POST /hearing` and `PUT /hearing/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingRequestPayload {
    pub request_details: RequestDetails,
    pub hearing_details: HearingDetails,
    pub case_details: CaseDetails,
    pub party_details: Vec<PartyDetails>,
}

/// Body of `DELETE /hearing/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingCancelRequest {
    pub cancellation_reason_codes: Vec<String>,
}

/// Acknowledgement returned by create, update and cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HmcUpdateResponse {
    #[serde(rename = "hearingRequestID")]
    pub hearing_request_id: HearingId,
    pub status: HmcStatus,
    #[serde(default, with = "wire_datetime::option")]
    pub time_stamp: Option<NaiveDateTime>,
    pub version_number: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRequestDetails {
    #[serde(default, rename = "hearingRequestID")]
    pub hearing_request_id: Option<HearingId>,
    pub status: HmcStatus,
    #[serde(default, with = "wire_datetime::option")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub version_number: Option<i64>,
    #[serde(default)]
    pub cancellation_reason_codes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingDaySchedule {
    #[serde(default, with = "wire_datetime::option")]
    pub hearing_start_date_time: Option<NaiveDateTime>,
    #[serde(default, with = "wire_datetime::option")]
    pub hearing_end_date_time: Option<NaiveDateTime>,
    #[serde(default, rename = "listAssistSessionID")]
    pub list_assist_session_id: Option<String>,
    #[serde(default)]
    pub hearing_venue_id: Option<String>,
    #[serde(default)]
    pub hearing_room_id: Option<String>,
    #[serde(default)]
    pub hearing_judge_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingResponse {
    #[serde(default, rename = "listAssistTransactionID")]
    pub list_assist_transaction_id: Option<String>,
    #[serde(default, with = "wire_datetime::option")]
    pub received_date_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub la_case_status: Option<ListAssistCaseStatus>,
    #[serde(default)]
    pub listing_status: Option<ListingStatus>,
    #[serde(default)]
    pub hearing_cancellation_reason: Option<String>,
    #[serde(default)]
    pub hearing_day_schedule: Vec<HearingDaySchedule>,
}

/// Body of `GET /hearing/{id}`; only the parts reconciliation reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingGetResponse {
    pub request_details: GetRequestDetails,
    #[serde(default)]
    pub hearing_response: HearingResponse,
}

impl HearingGetResponse {
    /// Cancellation reason codes from the request, then the listing response.
    pub fn cancellation_reasons(&self) -> Vec<String> {
        let mut reasons: Vec<String> = self
            .request_details
            .cancellation_reason_codes
            .iter()
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .collect();
        if let Some(reason) = self
            .hearing_response
            .hearing_cancellation_reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
        {
            if !reasons.iter().any(|existing| existing == reason) {
                reasons.push(reason.to_string());
            }
        }
        reasons
    }

    /// First scheduled session, which carries the venue and start time.
    pub fn first_session(&self) -> Option<&HearingDaySchedule> {
        self.hearing_response
            .hearing_day_schedule
            .iter()
            .min_by_key(|session| {
                (
                    session.hearing_start_date_time.is_none(),
                    session.hearing_start_date_time,
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_response_merges_cancellation_reasons() {
        let raw = json!({
            "requestDetails": {
                "hearingRequestID": 2000000123_i64,
                "status": "CANCELLED",
                "versionNumber": 3,
                "cancellationReasonCodes": ["withdraw", " "]
            },
            "hearingResponse": {
                "hearingCancellationReason": "withdraw",
                "hearingDaySchedule": []
            }
        });

        let response: HearingGetResponse = serde_json::from_value(raw).expect("parses");

        assert_eq!(response.request_details.status, HmcStatus::Cancelled);
        assert_eq!(
            response.request_details.hearing_request_id,
            Some(HearingId("2000000123".to_string()))
        );
        assert_eq!(response.cancellation_reasons(), vec!["withdraw".to_string()]);
        assert!(response.first_session().is_none());
    }

    #[test]
    fn first_session_is_the_earliest_day() {
        let raw = json!({
            "requestDetails": {"status": "LISTED"},
            "hearingResponse": {
                "laCaseStatus": "LISTED",
                "listingStatus": "FIXED",
                "hearingDaySchedule": [
                    {"hearingStartDateTime": "2024-06-13T10:00:00", "hearingVenueId": "239985"},
                    {"hearingStartDateTime": "2024-06-12T10:00:00", "hearingVenueId": "372653"}
                ]
            }
        });

        let response: HearingGetResponse = serde_json::from_value(raw).expect("parses");

        assert_eq!(
            response
                .first_session()
                .and_then(|session| session.hearing_venue_id.as_deref()),
            Some("372653")
        );
        assert_eq!(
            response.hearing_response.listing_status,
            Some(ListingStatus::Fixed)
        );
    }

    #[test]
    fn channels_and_party_types_use_platform_codes() {
        assert_eq!(
            serde_json::to_value([HearingChannel::FaceToFace, HearingChannel::Paper])
                .expect("serialises"),
            json!(["INTER", "ONPPRS"])
        );
        assert_eq!(
            serde_json::to_value(PartyType::Organisation).expect("serialises"),
            json!("ORG")
        );
    }
}
