use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{json, Value};

use crate::hearings::ccd::{CcdCaseService, CcdError};
use crate::hearings::domain::{
    Appeal, Appellant, BenefitType, CaseHearing, CaseId, HearingId, Name, SscsCaseData,
    SscsCaseDetails,
};
use crate::hearings::hmc::{
    GetRequestDetails, HearingCancelRequest, HearingDaySchedule, HearingGetResponse,
    HearingRequestPayload, HearingResponse, HmcError, HmcHearingApi, HmcUpdateResponse,
};
use crate::hearings::mapping::CaseMapper;
use crate::hearings::status::{CcdEvent, HmcStatus, ListingStatus};
use crate::hearings::venues::VenueDirectory;

pub(super) const SERVICE_CODE: &str = "BBA3";
pub(super) const CASE_ID: CaseId = CaseId(1_650_000_000_000_001);
pub(super) const HEARING_ID: &str = "2000000001";
pub(super) const FOX_COURT: &str = "372653";

pub(super) fn mapper() -> CaseMapper {
    CaseMapper::new(SERVICE_CODE, "https://manage-case.example")
}

pub(super) fn venues() -> Arc<VenueDirectory> {
    Arc::new(VenueDirectory::embedded().expect("embedded venues"))
}

pub(super) fn datetime(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").expect("valid datetime")
}

pub(super) fn ready_to_list_case() -> SscsCaseDetails {
    let mut data = SscsCaseData {
        benefit_code: Some("002".to_string()),
        issue_code: Some("DD".to_string()),
        dwp_response_date: Some("2024-03-01".to_string()),
        appeal: Some(Appeal {
            benefit_type: Some(BenefitType {
                code: Some("PIP".to_string()),
                ..BenefitType::default()
            }),
            appellant: Some(Appellant {
                name: Some(Name {
                    first_name: Some("Jo".to_string()),
                    last_name: Some("Bloggs".to_string()),
                    ..Name::default()
                }),
                ..Appellant::default()
            }),
            hearing_type: Some("oral".to_string()),
            ..Appeal::default()
        }),
        ..SscsCaseData::default()
    };
    data.extra
        .insert("caseReference".to_string(), json!("SC123/24/00001"));
    data.extra
        .insert("untouchedField".to_string(), json!({ "kept": true }));

    SscsCaseDetails {
        id: CASE_ID,
        state: "readyToList".to_string(),
        data,
    }
}

pub(super) fn case_with_hearing(status: HmcStatus) -> SscsCaseDetails {
    let mut case = ready_to_list_case();
    case.data.hearings.upsert(CaseHearing {
        version_number: Some(1),
        hearing_status: Some(status),
        hearing_requested: Some(datetime("2024-04-01T09:00:00")),
        ..CaseHearing::new(HearingId(HEARING_ID.to_string()))
    });
    case
}

pub(super) fn hmc_message(status: &str, listing_status: Option<&str>) -> Value {
    let mut update = json!({
        "hearingResponseReceivedDateTime": "2024-05-01T10:00:00",
        "hearingEventBroadcastDateTime": "2024-05-01T10:00:01",
        "hmcStatus": status,
    });
    if let Some(listing_status) = listing_status {
        update["hearingListingStatus"] = json!(listing_status);
    }
    json!({
        "hmctsServiceID": SERVICE_CODE,
        "caseRef": CASE_ID.to_string(),
        "hearingID": HEARING_ID,
        "hearingUpdate": update,
    })
}

pub(super) fn listed_hearing(venue: &str) -> HearingGetResponse {
    HearingGetResponse {
        request_details: request_details(HmcStatus::Listed, Vec::new()),
        hearing_response: HearingResponse {
            listing_status: Some(ListingStatus::Fixed),
            hearing_day_schedule: vec![HearingDaySchedule {
                hearing_start_date_time: Some(datetime("2024-06-03T10:00:00")),
                hearing_end_date_time: Some(datetime("2024-06-03T13:00:00")),
                hearing_venue_id: Some(venue.to_string()),
                ..HearingDaySchedule::default()
            }],
            ..HearingResponse::default()
        },
    }
}

pub(super) fn cancelled_hearing(reasons: &[&str]) -> HearingGetResponse {
    HearingGetResponse {
        request_details: request_details(
            HmcStatus::Cancelled,
            reasons.iter().map(|reason| reason.to_string()).collect(),
        ),
        hearing_response: HearingResponse::default(),
    }
}

fn request_details(status: HmcStatus, reasons: Vec<String>) -> GetRequestDetails {
    GetRequestDetails {
        hearing_request_id: Some(HearingId(HEARING_ID.to_string())),
        status,
        timestamp: None,
        version_number: Some(3),
        cancellation_reason_codes: reasons,
    }
}

/// CCD double holding cases in memory and recording every submission.
#[derive(Default)]
pub(super) struct FakeCcd {
    cases: Mutex<HashMap<CaseId, SscsCaseDetails>>,
    submissions: Mutex<Vec<(SscsCaseDetails, CcdEvent)>>,
    fail_updates: bool,
}

impl FakeCcd {
    pub(super) fn with_case(case: SscsCaseDetails) -> Self {
        let ccd = Self::default();
        ccd.insert(case);
        ccd
    }

    pub(super) fn failing_updates(case: SscsCaseDetails) -> Self {
        let ccd = Self {
            fail_updates: true,
            ..Self::default()
        };
        ccd.insert(case);
        ccd
    }

    pub(super) fn insert(&self, case: SscsCaseDetails) {
        self.cases.lock().expect("cases mutex").insert(case.id, case);
    }

    pub(super) fn submissions(&self) -> Vec<(SscsCaseDetails, CcdEvent)> {
        self.submissions.lock().expect("submissions mutex").clone()
    }

    pub(super) fn stored(&self, case_id: CaseId) -> SscsCaseDetails {
        self.cases
            .lock()
            .expect("cases mutex")
            .get(&case_id)
            .cloned()
            .expect("stored case")
    }
}

#[async_trait]
impl CcdCaseService for FakeCcd {
    async fn get_case(&self, case_id: CaseId) -> Result<Option<SscsCaseDetails>, CcdError> {
        Ok(self.cases.lock().expect("cases mutex").get(&case_id).cloned())
    }

    async fn update_case(&self, case: &SscsCaseDetails, event: CcdEvent) -> Result<(), CcdError> {
        if self.fail_updates {
            return Err(CcdError::Status {
                status: 500,
                body: "case data store down".to_string(),
            });
        }
        self.submissions
            .lock()
            .expect("submissions mutex")
            .push((case.clone(), event));
        self.insert(case.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum HmcCall {
    Create(HearingRequestPayload),
    Update(HearingId, HearingRequestPayload),
    Cancel(HearingId, HearingCancelRequest),
    Get(HearingId),
}

/// Hearings platform double. `GET` answers from a fixed response; writes
/// are recorded and acknowledged.
#[derive(Default)]
pub(super) struct FakeHmc {
    hearing: Option<HearingGetResponse>,
    calls: Mutex<Vec<HmcCall>>,
    reject_with: Option<u16>,
}

impl FakeHmc {
    pub(super) fn returning(hearing: HearingGetResponse) -> Self {
        Self {
            hearing: Some(hearing),
            ..Self::default()
        }
    }

    pub(super) fn rejecting(status: u16) -> Self {
        Self {
            reject_with: Some(status),
            ..Self::default()
        }
    }

    pub(super) fn calls(&self) -> Vec<HmcCall> {
        self.calls.lock().expect("calls mutex").clone()
    }

    fn record(&self, call: HmcCall) -> Result<(), HmcError> {
        self.calls.lock().expect("calls mutex").push(call);
        match self.reject_with {
            Some(status) => Err(HmcError::ResponseStatus {
                status,
                body: "rejected".to_string(),
            }),
            None => Ok(()),
        }
    }

    fn acknowledge(hearing_id: HearingId, status: HmcStatus, version: i64) -> HmcUpdateResponse {
        HmcUpdateResponse {
            hearing_request_id: hearing_id,
            status,
            time_stamp: Some(datetime("2024-05-01T09:30:00")),
            version_number: version,
        }
    }
}

#[async_trait]
impl HmcHearingApi for FakeHmc {
    async fn create_hearing(
        &self,
        payload: &HearingRequestPayload,
    ) -> Result<HmcUpdateResponse, HmcError> {
        self.record(HmcCall::Create(payload.clone()))?;
        Ok(Self::acknowledge(
            HearingId("2000000099".to_string()),
            HmcStatus::HearingRequested,
            1,
        ))
    }

    async fn update_hearing(
        &self,
        hearing_id: &HearingId,
        payload: &HearingRequestPayload,
    ) -> Result<HmcUpdateResponse, HmcError> {
        self.record(HmcCall::Update(hearing_id.clone(), payload.clone()))?;
        let version = payload.request_details.version_number.unwrap_or(0) + 1;
        Ok(Self::acknowledge(
            hearing_id.clone(),
            HmcStatus::UpdateRequested,
            version,
        ))
    }

    async fn cancel_hearing(
        &self,
        hearing_id: &HearingId,
        request: &HearingCancelRequest,
    ) -> Result<HmcUpdateResponse, HmcError> {
        self.record(HmcCall::Cancel(hearing_id.clone(), request.clone()))?;
        Ok(Self::acknowledge(
            hearing_id.clone(),
            HmcStatus::CancellationRequested,
            2,
        ))
    }

    async fn get_hearing(&self, hearing_id: &HearingId) -> Result<HearingGetResponse, HmcError> {
        self.record(HmcCall::Get(hearing_id.clone()))?;
        self.hearing.clone().ok_or(HmcError::ResponseStatus {
            status: 404,
            body: "hearing not found".to_string(),
        })
    }
}

pub(super) fn sla_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date")
}

pub(super) async fn read_json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}
