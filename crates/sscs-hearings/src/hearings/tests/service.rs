use std::sync::Arc;

use super::common::*;
use crate::hearings::domain::HearingId;
use crate::hearings::error::HearingsError;
use crate::hearings::hmc::HmcError;
use crate::hearings::message::{HearingRequest, HearingRoute, HearingState};
use crate::hearings::request::{HearingRequestOutcome, HearingsService};
use crate::hearings::status::{EventType, HmcStatus};

fn request(state: HearingState, reason: Option<&str>) -> HearingRequest {
    HearingRequest {
        ccd_case_id: CASE_ID.to_string(),
        hearing_route: HearingRoute::ListAssist,
        hearing_state: state,
        cancellation_reason: reason.map(str::to_string),
    }
}

fn service(ccd: &Arc<FakeCcd>, hmc: &Arc<FakeHmc>) -> HearingsService<FakeCcd, FakeHmc> {
    HearingsService::new(Arc::clone(ccd), Arc::clone(hmc), mapper())
}

#[tokio::test]
async fn create_requests_a_hearing_and_records_it_on_the_case() {
    let ccd = Arc::new(FakeCcd::with_case(ready_to_list_case()));
    let hmc = Arc::new(FakeHmc::default());

    let outcome = service(&ccd, &hmc)
        .process(&request(HearingState::CreateHearing, None))
        .await
        .expect("created");

    let hearing_id = HearingId("2000000099".to_string());
    assert_eq!(
        outcome,
        HearingRequestOutcome::Requested {
            hearing_id: hearing_id.clone()
        }
    );

    let calls = hmc.calls();
    let [HmcCall::Create(payload)] = calls.as_slice() else {
        panic!("expected a single create call, got {calls:?}");
    };
    assert_eq!(payload.request_details.version_number, None);
    assert_eq!(payload.case_details.case_ref, CASE_ID.to_string());
    assert_eq!(payload.case_details.case_sla_start_date, sla_date());
    assert_eq!(payload.hearing_details.duration, 60);

    let (case, event) = &ccd.submissions()[0];
    assert_eq!(event.event_type, EventType::HearingRequested);
    let hearing = case.data.hearings.get(&hearing_id).expect("hearing entry");
    assert_eq!(hearing.hearing_status, Some(HmcStatus::HearingRequested));
    assert_eq!(hearing.version_number, Some(1));
    assert!(hearing.hearing_requested.is_some());
}

#[tokio::test]
async fn create_is_skipped_while_a_hearing_is_active() {
    let ccd = Arc::new(FakeCcd::with_case(case_with_hearing(HmcStatus::Listed)));
    let hmc = Arc::new(FakeHmc::default());

    let outcome = service(&ccd, &hmc)
        .process(&request(HearingState::CreateHearing, None))
        .await
        .expect("skipped");

    assert!(matches!(outcome, HearingRequestOutcome::Skipped { .. }));
    assert!(hmc.calls().is_empty());
    assert!(ccd.submissions().is_empty());
}

#[tokio::test]
async fn update_sends_the_current_version_and_stores_the_new_one() {
    let ccd = Arc::new(FakeCcd::with_case(case_with_hearing(HmcStatus::Listed)));
    let hmc = Arc::new(FakeHmc::default());

    service(&ccd, &hmc)
        .process(&request(HearingState::UpdateHearing, None))
        .await
        .expect("updated");

    let calls = hmc.calls();
    let [HmcCall::Update(hearing_id, payload)] = calls.as_slice() else {
        panic!("expected a single update call, got {calls:?}");
    };
    assert_eq!(hearing_id.0, HEARING_ID);
    assert_eq!(payload.request_details.version_number, Some(1));

    let (case, event) = &ccd.submissions()[0];
    assert_eq!(event.event_type, EventType::UpdateCaseOnly);
    let hearing = case.data.hearings.get(hearing_id).expect("hearing entry");
    assert_eq!(hearing.version_number, Some(2));
    assert_eq!(hearing.hearing_status, Some(HmcStatus::UpdateRequested));
}

#[tokio::test]
async fn cancel_sends_the_reason_code() {
    let ccd = Arc::new(FakeCcd::with_case(case_with_hearing(HmcStatus::Listed)));
    let hmc = Arc::new(FakeHmc::default());

    service(&ccd, &hmc)
        .process(&request(HearingState::CancelHearing, Some("Withdrawn")))
        .await
        .expect("cancelled");

    let calls = hmc.calls();
    let [HmcCall::Cancel(_, cancel)] = calls.as_slice() else {
        panic!("expected a single cancel call, got {calls:?}");
    };
    assert_eq!(cancel.cancellation_reason_codes, vec!["withdraw".to_string()]);

    let stored = ccd.stored(CASE_ID);
    let hearing = stored
        .data
        .hearings
        .get(&HearingId(HEARING_ID.to_string()))
        .expect("hearing entry");
    assert_eq!(hearing.hearing_status, Some(HmcStatus::CancellationRequested));
    assert!(stored.data.hearings.latest_active().is_none());
}

#[tokio::test]
async fn cancel_with_an_unknown_reason_sends_other() {
    let ccd = Arc::new(FakeCcd::with_case(case_with_hearing(HmcStatus::Listed)));
    let hmc = Arc::new(FakeHmc::default());

    service(&ccd, &hmc)
        .process(&request(HearingState::CancelHearing, Some("judge on holiday")))
        .await
        .expect("cancelled");

    let calls = hmc.calls();
    let [HmcCall::Cancel(_, cancel)] = calls.as_slice() else {
        panic!("expected a single cancel call, got {calls:?}");
    };
    assert_eq!(cancel.cancellation_reason_codes, vec!["other".to_string()]);
}

#[tokio::test]
async fn update_without_an_active_hearing_fails() {
    let ccd = Arc::new(FakeCcd::with_case(ready_to_list_case()));
    let hmc = Arc::new(FakeHmc::default());

    let error = service(&ccd, &hmc)
        .process(&request(HearingState::UpdateHearing, None))
        .await
        .expect_err("no hearing");

    assert!(matches!(error, HearingsError::NoActiveHearing { .. }));
    assert!(hmc.calls().is_empty());
}

#[tokio::test]
async fn other_routes_and_notifications_are_ignored() {
    let ccd = Arc::new(FakeCcd::with_case(ready_to_list_case()));
    let hmc = Arc::new(FakeHmc::default());
    let service = service(&ccd, &hmc);

    let mut gaps = request(HearingState::CreateHearing, None);
    gaps.hearing_route = HearingRoute::Gaps;
    let outcome = service.process(&gaps).await.expect("ignored");
    assert!(matches!(outcome, HearingRequestOutcome::Skipped { .. }));

    let outcome = service
        .process(&request(HearingState::PartyNotified, None))
        .await
        .expect("ignored");
    assert!(matches!(outcome, HearingRequestOutcome::Skipped { .. }));

    assert!(hmc.calls().is_empty());
    assert!(ccd.submissions().is_empty());
}

#[tokio::test]
async fn platform_rejection_leaves_the_case_untouched() {
    let ccd = Arc::new(FakeCcd::with_case(ready_to_list_case()));
    let hmc = Arc::new(FakeHmc::rejecting(400));

    let error = service(&ccd, &hmc)
        .process(&request(HearingState::CreateHearing, None))
        .await
        .expect_err("rejected");

    assert!(matches!(
        error,
        HearingsError::Hmc(HmcError::ResponseStatus { status: 400, .. })
    ));
    assert!(ccd.submissions().is_empty());
}
