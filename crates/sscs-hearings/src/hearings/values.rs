//! `ServiceHearingValues`: the case as the hearings platform wants to see it
//! before a hearing is requested.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use super::ccd::CcdCaseService;
use super::domain::{CaseId, SscsCaseDetails};
use super::error::HearingsError;
use super::hmc::{
    CaseCategory, HearingChannel, HearingLocation, HearingPriority, HearingWindow,
    PanelRequirements, PartyDetails,
};
use super::mapping::{channels, map_parties, CaseFlags, CaseMapper};

/// Request body of both service endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHearingRequest {
    pub case_reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHearingValues {
    #[serde(rename = "hmctsServiceID")]
    pub hmcts_service_id: String,
    pub hmcts_internal_case_name: String,
    pub public_case_name: String,
    pub case_additional_security_flag: bool,
    pub case_categories: Vec<CaseCategory>,
    pub case_deep_link: String,
    pub case_restricted_flag: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_case_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_management_location_code: Option<String>,
    #[serde(rename = "caseSLAStartDate")]
    pub case_sla_start_date: NaiveDate,
    pub auto_list_flag: bool,
    pub hearing_type: String,
    pub hearing_window: HearingWindow,
    pub duration: u32,
    pub hearing_priority_type: HearingPriority,
    pub number_of_physical_attendees: u32,
    pub hearing_in_welsh_flag: bool,
    pub hearing_locations: Vec<HearingLocation>,
    pub case_interpreter_required_flag: bool,
    #[serde(default)]
    pub facilities_required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hearing_requester: Option<String>,
    pub private_hearing_required_flag: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_judge_contract_type: Option<String>,
    pub judiciary: PanelRequirements,
    pub hearing_is_linked_flag: bool,
    pub parties: Vec<PartyDetails>,
    pub case_flags: CaseFlags,
    pub hearing_channels: Vec<HearingChannel>,
}

impl ServiceHearingValues {
    /// Builds the values from the same mapping rules the hearing request
    /// uses, so both views of a case agree.
    pub fn build(mapper: &CaseMapper, case: &SscsCaseDetails) -> Result<Self, HearingsError> {
        let case_details = mapper.case_details(case)?;
        let hearing = mapper.hearing_details(&case.data);
        let parties = map_parties(&case.data, channels(&case.data).first().copied());
        let case_flags = mapper.case_flags(case, &parties);

        Ok(Self {
            hmcts_service_id: case_details.hmcts_service_code,
            hmcts_internal_case_name: case_details.hmcts_internal_case_name,
            public_case_name: case_details.public_case_name,
            case_additional_security_flag: case_details.case_additional_security_flag,
            case_categories: case_details.case_categories,
            case_deep_link: case_details.case_deep_link,
            case_restricted_flag: case_details.case_restricted_flag,
            external_case_reference: case_details.external_case_reference,
            case_management_location_code: case_details.case_management_location_code,
            case_sla_start_date: case_details.case_sla_start_date,
            auto_list_flag: hearing.auto_list_flag,
            hearing_type: hearing.hearing_type,
            hearing_window: hearing.hearing_window,
            duration: hearing.duration,
            hearing_priority_type: hearing.hearing_priority_type,
            number_of_physical_attendees: hearing.number_of_physical_attendees,
            hearing_in_welsh_flag: hearing.hearing_in_welsh_flag,
            hearing_locations: hearing.hearing_locations,
            case_interpreter_required_flag: case_details.case_interpreter_required_flag,
            facilities_required: hearing.facilities_required,
            listing_comments: hearing.listing_comments,
            hearing_requester: hearing.hearing_requester,
            private_hearing_required_flag: hearing.private_hearing_required_flag,
            lead_judge_contract_type: hearing.lead_judge_contract_type,
            judiciary: hearing.panel_requirements,
            hearing_is_linked_flag: hearing.hearing_is_linked_flag,
            parties: parties.into_iter().map(|party| party.details).collect(),
            case_flags,
            hearing_channels: hearing.hearing_channels,
        })
    }
}

/// Entry of the `/serviceLinkedCases` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLinkedCase {
    pub case_reference: String,
    pub case_name: String,
    #[serde(default)]
    pub reasons_for_link: Vec<String>,
}

/// Serves the hearings platform's read-only view of a case.
pub struct ServiceHearingValuesService<C> {
    ccd: Arc<C>,
    mapper: CaseMapper,
}

impl<C> ServiceHearingValuesService<C>
where
    C: CcdCaseService + 'static,
{
    pub fn new(ccd: Arc<C>, mapper: CaseMapper) -> Self {
        Self { ccd, mapper }
    }

    #[instrument(skip(self))]
    pub async fn values(
        &self,
        case_reference: &str,
    ) -> Result<ServiceHearingValues, HearingsError> {
        let case = self.fetch(CaseId::parse(case_reference)?).await?;
        ServiceHearingValues::build(&self.mapper, &case)
    }

    /// Cases linked to the given one. Links that no longer resolve to a case
    /// are left out.
    #[instrument(skip(self))]
    pub async fn linked_cases(
        &self,
        case_reference: &str,
    ) -> Result<Vec<ServiceLinkedCase>, HearingsError> {
        let case = self.fetch(CaseId::parse(case_reference)?).await?;

        let mut linked = Vec::new();
        for link in &case.data.linked_case {
            let Some(reference) = link.value.case_reference.as_deref() else {
                continue;
            };
            let linked_id = match CaseId::parse(reference) {
                Ok(id) => id,
                Err(error) => {
                    warn!(reference, %error, "skipping malformed case link");
                    continue;
                }
            };
            let linked_case = match self.fetch(linked_id).await {
                Ok(linked_case) => linked_case,
                Err(HearingsError::CaseNotFound(_)) => {
                    warn!(%linked_id, "linked case not found");
                    continue;
                }
                Err(error) => return Err(error),
            };

            linked.push(ServiceLinkedCase {
                case_reference: linked_id.to_string(),
                case_name: linked_case.data.appellant_full_name().unwrap_or_default(),
                reasons_for_link: link_reasons(&link.value.extra),
            });
        }
        Ok(linked)
    }

    async fn fetch(&self, case_id: CaseId) -> Result<SscsCaseDetails, HearingsError> {
        self.ccd
            .get_case(case_id)
            .await
            .map_err(|source| HearingsError::CaseFetch { case_id, source })?
            .ok_or(HearingsError::CaseNotFound(case_id))
    }
}

fn link_reasons(extra: &serde_json::Map<String, serde_json::Value>) -> Vec<String> {
    match extra.get("reason") {
        Some(serde_json::Value::String(reason)) if !reason.trim().is_empty() => {
            vec![reason.trim().to_string()]
        }
        _ => Vec::new(),
    }
}
