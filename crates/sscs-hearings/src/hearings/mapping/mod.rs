//! Case data to hearings platform mapping rules, shared by the outbound
//! hearing request and the service hearing values.

pub mod flags;
pub mod parties;

use chrono::{Duration, NaiveDate, Utc};

use super::domain::{CaseId, SscsCaseData, SscsCaseDetails, YesNo};
use super::error::HearingsError;
use super::hmc::{
    CaseCategory, CaseDetails, CategoryType, HearingChannel, HearingDetails, HearingLocation,
    HearingPriority, HearingWindow, PanelRequirements,
};
pub use flags::{CaseFlags, FlagCode, PartyFlag};
pub use parties::{map_parties, MappedParty};

pub const ORAL_HEARING_MINUTES: u32 = 60;
pub const PAPER_HEARING_MINUTES: u32 = 30;
pub const INTERPRETER_EXTRA_MINUTES: u32 = 30;
pub const STANDARD_WINDOW_DAYS: i64 = 28;
pub const URGENT_WINDOW_DAYS: i64 = 14;

/// Mapping context: the service's identity on the platform plus where case
/// deep links point.
#[derive(Debug, Clone)]
pub struct CaseMapper {
    service_code: String,
    exui_url: String,
}

impl CaseMapper {
    pub fn new(service_code: impl Into<String>, exui_url: impl Into<String>) -> Self {
        Self {
            service_code: service_code.into(),
            exui_url: exui_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn service_code(&self) -> &str {
        &self.service_code
    }

    pub fn case_deep_link(&self, case_id: CaseId) -> String {
        format!("{}/cases/case-details/{case_id}", self.exui_url)
    }

    pub fn hearing_type(&self) -> String {
        format!("{}-SUB", self.service_code)
    }

    /// `{service}-{benefit}` case type plus `{service}-{benefit}{issue}`
    /// sub-type.
    pub fn case_categories(
        &self,
        case: &SscsCaseDetails,
    ) -> Result<Vec<CaseCategory>, HearingsError> {
        let benefit = non_blank(case.data.benefit_code.as_deref()).ok_or(
            HearingsError::IncompleteCase {
                case_id: case.id,
                field: "benefitCode",
            },
        )?;
        let case_type = format!("{}-{benefit}", self.service_code);

        let mut categories = vec![CaseCategory {
            category_type: CategoryType::CaseType,
            category_value: case_type.clone(),
            category_parent: None,
        }];
        if let Some(issue) = non_blank(case.data.issue_code.as_deref()) {
            categories.push(CaseCategory {
                category_type: CategoryType::CaseSubType,
                category_value: format!("{case_type}{issue}"),
                category_parent: Some(case_type),
            });
        }
        Ok(categories)
    }

    pub fn internal_case_name(&self, case: &SscsCaseDetails) -> Result<String, HearingsError> {
        case.data
            .appellant_full_name()
            .ok_or(HearingsError::IncompleteCase {
                case_id: case.id,
                field: "appellant name",
            })
    }

    /// `caseDetails` block of the hearing request.
    pub fn case_details(&self, case: &SscsCaseDetails) -> Result<CaseDetails, HearingsError> {
        let data = &case.data;
        Ok(CaseDetails {
            hmcts_service_code: self.service_code.clone(),
            case_ref: case.id.to_string(),
            external_case_reference: external_case_reference(data),
            case_deep_link: self.case_deep_link(case.id),
            hmcts_internal_case_name: self.internal_case_name(case)?,
            public_case_name: public_case_name(),
            case_additional_security_flag: additional_security(data),
            case_interpreter_required_flag: interpreter_required(data),
            case_categories: self.case_categories(case)?,
            case_management_location_code: case_management_location_code(data),
            case_restricted_flag: false,
            case_sla_start_date: sla_start_date(data),
        })
    }

    /// `hearingDetails` block of the hearing request.
    pub fn hearing_details(&self, data: &SscsCaseData) -> HearingDetails {
        HearingDetails {
            auto_list_flag: false,
            hearing_type: self.hearing_type(),
            hearing_window: hearing_window(data),
            duration: duration(data),
            non_standard_hearing_duration_reasons: Vec::new(),
            hearing_priority_type: priority(data),
            number_of_physical_attendees: 0,
            hearing_in_welsh_flag: welsh(data),
            hearing_locations: hearing_locations(data),
            facilities_required: Vec::new(),
            listing_comments: listing_comments(data),
            hearing_requester: None,
            private_hearing_required_flag: false,
            lead_judge_contract_type: None,
            panel_requirements: PanelRequirements::default(),
            hearing_is_linked_flag: !data.linked_case.is_empty(),
            amend_reason_codes: Vec::new(),
            hearing_channels: channels(data),
        }
    }

    /// Flags raised by the case and by each party, with the amend link
    /// pointing back at the case.
    pub fn case_flags(&self, case: &SscsCaseDetails, parties: &[MappedParty]) -> CaseFlags {
        let appellant_name = case.data.appellant_full_name();
        let mut flags: Vec<PartyFlag> = flags::case_level_flags(&case.data)
            .into_iter()
            .map(|flag| PartyFlag::new(flag, None, appellant_name.as_deref()))
            .collect();
        flags.extend(parties.iter().flat_map(MappedParty::party_flags));

        CaseFlags {
            flags,
            flag_amend_url: self.case_deep_link(case.id),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn external_case_reference(data: &SscsCaseData) -> Option<String> {
    data.extra
        .get("caseReference")
        .and_then(|value| value.as_str())
        .map(str::to_string)
}

fn public_case_name() -> String {
    "Appellant".to_string()
}

fn additional_security(data: &SscsCaseData) -> bool {
    YesNo::is_yes(data.dwp_ucb)
}

pub fn interpreter_required(data: &SscsCaseData) -> bool {
    data.hearing_options()
        .is_some_and(|options| options.needs_interpreter())
        || data.other_parties.iter().any(|party| {
            party
                .value
                .hearing_options
                .as_ref()
                .is_some_and(|options| options.needs_interpreter())
        })
}

fn case_management_location_code(data: &SscsCaseData) -> Option<String> {
    data.case_management_location
        .as_ref()
        .and_then(|location| location.base_location.clone())
}

fn sla_start_date(data: &SscsCaseData) -> NaiveDate {
    data.case_created()
        .or_else(|| data.dwp_response_date())
        .unwrap_or_else(|| Utc::now().date_naive())
}

/// Override when set, otherwise 60 minutes oral or 30 paper, plus 30 when
/// an interpreter is needed.
pub fn duration(data: &SscsCaseData) -> u32 {
    if let Some(minutes) = data.duration_override().filter(|minutes| *minutes > 0) {
        return minutes;
    }
    let is_paper = data.appeal.as_ref().is_some_and(|appeal| appeal.is_paper());
    let base = if is_paper {
        PAPER_HEARING_MINUTES
    } else {
        ORAL_HEARING_MINUTES
    };
    if interpreter_required(data) {
        base + INTERPRETER_EXTRA_MINUTES
    } else {
        base
    }
}

pub fn priority(data: &SscsCaseData) -> HearingPriority {
    if data.is_urgent() {
        HearingPriority::Urgent
    } else {
        HearingPriority::Standard
    }
}

/// Starts 28 days after the DWP response (14 when urgent); open-ended when
/// DWP has not responded yet.
pub fn hearing_window(data: &SscsCaseData) -> HearingWindow {
    let offset = if data.is_urgent() {
        URGENT_WINDOW_DAYS
    } else {
        STANDARD_WINDOW_DAYS
    };
    HearingWindow {
        date_range_start: data
            .dwp_response_date()
            .map(|responded| responded + Duration::days(offset)),
        date_range_end: None,
        first_date_time_must_be: None,
    }
}

/// Channels the appellant asked for. Paper appeals are `ONPPRS`; an oral
/// appeal with no stated preference defaults to face to face.
pub fn channels(data: &SscsCaseData) -> Vec<HearingChannel> {
    let Some(appeal) = data.appeal.as_ref() else {
        return vec![HearingChannel::FaceToFace];
    };
    if appeal.is_paper() {
        return vec![HearingChannel::Paper];
    }

    let mut channels = Vec::new();
    if let Some(subtype) = &appeal.hearing_subtype {
        if YesNo::is_yes(subtype.wants_hearing_type_face_to_face) {
            channels.push(HearingChannel::FaceToFace);
        }
        if YesNo::is_yes(subtype.wants_hearing_type_video) {
            channels.push(HearingChannel::Video);
        }
        if YesNo::is_yes(subtype.wants_hearing_type_telephone) {
            channels.push(HearingChannel::Telephone);
        }
    }
    if channels.is_empty() {
        channels.push(HearingChannel::FaceToFace);
    }
    channels
}

pub fn welsh(data: &SscsCaseData) -> bool {
    YesNo::is_yes(data.language_preference_welsh)
}

pub fn hearing_locations(data: &SscsCaseData) -> Vec<HearingLocation> {
    case_management_location_code(data)
        .map(HearingLocation::court)
        .into_iter()
        .collect()
}

fn listing_comments(data: &SscsCaseData) -> Option<String> {
    data.hearing_options()
        .and_then(|options| non_blank(options.other.as_deref()))
        .map(str::to_string)
}
