use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::warn;

use super::error::HearingsError;
use super::status::HmcStatus;

/// Numeric CCD case reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CaseId(pub i64);

impl CaseId {
    /// Parses an externally supplied case reference, tolerating the
    /// dash-grouped form (`1234-5678-9012-3456`) shown in case-worker UIs.
    pub fn parse(raw: &str) -> Result<Self, HearingsError> {
        let digits: String = raw.trim().chars().filter(|c| *c != '-').collect();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(HearingsError::InvalidCaseId(raw.to_string()));
        }
        match digits.parse::<i64>() {
            Ok(value) if value > 0 => Ok(Self(value)),
            _ => Err(HearingsError::InvalidCaseId(raw.to_string())),
        }
    }
}

/// CCD returns the reference as a number on some endpoints and a string on
/// others.
impl<'de> Deserialize<'de> for CaseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(number) => number
                .as_i64()
                .filter(|value| *value > 0)
                .map(Self)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid case id {number}"))),
            Value::String(raw) => Self::parse(&raw).map_err(serde::de::Error::custom),
            other => Err(serde::de::Error::custom(format!(
                "expected case id, found {other}"
            ))),
        }
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hearing identifier issued by the hearings platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct HearingId(pub String);

impl<'de> Deserialize<'de> for HearingId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(raw) => Ok(Self(raw.trim().to_string())),
            Value::Number(number) => Ok(Self(number.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "expected hearing id, found {other}"
            ))),
        }
    }
}

impl fmt::Display for HearingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Case states this service reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseState {
    ReadyToList,
    Hearing,
    DormantAppealState,
    HandlingError,
    /// Sentinel meaning "leave the case state alone".
    Unknown,
}

impl CaseState {
    pub const fn ccd_id(self) -> Option<&'static str> {
        match self {
            Self::ReadyToList => Some("readyToList"),
            Self::Hearing => Some("hearing"),
            Self::DormantAppealState => Some("dormantAppealState"),
            Self::HandlingError => Some("handlingError"),
            Self::Unknown => None,
        }
    }

    pub fn from_ccd(value: &str) -> Self {
        match value {
            "readyToList" => Self::ReadyToList,
            "hearing" => Self::Hearing,
            "dormantAppealState" => Self::DormantAppealState,
            "handlingError" => Self::HandlingError,
            _ => Self::Unknown,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ReadyToList => "Ready to list",
            Self::Hearing => "Hearing",
            Self::DormantAppealState => "Dormant",
            Self::HandlingError => "Handling error",
            Self::Unknown => "Unknown",
        }
    }
}

/// CCD's boolean representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    #[serde(alias = "YES", alias = "yes")]
    Yes,
    #[serde(alias = "NO", alias = "no")]
    No,
}

impl YesNo {
    pub fn is_yes(value: Option<Self>) -> bool {
        matches!(value, Some(Self::Yes))
    }
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value {
            Self::Yes
        } else {
            Self::No
        }
    }
}

/// Entry of a CCD complex collection (`[{id, value}]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionItem<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub value: T,
}

impl<T> CollectionItem<T> {
    pub fn new(value: T) -> Self {
        Self { id: None, value }
    }
}

/// Case aggregate as returned by CCD. Only `state` and a handful of data
/// fields are written back; everything else travels untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SscsCaseDetails {
    pub id: CaseId,
    pub state: String,
    pub data: SscsCaseData,
}

impl SscsCaseDetails {
    pub fn case_state(&self) -> CaseState {
        CaseState::from_ccd(&self.state)
    }

    /// Applies a resolved state. `Unknown` leaves the case untouched and
    /// returns `false`.
    pub fn apply_state(&mut self, state: CaseState) -> bool {
        match state.ccd_id() {
            Some(id) => {
                self.state = id.to_string();
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SscsCaseData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ccd_case_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appeal: Option<Appeal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefit_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_management_location: Option<CaseManagementLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgent_case: Option<YesNo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_preference_welsh: Option<YesNo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dwp_ucb: Option<YesNo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dwp_response_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_created: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other_parties: Vec<CollectionItem<OtherParty>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linked_case: Vec<CollectionItem<CaseLink>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduling_and_listing_fields: Option<SchedulingAndListingFields>,
    #[serde(default, skip_serializing_if = "CaseHearings::is_empty")]
    pub hearings: CaseHearings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SscsCaseData {
    pub fn appellant(&self) -> Option<&Appellant> {
        self.appeal.as_ref().and_then(|appeal| appeal.appellant.as_ref())
    }

    pub fn hearing_options(&self) -> Option<&HearingOptions> {
        self.appeal
            .as_ref()
            .and_then(|appeal| appeal.hearing_options.as_ref())
    }

    pub fn appellant_full_name(&self) -> Option<String> {
        self.appellant()
            .and_then(|appellant| appellant.name.as_ref())
            .map(Name::full_name)
            .filter(|name| !name.is_empty())
    }

    pub fn is_urgent(&self) -> bool {
        YesNo::is_yes(self.urgent_case)
    }

    pub fn dwp_response_date(&self) -> Option<NaiveDate> {
        parse_ccd_date(self.dwp_response_date.as_deref())
    }

    pub fn case_created(&self) -> Option<NaiveDate> {
        parse_ccd_date(self.case_created.as_deref())
    }

    pub fn hearing_route(&self) -> Option<&str> {
        self.scheduling_and_listing_fields
            .as_ref()
            .and_then(|fields| fields.hearing_route.as_deref())
    }

    pub fn duration_override(&self) -> Option<u32> {
        self.scheduling_and_listing_fields
            .as_ref()
            .and_then(|fields| fields.override_fields.as_ref())
            .and_then(|fields| fields.duration)
    }
}

fn parse_ccd_date(value: Option<&str>) -> Option<NaiveDate> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appeal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefit_type: Option<BenefitType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appellant: Option<Appellant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rep: Option<Representative>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hearing_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hearing_options: Option<HearingOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hearing_subtype: Option<HearingSubtype>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Appeal {
    pub fn is_paper(&self) -> bool {
        self.hearing_type
            .as_deref()
            .is_some_and(|kind| kind.eq_ignore_ascii_case("paper"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Name {
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appellant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_appointee: Option<YesNo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointee: Option<Appointee>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Representative {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_representative: Option<YesNo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherParty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hearing_options: Option<HearingOptions>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wants_to_attend: Option<YesNo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_interpreter: Option<YesNo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_language_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arrangements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_dates: Vec<CollectionItem<DateRange>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HearingOptions {
    pub fn needs_interpreter(&self) -> bool {
        YesNo::is_yes(self.language_interpreter)
            || self
                .sign_language_type
                .as_deref()
                .is_some_and(|kind| !kind.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingSubtype {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wants_hearing_type_telephone: Option<YesNo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wants_hearing_type_video: Option<YesNo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wants_hearing_type_face_to_face: Option<YesNo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_reference: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseManagementLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingAndListingFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hearing_route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_fields: Option<OverrideFields>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Venue as stored against a hearing on the case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseVenue {
    pub name: String,
    pub address: CaseAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_map_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
}

/// One hearing recorded on the case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredCaseHearing", into = "StoredCaseHearing")]
pub struct CaseHearing {
    pub hearing_id: HearingId,
    pub version_number: Option<i64>,
    pub hearing_status: Option<HmcStatus>,
    /// Status exactly as read from CCD. Written back while it still parses
    /// to `hearing_status`, so labels this service does not know survive.
    pub stored_status: Option<String>,
    /// Key of the CCD collection item holding this hearing.
    pub collection_id: Option<String>,
    pub hearing_requested: Option<NaiveDateTime>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub epims_id: Option<String>,
    pub venue: Option<CaseVenue>,
    pub extra: Map<String, Value>,
}

/// Wire shape of a [`CaseHearing`] inside the CCD collection item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCaseHearing {
    #[serde(default = "unkeyed_hearing")]
    hearing_id: HearingId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hearing_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hearing_requested: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    epims_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    venue: Option<CaseVenue>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn unkeyed_hearing() -> HearingId {
    HearingId(String::new())
}

impl From<StoredCaseHearing> for CaseHearing {
    fn from(stored: StoredCaseHearing) -> Self {
        Self {
            hearing_id: stored.hearing_id,
            version_number: stored.version_number,
            hearing_status: stored.hearing_status.as_deref().map(HmcStatus::from_label),
            stored_status: stored.hearing_status,
            collection_id: None,
            hearing_requested: stored.hearing_requested,
            start: stored.start,
            end: stored.end,
            epims_id: stored.epims_id,
            venue: stored.venue,
            extra: stored.extra,
        }
    }
}

impl From<CaseHearing> for StoredCaseHearing {
    fn from(hearing: CaseHearing) -> Self {
        let hearing_status = match (hearing.hearing_status, hearing.stored_status) {
            (Some(status), Some(stored)) if HmcStatus::from_label(&stored) == status => {
                Some(stored)
            }
            (status, _) => status.map(|status| status.code().to_string()),
        };
        Self {
            hearing_id: hearing.hearing_id,
            version_number: hearing.version_number,
            hearing_status,
            hearing_requested: hearing.hearing_requested,
            start: hearing.start,
            end: hearing.end,
            epims_id: hearing.epims_id,
            venue: hearing.venue,
            extra: hearing.extra,
        }
    }
}

impl CaseHearing {
    pub fn new(hearing_id: HearingId) -> Self {
        Self {
            hearing_id,
            version_number: None,
            hearing_status: None,
            stored_status: None,
            collection_id: None,
            hearing_requested: None,
            start: None,
            end: None,
            epims_id: None,
            venue: None,
            extra: Map::new(),
        }
    }

    /// A hearing that still occupies the case's listing slot.
    pub fn is_active(&self) -> bool {
        !matches!(
            self.hearing_status,
            Some(
                HmcStatus::CancellationRequested
                    | HmcStatus::CancellationSubmitted
                    | HmcStatus::Cancelled
                    | HmcStatus::Completed
                    | HmcStatus::Adjourned
                    | HmcStatus::Closed
            )
        )
    }
}

/// The case's hearings, keyed by hearing id.
///
/// CCD stores them as a `[{id, value}]` collection; on read, duplicate ids
/// collapse to the last entry so every write carries one entry per hearing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseHearings(BTreeMap<HearingId, CaseHearing>);

impl CaseHearings {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, id: &HearingId) -> Option<&CaseHearing> {
        self.0.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CaseHearing> {
        self.0.values()
    }

    /// Inserts or replaces the entry for the hearing's id, returning the
    /// previous entry. A replacement keeps the previous collection key.
    pub fn upsert(&mut self, mut hearing: CaseHearing) -> Option<CaseHearing> {
        if hearing.collection_id.is_none() {
            hearing.collection_id = self
                .0
                .get(&hearing.hearing_id)
                .and_then(|previous| previous.collection_id.clone());
        }
        self.0.insert(hearing.hearing_id.clone(), hearing)
    }

    /// Returns the entry for `id`, creating an empty one if needed.
    pub fn entry(&mut self, id: &HearingId) -> &mut CaseHearing {
        self.0
            .entry(id.clone())
            .or_insert_with(|| CaseHearing::new(id.clone()))
    }

    /// Most recently requested hearing that has not been cancelled or closed.
    pub fn latest_active(&self) -> Option<&CaseHearing> {
        self.0
            .values()
            .filter(|hearing| hearing.is_active())
            .max_by(|left, right| {
                left.hearing_requested
                    .cmp(&right.hearing_requested)
                    .then_with(|| left.hearing_id.cmp(&right.hearing_id))
            })
    }
}

impl FromIterator<CaseHearing> for CaseHearings {
    fn from_iter<I: IntoIterator<Item = CaseHearing>>(iter: I) -> Self {
        let mut hearings = Self::default();
        for hearing in iter {
            hearings.upsert(hearing);
        }
        hearings
    }
}

impl Serialize for CaseHearings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.values().map(|hearing| CollectionItem {
            id: Some(
                hearing
                    .collection_id
                    .clone()
                    .unwrap_or_else(|| hearing.hearing_id.0.clone()),
            ),
            value: hearing,
        }))
    }
}

impl<'de> Deserialize<'de> for CaseHearings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Option::<Vec<CollectionItem<CaseHearing>>>::deserialize(deserializer)?;
        let mut hearings = Self::default();
        for CollectionItem { id, mut value } in items.unwrap_or_default() {
            let id = id.filter(|id| !id.is_empty());
            value.collection_id = id.clone();
            if value.hearing_id.0.is_empty() {
                match id {
                    Some(id) => value.hearing_id = HearingId(id),
                    None => {
                        warn!("dropping case hearing entry without an id");
                        continue;
                    }
                }
            }
            hearings.upsert(value);
        }
        Ok(hearings)
    }
}
