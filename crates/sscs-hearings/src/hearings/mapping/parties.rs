use chrono::NaiveDate;

use super::flags::{party_flags, FlagCode, PartyFlag};
use crate::hearings::domain::{Contact, HearingOptions, Name, SscsCaseData, YesNo};
use crate::hearings::hmc::{
    HearingChannel, IndividualDetails, OrganisationDetails, PartyDetails, PartyType,
    UnavailabilityRange,
};

pub const APPELLANT_ROLE: &str = "APEL";
pub const APPOINTEE_ROLE: &str = "APIN";
pub const REPRESENTATIVE_ROLE: &str = "RPTT";
pub const OTHER_PARTY_ROLE: &str = "OTPA";
pub const RESPONDENT_ROLE: &str = "RESP";

const DWP_PARTY_ID: &str = "DWP";
const DWP_NAME: &str = "Department for Work and Pensions";

/// A party as mapped from the case, with the flags its hearing options
/// raise.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedParty {
    pub details: PartyDetails,
    pub flags: Vec<FlagCode>,
}

impl MappedParty {
    pub fn party_flags(&self) -> Vec<PartyFlag> {
        let name = self.display_name();
        self.flags
            .iter()
            .map(|flag| PartyFlag::new(*flag, Some(&self.details.party_id), name.as_deref()))
            .collect()
    }

    fn display_name(&self) -> Option<String> {
        if let Some(individual) = &self.details.individual_details {
            let name = format!("{} {}", individual.first_name, individual.last_name);
            return Some(name.trim().to_string()).filter(|name| !name.is_empty());
        }
        self.details
            .organisation_details
            .as_ref()
            .map(|organisation| organisation.name.clone())
    }
}

/// Maps every hearing party on the case: appellant (or their appointee),
/// representative, other parties and the DWP respondent.
pub fn map_parties(data: &SscsCaseData, channel: Option<HearingChannel>) -> Vec<MappedParty> {
    let mut parties = Vec::new();
    let options = data.hearing_options();

    if let Some(appellant) = data.appellant() {
        parties.push(individual_party(
            appellant.id.as_deref().unwrap_or("1"),
            APPELLANT_ROLE,
            appellant.name.as_ref(),
            appellant.contact.as_ref(),
            options,
            channel,
        ));

        let appointee = appellant
            .appointee
            .as_ref()
            .filter(|_| YesNo::is_yes(appellant.is_appointee));
        if let Some(appointee) = appointee {
            parties.push(individual_party(
                appointee.id.as_deref().unwrap_or("2"),
                APPOINTEE_ROLE,
                appointee.name.as_ref(),
                appointee.contact.as_ref(),
                None,
                channel,
            ));
        }
    }

    let representative = data
        .appeal
        .as_ref()
        .and_then(|appeal| appeal.rep.as_ref())
        .filter(|rep| YesNo::is_yes(rep.has_representative));
    if let Some(rep) = representative {
        let party_id = rep.id.as_deref().unwrap_or("3");
        let named = rep
            .name
            .as_ref()
            .is_some_and(|name| !name.full_name().is_empty());
        if named {
            parties.push(individual_party(
                party_id,
                REPRESENTATIVE_ROLE,
                rep.name.as_ref(),
                rep.contact.as_ref(),
                None,
                channel,
            ));
        } else if let Some(organisation) = rep.organisation.as_deref() {
            parties.push(organisation_party(
                party_id,
                REPRESENTATIVE_ROLE,
                organisation,
                "REP",
            ));
        }
    }

    for (index, other) in data.other_parties.iter().enumerate() {
        let fallback_id = format!("OTPA-{}", index + 1);
        let party_id = other
            .value
            .id
            .as_deref()
            .or(other.id.as_deref())
            .unwrap_or(&fallback_id);
        parties.push(individual_party(
            party_id,
            OTHER_PARTY_ROLE,
            other.value.name.as_ref(),
            None,
            other.value.hearing_options.as_ref(),
            channel,
        ));
    }

    parties.push(organisation_party(
        DWP_PARTY_ID,
        RESPONDENT_ROLE,
        DWP_NAME,
        "ORG",
    ));
    parties
}

fn individual_party(
    party_id: &str,
    role: &str,
    name: Option<&Name>,
    contact: Option<&Contact>,
    options: Option<&HearingOptions>,
    channel: Option<HearingChannel>,
) -> MappedParty {
    let flags = options.map(party_flags).unwrap_or_default();
    let interpreter_language = options.and_then(|options| {
        let sign = non_blank(options.sign_language_type.as_deref());
        let spoken = non_blank(options.languages.as_deref())
            .filter(|_| YesNo::is_yes(options.language_interpreter));
        sign.or(spoken).map(str::to_string)
    });

    let details = PartyDetails {
        party_id: party_id.to_string(),
        party_type: PartyType::Individual,
        party_role: role.to_string(),
        individual_details: Some(IndividualDetails {
            title: name.and_then(|name| name.title.clone()),
            first_name: name
                .and_then(|name| name.first_name.clone())
                .unwrap_or_default(),
            last_name: name
                .and_then(|name| name.last_name.clone())
                .unwrap_or_default(),
            preferred_hearing_channel: channel,
            interpreter_language,
            reasonable_adjustments: flags.iter().map(|flag| flag.id.to_string()).collect(),
            vulnerable_flag: false,
            hearing_channel_email: contact
                .and_then(|contact| contact.email.clone())
                .into_iter()
                .collect(),
            hearing_channel_phone: contact
                .and_then(|contact| contact.mobile.clone().or_else(|| contact.phone.clone()))
                .into_iter()
                .collect(),
        }),
        organisation_details: None,
        unavailability_ranges: options.map(unavailability).unwrap_or_default(),
    };

    MappedParty { details, flags }
}

fn organisation_party(
    party_id: &str,
    role: &str,
    name: &str,
    organisation_type: &str,
) -> MappedParty {
    MappedParty {
        details: PartyDetails {
            party_id: party_id.to_string(),
            party_type: PartyType::Organisation,
            party_role: role.to_string(),
            individual_details: None,
            organisation_details: Some(OrganisationDetails {
                name: name.to_string(),
                organisation_type: organisation_type.to_string(),
                cft_organisation_id: None,
            }),
            unavailability_ranges: Vec::new(),
        },
        flags: Vec::new(),
    }
}

/// Excluded dates become all-day unavailability. A range without an end is
/// a single day; unparseable entries are skipped.
fn unavailability(options: &HearingOptions) -> Vec<UnavailabilityRange> {
    options
        .exclude_dates
        .iter()
        .filter_map(|item| {
            let start = parse_date(item.value.start.as_deref())?;
            let end = parse_date(item.value.end.as_deref()).unwrap_or(start);
            Some(UnavailabilityRange {
                unavailable_from_date: start,
                unavailable_to_date: end.max(start),
                unavailability_type: "All Day".to_string(),
            })
        })
        .collect()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value?.trim(), "%Y-%m-%d").ok()
}
