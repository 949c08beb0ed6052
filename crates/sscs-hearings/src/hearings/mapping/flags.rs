use serde::{Deserialize, Serialize};

use crate::hearings::domain::{HearingOptions, SscsCaseData, YesNo};

/// Reference-data flag raised against a party or the case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagCode {
    pub id: &'static str,
    pub parent_id: &'static str,
    pub description: &'static str,
}

const REASONABLE_ADJUSTMENT: &str = "RA0001";
const PARTY_FLAG: &str = "PF0001";
const CASE_FLAG: &str = "CF0001";

pub const SIGN_LANGUAGE_INTERPRETER: FlagCode = FlagCode {
    id: "RA0042",
    parent_id: REASONABLE_ADJUSTMENT,
    description: "Sign Language Interpreter",
};
pub const HEARING_LOOP: FlagCode = FlagCode {
    id: "RA0043",
    parent_id: REASONABLE_ADJUSTMENT,
    description: "Hearing loop (hearing enhancement system)",
};
pub const STEP_FREE_ACCESS: FlagCode = FlagCode {
    id: "RA0019",
    parent_id: REASONABLE_ADJUSTMENT,
    description: "Step free / wheelchair access",
};
pub const LANGUAGE_INTERPRETER: FlagCode = FlagCode {
    id: "PF0015",
    parent_id: PARTY_FLAG,
    description: "Language Interpreter",
};
pub const UNACCEPTABLE_CUSTOMER_BEHAVIOUR: FlagCode = FlagCode {
    id: "PF0007",
    parent_id: PARTY_FLAG,
    description: "Unacceptable/disruptive customer behaviour",
};
pub const URGENT_CASE: FlagCode = FlagCode {
    id: "CF0007",
    parent_id: CASE_FLAG,
    description: "Urgent flag",
};

/// Hearing arrangement values recorded on the appeal, mapped to flags.
const ARRANGEMENT_FLAGS: &[(&str, FlagCode)] = &[
    ("signLanguageInterpreter", SIGN_LANGUAGE_INTERPRETER),
    ("hearingLoop", HEARING_LOOP),
    ("disabledAccess", STEP_FREE_ACCESS),
];

/// Flags a party's hearing options call for, in table order.
pub fn party_flags(options: &HearingOptions) -> Vec<FlagCode> {
    let mut flags: Vec<FlagCode> = ARRANGEMENT_FLAGS
        .iter()
        .filter(|(arrangement, _)| {
            options
                .arrangements
                .iter()
                .any(|value| value.eq_ignore_ascii_case(arrangement))
        })
        .map(|(_, flag)| *flag)
        .collect();

    let wants_sign_language = options
        .sign_language_type
        .as_deref()
        .is_some_and(|kind| !kind.trim().is_empty());
    if wants_sign_language && !flags.contains(&SIGN_LANGUAGE_INTERPRETER) {
        flags.insert(0, SIGN_LANGUAGE_INTERPRETER);
    }
    if YesNo::is_yes(options.language_interpreter) {
        flags.push(LANGUAGE_INTERPRETER);
    }
    flags
}

/// Case-level flags.
pub fn case_level_flags(data: &SscsCaseData) -> Vec<FlagCode> {
    let mut flags = Vec::new();
    if data.is_urgent() {
        flags.push(URGENT_CASE);
    }
    if YesNo::is_yes(data.dwp_ucb) {
        flags.push(UNACCEPTABLE_CUSTOMER_BEHAVIOUR);
    }
    flags
}

/// `caseFlags` block of the service hearing values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseFlags {
    pub flags: Vec<PartyFlag>,
    #[serde(rename = "flagAmendURL")]
    pub flag_amend_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyFlag {
    #[serde(rename = "partyID", default, skip_serializing_if = "Option::is_none")]
    pub party_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_name: Option<String>,
    pub flag_parent_id: String,
    pub flag_id: String,
    pub flag_description: String,
}

impl PartyFlag {
    pub fn new(flag: FlagCode, party_id: Option<&str>, party_name: Option<&str>) -> Self {
        Self {
            party_id: party_id.map(str::to_string),
            party_name: party_name.map(str::to_string),
            flag_parent_id: flag.parent_id.to_string(),
            flag_id: flag.id.to_string(),
            flag_description: flag.description.to_string(),
        }
    }
}
