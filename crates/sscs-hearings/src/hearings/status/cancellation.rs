use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Serialize;

use super::lookup_key;
use crate::hearings::domain::CaseState;

/// List Assist cancellation reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CancellationReason {
    #[serde(rename = "withdraw")]
    Withdrawn,
    #[serde(rename = "struck")]
    StruckOut,
    #[serde(rename = "lapsed")]
    Lapsed,
    #[serde(rename = "unable")]
    PartyUnableToAttend,
    #[serde(rename = "exclusion")]
    Exclusion,
    #[serde(rename = "incompletetribunal")]
    IncompleteTribunal,
    #[serde(rename = "listerr")]
    ListedInError,
    #[serde(rename = "notready")]
    NotReadyToList,
    #[serde(rename = "notatt")]
    PartyDidNotAttend,
    #[serde(rename = "other")]
    Other,
}

static REASON_TABLE: OnceLock<HashMap<String, CancellationReason>> = OnceLock::new();

fn reason_table() -> &'static HashMap<String, CancellationReason> {
    REASON_TABLE.get_or_init(|| {
        use CancellationReason::*;

        const CODE_OR_LABEL: &[(&str, CancellationReason)] = &[
            ("withdraw", Withdrawn),
            ("Withdrawn", Withdrawn),
            ("struck", StruckOut),
            ("Struck Out", StruckOut),
            ("lapsed", Lapsed),
            ("unable", PartyUnableToAttend),
            ("Party unable to attend", PartyUnableToAttend),
            ("exclusion", Exclusion),
            ("incompletetribunal", IncompleteTribunal),
            ("Incomplete Tribunal", IncompleteTribunal),
            ("listerr", ListedInError),
            ("Listed in error", ListedInError),
            ("notready", NotReadyToList),
            ("Not ready to list", NotReadyToList),
            ("notatt", PartyDidNotAttend),
            ("Party did not attend", PartyDidNotAttend),
            ("other", Other),
        ];

        let mut map = HashMap::with_capacity(CODE_OR_LABEL.len());
        for (raw, reason) in CODE_OR_LABEL {
            map.insert(lookup_key(raw), *reason);
        }
        map
    })
}

impl CancellationReason {
    /// Resolves either the platform code (`withdraw`) or its label
    /// (`Withdrawn`); unknown reasons yield `None`.
    pub fn from_code(value: &str) -> Option<Self> {
        reason_table().get(&lookup_key(value)).copied()
    }

    /// Code the hearings platform expects in `cancellationReasonCodes`.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Withdrawn => "withdraw",
            Self::StruckOut => "struck",
            Self::Lapsed => "lapsed",
            Self::PartyUnableToAttend => "unable",
            Self::Exclusion => "exclusion",
            Self::IncompleteTribunal => "incompletetribunal",
            Self::ListedInError => "listerr",
            Self::NotReadyToList => "notready",
            Self::PartyDidNotAttend => "notatt",
            Self::Other => "other",
        }
    }

    /// State a case moves to once its hearing is cancelled for this reason.
    pub const fn case_state(self) -> CaseState {
        match self {
            Self::Withdrawn | Self::StruckOut | Self::Lapsed => CaseState::DormantAppealState,
            _ => CaseState::ReadyToList,
        }
    }

    /// Cancellation outcome for a raw reason; unknown reasons leave the case
    /// alone.
    pub fn resolve_state(raw: &str) -> CaseState {
        Self::from_code(raw)
            .map(Self::case_state)
            .unwrap_or(CaseState::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_reasons_make_the_appeal_dormant() {
        for raw in ["Withdrawn", "withdraw", "struckOut", "Struck Out", "Lapsed"] {
            assert_eq!(
                CancellationReason::resolve_state(raw),
                CaseState::DormantAppealState,
                "{raw}"
            );
        }
    }

    #[test]
    fn other_recognised_reasons_return_to_ready_to_list() {
        assert_eq!(
            CancellationReason::resolve_state("listerr"),
            CaseState::ReadyToList
        );
        assert_eq!(
            CancellationReason::resolve_state("Party unable to attend"),
            CaseState::ReadyToList
        );
    }

    #[test]
    fn unrecognised_reasons_are_unknown() {
        assert_eq!(CancellationReason::from_code("judge-on-holiday"), None);
        assert_eq!(
            CancellationReason::resolve_state("judge-on-holiday"),
            CaseState::Unknown
        );
    }
}
