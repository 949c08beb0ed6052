//! Constant lookup tables translating the hearings platform's lifecycle
//! vocabulary into case actions.
//!
//! Every parser here is total: labels the tables do not know map to an
//! `Unknown` sentinel (or `None` for cancellation reasons) instead of an error.

mod cancellation;
mod hmc;
mod listing;

pub use cancellation::CancellationReason;
pub use hmc::{CcdEvent, EventType, HmcStatus};
pub use listing::{ListAssistCaseStatus, ListingStatus};

/// Case-insensitive key ignoring separators, so `AWAITING_LISTING`,
/// `Awaiting Listing` and `awaiting-listing` share one entry.
pub(crate) fn lookup_key(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
