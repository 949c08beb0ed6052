use clap::Args;
use sscs_hearings::error::AppError;
use sscs_hearings::hearings::reconcile::{resolve, HearingSnapshot, Resolution, Transition};
use sscs_hearings::hearings::{HmcMessage, VenueDirectory};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct InspectArgs {
    /// Hearing notification as published on the platform topic (JSON)
    #[arg(long)]
    pub(crate) file: PathBuf,
    /// Cancellation reason code to assume, as if read from the platform
    #[arg(long)]
    pub(crate) cancellation_reason: Option<String>,
    /// Venue reference CSV (defaults to the embedded list)
    #[arg(long)]
    pub(crate) venues: Option<PathBuf>,
}

pub(crate) fn run_inspect(args: InspectArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.file)?;
    let message: HmcMessage = serde_json::from_str(&raw)?;
    let venues = VenueDirectory::load(args.venues.as_deref())?;

    let mut snapshot = HearingSnapshot::from_message(&message);
    if let Some(reason) = args.cancellation_reason {
        snapshot = snapshot.with_cancellation_reason(reason);
    }
    let resolution = resolve(&snapshot, &venues)?;

    for line in render_resolution(&message, &snapshot, &resolution) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn render_resolution(
    message: &HmcMessage,
    snapshot: &HearingSnapshot,
    resolution: &Resolution,
) -> Vec<String> {
    let mut lines = vec![
        "Hearing notification".to_string(),
        format!("  Service: {}", message.hmcts_service_id),
        format!("  Case reference: {}", message.case_ref),
        format!("  Hearing: {}", snapshot.hearing_id),
        format!("  Platform status: {}", snapshot.hmc_status),
    ];
    if let Some(listing) = snapshot.listing_status {
        lines.push(format!("  Listing status: {listing:?}"));
    }
    if !snapshot.cancellation_reasons.is_empty() {
        lines.push(format!(
            "  Cancellation reasons: {}",
            snapshot.cancellation_reasons.join(", ")
        ));
    }

    lines.push("Resolution".to_string());
    lines.push(format!("  Transition: {}", describe(&resolution.transition)));
    lines.push(format!(
        "  Case state: {}",
        resolution
            .target_state()
            .map(|state| state.label())
            .unwrap_or("unchanged")
    ));
    match (&resolution.event, resolution.writes()) {
        (Some(event), true) => lines.push(format!(
            "  Case event: {} ({})",
            event.event_type, event.summary
        )),
        _ => lines.push("  Case event: none, the case is left untouched".to_string()),
    }
    lines
}

fn describe(transition: &Transition) -> String {
    match transition {
        Transition::HandlingError => "platform exception".to_string(),
        Transition::Cancelled { reason, .. } => match reason {
            Some(reason) => format!("cancelled ({reason})"),
            None => "cancelled without a reason".to_string(),
        },
        Transition::Listed { venue, start, .. } => {
            let when = start
                .map(|start| start.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "unscheduled".to_string());
            format!("listed at {} [{}] on {when}", venue.name, venue.epims_id)
        }
        Transition::NoChange => "no change".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(status: &str, listing: Option<&str>, venue: Option<&str>) -> HmcMessage {
        let mut update = json!({ "hmcStatus": status });
        if let Some(listing) = listing {
            update["hearingListingStatus"] = json!(listing);
        }
        if let Some(venue) = venue {
            update["hearingVenueId"] = json!(venue);
        }
        serde_json::from_value(json!({
            "hmctsServiceID": "BBA3",
            "caseRef": "1650000000000001",
            "hearingID": "2000000001",
            "hearingUpdate": update,
        }))
        .expect("valid message")
    }

    fn render(message: &HmcMessage, reason: Option<&str>) -> Vec<String> {
        let venues = VenueDirectory::embedded().expect("embedded venues");
        let mut snapshot = HearingSnapshot::from_message(message);
        if let Some(reason) = reason {
            snapshot = snapshot.with_cancellation_reason(reason);
        }
        let resolution = resolve(&snapshot, &venues).expect("resolves");
        render_resolution(message, &snapshot, &resolution)
    }

    #[test]
    fn fixed_listing_reports_the_venue() {
        let lines = render(&message("LISTED", Some("FIXED"), Some("372653")), None);

        assert!(lines.iter().any(|line| line.starts_with("  Transition: listed at")));
        assert!(lines.iter().any(|line| line.contains("[372653]")));
        assert!(lines.iter().any(|line| line.contains("hearingBooked")));
    }

    #[test]
    fn assumed_cancellation_reason_drives_the_state() {
        let lines = render(&message("CANCELLED", None, None), Some("withdraw"));

        assert!(lines.contains(&"  Cancellation reasons: withdraw".to_string()));
        assert!(lines.contains(&"  Transition: cancelled (withdraw)".to_string()));
        assert!(lines.contains(&"  Case state: Dormant".to_string()));
    }

    #[test]
    fn awaiting_listing_leaves_the_case_untouched() {
        let lines = render(&message("AWAITING_LISTING", None, None), None);

        assert!(lines.contains(&"  Transition: no change".to_string()));
        assert!(lines.contains(&"  Case state: unchanged".to_string()));
        assert!(lines.contains(&"  Case event: none, the case is left untouched".to_string()));
    }
}
