use crate::hearings::domain::{HearingId, SscsCaseData};
use crate::hearings::venues::VenueDetails;

/// Points the hearing entry, processing venue and case management location
/// at `venue`.
pub(super) fn refresh_venue(
    data: &mut SscsCaseData,
    hearing_id: &HearingId,
    venue: &VenueDetails,
) {
    let hearing = data.hearings.entry(hearing_id);
    hearing.epims_id = Some(venue.epims_id.clone());
    hearing.venue = Some(venue.case_venue());

    data.processing_venue = Some(venue.name.clone());
    data.case_management_location = Some(venue.case_management_location());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hearings::venues::VenueDirectory;

    #[test]
    fn refresh_sets_every_location_field() {
        let venues = VenueDirectory::embedded().expect("embedded venues");
        let venue = venues.lookup("703200").expect("Cardiff present");
        let hearing_id = HearingId("2000000009".to_string());
        let mut data = SscsCaseData::default();

        refresh_venue(&mut data, &hearing_id, venue);

        let hearing = data.hearings.get(&hearing_id).expect("entry created");
        assert_eq!(hearing.epims_id.as_deref(), Some("703200"));
        assert_eq!(
            hearing.venue.as_ref().map(|venue| venue.name.as_str()),
            Some("Cardiff Eastgate House")
        );
        assert_eq!(data.processing_venue.as_deref(), Some("Cardiff Eastgate House"));
        assert_eq!(
            data.case_management_location
                .as_ref()
                .and_then(|location| location.region.as_deref()),
            Some("7")
        );
    }
}
