use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{CaseAddress, CaseManagementLocation, CaseVenue};

const EMBEDDED_VENUES: &str = include_str!("../../data/venues.csv");

/// Venue reference data row, keyed by ePIMS id.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueDetails {
    pub epims_id: String,
    pub venue_id: String,
    pub name: String,
    pub address: CaseAddress,
    pub region_id: Option<String>,
    pub region_name: Option<String>,
    pub active: bool,
    pub google_map_link: Option<String>,
}

impl VenueDetails {
    pub fn case_venue(&self) -> CaseVenue {
        CaseVenue {
            name: self.name.clone(),
            address: self.address.clone(),
            google_map_link: self.google_map_link.clone(),
        }
    }

    pub fn case_management_location(&self) -> CaseManagementLocation {
        CaseManagementLocation {
            base_location: Some(self.epims_id.clone()),
            region: self.region_id.clone(),
        }
    }
}

/// In-memory venue directory. Lookups never fall back to a default venue.
#[derive(Debug, Clone, Default)]
pub struct VenueDirectory {
    by_epims: HashMap<String, VenueDetails>,
}

impl VenueDirectory {
    /// Directory built from the venue list shipped with the crate.
    pub fn embedded() -> Result<Self, VenueError> {
        Self::from_reader(EMBEDDED_VENUES.as_bytes())
    }

    /// Loads `path` when given, otherwise the embedded list.
    pub fn load(path: Option<&Path>) -> Result<Self, VenueError> {
        match path {
            Some(path) => {
                let file = File::open(path).map_err(|source| VenueError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_reader(file)
            }
            None => Self::embedded(),
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, VenueError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut by_epims = HashMap::new();

        for record in csv_reader.deserialize::<VenueRow>() {
            let row = record?;
            let details = row.into_details();
            by_epims.insert(details.epims_id.clone(), details);
        }

        Ok(Self { by_epims })
    }

    pub fn from_venues<I: IntoIterator<Item = VenueDetails>>(venues: I) -> Self {
        Self {
            by_epims: venues
                .into_iter()
                .map(|venue| (venue.epims_id.clone(), venue))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_epims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_epims.is_empty()
    }

    pub fn lookup(&self, epims_id: &str) -> Result<&VenueDetails, VenueError> {
        self.by_epims
            .get(epims_id.trim())
            .ok_or_else(|| VenueError::UnknownEpims(epims_id.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VenueError {
    #[error("no venue found for ePIMS id `{0}`")]
    UnknownEpims(String),
    #[error("hearing {hearing_id} has no venue")]
    MissingEpims { hearing_id: String },
    #[error("failed to read venue data from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed venue data: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Deserialize)]
struct VenueRow {
    epims_id: String,
    venue_id: String,
    venue_name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    address_line1: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    address_line2: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    town: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    county: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    postcode: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    region_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    region_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    active: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    google_map_link: Option<String>,
}

impl VenueRow {
    fn into_details(self) -> VenueDetails {
        let active = self.active.as_deref().map_or(true, |flag| {
            matches!(flag.to_ascii_lowercase().as_str(), "yes" | "y" | "true")
        });

        VenueDetails {
            epims_id: self.epims_id,
            venue_id: self.venue_id,
            name: self.venue_name,
            address: CaseAddress {
                line1: self.address_line1,
                line2: self.address_line2,
                town: self.town,
                county: self.county,
                postcode: self.postcode,
            },
            region_id: self.region_id,
            region_name: self.region_name,
            active,
            google_map_link: self.google_map_link,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_directory_resolves_known_venue() {
        let directory = VenueDirectory::embedded().expect("embedded csv parses");
        assert!(!directory.is_empty());

        let venue = directory.lookup("372653").expect("Fox Court present");
        assert_eq!(venue.name, "Fox Court");
        assert_eq!(venue.address.postcode.as_deref(), Some("EC1N 7RS"));
        assert_eq!(
            venue.case_management_location().base_location.as_deref(),
            Some("372653")
        );
    }

    #[test]
    fn unknown_epims_is_an_error_not_a_default() {
        let directory = VenueDirectory::embedded().expect("embedded csv parses");
        let err = directory.lookup("999999").expect_err("unknown venue");
        assert!(matches!(err, VenueError::UnknownEpims(ref id) if id == "999999"));
    }

    #[test]
    fn parses_blank_columns_and_inactive_flag() {
        let csv = "\
epims_id,venue_id,venue_name,address_line1,address_line2,town,county,postcode,region_id,region_name,active,google_map_link
100,9,Annex, 1 High St ,,Leeds,,LS1 1AA,6,North East,No,
";
        let directory = VenueDirectory::from_reader(csv.as_bytes()).expect("csv parses");
        let venue = directory.lookup(" 100 ").expect("trimmed lookup");
        assert_eq!(venue.address.line1.as_deref(), Some("1 High St"));
        assert!(venue.address.line2.is_none());
        assert!(!venue.active);
    }
}
