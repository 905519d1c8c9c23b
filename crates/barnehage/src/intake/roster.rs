use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::domain::{Facility, FacilityId};

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("unable to open roster file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to parse roster row: {0}")]
    Csv(#[from] csv::Error),
}

/// The facility set the intake workflow matches against.
#[derive(Debug, Clone)]
pub struct FacilityRoster {
    facilities: Vec<Facility>,
}

impl FacilityRoster {
    /// Built-in demo roster used when no seed file is configured.
    pub fn standard() -> Self {
        let entries: [(u32, &str, &str, u32); 6] = [
            (1, "Nordlys Day-Care", "Storgata 1", 0),
            (2, "Fjellheim Kindergarten", "Fjellveien 12", 3),
            (3, "Solsiden Kindergarten", "Solsideveien 4", 1),
            (4, "Bekkelaget Day-Care", "Bekkefaret 9", 2),
            (5, "Havna Kindergarten", "Havnegata 3", 0),
            (7, "Skogbryn Kindergarten", "Skogveien 21", 2),
        ];

        Self {
            facilities: entries
                .into_iter()
                .map(|(id, name, address, vacant_slots)| Facility {
                    id: FacilityId(id),
                    name: name.to_string(),
                    address: address.to_string(),
                    vacant_slots,
                })
                .collect(),
        }
    }

    /// Load a roster from a CSV seed file with columns
    /// `facility_id,name,address,vacant_slots`.
    pub fn from_path(path: &Path) -> Result<Self, RosterError> {
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RosterError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut facilities = Vec::new();
        for record in csv_reader.deserialize::<RosterRow>() {
            let row = record?;
            facilities.push(Facility {
                id: FacilityId(row.facility_id),
                name: row.name,
                address: row.address,
                // Negative slot counts in seed data clamp to zero.
                vacant_slots: row.vacant_slots.max(0) as u32,
            });
        }

        Ok(Self { facilities })
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn into_facilities(self) -> Vec<Facility> {
        self.facilities
    }
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    facility_id: u32,
    name: String,
    #[serde(default)]
    address: String,
    vacant_slots: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_roster_has_open_and_full_facilities() {
        let roster = FacilityRoster::standard();
        assert!(!roster.facilities().is_empty());
        assert!(roster.facilities().iter().any(|f| f.vacant_slots == 0));
        assert!(roster.facilities().iter().any(|f| f.vacant_slots > 0));
    }

    #[test]
    fn reads_csv_and_clamps_negative_slots() {
        let data = "\
facility_id,name,address,vacant_slots
1,Nordlys Day-Care,Storgata 1,2
2,Fjellheim Kindergarten,Fjellveien 12,-3
";
        let roster = FacilityRoster::from_reader(data.as_bytes()).expect("roster parses");
        assert_eq!(roster.facilities().len(), 2);
        assert_eq!(roster.facilities()[0].vacant_slots, 2);
        assert_eq!(roster.facilities()[1].vacant_slots, 0);
        assert_eq!(roster.facilities()[1].id, FacilityId(2));
    }

    #[test]
    fn malformed_rows_are_an_error() {
        let data = "facility_id,name,address,vacant_slots\nnot-a-number,X,Y,1\n";
        assert!(FacilityRoster::from_reader(data.as_bytes()).is_err());
    }
}
