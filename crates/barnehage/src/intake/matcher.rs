use std::collections::BTreeMap;

use super::domain::{Application, Decision, Facility, FacilityId};

/// Parse the comma-separated priority list, dropping malformed tokens.
pub fn parse_prioritized(raw: &str) -> Vec<FacilityId> {
    raw.split(',')
        .filter_map(|token| token.trim().parse::<u32>().ok())
        .map(FacilityId)
        .collect()
}

/// First-fit placement: scan the prioritized facilities in listed order and
/// offer at the first one that exists and is either open or reachable
/// through priority eligibility. Ids without a facility record are skipped.
///
/// No attempt is made to balance load or revisit earlier choices.
pub fn decide(application: &Application, facilities: &BTreeMap<FacilityId, Facility>) -> Decision {
    let eligible = application.is_priority_eligible();

    for id in parse_prioritized(&application.prioritized_facilities) {
        let Some(facility) = facilities.get(&id) else {
            continue;
        };
        if eligible || facility.vacant_slots > 0 {
            return Decision::Offer { facility: id };
        }
    }

    Decision::Reject
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::domain::{ApplicationId, ChildId, GuardianId};

    fn facility(id: u32, vacant_slots: u32) -> Facility {
        Facility {
            id: FacilityId(id),
            name: format!("Facility {id}"),
            address: String::new(),
            vacant_slots,
        }
    }

    fn facility_set(entries: &[(u32, u32)]) -> BTreeMap<FacilityId, Facility> {
        entries
            .iter()
            .map(|(id, slots)| (FacilityId(*id), facility(*id, *slots)))
            .collect()
    }

    fn application(prioritized: &str, eligible: bool) -> Application {
        Application {
            id: ApplicationId(1),
            guardian_1: GuardianId(1),
            guardian_2: None,
            child: ChildId(1),
            child_welfare_priority: eligible,
            family_illness_priority: false,
            child_illness_priority: false,
            prioritized_facilities: prioritized.to_string(),
            submitted_at: chrono::NaiveDate::from_ymd_opt(2026, 8, 1)
                .expect("valid date")
                .and_hms_opt(9, 0, 0)
                .expect("valid time"),
        }
    }

    #[test]
    fn parses_ids_and_drops_malformed_tokens() {
        assert_eq!(
            parse_prioritized("5, 7,abc,,-3,9"),
            vec![FacilityId(5), FacilityId(7), FacilityId(9)]
        );
        assert_eq!(parse_prioritized(""), Vec::new());
    }

    #[test]
    fn offers_first_facility_with_capacity() {
        let facilities = facility_set(&[(5, 0), (7, 2)]);
        let decision = decide(&application("5,7", false), &facilities);
        assert_eq!(
            decision,
            Decision::Offer {
                facility: FacilityId(7)
            }
        );
    }

    #[test]
    fn eligibility_overrides_full_facility() {
        let facilities = facility_set(&[(5, 0)]);
        let decision = decide(&application("5", true), &facilities);
        assert_eq!(
            decision,
            Decision::Offer {
                facility: FacilityId(5)
            }
        );
    }

    #[test]
    fn rejects_when_nothing_is_open() {
        let facilities = facility_set(&[(5, 0), (7, 0)]);
        assert_eq!(decide(&application("5,7", false), &facilities), Decision::Reject);
    }

    #[test]
    fn unknown_facilities_are_skipped_not_failed() {
        let facilities = facility_set(&[(7, 1)]);
        // 99 has no record; the scan continues to 7.
        let decision = decide(&application("99,7", false), &facilities);
        assert_eq!(
            decision,
            Decision::Offer {
                facility: FacilityId(7)
            }
        );
        // All listed ids absent: reject.
        assert_eq!(decide(&application("1,2,3", false), &facilities), Decision::Reject);
    }

    #[test]
    fn eligibility_does_not_invent_facilities() {
        let facilities = facility_set(&[(7, 0)]);
        // Eligible, but the only listed id does not exist.
        assert_eq!(decide(&application("99", true), &facilities), Decision::Reject);
    }
}
