use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier for a submitted application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub u32);

/// Identifier for a guardian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GuardianId(pub u32);

/// Identifier for a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChildId(pub u32);

/// Identifier for a day-care facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FacilityId(pub u32);

/// A day-care facility and its current number of vacant slots.
///
/// Slots are read during matching and never decremented when an offer is
/// produced; decisions are recomputed statelessly on every view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    pub address: String,
    pub vacant_slots: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guardian {
    pub id: GuardianId,
    pub name: String,
    pub person_number: String,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: ChildId,
    pub person_number: String,
}

/// A stored application linking guardians and child to an ordered,
/// comma-separated list of prioritized facility ids.
///
/// The priority list is kept raw and parsed at evaluation time; malformed
/// tokens are dropped there, not rejected here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub guardian_1: GuardianId,
    pub guardian_2: Option<GuardianId>,
    pub child: ChildId,
    pub child_welfare_priority: bool,
    pub family_illness_priority: bool,
    pub child_illness_priority: bool,
    pub prioritized_facilities: String,
    pub submitted_at: NaiveDateTime,
}

impl Application {
    /// Priority eligibility is the OR of the three independent flags.
    pub fn is_priority_eligible(&self) -> bool {
        self.child_welfare_priority || self.family_illness_priority || self.child_illness_priority
    }
}

/// Guardian payload before the repository assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGuardian {
    pub name: String,
    pub person_number: String,
    pub address: String,
    pub phone: String,
}

/// Child payload before the repository assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChild {
    pub person_number: String,
}

/// Application payload before the repository assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub guardian_1: GuardianId,
    pub guardian_2: Option<GuardianId>,
    pub child: ChildId,
    pub child_welfare_priority: bool,
    pub family_illness_priority: bool,
    pub child_illness_priority: bool,
    pub prioritized_facilities: String,
    pub submitted_at: NaiveDateTime,
}

/// Outcome of matching one application against the facility set.
/// Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Offer { facility: FacilityId },
    Reject,
}

impl Decision {
    pub const fn label(&self) -> &'static str {
        match self {
            Decision::Offer { .. } => "offer",
            Decision::Reject => "reject",
        }
    }

    pub const fn is_offer(&self) -> bool {
        matches!(self, Decision::Offer { .. })
    }

    pub const fn offered_facility(&self) -> Option<FacilityId> {
        match self {
            Decision::Offer { facility } => Some(*facility),
            Decision::Reject => None,
        }
    }
}

/// The submitted intake form.
///
/// Checkbox fields accept either JSON booleans or the HTML checkbox marker
/// `"on"`; the second guardian is optional and detected by non-empty name
/// or person number.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationForm {
    pub guardian_1_name: String,
    pub guardian_1_person_number: String,
    #[serde(default)]
    pub guardian_1_address: String,
    #[serde(default)]
    pub guardian_1_phone: String,
    #[serde(default)]
    pub guardian_2_name: String,
    #[serde(default)]
    pub guardian_2_person_number: String,
    #[serde(default)]
    pub guardian_2_address: String,
    #[serde(default)]
    pub guardian_2_phone: String,
    pub child_person_number: String,
    #[serde(default, deserialize_with = "checkbox")]
    pub child_welfare_priority: bool,
    #[serde(default, deserialize_with = "checkbox")]
    pub family_illness_priority: bool,
    #[serde(default, deserialize_with = "checkbox")]
    pub child_illness_priority: bool,
    #[serde(default)]
    pub prioritized_facilities: String,
}

impl ApplicationForm {
    pub fn has_second_guardian(&self) -> bool {
        !self.guardian_2_name.trim().is_empty() || !self.guardian_2_person_number.trim().is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CheckboxValue {
    Flag(bool),
    Marker(String),
}

fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<CheckboxValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(CheckboxValue::Flag(flag)) => flag,
        Some(CheckboxValue::Marker(marker)) => marker.trim().eq_ignore_ascii_case("on"),
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_accepts_html_checkbox_markers() {
        let form: ApplicationForm = serde_json::from_value(serde_json::json!({
            "guardian_1_name": "Kari Nordmann",
            "guardian_1_person_number": "01018512345",
            "child_person_number": "01012312345",
            "child_welfare_priority": "on",
            "family_illness_priority": false,
            "child_illness_priority": true,
            "prioritized_facilities": "1,2"
        }))
        .expect("form deserializes");

        assert!(form.child_welfare_priority);
        assert!(!form.family_illness_priority);
        assert!(form.child_illness_priority);
        assert!(!form.has_second_guardian());
    }

    #[test]
    fn omitted_checkboxes_default_to_false() {
        let form: ApplicationForm = serde_json::from_value(serde_json::json!({
            "guardian_1_name": "Kari Nordmann",
            "guardian_1_person_number": "01018512345",
            "guardian_2_name": "Ola Nordmann",
            "child_person_number": "01012312345"
        }))
        .expect("form deserializes");

        assert!(!form.child_welfare_priority);
        assert!(!form.family_illness_priority);
        assert!(!form.child_illness_priority);
        assert!(form.has_second_guardian());
        assert!(form.prioritized_facilities.is_empty());
    }

    #[test]
    fn eligibility_is_or_of_flags() {
        let base = Application {
            id: ApplicationId(1),
            guardian_1: GuardianId(1),
            guardian_2: None,
            child: ChildId(1),
            child_welfare_priority: false,
            family_illness_priority: false,
            child_illness_priority: false,
            prioritized_facilities: String::new(),
            submitted_at: chrono::NaiveDate::from_ymd_opt(2026, 8, 1)
                .expect("valid date")
                .and_hms_opt(12, 0, 0)
                .expect("valid time"),
        };
        assert!(!base.is_priority_eligible());

        let flagged = Application {
            family_illness_priority: true,
            ..base
        };
        assert!(flagged.is_priority_eligible());
    }
}
