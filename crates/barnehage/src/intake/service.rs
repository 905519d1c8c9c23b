use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::info;

use super::domain::{
    Application, ApplicationForm, ApplicationId, Child, Facility, FacilityId, Guardian,
    NewApplication, NewChild, NewGuardian,
};
use super::matcher;
use super::repository::{IntakeRepository, RepositoryError};

/// Placeholder shown when a linked record cannot be resolved.
pub const UNKNOWN: &str = "unknown";

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Response to a submitted form: the stored application and its decision.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub application_id: ApplicationId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offered_facility: Option<FacilityId>,
    pub priority_eligible: bool,
    pub submitted_at: NaiveDateTime,
}

/// One application joined with guardian names, child person number, and the
/// freshly recomputed decision.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub guardian_1: String,
    pub guardian_2: String,
    pub child_person_number: String,
    pub priority_eligible: bool,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offered_facility: Option<FacilityId>,
}

/// Full dump of the intake tables plus per-application status views.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    pub guardians: Vec<Guardian>,
    pub children: Vec<Child>,
    pub facilities: Vec<Facility>,
    pub applications: Vec<ApplicationStatusView>,
}

/// Service composing the repository and the placement matcher.
pub struct IntakeService<R> {
    repository: Arc<R>,
}

impl<R> IntakeService<R>
where
    R: IntakeRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Convert a form into guardian/child/application records, store them,
    /// and evaluate the placement decision.
    pub fn submit(&self, form: ApplicationForm) -> Result<SubmissionReceipt, IntakeError> {
        let guardian_1 = self.repository.insert_guardian(NewGuardian {
            name: form.guardian_1_name.clone(),
            person_number: form.guardian_1_person_number.clone(),
            address: form.guardian_1_address.clone(),
            phone: form.guardian_1_phone.clone(),
        })?;

        let guardian_2 = if form.has_second_guardian() {
            Some(
                self.repository
                    .insert_guardian(NewGuardian {
                        name: form.guardian_2_name.clone(),
                        person_number: form.guardian_2_person_number.clone(),
                        address: form.guardian_2_address.clone(),
                        phone: form.guardian_2_phone.clone(),
                    })?
                    .id,
            )
        } else {
            None
        };

        let child = self.repository.insert_child(NewChild {
            person_number: form.child_person_number.clone(),
        })?;

        let application = self.repository.insert_application(NewApplication {
            guardian_1: guardian_1.id,
            guardian_2,
            child: child.id,
            child_welfare_priority: form.child_welfare_priority,
            family_illness_priority: form.family_illness_priority,
            child_illness_priority: form.child_illness_priority,
            prioritized_facilities: form.prioritized_facilities.clone(),
            submitted_at: Local::now().naive_local(),
        })?;

        let decision = matcher::decide(&application, &self.facility_map()?);
        info!(
            application = application.id.0,
            status = decision.label(),
            "application submitted"
        );

        Ok(SubmissionReceipt {
            application_id: application.id,
            status: decision.label(),
            offered_facility: decision.offered_facility(),
            priority_eligible: application.is_priority_eligible(),
            submitted_at: application.submitted_at,
        })
    }

    /// Status view for one application; `None` when the id is unknown.
    pub fn decision_for(
        &self,
        id: ApplicationId,
    ) -> Result<Option<ApplicationStatusView>, IntakeError> {
        let Some(application) = self.repository.application(id)? else {
            return Ok(None);
        };
        let facilities = self.facility_map()?;
        Ok(Some(self.view_for(&application, &facilities)?))
    }

    /// Status views for every stored application, decisions recomputed
    /// against the current facility set.
    pub fn status_views(&self) -> Result<Vec<ApplicationStatusView>, IntakeError> {
        let facilities = self.facility_map()?;
        self.repository
            .applications()?
            .iter()
            .map(|application| self.view_for(application, &facilities))
            .collect()
    }

    pub fn facilities(&self) -> Result<Vec<Facility>, IntakeError> {
        Ok(self.repository.facilities()?)
    }

    /// Everything the demo's committed-data page shows.
    pub fn registry(&self) -> Result<RegistrySnapshot, IntakeError> {
        Ok(RegistrySnapshot {
            guardians: self.repository.guardians()?,
            children: self.repository.children()?,
            facilities: self.repository.facilities()?,
            applications: self.status_views()?,
        })
    }

    fn facility_map(&self) -> Result<BTreeMap<FacilityId, Facility>, IntakeError> {
        Ok(self
            .repository
            .facilities()?
            .into_iter()
            .map(|facility| (facility.id, facility))
            .collect())
    }

    fn view_for(
        &self,
        application: &Application,
        facilities: &BTreeMap<FacilityId, Facility>,
    ) -> Result<ApplicationStatusView, IntakeError> {
        let guardian_1 = self
            .repository
            .guardian(application.guardian_1)?
            .map(|guardian| guardian.name)
            .unwrap_or_else(|| UNKNOWN.to_string());

        let guardian_2 = match application.guardian_2 {
            Some(id) => self
                .repository
                .guardian(id)?
                .map(|guardian| guardian.name)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            None => String::new(),
        };

        let child_person_number = self
            .repository
            .child(application.child)?
            .map(|child| child.person_number)
            .unwrap_or_else(|| UNKNOWN.to_string());

        let decision = matcher::decide(application, facilities);

        Ok(ApplicationStatusView {
            application_id: application.id,
            guardian_1,
            guardian_2,
            child_person_number,
            priority_eligible: application.is_priority_eligible(),
            status: decision.label(),
            offered_facility: decision.offered_facility(),
        })
    }
}
