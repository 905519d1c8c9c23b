use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;

use barnehage::intake::{
    Application, ApplicationId, Child, ChildId, Facility, FacilityId, FacilityRoster, Guardian,
    GuardianId, IntakeRepository, NewApplication, NewChild, NewGuardian, RepositoryError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct Tables {
    guardians: BTreeMap<GuardianId, Guardian>,
    children: BTreeMap<ChildId, Child>,
    applications: BTreeMap<ApplicationId, Application>,
    facilities: BTreeMap<FacilityId, Facility>,
}

/// Process-lifetime intake storage. One mutex guards all four tables; new
/// records get max-existing-plus-one ids per table.
pub(crate) struct InMemoryIntakeRepository {
    tables: Mutex<Tables>,
}

impl InMemoryIntakeRepository {
    pub(crate) fn with_roster(roster: FacilityRoster) -> Self {
        let mut tables = Tables::default();
        for facility in roster.into_facilities() {
            tables.facilities.insert(facility.id, facility);
        }
        Self {
            tables: Mutex::new(tables),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("intake mutex poisoned".to_string()))
    }
}

impl IntakeRepository for InMemoryIntakeRepository {
    fn insert_guardian(&self, guardian: NewGuardian) -> Result<Guardian, RepositoryError> {
        let mut tables = self.lock()?;
        let id = GuardianId(next_id(tables.guardians.last_key_value().map(|(id, _)| id.0)));
        let record = Guardian {
            id,
            name: guardian.name,
            person_number: guardian.person_number,
            address: guardian.address,
            phone: guardian.phone,
        };
        tables.guardians.insert(id, record.clone());
        Ok(record)
    }

    fn insert_child(&self, child: NewChild) -> Result<Child, RepositoryError> {
        let mut tables = self.lock()?;
        let id = ChildId(next_id(tables.children.last_key_value().map(|(id, _)| id.0)));
        let record = Child {
            id,
            person_number: child.person_number,
        };
        tables.children.insert(id, record.clone());
        Ok(record)
    }

    fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, RepositoryError> {
        let mut tables = self.lock()?;
        let id = ApplicationId(next_id(
            tables.applications.last_key_value().map(|(id, _)| id.0),
        ));
        let record = Application {
            id,
            guardian_1: application.guardian_1,
            guardian_2: application.guardian_2,
            child: application.child,
            child_welfare_priority: application.child_welfare_priority,
            family_illness_priority: application.family_illness_priority,
            child_illness_priority: application.child_illness_priority,
            prioritized_facilities: application.prioritized_facilities,
            submitted_at: application.submitted_at,
        };
        tables.applications.insert(id, record.clone());
        Ok(record)
    }

    fn guardian(&self, id: GuardianId) -> Result<Option<Guardian>, RepositoryError> {
        Ok(self.lock()?.guardians.get(&id).cloned())
    }

    fn child(&self, id: ChildId) -> Result<Option<Child>, RepositoryError> {
        Ok(self.lock()?.children.get(&id).cloned())
    }

    fn application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(self.lock()?.applications.get(&id).cloned())
    }

    fn guardians(&self) -> Result<Vec<Guardian>, RepositoryError> {
        Ok(self.lock()?.guardians.values().cloned().collect())
    }

    fn children(&self) -> Result<Vec<Child>, RepositoryError> {
        Ok(self.lock()?.children.values().cloned().collect())
    }

    fn applications(&self) -> Result<Vec<Application>, RepositoryError> {
        Ok(self.lock()?.applications.values().cloned().collect())
    }

    fn facilities(&self) -> Result<Vec<Facility>, RepositoryError> {
        Ok(self.lock()?.facilities.values().cloned().collect())
    }
}

fn next_id(last: Option<u32>) -> u32 {
    last.map_or(1, |value| value + 1)
}
