use super::domain::{
    Application, ApplicationId, Child, ChildId, Facility, Guardian, GuardianId, NewApplication,
    NewChild, NewGuardian,
};

/// Storage abstraction over the four intake tables, so handlers receive an
/// explicit repository instead of touching process-wide state.
///
/// Inserts assign ids; lookups return `Ok(None)` on a miss. Translating a
/// miss into the `"unknown"` placeholder is the view layer's business.
pub trait IntakeRepository: Send + Sync {
    fn insert_guardian(&self, guardian: NewGuardian) -> Result<Guardian, RepositoryError>;
    fn insert_child(&self, child: NewChild) -> Result<Child, RepositoryError>;
    fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, RepositoryError>;

    fn guardian(&self, id: GuardianId) -> Result<Option<Guardian>, RepositoryError>;
    fn child(&self, id: ChildId) -> Result<Option<Child>, RepositoryError>;
    fn application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;

    fn guardians(&self) -> Result<Vec<Guardian>, RepositoryError>;
    fn children(&self) -> Result<Vec<Child>, RepositoryError>;
    fn applications(&self) -> Result<Vec<Application>, RepositoryError>;
    fn facilities(&self) -> Result<Vec<Facility>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
