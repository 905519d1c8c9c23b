//! Day-care application intake: records, first-fit placement, and the
//! HTTP surface over an injected repository.

pub mod domain;
pub mod matcher;
pub mod repository;
pub mod roster;
pub mod router;
pub mod service;

pub use domain::{
    Application, ApplicationForm, ApplicationId, Child, ChildId, Decision, Facility, FacilityId,
    Guardian, GuardianId, NewApplication, NewChild, NewGuardian,
};
pub use matcher::{decide, parse_prioritized};
pub use repository::{IntakeRepository, RepositoryError};
pub use roster::{FacilityRoster, RosterError};
pub use router::intake_router;
pub use service::{
    ApplicationStatusView, IntakeError, IntakeService, RegistrySnapshot, SubmissionReceipt,
};
