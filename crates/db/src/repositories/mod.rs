//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod proposal_submission_repo;
pub mod proposal_template_repo;

pub use proposal_submission_repo::ProposalSubmissionRepo;
pub use proposal_template_repo::ProposalTemplateRepo;
