//! Proposal template engine: element schemas, element store, pricing
//! evaluation, submission validation and the persistence contract.
//!
//! Pure domain logic with no database access. The `db` crate implements
//! [`persistence::TemplateBackend`] on top of PostgreSQL and the `api`
//! crate exposes everything over HTTP.

pub mod elements;
pub mod error;
pub mod form;
pub mod money;
pub mod persistence;
pub mod pricing;
pub mod session;
pub mod store;
pub mod submission;
pub mod template;
pub mod types;
