//! IMEI validation, upstream lookup and report formatting.

pub mod error;
pub mod fetcher;
pub mod models;
pub mod parser;
pub mod report;
pub mod resolver;
pub mod validator;

pub use models::{Failure, FailureKind, Imei, LookupOutcome, LookupRequest};
pub use resolver::{ApiResolver, Resolver, ScrapeResolver};
pub use validator::validate;
