//! Declarative, combination-driven API testing.
//!
//! Declare variables, each a named set of mutually exclusive cases. The
//! [`Runner`] takes the cartesian product of those cases and executes every
//! combination as one independent HTTP request on a bounded worker pool:
//! each case's setup shapes the request, each case's validator judges the
//! response, and everything is aggregated into a single [`Report`].
//!
//! Cases can be [disabled](Case::disabled) to park every combination they
//! appear in, or marked [`want_fail`](Case::want_fail) when a failing
//! validation is the outcome being tested for. See [`Runner`] for a worked
//! example.

pub mod context;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ident;
mod lookup;
pub mod report;

pub use context::RunContext;
pub use domain::{
    Case, CaseResult, Combination, Run, SetupFn, TransportFailure, TransportPolicy, ValidateFn,
    Variable,
};
pub use engine::http::{Inbound, Outbound};
pub use engine::Runner;
pub use error::{Error, LookupError};
pub use ident::{RandomIds, RunIdSource};
pub use report::Report;

pub use reqwest::Method;
