//! Data model: variable/case declarations and recorded outcomes.

pub mod types;

pub use types::{
    Case, CaseResult, Combination, Run, SetupFn, TransportFailure, TransportPolicy, ValidateFn,
    Variable,
};
