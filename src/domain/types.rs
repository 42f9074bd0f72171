use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::context::RunContext;
use crate::engine::http::{Inbound, Outbound};

// ─── Declarations ─────────────────────────────────────────────────────────────

/// Prepares the outbound request for one case.
pub type SetupFn = Arc<dyn Fn(&mut RunContext, &mut Outbound) + Send + Sync>;

/// Judges the response for one case.
pub type ValidateFn = Arc<dyn Fn(&RunContext, &Inbound) -> CaseResult + Send + Sync>;

/// One pick per declared variable, in declaration order.
pub type Combination = Vec<Case>;

/// A named set of mutually exclusive cases.
///
/// Each variable contributes one dimension to the combination space; every
/// run picks exactly one of its cases.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub cases: Vec<Case>,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    /// Append a case to this variable.
    #[must_use]
    pub fn case(mut self, case: Case) -> Self {
        self.cases.push(case);
        self
    }
}

/// A single labeled condition within a variable.
///
/// A case built with [`Case::new`] leaves the request untouched and always
/// passes validation; attach behavior with [`Case::setup`] and
/// [`Case::validate`].
#[derive(Clone)]
pub struct Case {
    pub name: String,
    pub disabled: bool,
    pub want_fail: bool,
    pub(crate) setup: SetupFn,
    pub(crate) validate: ValidateFn,
}

impl Case {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            disabled: false,
            want_fail: false,
            setup: Arc::new(|_, _| {}),
            validate: Arc::new(|_, _| CaseResult::pass()),
        }
    }

    /// Set the closure that prepares the request when this case is picked.
    #[must_use]
    pub fn setup(
        mut self,
        setup: impl Fn(&mut RunContext, &mut Outbound) + Send + Sync + 'static,
    ) -> Self {
        self.setup = Arc::new(setup);
        self
    }

    /// Set the closure that judges the response when this case is picked.
    #[must_use]
    pub fn validate(
        mut self,
        validate: impl Fn(&RunContext, &Inbound) -> CaseResult + Send + Sync + 'static,
    ) -> Self {
        self.validate = Arc::new(validate);
        self
    }

    /// Expect this case's validator to fail; the failure then counts as a
    /// pass for the whole run and later validators are skipped.
    #[must_use]
    pub fn want_fail(mut self) -> Self {
        self.want_fail = true;
        self
    }

    /// Keep every combination containing this case out of the run.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

impl fmt::Debug for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Case")
            .field("name", &self.name)
            .field("disabled", &self.disabled)
            .field("want_fail", &self.want_fail)
            .finish_non_exhaustive()
    }
}

// ─── Outcomes ─────────────────────────────────────────────────────────────────

/// Verdict of one case's validator within one run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseResult {
    /// Name of the case that produced this result.
    pub name: String,
    pub failed: bool,
    /// Whether the case expected its validator to fail.
    pub wanted_fail: bool,
    pub reason: String,
}

impl CaseResult {
    /// A passing verdict. The worker stamps name and expectation afterwards.
    pub fn pass() -> Self {
        Self {
            name: String::new(),
            failed: false,
            wanted_fail: false,
            reason: String::new(),
        }
    }

    /// A failing verdict with a human-readable reason.
    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            failed: true,
            wanted_fail: false,
            reason: reason.into(),
        }
    }
}

/// Recorded outcome of one executed combination.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    /// Participant case names, in variable declaration order.
    pub cases: Vec<String>,
    /// One entry per validator that ran; an expected failure stops the list
    /// early.
    pub results: Vec<CaseResult>,
    pub body: String,
    pub status: u16,
    /// Time to response headers, excluding the body read.
    #[serde(rename = "durationMs", serialize_with = "duration_ms")]
    pub duration: Duration,
    /// Whether any participant case expected a failing validation.
    pub want_fail: bool,
    /// Whether a validator failed without that being expected.
    pub failed: bool,
    /// Set only on runs synthesized under [`TransportPolicy::Fail`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_error: Option<String>,
}

/// A combination whose request never produced a readable response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportFailure {
    pub cases: Vec<String>,
    pub error: String,
}

/// How combinations that die at the transport level are counted.
///
/// Every transport failure is logged and recorded on the report either way;
/// the policy only decides whether it shows up in the run totals. It never
/// counts as a success, not even for a combination that wanted to fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportPolicy {
    /// Leave the combination out of `amount`, `successes` and `fails`.
    #[default]
    Drop,
    /// Count the combination as a failed run with status 0 and no results.
    Fail,
}

pub(crate) fn duration_ms<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(value.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_defaults_are_enabled_and_expect_success() {
        let case = Case::new("plain");
        assert_eq!(case.name, "plain");
        assert!(!case.disabled);
        assert!(!case.want_fail);
    }

    #[test]
    fn builder_flags_stick() {
        let case = Case::new("odd").want_fail().disabled();
        assert!(case.want_fail);
        assert!(case.disabled);
    }

    #[test]
    fn variable_collects_cases_in_order() {
        let variable = Variable::new("auth")
            .case(Case::new("valid"))
            .case(Case::new("missing"));
        assert_eq!(variable.name, "auth");
        let names: Vec<&str> = variable.cases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["valid", "missing"]);
    }

    #[test]
    fn result_constructors_set_the_verdict() {
        let pass = CaseResult::pass();
        assert!(!pass.failed);
        assert!(pass.reason.is_empty());

        let fail = CaseResult::fail("status was 500");
        assert!(fail.failed);
        assert_eq!(fail.reason, "status was 500");
    }

    #[test]
    fn run_serializes_with_camel_case_keys_and_millis() {
        let run = Run {
            cases: vec!["valid".to_string()],
            duration: Duration::from_millis(1250),
            want_fail: true,
            ..Run::default()
        };
        let value = serde_json::to_value(&run).unwrap();
        assert_eq!(value["durationMs"], 1250);
        assert_eq!(value["wantFail"], true);
        assert!(value.get("transportError").is_none());
    }
}
