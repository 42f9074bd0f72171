//! Scratch space carried through a single combination.

use std::collections::HashMap;

/// Key/value store scoped to one combination.
///
/// Every combination gets a fresh context. Setup closures write into it and
/// validators read it back, so a case can stash what it put on the request
/// and check the response against it later. Nothing crosses combinations.
#[derive(Debug, Default)]
pub struct RunContext {
    values: HashMap<String, String>,
}

impl RunContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a previously stored value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let mut ctx = RunContext::new();
        ctx.set("user_id", "u-42");
        assert_eq!(ctx.get("user_id"), Some("u-42"));
        assert_eq!(ctx.get("missing"), None);
    }

    #[test]
    fn set_overwrites_previous_value() {
        let mut ctx = RunContext::new();
        ctx.set("token", "first");
        ctx.set("token", "second");
        assert_eq!(ctx.get("token"), Some("second"));
    }
}
