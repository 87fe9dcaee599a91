use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Three-valued visibility predicate applied to raw element handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Only elements currently displayed.
    Visible,
    /// Only elements present in the document but not displayed.
    Invisible,
    /// Any element, displayed or not.
    Any,
}

impl Visibility {
    /// Whether a handle with the given displayed flag passes the filter.
    pub fn admits(self, displayed: bool) -> bool {
        match self {
            Visibility::Visible => displayed,
            Visibility::Invisible => !displayed,
            Visibility::Any => true,
        }
    }

    /// `Any` never inspects the displayed flag, so the round-trip to fetch
    /// it can be skipped entirely.
    pub fn needs_displayed(self) -> bool {
        !matches!(self, Visibility::Any)
    }
}

/// One override layer of locator options. Unset fields inherit from the
/// layer below; a fully-resolved set is produced before any poll starts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocatorOptions {
    pub timeout: Option<Duration>,
    pub retry_interval: Option<Duration>,
    pub visibility: Option<Visibility>,
    pub throw_on_fail: Option<bool>,
}

impl LocatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge field-by-field, the `over` layer winning wherever it is set.
    pub fn layered(&self, over: &LocatorOptions) -> LocatorOptions {
        LocatorOptions {
            timeout: over.timeout.or(self.timeout),
            retry_interval: over.retry_interval.or(self.retry_interval),
            visibility: over.visibility.or(self.visibility),
            throw_on_fail: over.throw_on_fail.or(self.throw_on_fail),
        }
    }

    /// Collapse onto a fully-resolved base.
    pub fn resolved_against(&self, base: &ResolvedOptions) -> ResolvedOptions {
        ResolvedOptions {
            timeout: self.timeout.unwrap_or(base.timeout),
            retry_interval: self.retry_interval.unwrap_or(base.retry_interval),
            visibility: self.visibility.unwrap_or(base.visibility),
            throw_on_fail: self.throw_on_fail.unwrap_or(base.throw_on_fail),
        }
    }
}

/// Effective options for one call. Invariant: every field is set before use.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedOptions {
    pub timeout: Duration,
    pub retry_interval: Duration,
    pub visibility: Visibility,
    pub throw_on_fail: bool,
}

/// Per-execution-unit defaults. Each search context owns its own config, so
/// concurrently running executions never share timing state.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub timeout: Duration,
    pub retry_interval: Duration,
    pub visibility: Visibility,
    pub throw_on_fail: bool,
    /// Attribute name the identifier strategy matches against.
    pub id_attribute: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retry_interval: Duration::from_millis(500),
            visibility: Visibility::Visible,
            throw_on_fail: true,
            id_attribute: "id".to_string(),
        }
    }
}

impl SessionConfig {
    /// The defaults as a fully-resolved option set.
    pub fn defaults(&self) -> ResolvedOptions {
        ResolvedOptions {
            timeout: self.timeout,
            retry_interval: self.retry_interval,
            visibility: self.visibility,
            throw_on_fail: self.throw_on_fail,
        }
    }

    /// Layer a locator's overrides on top of the session defaults.
    pub fn resolve(&self, overrides: &LocatorOptions) -> ResolvedOptions {
        overrides.resolved_against(&self.defaults())
    }
}

#[cfg(test)]
#[path = "options_test.rs"]
mod options_test;
