use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::options::{LocatorOptions, Visibility};
use crate::query::{join_or, literal};
use crate::strategies::Strategy;

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";

/// How qualifier terms are compared against document text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    #[default]
    Equals,
    Contains,
    StartsWith,
    EndsWith,
}

impl MatchMode {
    /// XPath condition comparing `target` against one qualifier term.
    pub(crate) fn condition(self, target: &str, qualifier: &str, case_insensitive: bool) -> String {
        let (target, qualifier) = if case_insensitive {
            (
                format!("translate({target}, '{UPPERCASE}', '{LOWERCASE}')"),
                qualifier.to_lowercase(),
            )
        } else {
            (target.to_string(), qualifier.to_string())
        };
        let term = literal(&qualifier);
        match self {
            MatchMode::Equals => format!("{target} = {term}"),
            MatchMode::Contains => format!("contains({target}, {term})"),
            MatchMode::StartsWith => format!("starts-with({target}, {term})"),
            // XPath 1.0 has no ends-with()
            MatchMode::EndsWith => format!(
                "substring({target}, string-length({target}) - string-length({term}) + 1) = {term}"
            ),
        }
    }

    /// In-memory counterpart of [`MatchMode::condition`], used where the
    /// comparison runs against text already fetched from the document
    /// (column header resolution).
    pub fn matches(self, actual: &str, qualifier: &str, case_insensitive: bool) -> bool {
        let (actual, qualifier) = if case_insensitive {
            (actual.to_lowercase(), qualifier.to_lowercase())
        } else {
            (actual.to_string(), qualifier.to_string())
        };
        match self {
            MatchMode::Equals => actual == qualifier,
            MatchMode::Contains => actual.contains(&qualifier),
            MatchMode::StartsWith => actual.starts_with(&qualifier),
            MatchMode::EndsWith => actual.ends_with(&qualifier),
        }
    }
}

/// Immutable declarative description of how to find elements: a strategy,
/// ordered qualifier terms and option overrides.
///
/// Combinators return new values; an existing locator is never mutated, so
/// one locator can be shared across concurrent queries and specialized at
/// any call site without action at a distance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Locator {
    strategy: Strategy,
    qualifiers: Vec<String>,
    index: Option<usize>,
    match_mode: MatchMode,
    case_insensitive: bool,
    kind: Option<String>,
    name: Option<String>,
    options: LocatorOptions,
}

impl Locator {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Ordered, not necessarily unique.
    pub fn qualifiers(&self) -> &[String] {
        &self.qualifiers
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn match_mode(&self) -> MatchMode {
        self.match_mode
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn options(&self) -> &LocatorOptions {
        &self.options
    }

    /// Append one qualifier term.
    pub fn with_qualifier(&self, qualifier: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.qualifiers.push(qualifier.into());
        next
    }

    /// Append several qualifier terms, preserving order.
    pub fn with_qualifiers<I, S>(&self, qualifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next = self.clone();
        next.qualifiers.extend(qualifiers.into_iter().map(Into::into));
        next
    }

    /// 0-based position among candidate matches.
    pub fn at_index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.index = Some(index);
        next
    }

    pub fn with_match_mode(&self, mode: MatchMode) -> Self {
        let mut next = self.clone();
        next.match_mode = mode;
        next
    }

    pub fn case_insensitive(&self) -> Self {
        let mut next = self.clone();
        next.case_insensitive = true;
        next
    }

    /// Element-kind label, used in failure descriptions.
    pub fn with_kind(&self, kind: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.kind = Some(kind.into());
        next
    }

    /// Element-name label, used in failure descriptions.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.name = Some(name.into());
        next
    }

    /// Safe mode: degrade to absent/false instead of failing.
    pub fn safe(&self) -> Self {
        self.with_throw_on_fail(false)
    }

    pub fn with_throw_on_fail(&self, throw_on_fail: bool) -> Self {
        let mut next = self.clone();
        next.options.throw_on_fail = Some(throw_on_fail);
        next
    }

    pub fn with_visibility(&self, visibility: Visibility) -> Self {
        let mut next = self.clone();
        next.options.visibility = Some(visibility);
        next
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let mut next = self.clone();
        next.options.timeout = Some(timeout);
        next
    }

    pub fn with_retry_interval(&self, interval: Duration) -> Self {
        let mut next = self.clone();
        next.options.retry_interval = Some(interval);
        next
    }

    /// OR-joined match condition across all qualifiers against one target
    /// expression (an attribute reference or `text()`).
    pub(crate) fn terms_condition(&self, target: &str) -> String {
        join_or(
            self.qualifiers
                .iter()
                .map(|q| self.match_mode.condition(target, q, self.case_insensitive)),
        )
    }

    /// Human-readable description for failure messages.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(kind) = &self.kind {
            parts.push(kind.clone());
        }
        if let Some(name) = &self.name {
            parts.push(format!("'{name}'"));
        }
        if !self.qualifiers.is_empty() {
            parts.push(format!("[{}]", self.qualifiers.join(", ")));
        }
        if parts.is_empty() {
            format!("{:?} locator", self.strategy)
        } else {
            parts.join(" ")
        }
    }
}

#[cfg(test)]
#[path = "locator_test.rs"]
mod locator_test;
