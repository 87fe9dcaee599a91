use std::fmt;

use async_trait::async_trait;

use crate::errors::LocateError;

/// Structural query dialect accepted by document providers, mirroring the
/// two families the engine emits.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DomQuery {
    XPath(String),
    Css(String),
}

impl DomQuery {
    pub fn expression(&self) -> &str {
        match self {
            DomQuery::XPath(expr) | DomQuery::Css(expr) => expr,
        }
    }
}

impl fmt::Display for DomQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomQuery::XPath(expr) => write!(f, "xpath:{expr}"),
            DomQuery::Css(expr) => write!(f, "css:{expr}"),
        }
    }
}

/// Narrow contract onto the live document.
///
/// Handles are opaque and short-lived: they are valid for at most one poll
/// tick and are never cached across ticks, so going stale is an expected
/// race, not a bug. `query` results reflect document order end-to-end;
/// index-based strategies depend on that ordering.
#[async_trait]
pub trait DocumentProvider: Send + Sync {
    type Handle: Clone + Send + Sync;

    /// Zero or more handles matching `query`, evaluated relative to `scope`
    /// when one is given, in document order.
    async fn query(
        &self,
        scope: Option<&Self::Handle>,
        query: &DomQuery,
    ) -> Result<Vec<Self::Handle>, LocateError>;

    /// The element's displayed flag.
    async fn displayed(&self, handle: &Self::Handle) -> Result<bool, LocateError>;

    /// An attribute value, or `None` when the attribute is absent.
    async fn attribute(
        &self,
        handle: &Self::Handle,
        name: &str,
    ) -> Result<Option<String>, LocateError>;

    /// The element's text content.
    async fn text(&self, handle: &Self::Handle) -> Result<String, LocateError>;
}

#[cfg(test)]
#[path = "provider_fake.rs"]
pub(crate) mod fake;
