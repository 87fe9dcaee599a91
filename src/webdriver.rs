//! WebDriver-backed document provider over a fantoccini session.

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, Locator as WireLocator};
use tracing::debug;

use crate::errors::LocateError;
use crate::provider::{DocumentProvider, DomQuery};

/// [`DocumentProvider`] speaking the WebDriver wire protocol through a
/// connected [`fantoccini::Client`]. Session setup (capabilities, driver
/// lifecycle, navigation) stays with the caller; this layer only resolves
/// queries and reads element state.
pub struct WebDriverProvider {
    client: Client,
}

impl WebDriverProvider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn into_client(self) -> Client {
        self.client
    }

    /// Sort a wire failure into the engine's error model. Stale references
    /// and no-such-element are transient DOM races worth retrying; anything
    /// else is a backend fault that aborts the poll.
    fn classify(context: &str, err: CmdError) -> LocateError {
        match err {
            CmdError::NoSuchElement(_) => LocateError::EmptyMatch(context.to_string()),
            err if err.to_string().to_lowercase().contains("stale") => {
                LocateError::StaleHandle(context.to_string())
            }
            err => LocateError::Backend(anyhow::Error::new(err)),
        }
    }
}

#[async_trait]
impl DocumentProvider for WebDriverProvider {
    type Handle = Element;

    async fn query(
        &self,
        scope: Option<&Element>,
        query: &DomQuery,
    ) -> Result<Vec<Element>, LocateError> {
        let wire = match query {
            DomQuery::XPath(expression) => WireLocator::XPath(expression),
            DomQuery::Css(selector) => WireLocator::Css(selector),
        };
        debug!(%query, scoped = scope.is_some(), "wire query");
        let found = match scope {
            Some(scope) => scope.find_all(wire).await,
            None => self.client.find_all(wire).await,
        };
        found.map_err(|err| Self::classify(&query.to_string(), err))
    }

    async fn displayed(&self, handle: &Element) -> Result<bool, LocateError> {
        handle
            .is_displayed()
            .await
            .map_err(|err| Self::classify("is_displayed", err))
    }

    async fn attribute(&self, handle: &Element, name: &str) -> Result<Option<String>, LocateError> {
        handle
            .attr(name)
            .await
            .map_err(|err| Self::classify(name, err))
    }

    async fn text(&self, handle: &Element) -> Result<String, LocateError> {
        handle
            .text()
            .await
            .map_err(|err| Self::classify("text", err))
    }
}
