//! # webseek
//!
//! Retry-based element location for dynamic documents.
//!
//! Pages mutate while you look at them: elements render late, re-render into
//! fresh nodes, and flicker in and out during transitions. Every lookup here
//! is therefore a poll — the whole locator is re-evaluated from scratch each
//! tick until it succeeds or its timeout lapses — and transient races (stale
//! handles, empty matches) are absorbed between ticks instead of surfacing.
//!
//! ## Locating an element
//!
//! ```no_run
//! use webseek::{Locator, SearchContext, Strategy, WebDriverProvider};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = fantoccini::ClientBuilder::rustls()
//!     .connect("http://localhost:4444")
//!     .await?;
//! let engine = SearchContext::new(WebDriverProvider::new(client));
//!
//! // Retries until the button renders, up to the session timeout.
//! let button = engine
//!     .find(&Locator::new(Strategy::Content).with_qualifier("Sign in"))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Tuning a single lookup
//!
//! Locators carry their own option overrides; anything unset falls back to
//! the owning context's [`SessionConfig`]:
//!
//! ```no_run
//! use std::time::Duration;
//! use webseek::{Locator, Strategy, Visibility};
//!
//! let locator = Locator::new(Strategy::ClassName)
//!     .with_qualifier("spinner overlay")
//!     .with_visibility(Visibility::Any)
//!     .with_timeout(Duration::from_secs(2))
//!     .safe();
//! ```
//!
//! ## Waiting for things to go away
//!
//! [`SearchContext::missing`] polls until a locator stops matching, and
//! [`SearchContext::missing_all`] until a whole set is absent at the same
//! instant — locators that reappear mid-wait are put back under watch.
//!
//! ## Custom backends
//!
//! The engine is generic over [`DocumentProvider`]; [`WebDriverProvider`]
//! drives a live fantoccini session, and any in-memory document can stand in
//! for tests.

/// Injectable time source for the poller.
pub mod clock;

/// The search context tying provider, options and poller together.
pub mod context;

/// Failure taxonomy.
pub mod errors;

/// Locators and their in-memory match predicates.
pub mod locator;

/// Option layering and session defaults.
pub mod options;

/// Generic retry poller.
pub mod poller;

/// The document provider abstraction.
pub mod provider;

/// Structural query expression building.
pub mod query;

/// Locator strategies.
pub mod strategies;

/// WebDriver-backed document provider.
pub mod webdriver;

pub use clock::{Clock, ManualClock, TokioClock};
pub use context::SearchContext;
pub use errors::LocateError;
pub use locator::{Locator, MatchMode};
pub use options::{LocatorOptions, ResolvedOptions, SessionConfig, Visibility};
pub use poller::{Probe, Satisfied, poll, poll_satisfied};
pub use provider::{DocumentProvider, DomQuery};
pub use query::{XPathBuilder, join_and, join_or, literal};
pub use strategies::Strategy;
pub use webdriver::WebDriverProvider;
