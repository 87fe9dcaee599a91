// Scripted in-memory document provider for deterministic engine tests.
//
// Each query string is scripted as a sequence of per-call outcomes so tests
// can play out appearance, disappearance, flicker and staleness tick by
// tick. Once a script is exhausted its last outcome repeats; unscripted
// queries match nothing.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{DocumentProvider, DomQuery};
use crate::errors::LocateError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FakeHandle {
    pub id: String,
    pub displayed: bool,
    pub text: String,
    pub attributes: Vec<(String, String)>,
}

impl FakeHandle {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            displayed: true,
            text: String::new(),
            attributes: Vec::new(),
        }
    }

    pub fn hidden(id: &str) -> Self {
        Self {
            displayed: false,
            ..Self::new(id)
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }
}

/// One scripted outcome for one call of a query.
#[derive(Clone, Debug)]
pub(crate) enum FakeTick {
    Elements(Vec<FakeHandle>),
    Stale,
}

impl FakeTick {
    pub fn none() -> Self {
        FakeTick::Elements(Vec::new())
    }

    pub fn one(handle: FakeHandle) -> Self {
        FakeTick::Elements(vec![handle])
    }
}

#[derive(Default)]
struct Script {
    ticks: Vec<FakeTick>,
    calls: usize,
}

#[derive(Default)]
pub(crate) struct FakeDom {
    scripts: Mutex<HashMap<String, Script>>,
}

impl FakeDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script successive outcomes for a query; the last one repeats.
    pub fn script(&self, query: &str, ticks: Vec<FakeTick>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(query.to_string(), Script { ticks, calls: 0 });
    }

    /// Script a single outcome that holds for every call.
    pub fn always(&self, query: &str, handles: Vec<FakeHandle>) {
        self.script(query, vec![FakeTick::Elements(handles)]);
    }

    /// How many times the query has been evaluated.
    pub fn calls(&self, query: &str) -> usize {
        self.scripts
            .lock()
            .unwrap()
            .get(query)
            .map(|s| s.calls)
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentProvider for FakeDom {
    type Handle = FakeHandle;

    async fn query(
        &self,
        _scope: Option<&FakeHandle>,
        query: &DomQuery,
    ) -> Result<Vec<FakeHandle>, LocateError> {
        let mut scripts = self.scripts.lock().unwrap();
        let Some(script) = scripts.get_mut(query.expression()) else {
            return Ok(Vec::new());
        };
        let tick = script
            .ticks
            .get(script.calls)
            .or_else(|| script.ticks.last())
            .cloned();
        script.calls += 1;
        match tick {
            Some(FakeTick::Elements(handles)) => Ok(handles),
            Some(FakeTick::Stale) => Err(LocateError::StaleHandle(query.to_string())),
            None => Ok(Vec::new()),
        }
    }

    async fn displayed(&self, handle: &FakeHandle) -> Result<bool, LocateError> {
        Ok(handle.displayed)
    }

    async fn attribute(
        &self,
        handle: &FakeHandle,
        name: &str,
    ) -> Result<Option<String>, LocateError> {
        Ok(handle
            .attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.clone()))
    }

    async fn text(&self, handle: &FakeHandle) -> Result<String, LocateError> {
        Ok(handle.text.clone())
    }
}
