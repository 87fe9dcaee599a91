//! Semantic-to-structural locator strategies.
//!
//! Single-phase strategies translate a locator's qualifiers into one
//! structural query. The two-phase strategies (label, column header) run a
//! first lookup against the provider and delegate the second phase to their
//! single-phase counterpart (identifier, column index) — explicit
//! composition between variants of the tagged union, not inheritance.

use tracing::debug;

use crate::errors::LocateError;
use crate::locator::Locator;
use crate::options::{ResolvedOptions, SessionConfig, Visibility};
use crate::provider::{DocumentProvider, DomQuery};
use crate::query::{XPathBuilder, join_and, join_or};

/// Locator strategies as a tagged union.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Identifier attribute (configurable, `@id` by default).
    #[default]
    Id,
    /// `@name` attribute.
    Name,
    /// Space-separated `@class` tokens.
    ClassName,
    /// Text content.
    Content,
    /// Text content or `@value`.
    ContentOrValue,
    /// `@value` attribute.
    Value,
    /// An arbitrary named attribute.
    Attribute(String),
    /// Raw XPath fragments supplied as qualifiers.
    XPath,
    /// Raw CSS selector supplied as the first qualifier.
    Css,
    /// Two-phase: label text, then the element its `for` attribute names.
    Label,
    /// Two-phase: column header text, then the cell at that column.
    ColumnHeader,
    /// Cell at the locator's 0-based column index, relative to the row scope.
    ColumnIndex,
}

impl Strategy {
    /// Whether resolution needs a secondary lookup against the provider.
    pub fn is_two_phase(&self) -> bool {
        matches!(self, Strategy::Label | Strategy::ColumnHeader)
    }
}

/// Build the structural query for a single-phase strategy.
pub(crate) fn build_query(
    locator: &Locator,
    config: &SessionConfig,
) -> Result<DomQuery, LocateError> {
    match locator.strategy() {
        Strategy::Id => {
            require_qualifiers(locator)?;
            let target = format!("@{}", config.id_attribute);
            Ok(DomQuery::XPath(container_query(
                locator,
                &locator.terms_condition(&target),
            )))
        }
        Strategy::Name => {
            require_qualifiers(locator)?;
            Ok(DomQuery::XPath(container_query(
                locator,
                &locator.terms_condition("@name"),
            )))
        }
        Strategy::ClassName => {
            require_qualifiers(locator)?;
            Ok(DomQuery::XPath(container_query(
                locator,
                &class_condition(locator),
            )))
        }
        Strategy::Content => {
            require_qualifiers(locator)?;
            Ok(DomQuery::XPath(condition_query(
                locator,
                &locator.terms_condition("text()"),
            )))
        }
        Strategy::ContentOrValue => {
            require_qualifiers(locator)?;
            let condition = join_or([
                locator.terms_condition("text()"),
                locator.terms_condition("@value"),
            ]);
            Ok(DomQuery::XPath(condition_query(locator, &condition)))
        }
        Strategy::Value => {
            require_qualifiers(locator)?;
            Ok(DomQuery::XPath(condition_query(
                locator,
                &locator.terms_condition("@value"),
            )))
        }
        Strategy::Attribute(name) => {
            require_qualifiers(locator)?;
            if name.is_empty() {
                return Err(LocateError::InvalidConfiguration(
                    "attribute strategy needs an attribute name".to_string(),
                ));
            }
            Ok(DomQuery::XPath(condition_query(
                locator,
                &locator.terms_condition(&format!("@{name}")),
            )))
        }
        Strategy::XPath => Ok(DomQuery::XPath(raw_query(locator)?)),
        Strategy::Css => {
            require_qualifiers(locator)?;
            Ok(DomQuery::Css(locator.qualifiers()[0].clone()))
        }
        Strategy::ColumnIndex => {
            let Some(index) = locator.index() else {
                return Err(LocateError::InvalidConfiguration(
                    "column index strategy needs an index".to_string(),
                ));
            };
            Ok(DomQuery::XPath(
                XPathBuilder::new()
                    .node("td")
                    .index(index)
                    .descendant_or_self()
                    .any()
                    .build(),
            ))
        }
        Strategy::Label | Strategy::ColumnHeader => Err(LocateError::InvalidConfiguration(
            "two-phase strategy has no single structural query".to_string(),
        )),
    }
}

/// Evaluate a locator once against the provider, applying the visibility
/// filter. Two-phase strategies run their first phase here and delegate.
pub(crate) async fn evaluate<P: DocumentProvider>(
    provider: &P,
    scope: Option<&P::Handle>,
    locator: &Locator,
    options: &ResolvedOptions,
    config: &SessionConfig,
) -> Result<Vec<P::Handle>, LocateError> {
    match locator.strategy() {
        Strategy::Label => evaluate_label(provider, scope, locator, options, config).await,
        Strategy::ColumnHeader => {
            evaluate_column_header(provider, scope, locator, options, config).await
        }
        _ => evaluate_single(provider, scope, locator, options, config).await,
    }
}

async fn evaluate_single<P: DocumentProvider>(
    provider: &P,
    scope: Option<&P::Handle>,
    locator: &Locator,
    options: &ResolvedOptions,
    config: &SessionConfig,
) -> Result<Vec<P::Handle>, LocateError> {
    let query = build_query(locator, config)?;
    debug!(query = %query, "evaluating locator");
    let handles = provider.query(scope, &query).await?;

    // CSS indexing picks directly into the raw matched set; no
    // positional-predicate rewriting.
    let handles = if matches!(locator.strategy(), Strategy::Css) {
        match locator.index() {
            Some(index) => handles.into_iter().nth(index).into_iter().collect(),
            None => handles,
        }
    } else {
        handles
    };

    filter_visibility(provider, handles, options.visibility).await
}

/// Phase 1: find the label whose content matches; phase 2: delegate to the
/// identifier strategy with the label's `for` reference as an exact-match,
/// index-free qualifier. A phase-1 miss is the whole strategy's miss; phase
/// 2 is never attempted.
async fn evaluate_label<P: DocumentProvider>(
    provider: &P,
    scope: Option<&P::Handle>,
    locator: &Locator,
    options: &ResolvedOptions,
    config: &SessionConfig,
) -> Result<Vec<P::Handle>, LocateError> {
    require_qualifiers(locator)?;
    let base = XPathBuilder::new()
        .descendant()
        .node("label")
        .condition(&locator.terms_condition("text()"));
    let query = match locator.index() {
        Some(index) => base.wrap_index(index).build(),
        None => base.build(),
    };

    let labels = provider.query(scope, &DomQuery::XPath(query)).await?;
    let Some(label) = labels.first() else {
        return phase_miss(locator, options, "label not found");
    };
    let Some(target) = provider.attribute(label, "for").await? else {
        return phase_miss(locator, options, "label has no 'for' reference");
    };

    debug!(target = %target, "label resolved, delegating to identifier strategy");
    let delegate = Locator::new(Strategy::Id).with_qualifier(target);
    evaluate_single(provider, scope, &delegate, options, config).await
}

/// Phase 1: match the locator's predicate against the header cells of the
/// nearest ancestor table that has headers, taking the matching header's
/// 0-based position; phase 2: delegate to the column-index strategy.
async fn evaluate_column_header<P: DocumentProvider>(
    provider: &P,
    scope: Option<&P::Handle>,
    locator: &Locator,
    options: &ResolvedOptions,
    config: &SessionConfig,
) -> Result<Vec<P::Handle>, LocateError> {
    require_qualifiers(locator)?;
    let headers_query = XPathBuilder::new()
        .ancestor()
        .node("table")
        .condition("descendant::th")
        .position(1)
        .descendant()
        .node("th")
        .build();

    let headers = provider.query(scope, &DomQuery::XPath(headers_query)).await?;
    let mut column = None;
    for (position, header) in headers.iter().enumerate() {
        let text = provider.text(header).await?;
        let hit = locator.qualifiers().iter().any(|qualifier| {
            locator
                .match_mode()
                .matches(&text, qualifier, locator.is_case_insensitive())
        });
        if hit {
            column = Some(position);
            break;
        }
    }
    let Some(column) = column else {
        return phase_miss(locator, options, "no table header matches");
    };

    debug!(column, "column header resolved, delegating to column index");
    let delegate = Locator::new(Strategy::ColumnIndex).at_index(column);
    evaluate_single(provider, scope, &delegate, options, config).await
}

/// A first-phase miss propagates as the whole strategy's failure mode:
/// retryable empty-match when the locator demands a failure, silent absence
/// in safe mode. The terminal `NotFound` is raised by the timeout layer.
fn phase_miss<H>(
    locator: &Locator,
    options: &ResolvedOptions,
    reason: &str,
) -> Result<Vec<H>, LocateError> {
    if options.throw_on_fail {
        Err(LocateError::EmptyMatch(format!(
            "{reason}: {}",
            locator.describe()
        )))
    } else {
        Ok(Vec::new())
    }
}

async fn filter_visibility<P: DocumentProvider>(
    provider: &P,
    handles: Vec<P::Handle>,
    visibility: Visibility,
) -> Result<Vec<P::Handle>, LocateError> {
    if !visibility.needs_displayed() {
        return Ok(handles);
    }
    let mut kept = Vec::with_capacity(handles.len());
    for handle in handles {
        if visibility.admits(provider.displayed(&handle).await?) {
            kept.push(handle);
        }
    }
    Ok(kept)
}

/// Condition query with the positional filter applied to the matched
/// container: the position disambiguates among candidate containers and the
/// expression re-enters at `descendant-or-self::`, so resolution continues
/// relative to that container rather than the raw match.
fn container_query(locator: &Locator, condition: &str) -> String {
    let base = XPathBuilder::new().descendant().any().condition(condition);
    match locator.index() {
        Some(index) => base.wrap_index(index).descendant_or_self().any().build(),
        None => base.build(),
    }
}

/// Plain condition query; an index becomes a wrapped positional predicate
/// without container re-entry.
fn condition_query(locator: &Locator, condition: &str) -> String {
    let base = XPathBuilder::new().descendant().any().condition(condition);
    match locator.index() {
        Some(index) => base.wrap_index(index).build(),
        None => base.build(),
    }
}

/// ALL whitespace-separated tokens of one qualifier must be present in
/// `@class` (AND within a qualifier); any qualifier may match (OR across).
fn class_condition(locator: &Locator) -> String {
    join_or(locator.qualifiers().iter().map(|qualifier| {
        let tokens: Vec<String> = qualifier
            .split_whitespace()
            .map(|token| {
                format!("contains(concat(' ', normalize-space(@class), ' '), ' {token} ')")
            })
            .collect();
        if tokens.len() == 1 {
            tokens.into_iter().next().unwrap_or_default()
        } else {
            format!("({})", join_and(tokens))
        }
    }))
}

/// Raw XPath fragments: a single qualifier is used as-is, several are
/// parenthesized and unioned. An index disambiguates containers exactly like
/// the identifier strategy.
fn raw_query(locator: &Locator) -> Result<String, LocateError> {
    require_qualifiers(locator)?;
    if locator
        .qualifiers()
        .iter()
        .any(|fragment| fragment.trim().is_empty())
    {
        return Err(LocateError::InvalidConfiguration(
            "malformed raw query: blank fragment".to_string(),
        ));
    }
    let combined = if locator.qualifiers().len() == 1 {
        locator.qualifiers()[0].clone()
    } else {
        locator
            .qualifiers()
            .iter()
            .map(|fragment| format!("({fragment})"))
            .collect::<Vec<_>>()
            .join(" | ")
    };
    Ok(match locator.index() {
        Some(index) => XPathBuilder::from_raw(combined)
            .wrap_index(index)
            .descendant_or_self()
            .any()
            .build(),
        None => combined,
    })
}

fn require_qualifiers(locator: &Locator) -> Result<(), LocateError> {
    if locator.qualifiers().is_empty() {
        return Err(LocateError::InvalidConfiguration(format!(
            "{:?} strategy needs at least one qualifier",
            locator.strategy()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "strategies_test.rs"]
mod strategies_test;
