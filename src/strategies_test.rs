// Unit tests for strategy query building and two-phase execution

use pretty_assertions::assert_eq;

use super::*;
use crate::locator::MatchMode;
use crate::provider::fake::{FakeDom, FakeHandle};

fn config() -> SessionConfig {
    SessionConfig::default()
}

fn options() -> ResolvedOptions {
    config().defaults()
}

fn xpath_for(locator: &Locator) -> String {
    match build_query(locator, &config()).unwrap() {
        DomQuery::XPath(expr) => expr,
        DomQuery::Css(expr) => panic!("expected xpath, got css:{expr}"),
    }
}

#[test]
fn test_id_query() {
    let locator = Locator::new(Strategy::Id).with_qualifier("save");
    assert_eq!(xpath_for(&locator), "descendant::*[@id = 'save']");
}

#[test]
fn test_id_query_with_index_wraps_the_container() {
    let locator = Locator::new(Strategy::Id).with_qualifier("save").at_index(2);
    assert_eq!(
        xpath_for(&locator),
        "(descendant::*[@id = 'save'])[3]/descendant-or-self::*"
    );
}

#[test]
fn test_id_query_honors_configured_identifier_attribute() {
    let config = SessionConfig {
        id_attribute: "data-testid".to_string(),
        ..SessionConfig::default()
    };
    let locator = Locator::new(Strategy::Id).with_qualifier("save");
    let DomQuery::XPath(expr) = build_query(&locator, &config).unwrap() else {
        panic!("expected xpath");
    };
    assert_eq!(expr, "descendant::*[@data-testid = 'save']");
}

#[test]
fn test_name_query() {
    let locator = Locator::new(Strategy::Name).with_qualifier("email");
    assert_eq!(xpath_for(&locator), "descendant::*[@name = 'email']");
}

#[test]
fn test_class_query_normalizes_whitespace() {
    let locator = Locator::new(Strategy::ClassName).with_qualifier("btn");
    assert_eq!(
        xpath_for(&locator),
        "descendant::*[contains(concat(' ', normalize-space(@class), ' '), ' btn ')]"
    );
}

#[test]
fn test_class_query_requires_all_tokens_of_one_qualifier() {
    let locator = Locator::new(Strategy::ClassName)
        .with_qualifier("btn primary")
        .with_qualifier("link");
    assert_eq!(
        xpath_for(&locator),
        "descendant::*[(contains(concat(' ', normalize-space(@class), ' '), ' btn ') \
         and contains(concat(' ', normalize-space(@class), ' '), ' primary ')) \
         or contains(concat(' ', normalize-space(@class), ' '), ' link ')]"
    );
}

#[test]
fn test_content_query() {
    let locator = Locator::new(Strategy::Content).with_qualifier("Save");
    assert_eq!(xpath_for(&locator), "descendant::*[text() = 'Save']");
}

#[test]
fn test_content_query_with_index_has_no_container_reentry() {
    let locator = Locator::new(Strategy::Content).with_qualifier("Save").at_index(0);
    assert_eq!(xpath_for(&locator), "(descendant::*[text() = 'Save'])[1]");
}

#[test]
fn test_content_or_value_query() {
    let locator = Locator::new(Strategy::ContentOrValue).with_qualifier("Save");
    assert_eq!(
        xpath_for(&locator),
        "descendant::*[text() = 'Save' or @value = 'Save']"
    );
}

#[test]
fn test_value_query() {
    let locator = Locator::new(Strategy::Value).with_qualifier("42");
    assert_eq!(xpath_for(&locator), "descendant::*[@value = '42']");
}

#[test]
fn test_attribute_query() {
    let locator = Locator::new(Strategy::Attribute("data-role".to_string()))
        .with_qualifier("menu")
        .with_match_mode(MatchMode::StartsWith);
    assert_eq!(
        xpath_for(&locator),
        "descendant::*[starts-with(@data-role, 'menu')]"
    );
}

#[test]
fn test_raw_query_single_fragment_passes_through() {
    let locator = Locator::new(Strategy::XPath).with_qualifier("//div[@data-x]");
    assert_eq!(xpath_for(&locator), "//div[@data-x]");
}

#[test]
fn test_raw_query_with_index_disambiguates_containers() {
    let locator = Locator::new(Strategy::XPath)
        .with_qualifier("//div[@data-x]")
        .at_index(1);
    assert_eq!(
        xpath_for(&locator),
        "(//div[@data-x])[2]/descendant-or-self::*"
    );
}

#[test]
fn test_raw_query_unions_multiple_fragments() {
    let locator = Locator::new(Strategy::XPath)
        .with_qualifier("//a")
        .with_qualifier("//b");
    assert_eq!(xpath_for(&locator), "(//a) | (//b)");
}

#[test]
fn test_column_index_query() {
    let locator = Locator::new(Strategy::ColumnIndex).at_index(1);
    assert_eq!(xpath_for(&locator), "td[2]/descendant-or-self::*");
}

#[test]
fn test_css_query() {
    let locator = Locator::new(Strategy::Css).with_qualifier("button.save");
    assert_eq!(
        build_query(&locator, &config()).unwrap(),
        DomQuery::Css("button.save".to_string())
    );
}

#[test]
fn test_invalid_configurations() {
    let no_qualifier = Locator::new(Strategy::Id);
    assert!(matches!(
        build_query(&no_qualifier, &config()),
        Err(LocateError::InvalidConfiguration(_))
    ));

    let unnamed_attribute = Locator::new(Strategy::Attribute(String::new())).with_qualifier("x");
    assert!(matches!(
        build_query(&unnamed_attribute, &config()),
        Err(LocateError::InvalidConfiguration(_))
    ));

    let blank_fragment = Locator::new(Strategy::XPath).with_qualifier("  ");
    assert!(matches!(
        build_query(&blank_fragment, &config()),
        Err(LocateError::InvalidConfiguration(_))
    ));

    let unindexed_column = Locator::new(Strategy::ColumnIndex);
    assert!(matches!(
        build_query(&unindexed_column, &config()),
        Err(LocateError::InvalidConfiguration(_))
    ));

    let two_phase = Locator::new(Strategy::Label).with_qualifier("User Name");
    assert!(matches!(
        build_query(&two_phase, &config()),
        Err(LocateError::InvalidConfiguration(_))
    ));
}

#[tokio::test]
async fn test_css_index_picks_into_the_raw_matched_set() {
    let dom = FakeDom::new();
    dom.always(
        "button.save",
        vec![
            FakeHandle::new("first"),
            FakeHandle::new("second"),
            FakeHandle::new("third"),
        ],
    );

    let locator = Locator::new(Strategy::Css).with_qualifier("button.save").at_index(1);
    let found = evaluate(&dom, None, &locator, &options(), &config())
        .await
        .unwrap();
    assert_eq!(found, vec![FakeHandle::new("second")]);
}

#[tokio::test]
async fn test_visibility_filter_drops_hidden_elements() {
    let dom = FakeDom::new();
    dom.always(
        "descendant::*[@id = 'save']",
        vec![FakeHandle::hidden("ghost"), FakeHandle::new("real")],
    );

    let locator = Locator::new(Strategy::Id).with_qualifier("save");
    let visible = evaluate(&dom, None, &locator, &options(), &config())
        .await
        .unwrap();
    assert_eq!(visible, vec![FakeHandle::new("real")]);

    let any = ResolvedOptions {
        visibility: Visibility::Any,
        ..options()
    };
    let all = evaluate(&dom, None, &locator, &any, &config()).await.unwrap();
    assert_eq!(all.len(), 2);

    let invisible = ResolvedOptions {
        visibility: Visibility::Invisible,
        ..options()
    };
    let hidden = evaluate(&dom, None, &locator, &invisible, &config())
        .await
        .unwrap();
    assert_eq!(hidden, vec![FakeHandle::hidden("ghost")]);
}

#[tokio::test]
async fn test_label_delegates_to_identifier_strategy() {
    let dom = FakeDom::new();
    dom.always(
        "descendant::label[text() = 'User Name']",
        vec![FakeHandle::new("label").with_attr("for", "uname")],
    );
    dom.always(
        "descendant::*[@id = 'uname']",
        vec![FakeHandle::new("input")],
    );

    let locator = Locator::new(Strategy::Label).with_qualifier("User Name");
    let found = evaluate(&dom, None, &locator, &options(), &config())
        .await
        .unwrap();
    assert_eq!(found, vec![FakeHandle::new("input")]);
}

#[tokio::test]
async fn test_label_match_is_case_insensitive_when_asked() {
    let dom = FakeDom::new();
    // The phase-1 query folds case on both sides; the delegated identifier
    // lookup stays exact.
    let folded = format!(
        "descendant::label[translate(text(), '{}', '{}') = 'user name']",
        "ABCDEFGHIJKLMNOPQRSTUVWXYZ", "abcdefghijklmnopqrstuvwxyz"
    );
    dom.always(&folded, vec![FakeHandle::new("label").with_attr("for", "uname")]);
    dom.always(
        "descendant::*[@id = 'uname']",
        vec![FakeHandle::new("input")],
    );

    let locator = Locator::new(Strategy::Label)
        .with_qualifier("USER name")
        .case_insensitive();
    let found = evaluate(&dom, None, &locator, &options(), &config())
        .await
        .unwrap();
    assert_eq!(found, vec![FakeHandle::new("input")]);
}

#[tokio::test]
async fn test_label_miss_in_safe_mode_skips_phase_two() {
    let dom = FakeDom::new();
    dom.always(
        "descendant::*[@id = 'uname']",
        vec![FakeHandle::new("input")],
    );

    let safe = ResolvedOptions {
        throw_on_fail: false,
        ..options()
    };
    let locator = Locator::new(Strategy::Label).with_qualifier("User Name");
    let found = evaluate(&dom, None, &locator, &safe, &config()).await.unwrap();

    assert!(found.is_empty());
    assert_eq!(dom.calls("descendant::*[@id = 'uname']"), 0);
}

#[tokio::test]
async fn test_label_miss_propagates_as_retryable_empty_match() {
    let dom = FakeDom::new();
    let locator = Locator::new(Strategy::Label).with_qualifier("User Name");

    let result = evaluate(&dom, None, &locator, &options(), &config()).await;
    match result {
        Err(err) => assert!(err.is_retryable()),
        Ok(found) => panic!("expected a miss, found {} handles", found.len()),
    }
}

#[tokio::test]
async fn test_label_honors_index_in_phase_one() {
    let dom = FakeDom::new();
    dom.always(
        "(descendant::label[text() = 'Option'])[2]",
        vec![FakeHandle::new("label").with_attr("for", "opt-b")],
    );
    dom.always(
        "descendant::*[@id = 'opt-b']",
        vec![FakeHandle::new("radio")],
    );

    let locator = Locator::new(Strategy::Label).with_qualifier("Option").at_index(1);
    let found = evaluate(&dom, None, &locator, &options(), &config())
        .await
        .unwrap();
    assert_eq!(found, vec![FakeHandle::new("radio")]);
}

const HEADERS_QUERY: &str = "ancestor::table[descendant::th][1]/descendant::th";

#[tokio::test]
async fn test_column_header_resolves_position_then_cell() {
    let dom = FakeDom::new();
    dom.always(
        HEADERS_QUERY,
        vec![
            FakeHandle::new("h0").with_text("Name"),
            FakeHandle::new("h1").with_text("Age"),
            FakeHandle::new("h2").with_text("City"),
        ],
    );
    dom.always(
        "td[2]/descendant-or-self::*",
        vec![FakeHandle::new("age-cell")],
    );

    let row = FakeHandle::new("row");
    let locator = Locator::new(Strategy::ColumnHeader).with_qualifier("Age");
    let found = evaluate(&dom, Some(&row), &locator, &options(), &config())
        .await
        .unwrap();
    assert_eq!(found, vec![FakeHandle::new("age-cell")]);
}

#[tokio::test]
async fn test_column_header_miss_respects_safe_mode() {
    let dom = FakeDom::new();
    dom.always(HEADERS_QUERY, vec![FakeHandle::new("h0").with_text("Name")]);

    let row = FakeHandle::new("row");
    let locator = Locator::new(Strategy::ColumnHeader).with_qualifier("Age");

    let unsafe_result = evaluate(&dom, Some(&row), &locator, &options(), &config()).await;
    assert!(matches!(unsafe_result, Err(LocateError::EmptyMatch(_))));

    let safe = ResolvedOptions {
        throw_on_fail: false,
        ..options()
    };
    let safe_result = evaluate(&dom, Some(&row), &locator, &safe, &config())
        .await
        .unwrap();
    assert!(safe_result.is_empty());
}

#[tokio::test]
async fn test_column_header_uses_the_match_mode() {
    let dom = FakeDom::new();
    dom.always(
        HEADERS_QUERY,
        vec![
            FakeHandle::new("h0").with_text("Full Name"),
            FakeHandle::new("h1").with_text("Age (years)"),
        ],
    );
    dom.always(
        "td[2]/descendant-or-self::*",
        vec![FakeHandle::new("age-cell")],
    );

    let row = FakeHandle::new("row");
    let locator = Locator::new(Strategy::ColumnHeader)
        .with_qualifier("Age")
        .with_match_mode(MatchMode::StartsWith);
    let found = evaluate(&dom, Some(&row), &locator, &options(), &config())
        .await
        .unwrap();
    assert_eq!(found, vec![FakeHandle::new("age-cell")]);
}
