// Unit tests for the XPath builder

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_first_axis_needs_no_separator() {
    assert_eq!(XPathBuilder::new().descendant().any().build(), "descendant::*");
}

#[test]
fn test_chained_axes_are_slash_separated() {
    let expr = XPathBuilder::new()
        .ancestor()
        .node("table")
        .descendant()
        .node("th")
        .build();
    assert_eq!(expr, "ancestor::table/descendant::th");
}

#[test]
fn test_axis_after_open_paren_needs_no_separator() {
    let expr = XPathBuilder::from_raw("(").descendant().any().build();
    assert_eq!(expr, "(descendant::*");
}

#[test]
fn test_axis_after_predicate_is_separated() {
    let expr = XPathBuilder::new()
        .node("td")
        .index(1)
        .descendant_or_self()
        .any()
        .build();
    assert_eq!(expr, "td[2]/descendant-or-self::*");
}

#[test]
fn test_all_axes_emit_their_names() {
    let cases: [(&str, fn(XPathBuilder) -> XPathBuilder); 11] = [
        ("descendant", XPathBuilder::descendant),
        ("descendant-or-self", XPathBuilder::descendant_or_self),
        ("child", XPathBuilder::child),
        ("self", XPathBuilder::current),
        ("parent", XPathBuilder::parent),
        ("following", XPathBuilder::following),
        ("following-sibling", XPathBuilder::following_sibling),
        ("ancestor", XPathBuilder::ancestor),
        ("ancestor-or-self", XPathBuilder::ancestor_or_self),
        ("preceding", XPathBuilder::preceding),
        ("preceding-sibling", XPathBuilder::preceding_sibling),
    ];
    for (name, apply) in cases {
        assert_eq!(apply(XPathBuilder::new()).build(), format!("{name}::"));
    }
}

#[test]
fn test_index_translates_zero_based_to_one_based() {
    assert_eq!(XPathBuilder::new().any().index(0).build(), "*[1]");
    assert_eq!(XPathBuilder::new().any().index(2).build(), "*[3]");
}

#[test]
fn test_position_is_emitted_verbatim() {
    assert_eq!(XPathBuilder::new().any().position(1).build(), "*[1]");
}

#[test]
fn test_wrap_variants() {
    let base = XPathBuilder::new().descendant().any().condition("@id = 'x'");
    assert_eq!(base.clone().wrap().build(), "(descendant::*[@id = 'x'])");
    assert_eq!(
        base.clone().wrap_index(2).build(),
        "(descendant::*[@id = 'x'])[3]"
    );
    assert_eq!(base.wrap_position(3).build(), "(descendant::*[@id = 'x'])[3]");
}

#[test]
fn test_builder_operations_do_not_mutate_the_original() {
    let base = XPathBuilder::new().descendant().any();
    let specialized = base.clone().condition("@id = 'x'");
    assert_eq!(base.as_str(), "descendant::*");
    assert_eq!(specialized.as_str(), "descendant::*[@id = 'x']");
}

#[test]
fn test_boolean_join_tokens() {
    assert_eq!(XPathBuilder::from_raw("@a = '1'").or().build(), "@a = '1' or ");
    assert_eq!(XPathBuilder::from_raw("@a = '1'").and().build(), "@a = '1' and ");
}

#[test]
fn test_join_helpers() {
    assert_eq!(join_or(["a", "b", "c"]), "a or b or c");
    assert_eq!(join_and(["a", "b"]), "a and b");
    assert_eq!(join_or(["only"]), "only");
    assert_eq!(join_and(Vec::<String>::new()), "");
}

#[test]
fn test_literal_quoting() {
    assert_eq!(literal("plain"), "'plain'");
    assert_eq!(literal("it's"), "\"it's\"");
    assert_eq!(
        literal("both ' and \""),
        "concat('both ', \"'\", ' and \"')"
    );
}
