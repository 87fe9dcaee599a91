use std::fmt;

/// Immutable fluent builder for XPath query strings.
///
/// Every operation consumes the receiver and returns a new value, so partial
/// expressions can be shared and specialized without aliasing hazards. The
/// builder is pure string assembly; nothing is ever validated against a
/// document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XPathBuilder {
    expr: String,
}

impl XPathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-assembled fragment.
    pub fn from_raw(expr: impl Into<String>) -> Self {
        Self { expr: expr.into() }
    }

    /// Appends `axis::`, inserting a separating `/` unless the last emitted
    /// character makes one redundant.
    fn axis(self, name: &str) -> Self {
        let mut expr = self.expr;
        if !matches!(expr.chars().last(), None | Some('/') | Some('(')) {
            expr.push('/');
        }
        expr.push_str(name);
        expr.push_str("::");
        Self { expr }
    }

    pub fn descendant(self) -> Self {
        self.axis("descendant")
    }

    pub fn descendant_or_self(self) -> Self {
        self.axis("descendant-or-self")
    }

    pub fn child(self) -> Self {
        self.axis("child")
    }

    pub fn current(self) -> Self {
        self.axis("self")
    }

    pub fn parent(self) -> Self {
        self.axis("parent")
    }

    pub fn following(self) -> Self {
        self.axis("following")
    }

    pub fn following_sibling(self) -> Self {
        self.axis("following-sibling")
    }

    pub fn ancestor(self) -> Self {
        self.axis("ancestor")
    }

    pub fn ancestor_or_self(self) -> Self {
        self.axis("ancestor-or-self")
    }

    pub fn preceding(self) -> Self {
        self.axis("preceding")
    }

    pub fn preceding_sibling(self) -> Self {
        self.axis("preceding-sibling")
    }

    /// Wildcard node test.
    pub fn any(self) -> Self {
        self.append("*")
    }

    /// Named node test.
    pub fn node(self, name: &str) -> Self {
        self.append(name)
    }

    /// Boolean join token between two conditions.
    pub fn or(self) -> Self {
        self.append(" or ")
    }

    pub fn and(self) -> Self {
        self.append(" and ")
    }

    /// Attach a boolean predicate: `[condition]`.
    pub fn condition(self, condition: &str) -> Self {
        let mut expr = self.expr;
        expr.push('[');
        expr.push_str(condition);
        expr.push(']');
        Self { expr }
    }

    /// 1-based positional predicate: `[position]`.
    pub fn position(self, position: usize) -> Self {
        self.condition(&position.to_string())
    }

    /// 0-based index, emitted as the 1-based position `[index + 1]`. All
    /// public index parameters are 0-based; all emitted predicates 1-based.
    pub fn index(self, index: usize) -> Self {
        self.position(index + 1)
    }

    /// Parenthesize everything emitted so far.
    pub fn wrap(self) -> Self {
        Self {
            expr: format!("({})", self.expr),
        }
    }

    /// Parenthesize, then attach a 1-based positional predicate.
    pub fn wrap_position(self, position: usize) -> Self {
        self.wrap().position(position)
    }

    /// Parenthesize, then attach a 0-based index as a 1-based predicate.
    pub fn wrap_index(self, index: usize) -> Self {
        self.wrap().index(index)
    }

    fn append(mut self, fragment: &str) -> Self {
        self.expr.push_str(fragment);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.expr.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.expr
    }

    pub fn build(self) -> String {
        self.expr
    }
}

impl fmt::Display for XPathBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expr)
    }
}

/// OR-join condition fragments.
pub fn join_or<I, S>(conditions: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    join(conditions, " or ")
}

/// AND-join condition fragments.
pub fn join_and<I, S>(conditions: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    join(conditions, " and ")
}

fn join<I, S>(conditions: I, separator: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    conditions
        .into_iter()
        .map(|c| c.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Quote a string as an XPath 1.0 literal. A value containing both quote
/// kinds has no single-literal form and falls back to `concat()`.
pub fn literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{value}'")
    } else if !value.contains('"') {
        format!("\"{value}\"")
    } else {
        let mut parts = Vec::new();
        for (i, piece) in value.split('\'').enumerate() {
            if i > 0 {
                parts.push("\"'\"".to_string());
            }
            if !piece.is_empty() {
                parts.push(format!("'{piece}'"));
            }
        }
        format!("concat({})", parts.join(", "))
    }
}

#[cfg(test)]
#[path = "query_test.rs"]
mod query_test;
