//! Store-agnostic restriction trees.
//!
//! A restriction is built as a tree of `(column, operator, value)` predicates
//! combined with AND/OR groups. It can then be:
//! - rendered to SQL with `$n` placeholders plus a separate [`ParamList`], or
//! - evaluated directly against a [`Record`] by the in-memory store.
//!
//! No value ever appears in the rendered SQL text; the parameter indices are
//! computed at render time.

use crate::schema::{Column, Record};
use crate::value::{FieldRef, ParamList, Value};
use std::cmp::Ordering;

/// Comparison operator for [`Predicate::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Gte,
    Lte,
}

impl CmpOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Gte => ">=",
            CmpOp::Lte => "<=",
        }
    }

    fn holds(self, ordering: Option<Ordering>) -> bool {
        match (self, ordering) {
            (_, None) => false,
            (CmpOp::Eq, Some(o)) => o == Ordering::Equal,
            (CmpOp::Gte, Some(o)) => o != Ordering::Less,
            (CmpOp::Lte, Some(o)) => o != Ordering::Greater,
        }
    }
}

/// A single column-level restriction.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<C> {
    /// `column op $n`
    Compare { column: C, op: CmpOp, value: Value },
    /// `LOWER(column COLLATE "C") LIKE $n` where `$n` is the escaped,
    /// lowercased `%needle%`.
    ///
    /// Case folding is ASCII-only in both stores: under the `C` collation
    /// PostgreSQL's `LOWER` leaves non-ASCII letters alone, and the in-memory
    /// match uses `to_ascii_lowercase`.
    ContainsIgnoreCase { column: C, needle: String },
    /// `$n = ANY(column)` over an array column
    HasElement { column: C, element: String },
}

impl<C: Column> Predicate<C> {
    fn render(&self, params: &mut ParamList) -> String {
        match self {
            Predicate::Compare { column, op, value } => {
                let idx = params.push(value.clone());
                format!("{} {} ${}", column.name(), op.as_sql(), idx)
            }
            Predicate::ContainsIgnoreCase { column, needle } => {
                let idx = params.push(like_pattern(needle));
                format!("LOWER({} COLLATE \"C\") LIKE ${}", column.name(), idx)
            }
            Predicate::HasElement { column, element } => {
                let idx = params.push(element.as_str());
                format!("${} = ANY({})", idx, column.name())
            }
        }
    }

    fn matches<R: Record<Column = C>>(&self, record: &R) -> bool {
        match self {
            Predicate::Compare { column, op, value } => {
                op.holds(record.field(*column).compare(value))
            }
            Predicate::ContainsIgnoreCase { column, needle } => match record.field(*column) {
                FieldRef::Text(haystack) => haystack
                    .to_ascii_lowercase()
                    .contains(&needle.to_ascii_lowercase()),
                _ => false,
            },
            Predicate::HasElement { column, element } => match record.field(*column) {
                FieldRef::TextArray(items) => items.iter().any(|item| item == element),
                _ => false,
            },
        }
    }
}

/// Build a `%needle%` LIKE pattern, escaping the LIKE metacharacters so the
/// needle only ever matches literally.
fn like_pattern(needle: &str) -> String {
    let needle = needle.to_ascii_lowercase();
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Expression node: a predicate or an AND/OR group of expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<C> {
    /// All conditions must be true. An empty group is always true.
    And(Vec<Expr<C>>),
    /// At least one condition must be true. An empty group is always false.
    Or(Vec<Expr<C>>),
    Pred(Predicate<C>),
}

impl<C: Column> Expr<C> {
    /// Create an AND expression from a list of expressions.
    pub fn and(exprs: Vec<Expr<C>>) -> Self {
        Expr::And(exprs)
    }

    /// Create an OR expression from a list of expressions.
    pub fn or(exprs: Vec<Expr<C>>) -> Self {
        Expr::Or(exprs)
    }

    /// Create an equality condition: column = value
    pub fn eq(column: C, value: impl Into<Value>) -> Self {
        Expr::Pred(Predicate::Compare {
            column,
            op: CmpOp::Eq,
            value: value.into(),
        })
    }

    /// Create a greater-than-or-equal condition: column >= value
    pub fn gte(column: C, value: impl Into<Value>) -> Self {
        Expr::Pred(Predicate::Compare {
            column,
            op: CmpOp::Gte,
            value: value.into(),
        })
    }

    /// Create a less-than-or-equal condition: column <= value
    pub fn lte(column: C, value: impl Into<Value>) -> Self {
        Expr::Pred(Predicate::Compare {
            column,
            op: CmpOp::Lte,
            value: value.into(),
        })
    }

    /// Case-insensitive substring containment.
    pub fn contains_ignore_case(column: C, needle: impl Into<String>) -> Self {
        Expr::Pred(Predicate::ContainsIgnoreCase {
            column,
            needle: needle.into(),
        })
    }

    /// The array column contains an element equal to `element`.
    pub fn has_element(column: C, element: impl Into<String>) -> Self {
        Expr::Pred(Predicate::HasElement {
            column,
            element: element.into(),
        })
    }

    /// Render to SQL, appending bound values to `params`.
    ///
    /// Placeholders continue from `params.len()`, so a restriction can be
    /// rendered after other parameters (e.g. the SET list of an UPDATE).
    pub fn render(&self, params: &mut ParamList) -> String {
        match self {
            Expr::And(items) if items.is_empty() => "TRUE".to_string(),
            Expr::Or(items) if items.is_empty() => "FALSE".to_string(),
            Expr::And(items) => render_group(items, " AND ", params),
            Expr::Or(items) => render_group(items, " OR ", params),
            Expr::Pred(pred) => pred.render(params),
        }
    }

    /// Evaluate against a record with the same semantics as the rendered SQL.
    pub fn matches<R: Record<Column = C>>(&self, record: &R) -> bool {
        match self {
            Expr::And(items) => items.iter().all(|e| e.matches(record)),
            Expr::Or(items) => items.iter().any(|e| e.matches(record)),
            Expr::Pred(pred) => pred.matches(record),
        }
    }

    /// The node that actually renders: single-item groups render as their
    /// only child, so they are looked through.
    fn effective(&self) -> &Expr<C> {
        match self {
            Expr::And(items) | Expr::Or(items) if items.len() == 1 => items[0].effective(),
            _ => self,
        }
    }

    fn is_group(&self) -> bool {
        matches!(self, Expr::And(items) | Expr::Or(items) if items.len() > 1)
    }
}

fn render_group<C: Column>(items: &[Expr<C>], sep: &str, params: &mut ParamList) -> String {
    if let [only] = items {
        return only.render(params);
    }
    let parts: Vec<String> = items
        .iter()
        .map(|item| {
            let item = item.effective();
            let sql = item.render(params);
            if item.is_group() {
                format!("({sql})")
            } else {
                sql
            }
        })
        .collect();
    parts.join(sep)
}
