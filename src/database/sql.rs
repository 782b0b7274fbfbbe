//! SQL rendering
//!
//! Turns a [`QuerySpec`] into a parameterised statement. Identifiers are
//! always quoted and values always travel as `?` parameters, so nothing from
//! a cursor or a filter is ever spliced into the SQL text.

use crate::query::{OrderBy, Predicate, QuerySpec};
use crate::value::Value;

/// A rendered statement and its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    /// SQL text with `?` placeholders
    pub sql: String,
    /// Parameters in placeholder order
    pub params: Vec<Value>,
}

/// Quote an identifier, splitting schema-qualified names on `.`
pub fn quote_ident(name: &str) -> String {
    name.split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

/// `SELECT <columns> FROM <table> WHERE .. ORDER BY .. LIMIT ..`
pub fn render_select(query: &QuerySpec, columns: &[String]) -> SqlQuery {
    let mut params = Vec::new();

    let projection = if columns.is_empty() {
        "*".to_string()
    } else {
        columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut sql = format!("SELECT {projection} FROM {}", quote_ident(query.table()));
    push_where(&mut sql, query.filters(), &mut params);

    if !query.order_by().is_empty() {
        let terms = query
            .order_by()
            .iter()
            .map(render_order)
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(" ORDER BY ");
        sql.push_str(&terms);
    }

    if let Some(limit) = query.limit() {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    SqlQuery { sql, params }
}

/// `SELECT COUNT(*) FROM <table> WHERE ..`
pub fn render_count(query: &QuerySpec) -> SqlQuery {
    let mut params = Vec::new();
    let mut sql = format!("SELECT COUNT(*) FROM {}", quote_ident(query.table()));
    push_where(&mut sql, query.filters(), &mut params);
    SqlQuery { sql, params }
}

fn push_where(sql: &mut String, filters: &[Predicate], params: &mut Vec<Value>) {
    if filters.is_empty() {
        return;
    }
    let clauses = filters
        .iter()
        .map(|p| render_predicate(p, params))
        .collect::<Vec<_>>()
        .join(" AND ");
    sql.push_str(" WHERE ");
    sql.push_str(&clauses);
}

fn render_order(term: &OrderBy) -> String {
    let mut rendered = format!("{} {}", quote_ident(&term.field), term.order.as_sql());
    if let Some(nulls) = term.nulls {
        rendered.push(' ');
        rendered.push_str(nulls.as_sql());
    }
    rendered
}

fn render_predicate(predicate: &Predicate, params: &mut Vec<Value>) -> String {
    match predicate {
        Predicate::Compare { field, op, value } => {
            params.push(value.clone());
            format!("{} {} ?", quote_ident(field), op.as_sql())
        }
        Predicate::IsNull(field) => format!("{} IS NULL", quote_ident(field)),
        Predicate::IsNotNull(field) => format!("{} IS NOT NULL", quote_ident(field)),
        Predicate::And(branches) => render_group(branches, " AND ", "TRUE", params),
        Predicate::Or(branches) => render_group(branches, " OR ", "FALSE", params),
    }
}

fn render_group(
    branches: &[Predicate],
    joiner: &str,
    empty: &str,
    params: &mut Vec<Value>,
) -> String {
    if branches.is_empty() {
        return empty.to_string();
    }
    let rendered = branches
        .iter()
        .map(|p| render_predicate(p, params))
        .collect::<Vec<_>>()
        .join(joiner);
    format!("({rendered})")
}
