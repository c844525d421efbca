//! SQL literal rendering.
//!
//! Every value that lands in an emitted INSERT goes through [`SqlValue`].

use chrono::{NaiveDate, NaiveDateTime};

/// SQL value representation
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    /// Fixed-point number rendered with `scale` decimal places
    Decimal { value: f64, scale: u8 },
    String(String),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl SqlValue {
    pub fn text(s: impl Into<String>) -> Self {
        SqlValue::String(s.into())
    }

    pub fn decimal(value: f64, scale: u8) -> Self {
        SqlValue::Decimal { value, scale }
    }

    /// Integer payload, if this is an integer literal
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SqlValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Format for a MySQL INSERT statement
    pub fn to_sql(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Int(n) => n.to_string(),
            SqlValue::Decimal { value, scale } => format!("{:.*}", *scale as usize, value),
            SqlValue::String(s) => escape_str(s),
            SqlValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            SqlValue::Date(d) => escape_str(&d.format("%Y-%m-%d").to_string()),
            SqlValue::DateTime(dt) => escape_str(&dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

/// Quote a string literal, doubling embedded single quotes.
pub fn escape_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/// Reverse [`escape_str`]. Returns `None` when `literal` is not a quoted string.
pub fn unescape_str(literal: &str) -> Option<String> {
    let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            // a lone quote inside the literal means it was never escaped
            if chars.next() != Some('\'') {
                return None;
            }
        }
        out.push(c);
    }
    Some(out)
}

/// A row of generated data
pub type Row = Vec<SqlValue>;
