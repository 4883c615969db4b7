// Tabular query results
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A single cell value as returned by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
    Null,
}

impl Scalar {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Scalar::Null,
            Value::Bool(b) => Scalar::Number(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => n.as_f64().map(Scalar::Number).unwrap_or(Scalar::Null),
            Value::String(s) => Scalar::Text(s.clone()),
            other => Scalar::Text(other.to_string()),
        }
    }

    /// Numeric view of the cell. Text is accepted when it parses as a number
    /// (numeric columns often come back as strings); anything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) if n.is_finite() => Some(*n),
            Scalar::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

impl fmt::Display for Scalar {
    /// Label form: integral numbers print without a fractional part so that
    /// `2024.0` and `"2024"` produce the same axis label.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Null => Ok(()),
        }
    }
}

pub type Row = BTreeMap<String, Scalar>;

/// Rows returned for one query. Column sets may differ from row to row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularResult {
    rows: Vec<Row>,
}

impl TabularResult {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when at least one row carries the column.
    pub fn has_column(&self, name: &str) -> bool {
        self.rows.iter().any(|row| row.contains_key(name))
    }

    /// Union of all column names, in first-seen order.
    pub fn columns(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for row in &self.rows {
            for key in row.keys() {
                if !seen.contains(key) {
                    seen.push(key.clone());
                }
            }
        }
        seen
    }
}

/// A query together with what it is for. Identity is the exact text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedQuery {
    pub text: String,
    pub purpose: String,
}

impl NamedQuery {
    pub fn new(text: impl Into<String>, purpose: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            purpose: purpose.into(),
        }
    }
}

#[cfg(test)]
pub(crate) fn row(cells: &[(&str, Scalar)]) -> Row {
    cells
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}
