// Reshape recipes: how one tabular result becomes one chart
use serde::Deserialize;

/// Which pivoted columns survive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AllowList {
    /// Previous and current calendar year, in that order.
    CurrentAndPreviousYear,
    /// Previous and current month number, relabelled as "Mes Año".
    CurrentAndPreviousMonth,
    Explicit { columns: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReshapeRecipe {
    PivotWide {
        row_key: String,
        column_key: String,
        value: String,
        allow: AllowList,
    },
    CategoryLabel {
        code: String,
        #[serde(default)]
        suffix: Option<String>,
        value: String,
    },
    TopN {
        label: String,
        value: String,
        #[serde(default = "default_top_n")]
        limit: usize,
        #[serde(default = "default_descending")]
        descending: bool,
    },
    Proportion {
        names: String,
        values: String,
    },
    Overlay {
        key: String,
        values: Vec<String>,
    },
}

fn default_top_n() -> usize {
    10
}

fn default_descending() -> bool {
    true
}
