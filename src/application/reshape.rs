// Reshape engine - turns tabular results into chart-ready series
use crate::domain::calendar::{LocaleTable, ReferenceDate};
use crate::domain::chart::{ChartSeries, SeriesData, SortHint};
use crate::domain::recipe::{AllowList, ReshapeRecipe};
use crate::domain::tabular::{Scalar, TabularResult};
use crate::infrastructure::config::{prepare_query, ChartConfig};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Date and language in effect for one reshape pass.
#[derive(Debug, Clone)]
pub struct ReshapeContext {
    pub reference: ReferenceDate,
    pub locale: LocaleTable,
    vars: HashMap<String, String>,
}

impl ReshapeContext {
    pub fn new(reference: ReferenceDate, locale: LocaleTable) -> Self {
        let vars = reference.template_vars(&locale);
        Self {
            reference,
            locale,
            vars,
        }
    }

    /// Substitute `${...}` date variables into a query or title template.
    pub fn render(&self, template: &str) -> String {
        prepare_query(template, &self.vars)
    }

    pub fn placeholder_title(&self, configured: Option<&str>) -> String {
        match configured {
            Some(title) => self.render(title),
            None => self.locale.no_data().to_string(),
        }
    }
}

/// Intermediate shape shared by all recipes before labels are formatted.
struct Shaped {
    category_key: String,
    categories: Vec<String>,
    series: Vec<(String, Vec<Option<f64>>)>,
    sort: Option<SortHint>,
}

pub fn reshape(result: &TabularResult, chart: &ChartConfig, ctx: &ReshapeContext) -> ChartSeries {
    let placeholder =
        || ChartSeries::placeholder(&chart.id, ctx.placeholder_title(chart.placeholder_title.as_deref()));

    if result.is_empty() {
        tracing::debug!("Chart {} has no rows, using placeholder", chart.id);
        return placeholder();
    }

    let shaped = match &chart.recipe {
        ReshapeRecipe::PivotWide {
            row_key,
            column_key,
            value,
            allow,
        } => pivot_wide(result, row_key, column_key, value, allow, ctx),
        ReshapeRecipe::CategoryLabel {
            code,
            suffix,
            value,
        } => category_label(result, code, suffix.as_deref(), value, &ctx.locale),
        ReshapeRecipe::TopN {
            label,
            value,
            limit,
            descending,
        } => top_n(result, label, value, *limit, *descending),
        ReshapeRecipe::Proportion { names, values } => proportion(result, names, values),
        ReshapeRecipe::Overlay { key, values } => overlay(result, key, values),
    };

    let Some(shaped) = shaped else {
        tracing::debug!(
            "Chart {} is missing required columns (have {:?}), using placeholder",
            chart.id,
            result.columns()
        );
        return placeholder();
    };

    ChartSeries {
        id: chart.id.clone(),
        title: ctx.render(&chart.title),
        kind: chart.kind,
        category_key: Some(shaped.category_key),
        x_label: chart.x_label.clone(),
        y_label: chart.y_label.clone(),
        categories: shaped.categories,
        series: shaped
            .series
            .into_iter()
            .map(|(name, values)| SeriesData::new(name, values, chart.format))
            .collect(),
        format: chart.format,
        sort: shaped.sort,
        points: None,
    }
    .with_rendered_points()
}

/// Natural order: numerically when both sides are numbers, textually otherwise.
fn natural_cmp(a: &Scalar, b: &Scalar) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.to_string().cmp(&b.to_string()),
    }
}

/// Allowed pivot columns as (column key, display label), in output order.
fn allowed_columns(allow: &AllowList, ctx: &ReshapeContext) -> Vec<(String, String)> {
    let reference = &ctx.reference;
    match allow {
        AllowList::CurrentAndPreviousYear => [reference.previous_year(), reference.year()]
            .iter()
            .map(|y| (y.to_string(), y.to_string()))
            .collect(),
        AllowList::CurrentAndPreviousMonth => {
            let (prev_year, prev_month) = reference.previous_month();
            vec![
                (
                    prev_month.to_string(),
                    ctx.locale.period_label(prev_month, prev_year),
                ),
                (
                    reference.month().to_string(),
                    ctx.locale.period_label(reference.month(), reference.year()),
                ),
            ]
        }
        AllowList::Explicit { columns } => {
            columns.iter().map(|c| (c.clone(), c.clone())).collect()
        }
    }
}

/// Long rows (row key, column key, value) or already-wide rows become one
/// row per row key with one column per allowed column key. Missing cells are 0.
fn pivot_wide(
    result: &TabularResult,
    row_key: &str,
    column_key: &str,
    value: &str,
    allow: &AllowList,
    ctx: &ReshapeContext,
) -> Option<Shaped> {
    if !result.has_column(row_key) {
        return None;
    }
    let long_format = result.has_column(column_key);
    if long_format && !result.has_column(value) {
        return None;
    }

    let mut row_keys: Vec<Scalar> = Vec::new();
    let mut cells: HashMap<(String, String), Option<f64>> = HashMap::new();

    for row in result.rows() {
        let Some(key) = row.get(row_key).filter(|k| !k.is_null()) else {
            continue;
        };
        let key_label = key.to_string();
        if !row_keys.iter().any(|k| k.to_string() == key_label) {
            row_keys.push(key.clone());
        }

        if long_format {
            let Some(column) = row.get(column_key).filter(|c| !c.is_null()) else {
                continue;
            };
            let cell = row.get(value).and_then(Scalar::as_f64);
            cells.insert((key_label, column.to_string()), cell);
        } else {
            for (column, cell) in row.iter().filter(|(c, _)| c.as_str() != row_key) {
                cells.insert((key_label.clone(), column.clone()), cell.as_f64());
            }
        }
    }

    row_keys.sort_by(natural_cmp);
    let row_labels: Vec<String> = row_keys.iter().map(Scalar::to_string).collect();

    let series: Vec<(String, Vec<Option<f64>>)> = allowed_columns(allow, ctx)
        .into_iter()
        .filter(|(column, _)| cells.keys().any(|(_, c)| c == column))
        .map(|(column, label)| {
            let values = row_labels
                .iter()
                .map(|row| {
                    let cell = cells.get(&(row.clone(), column.clone())).copied().flatten();
                    Some(cell.unwrap_or(0.0))
                })
                .collect();
            (label, values)
        })
        .collect();

    if series.is_empty() {
        return None;
    }

    Some(Shaped {
        category_key: row_key.to_string(),
        categories: row_labels,
        series,
        sort: None,
    })
}

/// Map a month code to its localized name (optionally suffixed, e.g. with the
/// year) and order rows chronologically.
fn category_label(
    result: &TabularResult,
    code: &str,
    suffix: Option<&str>,
    value: &str,
    locale: &LocaleTable,
) -> Option<Shaped> {
    if !result.has_column(code) || !result.has_column(value) {
        return None;
    }

    struct Entry {
        suffix: Scalar,
        code_order: Option<f64>,
        mapped: bool,
        label: String,
        value: Option<f64>,
    }

    let mut entries: Vec<Entry> = result
        .rows()
        .iter()
        .map(|row| {
            let code_cell = row.get(code).cloned().unwrap_or(Scalar::Null);
            let code_order = code_cell.as_f64();
            let month_name = code_order
                .filter(|c| c.fract() == 0.0)
                .and_then(|c| locale.month_name(c as u32));
            let base = month_name
                .map(str::to_string)
                .unwrap_or_else(|| code_cell.to_string());

            let suffix_cell = suffix.and_then(|s| row.get(s));
            let label = match suffix_cell.filter(|s| !s.is_null()) {
                Some(s) => format!("{} {}", base, s),
                None => base,
            };

            Entry {
                suffix: suffix_cell.cloned().unwrap_or(Scalar::Null),
                code_order,
                mapped: month_name.is_some(),
                label,
                value: row.get(value).and_then(Scalar::as_f64),
            }
        })
        .collect();

    let by_option = |a: Option<f64>, b: Option<f64>| match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    // Missing suffixes go last; text suffixes such as "2024-12" compare as text
    let by_suffix = |a: &Scalar, b: &Scalar| match (a.is_null(), b.is_null()) {
        (false, false) => natural_cmp(a, b),
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => Ordering::Equal,
    };
    entries.sort_by(|a, b| {
        by_suffix(&a.suffix, &b.suffix)
            .then_with(|| b.mapped.cmp(&a.mapped))
            .then_with(|| by_option(a.code_order, b.code_order))
            .then_with(|| a.label.cmp(&b.label))
    });

    Some(Shaped {
        category_key: code.to_string(),
        categories: entries.iter().map(|e| e.label.clone()).collect(),
        series: vec![(value.to_string(), entries.iter().map(|e| e.value).collect())],
        sort: None,
    })
}

/// Rows pass through in input order; ordering and truncation are left to the
/// renderer through the sort hint.
fn top_n(
    result: &TabularResult,
    label: &str,
    value: &str,
    limit: usize,
    descending: bool,
) -> Option<Shaped> {
    let mut shaped = pass_through(result, label, &[value])?;
    shaped.sort = Some(SortHint {
        descending,
        limit: Some(limit),
    });
    Some(shaped)
}

fn proportion(result: &TabularResult, names: &str, values: &str) -> Option<Shaped> {
    if !result.has_column(values) {
        return None;
    }
    pass_through(result, names, &[values])
}

fn overlay(result: &TabularResult, key: &str, values: &[String]) -> Option<Shaped> {
    let present: Vec<&str> = values
        .iter()
        .map(String::as_str)
        .filter(|v| result.has_column(v))
        .collect();
    if present.is_empty() {
        return None;
    }
    pass_through(result, key, &present)
}

/// One category per row, one series per value column present in the result.
fn pass_through(result: &TabularResult, key: &str, values: &[&str]) -> Option<Shaped> {
    if !result.has_column(key) {
        return None;
    }
    let series: Vec<(String, Vec<Option<f64>>)> = values
        .iter()
        .filter(|v| result.has_column(v))
        .map(|v| {
            let column = result
                .rows()
                .iter()
                .map(|row| row.get(*v).and_then(Scalar::as_f64))
                .collect();
            (v.to_string(), column)
        })
        .collect();
    if series.is_empty() {
        return None;
    }

    Some(Shaped {
        category_key: key.to_string(),
        categories: result
            .rows()
            .iter()
            .map(|row| row.get(key).map(Scalar::to_string).unwrap_or_default())
            .collect(),
        series,
        sort: None,
    })
}
