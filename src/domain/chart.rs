// Chart-ready structures produced by the reshape engine
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    HorizontalBar,
    GroupedBar,
    Pie,
    Placeholder,
}

/// How values are printed in labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    #[default]
    Currency,
    Count,
}

impl ValueFormat {
    pub fn format(&self, value: Option<f64>) -> String {
        match (self, value) {
            (_, None) => String::new(),
            (ValueFormat::Currency, Some(v)) => format!("{:.2}", v),
            (ValueFormat::Count, Some(v)) => format!("{:.0}", v.round()),
        }
    }
}

/// Ordering the renderer must apply before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortHint {
    pub descending: bool,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesData {
    pub name: String,
    pub values: Vec<Option<f64>>,
    pub labels: Vec<String>,
}

impl SeriesData {
    pub fn new(name: String, values: Vec<Option<f64>>, format: ValueFormat) -> Self {
        let labels = values.iter().map(|v| format.format(*v)).collect();
        Self {
            name,
            values,
            labels,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    /// Column the category axis is drawn from.
    pub category_key: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub categories: Vec<String>,
    pub series: Vec<SeriesData>,
    pub format: ValueFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortHint>,
    /// (category, value) pairs already ordered and truncated by `sort`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<(String, Option<f64>)>>,
}

impl ChartSeries {
    /// "No data" stand-in for a chart that could not be computed.
    pub fn placeholder(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind: ChartKind::Placeholder,
            category_key: None,
            x_label: None,
            y_label: None,
            categories: Vec::new(),
            series: Vec::new(),
            format: ValueFormat::default(),
            sort: None,
            points: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == ChartKind::Placeholder
    }

    /// Category key followed by series names, i.e. the header of the wide table.
    #[cfg(test)]
    pub fn column_names(&self) -> Vec<String> {
        self.category_key
            .iter()
            .cloned()
            .chain(self.series.iter().map(|s| s.name.clone()))
            .collect()
    }

    /// (category, value) pairs of the first series in the order they should be
    /// drawn, honouring the sort hint. Nulls sort last.
    pub fn rendered_points(&self) -> Vec<(String, Option<f64>)> {
        let Some(first) = self.series.first() else {
            return Vec::new();
        };
        let mut points: Vec<(String, Option<f64>)> = self
            .categories
            .iter()
            .cloned()
            .zip(first.values.iter().copied())
            .collect();

        if let Some(hint) = self.sort {
            points.sort_by(|a, b| match (a.1, b.1) {
                (Some(x), Some(y)) if hint.descending => y.total_cmp(&x),
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
            if let Some(limit) = hint.limit {
                points.truncate(limit);
            }
        }
        points
    }

    /// Attach the drawn points when a sort hint is present.
    pub fn with_rendered_points(mut self) -> Self {
        if self.sort.is_some() {
            self.points = Some(self.rendered_points());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_format() {
        assert_eq!(ValueFormat::Currency.format(Some(1234.5)), "1234.50");
        assert_eq!(ValueFormat::Count.format(Some(12.0)), "12");
        assert_eq!(ValueFormat::Count.format(Some(2.6)), "3");
        assert_eq!(ValueFormat::Currency.format(None), "");
    }

    #[test]
    fn test_rendered_points_nulls_last() {
        let chart = ChartSeries {
            sort: Some(SortHint {
                descending: true,
                limit: Some(2),
            }),
            categories: vec!["a".into(), "b".into(), "c".into()],
            series: vec![SeriesData::new(
                "v".into(),
                vec![None, Some(1.0), Some(5.0)],
                ValueFormat::Count,
            )],
            ..ChartSeries::placeholder("x", "t")
        };
        assert_eq!(
            chart.rendered_points(),
            vec![("c".to_string(), Some(5.0)), ("b".to_string(), Some(1.0))]
        );
    }

    #[test]
    fn test_points_serialized_only_with_sort_hint() {
        let unsorted = ChartSeries {
            categories: vec!["a".into()],
            series: vec![SeriesData::new("v".into(), vec![Some(1.0)], ValueFormat::Count)],
            ..ChartSeries::placeholder("x", "t")
        }
        .with_rendered_points();
        assert_eq!(unsorted.points, None);
        let json = serde_json::to_value(&unsorted).unwrap();
        assert!(json.get("points").is_none());

        let sorted = ChartSeries {
            sort: Some(SortHint {
                descending: false,
                limit: None,
            }),
            ..unsorted
        }
        .with_rendered_points();
        let json = serde_json::to_value(&sorted).unwrap();
        assert_eq!(json["points"], serde_json::json!([["a", 1.0]]));
    }
}
