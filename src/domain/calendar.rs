// Reference date and month-name tables used for labels and query windows
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The calendar day a snapshot is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReferenceDate(NaiveDate);

impl ReferenceDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn previous_year(&self) -> i32 {
        self.0.year() - 1
    }

    /// Month number, 1-12.
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// (year, month) of the month before, rolling January back to December.
    pub fn previous_month(&self) -> (i32, u32) {
        match self.0.month() {
            1 => (self.0.year() - 1, 12),
            m => (self.0.year(), m - 1),
        }
    }

    /// Template variables shared by query texts and chart titles.
    pub fn template_vars(&self, locale: &LocaleTable) -> HashMap<String, String> {
        let (prev_year_of_month, prev_month) = self.previous_month();
        let mut vars = HashMap::new();
        vars.insert("current_year".to_string(), self.year().to_string());
        vars.insert("previous_year".to_string(), self.previous_year().to_string());
        vars.insert("current_month".to_string(), self.month().to_string());
        vars.insert("previous_month".to_string(), prev_month.to_string());
        vars.insert("previous_month_year".to_string(), prev_year_of_month.to_string());
        vars.insert(
            "current_period".to_string(),
            locale.period_label(self.month(), self.year()),
        );
        vars.insert(
            "previous_period".to_string(),
            locale.period_label(prev_month, prev_year_of_month),
        );
        vars.insert("today".to_string(), self.0.format("%Y-%m-%d").to_string());
        vars
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

/// Explicit month-number to name table plus the fixed UI strings that
/// depend on language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleTable {
    months: [&'static str; 12],
    no_data: &'static str,
}

impl LocaleTable {
    pub fn spanish() -> Self {
        Self {
            months: [
                "Enero", "Febrero", "Marzo", "Abril", "Mayo", "Junio", "Julio", "Agosto",
                "Septiembre", "Octubre", "Noviembre", "Diciembre",
            ],
            no_data: "No hay datos disponibles",
        }
    }

    pub fn english() -> Self {
        Self {
            months: [
                "January", "February", "March", "April", "May", "June", "July", "August",
                "September", "October", "November", "December",
            ],
            no_data: "No data available",
        }
    }

    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::Es => Self::spanish(),
            Locale::En => Self::english(),
        }
    }

    pub fn month_name(&self, month: u32) -> Option<&'static str> {
        if (1..=12).contains(&month) {
            Some(self.months[(month - 1) as usize])
        } else {
            None
        }
    }

    /// "Octubre 2026"
    pub fn period_label(&self, month: u32, year: i32) -> String {
        match self.month_name(month) {
            Some(name) => format!("{} {}", name, year),
            None => format!("{} {}", month, year),
        }
    }

    pub fn no_data(&self) -> &'static str {
        self.no_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> ReferenceDate {
        ReferenceDate::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_previous_month_rolls_over_year() {
        assert_eq!(date(2025, 1, 15).previous_month(), (2024, 12));
        assert_eq!(date(2025, 7, 1).previous_month(), (2025, 6));
    }

    #[test]
    fn test_month_names() {
        let es = LocaleTable::spanish();
        assert_eq!(es.month_name(3), Some("Marzo"));
        assert_eq!(es.month_name(0), None);
        assert_eq!(es.month_name(13), None);
        assert_eq!(LocaleTable::english().month_name(12), Some("December"));
    }

    #[test]
    fn test_template_vars() {
        let vars = date(2025, 1, 15).template_vars(&LocaleTable::spanish());
        assert_eq!(vars["current_year"], "2025");
        assert_eq!(vars["previous_year"], "2024");
        assert_eq!(vars["current_month"], "1");
        assert_eq!(vars["previous_month"], "12");
        assert_eq!(vars["previous_month_year"], "2024");
        assert_eq!(vars["current_period"], "Enero 2025");
        assert_eq!(vars["previous_period"], "Diciembre 2024");
        assert_eq!(vars["today"], "2025-01-15");
    }
}
