use crate::domain::calendar::Locale;
use crate::domain::chart::{ChartKind, ValueFormat};
use crate::domain::recipe::ReshapeRecipe;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub store: StoreSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub locale: Locale,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_rpc_function")]
    pub rpc_function: String,
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

impl DashboardConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.store.query_timeout_secs == 0 {
            anyhow::bail!("store.query_timeout_secs must be at least 1");
        }
        Ok(())
    }
}

impl StoreSettings {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheSettings {
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    /// Entries older than this are re-queried. Absent means no expiry.
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

impl CacheSettings {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

fn default_rpc_function() -> String {
    "ejecutar_sql".to_string()
}

fn default_query_timeout_secs() -> u64 {
    10
}

fn default_cache_capacity() -> usize {
    128
}

fn default_bind() -> String {
    "0.0.0.0:8050".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct SectionsConfig {
    #[serde(default)]
    pub sections: Vec<SectionConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SectionConfig {
    pub id: String,
    pub label: String,
    /// Title of the single chart shown while a section has no charts.
    #[serde(default)]
    pub placeholder_title: Option<String>,
    #[serde(default)]
    pub charts: Vec<ChartConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub query: String,
    pub recipe: ReshapeRecipe,
    #[serde(default)]
    pub format: ValueFormat,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub placeholder_title: Option<String>,
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard"))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    let config: DashboardConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

pub fn load_sections_config() -> anyhow::Result<SectionsConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/sections"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recipe::AllowList;
    use config::{Config, File, FileFormat};

    #[test]
    fn test_prepare_query() {
        let mut vars = HashMap::new();
        vars.insert("current_year".to_string(), "2025".to_string());
        vars.insert("current_month".to_string(), "6".to_string());

        let query = "SELECT * FROM pedidos WHERE EXTRACT(YEAR FROM fecha) = ${current_year} AND EXTRACT(MONTH FROM fecha) = ${current_month}";
        let result = prepare_query(query, &vars);

        assert_eq!(
            result,
            "SELECT * FROM pedidos WHERE EXTRACT(YEAR FROM fecha) = 2025 AND EXTRACT(MONTH FROM fecha) = 6"
        );
    }

    fn dashboard_from(toml: &str) -> DashboardConfig {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_zero_query_timeout_is_rejected() {
        let config = dashboard_from(
            r#"
            [store]
            base_url = "http://localhost"
            api_key = "k"
            query_timeout_secs = 0
        "#,
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("query_timeout_secs"));

        let config = dashboard_from(
            r#"
            [store]
            base_url = "http://localhost"
            api_key = "k"
        "#,
        );
        assert!(config.validate().is_ok());
        assert_eq!(config.store.query_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_sections_config_parses_recipes() {
        let toml = r#"
            [[sections]]
            id = "sales"
            label = "Ventas"

            [[sections.charts]]
            id = "monthly"
            title = "Ganancias ${previous_year} vs ${current_year}"
            kind = "line"
            query = "SELECT 1"
            recipe = { type = "pivot_wide", row_key = "mes", column_key = "año", value = "total", allow = { type = "current_and_previous_year" } }

            [[sections.charts]]
            id = "top"
            title = "Top"
            kind = "horizontal_bar"
            format = "count"
            query = "SELECT 2"
            recipe = { type = "top_n", label = "producto", value = "unidades" }

            [[sections]]
            id = "platform"
            label = "Plataforma"
            placeholder_title = "Próximamente"
        "#;
        let parsed: SectionsConfig = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(parsed.sections.len(), 2);
        let sales = &parsed.sections[0];
        assert_eq!(sales.charts.len(), 2);
        assert_eq!(sales.charts[0].kind, ChartKind::Line);
        assert_eq!(sales.charts[0].format, ValueFormat::Currency);
        match &sales.charts[0].recipe {
            ReshapeRecipe::PivotWide { allow, .. } => {
                assert_eq!(*allow, AllowList::CurrentAndPreviousYear)
            }
            other => panic!("unexpected recipe {:?}", other),
        }
        assert_eq!(
            sales.charts[1].recipe,
            ReshapeRecipe::TopN {
                label: "producto".to_string(),
                value: "unidades".to_string(),
                limit: 10,
                descending: true,
            }
        );
        assert!(parsed.sections[1].charts.is_empty());
    }
}
