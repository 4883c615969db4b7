// Dataset assembler - builds and holds one snapshot per section per refresh tick
use crate::application::reshape::{reshape, ReshapeContext};
use crate::application::result_cache::ResultCache;
use crate::domain::calendar::{LocaleTable, ReferenceDate};
use crate::domain::chart::ChartSeries;
use crate::domain::dashboard::{SectionId, Snapshot, TickId};
use crate::domain::tabular::NamedQuery;
use crate::infrastructure::config::SectionConfig;
use chrono::{DateTime, Local, NaiveDate, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Source of "now", injected so snapshots can be built for fixed dates.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day used for query windows and labels.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssemblerError {
    #[error("unknown section: {0}")]
    UnknownSection(SectionId),
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
    pub id: String,
    pub label: String,
}

struct Slot {
    tick: TickId,
    snapshot: Arc<Snapshot>,
}

struct SectionEntry {
    config: SectionConfig,
    slot: Mutex<Option<Slot>>,
}

pub struct DatasetAssembler {
    cache: Arc<ResultCache>,
    sections: Vec<SectionEntry>,
    locale: LocaleTable,
    clock: Arc<dyn Clock>,
}

impl DatasetAssembler {
    pub fn new(
        cache: Arc<ResultCache>,
        sections: Vec<SectionConfig>,
        locale: LocaleTable,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let sections = sections
            .into_iter()
            .map(|config| SectionEntry {
                config,
                slot: Mutex::new(None),
            })
            .collect();
        Self {
            cache,
            sections,
            locale,
            clock,
        }
    }

    pub fn sections(&self) -> Vec<SectionSummary> {
        self.sections
            .iter()
            .map(|s| SectionSummary {
                id: s.config.id.clone(),
                label: s.config.label.clone(),
            })
            .collect()
    }

    /// Snapshot of `section` for `tick`. The same or an older tick returns the
    /// current snapshot; a newer tick rebuilds and replaces it.
    pub async fn get_snapshot(
        &self,
        section: &SectionId,
        tick: TickId,
    ) -> Result<Arc<Snapshot>, AssemblerError> {
        let entry = self
            .sections
            .iter()
            .find(|s| s.config.id == section.as_str())
            .ok_or_else(|| AssemblerError::UnknownSection(section.clone()))?;

        // Held across the rebuild so concurrent callers on a new tick share it
        let mut slot = entry.slot.lock().await;
        if let Some(current) = slot.as_ref() {
            if current.tick >= tick {
                if current.tick > tick {
                    tracing::debug!(
                        "Section {} asked for stale tick {:?}, serving {:?}",
                        section,
                        tick,
                        current.tick
                    );
                }
                return Ok(current.snapshot.clone());
            }
        }

        let snapshot = Arc::new(self.assemble(section, &entry.config, tick).await);
        *slot = Some(Slot {
            tick,
            snapshot: snapshot.clone(),
        });
        Ok(snapshot)
    }

    async fn assemble(&self, section: &SectionId, config: &SectionConfig, tick: TickId) -> Snapshot {
        let started = Instant::now();
        let reference = ReferenceDate::new(self.clock.today());
        let ctx = ReshapeContext::new(reference, self.locale.clone());

        let charts = if config.charts.is_empty() {
            vec![ChartSeries::placeholder(
                &config.id,
                ctx.placeholder_title(config.placeholder_title.as_deref()),
            )]
        } else {
            let builds = config.charts.iter().map(|chart| {
                let ctx = &ctx;
                async move {
                    let query = NamedQuery::new(
                        ctx.render(&chart.query),
                        format!("{}/{}", config.id, chart.id),
                    );
                    let result = self.cache.get_or_execute(&query).await;
                    reshape(&result, chart, ctx)
                }
            });
            join_all(builds).await
        };

        let placeholders = charts.iter().filter(|c| c.is_placeholder()).count();
        tracing::info!(
            "Assembled {} snapshot for tick {}: {} charts ({} placeholders) in {}ms",
            section,
            tick.0,
            charts.len(),
            placeholders,
            started.elapsed().as_millis()
        );

        Snapshot::new(section.clone(), tick, self.clock.now(), reference, charts)
    }
}
