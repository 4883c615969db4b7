// Application state for HTTP handlers
use crate::application::dataset_assembler::{Clock, DatasetAssembler};
use std::sync::Arc;

pub struct AppState {
    pub assembler: DatasetAssembler,
    pub clock: Arc<dyn Clock>,
    pub refresh_interval_secs: u64,
}
