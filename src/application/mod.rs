// Application layer - Query execution, caching and reshaping
pub mod dataset_assembler;
pub mod query_executor;
pub mod query_store;
pub mod reshape;
pub mod result_cache;
