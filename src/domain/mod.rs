// Domain layer - Core data model
pub mod calendar;
pub mod chart;
pub mod dashboard;
pub mod recipe;
pub mod tabular;
