// Presentation layer - HTTP surface polled by the dashboard UI
pub mod app_state;
pub mod handlers;
