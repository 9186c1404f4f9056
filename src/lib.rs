pub mod app;
pub mod cache;
pub mod config;
pub mod core;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod queue;
pub mod stats;
pub mod ui;

pub use error::{DashboardError, Result};
