pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod finder;
pub mod loader;
pub mod recommend;
pub mod service;
pub mod sheet_selector;

pub use config::Config;
pub use error::{CompareError, Result};
pub use service::{CompareOptions, CompareRequest, CompareSummary, Comparer, RecommendMode};
