// src/lib.rs

pub mod aggregate;
pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod process;

pub use aggregate::{AggregateTable, Aggregator, RunOutput, RunReport};
pub use config::{Config, FailurePolicy};
pub use error::ScrapeError;
pub use fetch::{ClemencyLink, HttpSource, PageSource};
pub use process::{NormalizedRecord, Status};
