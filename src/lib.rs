// Profitability and delivery-risk analytics for a professional-services firm.
//
// Data flows one way: raw table -> filtered raw view -> derived view ->
// {health index, findings, questions, consolidated metrics, scenarios}.
// Scenario output is a separate counterfactual table and never feeds back
// into filtering.
pub mod cache;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod generator;
pub mod health;
pub mod insights;
pub mod loader;
pub mod metrics;
pub mod output;
pub mod questions;
pub mod reports;
pub mod simulator;
pub mod types;
pub mod util;

#[cfg(test)]
mod fixtures;

pub use error::{Error, Result};
