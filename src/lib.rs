//! Experiment health - health analysis for A/B-test experiments
//!
//! This library reconciles participant counts across the five analysis
//! strategies, derives participant ratios and allocation p-values, and
//! classifies them into severity bands to produce health indicators.

pub mod analysis;
pub mod cli;
pub mod error;
pub mod experiment;
pub mod health;
pub mod input;
pub mod json_output;
pub mod report;
pub mod table_output;
