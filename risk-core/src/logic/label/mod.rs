//! Label Module - Rule-derived training targets
//!
//! Converts raw attributes into a binary at-risk label. A manual label
//! supplied with the row always takes precedence over the formula.

pub mod rule;

#[cfg(test)]
mod tests;

pub use rule::{ClassBalance, LabelThresholds, label_table};
