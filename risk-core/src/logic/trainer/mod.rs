//! Trainer Module - offline classifier training
//!
//! Collects the configured sources, labels every row, fits the forest,
//! evaluates it and writes the artifact the server loads.

pub mod sources;
pub mod pipeline;

#[cfg(test)]
mod tests;

pub use sources::TrainingSources;
pub use pipeline::{TrainError, Trainer, TrainerConfig, TrainingOutcome};
