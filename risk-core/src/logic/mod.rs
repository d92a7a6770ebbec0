//! Logic Module - Business Logic & Engines
//!
//! ## Architecture
//! - `features/` - Feature layout, tabular sources, table builder
//! - `label/` - Rule-derived training targets
//! - `model/` - Random forest, artifact, repository, inference
//! - `trainer/` - Offline training pipeline
//! - `narrative/` - Prompt rendering and text-generation backends

pub mod features;
pub mod label;
pub mod model;
pub mod trainer;
pub mod narrative;
