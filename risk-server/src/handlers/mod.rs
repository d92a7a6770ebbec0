//! HTTP handlers

pub mod health;
pub mod students;
pub mod analysis;
pub mod model;
