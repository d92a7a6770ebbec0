//! Student Risk Tracker - Core Engine
//!
//! Feature assembly, rule labelling, the random-forest classifier, the
//! training pipeline and narrative generation. The HTTP surface lives in
//! `risk-server`; training runs through the `risk-train` binary.

pub mod constants;
pub mod logic;
