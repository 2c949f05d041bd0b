//! Analyses over a simulated or externally supplied search area

pub mod mandatory;
pub mod partition;
