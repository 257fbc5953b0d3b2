//! Forecast result normalization shared by both backends.

pub mod adapter;

pub use adapter::*;
