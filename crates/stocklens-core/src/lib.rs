//! Core types and traits for stocklens.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, PriceSeries, Fundamentals)
//! - Technical signals and their directional bias
//! - Core traits for indicators and price history sources
//! - Error types shared by every layer

pub mod types;
pub mod traits;
pub mod error;

pub use error::{AnalysisError, AnalysisResult, DataError, ErrorKind};
pub use types::*;
pub use traits::*;
