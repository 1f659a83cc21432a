//! Shared types and models for the Warehouse ROI platform
//!
//! This crate contains the questionnaire catalogue, the ROI calculator and
//! the types shared between the backend and the browser (via WASM).

pub mod models;
pub mod roi;
pub mod types;
pub mod validation;

pub use models::*;
pub use roi::*;
pub use types::*;
pub use validation::*;
