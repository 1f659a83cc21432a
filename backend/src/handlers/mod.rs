//! HTTP handlers for the Warehouse ROI platform

pub mod auth;
pub mod company;
pub mod health;
pub mod questionnaire;
pub mod roi;
pub mod transfer;

pub use auth::*;
pub use company::*;
pub use health::*;
pub use questionnaire::*;
pub use roi::*;
pub use transfer::*;
