//! Domain models for the Warehouse ROI platform

mod company;
mod questionnaire;
mod user;

pub use company::*;
pub use questionnaire::*;
pub use user::*;
