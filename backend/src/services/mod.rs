//! Business logic services for the Warehouse ROI platform

pub mod auth;
pub mod company;
pub mod questionnaire;
pub mod reporting;
pub mod transfer;

pub use auth::AuthService;
pub use company::CompanyService;
pub use questionnaire::QuestionnaireService;
pub use reporting::ReportingService;
pub use transfer::TransferService;
