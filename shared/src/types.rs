//! Common types used across the platform

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Company;

/// Questionnaire answers keyed by question id.
/// Values are numbers or numeric strings; `null` marks an unanswered question.
pub type Answers = BTreeMap<String, Value>;

/// Version written into exported data files
pub const DATA_FILE_VERSION: &str = "1.0";

/// Portable export of companies and their answers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataFile {
    pub companies: Vec<Company>,
    /// Answers keyed by company id
    #[serde(default)]
    pub answers: BTreeMap<String, Answers>,
    pub export_date: DateTime<Utc>,
    pub version: String,
}

impl DataFile {
    pub fn new(companies: Vec<Company>, answers: BTreeMap<String, Answers>) -> Self {
        Self {
            companies,
            answers,
            export_date: Utc::now(),
            version: DATA_FILE_VERSION.to_string(),
        }
    }
}
