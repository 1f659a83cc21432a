//! Company models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

/// A company being assessed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    /// Free-form client state (dashboard settings, derived figures, notes)
    #[serde(default)]
    pub data: Value,
    /// Username of the creator
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    pub fn is_owned_by(&self, username: &str) -> bool {
        self.created_by == username
    }
}

/// Input for creating a company
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewCompany {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Input for updating a company
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CompanyUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub data: Option<Value>,
}
