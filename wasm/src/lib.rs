//! WebAssembly module for the Warehouse ROI platform
//!
//! Provides client-side computation for:
//! - ROI estimates while the questionnaire is being filled in
//! - Answer validation before saving
//! - The question catalogue for offline rendering

use rust_decimal::Decimal;
use shared::Answers;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::roi::*;
pub use shared::types::*;
pub use shared::validation::*;

fn parse_answers(answers_json: &str) -> Result<Answers, JsValue> {
    serde_json::from_str(answers_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid answers JSON: {}", e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

#[cfg(target_arch = "wasm32")]
fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn warn(_message: &str) {}

/// Calculate the ROI estimate for answers given as a JSON object
#[wasm_bindgen(js_name = calculateRoi)]
pub fn calculate_roi_json(answers_json: &str) -> Result<String, JsValue> {
    let answers = parse_answers(answers_json)?;
    to_json(&calculate_roi(&answers))
}

/// Same as `calculateRoi`, taking and returning plain JS objects
#[wasm_bindgen(js_name = calculateRoiObject)]
pub fn calculate_roi_object(answers: JsValue) -> Result<JsValue, JsValue> {
    let answers_json: String = js_sys::JSON::stringify(&answers)?.into();
    let result_json = calculate_roi_json(&answers_json)?;
    js_sys::JSON::parse(&result_json)
}

/// Check answers against the catalogue.
/// Returns `null` when valid, otherwise the error message.
#[wasm_bindgen(js_name = validateAnswers)]
pub fn validate_answers_json(answers_json: &str) -> Result<Option<String>, JsValue> {
    let answers = parse_answers(answers_json)?;
    match validate_answers(&answers) {
        Ok(()) => Ok(None),
        Err(e) => {
            warn(&e.to_string());
            Ok(Some(e.to_string()))
        }
    }
}

/// The question catalogue as JSON
#[wasm_bindgen(js_name = questions)]
pub fn questions_json() -> Result<String, JsValue> {
    to_json(&QUESTIONS)
}

/// Maturity band name for an overall score percentage
#[wasm_bindgen(js_name = maturityLevel)]
pub fn maturity_level(score_percent: f64) -> String {
    let score = Decimal::try_from(score_percent).unwrap_or(Decimal::ZERO);
    MaturityLevel::from_score(score).to_string()
}
