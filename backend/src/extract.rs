//! Request extractors

use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON body extractor whose rejections use the API error envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
