//! JSON body extractor that reports rejections inside the RPC envelope.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use booking_core::error::AppError;

use crate::error::ApiError;

/// Like [`axum::Json`], but a malformed body becomes a `VALIDATION_ERROR`
/// response instead of a plain-text rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct RpcJson<T>(pub T);

impl<T, S> FromRequest<S> for RpcJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError(AppError::validation(rejection.body_text())))?;
        Ok(Self(value))
    }
}
