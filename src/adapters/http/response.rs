use crate::utils::error::RaffleError;
use serde::Serialize;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::reply::{Reply, Response};
use warp::Rejection;

#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

/// JSON envelope shared by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            error: None,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }
}

impl ApiResponse<()> {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            data: None,
            error: Some(ApiErrorBody {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// Rejection carrying a domain error out of a filter.
#[derive(Debug)]
pub struct ApiRejection(pub RaffleError);

impl warp::reject::Reject for ApiRejection {}

pub fn json_reply<T: Serialize>(status: StatusCode, body: &ApiResponse<T>) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

pub fn error_reply(err: &RaffleError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if err.is_client_error() {
        tracing::debug!(code = err.code(), error = %err, "Request rejected");
    } else {
        tracing::error!(code = err.code(), error = %err, "Request failed");
    }
    json_reply(
        status,
        &ApiResponse::error(err.code(), err.user_friendly_message()),
    )
}

/// Turns a service result into a reply, using `status` on success.
pub fn respond<T: Serialize>(
    result: crate::utils::error::Result<T>,
    status: StatusCode,
    message: Option<&str>,
) -> Response {
    match result {
        Ok(data) => {
            let body = match message {
                Some(m) => ApiResponse::with_message(m, data),
                None => ApiResponse::success(data),
            };
            json_reply(status, &body)
        }
        Err(e) => error_reply(&e),
    }
}

pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if let Some(ApiRejection(e)) = err.find::<ApiRejection>() {
        return Ok(error_reply(e));
    }

    let (status, code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not_found", "Resource not found.".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, "validation_error", e.to_string())
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, "validation_error", e.to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "payload_too_large",
            "Request body is too large.".to_string(),
        )
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "unsupported_media_type",
            "Expected a JSON body.".to_string(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "method_not_allowed",
            "Method not allowed.".to_string(),
        )
    } else {
        tracing::error!(rejection = ?err, "Unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal server error.".to_string(),
        )
    };

    Ok(json_reply(status, &ApiResponse::error(code, message)))
}
