//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and logged in full at the `debug` level. Multipart uploads are
/// passed through untouched and only their headers are logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    if is_multipart(&request) {
        let (headers, body) = request.into_parts();
        log_request(&headers, "<multipart form data>");
        let response = next.run(Request::from_parts(headers, body)).await;

        return match extract_header_and_body_text_from_response(response).await {
            Ok((headers, body_text)) => {
                log_response(&headers, &body_text);
                Response::from_parts(headers, Body::from(body_text))
            }
            Err(response) => response,
        };
    }

    let (headers, body_text) = match extract_header_and_body_text_from_request(request).await {
        Ok(parts) => parts,
        Err(response) => return response,
    };
    log_request(&headers, &body_text);

    let request = Request::from_parts(headers, Body::from(body_text));
    let response = next.run(request).await;

    match extract_header_and_body_text_from_response(response).await {
        Ok((headers, body_text)) => {
            log_response(&headers, &body_text);
            Response::from_parts(headers, Body::from(body_text))
        }
        Err(response) => response,
    }
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

async fn extract_header_and_body_text_from_request(
    request: Request,
) -> Result<(axum::http::request::Parts, String), Response> {
    let (headers, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|error| {
            tracing::error!("could not read request body: {error}");
            StatusCode::BAD_REQUEST.into_response()
        })?;

    Ok((headers, String::from_utf8_lossy(&body_bytes).to_string()))
}

async fn extract_header_and_body_text_from_response(
    response: Response,
) -> Result<(axum::http::response::Parts, String), Response> {
    let (headers, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|error| {
            tracing::error!("could not read response body: {error}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })?;

    Ok((headers, String::from_utf8_lossy(&body_bytes).to_string()))
}

/// The number of bytes of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The longest prefix of `body` that fits in [LOG_BODY_LENGTH_LIMIT] bytes
/// without splitting a character.
fn truncate(body: &str) -> &str {
    let mut end = LOG_BODY_LENGTH_LIMIT.min(body.len());

    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_request(headers: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {} {}\nbody: {:}...",
            headers.method,
            headers.uri,
            truncate(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!(
            "Received request: {} {}\nbody: {body:?}",
            headers.method,
            headers.uri
        );
    }
}

fn log_response(headers: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {}\nbody: {:}...",
            headers.status,
            truncate(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {}\nbody: {body:?}", headers.status);
    }
}
