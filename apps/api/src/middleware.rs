use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use baladiya_core::{AppError, UserIdentity};
use tower_sessions::Session;

use crate::auth::SESSION_USER_KEY;
use crate::error::ApiResult;
use crate::state::AppState;

/// Rejects requests without a session identity and exposes it to handlers.
pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Rejects state-changing requests that do not come from the frontend origin.
pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method())
        && !is_same_origin(request.headers(), &state.frontend_url)
    {
        tracing::warn!(
            method = %request.method(),
            path = request.uri().path(),
            "blocked cross-origin mutation"
        );
        return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
    }

    Ok(next.run(request).await)
}

fn is_same_origin(headers: &HeaderMap, allowed_origin: &str) -> bool {
    if headers
        .get("sec-fetch-site")
        .is_some_and(|fetch_site| fetch_site == "cross-site")
    {
        return false;
    }

    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    };

    header_value(header::ORIGIN) == allowed_origin
        || header_value(header::REFERER).starts_with(allowed_origin)
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, Method, header};

    use super::{is_same_origin, is_state_changing_method};

    const FRONTEND: &str = "http://localhost:3000";

    #[test]
    fn matching_origin_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ORIGIN, HeaderValue::from_static(FRONTEND));
        assert!(is_same_origin(&headers, FRONTEND));
    }

    #[test]
    fn referer_under_frontend_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::REFERER,
            HeaderValue::from_static("http://localhost:3000/delegations"),
        );
        assert!(is_same_origin(&headers, FRONTEND));
    }

    #[test]
    fn cross_site_fetch_is_rejected_even_with_origin() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ORIGIN, HeaderValue::from_static(FRONTEND));
        headers.insert("sec-fetch-site", HeaderValue::from_static("cross-site"));
        assert!(!is_same_origin(&headers, FRONTEND));
    }

    #[test]
    fn missing_headers_are_rejected() {
        assert!(!is_same_origin(&HeaderMap::new(), FRONTEND));
    }

    #[test]
    fn reads_are_not_state_changing() {
        assert!(!is_state_changing_method(&Method::GET));
        assert!(is_state_changing_method(&Method::PUT));
    }
}
