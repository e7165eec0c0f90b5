use api_shared::{authorize, AuthError, ROLE_HEADER};
use axum::http::{HeaderMap, StatusCode};
use navigator_core::{NavigatorError, Role, Tab};
use std::future::Future;

/// Status and message returned by every failing handler.
pub type ApiError = (StatusCode, String);
pub type ApiResult<T> = Result<T, ApiError>;

pub fn status_of(err: &NavigatorError) -> StatusCode {
    match err {
        NavigatorError::UnknownNode { .. }
        | NavigatorError::UnknownComponent(_)
        | NavigatorError::UnknownIncident(_)
        | NavigatorError::UnknownWizard(_)
        | NavigatorError::UnknownSession(_)
        | NavigatorError::NoDiagnosticChat => StatusCode::NOT_FOUND,
        NavigatorError::InvalidInput(_)
        | NavigatorError::EmptyInput
        | NavigatorError::InvalidOption { .. }
        | NavigatorError::NoHistory
        | NavigatorError::UnknownRole(_) => StatusCode::BAD_REQUEST,
        NavigatorError::Forbidden { .. } => StatusCode::FORBIDDEN,
        NavigatorError::Busy => StatusCode::CONFLICT,
        NavigatorError::DanglingReference { .. }
        | NavigatorError::MissingStartNode(_)
        | NavigatorError::EmptyOptions { .. }
        | NavigatorError::AmbiguousNode { .. }
        | NavigatorError::DuplicateComponent(_)
        | NavigatorError::InvalidConnection { .. }
        | NavigatorError::Catalog { .. }
        | NavigatorError::Serialization(_)
        | NavigatorError::FileWrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps a domain error onto its HTTP status. Internal errors are logged and not echoed.
pub fn reject(err: NavigatorError) -> ApiError {
    let status = status_of(&err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Navigator error: {:?}", err);
        return (status, "Internal error".into());
    }
    (status, err.to_string())
}

/// Runs a handler's gateway call and panel completion as their own task. The panel is
/// completed even if the client disconnects and the handler future is dropped.
pub async fn detach<T>(work: impl Future<Output = ApiResult<T>> + Send + 'static) -> ApiResult<T>
where
    T: Send + 'static,
{
    tokio::spawn(work).await.unwrap_or_else(|e| {
        tracing::error!("gateway task failed: {e}");
        Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into()))
    })
}

/// Resolves the caller's role header and checks it may use one of `tabs`.
pub fn gate(headers: &HeaderMap, tabs: &[Tab]) -> ApiResult<Role> {
    let value = headers.get(ROLE_HEADER).and_then(|v| v.to_str().ok());
    authorize(value, tabs).map_err(|e| {
        let status = match e {
            AuthError::MissingRole => StatusCode::UNAUTHORIZED,
            AuthError::UnknownRole(_) => StatusCode::BAD_REQUEST,
            AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
        };
        tracing::debug!("rejected role header: {e}");
        (status, e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use uuid::Uuid;

    #[test]
    fn test_reject_hides_internal_errors() {
        let (status, message) = reject(NavigatorError::MissingStartNode("HL7".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Internal error");
    }

    #[test]
    fn test_reject_maps_lookup_and_busy() {
        assert_eq!(
            reject(NavigatorError::UnknownSession(Uuid::nil())).0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(reject(NavigatorError::Busy).0, StatusCode::CONFLICT);
        assert_eq!(
            reject(NavigatorError::InvalidOption {
                key: "start".into(),
                index: 9,
                available: 3
            })
            .0,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_detach_reports_panicked_work_as_internal() {
        let err = detach(async {
            let crashed: ApiResult<()> = panic!("worker crashed");
            crashed
        })
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(detach(async { Ok(7) }).await.unwrap(), 7);
    }

    #[test]
    fn test_gate_statuses() {
        let mut headers = HeaderMap::new();
        assert_eq!(
            gate(&headers, &[Tab::Architecture]).unwrap_err().0,
            StatusCode::UNAUTHORIZED
        );

        headers.insert(ROLE_HEADER, HeaderValue::from_static("clinical-staff"));
        assert_eq!(
            gate(&headers, &[Tab::DatasetGenerator]).unwrap_err().0,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            gate(&headers, &[Tab::Architecture]).unwrap(),
            Role::ClinicalStaff
        );
    }
}
