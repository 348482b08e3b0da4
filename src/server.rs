//! HTTP routes: upload form and report rendering.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::pipeline::ReportCache;
use crate::render::{render_empty_page, render_error_page, render_report_page, render_upload_page};
use crate::report::ReportOutcome;

pub const UPLOAD_FIELD: &str = "file";

pub fn report_router(cache: ReportCache, server_cfg: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(get_upload_form))
        .route("/report", post(post_report))
        .layer(DefaultBodyLimit::max(server_cfg.max_upload_bytes))
        .with_state(ReportAppState { cache })
}

#[derive(Clone)]
struct ReportAppState {
    cache: ReportCache,
}

async fn get_upload_form() -> impl IntoResponse {
    info!(component = "http", event = "http.form.request");
    Html(render_upload_page())
}

async fn post_report(
    State(state): State<ReportAppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => return reject(rejection.status(), &rejection.body_text()),
    };

    let upload = match read_upload(&mut multipart).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            return reject(
                StatusCode::BAD_REQUEST,
                &format!("the form has no '{UPLOAD_FIELD}' field"),
            )
        }
        Err((status, message)) => return reject(status, &message),
    };

    info!(
        component = "http",
        event = "http.report.request",
        bytes = upload.len()
    );

    match state.cache.get_or_run(&upload) {
        Ok(outcome) => match outcome.as_ref() {
            ReportOutcome::Ready(report) => {
                Html(render_report_page(report, state.cache.config())).into_response()
            }
            ReportOutcome::NoValidData {
                rows_read,
                rows_dropped,
            } => Html(render_empty_page(*rows_read, *rows_dropped)).into_response(),
        },
        Err(err) => reject(StatusCode::UNPROCESSABLE_ENTITY, &err.to_string()),
    }
}

async fn read_upload(multipart: &mut Multipart) -> Result<Option<Vec<u8>>, (StatusCode, String)> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_failure)? {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field.bytes().await.map_err(multipart_failure)?;
            return Ok(Some(bytes.to_vec()));
        }
    }
    Ok(None)
}

fn multipart_failure(err: MultipartError) -> (StatusCode, String) {
    (err.status(), err.body_text())
}

fn reject(status: StatusCode, message: &str) -> Response {
    warn!(
        component = "http",
        event = "http.report.rejected",
        status = status.as_u16(),
        reason = message
    );
    (status, Html(render_error_page(message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::util::ServiceExt;

    fn app() -> Router {
        report_router(
            ReportCache::new(ReportConfig::default()),
            &ServerConfig::default(),
        )
    }

    #[tokio::test]
    async fn upload_form_is_served_at_root() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("id=\"upload-form\""));
    }

    #[tokio::test]
    async fn non_multipart_post_is_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/report")
                    .header("content-type", "text/csv")
                    .body(Body::from("a,b\n"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("id=\"load-error\""));
    }
}
