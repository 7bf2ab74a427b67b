use std::any::Any;
use std::collections::HashMap;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Request, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use chrono::Local;
use cottage_inspector::InspectionReport;
use cottage_protocol::{CottageResult, InspectionError, format_timestamp};
use cottage_vision::ImageSource;
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::session::WebSession;
use crate::{ApiResult, AppState, pages};

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/", get(home))
        .route("/index.html", get(index_redirect))
        .route("/inspection", get(inspection))
        .route("/inspection.html", get(inspection))
        .route("/predict", post(predict).layer(upload_limit))
        .route("/result", get(result))
        .route("/result/{index}", get(result_at))
        .route("/detailed_report", get(detailed_report))
        .route("/report/detailed", get(detailed_report))
        .route("/history", get(history))
        .route("/history.html", get(history))
        .route("/report", get(history))
        .route("/email_template", get(email_template))
        .route("/email_template/{issue_type}", get(email_template_for))
        .route("/clear_history", get(clear_history))
        .route("/delete_report/{index}", get(delete_report))
        .route("/api/stats", get(api_stats))
        .route("/api/export_history", get(export_history))
        .route("/guide.html", get(guide))
        .route("/about.html", get(about))
        .route("/debug/session", get(debug_session))
        .route("/healthz", get(healthz))
        .fallback(not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(internal_error_page))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn healthz(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "cottage-web",
        "classifier": app.inspector.classifier_description(),
    }))
}

async fn home() -> Html<String> {
    Html(pages::home())
}

async fn index_redirect() -> Redirect {
    Redirect::to("/")
}

async fn inspection() -> Html<String> {
    Html(pages::inspection())
}

async fn guide() -> Html<String> {
    Html(pages::guide())
}

async fn about() -> Html<String> {
    Html(pages::about())
}

async fn predict(
    State(app): State<AppState>,
    mut session: WebSession,
    request: Request,
) -> ApiResult<Response> {
    let outcome = match read_image_source(request, &app).await {
        Ok(source) => {
            app.inspector
                .inspect_into(&session.id, &mut session.state, source)
                .await
        }
        Err(error) => Err(error),
    };

    let response = match outcome {
        Ok(result) => {
            info!(
                session_id = %session.id,
                predicted_class = %result.predicted_class,
                history_len = session.state.history().len(),
                "prediction saved"
            );
            Json(result).into_response()
        }
        Err(error) => {
            warn!(session_id = %session.id, %error, "prediction failed");
            Json(json!({ "error": error.to_string() })).into_response()
        }
    };

    session.commit(&app, response).await
}

/// Accepts multipart (`file` upload or `image_data` field) and url-encoded
/// (`image_data`) bodies. A named file wins over a captured image.
async fn read_image_source(request: Request, app: &AppState) -> CottageResult<ImageSource> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, app)
            .await
            .map_err(|rejection| InspectionError::Upload(rejection.body_text()))?;
        return image_source_from_multipart(multipart).await;
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(fields) = Form::<HashMap<String, String>>::from_request(request, app)
            .await
            .map_err(|rejection| InspectionError::Upload(rejection.body_text()))?;
        return fields
            .get("image_data")
            .map(|data_url| ImageSource::DataUrl(data_url.clone()))
            .ok_or(InspectionError::NoImage);
    }

    Err(InspectionError::NoImage)
}

async fn image_source_from_multipart(mut multipart: Multipart) -> CottageResult<ImageSource> {
    let mut upload = None;
    let mut capture = None;

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await.map_err(upload_error)?;
                if !file_name.is_empty() {
                    upload = Some(ImageSource::UploadedFile {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "image_data" => {
                capture = Some(ImageSource::DataUrl(field.text().await.map_err(upload_error)?));
            }
            _ => {}
        }
    }

    upload.or(capture).ok_or(InspectionError::NoImage)
}

fn upload_error(error: MultipartError) -> InspectionError {
    InspectionError::Upload(error.body_text())
}

async fn result() -> Redirect {
    Redirect::to("/detailed_report")
}

async fn result_at(
    State(app): State<AppState>,
    mut session: WebSession,
    Path(index): Path<String>,
) -> ApiResult<Response> {
    let selected = index
        .parse::<usize>()
        .ok()
        .and_then(|display_index| session.state.select_history_entry(display_index))
        .is_some();

    if !selected {
        info!(session_id = %session.id, index = %index, "history entry not found");
        return session.commit(&app, Redirect::to("/history")).await;
    }
    session.commit(&app, Redirect::to("/detailed_report")).await
}

async fn detailed_report(
    State(app): State<AppState>,
    session: WebSession,
) -> ApiResult<Response> {
    let Some(current) = session.state.current() else {
        return session.commit(&app, Redirect::to("/inspection")).await;
    };

    let page = pages::detailed_report(&app.inspector.report(current));
    session.commit(&app, Html(page)).await
}

async fn history(State(app): State<AppState>, session: WebSession) -> ApiResult<Response> {
    let entries: Vec<(usize, InspectionReport)> = session
        .state
        .history_newest_first()
        .map(|(index, result)| (index, app.inspector.report(result)))
        .collect();

    let page = pages::history(&entries);
    session.commit(&app, Html(page)).await
}

async fn email_template(State(app): State<AppState>, session: WebSession) -> ApiResult<Response> {
    let Some(current) = session.state.current() else {
        return session.commit(&app, Redirect::to("/inspection")).await;
    };

    let issue_type = current.predicted_class.to_string();
    render_email_template(&app, session, &issue_type).await
}

async fn email_template_for(
    State(app): State<AppState>,
    session: WebSession,
    Path(issue_type): Path<String>,
) -> ApiResult<Response> {
    render_email_template(&app, session, &issue_type).await
}

async fn render_email_template(
    app: &AppState,
    session: WebSession,
    issue_type: &str,
) -> ApiResult<Response> {
    let inspection_date = session
        .state
        .current()
        .map_or("Recent", |result| result.timestamp.as_str());

    let page = pages::email_template(issue_type, inspection_date);
    session.commit(app, Html(page)).await
}

async fn clear_history(State(app): State<AppState>, mut session: WebSession) -> ApiResult<Response> {
    session.state.clear();
    info!(session_id = %session.id, "history cleared");
    session.commit(&app, Redirect::to("/history")).await
}

async fn delete_report(
    State(app): State<AppState>,
    mut session: WebSession,
    Path(index): Path<String>,
) -> ApiResult<Response> {
    let removed = index
        .parse::<usize>()
        .ok()
        .and_then(|display_index| session.state.delete_entry(display_index));
    if let Some(removed) = removed {
        info!(
            session_id = %session.id,
            predicted_class = %removed.predicted_class,
            timestamp = %removed.timestamp,
            "history entry deleted"
        );
    }

    session.commit(&app, Redirect::to("/history")).await
}

async fn api_stats(State(app): State<AppState>, session: WebSession) -> ApiResult<Response> {
    let stats = session.state.stats();
    session.commit(&app, Json(stats)).await
}

async fn export_history(State(app): State<AppState>, session: WebSession) -> ApiResult<Response> {
    let export = session.state.export(format_timestamp(Local::now()));
    session.commit(&app, Json(export)).await
}

async fn debug_session(State(app): State<AppState>, session: WebSession) -> ApiResult<Response> {
    if !app.debug {
        return Ok(Json(json!({ "error": "Debug mode only" })).into_response());
    }

    let state = &session.state;
    let body = json!({
        "has_current_result": state.current_result().is_some(),
        "has_last_result": state.last_result().is_some(),
        "history_length": state.history().len(),
        "current_class": state.current_result().map_or("None", |r| r.predicted_class.as_str()),
        "last_class": state.last_result().map_or("None", |r| r.predicted_class.as_str()),
    });
    session.commit(&app, Json(body)).await
}

async fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(pages::not_found()))
}

fn internal_error_page(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "handler panicked");

    (StatusCode::INTERNAL_SERVER_ERROR, Html(pages::server_error())).into_response()
}
