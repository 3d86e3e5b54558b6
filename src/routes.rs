use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    backend::BackendClient,
    clock::ServerClock,
    mailer::{EmailRecipient, Mailer, SendReport},
    models::{BulkEmailReq, ChallengeLecture, Student, StudentForm},
    roster::StudentRepo,
    schedule,
    status::{self, StatusReport},
    validate,
};

pub struct AppState {
    pub clock: ServerClock<BackendClient>,
    pub backend: BackendClient,
    pub roster: Arc<dyn StudentRepo>,
    pub mailer: Mailer,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // classroom
        .route("/api/server-time", get(server_time))
        .route("/api/challenges/:challenge_id/lectures", get(list_lectures))
        .route(
            "/api/challenges/:challenge_id/students/:student_id/status",
            get(submission_status),
        )
        .route(
            "/api/challenges/:challenge_id/students/:student_id/refund",
            get(refund_eligibility),
        )
        // admin
        .route("/api/challenges/:challenge_id/stats", get(challenge_stats))
        .route("/api/students", get(list_students).post(create_student))
        .route(
            "/api/students/:id",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/api/admin/emails", post(send_bulk_email))
        .with_state(state)
}

/// One ISO-8601 timestamp, cached server-side; clients must not trust
/// their own clocks for lecture unlocking.
async fn server_time(State(st): State<Arc<AppState>>) -> Json<DateTime<Utc>> {
    Json(st.clock.now().await)
}

#[derive(Serialize)]
struct LectureView {
    #[serde(flatten)]
    record: ChallengeLecture,
    unlocked: bool,
}

#[derive(Serialize)]
struct LectureListRes {
    now: DateTime<Utc>,
    today_index: Option<usize>,
    current_index: Option<usize>,
    lectures: Vec<LectureView>,
}

async fn list_lectures(
    State(st): State<Arc<AppState>>,
    Path(challenge_id): Path<i64>,
) -> Result<Json<LectureListRes>, ApiError> {
    let lectures = st
        .backend
        .challenge_lectures(challenge_id)
        .await
        .map_err(e502)?;
    let now = st.clock.now().await;
    let flags = schedule::unlocked_flags(&lectures, now);
    let today_index = schedule::today_index(&lectures, now);
    let current_index = schedule::current_index(&lectures, now);
    let lectures = lectures
        .into_iter()
        .zip(flags)
        .map(|(record, unlocked)| LectureView { record, unlocked })
        .collect();
    Ok(Json(LectureListRes {
        now,
        today_index,
        current_index,
        lectures,
    }))
}

async fn submission_status(
    State(st): State<Arc<AppState>>,
    Path((challenge_id, student_id)): Path<(i64, i64)>,
) -> Json<StatusReport> {
    Json(load_status(&st, challenge_id, student_id).await)
}

/// Refund gating reads the same report; eligibility is exactly
/// `is_all_submitted`, policy beyond that lives elsewhere.
async fn refund_eligibility(
    State(st): State<Arc<AppState>>,
    Path((challenge_id, student_id)): Path<(i64, i64)>,
) -> Json<Value> {
    let report = load_status(&st, challenge_id, student_id).await;
    Json(json!({ "eligible": report.is_all_submitted }))
}

// Backend failures fail closed here: the refund screen gets a denial it
// can render, never a 5xx.
async fn load_status(st: &AppState, challenge_id: i64, student_id: i64) -> StatusReport {
    let lectures = match st.backend.challenge_lectures(challenge_id).await {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, challenge_id, "lecture fetch failed, failing closed");
            return StatusReport::safe_default();
        }
    };
    let submissions = match st
        .backend
        .submissions_for_student(challenge_id, student_id)
        .await
    {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, challenge_id, student_id, "submission fetch failed, failing closed");
            return StatusReport::safe_default();
        }
    };
    status::compute_status(student_id, &lectures, &submissions)
}

async fn challenge_stats(
    State(st): State<Arc<AppState>>,
    Path(challenge_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let lectures = st
        .backend
        .challenge_lectures(challenge_id)
        .await
        .map_err(e502)?;
    let submissions = st
        .backend
        .submissions_for_challenge(challenge_id)
        .await
        .map_err(e502)?;
    let roster_size = st.roster.get_all().len();
    let rates = status::submission_rates(&lectures, &submissions, roster_size);
    Ok(Json(json!({ "roster_size": roster_size, "lectures": rates })))
}

// --- roster CRUD ---

async fn list_students(State(st): State<Arc<AppState>>) -> Json<Vec<Student>> {
    Json(st.roster.get_all())
}

async fn get_student(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Student>, ApiError> {
    st.roster
        .find_by_id(id)
        .map(Json)
        .ok_or_else(|| e404("student not found"))
}

async fn create_student(
    State(st): State<Arc<AppState>>,
    Json(form): Json<StudentForm>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    let errors = validate::validate_student_form(&form, &st.roster.get_all(), None);
    if !errors.is_empty() {
        return Err(e422(errors));
    }
    Ok((StatusCode::CREATED, Json(st.roster.add(form))))
}

async fn update_student(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(form): Json<StudentForm>,
) -> Result<Json<Student>, ApiError> {
    let errors = validate::validate_student_form(&form, &st.roster.get_all(), Some(id));
    if !errors.is_empty() {
        return Err(e422(errors));
    }
    st.roster
        .update(id, form)
        .map(Json)
        .ok_or_else(|| e404("student not found"))
}

async fn delete_student(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Student>, ApiError> {
    st.roster
        .delete(id)
        .map(Json)
        .ok_or_else(|| e404("student not found"))
}

async fn send_bulk_email(
    State(st): State<Arc<AppState>>,
    Json(req): Json<BulkEmailReq>,
) -> Result<Json<SendReport>, ApiError> {
    let roster = st.roster.get_all();
    let selected: Vec<&Student> = match &req.student_ids {
        Some(ids) => roster.iter().filter(|s| ids.contains(&s.id)).collect(),
        None => roster.iter().collect(),
    };
    if selected.is_empty() {
        return Err(e400("no recipients"));
    }
    let recipients: Vec<EmailRecipient> = selected
        .iter()
        .map(|s| EmailRecipient::for_student(s))
        .collect();
    let report = st
        .mailer
        .send_bulk(&req.template_id, &recipients)
        .await
        .map_err(e502)?;
    Ok(Json(report))
}

// --- helpers ---

type ApiError = (StatusCode, Json<Value>);

fn e400<T: Into<String>>(msg: T) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": msg.into() })))
}

fn e404<T: Into<String>>(msg: T) -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({ "error": msg.into() })))
}

fn e422(errors: validate::FieldErrors) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "errors": errors })),
    )
}

fn e502<E: std::fmt::Display>(e: E) -> ApiError {
    tracing::error!(error = %e, "upstream error");
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "error": e.to_string() })),
    )
}
