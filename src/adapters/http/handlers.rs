use super::response::respond;
use super::AppState;
use crate::core::registration::RegistrationRequest;
use crate::domain::model::{Operator, ParticipantOrdering, ParticipantQuery};
use crate::utils::error::{RaffleError, Result as RaffleResult};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::reply::Response;

const MAX_PAGE_SIZE: u64 = 100;
/// SQL 的 OFFSET 以 i64 綁定，位移不可超過 i64::MAX
const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PAGE_SIZE;

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub token: Uuid,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
struct AccessToken {
    access: String,
}

#[derive(Debug, Serialize)]
struct Registered {
    email: String,
    full_name: String,
}

/// Query string of the participant listing.
#[derive(Debug, Default, Deserialize)]
pub struct ParticipantListParams {
    pub is_verified: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl ParticipantListParams {
    pub fn into_query(self) -> RaffleResult<ParticipantQuery> {
        let defaults = ParticipantQuery::default();
        let page = self.page.unwrap_or(defaults.page).max(1);
        if page > MAX_PAGE {
            return Err(RaffleError::validation(
                "page",
                format!("must be at most {MAX_PAGE}"),
            ));
        }
        Ok(ParticipantQuery {
            is_verified: self
                .is_verified
                .map(|v| v.trim().eq_ignore_ascii_case("true")),
            search: self.search.filter(|s| !s.trim().is_empty()),
            ordering: self
                .ordering
                .as_deref()
                .and_then(ParticipantOrdering::parse)
                .unwrap_or_default(),
            page,
            page_size: self
                .page_size
                .unwrap_or(defaults.page_size)
                .clamp(1, MAX_PAGE_SIZE),
        })
    }
}

pub async fn health() -> Result<Response, Infallible> {
    let body = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    Ok(respond(Ok(body), StatusCode::OK, None))
}

pub async fn register(state: Arc<AppState>, req: RegistrationRequest) -> Result<Response, Infallible> {
    let result = state
        .registration
        .register(req)
        .await
        .map(|p| Registered {
            email: p.email,
            full_name: p.full_name,
        });
    Ok(respond(
        result,
        StatusCode::CREATED,
        Some("Registration successful. Check your email to verify your account."),
    ))
}

pub async fn verify_email(state: Arc<AppState>, req: VerifyEmailRequest) -> Result<Response, Infallible> {
    let result = state.registration.verify_email(req.token).await;
    Ok(respond(
        result,
        StatusCode::OK,
        Some("Email verified. You can now set your password."),
    ))
}

pub async fn set_password(state: Arc<AppState>, req: SetPasswordRequest) -> Result<Response, Infallible> {
    let result = state
        .registration
        .set_password(req.token, &req.password, &req.password_confirm)
        .await;
    Ok(respond(
        result,
        StatusCode::OK,
        Some("Password set. Your account is active and you are in the raffle."),
    ))
}

pub async fn login(state: Arc<AppState>, req: LoginRequest) -> Result<Response, Infallible> {
    let result = state.auth.login(&req.email, &req.password).await;
    Ok(respond(result, StatusCode::OK, None))
}

pub async fn refresh(state: Arc<AppState>, req: RefreshRequest) -> Result<Response, Infallible> {
    let result = state
        .auth
        .refresh(&req.refresh)
        .await
        .map(|access| AccessToken { access });
    Ok(respond(result, StatusCode::OK, None))
}

pub async fn list_participants(
    state: Arc<AppState>,
    _operator: Operator,
    params: ParticipantListParams,
) -> Result<Response, Infallible> {
    let result = match params.into_query() {
        Ok(query) => state.admin.list_participants(&query).await,
        Err(e) => Err(e),
    };
    Ok(respond(result, StatusCode::OK, None))
}

pub async fn participant_stats(state: Arc<AppState>, _operator: Operator) -> Result<Response, Infallible> {
    Ok(respond(state.admin.stats().await, StatusCode::OK, None))
}

pub async fn participant_detail(
    id: Uuid,
    state: Arc<AppState>,
    _operator: Operator,
) -> Result<Response, Infallible> {
    Ok(respond(state.admin.participant(id).await, StatusCode::OK, None))
}

pub async fn list_winners(state: Arc<AppState>, _operator: Operator) -> Result<Response, Infallible> {
    Ok(respond(state.admin.list_winners().await, StatusCode::OK, None))
}

pub async fn winner_detail(
    id: Uuid,
    state: Arc<AppState>,
    _operator: Operator,
) -> Result<Response, Infallible> {
    Ok(respond(state.admin.winner(id).await, StatusCode::OK, None))
}

pub async fn draw_winner(state: Arc<AppState>, operator: Operator) -> Result<Response, Infallible> {
    tracing::info!(operator = %operator.email, "🎲 Draw requested");
    let result = state.draws.draw_winner(&operator).await;
    Ok(respond(result, StatusCode::CREATED, Some("Winner drawn successfully.")))
}

pub async fn notify_winner(
    id: Uuid,
    state: Arc<AppState>,
    operator: Operator,
) -> Result<Response, Infallible> {
    tracing::info!(operator = %operator.email, winner_id = %id, "Manual winner notification");
    let result = state.draws.notify_winner(id).await;
    Ok(respond(result, StatusCode::OK, Some("Winner notified.")))
}

pub async fn clean_database(state: Arc<AppState>, operator: Operator) -> Result<Response, Infallible> {
    tracing::warn!(operator = %operator.email, "🧹 Database cleanup requested");
    let result = state.admin.clean_database().await;
    Ok(respond(result, StatusCode::OK, Some("Database cleaned.")))
}
