//! warp 路由與共享狀態

pub mod handlers;
pub mod response;

use crate::config::AppConfig;
use crate::core::admin::AdminService;
use crate::core::auth::AuthService;
use crate::core::draw::DrawService;
use crate::core::messages::MessageTemplates;
use crate::core::registration::RegistrationService;
use crate::domain::model::Operator;
use crate::domain::ports::{Notifier, ParticipantStore, WinnerStore};
use response::{handle_rejection, ApiRejection};
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::sync::Arc;
use uuid::Uuid;
use warp::filters::BoxedFilter;
use warp::reply::Response;
use warp::{Filter, Rejection};

const MAX_BODY_BYTES: u64 = 16 * 1024;

/// Services shared by every request.
pub struct AppState {
    pub registration: RegistrationService,
    pub auth: AuthService,
    pub draws: DrawService,
    pub admin: AdminService,
}

impl AppState {
    pub fn new(
        participants: Arc<dyn ParticipantStore>,
        winners: Arc<dyn WinnerStore>,
        notifier: Arc<dyn Notifier>,
        config: &AppConfig,
    ) -> Self {
        let templates = MessageTemplates::from_config(config);
        let iterations = config.auth.password_iterations;
        Self {
            registration: RegistrationService::new(
                Arc::clone(&participants),
                Arc::clone(&notifier),
                templates.clone(),
                iterations,
            ),
            auth: AuthService::new(Arc::clone(&participants), &config.auth),
            draws: DrawService::new(
                Arc::clone(&participants),
                Arc::clone(&winners),
                notifier,
                templates,
                config.raffle.prize_description.clone(),
            ),
            admin: AdminService::new(participants, winners, iterations),
        }
    }
}

pub fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&state))
}

/// Resolves the bearer token to an operator, rejecting before the handler runs.
fn with_operator(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Operator,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(with_state(state))
        .and_then(|authorization: Option<String>, state: Arc<AppState>| async move {
            state
                .auth
                .authorize(authorization.as_deref())
                .await
                .map_err(|e| warp::reject::custom(ApiRejection(e)))
        })
}

fn json_body<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

pub fn routes(state: Arc<AppState>) -> BoxedFilter<(Response,)> {
    let health = warp::path!("health")
        .and(warp::get())
        .and_then(handlers::health)
        .boxed();

    // 公開端點
    let register = warp::path!("api" / "participants" / "register")
        .and(warp::post())
        .and(with_state(Arc::clone(&state)))
        .and(json_body())
        .and_then(handlers::register)
        .boxed();
    let verify_email = warp::path!("api" / "participants" / "verify-email")
        .and(warp::post())
        .and(with_state(Arc::clone(&state)))
        .and(json_body())
        .and_then(handlers::verify_email)
        .boxed();
    let set_password = warp::path!("api" / "participants" / "set-password")
        .and(warp::post())
        .and(with_state(Arc::clone(&state)))
        .and(json_body())
        .and_then(handlers::set_password)
        .boxed();
    let login = warp::path!("api" / "auth" / "login")
        .and(warp::post())
        .and(with_state(Arc::clone(&state)))
        .and(json_body())
        .and_then(handlers::login)
        .boxed();
    let refresh = warp::path!("api" / "auth" / "refresh")
        .and(warp::post())
        .and(with_state(Arc::clone(&state)))
        .and(json_body())
        .and_then(handlers::refresh)
        .boxed();

    // 管理端點，全部需要管理員 token
    let list_participants = warp::path!("api" / "admin" / "participants")
        .and(warp::get())
        .and(with_state(Arc::clone(&state)))
        .and(with_operator(Arc::clone(&state)))
        .and(warp::query::<handlers::ParticipantListParams>())
        .and_then(handlers::list_participants)
        .boxed();
    let participant_stats = warp::path!("api" / "admin" / "participants" / "stats")
        .and(warp::get())
        .and(with_state(Arc::clone(&state)))
        .and(with_operator(Arc::clone(&state)))
        .and_then(handlers::participant_stats)
        .boxed();
    let participant_detail = warp::path!("api" / "admin" / "participants" / Uuid)
        .and(warp::get())
        .and(with_state(Arc::clone(&state)))
        .and(with_operator(Arc::clone(&state)))
        .and_then(handlers::participant_detail)
        .boxed();
    let list_winners = warp::path!("api" / "admin" / "winners")
        .and(warp::get())
        .and(with_state(Arc::clone(&state)))
        .and(with_operator(Arc::clone(&state)))
        .and_then(handlers::list_winners)
        .boxed();
    let draw_winner = warp::path!("api" / "admin" / "winners" / "draw")
        .and(warp::post())
        .and(with_state(Arc::clone(&state)))
        .and(with_operator(Arc::clone(&state)))
        .and_then(handlers::draw_winner)
        .boxed();
    let winner_detail = warp::path!("api" / "admin" / "winners" / Uuid)
        .and(warp::get())
        .and(with_state(Arc::clone(&state)))
        .and(with_operator(Arc::clone(&state)))
        .and_then(handlers::winner_detail)
        .boxed();
    let notify_winner = warp::path!("api" / "admin" / "winners" / Uuid / "notify")
        .and(warp::post())
        .and(with_state(Arc::clone(&state)))
        .and(with_operator(Arc::clone(&state)))
        .and_then(handlers::notify_winner)
        .boxed();
    let clean_database = warp::path!("api" / "admin" / "clean-database")
        .and(warp::post())
        .and(with_state(Arc::clone(&state)))
        .and(with_operator(state))
        .and_then(handlers::clean_database)
        .boxed();

    health
        .or(register)
        .unify()
        .or(verify_email)
        .unify()
        .or(set_password)
        .unify()
        .or(login)
        .unify()
        .or(refresh)
        .unify()
        .or(participant_stats)
        .unify()
        .or(participant_detail)
        .unify()
        .or(list_participants)
        .unify()
        .or(draw_winner)
        .unify()
        .or(winner_detail)
        .unify()
        .or(notify_winner)
        .unify()
        .or(list_winners)
        .unify()
        .or(clean_database)
        .unify()
        .recover(handle_rejection)
        .unify()
        .boxed()
}
