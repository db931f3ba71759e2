/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use kanban_api::{app::{build_router, AppState}, auth_client::AuthClient, config::Config};
/// use kanban_shared::db::pool::create_pool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.database.clone()).await?;
/// let auth = AuthClient::new(config.auth_service_url.clone())?;
/// let app = build_router(AppState::new(pool, config, auth));
/// # Ok(())
/// # }
/// ```

use crate::{
    auth_client::AuthClient,
    config::Config,
    middleware::{security::SecurityHeadersLayer, session::session_auth_layer},
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use kanban_shared::access::RoleResolver;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,

    /// Role lookups against `db`
    pub resolver: RoleResolver,

    pub auth: AuthClient,
}

impl AppState {
    pub fn new(db: PgPool, config: Config, auth: AuthClient) -> Self {
        Self {
            resolver: RoleResolver::new(db.clone()),
            db,
            config: Arc::new(config),
            auth,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.api.session_cookie_name
    }

    /// Whether cookies get the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        self.config.api.production
    }
}

/// Builds the complete router
///
/// ```text
/// /health                                  public
/// /v1/users/{signup,login}                 public
/// /v1/users/{logout,me,password}           session
/// /v1/boards[/:board[/invite|/members[/:user]|/columns]]
/// /v1/invite/:token
/// /v1/columns/:column[/move|/cards]
/// /v1/cards/:card[/move|/comments|/checklist|/attachments|/assignees/:user]
/// /v1/comments/:comment, /v1/checklist/:field, /v1/attachments/:attachment
/// ```
///
/// Everything below `/v1` except signup and login passes through
/// [`session_auth_layer`].
pub fn build_router(state: AppState) -> Router {
    use crate::routes::{
        assignees, attachments, boards, cards, checklist, columns, comments, health, members,
        users,
    };

    let public_routes = Router::new()
        .route("/users/signup", post(users::signup))
        .route("/users/login", post(users::login));

    let session_routes = Router::new()
        .route("/users/logout", post(users::logout))
        .route("/users/me", get(users::me).put(users::update_me))
        .route("/users/password", put(users::change_password))
        .route("/boards", post(boards::create_board).get(boards::list_boards))
        .route(
            "/boards/:board",
            get(boards::get_board)
                .put(boards::update_board)
                .delete(boards::delete_board),
        )
        .route(
            "/boards/:board/invite",
            post(boards::create_invite).delete(boards::revoke_invite),
        )
        .route("/invite/:token", post(boards::join_by_invite))
        .route(
            "/boards/:board/members",
            get(members::list_members).post(members::add_member),
        )
        .route(
            "/boards/:board/members/:user",
            put(members::change_role).delete(members::remove_member),
        )
        .route("/boards/:board/columns", post(columns::create_column))
        .route(
            "/columns/:column",
            put(columns::rename_column).delete(columns::delete_column),
        )
        .route("/columns/:column/move", put(columns::move_column))
        .route("/columns/:column/cards", post(cards::create_card))
        .route(
            "/cards/:card",
            get(cards::get_card)
                .put(cards::update_card)
                .delete(cards::delete_card),
        )
        .route("/cards/:card/move", put(cards::move_card))
        .route("/cards/:card/comments", post(comments::create_comment))
        .route(
            "/comments/:comment",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        .route("/cards/:card/checklist", post(checklist::create_field))
        .route(
            "/checklist/:field",
            put(checklist::update_field).delete(checklist::delete_field),
        )
        .route("/cards/:card/attachments", post(attachments::create_attachment))
        .route("/attachments/:attachment", delete(attachments::delete_attachment))
        .route(
            "/cards/:card/assignees/:user",
            put(assignees::assign).delete(assignees::unassign),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    let v1_routes = Router::new().merge(public_routes).merge(session_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::COOKIE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
