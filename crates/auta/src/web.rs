//! HTTP transport.
//!
//! Maps routes onto [`crate::handlers`], loads and stores the session cookie,
//! and turns each [`Outcome`] into a response. Every request that touches the
//! database opens its own connection on a blocking thread and drops it
//! before the response is built.

use axum::extract::{Path, State};
use axum::http::header::{LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::car::CarForm;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::handlers::{self, Outcome};
use crate::session::{Session, SessionCodec};
use crate::storage::{Database, Storage};
use crate::validation::{Strictness, Validator};
use crate::views;

/// Shared state handed to every request.
#[derive(Debug, Clone)]
pub struct AppState {
    database: Database,
    sessions: SessionCodec,
    validator: Validator,
}

impl AppState {
    /// Create state from its parts.
    #[must_use]
    pub fn new(database: Database, sessions: SessionCodec, validator: Validator) -> Self {
        Self {
            database,
            sessions,
            validator,
        }
    }

    /// Build state from configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        if config.uses_default_secret() {
            warn!("Using the built-in session secret; set session.secret_key for real deployments");
        }

        let strictness = if config.validation.strict {
            Strictness::Strict
        } else {
            Strictness::Lax
        };

        Self::new(
            Database::new(config.database_path()),
            SessionCodec::new(&config.session.secret_key, config.session.cookie_name.clone()),
            Validator::new(strictness),
        )
    }

    /// The database this state points at.
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Run a handler against a fresh connection and build the response.
    async fn with_store<F>(&self, headers: &HeaderMap, handler: F) -> Result<Response>
    where
        F: FnOnce(&Storage, &mut Session, &Validator) -> Result<Outcome> + Send + 'static,
    {
        let session = self.sessions.load(headers);
        let database = self.database.clone();
        let validator = self.validator;

        let (outcome, session) = tokio::task::spawn_blocking(move || {
            let mut session = session;
            let store = database.connect()?;
            let outcome = handler(&store, &mut session, &validator)?;
            Ok::<_, Error>((outcome, session))
        })
        .await
        .map_err(|err| Error::internal(format!("request task failed: {err}")))??;

        self.respond(outcome, session)
    }

    /// Run a handler that needs no database.
    fn without_store(&self, headers: &HeaderMap, outcome: Outcome) -> Result<Response> {
        self.respond(outcome, self.sessions.load(headers))
    }

    fn respond(&self, outcome: Outcome, mut session: Session) -> Result<Response> {
        let mut response = match outcome {
            Outcome::Page(view) => {
                let flashes = session.take_flashes();
                let status = if view.is_not_found() {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::OK
                };
                debug!("Rendering {} with {} flash message(s)", view.name(), flashes.len());
                (status, Html(views::render(&view, &flashes))).into_response()
            }
            Outcome::Redirect(location) => {
                (StatusCode::FOUND, [(LOCATION, location)]).into_response()
            }
            Outcome::Missing(body) => (StatusCode::NOT_FOUND, body).into_response(),
        };

        if let Some(cookie) = self.sessions.set_cookie(&session)? {
            let value = HeaderValue::from_str(&cookie)
                .map_err(|err| Error::internal(format!("invalid session cookie header: {err}")))?;
            response.headers_mut().append(SET_COOKIE, value);
        }

        Ok(response)
    }
}

/// Build the application router.
///
/// `/delete/{id}` answers both GET and POST. The GET form keeps old links
/// working; it deletes immediately without confirmation.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/auta", get(list))
        .route("/create", get(create_form).post(create_submit))
        .route("/edit/{id}", get(edit_form).post(edit_submit))
        .route("/delete/{id}", get(delete).post(delete))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize the database and serve HTTP until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the database cannot be initialized or the listener
/// cannot be bound.
pub async fn serve(config: &Config) -> Result<()> {
    let state = AppState::from_config(config);

    let database = state.database().clone();
    tokio::task::spawn_blocking(move || database.initialize())
        .await
        .map_err(|err| Error::internal(format!("database initialization task failed: {err}")))??;

    let listener = TcpListener::bind(config.bind_address()?).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl+C: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Ids are unsigned decimal integers; anything else is not a route.
fn parse_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

async fn home(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    state.without_store(&headers, handlers::home())
}

async fn not_found(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    state.without_store(&headers, handlers::not_found())
}

async fn list(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    state
        .with_store(&headers, |store, session, _| handlers::list(store, session))
        .await
}

async fn create_form(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    state.without_store(&headers, handlers::create_form())
}

async fn create_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CarForm>,
) -> Result<Response> {
    state
        .with_store(&headers, move |store, session, validator| {
            handlers::create_submit(store, session, validator, &form)
        })
        .await
}

async fn edit_form(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let Some(id) = parse_id(&raw_id) else {
        return state.without_store(&headers, handlers::not_found());
    };
    state
        .with_store(&headers, move |store, _, _| handlers::edit_form(store, id))
        .await
}

async fn edit_submit(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<CarForm>,
) -> Result<Response> {
    let Some(id) = parse_id(&raw_id) else {
        return state.without_store(&headers, handlers::not_found());
    };
    state
        .with_store(&headers, move |store, session, validator| {
            handlers::edit_submit(store, session, validator, id, &form)
        })
        .await
}

async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let Some(id) = parse_id(&raw_id) else {
        return state.without_store(&headers, handlers::not_found());
    };
    state
        .with_store(&headers, move |store, session, _| {
            handlers::delete(store, session, id)
        })
        .await
}
