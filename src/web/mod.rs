//! HTTP surface - serves the dashboard to browser tabs.
//!
//! Each tab is identified by a `tab` cookie and owns its session gate and
//! view region. A tab is kept only between a successful login and its logout;
//! requests from any other tab see the login page. Handlers hold a tab's lock
//! only while reading or changing its session, never across a section load, so
//! a newer navigation in the same tab can start while an older one is still
//! waiting on the facade.

/// Route handlers
pub mod handlers;
/// Login page and dashboard shell
pub mod pages;

use crate::{
    core::Facade,
    dashboard::{Dashboard, MemoryTabStorage, SessionGate},
    errors::{Error, Result},
    render::{Documents, TemplateStore, format::escape_html},
};
use axum::{
    Router,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use std::{collections::HashMap, sync::Arc};
use tokio::{net::TcpListener, sync::Mutex};
use tracing::{error, info};

/// Name of the cookie identifying a browser tab
pub const TAB_COOKIE: &str = "tab";

/// State of one browser tab
#[derive(Debug)]
pub struct Tab {
    /// Login state
    pub gate: SessionGate<MemoryTabStorage>,
    /// Section handlers and the tab's view region
    pub dashboard: Dashboard,
}

impl Tab {
    fn new(facade: Facade) -> Self {
        Self {
            gate: SessionGate::new(MemoryTabStorage::default()),
            dashboard: Dashboard::new(facade),
        }
    }
}

/// Shared state available to all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Data access facade
    pub facade: Facade,
    /// Printable document renderer
    pub documents: Documents,
    tabs: Arc<Mutex<HashMap<String, Arc<Mutex<Tab>>>>>,
}

impl AppState {
    /// State serving `facade` records with templates from `templates`.
    #[must_use]
    pub fn new(facade: Facade, templates: TemplateStore) -> Self {
        Self {
            documents: Documents::new(facade.clone(), templates),
            facade,
            tabs: Arc::default(),
        }
    }

    /// The logged-in tab called `id`, if there is one.
    pub async fn tab(&self, id: &str) -> Option<Arc<Mutex<Tab>>> {
        self.tabs.lock().await.get(id).cloned()
    }

    /// Number of logged-in tabs
    pub async fn tab_count(&self) -> usize {
        self.tabs.lock().await.len()
    }

    /// Keeps `tab` under `id`, replacing any earlier session of that tab.
    async fn open_tab(&self, id: &str, tab: Tab) {
        self.tabs
            .lock()
            .await
            .insert(id.to_string(), Arc::new(Mutex::new(tab)));
    }

    /// Forgets the tab called `id`, returning it if it was kept.
    async fn close_tab(&self, id: &str) -> Option<Arc<Mutex<Tab>>> {
        self.tabs.lock().await.remove(id)
    }
}

/// Tab identity taken from the request cookie, or freshly issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabId {
    id: String,
    issued: bool,
}

impl TabId {
    /// Reads the `tab` cookie, issuing a new id when the request has none.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let existing = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|cookies| cookies.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == TAB_COOKIE && !value.is_empty())
            .map(|(_, value)| value.to_string());

        match existing {
            Some(id) => Self { id, issued: false },
            None => Self {
                id: uuid::Uuid::new_v4().to_string(),
                issued: true,
            },
        }
    }

    /// The tab id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Adds the `Set-Cookie` header when the id was issued by this request.
    pub fn attach(&self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        if self.issued {
            let cookie = format!("{TAB_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax", self.id);
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        response
    }
}

/// HTTP status a failed operation answers with.
#[must_use]
pub const fn status_of(error: &Error) -> StatusCode {
    match error {
        Error::Validation { .. } | Error::InvalidAmount { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        Error::StudentNotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = status_of(&self);
        if status.is_server_error() {
            error!("Request failed: {self}");
        }
        let banner = format!(
            r#"<div class="alert alert-danger">{}</div>"#,
            escape_html(&self.to_string())
        );
        (status, Html(banner)).into_response()
    }
}

/// Every dashboard route.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/sections/:section", get(handlers::section))
        .route("/students", post(handlers::create_student))
        .route("/students/new", get(handlers::new_student))
        .route("/students/:id", get(handlers::student).post(handlers::update_student))
        .route("/students/:id/edit", get(handlers::edit_student))
        .route("/students/:id/delete", post(handlers::delete_student))
        .route("/fees/:student_id/ledger", get(handlers::ledger))
        .route("/fees/:student_id/payment", get(handlers::payment_form))
        .route("/fees/payments", post(handlers::record_payment))
        .route("/receipts/:invoice_no", get(handlers::receipt))
        .route("/certificates/:student_id", get(handlers::certificate))
        .route("/marksheets", get(handlers::class_marksheets))
        .route("/marksheets/:student_id", get(handlers::marksheet))
        .route("/marks/entry", get(handlers::marks_entry))
        .route("/marks", post(handlers::save_marks))
        .with_state(state)
}

/// Serves the dashboard on `listener` until the process stops.
///
/// # Errors
/// `Error::Io` if the listener fails.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Dashboard listening on http://{addr}");
    }
    axum::serve(listener, router(state)).await?;
    Ok(())
}
