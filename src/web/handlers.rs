//! Route handlers.
//!
//! Pages behind the login redirect to `/` when the tab has no identity, and
//! answer 403 when the identity's role may not use the section the page
//! belongs to.

use crate::{
    core::{
        auth::{Identity, LoginOutcome},
        fee::NewPayment,
        mark::NewMark,
        student::StudentDetails,
    },
    dashboard::{Dashboard, Menu, Navigation, Section, views},
    entities::{PaymentMode, Role, StudentStatus},
    errors::{Error, Result},
    render::format::escape_html,
    web::{AppState, Tab, TabId, pages, status_of},
};
use axum::{
    extract::{Form, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, error, info};

/// Login form fields
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

/// Payment form fields, parsed by hand so bad input gets a banner
#[derive(Debug, Deserialize)]
pub struct PaymentForm {
    student_id: String,
    amount: String,
    payment_mode: String,
    payment_date: String,
}

/// Admission and edit form fields
#[derive(Debug, Deserialize)]
#[allow(missing_docs)]
pub struct StudentForm {
    pub roll_no: String,
    pub name: String,
    pub class_name: String,
    pub section: String,
    pub parent_name: String,
    pub contact: String,
    pub address: String,
    pub email: String,
    pub date_of_birth: String,
    pub gender: String,
    pub admission_date: String,
    pub status: Option<String>,
}

/// `?class=` query of the marksheet route
#[derive(Debug, Deserialize)]
pub struct MarksheetQuery {
    class: String,
}

/// Class, term and subject of a marks sheet
#[derive(Debug, Deserialize)]
pub struct MarksQuery {
    class: String,
    term: String,
    subject: String,
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| Error::Validation {
        message: format!("Invalid {field}: {value}"),
    })
}

impl StudentForm {
    fn details(&self) -> Result<StudentDetails> {
        let roll_no = self.roll_no.trim().parse().map_err(|_| Error::Validation {
            message: format!("Invalid roll number: {}", self.roll_no),
        })?;
        Ok(StudentDetails {
            roll_no,
            name: self.name.clone(),
            class_name: self.class_name.clone(),
            section: self.section.clone(),
            parent_name: self.parent_name.clone(),
            contact: self.contact.clone(),
            address: self.address.clone(),
            email: self.email.clone(),
            date_of_birth: parse_date("date of birth", &self.date_of_birth)?,
            gender: self.gender.clone(),
            admission_date: parse_date("admission date", &self.admission_date)?,
        })
    }

    fn status(&self) -> StudentStatus {
        match self.status.as_deref() {
            Some("Inactive") => StudentStatus::Inactive,
            _ => StudentStatus::Active,
        }
    }
}

impl PaymentForm {
    fn payment(&self) -> Result<NewPayment> {
        let amount: f64 = self.amount.trim().parse().map_err(|_| Error::Validation {
            message: format!("Invalid amount: {}", self.amount),
        })?;
        Ok(NewPayment {
            student_id: self.student_id.clone(),
            amount,
            payment_mode: self.payment_mode.parse::<PaymentMode>()?,
            payment_date: parse_date("payment date", &self.payment_date)?,
        })
    }
}

/// The logged-in view of one request's tab.
struct Visit {
    tab: TabId,
    identity: Identity,
    dashboard: Dashboard,
}

impl Visit {
    /// The tab's identity, or a redirect to the login page.
    async fn open(state: &AppState, tab: TabId) -> std::result::Result<Self, Response> {
        let Some(handle) = state.tab(tab.as_str()).await else {
            return Err(tab.attach(Redirect::to("/")));
        };
        let guard = handle.lock().await;
        let Some(identity) = guard.gate.current() else {
            drop(guard);
            return Err(tab.attach(Redirect::to("/")));
        };
        let dashboard = guard.dashboard.clone();
        drop(guard);
        Ok(Self {
            tab,
            identity,
            dashboard,
        })
    }

    /// Like [`Visit::open`], but also requires `section` to be open to the role.
    async fn within(
        state: &AppState,
        headers: &HeaderMap,
        section: Section,
    ) -> std::result::Result<Self, Response> {
        let visit = Self::open(state, TabId::from_headers(headers)).await?;
        if section.permits(visit.identity.role) {
            Ok(visit)
        } else {
            Err(visit.page(StatusCode::FORBIDDEN, &views::warning_banner("Access denied.")))
        }
    }

    fn page(&self, status: StatusCode, content: &str) -> Response {
        let menu = Menu::for_role(self.identity.role);
        self.tab
            .attach((status, Html(pages::shell(&self.identity, &menu, content))))
    }

    /// The shell around the view region's current content.
    async fn current(&self, status: StatusCode) -> Response {
        let content = self.dashboard.region().content().await;
        self.page(status, &content)
    }

    /// Loads a fragment into the view region, then renders the region.
    ///
    /// The status follows the load: 404 when nothing was found, the error's
    /// status when it failed.
    async fn show<F>(&self, load: F, missing: &str) -> Response
    where
        F: Future<Output = Result<Option<String>>>,
    {
        let status = match self.dashboard.show_loaded(load, missing).await {
            Ok(Some(_)) => StatusCode::OK,
            Ok(None) => StatusCode::NOT_FOUND,
            Err(e) => status_of(&e),
        };
        self.current(status).await
    }

    /// Banner page for a failed operation.
    fn rejected(&self, e: &Error) -> Response {
        if status_of(e).is_server_error() {
            error!("Request failed: {e}");
        }
        self.page(status_of(e), &views::rejection_banner(e))
    }

    /// The student register headed by a success notice.
    async fn students_with_notice(&self, notice: &str) -> Result<Option<String>> {
        let register = self
            .dashboard
            .load_section(&self.identity, Section::Students)
            .await?;
        Ok(Some(format!(
            r#"<div class="alert alert-success">{}</div>{register}"#,
            escape_html(notice)
        )))
    }
}

fn document(found: Option<String>) -> Response {
    match found {
        Some(html) => Html(html).into_response(),
        None => (StatusCode::NOT_FOUND, Html(views::warning_banner("Not found."))).into_response(),
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Dashboard shell for a logged-in tab, the login form otherwise.
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let tab = TabId::from_headers(&headers);
    match Visit::open(&state, tab.clone()).await {
        Ok(visit) => {
            if visit.dashboard.region().content().await.is_empty() {
                visit
                    .dashboard
                    .show_section(&visit.identity, Section::Dashboard)
                    .await;
            }
            visit.current(StatusCode::OK).await
        }
        Err(_) => tab.attach(Html(pages::login(None))),
    }
}

/// Checks credentials; success keeps the tab and lands on the dashboard section.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let tab = TabId::from_headers(&headers);
    let mut fresh = Tab::new(state.facade.clone());
    let outcome = fresh
        .gate
        .login(&state.facade, &form.email, &form.password)
        .await?;

    Ok(match outcome {
        LoginOutcome::Authenticated(identity) => {
            let dashboard = fresh.dashboard.clone();
            state.open_tab(tab.as_str(), fresh).await;
            dashboard.show_section(&identity, Section::Dashboard).await;
            tab.attach(Redirect::to("/"))
        }
        LoginOutcome::Rejected(failure) => {
            tab.attach((StatusCode::UNAUTHORIZED, Html(pages::login(Some(&failure.to_string())))))
        }
    })
}

/// Clears the tab's session and forgets the tab.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let tab = TabId::from_headers(&headers);
    if let Some(handle) = state.close_tab(tab.as_str()).await {
        handle.lock().await.gate.logout();
        info!("Tab logged out");
    }
    tab.attach(Redirect::to("/"))
}

/// Navigates the tab to a section.
pub async fn section(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Response {
    let visit = match Visit::open(&state, TabId::from_headers(&headers)).await {
        Ok(visit) => visit,
        Err(redirect) => return redirect,
    };
    let status = match visit.dashboard.show_section_named(&visit.identity, &name).await {
        Navigation::Rendered | Navigation::Superseded => StatusCode::OK,
        Navigation::Unknown => StatusCode::NOT_FOUND,
        Navigation::Forbidden => StatusCode::FORBIDDEN,
    };
    visit.current(status).await
}

/// Student detail card.
pub async fn student(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let visit = match Visit::within(&state, &headers, Section::Students).await {
        Ok(visit) => visit,
        Err(response) => return response,
    };
    let load = visit.dashboard.student_detail(&visit.identity, &id);
    visit.show(load, "Student not found.").await
}

async fn admin_visit(
    state: &AppState,
    headers: &HeaderMap,
) -> std::result::Result<Visit, Response> {
    let visit = Visit::within(state, headers, Section::Students).await?;
    if visit.identity.role == Role::Admin {
        Ok(visit)
    } else {
        Err(visit.page(StatusCode::FORBIDDEN, &views::warning_banner("Access denied.")))
    }
}

/// Admission form.
pub async fn new_student(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let visit = match admin_visit(&state, &headers).await {
        Ok(visit) => visit,
        Err(response) => return response,
    };
    visit
        .show(visit.dashboard.student_form(None), "Student not found.")
        .await
}

/// Edit form for an existing student.
pub async fn edit_student(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let visit = match admin_visit(&state, &headers).await {
        Ok(visit) => visit,
        Err(response) => return response,
    };
    visit
        .show(visit.dashboard.student_form(Some(&id)), "Student not found.")
        .await
}

async fn admit(state: &AppState, visit: &Visit, form: &StudentForm) -> Result<Option<String>> {
    let student = state.facade.create_student(form.details()?).await?;
    visit
        .students_with_notice(&format!("Admitted {}.", student.id))
        .await
}

/// Admits a student.
pub async fn create_student(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<StudentForm>,
) -> Response {
    let visit = match admin_visit(&state, &headers).await {
        Ok(visit) => visit,
        Err(response) => return response,
    };
    visit
        .show(admit(&state, &visit, &form), "Student not found.")
        .await
}

async fn amend(
    state: &AppState,
    visit: &Visit,
    student_id: &str,
    form: &StudentForm,
) -> Result<Option<String>> {
    let updated = state
        .facade
        .update_student(student_id, form.details()?, form.status())
        .await?;
    match updated {
        Some(_) => visit.students_with_notice("Student updated.").await,
        None => Ok(None),
    }
}

/// Saves edits to a student.
pub async fn update_student(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<StudentForm>,
) -> Response {
    let visit = match admin_visit(&state, &headers).await {
        Ok(visit) => visit,
        Err(response) => return response,
    };
    visit
        .show(amend(&state, &visit, &id, &form), "Student not found.")
        .await
}

async fn deactivate(state: &AppState, visit: &Visit, student_id: &str) -> Result<Option<String>> {
    if state.facade.delete_student(student_id).await? {
        visit.students_with_notice("Student marked inactive.").await
    } else {
        Ok(None)
    }
}

/// Marks a student inactive.
pub async fn delete_student(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let visit = match admin_visit(&state, &headers).await {
        Ok(visit) => visit,
        Err(response) => return response,
    };
    visit
        .show(deactivate(&state, &visit, &id), "Student not found.")
        .await
}

/// A student's fee ledger.
pub async fn ledger(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(student_id): Path<String>,
) -> Response {
    let visit = match Visit::within(&state, &headers, Section::Fees).await {
        Ok(visit) => visit,
        Err(response) => return response,
    };
    let load = visit.dashboard.ledger(&visit.identity, &student_id);
    visit.show(load, "Student not found.").await
}

/// The record-payment form.
pub async fn payment_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(student_id): Path<String>,
) -> Response {
    let visit = match Visit::within(&state, &headers, Section::Fees).await {
        Ok(visit) => visit,
        Err(response) => return response,
    };
    visit
        .show(
            visit.dashboard.payment_form(&student_id, today()),
            "Student not found.",
        )
        .await
}

/// Records a payment and sends the browser to its receipt.
pub async fn record_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<PaymentForm>,
) -> Response {
    let visit = match Visit::within(&state, &headers, Section::Fees).await {
        Ok(visit) => visit,
        Err(response) => return response,
    };
    let recorded = match form.payment() {
        Ok(payment) => state.facade.record_payment(payment).await,
        Err(e) => Err(e),
    };
    match recorded {
        Ok(invoice) => visit
            .tab
            .attach(Redirect::to(&format!("/receipts/{}", invoice.invoice_no))),
        Err(e) => visit.rejected(&e),
    }
}

/// Printable fee receipt.
pub async fn receipt(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(invoice_no): Path<String>,
) -> Result<Response> {
    let visit = match Visit::within(&state, &headers, Section::Fees).await {
        Ok(visit) => visit,
        Err(response) => return Ok(response),
    };
    let found = state.documents.receipt(&invoice_no).await?;
    Ok(visit.tab.attach(document(found)))
}

/// Printable character certificate dated today.
pub async fn certificate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(student_id): Path<String>,
) -> Result<Response> {
    let visit = match Visit::within(&state, &headers, Section::Students).await {
        Ok(visit) => visit,
        Err(response) => return Ok(response),
    };
    let found = state.documents.certificate(&student_id, today()).await?;
    Ok(visit.tab.attach(document(found)))
}

/// Printable marksheet for a student and class.
pub async fn marksheet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(student_id): Path<String>,
    Query(query): Query<MarksheetQuery>,
) -> Result<Response> {
    let visit = match Visit::within(&state, &headers, Section::Marks).await {
        Ok(visit) => visit,
        Err(response) => return Ok(response),
    };
    let found = state
        .documents
        .marksheet(&student_id, &query.class, today())
        .await?;
    Ok(visit.tab.attach(document(found)))
}

/// Printable marksheets of a whole class on one page.
pub async fn class_marksheets(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MarksheetQuery>,
) -> Result<Response> {
    let visit = match Visit::within(&state, &headers, Section::Marks).await {
        Ok(visit) => visit,
        Err(response) => return Ok(response),
    };
    let found = state
        .documents
        .class_marksheets(&query.class, today())
        .await?
        .map(|sheets| pages::document_bundle(&format!("Marksheets - {}", query.class), &sheets));
    Ok(visit.tab.attach(document(found)))
}

/// Score sheet for one class, term and subject.
pub async fn marks_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MarksQuery>,
) -> Response {
    let visit = match Visit::within(&state, &headers, Section::Marks).await {
        Ok(visit) => visit,
        Err(response) => return response,
    };
    let load = visit
        .dashboard
        .marks_entry(&query.class, &query.term, &query.subject);
    visit.show(load, "Class not found.").await
}

/// Saves the scores submitted from a marks sheet.
///
/// Blank inputs are skipped; only active students of the class are read. One
/// invalid score rejects the whole sheet.
pub async fn save_marks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let visit = match Visit::within(&state, &headers, Section::Marks).await {
        Ok(visit) => visit,
        Err(response) => return response,
    };
    visit
        .show(save_sheet(&state, &visit, &fields), "Class not found.")
        .await
}

async fn save_sheet(
    state: &AppState,
    visit: &Visit,
    fields: &HashMap<String, String>,
) -> Result<Option<String>> {
    let field = |name: &str| fields.get(name).cloned().unwrap_or_default();
    let (class, term, subject) = (field("class"), field("term"), field("subject"));

    let saved = state
        .facade
        .record_marks(sheet_entries(state, fields, &class, &term, &subject).await?)
        .await?;
    debug!(saved, %class, %term, %subject, "Marks saved");

    let Some(sheet) = visit.dashboard.marks_entry(&class, &term, &subject).await? else {
        return Ok(None);
    };
    Ok(Some(format!(
        r#"<div class="alert alert-success">Saved {saved} marks.</div>{sheet}"#
    )))
}

/// The non-blank scores of a submitted sheet, one per active student.
async fn sheet_entries(
    state: &AppState,
    fields: &HashMap<String, String>,
    class: &str,
    term: &str,
    subject: &str,
) -> Result<Vec<NewMark>> {
    let mut entries = Vec::new();
    for student in state.facade.active_students_in_class(class).await? {
        let Some(raw) = fields.get(&views::score_field(&student.id)) else {
            continue;
        };
        if raw.trim().is_empty() {
            continue;
        }
        let score = raw.trim().parse().map_err(|_| Error::Validation {
            message: format!("Invalid marks for {}: {raw}", student.name),
        })?;
        entries.push(NewMark {
            student_id: student.id,
            class_name: class.to_string(),
            term: term.to_string(),
            subject: subject.to_string(),
            score,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::Facade,
        render::TemplateStore,
        test_utils::{setup_facade, setup_seeded_db},
        web::router,
    };
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, header},
    };
    use std::time::Duration;
    use tower::ServiceExt;

    fn serving(facade: Facade) -> (AppState, Router) {
        let templates = TemplateStore::new(
            std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("templates"),
        );
        let state = AppState::new(facade, templates);
        (state.clone(), router(state))
    }

    async fn app() -> Result<Router> {
        Ok(serving(setup_facade().await?).1)
    }

    fn get(uri: &str, tab: &str) -> Request<Body> {
        Request::get(uri)
            .header(header::COOKIE, format!("tab={tab}"))
            .body(Body::empty())
            .unwrap()
    }

    fn post(uri: &str, tab: &str, form: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::COOKIE, format!("tab={tab}"))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    async fn logged_in(app: &Router, tab: &str, email: &str, password: &str) {
        let form = format!("email={}&password={password}", email.replace('@', "%40"));
        let response = app
            .clone()
            .oneshot(post("/login", tab, &form))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_new_tab_gets_cookie_and_login_form() -> Result<()> {
        let app = app().await?;
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("tab="));
        assert!(body_text(response).await.contains("loginForm"));
        Ok(())
    }

    #[tokio::test]
    async fn test_login_messages() -> Result<()> {
        let app = app().await?;

        let response = app
            .clone()
            .oneshot(post("/login", "t1", "email=admin%40example.com&password=wrong"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(response).await.contains("Invalid password"));

        let response = app
            .oneshot(post("/login", "t1", "email=nobody%40example.com&password=admin"))
            .await
            .unwrap();
        assert!(body_text(response).await.contains("Invalid email"));
        Ok(())
    }

    #[tokio::test]
    async fn test_sections_follow_role() -> Result<()> {
        let app = app().await?;
        logged_in(&app, "admin-tab", "admin@example.com", "admin").await;
        logged_in(&app, "teacher-tab", "teacher@example.com", "teacher").await;

        let response = app
            .clone()
            .oneshot(get("/sections/fees", "admin-tab"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Student Fee Balances"));

        let response = app
            .clone()
            .oneshot(get("/sections/fees", "teacher-tab"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let page = body_text(response).await;
        assert!(!page.contains("Student Fee Balances"));
        assert!(!page.contains(r#"href="/sections/fees""#));

        let response = app
            .oneshot(get("/sections/timetable", "teacher-tab"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_redirects_to_receipt() -> Result<()> {
        let app = app().await?;
        logged_in(&app, "t1", "admin@example.com", "admin").await;

        let response = app
            .clone()
            .oneshot(post(
                "/fees/payments",
                "t1",
                "student_id=STD0002&amount=1200&payment_mode=Cash&payment_date=2025-09-12",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/receipts/INV00004");

        let response = app
            .oneshot(get("/receipts/INV00004", "t1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let receipt = body_text(response).await;
        assert!(receipt.contains("Priya Patel"));
        assert!(receipt.contains("Payment Received (Cash)"));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_payment_shows_banner() -> Result<()> {
        let app = app().await?;
        logged_in(&app, "t1", "admin@example.com", "admin").await;

        let response = app
            .oneshot(post(
                "/fees/payments",
                "t1",
                "student_id=STD0002&amount=-5&payment_mode=Cash&payment_date=2025-09-12",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("alert-warning"));
        Ok(())
    }

    #[tokio::test]
    async fn test_logout_ends_session() -> Result<()> {
        let app = app().await?;
        logged_in(&app, "t1", "teacher@example.com", "teacher").await;

        let response = app
            .clone()
            .oneshot(get("/certificates/STD0001", "t1"))
            .await
            .unwrap();
        assert!(body_text(response).await.contains("Rohan Sharma"));

        app.clone()
            .oneshot(post("/logout", "t1", ""))
            .await
            .unwrap();
        let response = app
            .oneshot(get("/sections/dashboard", "t1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        Ok(())
    }

    #[tokio::test]
    async fn test_marks_round_trip_through_sheet() -> Result<()> {
        let app = app().await?;
        logged_in(&app, "t1", "teacher@example.com", "teacher").await;

        let response = app
            .clone()
            .oneshot(post(
                "/marks",
                "t1",
                "class=Class+5&term=Term+2&subject=English&score_STD0001=77&score_STD0002=",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_text(response).await;
        assert!(page.contains("Saved 1 marks."));
        assert!(page.contains(r#"value="77""#));

        let response = app
            .oneshot(get("/marksheets/STD0001?class=Class%205", "t1"))
            .await
            .unwrap();
        let sheet = body_text(response).await;
        assert!(sheet.contains("<tr><td>English</td><td>-</td><td>77</td>"));
        Ok(())
    }

    #[tokio::test]
    async fn test_only_logged_in_tabs_are_kept() -> Result<()> {
        let (state, app) = serving(setup_facade().await?);

        for _ in 0..50 {
            app.clone()
                .oneshot(Request::get("/").body(Body::empty()).unwrap())
                .await
                .unwrap();
        }
        app.clone()
            .oneshot(get("/sections/dashboard", "stranger"))
            .await
            .unwrap();
        app.clone()
            .oneshot(post("/login", "t1", "email=admin%40example.com&password=wrong"))
            .await
            .unwrap();
        assert_eq!(state.tab_count().await, 0);

        logged_in(&app, "t1", "admin@example.com", "admin").await;
        assert_eq!(state.tab_count().await, 1);

        app.oneshot(post("/logout", "t1", "")).await.unwrap();
        assert_eq!(state.tab_count().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_slow_ledger_never_overwrites_newer_section() -> Result<()> {
        let db = setup_seeded_db().await?;
        let (_, app) = serving(Facade::new(db, Duration::from_millis(30)));
        logged_in(&app, "t1", "admin@example.com", "admin").await;

        let older = app.clone().oneshot(get("/fees/STD0001/ledger", "t1"));
        let newer = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            app.clone().oneshot(get("/sections/students", "t1")).await
        };
        let (older, newer) = tokio::join!(older, newer);
        assert_eq!(older.unwrap().status(), StatusCode::OK);
        assert_eq!(newer.unwrap().status(), StatusCode::OK);

        let page = body_text(app.oneshot(get("/", "t1")).await.unwrap()).await;
        assert!(page.contains("studentsTable"));
        assert!(!page.contains("Fee Ledger"));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_score_saves_nothing() -> Result<()> {
        let (state, app) = serving(setup_facade().await?);
        logged_in(&app, "t1", "teacher@example.com", "teacher").await;

        let response = app
            .oneshot(post(
                "/marks",
                "t1",
                "class=Class+5&term=Term+2&subject=English&score_STD0001=50&score_STD0002=-5",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("Invalid score: -5"));

        let sheet = state.facade.class_marks("Class 5", "Term 2", "English").await?;
        assert!(sheet.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_class_sheet_not_found() -> Result<()> {
        let app = app().await?;
        logged_in(&app, "t1", "teacher@example.com", "teacher").await;

        let response = app
            .oneshot(get("/marks/entry?class=Class+12&term=Term+1&subject=Math", "t1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let page = body_text(response).await;
        assert!(page.contains("Class not found."));
        assert!(!page.contains("Save Marks"));
        Ok(())
    }

    #[tokio::test]
    async fn test_class_marksheets_page() -> Result<()> {
        let app = app().await?;
        logged_in(&app, "t1", "teacher@example.com", "teacher").await;

        let response = app
            .clone()
            .oneshot(get("/marksheets?class=Class%205", "t1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_text(response).await;
        assert_eq!(page.matches("<iframe").count(), 2);
        assert!(page.contains("Rohan Sharma"));
        assert!(page.contains("Priya Patel"));

        let response = app
            .oneshot(get("/marksheets?class=Class%2012", "t1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }
}
