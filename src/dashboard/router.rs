//! Section navigation.
//!
//! Every navigation takes a ticket from the [`ViewRegion`] before it awaits
//! the facade. When a newer navigation starts in the meantime, the older one
//! finds its ticket superseded on completion and drops its fragment, so a slow
//! response can never overwrite the view the user asked for last. Sections go
//! through [`Dashboard::show_section`]; detail cards, forms and form results
//! go through [`Dashboard::show_loaded`].

use crate::{
    core::{Facade, auth::Identity, fee::balance_of},
    dashboard::{menu::Section, views},
    errors::Result,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

/// Proof of which navigation produced a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
struct RegionState {
    generation: u64,
    content: String,
}

/// The main content area of one tab.
#[derive(Debug, Clone, Default)]
pub struct ViewRegion {
    state: Arc<RwLock<RegionState>>,
}

impl ViewRegion {
    /// An empty region
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a navigation: shows the loading indicator and returns its ticket.
    pub async fn begin(&self) -> Ticket {
        let mut state = self.state.write().await;
        state.generation += 1;
        state.content = views::LOADING.to_string();
        Ticket(state.generation)
    }

    /// Replaces the content if `ticket` is still the latest navigation.
    ///
    /// Returns false, leaving the region untouched, for a superseded ticket.
    pub async fn commit(&self, ticket: Ticket, html: String) -> bool {
        let mut state = self.state.write().await;
        if state.generation != ticket.0 {
            return false;
        }
        state.content = html;
        true
    }

    /// Current content
    pub async fn content(&self) -> String {
        self.state.read().await.content.clone()
    }
}

/// How a navigation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The section's fragment replaced the region
    Rendered,
    /// A newer navigation started first; the fragment was dropped
    Superseded,
    /// No section has this name; nothing changed
    Unknown,
    /// The identity's role may not open the section; nothing changed
    Forbidden,
}

/// Section handlers bound to one tab's view region.
#[derive(Debug, Clone)]
pub struct Dashboard {
    facade: Facade,
    region: ViewRegion,
}

impl Dashboard {
    /// A dashboard rendering into a fresh region
    #[must_use]
    pub fn new(facade: Facade) -> Self {
        Self {
            facade,
            region: ViewRegion::new(),
        }
    }

    /// The region this dashboard renders into
    #[must_use]
    pub const fn region(&self) -> &ViewRegion {
        &self.region
    }

    /// Navigates by section name, as found in a link.
    pub async fn show_section_named(&self, identity: &Identity, name: &str) -> Navigation {
        match name.parse::<Section>() {
            Ok(section) => self.show_section(identity, section).await,
            Err(_) => {
                debug!(name, "Ignoring unknown section");
                Navigation::Unknown
            }
        }
    }

    /// Loads `section` for `identity` into the region.
    ///
    /// A failed load renders an error banner in place of the section.
    pub async fn show_section(&self, identity: &Identity, section: Section) -> Navigation {
        if !section.permits(identity.role) {
            warn!(%section, role = %identity.role, "Section refused");
            return Navigation::Forbidden;
        }

        let ticket = self.region.begin().await;
        let html = match self.load_section(identity, section).await {
            Ok(html) => html,
            Err(e) => {
                error!(%section, "Failed to load section: {e}");
                views::error_banner(section.failure_subject())
            }
        };

        if self.region.commit(ticket, html).await {
            Navigation::Rendered
        } else {
            debug!(%section, "Dropping superseded section");
            Navigation::Superseded
        }
    }

    /// Shows a fragment loaded outside the section table, such as a detail
    /// card or the result of a form submission.
    ///
    /// The ticket is taken before `load` is first polled, so a navigation
    /// started while it is pending supersedes it. When `load` finds nothing the
    /// region shows `missing` as a banner and the result is `Ok(None)`. A failed
    /// load shows the failure as a banner and returns it.
    pub async fn show_loaded<F>(&self, load: F, missing: &str) -> Result<Option<Navigation>>
    where
        F: Future<Output = Result<Option<String>>>,
    {
        let ticket = self.region.begin().await;
        let (html, outcome) = match load.await {
            Ok(Some(html)) => (html, Ok(true)),
            Ok(None) => (views::warning_banner(missing), Ok(false)),
            Err(e) => {
                warn!("Failed to load fragment: {e}");
                (views::rejection_banner(&e), Err(e))
            }
        };

        let navigation = if self.region.commit(ticket, html).await {
            Navigation::Rendered
        } else {
            debug!("Dropping superseded fragment");
            Navigation::Superseded
        };
        outcome.map(|found: bool| found.then_some(navigation))
    }

    /// Builds the fragment of `section` without touching the region.
    ///
    /// # Errors
    /// Facade failures while gathering the section's records.
    pub async fn load_section(&self, identity: &Identity, section: Section) -> Result<String> {
        Ok(match section {
            Section::Dashboard => views::dashboard(&self.facade.dashboard_stats().await?),
            Section::Students => views::students(&self.facade.students().await?, identity.role),
            Section::Attendance | Section::Promotion => views::notice(section),
            Section::Settings => views::settings(&self.facade.classes().await?),
            Section::Marks => {
                let mut rosters = Vec::new();
                for class in self.facade.classes().await? {
                    let students = self.facade.active_students_in_class(&class.name).await?;
                    rosters.push((class, students));
                }
                views::marks(&rosters)
            }
            Section::Fees => views::fees(&self.facade.fee_summaries().await?),
        })
    }

    /// Detail card for one student; None for an unknown id.
    pub async fn student_detail(
        &self,
        identity: &Identity,
        student_id: &str,
    ) -> Result<Option<String>> {
        let student = self.facade.student(student_id).await?;
        Ok(student.map(|s| views::student_detail(&s, &identity.dateformat)))
    }

    /// Admission form, or the edit form for an existing student.
    pub async fn student_form(&self, student_id: Option<&str>) -> Result<Option<String>> {
        let classes = self.facade.classes().await?;
        match student_id {
            None => Ok(Some(views::student_form(None, &classes))),
            Some(id) => {
                let student = self.facade.student(id).await?;
                Ok(student.map(|s| views::student_form(Some(&s), &classes)))
            }
        }
    }

    /// A student's ledger with running balance; None for an unknown id.
    pub async fn ledger(&self, identity: &Identity, student_id: &str) -> Result<Option<String>> {
        let Some(student) = self.facade.student(student_id).await? else {
            return Ok(None);
        };
        let entries = self.facade.student_ledger(student_id).await?;
        Ok(Some(views::ledger(&student, &entries, &identity.dateformat)))
    }

    /// Payment form showing the current balance; None for an unknown id.
    pub async fn payment_form(&self, student_id: &str, today: NaiveDate) -> Result<Option<String>> {
        let Some(student) = self.facade.student(student_id).await? else {
            return Ok(None);
        };
        let balance = balance_of(&self.facade.student_ledger(student_id).await?);
        Ok(Some(views::payment_form(&student, balance, today)))
    }

    /// Score sheet for one class, term and subject; None for an unknown class.
    pub async fn marks_entry(
        &self,
        class_name: &str,
        term: &str,
        subject: &str,
    ) -> Result<Option<String>> {
        let classes = self.facade.classes().await?;
        if !classes.iter().any(|class| class.name == class_name) {
            return Ok(None);
        }
        let students = self.facade.active_students_in_class(class_name).await?;
        let recorded = self.facade.class_marks(class_name, term, subject).await?;
        Ok(Some(views::marks_entry(
            class_name, term, subject, &students, &recorded,
        )))
    }
}
