//! Printable documents: fee receipts, character certificates, marksheets.
//!
//! Each document loads its template from the [`TemplateStore`], gathers the
//! records through the [`Facade`] and renders strictly, so a template that
//! gains or loses a marker fails loudly instead of printing a stray `<?= ?>`.
//!
//! Marker vocabulary:
//!
//! | Template           | Markers |
//! |--------------------|---------|
//! | `invoice.html`     | `receipt.invoice_no`, `receipt.date`, `receipt.description`, `receipt.amount`, `receipt.previous_balance`, `receipt.balance`, `student.name`, `student.id`, `student.class`, `student.section` |
//! | `certificate.html` | `student.name`, `student.parent_name`, `student.address`, `student.id`, `student.class`, `issue_date` |
//! | `marksheet.html`   | `student.name`, `student.id`, `student.class`, `student.section`, `term_headers`, `subject_rows`, `date` |

use crate::{
    core::{Facade, fee::balance_of, mark::ReportCard},
    entities::{fee_transaction, student},
    errors::Result,
    render::{
        format::{escape_html, format_date, format_fixed, format_inr, format_timestamp},
        store::{TemplateKind, TemplateStore},
        template::{Bindings, Markup, Template},
    },
};
use chrono::NaiveDate;
use tracing::{debug, instrument};

const RECEIPT_LOCALE: &str = "en-IN";
const CERTIFICATE_LOCALE: &str = "en-GB";
const ABSENT: &str = "-";

/// Renders printable documents from stored records.
#[derive(Debug, Clone)]
pub struct Documents {
    facade: Facade,
    templates: TemplateStore,
}

impl Documents {
    /// Documents rendered from `facade` records into `templates`.
    #[must_use]
    pub const fn new(facade: Facade, templates: TemplateStore) -> Self {
        Self { facade, templates }
    }

    /// The template store documents are loaded from
    #[must_use]
    pub const fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Receipt for an invoice number; None when the invoice or its student is unknown.
    #[instrument(skip(self))]
    pub async fn receipt(&self, invoice_no: &str) -> Result<Option<String>> {
        let Some(transaction) = self.facade.receipt(invoice_no).await? else {
            return Ok(None);
        };
        self.receipt_for(&transaction).await
    }

    /// Receipt for a ledger entry already in hand, e.g. a payment just recorded.
    ///
    /// `receipt.balance` is the student's current balance and
    /// `receipt.previous_balance` the balance before this entry was applied.
    pub async fn receipt_for(
        &self,
        transaction: &fee_transaction::Model,
    ) -> Result<Option<String>> {
        let template = self.templates.load(TemplateKind::Invoice).await?;
        let Some(student) = self.facade.student(&transaction.student_id).await? else {
            return Ok(None);
        };
        let ledger = self.facade.student_ledger(&student.id).await?;
        let balance = balance_of(&ledger);
        let previous_balance = balance - transaction.signed_amount();

        let bindings = student_header(&student)
            .text("receipt.invoice_no", transaction.invoice_no.as_str())
            .text(
                "receipt.date",
                format_timestamp(transaction.date, RECEIPT_LOCALE),
            )
            .text("receipt.description", transaction.description.as_str())
            .text("receipt.amount", format_fixed(transaction.amount))
            .text("receipt.previous_balance", format_fixed(previous_balance))
            .text("receipt.balance", format_fixed(balance));

        debug!(invoice_no = %transaction.invoice_no, "Rendering receipt");
        template.render_strict(&bindings).map(Some)
    }

    /// Character certificate dated `issue_date`; None for an unknown student.
    #[instrument(skip(self))]
    pub async fn certificate(
        &self,
        student_id: &str,
        issue_date: NaiveDate,
    ) -> Result<Option<String>> {
        let template = self.templates.load(TemplateKind::Certificate).await?;
        let Some(student) = self.facade.student(student_id).await? else {
            return Ok(None);
        };

        let bindings = Bindings::new()
            .text("student.name", student.name.as_str())
            .text("student.parent_name", student.parent_name.as_str())
            .text("student.address", student.address.as_str())
            .text("student.id", student.id.as_str())
            .text("student.class", student.class_name.as_str())
            .text("issue_date", format_date(issue_date, CERTIFICATE_LOCALE));
        template.render_strict(&bindings).map(Some)
    }

    /// Marksheet of a student for a class.
    ///
    /// None when the student or the class is unknown.
    #[instrument(skip(self))]
    pub async fn marksheet(
        &self,
        student_id: &str,
        class_name: &str,
        date: NaiveDate,
    ) -> Result<Option<String>> {
        let template = self.templates.load(TemplateKind::Marksheet).await?;
        let Some(student) = self.facade.student(student_id).await? else {
            return Ok(None);
        };
        let Some(report) = self.facade.report_card(student_id, class_name).await? else {
            return Ok(None);
        };
        render_marksheet(&template, &student, &report, date).map(Some)
    }

    /// Marksheets of every active student of a class, in roll number order.
    ///
    /// None when the class is unknown.
    #[instrument(skip(self))]
    pub async fn class_marksheets(
        &self,
        class_name: &str,
        date: NaiveDate,
    ) -> Result<Option<Vec<String>>> {
        let template = self.templates.load(TemplateKind::Marksheet).await?;
        let classes = self.facade.classes().await?;
        if !classes.iter().any(|class| class.name == class_name) {
            return Ok(None);
        }

        let students = self.facade.active_students_in_class(class_name).await?;
        let mut sheets = Vec::with_capacity(students.len());
        for student in &students {
            if let Some(report) = self.facade.report_card(&student.id, class_name).await? {
                sheets.push(render_marksheet(&template, student, &report, date)?);
            }
        }
        debug!(class_name, sheets = sheets.len(), "Rendered class marksheets");
        Ok(Some(sheets))
    }
}

fn render_marksheet(
    template: &Template,
    student: &student::Model,
    report: &ReportCard,
    date: NaiveDate,
) -> Result<String> {
    let bindings = student_header(student)
        .markup("term_headers", term_headers(report))
        .markup("subject_rows", subject_rows(report))
        .text("date", format_date(date, RECEIPT_LOCALE));
    template.render_strict(&bindings)
}

fn student_header(student: &student::Model) -> Bindings {
    Bindings::new()
        .text("student.name", student.name.as_str())
        .text("student.id", student.id.as_str())
        .text("student.class", student.class_name.as_str())
        .text("student.section", student.section.as_str())
}

fn term_headers(report: &ReportCard) -> Markup {
    let mut html = String::new();
    for term in &report.terms {
        html.push_str(&format!("<th>{}</th>", escape_html(term)));
    }
    Markup::trusted(html)
}

fn subject_rows(report: &ReportCard) -> Markup {
    let mut html = String::new();
    for subject in &report.subjects {
        html.push_str(&format!("<tr><td>{}</td>", escape_html(&subject.subject_name)));
        for term in &report.terms {
            html.push_str(&format!("<td>{}</td>", score_cell(subject.mark_for(term))));
        }
        let grade = subject
            .grade
            .as_deref()
            .map_or_else(|| ABSENT.to_string(), escape_html);
        html.push_str(&format!(
            "<td>{}</td><td>{grade}</td></tr>",
            score_cell(subject.total)
        ));
    }
    Markup::trusted(html)
}

fn score_cell(score: Option<f64>) -> String {
    score.map_or_else(|| ABSENT.to_string(), format_inr)
}
