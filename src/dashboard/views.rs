//! HTML fragments for the view region.
//!
//! Every dynamic value goes through [`escape_html`] before it lands in markup.

use crate::{
    core::{class::ClassInfo, fee::FeeSummary, stats::DashboardStats},
    dashboard::menu::Section,
    entities::{PaymentMode, Role, StudentStatus, TransactionKind, fee_transaction, student},
    errors::Error,
    render::format::{escape_html, format_date, format_inr, format_rupees, format_timestamp},
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Shown while a section's data is on its way
pub const LOADING: &str = r#"<div class="d-flex justify-content-center p-5"><div class="spinner-border" role="status"><span class="visually-hidden">Loading...</span></div></div>"#;

/// Inline banner for a failed section load.
#[must_use]
pub fn error_banner(subject: &str) -> String {
    format!(
        r#"<div class="alert alert-danger">Failed to load {}.</div>"#,
        escape_html(subject)
    )
}

/// Inline banner for a rejected form submission.
#[must_use]
pub fn warning_banner(message: &str) -> String {
    format!(
        r#"<div class="alert alert-warning">{}</div>"#,
        escape_html(message)
    )
}

/// Banner for a failed operation, worded for the user.
#[must_use]
pub fn rejection_banner(error: &Error) -> String {
    match error {
        Error::Validation { message } => warning_banner(message),
        Error::InvalidAmount { .. } => warning_banner("Please enter a valid amount and date."),
        Error::StudentNotFound { .. } => warning_banner("Student not found."),
        _ => warning_banner("Something went wrong. Please try again."),
    }
}

/// Stat cards and the per-class distribution.
#[must_use]
pub fn dashboard(stats: &DashboardStats) -> String {
    let mut rows = String::new();
    for (class_name, count) in &stats.student_count_by_class {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{count}</td></tr>",
            escape_html(class_name)
        ));
    }

    format!(
        r#"<div class="row">
<div class="col-md-4 mb-3"><div class="card p-3"><div class="card-body"><h4>Total Students</h4><p class="fs-2">{students}</p></div></div></div>
<div class="col-md-4 mb-3"><div class="card p-3"><div class="card-body"><h4>Total Teachers</h4><p class="fs-2">{teachers}</p></div></div></div>
<div class="col-md-4 mb-3"><div class="card p-3"><div class="card-body"><h4>Total Due Amount</h4><p class="fs-2">{due}</p></div></div></div>
</div>
<div class="card mt-3"><div class="card-header">Student Distribution by Class</div><div class="card-body">
<table class="table" id="classDistribution"><thead><tr><th>Class</th><th>Number of Students</th></tr></thead><tbody>{rows}</tbody></table>
</div></div>"#,
        students = stats.total_students,
        teachers = stats.total_teachers,
        due = format_rupees(stats.total_due),
    )
}

/// View and certificate for everyone; edit and delete for admins.
#[must_use]
pub fn student_actions(student_id: &str, role: Role) -> String {
    let id = escape_html(student_id);
    let mut buttons = format!(
        r#"<a class="btn btn-sm btn-info" href="/students/{id}" title="View"><i class="fas fa-eye"></i></a> <a class="btn btn-sm btn-secondary" href="/certificates/{id}" title="Character Certificate"><i class="fas fa-stamp"></i></a>"#
    );
    if role == Role::Admin {
        buttons.push_str(&format!(
            r#"<a class="btn btn-sm btn-warning" href="/students/{id}/edit" title="Edit"><i class="fas fa-edit"></i></a><form method="post" action="/students/{id}/delete" class="d-inline"><button class="btn btn-sm btn-danger" title="Delete"><i class="fas fa-trash"></i></button></form>"#
        ));
    }
    format!(r#"<div class="btn-group">{buttons}</div>"#)
}

/// The student register.
#[must_use]
pub fn students(students: &[student::Model], role: Role) -> String {
    let mut rows = String::new();
    for s in students {
        let badge = if s.is_active() { "success" } else { "danger" };
        rows.push_str(&format!(
            r#"<tr class="align-middle"><td>{id}</td><td>{roll}</td><td>{name}</td><td>{class}</td><td>{section}</td><td>{parent}</td><td>{contact}</td><td><span class="badge bg-{badge}">{status}</span></td><td>{actions}</td></tr>"#,
            id = escape_html(&s.id),
            roll = s.roll_no,
            name = escape_html(&s.name),
            class = escape_html(&s.class_name),
            section = escape_html(&s.section),
            parent = escape_html(&s.parent_name),
            contact = escape_html(&s.contact),
            status = s.status,
            actions = student_actions(&s.id, role),
        ));
    }

    let add_button = if role == Role::Admin {
        r#"<a class="btn btn-primary btn-sm" href="/students/new">Add Student</a>"#
    } else {
        ""
    };

    format!(
        r#"<div class="card"><div class="card-header d-flex justify-content-between"><span>Students</span>{add_button}</div>
<div class="card-body"><div class="table-responsive"><table class="table table-hover" id="studentsTable">
<thead><tr><th>ID</th><th>Roll No.</th><th>Name</th><th>Class</th><th>Section</th><th>Parent</th><th>Contact</th><th>Status</th><th>Actions</th></tr></thead>
<tbody>{rows}</tbody></table></div></div></div>"#
    )
}

/// Due, advance or cleared badge for a balance.
#[must_use]
pub fn balance_badge(balance: f64) -> String {
    if balance > 0.0 {
        format!(
            r#"<span class="badge bg-danger">{} Due</span>"#,
            format_rupees(balance)
        )
    } else if balance < 0.0 {
        format!(
            r#"<span class="badge bg-success">{} Advance</span>"#,
            format_rupees(balance.abs())
        )
    } else {
        r#"<span class="badge bg-secondary">₹ 0 Cleared</span>"#.to_string()
    }
}

/// Fee balances of active students.
#[must_use]
pub fn fees(summaries: &[FeeSummary]) -> String {
    let mut rows = String::new();
    for s in summaries {
        let id = escape_html(&s.student_id);
        rows.push_str(&format!(
            r#"<tr><td>{name}</td><td>{class}</td><td>{badge}</td><td><div class="btn-group"><a class="btn btn-sm btn-primary" href="/fees/{id}/payment">Make Payment</a><a class="btn btn-sm btn-info" href="/fees/{id}/ledger">View Ledger</a></div></td></tr>"#,
            name = escape_html(&s.student_name),
            class = escape_html(&s.class_name),
            badge = balance_badge(s.total_due),
        ));
    }

    format!(
        r#"<div class="card"><div class="card-header">Student Fee Balances</div><div class="card-body">
<div class="table-responsive"><table class="table" id="feesSummaryTable">
<thead><tr><th>Student</th><th>Class</th><th>Balance</th><th>Actions</th></tr></thead>
<tbody>{rows}</tbody></table></div></div></div>"#
    )
}

fn options<'a>(values: impl IntoIterator<Item = &'a String>) -> String {
    let mut html = String::new();
    for value in values {
        let value = escape_html(value);
        html.push_str(&format!(r#"<option value="{value}">{value}</option>"#));
    }
    html
}

/// Marks entry selectors and the marksheet generator.
///
/// `rosters` pairs each class with its active students.
#[must_use]
pub fn marks(rosters: &[(ClassInfo, Vec<student::Model>)]) -> String {
    let mut entry = String::new();
    let mut generator = String::new();
    for (class, students) in rosters {
        let name = escape_html(&class.name);
        entry.push_str(&format!(
            r#"<form method="get" action="/marks/entry" class="row g-3 align-items-end mb-2"><input type="hidden" name="class" value="{name}"><div class="col-md-4"><strong>{name}</strong></div><div class="col-md-3"><select class="form-select" name="term">{terms}</select></div><div class="col-md-3"><select class="form-select" name="subject">{subjects}</select></div><div class="col-md-2"><button class="btn btn-primary w-100">Enter</button></div></form>"#,
            terms = options(&class.terms),
            subjects = options(&class.subjects),
        ));

        generator.push_str(&format!("<h6>{name}</h6><ul class=\"list-unstyled\">"));
        for s in students {
            generator.push_str(&format!(
                r#"<li><form method="get" action="/marksheets/{id}" class="d-inline"><input type="hidden" name="class" value="{name}"><button class="btn btn-link p-0">{student} ({id})</button></form></li>"#,
                id = escape_html(&s.id),
                student = escape_html(&s.name),
            ));
        }
        generator.push_str(&format!(
            r#"</ul><form method="get" action="/marksheets" class="mb-3"><input type="hidden" name="class" value="{name}"><button class="btn btn-success btn-sm w-100">For Entire Class</button></form>"#
        ));
    }

    format!(
        r#"<div class="row">
<div class="col-md-7 mb-3"><div class="card h-100"><div class="card-header">Class-wise Marks Entry</div><div class="card-body">{entry}</div></div></div>
<div class="col-md-5 mb-3"><div class="card h-100"><div class="card-header">Generate Marksheet</div><div class="card-body">{generator}</div></div></div>
</div>"#
    )
}

/// Form field carrying a student's score in the marks entry sheet
#[must_use]
pub fn score_field(student_id: &str) -> String {
    format!("score_{student_id}")
}

/// Score inputs for one class, term and subject, prefilled with recorded marks.
#[must_use]
pub fn marks_entry(
    class_name: &str,
    term: &str,
    subject: &str,
    students: &[student::Model],
    recorded: &BTreeMap<String, f64>,
) -> String {
    let mut rows = String::new();
    for s in students {
        let value = recorded.get(&s.id).map(f64::to_string).unwrap_or_default();
        rows.push_str(&format!(
            r#"<tr><td>{roll}</td><td>{name}</td><td><input name="{field}" type="number" step="0.5" min="0" class="form-control" value="{value}"></td></tr>"#,
            roll = s.roll_no,
            name = escape_html(&s.name),
            field = escape_html(&score_field(&s.id)),
        ));
    }

    format!(
        r#"<div class="card"><div class="card-header">{class} / {term} / {subject}</div><div class="card-body">
<form method="post" action="/marks">
<input type="hidden" name="class" value="{class}"><input type="hidden" name="term" value="{term}"><input type="hidden" name="subject" value="{subject}">
<table class="table"><thead><tr><th>Roll No.</th><th>Name</th><th>Marks</th></tr></thead><tbody>{rows}</tbody></table>
<button class="btn btn-success">Save Marks</button>
</form></div></div>"#,
        class = escape_html(class_name),
        term = escape_html(term),
        subject = escape_html(subject),
    )
}

/// Sections, fee structure, terms and subjects of every class.
#[must_use]
pub fn settings(classes: &[ClassInfo]) -> String {
    let mut rows = String::new();
    for class in classes {
        let mut fees = String::new();
        for (head, amount) in &class.fee_structure {
            fees.push_str(&format!("{}: {}<br>", escape_html(head), format_rupees(*amount)));
        }
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{fees}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&class.name),
            escape_html(&class.sections.join(", ")),
            escape_html(&class.terms.join(", ")),
            escape_html(&class.subjects.join(", ")),
        ));
    }

    format!(
        r#"<div class="card"><div class="card-header">Class Settings</div><div class="card-body">
<table class="table"><thead><tr><th>Class</th><th>Sections</th><th>Fee Structure</th><th>Terms</th><th>Subjects</th></tr></thead>
<tbody>{rows}</tbody></table></div></div>"#
    )
}

/// Notice for sections without stored records.
#[must_use]
pub fn notice(section: Section) -> String {
    format!(
        r#"<div class="alert alert-info">{} records are not kept by this dashboard yet.</div>"#,
        escape_html(section.label())
    )
}

/// One student's details.
#[must_use]
pub fn student_detail(s: &student::Model, locale: &str) -> String {
    format!(
        r#"<div class="card"><div class="card-header">Student Details</div><div class="card-body">
<p><strong>ID:</strong> {id}</p><p><strong>Name:</strong> {name}</p>
<p><strong>Class:</strong> {class} - {section}</p><p><strong>Parent:</strong> {parent} ({contact})</p>
<p><strong>Admission Date:</strong> {admitted}</p></div></div>"#,
        id = escape_html(&s.id),
        name = escape_html(&s.name),
        class = escape_html(&s.class_name),
        section = escape_html(&s.section),
        parent = escape_html(&s.parent_name),
        contact = escape_html(&s.contact),
        admitted = format_date(s.admission_date, locale),
    )
}

/// Admission form, or the edit form when `existing` is given.
#[must_use]
pub fn student_form(existing: Option<&student::Model>, classes: &[ClassInfo]) -> String {
    let field = |pick: fn(&student::Model) -> String| existing.map(pick).unwrap_or_default();
    let action = existing.map_or_else(
        || "/students".to_string(),
        |s| format!("/students/{}", escape_html(&s.id)),
    );
    let title = if existing.is_some() { "Edit Student" } else { "Add Student" };

    let current_class = field(|s| s.class_name.clone());
    let mut class_options = String::new();
    for class in classes {
        let name = escape_html(&class.name);
        let selected = if class.name == current_class { " selected" } else { "" };
        class_options.push_str(&format!(r#"<option value="{name}"{selected}>{name}</option>"#));
    }

    let mut inputs = String::new();
    let text_fields: [(&str, &str, &str, String); 10] = [
        ("roll_no", "Roll No.", "number", field(|s| s.roll_no.to_string())),
        ("name", "Name", "text", field(|s| s.name.clone())),
        ("section", "Section", "text", field(|s| s.section.clone())),
        ("parent_name", "Parent Name", "text", field(|s| s.parent_name.clone())),
        ("contact", "Contact", "tel", field(|s| s.contact.clone())),
        ("address", "Address", "text", field(|s| s.address.clone())),
        ("email", "Email", "email", field(|s| s.email.clone())),
        (
            "date_of_birth",
            "Date of Birth",
            "date",
            field(|s| s.date_of_birth.format("%Y-%m-%d").to_string()),
        ),
        ("gender", "Gender", "text", field(|s| s.gender.clone())),
        (
            "admission_date",
            "Admission Date",
            "date",
            field(|s| s.admission_date.format("%Y-%m-%d").to_string()),
        ),
    ];
    for (name, label, kind, value) in text_fields {
        inputs.push_str(&format!(
            r#"<div class="mb-3"><label class="form-label">{label}</label><input name="{name}" type="{kind}" class="form-control" value="{value}" required></div>"#,
            value = escape_html(&value),
        ));
    }

    let status = existing.map_or(String::new(), |s| {
        let mut options = String::new();
        for candidate in [StudentStatus::Active, StudentStatus::Inactive] {
            let selected = if candidate == s.status { " selected" } else { "" };
            options.push_str(&format!("<option{selected}>{candidate}</option>"));
        }
        format!(
            r#"<div class="mb-3"><label class="form-label">Status</label><select name="status" class="form-select">{options}</select></div>"#
        )
    });

    format!(
        r#"<div class="card"><div class="card-header">{title}</div><div class="card-body">
<form method="post" action="{action}">
<div class="mb-3"><label class="form-label">Class</label><select name="class_name" class="form-select">{class_options}</select></div>
{inputs}{status}<button class="btn btn-primary">Save</button>
</form></div></div>"#
    )
}

/// Ledger with a running balance; payments get a reprint button.
#[must_use]
pub fn ledger(s: &student::Model, entries: &[fee_transaction::Model], locale: &str) -> String {
    let mut rows = String::new();
    let mut balance = 0.0;
    for t in entries {
        balance += t.signed_amount();
        let amount = format_rupees(t.amount);
        let (charged, paid, actions) = match t.kind {
            TransactionKind::Charge => (amount, String::new(), String::new()),
            TransactionKind::Payment => (
                String::new(),
                amount,
                format!(
                    r#"<a class="btn btn-sm btn-outline-secondary" href="/receipts/{}" title="Print Receipt"><i class="fas fa-print"></i></a>"#,
                    escape_html(&t.invoice_no)
                ),
            ),
        };
        rows.push_str(&format!(
            r#"<tr><td>{date}</td><td>{description}</td><td class="text-danger">{charged}</td><td class="text-success">{paid}</td><td>{running}</td><td>{actions}</td></tr>"#,
            date = format_timestamp(t.date, locale),
            description = escape_html(&t.description),
            running = format_rupees(balance),
        ));
    }

    format!(
        r#"<div class="card"><div class="card-header">Fee Ledger for {name}</div><div class="card-body"><div class="table-responsive"><table class="table">
<thead><tr><th>Date</th><th>Description</th><th>Charged</th><th>Paid</th><th>Balance</th><th>Actions</th></tr></thead>
<tbody>{rows}</tbody></table></div></div></div>"#,
        name = escape_html(&s.name),
    )
}

/// The record-payment form, prefilled with `today`.
#[must_use]
pub fn payment_form(s: &student::Model, balance: f64, today: NaiveDate) -> String {
    let mut modes = String::new();
    for mode in PaymentMode::ALL {
        modes.push_str(&format!("<option>{mode}</option>"));
    }

    format!(
        r#"<div class="card"><div class="card-header">Record Payment</div><div class="card-body">
<form method="post" action="/fees/payments">
<input type="hidden" name="student_id" value="{id}">
<p><strong>Student:</strong> {name} ({id})</p>
<p><strong>Current Balance:</strong> ₹ {balance}</p>
<div class="mb-3"><label class="form-label">Amount</label><input name="amount" type="number" step="0.01" min="0.01" class="form-control" required></div>
<div class="mb-3"><label class="form-label">Payment Mode</label><select name="payment_mode" class="form-select">{modes}</select></div>
<div class="mb-3"><label class="form-label">Payment Date</label><input name="payment_date" type="date" class="form-control" value="{today}" required></div>
<button class="btn btn-primary">Submit &amp; Print</button>
</form></div></div>"#,
        id = escape_html(&s.id),
        name = escape_html(&s.name),
        balance = format_inr(balance),
        today = today.format("%Y-%m-%d"),
    )
}
