//! Dashboard sections and the role-filtered navigation menu.

use crate::{
    entities::Role,
    errors::{Error, Result},
    render::format::escape_html,
};
use std::fmt;
use std::str::FromStr;

/// A top-level view of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Headline figures
    Dashboard,
    /// Student register
    Students,
    /// Attendance
    Attendance,
    /// Per-class configuration
    Settings,
    /// Marks entry and marksheets
    Marks,
    /// Fee balances
    Fees,
    /// Promotion to the next class
    Promotion,
}

impl Section {
    /// Every section in menu order
    pub const ALL: [Self; 7] = [
        Self::Dashboard,
        Self::Students,
        Self::Attendance,
        Self::Settings,
        Self::Marks,
        Self::Fees,
        Self::Promotion,
    ];

    /// Identifier used in URLs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Students => "students",
            Self::Attendance => "attendance",
            Self::Settings => "settings",
            Self::Marks => "marks",
            Self::Fees => "fees",
            Self::Promotion => "promotion",
        }
    }

    /// Menu text
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Students => "Students",
            Self::Attendance => "Attendance",
            Self::Settings => "Class Settings",
            Self::Marks => "Marksheet",
            Self::Fees => "Fees",
            Self::Promotion => "Promotion",
        }
    }

    /// Icon classes shown beside the label
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Dashboard => "fas fa-chart-line",
            Self::Students => "fas fa-users",
            Self::Attendance => "fas fa-user-check",
            Self::Settings => "fas fa-cogs",
            Self::Marks => "fas fa-award",
            Self::Fees => "fas fa-rupee-sign",
            Self::Promotion => "fas fa-arrow-alt-circle-up",
        }
    }

    /// Roles allowed to open this section
    #[must_use]
    pub const fn allowed_roles(self) -> &'static [Role] {
        match self {
            Self::Dashboard | Self::Students | Self::Attendance | Self::Marks => {
                &[Role::Admin, Role::Teacher]
            }
            Self::Settings | Self::Fees | Self::Promotion => &[Role::Admin],
        }
    }

    /// Whether `role` may open this section.
    #[must_use]
    pub fn permits(self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }

    /// What the error banner says could not be loaded
    #[must_use]
    pub const fn failure_subject(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Students => "students",
            Self::Attendance => "attendance",
            Self::Settings => "class settings",
            Self::Marks => "marks",
            Self::Fees => "fee summaries",
            Self::Promotion => "promotion",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| Error::Validation {
                message: format!("Unknown section: {s}"),
            })
    }
}

/// Side menu and top navigation for one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    sections: Vec<Section>,
}

impl Menu {
    /// The entries `role` may see, in menu order.
    #[must_use]
    pub fn for_role(role: Role) -> Self {
        Self {
            sections: Section::ALL
                .into_iter()
                .filter(|section| section.permits(role))
                .collect(),
        }
    }

    /// Visible sections
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Whether `section` has an entry
    #[must_use]
    pub fn contains(&self, section: Section) -> bool {
        self.sections.contains(&section)
    }

    /// Side menu list-group links.
    #[must_use]
    pub fn side_menu_html(&self) -> String {
        let mut html = String::new();
        for section in &self.sections {
            html.push_str(&format!(
                r#"<a href="/sections/{id}" class="list-group-item list-group-item-action"><i class="{icon} me-2"></i> {label}</a>"#,
                id = section.as_str(),
                icon = section.icon(),
                label = escape_html(section.label()),
            ));
        }
        html
    }

    /// Top navbar items.
    #[must_use]
    pub fn nav_html(&self) -> String {
        let mut html = String::new();
        for section in &self.sections {
            html.push_str(&format!(
                r#"<li class="nav-item"><a class="nav-link" href="/sections/{id}"><i class="{icon} me-2"></i> {label}</a></li>"#,
                id = section.as_str(),
                icon = section.icon(),
                label = escape_html(section.label()),
            ));
        }
        html
    }
}
