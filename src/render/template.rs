//! Template parsing and marker substitution.
//!
//! A template is text containing markers of the form `<?= name ?>` (the spaces
//! are optional). Parsing splits the text once into literal and marker
//! segments, so substitution works on whole marker names: a key can never
//! match part of another marker, and inserted values are never re-scanned for
//! markers.
//!
//! ```text
//! "<p><?= student.name ?> (<?=student.id?>)</p>"
//!   → [Literal "<p>", Marker student.name, Literal " (", Marker student.id, Literal ")</p>"]
//! ```
//!
//! Values are either [`Value::Text`], escaped on insertion, or
//! [`Value::Markup`], a fragment the caller built with escaping already applied.

use crate::{
    errors::{Error, Result},
    render::format::escape_html,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

const OPEN: &str = "<?=";
const CLOSE: &str = "?>";

/// Trusted HTML, inserted without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Markup(String);

impl Markup {
    /// Wraps a fragment whose dynamic parts were already escaped.
    #[must_use]
    pub const fn trusted(html: String) -> Self {
        Self(html)
    }

    /// The wrapped HTML
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A value bound to a marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Plain text, HTML-escaped on insertion
    Text(String),
    /// Pre-built HTML, inserted as is
    Markup(Markup),
}

impl Value {
    fn render_into(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(&escape_html(text)),
            Self::Markup(markup) => out.push_str(markup.as_str()),
        }
    }
}

/// Marker name → value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: BTreeMap<String, Value>,
}

impl Bindings {
    /// An empty binding set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to escaped text.
    #[must_use]
    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values
            .insert(name.to_string(), Value::Text(value.into()));
        self
    }

    /// Binds `name` to a trusted fragment.
    #[must_use]
    pub fn markup(mut self, name: &str, value: Markup) -> Self {
        self.values.insert(name.to_string(), Value::Markup(value));
        self
    }

    /// Value bound to `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Whether nothing is bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Marker {
        name: String,
        // Marker text as written, emitted when the marker stays unbound
        raw: String,
    },
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Splits `source` into literal and marker segments.
    ///
    /// An opener without a closing `?>`, or with an empty or space-containing
    /// name, is kept as literal text.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find(OPEN) {
            let (before, from_open) = rest.split_at(start);
            push_literal(&mut segments, before);

            let after_open = &from_open[OPEN.len()..];
            let Some(end) = after_open.find(CLOSE) else {
                push_literal(&mut segments, from_open);
                rest = "";
                break;
            };

            let name = after_open[..end].trim();
            if name.is_empty() || name.contains(char::is_whitespace) {
                push_literal(&mut segments, OPEN);
                rest = after_open;
                continue;
            }

            let marker_len = OPEN.len() + end + CLOSE.len();
            segments.push(Segment::Marker {
                name: name.to_string(),
                raw: from_open[..marker_len].to_string(),
            });
            rest = &from_open[marker_len..];
        }
        push_literal(&mut segments, rest);

        Self { segments }
    }

    /// Distinct marker names in the template.
    #[must_use]
    pub fn markers(&self) -> BTreeSet<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Marker { name, .. } => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Whether the template contains a marker called `name`.
    #[must_use]
    pub fn has_marker(&self, name: &str) -> bool {
        self.markers().contains(name)
    }

    /// Replaces every occurrence of each bound marker. Unbound markers are
    /// left exactly as written.
    ///
    /// # Errors
    /// `Error::UnknownMarker` if a binding names a marker the template lacks.
    pub fn render(&self, bindings: &Bindings) -> Result<String> {
        let markers = self.markers();
        if let Some(unknown) = bindings.names().find(|name| !markers.contains(name)) {
            return Err(Error::UnknownMarker {
                name: unknown.to_string(),
            });
        }

        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Marker { name, raw } => match bindings.get(name) {
                    Some(value) => value.render_into(&mut out),
                    None => out.push_str(raw),
                },
            }
        }
        Ok(out)
    }

    /// Like [`Template::render`], but every marker must be bound.
    ///
    /// # Errors
    /// `Error::UnknownMarker` for a stray binding, `Error::MissingBinding` for
    /// a marker without a value.
    pub fn render_strict(&self, bindings: &Bindings) -> Result<String> {
        if let Some(missing) = self
            .markers()
            .into_iter()
            .find(|name| bindings.get(name).is_none())
        {
            return Err(Error::MissingBinding {
                name: missing.to_string(),
            });
        }
        self.render(bindings)
    }
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Literal(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::Literal(text.to_string()));
    }
}
