//! Priority-ordered selector rules
//!
//! Each field owns a list of CSS selectors tried in order. Single-valued
//! fields take the first selector whose first match has non-empty text.
//! List fields take the union of all matches in selector then document
//! order, without duplicates. Image fields read an attribute instead of text,
//! falling back through a list of attribute names.

use crate::extract::ExtractionError;
use crate::listing::{clean_text, RawRecord};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// How a rule turns matches into a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// First non-empty text wins
    Text,
    /// Union of all non-empty texts
    List,
    /// Union of the first present attribute among `attrs`
    Attr { attrs: &'static [&'static str] },
}

/// Extraction rule for one named field
#[derive(Debug, Clone)]
pub struct FieldRule {
    field: &'static str,
    kind: RuleKind,
    selectors: Vec<Selector>,
}

impl FieldRule {
    /// Compiles a rule; fails if any selector is not valid CSS
    pub fn new(
        field: &'static str,
        kind: RuleKind,
        selectors: &[&str],
    ) -> Result<Self, ExtractionError> {
        let selectors = selectors
            .iter()
            .map(|s| {
                Selector::parse(s).map_err(|e| ExtractionError::InvalidSelector {
                    field: field.to_string(),
                    selector: s.to_string(),
                    message: format!("{:?}", e),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            field,
            kind,
            selectors,
        })
    }

    pub fn text(field: &'static str, selectors: &[&str]) -> Result<Self, ExtractionError> {
        Self::new(field, RuleKind::Text, selectors)
    }

    pub fn list(field: &'static str, selectors: &[&str]) -> Result<Self, ExtractionError> {
        Self::new(field, RuleKind::List, selectors)
    }

    pub fn attr(
        field: &'static str,
        selectors: &[&str],
        attrs: &'static [&'static str],
    ) -> Result<Self, ExtractionError> {
        Self::new(field, RuleKind::Attr { attrs }, selectors)
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Applies the rule to a parsed document and stores the result
    pub fn apply(&self, document: &Html, record: &mut RawRecord) {
        match self.kind {
            RuleKind::Text => record.set_text(self.field, self.first_text(document)),
            RuleKind::List => record.set_list(self.field, self.all_texts(document)),
            RuleKind::Attr { attrs } => record.set_list(self.field, self.all_attrs(document, attrs)),
        }
    }

    fn first_text(&self, document: &Html) -> Option<String> {
        self.selectors.iter().find_map(|selector| {
            document
                .select(selector)
                .next()
                .and_then(|element| element_text(&element))
        })
    }

    fn all_texts(&self, document: &Html) -> Vec<String> {
        let mut results: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for selector in &self.selectors {
            for element in document.select(selector) {
                if let Some(text) = element_text(&element) {
                    if seen.insert(text.clone()) {
                        results.push(text);
                    }
                }
            }
        }
        results
    }

    fn all_attrs(&self, document: &Html, attrs: &[&str]) -> Vec<String> {
        let mut results: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for selector in &self.selectors {
            for element in document.select(selector) {
                let value = attrs
                    .iter()
                    .find_map(|attr| element.value().attr(attr).and_then(clean_text));
                if let Some(value) = value {
                    if seen.insert(value.clone()) {
                        results.push(value);
                    }
                }
            }
        }
        results
    }
}

/// Text content of an element, fragments joined by spaces and cleaned
fn element_text(element: &ElementRef) -> Option<String> {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}
