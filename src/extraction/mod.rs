//! Heuristic field location.
//!
//! Each strategy lives in its own file as an `impl FieldExtractor` block and
//! answers `Ok(Some(value))`, `Ok(None)` (no match) or an [`ExtractionError`]
//! that [`FieldExtractor::run_stack`] downgrades to a no-match.

mod attributes;
mod form_controls;
mod label_pairs;
pub mod matcher;
mod proximity;
mod selectors;
mod table_cells;

use std::cell::OnceCell;

use tracing::debug;

use crate::core::error::ExtractionError;
use crate::core::types::ExtractionResult;
use crate::scraping::PageDocument;

pub use matcher::{Candidate, LabelSet, Pass};

/// Base confidence reported for a value, by the method that found it.
pub mod confidence {
    pub const SYSTEM_SELECTOR: f64 = 0.9;
    pub const LABEL_PAIR: f64 = 0.85;
    pub const FORM_CONTROL: f64 = 0.8;
    pub const TABLE_CELL: f64 = 0.7;
    pub const ATTRIBUTE: f64 = 0.6;
    pub const PROXIMITY: f64 = 0.5;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    SystemSelector,
    LabelPairs,
    FormControls,
    TableCells,
    Proximity,
    Attributes,
}

impl ExtractionMethod {
    /// Trial order for every generic field lookup.
    pub const STACK: [ExtractionMethod; 5] = [
        ExtractionMethod::LabelPairs,
        ExtractionMethod::FormControls,
        ExtractionMethod::TableCells,
        ExtractionMethod::Proximity,
        ExtractionMethod::Attributes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::SystemSelector => "system-selector",
            ExtractionMethod::LabelPairs => "label-pairs",
            ExtractionMethod::FormControls => "form-controls",
            ExtractionMethod::TableCells => "table-cells",
            ExtractionMethod::Proximity => "proximity",
            ExtractionMethod::Attributes => "attributes",
        }
    }

    pub fn base_confidence(&self) -> f64 {
        match self {
            ExtractionMethod::SystemSelector => confidence::SYSTEM_SELECTOR,
            ExtractionMethod::LabelPairs => confidence::LABEL_PAIR,
            ExtractionMethod::FormControls => confidence::FORM_CONTROL,
            ExtractionMethod::TableCells => confidence::TABLE_CELL,
            ExtractionMethod::Proximity => confidence::PROXIMITY,
            ExtractionMethod::Attributes => confidence::ATTRIBUTE,
        }
    }

    /// `"epic"` + LabelPairs → `"epic:label-pairs"`
    pub fn tag(&self, source: &str) -> String {
        format!("{}:{}", source, self.as_str())
    }
}

/// Read-only view of one page for the duration of a capture.
pub struct FieldExtractor<'d> {
    doc: &'d PageDocument,
    body_text: OnceCell<String>,
}

impl<'d> FieldExtractor<'d> {
    pub fn new(doc: &'d PageDocument) -> Self {
        Self {
            doc,
            body_text: OnceCell::new(),
        }
    }

    pub fn document(&self) -> &'d PageDocument {
        self.doc
    }

    /// Rendered body text, computed on first use.
    fn body_text(&self) -> &str {
        self.body_text.get_or_init(|| self.doc.body_text())
    }

    /// Run one strategy by name.
    pub fn attempt(
        &self,
        method: ExtractionMethod,
        labels: &LabelSet,
        system_selectors: &[String],
    ) -> Result<Option<String>, ExtractionError> {
        match method {
            ExtractionMethod::SystemSelector => self.system_selectors(system_selectors, labels),
            ExtractionMethod::LabelPairs => self.label_pairs(labels),
            ExtractionMethod::FormControls => self.form_controls(labels),
            ExtractionMethod::TableCells => self.table_cells(labels),
            ExtractionMethod::Proximity => self.proximity(labels),
            ExtractionMethod::Attributes => self.attributes(labels),
        }
    }

    /// Try the system shortcuts (when given), then the generic stack, and
    /// report the first non-empty value. Strategy errors count as no-match.
    pub fn run_stack(
        &self,
        labels: &LabelSet,
        system_selectors: &[String],
        source: &str,
    ) -> ExtractionResult {
        let shortcut = (!system_selectors.is_empty()).then_some(ExtractionMethod::SystemSelector);
        for method in shortcut.into_iter().chain(ExtractionMethod::STACK) {
            match self.attempt(method, labels, system_selectors) {
                Ok(Some(value)) => {
                    let value = value.trim();
                    if value.is_empty() {
                        continue;
                    }
                    debug!(
                        "{} found {} via {}",
                        source,
                        labels.field(),
                        method.as_str()
                    );
                    return ExtractionResult::found(
                        value.to_string(),
                        method.tag(source),
                        method.base_confidence(),
                    );
                }
                Ok(None) => {}
                Err(e) => {
                    debug!(
                        "{} {} failed for {}: {}",
                        source,
                        method.as_str(),
                        labels.field(),
                        e
                    );
                }
            }
        }
        ExtractionResult::not_found(format!("{}:not-found", source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fields::FieldKey;

    fn first_name_labels() -> LabelSet {
        LabelSet::new(
            FieldKey::FirstName,
            &["First Name", "Given Name"],
            ["Last Name", "Date of Birth"],
        )
    }

    #[test]
    fn test_stack_order_prefers_label_pairs() {
        let doc = PageDocument::parse(
            r#"<div class="detail-label">First Name:</div><div class="detail-value">Lisa</div>
               <input name="firstName" value="Elisabeth">
               <table><tr><td>First Name</td><td>Liz</td></tr></table>"#,
        );
        let result = FieldExtractor::new(&doc).run_stack(&first_name_labels(), &[], "generic");
        assert_eq!(result.value.as_deref(), Some("Lisa"));
        assert_eq!(result.strategy, "generic:label-pairs");
        assert_eq!(result.confidence, confidence::LABEL_PAIR);
    }

    #[test]
    fn test_falls_through_to_later_strategies() {
        let doc = PageDocument::parse(r#"<table><tr><td>Given Name</td><td>Liz</td></tr></table>"#);
        let result = FieldExtractor::new(&doc).run_stack(&first_name_labels(), &[], "generic");
        assert_eq!(result.value.as_deref(), Some("Liz"));
        assert_eq!(result.strategy, "generic:table-cells");
    }

    #[test]
    fn test_invalid_system_selector_degrades_to_no_match() {
        let doc = PageDocument::parse(r#"<input id="first_name" value="Lisa">"#);
        let selectors = vec!["[[[".to_string()];
        let result = FieldExtractor::new(&doc).run_stack(&first_name_labels(), &selectors, "epic");
        assert_eq!(result.value.as_deref(), Some("Lisa"));
        assert_eq!(result.strategy, "epic:form-controls");
    }

    #[test]
    fn test_not_found() {
        let doc = PageDocument::parse("<p>Nothing here</p>");
        let result = FieldExtractor::new(&doc).run_stack(&first_name_labels(), &[], "generic");
        assert!(!result.is_found());
        assert_eq!(result.strategy, "generic:not-found");
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_repeated_lookups_are_deterministic() {
        let doc = PageDocument::parse(
            r#"<p>First Name: Lisa</p><div aria-label="First Name" data-value="Elisa"></div>"#,
        );
        let extractor = FieldExtractor::new(&doc);
        let a = extractor.run_stack(&first_name_labels(), &[], "generic");
        let b = extractor.run_stack(&first_name_labels(), &[], "generic");
        assert_eq!(a, b);
    }
}
