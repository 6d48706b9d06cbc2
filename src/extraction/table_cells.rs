use scraper::ElementRef;

use super::matcher::{Candidate, LabelSet};
use super::FieldExtractor;
use crate::core::error::ExtractionError;
use crate::scraping::document::element_text;

impl FieldExtractor<'_> {
    /// Table rows: `<td>Label</td><td>value</td>` or a single
    /// `<td>Label: value</td>` cell.
    pub(super) fn table_cells(&self, labels: &LabelSet) -> Result<Option<String>, ExtractionError> {
        let mut candidates: Vec<Candidate> = Vec::new();

        for row in self.doc.select("tr")? {
            let cells: Vec<String> = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|c| matches!(c.value().name(), "td" | "th"))
                .map(|c| element_text(&c))
                .collect();

            for (i, text) in cells.iter().enumerate() {
                if let Some((label, value)) = split_inline(text) {
                    candidates.push(Candidate::new(label, value));
                } else if let Some(next) = cells.get(i + 1) {
                    if !next.is_empty() && next != text {
                        candidates.push(Candidate::new(text, next));
                    }
                }
            }
        }

        Ok(labels.pick(&candidates))
    }
}

/// `"Date of Birth: 03/15/1970"` → `("Date of Birth", "03/15/1970")`.
fn split_inline(text: &str) -> Option<(&str, &str)> {
    let (label, value) = text.split_once(':')?;
    let value = value.trim();
    if label.trim().is_empty() || value.is_empty() {
        None
    } else {
        Some((label, value))
    }
}
