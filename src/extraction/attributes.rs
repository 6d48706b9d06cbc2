use scraper::ElementRef;

use super::matcher::{Candidate, LabelSet};
use super::FieldExtractor;
use crate::core::error::ExtractionError;
use crate::scraping::document::{control_value, element_text};

/// Attributes that name the element they sit on.
const NAMING_ATTRS: [&str; 4] = ["aria-label", "title", "data-label", "data-field"];

/// Attributes that carry a value for the element's visible label.
const VALUE_ATTRS: [&str; 3] = ["data-value", "title", "aria-label"];

impl FieldExtractor<'_> {
    /// `aria-label`, `title` and `data-*` probing, plus `aria-labelledby`
    /// references to a matching label element.
    pub(super) fn attributes(&self, labels: &LabelSet) -> Result<Option<String>, ExtractionError> {
        let mut candidates: Vec<Candidate> = Vec::new();

        // <input aria-label="First Name" value="Lisa">, <span data-field="DOB">03/15/1970</span>
        for el in self.doc.select("[aria-label], [title], [data-label], [data-field]")? {
            let Some(value) = carried_value(&el) else {
                continue;
            };
            for attr in NAMING_ATTRS {
                if let Some(name) = el.value().attr(attr) {
                    candidates.push(Candidate::new(name, &value));
                }
            }
        }

        // <span data-value="F">Gender</span>
        for el in self.doc.select("[data-value], [title], [aria-label]")? {
            let own_text = element_text(&el);
            if own_text.is_empty() {
                continue;
            }
            for attr in VALUE_ATTRS {
                if let Some(value) = el.value().attr(attr) {
                    if value.trim() != own_text {
                        candidates.push(Candidate::new(&own_text, value));
                    }
                }
            }
        }

        // <span id="l1">MRN</span> ... <input aria-labelledby="l1" value="AB1">
        for el in self.doc.select("[aria-labelledby]")? {
            let Some(value) = carried_value(&el) else {
                continue;
            };
            let ids = el.value().attr("aria-labelledby").unwrap_or_default();
            let label_text = ids
                .split_whitespace()
                .filter_map(|id| self.element_by_id(id))
                .map(|label| element_text(&label))
                .collect::<Vec<_>>()
                .join(" ");
            if !label_text.is_empty() {
                candidates.push(Candidate::new(&label_text, &value));
            }
        }

        Ok(labels.pick(&candidates))
    }

    fn element_by_id(&self, id: &str) -> Option<ElementRef<'_>> {
        self.doc
            .html()
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().id() == Some(id))
    }
}

/// Control value, then `data-value`, then visible text.
fn carried_value(el: &ElementRef) -> Option<String> {
    control_value(el)
        .or_else(|| {
            el.value()
                .attr("data-value")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
        .or_else(|| Some(element_text(el)).filter(|t| !t.is_empty()))
}
