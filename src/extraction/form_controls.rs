use std::collections::HashMap;

use scraper::ElementRef;

use super::matcher::{normalize_label, LabelSet, Pass};
use super::FieldExtractor;
use crate::core::error::ExtractionError;
use crate::scraping::document::{control_value, element_text, parent_element};

struct Control<'a> {
    element: ElementRef<'a>,
    attrs: Vec<String>,
    label: Option<String>,
}

impl FieldExtractor<'_> {
    /// Inputs, selects and textareas whose `name`, `id`, `placeholder` or
    /// associated `<label>` names the field.
    pub(super) fn form_controls(&self, labels: &LabelSet) -> Result<Option<String>, ExtractionError> {
        let mut label_for: HashMap<String, String> = HashMap::new();
        for label in self.doc.select("label[for]")? {
            if let Some(target) = label.value().attr("for") {
                label_for
                    .entry(target.to_string())
                    .or_insert_with(|| normalize_label(&element_text(&label)));
            }
        }

        let controls: Vec<Control> = self
            .doc
            .select("input, select, textarea")?
            .into_iter()
            .map(|element| {
                let attrs = ["name", "id", "placeholder"]
                    .iter()
                    .filter_map(|a| element.value().attr(a))
                    .map(str::to_string)
                    .collect();
                let label = element
                    .value()
                    .id()
                    .and_then(|id| label_for.get(id).cloned())
                    .or_else(|| wrapping_label(&element));
                Control {
                    element,
                    attrs,
                    label,
                }
            })
            .collect();

        Ok(labels.pick_by(
            &controls,
            |pass: Pass, syn, control: &Control| {
                control.attrs.iter().any(|a| labels.attr_matches(pass, syn, a))
                    || control
                        .label
                        .as_deref()
                        .is_some_and(|l| labels.text_matches(pass, syn, l))
            },
            |control| control_value(&control.element),
        ))
    }
}

/// `<label>First Name <input></label>`
fn wrapping_label(element: &ElementRef) -> Option<String> {
    let parent = parent_element(element)?;
    if parent.value().name() != "label" {
        return None;
    }
    let text = normalize_label(&element_text(&parent));
    (!text.is_empty()).then_some(text)
}
