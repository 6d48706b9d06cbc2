use scraper::ElementRef;

use super::matcher::{Candidate, LabelSet};
use super::FieldExtractor;
use crate::core::error::ExtractionError;
use crate::scraping::document::{control_value, element_text};

/// Class prefixes EMR UIs use for `<prefix>-label` / `<prefix>-value` pairs,
/// in the order they are scanned.
pub const LABEL_FAMILIES: [&str; 9] = [
    "ecw", "detail", "info", "athena", "onco", "epic", "modmed", "patient", "field",
];

/// Following element siblings inspected for a label's value.
const SIBLING_WINDOW: usize = 2;
/// Wrapper levels climbed when nothing beside the label holds a value.
const WRAPPER_DEPTH: usize = 2;

impl FieldExtractor<'_> {
    /// Label/value pairs: `.detail-label` next to `.detail-value` and
    /// friends, then any `[class*=label]` next to any `[class*=value]`.
    pub(super) fn label_pairs(&self, labels: &LabelSet) -> Result<Option<String>, ExtractionError> {
        let mut candidates: Vec<Candidate> = Vec::new();

        for family in LABEL_FAMILIES {
            let label_class = format!("{}-label", family);
            let value_class = format!("{}-value", family);
            let nodes = self.doc.select(&format!(".{}", label_class))?;
            collect_pairs(
                &nodes,
                &mut candidates,
                |el| has_class(el, &label_class),
                |el| has_class(el, &value_class),
            );
        }

        let generic = self.doc.select(r#"[class*="label"]"#)?;
        collect_pairs(&generic, &mut candidates, class_mentions_label, |el| {
            class_mentions(el, "value") && !class_mentions_label(el)
        });

        Ok(labels.pick(&candidates))
    }
}

fn collect_pairs(
    label_nodes: &[ElementRef],
    out: &mut Vec<Candidate>,
    is_label: impl Fn(&ElementRef) -> bool,
    is_value: impl Fn(&ElementRef) -> bool,
) {
    for node in label_nodes {
        let Some(value_node) = local_value(node, &is_label, &is_value) else {
            continue;
        };
        let value = value_text(&value_node);
        if !value.is_empty() {
            out.push(Candidate::new(&element_text(node), &value));
        }
    }
}

/// The value node that belongs to `label`: a following sibling, or a value
/// inside one, within [`SIBLING_WINDOW`]; otherwise the first value after
/// the label inside a wrapper holding no other label and no form control.
fn local_value<'a>(
    label: &ElementRef<'a>,
    is_label: &impl Fn(&ElementRef) -> bool,
    is_value: &impl Fn(&ElementRef) -> bool,
) -> Option<ElementRef<'a>> {
    let siblings = label.next_siblings().filter_map(ElementRef::wrap).take(SIBLING_WINDOW);
    for sibling in siblings {
        let blocked = sibling
            .descendants()
            .filter_map(ElementRef::wrap)
            .any(|el| is_label(&el) || is_control(&el));
        if blocked {
            return None;
        }
        if let Some(value) = sibling.descendants().filter_map(ElementRef::wrap).find(|el| is_value(el)) {
            return Some(value);
        }
    }

    for wrapper in label.ancestors().filter_map(ElementRef::wrap).take(WRAPPER_DEPTH) {
        if matches!(wrapper.value().name(), "body" | "html" | "form") {
            break;
        }
        let mut label_count = 0;
        let mut past_label = false;
        let mut found = None;
        for el in wrapper.descendants().filter_map(ElementRef::wrap) {
            if is_control(&el) {
                return None;
            }
            if is_label(&el) {
                label_count += 1;
                if label_count > 1 {
                    return None;
                }
            }
            if el.id() == label.id() {
                past_label = true;
            } else if past_label && found.is_none() && is_value(&el) {
                found = Some(el);
            }
        }
        if found.is_some() {
            return found;
        }
    }
    None
}

fn value_text(el: &ElementRef) -> String {
    let text = element_text(el);
    if text.is_empty() {
        control_value(el).unwrap_or_default()
    } else {
        text
    }
}

fn has_class(el: &ElementRef, class: &str) -> bool {
    el.value().classes().any(|c| c.eq_ignore_ascii_case(class))
}

fn class_mentions(el: &ElementRef, word: &str) -> bool {
    el.value()
        .attr("class")
        .is_some_and(|c| c.to_ascii_lowercase().contains(word))
}

fn class_mentions_label(el: &ElementRef) -> bool {
    class_mentions(el, "label")
}

fn is_control(el: &ElementRef) -> bool {
    matches!(el.value().name(), "input" | "select" | "textarea")
}
