use regex::{Regex, RegexBuilder};
use tracing::debug;

use super::matcher::{normalize_label, LabelSet};
use super::FieldExtractor;
use crate::core::error::ExtractionError;

const MAX_VALUE_LEN: usize = 50;

/// Layouts tried for every synonym, in order. `{label}` is the escaped
/// synonym; `label` and `value` are the named groups.
const LAYOUTS: [&str; 5] = [
    // Label | value
    r"(?m)(?:^|[^\w])\s*(?P<label>{label})[ \t]*[:*]*[ \t]*\|[ \t]*(?P<value>[^|\t\n]+)",
    // Label: value
    r"(?m)(?:^|[^\w])(?P<label>{label})[ \t]*\*?[ \t]*:[ \t]*(?P<value>[^\t\n]+)",
    // Label<TAB>value
    r"(?m)(?:^|[^\w])(?P<label>{label})[ \t]*[:*]*\t+(?P<value>[^\t\n]+)",
    // Label (value)
    r"(?m)(?:^|[^\w])(?P<label>{label})[ \t]*\((?P<value>[^)\n]+)\)",
    // Label\nvalue
    r"(?m)^[ \t]*(?P<label>{label})[ \t]*[:*]*[ \t]*\n[ \t]*(?P<value>[^\t\n]+)",
];

/// Characters that end the label text to the left of a synonym.
const LABEL_BREAKS: [char; 9] = ['\n', '\t', '|', ':', '.', ';', ',', '(', ')'];

impl FieldExtractor<'_> {
    /// Synonym-anchored patterns over the rendered body text.
    pub(super) fn proximity(&self, labels: &LabelSet) -> Result<Option<String>, ExtractionError> {
        let text = self.body_text();
        if text.is_empty() {
            return Ok(None);
        }

        for syn in labels.synonyms() {
            for layout in LAYOUTS {
                let pattern = compile(layout, &syn.text)?;
                for caps in pattern.captures_iter(text) {
                    let (Some(label), Some(raw)) = (caps.name("label"), caps.name("value")) else {
                        continue;
                    };
                    let full_label =
                        normalize_label(label_context(text, label.start(), label.end()));
                    if labels.belongs_elsewhere(syn, &full_label) {
                        debug!("proximity: `{}` belongs to another field", full_label);
                        continue;
                    }
                    if let Some(value) = clean_capture(raw.as_str(), labels) {
                        return Ok(Some(value));
                    }
                }
            }
        }
        Ok(None)
    }
}

fn compile(layout: &str, label: &str) -> Result<Regex, ExtractionError> {
    let escaped = regex::escape(label).replace(' ', r"\s+");
    RegexBuilder::new(&layout.replace("{label}", &escaped))
        .case_insensitive(true)
        .build()
        .map_err(|source| ExtractionError::InvalidPattern {
            label: label.to_string(),
            source,
        })
}

/// The whole label a synonym hit sits in: back from the synonym's end to the
/// previous separator or line start, so "Email Address" is seen whole when
/// only "Address" matched.
fn label_context(text: &str, start: usize, end: usize) -> &str {
    let from = text[..start].rfind(&LABEL_BREAKS[..]).map_or(0, |i| i + 1);
    &text[from..end]
}

/// Trim, cut a trailing `Other Label:` run, then apply the sanity filter:
/// 1 to 50 characters and not itself a label.
fn clean_capture(raw: &str, labels: &LabelSet) -> Option<String> {
    let mut value = raw.trim().to_string();

    if let Some(colon) = value.find(':') {
        let head = value[..colon].trim_end();
        let head_norm = normalize_label(head);
        let cut = labels
            .known_labels()
            .filter(|known| head_norm.ends_with(&format!(" {}", known)))
            .map(|known| known.chars().count())
            .max();
        if let Some(label_len) = cut {
            let keep = head.chars().count().saturating_sub(label_len);
            value = head.chars().take(keep).collect::<String>().trim().to_string();
        }
    }

    let len = value.chars().count();
    if len == 0 || len > MAX_VALUE_LEN || labels.is_label_like(&value) {
        return None;
    }
    Some(value)
}
