use scraper::ElementRef;

use super::matcher::LabelSet;
use super::FieldExtractor;
use crate::core::error::ExtractionError;
use crate::scraping::document::{control_value, element_text};

/// Longer hits are containers, not field values.
const MAX_SHORTCUT_LEN: usize = 120;

impl FieldExtractor<'_> {
    /// System-specific CSS shortcuts, tried in order; the first element with
    /// a usable value wins.
    pub(super) fn system_selectors(
        &self,
        selectors: &[String],
        labels: &LabelSet,
    ) -> Result<Option<String>, ExtractionError> {
        for selector in selectors {
            for el in self.doc.select(selector)? {
                if let Some(value) = shortcut_value(&el) {
                    if value.chars().count() <= MAX_SHORTCUT_LEN && !labels.is_label_like(&value) {
                        return Ok(Some(value));
                    }
                }
            }
        }
        Ok(None)
    }
}

fn shortcut_value(el: &ElementRef) -> Option<String> {
    control_value(el)
        .or_else(|| Some(element_text(el)).filter(|t| !t.is_empty()))
        .or_else(|| {
            el.value()
                .attr("data-value")
                .or_else(|| el.value().attr("value"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
}

#[cfg(test)]
mod tests {
    use crate::core::error::ExtractionError;
    use crate::core::fields::FieldKey;
    use crate::extraction::{FieldExtractor, LabelSet};
    use crate::scraping::PageDocument;

    fn labels() -> LabelSet {
        LabelSet::new(FieldKey::FirstName, &["First Name"], ["Last Name"])
    }

    #[test]
    fn test_first_usable_selector_wins() {
        let doc = PageDocument::parse(
            r#"<span class="athena-first-name"></span>
               <span data-athena-field="firstName">Lisa</span>"#,
        );
        let selectors = vec![
            ".athena-first-name".to_string(),
            r#"[data-athena-field="firstName"]"#.to_string(),
        ];
        assert_eq!(
            FieldExtractor::new(&doc)
                .system_selectors(&selectors, &labels())
                .unwrap()
                .as_deref(),
            Some("Lisa")
        );
    }

    #[test]
    fn test_label_elements_are_skipped() {
        let doc = PageDocument::parse(r#"<span class="ecw-fname">First Name:</span>"#);
        let selectors = vec![".ecw-fname".to_string()];
        assert_eq!(
            FieldExtractor::new(&doc).system_selectors(&selectors, &labels()).unwrap(),
            None
        );
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let doc = PageDocument::parse("<p></p>");
        let selectors = vec!["..bad".to_string()];
        assert!(matches!(
            FieldExtractor::new(&doc).system_selectors(&selectors, &labels()),
            Err(ExtractionError::InvalidSelector { .. })
        ));
    }
}
