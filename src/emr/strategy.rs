use tracing::{debug, info};

use super::detect::{self, PageSignals};
use super::profiles::SystemProfile;
use super::EmrSystem;
use crate::core::error::CaptureError;
use crate::core::fields::FieldKey;
use crate::core::record::RecordBuilder;
use crate::core::types::{DetectionResult, ExtractionResult, ParsingResult};
use crate::extraction::FieldExtractor;

/// One source system's profile applied to one page.
pub struct SystemStrategy<'a, 'd> {
    system: EmrSystem,
    extractor: &'a FieldExtractor<'d>,
}

impl<'a, 'd> SystemStrategy<'a, 'd> {
    pub fn new(system: EmrSystem, extractor: &'a FieldExtractor<'d>) -> Self {
        Self { system, extractor }
    }

    pub fn system(&self) -> EmrSystem {
        self.system
    }

    fn profile(&self) -> &'static SystemProfile {
        self.system.profile()
    }

    pub fn detect(&self, signals: &PageSignals) -> DetectionResult {
        detect::detect(self.profile(), signals)
    }

    /// Vendor shortcut selectors first, then the generic stack with this
    /// system's synonyms.
    pub fn extract_field(&self, field: FieldKey) -> ExtractionResult {
        let profile = self.profile();
        let labels = profile.mapping.label_set(field);
        let selectors = profile.system_selectors(field);
        self.extractor.run_stack(&labels, &selectors, profile.slug)
    }

    /// Extract every mapped field, in mapping order, into one record.
    ///
    /// Confidence is the share of mapped fields that produced a value.
    pub fn parse_patient_data(&self) -> ParsingResult {
        let profile = self.profile();
        let mut builder = RecordBuilder::new();

        for field in profile.mapping.fields() {
            let result = self.extract_field(field);
            if let Some(value) = result.value.as_deref() {
                if !builder.set(field, value) {
                    debug!("{}: {} normalized to empty", profile.name, field);
                }
            }
        }

        let mapped = profile.mapping.len();
        let extracted = builder.extracted();
        let confidence = if mapped == 0 {
            0.0
        } else {
            extracted as f64 / mapped as f64
        };
        let missing = builder.missing_required();
        let record = builder.build();

        info!(
            "{} extracted {}/{} fields (confidence {:.2})",
            profile.name, extracted, mapped, confidence
        );

        if missing.is_empty() {
            return ParsingResult {
                success: true,
                data: Some(record),
                partial_data: None,
                errors: Vec::new(),
                strategy: profile.name.to_string(),
                confidence,
            };
        }

        ParsingResult {
            success: false,
            data: None,
            partial_data: (!record.is_empty()).then_some(record),
            errors: missing
                .into_iter()
                .map(|field| CaptureError::FieldMissing(field).to_string())
                .collect(),
            strategy: profile.name.to_string(),
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraping::PageDocument;

    const ATHENA_CHART: &str = r#"
        <div class="athena-container" data-athena="true">
          <div class="athena-patient-info">
            <span class="athena-label">First Name:</span><span class="athena-value">Lisa</span>
            <span class="athena-label">Last Name:</span><span class="athena-value">Anderson</span>
            <span class="athena-dob">3/15/1970</span>
          </div>
        </div>"#;

    #[test]
    fn test_shortcut_selector_reports_system_tag() {
        let doc = PageDocument::parse(ATHENA_CHART);
        let extractor = FieldExtractor::new(&doc);
        let strategy = SystemStrategy::new(EmrSystem::Athenahealth, &extractor);

        let dob = strategy.extract_field(FieldKey::DateOfBirth);
        assert_eq!(dob.value.as_deref(), Some("3/15/1970"));
        assert_eq!(dob.strategy, "athena:system-selector");
        assert_eq!(dob.confidence, 0.9);

        let first = strategy.extract_field(FieldKey::FirstName);
        assert_eq!(first.value.as_deref(), Some("Lisa"));
        assert_eq!(first.strategy, "athena:label-pairs");
    }

    #[test]
    fn test_parse_confidence_is_share_of_mapped_fields() {
        let doc = PageDocument::parse(ATHENA_CHART);
        let extractor = FieldExtractor::new(&doc);
        let result = SystemStrategy::new(EmrSystem::Athenahealth, &extractor).parse_patient_data();

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data.first_name, "Lisa");
        assert_eq!(data.date_of_birth, "03/15/1970");
        let mapped = EmrSystem::Athenahealth.profile().mapping.len() as f64;
        assert_eq!(result.confidence, 3.0 / mapped);
        assert_eq!(result.strategy, "Athenahealth");
    }

    #[test]
    fn test_missing_names_keep_partial_data() {
        let doc = PageDocument::parse(
            r#"<span class="athena-label">Phone:</span><span class="athena-value">5557890123</span>"#,
        );
        let extractor = FieldExtractor::new(&doc);
        let result = SystemStrategy::new(EmrSystem::Athenahealth, &extractor).parse_patient_data();

        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(
            result.errors,
            vec!["Missing required field: firstName", "Missing required field: lastName"]
        );
        assert_eq!(result.partial_data.unwrap().phone_number, "(555) 789-0123");
    }
}
