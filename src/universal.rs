//! Source-agnostic capture with one fixed label dictionary.

use tracing::info;

use crate::core::error::CaptureError;
use crate::core::fields::FieldKey;
use crate::core::record::RecordBuilder;
use crate::core::types::{ExtractionResult, ParsingResult, PatientRecord};
use crate::emr::EmrSystem;
use crate::extraction::FieldExtractor;

/// Fields the confidence denominator is scaled to.
const EXPECTED_FIELDS: f64 = 15.0;
/// Insurance weighs as much as two plain fields.
const INSURANCE_WEIGHT: usize = 2;

pub struct SimpleUniversalParser<'a, 'd> {
    extractor: &'a FieldExtractor<'d>,
    success_threshold: f64,
}

impl<'a, 'd> SimpleUniversalParser<'a, 'd> {
    pub fn new(extractor: &'a FieldExtractor<'d>, success_threshold: f64) -> Self {
        Self {
            extractor,
            success_threshold,
        }
    }

    pub fn extract_field(&self, field: FieldKey) -> ExtractionResult {
        let profile = EmrSystem::Generic.profile();
        let labels = profile.mapping.label_set(field);
        self.extractor.run_stack(&labels, &[], profile.slug)
    }

    pub fn parse_patient_data(&self) -> ParsingResult {
        let profile = EmrSystem::Generic.profile();
        let mut builder = RecordBuilder::new();
        for field in profile.mapping.fields() {
            if let Some(value) = self.extract_field(field).value {
                builder.set(field, &value);
            }
        }

        let missing = builder.missing_required();
        let record = builder.build();
        let confidence = record_confidence(&record);
        let success = missing.is_empty() && confidence > self.success_threshold;

        info!(
            "Universal parser found {} fields (confidence {:.2}, success {})",
            record.populated_fields(),
            confidence,
            success
        );

        if success {
            return ParsingResult {
                success,
                data: Some(record),
                partial_data: None,
                errors: Vec::new(),
                strategy: profile.name.to_string(),
                confidence,
            };
        }

        let mut errors: Vec<String> = missing
            .into_iter()
            .map(|field| CaptureError::FieldMissing(field).to_string())
            .collect();
        if errors.is_empty() {
            errors.push(format!(
                "Confidence {:.2} is below the universal threshold {:.2}",
                confidence, self.success_threshold
            ));
        }
        ParsingResult {
            success,
            data: None,
            partial_data: (!record.is_empty()).then_some(record),
            errors,
            strategy: profile.name.to_string(),
            confidence,
        }
    }
}

/// `found / 15`, capped at 1.0. Each recovered address component counts on
/// its own and insurance counts twice.
pub fn record_confidence(record: &PatientRecord) -> f64 {
    let plain = [
        &record.first_name,
        &record.last_name,
        &record.middle_name,
        &record.date_of_birth,
        &record.phone_number,
        &record.email,
        &record.address_line2,
        &record.mrn,
        &record.ssn,
    ];
    let address = [
        &record.address_line1,
        &record.city,
        &record.state,
        &record.zip_code,
    ];
    let found = plain.iter().filter(|v| !v.is_empty()).count()
        + usize::from(record.gender.is_some())
        + address.iter().filter(|v| !v.is_empty()).count()
        + record
            .insurance
            .as_ref()
            .filter(|i| i.has_insurance)
            .map_or(0, |_| INSURANCE_WEIGHT);
    (found as f64 / EXPECTED_FIELDS).min(1.0)
}
