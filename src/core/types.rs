use serde::{Deserialize, Serialize};

// ───────────────────────────────────────────────────────────────────────────
// Canonical patient record
// ───────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Relationship {
    #[default]
    #[serde(rename = "Self")]
    SelfInsured,
    Spouse,
    Child,
    Other,
}

impl Relationship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::SelfInsured => "Self",
            Relationship::Spouse => "Spouse",
            Relationship::Child => "Child",
            Relationship::Other => "Other",
        }
    }
}

/// The normalized output of one capture. Only `first_name` and `last_name`
/// are required; every other string field is empty when the page did not
/// expose it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: String,
    /// MM/DD/YYYY
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    /// (XXX) XXX-XXXX
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    #[serde(default)]
    pub city: String,
    /// Two-letter postal code
    #[serde(default)]
    pub state: String,
    /// XXXXX or XXXXX-XXXX
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub mrn: String,
    /// XXX-XX-XXXX
    #[serde(default)]
    pub ssn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance: Option<InsuranceRecord>,
}

impl PatientRecord {
    /// A capture only counts as successful when both names are present.
    pub fn has_required_names(&self) -> bool {
        !self.first_name.trim().is_empty() && !self.last_name.trim().is_empty()
    }

    /// Number of populated top-level fields (insurance counts once).
    pub fn populated_fields(&self) -> usize {
        let strings = [
            &self.first_name,
            &self.last_name,
            &self.middle_name,
            &self.date_of_birth,
            &self.phone_number,
            &self.email,
            &self.address_line1,
            &self.address_line2,
            &self.city,
            &self.state,
            &self.zip_code,
            &self.mrn,
            &self.ssn,
        ];
        strings.iter().filter(|s| !s.trim().is_empty()).count()
            + usize::from(self.gender.is_some())
            + usize::from(self.insurance.as_ref().is_some_and(|i| i.has_insurance))
    }

    pub fn is_empty(&self) -> bool {
        self.populated_fields() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceRecord {
    pub has_insurance: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<PrimaryInsurance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<SecondaryInsurance>,
}

impl InsuranceRecord {
    /// The "patient has no coverage" value: both tiers absent.
    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryInsurance {
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,
    pub policy_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_number: Option<String>,
    pub policy_holder_name: String,
    pub relationship_to_patient: Relationship,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_holder_dob: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryInsurance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_number: Option<String>,
}

// ───────────────────────────────────────────────────────────────────────────
// Per-call results
// ───────────────────────────────────────────────────────────────────────────

/// Outcome of one field lookup. Produced and consumed within a single capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub value: Option<String>,
    pub strategy: String,
    pub confidence: f64,
}

impl ExtractionResult {
    pub fn found(value: String, strategy: impl Into<String>, confidence: f64) -> Self {
        Self {
            value: Some(value),
            strategy: strategy.into(),
            confidence,
        }
    }

    pub fn not_found(strategy: impl Into<String>) -> Self {
        Self {
            value: None,
            strategy: strategy.into(),
            confidence: 0.0,
        }
    }

    pub fn is_found(&self) -> bool {
        self.value.as_deref().is_some_and(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub detected: bool,
    pub name: String,
    pub confidence: f64,
}

impl DetectionResult {
    pub fn unknown() -> Self {
        Self {
            detected: false,
            name: "Unknown".to_string(),
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsingResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PatientRecord>,
    /// Whatever was extracted when the required names were missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_data: Option<PatientRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub strategy: String,
    pub confidence: f64,
}

impl ParsingResult {
    pub fn failure(strategy: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            partial_data: None,
            errors,
            strategy: strategy.into(),
            confidence: 0.0,
        }
    }

    /// The record carried by this result, complete or partial.
    pub fn record(&self) -> Option<&PatientRecord> {
        self.data.as_ref().or(self.partial_data.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFillingResult {
    pub success: bool,
    pub fields_filled: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl FormFillingResult {
    /// Combine two fill passes (patient + insurance) into one report.
    pub fn merge(mut self, other: FormFillingResult) -> Self {
        self.success = self.success && other.success;
        self.fields_filled += other.fields_filled;
        self.errors.extend(other.errors);
        self
    }
}

// ───────────────────────────────────────────────────────────────────────────
// Storage envelope
// ───────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureData {
    pub patient: PatientRecord,
    pub insurance: InsuranceRecord,
    pub metadata: CaptureMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureMetadata {
    #[serde(rename = "sourceEMR")]
    pub source_emr: String,
    /// RFC 3339 timestamp
    pub captured_at: String,
    #[serde(default)]
    pub page_url: String,
}
