use serde::{Deserialize, Serialize};

/// Every field the capture pipeline knows how to locate.
///
/// Patient fields map one-to-one onto [`PatientRecord`](super::types::PatientRecord);
/// the `Primary*` / `Secondary*` keys feed the nested insurance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    FirstName,
    LastName,
    MiddleName,
    DateOfBirth,
    Gender,
    PhoneNumber,
    Email,
    AddressLine1,
    AddressLine2,
    City,
    State,
    ZipCode,
    Mrn,
    Ssn,
    PrimaryInsuranceCompany,
    PrimaryPlanName,
    PrimaryPolicyNumber,
    PrimaryGroupNumber,
    PrimaryPolicyHolderName,
    PrimaryRelationshipToPatient,
    PrimaryPolicyHolderDob,
    SecondaryInsuranceCompany,
    SecondaryPolicyNumber,
    SecondaryGroupNumber,
}

/// Which normalizer a field's raw text passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Name,
    Text,
    Date,
    Phone,
    Email,
    Ssn,
    Zip,
    State,
    Gender,
    Mrn,
    Relationship,
}

impl FieldKey {
    pub const PATIENT: [FieldKey; 14] = [
        FieldKey::FirstName,
        FieldKey::LastName,
        FieldKey::MiddleName,
        FieldKey::DateOfBirth,
        FieldKey::Gender,
        FieldKey::PhoneNumber,
        FieldKey::Email,
        FieldKey::AddressLine1,
        FieldKey::AddressLine2,
        FieldKey::City,
        FieldKey::State,
        FieldKey::ZipCode,
        FieldKey::Mrn,
        FieldKey::Ssn,
    ];

    pub const INSURANCE: [FieldKey; 10] = [
        FieldKey::PrimaryInsuranceCompany,
        FieldKey::PrimaryPlanName,
        FieldKey::PrimaryPolicyNumber,
        FieldKey::PrimaryGroupNumber,
        FieldKey::PrimaryPolicyHolderName,
        FieldKey::PrimaryRelationshipToPatient,
        FieldKey::PrimaryPolicyHolderDob,
        FieldKey::SecondaryInsuranceCompany,
        FieldKey::SecondaryPolicyNumber,
        FieldKey::SecondaryGroupNumber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::FirstName => "firstName",
            FieldKey::LastName => "lastName",
            FieldKey::MiddleName => "middleName",
            FieldKey::DateOfBirth => "dateOfBirth",
            FieldKey::Gender => "gender",
            FieldKey::PhoneNumber => "phoneNumber",
            FieldKey::Email => "email",
            FieldKey::AddressLine1 => "addressLine1",
            FieldKey::AddressLine2 => "addressLine2",
            FieldKey::City => "city",
            FieldKey::State => "state",
            FieldKey::ZipCode => "zipCode",
            FieldKey::Mrn => "mrn",
            FieldKey::Ssn => "ssn",
            FieldKey::PrimaryInsuranceCompany => "primaryInsuranceCompany",
            FieldKey::PrimaryPlanName => "primaryPlanName",
            FieldKey::PrimaryPolicyNumber => "primaryPolicyNumber",
            FieldKey::PrimaryGroupNumber => "primaryGroupNumber",
            FieldKey::PrimaryPolicyHolderName => "primaryPolicyHolderName",
            FieldKey::PrimaryRelationshipToPatient => "primaryRelationshipToPatient",
            FieldKey::PrimaryPolicyHolderDob => "primaryPolicyHolderDob",
            FieldKey::SecondaryInsuranceCompany => "secondaryInsuranceCompany",
            FieldKey::SecondaryPolicyNumber => "secondaryPolicyNumber",
            FieldKey::SecondaryGroupNumber => "secondaryGroupNumber",
        }
    }

    /// Case-insensitive lookup by camelCase name (`"dateOfBirth"`), snake_case
    /// (`"date_of_birth"`) or the short alias (`"dob"`).
    pub fn parse_str(value: &str) -> Option<Self> {
        let wanted: String = value
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        if wanted.is_empty() {
            return None;
        }
        FieldKey::PATIENT
            .iter()
            .chain(FieldKey::INSURANCE.iter())
            .copied()
            .find(|key| {
                key.as_str().to_ascii_lowercase() == wanted
                    || key.short_alias().replace('-', "") == wanted
            })
    }

    /// `addressLine1` → `address-line1`
    pub fn kebab(&self) -> String {
        split_camel(self.as_str()).join("-")
    }

    /// `addressLine1` → `address_line1`
    pub fn snake(&self) -> String {
        split_camel(self.as_str()).join("_")
    }

    /// Short form EMR vendors tend to use in class names (`onco-dob`, `ecw-zip`).
    pub fn short_alias(&self) -> &'static str {
        match self {
            FieldKey::FirstName => "fname",
            FieldKey::LastName => "lname",
            FieldKey::MiddleName => "mname",
            FieldKey::DateOfBirth => "dob",
            FieldKey::Gender => "sex",
            FieldKey::PhoneNumber => "phone",
            FieldKey::Email => "email",
            FieldKey::AddressLine1 => "address",
            FieldKey::AddressLine2 => "address2",
            FieldKey::City => "city",
            FieldKey::State => "state",
            FieldKey::ZipCode => "zip",
            FieldKey::Mrn => "mrn",
            FieldKey::Ssn => "ssn",
            FieldKey::PrimaryInsuranceCompany => "insurance",
            FieldKey::PrimaryPlanName => "plan",
            FieldKey::PrimaryPolicyNumber => "policy",
            FieldKey::PrimaryGroupNumber => "group",
            FieldKey::PrimaryPolicyHolderName => "holder",
            FieldKey::PrimaryRelationshipToPatient => "relationship",
            FieldKey::PrimaryPolicyHolderDob => "holder-dob",
            FieldKey::SecondaryInsuranceCompany => "secondary-insurance",
            FieldKey::SecondaryPolicyNumber => "secondary-policy",
            FieldKey::SecondaryGroupNumber => "secondary-group",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldKey::FirstName | FieldKey::LastName | FieldKey::MiddleName => FieldKind::Name,
            FieldKey::PrimaryPolicyHolderName => FieldKind::Name,
            FieldKey::DateOfBirth | FieldKey::PrimaryPolicyHolderDob => FieldKind::Date,
            FieldKey::Gender => FieldKind::Gender,
            FieldKey::PhoneNumber => FieldKind::Phone,
            FieldKey::Email => FieldKind::Email,
            FieldKey::State => FieldKind::State,
            FieldKey::ZipCode => FieldKind::Zip,
            FieldKey::Mrn => FieldKind::Mrn,
            FieldKey::Ssn => FieldKind::Ssn,
            FieldKey::PrimaryRelationshipToPatient => FieldKind::Relationship,
            _ => FieldKind::Text,
        }
    }

    pub fn is_insurance(&self) -> bool {
        FieldKey::INSURANCE.contains(self)
    }

    pub fn is_required(&self) -> bool {
        matches!(self, FieldKey::FirstName | FieldKey::LastName)
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a camelCase identifier into lowercase words, keeping digit runs attached.
fn split_camel(ident: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in ident.chars() {
        if ch.is_ascii_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(ch.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}
