use std::collections::HashMap;

use super::fields::FieldKey;
use super::types::{
    InsuranceRecord, PatientRecord, PrimaryInsurance, Relationship, SecondaryInsurance,
};
use crate::normalize::{normalize_field, parse_gender, parse_relationship, split_address};

/// Collects normalized field values during one capture and assembles the
/// final [`PatientRecord`].
#[derive(Debug, Default)]
pub struct RecordBuilder {
    values: HashMap<FieldKey, String>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize and keep `raw`. Returns false (and keeps nothing) when the
    /// normalized value is empty.
    pub fn set(&mut self, field: FieldKey, raw: &str) -> bool {
        let value = normalize_field(field, raw);
        if value.is_empty() {
            return false;
        }
        self.values.insert(field, value);
        true
    }

    pub fn get(&self, field: FieldKey) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn has(&self, field: FieldKey) -> bool {
        self.values.contains_key(&field)
    }

    /// Fields that were set, before address decomposition.
    pub fn extracted(&self) -> usize {
        self.values.len()
    }

    /// Required fields still missing, in declaration order.
    pub fn missing_required(&self) -> Vec<FieldKey> {
        [FieldKey::FirstName, FieldKey::LastName]
            .into_iter()
            .filter(|f| !self.has(*f))
            .collect()
    }

    fn take(&mut self, field: FieldKey) -> String {
        self.values.remove(&field).unwrap_or_default()
    }

    fn take_opt(&mut self, field: FieldKey) -> Option<String> {
        self.values.remove(&field)
    }

    /// Split a combined `line1, city, ST zip` string. Decomposed parts only
    /// fill components the page did not expose on their own.
    fn decompose_address(&mut self) {
        let Some(line1) = self.get(FieldKey::AddressLine1) else {
            return;
        };
        let parts = split_address(line1);
        if parts.components_found() == 0 {
            return;
        }
        for (field, part) in [
            (FieldKey::City, parts.city),
            (FieldKey::State, parts.state),
            (FieldKey::ZipCode, parts.zip),
        ] {
            if !part.is_empty() && !self.has(field) {
                self.values.insert(field, part);
            }
        }
        self.values.insert(FieldKey::AddressLine1, parts.line1);
    }

    fn build_insurance(&mut self) -> Option<InsuranceRecord> {
        let company = self.take_opt(FieldKey::PrimaryInsuranceCompany);
        let policy_number = self.take_opt(FieldKey::PrimaryPolicyNumber);
        let plan_name = self.take_opt(FieldKey::PrimaryPlanName);
        let group_number = self.take_opt(FieldKey::PrimaryGroupNumber);
        let holder = self.take_opt(FieldKey::PrimaryPolicyHolderName);
        let relationship = self.take_opt(FieldKey::PrimaryRelationshipToPatient);
        let holder_dob = self.take_opt(FieldKey::PrimaryPolicyHolderDob);

        let primary = (company.is_some() || policy_number.is_some()).then(|| PrimaryInsurance {
            company: company.unwrap_or_default(),
            plan_name,
            policy_number: policy_number.unwrap_or_default(),
            group_number,
            policy_holder_name: holder.unwrap_or_default(),
            relationship_to_patient: relationship
                .as_deref()
                .map(parse_relationship)
                .unwrap_or(Relationship::SelfInsured),
            policy_holder_dob: holder_dob,
        });

        let secondary = SecondaryInsurance {
            company: self.take_opt(FieldKey::SecondaryInsuranceCompany),
            policy_number: self.take_opt(FieldKey::SecondaryPolicyNumber),
            group_number: self.take_opt(FieldKey::SecondaryGroupNumber),
        };
        let secondary = (secondary.company.is_some()
            || secondary.policy_number.is_some()
            || secondary.group_number.is_some())
        .then_some(secondary);

        if primary.is_none() && secondary.is_none() {
            return None;
        }
        Some(InsuranceRecord {
            has_insurance: true,
            primary,
            secondary,
        })
    }

    pub fn build(mut self) -> PatientRecord {
        self.decompose_address();
        let insurance = self.build_insurance();
        let gender = self.take_opt(FieldKey::Gender).as_deref().and_then(parse_gender);
        PatientRecord {
            first_name: self.take(FieldKey::FirstName),
            last_name: self.take(FieldKey::LastName),
            middle_name: self.take(FieldKey::MiddleName),
            date_of_birth: self.take(FieldKey::DateOfBirth),
            gender,
            phone_number: self.take(FieldKey::PhoneNumber),
            email: self.take(FieldKey::Email),
            address_line1: self.take(FieldKey::AddressLine1),
            address_line2: self.take(FieldKey::AddressLine2),
            city: self.take(FieldKey::City),
            state: self.take(FieldKey::State),
            zip_code: self.take(FieldKey::ZipCode),
            mrn: self.take(FieldKey::Mrn),
            ssn: self.take(FieldKey::Ssn),
            insurance,
        }
    }
}
