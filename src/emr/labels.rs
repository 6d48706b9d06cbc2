//! Label synonym dictionaries, one mapping per source system.
//!
//! Lists shared by several systems are declared once; a system only gets its
//! own list where its UI text differs.

use super::mapping::FieldMapping;
use crate::core::fields::FieldKey;

// ───────────────────────────────────────────────────────────────────────────
// Shared patient labels
// ───────────────────────────────────────────────────────────────────────────

const FIRST_NAME: &[&str] = &[
    "First Name",
    "Given Name",
    "Patient First Name",
    "First",
    "Name (First)",
    "Given",
    "Patient First",
];
const LAST_NAME: &[&str] = &[
    "Last Name",
    "Family Name",
    "Patient Last Name",
    "Last",
    "Surname",
    "Name (Last)",
    "Family",
    "Patient Last",
];
const MIDDLE_NAME: &[&str] = &["Middle Name", "Middle Initial", "MI", "Middle", "Name (Middle)"];
const DATE_OF_BIRTH: &[&str] = &["Date of Birth", "DOB", "Birth Date", "Birthday", "Patient DOB"];
const GENDER: &[&str] = &["Gender", "Sex", "Patient Gender", "Patient Sex", "M/F"];
const PHONE: &[&str] = &[
    "Phone Number",
    "Phone",
    "Telephone",
    "Phone #",
    "Home Phone",
    "Cell Phone",
    "Mobile Phone",
    "Work Phone",
];
const EMAIL: &[&str] = &["Email", "Email Address", "E-mail", "Patient Email", "Contact Email"];
const ADDRESS_LINE1: &[&str] = &[
    "Address",
    "Street Address",
    "Address Line 1",
    "Home Address",
    "Primary Address",
];
const ADDRESS_LINE2: &[&str] = &["Address Line 2", "Apt", "Apartment", "Suite"];
const CITY: &[&str] = &["City", "Town", "Patient City", "Home City", "Residence City"];
const STATE: &[&str] = &["State", "Province", "Patient State", "Home State", "Residence State"];
const ZIP: &[&str] = &["Zip Code", "ZIP", "Postal Code"];
const MRN: &[&str] = &[
    "Medical Record Number",
    "MRN",
    "Patient ID",
    "Record Number",
    "Chart Number",
];
const SSN: &[&str] = &[
    "Social Security Number",
    "SSN",
    "Social Security",
    "SS Number",
    "SS#",
];

// ───────────────────────────────────────────────────────────────────────────
// Shared insurance labels
// ───────────────────────────────────────────────────────────────────────────

const INSURANCE_COMPANY: &[&str] = &[
    "Insurance Company",
    "Primary Insurance",
    "Primary Insurance Company",
    "Insurance",
    "Insurer",
    "Carrier",
];
const PLAN_NAME: &[&str] = &["Plan Name", "Plan", "Coverage", "Insurance Plan"];
const POLICY_NUMBER: &[&str] = &[
    "Policy Number",
    "Policy #",
    "Member ID",
    "Subscriber ID",
    "Policy",
    "PolicyNumber",
];
const GROUP_NUMBER: &[&str] = &["Group Number", "Group #", "Group", "Employer Group", "GroupNumber"];
const POLICY_HOLDER: &[&str] = &[
    "Policy Holder Name",
    "Policy Holder",
    "Subscriber",
    "Insured Name",
    "PolicyHolder",
];
const RELATIONSHIP: &[&str] = &[
    "Relationship to Patient",
    "Relationship",
    "Relation to Patient",
    "Self/Spouse/Child",
    "Relation",
];
const POLICY_HOLDER_DOB: &[&str] = &[
    "Policy Holder DOB",
    "Subscriber DOB",
    "PolicyHolder DOB",
    "DOB (Policy Holder)",
];
const SECONDARY_COMPANY: &[&str] = &[
    "Secondary Insurance Company",
    "Secondary Insurance",
    "Secondary Insurer",
    "Secondary Carrier",
];
const SECONDARY_POLICY: &[&str] = &[
    "Secondary Policy Number",
    "Secondary Policy",
    "Secondary Member ID",
    "Secondary Subscriber ID",
];
const SECONDARY_GROUP: &[&str] = &[
    "Secondary Group Number",
    "Secondary Group",
    "Secondary Employer Group",
];

/// Athenahealth and eClinicalWorks label their charts the same way.
pub const STANDARD: FieldMapping = FieldMapping::new(&[
    (FieldKey::FirstName, FIRST_NAME),
    (FieldKey::LastName, LAST_NAME),
    (FieldKey::MiddleName, MIDDLE_NAME),
    (FieldKey::DateOfBirth, DATE_OF_BIRTH),
    (FieldKey::Gender, GENDER),
    (FieldKey::PhoneNumber, PHONE),
    (FieldKey::Email, EMAIL),
    (FieldKey::AddressLine1, ADDRESS_LINE1),
    (FieldKey::AddressLine2, ADDRESS_LINE2),
    (FieldKey::City, CITY),
    (FieldKey::State, STATE),
    (FieldKey::ZipCode, ZIP),
    (FieldKey::Mrn, MRN),
    (FieldKey::Ssn, SSN),
    (FieldKey::PrimaryInsuranceCompany, INSURANCE_COMPANY),
    (FieldKey::PrimaryPlanName, PLAN_NAME),
    (FieldKey::PrimaryPolicyNumber, POLICY_NUMBER),
    (FieldKey::PrimaryGroupNumber, GROUP_NUMBER),
    (FieldKey::PrimaryPolicyHolderName, POLICY_HOLDER),
    (FieldKey::PrimaryRelationshipToPatient, RELATIONSHIP),
    (FieldKey::PrimaryPolicyHolderDob, POLICY_HOLDER_DOB),
    (FieldKey::SecondaryInsuranceCompany, SECONDARY_COMPANY),
    (FieldKey::SecondaryPolicyNumber, SECONDARY_POLICY),
    (FieldKey::SecondaryGroupNumber, SECONDARY_GROUP),
]);

// ───────────────────────────────────────────────────────────────────────────
// Epic (Hyperspace / MyChart wording)
// ───────────────────────────────────────────────────────────────────────────

pub const EPIC: FieldMapping = FieldMapping::new(&[
    (
        FieldKey::FirstName,
        &["Legal First Name", "First Name", "Given Name", "Patient First Name", "First"],
    ),
    (
        FieldKey::LastName,
        &["Legal Last Name", "Last Name", "Family Name", "Patient Last Name", "Last", "Surname"],
    ),
    (FieldKey::MiddleName, MIDDLE_NAME),
    (FieldKey::DateOfBirth, DATE_OF_BIRTH),
    (FieldKey::Gender, &["Legal Sex", "Sex", "Gender", "Sex Assigned at Birth", "Patient Sex"]),
    (FieldKey::PhoneNumber, PHONE),
    (FieldKey::Email, &["Email", "Email Address", "E-mail", "MyChart Email"]),
    (FieldKey::AddressLine1, ADDRESS_LINE1),
    (FieldKey::AddressLine2, ADDRESS_LINE2),
    (FieldKey::City, CITY),
    (FieldKey::State, STATE),
    (FieldKey::ZipCode, ZIP),
    (FieldKey::Mrn, &["MRN", "Epic MRN", "Medical Record Number", "Patient ID", "EPI"]),
    (FieldKey::Ssn, SSN),
    (FieldKey::PrimaryInsuranceCompany, &["Payor", "Payer", "Primary Payor", "Insurance Company", "Insurance", "Carrier"]),
    (FieldKey::PrimaryPlanName, &["Benefit Plan", "Plan Name", "Plan"]),
    (FieldKey::PrimaryPolicyNumber, &["Subscriber ID", "Member ID", "Policy Number", "Policy #"]),
    (FieldKey::PrimaryGroupNumber, &["Group Number", "Group #", "Group"]),
    (FieldKey::PrimaryPolicyHolderName, &["Subscriber Name", "Subscriber", "Policy Holder"]),
    (
        FieldKey::PrimaryRelationshipToPatient,
        &["Patient Relationship to Subscriber", "Relationship to Subscriber", "Relationship"],
    ),
    (FieldKey::PrimaryPolicyHolderDob, &["Subscriber DOB", "Subscriber Date of Birth", "Policy Holder DOB"]),
    (FieldKey::SecondaryInsuranceCompany, &["Secondary Payor", "Secondary Payer", "Secondary Insurance"]),
    (FieldKey::SecondaryPolicyNumber, &["Secondary Subscriber ID", "Secondary Member ID", "Secondary Policy Number"]),
    (FieldKey::SecondaryGroupNumber, &["Secondary Group Number", "Secondary Group"]),
]);

// ───────────────────────────────────────────────────────────────────────────
// Onco: located mostly through `onco-*` selectors, labels are the fallback
// ───────────────────────────────────────────────────────────────────────────

pub const ONCO: FieldMapping = FieldMapping::new(&[
    (FieldKey::FirstName, &["First Name", "Given Name", "Patient First Name"]),
    (FieldKey::LastName, &["Last Name", "Family Name", "Patient Last Name", "Surname"]),
    (FieldKey::MiddleName, &["Middle Name", "Middle Initial", "MI"]),
    (FieldKey::DateOfBirth, &["Date of Birth", "DOB", "Birth Date"]),
    (FieldKey::Gender, &["Gender", "Sex"]),
    (FieldKey::PhoneNumber, &["Phone Number", "Phone", "Telephone", "Home Phone", "Cell Phone"]),
    (FieldKey::Email, &["Email", "Email Address", "E-mail"]),
    (FieldKey::AddressLine1, &["Address", "Street Address", "Address Line 1"]),
    (FieldKey::AddressLine2, &["Address Line 2", "Apt", "Suite"]),
    (FieldKey::City, &["City"]),
    (FieldKey::State, &["State"]),
    (FieldKey::ZipCode, &["Zip Code", "ZIP", "Postal Code"]),
    (FieldKey::Mrn, &["MRN", "Medical Record Number", "Patient ID", "Chart Number"]),
    (FieldKey::Ssn, &["SSN", "Social Security Number", "Social Security"]),
    (FieldKey::PrimaryInsuranceCompany, INSURANCE_COMPANY),
    (FieldKey::PrimaryPolicyNumber, POLICY_NUMBER),
    (FieldKey::PrimaryGroupNumber, GROUP_NUMBER),
    (FieldKey::PrimaryPolicyHolderName, POLICY_HOLDER),
    (FieldKey::PrimaryRelationshipToPatient, RELATIONSHIP),
]);

// ───────────────────────────────────────────────────────────────────────────
// ModMed (specialty practices)
// ───────────────────────────────────────────────────────────────────────────

pub const MODMED: FieldMapping = FieldMapping::new(&[
    (FieldKey::FirstName, FIRST_NAME),
    (FieldKey::LastName, LAST_NAME),
    (FieldKey::MiddleName, MIDDLE_NAME),
    (FieldKey::DateOfBirth, DATE_OF_BIRTH),
    (FieldKey::Gender, GENDER),
    (FieldKey::PhoneNumber, PHONE),
    (FieldKey::Email, EMAIL),
    (
        FieldKey::AddressLine1,
        &["Address Line 1", "Address", "Street Address", "Home Address"],
    ),
    (
        FieldKey::AddressLine2,
        &["Address Line 2", "Apt", "Suite", "Unit", "Floor", "Apartment"],
    ),
    (FieldKey::City, &["City", "Patient City", "Home City"]),
    (FieldKey::State, &["State", "Patient State", "Home State"]),
    (FieldKey::ZipCode, &["Zip Code", "Zip", "Postal Code"]),
    (FieldKey::Mrn, MRN),
    (FieldKey::Ssn, SSN),
    (
        FieldKey::PrimaryInsuranceCompany,
        &[
            "Insurance Company",
            "Primary Insurance",
            "Insurance Provider",
            "Carrier",
            "Insurance Carrier",
        ],
    ),
    (FieldKey::PrimaryPlanName, &["Plan Name", "Insurance Plan", "Plan Type"]),
    (
        FieldKey::PrimaryPolicyNumber,
        &["Policy Number", "Policy #", "Member ID", "Member Number"],
    ),
    (
        FieldKey::PrimaryGroupNumber,
        &["Group Number", "Group #", "Group ID", "Employer Group"],
    ),
    (
        FieldKey::PrimaryPolicyHolderName,
        &["Policy Holder", "Subscriber", "Policy Holder Name", "Subscriber Name"],
    ),
    (
        FieldKey::PrimaryRelationshipToPatient,
        &["Relationship", "Relationship to Patient", "Patient Relationship"],
    ),
    (
        FieldKey::PrimaryPolicyHolderDob,
        &[
            "Policy Holder DOB",
            "Subscriber DOB",
            "Policy Holder Date of Birth",
            "Subscriber Date of Birth",
        ],
    ),
    (
        FieldKey::SecondaryInsuranceCompany,
        &["Secondary Insurance", "Secondary Insurance Company", "Secondary Carrier"],
    ),
    (
        FieldKey::SecondaryPolicyNumber,
        &["Secondary Policy Number", "Secondary Policy #", "Secondary Member ID"],
    ),
    (FieldKey::SecondaryGroupNumber, &["Secondary Group Number", "Secondary Group #"]),
]);

// ───────────────────────────────────────────────────────────────────────────
// Universal dictionary
// ───────────────────────────────────────────────────────────────────────────

pub const UNIVERSAL: FieldMapping = FieldMapping::new(&[
    (FieldKey::FirstName, &["First Name", "Given Name", "Patient First Name", "First", "Name (First)"]),
    (
        FieldKey::LastName,
        &["Last Name", "Family Name", "Patient Last Name", "Last", "Surname", "Name (Last)"],
    ),
    (FieldKey::MiddleName, MIDDLE_NAME),
    (FieldKey::DateOfBirth, DATE_OF_BIRTH),
    (FieldKey::Gender, GENDER),
    (
        FieldKey::PhoneNumber,
        &["Phone Number", "Phone", "Telephone", "Phone #", "Home Phone", "Cell Phone", "Mobile Phone"],
    ),
    (FieldKey::Email, EMAIL),
    (FieldKey::AddressLine1, ADDRESS_LINE1),
    (
        FieldKey::AddressLine2,
        &["Address Line 2", "Apt", "Suite", "Unit", "Floor", "Apartment"],
    ),
    (FieldKey::City, &["City", "Town", "Patient City", "Home City"]),
    (FieldKey::State, &["State", "Province", "Patient State", "Home State"]),
    (FieldKey::ZipCode, &["Zip Code", "ZIP", "Postal Code", "Zip"]),
    (FieldKey::Mrn, MRN),
    (FieldKey::Ssn, SSN),
    (
        FieldKey::PrimaryInsuranceCompany,
        &["Insurance", "Insurance Company", "Insurance Provider", "Insurance Plan"],
    ),
    (
        FieldKey::PrimaryPolicyNumber,
        &["Policy Number", "Policy #", "Policy ID", "Insurance Policy Number"],
    ),
    (
        FieldKey::PrimaryGroupNumber,
        &["Group Number", "Group #", "Group ID", "Insurance Group Number"],
    ),
    (FieldKey::PrimaryPolicyHolderName, &["Policy Holder", "Subscriber", "Member Name"]),
    (
        FieldKey::PrimaryRelationshipToPatient,
        &["Relationship", "Patient Relationship", "Insured Relationship"],
    ),
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_dictionary_maps_the_required_names() {
        for mapping in [STANDARD, EPIC, ONCO, MODMED, UNIVERSAL] {
            assert!(mapping.contains(FieldKey::FirstName));
            assert!(mapping.contains(FieldKey::LastName));
            assert!(mapping.len() >= 14);
        }
    }

    #[test]
    fn test_no_field_is_mapped_twice() {
        for mapping in [STANDARD, EPIC, ONCO, MODMED, UNIVERSAL] {
            let fields: Vec<FieldKey> = mapping.fields().collect();
            for (i, field) in fields.iter().enumerate() {
                assert!(!fields[i + 1..].contains(field), "{} mapped twice", field);
            }
        }
    }
}
