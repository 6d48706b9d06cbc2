//! Replay a captured record into a foreign form.

pub mod target;

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::config::CaptureSettings;
use crate::core::error::FillError;
use crate::core::fields::FieldKey;
use crate::core::types::{FormFillingResult, InsuranceRecord, PatientRecord};

pub use target::{FieldHandle, FormEvent, FormTarget, HtmlFormTarget, SelectOption};

/// Selector groups for the target form, tried as one CSS selector list.
mod selectors {
    pub const FIRST_NAME: &str = r#"[placeholder="First Name"], input[name*="firstName"], #firstName"#;
    pub const LAST_NAME: &str = r#"[placeholder="Last Name"], input[name*="lastName"], #lastName"#;
    pub const MIDDLE_NAME: &str =
        r#"[placeholder="Middle Name"], input[name*="middleName"], #middleName"#;
    pub const DATE_OF_BIRTH: &str = r#"[placeholder="MM/DD/YYYY"], input[name*="dob"], #dob"#;
    pub const GENDER: &str = r#"[name*="gender"], #gender, select[name*="sex"]"#;
    pub const PHONE: &str = r#"[placeholder*="Phone"], input[name*="phone"], #phone"#;
    pub const EMAIL: &str = r#"[placeholder*="Email"], input[name*="email"], #email"#;
    pub const ADDRESS_LINE1: &str = r#"[placeholder*="Street"], [placeholder*="Address"]:not([placeholder*="Email"]):not([placeholder*="Line 2"]), input[name*="address"]:not([name*="address2"]):not([name*="email"]), #address"#;
    pub const ADDRESS_LINE2: &str =
        r#"[placeholder*="Address Line 2"], input[name*="address2"], #address2"#;
    pub const CITY: &str = r#"[placeholder*="City"], input[name*="city"], #city"#;
    pub const STATE: &str = r#"[placeholder*="State"], input[name*="state"], #state"#;
    pub const ZIP: &str = r#"[placeholder*="Zip"], input[name*="zip"], #zip"#;
    pub const MRN: &str = r#"[placeholder*="MRN"], input[name*="mrn"], #mrn"#;
    pub const SSN: &str = r#"[placeholder*="SSN"], input[name*="ssn"], #ssn"#;

    pub const NO_INSURANCE: &str = r#"[name*="insurance"], #insurance"#;
    pub const INSURANCE_COMPANY: &str = r#"[placeholder*="Insurance Company"]:not([placeholder*="Secondary"]), input[name*="insurance"]:not([name*="secondary"]), #insurance"#;
    pub const POLICY_NUMBER: &str = r#"[placeholder*="Policy Number"]:not([placeholder*="Secondary"]), input[name*="policy"]:not([name*="secondary"]), #policy"#;
    pub const GROUP_NUMBER: &str = r#"[placeholder*="Group Number"], input[name*="group"], #group"#;
    pub const POLICY_HOLDER: &str = r#"[placeholder*="Policy Holder"]:not([placeholder*="DOB"]), input[name*="holder"]:not([name*="DOB"]), #holder"#;
    pub const RELATIONSHIP: &str = r#"[name*="relationship"], #relationship"#;
    pub const POLICY_HOLDER_DOB: &str =
        r#"[placeholder*="Policy Holder DOB"], input[name*="holderDOB"], #holderDOB"#;
    pub const SECONDARY_COMPANY: &str = r#"[placeholder*="Secondary Insurance"], input[name*="secondaryInsurance"], #secondaryInsurance"#;
    pub const SECONDARY_POLICY: &str = r#"[placeholder*="Secondary Policy"], input[name*="secondaryPolicy"], #secondaryPolicy"#;
}

const NO_INSURANCE_OPTION: &str = "No Insurance";

/// One write the filler will attempt.
struct Step {
    field: FieldKey,
    selector: &'static str,
    /// Accepted option values/labels for dropdowns; `None` means type.
    choices: Option<Vec<String>>,
    value: String,
}

impl Step {
    fn text(field: FieldKey, selector: &'static str, value: &str) -> Self {
        Self {
            field,
            selector,
            choices: None,
            value: value.trim().to_string(),
        }
    }

    fn dropdown(field: FieldKey, selector: &'static str, choices: Vec<String>) -> Self {
        Self {
            field,
            selector,
            value: choices.first().cloned().unwrap_or_default(),
            choices: Some(choices),
        }
    }
}

/// Per-run bookkeeping.
#[derive(Default)]
struct Progress {
    filled: usize,
    errors: Vec<String>,
}

impl Progress {
    fn finish(self) -> FormFillingResult {
        FormFillingResult {
            success: self.errors.is_empty(),
            fields_filled: self.filled,
            errors: self.errors,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormFiller {
    typing_delay: Duration,
}

impl Default for FormFiller {
    fn default() -> Self {
        Self::new(CaptureSettings::default().typing_delay)
    }
}

impl FormFiller {
    pub fn new(typing_delay: Duration) -> Self {
        Self { typing_delay }
    }

    pub fn from_settings(settings: &CaptureSettings) -> Self {
        Self::new(settings.typing_delay)
    }

    pub async fn fill_patient_data<T: FormTarget + ?Sized>(
        &self,
        record: &PatientRecord,
        target: &mut T,
        cancel: &CancellationToken,
    ) -> FormFillingResult {
        let mut steps = vec![
            Step::text(FieldKey::FirstName, selectors::FIRST_NAME, &record.first_name),
            Step::text(FieldKey::LastName, selectors::LAST_NAME, &record.last_name),
            Step::text(FieldKey::MiddleName, selectors::MIDDLE_NAME, &record.middle_name),
            Step::text(FieldKey::DateOfBirth, selectors::DATE_OF_BIRTH, &record.date_of_birth),
        ];
        if let Some(gender) = record.gender {
            let word = gender.as_str();
            steps.push(Step::dropdown(
                FieldKey::Gender,
                selectors::GENDER,
                vec![word.to_string(), word[..1].to_string()],
            ));
        }
        steps.extend([
            Step::text(FieldKey::PhoneNumber, selectors::PHONE, &record.phone_number),
            Step::text(FieldKey::Email, selectors::EMAIL, &record.email),
            Step::text(FieldKey::AddressLine1, selectors::ADDRESS_LINE1, &record.address_line1),
            Step::text(FieldKey::AddressLine2, selectors::ADDRESS_LINE2, &record.address_line2),
            Step::text(FieldKey::City, selectors::CITY, &record.city),
            Step::text(FieldKey::State, selectors::STATE, &record.state),
            Step::text(FieldKey::ZipCode, selectors::ZIP, &record.zip_code),
            Step::text(FieldKey::Mrn, selectors::MRN, &record.mrn),
            Step::text(FieldKey::Ssn, selectors::SSN, &record.ssn),
        ]);

        let result = self.run(steps, target, cancel).await;
        info!(
            "Patient fill: {} fields, {} errors",
            result.fields_filled,
            result.errors.len()
        );
        result
    }

    pub async fn fill_insurance_data<T: FormTarget + ?Sized>(
        &self,
        insurance: &InsuranceRecord,
        target: &mut T,
        cancel: &CancellationToken,
    ) -> FormFillingResult {
        if !insurance.has_insurance {
            let step = Step::dropdown(
                FieldKey::PrimaryInsuranceCompany,
                selectors::NO_INSURANCE,
                vec![NO_INSURANCE_OPTION.to_string()],
            );
            return self.run(vec![step], target, cancel).await;
        }

        let Some(primary) = insurance.primary.as_ref() else {
            return FormFillingResult {
                success: false,
                fields_filled: 0,
                errors: vec![FillError::NoPrimaryInsurance.to_string()],
            };
        };

        let mut steps = vec![
            Step::text(
                FieldKey::PrimaryInsuranceCompany,
                selectors::INSURANCE_COMPANY,
                &primary.company,
            ),
            Step::text(
                FieldKey::PrimaryPolicyNumber,
                selectors::POLICY_NUMBER,
                &primary.policy_number,
            ),
        ];
        if let Some(group) = primary.group_number.as_deref() {
            steps.push(Step::text(FieldKey::PrimaryGroupNumber, selectors::GROUP_NUMBER, group));
        }
        steps.push(Step::text(
            FieldKey::PrimaryPolicyHolderName,
            selectors::POLICY_HOLDER,
            &primary.policy_holder_name,
        ));
        steps.push(Step::dropdown(
            FieldKey::PrimaryRelationshipToPatient,
            selectors::RELATIONSHIP,
            vec![primary.relationship_to_patient.as_str().to_string()],
        ));
        if let Some(dob) = primary.policy_holder_dob.as_deref() {
            steps.push(Step::text(
                FieldKey::PrimaryPolicyHolderDob,
                selectors::POLICY_HOLDER_DOB,
                dob,
            ));
        }
        if let Some(secondary) = insurance.secondary.as_ref() {
            if let Some(company) = secondary.company.as_deref() {
                steps.push(Step::text(
                    FieldKey::SecondaryInsuranceCompany,
                    selectors::SECONDARY_COMPANY,
                    company,
                ));
            }
            if let Some(policy) = secondary.policy_number.as_deref() {
                steps.push(Step::text(
                    FieldKey::SecondaryPolicyNumber,
                    selectors::SECONDARY_POLICY,
                    policy,
                ));
            }
        }

        let result = self.run(steps, target, cancel).await;
        info!(
            "Insurance fill: {} fields, {} errors",
            result.fields_filled,
            result.errors.len()
        );
        result
    }

    async fn run<T: FormTarget + ?Sized>(
        &self,
        steps: Vec<Step>,
        target: &mut T,
        cancel: &CancellationToken,
    ) -> FormFillingResult {
        let mut progress = Progress::default();
        for step in steps {
            if step.value.is_empty() {
                continue;
            }
            if cancel.is_cancelled() {
                progress
                    .errors
                    .push(FillError::Cancelled(progress.filled).to_string());
                break;
            }
            let outcome = match step.choices.as_deref() {
                Some(choices) => self.select(target, step.selector, choices).await,
                None => self.type_into(target, step.selector, &step.value, cancel).await,
            };
            match outcome {
                Ok(()) => {
                    debug!("Filled {}", step.field);
                    progress.filled += 1;
                }
                Err(FillError::Cancelled(_)) => {
                    warn!("Fill cancelled while typing {}", step.field);
                    progress
                        .errors
                        .push(FillError::Cancelled(progress.filled).to_string());
                    break;
                }
                Err(e) => {
                    warn!("Could not fill {}: {}", step.field, e);
                    progress.errors.push(e.to_string());
                }
            }
        }
        progress.finish()
    }

    /// Clear, then type one character at a time with `typing_delay`
    /// between keystrokes, then `change` + `blur`.
    async fn type_into<T: FormTarget + ?Sized>(
        &self,
        target: &mut T,
        selector: &str,
        value: &str,
        cancel: &CancellationToken,
    ) -> Result<(), FillError> {
        let handle = target
            .find_control(selector)
            .await
            .ok_or_else(|| FillError::ControlNotFound(selector.to_string()))?;

        target.set_value(handle, "").await;
        target.dispatch(handle, FormEvent::Input).await;

        let mut typed = String::with_capacity(value.len());
        for ch in value.chars() {
            typed.push(ch);
            target.set_value(handle, &typed).await;
            target.dispatch(handle, FormEvent::Input).await;

            if self.typing_delay.is_zero() {
                if cancel.is_cancelled() {
                    return Err(FillError::Cancelled(0));
                }
                continue;
            }
            tokio::select! {
                _ = cancel.cancelled() => return Err(FillError::Cancelled(0)),
                _ = tokio::time::sleep(self.typing_delay) => {}
            }
        }

        target.dispatch(handle, FormEvent::Change).await;
        target.dispatch(handle, FormEvent::Blur).await;
        Ok(())
    }

    /// Pick the first option whose value or label equals any accepted
    /// choice, ignoring case.
    async fn select<T: FormTarget + ?Sized>(
        &self,
        target: &mut T,
        selector: &str,
        choices: &[String],
    ) -> Result<(), FillError> {
        let handle = target
            .find_control(selector)
            .await
            .ok_or_else(|| FillError::DropdownNotFound(selector.to_string()))?;

        let options = target.options(handle).await;
        let chosen = choices.iter().find_map(|choice| {
            options.iter().find(|o| {
                o.value.eq_ignore_ascii_case(choice) || o.label.eq_ignore_ascii_case(choice)
            })
        });
        let Some(option) = chosen else {
            return Err(FillError::OptionNotFound {
                selector: selector.to_string(),
                value: choices.first().cloned().unwrap_or_default(),
            });
        };

        target.set_value(handle, &option.value).await;
        target.dispatch(handle, FormEvent::Change).await;
        target.dispatch(handle, FormEvent::Blur).await;
        Ok(())
    }
}
