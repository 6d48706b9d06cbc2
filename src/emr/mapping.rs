use crate::core::fields::FieldKey;
use crate::extraction::LabelSet;

/// Ordered field → label synonyms dictionary for one source system.
///
/// Entry order is extraction order; synonym order is match priority.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    entries: &'static [(FieldKey, &'static [&'static str])],
}

impl FieldMapping {
    pub const fn new(entries: &'static [(FieldKey, &'static [&'static str])]) -> Self {
        Self { entries }
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.entries.iter().map(|(field, _)| *field)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, field: FieldKey) -> bool {
        self.entries.iter().any(|(f, _)| *f == field)
    }

    pub fn synonyms(&self, field: FieldKey) -> &'static [&'static str] {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, synonyms)| *synonyms)
            .unwrap_or(&[])
    }

    /// Matcher for one field. Every other field's synonyms become foreign
    /// labels. An unmapped field falls back to its own camelCase name.
    pub fn label_set(&self, field: FieldKey) -> LabelSet {
        let own = self.synonyms(field);
        let fallback = [field.as_str()];
        let synonyms: &[&str] = if own.is_empty() { &fallback } else { own };
        let foreign = self
            .entries
            .iter()
            .filter(|(f, _)| *f != field)
            .flat_map(|(_, synonyms)| synonyms.iter().copied());
        LabelSet::new(field, synonyms, foreign)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: FieldMapping = FieldMapping::new(&[
        (FieldKey::FirstName, &["First Name", "Given Name"]),
        (FieldKey::DateOfBirth, &["Date of Birth", "DOB"]),
    ]);

    #[test]
    fn test_lookup() {
        assert_eq!(SAMPLE.len(), 2);
        assert!(SAMPLE.contains(FieldKey::DateOfBirth));
        assert!(!SAMPLE.contains(FieldKey::Ssn));
        assert_eq!(SAMPLE.synonyms(FieldKey::FirstName), ["First Name", "Given Name"]);
        assert!(SAMPLE.synonyms(FieldKey::Ssn).is_empty());
        assert_eq!(
            SAMPLE.fields().collect::<Vec<_>>(),
            vec![FieldKey::FirstName, FieldKey::DateOfBirth]
        );
    }

    #[test]
    fn test_label_set_for_unmapped_field_uses_its_name() {
        let labels = SAMPLE.label_set(FieldKey::Ssn);
        assert_eq!(labels.field(), FieldKey::Ssn);
        assert_eq!(labels.synonyms()[0].text, "ssn");
    }
}
