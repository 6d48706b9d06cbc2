use crate::core::fields::FieldKey;

/// Synonyms this short only match as a whole word (`MI` must not hit "Miami").
const SHORT_SYNONYM_LEN: usize = 3;

/// Words that move a label to another party or coverage tier when they sit
/// in front of a synonym: "Policy Holder DOB" is not the patient's DOB.
const QUALIFIERS: [&str; 8] = [
    "secondary",
    "tertiary",
    "holder",
    "policyholder",
    "subscriber",
    "guarantor",
    "emergency",
    "email",
];
/// Words directly before a synonym inspected for qualifiers.
const QUALIFIER_WINDOW: usize = 3;

/// Which half of the two-pass search is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Normalized label text equals the synonym.
    Exact,
    /// Label text contains the synonym.
    Contains,
}

impl Pass {
    pub const ORDER: [Pass; 2] = [Pass::Exact, Pass::Contains];
}

#[derive(Debug, Clone)]
pub struct Synonym {
    /// As written in the mapping, minus trailing `:`/`*`.
    pub text: String,
    norm: String,
    compact: String,
    short: bool,
}

impl Synonym {
    fn new(raw: &str) -> Self {
        let text = raw.trim().trim_end_matches([':', '*']).trim().to_string();
        let norm = normalize_label(&text);
        let compact = compact(&text);
        let short = norm.chars().count() <= SHORT_SYNONYM_LEN;
        Self {
            text,
            norm,
            compact,
            short,
        }
    }

    pub fn is_short(&self) -> bool {
        self.short
    }
}

/// A label/value pair lifted out of the page, label already normalized.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub label: String,
    pub value: String,
}

impl Candidate {
    pub fn new(label_text: &str, value: &str) -> Self {
        Self {
            label: normalize_label(label_text),
            value: value.trim().to_string(),
        }
    }
}

/// The synonyms for one field, plus every other field's synonyms so a
/// label that belongs to a sibling field is never stolen by a loose match.
#[derive(Debug, Clone)]
pub struct LabelSet {
    field: FieldKey,
    synonyms: Vec<Synonym>,
    foreign_norms: Vec<String>,
    foreign_compacts: Vec<String>,
}

impl LabelSet {
    pub fn new<'a>(
        field: FieldKey,
        synonyms: &[&str],
        all_synonyms: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut own: Vec<Synonym> = Vec::new();
        for raw in synonyms {
            let syn = Synonym::new(raw);
            if !syn.norm.is_empty() && !own.iter().any(|s| s.norm == syn.norm) {
                own.push(syn);
            }
        }

        let mut foreign_norms: Vec<String> = Vec::new();
        let mut foreign_compacts: Vec<String> = Vec::new();
        for raw in all_synonyms {
            let syn = Synonym::new(raw);
            if syn.norm.is_empty() || own.iter().any(|s| s.norm == syn.norm) {
                continue;
            }
            if !foreign_norms.contains(&syn.norm) {
                foreign_norms.push(syn.norm);
                foreign_compacts.push(syn.compact);
            }
        }

        Self {
            field,
            synonyms: own,
            foreign_norms,
            foreign_compacts,
        }
    }

    pub fn field(&self) -> FieldKey {
        self.field
    }

    pub fn synonyms(&self) -> &[Synonym] {
        &self.synonyms
    }

    /// Every known label for this page, own and foreign, normalized.
    pub fn known_labels(&self) -> impl Iterator<Item = &str> {
        self.synonyms
            .iter()
            .map(|s| s.norm.as_str())
            .chain(self.foreign_norms.iter().map(String::as_str))
    }

    /// `label` must already be normalized with [`normalize_label`].
    pub fn text_matches(&self, pass: Pass, syn: &Synonym, label: &str) -> bool {
        match pass {
            Pass::Exact => label == syn.norm,
            Pass::Contains => {
                let hit = if syn.short {
                    contains_word(label, &syn.norm)
                } else {
                    label.contains(&syn.norm)
                };
                hit && !self.belongs_elsewhere(syn, label)
            }
        }
    }

    /// A normalized label that contains `syn` but names another field:
    /// either it is another field's synonym outright, or a qualifier word
    /// precedes the synonym.
    pub fn belongs_elsewhere(&self, syn: &Synonym, label: &str) -> bool {
        if self.synonyms.iter().any(|s| s.norm == label) {
            return false;
        }
        if self.foreign_norms.iter().any(|f| f == label) {
            return true;
        }
        let Some(at) = label.find(&syn.norm) else {
            return false;
        };
        label[..at]
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .rev()
            .take(QUALIFIER_WINDOW)
            .any(|w| QUALIFIERS.contains(&w) && !syn.norm.contains(w))
    }

    /// Match a control attribute (`name`, `id`, `placeholder`) against a
    /// synonym. `first_name`, `firstName` and `First Name` all compare equal.
    pub fn attr_matches(&self, pass: Pass, syn: &Synonym, attr: &str) -> bool {
        let attr_compact = compact(attr);
        if attr_compact.is_empty() {
            return false;
        }
        match pass {
            Pass::Exact => attr_compact == syn.compact,
            Pass::Contains => {
                let hit = if syn.short {
                    identifier_words(attr).iter().any(|w| *w == syn.compact)
                } else {
                    attr_compact.contains(&syn.compact)
                };
                hit && !self.foreign_compacts.iter().any(|f| *f == attr_compact)
            }
        }
    }

    /// A value that is itself a label (`"Last Name:"`) is never accepted.
    pub fn is_label_like(&self, value: &str) -> bool {
        let trimmed = value.trim();
        if trimmed.ends_with(':') {
            return true;
        }
        let norm = normalize_label(trimmed);
        self.known_labels().any(|known| known == norm)
    }

    /// Two-pass search: every candidate is tried for an exact match against
    /// each synonym in mapping order, then again for containment. The first
    /// candidate whose value survives [`is_label_like`](Self::is_label_like)
    /// wins.
    pub fn pick_by<T>(
        &self,
        items: &[T],
        matches: impl Fn(Pass, &Synonym, &T) -> bool,
        value_of: impl Fn(&T) -> Option<String>,
    ) -> Option<String> {
        for pass in Pass::ORDER {
            for syn in &self.synonyms {
                for item in items {
                    if !matches(pass, syn, item) {
                        continue;
                    }
                    if let Some(value) = value_of(item) {
                        let value = value.trim();
                        if !value.is_empty() && !self.is_label_like(value) {
                            return Some(value.to_string());
                        }
                    }
                }
            }
        }
        None
    }

    pub fn pick(&self, candidates: &[Candidate]) -> Option<String> {
        self.pick_by(
            candidates,
            |pass, syn, c| self.text_matches(pass, syn, &c.label),
            |c| {
                if normalize_label(&c.value) == c.label {
                    None
                } else {
                    Some(c.value.clone())
                }
            },
        )
    }
}

/// Lowercase, collapse whitespace, drop trailing `:` and `*` markers.
pub fn normalize_label(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(|c: char| c == ':' || c == '*' || c.is_whitespace())
        .trim()
        .to_lowercase()
}

/// Lowercase alphanumerics only.
pub fn compact(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split an identifier on punctuation and camelCase humps, lowercased:
/// `patientDOB_field` → `["patient", "dob", "field"]`.
fn identifier_words(ident: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for chunk in ident.split(|c: char| !c.is_alphanumeric()) {
        let mut current = String::new();
        let mut prev_lower = false;
        for ch in chunk.chars() {
            if ch.is_uppercase() && prev_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
            current.extend(ch.to_lowercase());
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}

/// `needle` occurs in `haystack` with no alphanumeric neighbour on either side.
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        let begin = start + pos;
        let end = begin + needle.len();
        let before_ok = haystack[..begin]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        start = begin + needle.chars().next().map_or(1, char::len_utf8);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dob_labels() -> LabelSet {
        LabelSet::new(
            FieldKey::DateOfBirth,
            &["Date of Birth", "DOB", "DOB:", "Birth Date"],
            ["First Name", "Policy Holder DOB", "Date of Birth"],
        )
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  First   Name: * "), "first name");
        assert_eq!(normalize_label("DOB:"), "dob");
    }

    #[test]
    fn test_short_synonyms_need_word_boundaries() {
        let labels = dob_labels();
        let dob = &labels.synonyms()[1];
        assert!(dob.is_short());
        assert!(labels.text_matches(Pass::Contains, dob, "patient dob"));
        assert!(!labels.text_matches(Pass::Contains, dob, "adobe version"));

        let mi = LabelSet::new(FieldKey::MiddleName, &["MI"], Vec::<&str>::new());
        assert!(!mi.text_matches(Pass::Contains, &mi.synonyms()[0], "miami"));
        assert!(mi.text_matches(Pass::Contains, &mi.synonyms()[0], "name (mi)"));
    }

    #[test]
    fn test_foreign_labels_are_not_stolen() {
        let labels = dob_labels();
        let dob = &labels.synonyms()[1];
        assert!(!labels.text_matches(Pass::Contains, dob, "policy holder dob"));
    }

    #[test]
    fn test_qualified_labels_belong_elsewhere() {
        let policy = LabelSet::new(
            FieldKey::PrimaryPolicyNumber,
            &["Policy Number"],
            ["Group Number"],
        );
        let syn = &policy.synonyms()[0];
        assert!(policy.belongs_elsewhere(syn, "secondary policy number"));
        assert!(!policy.belongs_elsewhere(syn, "policy number"));
        assert!(!policy.belongs_elsewhere(syn, "insurance policy number"));
        assert!(!policy.text_matches(Pass::Contains, syn, "secondary policy number"));

        let dob = LabelSet::new(FieldKey::DateOfBirth, &["DOB"], Vec::<&str>::new());
        assert!(dob.belongs_elsewhere(&dob.synonyms()[0], "subscriber dob"));
        assert!(!dob.belongs_elsewhere(&dob.synonyms()[0], "patient dob"));
    }

    #[test]
    fn test_duplicate_synonyms_collapse() {
        assert_eq!(dob_labels().synonyms().len(), 3);
    }

    #[test]
    fn test_attribute_matching() {
        let labels = LabelSet::new(FieldKey::FirstName, &["First Name", "First"], Vec::<&str>::new());
        let first_name = &labels.synonyms()[0];
        assert!(labels.attr_matches(Pass::Exact, first_name, "first_name"));
        assert!(labels.attr_matches(Pass::Exact, first_name, "firstName"));
        assert!(labels.attr_matches(Pass::Contains, first_name, "patientFirstName"));

        let dob = dob_labels();
        assert!(dob.attr_matches(Pass::Contains, &dob.synonyms()[1], "patientDOB"));
        assert!(!dob.attr_matches(Pass::Contains, &dob.synonyms()[1], "adobe"));
    }

    #[test]
    fn test_exact_pass_beats_earlier_containment() {
        let labels = LabelSet::new(FieldKey::LastName, &["Last Name"], ["Emergency Contact Last Name"]);
        let candidates = vec![
            Candidate::new("Previous Last Name", "Smith"),
            Candidate::new("Last Name:", "Anderson"),
        ];
        assert_eq!(labels.pick(&candidates).as_deref(), Some("Anderson"));
    }

    #[test]
    fn test_label_like_values_are_rejected() {
        let labels = LabelSet::new(FieldKey::FirstName, &["First Name"], ["Last Name"]);
        let candidates = vec![
            Candidate::new("First Name", "Last Name:"),
            Candidate::new("First Name", "Last Name"),
            Candidate::new("First Name", "Lisa"),
        ];
        assert_eq!(labels.pick(&candidates).as_deref(), Some("Lisa"));
    }

    #[test]
    fn test_identifier_words() {
        assert_eq!(identifier_words("patientDOB_field"), vec!["patient", "dob", "field"]);
        assert_eq!(identifier_words("address-line1"), vec!["address", "line1"]);
    }
}
