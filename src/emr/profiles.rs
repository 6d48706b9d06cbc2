use super::detect::{weights, Probe, Signal};
use super::labels;
use super::mapping::FieldMapping;
use crate::core::fields::FieldKey;

/// Everything that distinguishes one source system: how to recognize it,
/// what its labels say, and where it keeps values in the DOM.
#[derive(Debug)]
pub struct SystemProfile {
    pub name: &'static str,
    /// Prefix used in the vendor's class names and data attributes.
    pub slug: &'static str,
    pub signals: &'static [Signal],
    /// Score a page needs before the profile reports itself detected.
    pub threshold: f64,
    pub mapping: FieldMapping,
    /// Shortcut selectors tried before the generic stack. Placeholders:
    /// `{slug}`, `{field}` (camelCase), `{kebab}`, `{snake}`, `{alias}`.
    pub selector_templates: &'static [&'static str],
}

impl SystemProfile {
    /// Render the shortcut selectors for one field, in template order.
    pub fn system_selectors(&self, field: FieldKey) -> Vec<String> {
        let kebab = field.kebab();
        let snake = field.snake();
        self.selector_templates
            .iter()
            .map(|template| {
                template
                    .replace("{slug}", self.slug)
                    .replace("{field}", field.as_str())
                    .replace("{kebab}", &kebab)
                    .replace("{snake}", &snake)
                    .replace("{alias}", field.short_alias())
            })
            .collect()
    }
}

const VENDOR_TEMPLATES: &[&str] = &[
    r#"[data-{slug}-field="{field}"]"#,
    ".{slug}-{kebab}",
    ".{slug}-field-{kebab}",
    ".{slug}-{alias}",
    "#{slug}-{kebab}",
];

const ONCO_TEMPLATES: &[&str] = &[
    ".{slug}-{kebab}",
    ".{slug}-field-{kebab}",
    ".{slug}-{alias}",
    ".{slug}-field-{alias}",
    r#"[data-{slug}-field="{field}"]"#,
    r#"[data-{slug}-field="{snake}"]"#,
    r#"[data-{slug}-field="{alias}"]"#,
];

const SPECIALTIES: &[&str] = &[
    "dermatology",
    "ophthalmology",
    "orthopedics",
    "plastic surgery",
    "otolaryngology",
];

pub static EPIC: SystemProfile = SystemProfile {
    name: "Epic",
    slug: "epic",
    signals: &[
        Signal::flat(Probe::Exists(r#"[data-epic="true"]"#), weights::DEDICATED_ATTRIBUTE),
        Signal::flat(Probe::Exists(".epic-container"), weights::CONTAINER),
        Signal::flat(Probe::Exists(".epic-patient-info"), weights::PATIENT_PANEL),
        Signal::per_match(
            Probe::Count(r#"input[name*="epic"], input[id*="epic"]"#),
            weights::PER_ELEMENT,
            3,
        ),
        Signal::per_match(Probe::Count(r#"[class*="epic"]"#), weights::PER_ELEMENT, 5),
        Signal::per_match(Probe::Count(r#"[id*="epic"]"#), weights::PER_ELEMENT, 3),
        Signal::per_match(Probe::Count(r#"[data-field*="epic"]"#), weights::PER_ELEMENT, 3),
        Signal::flat(Probe::HostContains(&["epic", "mychart"]), weights::HOSTNAME),
        Signal::flat(Probe::TitleContains(&["epic", "mychart"]), weights::TITLE),
    ],
    threshold: 0.3,
    mapping: labels::EPIC,
    selector_templates: VENDOR_TEMPLATES,
};

pub static ATHENAHEALTH: SystemProfile = SystemProfile {
    name: "Athenahealth",
    slug: "athena",
    signals: &[
        Signal::flat(Probe::Exists(r#"[data-athena="true"]"#), weights::DEDICATED_ATTRIBUTE),
        Signal::flat(Probe::Exists(".athena-container"), weights::CONTAINER),
        Signal::flat(Probe::Exists(".athena-patient-info"), weights::PATIENT_PANEL),
        Signal::per_match(
            Probe::Count(r#"input[name*="athena"], input[id*="athena"]"#),
            weights::PER_ELEMENT,
            3,
        ),
        Signal::per_match(Probe::Count(r#"[class*="athena"]"#), weights::PER_ELEMENT, 5),
        Signal::per_match(Probe::Count(r#"[id*="athena"]"#), weights::PER_ELEMENT, 3),
        Signal::per_match(Probe::Count(r#"[data-field*="athena"]"#), weights::PER_ELEMENT, 3),
        Signal::flat(Probe::HostContains(&["athena"]), weights::HOSTNAME),
        Signal::flat(Probe::TitleContains(&["athena"]), weights::TITLE),
    ],
    threshold: 0.3,
    mapping: labels::STANDARD,
    selector_templates: VENDOR_TEMPLATES,
};

pub static ECLINICALWORKS: SystemProfile = SystemProfile {
    name: "eClinicalWorks",
    slug: "ecw",
    signals: &[
        Signal::flat(Probe::Exists("[data-ecw]"), weights::DEDICATED_ATTRIBUTE),
        Signal::flat(Probe::Exists(".ecw-container"), weights::CONTAINER),
        Signal::flat(Probe::Exists(".ecw-patient-info"), weights::PATIENT_PANEL),
        Signal::per_match(Probe::Count(".ecw-label, .ecw-value"), weights::PER_ELEMENT, 5),
        Signal::per_match(Probe::Count(r#"[class*="ecw"]"#), weights::PER_ELEMENT, 5),
        Signal::per_match(Probe::Count(r#"[id*="ecw"]"#), weights::PER_ELEMENT, 3),
        Signal::per_match(Probe::Count("[data-ecw-field]"), weights::PER_ELEMENT, 3),
        Signal::per_match(
            Probe::Count(r#"input[name*="ecw"], select[name*="ecw"], textarea[name*="ecw"]"#),
            weights::PER_ELEMENT,
            3,
        ),
        Signal::flat(
            Probe::Exists(r#"script[src*="ecw"], link[href*="ecw"]"#),
            weights::ASSET_REFERENCE,
        ),
        Signal::flat(Probe::HostContains(&["eclinicalworks", "ecw"]), weights::HOSTNAME),
        Signal::flat(Probe::TitleContains(&["eclinicalworks", "ecw"]), weights::TITLE),
    ],
    threshold: 0.1,
    mapping: labels::STANDARD,
    selector_templates: &[
        r#"[data-ecw-field="{field}"]"#,
        r#"[data-ecw-field="{alias}"]"#,
        ".ecw-{kebab}",
        ".ecw-{alias}",
        "#ecw-{kebab}",
    ],
};

pub static ONCO: SystemProfile = SystemProfile {
    name: "Onco",
    slug: "onco",
    signals: &[
        Signal::flat(Probe::Exists(r#"[data-onco="true"]"#), weights::DEDICATED_ATTRIBUTE),
        Signal::flat(Probe::Exists(".onco-container"), weights::CONTAINER),
        Signal::flat(Probe::Exists(".onco-patient-info"), weights::PATIENT_PANEL),
        Signal::per_match(
            Probe::Count(r#"input[name*="onco"], input[id*="onco"]"#),
            weights::PER_ELEMENT,
            3,
        ),
        Signal::per_match(Probe::Count(r#"[class*="onco"]"#), weights::PER_ELEMENT, 5),
        Signal::per_match(Probe::Count(r#"[id*="onco"]"#), weights::PER_ELEMENT, 3),
        Signal::per_match(Probe::Count(r#"[data-field*="onco"]"#), weights::PER_ELEMENT, 3),
    ],
    threshold: 0.3,
    mapping: labels::ONCO,
    selector_templates: ONCO_TEMPLATES,
};

pub static MODMED: SystemProfile = SystemProfile {
    name: "ModMed",
    slug: "modmed",
    signals: &[
        Signal::flat(Probe::Exists(r#"[data-modmed="true"]"#), weights::DEDICATED_ATTRIBUTE),
        Signal::flat(Probe::Exists(".modmed-container"), weights::CONTAINER),
        Signal::flat(Probe::Exists(".modmed-patient-info"), weights::PATIENT_PANEL),
        Signal::per_match(
            Probe::Count(r#"input[name*="modmed"], input[id*="modmed"]"#),
            weights::PER_ELEMENT,
            3,
        ),
        Signal::per_match(Probe::Count(r#"[class*="modmed"]"#), weights::PER_ELEMENT, 5),
        Signal::per_match(Probe::Count(r#"[id*="modmed"]"#), weights::PER_ELEMENT, 3),
        Signal::per_match(Probe::Count(r#"[data-field*="modmed"]"#), weights::PER_ELEMENT, 3),
        Signal::flat(
            Probe::HostContains(&["modmed", "modernizingmedicine"]),
            weights::HOSTNAME,
        ),
        Signal::flat(
            Probe::TitleContains(&["modmed", "modernizing medicine"]),
            weights::TITLE,
        ),
        Signal::per_match(
            Probe::BodyContains(SPECIALTIES),
            weights::BODY_KEYWORD,
            SPECIALTIES.len(),
        ),
    ],
    threshold: 0.3,
    mapping: labels::MODMED,
    selector_templates: VENDOR_TEMPLATES,
};

/// The universal parser's profile: never detected, no vendor shortcuts.
pub static GENERIC: SystemProfile = SystemProfile {
    name: "Universal",
    slug: "universal",
    signals: &[],
    threshold: 1.0,
    mapping: labels::UNIVERSAL,
    selector_templates: &[],
};
