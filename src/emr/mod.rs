//! Per-source-system strategies.
//!
//! Each supported EMR is a variant of [`EmrSystem`]; everything that varies
//! between systems (signals, thresholds, labels, shortcut selectors) is data
//! in its [`SystemProfile`].

pub mod detect;
pub mod labels;
pub mod mapping;
pub mod profiles;
pub mod strategy;

use serde::{Deserialize, Serialize};

pub use detect::{PageSignals, Probe, Signal, SignalHit, Weight};
pub use mapping::FieldMapping;
pub use profiles::SystemProfile;
pub use strategy::SystemStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmrSystem {
    Epic,
    Athenahealth,
    EClinicalWorks,
    Onco,
    ModMed,
    /// The universal parser; never detected, only used as a last resort.
    Generic,
}

impl EmrSystem {
    /// Detection order. [`EmrSystem::Generic`] is not listed.
    pub const REGISTERED: [EmrSystem; 5] = [
        EmrSystem::Epic,
        EmrSystem::Athenahealth,
        EmrSystem::EClinicalWorks,
        EmrSystem::Onco,
        EmrSystem::ModMed,
    ];

    pub fn profile(&self) -> &'static SystemProfile {
        match self {
            EmrSystem::Epic => &profiles::EPIC,
            EmrSystem::Athenahealth => &profiles::ATHENAHEALTH,
            EmrSystem::EClinicalWorks => &profiles::ECLINICALWORKS,
            EmrSystem::Onco => &profiles::ONCO,
            EmrSystem::ModMed => &profiles::MODMED,
            EmrSystem::Generic => &profiles::GENERIC,
        }
    }

    pub fn name(&self) -> &'static str {
        self.profile().name
    }

    pub fn slug(&self) -> &'static str {
        self.profile().slug
    }

    /// Lookup by display name or slug, case-insensitive.
    pub fn parse_str(value: &str) -> Option<Self> {
        let wanted = value.trim();
        EmrSystem::REGISTERED
            .into_iter()
            .chain([EmrSystem::Generic])
            .find(|s| s.name().eq_ignore_ascii_case(wanted) || s.slug().eq_ignore_ascii_case(wanted))
    }
}

impl std::fmt::Display for EmrSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
