//! Source-system detection.
//!
//! Probing (looking at the page) is kept apart from scoring (adding up
//! weights) so thresholds can be tested without any markup.

use std::cell::OnceCell;

use aho_corasick::AhoCorasick;
use tracing::debug;

use super::profiles::SystemProfile;
use crate::core::types::DetectionResult;
use crate::scraping::PageDocument;

/// Signal weights shared by every profile.
pub mod weights {
    /// `data-<system>="true"` on any element.
    pub const DEDICATED_ATTRIBUTE: f64 = 0.6;
    /// `.<system>-container`
    pub const CONTAINER: f64 = 0.3;
    /// `.<system>-patient-info`
    pub const PATIENT_PANEL: f64 = 0.3;
    /// Each prefixed class/id/input, up to the signal's cap.
    pub const PER_ELEMENT: f64 = 0.1;
    pub const HOSTNAME: f64 = 0.2;
    pub const TITLE: f64 = 0.1;
    /// Each distinct vendor keyword in the body text.
    pub const BODY_KEYWORD: f64 = 0.1;
    /// A script or stylesheet served from the vendor.
    pub const ASSET_REFERENCE: f64 = 0.1;
}

#[derive(Debug, Clone, Copy)]
pub enum Probe {
    /// 1 when the selector matches anything.
    Exists(&'static str),
    /// Number of matching elements.
    Count(&'static str),
    /// 1 when the hostname contains any needle.
    HostContains(&'static [&'static str]),
    /// 1 when the lowercased title contains any needle.
    TitleContains(&'static [&'static str]),
    /// Number of distinct needles found in the body text.
    BodyContains(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Weight {
    Flat(f64),
    PerMatch { each: f64, cap: usize },
}

impl Weight {
    pub fn score(&self, count: usize) -> f64 {
        match *self {
            Weight::Flat(w) if count > 0 => w,
            Weight::Flat(_) => 0.0,
            Weight::PerMatch { each, cap } => each * count.min(cap) as f64,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Signal {
    pub probe: Probe,
    pub weight: Weight,
}

impl Signal {
    pub const fn flat(probe: Probe, weight: f64) -> Self {
        Self {
            probe,
            weight: Weight::Flat(weight),
        }
    }

    pub const fn per_match(probe: Probe, each: f64, cap: usize) -> Self {
        Self {
            probe,
            weight: Weight::PerMatch { each, cap },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalHit {
    pub weight: Weight,
    pub count: usize,
}

/// Page facts every probe may need, computed at most once per page.
pub struct PageSignals<'d> {
    doc: &'d PageDocument,
    hostname: OnceCell<String>,
    title: OnceCell<String>,
    body: OnceCell<String>,
}

impl<'d> PageSignals<'d> {
    pub fn new(doc: &'d PageDocument) -> Self {
        Self {
            doc,
            hostname: OnceCell::new(),
            title: OnceCell::new(),
            body: OnceCell::new(),
        }
    }

    fn hostname(&self) -> &str {
        self.hostname.get_or_init(|| self.doc.hostname().to_lowercase())
    }

    fn title(&self) -> &str {
        self.title.get_or_init(|| self.doc.title().to_lowercase())
    }

    fn body(&self) -> &str {
        self.body.get_or_init(|| self.doc.body_text())
    }

    pub fn probe(&self, probe: &Probe) -> usize {
        match probe {
            Probe::Exists(selector) => usize::from(self.doc.exists(selector)),
            Probe::Count(selector) => self.doc.count(selector),
            Probe::HostContains(needles) => {
                let host = self.hostname();
                usize::from(!host.is_empty() && needles.iter().any(|n| host.contains(n)))
            }
            Probe::TitleContains(needles) => {
                let title = self.title();
                usize::from(needles.iter().any(|n| title.contains(n)))
            }
            Probe::BodyContains(needles) => count_keywords(self.body(), needles),
        }
    }

    pub fn hits(&self, signals: &[Signal]) -> Vec<SignalHit> {
        signals
            .iter()
            .map(|signal| SignalHit {
                weight: signal.weight,
                count: self.probe(&signal.probe),
            })
            .collect()
    }
}

/// Distinct keywords present, case-insensitively.
fn count_keywords(text: &str, needles: &[&str]) -> usize {
    let Ok(ac) = AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(needles)
    else {
        return 0;
    };
    let mut seen = vec![false; needles.len()];
    for m in ac.find_overlapping_iter(text) {
        seen[m.pattern().as_usize()] = true;
    }
    seen.into_iter().filter(|s| *s).count()
}

/// Weighted sum of all hits, clamped to `0.0..=1.0` and rounded to four
/// decimals so threshold comparisons are stable.
pub fn score_hits(hits: &[SignalHit]) -> f64 {
    let total: f64 = hits.iter().map(|h| h.weight.score(h.count)).sum();
    (total.clamp(0.0, 1.0) * 10_000.0).round() / 10_000.0
}

/// Score one profile against a page.
pub fn detect(profile: &SystemProfile, signals: &PageSignals) -> DetectionResult {
    let confidence = score_hits(&signals.hits(profile.signals));
    let detected = confidence >= profile.threshold && confidence > 0.0;
    debug!(
        "{} detection confidence {:.2} (threshold {:.2})",
        profile.name, confidence, profile.threshold
    );
    DetectionResult {
        detected,
        name: profile.name.to_string(),
        confidence,
    }
}
