//! Detection, delegation and the fallback chain for one capture.

use std::cell::{Cell, OnceCell};

use tracing::{debug, info, warn};

use crate::core::config::{BridgeConfig, CaptureSettings, DetectionPolicy};
use crate::core::error::CaptureError;
use crate::core::fields::FieldKey;
use crate::core::types::{DetectionResult, ExtractionResult, ParsingResult, PatientRecord};
use crate::emr::{EmrSystem, PageSignals, SystemStrategy};
use crate::extraction::FieldExtractor;
use crate::scraping::PageDocument;
use crate::universal::SimpleUniversalParser;

/// Marks a [`ParsingResult::strategy`] that came from the fallback chain.
pub const FALLBACK_PREFIX: &str = "fallback:";

/// The system a parse result came from, fallback or not.
pub fn source_system(strategy: &str) -> &str {
    strategy.strip_prefix(FALLBACK_PREFIX).unwrap_or(strategy)
}

/// The strategy registry plus resolved settings. Holds no per-page state;
/// every capture gets its own [`ParserContext`].
#[derive(Debug, Clone)]
pub struct StrategyManager {
    registry: Vec<EmrSystem>,
    settings: CaptureSettings,
}

impl Default for StrategyManager {
    fn default() -> Self {
        Self::new(CaptureSettings::default())
    }
}

impl StrategyManager {
    pub fn new(settings: CaptureSettings) -> Self {
        Self::with_registry(EmrSystem::REGISTERED.to_vec(), settings)
    }

    /// Custom detection order. `Generic` entries are dropped; the universal
    /// parser always runs last on its own.
    pub fn with_registry(registry: Vec<EmrSystem>, settings: CaptureSettings) -> Self {
        let registry = registry
            .into_iter()
            .filter(|s| *s != EmrSystem::Generic)
            .collect();
        Self { registry, settings }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(config.settings())
    }

    pub fn registry(&self) -> &[EmrSystem] {
        &self.registry
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    pub fn context<'m, 'd>(&'m self, doc: &'d PageDocument) -> ParserContext<'m, 'd> {
        ParserContext {
            manager: self,
            extractor: FieldExtractor::new(doc),
            signals: PageSignals::new(doc),
            detection: OnceCell::new(),
            parsing: Cell::new(false),
        }
    }
}

#[derive(Debug, Clone)]
struct Detection {
    system: Option<EmrSystem>,
    result: DetectionResult,
}

/// State for one capture attempt over one page.
pub struct ParserContext<'m, 'd> {
    manager: &'m StrategyManager,
    extractor: FieldExtractor<'d>,
    signals: PageSignals<'d>,
    detection: OnceCell<Detection>,
    parsing: Cell<bool>,
}

/// Clears the in-flight flag however the parse exits.
struct ParseGuard<'a>(&'a Cell<bool>);

impl<'a> ParseGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for ParseGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<'m, 'd> ParserContext<'m, 'd> {
    fn strategy(&self, system: EmrSystem) -> SystemStrategy<'_, 'd> {
        SystemStrategy::new(system, &self.extractor)
    }

    fn universal(&self) -> SimpleUniversalParser<'_, 'd> {
        SimpleUniversalParser::new(
            &self.extractor,
            self.manager.settings.universal_success_threshold,
        )
    }

    fn detection(&self) -> &Detection {
        self.detection.get_or_init(|| self.run_detection())
    }

    fn run_detection(&self) -> Detection {
        let settings = &self.manager.settings;
        let mut best: Option<(EmrSystem, DetectionResult)> = None;

        for &system in &self.manager.registry {
            let result = self.strategy(system).detect(&self.signals);
            if result.confidence <= settings.detection_floor {
                continue;
            }
            match settings.detection_policy {
                DetectionPolicy::FirstAboveFloor => {
                    best = Some((system, result));
                    break;
                }
                DetectionPolicy::HighestConfidence => {
                    if best.as_ref().map_or(true, |(_, b)| result.confidence > b.confidence) {
                        best = Some((system, result));
                    }
                }
            }
        }

        match best {
            Some((system, result)) => {
                info!(
                    "Detected {} (confidence {:.2}, policy {})",
                    system,
                    result.confidence,
                    settings.detection_policy.as_str()
                );
                Detection {
                    system: Some(system),
                    result: DetectionResult {
                        detected: true,
                        ..result
                    },
                }
            }
            None => {
                info!("No EMR detected above {:.2}", settings.detection_floor);
                Detection {
                    system: None,
                    result: DetectionResult::unknown(),
                }
            }
        }
    }

    /// Detection outcome, computed once per context.
    pub fn detect_emr(&self) -> DetectionResult {
        self.detection().result.clone()
    }

    pub fn detected_system(&self) -> Option<EmrSystem> {
        self.detection().system
    }

    /// Look up one field by name with the detected system's strategy, or
    /// the universal parser when nothing was detected.
    pub fn extract_field(&self, name: &str) -> ExtractionResult {
        let Some(field) = FieldKey::parse_str(name) else {
            warn!("Unknown field requested: {}", name);
            return ExtractionResult::not_found("unknown-field");
        };
        match self.detected_system() {
            Some(system) => self.strategy(system).extract_field(field),
            None => self.universal().extract_field(field),
        }
    }

    /// Full capture: detected strategy, then the fallback chain.
    pub fn parse_patient_data(&self) -> ParsingResult {
        let Some(_guard) = ParseGuard::enter(&self.parsing) else {
            warn!("Rejected re-entrant parse");
            return ParsingResult::failure(
                "none",
                vec![CaptureError::ParseInProgress.to_string()],
            );
        };

        let mut errors: Vec<String> = Vec::new();
        let mut partial: Option<PatientRecord> = None;

        let detected = self.detected_system();
        match detected {
            Some(system) => {
                let result = self.strategy(system).parse_patient_data();
                if result.success {
                    return result;
                }
                warn!("{} parse failed: {:?}", system, result.errors);
                keep_best(&mut partial, result.partial_data);
                errors.extend(result.errors);

                // One retry of the detected strategy before the wider chain.
                let retry = self.strategy(system).parse_patient_data();
                if let Some(accepted) = self.accept_fallback(system.name(), retry, &mut partial) {
                    return accepted;
                }
            }
            None => errors.push(CaptureError::DetectionFailed.to_string()),
        }

        for &system in &self.manager.registry {
            debug!("Fallback: trying {}", system);
            let result = self.strategy(system).parse_patient_data();
            if let Some(accepted) = self.accept_fallback(system.name(), result, &mut partial) {
                return accepted;
            }
        }

        let universal = self.universal().parse_patient_data();
        if let Some(accepted) =
            self.accept_fallback(EmrSystem::Generic.name(), universal, &mut partial)
        {
            return accepted;
        }

        warn!("Capture failed: no strategy produced both names");
        errors.push(
            CaptureError::CaptureFailed("no strategy produced a record with both names".into())
                .to_string(),
        );
        ParsingResult {
            success: false,
            data: None,
            partial_data: partial,
            errors,
            strategy: detected.map_or("none", |s| s.name()).to_string(),
            confidence: 0.0,
        }
    }

    /// Accept a fallback result whose record carries both names; otherwise
    /// remember its partial data.
    fn accept_fallback(
        &self,
        name: &str,
        result: ParsingResult,
        partial: &mut Option<PatientRecord>,
    ) -> Option<ParsingResult> {
        let record = result.data.or(result.partial_data)?;
        if !record.has_required_names() {
            keep_best(partial, Some(record));
            return None;
        }
        info!("Fallback accepted {}", name);
        Some(ParsingResult {
            success: true,
            data: Some(record),
            partial_data: None,
            errors: Vec::new(),
            strategy: format!("{}{}", FALLBACK_PREFIX, name),
            confidence: self.manager.settings.fallback_confidence,
        })
    }
}

/// Keep whichever partial record has more populated fields; ties keep the
/// earlier one.
fn keep_best(best: &mut Option<PatientRecord>, candidate: Option<PatientRecord>) {
    let Some(candidate) = candidate else {
        return;
    };
    let better = best
        .as_ref()
        .map_or(true, |b| candidate.populated_fields() > b.populated_fields());
    if better {
        *best = Some(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN_DETAILS: &str = r#"
        <div class="detail-label">First Name:</div><div class="detail-value">Lisa</div>
        <div class="detail-label">Last Name:</div><div class="detail-value">Anderson</div>"#;

    #[test]
    fn test_first_above_floor_keeps_registration_order() {
        // weak Epic markers, strong Athena markers
        let doc = PageDocument::parse(
            r#"<div class="epic-banner"></div><div class="epic-nav"></div>
               <div data-athena="true" class="athena-container"></div>"#,
        );
        let manager = StrategyManager::default();
        let ctx = manager.context(&doc);
        let detection = ctx.detect_emr();
        assert_eq!(detection.name, "Epic");
        assert!(detection.detected);
        assert_eq!(detection.confidence, 0.2);
    }

    #[test]
    fn test_highest_confidence_policy() {
        let doc = PageDocument::parse(
            r#"<div class="epic-banner"></div><div class="epic-nav"></div>
               <div data-athena="true" class="athena-container"></div>"#,
        );
        let manager = StrategyManager::new(CaptureSettings {
            detection_policy: DetectionPolicy::HighestConfidence,
            ..Default::default()
        });
        assert_eq!(manager.context(&doc).detect_emr().name, "Athenahealth");
    }

    #[test]
    fn test_nothing_detected() {
        let doc = PageDocument::parse("<p>Welcome</p>");
        let manager = StrategyManager::default();
        let ctx = manager.context(&doc);
        assert_eq!(ctx.detect_emr(), DetectionResult::unknown());
        assert_eq!(ctx.detected_system(), None);
    }

    #[test]
    fn test_undetected_page_is_captured_by_fallback() {
        let doc = PageDocument::parse(PLAIN_DETAILS);
        let manager = StrategyManager::default();
        let result = manager.context(&doc).parse_patient_data();
        assert!(result.success);
        assert_eq!(result.strategy, "fallback:Epic");
        assert_eq!(source_system(&result.strategy), "Epic");
        assert_eq!(result.confidence, 0.1);
        assert_eq!(result.data.unwrap().last_name, "Anderson");
    }

    #[test]
    fn test_detected_strategy_success_is_returned_as_is() {
        let doc = PageDocument::parse(&format!(
            r#"<div class="athena-container" data-athena="true">{}</div>"#,
            PLAIN_DETAILS
        ));
        let manager = StrategyManager::default();
        let result = manager.context(&doc).parse_patient_data();
        assert!(result.success);
        assert_eq!(result.strategy, "Athenahealth");
        assert!(result.confidence > 0.0);
    }

    #[test]
    fn test_reentrant_parse_is_rejected() {
        let doc = PageDocument::parse(PLAIN_DETAILS);
        let manager = StrategyManager::default();
        let ctx = manager.context(&doc);

        let guard = ParseGuard::enter(&ctx.parsing);
        let rejected = ctx.parse_patient_data();
        assert!(!rejected.success);
        assert_eq!(rejected.errors, vec![CaptureError::ParseInProgress.to_string()]);

        drop(guard);
        assert!(ctx.parse_patient_data().success);
    }

    #[test]
    fn test_extract_field_by_name() {
        let doc = PageDocument::parse(PLAIN_DETAILS);
        let manager = StrategyManager::default();
        let ctx = manager.context(&doc);
        let first = ctx.extract_field("firstName");
        assert_eq!(first.value.as_deref(), Some("Lisa"));
        assert_eq!(first.strategy, "universal:label-pairs");
        assert_eq!(ctx.extract_field("favoriteColor").strategy, "unknown-field");
    }

    #[test]
    fn test_generic_is_filtered_from_custom_registry() {
        let manager = StrategyManager::with_registry(
            vec![EmrSystem::Generic, EmrSystem::Onco],
            CaptureSettings::default(),
        );
        assert_eq!(manager.registry(), &[EmrSystem::Onco]);
    }
}
