use std::path::PathBuf;
use std::time::Duration;

// ---------------------------------------------------------------------------
// BridgeConfig: file-based config loader (emr-bridge.json) with env-var fallback
// ---------------------------------------------------------------------------

pub const ENV_CONFIG_PATH: &str = "EMR_BRIDGE_CONFIG";
pub const ENV_DETECTION_POLICY: &str = "EMR_BRIDGE_DETECTION_POLICY";
pub const ENV_DETECTION_FLOOR: &str = "EMR_BRIDGE_DETECTION_FLOOR";
pub const ENV_FALLBACK_CONFIDENCE: &str = "EMR_BRIDGE_FALLBACK_CONFIDENCE";
pub const ENV_UNIVERSAL_THRESHOLD: &str = "EMR_BRIDGE_UNIVERSAL_THRESHOLD";
pub const ENV_TYPING_DELAY_MS: &str = "EMR_BRIDGE_TYPING_DELAY_MS";

/// How the manager picks a source system when several detectors fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DetectionPolicy {
    /// Registration order wins: the first detector above the floor is used,
    /// even if a later one scores higher.
    #[default]
    FirstAboveFloor,
    /// Every detector runs and the best score above the floor is used.
    HighestConfidence,
}

impl DetectionPolicy {
    pub fn parse_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "first" | "first-above-floor" | "first_above_floor" => Some(Self::FirstAboveFloor),
            "highest" | "highest-confidence" | "highest_confidence" => {
                Some(Self::HighestConfidence)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstAboveFloor => "first-above-floor",
            Self::HighestConfidence => "highest-confidence",
        }
    }
}

/// Raw config file contents. Every key is optional; see the `resolve_*`
/// methods for the JSON → env var → default chain.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct BridgeConfig {
    /// `"first-above-floor"` (default) or `"highest-confidence"`.
    pub detection_policy: Option<String>,
    /// Minimum detector score the manager accepts. Default: 0.1.
    pub detection_floor: Option<f64>,
    /// Confidence reported for records recovered on the fallback path. Default: 0.1.
    pub fallback_confidence: Option<f64>,
    /// Confidence the universal parser must exceed to report success. Default: 0.3.
    pub universal_success_threshold: Option<f64>,
    /// Delay between synthetic keystrokes while filling. Default: 10 ms.
    pub typing_delay_ms: Option<u64>,
}

impl BridgeConfig {
    pub fn resolve_detection_policy(&self) -> DetectionPolicy {
        if let Some(p) = self.detection_policy.as_deref().and_then(DetectionPolicy::parse_str) {
            return p;
        }
        std::env::var(ENV_DETECTION_POLICY)
            .ok()
            .and_then(|v| DetectionPolicy::parse_str(&v))
            .unwrap_or_default()
    }

    pub fn resolve_detection_floor(&self) -> f64 {
        resolve_ratio(self.detection_floor, ENV_DETECTION_FLOOR, 0.1)
    }

    pub fn resolve_fallback_confidence(&self) -> f64 {
        resolve_ratio(self.fallback_confidence, ENV_FALLBACK_CONFIDENCE, 0.1)
    }

    pub fn resolve_universal_threshold(&self) -> f64 {
        resolve_ratio(self.universal_success_threshold, ENV_UNIVERSAL_THRESHOLD, 0.3)
    }

    pub fn resolve_typing_delay(&self) -> Duration {
        if let Some(ms) = self.typing_delay_ms {
            return Duration::from_millis(ms);
        }
        let ms = std::env::var(ENV_TYPING_DELAY_MS)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(10);
        Duration::from_millis(ms)
    }

    /// Flatten into the concrete settings the pipeline runs with.
    pub fn settings(&self) -> CaptureSettings {
        CaptureSettings {
            detection_policy: self.resolve_detection_policy(),
            detection_floor: self.resolve_detection_floor(),
            fallback_confidence: self.resolve_fallback_confidence(),
            universal_success_threshold: self.resolve_universal_threshold(),
            typing_delay: self.resolve_typing_delay(),
        }
    }
}

/// JSON field → env var → default, clamped to 0..=1.
fn resolve_ratio(field: Option<f64>, env_key: &str, default: f64) -> f64 {
    let value = field.or_else(|| {
        std::env::var(env_key)
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
    });
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => default,
    }
}

/// Resolved settings, passed by value into the manager and filler.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureSettings {
    pub detection_policy: DetectionPolicy,
    pub detection_floor: f64,
    pub fallback_confidence: f64,
    pub universal_success_threshold: f64,
    pub typing_delay: Duration,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            detection_policy: DetectionPolicy::FirstAboveFloor,
            detection_floor: 0.1,
            fallback_confidence: 0.1,
            universal_success_threshold: 0.3,
            typing_delay: Duration::from_millis(10),
        }
    }
}

/// Load `emr-bridge.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `EMR_BRIDGE_CONFIG` env var path
/// 2. `./emr-bridge.json`
/// 3. `~/.emr-bridge/config.json`
///
/// Missing file → `BridgeConfig::default()` (silent, env-var fallbacks apply).
/// Parse error → log a warning, return `BridgeConfig::default()`.
pub fn load_bridge_config() -> BridgeConfig {
    let mut candidates: Vec<PathBuf> = vec![PathBuf::from("emr-bridge.json")];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".emr-bridge").join("config.json"));
    }
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        candidates.insert(0, PathBuf::from(env_path));
    }

    for path in &candidates {
        let Ok(contents) = std::fs::read_to_string(path) else {
            continue;
        };
        return match serde_json::from_str::<BridgeConfig>(&contents) {
            Ok(cfg) => {
                tracing::info!("emr-bridge config loaded from {}", path.display());
                cfg
            }
            Err(e) => {
                tracing::warn!(
                    "emr-bridge config parse error at {}: {}, using defaults",
                    path.display(),
                    e
                );
                BridgeConfig::default()
            }
        };
    }

    BridgeConfig::default()
}
