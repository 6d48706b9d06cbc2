pub mod core;
pub mod emr;
pub mod extraction;
pub mod fill;
pub mod importer;
pub mod manager;
pub mod normalize;
pub mod scraping;
pub mod universal;

// --- Primary exports ---
pub use crate::core::config::{load_bridge_config, BridgeConfig, CaptureSettings, DetectionPolicy};
pub use crate::core::error::{CaptureError, ExtractionError, FillError};
pub use crate::core::fields::FieldKey;
pub use crate::core::types::*;
pub use emr::EmrSystem;
pub use fill::{FormFiller, FormTarget, HtmlFormTarget};
pub use importer::{Importer, MemoryStore, RecordStore};
pub use manager::{ParserContext, StrategyManager};
pub use scraping::PageDocument;
pub use universal::SimpleUniversalParser;
