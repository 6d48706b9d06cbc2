pub mod config;
pub mod error;
pub mod fields;
pub mod record;
pub mod types;

pub use config::{BridgeConfig, CaptureSettings, DetectionPolicy};
pub use error::{CaptureError, ExtractionError, FillError};
pub use fields::{FieldKey, FieldKind};
pub use record::RecordBuilder;
