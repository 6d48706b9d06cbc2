//! The capture/fill contract: parse a page, persist the result, replay it.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::core::config::CaptureSettings;
use crate::core::error::{CaptureError, FillError};
use crate::core::types::{
    CaptureData, CaptureMetadata, FormFillingResult, InsuranceRecord, ParsingResult,
};
use crate::fill::{FormFiller, FormTarget};
use crate::manager::{source_system, StrategyManager};
use crate::scraping::PageDocument;

/// Where captured records live between `capture` and `fill`. Encryption and
/// expiry belong to implementations.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn save(&self, data: &CaptureData) -> Result<()>;
    async fn load(&self) -> Result<Option<CaptureData>>;
    async fn clear(&self) -> Result<()>;
}

/// Holds the latest capture in process memory.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<CaptureData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn save(&self, data: &CaptureData) -> Result<()> {
        *self.slot.lock().await = Some(data.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<CaptureData>> {
        Ok(self.slot.lock().await.clone())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot.lock().await = None;
        Ok(())
    }
}

pub struct Importer<S: RecordStore> {
    manager: StrategyManager,
    filler: FormFiller,
    store: S,
}

impl<S: RecordStore> Importer<S> {
    pub fn new(manager: StrategyManager, filler: FormFiller, store: S) -> Self {
        Self {
            manager,
            filler,
            store,
        }
    }

    pub fn with_settings(settings: CaptureSettings, store: S) -> Self {
        let filler = FormFiller::from_settings(&settings);
        Self::new(StrategyManager::new(settings), filler, store)
    }

    pub fn manager(&self) -> &StrategyManager {
        &self.manager
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Parse the page and, on success, save it for a later `fill`.
    pub async fn capture(&self, doc: &PageDocument) -> ParsingResult {
        let mut result = self.manager.context(doc).parse_patient_data();
        let Some(patient) = result.data.clone().filter(|_| result.success) else {
            warn!("Capture produced no record: {:?}", result.errors);
            return result;
        };

        let data = CaptureData {
            insurance: patient
                .insurance
                .clone()
                .unwrap_or_else(InsuranceRecord::none),
            patient,
            metadata: CaptureMetadata {
                source_emr: source_system(&result.strategy).to_string(),
                captured_at: Utc::now().to_rfc3339(),
                page_url: doc.url_string(),
            },
        };

        if let Err(e) = self.store.save(&data).await {
            warn!("Failed to store capture: {}", e);
            result.success = false;
            result.partial_data = result.data.take();
            result.errors.push(CaptureError::Store(e.to_string()).to_string());
            return result;
        }
        info!(
            "Captured {} fields from {}",
            data.patient.populated_fields(),
            data.metadata.source_emr
        );
        result
    }

    /// Replay the stored capture: patient fields, then insurance.
    pub async fn fill<T: FormTarget + ?Sized>(
        &self,
        target: &mut T,
        cancel: &CancellationToken,
    ) -> FormFillingResult {
        let data = match self.store.load().await {
            Ok(Some(data)) => data,
            Ok(None) => return failed(FillError::NothingCaptured.to_string()),
            Err(e) => return failed(CaptureError::Store(e.to_string()).to_string()),
        };

        let patient = self
            .filler
            .fill_patient_data(&data.patient, target, cancel)
            .await;
        if cancel.is_cancelled() {
            return patient;
        }
        let insurance = self
            .filler
            .fill_insurance_data(&data.insurance, target, cancel)
            .await;
        patient.merge(insurance)
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await
    }
}

fn failed(error: String) -> FormFillingResult {
    FormFillingResult {
        success: false,
        fields_filled: 0,
        errors: vec![error],
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::fill::HtmlFormTarget;

    struct BrokenStore;

    #[async_trait]
    impl RecordStore for BrokenStore {
        async fn save(&self, _data: &CaptureData) -> Result<()> {
            anyhow::bail!("disk full")
        }
        async fn load(&self) -> Result<Option<CaptureData>> {
            anyhow::bail!("disk full")
        }
        async fn clear(&self) -> Result<()> {
            Ok(())
        }
    }

    fn instant() -> CaptureSettings {
        CaptureSettings {
            typing_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    const CHART: &str = r#"
        <div class="detail-label">First Name:</div><div class="detail-value">Lisa</div>
        <div class="detail-label">Last Name:</div><div class="detail-value">Anderson</div>"#;

    #[tokio::test]
    async fn test_capture_saves_envelope() {
        let importer = Importer::with_settings(instant(), MemoryStore::new());
        let doc = PageDocument::parse_with_url(CHART, "https://chart.example.org/p/1");

        let result = importer.capture(&doc).await;
        assert!(result.success);

        let saved = importer.store().load().await.unwrap().unwrap();
        assert_eq!(saved.patient.first_name, "Lisa");
        assert!(!saved.insurance.has_insurance);
        // undetected page, accepted on the fallback chain
        assert_eq!(result.strategy, "fallback:Epic");
        assert_eq!(saved.metadata.source_emr, "Epic");
        assert_eq!(saved.metadata.page_url, "https://chart.example.org/p/1");
        assert!(chrono::DateTime::parse_from_rfc3339(&saved.metadata.captured_at).is_ok());
    }

    #[tokio::test]
    async fn test_failed_capture_saves_nothing() {
        let importer = Importer::with_settings(instant(), MemoryStore::new());
        let result = importer.capture(&PageDocument::parse("<p>Phone: 5557890123</p>")).await;
        assert!(!result.success);
        assert!(importer.store().load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let importer = Importer::with_settings(instant(), BrokenStore);
        let result = importer.capture(&PageDocument::parse(CHART)).await;
        assert!(!result.success);
        assert_eq!(result.partial_data.unwrap().last_name, "Anderson");
        assert_eq!(result.errors.last().unwrap(), "Storage error: disk full");

        let filled = importer
            .fill(&mut HtmlFormTarget::parse("<form></form>"), &CancellationToken::new())
            .await;
        assert_eq!(filled.errors, vec!["Storage error: disk full"]);
    }

    #[tokio::test]
    async fn test_fill_without_capture() {
        let importer = Importer::with_settings(instant(), MemoryStore::new());
        let result = importer
            .fill(&mut HtmlFormTarget::parse("<form></form>"), &CancellationToken::new())
            .await;
        assert!(!result.success);
        assert_eq!(result.errors, vec![FillError::NothingCaptured.to_string()]);
    }

    #[tokio::test]
    async fn test_capture_then_fill() {
        let importer = Importer::with_settings(instant(), MemoryStore::new());
        importer.capture(&PageDocument::parse(CHART)).await;

        let mut target = HtmlFormTarget::parse(
            r#"<input name="firstName"><input name="lastName">
               <select name="insurance"><option>Medicare</option><option>No Insurance</option></select>"#,
        );
        let result = importer.fill(&mut target, &CancellationToken::new()).await;
        assert!(result.success, "{:?}", result.errors);
        assert_eq!(result.fields_filled, 3);
        assert_eq!(target.value_of(r#"[name="lastName"]"#), Some("Anderson"));
        assert_eq!(target.value_of("select"), Some("No Insurance"));

        importer.clear().await.unwrap();
        assert!(importer.store().load().await.unwrap().is_none());
    }
}
