//! Capture from one page, replay into another.
use std::time::Duration;

use emr_bridge::fill::FormEvent;
use emr_bridge::{
    CaptureSettings, FormFiller, HtmlFormTarget, Importer, InsuranceRecord, MemoryStore,
    PageDocument, RecordStore,
};
use tokio_util::sync::CancellationToken;

fn init_logger() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn importer() -> Importer<MemoryStore> {
    Importer::with_settings(
        CaptureSettings {
            typing_delay: Duration::ZERO,
            ..Default::default()
        },
        MemoryStore::new(),
    )
}

const CHART: &str = r#"
    <div class="athena-container" data-athena="true">
      <table>
        <tr><td>First Name</td><td>Lisa</td></tr>
        <tr><td>Last Name</td><td>Anderson</td></tr>
        <tr><td>DOB</td><td>1970-03-15</td></tr>
        <tr><td>Sex</td><td>F</td></tr>
        <tr><td>Phone</td><td>5557890123</td></tr>
        <tr><td>Address</td><td>567 Cedar Ln, Miami, FL 33101</td></tr>
      </table>
    </div>"#;

const REGISTRATION_FORM: &str = r#"
    <form id="register">
      <input placeholder="First Name" name="firstName">
      <input placeholder="Last Name" name="lastName">
      <input placeholder="MM/DD/YYYY" name="dob">
      <select name="gender">
        <option value="">Select</option>
        <option value="M">Male</option>
        <option value="F">Female</option>
      </select>
      <input placeholder="Phone" name="phone">
      <input placeholder="City" name="city">
      <input placeholder="State" name="state">
      <input placeholder="Zip" name="zip">
      <select name="insurance">
        <option value="">Select</option>
        <option value="none">No Insurance</option>
      </select>
    </form>"#;

#[tokio::test]
async fn test_capture_then_fill_registration_form() {
    init_logger();
    let importer = importer();
    let captured = importer
        .capture(&PageDocument::parse_with_url(CHART, "https://athenanet.athenahealth.com/p/7"))
        .await;
    assert!(captured.success, "{:?}", captured.errors);
    assert_eq!(captured.strategy, "Athenahealth");

    let stored = importer.store().load().await.unwrap().unwrap();
    assert_eq!(stored.metadata.source_emr, "Athenahealth");
    assert_eq!(stored.insurance, InsuranceRecord::none());

    let mut form = HtmlFormTarget::parse(REGISTRATION_FORM);
    let filled = importer.fill(&mut form, &CancellationToken::new()).await;

    // firstName..gender, phone, city, state, zip, insurance; the street
    // address has no control on this form
    assert_eq!(filled.fields_filled, 9, "{:?}", filled.errors);
    assert_eq!(filled.errors.len(), 1);
    assert!(filled.errors[0].starts_with("Field not found"));

    assert_eq!(form.value_of(r#"[name="dob"]"#), Some("03/15/1970"));
    assert_eq!(form.value_of(r#"[name="gender"]"#), Some("F"));
    assert_eq!(form.value_of(r#"[name="phone"]"#), Some("(555) 789-0123"));
    assert_eq!(form.value_of(r#"[name="city"]"#), Some("Miami"));
    assert_eq!(form.value_of(r#"[name="zip"]"#), Some("33101"));
    assert_eq!(form.value_of(r#"[name="insurance"]"#), Some("none"));
}

#[tokio::test]
async fn test_events_follow_typing_order() {
    let importer = importer();
    importer.capture(&PageDocument::parse(CHART)).await;

    let mut form = HtmlFormTarget::parse(REGISTRATION_FORM);
    importer.fill(&mut form, &CancellationToken::new()).await;

    let events = form.events_of(r#"[name="lastName"]"#).unwrap();
    assert_eq!(events.first(), Some(&FormEvent::Input));
    assert_eq!(events.len(), 1 + "Anderson".len() + 2);
    assert_eq!(&events[events.len() - 2..], &[FormEvent::Change, FormEvent::Blur]);

    let select_events = form.events_of(r#"[name="gender"]"#).unwrap();
    assert_eq!(select_events, &[FormEvent::Change, FormEvent::Blur]);
}

#[tokio::test]
async fn test_cancelled_fill_skips_insurance() {
    let importer = importer();
    importer.capture(&PageDocument::parse(CHART)).await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut form = HtmlFormTarget::parse(REGISTRATION_FORM);
    let result = importer.fill(&mut form, &cancel).await;

    assert!(!result.success);
    assert_eq!(result.fields_filled, 0);
    assert_eq!(result.errors, vec!["Fill cancelled after 0 fields"]);
    assert_eq!(form.value_of(r#"[name="insurance"]"#), Some(""));
}

#[tokio::test(start_paused = true)]
async fn test_typing_delay_is_paced() {
    let filler = FormFiller::new(Duration::from_millis(25));
    let record = emr_bridge::PatientRecord {
        first_name: "Li".into(),
        last_name: "An".into(),
        ..Default::default()
    };
    let mut form = HtmlFormTarget::parse(REGISTRATION_FORM);

    let start = tokio::time::Instant::now();
    let result = filler
        .fill_patient_data(&record, &mut form, &CancellationToken::new())
        .await;
    assert!(result.success);
    assert_eq!(result.fields_filled, 2);
    assert!(start.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_cleared_store_has_nothing_to_fill() {
    let importer = importer();
    importer.capture(&PageDocument::parse(CHART)).await;
    importer.clear().await.unwrap();

    let mut form = HtmlFormTarget::parse(REGISTRATION_FORM);
    let result = importer.fill(&mut form, &CancellationToken::new()).await;
    assert!(!result.success);
    assert_eq!(result.fields_filled, 0);
}
