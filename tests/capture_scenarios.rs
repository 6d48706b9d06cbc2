//! End-to-end capture scenarios against HTML snapshots.
use emr_bridge::normalize::{normalize_date, normalize_phone, normalize_ssn, normalize_zip};
use emr_bridge::{PageDocument, StrategyManager};

fn init_logger() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

const DETAIL_PAIRS: &str = r#"
    <div class="patient-detail">
      <div class="detail-label">First Name:</div><div class="detail-value">Lisa</div>
      <div class="detail-label">Last Name:</div><div class="detail-value">Anderson</div>
    </div>"#;

#[test]
fn scenario_label_value_div_pairs() {
    init_logger();
    let doc = PageDocument::parse(DETAIL_PAIRS);
    let manager = StrategyManager::default();
    let result = manager.context(&doc).parse_patient_data();

    assert!(result.success, "{:?}", result.errors);
    let data = result.data.unwrap();
    assert_eq!(data.first_name, "Lisa");
    assert_eq!(data.last_name, "Anderson");
}

#[test]
fn scenario_table_layout() {
    init_logger();
    let doc = PageDocument::parse(
        r#"<table>
             <tr><td>First Name</td><td>Lisa</td></tr>
             <tr><td>Last Name</td><td>Anderson</td></tr>
             <tr><td>Date of Birth</td><td>03/15/1970</td></tr>
           </table>"#,
    );
    let manager = StrategyManager::default();
    let ctx = manager.context(&doc);
    assert_eq!(
        ctx.extract_field("dateOfBirth").value.as_deref(),
        Some("03/15/1970")
    );

    let result = ctx.parse_patient_data();
    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.data.unwrap().date_of_birth, "03/15/1970");
}

#[test]
fn scenario_table_with_only_a_birth_date_keeps_it_as_partial_data() {
    let doc = PageDocument::parse(
        "<table><tr><td>Date of Birth</td><td>03/15/1970</td></tr></table>",
    );
    let manager = StrategyManager::default();
    let result = manager.context(&doc).parse_patient_data();

    assert!(!result.success);
    assert_eq!(result.record().unwrap().date_of_birth, "03/15/1970");
}

#[test]
fn scenario_phone_normalized_on_every_layout() {
    init_logger();
    let layouts = [
        format!(
            r#"{}<div class="detail-label">Phone:</div><div class="detail-value">5557890123</div>"#,
            DETAIL_PAIRS
        ),
        r#"<table>
             <tr><td>First Name</td><td>Lisa</td></tr>
             <tr><td>Last Name</td><td>Anderson</td></tr>
             <tr><td>Phone</td><td>5557890123</td></tr>
           </table>"#
            .to_string(),
        r#"<form>
             <label for="fn">First Name</label><input id="fn" value="Lisa">
             <label for="ln">Last Name</label><input id="ln" value="Anderson">
             <label for="ph">Phone</label><input id="ph" value="5557890123">
           </form>"#
            .to_string(),
    ];

    let manager = StrategyManager::default();
    for html in &layouts {
        let doc = PageDocument::parse(html);
        let result = manager.context(&doc).parse_patient_data();
        assert!(result.success, "{:?} for {}", result.errors, html);
        assert_eq!(result.data.unwrap().phone_number, "(555) 789-0123");
    }
}

#[test]
fn scenario_combined_address_is_decomposed() {
    init_logger();
    let doc = PageDocument::parse(&format!(
        r#"{}<div class="detail-label">Address:</div><div class="detail-value">567 Cedar Ln, Miami, FL 33101</div>"#,
        DETAIL_PAIRS
    ));
    let manager = StrategyManager::default();
    let result = manager.context(&doc).parse_patient_data();

    assert!(result.success, "{:?}", result.errors);
    let data = result.data.unwrap();
    assert_eq!(data.address_line1, "567 Cedar Ln");
    assert_eq!(data.city, "Miami");
    assert_eq!(data.state, "FL");
    assert_eq!(data.zip_code, "33101");
}

#[test]
fn scenario_phone_without_names_fails() {
    init_logger();
    let doc = PageDocument::parse(
        r#"<div class="detail-label">Phone:</div><div class="detail-value">5557890123</div>"#,
    );
    let manager = StrategyManager::default();
    let result = manager.context(&doc).parse_patient_data();

    assert!(!result.success);
    assert!(result.data.is_none());
    assert!(!result.errors.is_empty());
    assert_eq!(
        result.partial_data.unwrap().phone_number,
        "(555) 789-0123"
    );
}

#[test]
fn scenario_lookalike_labels_do_not_steal_values() {
    init_logger();
    let doc = PageDocument::parse(
        r#"<div class="summary">
             <p>First Name: Lisa</p>
             <p>Last Name: Anderson</p>
             <p>Policy Holder DOB: 01/01/1960</p>
             <p>DOB: 03/15/1970</p>
             <p>Email Address: lisa@example.com</p>
             <p>Address: 567 Cedar Ln, Miami, FL 33101</p>
             <p>Secondary Policy Number: SEC999</p>
             <p>Policy Number: W123</p>
           </div>"#,
    );
    let manager = StrategyManager::default();
    let ctx = manager.context(&doc);

    assert_eq!(ctx.extract_field("dateOfBirth").value.as_deref(), Some("03/15/1970"));
    assert_eq!(ctx.extract_field("email").value.as_deref(), Some("lisa@example.com"));
    assert_eq!(ctx.extract_field("primaryPolicyNumber").value.as_deref(), Some("W123"));

    let result = ctx.parse_patient_data();
    assert!(result.success, "{:?}", result.errors);
    let data = result.data.unwrap();
    assert_eq!(data.date_of_birth, "03/15/1970");
    assert_eq!(data.address_line1, "567 Cedar Ln");
    assert_eq!(data.city, "Miami");
}

#[test]
fn scenario_unrelated_value_node_is_not_paired_with_a_form_label() {
    init_logger();
    let doc = PageDocument::parse(
        r#"<form>
             <label class="form-label" for="fn">First Name</label><input id="fn" value="Lisa">
             <label class="form-label" for="ln">Last Name</label><input id="ln" value="Anderson">
           </form>
           <footer><span class="build-label">Build</span> <span class="version-value">v2.4.1</span></footer>"#,
    );
    let manager = StrategyManager::default();
    let ctx = manager.context(&doc);
    assert_eq!(ctx.extract_field("lastName").value.as_deref(), Some("Anderson"));

    let result = ctx.parse_patient_data();
    assert!(result.success, "{:?}", result.errors);
    let data = result.data.unwrap();
    assert_eq!(data.first_name, "Lisa");
    assert_eq!(data.last_name, "Anderson");
}

// ─── Properties ────────────────────────────────────────────────────────────

#[test]
fn success_always_carries_both_names() {
    let pages = [
        DETAIL_PAIRS.to_string(),
        r#"<div class="detail-label">First Name:</div><div class="detail-value">Lisa</div>"#
            .to_string(),
        r#"<div class="detail-label">Last Name:</div><div class="detail-value">Anderson</div>"#
            .to_string(),
        r#"<div data-athena="true" class="athena-container"><p>Phone: 5557890123</p></div>"#
            .to_string(),
        r#"<div data-epic="true"><p>First Name: Lisa</p><p>Last Name:</p></div>"#.to_string(),
        "<p>Welcome back</p>".to_string(),
    ];

    let manager = StrategyManager::default();
    for html in &pages {
        let doc = PageDocument::parse(html);
        let result = manager.context(&doc).parse_patient_data();
        if result.success {
            let data = result.data.as_ref().unwrap();
            assert!(!data.first_name.is_empty() && !data.last_name.is_empty(), "{}", html);
        } else {
            assert!(result.data.is_none());
        }
    }
}

#[test]
fn repeated_lookups_are_identical() {
    let doc = PageDocument::parse(&format!(
        r#"<div class="athena-container" data-athena="true">{}
             <table><tr><td>DOB</td><td>1970-03-15</td></tr></table>
           </div>"#,
        DETAIL_PAIRS
    ));
    let manager = StrategyManager::default();

    for field in ["firstName", "lastName", "dateOfBirth", "email"] {
        let first = manager.context(&doc).extract_field(field);
        for _ in 0..3 {
            assert_eq!(manager.context(&doc).extract_field(field), first);
        }
    }
    let first = manager.context(&doc).parse_patient_data();
    assert_eq!(manager.context(&doc).parse_patient_data(), first);
}

#[test]
fn more_fields_never_lower_confidence() {
    let rows = [
        ("First Name", "Lisa"),
        ("Last Name", "Anderson"),
        ("Date of Birth", "03/15/1970"),
        ("Phone", "5557890123"),
        ("Email", "lisa@example.com"),
        ("MRN", "AB123"),
    ];
    let manager = StrategyManager::default();

    let mut previous = 0.0;
    for n in 2..=rows.len() {
        let body: String = rows[..n]
            .iter()
            .map(|(label, value)| {
                format!(
                    r#"<div class="detail-label">{}:</div><div class="detail-value">{}</div>"#,
                    label, value
                )
            })
            .collect();
        let doc = PageDocument::parse(&format!(
            r#"<div class="athena-container" data-athena="true">{}</div>"#,
            body
        ));
        let result = manager.context(&doc).parse_patient_data();
        assert!(result.success);
        assert_eq!(result.strategy, "Athenahealth");
        assert!(
            result.confidence >= previous,
            "{} fields gave {} after {}",
            n,
            result.confidence,
            previous
        );
        previous = result.confidence;
    }
}

#[test]
fn unrecognizable_page_degrades_to_errors() {
    let doc = PageDocument::parse("<html><body><h1>Nothing here</h1></body></html>");
    let manager = StrategyManager::default();
    let ctx = manager.context(&doc);

    assert!(!ctx.detect_emr().detected);
    let result = ctx.parse_patient_data();
    assert!(!result.success);
    assert!(!result.errors.is_empty());
}

#[test]
fn normalizers_are_idempotent() {
    for raw in ["5557890123", "1-555-789-0123", "(555) 789-0123", "555.789.0123", "12345"] {
        let once = normalize_phone(raw);
        assert_eq!(normalize_phone(&once), once, "{}", raw);
    }
    for raw in ["1970-03-15", "3/15/1970", "03/15/1970", "March 15, 1970", "soon"] {
        let once = normalize_date(raw);
        assert_eq!(normalize_date(&once), once, "{}", raw);
    }
    for raw in ["123456789", "123-45-6789", "123 45 6789", "1234"] {
        let once = normalize_ssn(raw);
        assert_eq!(normalize_ssn(&once), once, "{}", raw);
    }
    for raw in ["33101", "331011234", "33101-1234", "3310"] {
        let once = normalize_zip(raw);
        assert_eq!(normalize_zip(&once), once, "{}", raw);
    }
}
