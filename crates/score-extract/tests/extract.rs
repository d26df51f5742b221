use score_extract::{DropReason, DroppedField, Extractor, extract, extract_with_report};
use score_model::FieldValue;
use score_schemes::SchemeStore;

fn store() -> SchemeStore {
    SchemeStore::builtin().unwrap()
}

#[test]
fn tumor_size_fills_only_radius() {
    let store = store();
    let renal = store.get_scheme("renal").unwrap();
    let answers = extract(&renal, "tumor size 4.2 cm");
    assert_eq!(answers.len(), 1);
    assert_eq!(answers.get("radius"), Some(&FieldValue::Number(4.2)));
}

#[test]
fn anchors_are_case_insensitive_and_line_bounded() {
    let store = store();
    let renal = store.get_scheme("renal").unwrap();
    let text = "Findings:\nTumor Size: 3.1 x 2.8 cm\nDistance to collecting system: 6 mm\nGrowth pattern: partially exophytic";
    let answers = extract(&renal, text);
    assert_eq!(answers.number("radius"), Some(3.1));
    assert_eq!(answers.number("nearness"), Some(6.0));
    assert_eq!(answers.choice("exophytic"), Some("lt50"));
    assert!(!answers.contains("location"));
}

#[test]
fn out_of_range_value_is_dropped() {
    let store = store();
    let renal = store.get_scheme("renal").unwrap();
    let report = extract_with_report(&renal, "tumor size 55 cm");
    assert!(report.answers.is_empty());
    assert_eq!(
        report.dropped,
        vec![DroppedField {
            field: "radius".to_string(),
            reason: DropReason::Invalid,
        }]
    );
}

#[test]
fn conflicting_sizes_are_not_guessed() {
    let store = store();
    let renal = store.get_scheme("renal").unwrap();
    let report = extract_with_report(&renal, "tumor size 4.2 cm\nmaximal diameter 5.0 cm");
    assert!(!report.answers.contains("radius"));
    assert_eq!(report.dropped[0].reason, DropReason::Conflicting);
}

#[test]
fn repeated_agreeing_mentions_are_kept() {
    let store = store();
    let renal = store.get_scheme("renal").unwrap();
    let answers = extract(&renal, "tumor size 4.2 cm\nmaximal diameter 4.2 cm");
    assert_eq!(answers.number("radius"), Some(4.2));
}

#[test]
fn ambiguous_option_window_is_dropped() {
    let store = store();
    let ccls = store.get_scheme("ccls").unwrap();
    let report = extract_with_report(&ccls, "T2 signal: high or low, enhancement: marked");
    assert!(!report.answers.contains("t2_signal"));
    assert!(report.dropped.contains(&DroppedField {
        field: "t2_signal".to_string(),
        reason: DropReason::Ambiguous,
    }));
    // enhancement sits in the same line window as the t2 anchor but has its own anchor
    assert_eq!(report.answers.choice("enhancement"), Some("marked"));
}

#[test]
fn compact_tnm_string_is_split_into_components() {
    let store = store();
    let kidney = store.get_scheme("tnm-kidney").unwrap();
    let report = Extractor::new(&kidney).extract_with_report("Pathologic stage: pT2aN0M0.");
    insta::assert_json_snapshot!(report, @r#"
    {
      "answers": {
        "m": {
          "choice": "M0"
        },
        "n": {
          "choice": "N0"
        },
        "t": {
          "choice": "T2a"
        }
      },
      "dropped": []
    }
    "#);
}

#[test]
fn clinical_and_pathologic_t_disagree() {
    let store = store();
    let kidney = store.get_scheme("tnm-kidney").unwrap();
    let report = extract_with_report(&kidney, "cT1b on CT, pT3a N0 M0 after nephrectomy");
    assert!(!report.answers.contains("t"));
    assert_eq!(report.answers.choice("n"), Some("N0"));
    assert_eq!(report.answers.choice("m"), Some("M0"));
}

#[test]
fn text_without_anchors_yields_nothing() {
    let store = store();
    for scheme in store.schemes() {
        let report = extract_with_report(scheme, "No focal renal lesion.");
        assert!(report.answers.is_empty(), "{}", scheme.id);
    }
}

#[test]
fn t_category_is_not_read_from_inside_words() {
    let store = store();
    let bladder = store.get_scheme("tnm-bladder").unwrap();
    for text in [
        "Important: no nodal disease, N0 M0.",
        "Patient acceptance of cystoscopy was good. N0 M0",
    ] {
        let report = extract_with_report(&bladder, text);
        assert!(!report.answers.contains("t"), "{text}");
        assert!(report.dropped.is_empty(), "{text}");
        assert_eq!(report.answers.choice("n"), Some("N0"));
        assert_eq!(report.answers.choice("m"), Some("M0"));
    }
}

#[test]
fn nodal_and_metastasis_need_a_word_start() {
    let store = store();
    let bladder = store.get_scheme("tnm-bladder").unwrap();
    let answers = extract(&bladder, "Sample ID AN1 and batch XM1 received; cTa pN0 cM0");
    assert_eq!(answers.choice("t"), Some("Ta"));
    assert_eq!(answers.choice("n"), Some("N0"));
    assert_eq!(answers.choice("m"), Some("M0"));
}

#[test]
fn millimetre_size_is_converted_to_centimetres() {
    let store = store();
    let renal = store.get_scheme("renal").unwrap();
    let answers = extract(&renal, "tumor size 28 mm");
    assert_eq!(answers.number("radius"), Some(2.8));
}

#[test]
fn centimetre_distance_is_converted_to_millimetres() {
    let store = store();
    let renal = store.get_scheme("renal").unwrap();
    let answers = extract(&renal, "distance to collecting system 0.5 cm");
    assert_eq!(answers.number("nearness"), Some(5.0));
}

#[test]
fn anchor_at_line_end_does_not_read_the_next_line() {
    let store = store();
    let renal = store.get_scheme("renal").unwrap();
    let report = extract_with_report(&renal, "Tumor size\nlesion 3 of 5 images");
    assert!(report.answers.is_empty());
    assert!(report.dropped.is_empty());
}
