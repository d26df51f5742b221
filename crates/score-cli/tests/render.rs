use score_cli::render::{field_domain, requirement, result_rows, schemes_table};
use score_model::FieldValue;
use score_schemes::SchemeStore;

fn rows_text(rows: &[(String, String)]) -> String {
    rows.iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn renal_result_rows() {
    let store = SchemeStore::builtin().unwrap();
    let renal = store.get_scheme("renal").unwrap();
    let answers = [
        ("radius", FieldValue::Number(8.0)),
        ("exophytic", FieldValue::choice("ge50")),
        ("nearness", FieldValue::Number(5.0)),
        ("anterior_posterior", FieldValue::choice("p")),
        ("location", FieldValue::choice("polar")),
    ]
    .into_iter()
    .collect();
    let result = score_engine::score(&renal, &answers).unwrap();

    insta::assert_snapshot!(rows_text(&result_rows(&renal, &result)), @r"
    Scheme: R.E.N.A.L. nephrometry score (2009)
    Score: 7
    Category: moderate complexity
      radius: +3
      exophytic: +1
      nearness: +2
      location: +1
    Modifier anterior_posterior: p
    ");
}

#[test]
fn stage_result_rows_list_components() {
    let store = SchemeStore::builtin().unwrap();
    let adrenal = store.get_scheme("tnm-adrenal").unwrap();
    let answers = [
        ("t", FieldValue::choice("T1")),
        ("n", FieldValue::choice("N0")),
        ("m", FieldValue::choice("M1")),
    ]
    .into_iter()
    .collect();
    let result = score_engine::score(&adrenal, &answers).unwrap();
    let rows = result_rows(&adrenal, &result);
    assert_eq!(rows[1], ("Stage".to_string(), "IV".to_string()));
    assert!(rows.iter().any(|(label, value)| label == "  m" && value == "M1"));
}

#[test]
fn field_domains_and_requirements() {
    let store = SchemeStore::builtin().unwrap();
    let renal = store.get_scheme("renal").unwrap();
    assert_eq!(field_domain(renal.field("radius").unwrap()), "0.1..40 cm");
    assert_eq!(
        field_domain(renal.field("exophytic").unwrap()),
        "ge50 | lt50 | endophytic"
    );
    assert_eq!(requirement(renal.field("radius").unwrap()), "yes");
    assert_eq!(requirement(renal.field("hilar").unwrap()), "no");

    let ccls = store.get_scheme("ccls").unwrap();
    assert!(
        ccls.fields
            .iter()
            .any(|field| requirement(field) == "conditional")
    );
}

#[test]
fn schemes_table_has_one_row_per_scheme() {
    let store = SchemeStore::builtin().unwrap();
    let table = schemes_table(&store.list_schemes());
    assert_eq!(table.row_iter().count(), store.len());
    assert!(table.to_string().contains("tnm-kidney"));
}
