use std::collections::BTreeMap;

use score_model::SchemeSummary;

use crate::store::{SchemeStore, VerifySummary};

/// Machine-readable description of a loaded scheme store.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DoctorReport {
    pub schema: String,
    pub schema_version: u32,
    /// `embedded` or the verified scheme directory.
    pub source: String,
    pub counts: DoctorCounts,
    pub schemes: Vec<SchemeSummary>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DoctorCounts {
    pub files: usize,
    pub schemes: usize,
    pub fields: usize,
    pub extractable_fields: usize,
    pub by_strategy: BTreeMap<String, usize>,
    pub by_field_kind: BTreeMap<String, usize>,
}

impl DoctorReport {
    pub fn for_store(store: &SchemeStore, source: impl Into<String>, files: usize) -> Self {
        let mut by_strategy = BTreeMap::new();
        let mut by_field_kind = BTreeMap::new();
        let mut fields = 0;
        let mut extractable_fields = 0;
        for scheme in store.schemes() {
            *by_strategy.entry(scheme.strategy().to_string()).or_insert(0) += 1;
            for field in &scheme.fields {
                fields += 1;
                if field.extract.as_ref().is_some_and(|e| !e.is_empty()) {
                    extractable_fields += 1;
                }
                *by_field_kind
                    .entry(field.kind.as_str().to_string())
                    .or_insert(0) += 1;
            }
        }

        Self {
            schema: "score-report.schemes-doctor".to_string(),
            schema_version: 1,
            source: source.into(),
            counts: DoctorCounts {
                files,
                schemes: store.len(),
                fields,
                extractable_fields,
                by_strategy,
                by_field_kind,
            },
            schemes: store.list_schemes(),
        }
    }

    pub fn from_verify_summary(store: &SchemeStore, summary: &VerifySummary) -> Self {
        Self::for_store(
            store,
            summary.schemes_dir.display().to_string(),
            summary.file_count,
        )
    }
}
