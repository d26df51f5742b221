//! TOML scheme definition format.
//!
//! A definition file has a `[scheme]` header, an ordered `[[fields]]` list,
//! exactly one rule section matching the header's strategy (`[tabular]`,
//! `[additive]` or `[threshold]`) and optional `[[buckets]]`.
//!
//! ```toml
//! [scheme]
//! id = "tnm-adrenal"
//! name = "Adrenal cortical carcinoma TNM stage grouping"
//! version = "AJCC 8"
//! category = "tnm"
//! strategy = "tabular"
//!
//! [[fields]]
//! id = "t"
//! type = "choice"
//! options = [{ value = "T1" }, { value = "T2" }]
//!
//! [tabular]
//! table = """
//! t,stage
//! T1,I
//! T2,II
//! """
//! ```
//!
//! Stage tables are CSV: one column per constrained field followed by a
//! `stage` column. `*` (or an empty cell) accepts any answer and `|`
//! separates alternatives.

use std::collections::BTreeMap;

use serde::Deserialize;

use score_model::{
    AdditiveRules, BonusGroup, Bucket, ChoiceOption, Comparison, Condition, DecisionStep,
    ExtractSpec, Field, FieldKind, NumericBand, NumericTest, PointTable, Points, Predicate,
    RuleSet, Scheme, StageConstraint, StageRow, Strategy, TabularRules, Test, ThresholdRules,
};

use crate::error::{Result, SchemeError};

const STAGE_COLUMN: &str = "stage";
const ANY_VALUE: &str = "*";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemeFile {
    pub scheme: SchemeHeader,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub tabular: Option<TabularDef>,
    #[serde(default)]
    pub additive: Option<AdditiveDef>,
    #[serde(default)]
    pub threshold: Option<ThresholdDef>,
    #[serde(default)]
    pub buckets: Vec<BucketDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemeHeader {
    pub id: String,
    pub name: String,
    pub version: String,
    pub category: String,
    pub strategy: String,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default)]
    pub required_when: Vec<ConditionDef>,
    #[serde(default)]
    pub options: Vec<OptionDef>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub extract: Option<ExtractDef>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionDef {
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractDef {
    #[serde(default)]
    pub anchors: Vec<String>,
    #[serde(default)]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionDef {
    pub all_of: Vec<PredicateDef>,
}

/// `{ field = "t2_signal", is = ["low"] }` or `{ field = "ader", gt = 1.5 }`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredicateDef {
    pub field: String,
    #[serde(default)]
    pub is: Option<Vec<String>>,
    #[serde(default)]
    pub lt: Option<f64>,
    #[serde(default)]
    pub le: Option<f64>,
    #[serde(default)]
    pub gt: Option<f64>,
    #[serde(default)]
    pub ge: Option<f64>,
    #[serde(default)]
    pub eq: Option<f64>,
}

impl PredicateDef {
    fn tests(&self) -> Vec<NumericTest> {
        numeric_tests([self.lt, self.le, self.gt, self.ge, self.eq])
    }
}

/// Comparisons in `lt, le, gt, ge, eq` order.
fn numeric_tests(values: [Option<f64>; 5]) -> Vec<NumericTest> {
    [
        Comparison::Lt,
        Comparison::Le,
        Comparison::Gt,
        Comparison::Ge,
        Comparison::Eq,
    ]
    .into_iter()
    .zip(values)
    .filter_map(|(op, value)| value.map(|v| NumericTest::new(op, v)))
    .collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TabularDef {
    pub table: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdditiveDef {
    pub min: i64,
    pub max: i64,
    #[serde(default)]
    pub points: Vec<PointTableDef>,
    #[serde(default)]
    pub groups: Vec<GroupDef>,
    #[serde(default)]
    pub modifiers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointTableDef {
    pub field: String,
    #[serde(default)]
    pub options: Option<BTreeMap<String, i64>>,
    #[serde(default)]
    pub bands: Option<Vec<BandDef>>,
}

/// A band without a comparison is the catch-all.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandDef {
    pub points: i64,
    #[serde(default)]
    pub lt: Option<f64>,
    #[serde(default)]
    pub le: Option<f64>,
    #[serde(default)]
    pub gt: Option<f64>,
    #[serde(default)]
    pub ge: Option<f64>,
    #[serde(default)]
    pub eq: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupDef {
    pub id: String,
    pub all_of: Vec<PredicateDef>,
    pub points: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdDef {
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
    pub steps: Vec<StepDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepDef {
    pub id: String,
    #[serde(default)]
    pub when: Vec<PredicateDef>,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub terminal: bool,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub finding: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BucketDef {
    pub min: i64,
    pub max: i64,
    pub label: String,
}

/// Parse a TOML definition into a scheme. Structural problems (wrong field
/// type, malformed predicate, missing rule section) are reported here;
/// cross-references are checked by [`crate::consistency::check_scheme`].
pub fn parse_scheme(text: &str, origin: &str) -> Result<Scheme> {
    let file: SchemeFile = toml::from_str(text).map_err(|source| SchemeError::Toml {
        origin: origin.to_string(),
        source,
    })?;
    file.into_scheme()
}

impl SchemeFile {
    pub fn into_scheme(self) -> Result<Scheme> {
        let id = self.scheme.id.trim().to_string();
        if id.is_empty() {
            return Err(SchemeError::definition("<unnamed>", "scheme id must not be empty"));
        }
        let strategy: Strategy = self
            .scheme
            .strategy
            .parse()
            .map_err(|message: String| SchemeError::definition(&id, message))?;

        let fields = self
            .fields
            .into_iter()
            .map(|f| f.into_field(&id))
            .collect::<Result<Vec<_>>>()?;

        let rules = match (strategy, self.tabular, self.additive, self.threshold) {
            (Strategy::Tabular, Some(tabular), None, None) => {
                RuleSet::Tabular(parse_stage_table(&id, &tabular.table)?)
            }
            (Strategy::Additive, None, Some(additive), None) => {
                RuleSet::Additive(additive.into_rules(&id)?)
            }
            (Strategy::Threshold, None, None, Some(threshold)) => {
                RuleSet::Threshold(threshold.into_rules(&id)?)
            }
            (strategy, ..) => {
                return Err(SchemeError::definition(
                    &id,
                    format!("expected exactly one [{strategy}] rule section"),
                ));
            }
        };

        let buckets = self
            .buckets
            .into_iter()
            .map(|b| Bucket {
                min: b.min,
                max: b.max,
                label: b.label,
            })
            .collect();

        Ok(Scheme {
            id,
            name: self.scheme.name,
            version: self.scheme.version,
            category: self.scheme.category,
            source: self.scheme.source,
            fields,
            rules,
            buckets,
        })
    }
}

impl FieldDef {
    fn into_field(self, scheme: &str) -> Result<Field> {
        let kind = match self.kind.trim() {
            "choice" => FieldKind::Choice {
                options: self
                    .options
                    .into_iter()
                    .map(|o| ChoiceOption {
                        value: o.value,
                        label: o.label,
                        synonyms: o.synonyms,
                    })
                    .collect(),
            },
            "bounded_number" => match (self.min, self.max) {
                (Some(min), Some(max)) => FieldKind::BoundedNumber { min, max },
                _ => {
                    return Err(SchemeError::definition(
                        scheme,
                        format!("field {} needs both min and max", self.id),
                    ));
                }
            },
            "number" => FieldKind::Number,
            "date" => FieldKind::Date,
            other => {
                return Err(SchemeError::definition(
                    scheme,
                    format!("field {} has unknown type '{other}'", self.id),
                ));
            }
        };

        let required_when = self
            .required_when
            .into_iter()
            .map(|c| {
                let all_of = c
                    .all_of
                    .into_iter()
                    .map(|p| p.into_predicate(scheme))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Condition::new(all_of))
            })
            .collect::<Result<Vec<_>>>()?;

        let extract = self.extract.map(|e| ExtractSpec {
            anchors: e.anchors,
            pattern: e.pattern,
        });

        Ok(Field {
            label: self.label.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            kind,
            required: self.required,
            required_when,
            unit: self.unit,
            extract,
        })
    }
}

impl PredicateDef {
    fn into_predicate(self, scheme: &str) -> Result<Predicate> {
        let mut tests = self.tests();
        let test = match (self.is, tests.len()) {
            (Some(values), 0) => Test::OneOf(values),
            (None, 1) => Test::Compare(tests.remove(0)),
            _ => {
                return Err(SchemeError::definition(
                    scheme,
                    format!(
                        "predicate on {} must use exactly one of is, lt, le, gt, ge, eq",
                        self.field
                    ),
                ));
            }
        };
        Ok(Predicate {
            field: self.field,
            test,
        })
    }
}

impl AdditiveDef {
    fn into_rules(self, scheme: &str) -> Result<AdditiveRules> {
        let tables = self
            .points
            .into_iter()
            .map(|t| {
                let points = match (t.options, t.bands) {
                    (Some(options), None) => Points::Options(options),
                    (None, Some(bands)) => Points::Bands(
                        bands
                            .into_iter()
                            .map(|b| band(scheme, &t.field, b))
                            .collect::<Result<Vec<_>>>()?,
                    ),
                    _ => {
                        return Err(SchemeError::definition(
                            scheme,
                            format!("points for {} need exactly one of options or bands", t.field),
                        ));
                    }
                };
                Ok(PointTable {
                    field: t.field,
                    points,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let groups = self
            .groups
            .into_iter()
            .map(|g| {
                Ok(BonusGroup {
                    id: g.id,
                    all_of: g
                        .all_of
                        .into_iter()
                        .map(|p| p.into_predicate(scheme))
                        .collect::<Result<Vec<_>>>()?,
                    points: g.points,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(AdditiveRules {
            min: self.min,
            max: self.max,
            tables,
            groups,
            modifiers: self.modifiers,
        })
    }
}

fn band(scheme: &str, field: &str, def: BandDef) -> Result<NumericBand> {
    let mut tests = numeric_tests([def.lt, def.le, def.gt, def.ge, def.eq]);
    if tests.len() > 1 {
        return Err(SchemeError::definition(
            scheme,
            format!("band for {field} must use at most one comparison"),
        ));
    }
    Ok(NumericBand {
        test: tests.pop(),
        points: def.points,
    })
}

impl ThresholdDef {
    fn into_rules(self, scheme: &str) -> Result<ThresholdRules> {
        let steps = self
            .steps
            .into_iter()
            .map(|s| {
                Ok(DecisionStep {
                    id: s.id,
                    when: s
                        .when
                        .into_iter()
                        .map(|p| p.into_predicate(scheme))
                        .collect::<Result<Vec<_>>>()?,
                    points: s.points,
                    terminal: s.terminal,
                    bucket: s.bucket,
                    finding: s.finding,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ThresholdRules {
            steps,
            min: self.min,
            max: self.max,
        })
    }
}

/// Parse an embedded CSV stage table into ordered stage rows.
fn parse_stage_table(scheme: &str, table: &str) -> Result<TabularRules> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(table.trim().as_bytes());

    let csv_error = |source| SchemeError::Csv {
        scheme: scheme.to_string(),
        source,
    };

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();
    let Some((last, field_columns)) = headers.split_last() else {
        return Err(SchemeError::definition(scheme, "stage table has no header"));
    };
    if last != STAGE_COLUMN {
        return Err(SchemeError::definition(
            scheme,
            format!("last stage table column must be '{STAGE_COLUMN}', found '{last}'"),
        ));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let mut constraints = Vec::new();
        for (column, cell) in field_columns.iter().zip(record.iter()) {
            if cell.is_empty() || cell == ANY_VALUE {
                continue;
            }
            constraints.push(StageConstraint {
                field: column.clone(),
                allowed: cell.split('|').map(|v| v.trim().to_string()).collect(),
            });
        }
        let stage = record.get(field_columns.len()).unwrap_or_default().to_string();
        if stage.is_empty() {
            return Err(SchemeError::definition(
                scheme,
                format!("stage table row {} has an empty stage", rows.len() + 1),
            ));
        }
        rows.push(StageRow { stage, constraints });
    }
    Ok(TabularRules { rows })
}
