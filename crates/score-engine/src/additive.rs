use std::collections::BTreeMap;

use tracing::debug;

use score_model::{
    AdditiveRules, AnswerSet, Contribution, FieldValue, NumericBand, Outcome, PointTable, Points,
    Result, Scheme, ScoreError, ScoreOutcome,
};

use crate::{Evaluate, bounded_total};

impl Evaluate for AdditiveRules {
    fn evaluate(&self, scheme: &Scheme, answers: &AnswerSet) -> Result<Outcome> {
        let mut contributions = Vec::new();
        for table in &self.tables {
            let Some(value) = answers.get(&table.field) else {
                continue;
            };
            let points = table_points(table, value)?;
            contributions.push(Contribution::new(&table.field, points));
        }
        for group in &self.groups {
            if group.all_of.iter().all(|p| p.matches(answers)) {
                contributions.push(Contribution::new(&group.id, group.points));
            }
        }

        let score = bounded_total(scheme, &contributions, self.min, self.max)?;

        let modifiers: BTreeMap<String, FieldValue> = self
            .modifiers
            .iter()
            .filter_map(|id| answers.get(id).map(|v| (id.clone(), v.clone())))
            .collect();
        debug!(
            scheme = %scheme.id,
            contributions = contributions.len(),
            modifiers = modifiers.len(),
            "additive score computed"
        );

        Ok(Outcome::Score(ScoreOutcome {
            score,
            contributions,
            bucket: scheme.bucket_for(score).map(|b| b.label.clone()),
            modifiers,
            findings: Vec::new(),
        }))
    }
}

fn table_points(table: &PointTable, value: &FieldValue) -> Result<i64> {
    let unscored = |reason: &str| ScoreError::InvalidFieldValue {
        field: table.field.clone(),
        value: value.to_string(),
        reason: reason.to_string(),
    };
    match &table.points {
        Points::Options(points) => value
            .as_choice()
            .and_then(|choice| points.get(choice).copied())
            .ok_or_else(|| unscored("no points for this option")),
        Points::Bands(bands) => {
            let number = value
                .as_number()
                .filter(|n| n.is_finite())
                .ok_or_else(|| unscored("expected a finite number"))?;
            band_points(bands, number).ok_or_else(|| unscored("no band matches"))
        }
    }
}

/// Points of the first band whose test holds; a band without a test matches
/// anything.
fn band_points(bands: &[NumericBand], number: f64) -> Option<i64> {
    bands
        .iter()
        .find(|band| band.test.is_none_or(|test| test.holds(number)))
        .map(|band| band.points)
}
