use tracing::debug;

use score_model::{AnswerSet, Outcome, Result, Scheme, ScoreError, StageOutcome, TabularRules};

use crate::Evaluate;

impl Evaluate for TabularRules {
    /// First row whose every constraint holds wins.
    fn evaluate(&self, scheme: &Scheme, answers: &AnswerSet) -> Result<Outcome> {
        let (index, row) = self
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.matches(answers))
            .ok_or_else(|| ScoreError::NoStageMatch {
                scheme: scheme.id.clone(),
            })?;
        debug!(scheme = %scheme.id, row = index, "stage row matched");

        let components = row
            .constraints
            .iter()
            .filter_map(|c| answers.get(&c.field).map(|v| (c.field.clone(), v.clone())))
            .collect();
        Ok(Outcome::Stage(StageOutcome {
            stage: row.stage.clone(),
            row: index,
            components,
        }))
    }
}
