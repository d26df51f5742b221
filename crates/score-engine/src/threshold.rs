use tracing::debug;

use score_model::{
    AnswerSet, Contribution, Outcome, Result, Scheme, ScoreOutcome, ThresholdRules,
};

use crate::{Evaluate, bounded_total};

impl Evaluate for ThresholdRules {
    /// Steps apply in declared order; the first applicable terminal step
    /// halts evaluation.
    fn evaluate(&self, scheme: &Scheme, answers: &AnswerSet) -> Result<Outcome> {
        let mut contributions = Vec::new();
        let mut findings = Vec::new();
        let mut terminal_bucket = None;
        let mut halted_at = None;

        for step in &self.steps {
            if !step.applies(answers) {
                continue;
            }
            contributions.push(Contribution::new(&step.id, step.points));
            if let Some(finding) = &step.finding {
                findings.push(finding.clone());
            }
            if step.terminal {
                terminal_bucket = step.bucket.clone();
                halted_at = Some(step.id.as_str());
                break;
            }
        }

        let score = bounded_total(
            scheme,
            &contributions,
            self.min.unwrap_or(i64::MIN),
            self.max.unwrap_or(i64::MAX),
        )?;
        debug!(
            scheme = %scheme.id,
            steps = contributions.len(),
            terminal = halted_at.unwrap_or("none"),
            "threshold score computed"
        );

        let bucket =
            terminal_bucket.or_else(|| scheme.bucket_for(score).map(|b| b.label.clone()));
        Ok(Outcome::Score(ScoreOutcome {
            score,
            contributions,
            bucket,
            modifiers: Default::default(),
            findings,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use score_model::{
        Bucket, Comparison, DecisionStep, Field, FieldValue, Predicate, RuleSet, ScoreError,
    };

    fn step(id: &str, when: Vec<Predicate>, points: i64, terminal: bool) -> DecisionStep {
        DecisionStep {
            id: id.to_string(),
            when,
            points,
            terminal,
            bucket: None,
            finding: None,
        }
    }

    fn scheme(steps: Vec<DecisionStep>) -> Scheme {
        Scheme {
            id: "mass".to_string(),
            name: "Mass".to_string(),
            version: "1".to_string(),
            category: "test".to_string(),
            source: None,
            fields: vec![
                Field::choice("macro_fat", &["yes", "no"]),
                Field::bounded("ader", 0.0, 20.0),
            ],
            rules: RuleSet::Threshold(ThresholdRules {
                steps,
                min: Some(1),
                max: Some(5),
            }),
            buckets: vec![
                Bucket {
                    min: 1,
                    max: 2,
                    label: "benign".to_string(),
                },
                Bucket {
                    min: 3,
                    max: 5,
                    label: "suspicious".to_string(),
                },
            ],
        }
    }

    fn run(scheme: &Scheme, answers: &AnswerSet) -> Result<Outcome> {
        let RuleSet::Threshold(rules) = &scheme.rules else {
            unreachable!()
        };
        rules.evaluate(scheme, answers)
    }

    #[test]
    fn terminal_step_halts_and_sets_bucket() {
        let mut halt = step(
            "fat",
            vec![Predicate::one_of("macro_fat", &["yes"])],
            1,
            true,
        );
        halt.bucket = Some("definitely benign".to_string());
        halt.finding = Some("angiomyolipoma".to_string());
        let scheme = scheme(vec![halt, step("never", Vec::new(), 4, false)]);
        let answers: AnswerSet = [("macro_fat", FieldValue::choice("yes"))]
            .into_iter()
            .collect();

        let Outcome::Score(outcome) = run(&scheme, &answers).unwrap() else {
            panic!("expected a score");
        };
        assert_eq!(outcome.score, 1);
        assert_eq!(outcome.bucket.as_deref(), Some("definitely benign"));
        assert_eq!(outcome.findings, vec!["angiomyolipoma"]);
        assert_eq!(outcome.contributions, vec![Contribution::new("fat", 1)]);
    }

    #[test]
    fn deltas_accumulate_and_map_through_bands() {
        let scheme = scheme(vec![
            step("base", Vec::new(), 2, false),
            step(
                "high-ader",
                vec![Predicate::compare("ader", Comparison::Gt, 1.5)],
                1,
                false,
            ),
        ]);
        let answers: AnswerSet = [("ader", FieldValue::Number(2.0))].into_iter().collect();
        let Outcome::Score(outcome) = run(&scheme, &answers).unwrap() else {
            panic!("expected a score");
        };
        assert_eq!(outcome.score, 3);
        assert_eq!(outcome.bucket.as_deref(), Some("suspicious"));
    }

    #[test]
    fn bounds_are_checked_when_declared() {
        let scheme = scheme(vec![step("base", Vec::new(), 9, false)]);
        let err = run(&scheme, &AnswerSet::new()).unwrap_err();
        assert!(matches!(err, ScoreError::ScoreOutOfBounds { score: 9, min: 1, max: 5, .. }));
    }

    #[test]
    fn overflowing_deltas_fail_without_bounds() {
        let mut scheme = scheme(vec![
            step("low", Vec::new(), i64::MIN, false),
            step("lower", Vec::new(), -1, false),
        ]);
        if let RuleSet::Threshold(rules) = &mut scheme.rules {
            rules.min = None;
            rules.max = None;
        }
        let err = run(&scheme, &AnswerSet::new()).unwrap_err();
        assert!(matches!(err, ScoreError::ScoreOutOfBounds { score: i64::MIN, .. }));
    }
}
