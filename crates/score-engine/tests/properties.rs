use proptest::prelude::*;
use score_engine::evaluate;
use score_model::{AnswerSet, FieldValue, Outcome};
use score_schemes::SchemeStore;

const EXOPHYTIC: [(&str, i64); 3] = [("ge50", 1), ("lt50", 2), ("endophytic", 3)];
const LOCATION: [(&str, i64); 3] = [("polar", 1), ("crosses_polar_line", 2), ("interpolar", 3)];

fn radius_points(cm: f64) -> i64 {
    if cm <= 4.0 {
        1
    } else if cm < 7.0 {
        2
    } else {
        3
    }
}

fn nearness_points(mm: f64) -> i64 {
    if mm >= 7.0 {
        1
    } else if mm > 4.0 {
        2
    } else {
        3
    }
}

fn renal_answers(radius: f64, exophytic: usize, nearness: f64, location: usize) -> AnswerSet {
    [
        ("radius", FieldValue::Number(radius)),
        ("exophytic", FieldValue::choice(EXOPHYTIC[exophytic].0)),
        ("nearness", FieldValue::Number(nearness)),
        ("anterior_posterior", FieldValue::choice("x")),
        ("location", FieldValue::choice(LOCATION[location].0)),
    ]
    .into_iter()
    .collect()
}

proptest! {
    #[test]
    fn renal_score_is_the_sum_of_field_points(
        radius in 0.1f64..40.0,
        exophytic in 0usize..3,
        nearness in 0.0f64..100.0,
        location in 0usize..3,
    ) {
        let store = SchemeStore::builtin().unwrap();
        let renal = store.get_scheme("renal").unwrap();
        let answers = renal_answers(radius, exophytic, nearness, location);

        let first = evaluate(&renal, &answers).unwrap();
        let second = evaluate(&renal, &answers).unwrap();
        prop_assert_eq!(&first, &second);

        let expected = radius_points(radius)
            + EXOPHYTIC[exophytic].1
            + nearness_points(nearness)
            + LOCATION[location].1;
        prop_assert_eq!(first.score(), Some(expected));
    }

    #[test]
    fn changing_one_field_moves_score_by_its_point_difference(
        radius in 0.1f64..40.0,
        nearness in 0.0f64..100.0,
        location in 0usize..3,
        from in 0usize..3,
        to in 0usize..3,
    ) {
        let store = SchemeStore::builtin().unwrap();
        let renal = store.get_scheme("renal").unwrap();
        let before = evaluate(&renal, &renal_answers(radius, from, nearness, location)).unwrap();
        let after = evaluate(&renal, &renal_answers(radius, to, nearness, location)).unwrap();

        let (Outcome::Score(before), Outcome::Score(after)) = (before.outcome, after.outcome) else {
            panic!("renal is additive");
        };
        prop_assert_eq!(after.score - before.score, EXOPHYTIC[to].1 - EXOPHYTIC[from].1);
    }

    #[test]
    fn stage_grouping_is_deterministic(t in 0usize..4, n in 0usize..2, m in 0usize..2) {
        let store = SchemeStore::builtin().unwrap();
        let adrenal = store.get_scheme("tnm-adrenal").unwrap();
        let answers: AnswerSet = [
            ("t", FieldValue::choice(["T1", "T2", "T3", "T4"][t])),
            ("n", FieldValue::choice(["N0", "N1"][n])),
            ("m", FieldValue::choice(["M0", "M1"][m])),
        ]
        .into_iter()
        .collect();
        let first = evaluate(&adrenal, &answers).unwrap();
        prop_assert_eq!(first.clone(), evaluate(&adrenal, &answers).unwrap());
        if m == 1 {
            prop_assert_eq!(first.stage(), Some("IV"));
        }
    }
}
