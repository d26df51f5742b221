//! Load-time consistency checks.
//!
//! Every reference inside a scheme is resolved before the scheme becomes
//! visible: rule fields must be declared, option values must exist, numeric
//! tests must target numeric fields and extraction patterns must compile.
//! A scheme with any issue is rejected as a whole.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;

use score_model::{
    AdditiveRules, ChoiceOption, Field, FieldKind, Points, Predicate, RuleSet, Scheme,
    TabularRules, Test, ThresholdRules,
};

use crate::error::{Result, SchemeError};

/// Check a scheme and return [`SchemeError::Inconsistent`] listing every
/// issue found.
pub fn check_scheme(scheme: &Scheme) -> Result<()> {
    let issues = collect_issues(scheme);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(SchemeError::Inconsistent {
            scheme: scheme.id.clone(),
            issues,
        })
    }
}

pub fn collect_issues(scheme: &Scheme) -> Vec<String> {
    let mut issues = Vec::new();
    if scheme.fields.is_empty() {
        issues.push("scheme declares no fields".to_string());
    }

    let mut seen = BTreeSet::new();
    for field in &scheme.fields {
        if field.id.trim().is_empty() {
            issues.push("field with empty id".to_string());
        }
        if !seen.insert(field.id.as_str()) {
            issues.push(format!("duplicate field id {}", field.id));
        }
        check_field(scheme, field, &mut issues);
    }

    match &scheme.rules {
        RuleSet::Tabular(rules) => check_tabular(scheme, rules, &mut issues),
        RuleSet::Additive(rules) => check_additive(scheme, rules, &mut issues),
        RuleSet::Threshold(rules) => check_threshold(scheme, rules, &mut issues),
    }

    check_buckets(scheme, &mut issues);
    issues
}

fn check_field(scheme: &Scheme, field: &Field, issues: &mut Vec<String>) {
    match &field.kind {
        FieldKind::Choice { options } => {
            if options.is_empty() {
                issues.push(format!("choice field {} has no options", field.id));
            }
            let mut values = BTreeSet::new();
            for option in options {
                if option.value.trim().is_empty() {
                    issues.push(format!("field {} has an empty option value", field.id));
                }
                if !values.insert(option.value.as_str()) {
                    issues.push(format!(
                        "field {} declares option {} twice",
                        field.id, option.value
                    ));
                }
            }
            check_option_terms(field, options, issues);
        }
        FieldKind::BoundedNumber { min, max } => {
            if !min.is_finite() || !max.is_finite() || min > max {
                issues.push(format!(
                    "field {} has an invalid range [{min}, {max}]",
                    field.id
                ));
            }
        }
        FieldKind::Number | FieldKind::Date => {}
    }

    for condition in &field.required_when {
        for predicate in &condition.all_of {
            check_predicate(scheme, predicate, &format!("required_when of {}", field.id), issues);
        }
    }

    if let Some(pattern) = field.extract.as_ref().and_then(|e| e.pattern.as_deref()) {
        match Regex::new(pattern) {
            Ok(regex) if regex.captures_len() < 2 => issues.push(format!(
                "extraction pattern of {} has no capture group",
                field.id
            )),
            Ok(_) => {}
            Err(e) => issues.push(format!("extraction pattern of {} is invalid: {e}", field.id)),
        }
    }
}

/// Values, labels and synonyms are matched case-insensitively, so one
/// spelling may name only one option.
fn check_option_terms(field: &Field, options: &[ChoiceOption], issues: &mut Vec<String>) {
    let mut owners: BTreeMap<String, &str> = BTreeMap::new();
    for option in options {
        for term in option.terms() {
            let key = term.trim().to_lowercase();
            match owners.get(&key) {
                Some(&owner) if owner != option.value => issues.push(format!(
                    "field {} options {owner} and {} share the term '{}'",
                    field.id,
                    option.value,
                    term.trim()
                )),
                Some(_) => {}
                None => {
                    owners.insert(key, option.value.as_str());
                }
            }
        }
    }
}

fn check_predicate(scheme: &Scheme, predicate: &Predicate, context: &str, issues: &mut Vec<String>) {
    let Some(field) = scheme.field(&predicate.field) else {
        issues.push(format!("{context} references unknown field {}", predicate.field));
        return;
    };
    match &predicate.test {
        Test::OneOf(values) => {
            if !matches!(field.kind, FieldKind::Choice { .. }) {
                issues.push(format!(
                    "{context} tests options of non-choice field {}",
                    field.id
                ));
                return;
            }
            if values.is_empty() {
                issues.push(format!("{context} lists no values for {}", field.id));
            }
            for value in values {
                if !field.has_option(value) {
                    issues.push(format!(
                        "{context} references undeclared option {} of {}",
                        value, field.id
                    ));
                }
            }
        }
        Test::Compare(test) => {
            if !field.kind.is_numeric() {
                issues.push(format!(
                    "{context} compares non-numeric field {}",
                    field.id
                ));
            }
            if !test.value.is_finite() {
                issues.push(format!("{context} compares {} against a non-finite value", field.id));
            }
        }
    }
}

fn check_tabular(scheme: &Scheme, rules: &TabularRules, issues: &mut Vec<String>) {
    if rules.rows.is_empty() {
        issues.push("stage table has no rows".to_string());
    }
    for (index, row) in rules.rows.iter().enumerate() {
        let context = format!("stage row {} ({})", index + 1, row.stage);
        for constraint in &row.constraints {
            let Some(field) = scheme.field(&constraint.field) else {
                issues.push(format!(
                    "{context} references unknown field {}",
                    constraint.field
                ));
                continue;
            };
            if !matches!(field.kind, FieldKind::Choice { .. }) {
                issues.push(format!("{context} constrains non-choice field {}", field.id));
                continue;
            }
            for value in &constraint.allowed {
                if !field.has_option(value) {
                    issues.push(format!(
                        "{context} references undeclared option {} of {}",
                        value, field.id
                    ));
                }
            }
        }
    }
    if !scheme.buckets.is_empty() {
        issues.push("buckets are only meaningful for scored schemes".to_string());
    }
}

fn check_additive(scheme: &Scheme, rules: &AdditiveRules, issues: &mut Vec<String>) {
    if rules.min > rules.max {
        issues.push(format!(
            "additive bounds [{}, {}] are inverted",
            rules.min, rules.max
        ));
    }

    let mut scored = BTreeSet::new();
    for table in &rules.tables {
        let Some(field) = scheme.field(&table.field) else {
            issues.push(format!("points reference unknown field {}", table.field));
            continue;
        };
        if !scored.insert(field.id.as_str()) {
            issues.push(format!("field {} has more than one point table", field.id));
        }
        match &table.points {
            Points::Options(points) => {
                if !matches!(field.kind, FieldKind::Choice { .. }) {
                    issues.push(format!("option points on non-choice field {}", field.id));
                    continue;
                }
                for value in points.keys() {
                    if !field.has_option(value) {
                        issues.push(format!(
                            "points reference undeclared option {} of {}",
                            value, field.id
                        ));
                    }
                }
                for option in field.options() {
                    if !points.contains_key(&option.value) {
                        issues.push(format!(
                            "option {} of {} has no points",
                            option.value, field.id
                        ));
                    }
                }
            }
            Points::Bands(bands) => {
                if !field.kind.is_numeric() {
                    issues.push(format!("numeric bands on non-numeric field {}", field.id));
                }
                match bands.split_last() {
                    Some((last, rest)) => {
                        if last.test.is_some() {
                            issues.push(format!(
                                "bands of {} must end with a catch-all band",
                                field.id
                            ));
                        }
                        if rest.iter().any(|b| b.test.is_none()) {
                            issues.push(format!(
                                "bands of {} have a catch-all before the last band",
                                field.id
                            ));
                        }
                    }
                    None => issues.push(format!("field {} has no bands", field.id)),
                }
            }
        }
    }

    for group in &rules.groups {
        if group.all_of.is_empty() {
            issues.push(format!("bonus group {} has no predicates", group.id));
        }
        for predicate in &group.all_of {
            check_predicate(scheme, predicate, &format!("bonus group {}", group.id), issues);
        }
    }

    for modifier in &rules.modifiers {
        if scheme.field(modifier).is_none() {
            issues.push(format!("modifier references unknown field {modifier}"));
        } else if scored.contains(modifier.as_str()) {
            issues.push(format!("modifier {modifier} also has a point table"));
        }
    }
}

fn check_threshold(scheme: &Scheme, rules: &ThresholdRules, issues: &mut Vec<String>) {
    if rules.steps.is_empty() {
        issues.push("threshold scheme has no decision steps".to_string());
    }
    if let (Some(min), Some(max)) = (rules.min, rules.max)
        && min > max
    {
        issues.push(format!("threshold bounds [{min}, {max}] are inverted"));
    }
    let mut ids = BTreeSet::new();
    for step in &rules.steps {
        if !ids.insert(step.id.as_str()) {
            issues.push(format!("duplicate decision step {}", step.id));
        }
        for predicate in &step.when {
            check_predicate(scheme, predicate, &format!("decision step {}", step.id), issues);
        }
        if step.bucket.is_some() && !step.terminal {
            issues.push(format!("non-terminal step {} names a bucket", step.id));
        }
    }
}

fn check_buckets(scheme: &Scheme, issues: &mut Vec<String>) {
    for bucket in &scheme.buckets {
        if bucket.min > bucket.max {
            issues.push(format!(
                "bucket {} has inverted bounds [{}, {}]",
                bucket.label, bucket.min, bucket.max
            ));
        }
    }
    let mut sorted: Vec<_> = scheme.buckets.iter().collect();
    sorted.sort_by_key(|b| b.min);
    for pair in sorted.windows(2) {
        if pair[1].min <= pair[0].max {
            issues.push(format!(
                "buckets {} and {} overlap",
                pair[0].label, pair[1].label
            ));
        }
    }
}
