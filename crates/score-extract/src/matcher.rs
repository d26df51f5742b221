use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use score_model::{AnswerSet, Field, FieldKind, FieldValue, Scheme};

use crate::report::{DropReason, DroppedField, ExtractionReport};

/// Characters after an anchor that are searched for a value.
const WINDOW_CHARS: usize = 80;

static NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)(?:\s*(mm|cm)\b)?").expect("Invalid number regex")
});

static DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("Invalid date regex"));

/// Case-insensitive match of `term` not embedded in a longer word. The
/// term itself is capture group 1.
fn whole_term(term: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i)(?:^|[^\p{{L}}\p{{N}}])({})(?:$|[^\p{{L}}\p{{N}}])",
        regex::escape(term.trim())
    ))
}

struct OptionMatcher<'s> {
    value: &'s str,
    terms: Vec<Regex>,
}

struct FieldMatcher<'s> {
    field: &'s Field,
    pattern: Option<Regex>,
    anchors: Vec<Regex>,
    options: Vec<OptionMatcher<'s>>,
}

enum Candidates {
    None,
    Found(Vec<FieldValue>),
    Dropped(DropReason),
}

/// Extraction rules of one scheme, compiled once and reusable across
/// reports.
pub struct Extractor<'s> {
    scheme: &'s Scheme,
    fields: Vec<FieldMatcher<'s>>,
}

impl<'s> Extractor<'s> {
    pub fn new(scheme: &'s Scheme) -> Self {
        let fields = scheme
            .fields
            .iter()
            .filter_map(|field| {
                let spec = field.extract.as_ref().filter(|e| !e.is_empty())?;
                match compile(field, &spec.anchors, spec.pattern.as_deref()) {
                    Ok(matcher) => Some(matcher),
                    Err(e) => {
                        warn!(scheme = %scheme.id, field = %field.id, error = %e, "skipping field with invalid extraction rule");
                        None
                    }
                }
            })
            .collect();
        Self { scheme, fields }
    }

    pub fn extract(&self, raw_text: &str) -> AnswerSet {
        self.extract_with_report(raw_text).answers
    }

    pub fn extract_with_report(&self, raw_text: &str) -> ExtractionReport {
        let mut report = ExtractionReport::default();
        for matcher in &self.fields {
            match matcher.candidates(raw_text) {
                Candidates::None => {}
                Candidates::Found(values) => match values.split_first() {
                    Some((first, rest)) if rest.iter().all(|v| v == first) => {
                        report.answers.insert(&matcher.field.id, first.clone());
                    }
                    Some(_) => report.dropped.push(DroppedField {
                        field: matcher.field.id.clone(),
                        reason: DropReason::Conflicting,
                    }),
                    None => {}
                },
                Candidates::Dropped(reason) => report.dropped.push(DroppedField {
                    field: matcher.field.id.clone(),
                    reason,
                }),
            }
        }
        debug!(
            scheme = %self.scheme.id,
            extracted = report.answers.len(),
            dropped = report.dropped.len(),
            "extracted answers from report text"
        );
        report
    }
}

fn compile<'s>(
    field: &'s Field,
    anchors: &[String],
    pattern: Option<&str>,
) -> Result<FieldMatcher<'s>, regex::Error> {
    let pattern = pattern.map(Regex::new).transpose()?;
    let anchors = anchors
        .iter()
        .map(|a| whole_term(a))
        .collect::<Result<Vec<_>, _>>()?;
    let options = field
        .options()
        .iter()
        .map(|option| {
            Ok(OptionMatcher {
                value: option.value.as_str(),
                terms: option.terms().map(whole_term).collect::<Result<Vec<_>, _>>()?,
            })
        })
        .collect::<Result<Vec<_>, regex::Error>>()?;
    Ok(FieldMatcher {
        field,
        pattern,
        anchors,
        options,
    })
}

impl FieldMatcher<'_> {
    fn candidates(&self, text: &str) -> Candidates {
        let mut values = Vec::new();
        let mut saw_invalid = false;

        if let Some(pattern) = &self.pattern {
            for captures in pattern.captures_iter(text) {
                let Some(raw) = captures.get(1) else {
                    continue;
                };
                match self.field.parse(raw.as_str()) {
                    Ok(value) => values.push(value),
                    Err(_) => saw_invalid = true,
                }
            }
        }

        for anchor in &self.anchors {
            for hit in anchor.captures_iter(text).filter_map(|c| c.get(1)) {
                let window = window_after(text, hit.end());
                match self.from_window(&window) {
                    Ok(Some(value)) => values.push(value),
                    Ok(None) => {}
                    Err(DropReason::Ambiguous) => return Candidates::Dropped(DropReason::Ambiguous),
                    Err(_) => saw_invalid = true,
                }
            }
        }

        if !values.is_empty() {
            Candidates::Found(values)
        } else if saw_invalid {
            Candidates::Dropped(DropReason::Invalid)
        } else {
            Candidates::None
        }
    }

    fn from_window(&self, window: &str) -> Result<Option<FieldValue>, DropReason> {
        let raw = match &self.field.kind {
            FieldKind::Choice { .. } => {
                let mut hits = self
                    .options
                    .iter()
                    .filter(|o| o.terms.iter().any(|t| t.is_match(window)));
                return match (hits.next(), hits.next()) {
                    (Some(option), None) => Ok(Some(FieldValue::choice(option.value))),
                    (Some(_), Some(_)) => Err(DropReason::Ambiguous),
                    (None, _) => Ok(None),
                };
            }
            FieldKind::BoundedNumber { .. } | FieldKind::Number => {
                return self.number_from_window(window);
            }
            FieldKind::Date => DATE_REGEX.find(window),
        };
        match raw {
            Some(raw) => self
                .field
                .parse(raw.as_str())
                .map(Some)
                .map_err(|_| DropReason::Invalid),
            None => Ok(None),
        }
    }

    /// First number in the window, converted to the field's unit when the
    /// text states a different length unit.
    fn number_from_window(&self, window: &str) -> Result<Option<FieldValue>, DropReason> {
        let Some(captures) = NUMBER_REGEX.captures(window) else {
            return Ok(None);
        };
        let number: f64 = captures[1].parse().map_err(|_| DropReason::Invalid)?;
        let number = match (captures.get(2), self.field.unit.as_deref()) {
            (Some(stated), Some(expected)) => {
                convert_length(number, stated.as_str(), expected).ok_or(DropReason::Invalid)?
            }
            _ => number,
        };
        let value = FieldValue::Number(number);
        self.field
            .check(&value)
            .map(|()| Some(value))
            .map_err(|_| DropReason::Invalid)
    }
}

/// Millimetres per unit, for the length units reports use.
fn millimetres_per(unit: &str) -> Option<f64> {
    match unit.to_ascii_lowercase().as_str() {
        "mm" => Some(1.0),
        "cm" => Some(10.0),
        _ => None,
    }
}

fn convert_length(value: f64, from: &str, to: &str) -> Option<f64> {
    if from.eq_ignore_ascii_case(to) {
        return Some(value);
    }
    let from = millimetres_per(from)?;
    let to = millimetres_per(to)?;
    Some(value * from / to)
}

/// Rest of the line (or clause) after `start`, bounded in length.
fn window_after(text: &str, start: usize) -> String {
    text[start..]
        .chars()
        .take_while(|c| !matches!(c, '\n' | '\r' | ';'))
        .take(WINDOW_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_term_ignores_embedded_words() {
        let re = whole_term("iso").unwrap();
        assert!(re.is_match("T2: ISO signal"));
        assert!(!re.is_match("isointense"));
        let re = whole_term("<50% exophytic").unwrap();
        assert!(re.is_match("growth: <50% exophytic."));
    }

    #[test]
    fn whole_term_capture_excludes_trailing_boundary() {
        let re = whole_term("tumor size").unwrap();
        let hit = re
            .captures("Tumor size\nlesion 3")
            .and_then(|c| c.get(1))
            .unwrap();
        assert_eq!(hit.end(), "Tumor size".len());
    }

    #[test]
    fn lengths_convert_between_mm_and_cm() {
        assert_eq!(convert_length(28.0, "mm", "cm"), Some(2.8));
        assert_eq!(convert_length(0.5, "CM", "mm"), Some(5.0));
        assert_eq!(convert_length(6.0, "mm", "mm"), Some(6.0));
        assert_eq!(convert_length(6.0, "mm", "%"), None);
    }

    #[test]
    fn window_stops_at_line_end() {
        assert_eq!(window_after("size 4.2 cm\nnearness 3 mm", 4), " 4.2 cm");
        assert_eq!(window_after("size 4.2 cm; nearness", 4), " 4.2 cm");
    }
}
