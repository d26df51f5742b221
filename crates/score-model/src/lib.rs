//! Data model for staging and scoring schemes.
//!
//! Everything a scheme needs is expressed here as plain data:
//!
//! - [`Field`]: one clinical question and its declared domain
//! - [`Scheme`]: an ordered field list plus strategy-specific rule data
//! - [`AnswerSet`]: the findings supplied for one scoring attempt
//! - [`ScoreResult`]: the immutable outcome of evaluating an answer set
//!
//! Loading, validation and evaluation live in sibling crates; this crate only
//! owns the types and the field-level domain check ([`validate`]).

#![deny(unsafe_code)]

pub mod answers;
pub mod error;
pub mod field;
pub mod predicate;
pub mod result;
pub mod scheme;

pub use answers::AnswerSet;
pub use error::{Result, ScoreError};
pub use field::{ChoiceOption, ExtractSpec, Field, FieldKind, FieldValue, validate};
pub use predicate::{Comparison, Condition, NumericTest, Predicate, Test};
pub use result::{Contribution, Outcome, ScoreOutcome, ScoreResult, StageOutcome};
pub use scheme::{
    AdditiveRules, BonusGroup, Bucket, DecisionStep, NumericBand, PointTable, Points, RuleSet,
    Scheme, SchemeSummary, StageConstraint, StageRow, Strategy, TabularRules, ThresholdRules,
};
