//! Sort plan configuration types.
//!
//! A [`SortPlan`] is an ordered list of [`SortStep`]s plus the [`Period`] used by
//! date steps. Every value is validated when it is built or parsed, so the
//! pipeline never sees an unknown step or period kind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors raised while building or parsing a sort plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// The period kind is not one of day, week or month.
    UnknownPeriodKind(String),
    /// A step code is not one of `d`, `e` or `t`.
    UnknownStep(String),
    /// A period length of zero was requested.
    ZeroAmount,
    /// A plan needs at least one step.
    EmptySteps,
    /// The timestamp cannot be represented as a calendar date.
    TimestampOutOfRange(i64),
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPeriodKind(kind) => {
                write!(f, "Unknown period kind '{}': expected d, w or m", kind)
            }
            Self::UnknownStep(step) => {
                write!(f, "Unknown sort step '{}': expected d, e or t", step)
            }
            Self::ZeroAmount => write!(f, "Period length must be at least 1"),
            Self::EmptySteps => write!(f, "At least one sort step is required"),
            Self::TimestampOutOfRange(ts) => {
                write!(f, "Timestamp {} is outside the supported date range", ts)
            }
        }
    }
}

impl std::error::Error for PlanError {}

/// The calendar unit a date bucket is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    #[serde(alias = "d")]
    Day,
    #[serde(alias = "w")]
    Week,
    #[serde(alias = "m")]
    Month,
}

impl FromStr for PeriodKind {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "d" | "day" | "days" => Ok(Self::Day),
            "w" | "week" | "weeks" => Ok(Self::Week),
            "m" | "month" | "months" => Ok(Self::Month),
            other => Err(PlanError::UnknownPeriodKind(other.to_string())),
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        };
        f.write_str(name)
    }
}

/// How long a date bucket is: `amount` days, weeks or months.
///
/// # Examples
///
/// ```
/// use dirsort::plan::{Period, PeriodKind};
///
/// let period = Period::new(PeriodKind::Week, 2).unwrap();
/// assert_eq!(period.amount(), 2);
/// assert!(Period::new(PeriodKind::Day, 0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    kind: PeriodKind,
    amount: u32,
}

impl Period {
    /// Creates a period, rejecting a zero length.
    pub fn new(kind: PeriodKind, amount: u32) -> Result<Self, PlanError> {
        if amount == 0 {
            return Err(PlanError::ZeroAmount);
        }
        Ok(Self { kind, amount })
    }

    pub fn kind(&self) -> PeriodKind {
        self.kind
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }
}

impl Default for Period {
    fn default() -> Self {
        Self {
            kind: PeriodKind::Month,
            amount: 1,
        }
    }
}

/// One level of classification in a chained sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortStep {
    /// Group by creation date bucket.
    #[serde(alias = "d")]
    Date,
    /// Group by file extension.
    #[serde(alias = "e")]
    Extension,
    /// Group by content type.
    #[serde(alias = "t")]
    Type,
}

impl FromStr for SortStep {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "d" | "date" => Ok(Self::Date),
            "e" | "ext" | "extension" => Ok(Self::Extension),
            "t" | "type" => Ok(Self::Type),
            other => Err(PlanError::UnknownStep(other.to_string())),
        }
    }
}

impl fmt::Display for SortStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Date => "date",
            Self::Extension => "extension",
            Self::Type => "type",
        };
        f.write_str(name)
    }
}

/// An ordered, non-empty list of sort steps as typed on the command line.
///
/// Accepts compact codes (`"ted"`), comma separated codes (`"t,e,d"`) or
/// comma separated names (`"type,date"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSequence(pub Vec<SortStep>);

impl FromStr for StepSequence {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let steps = if s.contains(',') {
            s.split(',')
                .map(str::parse)
                .collect::<Result<Vec<_>, _>>()?
        } else if s.chars().count() > 1 && s.chars().all(|c| "detDET".contains(c)) {
            s.chars()
                .map(|c| c.to_string().parse())
                .collect::<Result<Vec<_>, _>>()?
        } else if s.is_empty() {
            Vec::new()
        } else {
            vec![s.parse()?]
        };

        if steps.is_empty() {
            return Err(PlanError::EmptySteps);
        }
        Ok(Self(steps))
    }
}

/// A validated chain of sort steps plus the period used by date steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortPlan {
    steps: Vec<SortStep>,
    period: Period,
}

impl SortPlan {
    /// Builds a plan, rejecting an empty step list.
    pub fn new(steps: Vec<SortStep>, period: Period) -> Result<Self, PlanError> {
        if steps.is_empty() {
            return Err(PlanError::EmptySteps);
        }
        Ok(Self { steps, period })
    }

    /// A single-step plan.
    pub fn single(step: SortStep, period: Period) -> Self {
        Self {
            steps: vec![step],
            period,
        }
    }

    pub fn steps(&self) -> &[SortStep] {
        &self.steps
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn uses_date(&self) -> bool {
        self.steps.contains(&SortStep::Date)
    }
}
