use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Structural violation categories surfaced by declarative validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Structural break at provision level.
    InvalidProvision,
    /// Structural break at org-unit level.
    InvalidOrgUnit,
    /// One or more mapping items violate structural or purpose rules.
    InvalidMapping,
    /// An expression failed its validity check.
    InvalidValues,
    /// A mandatory field is absent.
    RequiredValuesMissing,
}

impl ErrorKind {
    /// Returns a stable name for this violation category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidProvision => "InvalidProvision",
            Self::InvalidOrgUnit => "InvalidOrgUnit",
            Self::InvalidMapping => "InvalidMapping",
            Self::InvalidValues => "InvalidValues",
            Self::RequiredValuesMissing => "RequiredValuesMissing",
        }
    }
}

/// Accumulates every structural violation found during one validation pass.
///
/// Validation never fails fast: callers push violations as they are found
/// and convert the report into a single error at the end, so one pass
/// surfaces every problem at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    entries: BTreeMap<ErrorKind, Vec<String>>,
}

impl ValidationReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one violation element under the given category.
    pub fn push(&mut self, kind: ErrorKind, element: impl Into<String>) {
        self.entries.entry(kind).or_default().push(element.into());
    }

    /// Folds another report into this one, preserving element order.
    pub fn merge(&mut self, other: ValidationReport) {
        for (kind, elements) in other.entries {
            self.entries.entry(kind).or_default().extend(elements);
        }
    }

    /// Returns true when no violation was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the elements recorded under a category.
    #[must_use]
    pub fn elements(&self, kind: ErrorKind) -> &[String] {
        self.entries.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the recorded categories in stable order.
    pub fn kinds(&self) -> impl Iterator<Item = ErrorKind> + '_ {
        self.entries.keys().copied()
    }

    /// Converts the report into a result: `Ok` when empty, otherwise a
    /// single [`AppError::InvalidResource`] carrying every violation.
    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidResource(self))
        }
    }
}

impl Display for ValidationReport {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (kind, elements) in &self.entries {
            if !first {
                write!(formatter, "; ")?;
            }
            first = false;
            write!(formatter, "{} [{}]", kind.as_str(), elements.join(", "))?;
        }

        Ok(())
    }
}
