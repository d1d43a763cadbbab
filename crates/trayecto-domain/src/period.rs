//! Academic periods - the (year, term) slots courses are filed into

use crate::id::opaque_id;
use std::fmt;

opaque_id!(
    /// Identifier of an [`AcademicPeriod`] in the backing store
    PeriodId
);

/// A (year, term) pair
///
/// Ordering is chronological: by year, then by term. Terms are 1 or 2 in the
/// observed calendar but are not capped here; out-of-range values pass through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodKey {
    /// Calendar year
    pub year: i32,
    /// Term within the year, starting at 1
    pub term: u8,
}

impl PeriodKey {
    /// Create a new period key
    pub fn new(year: i32, term: u8) -> Self {
        Self { year, term }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.term)
    }
}

impl std::str::FromStr for PeriodKey {
    type Err = String;

    /// Parse `YEAR-TERM`, e.g. `2025-1`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, term) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("Invalid period '{}'. Expected 'YEAR-TERM'", s))?;
        let year = year
            .parse::<i32>()
            .map_err(|e| format!("Invalid year '{}': {}", year, e))?;
        let term = term
            .parse::<u8>()
            .map_err(|e| format!("Invalid term '{}': {}", term, e))?;
        Ok(Self { year, term })
    }
}

/// A period record as known to the backing store
#[derive(Debug, Clone, PartialEq)]
pub struct AcademicPeriod {
    /// Store-assigned identifier
    pub id: PeriodId,
    /// The (year, term) this period stands for
    pub key: PeriodKey,
    /// Whether this is the institution's current period (at most one is)
    pub current: bool,
}
