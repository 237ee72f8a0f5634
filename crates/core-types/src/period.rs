use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A fiscal reporting period, identified by its label.
///
/// Full years are written as the bare year (`2022`). Partial years carry a
/// month-count suffix (`2023_9M` covers the first nine months of 2023).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FiscalPeriod {
    year: i32,
    months: u8,
}

impl FiscalPeriod {
    pub const FULL_YEAR_MONTHS: u8 = 12;

    /// A full fiscal year.
    pub fn year(year: i32) -> Self {
        Self {
            year,
            months: Self::FULL_YEAR_MONTHS,
        }
    }

    /// A partial fiscal year covering the first `months` months.
    pub fn partial(year: i32, months: u8) -> Result<Self, CoreError> {
        if months == 0 || months > Self::FULL_YEAR_MONTHS {
            return Err(CoreError::InvalidInput(
                "fiscal period".to_string(),
                format!("month count must be within 1..=12, got {}", months),
            ));
        }
        Ok(Self { year, months })
    }

    /// For literal periods whose month count is known to be within 1..=12.
    pub(crate) const fn from_parts(year: i32, months: u8) -> Self {
        Self { year, months }
    }

    pub fn fiscal_year(&self) -> i32 {
        self.year
    }

    pub fn months(&self) -> u8 {
        self.months
    }

    pub fn is_partial(&self) -> bool {
        self.months < Self::FULL_YEAR_MONTHS
    }

    /// The full fiscal year that follows this period.
    pub fn next(&self) -> Self {
        Self::year(self.year + 1)
    }
}

impl fmt::Display for FiscalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_partial() {
            write!(f, "{}_{}M", self.year, self.months)
        } else {
            write!(f, "{}", self.year)
        }
    }
}

impl FromStr for FiscalPeriod {
    type Err = CoreError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| {
            CoreError::InvalidInput(format!("fiscal period '{}'", label), reason.to_string())
        };

        let (year_part, suffix) = match label.trim().split_once('_') {
            Some((year, suffix)) => (year, Some(suffix)),
            None => (label.trim(), None),
        };

        if year_part.len() != 4 || !year_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected a four-digit year"));
        }
        let year: i32 = year_part
            .parse()
            .map_err(|_| invalid("expected a four-digit year"))?;

        match suffix {
            None => Ok(Self::year(year)),
            Some(suffix) => {
                let months = suffix
                    .strip_suffix('M')
                    .and_then(|m| m.parse::<u8>().ok())
                    .ok_or_else(|| invalid("expected a suffix of the form '<months>M'"))?;
                Self::partial(year, months)
            }
        }
    }
}

impl TryFrom<String> for FiscalPeriod {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FiscalPeriod> for String {
    fn from(period: FiscalPeriod) -> Self {
        period.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_and_partial_years() {
        let full: FiscalPeriod = "2022".parse().unwrap();
        assert_eq!(full, FiscalPeriod::year(2022));
        assert!(!full.is_partial());

        let partial: FiscalPeriod = "2023_9M".parse().unwrap();
        assert_eq!(partial.fiscal_year(), 2023);
        assert_eq!(partial.months(), 9);
        assert!(partial.is_partial());
        assert_eq!(partial.to_string(), "2023_9M");
    }

    #[test]
    fn rejects_malformed_labels() {
        for label in ["20x0", "202", "2023_13M", "2023_0M", "2023_Q3", "2023_9"] {
            assert!(label.parse::<FiscalPeriod>().is_err(), "accepted {}", label);
        }
    }

    #[test]
    fn next_is_the_following_full_year() {
        let partial: FiscalPeriod = "2023_9M".parse().unwrap();
        assert_eq!(partial.next().to_string(), "2024");
        assert_eq!(partial.next().next().to_string(), "2025");
    }

    #[test]
    fn serializes_as_label() {
        let period: FiscalPeriod = "2023_9M".parse().unwrap();
        let json = serde_json::to_string(&period).unwrap();
        assert_eq!(json, "\"2023_9M\"");
        let back: FiscalPeriod = serde_json::from_str(&json).unwrap();
        assert_eq!(back, period);
    }
}
