// src/readers/yearless.rs

//! Implements [`YearLessLogHelper`], a year normalizer for log formats that
//! record a month and day but no year.
//!
//! A year-less log is read from the beginning to the end. The first record
//! is presumed to be in the _estimated year_, typically the year of the file
//! modification time. Whenever the month goes backwards, e.g. December
//! followed by January, the year is incremented.
//!
//! A later year can never be before an earlier year for the same file.

use crate::data::datetime::{Month, Year};

use std::fmt;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};
use ::thiserror::Error;

/// Errors of a [`YearLessLogHelper`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum YearLessError {
    #[error("invalid month: {0}")]
    InvalidMonth(Month),
}

/// Snapshot of a [`YearLessLogHelper`], for summaries and tests.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct YearLessLogHelperInfo {
    /// The estimated year of the first record. `None` if the year came from
    /// the file content.
    pub estimated_creation_year: Option<Year>,
    /// Year of the first record.
    pub earliest_year: Option<Year>,
    /// Year of the most recent record.
    pub latest_year: Option<Year>,
    /// Number of year boundaries crossed.
    pub last_relative_year: Year,
}

impl fmt::Display for YearLessLogHelperInfo {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        write!(
            f,
            "estimated creation year {:?}, earliest year {:?}, latest year {:?}, year boundaries crossed {}",
            self.estimated_creation_year, self.earliest_year, self.latest_year, self.last_relative_year,
        )
    }
}

/// Tracks the year of a sequence of year-less records.
///
/// There are two modes:
///
/// * _estimated_: [`set_estimated_year`] seeds the year from outside the
///   file. The year never increments past the _maximum year_, if one is set.
/// * _explicit_: [`set_month_and_year`] seeds the year from the file content,
///   e.g. a session header. There is no maximum.
///
/// Each record then calls [`update`] with its month.
///
/// [`set_estimated_year`]: YearLessLogHelper::set_estimated_year
/// [`set_month_and_year`]: YearLessLogHelper::set_month_and_year
/// [`update`]: YearLessLogHelper::update
#[derive(Clone, Debug, Default)]
pub struct YearLessLogHelper {
    base_year: Option<Year>,
    maximum_year: Option<Year>,
    /// month of the prior record
    month: Option<Month>,
    relative_year: Year,
    year: Year,
    earliest_year: Option<Year>,
}

impl YearLessLogHelper {
    pub fn new() -> YearLessLogHelper {
        YearLessLogHelper::default()
    }

    fn check_month(month: Month) -> Result<(), YearLessError> {
        if !(1..=12).contains(&month) {
            return Err(YearLessError::InvalidMonth(month));
        }

        Ok(())
    }

    /// Seed the _estimated_ mode. `estimated_year` is the year of the first
    /// record. `maximum_year`, if `Some`, bounds the year.
    pub fn set_estimated_year(
        &mut self,
        estimated_year: Year,
        maximum_year: Option<Year>,
    ) {
        defñ!("({}, {:?})", estimated_year, maximum_year);
        self.base_year = Some(estimated_year);
        self.maximum_year = maximum_year;
        self.month = None;
        self.relative_year = 0;
        self.year = estimated_year;
        self.earliest_year = None;
    }

    /// Seed the _explicit_ mode from a month and year found in the file.
    pub fn set_month_and_year(
        &mut self,
        month: Month,
        year: Year,
    ) -> Result<(), YearLessError> {
        defñ!("({}, {})", month, year);
        Self::check_month(month)?;
        self.base_year = None;
        self.maximum_year = None;
        self.month = Some(month);
        self.relative_year = 0;
        self.year = year;
        if self.earliest_year.is_none() {
            self.earliest_year = Some(year);
        }

        Ok(())
    }

    /// Account for a record with `month` and return the year of that record.
    ///
    /// A month earlier than the prior month by more than one is a year
    /// boundary; the one month of leeway tolerates records slightly out of
    /// order, e.g. `[4, 5, 4]`.
    pub fn update(
        &mut self,
        month: Month,
    ) -> Result<Year, YearLessError> {
        Self::check_month(month)?;
        if let Some(month_prev) = self.month {
            if month + 1 < month_prev {
                self.relative_year += 1;
                match self.maximum_year {
                    Some(maximum_year) if self.year >= maximum_year => {
                        defo!("year {} at maximum {}, not incremented", self.year, maximum_year);
                    }
                    _ => {
                        self.year += 1;
                    }
                }
            }
        }
        self.month = Some(month);
        if self.earliest_year.is_none() {
            self.earliest_year = Some(self.year);
        }

        Ok(self.year)
    }

    /// The year of the most recent record (or the seed year).
    pub const fn year(&self) -> Year {
        self.year
    }

    /// Number of year boundaries crossed since seeding.
    pub const fn relative_year(&self) -> Year {
        self.relative_year
    }

    pub const fn month(&self) -> Option<Month> {
        self.month
    }

    pub fn year_less_log_helper(&self) -> YearLessLogHelperInfo {
        YearLessLogHelperInfo {
            estimated_creation_year: self.base_year,
            earliest_year: self.earliest_year,
            latest_year: self.month.map(|_| self.year),
            last_relative_year: self.relative_year,
        }
    }
}
