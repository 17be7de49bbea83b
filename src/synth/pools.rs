//! Value pools built from raw scan candidates
//!
//! Raw candidates are strings pulled out of byte soup; most of them are
//! noise. Parsing and sanity bounds happen here, and anything malformed or
//! out of range is dropped silently rather than retried.

use crate::config::GeneratorConfig;
use crate::scan::CandidateSet;
use chrono::{Datelike, NaiveDate};
use tracing::info;

/// Date layouts accepted for raw candidates, tried in order
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d", "%d/%m/%Y"];

/// Parsed and bounds-checked values available to the generator
#[derive(Debug, Clone, Default)]
pub struct ValuePools {
    pub dates: Vec<NaiveDate>,
    pub amounts: Vec<f64>,
    /// Raw candidate counts before filtering, for the run summary
    pub raw_dates: usize,
    pub raw_amounts: usize,
}

impl ValuePools {
    /// Build pools from scan candidates, keeping only values inside the
    /// configured sanity bounds.
    pub fn from_candidates(candidates: &CandidateSet, config: &GeneratorConfig) -> Self {
        let dates: Vec<NaiveDate> = candidates
            .dates
            .iter()
            .filter_map(|raw| parse_date(raw, config.min_year, config.max_year))
            .collect();

        let amounts: Vec<f64> = candidates
            .amounts
            .iter()
            .filter_map(|raw| parse_amount(raw, config.min_amount, config.max_amount))
            .collect();

        info!(
            "Value pools: {} valid dates (of {} raw), {} valid amounts (of {} raw)",
            dates.len(),
            candidates.dates.len(),
            amounts.len(),
            candidates.amounts.len()
        );

        Self {
            dates,
            amounts,
            raw_dates: candidates.dates.len(),
            raw_amounts: candidates.amounts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() && self.amounts.is_empty()
    }
}

/// Parse a raw date candidate against the accepted layouts; the first
/// layout that parses wins, then the year bound is applied.
pub fn parse_date(raw: &str, min_year: i32, max_year: i32) -> Option<NaiveDate> {
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            if (min_year..=max_year).contains(&date.year()) {
                return Some(date);
            }
            return None;
        }
    }
    None
}

/// Parse a raw amount candidate after stripping currency punctuation;
/// values outside the magnitude bounds are obviously-wrong extractions.
pub fn parse_amount(raw: &str, min: f64, max: f64) -> Option<f64> {
    let clean = raw.replace(['$', ','], "");
    let amount: f64 = clean.trim().parse().ok()?;
    if (min..=max).contains(&amount) {
        Some(amount)
    } else {
        None
    }
}
