//! Academic term model and the numeric term-code mapping.
//!
//! Sections carry an opaque `YYYYTT` code where `TT` identifies the season
//! (15 = Fall, 25 = Winter, 35 = Spring, 45 = Summer). The mapping between
//! `(season, year)` and the code is a total bijection over the four known
//! suffixes; anything else decodes to `None` since codes arrive from
//! untrusted external data.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// The four academic seasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Fall,
    Winter,
    Spring,
    Summer,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Fall, Season::Winter, Season::Spring, Season::Summer];

    /// Two-digit suffix used in numeric term codes.
    pub fn code_suffix(self) -> &'static str {
        match self {
            Season::Fall => "15",
            Season::Winter => "25",
            Season::Spring => "35",
            Season::Summer => "45",
        }
    }

    fn from_code_suffix(suffix: &str) -> Option<Season> {
        match suffix {
            "15" => Some(Season::Fall),
            "25" => Some(Season::Winter),
            "35" => Some(Season::Spring),
            "45" => Some(Season::Summer),
            _ => None,
        }
    }

    /// First calendar month of the term, used to anchor recurrence.
    pub fn anchor_month(self) -> u32 {
        match self {
            Season::Spring => 1,
            Season::Summer => 5,
            Season::Fall => 9,
            Season::Winter => 12,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Season::Fall => "Fall",
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An academic term: a season in a specific year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub season: Season,
    pub year: i32,
}

impl Term {
    pub fn new(season: Season, year: i32) -> Self {
        Self { season, year }
    }

    /// Numeric `YYYYTT` term code.
    pub fn code(&self) -> String {
        format!("{}{}", self.year, self.season.code_suffix())
    }

    /// Decodes a numeric term code. Returns `None` for malformed input or
    /// unknown season suffixes; never panics.
    pub fn from_code(code: &str) -> Option<Term> {
        if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year = code[..4].parse().ok()?;
        let season = Season::from_code_suffix(&code[4..])?;
        Some(Term { season, year })
    }

    /// First day of the term's anchor month.
    pub fn anchor_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.season.anchor_month(), 1)
            .expect("anchor month is always a valid calendar month")
    }

    /// The term's recurrence window `[anchor, anchor + 3 months)`.
    pub fn window(&self) -> (NaiveDate, NaiveDate) {
        let start = self.anchor_date();
        let end = start
            .checked_add_months(Months::new(3))
            .expect("term window end within calendar range");
        (start, end)
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.season, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_code_round_trip() {
        for season in Season::ALL {
            for year in 2020..=2032 {
                let term = Term::new(season, year);
                assert_eq!(Term::from_code(&term.code()), Some(term));
            }
        }
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(Term::new(Season::Fall, 2025).code(), "202515");
        assert_eq!(
            Term::from_code("202625"),
            Some(Term::new(Season::Winter, 2026))
        );
    }

    #[test]
    fn test_unknown_suffix_decodes_to_none() {
        assert_eq!(Term::from_code("202399"), None);
    }

    #[test]
    fn test_malformed_codes_decode_to_none() {
        assert_eq!(Term::from_code(""), None);
        assert_eq!(Term::from_code("2023"), None);
        assert_eq!(Term::from_code("20231"), None);
        assert_eq!(Term::from_code("2023155"), None);
        assert_eq!(Term::from_code("abcd15"), None);
    }

    #[test]
    fn test_fall_window() {
        let (start, end) = Term::new(Season::Fall, 2025).window();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
    }

    #[test]
    fn test_winter_window_crosses_year_boundary() {
        let (start, end) = Term::new(Season::Winter, 2025).window();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    }
}
