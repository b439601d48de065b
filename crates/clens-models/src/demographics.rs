//! Demographic dimensions and the closed set of counter column names.
//!
//! The aggregation store is schemaless; the only guard against attribute
//! sprawl is that every counter name written is produced here, from a
//! `match` over the two enums, never by formatting request data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the overall per-bucket counter.
pub const TOTAL_COUNT_ATTR: &str = "total_count";

/// Gender dimension. Binary by design: the upstream face attribute service
/// reports `"Female"` or `"Male"` and nothing else is representable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Men,
    Women,
}

impl Gender {
    /// Map the face service's gender value. `"Female"` becomes [`Gender::Women`];
    /// any other value (including absence upstream) counts as men.
    pub fn from_service_value(value: &str) -> Self {
        if value == "Female" {
            Gender::Women
        } else {
            Gender::Men
        }
    }

    /// Counter prefix as stored (`men` / `women`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Men => "men",
            Gender::Women => "women",
        }
    }

    /// Name of the per-gender total counter (`total_men` / `total_women`).
    pub fn total_attr(&self) -> &'static str {
        match self {
            Gender::Men => "total_men",
            Gender::Women => "total_women",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Gender {
    type Err = DimensionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "men" => Ok(Gender::Men),
            "women" => Ok(Gender::Women),
            _ => Err(DimensionParseError::Gender(s.to_string())),
        }
    }
}

/// Fixed age brackets used to group counts.
///
/// Bracket upper bounds are inclusive: an estimated age of exactly 18 falls
/// in `age_12_18`, not `age_18_24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBracket {
    #[serde(rename = "age_0_12")]
    Age0_12,
    #[serde(rename = "age_12_18")]
    Age12_18,
    #[serde(rename = "age_18_24")]
    Age18_24,
    #[serde(rename = "age_24_36")]
    Age24_36,
    #[serde(rename = "age_36_plus")]
    Age36Plus,
}

impl AgeBracket {
    /// All brackets, youngest first.
    pub const ALL: &'static [AgeBracket] = &[
        AgeBracket::Age0_12,
        AgeBracket::Age12_18,
        AgeBracket::Age18_24,
        AgeBracket::Age24_36,
        AgeBracket::Age36Plus,
    ];

    /// Bracket a numeric age estimate.
    pub fn from_age(age: f64) -> Self {
        if age <= 12.0 {
            AgeBracket::Age0_12
        } else if age <= 18.0 {
            AgeBracket::Age12_18
        } else if age <= 24.0 {
            AgeBracket::Age18_24
        } else if age <= 36.0 {
            AgeBracket::Age24_36
        } else {
            AgeBracket::Age36Plus
        }
    }

    /// Bracket label as stored in counter names.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeBracket::Age0_12 => "age_0_12",
            AgeBracket::Age12_18 => "age_12_18",
            AgeBracket::Age18_24 => "age_18_24",
            AgeBracket::Age24_36 => "age_24_36",
            AgeBracket::Age36Plus => "age_36_plus",
        }
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AgeBracket {
    type Err = DimensionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "age_0_12" => Ok(AgeBracket::Age0_12),
            "age_12_18" => Ok(AgeBracket::Age12_18),
            "age_18_24" => Ok(AgeBracket::Age18_24),
            "age_24_36" => Ok(AgeBracket::Age24_36),
            "age_36_plus" => Ok(AgeBracket::Age36Plus),
            _ => Err(DimensionParseError::Bracket(s.to_string())),
        }
    }
}

/// The per-demographic counter name for a gender/bracket pair.
///
/// This is the full enumeration of the ten `{gender}_{bracket}` columns;
/// no other combination can reach the store.
pub fn counter_attr(gender: Gender, bracket: AgeBracket) -> &'static str {
    match (gender, bracket) {
        (Gender::Men, AgeBracket::Age0_12) => "men_age_0_12",
        (Gender::Men, AgeBracket::Age12_18) => "men_age_12_18",
        (Gender::Men, AgeBracket::Age18_24) => "men_age_18_24",
        (Gender::Men, AgeBracket::Age24_36) => "men_age_24_36",
        (Gender::Men, AgeBracket::Age36Plus) => "men_age_36_plus",
        (Gender::Women, AgeBracket::Age0_12) => "women_age_0_12",
        (Gender::Women, AgeBracket::Age12_18) => "women_age_12_18",
        (Gender::Women, AgeBracket::Age18_24) => "women_age_18_24",
        (Gender::Women, AgeBracket::Age24_36) => "women_age_24_36",
        (Gender::Women, AgeBracket::Age36Plus) => "women_age_36_plus",
    }
}

/// Unknown gender/bracket value in a request path.
#[derive(Debug, Error)]
pub enum DimensionParseError {
    #[error("Unknown gender: {0}")]
    Gender(String),
    #[error("Unknown age bracket: {0}")]
    Bracket(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_boundaries() {
        assert_eq!(AgeBracket::from_age(0.0), AgeBracket::Age0_12);
        assert_eq!(AgeBracket::from_age(12.0), AgeBracket::Age0_12);
        assert_eq!(AgeBracket::from_age(12.0001), AgeBracket::Age12_18);
        assert_eq!(AgeBracket::from_age(18.0), AgeBracket::Age12_18);
        assert_eq!(AgeBracket::from_age(24.0), AgeBracket::Age18_24);
        assert_eq!(AgeBracket::from_age(36.0), AgeBracket::Age24_36);
        assert_eq!(AgeBracket::from_age(36.0001), AgeBracket::Age36Plus);
        assert_eq!(AgeBracket::from_age(80.0), AgeBracket::Age36Plus);
    }

    #[test]
    fn test_gender_mapping() {
        assert_eq!(Gender::from_service_value("Female"), Gender::Women);
        assert_eq!(Gender::from_service_value("Male"), Gender::Men);
        assert_eq!(Gender::from_service_value("Unknown"), Gender::Men);
        assert_eq!(Gender::from_service_value(""), Gender::Men);
    }

    #[test]
    fn test_total_attrs() {
        assert_eq!(Gender::Men.total_attr(), "total_men");
        assert_eq!(Gender::Women.total_attr(), "total_women");
    }

    #[test]
    fn test_counter_attr_enumeration() {
        let mut seen = std::collections::HashSet::new();
        for gender in [Gender::Men, Gender::Women] {
            for bracket in AgeBracket::ALL {
                let attr = counter_attr(gender, *bracket);
                assert_eq!(attr, format!("{}_{}", gender.as_str(), bracket.as_str()));
                assert!(seen.insert(attr));
            }
        }
        assert_eq!(seen.len(), 10);
    }

    #[test]
    fn test_parse_dimensions() {
        assert_eq!("women".parse::<Gender>().unwrap(), Gender::Women);
        assert!("other".parse::<Gender>().is_err());
        assert_eq!("age_18_24".parse::<AgeBracket>().unwrap(), AgeBracket::Age18_24);
        assert!("age_99".parse::<AgeBracket>().is_err());
    }
}
