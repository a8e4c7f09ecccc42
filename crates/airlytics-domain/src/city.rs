//! City lookup keys.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// How a request path refers to a city: numeric primary key, or slug / display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CityLookup {
    Id(i32),
    SlugOrName(String),
}

impl FromStr for CityLookup {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = trimmed.parse::<i32>() {
                return Ok(Self::Id(id));
            }
        }
        Ok(Self::SlugOrName(trimmed.to_owned()))
    }
}

impl fmt::Display for CityLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => id.fmt(f),
            Self::SlugOrName(s) => f.write_str(s),
        }
    }
}
