//! Search criteria and result-ordering keys.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::graph::Edge;

/// Error for an unsupported criterion or sort key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported criterion: {0}")]
pub struct InvalidCriterion(pub String);

/// Edge weight optimized by the shortest-path search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Duration,
    Fare,
    Distance,
}

impl Criterion {
    /// Weight of `edge` under this criterion.
    ///
    /// `Distance` weighs an edge by its first traversal record only, even
    /// when several routes share the edge.
    pub fn weight(&self, edge: &Edge) -> f64 {
        match self {
            Criterion::Duration => edge.min_duration,
            Criterion::Fare => edge.min_fare,
            Criterion::Distance => edge.primary_traversal().map_or(0.0, |t| t.distance_km),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Duration => "duration",
            Criterion::Fare => "fare",
            Criterion::Distance => "distance",
        }
    }
}

impl FromStr for Criterion {
    type Err = InvalidCriterion;

    fn from_str(s: &str) -> Result<Self, InvalidCriterion> {
        match s {
            "duration" => Ok(Criterion::Duration),
            "fare" => Ok(Criterion::Fare),
            "distance" => Ok(Criterion::Distance),
            other => Err(InvalidCriterion(other.to_string())),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering key for ranked option lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Duration,
    Fare,
    Transfers,
    Distance,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Duration => "duration",
            SortKey::Fare => "fare",
            SortKey::Transfers => "transfers",
            SortKey::Distance => "distance",
        }
    }
}

impl FromStr for SortKey {
    type Err = InvalidCriterion;

    fn from_str(s: &str) -> Result<Self, InvalidCriterion> {
        match s {
            "duration" => Ok(SortKey::Duration),
            "fare" => Ok(SortKey::Fare),
            "transfers" => Ok(SortKey::Transfers),
            "distance" => Ok(SortKey::Distance),
            other => Err(InvalidCriterion(other.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
