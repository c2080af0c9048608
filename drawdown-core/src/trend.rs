//! Trend fitting for prognostication sources
//!
//! Source tables are sparse and noisy; stages fit a trend through the available points and
//! evaluate it over a contiguous span of years to produce a gap-filled series.

use crate::errors::{ModelError, ModelResult};
use crate::series::{FloatValue, Year};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Year subtracted before fitting to keep the design matrix well conditioned
const ORIGIN_YEAR: Year = 2014;

/// Shape of a fitted trend
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendKind {
    #[serde(rename = "Linear")]
    Linear,
    #[serde(rename = "2nd Poly")]
    Degree2,
    #[serde(rename = "3rd Poly")]
    Degree3,
    #[serde(rename = "Exponential")]
    Exponential,
}

impl TrendKind {
    fn degree(self) -> usize {
        match self {
            TrendKind::Linear | TrendKind::Exponential => 1,
            TrendKind::Degree2 => 2,
            TrendKind::Degree3 => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrendKind::Linear => "Linear",
            TrendKind::Degree2 => "2nd Poly",
            TrendKind::Degree3 => "3rd Poly",
            TrendKind::Exponential => "Exponential",
        }
    }
}

impl fmt::Display for TrendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TrendKind {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        [
            TrendKind::Linear,
            TrendKind::Degree2,
            TrendKind::Degree3,
            TrendKind::Exponential,
        ]
        .into_iter()
        .find(|t| t.label() == s)
        .ok_or_else(|| ModelError::unrecognized("trend", s))
    }
}

/// Which band around the trend to report
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Growth {
    Low,
    Medium,
    High,
}

impl FromStr for Growth {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        match s {
            "Low" => Ok(Growth::Low),
            "Medium" => Ok(Growth::Medium),
            "High" => Ok(Growth::High),
            other => Err(ModelError::unrecognized("growth", other)),
        }
    }
}

/// Least-squares fit of `points` evaluated at every year in `years`
///
/// Non-finite points are ignored, as are non-positive points for an exponential fit.
/// When there are too few points for the requested degree the degree is reduced.
/// Returns `None` if there is nothing to fit. Fitted values are clamped at zero.
pub fn fit_trend(
    points: &[(Year, FloatValue)],
    kind: TrendKind,
    years: RangeInclusive<Year>,
) -> Option<Vec<FloatValue>> {
    let exponential = kind == TrendKind::Exponential;
    let usable: Vec<(FloatValue, FloatValue)> = points
        .iter()
        .filter(|(_, y)| y.is_finite() && (!exponential || *y > 0.0))
        .map(|(x, y)| {
            let x = (*x - ORIGIN_YEAR) as FloatValue;
            if exponential {
                (x, y.ln())
            } else {
                (x, *y)
            }
        })
        .collect();
    if usable.is_empty() {
        return None;
    }

    let degree = kind.degree().min(usable.len() - 1);
    let design = DMatrix::from_fn(usable.len(), degree + 1, |i, j| usable[i].0.powi(j as i32));
    let target = DVector::from_iterator(usable.len(), usable.iter().map(|(_, y)| *y));
    let coefficients = design.svd(true, true).solve(&target, 1e-12).ok()?;

    let fitted = years
        .map(|year| {
            let x = (year - ORIGIN_YEAR) as FloatValue;
            let value: FloatValue = coefficients
                .iter()
                .enumerate()
                .map(|(j, c)| c * x.powi(j as i32))
                .sum();
            let value = if exponential { value.exp() } else { value };
            value.max(0.0)
        })
        .collect();
    Some(fitted)
}
