//! Annual regional series
//!
//! An [`AnnualRegionalSeries`] is a table indexed by ascending integer years with one
//! column per [`Region`]. Every stage consumes and produces these tables.
//! Missing values are represented by NaN and mean "legitimately absent" rather than zero.
//!
//! ```rust
//! use drawdown_core::region::Region;
//! use drawdown_core::series::AnnualRegionalSeries;
//!
//! let series = AnnualRegionalSeries::from_fn(2014..=2016, |year, _| (year - 2014) as f64);
//! assert_eq!(series.get(2016, Region::World).unwrap(), 2.0);
//! assert!(series.get(2050, Region::World).is_err());
//! ```

use crate::errors::{ModelError, ModelResult};
use crate::region::{Region, REGION_COUNT};
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ops::{Index, IndexMut, RangeInclusive};

pub type FloatValue = f64;
pub type Year = i32;

/// One value per region, in [`Region::ALL`] order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionalValues([FloatValue; REGION_COUNT]);

impl RegionalValues {
    pub fn from_array(values: [FloatValue; REGION_COUNT]) -> Self {
        Self(values)
    }

    pub fn filled(value: FloatValue) -> Self {
        Self([value; REGION_COUNT])
    }

    /// Build from `(region, value)` pairs; regions without a pair receive `default`.
    pub fn from_pairs(pairs: &[(Region, FloatValue)], default: FloatValue) -> Self {
        let mut values = Self::filled(default);
        for (region, value) in pairs {
            values[*region] = *value;
        }
        values
    }

    pub fn as_array(&self) -> &[FloatValue; REGION_COUNT] {
        &self.0
    }

    pub fn map(&self, f: impl Fn(FloatValue) -> FloatValue) -> Self {
        Self(self.0.map(f))
    }

    pub fn zip_with(
        &self,
        other: &RegionalValues,
        f: impl Fn(FloatValue, FloatValue) -> FloatValue,
    ) -> Self {
        let mut out = [0.0; REGION_COUNT];
        for i in 0..REGION_COUNT {
            out[i] = f(self.0[i], other.0[i]);
        }
        Self(out)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Region, FloatValue)> + '_ {
        Region::ALL.into_iter().zip(self.0.iter().copied())
    }
}

impl Index<Region> for RegionalValues {
    type Output = FloatValue;

    fn index(&self, region: Region) -> &FloatValue {
        &self.0[region.index()]
    }
}

impl IndexMut<Region> for RegionalValues {
    fn index_mut(&mut self, region: Region) -> &mut FloatValue {
        &mut self.0[region.index()]
    }
}

/// A year-indexed table with one column per region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnualRegionalSeries {
    years: Vec<Year>,
    values: Array2<FloatValue>,
}

impl AnnualRegionalSeries {
    /// Create a series from a year index and a `years x regions` array
    ///
    /// Years must be strictly ascending and match the number of rows.
    pub fn new(years: Vec<Year>, values: Array2<FloatValue>) -> ModelResult<Self> {
        if values.ncols() != REGION_COUNT || values.nrows() != years.len() {
            return Err(ModelError::ShapeMismatch {
                context: "AnnualRegionalSeries::new".to_string(),
                details: format!(
                    "{} years but values have shape {:?}",
                    years.len(),
                    values.shape()
                ),
            });
        }
        if years.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ModelError::ShapeMismatch {
                context: "AnnualRegionalSeries::new".to_string(),
                details: "years must be strictly ascending".to_string(),
            });
        }
        Ok(Self { years, values })
    }

    /// A series with every cell set to `value`
    pub fn filled(years: impl IntoIterator<Item = Year>, value: FloatValue) -> Self {
        let years: Vec<Year> = years.into_iter().collect();
        let values = Array2::from_elem((years.len(), REGION_COUNT), value);
        Self { years, values }
    }

    pub fn from_fn(
        years: RangeInclusive<Year>,
        mut f: impl FnMut(Year, Region) -> FloatValue,
    ) -> Self {
        let years: Vec<Year> = years.collect();
        let mut values = Array2::zeros((years.len(), REGION_COUNT));
        for (i, year) in years.iter().enumerate() {
            for region in Region::ALL {
                values[[i, region.index()]] = f(*year, region);
            }
        }
        Self { years, values }
    }

    /// Build from `(year, values)` rows, which may arrive in any order
    pub fn from_rows(mut rows: Vec<(Year, RegionalValues)>) -> ModelResult<Self> {
        rows.sort_by_key(|(year, _)| *year);
        let years: Vec<Year> = rows.iter().map(|(year, _)| *year).collect();
        let mut values = Array2::zeros((rows.len(), REGION_COUNT));
        for (i, (_, row)) in rows.iter().enumerate() {
            for (j, v) in row.as_array().iter().enumerate() {
                values[[i, j]] = *v;
            }
        }
        Self::new(years, values)
    }

    pub fn years(&self) -> &[Year] {
        &self.years
    }

    pub fn values(&self) -> &Array2<FloatValue> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn first_year(&self) -> Option<Year> {
        self.years.first().copied()
    }

    pub fn last_year(&self) -> Option<Year> {
        self.years.last().copied()
    }

    pub fn contains_year(&self, year: Year) -> bool {
        self.years.binary_search(&year).is_ok()
    }

    fn position(&self, year: Year) -> ModelResult<usize> {
        self.years
            .binary_search(&year)
            .map_err(|_| ModelError::YearOutOfRange {
                year,
                first: self.first_year().unwrap_or(0),
                last: self.last_year().unwrap_or(0),
            })
    }

    pub fn get(&self, year: Year, region: Region) -> ModelResult<FloatValue> {
        let i = self.position(year)?;
        Ok(self.values[[i, region.index()]])
    }

    pub fn row(&self, year: Year) -> ModelResult<RegionalValues> {
        let i = self.position(year)?;
        let mut out = [0.0; REGION_COUNT];
        for (j, v) in self.values.row(i).iter().enumerate() {
            out[j] = *v;
        }
        Ok(RegionalValues::from_array(out))
    }

    pub fn column(&self, region: Region) -> ArrayView1<'_, FloatValue> {
        self.values.column(region.index())
    }

    /// `(year, value)` pairs for a single region
    pub fn column_pairs(&self, region: Region) -> impl Iterator<Item = (Year, FloatValue)> + '_ {
        self.years.iter().copied().zip(self.column(region).into_iter().copied())
    }

    pub fn set(&mut self, year: Year, region: Region, value: FloatValue) -> ModelResult<()> {
        let i = self.position(year)?;
        self.values[[i, region.index()]] = value;
        Ok(())
    }

    pub fn set_row(&mut self, year: Year, values: &RegionalValues) -> ModelResult<()> {
        let i = self.position(year)?;
        for (region, v) in values.iter() {
            self.values[[i, region.index()]] = v;
        }
        Ok(())
    }

    /// Restrict to `start..=end`
    ///
    /// Both bounds must be present; projecting beyond the available data is an
    /// explicit upstream decision, never an implicit extrapolation.
    pub fn slice(&self, start: Year, end: Year) -> ModelResult<Self> {
        let i = self.position(start)?;
        let j = self.position(end)?;
        let years = self.years[i..=j].to_vec();
        let values = self.values.slice(ndarray::s![i..=j, ..]).to_owned();
        Ok(Self { years, values })
    }

    pub fn map(&self, f: impl Fn(FloatValue) -> FloatValue) -> Self {
        Self {
            years: self.years.clone(),
            values: self.values.mapv(f),
        }
    }

    /// Combine two series cell by cell; the year indexes must be identical
    pub fn zip_with(
        &self,
        other: &AnnualRegionalSeries,
        context: &str,
        f: impl Fn(FloatValue, FloatValue) -> FloatValue,
    ) -> ModelResult<Self> {
        if self.years != other.years {
            return Err(ModelError::ShapeMismatch {
                context: context.to_string(),
                details: format!(
                    "years {:?}..={:?} do not match {:?}..={:?}",
                    self.first_year(),
                    self.last_year(),
                    other.first_year(),
                    other.last_year()
                ),
            });
        }
        let mut values = self.values.clone();
        values.zip_mut_with(&other.values, |a, b| *a = f(*a, *b));
        Ok(Self {
            years: self.years.clone(),
            values,
        })
    }

    /// Align `other` onto this series' years, failing if any year is not covered
    pub fn align_to(&self, other: &AnnualRegionalSeries) -> ModelResult<Self> {
        let (first, last) = match (self.first_year(), self.last_year()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Ok(self.clone()),
        };
        let aligned = other.slice(first, last)?;
        if aligned.years != self.years {
            return Err(ModelError::ShapeMismatch {
                context: "align_to".to_string(),
                details: "source years are not contiguous over the target range".to_string(),
            });
        }
        Ok(aligned)
    }

    /// Difference between consecutive rows; the first row is zero
    pub fn first_difference(&self) -> Self {
        let mut values = Array2::zeros(self.values.raw_dim());
        for i in 1..self.years.len() {
            let diff = &self.values.row(i) - &self.values.row(i - 1);
            values.row_mut(i).assign(&diff);
        }
        Self {
            years: self.years.clone(),
            values,
        }
    }

    /// Running total down each column; NaN cells contribute nothing
    pub fn cumulative_sum(&self) -> Self {
        let mut values = self.values.clone();
        for mut column in values.axis_iter_mut(Axis(1)) {
            let mut total = 0.0;
            for v in column.iter_mut() {
                if !v.is_nan() {
                    total += *v;
                }
                *v = total;
            }
        }
        Self {
            years: self.years.clone(),
            values,
        }
    }

    pub fn clamp_min(&self, min: FloatValue) -> Self {
        self.map(|v| if v < min { min } else { v })
    }

    pub fn fill_nan(&self, value: FloatValue) -> Self {
        self.map(|v| if v.is_nan() { value } else { v })
    }

    pub fn scale(&self, factor: FloatValue) -> Self {
        self.map(|v| v * factor)
    }

    /// Zero every row whose year lies outside `start..=end`
    pub fn zero_outside(&self, start: Year, end: Year) -> Self {
        let mut values = self.values.clone();
        for (i, year) in self.years.iter().enumerate() {
            if *year < start || *year > end {
                values.row_mut(i).fill(0.0);
            }
        }
        Self {
            years: self.years.clone(),
            values,
        }
    }

    /// Replace World with the sum of the main regions wherever World is NaN
    pub fn world_from_main_regions(&mut self) {
        for i in 0..self.years.len() {
            if self.values[[i, Region::World.index()]].is_nan() {
                let total: FloatValue = Region::MAIN
                    .iter()
                    .map(|r| self.values[[i, r.index()]])
                    .filter(|v| !v.is_nan())
                    .sum();
                self.values[[i, Region::World.index()]] = total;
            }
        }
    }

    /// Row-order sensitive hash of the table contents
    ///
    /// Structurally identical tables hash identically regardless of identity.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.years.hash(&mut hasher);
        for v in self.values.iter() {
            canonical_bits(*v).hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// Bit pattern with a single NaN and a single zero
pub(crate) fn canonical_bits(v: FloatValue) -> u64 {
    if v.is_nan() {
        FloatValue::NAN.to_bits()
    } else if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

impl PartialEq for AnnualRegionalSeries {
    fn eq(&self, other: &Self) -> bool {
        self.years == other.years
            && self.values.shape() == other.values.shape()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    fn ramp() -> AnnualRegionalSeries {
        AnnualRegionalSeries::from_fn(2014..=2018, |year, region| {
            (year - 2014) as f64 * (region.index() + 1) as f64
        })
    }

    #[test]
    fn get_outside_range_is_an_error() {
        let series = ramp();
        match series.get(2050, Region::World) {
            Err(ModelError::YearOutOfRange { year, first, last }) => {
                assert_eq!((year, first, last), (2050, 2014, 2018));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rejects_unsorted_years() {
        let values = Array2::zeros((2, REGION_COUNT));
        assert!(AnnualRegionalSeries::new(vec![2020, 2019], values).is_err());
    }

    #[test]
    fn from_rows_sorts_years() {
        let series = AnnualRegionalSeries::from_rows(vec![
            (2050, RegionalValues::filled(2.0)),
            (2014, RegionalValues::filled(1.0)),
        ])
        .unwrap();
        assert_eq!(series.years(), &[2014, 2050]);
        assert_eq!(series.get(2050, Region::Usa).unwrap(), 2.0);
    }

    #[test]
    fn slice_requires_both_bounds() {
        let series = ramp();
        let sliced = series.slice(2015, 2017).unwrap();
        assert_eq!(sliced.years(), &[2015, 2016, 2017]);
        assert!(series.slice(2015, 2040).is_err());
    }

    #[test]
    fn first_difference_and_cumulative_sum() {
        let series = ramp();
        let diff = series.first_difference();
        assert_eq!(diff.get(2014, Region::Oecd90).unwrap(), 0.0);
        assert_eq!(diff.get(2016, Region::Oecd90).unwrap(), 2.0);

        let cumulative = diff.cumulative_sum();
        assert!(is_close!(
            cumulative.get(2018, Region::Oecd90).unwrap(),
            series.get(2018, Region::Oecd90).unwrap()
        ));
    }

    #[test]
    fn zip_with_requires_matching_years() {
        let a = ramp();
        let b = a.slice(2014, 2016).unwrap();
        assert!(matches!(
            a.zip_with(&b, "test", |x, y| x + y),
            Err(ModelError::ShapeMismatch { .. })
        ));
        let doubled = a.zip_with(&a, "test", |x, y| x + y).unwrap();
        assert_eq!(doubled.get(2018, Region::World).unwrap(), 8.0);
    }

    #[test]
    fn zero_outside_keeps_inner_rows() {
        let zeroed = ramp().zero_outside(2015, 2016);
        assert_eq!(zeroed.get(2014, Region::Usa).unwrap(), 0.0);
        assert_eq!(zeroed.get(2016, Region::Usa).unwrap(), 20.0);
        assert_eq!(zeroed.get(2018, Region::World).unwrap(), 0.0);
    }

    #[test]
    fn world_sums_main_regions_only() {
        let mut series = AnnualRegionalSeries::from_fn(2020..=2020, |_, region| match region {
            Region::World => f64::NAN,
            r if r.is_main() => 1.0,
            _ => 100.0,
        });
        series.world_from_main_regions();
        assert_eq!(series.get(2020, Region::World).unwrap(), 5.0);
    }

    #[test]
    fn content_hash_is_structural() {
        let a = ramp();
        let b = ramp();
        assert_eq!(a.content_hash(), b.content_hash());
        assert_eq!(a, b);

        let mut c = ramp();
        c.set(2015, Region::Usa, 99.0).unwrap();
        assert_ne!(a.content_hash(), c.content_hash());
    }

    #[test]
    fn nan_cells_compare_equal() {
        let a = AnnualRegionalSeries::filled(2020..=2021, f64::NAN);
        assert_eq!(a, a.clone());
        assert_eq!(a.content_hash(), a.clone().content_hash());
    }
}
