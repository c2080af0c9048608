//! Reader for year-indexed regional CSV tables.

use super::key::{Arg, LoadCall};
use crate::errors::{ModelError, ModelResult};
use crate::region::Region;
use crate::series::{AnnualRegionalSeries, FloatValue, RegionalValues, Year};
use std::fs::File;
use tracing::debug;

const DEFAULT_INDEX_COL: &str = "Year";

/// Reads tables with a year column followed by one column per region
///
/// Options are taken from the call's keyword arguments:
/// - `sep`: single-character field delimiter (default `,`)
/// - `index_col`: name of the year column (default `Year`)
///
/// Empty cells become NaN and absent region columns are all-NaN.
pub struct CsvTableReader;

impl CsvTableReader {
    pub fn read(call: &LoadCall) -> ModelResult<AnnualRegionalSeries> {
        let path = call
            .source()
            .as_str()
            .ok_or_else(|| ModelError::unrecognized("source", format!("{:?}", call.source())))?
            .to_string();

        if let Some(arg) = call.args().first() {
            return Err(ModelError::unrecognized("positional option", format!("{:?}", arg)));
        }

        let mut delimiter = b',';
        let mut index_col = DEFAULT_INDEX_COL.to_string();
        for (name, value) in call.kwargs() {
            match (name.as_str(), value) {
                ("sep", Arg::Str(s)) if s.len() == 1 => delimiter = s.as_bytes()[0],
                ("index_col", Arg::Str(s)) => index_col = s.clone(),
                _ => return Err(ModelError::unrecognized(name, format!("{:?}", value))),
            }
        }

        let file = File::open(&path).map_err(|source| ModelError::Io {
            path: path.clone(),
            source,
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(file);

        let malformed = |details: String| ModelError::Csv {
            path: path.clone(),
            details,
        };

        let headers = reader
            .headers()
            .map_err(|e| malformed(e.to_string()))?
            .clone();
        let year_column = headers
            .iter()
            .position(|h| h == index_col)
            .ok_or_else(|| malformed(format!("no '{}' column", index_col)))?;

        let mut columns: Vec<(usize, Region)> = vec![];
        for (i, header) in headers.iter().enumerate() {
            if i == year_column {
                continue;
            }
            match Region::from_label(header) {
                Ok(region) => columns.push((i, region)),
                Err(_) => debug!(path = %path, column = header, "ignoring non-region column"),
            }
        }

        let mut rows: Vec<(Year, RegionalValues)> = vec![];
        for record in reader.records() {
            let record = record.map_err(|e| malformed(e.to_string()))?;
            let year_field = record.get(year_column).unwrap_or_default();
            let year = parse_year(year_field)
                .ok_or_else(|| malformed(format!("invalid year '{}'", year_field)))?;

            let mut values = RegionalValues::filled(FloatValue::NAN);
            for (i, region) in &columns {
                let field = record.get(*i).unwrap_or_default();
                if field.is_empty() {
                    continue;
                }
                values[*region] = field.parse::<FloatValue>().map_err(|_| {
                    malformed(format!("invalid value '{}' for {} in {}", field, region, year))
                })?;
            }
            rows.push((year, values));
        }

        AnnualRegionalSeries::from_rows(rows).map_err(|e| malformed(e.to_string()))
    }
}

fn parse_year(field: &str) -> Option<Year> {
    field.parse::<Year>().ok().or_else(|| {
        field
            .parse::<FloatValue>()
            .ok()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as Year)
    })
}
