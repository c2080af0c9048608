//! Helper tables
//!
//! Reconciles two fixed datapoints per region, an observed initial-year adoption and a
//! target-year adoption, into annual adoption series for the reference and solution paths.
//!
//! The reference path interpolates linearly between its datapoints unless a custom reference
//! series is configured. The solution path follows the adoption trend for World, and for the
//! other regions too when regional data is enabled; anything the trend does not cover falls
//! back to the interpolation. Every value is then floored at zero and capped by the path's
//! TAM, and finally the datapoints are written exactly at both anchor years.
//!
//! # Inputs
//!
//! * `ref_tam_per_region`
//! * `pds_tam_per_region`
//! * `adoption_trend_per_region`
//! * `ref_adoption_custom_per_region` : only with a custom reference basis
//!
//! # Outputs
//!
//! * `soln_ref_funits_adopted`
//! * `soln_pds_funits_adopted`

use drawdown_core::component::{Component, InputState, OutputState, RequirementDefinition};
use drawdown_core::errors::ModelResult;
use drawdown_core::region::Region;
use drawdown_core::scenario::RefAdoptionBasis;
use drawdown_core::series::{AnnualRegionalSeries, FloatValue, RegionalValues, Year};
use drawdown_core::standard_variables::{
    VAR_ADOPTION_TREND, VAR_PDS_TAM, VAR_REF_ADOPTION_CUSTOM, VAR_REF_TAM,
    VAR_SOLN_PDS_FUNITS_ADOPTED, VAR_SOLN_REF_FUNITS_ADOPTED,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelperTablesParameters {
    pub initial_year: Year,
    pub final_year: Year,
    pub report_end_year: Year,
    pub ref_adoption_initial: RegionalValues,
    pub pds_adoption_initial: RegionalValues,
    /// Share of the final-year PDS TAM; regions without an entry target zero
    pub pds_adoption_final_percentage: RegionalValues,
    pub ref_adoption_basis: RefAdoptionBasis,
    pub ref_adoption_regional_data: bool,
    pub pds_adoption_regional_data: bool,
}

/// Initial and final adoption per region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datapoints {
    pub initial: RegionalValues,
    pub target: RegionalValues,
}

#[derive(Debug, Clone)]
pub struct HelperTables {
    parameters: HelperTablesParameters,
}

impl HelperTables {
    pub fn from_parameters(parameters: HelperTablesParameters) -> Self {
        Self { parameters }
    }

    /// Last year of the produced series
    pub fn last_year(&self) -> Year {
        self.parameters
            .final_year
            .max(self.parameters.report_end_year)
    }

    /// Reference datapoints; the target keeps the initial share of the reference TAM
    pub fn ref_datapoints(&self, ref_tam: &AnnualRegionalSeries) -> ModelResult<Datapoints> {
        let initial_tam = ref_tam.row(self.parameters.initial_year)?;
        let final_tam = ref_tam.row(self.parameters.final_year)?;
        let initial = self.parameters.ref_adoption_initial;
        let target = final_tam
            .zip_with(&initial_tam, |f, i| f / i)
            .zip_with(&initial, |ratio, adoption| ratio * adoption)
            .map(|v| if v.is_finite() { v } else { 0.0 });
        Ok(Datapoints { initial, target })
    }

    /// Solution-path datapoints; the target is the configured share of the final PDS TAM
    pub fn pds_datapoints(&self, pds_tam: &AnnualRegionalSeries) -> ModelResult<Datapoints> {
        let target = self
            .parameters
            .pds_adoption_final_percentage
            .zip_with(&pds_tam.row(self.parameters.final_year)?, |pct, tam| pct * tam)
            .map(|v| if v.is_nan() { 0.0 } else { v });
        Ok(Datapoints {
            initial: self.parameters.pds_adoption_initial,
            target,
        })
    }

    fn interpolate(&self, datapoints: &Datapoints, year: Year, region: Region) -> FloatValue {
        let (first, last) = (self.parameters.initial_year, self.parameters.final_year);
        let (start, end) = (datapoints.initial[region], datapoints.target[region]);
        if last == first {
            return start;
        }
        start + (end - start) * (year - first) as FloatValue / (last - first) as FloatValue
    }

    /// Build one path: `follow` supplies a value where the path tracks a series, NaN otherwise
    fn reconcile(
        &self,
        datapoints: &Datapoints,
        tam: &AnnualRegionalSeries,
        follow: impl Fn(Year, Region) -> ModelResult<FloatValue>,
    ) -> ModelResult<AnnualRegionalSeries> {
        let (first, last) = (self.parameters.initial_year, self.last_year());
        let mut rows = Vec::with_capacity((last - first + 1).max(0) as usize);
        for year in first..=last {
            let mut row = RegionalValues::filled(0.0);
            for region in Region::ALL {
                let mut value = follow(year, region)?;
                if value.is_nan() {
                    value = self.interpolate(datapoints, year, region);
                }
                let cap = tam.get(year, region)?;
                if !cap.is_nan() && value > cap {
                    value = cap;
                }
                row[region] = value.max(0.0);
            }
            rows.push((year, row));
        }

        let mut adoption = AnnualRegionalSeries::from_rows(rows)?;
        adoption.set_row(first, &datapoints.initial)?;
        adoption.set_row(self.parameters.final_year, &datapoints.target)?;
        Ok(adoption)
    }

    pub fn calculate_ref_adoption(
        &self,
        ref_tam: &AnnualRegionalSeries,
        custom: Option<&AnnualRegionalSeries>,
    ) -> ModelResult<AnnualRegionalSeries> {
        let datapoints = self.ref_datapoints(ref_tam)?;
        let regional = self.parameters.ref_adoption_regional_data;
        self.reconcile(&datapoints, ref_tam, |year, region| match custom {
            Some(custom) if region == Region::World || regional => custom.get(year, region),
            _ => Ok(FloatValue::NAN),
        })
    }

    pub fn calculate_pds_adoption(
        &self,
        pds_tam: &AnnualRegionalSeries,
        adoption_trend: &AnnualRegionalSeries,
    ) -> ModelResult<AnnualRegionalSeries> {
        let datapoints = self.pds_datapoints(pds_tam)?;
        let regional = self.parameters.pds_adoption_regional_data;
        self.reconcile(&datapoints, pds_tam, |year, region| {
            if region == Region::World || regional {
                adoption_trend.get(year, region)
            } else {
                Ok(FloatValue::NAN)
            }
        })
    }
}

impl Component for HelperTables {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        let mut definitions = vec![
            VAR_REF_TAM.as_input(),
            VAR_PDS_TAM.as_input(),
            VAR_ADOPTION_TREND.as_input(),
            VAR_SOLN_REF_FUNITS_ADOPTED.as_output(),
            VAR_SOLN_PDS_FUNITS_ADOPTED.as_output(),
        ];
        if self.parameters.ref_adoption_basis == RefAdoptionBasis::Custom {
            definitions.push(VAR_REF_ADOPTION_CUSTOM.as_input());
        }
        definitions
    }

    fn solve(&self, input_state: &InputState) -> ModelResult<OutputState> {
        let ref_tam = input_state.get_series(VAR_REF_TAM.name)?;
        let pds_tam = input_state.get_series(VAR_PDS_TAM.name)?;
        let trend = input_state.get_series(VAR_ADOPTION_TREND.name)?;
        let custom = match self.parameters.ref_adoption_basis {
            RefAdoptionBasis::Custom => Some(input_state.get_series(VAR_REF_ADOPTION_CUSTOM.name)?),
            RefAdoptionBasis::Default => None,
        };

        let reference = self.calculate_ref_adoption(ref_tam, custom)?;
        let pds = self.calculate_pds_adoption(pds_tam, trend)?;
        Ok(OutputState::from([
            (VAR_SOLN_REF_FUNITS_ADOPTED.name.to_string(), reference.into()),
            (VAR_SOLN_PDS_FUNITS_ADOPTED.name.to_string(), pds.into()),
        ]))
    }
}
