//! Crop irrigation model.
//!
//! Estimates crop production under the chosen irrigation technology, the
//! cost of trucking it to market and of pumping groundwater, and the
//! resulting revenue and profit.

use spider_types::{Attributes, ParameterSet};

use crate::error::ModelError;
use crate::evaluator::{Evaluator, NO_TECH, TECH};
use crate::inputs::{Inputs, put_number, put_text};

/// Area of one hexagon, km².
const HEX_AREA_KM2: f64 = 0.737_327_6;
/// Hectares per km².
const HA_PER_KM2: f64 = 100.0;
/// Crop water need, m³ per ton per year.
const CROP_WATER_NEEDS: f64 = 50.0;
const PUMP_EFFICIENCY: f64 = 0.8;
/// Electricity price, USD/kWh.
const KWH_COST: f64 = 0.8;
/// Production below this many tons is not worth farming.
const MIN_PRODUCTION: f64 = 0.5;

const OUTPUTS: &[&str] = &["crop_production", "transp_cost", "irrig_cost", "revenue", "profit"];

/// Yield multiplier of the `Tech_type` choice.
pub fn production_multiplier(inputs: &Inputs<'_>) -> Result<f64, ModelError> {
    match inputs.choice("Tech_type")? {
        "pump" => Ok(2.5),
        "bore" => Ok(1.9),
        "rain" => Ok(0.7),
        other => Err(ModelError::InvalidChoice {
            name: "Tech_type".to_owned(),
            value: other.to_owned(),
        }),
    }
}

/// The irrigation deployment.
#[derive(Debug, Clone, Copy, Default)]
pub struct IrrigationModel;

impl IrrigationModel {
    fn run(inputs: &Inputs<'_>) -> Result<Attributes, ModelError> {
        let extent = inputs.attr("crop_extentmajority")?;
        let crop_production = (extent * 0.5 / 100.0)
            * HEX_AREA_KM2
            * HA_PER_KM2
            * inputs.attr("cropyield")?
            * production_multiplier(inputs)?;

        let transp_cost =
            (inputs.attr("MarketDist")? * 833.0 / 1_000.0) * extent * inputs.par("tcostperton_km")?;

        let pumping = crop_production
            * CROP_WATER_NEEDS
            * inputs.attr("WTDmean")?
            * inputs.par("pumpenergyint")?
            / PUMP_EFFICIENCY;
        let irrig_cost = pumping * KWH_COST * inputs.attr("GridDist")?;

        let revenue = crop_production * inputs.par("crop_price")?;
        let profit = revenue - transp_cost - irrig_cost;

        let tech = if crop_production > MIN_PRODUCTION { "agri" } else { NO_TECH };

        let mut out = Attributes::new();
        put_number(&mut out, "crop_production", crop_production);
        put_number(&mut out, "transp_cost", transp_cost);
        put_number(&mut out, "irrig_cost", irrig_cost);
        put_number(&mut out, "revenue", revenue);
        put_number(&mut out, "profit", profit);
        put_text(&mut out, TECH, tech);
        Ok(out)
    }
}

impl Evaluator for IrrigationModel {
    fn name(&self) -> &'static str {
        "irrigation"
    }

    fn outputs(&self) -> &'static [&'static str] {
        OUTPUTS
    }

    fn evaluate(
        &self,
        attributes: &Attributes,
        parameters: &ParameterSet,
    ) -> Result<Attributes, ModelError> {
        Self::run(&Inputs::new(attributes, parameters))
    }
}
