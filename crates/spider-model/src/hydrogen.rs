//! Green hydrogen production model.
//!
//! Levelised PV and wind electricity cost from local resource, electrolyser
//! cost, compression or liquefaction, water supply, and transport to the
//! export port. Costs are in EUR; electricity in EUR/MWh, hydrogen in
//! EUR/kg.

use spider_types::{Attributes, ParameterSet};

use crate::error::ModelError;
use crate::evaluator::{Evaluator, NO_TECH, TECH};
use crate::inputs::{Inputs, put_number, put_text};

const PV_LIFETIME: f64 = 20.0;
/// EUR/kWp/yr.
const PV_OPEX: f64 = 9.3;

const WIND_LIFETIME: f64 = 20.0;
/// EUR/kW/yr.
const WIND_OPEX: f64 = 40.0;
/// Turbine power coefficient.
const CP: f64 = 0.45;
/// Air density, kg/m³.
const AIR_DENSITY: f64 = 1.14;
/// Rotor diameter, m.
const ROTOR_DIAMETER: f64 = 100.0;
/// Rated turbine power used to normalise output, kW.
const TURBINE_RATING: f64 = 3_000.0;
const PI_APPROX: f64 = 3.14;

/// Electrolyser capex, EUR/kW.
const ELY_CAPEX: f64 = 1_280.0;
/// Electrolyser opex as a share of capex per year.
const ELY_OPEX: f64 = 0.02;
const ELY_LIFETIME: f64 = 10.0;
const ELY_EFFICIENCY: f64 = 0.6;
const ELY_CAPACITY_FACTOR: f64 = 0.6;
/// Litres of water per kg of hydrogen.
const ELY_WATER: f64 = 10.0;
/// Electrolyser output pressure, bar.
const ELY_OUTPUT_PRESSURE: f64 = 30.0;

/// EUR/m³.
const WATER_SPEC_COST: f64 = 1.2;
/// kWh/kg.
const H2_ENERGY_DENSITY: f64 = 33.33;
/// Liquefaction energy, kWh/kg.
const LIQUEFACTION_ENERGY: f64 = 9.0;

const HOURS_PER_YEAR: f64 = 8_760.0;

const OUTPUTS: &[&str] = &[
    "cost_elec_pv",
    "cost_elec_wind",
    "cost_elec",
    "cost_h2",
    "cost_h2_ocean",
    "turbine_output",
    "pv_radiation",
    "wind_speed",
    "h2_cost_to_demand",
    "pv_kWh",
    "wind_kWh",
];

/// Physical state hydrogen is delivered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum H2State {
    /// Cryogenic liquid.
    Liquid,
    /// Compressed gas.
    Compressed,
}

/// Where electrolysis water comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterSource {
    /// Lakes and rivers.
    Domestic,
    /// Desalinated sea water.
    Ocean,
    /// Whichever of the two is cheaper at the site.
    Cheapest,
}

impl H2State {
    fn parse(value: &str) -> Result<Self, ModelError> {
        if value.contains("Liquid") {
            Ok(Self::Liquid)
        } else if value.contains("bar") {
            Ok(Self::Compressed)
        } else {
            Err(ModelError::InvalidChoice {
                name: "h2_state".to_owned(),
                value: value.to_owned(),
            })
        }
    }
}

impl WaterSource {
    fn parse(value: &str) -> Result<Self, ModelError> {
        if value.contains("Domestic") {
            Ok(Self::Domestic)
        } else if value.contains("Ocean") {
            Ok(Self::Ocean)
        } else if value.contains("Cheapest") {
            Ok(Self::Cheapest)
        } else {
            Err(ModelError::InvalidChoice {
                name: "water_resource".to_owned(),
                value: value.to_owned(),
            })
        }
    }
}

/// Present value factor of an annuity at `rate` over `lifetime` years.
///
/// A zero rate degenerates to the lifetime itself.
pub fn pvf(rate: f64, lifetime: f64) -> f64 {
    if rate.abs() < f64::EPSILON {
        return lifetime;
    }
    let growth = (1.0 + rate).powf(lifetime);
    (growth - 1.0) / (growth * rate)
}

/// Yearly output of one turbine at mean wind speed `wind`, normalised by
/// rated power.
pub fn turbine_output(wind: f64) -> f64 {
    let swept_area = ROTOR_DIAMETER.powi(2) * PI_APPROX / 4.0;
    0.5 * CP * AIR_DENSITY * swept_area * wind.powi(3) * HOURS_PER_YEAR / 1_000.0 / TURBINE_RATING
}

/// Compression or liquefaction cost, EUR/kg.
fn handling_cost(state: H2State, cost_elec: f64) -> f64 {
    let per_kwh = cost_elec / 1_000.0;
    match state {
        H2State::Liquid => LIQUEFACTION_ENERGY * per_kwh,
        H2State::Compressed => {
            let exponent = 0.4 / 1.4;
            let work = 0.003_944 * 298.15 * ((500.0 / ELY_OUTPUT_PRESSURE).powf(exponent) - 1.0);
            work / 0.8 * per_kwh
        }
    }
}

/// Water supply cost per kg of hydrogen for a source `distance` km away
/// needing `treatment` kWh/m³.
fn water_cost(transport: f64, distance: f64, treatment: f64, cost_elec: f64) -> f64 {
    (transport / 100.0).mul_add(distance, treatment.mul_add(cost_elec, WATER_SPEC_COST)) * ELY_WATER
        / 1_000.0
}

/// The hydrogen deployment.
#[derive(Debug, Clone, Copy, Default)]
pub struct HydrogenModel;

impl HydrogenModel {
    fn run(inputs: &Inputs<'_>) -> Result<Attributes, ModelError> {
        let pv = inputs.attr("pv")?;
        let wind = inputs.attr("wind")?;
        let rate = inputs.par("interest_rate")? / 100.0;

        // Levelised electricity, EUR/MWh.
        let cost_elec_pv =
            (inputs.par("pv_capex")? / pvf(rate, PV_LIFETIME) + PV_OPEX) / pv / 365.0 * 1_000.0;
        let turbine = turbine_output(wind);
        let cost_elec_wind =
            (inputs.par("wind_capex")? / pvf(rate, WIND_LIFETIME) + WIND_OPEX) / turbine * 1_000.0;
        let cost_elec = cost_elec_pv.min(cost_elec_wind);
        let elec_technology = if cost_elec_pv > cost_elec_wind { "wind" } else { "pv" };

        let cost_ely = (ELY_CAPEX / pvf(rate, ELY_LIFETIME)) / (ELY_CAPACITY_FACTOR * HOURS_PER_YEAR)
            * (H2_ENERGY_DENSITY / ELY_EFFICIENCY)
            * (1.0 + ELY_OPEX);
        let cost_elec_h2 = cost_elec / 1_000.0 * (H2_ENERGY_DENSITY / ELY_EFFICIENCY);
        let handling = handling_cost(H2State::parse(inputs.choice("h2_state")?)?, cost_elec);

        let transport = inputs.par("water_tran_cost")?;
        let ocean_water = water_cost(
            transport,
            inputs.attr("ocean_dist")?,
            inputs.par("elec_ocean_water_treatment")?,
            cost_elec,
        );
        let water = match WaterSource::parse(inputs.choice("water_resource")?)? {
            WaterSource::Ocean => ocean_water,
            source => {
                let domestic = water_cost(
                    transport,
                    inputs.attr("water_dist")?,
                    inputs.par("elec_water_treatment")?,
                    cost_elec,
                );
                if source == WaterSource::Cheapest { domestic.min(ocean_water) } else { domestic }
            }
        };

        let base = cost_elec_h2 + cost_ely + handling;
        let cost_h2_ocean = base + ocean_water;
        let cost_h2 = base + water;
        let h2_cost_to_demand =
            inputs.par("h2_trans_cost")?.mul_add(inputs.attr("mombasa_dist")? / 100.0, cost_h2);

        // Restricted surface (forest, farmland, water) is unavailable.
        let available_area = inputs.attr("avail_area")? - inputs.attr("rest_area")?;
        let usable = available_area > inputs.par("min_area")?;
        let (pv_kwp, wind_turbines) = if usable {
            let area_m2 = available_area * 1_000_000.0;
            let spacing = inputs.par("wind_dist")? * ROTOR_DIAMETER;
            (
                area_m2 / inputs.par("pv_size")?,
                area_m2 / (PI_APPROX * spacing.powi(2) / 4.0),
            )
        } else {
            (0.0, 0.0)
        };
        // GWh per year.
        let pv_kwh = pv_kwp * pv / 1_000_000.0;
        let wind_kwh = turbine * wind_turbines / 1_000_000.0;

        let mut out = Attributes::new();
        put_text(&mut out, TECH, if usable { elec_technology } else { NO_TECH });
        put_text(&mut out, "elec_technology", elec_technology);
        put_number(&mut out, "cost_elec_pv", cost_elec_pv);
        put_number(&mut out, "cost_elec_wind", cost_elec_wind);
        put_number(&mut out, "cost_elec", cost_elec);
        put_number(&mut out, "cost_h2", cost_h2);
        put_number(&mut out, "cost_h2_ocean", cost_h2_ocean);
        put_number(&mut out, "turbine_output", turbine);
        put_number(&mut out, "pv_radiation", pv * 365.0);
        put_number(&mut out, "wind_speed", wind);
        put_number(&mut out, "h2_cost_to_demand", h2_cost_to_demand);
        put_number(&mut out, "pv_kWh", pv_kwh);
        put_number(&mut out, "wind_kWh", wind_kwh);
        Ok(out)
    }
}

impl Evaluator for HydrogenModel {
    fn name(&self) -> &'static str {
        "hydrogen"
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
