//! Fish-farm siting model.
//!
//! For every hexagon the model decides whether a cage farm (on a lake) or a
//! pond farm is feasible, how many tons per year the local labour force and
//! site could produce, and what that output earns after farm, transport and
//! infrastructure costs. It also reports the public cost of connecting the
//! site (grid extension or mini-grid, road upgrade) and the social benefit
//! of electrifying its households.
//!
//! Units: distances in km, money in USD, output in ton/yr.

use spider_types::{Attributes, ParameterSet};

use crate::error::ModelError;
use crate::evaluator::{Evaluator, NO_TECH, TECH};
use crate::inputs::{Inputs, put_number, put_text};

/// Counties that qualify for pond farming regardless of water access.
pub const KEY_COUNTIES: [&str; 16] = [
    "homa bay",
    "migori",
    "kakamega",
    "kirinyaga",
    "nyeri",
    "meru",
    "tharaka nithi",
    "kisii",
    "kisumu",
    "siaya",
    "busia",
    "embu",
    "kiambu",
    "machakos",
    "kajiado",
    "kitui",
];

/// People per household.
pub const PEOPLE_PER_HOUSEHOLD: f64 = 5.0;

/// Upper bound on the annuity horizon, in years.
const MAX_ANNUITY_YEARS: f64 = 1_000.0;

const OUTPUTS: &[&str] = &[
    "fish_output",
    "revenue",
    "profit",
    "gov_costs",
    "gov_annual",
    "social",
];

/// Kind of farm a site supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FarmType {
    /// Floating cages on a lake.
    Cage,
    /// Dug ponds.
    Pond,
    /// No viable farm.
    None,
}

impl FarmType {
    /// Label written to the `tech` output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cage => "cage",
            Self::Pond => "pond",
            Self::None => NO_TECH,
        }
    }
}

/// Road standard required by the expected traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadType {
    /// Asphalt.
    Paved,
    /// Gravel.
    Gravel,
    /// Unsurfaced.
    Earth,
}

/// Farm type and annual output of one site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Production {
    /// Farm type; [`FarmType::None`] whenever output is zero.
    pub farm_type: FarmType,
    /// Annual output in tons.
    pub fish_output: f64,
}

impl Production {
    const NONE: Self = Self {
        farm_type: FarmType::None,
        fish_output: 0.0,
    };
}

/// Present-value multiplier of a constant annual payment: the sum of
/// `1 / (1 + rate)^i` for `i` in `0..years` (years truncated).
pub fn npv(years: f64, rate: f64) -> f64 {
    let horizon = if years.is_nan() {
        0.0
    } else {
        years.trunc().min(MAX_ANNUITY_YEARS)
    };
    let discount = 1.0 + rate;
    let mut total = 0.0;
    let mut factor = 1.0;
    let mut year = 0.0;
    while year < horizon {
        total += factor;
        factor /= discount;
        year += 1.0;
    }
    total
}

fn is_key_county(county: &str) -> bool {
    let county = county.to_lowercase();
    KEY_COUNTIES.contains(&county.as_str())
}

/// Which farm type the site's water access supports.
pub fn classify(inputs: &Inputs<'_>) -> Result<FarmType, ModelError> {
    if inputs.attr("lake_dist")? < inputs.par("max_lake_dist")? {
        return Ok(FarmType::Cage);
    }
    let max_water = inputs.par("max_water_dist")?;
    let pond = inputs.attr("precip")? > inputs.par("min_precip")?
        || inputs.attr("water_dist")? < max_water
        || inputs.attr("river_dist")? < max_water
        || is_key_county(inputs.text("adm1")?);
    Ok(if pond { FarmType::Pond } else { FarmType::None })
}

/// Farm type and annual output, applying the rainfall and population
/// constraints.
///
/// Output is the least of the farm capacity, the labour-limited output and
/// `max_fish_output`. A site outside the population window or below the
/// rainfall threshold produces nothing and is classified [`FarmType::None`].
pub fn constrain_output(inputs: &Inputs<'_>) -> Result<Production, ModelError> {
    let pop = inputs.attr("pop")?;
    let precip = inputs.attr("precip")?;
    let eligible = precip > inputs.par("min_precip")?
        && pop > inputs.par("min_pop")?
        && pop < inputs.par("max_pop")?;
    if !eligible {
        return Ok(Production::NONE);
    }

    let farm_type = classify(inputs)?;
    let max_fish_output = inputs.par("max_fish_output")?;
    let (max_from_farm, labour_needed) = match farm_type {
        FarmType::Cage => (max_fish_output, 3.0),
        FarmType::Pond => (precip * 20.0, 1.0),
        FarmType::None => return Ok(Production::NONE),
    };

    let households = pop / PEOPLE_PER_HOUSEHOLD;
    let labour = households * inputs.par("labor_per_hh")?;
    let fish_output = max_fish_output.min(labour / labour_needed).min(max_from_farm);

    if fish_output > 0.0 {
        Ok(Production {
            farm_type,
            fish_output,
        })
    } else {
        Ok(Production::NONE)
    }
}

/// Road standard needed for local traffic plus fish trucks.
pub fn road_type(
    inputs: &Inputs<'_>,
    production: Production,
) -> Result<RoadType, ModelError> {
    let traffic = inputs.attr("pop")? / inputs.par("traffic_pp")?;
    let vehicles_per_ton = if production.farm_type == FarmType::Cage { 7.7 } else { 10.2 };
    let total = (vehicles_per_ton * production.fish_output)
        .mul_add(inputs.par("truck_econ_multi")?, traffic);
    Ok(if total > 200.0 * 365.0 {
        RoadType::Paved
    } else if total > 50.0 * 365.0 {
        RoadType::Gravel
    } else {
        RoadType::Earth
    })
}

/// Road upgrade capital cost, USD/km.
///
/// The dataset carries no current road standard, so the earth-to-gravel
/// figure applies everywhere; sites already near a road pay a 30 % premium.
fn road_capex_per_km(road_dist: f64) -> f64 {
    let cost = 92_266.0;
    if road_dist < 10.0 { cost * 1.3 } else { cost }
}

/// Road maintenance, USD/km/yr.
const fn road_maintenance_per_km(road: RoadType) -> f64 {
    match road {
        RoadType::Paved => 7_526.0,
        RoadType::Gravel => 5_822.0,
        RoadType::Earth => 0.0,
    }
}

/// Land rent, USD/ton/yr.
fn land_rent(inputs: &Inputs<'_>, farm_type: FarmType) -> Result<f64, ModelError> {
    let acres_per_ton = if farm_type == FarmType::Cage { 0.01 } else { 0.83 };
    let land_value = 4_000.0;
    Ok(acres_per_ton * land_value * inputs.par("interest_rate")?)
}

/// Public electrification capex for the site's households, USD.
fn elec_capex(inputs: &Inputs<'_>, households: f64) -> Result<f64, ModelError> {
    let grid_dist = inputs.attr("grid_dist")?;
    if grid_dist < 1.0 {
        Ok(0.0)
    } else if grid_dist < 20.0 {
        Ok(15_000.0f64.mul_add(grid_dist, 4_800.0 * households))
    } else {
        let kw_needed = households * 0.2;
        Ok(inputs
            .par("mg_cost_pkw")?
            .mul_add(kw_needed, 500.0 * households))
    }
}

/// Farm electricity cost, USD/ton/yr. Zero within grid-extension range,
/// otherwise the annuity of a mini-grid sized for ice and aeration.
fn farm_elec_cost(inputs: &Inputs<'_>, annuity: f64) -> Result<f64, ModelError> {
    if inputs.attr("grid_dist")? < 20.0 {
        return Ok(0.0);
    }
    let power = (inputs.par("ice_power")? + inputs.par("aeration_power")?).max(2.0);
    Ok(inputs.par("mg_cost_pkw")? * power / annuity)
}

/// Running costs, USD/ton.
fn running_costs(inputs: &Inputs<'_>, farm_type: FarmType) -> Result<f64, ModelError> {
    let aeration_hours = 10.0;
    let elec_aeration = aeration_hours * inputs.par("aeration_power")? * 365.0;
    let elec_price = 0.25;
    let feed = 1_375.0;
    let labour = 150.7;
    let fingerlings = 500.0;
    let misc = if farm_type == FarmType::Cage { 48.02 } else { 226.67 };
    let ice = elec_price * inputs.par("elec_ice")?;
    let aeration = elec_price * elec_aeration;
    Ok(feed + labour + fingerlings + misc + ice + aeration)
}

/// Transport to the nearest urban centre and on to the city, USD/ton/yr.
fn transport_costs(inputs: &Inputs<'_>) -> Result<f64, ModelError> {
    let urban_dist = inputs.attr("urban_dist")?;
    let urban_to_city = inputs.attr("city_dist")? - urban_dist;
    let to_urban = 1.214f64.mul_add(urban_dist, 7.88);
    let to_city = 0.086f64.mul_add(urban_to_city, 13.54);
    // Ice and fish double-handling.
    Ok(to_urban.mul_add(1.5, to_city * 2.0))
}

/// Social benefit of electrified cooking and lighting, USD/yr.
fn social_benefit(households: f64) -> f64 {
    let energy_per_household = 1_875.0 + 21.9;
    let co2_per_kwh = 1.47;
    let value_per_kg = 0.15 + 0.1;
    value_per_kg * co2_per_kwh * energy_per_household * households
}

/// The fish-farm deployment.
#[derive(Debug, Clone, Copy, Default)]
pub struct FishModel;

impl FishModel {
    fn run(inputs: &Inputs<'_>) -> Result<Attributes, ModelError> {
        let mut out = Attributes::new();
        let production = constrain_output(inputs)?;
        let farm_type = production.farm_type;

        if farm_type == FarmType::None {
            put_text(&mut out, TECH, NO_TECH);
            for name in OUTPUTS {
                put_number(&mut out, name, 0.0);
            }
            return Ok(out);
        }

        let fish_output = production.fish_output;
        let households = inputs.attr("pop")? / PEOPLE_PER_HOUSEHOLD;
        let annuity = npv(inputs.par("duration")?, inputs.par("interest_rate")?);

        let farm_capex = if farm_type == FarmType::Cage { 138.89 } else { 1_950.0 };
        let equipment_capex = 1_000.0 + 200.0;
        let costs_per_ton = land_rent(inputs, farm_type)?
            + farm_elec_cost(inputs, annuity)?
            + running_costs(inputs, farm_type)?
            + farm_capex / annuity
            + equipment_capex / annuity
            + transport_costs(inputs)?;

        let fish_price = inputs.par("fish_price")?;
        let revenue_per_ton = if farm_type == FarmType::Pond { fish_price * 0.75 } else { fish_price };
        let profit_per_ton = revenue_per_ton - costs_per_ton;

        let grid_dist = inputs.attr("grid_dist")?;
        let road_dist = inputs.attr("road_dist")?;
        let infra_cost = inputs
            .par("grid_cost")?
            .mul_add(grid_dist, inputs.par("road_cost")? * road_dist);

        let revenue = revenue_per_ton * fish_output;
        let profit = profit_per_ton.mul_add(fish_output, -infra_cost);

        let road = road_type(inputs, production)?;
        let gov_costs = road_capex_per_km(road_dist).mul_add(road_dist, elec_capex(inputs, households)?);
        let gov_annual = road_maintenance_per_km(road) * road_dist;

        put_text(&mut out, TECH, farm_type.as_str());
        put_number(&mut out, "fish_output", fish_output);
        put_number(&mut out, "revenue", revenue);
        put_number(&mut out, "profit", profit);
        put_number(&mut out, "gov_costs", gov_costs);
        put_number(&mut out, "gov_annual", gov_annual);
        put_number(&mut out, "social", social_benefit(households));
        Ok(out)
    }
}

impl Evaluator for FishModel {
    fn name(&self) -> &'static str {
        "fish"
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
