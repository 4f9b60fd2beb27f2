//! Batch scenarios: apply parameter overrides and drawn infrastructure to a
//! session without the browser, then export the result.

use serde_json::Value;
use spider_core::Session;
use spider_grid::Geometry;
use spider_types::{ParameterSet, ParameterValue};
use tracing::info;

use crate::error::CliError;

/// Property of a drawn feature that names the attribute it lowers.
pub const TYPE_KEY: &str = "type";

/// Parse a `name=value` override. Numeric values become numbers, anything
/// else a categorical choice.
pub fn parse_assignment(s: &str) -> Result<(String, ParameterValue), CliError> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| CliError::Assignment(s.to_owned()))?;
    let name = name.trim();
    let value = value.trim();
    if name.is_empty() || value.is_empty() {
        return Err(CliError::Assignment(s.to_owned()));
    }
    let value = value
        .parse::<f64>()
        .map_or_else(|_| ParameterValue::Choice(value.to_owned()), ParameterValue::Number);
    Ok((name.to_owned(), value))
}

/// Split a drawn-lines `FeatureCollection` into `(attribute, geometry)`
/// pairs, in document order.
pub fn parse_lines(collection: &Value) -> Result<Vec<(String, Geometry)>, CliError> {
    let features = collection
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| CliError::Lines {
            feature: 0,
            reason: "not a FeatureCollection".to_owned(),
        })?;

    features
        .iter()
        .enumerate()
        .map(|(feature, f)| {
            let attribute = f
                .get("properties")
                .and_then(|p| p.get(TYPE_KEY))
                .and_then(Value::as_str)
                .ok_or_else(|| CliError::Lines {
                    feature,
                    reason: format!("missing properties.{TYPE_KEY}"),
                })?;
            let geometry = f
                .get("geometry")
                .cloned()
                .ok_or_else(|| CliError::Lines {
                    feature,
                    reason: "missing geometry".to_owned(),
                })?;
            let geometry: Geometry =
                serde_json::from_value(geometry).map_err(|e| CliError::Lines {
                    feature,
                    reason: e.to_string(),
                })?;
            Ok((attribute.to_owned(), geometry))
        })
        .collect()
}

/// Apply overrides, then every drawing, to `session`.
pub fn apply(
    session: &mut Session,
    overrides: &ParameterSet,
    lines: &[(String, Geometry)],
) -> Result<(), CliError> {
    if !overrides.is_empty() {
        session.set_parameters(overrides)?;
    }
    for (attribute, geometry) in lines {
        let summary = session.draw(attribute, geometry)?;
        info!(
            attribute = %attribute,
            seeds = summary.seeds,
            relaxed = summary.propagation.relaxed,
            "line applied"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use spider_core::{InfraDef, InfraKind, ParameterDef, SpiderConfig};
    use spider_grid::HexGrid;
    use spider_model::ModelKind;
    use spider_types::{AttrValue, Cell, CellIndex, Coord, NEIGHBOR_COUNT};

    use super::*;

    #[test]
    fn assignments() {
        assert!(matches!(
            parse_assignment("duration=12"),
            Ok((name, ParameterValue::Number(v))) if name == "duration" && (v - 12.0).abs() < 1e-12
        ));
        assert!(matches!(
            parse_assignment(" Tech_type = pump "),
            Ok((name, ParameterValue::Choice(c))) if name == "Tech_type" && c == "pump"
        ));
        assert!(matches!(parse_assignment("duration"), Err(CliError::Assignment(_))));
        assert!(matches!(parse_assignment("=3"), Err(CliError::Assignment(_))));
    }

    #[test]
    fn lines_need_a_type() {
        let fc = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"type": "grid_dist"},
                 "geometry": {"type": "Point", "coordinates": [0.05, 0.0]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Point", "coordinates": [0.05, 0.0]}}
            ]
        });
        assert!(matches!(parse_lines(&fc), Err(CliError::Lines { feature: 1, .. })));

        let first_only = json!({"features": [fc["features"][0].clone()]});
        let lines = parse_lines(&first_only).unwrap_or_default();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().map(|(a, g)| (a.as_str(), g.kind())), Some(("grid_dist", "Point")));
        assert!(matches!(parse_lines(&json!([])), Err(CliError::Lines { feature: 0, .. })));
    }

    #[test]
    fn apply_overrides_and_lines() {
        let cells = (0..2_u32)
            .map(|i| {
                let mut neighbors = [None; NEIGHBOR_COUNT];
                neighbors[0] = Some(CellIndex(1 - i));
                let x0 = f64::from(i) * 0.1;
                let mut cell = Cell::new(CellIndex(i), neighbors)
                    .with_attribute("city_dist", 10.0)
                    .with_attribute("grid_dist", 100.0);
                cell.footprint = vec![
                    Coord::new(x0, -0.05),
                    Coord::new(x0 + 0.1, -0.05),
                    Coord::new(x0 + 0.1, 0.05),
                    Coord::new(x0, 0.05),
                    Coord::new(x0, -0.05),
                ];
                cell
            })
            .collect();
        let config = SpiderConfig {
            model: ModelKind::Example,
            pars: vec![ParameterDef {
                col: "duration".to_owned(),
                label: "Duration".to_owned(),
                unit: "years".to_owned(),
                min: Some(1.0),
                max: Some(30.0),
                val: ParameterValue::Number(10.0),
                cats: Vec::new(),
            }],
            infra: vec![InfraDef {
                col: "grid_dist".to_owned(),
                label: "Grid".to_owned(),
                kind: InfraKind::Line,
                color: "#FF0000".to_owned(),
            }],
            ..SpiderConfig::default()
        };
        let Some(mut session) = HexGrid::new(cells)
            .ok()
            .and_then(|grid| Session::new(&config, grid).ok())
        else {
            panic!("session failed to build");
        };

        let overrides: ParameterSet = [parse_assignment("duration=2")]
            .into_iter()
            .flatten()
            .collect();
        let lines = vec![(
            "grid_dist".to_owned(),
            Geometry::Point { coordinates: Coord::new(0.15, 0.0) },
        )];
        assert!(apply(&mut session, &overrides, &lines).is_ok());

        assert_eq!(session.grid().column("grid_dist").unwrap_or_default(), vec![10.0, 0.0]);
        assert_eq!(
            session.derived().first().and_then(|d| d.get("gov_costs")).and_then(AttrValue::as_number),
            Some(200.0)
        );
    }
}
