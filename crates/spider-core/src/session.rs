//! The interactive session: one working grid, its baseline, and the model.
//!
//! A [`Session`] owns the mutable working copy of the grid, the immutable
//! [`Baseline`] captured at load, the active [`Evaluator`], the current
//! parameter values, and the derived attributes of the last evaluation
//! pass. Every mutating operation runs on copies and commits only when the
//! whole propagate-then-recompute cycle succeeds, so a failed request
//! leaves the previous state untouched.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use spider_grid::{
    Baseline, Geometry, GridError, HexGrid, PropagationReport, propagate, read_hex_file,
    select_seeds, to_feature_collection,
};
use spider_model::{Evaluator, ModelError, TECH};
use spider_types::{
    AttrValue, Attributes, CellIndex, ParameterSet, ParameterValue, PropagationRequest,
};
use tracing::{debug, info};

use crate::config::{ConfigError, InfraDef, ParameterDef, SpiderConfig, ValueError};

/// Errors that can occur while driving a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A grid operation failed (loading, propagation, restore).
    #[error(transparent)]
    Grid(#[from] GridError),

    /// The evaluator rejected a cell.
    #[error("cell {cell}: {source}")]
    Evaluation {
        /// The cell being evaluated.
        cell: CellIndex,
        /// The model error.
        #[source]
        source: ModelError,
    },

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A parameter update names a parameter the deployment does not define.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// A parameter update violates the parameter's bounds or choices.
    #[error("parameter {name}: {source}")]
    InvalidParameter {
        /// The parameter name.
        name: String,
        /// The violation.
        #[source]
        source: ValueError,
    },

    /// The attribute is not a configured infrastructure column.
    #[error("attribute {0:?} cannot be drawn")]
    NotDrawable(String),

    /// No cell has this index.
    #[error("cell not found: {0}")]
    CellNotFound(CellIndex),
}

/// Headline figures of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecomputeSummary {
    /// Number of cells evaluated.
    pub cells: usize,
    /// Number of cells per technology label.
    pub tech_counts: BTreeMap<String, usize>,
    /// Sum of each numeric model output across all cells.
    pub totals: BTreeMap<String, f64>,
}

/// Result of a propagation or drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawSummary {
    /// The attribute lowered.
    pub attribute: String,
    /// Number of seed cells.
    pub seeds: usize,
    /// What the propagator did.
    pub propagation: PropagationReport,
    /// The evaluation pass that followed.
    pub recompute: RecomputeSummary,
}

/// Result of restoring one attribute from the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResetSummary {
    /// The attribute restored.
    pub attribute: String,
    /// Number of cells whose value changed back.
    pub restored: usize,
    /// The evaluation pass that followed.
    pub recompute: RecomputeSummary,
}

/// One cell as the map popup needs it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellView {
    /// The cell index.
    pub index: CellIndex,
    /// Valid neighbours.
    pub neighbors: Vec<CellIndex>,
    /// Static attributes, including the current value of drawn columns.
    pub attributes: Attributes,
    /// Model outputs of the last pass.
    pub derived: Attributes,
}

/// A loaded deployment ready to answer map requests.
pub struct Session {
    name: String,
    grid: HexGrid,
    baseline: Baseline,
    evaluator: Box<dyn Evaluator>,
    definitions: Vec<ParameterDef>,
    infra: Vec<InfraDef>,
    parameters: ParameterSet,
    step_size: f64,
    derived: Vec<Attributes>,
    summary: RecomputeSummary,
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("model", &self.evaluator.name())
            .field("cells", &self.grid.len())
            .field("parameters", &self.parameters)
            .field("step_size", &self.step_size)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Load the dataset named by `config` and run the first evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Grid`] if the dataset cannot be loaded or an
    /// infrastructure column is missing from a cell, or
    /// [`SessionError::Evaluation`] if the defaults do not evaluate.
    pub fn from_config(config: &SpiderConfig) -> Result<Self, SessionError> {
        let grid = read_hex_file(&config.data)?;
        Self::new(config, grid)
    }

    /// Build a session over an already-loaded grid.
    ///
    /// # Errors
    ///
    /// As [`Session::from_config`], minus dataset IO.
    pub fn new(config: &SpiderConfig, grid: HexGrid) -> Result<Self, SessionError> {
        Self::with_evaluator(config, grid, config.model.build())
    }

    /// Build a session that evaluates with `evaluator` instead of the
    /// configured model.
    ///
    /// # Errors
    ///
    /// As [`Session::new`].
    pub fn with_evaluator(
        config: &SpiderConfig,
        grid: HexGrid,
        evaluator: Box<dyn Evaluator>,
    ) -> Result<Self, SessionError> {
        let baseline = Baseline::capture(&grid, config.infra.iter().map(|i| i.col.as_str()))?;
        let mut session = Self {
            name: config.name.clone(),
            grid,
            baseline,
            evaluator,
            definitions: config.pars.clone(),
            infra: config.infra.clone(),
            parameters: config.parameter_set(),
            step_size: config.hex_size_km,
            derived: Vec::new(),
            summary: RecomputeSummary::default(),
        };
        session.recompute()?;
        info!(
            name = %session.name,
            model = session.evaluator.name(),
            cells = session.grid.len(),
            "session ready"
        );
        Ok(session)
    }

    /// Deployment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the active evaluator.
    pub fn model_name(&self) -> &'static str {
        self.evaluator.name()
    }

    /// Numeric outputs of the active evaluator.
    pub fn model_outputs(&self) -> &'static [&'static str] {
        self.evaluator.outputs()
    }

    /// The working grid.
    pub const fn grid(&self) -> &HexGrid {
        &self.grid
    }

    /// Parameter definitions.
    pub fn definitions(&self) -> &[ParameterDef] {
        &self.definitions
    }

    /// Drawable infrastructure columns.
    pub fn infra(&self) -> &[InfraDef] {
        &self.infra
    }

    /// Current parameter values.
    pub const fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Derived attributes of the last pass, in index order.
    pub fn derived(&self) -> &[Attributes] {
        &self.derived
    }

    /// Headline figures of the last pass.
    pub const fn summary(&self) -> &RecomputeSummary {
        &self.summary
    }

    /// Propagation step used when drawing, in km.
    pub const fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Run the evaluator over every cell of `grid` with `parameters`.
    fn evaluate_all(
        &self,
        grid: &HexGrid,
        parameters: &ParameterSet,
    ) -> Result<(Vec<Attributes>, RecomputeSummary), SessionError> {
        let mut derived = Vec::with_capacity(grid.len());
        let mut summary = RecomputeSummary {
            cells: grid.len(),
            ..RecomputeSummary::default()
        };
        for name in self.evaluator.outputs() {
            summary.totals.insert((*name).to_owned(), 0.0);
        }

        for cell in grid.iter() {
            let outputs = self
                .evaluator
                .evaluate(&cell.attributes, parameters)
                .map_err(|source| SessionError::Evaluation {
                    cell: cell.index,
                    source,
                })?;

            if let Some(tech) = outputs.get(TECH).and_then(AttrValue::as_text) {
                let count = summary.tech_counts.entry(tech.to_owned()).or_insert(0);
                *count = count.saturating_add(1);
            }
            for (name, total) in &mut summary.totals {
                if let Some(value) = outputs.get(name).and_then(AttrValue::as_number) {
                    *total += value;
                }
            }
            derived.push(outputs);
        }
        Ok((derived, summary))
    }

    fn commit(&mut self, derived: Vec<Attributes>, summary: RecomputeSummary) -> RecomputeSummary {
        self.derived = derived;
        self.summary = summary;
        self.summary.clone()
    }

    /// Re-run the evaluator over every cell with the current parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Evaluation`] for the first cell the model
    /// rejects; the previous derived attributes are kept.
    pub fn recompute(&mut self) -> Result<RecomputeSummary, SessionError> {
        let (derived, summary) = self.evaluate_all(&self.grid, &self.parameters)?;
        debug!(cells = summary.cells, "recomputed");
        Ok(self.commit(derived, summary))
    }

    /// Apply parameter updates and recompute.
    ///
    /// Updates are merged over the current values. Each one must name a
    /// defined parameter and satisfy its bounds or choices.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownParameter`],
    /// [`SessionError::InvalidParameter`], or an evaluation error. Nothing
    /// changes on error.
    pub fn set_parameters(&mut self, updates: &ParameterSet) -> Result<RecomputeSummary, SessionError> {
        let mut parameters = self.parameters.clone();
        for (name, value) in updates.iter() {
            let def = self
                .definitions
                .iter()
                .find(|d| &d.col == name)
                .ok_or_else(|| SessionError::UnknownParameter(name.clone()))?;
            def.check(value)
                .map_err(|source| SessionError::InvalidParameter {
                    name: name.clone(),
                    source,
                })?;
            parameters.insert(name, value.clone());
        }

        let (derived, summary) = self.evaluate_all(&self.grid, &parameters)?;
        self.parameters = parameters;
        info!(updated = updates.len(), "parameters applied");
        Ok(self.commit(derived, summary))
    }

    /// Propagate an explicit request, then recompute.
    ///
    /// Only infrastructure columns, which the baseline can restore, may be
    /// propagated.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotDrawable`] for any other attribute,
    /// [`SessionError::Grid`] if the request is invalid, or an evaluation
    /// error. Nothing changes on error.
    pub fn propagate(&mut self, request: &PropagationRequest) -> Result<DrawSummary, SessionError> {
        if !self.baseline.tracks(&request.attribute) {
            return Err(SessionError::NotDrawable(request.attribute.clone()));
        }
        let mut grid = self.grid.clone();
        let propagation = propagate(&mut grid, request)?;
        let (derived, summary) = self.evaluate_all(&grid, &self.parameters)?;
        self.grid = grid;
        info!(
            attribute = %request.attribute,
            seeds = request.seeds.len(),
            relaxed = propagation.relaxed,
            "propagated"
        );
        Ok(DrawSummary {
            attribute: request.attribute.clone(),
            seeds: request.seeds.len(),
            propagation,
            recompute: self.commit(derived, summary),
        })
    }

    /// Draw infrastructure onto `attribute` and recompute.
    ///
    /// The geometry selects the seed cells, which are set to distance 0;
    /// the distance then grows by one hex size per ring outward.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotDrawable`] unless `attribute` is a
    /// configured infrastructure column, [`SessionError::Grid`] for an
    /// unsupported geometry, or an evaluation error.
    pub fn draw(&mut self, attribute: &str, geometry: &Geometry) -> Result<DrawSummary, SessionError> {
        if !self.infra.iter().any(|i| i.col == attribute) {
            return Err(SessionError::NotDrawable(attribute.to_owned()));
        }
        let seeds = select_seeds(&self.grid, geometry)?;
        debug!(attribute, kind = geometry.kind(), seeds = seeds.len(), "seeds selected");
        let request = PropagationRequest {
            seeds,
            attribute: attribute.to_owned(),
            start_distance: 0.0,
            step_size: self.step_size,
        };
        self.propagate(&request)
    }

    /// Restore `attribute` from the baseline and recompute.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotDrawable`] if the attribute was never
    /// drawable, or an evaluation error. Nothing changes on error.
    pub fn reset_attribute(&mut self, attribute: &str) -> Result<ResetSummary, SessionError> {
        if !self.baseline.tracks(attribute) {
            return Err(SessionError::NotDrawable(attribute.to_owned()));
        }
        let mut grid = self.grid.clone();
        let restored = self.baseline.restore(&mut grid, attribute)?;
        let (derived, summary) = self.evaluate_all(&grid, &self.parameters)?;
        self.grid = grid;
        info!(attribute, restored, "attribute reset");
        Ok(ResetSummary {
            attribute: attribute.to_owned(),
            restored,
            recompute: self.commit(derived, summary),
        })
    }

    /// One cell with its derived outputs.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CellNotFound`] for an unknown index.
    pub fn cell(&self, index: CellIndex) -> Result<CellView, SessionError> {
        let cell = self.grid.get(index).ok_or(SessionError::CellNotFound(index))?;
        Ok(CellView {
            index,
            neighbors: self.grid.neighbors(index),
            attributes: cell.attributes.clone(),
            derived: self.derived.get(index.position()).cloned().unwrap_or_default(),
        })
    }

    /// The working grid with derived attributes, as GeoJSON.
    pub fn feature_collection(&self) -> Value {
        to_feature_collection(&self.grid, &self.derived)
    }

    /// Current value of every parameter, with its definition.
    pub fn parameter_values(&self) -> Vec<(&ParameterDef, Option<&ParameterValue>)> {
        self.definitions
            .iter()
            .map(|def| (def, self.parameters.get(&def.col)))
            .collect()
    }
}
