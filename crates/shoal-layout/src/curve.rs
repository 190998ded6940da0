//! Mapping a column's value interval onto arc-length position along a
//! sampled parametric curve.

use crate::SPACING_FACTOR;
use crate::positioner::{LayoutContext, card_extent, finite_extent, validate_column};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use shoal_core::extract::{self, ExtractionMode, NanPolicy};
use shoal_core::geom::{Point, point};
use shoal_core::props::{self, PropertyMap};
use shoal_core::rng::XorShift64Star;
use shoal_core::{CardElement, ColumnId, DataAccessor, ElementId, Error, Result};

const NAME: &str = "curve-sampling";

/// Minimum number of discrete samples a curve is rasterized into.
const MIN_SAMPLES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CurveShape {
    /// Row-major lattice over the globally sorted element list.
    GridLattice,
    #[default]
    Circle,
    /// Multi-turn spiral with a configurable inner/outer radius ratio.
    Spiral,
}

#[derive(Debug, Clone)]
enum ShapeState {
    Grid {
        /// Identity-keyed cell cache: repeated queries for the same element
        /// are stable even if extraction were re-evaluated in between.
        cells: FxHashMap<ElementId, (usize, usize)>,
        cell_width: f64,
        cell_height: f64,
    },
    Sampled {
        samples: Vec<Point>,
        value_min: f64,
        value_max: f64,
        /// Bounding-box side of the sampled curve; jitter scales with it.
        extent: f64,
    },
}

/// Places elements along a grid lattice, circle or multi-turn spiral.
///
/// [`CurveSamplingPositioner::init_shape`] is an explicit step, required
/// whenever the column, shape, stretch or element set changes: grid-mode
/// placement depends on having sorted all elements first, so per-element
/// positioning against a stale shape is meaningless.
#[derive(Debug, Clone)]
pub struct CurveSamplingPositioner {
    column: ColumnId,
    shape: CurveShape,
    turns: f64,
    inner_ratio: f64,
    stretch: f64,
    jitter: f64,
    seed: u64,
    rng: XorShift64Star,
    state: Option<ShapeState>,
    grid_miss_count: u64,
}

impl CurveSamplingPositioner {
    pub fn new(column: ColumnId, shape: CurveShape) -> Self {
        Self {
            column,
            shape,
            turns: 3.0,
            inner_ratio: 0.25,
            stretch: 1.0,
            jitter: 0.0,
            seed: 0,
            rng: XorShift64Star::new(0),
            state: None,
            grid_miss_count: 0,
        }
    }

    pub fn with_stretch(mut self, stretch: f64) -> Self {
        self.stretch = stretch;
        self
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_spiral_params(mut self, turns: f64, inner_ratio: f64) -> Self {
        self.turns = turns;
        self.inner_ratio = inner_ratio;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn shape(&self) -> CurveShape {
        self.shape
    }

    /// How often a grid-cell lookup missed an element that should have been
    /// cached. Non-zero means a caller positioned an element the last full
    /// layout never saw; the lookup itself fails hard, this counter keeps
    /// the condition observable after the fact.
    pub fn grid_miss_count(&self) -> u64 {
        self.grid_miss_count
    }

    pub fn should_form_stacks(&self) -> bool {
        match self.shape {
            CurveShape::GridLattice => true,
            // Without jitter, elements sharing a value collapse onto the
            // same curve sample and are meant to merge there.
            CurveShape::Circle | CurveShape::Spiral => self.jitter == 0.0,
        }
    }

    pub fn validate(&self, data: &dyn DataAccessor) -> Result<()> {
        validate_column(NAME, data, self.column)
    }

    /// Rebuilds the sampled curve (or the sorted grid lattice) for the
    /// given element set.
    pub fn init_shape(
        &mut self,
        elements: &[CardElement],
        ctx: &LayoutContext<'_>,
    ) -> Result<()> {
        let values = extract::extract_batch(
            ctx.data,
            self.column,
            elements,
            ExtractionMode::Numerical,
            NanPolicy::DontConsider,
            ctx.cancel,
        )?;

        self.state = Some(match self.shape {
            CurveShape::GridLattice => self.build_grid(elements, &values, ctx)?,
            CurveShape::Circle | CurveShape::Spiral => {
                self.build_sampled(elements, &values, ctx)?
            }
        });
        Ok(())
    }

    fn build_grid(
        &self,
        elements: &[CardElement],
        values: &[f64],
        ctx: &LayoutContext<'_>,
    ) -> Result<ShapeState> {
        let mut order: Vec<usize> = (0..elements.len()).collect();
        // Stable sort: ties keep input order.
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

        let side = (elements.len() as f64).sqrt().ceil().max(1.0) as usize;
        let (card_width, card_height) = card_extent(elements);

        let mut cells = FxHashMap::default();
        for (pos, &idx) in order.iter().enumerate() {
            ctx.cancel.checkpoint()?;
            cells.insert(elements[idx].id(), (pos / side, pos % side));
        }

        Ok(ShapeState::Grid {
            cells,
            cell_width: card_width * SPACING_FACTOR * self.stretch,
            cell_height: card_height * SPACING_FACTOR * self.stretch,
        })
    }

    fn build_sampled(
        &self,
        elements: &[CardElement],
        values: &[f64],
        ctx: &LayoutContext<'_>,
    ) -> Result<ShapeState> {
        let (value_min, value_max) = finite_extent(values).unwrap_or_else(|| {
            tracing::warn!(
                column = %self.column,
                "every extracted value is missing; falling back to the [0, 1] interval"
            );
            (0.0, 1.0)
        });

        let sample_count = ctx.data.row_count().saturating_add(1).max(MIN_SAMPLES);
        let (card_width, card_height) = card_extent(elements);
        let radius =
            SPACING_FACTOR * (elements.len() as f64).sqrt() * card_width.max(card_height)
                * self.stretch;

        let mut samples = Vec::with_capacity(sample_count);
        for i in 0..sample_count {
            ctx.cancel.checkpoint()?;
            let t = i as f64 / (sample_count - 1) as f64;
            let (r, angle) = match self.shape {
                CurveShape::Circle => (radius, std::f64::consts::TAU * t),
                CurveShape::Spiral => {
                    let inner = radius * self.inner_ratio;
                    (
                        inner + (radius - inner) * t,
                        std::f64::consts::TAU * self.turns * t,
                    )
                }
                CurveShape::GridLattice => unreachable!("grid lattice is not sampled"),
            };
            samples.push(point(r * angle.cos(), r * angle.sin()));
        }

        Ok(ShapeState::Sampled {
            samples,
            value_min,
            value_max,
            extent: 2.0 * radius,
        })
    }

    pub fn position_all(
        &mut self,
        elements: &[CardElement],
        ctx: &LayoutContext<'_>,
    ) -> Result<Vec<Point>> {
        if elements.is_empty() {
            self.state = None;
            return Ok(Vec::new());
        }

        self.init_shape(elements, ctx)?;
        self.rng.reseed(self.seed);

        let mut out = Vec::with_capacity(elements.len());
        for element in elements {
            ctx.cancel.checkpoint()?;
            out.push(self.place(element, ctx)?);
        }
        Ok(out)
    }

    pub fn position_one(&mut self, element: &CardElement, ctx: &LayoutContext<'_>) -> Result<Point> {
        if self.state.is_none() {
            return Err(Error::ShapeNotInitialized);
        }
        self.place(element, ctx)
    }

    fn place(&mut self, element: &CardElement, ctx: &LayoutContext<'_>) -> Result<Point> {
        let Some(state) = &self.state else {
            return Err(Error::ShapeNotInitialized);
        };

        match state {
            ShapeState::Grid {
                cells,
                cell_width,
                cell_height,
            } => {
                let Some(&(row, col)) = cells.get(&element.id()) else {
                    self.grid_miss_count += 1;
                    tracing::warn!(
                        element = %element.id(),
                        misses = self.grid_miss_count,
                        "element has no cached grid cell"
                    );
                    return Err(Error::GridCellMissing {
                        element: element.id(),
                    });
                };
                Ok(point(col as f64 * cell_width, row as f64 * cell_height))
            }
            ShapeState::Sampled {
                samples,
                value_min,
                value_max,
                extent,
            } => {
                let value =
                    extract::extract(ctx.data, self.column, element, NanPolicy::DontConsider);
                let rel = if value.is_nan() {
                    self.rng.next_f64_unit()
                } else if value_max == value_min {
                    0.5
                } else {
                    ((value - value_min) / (value_max - value_min)).clamp(0.0, 1.0)
                };

                let idx = (rel * (samples.len() - 1) as f64).round() as usize;
                let mut p = samples[idx];
                if self.jitter > 0.0 {
                    p.x += self.rng.next_f64_signed() * self.jitter * extent;
                    p.y += self.rng.next_f64_signed() * self.jitter * extent;
                }
                Ok(p)
            }
        }
    }

    pub fn config(&self) -> PropertyMap {
        let mut props = PropertyMap::new();
        props.set("column", self.column.0);
        props.set(
            "shape",
            match self.shape {
                CurveShape::GridLattice => "grid-lattice",
                CurveShape::Circle => "circle",
                CurveShape::Spiral => "spiral",
            },
        );
        props.set("turns", self.turns);
        props.set("inner-ratio", self.inner_ratio);
        props.set("stretch", self.stretch);
        props.set("jitter", self.jitter);
        props.set("seed", self.seed);
        props
    }

    pub fn apply_config(&mut self, props: &PropertyMap) -> Result<()> {
        for (key, value) in props.iter() {
            match key {
                "column" => self.column = ColumnId(props::expect_usize(key, value)?),
                "shape" => {
                    self.shape = match props::expect_str(key, value)? {
                        "grid-lattice" => CurveShape::GridLattice,
                        "circle" => CurveShape::Circle,
                        "spiral" => CurveShape::Spiral,
                        other => {
                            return Err(Error::InvalidProperty {
                                key: key.to_string(),
                                message: format!(
                                    "expected \"grid-lattice\", \"circle\" or \"spiral\", got \"{other}\""
                                ),
                            });
                        }
                    }
                }
                "turns" => {
                    let turns = props::expect_f64(key, value)?;
                    if !(turns > 0.0) {
                        return Err(Error::InvalidProperty {
                            key: key.to_string(),
                            message: format!("turn count must be positive, got {turns}"),
                        });
                    }
                    self.turns = turns;
                }
                "inner-ratio" => {
                    let ratio = props::expect_f64(key, value)?;
                    if !(0.0..1.0).contains(&ratio) {
                        return Err(Error::InvalidProperty {
                            key: key.to_string(),
                            message: format!("inner radius ratio must be in [0, 1), got {ratio}"),
                        });
                    }
                    self.inner_ratio = ratio;
                }
                "stretch" => self.stretch = props::expect_f64(key, value)?,
                "jitter" => self.jitter = props::expect_f64(key, value)?,
                "seed" => {
                    self.seed = props::expect_u64(key, value)?;
                    self.rng.reseed(self.seed);
                }
                _ => {
                    return Err(Error::UnknownProperty {
                        positioner: NAME,
                        key: key.to_string(),
                    });
                }
            }
        }
        // Any accepted change may invalidate the cached shape.
        self.state = None;
        Ok(())
    }
}
