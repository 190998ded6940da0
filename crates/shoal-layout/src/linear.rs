//! Linear mapping of one column onto one screen axis.

use crate::SPACING_FACTOR;
use crate::positioner::{LayoutContext, card_extent, finite_extent, validate_column};
use serde::{Deserialize, Serialize};
use shoal_core::extract::{self, ExtractionMode, NanPolicy};
use shoal_core::geom::{Point, point};
use shoal_core::props::{self, PropertyMap};
use shoal_core::rng::XorShift64Star;
use shoal_core::{CardElement, ColumnId, DataAccessor, Error, Result};

const NAME: &str = "linear-axis";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    X,
    Y,
}

/// Value interval and target interval cached by the last full layout, so a
/// newly created card can be placed without recomputing everything.
#[derive(Debug, Clone, Copy)]
struct Mapping {
    value_min: f64,
    value_max: f64,
    xa: f64,
    xb: f64,
}

/// Maps one column's value interval linearly onto one axis interval.
///
/// The target interval is `center ± 0.5 * spread` with
/// `spread = sqrt(n) * card_width * 1.5 * stretch`: spacing between cards
/// stays roughly constant as elements are added or removed, so the caller
/// never has to re-derive it. Missing values receive a uniform-random
/// position inside the interval; every input element always gets a
/// position.
#[derive(Debug, Clone)]
pub struct LinearAxisPositioner {
    column: ColumnId,
    axis: Axis,
    center: f64,
    stretch: f64,
    jitter: f64,
    seed: u64,
    rng: XorShift64Star,
    mapping: Option<Mapping>,
}

impl LinearAxisPositioner {
    pub fn new(column: ColumnId, axis: Axis) -> Self {
        Self {
            column,
            axis,
            center: 0.0,
            stretch: 1.0,
            jitter: 0.0,
            seed: 0,
            rng: XorShift64Star::new(0),
            mapping: None,
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

    pub fn with_center(mut self, center: f64) -> Self {
        self.center = center;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self, data: &dyn DataAccessor) -> Result<()> {
        validate_column(NAME, data, self.column)
    }

    pub fn position_all(
        &mut self,
        elements: &[CardElement],
        ctx: &LayoutContext<'_>,
    ) -> Result<Vec<Point>> {
        if elements.is_empty() {
            self.mapping = None;
            return Ok(Vec::new());
        }

        let values = extract::extract_batch(
            ctx.data,
            self.column,
            elements,
            ExtractionMode::Numerical,
            NanPolicy::DontConsider,
            ctx.cancel,
        )?;

        let (value_min, value_max) = finite_extent(&values).unwrap_or_else(|| {
            tracing::warn!(
                column = %self.column,
                "every extracted value is missing; falling back to the [0, 1] interval"
            );
            (0.0, 1.0)
        });

        let (card_width, _) = card_extent(elements);
        let spread = (elements.len() as f64).sqrt() * card_width * SPACING_FACTOR * self.stretch;
        let mapping = Mapping {
            value_min,
            value_max,
            xa: self.center - 0.5 * spread,
            xb: self.center + 0.5 * spread,
        };

        // Reseeding per full layout keeps jitter and fallback placement
        // identical across recomputes of the same configuration.
        self.rng.reseed(self.seed);

        let mut out = Vec::with_capacity(elements.len());
        for &value in &values {
            ctx.cancel.checkpoint()?;
            out.push(self.place(value, &mapping));
        }
        self.mapping = Some(mapping);
        Ok(out)
    }

    pub fn position_one(&mut self, element: &CardElement, ctx: &LayoutContext<'_>) -> Result<Point> {
        let mapping = self.mapping.ok_or(Error::ShapeNotInitialized)?;
        let value = extract::extract(ctx.data, self.column, element, NanPolicy::DontConsider);
        Ok(self.place(value, &mapping))
    }

    fn place(&mut self, value: f64, mapping: &Mapping) -> Point {
        let along = if value.is_nan() {
            mapping.xa + self.rng.next_f64_unit() * (mapping.xb - mapping.xa)
        } else {
            let mut x = map_linear(
                value,
                mapping.value_min,
                mapping.value_max,
                mapping.xa,
                mapping.xb,
            );
            if self.jitter > 0.0 {
                x += self.rng.next_f64_signed()
                    * self.jitter
                    * self.stretch
                    * (mapping.xb - mapping.xa);
            }
            x
        };
        match self.axis {
            Axis::X => point(along, 0.0),
            Axis::Y => point(0.0, along),
        }
    }

    pub fn config(&self) -> PropertyMap {
        let mut props = PropertyMap::new();
        props.set("column", self.column.0);
        props.set("axis", if self.axis == Axis::X { "x" } else { "y" });
        props.set("center", self.center);
        props.set("stretch", self.stretch);
        props.set("jitter", self.jitter);
        props.set("seed", self.seed);
        props
    }

    pub fn apply_config(&mut self, props: &PropertyMap) -> Result<()> {
        for (key, value) in props.iter() {
            match key {
                "column" => self.column = ColumnId(props::expect_usize(key, value)?),
                "axis" => {
                    self.axis = match props::expect_str(key, value)? {
                        "x" => Axis::X,
                        "y" => Axis::Y,
                        other => {
                            return Err(Error::InvalidProperty {
                                key: key.to_string(),
                                message: format!("expected \"x\" or \"y\", got \"{other}\""),
                            });
                        }
                    }
                }
                "center" => self.center = props::expect_f64(key, value)?,
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
        Ok(())
    }
}

/// Endpoint-exact linear interpolation: `value_min` maps to exactly `xa`
/// and `value_max` to exactly `xb`. A degenerate value interval maps to
/// the target interval's midpoint.
pub fn map_linear(value: f64, value_min: f64, value_max: f64, xa: f64, xb: f64) -> f64 {
    if value_max == value_min {
        return 0.5 * (xa + xb);
    }
    let t = (value - value_min) / (value_max - value_min);
    xa * (1.0 - t) + xb * t
}
