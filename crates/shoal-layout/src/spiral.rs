//! Rank-ordered placement along an outward-growing spiral.

use crate::positioner::{LayoutContext, card_extent, validate_column};
use shoal_core::extract::{self, ExtractionMode, NanPolicy};
use shoal_core::geom::{Point, point};
use shoal_core::props::{self, PropertyMap};
use shoal_core::{CardElement, ColumnId, DataAccessor, Error, Result};

const NAME: &str = "spiral-sequence";

/// Arc-length spacing default: 1.5 times the half-diagonal of a card.
const SPREAD_FACTOR: f64 = 1.5;
/// Radial growth default: 1.25 times the larger card dimension per turn.
const SPIRAL_SPREAD_FACTOR: f64 = 1.25;

/// Lays out cards in increasing rank of one column along an Archimedean-like
/// spiral.
///
/// The angular increment at each step is `spread / current_radius`, which
/// keeps the arc length between successive cards constant as the radius
/// grows; the radius advances by `(increment / 2π) * spiral_spread` so a
/// full turn moves outward by one ring.
#[derive(Debug, Clone)]
pub struct SpiralSequencePositioner {
    column: ColumnId,
    /// Multiplier over the geometrically-derived arc-length spacing.
    spread: f64,
    /// Multiplier over the geometrically-derived ring distance.
    spiral_spread: f64,
}

impl SpiralSequencePositioner {
    pub fn new(column: ColumnId) -> Self {
        Self {
            column,
            spread: 1.0,
            spiral_spread: 1.0,
        }
    }

    pub fn with_spread(mut self, spread: f64) -> Self {
        self.spread = spread;
        self
    }

    pub fn with_spiral_spread(mut self, spiral_spread: f64) -> Self {
        self.spiral_spread = spiral_spread;
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
            return Ok(Vec::new());
        }

        let ranks = extract::extract_batch(
            ctx.data,
            self.column,
            elements,
            ExtractionMode::Order,
            NanPolicy::DontConsider,
            ctx.cancel,
        )?;

        // Ranks are a permutation of [0, n); invert it so we can walk the
        // spiral in rank order while writing index-aligned output.
        let mut by_rank = vec![0usize; elements.len()];
        for (index, &rank) in ranks.iter().enumerate() {
            by_rank[rank as usize] = index;
        }

        let (card_width, card_height) = card_extent(elements);
        let larger = card_width.max(card_height);
        let half_diagonal = 0.5 * (card_width * card_width + card_height * card_height).sqrt();
        let arc_step = SPREAD_FACTOR * half_diagonal * self.spread;
        let ring_step = SPIRAL_SPREAD_FACTOR * larger * self.spiral_spread;

        let mut radius = 0.5 * larger;
        let mut angle = 0.0f64;

        let mut out = vec![Point::zero(); elements.len()];
        for (step, &index) in by_rank.iter().enumerate() {
            ctx.cancel.checkpoint()?;
            if step > 0 {
                let increment = arc_step / radius;
                angle += increment;
                radius += increment / std::f64::consts::TAU * ring_step;
            }
            out[index] = point(radius * angle.cos(), radius * angle.sin());
        }

        // One position per element, by construction; anything else is a
        // defect, not a recoverable condition.
        if out.len() != elements.len() {
            return Err(Error::PositionCountMismatch {
                expected: elements.len(),
                produced: out.len(),
            });
        }
        Ok(out)
    }

    pub fn config(&self) -> PropertyMap {
        let mut props = PropertyMap::new();
        props.set("column", self.column.0);
        props.set("spread", self.spread);
        props.set("spiral-spread", self.spiral_spread);
        props
    }

    pub fn apply_config(&mut self, props: &PropertyMap) -> Result<()> {
        for (key, value) in props.iter() {
            match key {
                "column" => self.column = ColumnId(props::expect_usize(key, value)?),
                "spread" => self.spread = props::expect_f64(key, value)?,
                "spiral-spread" => self.spiral_spread = props::expect_f64(key, value)?,
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
