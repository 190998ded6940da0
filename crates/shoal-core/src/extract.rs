//! One representative numeric value per card element.
//!
//! Positioners never read cells directly: they go through [`extract`] (one
//! element) or [`extract_batch`] (whole element list, with optional rank
//! replacement) so that stacks, categorical columns and missing values are
//! handled the same way everywhere.

use crate::cancel::CancelToken;
use crate::data::{ColumnId, DataAccessor, RecordId};
use crate::element::CardElement;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// How a batch of raw values is turned into ordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMode {
    /// Raw extracted value.
    #[default]
    Numerical,
    /// Global rank; ranks are a permutation of `[0, n)`, ties broken by
    /// input order.
    Order,
    /// Dense rank; bit-identical raw values share one rank, so the set of
    /// distinct ranks equals the number of distinct raw values.
    OrderCollapsed,
}

/// How missing (NaN) members of a stack contribute to its aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NanPolicy {
    /// Missing members are excluded; the aggregate is NaN only if every
    /// member is missing.
    #[default]
    DontConsider,
    /// Missing members count as zero and still enter the denominator.
    Zero,
    /// Any missing member poisons the whole stack's aggregate.
    MakeStackNan,
}

fn record_value(data: &dyn DataAccessor, column: ColumnId, record: RecordId) -> f64 {
    if data.is_numeric(column) {
        data.numeric(record, column)
    } else {
        // Category index as a synthetic numeric ordinate.
        data.category_index(record, column) as f64
    }
}

/// Representative value of one element: the single record's value, or the
/// mean over the stack under `policy`.
pub fn extract(
    data: &dyn DataAccessor,
    column: ColumnId,
    element: &CardElement,
    policy: NanPolicy,
) -> f64 {
    let records = element.records();
    if let [record] = records {
        return record_value(data, column, *record);
    }

    let mut sum = 0.0;
    let mut count = 0usize;
    for &record in records {
        let value = record_value(data, column, record);
        if value.is_nan() {
            match policy {
                NanPolicy::DontConsider => {}
                NanPolicy::Zero => count += 1,
                NanPolicy::MakeStackNan => return f64::NAN,
            }
        } else {
            sum += value;
            count += 1;
        }
    }

    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Extracts one value per element, index-aligned with `elements`, replacing
/// raw values by ranks for the order modes. Polls `cancel` inside the
/// per-element loop.
pub fn extract_batch(
    data: &dyn DataAccessor,
    column: ColumnId,
    elements: &[CardElement],
    mode: ExtractionMode,
    policy: NanPolicy,
    cancel: &CancelToken,
) -> Result<Vec<f64>> {
    let mut values = Vec::with_capacity(elements.len());
    for element in elements {
        cancel.checkpoint()?;
        values.push(extract(data, column, element, policy));
    }

    Ok(match mode {
        ExtractionMode::Numerical => values,
        ExtractionMode::Order => rank_values(&values, false),
        ExtractionMode::OrderCollapsed => rank_values(&values, true),
    })
}

/// Replaces values by their sort position. NaNs are ordered via IEEE total
/// order so the result is deterministic for any input. The sort is stable,
/// which is what breaks ties by input order.
pub fn rank_values(values: &[f64], collapse: bool) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    if collapse {
        let mut rank = 0usize;
        for (pos, &idx) in order.iter().enumerate() {
            if pos > 0 && values[order[pos - 1]].to_bits() != values[idx].to_bits() {
                rank += 1;
            }
            ranks[idx] = rank as f64;
        }
    } else {
        for (pos, &idx) in order.iter().enumerate() {
            ranks[idx] = pos as f64;
        }
    }
    ranks
}
