use crate::data::RecordId;
use crate::geom::Size;
use std::fmt;
use uuid::Uuid;

/// Stable identity of a card element, assigned once at creation.
///
/// All identity-keyed caches (grid cells, single-element lookups) key on
/// this id rather than on reference identity or on the mutable record set,
/// so an element survives value recomputation without being recreated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A visual unit: one record is a card, several are a stack displayed as a
/// single merged unit. The owning view creates and destroys elements; the
/// engine only computes where they go and how they group.
#[derive(Debug, Clone)]
pub struct CardElement {
    id: ElementId,
    records: Vec<RecordId>,
    size: Size,
}

impl CardElement {
    pub fn new(records: Vec<RecordId>, size: Size) -> Self {
        Self {
            id: ElementId::new(),
            records,
            size,
        }
    }

    pub fn single(record: RecordId, size: Size) -> Self {
        Self::new(vec![record], size)
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// The records this element represents, in insertion order.
    pub fn records(&self) -> &[RecordId] {
        &self.records
    }

    /// Current card rectangle, used by spacing heuristics.
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn is_stack(&self) -> bool {
        self.records.len() > 1
    }
}
