//! The transform sink: one lock-free shared snapshot.

use input_gesture::ScaleBounds;

use crate::cell::SnapshotCell;
use crate::snapshot::{TransformSnapshot, TransformUpdate};

/// Shared transform state written by producers and read by the render tick.
///
/// Publishing merges a partial update onto the current snapshot inside a
/// compare-and-swap loop, so concurrent producers never lose each other's
/// writes and each successful publish advances the revision by one.
/// Reading never blocks and never observes a torn snapshot. Every installed
/// snapshot has its scale inside the sink's [`ScaleBounds`].
///
/// # Example
///
/// ```
/// use input_pipeline::{TransformSink, TransformUpdate};
///
/// let sink = TransformSink::new();
/// let published = sink.publish(TransformUpdate::new().with_scale(3.0)).unwrap();
/// assert_eq!(published.revision, 1);
/// assert_eq!(sink.read_latest(), Some(published));
///
/// sink.close();
/// assert!(sink.publish(TransformUpdate::new().with_scale(1.0)).is_none());
/// assert!(sink.read_latest().is_none());
/// ```
#[derive(Debug)]
pub struct TransformSink {
    cell: SnapshotCell<TransformSnapshot>,
    bounds: ScaleBounds,
}

impl Default for TransformSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformSink {
    /// Creates a sink holding [`TransformSnapshot::INITIAL`] with the default scale bounds.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bounds(ScaleBounds::DEFAULT)
    }

    /// Creates a sink whose scale is kept within `bounds`.
    ///
    /// The initial scale of 1.0 is clamped into `bounds` as well.
    #[must_use]
    pub fn with_bounds(bounds: ScaleBounds) -> Self {
        let initial = TransformSnapshot {
            scale: bounds.clamp(TransformSnapshot::INITIAL.scale),
            ..TransformSnapshot::INITIAL
        };
        Self {
            cell: SnapshotCell::new(initial),
            bounds,
        }
    }

    /// Scale bounds applied on every publish.
    #[must_use]
    pub const fn bounds(&self) -> ScaleBounds {
        self.bounds
    }

    /// Merges `update` onto the current snapshot.
    ///
    /// Returns the installed snapshot, or `None` once closed.
    pub fn publish(&self, update: TransformUpdate) -> Option<TransformSnapshot> {
        self.cell
            .update(|current| Some(current.merged(&update, self.bounds)))
    }

    /// Derives an update from the current snapshot and merges it.
    ///
    /// `derive` may run more than once under contention, always against the
    /// snapshot it will be merged onto. Returning `None` skips the publish.
    pub fn publish_with<F>(&self, mut derive: F) -> Option<TransformSnapshot>
    where
        F: FnMut(&TransformSnapshot) -> Option<TransformUpdate>,
    {
        self.cell
            .update(|current| derive(current).map(|update| current.merged(&update, self.bounds)))
    }

    /// Returns a copy of the newest snapshot, or `None` once closed.
    #[must_use]
    pub fn read_latest(&self) -> Option<TransformSnapshot> {
        self.cell.load()
    }

    /// Returns the current revision, or `None` once closed.
    #[must_use]
    pub fn revision(&self) -> Option<u64> {
        self.cell.read_with(|snapshot| snapshot.revision)
    }

    /// Closes the sink. Later publishes are no-ops and reads return `None`.
    pub fn close(&self) {
        self.cell.close();
    }

    /// Returns true once closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cell.is_closed()
    }
}
