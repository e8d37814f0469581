//! Drag-and-drop reorder projection
//!
//! The single place ordering logic lives. Columns are always derived from
//! the flat collection by filtering on stage - never stored as parallel
//! lists - so the two representations cannot drift apart. The same
//! projection backs the optimistic write path: a stage button maps to a
//! move targeting the tail of the destination column.

use shared::models::{Order, StagePipeline};
use crate::state_machine;

/// A card move as reported by the drag layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardMove {
    /// Order being moved
    pub order_id: String,
    /// Column the drag started from
    pub from_stage: String,
    /// Column the card was dropped on
    pub to_stage: String,
    /// Insertion index in the destination column, clamped to its length
    pub to_index: usize,
}

impl CardMove {
    /// Move targeting the tail of the destination column
    pub fn to_column_end(
        order_id: impl Into<String>,
        from_stage: impl Into<String>,
        to_stage: impl Into<String>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            from_stage: from_stage.into(),
            to_stage: to_stage.into(),
            to_index: usize::MAX,
        }
    }
}

/// Recompute the collection for a card move.
///
/// The moved order is located by id - not by index - so the projection
/// stays correct even if the collection changed between drag start and
/// drop. Relative order of every other order is preserved per column;
/// cancelled orders are kept at the tail unchanged. Orders whose stage is
/// foreign to the pipeline keep their relative order between the columns
/// and the cancelled tail.
///
/// When the moved order is no longer present the collection is simply
/// re-flattened in derived order.
pub fn project_move(orders: Vec<Order>, pipeline: &StagePipeline, mv: &CardMove) -> Vec<Order> {
    let terminal = pipeline.terminal_id();

    // Partition into per-column lists, preserving relative order, and pull
    // the moved order out wherever it currently sits.
    let mut columns: Vec<(&str, Vec<Order>)> = pipeline
        .stages()
        .iter()
        .map(|s| (s.id.as_str(), Vec::new()))
        .collect();
    let mut foreign: Vec<Order> = Vec::new();
    let mut cancelled: Vec<Order> = Vec::new();
    let mut moved: Option<Order> = None;

    for order in orders {
        if order.id == mv.order_id {
            moved = Some(order);
            continue;
        }
        let stage = state_machine::current_stage(&order, pipeline);
        if stage == terminal {
            cancelled.push(order);
        } else if let Some((_, column)) = columns.iter_mut().find(|(id, _)| *id == stage) {
            column.push(order);
        } else {
            foreign.push(order);
        }
    }

    // Stamp the destination stage and insert at the clamped index.
    if let Some(mut moved) = moved {
        moved.stage = Some(mv.to_stage.clone());
        if let Some((_, column)) = columns.iter_mut().find(|(id, _)| *id == mv.to_stage) {
            let at = mv.to_index.min(column.len());
            column.insert(at, moved);
        } else if mv.to_stage == terminal {
            cancelled.push(moved);
        } else {
            tracing::debug!(
                order_id = %moved.id,
                to_stage = %mv.to_stage,
                "Move targets a stage outside the pipeline"
            );
            foreign.push(moved);
        }
    }

    // Flatten back in pipeline-stage order, cancelled at the tail.
    let mut out: Vec<Order> = columns.into_iter().flat_map(|(_, column)| column).collect();
    out.extend(foreign);
    out.extend(cancelled);
    out
}
