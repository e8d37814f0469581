//! Stage traversal queries
//!
//! Pure and side-effect-free. `None` means "no legal transition" and is a
//! normal outcome the caller reacts to by disabling the action; it is never
//! an error. Transitions are strictly single-step in either direction: the
//! board never skips stages, which keeps the walk trivially verifiable and
//! still lets an operator step back to correct a misclick.
//!
//! The terminal (cancelled) stage is not part of the traversable sequence,
//! so a cancelled order has no position and both queries return `None`.

use shared::models::{Order, StageDefinition, StagePipeline};

/// Current stage id of an order, defaulting to the pipeline head when unset
pub fn current_stage<'a>(order: &'a Order, pipeline: &'a StagePipeline) -> &'a str {
    order
        .stage
        .as_deref()
        .unwrap_or_else(|| pipeline.first().id.as_str())
}

/// Stage one step forward, or `None` at the end of the pipeline or when the
/// current stage is unknown to it
pub fn next_stage<'a>(order: &'a Order, pipeline: &'a StagePipeline) -> Option<&'a StageDefinition> {
    let position = pipeline.position_of(current_stage(order, pipeline))?;
    pipeline.stages().get(position + 1)
}

/// Stage one step back, or `None` at the head of the pipeline or when the
/// current stage is unknown to it
pub fn previous_stage<'a>(
    order: &'a Order,
    pipeline: &'a StagePipeline,
) -> Option<&'a StageDefinition> {
    let position = pipeline.position_of(current_stage(order, pipeline))?;
    pipeline.stages().get(position.checked_sub(1)?)
}
