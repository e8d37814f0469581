//! Stage pipeline definitions
//!
//! A pipeline is the ordered stage sequence for one order category. The
//! terminal (cancelled) stage is kept apart from the traversable sequence:
//! next/previous walks never return it, and board views drop cancelled
//! orders entirely.
//!
//! Defaults for both categories are built in; hosts that source stage
//! metadata from remote settings go through [`StagePipeline::new`], which
//! validates once at the boundary.

use super::order::OrderCategory;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

/// One step in a fulfillment pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageDefinition {
    /// Stage id, unique within the pipeline
    pub id: String,
    /// Display label (passed through to the presentation layer)
    pub label: String,
    /// Display color (passed through)
    pub color: String,
}

impl StageDefinition {
    pub fn new(id: impl Into<String>, label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            color: color.into(),
        }
    }
}

/// Pipeline construction error
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("duplicate stage id: {0}")]
    DuplicateStage(String),
    #[error("terminal stage not present: {0}")]
    MissingTerminal(String),
    #[error("pipeline needs at least one traversable stage")]
    Empty,
}

/// Ordered stage sequence for one order category
///
/// Invariants held by construction: stage ids are unique, the traversable
/// sequence is non-empty, and exactly one terminal stage exists. Remotely
/// sourced definitions go through [`StagePipeline::new`] rather than
/// deserializing directly, so the invariants cannot be bypassed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StagePipeline {
    /// Traversable stages in board order (terminal excluded)
    stages: Vec<StageDefinition>,
    /// Terminal (cancelled) stage, excluded from traversal and from views
    terminal: StageDefinition,
}

impl StagePipeline {
    /// Build a pipeline from an ordered stage list and the id of its
    /// terminal stage. The terminal entry is pulled out of the sequence.
    pub fn new(
        stages: Vec<StageDefinition>,
        terminal_id: impl Into<String>,
    ) -> Result<Self, PipelineError> {
        let terminal_id = terminal_id.into();
        let mut seen = HashSet::new();
        for stage in &stages {
            if !seen.insert(stage.id.clone()) {
                return Err(PipelineError::DuplicateStage(stage.id.clone()));
            }
        }
        let mut traversable = stages;
        let terminal_pos = traversable
            .iter()
            .position(|s| s.id == terminal_id)
            .ok_or(PipelineError::MissingTerminal(terminal_id))?;
        let terminal = traversable.remove(terminal_pos);
        if traversable.is_empty() {
            return Err(PipelineError::Empty);
        }
        Ok(Self {
            stages: traversable,
            terminal,
        })
    }

    /// Built-in pipeline for a category
    pub fn for_category(category: OrderCategory) -> &'static StagePipeline {
        match category {
            OrderCategory::DineIn => &DINE_IN,
            OrderCategory::Delivery => &DELIVERY,
        }
    }

    /// Traversable stages in board order (the visible columns)
    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    /// First stage of the pipeline; orders without an assigned stage land here
    pub fn first(&self) -> &StageDefinition {
        // non-empty by construction
        &self.stages[0]
    }

    /// Terminal (cancelled) stage
    pub fn terminal(&self) -> &StageDefinition {
        &self.terminal
    }

    /// Terminal stage id
    pub fn terminal_id(&self) -> &str {
        &self.terminal.id
    }

    /// Position of a stage within the traversable sequence
    pub fn position_of(&self, stage_id: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.id == stage_id)
    }

    /// Stage definition by id, terminal included
    pub fn stage(&self, stage_id: &str) -> Option<&StageDefinition> {
        if self.terminal.id == stage_id {
            return Some(&self.terminal);
        }
        self.stages.iter().find(|s| s.id == stage_id)
    }
}

static DINE_IN: LazyLock<StagePipeline> = LazyLock::new(|| {
    StagePipeline::new(
        vec![
            StageDefinition::new("novo", "Novo", "#2563eb"),
            StageDefinition::new("confirmado", "Confirmado", "#0891b2"),
            StageDefinition::new("preparando", "Preparando", "#d97706"),
            StageDefinition::new("pronto", "Pronto", "#16a34a"),
            StageDefinition::new("entregue", "Entregue", "#4b5563"),
            StageDefinition::new("cancelado", "Cancelado", "#dc2626"),
        ],
        "cancelado",
    )
    .expect("built-in dine-in pipeline is valid")
});

static DELIVERY: LazyLock<StagePipeline> = LazyLock::new(|| {
    StagePipeline::new(
        vec![
            StageDefinition::new("novo", "Novo", "#2563eb"),
            StageDefinition::new("confirmado", "Confirmado", "#0891b2"),
            StageDefinition::new("preparando", "Preparando", "#d97706"),
            StageDefinition::new("pronto", "Pronto", "#16a34a"),
            StageDefinition::new("saiu_para_entrega", "Saiu para entrega", "#7c3aed"),
            StageDefinition::new("entregue", "Entregue", "#4b5563"),
            StageDefinition::new("cancelado", "Cancelado", "#dc2626"),
        ],
        "cancelado",
    )
    .expect("built-in delivery pipeline is valid")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_inserts_courier_stage() {
        let dine_in = StagePipeline::for_category(OrderCategory::DineIn);
        let delivery = StagePipeline::for_category(OrderCategory::Delivery);
        assert_eq!(dine_in.stages().len() + 1, delivery.stages().len());

        let pronto = delivery.position_of("pronto").unwrap();
        assert_eq!(delivery.stages()[pronto + 1].id, "saiu_para_entrega");
        assert_eq!(delivery.stages()[pronto + 2].id, "entregue");
        assert_eq!(dine_in.position_of("saiu_para_entrega"), None);
    }

    #[test]
    fn test_terminal_excluded_from_traversable() {
        let pipeline = StagePipeline::for_category(OrderCategory::DineIn);
        assert_eq!(pipeline.terminal_id(), "cancelado");
        assert_eq!(pipeline.position_of("cancelado"), None);
        assert!(pipeline.stage("cancelado").is_some());
    }

    #[test]
    fn test_first_stage() {
        assert_eq!(
            StagePipeline::for_category(OrderCategory::Delivery).first().id,
            "novo"
        );
    }

    #[test]
    fn test_new_rejects_duplicate_ids() {
        let result = StagePipeline::new(
            vec![
                StageDefinition::new("a", "A", "#000"),
                StageDefinition::new("a", "A again", "#000"),
                StageDefinition::new("x", "X", "#000"),
            ],
            "x",
        );
        assert_eq!(result, Err(PipelineError::DuplicateStage("a".to_string())));
    }

    #[test]
    fn test_new_rejects_missing_terminal() {
        let result = StagePipeline::new(vec![StageDefinition::new("a", "A", "#000")], "missing");
        assert_eq!(
            result,
            Err(PipelineError::MissingTerminal("missing".to_string()))
        );
    }

    #[test]
    fn test_new_rejects_terminal_only() {
        let result = StagePipeline::new(vec![StageDefinition::new("x", "X", "#000")], "x");
        assert_eq!(result, Err(PipelineError::Empty));
    }
}
