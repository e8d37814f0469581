pub mod order;
pub mod stage;

pub use order::{Order, OrderCategory, OrderFilter, OrderItem};
pub use stage::{PipelineError, StageDefinition, StagePipeline};
