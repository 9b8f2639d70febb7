// Gateway module for models - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod factory;
mod orchestrator;
mod traits;
mod types;

// Public re-exports - the ONLY way to access model functionality
pub use factory::ModelFactory;
pub use orchestrator::OrchestratorModel;
pub use traits::Model;
pub use types::{ChatMessage, MessageRole, ModelResponse};
