// Gateway module for context - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod prompt;
mod workspace;

// Public re-exports - the ONLY way to access context functionality
pub use prompt::{build_system_prompt, render_template};
pub use workspace::Workspace;
