// Gateway module for agents - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod approval;
mod executor;
mod parser;
mod risk;
mod types;

// Public re-exports - the ONLY way to access agent functionality
pub use approval::{ApprovalDecision, ApprovalGate, ApprovalSignal, ChannelSignal, FileMarkers};
pub use executor::{CommandRunner, ShellExecutor};
pub use parser::{extract_json_span, parse_reply};
pub use risk::is_dangerous;
pub use types::{ActionResult, FinalOutput, ParsedReply};
