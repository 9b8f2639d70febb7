// Gateway module for session - follows the Train Station Pattern
// All external access must go through this gateway

mod history;

pub use history::{decode_history, initial_messages};
