pub mod agents;
pub mod app;
pub mod cli;
pub mod constants;
pub mod context;
pub mod models;
pub mod runtime;
pub mod session;
pub mod utils;

pub use agents::{parse_reply, ParsedReply};
pub use app::{load_config, Config};
pub use models::{ChatMessage, Model, ModelFactory};
pub use runtime::{AgentLoop, LoopOutcome, LoopReport};
pub use utils::CrabError;
