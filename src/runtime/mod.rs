/// Runtime module - Gateway

mod agent_loop;

pub use agent_loop::{AgentLoop, CommandRecord, LoopOutcome, LoopReport, TransportError};
