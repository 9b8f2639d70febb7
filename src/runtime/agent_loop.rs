use std::sync::Arc;
use std::time::Instant;

use crate::{
    agents::{
        is_dangerous, parse_reply, ActionResult, ApprovalDecision, ApprovalGate, CommandRunner,
        FinalOutput,
    },
    constants::{COMMAND_DENIED_NOTICE, DEFAULT_MAX_ITERATIONS, TRANSPORT_ERROR_PREFIX},
    models::{ChatMessage, Model},
    utils::log_status,
};

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum LoopOutcome {
    /// The model answered with a structured final reply
    Final(FinalOutput),
    /// The model answered without any usable JSON; the text is passed through
    PlainText(String),
    /// Every iteration was spent on commands; nothing is emitted
    BudgetExhausted,
}

impl LoopOutcome {
    /// Render the artifact for stdout, if the run produced one
    pub fn render(&self) -> Option<String> {
        match self {
            LoopOutcome::Final(output) => Some(
                serde_json::to_string(output)
                    .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)),
            ),
            LoopOutcome::PlainText(text) => Some(text.clone()),
            LoopOutcome::BudgetExhausted => None,
        }
    }
}

/// A command the model asked for and what became of it
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRecord {
    pub iteration: usize,
    pub command: String,
    pub dangerous: bool,
    /// Set when the approval gate was consulted
    pub decision: Option<ApprovalDecision>,
    /// Absent when the command was not run
    pub result: Option<ActionResult>,
}

/// Backend call that failed and was replaced by an error pseudo-reply
#[derive(Debug, Clone, PartialEq)]
pub struct TransportError {
    pub iteration: usize,
    pub error: String,
}

/// Everything a run produced
#[derive(Debug)]
pub struct LoopReport {
    pub outcome: LoopOutcome,
    /// Full conversation, including the replies and feedback added by the run
    pub messages: Vec<ChatMessage>,
    /// Backend calls made
    pub iterations: usize,
    pub commands: Vec<CommandRecord>,
    pub transport_errors: Vec<TransportError>,
    pub duration_ms: u128,
}

/// Bounded ask-act-observe loop over a single user turn
pub struct AgentLoop {
    model: Box<dyn Model>,
    runner: Arc<dyn CommandRunner>,
    /// Present only when human oversight is enabled
    gate: Option<ApprovalGate>,
    max_iterations: usize,
}

impl AgentLoop {
    pub fn new(model: Box<dyn Model>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            model,
            runner,
            gate: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Require approval through `gate` before dangerous commands run
    pub fn with_approval_gate(mut self, gate: ApprovalGate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Drive the conversation until a final reply or the iteration budget runs out
    pub async fn run(&mut self, mut messages: Vec<ChatMessage>) -> LoopReport {
        let start_time = Instant::now();
        let mut commands = Vec::new();
        let mut transport_errors = Vec::new();
        let mut iterations = 0;

        let outcome = loop {
            if iterations >= self.max_iterations {
                tracing::warn!(
                    "Iteration budget of {} exhausted without a final reply",
                    self.max_iterations
                );
                break LoopOutcome::BudgetExhausted;
            }
            iterations += 1;
            tracing::debug!("Agent iteration {}/{}", iterations, self.max_iterations);

            let reply = match self.model.chat(&messages).await {
                Ok(response) => response.content,
                Err(e) => {
                    // The failure still flows through parsing as if the model had said it
                    let error = format!("{:#}", e);
                    tracing::warn!("Backend call failed: {}", error);
                    transport_errors.push(TransportError {
                        iteration: iterations,
                        error: error.clone(),
                    });
                    format!("{} {}", TRANSPORT_ERROR_PREFIX, error)
                }
            };
            messages.push(ChatMessage::assistant(reply.as_str()));

            let parsed = parse_reply(&reply);

            let Some(command) = parsed.command.clone() else {
                break if parsed.structured {
                    LoopOutcome::Final(parsed.to_final_output())
                } else {
                    LoopOutcome::PlainText(parsed.message)
                };
            };

            let record = self.handle_command(iterations, command).await;
            let feedback = match &record.result {
                Some(result) => result.feedback(),
                None => COMMAND_DENIED_NOTICE.to_string(),
            };
            messages.push(ChatMessage::user(feedback));
            commands.push(record);
        };

        LoopReport {
            outcome,
            messages,
            iterations,
            commands,
            transport_errors,
            duration_ms: start_time.elapsed().as_millis(),
        }
    }

    /// Gate and run one command
    async fn handle_command(&self, iteration: usize, command: String) -> CommandRecord {
        let dangerous = is_dangerous(&command);
        let mut decision = None;

        if dangerous {
            if let Some(gate) = &self.gate {
                log_status(format!("[HITL] APPROVAL_REQUIRED: {}", command));
                let verdict = gate.wait().await;
                decision = Some(verdict);

                if !verdict.is_approved() {
                    tracing::info!("Command not approved ({:?}): {}", verdict, command);
                    return CommandRecord {
                        iteration,
                        command,
                        dangerous,
                        decision,
                        result: None,
                    };
                }
                log_status(format!("[HITL] EXECUTING: {}", command));
            }
        }

        let result = self.runner.run(&command).await;
        CommandRecord {
            iteration,
            command,
            dangerous,
            decision,
            result: Some(result),
        }
    }
}
