use crate::constants::DANGEROUS_COMMANDS;

/// Check whether a command needs human approval before it runs.
///
/// Only the leading token is inspected. It matches an entry when it equals
/// it or starts with it, so `rmdir` and `docker-compose` count as dangerous.
pub fn is_dangerous(command: &str) -> bool {
    let Some(base) = command.split_whitespace().next() else {
        return false;
    };

    DANGEROUS_COMMANDS
        .iter()
        .any(|tool| base == *tool || base.starts_with(tool))
}
