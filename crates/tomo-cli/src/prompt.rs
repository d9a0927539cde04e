//! Interactive confirmation prompts
//!
//! Destructive commands confirm on a TTY, and the confirm prompt doubles as
//! the CLI's stand-in for the biometric gate.

use std::io::{self, Write};

use anyhow::Result;
use async_trait::async_trait;

use tomo_core::BiometricGate;

/// Ask a yes/no question on the terminal
///
/// Answers "no" when stdin is not a TTY, so scripted runs never hang.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

/// Biometric gate backed by a terminal confirmation
pub struct ConfirmGate;

#[async_trait]
impl BiometricGate for ConfirmGate {
    async fn authenticate(&self, reason: &str) -> bool {
        confirm(reason).unwrap_or(false)
    }
}
