//! Ctrl-C routing.
//!
//! One process-wide listener forwards every Ctrl-C to the command that is
//! currently running. With no command running, Ctrl-C exits.

use std::sync::{Arc, Mutex, PoisonError};

use colored::Colorize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Holds the cancellation token of the running command, if any.
#[derive(Clone, Default)]
pub struct Interrupts {
    active: Arc<Mutex<Option<CancellationToken>>>,
}

impl Interrupts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the Ctrl-C listener. Call once, before the first command.
    pub fn listen(&self) -> JoinHandle<()> {
        let interrupts = self.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if !interrupts.interrupt() {
                    println!("{}", "CTRL-C detected. Exiting...".bright_green());
                    std::process::exit(130);
                }
            }
        })
    }

    /// Marks a command as running until the returned guard is dropped.
    pub fn begin(&self) -> CommandGuard {
        let token = CancellationToken::new();
        *self.slot() = Some(token.clone());
        CommandGuard {
            interrupts: self.clone(),
            token,
        }
    }

    /// Cancels the running command. Returns false when nothing was running.
    pub fn interrupt(&self) -> bool {
        match self.slot().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A running command. Dropping it makes Ctrl-C exit again.
pub struct CommandGuard {
    interrupts: Interrupts,
    token: CancellationToken,
}

impl CommandGuard {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for CommandGuard {
    fn drop(&mut self) {
        *self.interrupts.slot() = None;
    }
}
