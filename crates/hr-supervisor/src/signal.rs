//! Termination signals.
//!
//! SIGTERM and SIGINT on Unix, Ctrl-C elsewhere. Handlers are installed once
//! and polled from the orchestrator's select loop.

use crate::error::SuperviseError;

/// Which termination signal was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermSignal {
    /// SIGTERM.
    Terminate,
    /// SIGINT or Ctrl-C.
    Interrupt,
}

impl std::fmt::Display for TermSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Terminate => f.write_str("SIGTERM"),
            Self::Interrupt => f.write_str("SIGINT"),
        }
    }
}

/// Installed termination signal handlers.
#[derive(Debug)]
pub struct ShutdownSignals {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
}

impl ShutdownSignals {
    /// Installs the handlers. Must be called from within a tokio runtime.
    #[cfg(unix)]
    pub fn new() -> Result<Self, SuperviseError> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            terminate: signal(SignalKind::terminate()).map_err(SuperviseError::Signal)?,
            interrupt: signal(SignalKind::interrupt()).map_err(SuperviseError::Signal)?,
        })
    }

    /// Installs the handlers. Must be called from within a tokio runtime.
    #[cfg(not(unix))]
    pub fn new() -> Result<Self, SuperviseError> {
        Ok(Self {})
    }

    /// Waits for the next termination signal. Cancel-safe.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> TermSignal {
        tokio::select! {
            _ = self.terminate.recv() => TermSignal::Terminate,
            _ = self.interrupt.recv() => TermSignal::Interrupt,
        }
    }

    /// Waits for the next termination signal. Cancel-safe.
    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> TermSignal {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl-C handler failed");
            std::future::pending::<()>().await;
        }
        TermSignal::Interrupt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(TermSignal::Terminate.to_string(), "SIGTERM");
        assert_eq!(TermSignal::Interrupt.to_string(), "SIGINT");
    }

    #[tokio::test]
    async fn test_install_handlers() {
        assert!(ShutdownSignals::new().is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_receives_sigterm() {
        let mut signals = ShutdownSignals::new().expect("install handlers");

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .expect("run kill");
        assert!(status.success());

        let received = tokio::time::timeout(std::time::Duration::from_secs(5), signals.recv())
            .await
            .expect("signal delivered");
        assert_eq!(received, TermSignal::Terminate);
    }
}
