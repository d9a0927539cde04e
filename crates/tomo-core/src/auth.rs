//! Biometric gate seam
//!
//! Unlocking a locked note or folder goes through an external
//! yes/no capability (Face ID on the phone, a confirm prompt on the CLI).
//! The core never re-prompts; callers decide whether to ask again.

use async_trait::async_trait;

/// An external authentication capability
#[async_trait]
pub trait BiometricGate: Send + Sync {
    /// Ask the user to authenticate for the given reason
    async fn authenticate(&self, reason: &str) -> bool;
}

/// Gate with a fixed answer, for tests and non-interactive use
#[derive(Debug, Clone, Copy)]
pub struct StaticGate {
    allow: bool,
}

impl StaticGate {
    /// A gate that always authenticates
    pub fn allow() -> Self {
        Self { allow: true }
    }

    /// A gate that always refuses
    pub fn deny() -> Self {
        Self { allow: false }
    }
}

#[async_trait]
impl BiometricGate for StaticGate {
    async fn authenticate(&self, _reason: &str) -> bool {
        self.allow
    }
}
