//! Notification sink collaborator
//!
//! The engine emits abstract notify events; rendering (toasts, push
//! delivery) is the host's job. Dispatch is fire-and-forget.

use serde::{Deserialize, Serialize};

/// Haptic hint sent alongside high-priority notifications: short pulse,
/// pause, short pulse. Milliseconds. Hosts without haptics ignore it.
pub const HIGH_PRIORITY_HAPTIC_MS: [u64; 3] = [250, 100, 250];

/// Priority tier attached to a dispatched notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    /// Informational, no interruption
    Low,
    /// Shown promptly, no haptics
    Medium,
    /// Interrupting, paired with a haptic pulse
    High,
}

/// Abstract notification surface provided by the host.
pub trait NotificationSink: Send + Sync {
    /// Deliver a user-facing message. Must not block.
    fn notify(&self, message: &str, priority: NotificationPriority);

    /// Optional haptic pulse pattern. Default is a no-op.
    fn haptic(&self, _pattern: &[u64]) {}
}
