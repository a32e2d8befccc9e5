//! Status returned by behavior nodes.

/// The result of evaluating a behavior node.
///
/// # Real-time Semantics
///
/// In a frame-stepped game a behavior may span multiple ticks:
/// - Conditions evaluate immediately (e.g., "Is a target in range?")
/// - Actions emit a command and complete within the tick
/// - Composites may report `Running` while a child is still in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The behavior completed successfully.
    ///
    /// For conditions: The condition was met.
    /// For actions: A command was written into the context.
    Success,

    /// The behavior failed.
    ///
    /// For conditions: The condition was not met.
    /// For decorators: The gate (e.g., a cooldown) rejected the tick.
    Failure,

    /// The behavior has not finished yet and wants to be ticked again.
    Running,
}

impl Status {
    /// Returns `true` if this status is `Success`.
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    /// Returns `true` if this status is `Failure`.
    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failure)
    }

    /// Returns `true` if this status is `Running`.
    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }
}
