//! Poll phase tracking.

/// The phase a collector poll is in.
///
/// A poll walks `Idle → Connecting → Decoding → Applying → Flushing → Idle`.
/// Only `Connecting` and `Decoding` can fail; a failure returns the
/// collector to `Idle` without touching published state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PollPhase {
    /// No poll in progress.
    #[default]
    Idle,

    /// Opening the connection to the daemon.
    Connecting,

    /// Streaming the report through the XML decoder.
    Decoding,

    /// Writing decoded values into the registry.
    Applying,

    /// Emitting every registered series downstream.
    Flushing,
}

impl PollPhase {
    /// Returns `true` if a failure can originate in this phase.
    #[must_use]
    pub fn is_fallible(&self) -> bool {
        matches!(self, Self::Connecting | Self::Decoding)
    }

    /// Returns `true` if no poll is running.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl std::fmt::Display for PollPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Connecting => write!(f, "connecting"),
            Self::Decoding => write!(f, "decoding"),
            Self::Applying => write!(f, "applying"),
            Self::Flushing => write!(f, "flushing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert!(PollPhase::default().is_idle());
    }

    #[test]
    fn test_fallible_phases() {
        assert!(PollPhase::Connecting.is_fallible());
        assert!(PollPhase::Decoding.is_fallible());
        assert!(!PollPhase::Applying.is_fallible());
        assert!(!PollPhase::Flushing.is_fallible());
        assert!(!PollPhase::Idle.is_fallible());
    }

    #[test]
    fn test_display() {
        assert_eq!(PollPhase::Connecting.to_string(), "connecting");
        assert_eq!(PollPhase::Flushing.to_string(), "flushing");
    }
}
