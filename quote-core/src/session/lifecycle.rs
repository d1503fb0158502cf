use serde::{Deserialize, Serialize};

/// Where a form session is in its one-time load.
///
/// A session starts in `Loading` and moves to `Ready` exactly once, when the
/// fetch of stored data finishes (whether it succeeded or not). There is no
/// way back to `Loading`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadPhase {
    #[default]
    Loading,
    Ready,
}

impl LoadPhase {
    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }

    pub fn mark_ready(&mut self) {
        *self = Self::Ready;
    }
}
