//! Tide cycle — Low → Mid → High → Low, one step per tide period.
//!
//! The only way the tide moves is `advance()`, fired by the engine's tide
//! task. Restoring a save sets the index directly.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};

pub const TIDE_CYCLE: [TideLabel; 3] = [TideLabel::Low, TideLabel::Mid, TideLabel::High];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TideLabel {
    Low,
    Mid,
    High,
}

impl TideLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low  => "Low",
            Self::Mid  => "Mid",
            Self::High => "High",
        }
    }
}

impl std::fmt::Display for TideLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TideCycle {
    index: usize,
}

impl TideCycle {
    pub fn new() -> Self {
        Self { index: 0 }
    }

    /// Restore to a saved index. Out-of-range indices are rejected.
    pub fn from_index(index: i64) -> SimResult<Self> {
        usize::try_from(index)
            .ok()
            .filter(|i| *i < TIDE_CYCLE.len())
            .map(|index| Self { index })
            .ok_or_else(|| SimError::corrupt(format!("tide index {index} out of range")))
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn label(&self) -> TideLabel {
        TIDE_CYCLE[self.index]
    }

    /// Step to the next tide. Returns the new label.
    pub fn advance(&mut self) -> TideLabel {
        self.index = (self.index + 1) % TIDE_CYCLE.len();
        self.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_all_labels_and_wraps() {
        let mut tide = TideCycle::new();
        assert_eq!(tide.label(), TideLabel::Low);
        assert_eq!(tide.advance(), TideLabel::Mid);
        assert_eq!(tide.index(), 1);
        assert_eq!(tide.advance(), TideLabel::High);
        assert_eq!(tide.index(), 2);
        assert_eq!(tide.advance(), TideLabel::Low);
        assert_eq!(tide.index(), 0);
    }

    #[test]
    fn restore_rejects_out_of_range() {
        assert_eq!(TideCycle::from_index(2).unwrap().label(), TideLabel::High);
        assert!(TideCycle::from_index(3).is_err());
        assert!(TideCycle::from_index(-1).is_err());
    }
}
