// phase.rs - The six fixed stages of a tick

use std::fmt;

/// Stage of a tick. Every tick runs all six, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Input,
    Validation,
    Execution,
    Reaction,
    ViewCalculation,
    Cleanup,
}

impl Phase {
    pub const COUNT: usize = 6;

    /// Execution order.
    pub const ALL: [Phase; Phase::COUNT] = [
        Phase::Input,
        Phase::Validation,
        Phase::Execution,
        Phase::Reaction,
        Phase::ViewCalculation,
        Phase::Cleanup,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Phase::Input => "Input",
            Phase::Validation => "Validation",
            Phase::Execution => "Execution",
            Phase::Reaction => "Reaction",
            Phase::ViewCalculation => "ViewCalculation",
            Phase::Cleanup => "Cleanup",
        }
    }

    /// The phase after this one, `None` after Cleanup.
    pub fn next(self) -> Option<Phase> {
        Phase::ALL.get(self.index() + 1).copied()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_matches_indices() {
        for (index, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), index);
        }
        assert_eq!(Phase::Input.next(), Some(Phase::Validation));
        assert_eq!(Phase::ViewCalculation.next(), Some(Phase::Cleanup));
        assert_eq!(Phase::Cleanup.next(), None);
        assert_eq!(Phase::ViewCalculation.to_string(), "ViewCalculation");
    }
}
