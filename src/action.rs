use thiserror::Error;

use crate::model::entity::Index;

/// The three ways four players split into two teams of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    /// `a, b` vs `c, d`
    AsPicked,
    /// `a, c` vs `b, d`
    SwapSecondThird,
    /// `a, d` vs `b, c`
    SwapSecondFourth,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::AsPicked, Split::SwapSecondThird, Split::SwapSecondFourth];

    pub fn apply(self, picks: [Index; 4]) -> [Index; 4] {
        let [a, b, c, d] = picks;
        match self {
            Split::AsPicked => [a, b, c, d],
            Split::SwapSecondThird => [a, c, b, d],
            Split::SwapSecondFourth => [a, d, b, c],
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("roster has {0} distinct players, a match needs 4")]
    InsufficientRoster(usize),
}
