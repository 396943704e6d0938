//! Moves through a dynamic-programming table.

/// The direction of a move in the DP table.
///
/// The first sequence runs down the rows and the second along the columns.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Direction {
    /// Diagonal (Up and Left) for a match or substitution.
    Diagonal,
    /// Up for a token of the first sequence against a gap.
    Up,
    /// Left for a token of the second sequence against a gap.
    Left,
}

/// A monotone path through a DP table.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    /// The score of the path.
    pub score: f64,
    /// The number of leading tokens of each sequence the path skips.
    pub start: (usize, usize),
    /// The moves, first to last.
    pub steps: Vec<Direction>,
}

impl Path {
    /// The exclusive end of the path in each sequence.
    #[must_use]
    pub fn end(&self) -> (usize, usize) {
        self.steps.iter().fold(self.start, |(i, j), d| match d {
            Direction::Diagonal => (i + 1, j + 1),
            Direction::Up => (i + 1, j),
            Direction::Left => (i, j + 1),
        })
    }

    /// The number of gap moves in the path.
    #[must_use]
    pub fn num_gaps(&self) -> usize {
        self.steps.iter().filter(|&&d| d != Direction::Diagonal).count()
    }
}
