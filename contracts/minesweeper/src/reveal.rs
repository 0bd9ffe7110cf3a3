//! Reveal engine: applies one reveal to a board and reports the outcome.
//!
//! Works on native slices so a whole cascade runs without touching host
//! objects. `revealed` holds one byte per cell (0 = hidden, 1 = revealed).

use soroban_sdk::contracttype;

use crate::board::{for_each_neighbor, CELL_MINE};
use crate::MinesweeperError;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum RevealOutcome {
    Continue = 0,
    HitMine = 1,
    Cleared = 2,
}

/// Result of a single reveal. The newly revealed cell indices are the first
/// `newly_revealed` entries of the caller's output buffer, in cascade order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RevealResult {
    pub outcome: RevealOutcome,
    pub newly_revealed: u32,
}

pub struct Minefield<'a> {
    pub rows: u32,
    pub cols: u32,
    pub mines: u32,
    pub cells: &'a [u8],
}

impl<'a> Minefield<'a> {
    pub fn safe_cells(&self) -> u32 {
        self.rows * self.cols - self.mines
    }

    /// Reveals `cell` and, for zero-adjacency cells, the connected zero region
    /// plus its numbered border.
    ///
    /// `revealed_count` is the number of cells already set in `revealed`.
    /// On `HitMine` nothing is written to `revealed` or `out`.
    pub fn reveal(
        &self,
        revealed: &mut [u8],
        revealed_count: u32,
        cell: u32,
        out: &mut [u16],
    ) -> Result<RevealResult, MinesweeperError> {
        let n = self.cells.len();
        let start = cell as usize;
        if start >= n {
            return Err(MinesweeperError::CellOutOfBounds);
        }
        if revealed[start] != 0 {
            return Err(MinesweeperError::AlreadyRevealed);
        }

        if self.cells[start] == CELL_MINE {
            return Ok(RevealResult {
                outcome: RevealOutcome::HitMine,
                newly_revealed: 0,
            });
        }

        // Breadth-first cascade; `out` doubles as the queue.
        revealed[start] = 1;
        out[0] = start as u16;
        let mut len = 1usize;
        let mut head = 0usize;
        while head < len {
            let current = out[head] as usize;
            head += 1;
            if self.cells[current] != 0 {
                continue;
            }
            for_each_neighbor(self.rows, self.cols, current, |nb| {
                // A zero cell has no mine neighbours.
                if revealed[nb] == 0 {
                    revealed[nb] = 1;
                    out[len] = nb as u16;
                    len += 1;
                }
            });
        }

        let total = revealed_count
            .checked_add(len as u32)
            .ok_or(MinesweeperError::ArithmeticOverflow)?;
        let outcome = if total == self.safe_cells() {
            RevealOutcome::Cleared
        } else {
            RevealOutcome::Continue
        };

        Ok(RevealResult {
            outcome,
            newly_revealed: len as u32,
        })
    }
}
