//! Difficulty registry.
//!
//! The three levels are a closed set. Each maps to a [`DifficultyConfig`]
//! that is either the built-in reference value or an owner override kept in
//! instance storage. Sessions copy the config at `start`, so an override
//! never reaches a game that is already running.

use soroban_sdk::{contracttype, Env};

use crate::{MinesweeperError, StorageKey};

// ═══════════════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════════════

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Difficulty {
    Easy = 0,
    Medium = 1,
    Hard = 2,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DifficultyConfig {
    pub rows: u32,
    pub cols: u32,
    pub mines: u32,
    pub entry_fee: i128,
    pub winning_reward: i128,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Constants
// ═══════════════════════════════════════════════════════════════════════════════

pub const MAX_ROWS: u32 = 30;
pub const MAX_COLS: u32 = 30;
/// Largest board any level may use (16×30).
pub const MAX_CELLS: usize = 480;

// Amounts are 18-decimal base units (1 native unit = 10^18).
const EASY_ENTRY_FEE: i128 = 500_000_000_000_000; //        0.0005
const EASY_REWARD: i128 = 1_000_000_000_000_000; //         0.001
const MEDIUM_ENTRY_FEE: i128 = 1_000_000_000_000_000; //    0.001
const MEDIUM_REWARD: i128 = 3_000_000_000_000_000; //       0.003
const HARD_ENTRY_FEE: i128 = 2_000_000_000_000_000; //      0.002
const HARD_REWARD: i128 = 8_000_000_000_000_000; //         0.008

// ═══════════════════════════════════════════════════════════════════════════════
//  Difficulty
// ═══════════════════════════════════════════════════════════════════════════════

impl Difficulty {
    /// Maps the wire index (0..=2) used by the deploy tooling.
    pub fn from_index(level: u32) -> Result<Self, MinesweeperError> {
        match level {
            0 => Ok(Difficulty::Easy),
            1 => Ok(Difficulty::Medium),
            2 => Ok(Difficulty::Hard),
            _ => Err(MinesweeperError::InvalidDifficulty),
        }
    }

    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn reference_config(self) -> DifficultyConfig {
        match self {
            Difficulty::Easy => DifficultyConfig {
                rows: 9,
                cols: 9,
                mines: 10,
                entry_fee: EASY_ENTRY_FEE,
                winning_reward: EASY_REWARD,
            },
            Difficulty::Medium => DifficultyConfig {
                rows: 16,
                cols: 16,
                mines: 40,
                entry_fee: MEDIUM_ENTRY_FEE,
                winning_reward: MEDIUM_REWARD,
            },
            Difficulty::Hard => DifficultyConfig {
                rows: 16,
                cols: 30,
                mines: 99,
                entry_fee: HARD_ENTRY_FEE,
                winning_reward: HARD_REWARD,
            },
        }
    }

    /// Weight applied to revealed cells when scoring a session.
    pub fn score_multiplier(self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  DifficultyConfig
// ═══════════════════════════════════════════════════════════════════════════════

impl DifficultyConfig {
    pub fn cell_count(&self) -> u32 {
        self.rows * self.cols
    }

    /// Rejects any layout that would not fit a board or would leave no safe cell.
    pub fn validate(&self) -> Result<(), MinesweeperError> {
        validate_dimensions(self.rows, self.cols, self.mines)?;
        if self.entry_fee < 0 || self.winning_reward < 0 {
            return Err(MinesweeperError::InvalidDifficulty);
        }
        Ok(())
    }
}

pub fn validate_dimensions(rows: u32, cols: u32, mines: u32) -> Result<(), MinesweeperError> {
    if rows == 0 || cols == 0 || rows > MAX_ROWS || cols > MAX_COLS {
        return Err(MinesweeperError::InvalidDifficulty);
    }
    let cells = rows * cols;
    if cells as usize > MAX_CELLS || mines == 0 || mines >= cells {
        return Err(MinesweeperError::InvalidDifficulty);
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Registry storage
// ═══════════════════════════════════════════════════════════════════════════════

pub fn load_config(env: &Env, difficulty: Difficulty) -> DifficultyConfig {
    env.storage()
        .instance()
        .get(&StorageKey::Config(difficulty))
        .unwrap_or_else(|| difficulty.reference_config())
}

pub fn store_config(
    env: &Env,
    difficulty: Difficulty,
    config: &DifficultyConfig,
) -> Result<(), MinesweeperError> {
    config.validate()?;
    env.storage()
        .instance()
        .set(&StorageKey::Config(difficulty), config);
    Ok(())
}
