//! Statistics: per-difficulty aggregates, per-player records and a bounded
//! per-player history of finished games.
//!
//! Counters only grow. Every update uses checked arithmetic and fails the
//! call with `ArithmeticOverflow` instead of wrapping.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::difficulty::Difficulty;
use crate::{MinesweeperError, SessionStatus, StorageKey};

// ═══════════════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════════════

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StatsEntry {
    pub games_played: u64,
    pub games_won: u64,
    pub games_lost: u64,
    pub total_wagered: i128,
    pub total_paid_out: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlayerStats {
    pub address: Address,
    pub games_played: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub win_streak: u32,
    pub best_streak: u32,
    pub best_score: u32,
    pub total_wagered: i128,
    pub total_won: i128,
    pub last_updated: u64,
}

/// Compact record of a finished session, kept per player.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GameSummary {
    pub session_id: u32,
    pub difficulty: Difficulty,
    pub status: SessionStatus,
    pub moves: u32,
    pub cells_revealed: u32,
    pub score: u32,
    pub payout: i128,
    pub ledger: u32,
}

// Ledger rate is approximately 5 seconds per ledger on Stellar
const LEDGER_RATE_SECS: u32 = 5;

// 120 days
const TTL_SECONDS: u32 = 120 * 24 * 60 * 60;
const PLAYER_TTL_LEDGERS: u32 = TTL_SECONDS / LEDGER_RATE_SECS;

const MAX_HISTORY_PER_PLAYER: u32 = 50;

fn bump<T: Copy>(value: T, by: T, add: fn(T, T) -> Option<T>) -> Result<T, MinesweeperError> {
    add(value, by).ok_or(MinesweeperError::ArithmeticOverflow)
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Per-difficulty ledger
// ═══════════════════════════════════════════════════════════════════════════════

impl StatsEntry {
    pub fn record_wager(&mut self, wagered: i128) -> Result<(), MinesweeperError> {
        self.games_played = bump(self.games_played, 1, u64::checked_add)?;
        self.total_wagered = bump(self.total_wagered, wagered, i128::checked_add)?;
        Ok(())
    }

    pub fn record(&mut self, won: bool, paid: i128) -> Result<(), MinesweeperError> {
        if won {
            self.games_won = bump(self.games_won, 1, u64::checked_add)?;
        } else {
            self.games_lost = bump(self.games_lost, 1, u64::checked_add)?;
        }
        self.total_paid_out = bump(self.total_paid_out, paid, i128::checked_add)?;
        Ok(())
    }
}

pub fn load_stats(env: &Env, difficulty: Difficulty) -> StatsEntry {
    env.storage()
        .instance()
        .get(&StorageKey::Stats(difficulty))
        .unwrap_or_default()
}

pub fn save_stats(env: &Env, difficulty: Difficulty, entry: &StatsEntry) {
    env.storage()
        .instance()
        .set(&StorageKey::Stats(difficulty), entry);
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Per-player records
// ═══════════════════════════════════════════════════════════════════════════════

impl PlayerStats {
    fn new(player: &Address, now: u64) -> Self {
        PlayerStats {
            address: player.clone(),
            games_played: 0,
            games_won: 0,
            games_lost: 0,
            win_streak: 0,
            best_streak: 0,
            best_score: 0,
            total_wagered: 0,
            total_won: 0,
            last_updated: now,
        }
    }

    pub fn record_wager(&mut self, wagered: i128, now: u64) -> Result<(), MinesweeperError> {
        self.games_played = bump(self.games_played, 1, u32::checked_add)?;
        self.total_wagered = bump(self.total_wagered, wagered, i128::checked_add)?;
        self.last_updated = now;
        Ok(())
    }

    pub fn record(
        &mut self,
        won: bool,
        paid: i128,
        score: u32,
        now: u64,
    ) -> Result<(), MinesweeperError> {
        if won {
            self.games_won = bump(self.games_won, 1, u32::checked_add)?;
            self.win_streak = bump(self.win_streak, 1, u32::checked_add)?;
            if self.win_streak > self.best_streak {
                self.best_streak = self.win_streak;
            }
        } else {
            self.games_lost = bump(self.games_lost, 1, u32::checked_add)?;
            self.win_streak = 0;
        }
        self.total_won = bump(self.total_won, paid, i128::checked_add)?;
        if score > self.best_score {
            self.best_score = score;
        }
        self.last_updated = now;
        Ok(())
    }
}

pub fn load_player(env: &Env, player: &Address) -> PlayerStats {
    env.storage()
        .persistent()
        .get(&StorageKey::Player(player.clone()))
        .unwrap_or_else(|| PlayerStats::new(player, env.ledger().timestamp()))
}

pub fn find_player(env: &Env, player: &Address) -> Option<PlayerStats> {
    env.storage()
        .persistent()
        .get(&StorageKey::Player(player.clone()))
}

pub fn save_player(env: &Env, stats: &PlayerStats) {
    let key = StorageKey::Player(stats.address.clone());
    env.storage().persistent().set(&key, stats);
    env.storage()
        .persistent()
        .extend_ttl(&key, PLAYER_TTL_LEDGERS, PLAYER_TTL_LEDGERS);
}

// ═══════════════════════════════════════════════════════════════════════════════
//  History
// ═══════════════════════════════════════════════════════════════════════════════

pub fn load_history(env: &Env, player: &Address) -> Vec<GameSummary> {
    env.storage()
        .persistent()
        .get(&StorageKey::History(player.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

/// Appends to the player's history, dropping the oldest entry at capacity.
pub fn push_history(env: &Env, player: &Address, summary: GameSummary) {
    let key = StorageKey::History(player.clone());
    let mut history = load_history(env, player);

    while history.len() >= MAX_HISTORY_PER_PLAYER {
        history.remove(0);
    }
    history.push_back(summary);

    env.storage().persistent().set(&key, &history);
    env.storage()
        .persistent()
        .extend_ttl(&key, PLAYER_TTL_LEDGERS, PLAYER_TTL_LEDGERS);
}
