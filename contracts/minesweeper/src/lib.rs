#![no_std]

//! # Minesweeper
//!
//! A wagering minesweeper game held entirely in one contract. A player pays
//! the entry fee of a difficulty level to start a session, reveals cells one
//! call at a time and is paid the level's winning reward on clearing the
//! board. Hitting a mine forfeits the fee to the treasury.
//!
//! ## Session lifecycle
//! `NoSession → Active → {Won, Lost}`. A finished session stays readable
//! until the same player starts the next one. A player holds at most one
//! Active session.
//!
//! ## Treasury
//! Entry fees and owner top-ups fund a single pool. Starting a session
//! reserves its winning reward, so a win is always payable; the owner can
//! only withdraw what is not reserved.
//!
//! ## Board secrecy
//! Mine positions and the board seed are withheld from every read path
//! while the session is Active. Ledger storage itself is public, so this
//! prevents casual snooping through the contract interface, not a reader
//! decoding raw ledger entries.

mod board;
mod difficulty;
mod reveal;
mod stats;
mod treasury;

pub use board::CELL_MINE;
pub use difficulty::{Difficulty, DifficultyConfig, MAX_CELLS, MAX_COLS, MAX_ROWS};
pub use reveal::RevealOutcome;
pub use stats::{GameSummary, PlayerStats, StatsEntry};
pub use treasury::TreasuryState;

use board::{LedgerEntropy, SeedContext, SeedSource};
use reveal::Minefield;
use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, Address, Bytes, BytesN,
    Env, Vec,
};

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract Events
// ═══════════════════════════════════════════════════════════════════════════════

#[contractevent]
pub struct EvGameStarted {
    pub player: Address,
    pub session_id: u32,
    pub difficulty: u32,
    pub entry_fee: i128,
}

/// Emitted for every reveal that did not hit a mine.
#[contractevent]
pub struct EvCellsRevealed {
    pub player: Address,
    pub session_id: u32,
    pub row: u32,
    pub col: u32,
    pub newly_revealed: u32,
    pub revealed_total: u32,
}

#[contractevent]
pub struct EvGameWon {
    pub player: Address,
    pub session_id: u32,
    pub payout: i128,
    pub score: u32,
}

#[contractevent]
pub struct EvGameLost {
    pub player: Address,
    pub session_id: u32,
    pub exploded_cell: Option<u32>, // None when forfeited
    pub score: u32,
}

#[contractevent]
pub struct EvGameForfeited {
    pub player: Address,
    pub session_id: u32,
}

#[contractevent]
pub struct EvTreasuryFunded {
    pub from: Address,
    pub amount: i128,
}

#[contractevent]
pub struct EvOwnerWithdrawal {
    pub owner: Address,
    pub amount: i128,
}

#[contractevent]
pub struct EvDifficultyUpdated {
    pub difficulty: u32,
    pub rows: u32,
    pub cols: u32,
    pub mines: u32,
    pub entry_fee: i128,
    pub winning_reward: i128,
}

#[contractevent]
pub struct EvOwnershipTransferred {
    pub previous: Address,
    pub owner: Address,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Errors
// ═══════════════════════════════════════════════════════════════════════════════

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum MinesweeperError {
    InvalidDifficulty = 1,
    SessionAlreadyActive = 2,
    NoActiveSession = 3,
    InsufficientPayment = 4,
    CellOutOfBounds = 5,
    AlreadyRevealed = 6,
    InsufficientTreasury = 7,
    Unauthorized = 8,
    ArithmeticOverflow = 9,
    ExcessPayment = 10,
    InvalidAmount = 11,
    OwnerNotSet = 12,
    TokenNotSet = 13,
    SessionNotFound = 14,
    SessionNotFinished = 15,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Session state & storage keys
// ═══════════════════════════════════════════════════════════════════════════════

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum SessionStatus {
    NoSession = 0,
    Active = 1,
    Won = 2,
    Lost = 3,
}

/// Stored session. `cells` is the hidden layout and never leaves the
/// contract while the session is Active.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Session {
    pub session_id: u32,
    pub player: Address,
    pub difficulty: Difficulty,
    // Snapshot taken at start
    pub config: DifficultyConfig,
    pub status: SessionStatus,
    pub seed: BytesN<32>,
    pub cells: Bytes,
    // One byte per cell, 1 = revealed
    pub revealed: Bytes,
    pub revealed_count: u32,
    pub moves: u32,
    pub exploded_cell: Option<u32>,
    pub entry_fee_paid: i128,
    pub payout: i128,
    pub score: u32,
    pub started_at: u64,
    pub started_ledger: u32,
    pub finished_ledger: Option<u32>,
}

/// Player-facing view of a session. While Active, `board` shows
/// [`CELL_HIDDEN`] for every unrevealed cell and `seed` is `None`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionView {
    pub session_id: u32,
    pub player: Address,
    pub difficulty: Difficulty,
    pub config: DifficultyConfig,
    pub status: SessionStatus,
    pub board: Bytes,
    pub revealed_count: u32,
    pub moves: u32,
    pub exploded_cell: Option<u32>,
    pub entry_fee_paid: i128,
    pub payout: i128,
    pub score: u32,
    pub seed: Option<BytesN<32>>,
    pub started_at: u64,
    pub started_ledger: u32,
    pub finished_ledger: Option<u32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RevealedCell {
    pub row: u32,
    pub col: u32,
    pub adjacent: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RevealReport {
    pub outcome: RevealOutcome,
    pub cells: Vec<RevealedCell>,
    pub revealed_total: u32,
}

#[contracttype]
#[derive(Clone)]
enum StorageKey {
    Owner,
    Token,
    Treasury,
    SessionCounter,
    Config(Difficulty),
    Stats(Difficulty),
    Session(Address),
    Player(Address),
    History(Address),
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Board byte shown for a cell the player has not revealed.
pub const CELL_HIDDEN: u8 = 0xFF;

// Ledger rate is approximately 5 seconds per ledger on Stellar
const LEDGER_RATE_SECS: u32 = 5;

// TTL expressed in human-readable time units (30 days)
const TTL_SECONDS: u32 = 30 * 24 * 60 * 60;

/// TTL for session storage in ledgers: 518,400 ledgers
const SESSION_TTL_LEDGERS: u32 = TTL_SECONDS / LEDGER_RATE_SECS;

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract
// ═══════════════════════════════════════════════════════════════════════════════

#[contract]
pub struct MinesweeperContract;

#[contractimpl]
impl MinesweeperContract {
    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Constructor
    // ───────────────────────────────────────────────────────────────────────────

    /// `token` is the asset entry fees are paid in and rewards paid out in.
    pub fn __constructor(env: Env, owner: Address, token: Address) {
        env.storage().instance().set(&StorageKey::Owner, &owner);
        env.storage().instance().set(&StorageKey::Token, &token);
        env.storage()
            .instance()
            .set(&StorageKey::SessionCounter, &0u32);
        treasury::save(&env, &TreasuryState::default());
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Session lifecycle
    // ───────────────────────────────────────────────────────────────────────────

    /// Start a session at `level` (0 = Easy, 1 = Medium, 2 = Hard).
    ///
    /// `payment` must equal the level's entry fee exactly; it is moved from
    /// the player into the treasury and the level's reward is reserved.
    /// Returns the new session id.
    pub fn start(
        env: Env,
        player: Address,
        level: u32,
        payment: i128,
    ) -> Result<u32, MinesweeperError> {
        player.require_auth();

        let difficulty = Difficulty::from_index(level)?;
        if let Some(existing) = Self::find_session(&env, &player) {
            if existing.status == SessionStatus::Active {
                return Err(MinesweeperError::SessionAlreadyActive);
            }
        }

        let config = difficulty::load_config(&env, difficulty);
        if payment < config.entry_fee {
            return Err(MinesweeperError::InsufficientPayment);
        }
        if payment > config.entry_fee {
            return Err(MinesweeperError::ExcessPayment);
        }

        let mut pool = treasury::load(&env);
        pool.deposit(config.entry_fee)?;
        pool.reserve(config.winning_reward)?;

        let mut ledger = stats::load_stats(&env, difficulty);
        ledger.record_wager(config.entry_fee)?;

        let now = env.ledger().timestamp();
        let mut record = stats::load_player(&env, &player);
        let player_nonce = record.games_played;
        record.record_wager(config.entry_fee, now)?;

        let session_id = Self::next_session_id(&env)?;
        let seed = LedgerEntropy.next_seed(
            &env,
            &SeedContext {
                player: player.clone(),
                session_id,
                player_nonce,
            },
        );
        let cells = board::generate(&env, &seed, config.rows, config.cols, config.mines)?;
        let n = config.cell_count() as usize;
        let revealed = Bytes::from_slice(&env, &[0u8; MAX_CELLS][..n]);

        let token = Self::load_token(&env)?;
        treasury::collect(&env, &token, &player, config.entry_fee);

        treasury::save(&env, &pool);
        stats::save_stats(&env, difficulty, &ledger);
        stats::save_player(&env, &record);

        let session = Session {
            session_id,
            player: player.clone(),
            difficulty,
            config: config.clone(),
            status: SessionStatus::Active,
            seed,
            cells,
            revealed,
            revealed_count: 0,
            moves: 0,
            exploded_cell: None,
            entry_fee_paid: config.entry_fee,
            payout: 0,
            score: 0,
            started_at: now,
            started_ledger: env.ledger().sequence(),
            finished_ledger: None,
        };

        EvGameStarted {
            player,
            session_id,
            difficulty: difficulty.index(),
            entry_fee: config.entry_fee,
        }
        .publish(&env);

        Self::write_session(&env, &session);
        Ok(session_id)
    }

    /// Reveal the cell at (`row`, `col`) of the caller's Active session.
    ///
    /// A zero-adjacency cell cascades over its connected zero region. The
    /// report lists every newly revealed cell with its adjacency count; on
    /// `HitMine` the list is empty. Clearing the last safe cell pays the
    /// reserved reward in the same call.
    pub fn reveal(
        env: Env,
        player: Address,
        row: u32,
        col: u32,
    ) -> Result<RevealReport, MinesweeperError> {
        player.require_auth();

        let mut session = Self::read_active_session(&env, &player)?;
        let rows = session.config.rows;
        let cols = session.config.cols;
        if row >= rows || col >= cols {
            return Err(MinesweeperError::CellOutOfBounds);
        }

        let n = session.config.cell_count() as usize;
        let mut cells = [0u8; MAX_CELLS];
        session.cells.copy_into_slice(&mut cells[..n]);
        let mut revealed = [0u8; MAX_CELLS];
        session.revealed.copy_into_slice(&mut revealed[..n]);
        let mut newly = [0u16; MAX_CELLS];

        let cell = row * cols + col;
        let field = Minefield {
            rows,
            cols,
            mines: session.config.mines,
            cells: &cells[..n],
        };
        let result = field.reveal(
            &mut revealed[..n],
            session.revealed_count,
            cell,
            &mut newly,
        )?;

        session.moves = session
            .moves
            .checked_add(1)
            .ok_or(MinesweeperError::ArithmeticOverflow)?;
        session.revealed_count = session
            .revealed_count
            .checked_add(result.newly_revealed)
            .ok_or(MinesweeperError::ArithmeticOverflow)?;

        let mut report_cells = Vec::new(&env);
        for &idx in newly[..result.newly_revealed as usize].iter() {
            let idx = idx as u32;
            report_cells.push_back(RevealedCell {
                row: idx / cols,
                col: idx % cols,
                adjacent: cells[idx as usize] as u32,
            });
        }

        match result.outcome {
            RevealOutcome::HitMine => {
                session.exploded_cell = Some(cell);
                Self::finish(&env, &mut session, SessionStatus::Lost)?;
            }
            outcome => {
                session.revealed = Bytes::from_slice(&env, &revealed[..n]);
                EvCellsRevealed {
                    player: player.clone(),
                    session_id: session.session_id,
                    row,
                    col,
                    newly_revealed: result.newly_revealed,
                    revealed_total: session.revealed_count,
                }
                .publish(&env);
                if outcome == RevealOutcome::Cleared {
                    Self::finish(&env, &mut session, SessionStatus::Won)?;
                }
            }
        }

        Self::write_session(&env, &session);
        Ok(RevealReport {
            outcome: result.outcome,
            cells: report_cells,
            revealed_total: session.revealed_count,
        })
    }

    /// Abandon the caller's Active session. The session is recorded as Lost
    /// and the entry fee stays in the treasury.
    pub fn forfeit(env: Env, player: Address) -> Result<(), MinesweeperError> {
        player.require_auth();

        let mut session = Self::read_active_session(&env, &player)?;
        Self::finish(&env, &mut session, SessionStatus::Lost)?;

        EvGameForfeited {
            player,
            session_id: session.session_id,
        }
        .publish(&env);

        Self::write_session(&env, &session);
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Treasury
    // ───────────────────────────────────────────────────────────────────────────

    /// Top up the pool. Anyone may fund it.
    pub fn fund(env: Env, from: Address, amount: i128) -> Result<(), MinesweeperError> {
        from.require_auth();
        if amount <= 0 {
            return Err(MinesweeperError::InvalidAmount);
        }

        let mut pool = treasury::load(&env);
        pool.deposit(amount)?;

        let token = Self::load_token(&env)?;
        treasury::collect(&env, &token, &from, amount);
        treasury::save(&env, &pool);

        EvTreasuryFunded { from, amount }.publish(&env);
        Ok(())
    }

    /// Withdraw unreserved funds to the owner.
    pub fn owner_withdraw(
        env: Env,
        caller: Address,
        amount: i128,
    ) -> Result<(), MinesweeperError> {
        Self::require_owner(&env, &caller)?;
        if amount <= 0 {
            return Err(MinesweeperError::InvalidAmount);
        }

        let mut pool = treasury::load(&env);
        pool.withdraw(amount)?;

        let token = Self::load_token(&env)?;
        treasury::disburse(&env, &token, &caller, amount);
        treasury::save(&env, &pool);

        EvOwnerWithdrawal {
            owner: caller,
            amount,
        }
        .publish(&env);
        Ok(())
    }

    pub fn get_treasury(env: Env) -> TreasuryState {
        treasury::load(&env)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Read
    // ───────────────────────────────────────────────────────────────────────────

    pub fn get_difficulty_config(
        env: Env,
        level: u32,
    ) -> Result<DifficultyConfig, MinesweeperError> {
        let difficulty = Difficulty::from_index(level)?;
        Ok(difficulty::load_config(&env, difficulty))
    }

    pub fn get_session_status(env: Env, player: Address) -> SessionStatus {
        Self::find_session(&env, &player)
            .map(|s| s.status)
            .unwrap_or(SessionStatus::NoSession)
    }

    /// Get the player's latest session. Unrevealed cells and the seed are
    /// redacted until the session ends.
    pub fn get_session(env: Env, player: Address) -> Result<SessionView, MinesweeperError> {
        let session = Self::find_session(&env, &player).ok_or(MinesweeperError::SessionNotFound)?;
        let finished = session.status != SessionStatus::Active;

        let board = if finished {
            session.cells.clone()
        } else {
            let n = session.config.cell_count() as usize;
            let mut cells = [0u8; MAX_CELLS];
            session.cells.copy_into_slice(&mut cells[..n]);
            let mut revealed = [0u8; MAX_CELLS];
            session.revealed.copy_into_slice(&mut revealed[..n]);
            for (cell, seen) in cells[..n].iter_mut().zip(&revealed[..n]) {
                if *seen == 0 {
                    *cell = CELL_HIDDEN;
                }
            }
            Bytes::from_slice(&env, &cells[..n])
        };

        Ok(SessionView {
            session_id: session.session_id,
            player: session.player,
            difficulty: session.difficulty,
            config: session.config,
            status: session.status,
            board,
            revealed_count: session.revealed_count,
            moves: session.moves,
            exploded_cell: session.exploded_cell,
            entry_fee_paid: session.entry_fee_paid,
            payout: session.payout,
            score: session.score,
            seed: if finished { Some(session.seed) } else { None },
            started_at: session.started_at,
            started_ledger: session.started_ledger,
            finished_ledger: session.finished_ledger,
        })
    }

    /// Re-derive the finished session's layout from its stored seed.
    /// Anyone can compare the result with the board the game was played on.
    pub fn verify_board(env: Env, player: Address) -> Result<Bytes, MinesweeperError> {
        let session = Self::find_session(&env, &player).ok_or(MinesweeperError::SessionNotFound)?;
        if session.status == SessionStatus::Active {
            return Err(MinesweeperError::SessionNotFinished);
        }
        let config = session.config;
        board::generate(&env, &session.seed, config.rows, config.cols, config.mines)
    }

    pub fn get_stats(env: Env, level: u32) -> Result<StatsEntry, MinesweeperError> {
        let difficulty = Difficulty::from_index(level)?;
        Ok(stats::load_stats(&env, difficulty))
    }

    pub fn get_player_stats(env: Env, player: Address) -> Option<PlayerStats> {
        stats::find_player(&env, &player)
    }

    /// Up to 50 most recent finished sessions, oldest first.
    pub fn get_player_history(env: Env, player: Address) -> Vec<GameSummary> {
        stats::load_history(&env, &player)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Admin
    // ───────────────────────────────────────────────────────────────────────────

    pub fn owner(env: Env) -> Result<Address, MinesweeperError> {
        Self::load_owner(&env)
    }

    pub fn transfer_ownership(
        env: Env,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), MinesweeperError> {
        Self::require_owner(&env, &caller)?;
        env.storage()
            .instance()
            .set(&StorageKey::Owner, &new_owner);

        EvOwnershipTransferred {
            previous: caller,
            owner: new_owner,
        }
        .publish(&env);
        Ok(())
    }

    /// Replace a level's configuration. Sessions already Active keep the
    /// config they started with.
    pub fn set_difficulty_config(
        env: Env,
        caller: Address,
        level: u32,
        config: DifficultyConfig,
    ) -> Result<(), MinesweeperError> {
        Self::require_owner(&env, &caller)?;
        let difficulty = Difficulty::from_index(level)?;
        difficulty::store_config(&env, difficulty, &config)?;

        EvDifficultyUpdated {
            difficulty: level,
            rows: config.rows,
            cols: config.cols,
            mines: config.mines,
            entry_fee: config.entry_fee,
            winning_reward: config.winning_reward,
        }
        .publish(&env);
        Ok(())
    }

    pub fn get_token(env: Env) -> Result<Address, MinesweeperError> {
        Self::load_token(&env)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Termination
    // ═══════════════════════════════════════════════════════════════════════════

    /// Moves an Active session to `status`, settling the treasury and the
    /// statistics. A win is checked against the treasury before the status
    /// changes, so a failed payout leaves nothing half-applied.
    fn finish(
        env: &Env,
        session: &mut Session,
        status: SessionStatus,
    ) -> Result<(), MinesweeperError> {
        let won = status == SessionStatus::Won;
        let reward = session.config.winning_reward;

        let mut pool = treasury::load(env);
        pool.release(reward)?;
        let paid = if won {
            pool.payout(reward)?;
            reward
        } else {
            0
        };

        let score = Self::score(session, won)?;
        let now = env.ledger().timestamp();

        let mut ledger = stats::load_stats(env, session.difficulty);
        ledger.record(won, paid)?;
        let mut record = stats::load_player(env, &session.player);
        record.record(won, paid, score, now)?;

        if won {
            let token = Self::load_token(env)?;
            treasury::disburse(env, &token, &session.player, paid);
        }

        session.status = status;
        session.payout = paid;
        session.score = score;
        session.finished_ledger = Some(env.ledger().sequence());

        treasury::save(env, &pool);
        stats::save_stats(env, session.difficulty, &ledger);
        stats::save_player(env, &record);
        stats::push_history(
            env,
            &session.player,
            GameSummary {
                session_id: session.session_id,
                difficulty: session.difficulty,
                status,
                moves: session.moves,
                cells_revealed: session.revealed_count,
                score,
                payout: paid,
                ledger: env.ledger().sequence(),
            },
        );

        if won {
            EvGameWon {
                player: session.player.clone(),
                session_id: session.session_id,
                payout: paid,
                score,
            }
            .publish(env);
        } else {
            EvGameLost {
                player: session.player.clone(),
                session_id: session.session_id,
                exploded_cell: session.exploded_cell,
                score,
            }
            .publish(env);
        }
        Ok(())
    }

    /// Revealed safe cells weighted by level, plus a clear bonus of one
    /// weighted point per mine.
    fn score(session: &Session, won: bool) -> Result<u32, MinesweeperError> {
        let multiplier = session.difficulty.score_multiplier();
        let mut score = session
            .revealed_count
            .checked_mul(multiplier)
            .ok_or(MinesweeperError::ArithmeticOverflow)?;
        if won {
            let bonus = session
                .config
                .mines
                .checked_mul(multiplier)
                .ok_or(MinesweeperError::ArithmeticOverflow)?;
            score = score
                .checked_add(bonus)
                .ok_or(MinesweeperError::ArithmeticOverflow)?;
        }
        Ok(score)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Storage
    // ═══════════════════════════════════════════════════════════════════════════

    fn next_session_id(env: &Env) -> Result<u32, MinesweeperError> {
        let current: u32 = env
            .storage()
            .instance()
            .get(&StorageKey::SessionCounter)
            .unwrap_or(0);
        let next = current
            .checked_add(1)
            .ok_or(MinesweeperError::ArithmeticOverflow)?;
        env.storage()
            .instance()
            .set(&StorageKey::SessionCounter, &next);
        Ok(next)
    }

    fn find_session(env: &Env, player: &Address) -> Option<Session> {
        env.storage()
            .persistent()
            .get(&StorageKey::Session(player.clone()))
    }

    fn read_active_session(env: &Env, player: &Address) -> Result<Session, MinesweeperError> {
        match Self::find_session(env, player) {
            Some(session) if session.status == SessionStatus::Active => Ok(session),
            _ => Err(MinesweeperError::NoActiveSession),
        }
    }

    fn write_session(env: &Env, session: &Session) {
        let key = StorageKey::Session(session.player.clone());
        env.storage().persistent().set(&key, session);
        env.storage()
            .persistent()
            .extend_ttl(&key, SESSION_TTL_LEDGERS, SESSION_TTL_LEDGERS);
        // Keep instance storage (owner, token, treasury, stats) alive
        env.storage()
            .instance()
            .extend_ttl(SESSION_TTL_LEDGERS, SESSION_TTL_LEDGERS);
    }

    fn require_owner(env: &Env, caller: &Address) -> Result<(), MinesweeperError> {
        caller.require_auth();
        if *caller != Self::load_owner(env)? {
            return Err(MinesweeperError::Unauthorized);
        }
        Ok(())
    }

    fn load_owner(env: &Env) -> Result<Address, MinesweeperError> {
        env.storage()
            .instance()
            .get(&StorageKey::Owner)
            .ok_or(MinesweeperError::OwnerNotSet)
    }

    fn load_token(env: &Env) -> Result<Address, MinesweeperError> {
        env.storage()
            .instance()
            .get(&StorageKey::Token)
            .ok_or(MinesweeperError::TokenNotSet)
    }
}
