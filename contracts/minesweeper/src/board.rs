//! # Board generation
//!
//! A board is a flat byte array of `rows * cols` cells, row-major.
//! Each byte is either [`CELL_MINE`] or the number of mines among the
//! cell's up-to-8 neighbours.
//!
//! ## Seeding
//! The layout is a pure function of a 32-byte seed: the seed is fed to the
//! host PRNG and mines are drawn with a partial Fisher-Yates shuffle over
//! the cell indices. Replaying `generate` with a stored seed reproduces the
//! exact board, which is what `verify_board` relies on.
//!
//! The production seed comes from [`LedgerEntropy`]. Its unpredictability
//! is bounded by the host PRNG and ledger metadata, both of which a
//! validator producing the ledger can influence. There is no VRF or
//! commit-reveal step here.

use soroban_sdk::{Address, Bytes, BytesN, Env};

use crate::difficulty::{validate_dimensions, MAX_CELLS};
use crate::MinesweeperError;

/// Marker stored in place of an adjacency count.
pub const CELL_MINE: u8 = 9;

// ═══════════════════════════════════════════════════════════════════════════════
//  Seed provider
// ═══════════════════════════════════════════════════════════════════════════════

/// Inputs that make a seed unique to one session.
pub struct SeedContext {
    pub player: Address,
    pub session_id: u32,
    /// Number of sessions this player started before this one.
    pub player_nonce: u32,
}

pub trait SeedSource {
    fn next_seed(&self, env: &Env, ctx: &SeedContext) -> BytesN<32>;
}

/// Host PRNG output mixed with ledger metadata and the session identity.
pub struct LedgerEntropy;

impl SeedSource for LedgerEntropy {
    fn next_seed(&self, env: &Env, ctx: &SeedContext) -> BytesN<32> {
        let entropy: u64 = env.prng().gen();

        // entropy(8) || sequence(4) || timestamp(8) || session_id(4) || nonce(4)
        let mut fixed = [0u8; 28];
        fixed[0..8].copy_from_slice(&entropy.to_be_bytes());
        fixed[8..12].copy_from_slice(&env.ledger().sequence().to_be_bytes());
        fixed[12..20].copy_from_slice(&env.ledger().timestamp().to_be_bytes());
        fixed[20..24].copy_from_slice(&ctx.session_id.to_be_bytes());
        fixed[24..28].copy_from_slice(&ctx.player_nonce.to_be_bytes());

        let mut data = Bytes::from_array(env, &fixed);
        data.append(&ctx.player.to_string().to_bytes());
        env.crypto().keccak256(&data).into()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Generation
// ═══════════════════════════════════════════════════════════════════════════════

/// Derives the mine layout for `seed`. Fails with `InvalidDifficulty` if the
/// dimensions do not fit or leave no safe cell.
pub fn generate(
    env: &Env,
    seed: &BytesN<32>,
    rows: u32,
    cols: u32,
    mines: u32,
) -> Result<Bytes, MinesweeperError> {
    validate_dimensions(rows, cols, mines)?;
    let n = (rows * cols) as usize;

    env.prng().seed(Bytes::from_array(env, &seed.to_array()));

    let mut order = [0u16; MAX_CELLS];
    for (i, slot) in order.iter_mut().take(n).enumerate() {
        *slot = i as u16;
    }

    // Only the first `mines` positions of the shuffle are needed.
    let mut layout = [0u8; MAX_CELLS];
    let last = (n - 1) as u64;
    for i in 0..mines as usize {
        let j = env.prng().gen_range::<u64>((i as u64)..=last) as usize;
        order.swap(i, j);
        layout[order[i] as usize] = CELL_MINE;
    }

    fill_adjacency(&mut layout[..n], rows, cols);
    Ok(Bytes::from_slice(env, &layout[..n]))
}

/// Writes the neighbour mine count into every non-mine cell.
pub fn fill_adjacency(layout: &mut [u8], rows: u32, cols: u32) {
    for idx in 0..layout.len() {
        if layout[idx] == CELL_MINE {
            continue;
        }
        let mut count = 0u8;
        for_each_neighbor(rows, cols, idx, |nb| {
            if layout[nb] == CELL_MINE {
                count += 1;
            }
        });
        layout[idx] = count;
    }
}

/// Calls `f` with the index of every in-bounds neighbour of `idx`.
pub fn for_each_neighbor<F: FnMut(usize)>(rows: u32, cols: u32, idx: usize, mut f: F) {
    let rows = rows as i32;
    let cols = cols as i32;
    let r = idx as i32 / cols;
    let c = idx as i32 % cols;
    for dr in -1..=1 {
        for dc in -1..=1 {
            if dr == 0 && dc == 0 {
                continue;
            }
            let nr = r + dr;
            let nc = c + dc;
            if nr >= 0 && nr < rows && nc >= 0 && nc < cols {
                f((nr * cols + nc) as usize);
            }
        }
    }
}
