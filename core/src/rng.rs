//! Deterministic per-table RNG derivation.
//!
//! Each table gets its own `StdRng` seeded by hashing the master seed together with the
//! table name, so that tables processed in parallel (§5: "tables within a level may be
//! processed in parallel") never contend on a shared generator, while the whole run stays
//! reproducible from a single `seed`. The hash itself is a plain FNV-1a fold.

use rand::SeedableRng;
use rand::rngs::StdRng;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a(bytes: &[u8], seed: u64) -> u64 {
    let mut hash = FNV_OFFSET ^ seed;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Derive a table-scoped RNG from the master seed.
pub fn table_rng(seed: u64, table: &str) -> StdRng {
    let derived = fnv1a(table.as_bytes(), seed);
    StdRng::seed_from_u64(derived)
}
