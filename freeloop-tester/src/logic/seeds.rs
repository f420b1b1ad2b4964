use anyhow::{Result, bail};
use freeloop_game::seed::RUN_WORDS;
use freeloop_game::{run_code_for_seed, seed_from_run_code};
use std::collections::HashSet;

const DEFAULT_SEED: u64 = 1337;

/// A career seed and the run code the player typed, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub code: Option<String>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self { seed, code: None }
    }

    #[must_use]
    pub const fn from_run_code(seed: u64, code: String) -> Self {
        Self {
            seed,
            code: Some(code),
        }
    }

    /// Seed for the `iteration`-th career started from this entry.
    #[must_use]
    pub const fn iteration_seed(&self, iteration: u64) -> u64 {
        self.seed ^ iteration.wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}

/// Resolve CLI seed arguments into canonical seeds.
///
/// Accepts literal integers, run codes (`FL-DEADLINE13`, prefix optional),
/// and the keyword `all`, which expands to every run code.
///
/// # Errors
///
/// Returns an error for tokens that are neither numbers nor run codes.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut pending = Vec::new();
    let mut request_all = false;

    for token in tokens {
        if token.is_empty() {
            continue;
        }
        if token.eq_ignore_ascii_case("all") {
            request_all = true;
            continue;
        }
        if let Ok(value) = token.parse::<u64>() {
            pending.push(SeedInfo::from_numeric(value));
            continue;
        }
        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_numeric(value.unsigned_abs()));
            continue;
        }
        if let Some(seed) = seed_from_run_code(token) {
            pending.push(SeedInfo::from_run_code(seed, run_code_for_seed(seed)));
            continue;
        }
        bail!("Unrecognized seed token: {token}");
    }

    if request_all {
        pending.extend(all_run_code_seeds());
    }

    let mut seen = HashSet::new();
    let mut deduped: Vec<SeedInfo> = Vec::with_capacity(pending.len());
    for info in pending {
        if seen.insert(info.seed) {
            deduped.push(info);
        } else if info.code.is_some()
            && let Some(existing) = deduped.iter_mut().find(|s| s.seed == info.seed)
            && existing.code.is_none()
        {
            *existing = info;
        }
    }

    if deduped.is_empty() {
        deduped.push(SeedInfo::from_numeric(DEFAULT_SEED));
    }
    Ok(deduped)
}

fn all_run_code_seeds() -> Vec<SeedInfo> {
    RUN_WORDS
        .iter()
        .flat_map(|word| (0..100).map(move |suffix| format!("FL-{word}{suffix:02}")))
        .filter_map(|code| {
            seed_from_run_code(&code).map(|seed| SeedInfo::from_run_code(seed, code))
        })
        .collect()
}
