//! Shareable run codes. Format: `FL-<WORD><NN>`, e.g. `FL-INVOICE42`.
//!
//! The low 16 bits of a seed carry the word index and the two digits; the
//! high bits are an FNV-1a digest of those, so every code maps to exactly one
//! seed and that seed prints back as the same code.

const CODE_PREFIX: &str = "FL";

pub const RUN_WORDS: [&str; 64] = [
    "INVOICE", "CLIENT", "PITCH", "BRIEF", "MOCKUP", "WIREFRM", "SPRINT", "HOTFIX", "DEPLOY",
    "MERGE", "REBASE", "BUGFIX", "TICKET", "BACKLOG", "RETAINER", "GIG", "HUSTLE", "COFFEE",
    "LAPTOP", "PIXEL", "KERNING", "GRID", "FIGMA", "LOREM", "IPSUM", "STANDUP", "DEADLINE",
    "SCOPE", "CREEP", "REVISE", "FINAL", "FINALV2", "INVOICE2", "OVERDUE", "PAYPAL", "RATE",
    "HOURLY", "FIXED", "ESTIMATE", "MILESTN", "PORTFOL", "RESUME", "REFERAL", "REVIEW", "STARS",
    "UPWORK", "COWORK", "DESK", "MONITOR", "KEYBRD", "MOUSE", "WIFI", "CACHE", "SERVER", "STAGING",
    "PROD", "QA", "REGRESS", "SMOKE", "LINT", "BUILD", "SHIP", "BURNOUT", "WEEKEND",
];

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    bytes.iter().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

fn normalize_word(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

const fn pack(word_index: u16, digits: u8) -> u16 {
    (word_index & 0x003F) | ((digits as u16 & 0x7F) << 6)
}

fn unpack(packed: u16) -> (usize, u8) {
    let digits = u8::try_from((packed >> 6) & 0x7F).unwrap_or(0);
    (usize::from(packed & 0x003F), digits)
}

fn compose_seed(word_index: u16, digits: u8) -> u64 {
    let packed = pack(word_index, digits);
    let [lo, hi] = packed.to_le_bytes();
    let digest = fnv1a64(&[b'F', b'R', b'E', b'E', b'-', lo, hi, 0x5A]);
    (digest & 0xFFFF_FFFF_FFFF_0000) | u64::from(packed)
}

/// Render any seed as a run code.
///
/// Seeds that did not come from a code still print, but only seeds produced
/// by [`seed_from_run_code`] decode back to themselves.
#[must_use]
pub fn run_code_for_seed(seed: u64) -> String {
    let packed = u16::try_from(seed & 0xFFFF).unwrap_or(0);
    let (word_index, digits) = unpack(packed);
    let word = RUN_WORDS.get(word_index).copied().unwrap_or(RUN_WORDS[0]);
    format!("{CODE_PREFIX}-{word}{:02}", digits % 100)
}

/// Parse `FL-WORDNN` (case-insensitive, prefix optional) into its seed.
#[must_use]
pub fn seed_from_run_code(code: &str) -> Option<u64> {
    let trimmed = code.trim();
    let body = match trimmed.split_once('-') {
        Some((prefix, rest)) if prefix.eq_ignore_ascii_case(CODE_PREFIX) => rest,
        Some(_) => return None,
        None => trimmed,
    };
    if body.len() < 3 || !body.is_char_boundary(body.len() - 2) {
        return None;
    }
    let (word_part, digit_part) = body.split_at(body.len() - 2);
    if !digit_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits: u8 = digit_part.parse().ok()?;
    let word = normalize_word(word_part);
    let index = RUN_WORDS.iter().position(|w| normalize_word(w) == word)?;
    let word_index = u16::try_from(index).ok()?;
    Some(compose_seed(word_index, digits))
}

/// Fresh run code from arbitrary entropy (clock, OS random, ...).
#[must_use]
pub fn run_code_from_entropy(entropy: u64) -> String {
    let word_index = u16::try_from(entropy % RUN_WORDS.len() as u64).unwrap_or(0);
    let digits = u8::try_from((entropy >> 17) % 100).unwrap_or(0);
    run_code_for_seed(compose_seed(word_index, digits))
}
