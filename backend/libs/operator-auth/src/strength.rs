//! Operator password strength assessment
//!
//! The KDF stretches any password into a full-length key, so a weak password
//! never blocks startup. It does make offline guessing of captured tokens
//! cheaper, which is worth a warning on the operator console.

const MIN_ACCEPTABLE_LENGTH: usize = 12;
const STRONG_LENGTH: usize = 20;
const MIN_ENTROPY_BITS: f64 = 3.0;
const STRONG_ENTROPY_BITS: f64 = 3.8;
const MAX_RUN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStrength {
    Weak,
    Acceptable,
    Strong,
}

impl CredentialStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialStrength::Weak => "weak",
            CredentialStrength::Acceptable => "acceptable",
            CredentialStrength::Strong => "strong",
        }
    }
}

/// Classify a password by length, Shannon entropy and obvious runs.
pub fn assess(password: &str) -> CredentialStrength {
    let bytes = password.as_bytes();

    if password.chars().count() < MIN_ACCEPTABLE_LENGTH {
        return CredentialStrength::Weak;
    }

    let entropy = shannon_entropy(bytes);
    if entropy < MIN_ENTROPY_BITS || has_runs(bytes) {
        return CredentialStrength::Weak;
    }

    if bytes.len() >= STRONG_LENGTH && entropy >= STRONG_ENTROPY_BITS {
        CredentialStrength::Strong
    } else {
        CredentialStrength::Acceptable
    }
}

/// Bits per byte, 0..=8.
fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut freq = [0u32; 256];
    for &byte in data {
        freq[byte as usize] += 1;
    }

    let len = data.len() as f64;
    freq.iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Repeated ("aaaa") or ascending ("abcd", "1234") runs of MAX_RUN bytes.
fn has_runs(data: &[u8]) -> bool {
    let mut same = 1;
    let mut ascending = 1;

    for pair in data.windows(2) {
        same = if pair[0] == pair[1] { same + 1 } else { 1 };
        ascending = if pair[1] as i16 - pair[0] as i16 == 1 {
            ascending + 1
        } else {
            1
        };

        if same >= MAX_RUN || ascending >= MAX_RUN {
            return true;
        }
    }

    false
}
