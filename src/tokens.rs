//! Token estimates for the report summary.
//!
//! Counts come from tiktoken-rs when its tables load, otherwise from a
//! four-bytes-per-token approximation.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tiktoken_rs::CoreBPE;

use crate::record::FileRecord;

#[derive(Debug, Error)]
#[error("unknown encoding: {0} (expected cl100k or o200k)")]
pub struct UnknownEncoding(pub String);

/// Tokenizer used for estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Encoding {
    /// GPT-4 and GPT-3.5.
    #[default]
    #[serde(rename = "cl100k_base")]
    Cl100kBase,
    /// GPT-4o.
    #[serde(rename = "o200k_base")]
    O200kBase,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Encoding::Cl100kBase => "cl100k_base",
            Encoding::O200kBase => "o200k_base",
        })
    }
}

impl FromStr for Encoding {
    type Err = UnknownEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cl100k" | "cl100k_base" => Ok(Encoding::Cl100kBase),
            "o200k" | "o200k_base" => Ok(Encoding::O200kBase),
            _ => Err(UnknownEncoding(s.to_string())),
        }
    }
}

static CL100K: OnceLock<Option<CoreBPE>> = OnceLock::new();
static O200K: OnceLock<Option<CoreBPE>> = OnceLock::new();

fn tokenizer(encoding: Encoding) -> Option<&'static CoreBPE> {
    let cell = match encoding {
        Encoding::Cl100kBase => &CL100K,
        Encoding::O200kBase => &O200K,
    };
    cell.get_or_init(|| {
        let loaded = match encoding {
            Encoding::Cl100kBase => tiktoken_rs::cl100k_base(),
            Encoding::O200kBase => tiktoken_rs::o200k_base(),
        };
        loaded
            .map_err(|e| log::debug!("{encoding} unavailable, estimating: {e}"))
            .ok()
    })
    .as_ref()
}

fn approximate(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// Estimated token count of `text`.
///
/// ```
/// use sift::tokens::{count_tokens, Encoding};
///
/// assert_eq!(count_tokens("", Encoding::default()), 0);
/// assert!(count_tokens("fn main() {}", Encoding::O200kBase) > 0);
/// ```
pub fn count_tokens(text: &str, encoding: Encoding) -> usize {
    match tokenizer(encoding) {
        Some(bpe) => bpe.encode_ordinary(text).len(),
        None => approximate(text),
    }
}

/// Per-file and total estimates for a set of records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenTally {
    /// Same order as the records.
    pub per_file: Vec<usize>,
    pub total: usize,
}

/// Count every record's content in parallel.
pub fn tally(records: &[FileRecord], encoding: Encoding) -> TokenTally {
    let per_file: Vec<usize> = records
        .par_iter()
        .map(|r| count_tokens(&r.content, encoding))
        .collect();
    let total = per_file.iter().sum();
    TokenTally { per_file, total }
}
