//! Stored-file naming: sanitization plus a pluggable prefix strategy.
//!
//! `AppState` holds an `Arc<dyn FileNamer>`; the default `TimestampNamer`
//! prefixes the sanitized name with a second-resolution local timestamp.

use chrono::{Local, NaiveDateTime};
use unicode_normalization::UnicodeNormalization;

/// Used when nothing of the client-supplied stem survives sanitization.
const FALLBACK_STEM: &str = "upload";

/// Longest basename common filesystems accept, in bytes.
pub const MAX_FILENAME_BYTES: usize = 255;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `YYYYMMDD_HHMMSS_`
const TIMESTAMP_PREFIX_BYTES: usize = 16;

/// Turns a client-supplied filename into the name the file is stored under.
/// Implement this to change collision policy without touching the handlers.
pub trait FileNamer: Send + Sync {
    fn stored_name(&self, original: &str) -> String;
}

/// `{YYYYMMDD_HHMMSS}_{sanitized}` using the local clock.
///
/// Two uploads of the same name within one second map to the same stored
/// name and the later write wins.
pub struct TimestampNamer;

impl TimestampNamer {
    pub fn stored_name_at(&self, original: &str, at: NaiveDateTime) -> String {
        format!(
            "{}_{}",
            at.format(TIMESTAMP_FORMAT),
            sanitize_filename_within(original, MAX_FILENAME_BYTES - TIMESTAMP_PREFIX_BYTES)
        )
    }
}

impl FileNamer for TimestampNamer {
    fn stored_name(&self, original: &str) -> String {
        self.stored_name_at(original, Local::now().naive_local())
    }
}

/// Reduces a client filename to a safe standalone basename.
///
/// Characters are NFKD-decomposed so accents fall away (`é` -> `e`), path
/// separators become word breaks, remaining non-ASCII is dropped, whitespace
/// runs collapse to `_`, and anything outside `[A-Za-z0-9_.-]` is removed.
/// Leading and trailing `.`/`_` are trimmed so the result can never be `..`
/// or a hidden file. The result fits in `MAX_FILENAME_BYTES`. The function is
/// idempotent.
pub fn sanitize_filename(original: &str) -> String {
    sanitize_filename_within(original, MAX_FILENAME_BYTES)
}

/// `sanitize_filename` with a caller-chosen byte budget, for namers that add
/// a prefix. Over-long names lose the end of their stem; the extension stays.
pub fn sanitize_filename_within(original: &str, max_bytes: usize) -> String {
    truncate_to(clean(original), max_bytes)
}

fn clean(original: &str) -> String {
    let spaced: String = original
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let cleaned: String = joined
        .chars()
        .filter(|&c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let cleaned = cleaned.trim_matches(|c: char| c == '.' || c == '_');

    if cleaned.is_empty() {
        return FALLBACK_STEM.to_string();
    }

    // "履歴書.pdf" cleans down to just "pdf"; keep it as an extension.
    if !cleaned.contains('.') {
        if let Some((_, ext)) = original.rsplit_once('.') {
            if ext == cleaned {
                return format!("{FALLBACK_STEM}.{cleaned}");
            }
        }
    }

    cleaned.to_string()
}

/// `name` is pure ASCII here, so byte offsets are char boundaries.
fn truncate_to(name: String, max_bytes: usize) -> String {
    if name.len() <= max_bytes {
        return name;
    }
    let trim = |s: &str| s.trim_end_matches(|c: char| c == '.' || c == '_').to_string();

    match name.rsplit_once('.') {
        Some((stem, ext)) if ext.len() + 1 < max_bytes => {
            let stem = trim(&stem[..max_bytes - ext.len() - 1]);
            if stem.is_empty() {
                format!("{FALLBACK_STEM}.{ext}")
            } else {
                format!("{stem}.{ext}")
            }
        }
        _ => trim(&name[..max_bytes]),
    }
}
