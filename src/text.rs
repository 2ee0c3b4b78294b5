//! Title cleanup for plain-text contexts (tooltips, button titles).

use once_cell::sync::Lazy;
use regex::Regex;

static SAMP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</?samp>").unwrap());

/// Remove `<samp>` / `</samp>` tags from a title.
///
/// This is a whitelist cleaner for the one styling tag used in titles, not an
/// HTML sanitizer: every other tag is left as-is.
pub fn clean_title(title: &str) -> String {
    SAMP_TAG.replace_all(title, "").into_owned()
}
