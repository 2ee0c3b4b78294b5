//! Top-tier venue classification.

/// Venues rendered with emphasis in the publication list.
pub const TOP_TIER_VENUES: [&str; 5] = ["EMNLP", "ACL", "NAACL", "ICLR", "NeurIPS"];

/// Exact, case-sensitive membership test against an allowlist.
pub fn is_top_tier<S: AsRef<str>>(venue: &str, allowlist: &[S]) -> bool {
    allowlist.iter().any(|v| v.as_ref() == venue)
}
