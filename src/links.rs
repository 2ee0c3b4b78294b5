//! Link normalization and best-effort direct (PDF) link construction.

/// Strip exactly one trailing `/` from a link.
pub fn normalize_link(link: &str) -> String {
    link.strip_suffix('/').unwrap_or(link).to_string()
}

/// Build the best direct link for a paper.
///
/// An explicit PDF link always wins. Otherwise the normalized link is
/// rewritten for known hosts:
/// - arXiv: `/abs/` becomes `/pdf/` and `.pdf` is appended
/// - ACL Anthology: `.pdf` is appended
///
/// Anything else is returned normalized but otherwise unchanged. The rewrite
/// is a guess, not a guarantee that the target exists.
pub fn to_direct_link(link: &str, explicit_pdf: Option<&str>) -> String {
    if let Some(pdf) = explicit_pdf.filter(|p| !p.is_empty()) {
        return pdf.to_string();
    }

    let link = normalize_link(link);
    if link.contains("arxiv") {
        format!("{}.pdf", link.replacen("/abs/", "/pdf/", 1))
    } else if link.contains("acl") {
        format!("{}.pdf", link)
    } else {
        link
    }
}
