// src/registry/validate.rs
use url::Url;

/// An absolute URL with both a scheme and a host.
pub fn is_valid_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => url.has_host() && url.host_str().map_or(false, |h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Split candidates into (valid, invalid), trimming surrounding whitespace
/// and keeping input order in both halves.
pub(crate) fn partition_candidates<I, S>(candidates: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut valid = Vec::new();
    let mut invalid = Vec::new();

    for candidate in candidates {
        let trimmed = candidate.as_ref().trim();
        if is_valid_url(trimmed) {
            valid.push(trimmed.to_string());
        } else {
            invalid.push(candidate.as_ref().to_string());
        }
    }

    (valid, invalid)
}
