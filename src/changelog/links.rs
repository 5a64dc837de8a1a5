/// Derive the HTTPS base URL of a hosted repository from a remote URL.
///
/// `git@host:owner/repo.git` becomes `https://host/owner/repo`; a trailing
/// `.git` is always stripped. Returns `None` unless the result has both a
/// scheme and a host.
pub fn origin_base_url(remote_url: &str) -> Option<String> {
    let url = remote_url.trim();
    if url.is_empty() {
        return None;
    }

    let base = match url.strip_prefix("git@") {
        Some(rest) => {
            let (host, path) = rest.split_once(':')?;
            format!("https://{}/{}", host, path.trim_start_matches('/'))
        }
        None => url.to_string(),
    };
    let base = base.strip_suffix(".git").unwrap_or(&base);
    let base = base.trim_end_matches('/');

    let (scheme, rest) = base.split_once("://")?;
    let host = rest.split('/').next().unwrap_or("");
    if scheme.is_empty() || host.is_empty() {
        return None;
    }

    Some(base.to_string())
}

/// Link for a release: a compare view against the previous tag, or the
/// release page of the first tag.
pub fn compare_url(base: &str, previous: Option<&str>, tag: &str) -> String {
    match previous {
        Some(previous) => format!("{}/compare/{}..{}", base, previous, tag),
        None => release_url(base, tag),
    }
}

pub fn release_url(base: &str, tag: &str) -> String {
    format!("{}/releases/tag/{}", base, tag)
}
