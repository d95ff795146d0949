//! Source credibility from the URL's host.
//!
//! Matching is by substring: a host is trusted when any allow-list entry occurs
//! anywhere inside it, so `news.bbc.com` and `bbc.com.example.net` both match `bbc.com`.

/// Allow-list of trusted publisher domains.
#[derive(Debug, Clone)]
pub struct TrustedSources {
    domains: Vec<String>,
}

impl TrustedSources {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domains: domains.into_iter().map(Into::into).collect(),
        }
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// True when the URL's host contains at least one trusted domain.
    pub fn is_trusted(&self, url: &str) -> bool {
        let host = extract_host(url);
        !host.is_empty() && self.domains.iter().any(|d| host.contains(d.as_str()))
    }
}

impl Default for TrustedSources {
    fn default() -> Self {
        Self::new(common::default_trusted_sources())
    }
}

/// Host segment of the first `http[s]://[www.]host[/...]` occurrence in `url`,
/// or an empty string when there is none.
///
/// The host runs up to the next `/`, so ports, credentials and query strings on
/// slash-less URLs stay part of it.
pub fn extract_host(url: &str) -> &str {
    for (start, _) in url.match_indices("http") {
        let rest = &url[start + 4..];
        let rest = rest.strip_prefix('s').unwrap_or(rest);
        let Some(rest) = rest.strip_prefix("://") else {
            continue;
        };

        // `www.` is only dropped when a host remains after it
        let rest = match rest.strip_prefix("www.") {
            Some(tail) if !tail.is_empty() && !tail.starts_with('/') => tail,
            _ => rest,
        };

        let end = rest.find('/').unwrap_or(rest.len());
        if end > 0 {
            return &rest[..end];
        }
    }
    ""
}
