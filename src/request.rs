use url::Url;

use crate::config::SourceConfig;
use crate::error::{KodikError, Result};

/// Placeholder id used by the access check; never matches real material.
pub const PROBE_ID: &str = "movie-0";
/// Shortest title (in characters) the search endpoint is queried with.
pub const MIN_TITLE_CHARS: usize = 3;

const SEARCH_SEGMENT: &str = "search";

/// The three shapes of a `search` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchQuery<'a> {
    Probe,
    Title(&'a str),
    Id(&'a str),
}

impl<'a> SearchQuery<'a> {
    fn param(&self) -> (&'static str, &'a str) {
        match *self {
            SearchQuery::Probe => ("id", PROBE_ID),
            SearchQuery::Title(t) => ("title", t),
            SearchQuery::Id(id) => ("id", id),
        }
    }
}

/// Rejects titles the API should never see. `"0"` counts as missing.
pub fn check_title(title: &str) -> Result<()> {
    if title.is_empty() || title == "0" {
        return Err(KodikError::EmptyQuery("search query is missing".to_string()));
    }
    if title.chars().count() < MIN_TITLE_CHARS {
        return Err(KodikError::TooLargeResponse("search query is too short".to_string()));
    }
    Ok(())
}

/// `<scheme>://<host>/<base path>/search?token=..&(id|title)=..`
pub fn search_url(source: &SourceConfig, query: SearchQuery<'_>) -> Result<Url> {
    let scheme = source.scheme.trim().trim_end_matches('/').trim_end_matches(':');
    let host = source.host.trim().trim_matches('/');
    if scheme.is_empty() || host.is_empty() {
        return Err(KodikError::InvalidSource("scheme and host are required".to_string()));
    }
    let mut url = Url::parse(&format!("{}://{}/", scheme, host))
        .map_err(|e| KodikError::InvalidSource(format!("{}://{}: {}", scheme, host, e)))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| KodikError::InvalidSource(format!("{}://{} cannot carry a path", scheme, host)))?;
        segments.pop_if_empty();
        segments.extend(source.base_path.split('/').filter(|s| !s.is_empty()));
        segments.push(SEARCH_SEGMENT);
    }
    let (key, value) = query.param();
    url.query_pairs_mut().append_pair("token", &source.token).append_pair(key, value);
    Ok(url)
}

/// URL text with the token value masked, for logs.
pub fn redacted(url: &Url) -> String {
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| { let v = if k == "token" { "***".into() } else { v }; (k.into_owned(), v.into_owned()) })
        .collect();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(scheme: &str, host: &str, base_path: &str) -> SourceConfig {
        SourceConfig { token: "abc".into(), scheme: scheme.into(), host: host.into(), base_path: base_path.into(), origin: "kodik".into() }
    }

    #[test]
    fn probe_url() {
        let url = search_url(&SourceConfig::new("abc"), SearchQuery::Probe).unwrap();
        assert_eq!(url.as_str(), "https://kodikapi.com/search?token=abc&id=movie-0");
    }

    #[test]
    fn title_is_form_encoded() {
        let url = search_url(&SourceConfig::new("abc"), SearchQuery::Title("Naruto: Shippuden & co")).unwrap();
        assert_eq!(url.as_str(), "https://kodikapi.com/search?token=abc&title=Naruto%3A+Shippuden+%26+co");
        let pairs: Vec<_> = url.query_pairs().collect();
        assert_eq!(pairs[1].1, "Naruto: Shippuden & co");
    }

    #[test]
    fn scheme_variants_and_base_path() {
        for scheme in ["http", "http:", "http://"] {
            let url = search_url(&source(scheme, "localhost:8080", "/api/v1/"), SearchQuery::Id("serial-42")).unwrap();
            assert_eq!(url.as_str(), "http://localhost:8080/api/v1/search?token=abc&id=serial-42");
        }
    }

    #[test]
    fn empty_host_is_invalid_source() {
        let err = search_url(&source("https", "  ", ""), SearchQuery::Probe).unwrap_err();
        assert!(matches!(err, KodikError::InvalidSource(_)));
    }

    #[test]
    fn title_guard() {
        assert!(matches!(check_title("").unwrap_err(), KodikError::EmptyQuery(_)));
        assert!(matches!(check_title("0").unwrap_err(), KodikError::EmptyQuery(_)));
        assert!(matches!(check_title("00").unwrap_err(), KodikError::TooLargeResponse(_)));
        assert!(matches!(check_title("a").unwrap_err(), KodikError::TooLargeResponse(_)));
        assert!(matches!(check_title("ab").unwrap_err(), KodikError::TooLargeResponse(_)));
        assert!(matches!(check_title("ая").unwrap_err(), KodikError::TooLargeResponse(_)));
        assert!(check_title("abc").is_ok());
        assert!(check_title("Ван").is_ok());
    }

    #[test]
    fn token_is_masked() {
        let url = search_url(&SourceConfig::new("secret"), SearchQuery::Title("bleach")).unwrap();
        let text = redacted(&url);
        assert!(!text.contains("secret"));
        assert!(text.contains("title=bleach"));
    }
}
