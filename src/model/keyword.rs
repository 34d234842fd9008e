//! Keyword classification: navigable URL or free-text search term.
//!
//! Classification is re-derived on every use and never cached on the stored
//! keyword.

use url::Url;

/// Where opening a keyword should navigate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordTarget {
  /// Parses to a real host; open directly.
  Url(Url),
  /// Anything else; route through a web search.
  Search(String),
}

const SEARCH_BASE: &str = "https://www.google.com/search";

/// Friendly labels for well-known hosts.
const DOMAIN_LABELS: &[(&str, &str)] = &[
  ("youtube.com", "YouTube"),
  ("facebook.com", "Facebook"),
  ("twitter.com", "Twitter"),
  ("instagram.com", "Instagram"),
  ("linkedin.com", "LinkedIn"),
  ("github.com", "GitHub"),
];

/// Classify a keyword.
///
/// The scheme is auto-prepended when absent; the keyword is a URL only if
/// the result parses to a hostname containing at least one dot.
pub fn classify(keyword: &str) -> KeywordTarget {
  let candidate = if has_http_scheme(keyword) {
    keyword.to_string()
  } else {
    format!("https://{}", keyword)
  };

  if let Ok(parsed) = Url::parse(&candidate) {
    if parsed.host_str().is_some_and(|h| h.contains('.')) {
      return KeywordTarget::Url(parsed);
    }
  }
  KeywordTarget::Search(keyword.to_string())
}

fn has_http_scheme(s: &str) -> bool {
  let lower = s.to_ascii_lowercase();
  lower.starts_with("http://") || lower.starts_with("https://")
}

/// The URL a keyword opens: its own href, or a search query URL.
pub fn open_target(keyword: &str) -> String {
  match classify(keyword) {
    KeywordTarget::Url(url) => url.to_string(),
    KeywordTarget::Search(term) => {
      let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("q", &term)
        .finish();
      format!("{}?{}", SEARCH_BASE, query)
    }
  }
}

/// The hostname a keyword points at, with any leading `www.` stripped.
pub fn hostname(keyword: &str) -> Option<String> {
  match classify(keyword) {
    KeywordTarget::Url(url) => url
      .host_str()
      .map(|h| h.strip_prefix("www.").unwrap_or(h).to_string()),
    KeywordTarget::Search(_) => None,
  }
}

/// Display label for list views: a friendly name for known hosts, a
/// capitalized first host label otherwise, the raw text for search terms.
pub fn display_label(keyword: &str) -> String {
  let Some(host) = hostname(keyword) else {
    return keyword.to_string();
  };

  if let Some((_, label)) = DOMAIN_LABELS.iter().find(|(domain, _)| *domain == host) {
    return (*label).to_string();
  }

  let main_part = host.split('.').next().unwrap_or(&host);
  let mut chars = main_part.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    None => keyword.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_plain_word_is_search() {
    assert_eq!(classify("fb"), KeywordTarget::Search("fb".to_string()));
    assert!(matches!(classify("rust async runtime"), KeywordTarget::Search(_)));
  }

  #[test]
  fn test_bare_domain_is_url() {
    match classify("www.youtube.com") {
      KeywordTarget::Url(url) => {
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("www.youtube.com"));
      }
      other => panic!("expected URL, got {:?}", other),
    }
    assert_eq!(hostname("www.youtube.com").as_deref(), Some("youtube.com"));
  }

  #[test]
  fn test_explicit_scheme_is_preserved() {
    match classify("http://example.org/path") {
      KeywordTarget::Url(url) => {
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.path(), "/path");
      }
      other => panic!("expected URL, got {:?}", other),
    }
  }

  #[test]
  fn test_open_target_routes_search_through_query_url() {
    let target = open_target("rust async");
    assert!(target.starts_with("https://www.google.com/search?q=rust"));

    let target = open_target("Google.com");
    assert_eq!(target, "https://google.com/");
  }

  #[test]
  fn test_display_labels() {
    assert_eq!(display_label("www.youtube.com"), "YouTube");
    assert_eq!(display_label("https://github.com/rust-lang"), "GitHub");
    assert_eq!(display_label("docs.rs"), "Docs");
    assert_eq!(display_label("fb"), "fb");
  }
}
