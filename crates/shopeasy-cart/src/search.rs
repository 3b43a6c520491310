//! Product search: title filtering and the `?q=` query parameter.

use url::form_urlencoded;
use url::Url;

/// A normalized search needle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    needle: String,
}

impl SearchQuery {
    /// From the search box. Blank input is not a query.
    pub fn from_input(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self::build(text))
    }

    /// From the URL on page load. Only an absent or empty parameter is
    /// ignored; whitespace trims to an empty needle that matches everything.
    pub fn from_param(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        Some(Self::build(raw.trim()))
    }

    fn build(text: &str) -> Self {
        Self {
            text: text.to_string(),
            needle: text.to_lowercase(),
        }
    }

    /// The trimmed query as typed.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Case-insensitive substring match against a product title.
    pub fn matches(&self, title: &str) -> bool {
        title.to_lowercase().contains(&self.needle)
    }

    /// Visibility mask for `titles`, in order.
    pub fn filter_titles<I, T>(&self, titles: I) -> Vec<bool>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        titles.into_iter().map(|t| self.matches(t.as_ref())).collect()
    }
}

/// Value of the first `name` parameter in `href`'s query string.
pub fn query_param(href: &str, name: &str) -> Option<String> {
    let url = Url::parse(href).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// `href` with `name` set to `value`: the first occurrence is replaced in
/// place, later duplicates are dropped, and a missing parameter is appended.
/// Returns `None` when `href` is not an absolute URL.
pub fn with_query_param(href: &str, name: &str, value: &str) -> Option<String> {
    let mut url = Url::parse(href).ok()?;
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut seen = false;
    for (k, v) in url.query_pairs() {
        if k == name {
            if !seen {
                pairs.push((k.into_owned(), value.to_string()));
                seen = true;
            }
        } else {
            pairs.push((k.into_owned(), v.into_owned()));
        }
    }
    if !seen {
        pairs.push((name.to_string(), value.to_string()));
    }
    url.query_pairs_mut().clear().extend_pairs(pairs);
    Some(url.into())
}

/// Navigation target for a search that could not be applied locally.
pub fn results_target(results_page: &str, name: &str, query: &SearchQuery) -> String {
    let encoded = form_urlencoded::Serializer::new(String::new())
        .append_pair(name, query.as_str())
        .finish();
    format!("{results_page}?{encoded}")
}
