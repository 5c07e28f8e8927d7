//! QueryState - Search text and page carried in navigable state

use std::borrow::Cow;

const SEARCH_KEY: &str = "busca";
const PAGE_KEY: &str = "pagina";

/// Search text plus 1-indexed page number
///
/// Round-trips through a query string (`busca=Ana&pagina=2`) so that
/// back/forward navigation and shared links restore the same listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub search: String,
    pub page: u32,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search: String::new(),
            page: 1,
        }
    }
}

impl QueryState {
    pub fn new(search: impl Into<String>, page: u32) -> Self {
        Self {
            search: search.into(),
            page: page.max(1),
        }
    }

    /// New search text always starts over at the first page
    pub fn with_search(self, search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            page: 1,
        }
    }

    pub fn with_page(self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self
        }
    }

    /// Whether the name filter endpoint should be used
    pub fn is_search(&self) -> bool {
        !self.search.is_empty()
    }

    /// Zero-based page index expected by the API
    pub fn api_page_index(&self) -> u32 {
        self.page.saturating_sub(1)
    }

    /// Parse a query string. Unknown keys are ignored and a missing or
    /// invalid page reads as 1.
    pub fn from_query_string(query: &str) -> Self {
        let mut state = Self::default();

        for pair in query.trim_start_matches('?').split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let value = decode_component(value);

            match key {
                SEARCH_KEY => state.search = value.into_owned(),
                PAGE_KEY => {
                    state.page = value.trim().parse::<u32>().ok().filter(|p| *p >= 1).unwrap_or(1)
                }
                _ => {}
            }
        }

        state
    }

    pub fn to_query_string(&self) -> String {
        format!(
            "{}={}&{}={}",
            SEARCH_KEY,
            urlencoding::encode(&self.search),
            PAGE_KEY,
            self.page
        )
    }
}

fn decode_component(raw: &str) -> Cow<'_, str> {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(_) => Cow::Borrowed(raw),
    }
}

impl std::fmt::Display for QueryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_query_string())
    }
}
