//! Pagination cursors parsed from the `Link` HTTP header.
//!
//! GitHub sends `<url>; rel="next", <url>; rel="last"`. Anything that does not
//! look like that is skipped rather than reported: a response whose header
//! cannot be understood simply has no further pages.

use reqwest::header::{HeaderMap, LINK};
use url::Url;

/// One named cursor: the URL to request and the page number it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub url: String,
    pub page: u32,
}

impl PageLink {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            page: page_number(url),
        }
    }
}

/// The four cursor slots GitHub may advertise for a paginated response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    pub first: Option<PageLink>,
    pub prev: Option<PageLink>,
    pub next: Option<PageLink>,
    pub last: Option<PageLink>,
}

impl PageLinks {
    /// Parse a raw `Link` header value.
    pub fn parse(header: &str) -> Self {
        let mut links = Self::default();

        for part in header.split(',') {
            let mut url = None;
            let mut rel = None;

            for segment in part.split(';') {
                let segment = segment.trim();
                if let Some(inner) = segment
                    .strip_prefix('<')
                    .and_then(|s| s.strip_suffix('>'))
                {
                    url = Some(inner.trim());
                } else if let Some(value) = segment.strip_prefix("rel=") {
                    rel = Some(value.trim().trim_matches('"').trim_matches('\''));
                }
            }

            let (Some(url), Some(rel)) = (url, rel) else {
                continue;
            };
            if url.is_empty() {
                continue;
            }

            let slot = match rel {
                "first" => &mut links.first,
                "prev" => &mut links.prev,
                "next" => &mut links.next,
                "last" => &mut links.last,
                _ => continue,
            };
            *slot = Some(PageLink::new(url));
        }

        links
    }

    /// Extract cursors from response headers; no `Link` header means no cursors.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .map(Self::parse)
            .unwrap_or_default()
    }

    pub fn next_url(&self) -> Option<&str> {
        self.next.as_ref().map(|link| link.url.as_str())
    }

    pub fn first_page(&self) -> u32 {
        Self::page_of(&self.first)
    }

    pub fn prev_page(&self) -> u32 {
        Self::page_of(&self.prev)
    }

    pub fn next_page(&self) -> u32 {
        Self::page_of(&self.next)
    }

    pub fn last_page(&self) -> u32 {
        Self::page_of(&self.last)
    }

    /// True when there is nothing further to fetch.
    pub fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }

    fn page_of(link: &Option<PageLink>) -> u32 {
        link.as_ref().map_or(0, |link| link.page)
    }
}

/// Page number from the URL's own `page` query parameter, 0 when absent.
fn page_number(raw: &str) -> u32 {
    let parsed = Url::parse(raw).or_else(|_| {
        Url::parse("http://localhost/").and_then(|base| base.join(raw))
    });

    parsed
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "page")
                .and_then(|(_, value)| value.parse().ok())
        })
        .unwrap_or(0)
}
