//! Pagination planning.
//!
//! Decides whether a page has a successor and, when it does, constructs the
//! next-cursor URL from the original request plus the effective limit and
//! offset that the executed plan actually used.
//!
//! Rules:
//! - A next link exists iff the page came back full (`returned ==
//!   effective_limit`) and, when a `num` cap was supplied, the cumulative
//!   consumed count (`offset + effective_limit`) has not reached it yet.
//! - The next URL repeats every original query parameter verbatim except
//!   `offset` (advanced by the effective limit, never the requested limit)
//!   and `limit` (pinned to the effective limit, so a `num`-shrunk page
//!   size stays shrunk for the remainder of the result set).
//! - `offset` is always written explicitly in an emitted next URL, even
//!   when the original request omitted it.

use url::Url;

/// Everything the planner needs about the page that was just served.
#[derive(Debug, Clone, Copy)]
pub struct PageWindow {
    /// Page size the executed plan enforced
    pub effective_limit: u32,
    /// Skip count the executed plan used
    pub offset: u64,
    /// Client-requested total cap, if any
    pub num: Option<u32>,
    /// Items actually returned
    pub returned: usize,
}

impl PageWindow {
    /// True when a further page may exist.
    pub fn has_next(&self) -> bool {
        if self.returned != self.effective_limit as usize {
            return false;
        }
        match self.num {
            Some(num) => self.offset + (self.effective_limit as u64) < num as u64,
            None => true,
        }
    }
}

/// Builds the next-cursor URL for a served page, or `None` when the page
/// was terminal.
pub fn next_url(request_url: &Url, window: &PageWindow) -> Option<String> {
    if !window.has_next() {
        return None;
    }

    // Original parameter order is preserved; offset/limit are re-emitted at
    // the end with the advanced/pinned values.
    let carried: Vec<(String, String)> = request_url
        .query_pairs()
        .filter(|(key, _)| key != "offset" && key != "limit")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut next = request_url.clone();
    {
        let mut pairs = next.query_pairs_mut();
        pairs.clear();
        for (key, value) in &carried {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("limit", &window.effective_limit.to_string());
        pairs.append_pair(
            "offset",
            &(window.offset + window.effective_limit as u64).to_string(),
        );
    }
    Some(next.to_string())
}
