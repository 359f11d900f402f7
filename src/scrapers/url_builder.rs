use crate::models::{SearchQuery, SearchType};
use serde_json::json;
use url::Url;

fn search_path(search_type: SearchType) -> &'static str {
    match search_type {
        SearchType::People => "/search/people/",
        SearchType::Pages => "/search/pages/",
        SearchType::Groups => "/search/groups/",
    }
}

/// Results page URL for `query`, rooted at `origin`.
///
/// The term goes in `q`. A non-blank city adds `filters`, whose value is the
/// JSON object `{"city": ...}`. Both are form-urlencoded. Nothing else is validated.
pub fn build_search_url(origin: &Url, query: &SearchQuery) -> Url {
    let mut url = origin.clone();
    url.set_path(search_path(query.search_type));
    url.set_query(None);
    url.set_fragment(None);

    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("q", &query.term);
        if let Some(city) = query.city_filter() {
            pairs.append_pair("filters", &json!({ "city": city }).to_string());
        }
    }

    url
}
