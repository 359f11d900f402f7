use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of entity a search looks for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    People,
    Pages,
    Groups,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::People => "people",
            Self::Pages => "pages",
            Self::Groups => "groups",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The active query of one search session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub term: String,
    pub search_type: SearchType,
    pub city: Option<String>,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>, search_type: SearchType, city: Option<String>) -> Self {
        Self {
            term: term.into(),
            search_type,
            city,
        }
    }

    /// City filter, if one was given and is not blank
    pub fn city_filter(&self) -> Option<&str> {
        self.city
            .as_deref()
            .map(str::trim)
            .filter(|city| !city.is_empty())
    }
}

/// A people/page/group result, emitted once per session per URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredEntity {
    pub name: String,
    pub profile_url: String,
    #[serde(rename = "type")]
    pub entity_type: SearchType,
}
