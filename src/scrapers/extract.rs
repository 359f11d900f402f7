//! Pulls entity links out of a results page.
//!
//! Each search type has a container selector (a union of the known card shapes) and an
//! ordered list of [`LinkStrategy`]s. The first strategy that finds an anchor inside a
//! container wins; a container no strategy matches is skipped.

use crate::error::{Result, ScoutError};
use crate::models::SearchType;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace, warn};
use url::Url;

/// Name used when neither a label nor the anchor itself has text
pub const UNNAMED: &str = "Sin nombre";

/// A link found in one container, before de-duplication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// `href` exactly as written in the page
    pub raw_href: String,
    /// `raw_href` as written when absolute, otherwise joined onto the origin
    pub profile_url: String,
    pub name: String,
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScoutError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Finds an entity anchor by a path fragment in its `href`
#[derive(Debug)]
pub struct LinkStrategy {
    fragment: &'static str,
    selector: Selector,
}

impl LinkStrategy {
    pub fn new(fragment: &'static str) -> Result<Self> {
        let selector = parse_selector(&format!(r#"a[href*="{fragment}"]"#))?;
        Ok(Self { fragment, selector })
    }

    pub fn fragment(&self) -> &'static str {
        self.fragment
    }

    /// First matching anchor in document order
    pub fn find<'a>(&self, container: ElementRef<'a>) -> Option<ElementRef<'a>> {
        container.select(&self.selector).next()
    }
}

fn container_selector(search_type: SearchType) -> &'static str {
    match search_type {
        SearchType::People => r#"div[role="article"]"#,
        SearchType::Pages => r#"div[role="article"], div[data-type="result"]"#,
        SearchType::Groups => r#"div[role="article"], div[data-testid="group-card"]"#,
    }
}

fn link_fragments(search_type: SearchType) -> &'static [&'static str] {
    match search_type {
        SearchType::People => &["/profile/", "/people/", "/user/", "/profile.php"],
        SearchType::Pages => &["/pages/", "/page/"],
        SearchType::Groups => &["/groups/"],
    }
}

/// Collapse runs of whitespace and trim
fn clean_text<'a>(text: impl Iterator<Item = &'a str>) -> String {
    text.flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct Extractor {
    search_type: SearchType,
    origin: Url,
    containers: Selector,
    strategies: Vec<LinkStrategy>,
    label: Selector,
}

impl Extractor {
    pub fn for_type(search_type: SearchType, origin: Url) -> Result<Self> {
        let strategies = link_fragments(search_type)
            .iter()
            .copied()
            .map(LinkStrategy::new)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            search_type,
            origin,
            containers: parse_selector(container_selector(search_type))?,
            strategies,
            label: parse_selector("span")?,
        })
    }

    pub fn search_type(&self) -> SearchType {
        self.search_type
    }

    #[cfg(test)]
    pub fn strategies(&self) -> &[LinkStrategy] {
        &self.strategies
    }

    /// Every linked container in document order. A container that fails is
    /// logged and skipped, the rest of the document is still processed.
    pub fn extract(&self, html: &str) -> Vec<Candidate> {
        let document = Html::parse_document(html);
        let containers: Vec<_> = document.select(&self.containers).collect();
        debug!(
            "Found {} {} containers",
            containers.len(),
            self.search_type
        );

        let mut candidates = Vec::new();
        for container in containers {
            match self.extract_container(container) {
                Ok(Some(candidate)) => candidates.push(candidate),
                Ok(None) => {}
                Err(e) => warn!("Skipping container: {}", e),
            }
        }
        candidates
    }

    fn extract_container(&self, container: ElementRef<'_>) -> Result<Option<Candidate>> {
        let Some((strategy, anchor)) = self
            .strategies
            .iter()
            .find_map(|strategy| strategy.find(container).map(|anchor| (strategy, anchor)))
        else {
            return Ok(None);
        };

        let Some(raw_href) = anchor.value().attr("href") else {
            return Ok(None);
        };
        trace!(strategy = strategy.fragment(), href = raw_href, "Matched link");

        let profile_url = self.normalize(raw_href)?;

        Ok(Some(Candidate {
            raw_href: raw_href.to_string(),
            profile_url,
            name: self.display_name(anchor),
        }))
    }

    fn display_name(&self, anchor: ElementRef<'_>) -> String {
        anchor
            .select(&self.label)
            .map(|label| clean_text(label.text()))
            .find(|text| !text.is_empty())
            .or_else(|| Some(clean_text(anchor.text())).filter(|text| !text.is_empty()))
            .unwrap_or_else(|| UNNAMED.to_string())
    }

    fn normalize(&self, href: &str) -> Result<String> {
        if href.starts_with("http") {
            return Ok(href.to_string());
        }
        self.origin
            .join(href)
            .map(String::from)
            .map_err(|e| ScoutError::Extraction {
                href: href.to_string(),
                message: e.to_string(),
            })
    }
}
