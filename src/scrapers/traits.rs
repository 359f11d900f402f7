use crate::error::Result;
use async_trait::async_trait;
use url::Url;

/// The live page the engine drives.
/// Implemented by headless Chrome in production and by a scripted page in tests.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Full navigation to `url`, returning once the browser reports it loaded
    async fn navigate(&self, url: &Url) -> Result<()>;

    /// Scroll the viewport down by `pixels`
    async fn scroll_by(&self, pixels: u32) -> Result<()>;

    /// Total height of the document body
    async fn document_height(&self) -> Result<u64>;

    /// Serialized HTML of the current document
    async fn document_html(&self) -> Result<String>;

    fn driver_name(&self) -> &'static str;
}
