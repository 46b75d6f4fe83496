use crate::Result;
use async_trait::async_trait;

/// Rendered-DOM capture for sites that build their content client-side
///
/// Implementations drive a headless browser: navigate to the URL, wait for
/// the page to settle and return the serialized DOM. The mirror only calls a
/// renderer for site families that need one.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Returns the fully rendered HTML of `url`
    async fn render(&self, url: &str) -> Result<String>;
}
