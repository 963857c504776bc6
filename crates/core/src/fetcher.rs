//! Network seam.

use async_trait::async_trait;

use crate::Error;
use crate::request::RequestDescriptor;
use crate::response::Response;

/// Performs the actual network request for a descriptor.
///
/// Any response the server sends, including 4xx and 5xx, is `Ok`. Only a fetch
/// that could not complete is `Err(Error::NetworkFailure)`.
#[async_trait]
pub trait NetworkFetcher: Send + Sync + 'static {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<Response, Error>;
}
