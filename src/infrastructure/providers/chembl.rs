//! `ChEMBL` image API adapter.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::client::get_body;
use crate::domain::entities::{CompoundMetadata, Image, ProviderKind};
use crate::domain::errors::ProviderError;
use crate::domain::mime::normalize_mime;
use crate::domain::ports::ImageProviderPort;

/// Production image endpoint.
pub const CHEMBL_IMAGE_BASE: &str = "https://www.ebi.ac.uk/chembl/api/data/image";

const DEFAULT_MIME_TYPE: &str = "image/svg+xml";

/// Fetches SVG depictions from `ChEMBL` by `InChIKey`.
///
/// Requires HTTP 200 and a non-empty body.
#[derive(Debug, Clone)]
pub struct ChemblProvider {
    client: Client,
    base_url: String,
}

impl ChemblProvider {
    /// Creates a provider against the production endpoint.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, CHEMBL_IMAGE_BASE)
    }

    /// Creates a provider against a custom endpoint.
    #[must_use]
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Returns the image URL for a key.
    #[must_use]
    pub fn image_url(&self, inchi_key: &str) -> String {
        format!("{}/{inchi_key}?format=svg", self.base_url)
    }
}

#[async_trait]
impl ImageProviderPort for ChemblProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Chembl
    }

    async fn fetch_image(&self, compound: &CompoundMetadata) -> Result<Image, ProviderError> {
        if compound.inchi_key.is_empty() {
            return Err(ProviderError::NotFound);
        }

        let url = self.image_url(compound.inchi_key.as_str());
        debug!(url = %url, "Requesting ChEMBL image");

        let fetched = get_body(&self.client, &url).await?;

        if fetched.status != StatusCode::OK {
            return Err(ProviderError::Status(fetched.status.as_u16()));
        }
        if fetched.body.is_empty() {
            return Err(ProviderError::EmptyBody);
        }

        let mime_type = match normalize_mime(&fetched.content_type) {
            "" => DEFAULT_MIME_TYPE,
            mime => mime,
        };

        Ok(Image::new(fetched.body, mime_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::providers::client::{DEFAULT_REQUEST_TIMEOUT, build_client, test_server};
    use axum::Router;
    use axum::body::Body;
    use axum::extract::Path;
    use axum::http::{StatusCode as HttpStatus, header};
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;

    const KEY: &str = "ABCDEF1234567890-UHFFFAOYSA-N";
    const SVG: &[u8] = b"<svg xmlns=\"http://www.w3.org/2000/svg\"><circle r=\"1\"/></svg>";

    async fn image(Path(key): Path<String>) -> impl IntoResponse {
        match key.as_str() {
            KEY => (
                HttpStatus::OK,
                [(header::CONTENT_TYPE, "image/svg+xml; charset=utf-8")],
                SVG,
            )
                .into_response(),
            "NOHEADER-KEY" => Response::new(Body::from(SVG)),
            "EMPTY-KEY" => (HttpStatus::OK, [(header::CONTENT_TYPE, "image/svg+xml")], "")
                .into_response(),
            _ => (HttpStatus::NOT_FOUND, "not found").into_response(),
        }
    }

    async fn provider() -> ChemblProvider {
        let base = test_server::spawn(Router::new().route("/image/:key", get(image))).await;
        ChemblProvider::with_base_url(
            build_client(DEFAULT_REQUEST_TIMEOUT).unwrap(),
            format!("{base}/image/"),
        )
    }

    #[test]
    fn test_image_url() {
        let provider = ChemblProvider::new(Client::new());
        assert_eq!(
            provider.image_url(KEY),
            "https://www.ebi.ac.uk/chembl/api/data/image/ABCDEF1234567890-UHFFFAOYSA-N?format=svg"
        );
    }

    #[tokio::test]
    async fn test_fetch_success_normalizes_mime() {
        let provider = provider().await;
        let image = provider
            .fetch_image(&CompoundMetadata::new(KEY))
            .await
            .unwrap();

        assert_eq!(&image.bytes[..], SVG);
        assert_eq!(image.mime_type, "image/svg+xml");
    }

    #[tokio::test]
    async fn test_non_200_is_rejected() {
        let provider = provider().await;
        let err = provider
            .fetch_image(&CompoundMetadata::new("UNKNOWN-KEY"))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::Status(404));
    }

    #[tokio::test]
    async fn test_empty_body_is_rejected() {
        let provider = provider().await;
        let err = provider
            .fetch_image(&CompoundMetadata::new("EMPTY-KEY"))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::EmptyBody);
    }

    #[tokio::test]
    async fn test_missing_content_type_defaults_to_svg() {
        let provider = provider().await;
        let image = provider
            .fetch_image(&CompoundMetadata::new("NOHEADER-KEY"))
            .await
            .unwrap();
        assert_eq!(image.mime_type, "image/svg+xml");
    }

    #[tokio::test]
    async fn test_empty_key_is_not_found_without_request() {
        let provider = ChemblProvider::with_base_url(Client::new(), "http://127.0.0.1:9");
        let err = provider
            .fetch_image(&CompoundMetadata::new(""))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::NotFound);
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = ChemblProvider::with_base_url(Client::new(), format!("http://{addr}"));
        let err = provider
            .fetch_image(&CompoundMetadata::new(KEY))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));
    }
}
