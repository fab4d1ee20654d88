//! Client for the storefront REST API.
//!
//! Covers the calls the editor flow needs: image generation uploads, catalog
//! reads, cart changes and order placement. Requests are not retried; errors
//! surface to the caller, who may re-attempt by hand.

use mugsmith_core::{ImageHandle, ResourceTracker, UploadPolicy};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::StudioConfig;
use crate::error::{StudioError, StudioResult};
use crate::models::{
    Cart, CartItem, CartItemUpdate, GeneratedImages, GenerationRequest, Mug, NewCartItem,
    OrderConfirmation, OrderRequest, Prompt, UploadResponse,
};

/// Asynchronous storefront client.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: Client,
    base: Url,
    upload: UploadPolicy,
}

impl StoreClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Http`] if the HTTP client fails to build.
    pub fn new(config: &StudioConfig) -> StudioResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("mugsmith-studio/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            base: config.api_url.clone(),
            upload: config.upload_policy(),
        })
    }

    /// Build a client from `MUGSMITH_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed URL or if the HTTP client fails to
    /// build.
    pub fn from_env() -> StudioResult<Self> {
        Self::new(&StudioConfig::from_env()?)
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve `path` against the base. API paths are relative so they stay
    /// under any path prefix the base carries.
    fn endpoint(&self, path: &str) -> StudioResult<Url> {
        self.base
            .join(path)
            .map_err(|e| StudioError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Upload a photo for stylization with a prompt.
    ///
    /// The upload is checked against the configured ceiling and image types
    /// first; a refused upload never reaches the network. Both response
    /// shapes (`generated_image_url` and `generated_image_paths`) normalise
    /// to a list.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Rejected`] for a refused upload,
    /// [`StudioError::Api`] if the server reports failure or no images, and
    /// transport, status or JSON errors otherwise.
    pub async fn upload_image(
        &self,
        image: Vec<u8>,
        file_name: &str,
        request: GenerationRequest,
    ) -> StudioResult<GeneratedImages> {
        let mime = mime_for_file_name(file_name);
        self.upload.check(image.len(), mime)?;

        let size = image.len();
        let mut part = Part::bytes(image).file_name(file_name.to_string());
        if let Some(mime) = mime {
            part = part.mime_str(mime)?;
        }
        let mut form = Form::new()
            .part("image", part)
            .text("prompt_id", request.prompt_id.to_string());
        if let Some(n) = request.n {
            form = form.text("n", n.to_string());
        }
        if let Some(store) = request.store_images {
            form = form.text("store_images", store.to_string());
        }

        tracing::info!(file = file_name, size, prompt = request.prompt_id, "uploading image");
        let response = self
            .http
            .post(self.endpoint("api/upload-image")?)
            .multipart(form)
            .send()
            .await?;
        let body: UploadResponse = read_json(response).await?;
        let generated = normalise_upload(body)?;
        tracing::info!(count = generated.len(), "images generated");
        Ok(generated)
    }

    /// All mugs in the catalog.
    ///
    /// # Errors
    ///
    /// Returns transport, status or JSON errors.
    pub async fn list_mugs(&self) -> StudioResult<Vec<Mug>> {
        let response = self.http.get(self.endpoint("api/mugs")?).send().await?;
        read_json(response).await
    }

    /// Generation prompts, optionally only the active ones.
    ///
    /// # Errors
    ///
    /// Returns transport, status or JSON errors.
    pub async fn list_prompts(&self, active_only: bool) -> StudioResult<Vec<Prompt>> {
        let mut request = self.http.get(self.endpoint("api/prompts")?);
        if active_only {
            request = request.query(&[("active_only", "true")]);
        }
        read_json(request.send().await?).await
    }

    /// Current cart.
    ///
    /// # Errors
    ///
    /// Returns transport, status or JSON errors.
    pub async fn get_cart(&self) -> StudioResult<Cart> {
        let response = self.http.get(self.endpoint("api/cart")?).send().await?;
        read_json(response).await
    }

    /// Add a line to the cart.
    ///
    /// # Errors
    ///
    /// Returns transport, status or JSON errors.
    pub async fn add_cart_item(&self, item: &NewCartItem) -> StudioResult<CartItem> {
        tracing::debug!(mug = item.mug_id, quantity = item.quantity, "adding cart item");
        let response = self
            .http
            .post(self.endpoint("api/cart/items")?)
            .json(item)
            .send()
            .await?;
        read_json(response).await
    }

    /// Change the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns transport, status or JSON errors.
    pub async fn update_cart_item(&self, id: i64, quantity: u32) -> StudioResult<CartItem> {
        let response = self
            .http
            .put(self.endpoint(&format!("api/cart/items/{id}"))?)
            .json(&CartItemUpdate { quantity })
            .send()
            .await?;
        read_json(response).await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn remove_cart_item(&self, id: i64) -> StudioResult<()> {
        let response = self
            .http
            .delete(self.endpoint(&format!("api/cart/items/{id}"))?)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Place an order for the current cart.
    ///
    /// # Errors
    ///
    /// Returns transport, status or JSON errors.
    pub async fn create_order(&self, order: &OrderRequest) -> StudioResult<OrderConfirmation> {
        let response = self
            .http
            .post(self.endpoint("api/orders")?)
            .json(order)
            .send()
            .await?;
        let confirmation: OrderConfirmation = read_json(response).await?;
        tracing::info!(order = %confirmation.order_number, "order placed");
        Ok(confirmation)
    }

    /// Download an image (typically a generated one) into a tracked handle
    /// ready to place in the editor.
    ///
    /// Locations resolve against the base URL the way a browser resolves
    /// links: `/generated/1.png` is relative to the host, `generated/1.png`
    /// to the base path.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::InvalidUrl`] for an unresolvable location, and
    /// transport or status errors otherwise.
    pub async fn fetch_image(
        &self,
        location: &str,
        tracker: &ResourceTracker,
    ) -> StudioResult<ImageHandle> {
        let url = self.endpoint(location)?;
        let response = check_status(self.http.get(url.clone()).send().await?).await?;
        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        tracing::debug!(%url, len = bytes.len(), "image fetched");
        Ok(tracker.acquire(bytes.to_vec(), mime))
    }
}

/// Media type implied by a file name's extension.
#[must_use]
pub fn mime_for_file_name(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "txt" => Some("text/plain"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

fn normalise_upload(body: UploadResponse) -> StudioResult<GeneratedImages> {
    if !body.success {
        return Err(StudioError::Api(
            body.error
                .unwrap_or_else(|| "image generation failed".to_string()),
        ));
    }
    let urls = match (body.generated_image_paths, body.generated_image_url) {
        (Some(paths), _) if !paths.is_empty() => paths,
        (_, Some(url)) => vec![url],
        _ => Vec::new(),
    };
    if urls.is_empty() {
        return Err(StudioError::Api("response contained no images".to_string()));
    }
    Ok(GeneratedImages { urls })
}

async fn check_status(response: Response) -> StudioResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), "storefront request failed");
    Err(StudioError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> StudioResult<T> {
    let text = check_status(response).await?.text().await?;
    Ok(serde_json::from_str(&text)?)
}
