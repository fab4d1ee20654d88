//! Wire types for the storefront API.

use mugsmith_core::{ContactDetails, CropConfig};
use serde::{Deserialize, Serialize};

/// A mug in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mug {
    /// Catalog id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Marketing copy.
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price.
    pub price: f64,
    /// Product photo.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Category the mug belongs to.
    #[serde(default)]
    pub category_id: Option<i64>,
    /// Printable area width, in any unit consistent with the height.
    #[serde(default)]
    pub print_template_width: Option<f32>,
    /// Printable area height.
    #[serde(default)]
    pub print_template_height: Option<f32>,
}

impl Mug {
    /// Cropper settings for this mug's printable area.
    ///
    /// Mugs without a usable template crop square.
    #[must_use]
    pub fn crop_config(&self) -> CropConfig {
        match (self.print_template_width, self.print_template_height) {
            (Some(w), Some(h)) => CropConfig::from_print_template(w, h).unwrap_or_else(|e| {
                tracing::warn!(mug = self.id, error = %e, "unusable print template, cropping square");
                CropConfig::square()
            }),
            _ => CropConfig::square(),
        }
    }
}

/// An image generation prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Prompt id sent with uploads.
    pub id: i64,
    /// Prompt text.
    #[serde(alias = "prompt_text")]
    pub text: String,
    /// Style category shown to customers.
    #[serde(default)]
    pub category: Option<String>,
    /// Preview image of the style.
    #[serde(default)]
    pub example_image_url: Option<String>,
    /// Whether customers can pick it.
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// Options for an image generation upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Prompt to apply.
    pub prompt_id: i64,
    /// Number of variants to generate.
    pub n: Option<u32>,
    /// Ask the server to keep the generated files.
    pub store_images: Option<bool>,
}

impl GenerationRequest {
    /// A single generation for `prompt_id`.
    #[must_use]
    pub fn new(prompt_id: i64) -> Self {
        Self {
            prompt_id,
            n: None,
            store_images: None,
        }
    }
}

/// Raw upload response; exactly one of the image fields is normally set.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub generated_image_url: Option<String>,
    #[serde(default)]
    pub generated_image_paths: Option<Vec<String>>,
    #[serde(default, alias = "message")]
    pub error: Option<String>,
}

/// URLs or server paths of generated images, in server order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeneratedImages {
    /// Locations of the generated images.
    pub urls: Vec<String>,
}

impl GeneratedImages {
    /// First generated image, if any.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.urls.first().map(String::as_str)
    }

    /// Number of generated images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// True when nothing was generated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Line id used for updates and removal.
    pub id: i64,
    /// Mug on this line.
    pub mug_id: i64,
    /// Quantity.
    pub quantity: u32,
    /// Unit price at the time of adding.
    #[serde(default)]
    pub price: Option<f64>,
    /// Customer artwork printed on the mug.
    #[serde(default)]
    pub custom_image_url: Option<String>,
}

/// The customer's cart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cart {
    /// Lines in insertion order.
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Server-computed total.
    #[serde(default)]
    pub total: f64,
}

/// Body for adding a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCartItem {
    /// Mug to add.
    pub mug_id: i64,
    /// Quantity, at least one.
    pub quantity: u32,
    /// Customer artwork to print.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_image_url: Option<String>,
}

/// Body for changing a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartItemUpdate {
    /// New quantity.
    pub quantity: u32,
}

/// Where the order ships.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Street and number.
    pub street: String,
    /// City.
    pub city: String,
    /// Postal code.
    pub postal_code: String,
    /// Country.
    pub country: String,
}

/// Body for placing an order from the current cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    /// Customer name.
    pub customer_name: String,
    /// Customer email.
    pub customer_email: String,
    /// Customer phone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    /// Shipping address.
    pub shipping_address: ShippingAddress,
}

impl OrderRequest {
    /// Order for the contact details captured by the wizard.
    #[must_use]
    pub fn from_contact(contact: &ContactDetails, shipping_address: ShippingAddress) -> Self {
        Self {
            customer_name: contact.name.trim().to_string(),
            customer_email: contact.email.trim().to_string(),
            customer_phone: contact
                .phone
                .as_deref()
                .map(str::trim)
                .filter(|phone| !phone.is_empty())
                .map(str::to_string),
            shipping_address,
        }
    }
}

/// Server reply to a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    /// Human-facing order number.
    pub order_number: String,
    /// Charged total.
    pub total: f64,
}
