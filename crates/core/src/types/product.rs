//! Catalog data handed to the state engine when a product is added.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// The slice of a catalog product the cart and wishlist need.
///
/// Supplied by the product-listing UI; the engine snapshots it on add and
/// never refreshes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ProductSummary {
    /// Create a summary without an image.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: Price) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            image_url: None,
        }
    }

    /// Attach an image URL.
    #[must_use]
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Name to show in messages, falling back to the id when blank.
    #[must_use]
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            self.id.as_str()
        } else {
            name
        }
    }
}
