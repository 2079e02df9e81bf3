//! Public product representation and the content kind that selects it.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The kind tag that marks a catalog entry as a purchasable product.
///
/// Catalog entries of other kinds (pages, articles) share the same store and
/// are never listed or accepted as purchase targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentKind(String);

impl ContentKind {
    /// The kind used when none is configured.
    pub const DEFAULT_PRODUCT: &'static str = "products";

    /// Create a kind tag.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    /// Returns the kind as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ContentKind {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PRODUCT)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A product as exposed to external clients.
///
/// Price is opaque text: no currency or precision normalization happens here.
/// `image_url` serializes under the `images` key and is `null` when the entry
/// has no image attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub description: String,
    pub price: String,
    #[serde(rename = "images")]
    pub image_url: Option<String>,
}
