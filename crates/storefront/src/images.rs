//! Image reference resolution.
//!
//! Catalog entries store image references as stream-wrapper URIs
//! (`public://products/widget.png`). Public files are served under a single
//! absolute prefix, so resolution is a join onto that prefix.

use url::Url;

use crate::store::ImageResolver;

const PUBLIC_SCHEME: &str = "public://";

/// Resolves `public://` references under a configured files URL.
///
/// Absolute `http(s)` references are passed through unchanged; bare
/// relative paths are treated like `public://` ones.
#[derive(Debug, Clone)]
pub struct PublicFileUrlResolver {
    files_base_url: Url,
}

impl PublicFileUrlResolver {
    /// `files_base_url` should end with `/`, otherwise its last segment is
    /// replaced on join.
    #[must_use]
    pub const fn new(files_base_url: Url) -> Self {
        Self { files_base_url }
    }
}

impl ImageResolver for PublicFileUrlResolver {
    fn resolve_absolute_url(&self, image_ref: &str) -> Option<String> {
        let image_ref = image_ref.trim();
        if image_ref.is_empty() {
            return None;
        }

        if let Some(path) = image_ref.strip_prefix(PUBLIC_SCHEME) {
            return join(&self.files_base_url, path);
        }

        match Url::parse(image_ref) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url.into()),
            Ok(url) => {
                tracing::warn!(scheme = url.scheme(), "Unsupported image reference scheme");
                None
            }
            Err(url::ParseError::RelativeUrlWithoutBase) => join(&self.files_base_url, image_ref),
            Err(e) => {
                tracing::warn!(error = %e, "Unparseable image reference");
                None
            }
        }
    }
}

fn join(base: &Url, path: &str) -> Option<String> {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return None;
    }
    base.join(path).map(Into::into).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn resolver() -> PublicFileUrlResolver {
        PublicFileUrlResolver::new(Url::parse("https://shop.example/files/").unwrap())
    }

    #[test]
    fn test_public_scheme() {
        assert_eq!(
            resolver().resolve_absolute_url("public://products/widget.png"),
            Some("https://shop.example/files/products/widget.png".to_string())
        );
    }

    #[test]
    fn test_public_scheme_encodes_spaces() {
        assert_eq!(
            resolver().resolve_absolute_url("public://summer sale.jpg"),
            Some("https://shop.example/files/summer%20sale.jpg".to_string())
        );
    }

    #[test]
    fn test_absolute_url_passthrough() {
        assert_eq!(
            resolver().resolve_absolute_url("https://cdn.example/a.png"),
            Some("https://cdn.example/a.png".to_string())
        );
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            resolver().resolve_absolute_url("/gadget.png"),
            Some("https://shop.example/files/gadget.png".to_string())
        );
    }

    #[test]
    fn test_unusable_references() {
        assert_eq!(resolver().resolve_absolute_url(""), None);
        assert_eq!(resolver().resolve_absolute_url("public://"), None);
        assert_eq!(resolver().resolve_absolute_url("private://secret.pdf"), None);
    }
}
