//! Image reference normalization.
//!
//! Product images were historically stored as bare public URLs. The canonical form is
//! an `{ url, path }` pair where `path` is relative to the storage public root. This
//! module converts any mix of the two into the canonical form and runs the
//! owner-scoped repair over a vendor's products.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use uuid::Uuid;

use crate::{
    models::{ImageItem, ImageRef, NormalizeReport},
    repository::Repository,
};

/// Marker separating the storage public root from the object path in a public URL.
pub const PUBLIC_OBJECT_MARKER: &str = "/object/public/";

/// Characters escaped inside one path segment (RFC 3986 unreserved ones are kept).
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// derive_path
///
/// Recovers the storage path from a public URL: the URL-decoded text after
/// [`PUBLIC_OBJECT_MARKER`]. The raw URL is returned unchanged when the marker is
/// missing, when nothing follows it, or when the escapes do not decode to UTF-8.
pub fn derive_path(url: &str) -> String {
    let Some(index) = url.find(PUBLIC_OBJECT_MARKER) else {
        return url.to_string();
    };
    let encoded = &url[index + PUBLIC_OBJECT_MARKER.len()..];
    // Query strings and fragments are not part of the object key.
    let encoded = encoded.split(['?', '#']).next().unwrap_or_default();
    match percent_decode_str(encoded).decode_utf8() {
        Ok(path) if !path.is_empty() => path.into_owned(),
        _ => url.to_string(),
    }
}

/// public_url
///
/// The inverse of [`derive_path`]: addresses `path` under the storage public root.
pub fn public_url(public_root: &str, path: &str) -> String {
    let encoded = path
        .split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/{}", public_root.trim_end_matches('/'), encoded)
}

/// Converts one stored entry into the canonical pair. An empty `path` counts as absent.
pub fn normalize_item(item: &ImageItem) -> ImageRef {
    match item {
        ImageItem::Url(url) => ImageRef {
            url: url.clone(),
            path: derive_path(url),
        },
        ImageItem::Object { url, path } => {
            let url = url.clone().unwrap_or_default();
            let path = match path.as_deref() {
                Some(path) if !path.is_empty() => path.to_string(),
                _ if url.is_empty() => String::new(),
                _ => derive_path(&url),
            };
            ImageRef { url, path }
        }
    }
}

/// normalize
///
/// Canonicalizes every entry, preserving order. Idempotent.
pub fn normalize(images: &[ImageItem]) -> Vec<ImageRef> {
    images.iter().map(normalize_item).collect()
}

/// needs_normalization
///
/// True when any entry is a bare URL or lacks a path. Entries that already carry a
/// path are treated as canonical and never rewritten on their own.
pub fn needs_normalization(images: &[ImageItem]) -> bool {
    images.iter().any(|item| match item {
        ImageItem::Url(_) => true,
        ImageItem::Object { path, .. } => path.as_deref().is_none_or(str::is_empty),
    })
}

/// normalize_owned_images
///
/// Self-service repair for one vendor. Reads only the products owned by `owner_id`,
/// rewrites the ones that need it, and keeps going when a single record fails.
/// Concurrent runs for the same owner converge on the same value.
pub async fn normalize_owned_images(
    repo: &dyn Repository,
    owner_id: Uuid,
) -> Result<NormalizeReport, crate::repository::RepositoryError> {
    let products = repo.list_owned_products(owner_id).await?;
    let mut report = NormalizeReport::default();

    for product in products {
        report.scanned += 1;

        // Defense in depth: the listing is owner-filtered, the write is too.
        if product.vendor_id != owner_id {
            tracing::warn!(product_id = %product.id, "skipping product owned by another vendor");
            continue;
        }

        let raw = product
            .images
            .map(|json| json.0)
            .unwrap_or(serde_json::Value::Array(vec![]));
        let items: Vec<ImageItem> = match serde_json::from_value(raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(product_id = %product.id, error = %e, "unreadable images column");
                report.failed += 1;
                continue;
            }
        };

        if !needs_normalization(&items) {
            continue;
        }

        let normalized = normalize(&items);
        let unchanged = items
            .iter()
            .zip(&normalized)
            .all(|(item, image)| *item == ImageItem::from(image.clone()));
        if unchanged {
            continue;
        }

        match repo
            .update_product_images(product.id, owner_id, &normalized)
            .await
        {
            Ok(true) => report.updated += 1,
            Ok(false) => {
                tracing::warn!(product_id = %product.id, "update matched no owned row");
                report.failed += 1;
            }
            Err(e) => {
                tracing::error!(product_id = %product.id, error = %e, "image update failed");
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        owner_id = %owner_id,
        scanned = report.scanned,
        updated = report.updated,
        failed = report.failed,
        "image normalization finished"
    );
    Ok(report)
}
