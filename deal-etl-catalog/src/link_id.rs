//! Item id extraction from store links.
//!
//! Store links carry the numeric item id as a path segment:
//! ```text
//! https://store.steampowered.com/app/1091500/Cyberpunk_2077/
//! ```

use thiserror::Error;

/// A link that does not carry a usable numeric item id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkIdError {
    #[error("no numeric segment between '/' delimiters in link '{link}'")]
    NoNumericSegment { link: String },
    #[error("numeric segment '{segment}' in link '{link}' does not fit an item id")]
    OutOfRange { link: String, segment: String },
}

/// Extract the item id from a store link.
///
/// Returns the first segment made only of ASCII digits that is both preceded
/// and followed by a `/`.
///
/// # Examples
///
/// ```
/// use deal_etl_catalog::link_id::extract_app_id;
///
/// let id = extract_app_id("https://store.steampowered.com/app/1091500/Cyberpunk_2077/").unwrap();
/// assert_eq!(id, 1091500);
/// assert!(extract_app_id("https://store.steampowered.com/bundle").is_err());
/// ```
pub fn extract_app_id(link: &str) -> Result<i64, LinkIdError> {
    let segments: Vec<&str> = link.split('/').collect();
    if segments.len() < 3 {
        return Err(LinkIdError::NoNumericSegment {
            link: link.to_string(),
        });
    }

    // The first and last pieces are not enclosed by slashes on both sides.
    let inner = &segments[1..segments.len() - 1];
    let segment = inner
        .iter()
        .find(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| LinkIdError::NoNumericSegment {
            link: link.to_string(),
        })?;

    segment.parse::<i64>().map_err(|_| LinkIdError::OutOfRange {
        link: link.to_string(),
        segment: segment.to_string(),
    })
}
