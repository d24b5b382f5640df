//! Media base URL used to qualify relative image paths.

use core::fmt;

use url::Url;

/// Origin that relative product image paths are resolved against.
///
/// The catalog API returns image paths such as `/media/products/shoe.jpg`;
/// the cart stores absolute URLs so that stored lines render anywhere.
///
/// ## Examples
///
/// ```
/// use khoojlo_core::MediaBase;
///
/// let media = MediaBase::parse("https://cdn.example.com/").unwrap();
/// assert_eq!(media.resolve("/media/a.jpg"), "https://cdn.example.com/media/a.jpg");
/// assert_eq!(media.resolve("media/a.jpg"), "https://cdn.example.com/media/a.jpg");
/// assert_eq!(media.resolve("https://other.example/b.png"), "https://other.example/b.png");
/// assert_eq!(media.resolve(""), "");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBase {
    /// Base URL text without a trailing slash.
    base: String,
}

impl MediaBase {
    /// Parse a media base from an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not an absolute URL.
    pub fn parse(base: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(base.trim())?;
        Ok(Self::from(url))
    }

    /// Returns the base URL text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Resolve an image path into an absolute URL.
    ///
    /// Empty paths stay empty and `http(s)://` URLs are returned unchanged.
    /// Any other path is appended to the base with exactly one `/` between.
    #[must_use]
    pub fn resolve(&self, path: &str) -> String {
        if path.is_empty() {
            return String::new();
        }
        if is_absolute(path) {
            return path.to_owned();
        }
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }
}

fn is_absolute(path: &str) -> bool {
    let lower = path.get(..8).unwrap_or(path).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

impl From<Url> for MediaBase {
    fn from(url: Url) -> Self {
        Self {
            base: url.as_str().trim_end_matches('/').to_owned(),
        }
    }
}

impl fmt::Display for MediaBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)
    }
}
