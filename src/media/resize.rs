//! Image-resize query-parameter DSL.

use std::fmt;

/// How the image should be fitted into the requested box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fit {
    /// Scale to cover the box, cropping overflow.
    Crop,
    /// Scale to fit entirely inside the box.
    Contain,
    /// Stretch to the exact box, ignoring aspect ratio.
    Fill,
}

impl Fit {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Crop => "crop",
            Self::Contain => "contain",
            Self::Fill => "fill",
        }
    }
}

/// Output format for a resized image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// JPEG output.
    Jpeg,
    /// PNG output.
    Png,
    /// WebP output.
    Webp,
}

impl Format {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

/// Builder for the provider's image-resize query parameters.
///
/// Photo URLs returned by the API accept resizing instructions as query
/// parameters. `ResizeSpec` assembles them with a deterministic encoding
/// — parameters are emitted in a fixed order (`dpr`, `fit`, `fm`, `h`,
/// `w`) — so equal specs produce byte-equal URLs, which keeps caches warm.
///
/// # Example
///
/// ```rust
/// use lightbox_api::media::{Fit, Format, ResizeSpec};
///
/// let spec = ResizeSpec::new()
///     .width(400)
///     .height(300)
///     .fit(Fit::Crop)
///     .format(Format::Webp)
///     .dpr(2);
///
/// assert_eq!(spec.to_query(), "dpr=2&fit=crop&fm=webp&h=300&w=400");
/// assert_eq!(
///     spec.apply("https://img.lightbox.photos/p/42.jpg"),
///     "https://img.lightbox.photos/p/42.jpg?dpr=2&fit=crop&fm=webp&h=300&w=400",
/// );
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResizeSpec {
    width: Option<u32>,
    height: Option<u32>,
    fit: Option<Fit>,
    format: Option<Format>,
    dpr: Option<u8>,
}

impl ResizeSpec {
    /// Creates an empty spec (no resizing instructions).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            width: None,
            height: None,
            fit: None,
            format: None,
            dpr: None,
        }
    }

    /// Requests a target width in pixels.
    #[must_use]
    pub const fn width(mut self, pixels: u32) -> Self {
        self.width = Some(pixels);
        self
    }

    /// Requests a target height in pixels.
    #[must_use]
    pub const fn height(mut self, pixels: u32) -> Self {
        self.height = Some(pixels);
        self
    }

    /// Requests a fit mode. Only meaningful with a width or height.
    #[must_use]
    pub const fn fit(mut self, fit: Fit) -> Self {
        self.fit = Some(fit);
        self
    }

    /// Requests an output format.
    #[must_use]
    pub const fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Requests a device-pixel-ratio multiplier.
    #[must_use]
    pub const fn dpr(mut self, ratio: u8) -> Self {
        self.dpr = Some(ratio);
        self
    }

    /// Returns `true` if no instructions were set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width.is_none()
            && self.height.is_none()
            && self.fit.is_none()
            && self.format.is_none()
            && self.dpr.is_none()
    }

    /// Renders the query string (without a leading `?`).
    #[must_use]
    pub fn to_query(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(dpr) = self.dpr {
            pairs.push(("dpr", dpr.to_string()));
        }
        if let Some(fit) = self.fit {
            pairs.push(("fit", fit.as_str().to_string()));
        }
        if let Some(format) = self.format {
            pairs.push(("fm", format.as_str().to_string()));
        }
        if let Some(height) = self.height {
            pairs.push(("h", height.to_string()));
        }
        if let Some(width) = self.width {
            pairs.push(("w", width.to_string()));
        }

        pairs
            .iter()
            .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Appends the instructions to an image URL.
    ///
    /// Uses `?` or `&` depending on whether the URL already carries a
    /// query string; an empty spec returns the URL unchanged.
    #[must_use]
    pub fn apply(&self, url: &str) -> String {
        if self.is_empty() {
            return url.to_string();
        }
        let separator = if url.contains('?') { '&' } else { '?' };
        format!("{url}{separator}{}", self.to_query())
    }
}

impl fmt::Display for ResizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_spec_changes_nothing() {
        let spec = ResizeSpec::new();
        assert!(spec.is_empty());
        assert_eq!(spec.to_query(), "");
        assert_eq!(spec.apply("https://img.example/p.jpg"), "https://img.example/p.jpg");
    }

    #[test]
    fn test_parameters_emit_in_fixed_order() {
        // Setter order must not affect the encoding.
        let a = ResizeSpec::new().width(400).dpr(2).height(300);
        let b = ResizeSpec::new().dpr(2).height(300).width(400);
        assert_eq!(a.to_query(), "dpr=2&h=300&w=400");
        assert_eq!(a.to_query(), b.to_query());
    }

    #[test]
    fn test_full_spec_encoding() {
        let spec = ResizeSpec::new()
            .width(1200)
            .height(800)
            .fit(Fit::Contain)
            .format(Format::Jpeg)
            .dpr(3);
        assert_eq!(spec.to_query(), "dpr=3&fit=contain&fm=jpg&h=800&w=1200");
    }

    #[test]
    fn test_apply_respects_existing_query() {
        let spec = ResizeSpec::new().width(64);
        assert_eq!(
            spec.apply("https://img.example/p.jpg?sig=abc"),
            "https://img.example/p.jpg?sig=abc&w=64"
        );
    }

    #[test]
    fn test_fit_and_format_names() {
        assert_eq!(Fit::Crop.as_str(), "crop");
        assert_eq!(Fit::Fill.as_str(), "fill");
        assert_eq!(Format::Webp.as_str(), "webp");
        assert_eq!(Format::Png.as_str(), "png");
    }
}
