/// Base path of the catalog's image CDN
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";

/// Width buckets the CDN serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    /// Posters (w500)
    Poster,
    /// Backdrops (w780)
    Backdrop,
    /// Cast profile pictures (w185)
    Profile,
    /// Season posters and episode stills (w300)
    Still,
    /// Provider logos, served untouched
    Original,
}

impl ImageSize {
    pub fn bucket(&self) -> &'static str {
        match self {
            ImageSize::Poster => "w500",
            ImageSize::Backdrop => "w780",
            ImageSize::Profile => "w185",
            ImageSize::Still => "w300",
            ImageSize::Original => "original",
        }
    }
}

/// Build a CDN URL from a path fragment returned by the catalog (e.g. "/abc.jpg")
pub fn image_url(size: ImageSize, path: &str) -> String {
    format!("{}{}{}", IMAGE_BASE_URL, size.bucket(), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url_buckets() {
        assert_eq!(image_url(ImageSize::Poster, "/p.jpg"), "https://image.tmdb.org/t/p/w500/p.jpg");
        assert_eq!(image_url(ImageSize::Backdrop, "/b.jpg"), "https://image.tmdb.org/t/p/w780/b.jpg");
        assert_eq!(image_url(ImageSize::Original, "/l.png"), "https://image.tmdb.org/t/p/original/l.png");
    }
}
