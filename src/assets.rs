use rust_embed::RustEmbed;

/// Embedded static web assets
#[derive(RustEmbed)]
#[folder = "static/"]
#[prefix = "static/"]
pub struct StaticAssets;

impl StaticAssets {
    /// Get a static asset by its name relative to the static folder
    pub fn get_asset(name: &str) -> Option<rust_embed::EmbeddedFile> {
        Self::get(&format!("static/{}", name.trim_start_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_page_is_embedded() {
        let index = StaticAssets::get_asset("index.html").expect("index.html embedded");
        let html = String::from_utf8_lossy(&index.data);
        assert!(html.contains("/profile/"));
        assert!(html.contains("/proxy-image/"));
    }

    #[test]
    fn test_leading_slash_is_ignored() {
        assert!(StaticAssets::get_asset("/index.html").is_some());
        assert!(StaticAssets::get_asset("missing.html").is_none());
    }
}
