//! Absolute API URLs for `meta.links`.

/// Builds absolute URLs under the API root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    root: String,
}

impl LinkBuilder {
    /// `site_url` is the public origin, `api_prefix` the mount point of the
    /// route tables (e.g. `/wp-json`).
    pub fn new(site_url: &str, api_prefix: &str) -> Self {
        let site = site_url.trim_end_matches('/');
        let prefix = api_prefix.trim_matches('/');
        let root = if prefix.is_empty() {
            site.to_string()
        } else {
            format!("{site}/{prefix}")
        };
        Self { root }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Absolute URL of an API path such as `/movies/5`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.root, path.trim_start_matches('/'))
    }
}
