//! Document metadata updates
//!
//! The shell describes the active page with a [`Metadata`] payload and
//! [`update_metadata`] writes it into whatever implements
//! [`MetadataDocument`]: a terminal title, an in-memory record in tests.

use std::collections::BTreeMap;

/// Title, description and optional social preview fields of a page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub url: Option<String>,
}

impl Metadata {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// How a meta entry is keyed in the document head
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetaKey {
    /// `<meta name="...">`
    Name(&'static str),
    /// `<meta property="...">`
    Property(&'static str),
}

/// Sink for document metadata
pub trait MetadataDocument {
    /// Set the document title
    fn set_title(&mut self, title: &str);

    /// Create or overwrite a meta entry
    fn set_meta(&mut self, key: MetaKey, content: &str);
}

/// Write `metadata` into `document`
///
/// Empty title or description and absent optional fields leave the existing
/// entries untouched.
pub fn update_metadata<D>(document: &mut D, metadata: &Metadata)
where
    D: MetadataDocument + ?Sized,
{
    tracing::debug!(title = %metadata.title, "update metadata");

    if !metadata.title.is_empty() {
        document.set_title(&metadata.title);
        document.set_meta(MetaKey::Property("og:title"), &metadata.title);
    }

    if !metadata.description.is_empty() {
        document.set_meta(MetaKey::Name("description"), &metadata.description);
        document.set_meta(MetaKey::Property("og:description"), &metadata.description);
    }

    if let Some(image) = metadata.image.as_deref().filter(|image| !image.is_empty()) {
        document.set_meta(MetaKey::Property("og:image"), image);
    }

    if let Some(url) = metadata.url.as_deref().filter(|url| !url.is_empty()) {
        document.set_meta(MetaKey::Property("og:url"), url);
    }
}

/// A document that only remembers what was written to it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryDocument {
    pub title: String,
    pub meta: BTreeMap<MetaKey, String>,
    /// Number of title writes
    pub title_writes: usize,
}

impl InMemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn meta(&self, key: MetaKey) -> Option<&str> {
        self.meta.get(&key).map(String::as_str)
    }
}

impl MetadataDocument for InMemoryDocument {
    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        self.title_writes += 1;
    }

    fn set_meta(&mut self, key: MetaKey, content: &str) {
        self.meta.insert(key, content.to_string());
    }
}
