//! Remote URL → local filename mapping produced by a download run.

/// One mapping entry. `local` is `None` when the download failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub url: String,
    pub local: Option<String>,
}

/// Insertion-ordered map keyed by URL text.
///
/// Inserting a URL that is already present keeps its position and replaces
/// its value, so the mapping holds one entry per distinct URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlMapping {
    entries: Vec<MappingEntry>,
}

impl UrlMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: &str, local: Option<String>) {
        match self.entries.iter_mut().find(|e| e.url == url) {
            Some(entry) => entry.local = local,
            None => self.entries.push(MappingEntry {
                url: url.to_string(),
                local,
            }),
        }
    }

    pub fn get(&self, url: &str) -> Option<&MappingEntry> {
        self.entries.iter().find(|e| e.url == url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.iter()
    }

    /// `(url, filename)` pairs of successful downloads, in insertion order.
    pub fn successes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|e| e.local.as_deref().map(|l| (e.url.as_str(), l)))
    }

    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.local.is_none())
            .map(|e| e.url.as_str())
    }
}
