#![forbid(unsafe_code)]

//! Quick-launch links.
//!
//! A link is a labelled path the dashboard can open: a URL, a folder, a
//! file, or an application. Links carry a free-form group name used to
//! cluster them in the widget.

use serde::{Deserialize, Serialize};

use crate::json::{JsonFileStore, StoreError};

const LINKS_FILE: &str = "links.json";

/// What a link's path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    #[default]
    Url,
    Folder,
    File,
    App,
}

/// One quick-launch entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub label: String,
    pub path: String,
    #[serde(rename = "type", default)]
    pub kind: LinkKind,
    /// Grouping label for the widget. Ungrouped links fall in a default
    /// bucket at render time.
    #[serde(default)]
    pub group: Option<String>,
}

impl Link {
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            path: path.into(),
            kind: LinkKind::default(),
            group: None,
        }
    }
}

/// Group links by their group name, preserving first-seen group order and
/// insertion order within each group.
#[must_use]
pub fn grouped(links: &[Link]) -> Vec<(Option<&str>, Vec<&Link>)> {
    let mut groups: Vec<(Option<&str>, Vec<&Link>)> = Vec::new();
    for link in links {
        let name = link.group.as_deref();
        match groups.iter_mut().find(|(g, _)| *g == name) {
            Some((_, members)) => members.push(link),
            None => groups.push((name, vec![link])),
        }
    }
    groups
}

/// CRUD over `links.json`.
#[derive(Debug, Clone)]
pub struct LinkStore {
    files: JsonFileStore,
}

impl LinkStore {
    #[must_use]
    pub fn new(files: JsonFileStore) -> Self {
        Self { files }
    }

    pub fn load(&self) -> Result<Vec<Link>, StoreError> {
        self.files.load(LINKS_FILE)
    }

    pub fn save(&self, links: &[Link]) -> Result<(), StoreError> {
        self.files.save(LINKS_FILE, links)
    }

    /// Insert or replace a link by id, then persist.
    pub fn upsert(&self, link: Link) -> Result<Vec<Link>, StoreError> {
        let mut links = self.load()?;
        match links.iter_mut().find(|l| l.id == link.id) {
            Some(existing) => *existing = link,
            None => links.push(link),
        }
        self.save(&links)?;
        Ok(links)
    }

    /// Remove a link by id and persist.
    pub fn remove(&self, id: &str) -> Result<Vec<Link>, StoreError> {
        let mut links = self.load()?;
        links.retain(|l| l.id != id);
        self.save(&links)?;
        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::{Link, LinkKind, LinkStore, grouped};
    use crate::json::JsonFileStore;

    #[test]
    fn kind_serializes_under_type_key() {
        let mut link = Link::new("link-1", "Repo", "https://example.com/repo");
        link.kind = LinkKind::Folder;
        link.group = Some("Work".into());

        let json = serde_json::to_string(&link).unwrap();
        assert!(json.contains(r#""type":"folder""#));

        let back: Link = serde_json::from_str(&json).unwrap();
        assert_eq!(back, link);
    }

    #[test]
    fn missing_kind_defaults_to_url() {
        let json = r#"{"id":"l","label":"x","path":"https://x"}"#;
        let link: Link = serde_json::from_str(json).unwrap();
        assert_eq!(link.kind, LinkKind::Url);
        assert_eq!(link.group, None);
    }

    #[test]
    fn grouping_preserves_order() {
        let mut a = Link::new("a", "a", "p");
        a.group = Some("Work".into());
        let b = Link::new("b", "b", "p");
        let mut c = Link::new("c", "c", "p");
        c.group = Some("Work".into());

        let links = [a, b, c];
        let groups = grouped(&links);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Some("Work"));
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, None);
    }

    #[test]
    fn store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LinkStore::new(JsonFileStore::new(dir.path()));

        store.upsert(Link::new("a", "Docs", "https://docs")).unwrap();
        let links = store
            .upsert(Link::new("a", "Docs v2", "https://docs"))
            .unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].label, "Docs v2");

        let links = store.remove("a").unwrap();
        assert!(links.is_empty());
    }
}
