#![forbid(unsafe_code)]

//! File-backed [`LayoutStore`] over `layout.json`.

use opsgrid_layout::{LayoutSnapshot, LayoutStore, WidgetRecord};

use crate::json::{JsonFileStore, StoreError};

const LAYOUT_FILE: &str = "layout.json";

/// Persists the widget layout as a bare JSON array in `layout.json`.
#[derive(Debug, Clone)]
pub struct FileLayoutStore {
    files: JsonFileStore,
}

impl FileLayoutStore {
    #[must_use]
    pub fn new(files: JsonFileStore) -> Self {
        Self { files }
    }
}

impl LayoutStore for FileLayoutStore {
    type Error = StoreError;

    fn load(&self) -> Result<LayoutSnapshot, StoreError> {
        let records: Vec<WidgetRecord> = self.files.load(LAYOUT_FILE)?;
        Ok(records.into_iter().collect())
    }

    fn save(&mut self, snapshot: &LayoutSnapshot) -> Result<(), StoreError> {
        self.files.save(LAYOUT_FILE, &snapshot.widgets)
    }
}

#[cfg(test)]
mod tests {
    use super::FileLayoutStore;
    use crate::json::JsonFileStore;
    use opsgrid_layout::{GridRect, LayoutSnapshot, LayoutStore, WidgetRecord};

    #[test]
    fn empty_store_loads_empty_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLayoutStore::new(JsonFileStore::new(dir.path()));
        let snapshot = store.load().unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn snapshot_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileLayoutStore::new(JsonFileStore::new(dir.path()));

        let snapshot: LayoutSnapshot = [
            WidgetRecord::new("tasks", GridRect::new(1, 1, 8, 6)),
            WidgetRecord::new("links", GridRect::new(9, 1, 4, 4)),
        ]
        .into_iter()
        .collect();

        store.save(&snapshot).unwrap();
        let back = store.load().unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn layout_file_is_a_bare_array() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileLayoutStore::new(JsonFileStore::new(dir.path()));
        let snapshot: LayoutSnapshot =
            [WidgetRecord::new("tasks", GridRect::new(1, 1, 8, 6))]
                .into_iter()
                .collect();
        store.save(&snapshot).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("layout.json")).unwrap();
        assert!(raw.trim_start().starts_with('['));
    }
}
