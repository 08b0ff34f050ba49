use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CatalogError;
use crate::loader::DecodedImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Alphabetical,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
    First,
    Last,
}

// ---------------------------------------------------------------------------
// Catalog entry
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct CatalogEntry {
    filename: String,
    full_path: PathBuf,
    pub load_error: Option<String>,
    /// Decoded pixels. Only the current entry keeps one resident.
    pub image: Option<DecodedImage>,
}

impl CatalogEntry {
    pub fn new(full_path: PathBuf) -> Self {
        let filename = full_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| full_path.display().to_string());
        Self {
            filename,
            full_path,
            load_error: None,
            image: None,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn full_path(&self) -> &Path {
        &self.full_path
    }
}

// ---------------------------------------------------------------------------
// File catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct FileCatalog {
    entries: Vec<CatalogEntry>,
    current_index: Option<usize>,
    /// Entry whose image should be freed once the new current one is shown.
    pending_release: Option<usize>,
}

impl FileCatalog {
    /// Scan `dir` (non-recursive) and order the result.
    ///
    /// Never fails outright: an unreadable directory gives an empty catalog,
    /// and an `explicit_file` missing from the listing falls back to the
    /// first entry. Both conditions are handed back for the caller to report.
    pub fn build(
        dir: &Path,
        explicit_file: Option<&Path>,
        sort_order: SortOrder,
    ) -> (Self, Vec<CatalogError>) {
        let mut issues = Vec::new();

        let paths = match scan_dir(dir) {
            Ok(paths) => paths,
            Err(source) => {
                issues.push(CatalogError::ReadDir {
                    path: dir.to_path_buf(),
                    source,
                });
                Vec::new()
            }
        };

        let (catalog, more) = Self::from_paths(paths, explicit_file, sort_order);
        issues.extend(more);

        log::info!(
            "Catalog of {:?}: {} entries, {:?} order, current {:?}",
            dir,
            catalog.len(),
            sort_order,
            catalog.current_index
        );
        (catalog, issues)
    }

    /// Build from an already collected listing.
    pub fn from_paths(
        paths: Vec<PathBuf>,
        explicit_file: Option<&Path>,
        sort_order: SortOrder,
    ) -> (Self, Vec<CatalogError>) {
        let mut issues = Vec::new();

        let mut seen = HashSet::new();
        let mut entries: Vec<CatalogEntry> = paths
            .into_iter()
            .filter(|p| seen.insert(p.clone()))
            .map(CatalogEntry::new)
            .collect();

        match sort_order {
            SortOrder::Alphabetical => entries.sort_by(|a, b| a.filename.cmp(&b.filename)),
            SortOrder::Random => entries.shuffle(&mut rand::thread_rng()),
        }

        let mut current_index = None;
        if let Some(wanted) = explicit_file {
            current_index = entries
                .iter()
                .position(|e| same_path_ignore_case(&e.full_path, wanted));
            if current_index.is_none() {
                issues.push(CatalogError::FileNotListed {
                    path: wanted.to_path_buf(),
                });
            }
        }
        if current_index.is_none() && !entries.is_empty() {
            current_index = Some(0);
        }

        let catalog = Self {
            entries,
            current_index,
            pending_release: None,
        };
        (catalog, issues)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current(&self) -> Option<&CatalogEntry> {
        self.current_index.and_then(|i| self.entries.get(i))
    }

    pub fn current_mut(&mut self) -> Option<&mut CatalogEntry> {
        self.current_index.and_then(|i| self.entries.get_mut(i))
    }

    /// Move the cursor. Next/Previous wrap around; an empty catalog is left
    /// untouched and yields `None`.
    pub fn advance(&mut self, direction: Direction) -> Option<usize> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }
        let current = self.current_index.unwrap_or(0);
        let next = match direction {
            Direction::Next => (current + 1) % len,
            Direction::Previous => (current + len - 1) % len,
            Direction::First => 0,
            Direction::Last => len - 1,
        };

        log::debug!("[nav] {:?}: {} -> {}", direction, current, next);
        self.pending_release = self.current_index;
        self.current_index = Some(next);
        Some(next)
    }

    /// The previously current entry, unless navigation landed back on it.
    pub fn take_pending_release(&mut self) -> Option<usize> {
        self.pending_release
            .take()
            .filter(|&i| Some(i) != self.current_index)
    }

    /// Drop the decoded image held by `index`. The current entry is kept.
    pub fn release(&mut self, index: usize) -> Option<DecodedImage> {
        if Some(index) == self.current_index {
            return None;
        }
        let released = self.entries.get_mut(index)?.image.take();
        if released.is_some() {
            log::debug!("Released image of entry {}", index);
        }
        released
    }

    pub fn resident_count(&self) -> usize {
        self.entries.iter().filter(|e| e.image.is_some()).count()
    }
}

fn scan_dir(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)?.filter_map(|e| e.ok()) {
        let p = entry.path();
        if p.is_file() {
            files.push(p);
        }
    }
    Ok(files)
}

fn same_path_ignore_case(a: &Path, b: &Path) -> bool {
    a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| Path::new("/pics").join(n)).collect()
    }

    fn names(catalog: &FileCatalog) -> Vec<&str> {
        catalog.entries().iter().map(|e| e.filename()).collect()
    }

    fn fake_image() -> DecodedImage {
        DecodedImage {
            rgba_bytes: vec![0; 4],
            width: 1,
            height: 1,
            file_size: 4,
            format_name: "PNG".to_string(),
            backdrop: [0, 0, 0],
        }
    }

    #[test]
    fn alphabetical_is_ordinal() {
        let (catalog, issues) = FileCatalog::from_paths(
            paths(&["b.png", "B.png", "a.png", "_x.jpg"]),
            None,
            SortOrder::Alphabetical,
        );
        assert!(issues.is_empty());
        assert_eq!(names(&catalog), ["B.png", "_x.jpg", "a.png", "b.png"]);
        assert_eq!(catalog.current_index(), Some(0));
    }

    #[test]
    fn alphabetical_is_stable_for_equal_names() {
        let listing = vec![
            PathBuf::from("/one/same.png"),
            PathBuf::from("/two/same.png"),
            PathBuf::from("/one/a.png"),
        ];
        let (catalog, _) = FileCatalog::from_paths(listing, None, SortOrder::Alphabetical);
        let full: Vec<_> = catalog.entries().iter().map(|e| e.full_path()).collect();
        assert_eq!(
            full,
            [
                Path::new("/one/a.png"),
                Path::new("/one/same.png"),
                Path::new("/two/same.png")
            ]
        );
    }

    #[test]
    fn random_order_is_a_permutation() {
        let listing: Vec<PathBuf> = (0..50)
            .map(|i| PathBuf::from(format!("/pics/{:02}.png", i)))
            .collect();
        let (catalog, _) = FileCatalog::from_paths(listing.clone(), None, SortOrder::Random);

        let got: HashSet<_> = catalog.entries().iter().map(|e| e.full_path().to_path_buf()).collect();
        let want: HashSet<_> = listing.into_iter().collect();
        assert_eq!(catalog.len(), 50);
        assert_eq!(got, want);
    }

    #[test]
    fn duplicate_paths_collapse() {
        let (catalog, _) = FileCatalog::from_paths(
            paths(&["a.png", "a.png", "b.png"]),
            None,
            SortOrder::Alphabetical,
        );
        assert_eq!(names(&catalog), ["a.png", "b.png"]);
    }

    #[test]
    fn explicit_file_matches_case_insensitively() {
        let (catalog, issues) = FileCatalog::from_paths(
            paths(&["a.png", "b.png", "c.png"]),
            Some(Path::new("/PICS/B.PNG")),
            SortOrder::Alphabetical,
        );
        assert!(issues.is_empty());
        assert_eq!(catalog.current_index(), Some(1));
        assert_eq!(catalog.current().unwrap().filename(), "b.png");
    }

    #[test]
    fn unlisted_explicit_file_falls_back_to_first() {
        let (catalog, issues) = FileCatalog::from_paths(
            paths(&["a.png", "b.png"]),
            Some(Path::new("/pics/zzz.png")),
            SortOrder::Alphabetical,
        );
        assert_eq!(catalog.current_index(), Some(0));
        assert_eq!(issues.len(), 1);
        assert!(matches!(&issues[0], CatalogError::FileNotListed { path } if path == Path::new("/pics/zzz.png")));
    }

    #[test]
    fn empty_listing_has_no_current() {
        let (catalog, issues) = FileCatalog::from_paths(Vec::new(), None, SortOrder::Alphabetical);
        assert!(issues.is_empty());
        assert_eq!(catalog.current_index(), None);

        let (catalog, issues) =
            FileCatalog::from_paths(Vec::new(), Some(Path::new("/pics/a.png")), SortOrder::Random);
        assert_eq!(issues.len(), 1);
        assert_eq!(catalog.current_index(), None);
    }

    #[test]
    fn next_wraps_back_to_start() {
        let (mut catalog, _) =
            FileCatalog::from_paths(paths(&["a", "b", "c", "d"]), None, SortOrder::Alphabetical);
        catalog.advance(Direction::Next);
        let start = catalog.current_index();
        for _ in 0..catalog.len() {
            catalog.advance(Direction::Next);
        }
        assert_eq!(catalog.current_index(), start);
    }

    #[test]
    fn previous_from_first_goes_to_last() {
        let (mut catalog, _) =
            FileCatalog::from_paths(paths(&["a", "b", "c"]), None, SortOrder::Alphabetical);
        assert_eq!(catalog.advance(Direction::Previous), Some(2));
        assert_eq!(catalog.advance(Direction::Previous), Some(1));
    }

    #[test]
    fn first_and_last() {
        let (mut catalog, _) =
            FileCatalog::from_paths(paths(&["a", "b", "c"]), None, SortOrder::Alphabetical);
        assert_eq!(catalog.advance(Direction::Last), Some(2));
        assert_eq!(catalog.advance(Direction::First), Some(0));
    }

    #[test]
    fn empty_catalog_ignores_navigation() {
        let mut catalog = FileCatalog::default();
        for dir in [Direction::Next, Direction::Previous, Direction::First, Direction::Last] {
            assert_eq!(catalog.advance(dir), None);
        }
        assert_eq!(catalog.current_index(), None);
        assert_eq!(catalog.take_pending_release(), None);
    }

    #[test]
    fn advance_marks_previous_for_release() {
        let (mut catalog, _) =
            FileCatalog::from_paths(paths(&["a", "b", "c"]), None, SortOrder::Alphabetical);
        catalog.current_mut().unwrap().image = Some(fake_image());

        catalog.advance(Direction::Next);
        catalog.current_mut().unwrap().image = Some(fake_image());
        assert_eq!(catalog.resident_count(), 2);

        let stale = catalog.take_pending_release().unwrap();
        assert_eq!(stale, 0);
        assert!(catalog.release(stale).is_some());
        assert_eq!(catalog.resident_count(), 1);
        assert!(catalog.current().unwrap().image.is_some());
        assert_eq!(catalog.take_pending_release(), None);
    }

    #[test]
    fn single_entry_wrap_keeps_its_image() {
        let (mut catalog, _) = FileCatalog::from_paths(paths(&["only.png"]), None, SortOrder::Alphabetical);
        catalog.current_mut().unwrap().image = Some(fake_image());

        assert_eq!(catalog.advance(Direction::Next), Some(0));
        assert_eq!(catalog.take_pending_release(), None);
        assert!(catalog.release(0).is_none());
        assert_eq!(catalog.resident_count(), 1);
    }

    #[test]
    fn build_scans_top_level_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.jpg"), b"x").unwrap();
        fs::write(dir.path().join("a.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.png"), b"x").unwrap();

        let (catalog, issues) = FileCatalog::build(dir.path(), None, SortOrder::Alphabetical);
        assert!(issues.is_empty());
        assert_eq!(names(&catalog), ["a.txt", "b.jpg"]);
        assert_eq!(catalog.entries()[1].full_path(), dir.path().join("b.jpg"));
    }

    #[test]
    fn build_selects_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["1.png", "2.png", "3.png"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let wanted = dir.path().join("3.png");
        let (catalog, issues) = FileCatalog::build(dir.path(), Some(&wanted), SortOrder::Random);
        assert!(issues.is_empty());
        assert_eq!(catalog.current().unwrap().full_path(), wanted);
    }

    #[test]
    fn unreadable_directory_gives_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let (catalog, issues) = FileCatalog::build(&missing, None, SortOrder::Alphabetical);
        assert!(catalog.is_empty());
        assert_eq!(catalog.current_index(), None);
        assert!(matches!(issues.as_slice(), [CatalogError::ReadDir { .. }]));
    }
}
