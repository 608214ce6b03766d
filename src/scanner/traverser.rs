use crate::config::ScanConfig;
use crate::error::{CrawlerError, Result};
use crate::extractor::{Extractor, ImageRecord};
use crate::scanner::classifier::Classifier;
use crate::scanner::events::{notify, ScanEvent, ScanObserver};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Depth-first, pre-order directory walker.
///
/// Inside each directory the files are visited first, in the order the
/// filesystem lists them, then each subdirectory is walked to completion in
/// listing order before the next one is started.
///
/// The walk methods expect a root that already went through [`resolve_root`].
/// A root that disappears afterwards surfaces as [`CrawlerError::Traversal`].
pub struct Traverser {
    classifier: Classifier,
    follow_links: bool,
    max_depth: Option<usize>,
}

/// Counters gathered while walking.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkStatistics {
    pub directories_visited: usize,
    pub files_visited: usize,
    pub images_found: usize,
    pub loops_skipped: usize,
    pub links_skipped: usize,
}

impl Traverser {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            classifier: Classifier::new(config),
            follow_links: config.follow_links,
            max_depth: config.max_depth,
        }
    }

    /// Walks `root`, measuring every image as soon as it is listed.
    ///
    /// Records come back in traversal order, one per image-classified file.
    pub fn traverse<P: AsRef<Path>>(
        &self,
        root: P,
        extractor: &Extractor,
        observer: ScanObserver<'_>,
    ) -> Result<(Vec<ImageRecord>, WalkStatistics)> {
        let mut records = Vec::new();

        let stats = self.walk(root.as_ref(), observer, &mut |path: PathBuf| {
            let record = extractor.extract(&path);
            Extractor::report(observer, &record);
            records.push(record);
        })?;

        Ok((records, stats))
    }

    /// Walks `root` and returns the image paths in traversal order without
    /// opening any of them.
    pub fn discover<P: AsRef<Path>>(
        &self,
        root: P,
        observer: ScanObserver<'_>,
    ) -> Result<(Vec<PathBuf>, WalkStatistics)> {
        let mut images = Vec::new();
        let stats = self.walk(root.as_ref(), observer, &mut |path: PathBuf| images.push(path))?;
        Ok((images, stats))
    }

    fn walk(
        &self,
        root: &Path,
        observer: ScanObserver<'_>,
        on_image: &mut dyn FnMut(PathBuf),
    ) -> Result<WalkStatistics> {
        let mut stats = WalkStatistics::default();
        let follow_links = self.follow_links;

        // Stable sort: files keep listing order and come before subdirectories.
        // Linked directories sort with directories when they will be entered.
        let mut walker = WalkDir::new(root)
            .follow_links(follow_links)
            .sort_by(move |a, b| {
                is_directory(a, follow_links).cmp(&is_directory(b, follow_links))
            });

        if let Some(max_depth) = self.max_depth {
            walker = walker.max_depth(max_depth);
        }

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err.loop_ancestor().is_some() {
                        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                        notify(observer, ScanEvent::LinkLoopSkipped(path));
                        stats.loops_skipped += 1;
                        continue;
                    }

                    // Following a dangling link fails; it is still a listed file
                    if let Some(path) = err.path().filter(|p| is_dangling_link(p)) {
                        self.visit_file(path.to_path_buf(), &mut stats, observer, on_image);
                        continue;
                    }

                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    return Err(CrawlerError::Traversal { path, source: err });
                }
            };

            if entry.file_type().is_dir() {
                stats.directories_visited += 1;
                notify(observer, ScanEvent::DirectoryEntered(entry.path().to_path_buf()));
                continue;
            }

            // Only reachable with follow_links off
            if entry.path_is_symlink() && entry.path().is_dir() {
                stats.links_skipped += 1;
                notify(observer, ScanEvent::LinkedDirectorySkipped(entry.into_path()));
                continue;
            }

            self.visit_file(entry.into_path(), &mut stats, observer, on_image);
        }

        Ok(stats)
    }

    fn visit_file(
        &self,
        path: PathBuf,
        stats: &mut WalkStatistics,
        observer: ScanObserver<'_>,
        on_image: &mut dyn FnMut(PathBuf),
    ) {
        stats.files_visited += 1;
        notify(observer, ScanEvent::FileVisited(path.clone()));

        if self.classifier.is_image_path(&path) {
            stats.images_found += 1;
            on_image(path);
        }
    }
}

/// Checks the scan root and turns it into an absolute, resolved path.
pub fn resolve_root(root: &Path) -> Result<PathBuf> {
    if !root.exists() {
        return Err(CrawlerError::InvalidPath {
            path: root.display().to_string(),
        });
    }

    if !root.is_dir() {
        return Err(CrawlerError::NotADirectory {
            path: root.display().to_string(),
        });
    }

    root.canonicalize().map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => CrawlerError::Permission {
            path: root.display().to_string(),
        },
        _ => CrawlerError::Io(e),
    })
}

fn is_directory(entry: &DirEntry, follow_links: bool) -> bool {
    entry.file_type().is_dir() || (follow_links && entry.path_is_symlink() && entry.path().is_dir())
}

fn is_dangling_link(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink()) && fs::metadata(path).is_err()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::FAILURE_NOTE;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    fn build_tree(root: &Path) {
        fs::write(root.join("a.png"), b"x").unwrap();
        fs::write(root.join("b.txt"), b"x").unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub").join("c.jpg"), b"x").unwrap();
        fs::create_dir(root.join("sub").join("deeper")).unwrap();
        fs::write(root.join("sub").join("deeper").join("d.tif"), b"x").unwrap();
        fs::create_dir(root.join("other")).unwrap();
        fs::write(root.join("other").join("e.png"), b"x").unwrap();
        fs::write(root.join("z.jpg"), b"x").unwrap();
    }

    #[test]
    fn test_discovers_only_images() {
        let temp_dir = TempDir::new().unwrap();
        build_tree(temp_dir.path());

        let traverser = Traverser::new(&ScanConfig::default());
        let (images, stats) = traverser.discover(temp_dir.path(), None).unwrap();

        let mut found = names(&images);
        found.sort();
        assert_eq!(found, vec!["a.png", "c.jpg", "d.tif", "e.png", "z.jpg"]);
        assert_eq!(stats.files_visited, 6);
        assert_eq!(stats.images_found, 5);
        assert_eq!(stats.directories_visited, 4);
    }

    #[test]
    fn test_files_come_before_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        build_tree(temp_dir.path());

        let traverser = Traverser::new(&ScanConfig::default());
        let (images, _) = traverser.discover(temp_dir.path(), None).unwrap();
        let found = names(&images);

        // Root-level images precede everything below root
        let root_level: Vec<_> = found[..2].iter().cloned().collect();
        assert!(root_level.contains(&"a.png".to_string()));
        assert!(root_level.contains(&"z.jpg".to_string()));

        // sub/c.jpg is immediately followed by its own subtree
        let c = found.iter().position(|n| n == "c.jpg").unwrap();
        let d = found.iter().position(|n| n == "d.tif").unwrap();
        assert_eq!(d, c + 1);
    }

    #[test]
    fn test_observer_sees_directories_before_their_files() {
        let temp_dir = TempDir::new().unwrap();
        build_tree(temp_dir.path());

        let events = RefCell::new(Vec::new());
        let observer = |event: &ScanEvent| events.borrow_mut().push(event.clone());

        let traverser = Traverser::new(&ScanConfig::default());
        traverser.discover(temp_dir.path(), Some(&observer)).unwrap();

        let events = events.into_inner();
        assert!(matches!(events.first(), Some(ScanEvent::DirectoryEntered(_))));

        let mut current_dir: Option<PathBuf> = None;
        for event in &events {
            match event {
                ScanEvent::DirectoryEntered(dir) => current_dir = Some(dir.clone()),
                ScanEvent::FileVisited(file) => {
                    assert_eq!(file.parent(), current_dir.as_deref());
                }
                _ => {}
            }
        }

        let visited = events
            .iter()
            .filter(|e| matches!(e, ScanEvent::FileVisited(_)))
            .count();
        assert_eq!(visited, 6);
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let traverser = Traverser::new(&ScanConfig::default());
        let (images, stats) = traverser.discover(temp_dir.path(), None).unwrap();

        assert!(images.is_empty());
        assert_eq!(stats.directories_visited, 1);
        assert_eq!(stats.files_visited, 0);
    }

    #[test]
    fn test_directory_without_files_is_still_descended() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("one").join("two");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("deep.png"), b"x").unwrap();

        let traverser = Traverser::new(&ScanConfig::default());
        let (images, _) = traverser.discover(temp_dir.path(), None).unwrap();

        assert_eq!(names(&images), vec!["deep.png"]);
    }

    #[test]
    fn test_discovered_paths_are_absolute() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.png"), b"x").unwrap();

        let traverser = Traverser::new(&ScanConfig::default());
        let (images, _) = traverser.discover(temp_dir.path(), None).unwrap();

        assert!(images[0].is_absolute());
    }

    #[test]
    fn test_max_depth_limits_descent() {
        let temp_dir = TempDir::new().unwrap();
        build_tree(temp_dir.path());

        let config = ScanConfig {
            max_depth: Some(1),
            ..ScanConfig::default()
        };
        let traverser = Traverser::new(&config);
        let (images, _) = traverser.discover(temp_dir.path(), None).unwrap();

        let mut found = names(&images);
        found.sort();
        assert_eq!(found, vec!["a.png", "z.jpg"]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let result = resolve_root(&missing);

        assert!(matches!(result, Err(CrawlerError::InvalidPath { .. })));
    }

    #[test]
    fn test_file_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.png");
        fs::write(&file, b"x").unwrap();

        let result = resolve_root(&file);

        assert!(matches!(result, Err(CrawlerError::NotADirectory { .. })));
    }

    #[test]
    fn test_root_is_canonicalized() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();

        let root = resolve_root(&temp_dir.path().join("sub").join("..")).unwrap();

        assert!(root.is_absolute());
        assert!(!root.ends_with(".."));
    }

    #[test]
    fn test_root_removed_after_resolution_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let root = resolve_root(&sub).unwrap();
        fs::remove_dir(&sub).unwrap();

        let traverser = Traverser::new(&ScanConfig::default());
        let result = traverser.discover(&root, None);

        match result {
            Err(CrawlerError::Traversal { path, .. }) => assert_eq!(path, root),
            other => panic!("expected a traversal error, got {:?}", other.map(|(p, _)| p)),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_linked_directory_is_walked_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        let elsewhere = temp_dir.path().join("elsewhere");
        fs::create_dir(&root).unwrap();
        fs::create_dir(&elsewhere).unwrap();
        fs::write(elsewhere.join("inside.png"), b"x").unwrap();
        fs::write(root.join("top.png"), b"x").unwrap();
        std::os::unix::fs::symlink(&elsewhere, root.join("linked")).unwrap();

        let traverser = Traverser::new(&ScanConfig::default());
        let (images, stats) = traverser.discover(&root, None).unwrap();

        assert_eq!(names(&images), vec!["top.png", "inside.png"]);
        assert_eq!(images[1], root.join("linked").join("inside.png"));
        assert_eq!(stats.directories_visited, 2);
        assert_eq!(stats.links_skipped, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_linked_directory_is_reported_when_not_followed() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        let elsewhere = temp_dir.path().join("elsewhere");
        fs::create_dir(&root).unwrap();
        fs::create_dir(&elsewhere).unwrap();
        fs::write(elsewhere.join("inside.png"), b"x").unwrap();
        std::os::unix::fs::symlink(&elsewhere, root.join("linked")).unwrap();

        let config = ScanConfig {
            follow_links: false,
            ..ScanConfig::default()
        };
        let skipped = RefCell::new(Vec::new());
        let observer = |event: &ScanEvent| {
            if let ScanEvent::LinkedDirectorySkipped(path) = event {
                skipped.borrow_mut().push(path.clone());
            }
        };

        let traverser = Traverser::new(&config);
        let (images, stats) = traverser.discover(&root, Some(&observer)).unwrap();

        assert!(images.is_empty());
        assert_eq!(stats.links_skipped, 1);
        assert_eq!(stats.files_visited, 0);
        assert_eq!(skipped.into_inner(), vec![root.join("linked")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_image_link_is_still_visited() {
        for follow_links in [true, false] {
            let temp_dir = TempDir::new().unwrap();
            std::os::unix::fs::symlink(
                temp_dir.path().join("gone.png"),
                temp_dir.path().join("dangling.png"),
            )
            .unwrap();

            let config = ScanConfig {
                follow_links,
                ..ScanConfig::default()
            };
            let traverser = Traverser::new(&config);
            let (images, stats) = traverser.discover(temp_dir.path(), None).unwrap();

            assert_eq!(names(&images), vec!["dangling.png"], "follow_links={}", follow_links);
            assert_eq!(stats.files_visited, 1);

            let (records, _) = traverser
                .traverse(temp_dir.path(), &Extractor::new(), None)
                .unwrap();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].notes, FAILURE_NOTE);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_link_loop_is_reported_and_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("a.png"), b"x").unwrap();
        std::os::unix::fs::symlink(temp_dir.path(), sub.join("back")).unwrap();

        let config = ScanConfig {
            follow_links: true,
            ..ScanConfig::default()
        };
        let loops = RefCell::new(0);
        let observer = |event: &ScanEvent| {
            if matches!(event, ScanEvent::LinkLoopSkipped(_)) {
                *loops.borrow_mut() += 1;
            }
        };

        let traverser = Traverser::new(&config);
        let (images, stats) = traverser.discover(temp_dir.path(), Some(&observer)).unwrap();

        assert_eq!(names(&images), vec!["a.png"]);
        assert_eq!(stats.loops_skipped, 1);
        assert_eq!(*loops.borrow(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_fatal() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let locked = temp_dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("a.png"), b"x").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can read it anyway
        let readable = fs::read_dir(&locked).is_ok();

        let traverser = Traverser::new(&ScanConfig::default());
        let result = traverser.discover(temp_dir.path(), None);

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if !readable {
            assert!(matches!(result, Err(CrawlerError::Traversal { .. })));
        }
    }
}
