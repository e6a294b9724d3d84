//! Resolution of the proto files compiled for each language.
//!
//! Explicit file lists win. An empty list is never final on its own: it
//! falls back to discovering every `.proto` file under the configured source
//! directories, or under the project root when none are configured.

use protoplan_plugin_interface::{ConfigTree, EffectiveConfig};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::PlanError;

/// Suffix of files picked up by discovery.
pub const PROTO_SUFFIX: &str = ".proto";

/// Directories never descended into, besides hidden ones.
const SKIPPED_DIRS: &[&str] = &["node_modules", "target"];

/// Source of proto files for the discovery fallback.
pub trait ProtoDiscovery {
    /// Recursively list proto files under `dir` in a stable order.
    fn discover(&self, dir: &Path) -> io::Result<Vec<String>>;
}

/// Discovery over the real filesystem.
///
/// Entries are visited in name order. Symlinked directories are not
/// followed, and hidden, `node_modules` and `target` directories are
/// skipped. Only failing to list `dir` itself is an error; unreadable
/// nested entries are skipped with a warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsDiscovery;

impl ProtoDiscovery for FsDiscovery {
    fn discover(&self, dir: &Path) -> io::Result<Vec<String>> {
        walk(dir, &list_dir)
    }
}

/// A directory entry as seen by the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    path: PathBuf,
    is_dir: bool,
}

fn list_dir(dir: &Path) -> io::Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Failed to read directory entry in {:?}: {}", dir, e);
                continue;
            }
        };
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("Failed to read file type of {:?}: {}", entry.path(), e);
                continue;
            }
        };
        entries.push(Entry {
            path: entry.path(),
            is_dir: file_type.is_dir(),
        });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

fn walk(dir: &Path, list: &dyn Fn(&Path) -> io::Result<Vec<Entry>>) -> io::Result<Vec<String>> {
    let mut found = Vec::new();
    visit(list(dir)?, list, &mut found);
    Ok(found)
}

fn visit(entries: Vec<Entry>, list: &dyn Fn(&Path) -> io::Result<Vec<Entry>>, found: &mut Vec<String>) {
    for entry in entries {
        let name = entry
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if !entry.is_dir {
            if name.ends_with(PROTO_SUFFIX) {
                found.push(entry.path.to_string_lossy().into_owned());
            }
            continue;
        }

        if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_str()) {
            tracing::debug!("Not searching {:?} for protos", entry.path);
            continue;
        }
        match list(&entry.path) {
            Ok(children) => visit(children, list, found),
            Err(e) => tracing::warn!("Skipping unreadable directory {:?}: {}", entry.path, e),
        }
    }
}

/// Whether `file` lies under `dir`, ignoring `.` components.
fn is_within(file: &str, dir: &str) -> bool {
    let strip = |p: &str| {
        Path::new(p)
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect::<PathBuf>()
    };
    let dir = strip(dir);
    !dir.as_os_str().is_empty() && strip(file).starts_with(&dir)
}

/// Files to compile for `language`.
///
/// 1. `local.files` when set, otherwise `protoc.files`.
/// 2. A non-empty list is used as is, followed by `additionalFiles`.
/// 3. An empty list falls back to discovery under `protoc.sourceDirectories`
///    (in declaration order), or under `root`, followed by `additionalFiles`.
///    Discovered files inside the language's own `outputPath` are dropped.
///
/// Duplicates are kept. A result with no files is returned as is and
/// reported with a warning.
pub fn files_for(
    language: &str,
    local: &ConfigTree,
    effective: &EffectiveConfig,
    discovery: &dyn ProtoDiscovery,
) -> Result<Vec<String>, PlanError> {
    let protoc = effective.protoc();
    let base = local
        .get_opt_str_list("files")
        .unwrap_or_else(|| protoc.get_str_list("files"));
    let additional = local.get_str_list("additionalFiles");

    if !base.is_empty() {
        let mut files = base;
        files.extend(additional);
        return Ok(files);
    }

    let source_dirs = protoc.get_str_list("sourceDirectories");
    let search_dirs = if source_dirs.is_empty() {
        vec![effective.root().to_string()]
    } else {
        source_dirs
    };

    // earlier output from this language is never an input
    let output_path = local.get_str("outputPath").unwrap_or_default();
    let mut files = Vec::new();
    for dir in &search_dirs {
        let discovered = discover_in(discovery, Path::new(dir))?;
        files.extend(discovered.into_iter().filter(|f| !is_within(f, output_path)));
    }
    tracing::debug!(
        language,
        dirs = ?search_dirs,
        discovered = files.len(),
        "Discovered proto files"
    );
    files.extend(additional);

    if files.is_empty() {
        tracing::warn!(language, "No proto files found after discovery");
    }

    Ok(files)
}

fn discover_in(discovery: &dyn ProtoDiscovery, dir: &Path) -> Result<Vec<String>, PlanError> {
    match discovery.discover(dir) {
        Ok(files) => Ok(files),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!("Source directory does not exist: {:?}", dir);
            Ok(Vec::new())
        }
        Err(source) => Err(PlanError::Discovery {
            dir: dir.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protoplan_plugin_interface::ConfigValue;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Discovery backed by a fixed map, so policy tests need no filesystem.
    #[derive(Default)]
    struct FakeDiscovery(HashMap<String, Vec<String>>);

    impl FakeDiscovery {
        fn with(mut self, dir: &str, files: &[&str]) -> Self {
            self.0
                .insert(dir.to_string(), files.iter().map(|f| f.to_string()).collect());
            self
        }
    }

    impl ProtoDiscovery for FakeDiscovery {
        fn discover(&self, dir: &Path) -> io::Result<Vec<String>> {
            self.0
                .get(dir.to_string_lossy().as_ref())
                .cloned()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }
    }

    struct BrokenDiscovery;

    impl ProtoDiscovery for BrokenDiscovery {
        fn discover(&self, _dir: &Path) -> io::Result<Vec<String>> {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        }
    }

    fn effective(protoc: ConfigTree) -> EffectiveConfig {
        EffectiveConfig::new(ConfigTree::new().with("root", "repo").with("protoc", protoc))
    }

    fn protoc(files: &[&str], source_dirs: &[&str]) -> ConfigTree {
        ConfigTree::new()
            .with("files", ConfigValue::strings(files.iter().copied()))
            .with("sourceDirectories", ConfigValue::strings(source_dirs.iter().copied()))
    }

    fn local(files: Option<&[&str]>, additional: &[&str]) -> ConfigTree {
        let files = files.map_or(ConfigValue::Null, |f| ConfigValue::strings(f.iter().copied()));
        ConfigTree::new()
            .with("files", files)
            .with("additionalFiles", ConfigValue::strings(additional.iter().copied()))
    }

    #[test]
    fn test_language_files_take_precedence() {
        let files = files_for(
            "go",
            &local(Some(&["a.proto", "b.proto"]), &["extra.proto"]),
            &effective(protoc(&["global.proto"], &[])),
            &FakeDiscovery::default(),
        )
        .unwrap();
        assert_eq!(files, vec!["a.proto", "b.proto", "extra.proto"]);
    }

    #[test]
    fn test_null_language_files_use_protoc_files() {
        let files = files_for(
            "go",
            &local(None, &["extra.proto"]),
            &effective(protoc(&["global.proto"], &["proto"])),
            &FakeDiscovery::default(),
        )
        .unwrap();
        assert_eq!(files, vec!["global.proto", "extra.proto"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let files = files_for(
            "go",
            &local(Some(&["a.proto"]), &["a.proto"]),
            &effective(protoc(&[], &[])),
            &FakeDiscovery::default(),
        )
        .unwrap();
        assert_eq!(files, vec!["a.proto", "a.proto"]);
    }

    #[test]
    fn test_empty_files_fall_back_to_source_directories() {
        let discovery = FakeDiscovery::default()
            .with("./proto", &["./proto/a.proto", "./proto/sub/b.proto"])
            .with("vendor", &["vendor/c.proto"]);
        let files = files_for(
            "python",
            &local(None, &["extra.proto"]),
            &effective(protoc(&[], &["./proto", "vendor"])),
            &discovery,
        )
        .unwrap();
        assert_eq!(
            files,
            vec!["./proto/a.proto", "./proto/sub/b.proto", "vendor/c.proto", "extra.proto"]
        );
    }

    #[test]
    fn test_explicit_empty_language_files_still_discover() {
        let discovery = FakeDiscovery::default().with("repo", &["repo/x.proto"]);
        let files = files_for(
            "go",
            &local(Some(&[]), &[]),
            &effective(protoc(&["ignored.proto"], &[])),
            &discovery,
        )
        .unwrap();
        assert_eq!(files, vec!["repo/x.proto"]);
    }

    #[test]
    fn test_falls_back_to_root_without_source_directories() {
        let discovery = FakeDiscovery::default().with("repo", &["repo/x.proto"]);
        let files = files_for("go", &local(None, &[]), &effective(protoc(&[], &[])), &discovery)
            .unwrap();
        assert_eq!(files, vec!["repo/x.proto"]);
    }

    #[test]
    fn test_zero_discovered_files_is_not_an_error() {
        let files = files_for(
            "go",
            &local(None, &[]),
            &effective(protoc(&[], &["missing"])),
            &FakeDiscovery::default(),
        )
        .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_discovery_failure_is_reported() {
        let err = files_for(
            "go",
            &local(None, &[]),
            &effective(protoc(&[], &["proto"])),
            &BrokenDiscovery,
        )
        .unwrap_err();
        assert!(matches!(err, PlanError::Discovery { .. }));
    }

    #[test]
    fn test_fs_discovery_is_recursive_and_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("b/nested")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("z.proto"), "").unwrap();
        fs::write(root.join("b/nested/y.proto"), "").unwrap();
        fs::write(root.join("a/x.proto"), "").unwrap();
        fs::write(root.join("a/readme.md"), "").unwrap();

        let found = FsDiscovery.discover(root).unwrap();
        let relative: Vec<String> = found
            .iter()
            .map(|f| {
                Path::new(f)
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(relative, vec!["a/x.proto", "b/nested/y.proto", "z.proto"]);
    }

    #[test]
    fn test_fs_discovery_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let err = FsDiscovery.discover(&temp_dir.path().join("nope")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_fs_discovery_skips_hidden_and_build_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for dir in [".git", "node_modules/dep", "target/debug", "proto"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        fs::write(root.join(".git/x.proto"), "").unwrap();
        fs::write(root.join("node_modules/dep/y.proto"), "").unwrap();
        fs::write(root.join("target/debug/z.proto"), "").unwrap();
        fs::write(root.join("proto/a.proto"), "").unwrap();

        let found = FsDiscovery.discover(root).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("a.proto"));
    }

    #[test]
    fn test_unreadable_nested_directory_is_skipped() {
        let list = |dir: &Path| -> io::Result<Vec<Entry>> {
            let entry = |path: &str, is_dir: bool| Entry {
                path: PathBuf::from(path),
                is_dir,
            };
            match dir.to_str() {
                Some("root") => Ok(vec![
                    entry("root/a.proto", false),
                    entry("root/locked", true),
                    entry("root/z", true),
                ]),
                Some("root/z") => Ok(vec![entry("root/z/b.proto", false)]),
                _ => Err(io::Error::from(io::ErrorKind::PermissionDenied)),
            }
        };

        let found = walk(Path::new("root"), &list).unwrap();
        assert_eq!(found, vec!["root/a.proto", "root/z/b.proto"]);
    }

    #[test]
    fn test_unreadable_top_level_directory_is_an_error() {
        let list = |_: &Path| -> io::Result<Vec<Entry>> {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        };
        let err = walk(Path::new("root"), &list).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_discovery_ignores_language_output_path() {
        let discovery = FakeDiscovery::default().with(
            "repo",
            &["repo/api/a.proto", "./gen/go/stale.proto", "gen/gopher/b.proto"],
        );
        let local = local(None, &[]).with("outputPath", "gen/go");
        let files = files_for("go", &local, &effective(protoc(&[], &[])), &discovery).unwrap();
        assert_eq!(files, vec!["repo/api/a.proto", "gen/gopher/b.proto"]);
    }

    #[test]
    fn test_is_within() {
        assert!(is_within("gen/go/x.proto", "./gen/go"));
        assert!(is_within("./gen/go/x.proto", "gen/go/"));
        assert!(!is_within("gen/gopher/x.proto", "gen/go"));
        assert!(!is_within("x.proto", "."));
    }
}
