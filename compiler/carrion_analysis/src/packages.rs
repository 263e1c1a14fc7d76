//! Package prober: filesystem discovery of installed Carrion packages
//! and on-demand ingestion of their entry sources into the catalog.

use crate::catalog::{CatalogLoader, IngestError};
use crate::symbols::SymbolTable;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Modules provided by the runtime itself; loading them is a no-op.
pub const BUILTIN_MODULES: [&str; 4] = ["file", "os", "time", "http"];

/// The language's canonical source extension.
pub const SOURCE_EXTENSION: &str = "crl";

#[derive(Debug)]
pub enum PackageError {
    NotFound(String),
    NoEntryFile(String),
    Io(PathBuf, std::io::Error),
    Ingest(IngestError),
}

impl fmt::Display for PackageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageError::NotFound(name) => write!(f, "package not found: {name}"),
            PackageError::NoEntryFile(name) => {
                write!(f, "no entry file found for package: {name}")
            }
            PackageError::Io(path, err) => write!(f, "failed to read {}: {err}", path.display()),
            PackageError::Ingest(err) => write!(f, "failed to ingest package source: {err}"),
        }
    }
}

impl std::error::Error for PackageError {}

pub struct PackageProber {
    catalog: Arc<CatalogLoader>,
    search_paths: Vec<PathBuf>,
    loaded: Mutex<FxHashSet<String>>,
}

impl PackageProber {
    /// Prober over the standard search paths: `<cwd>/carrion_modules`,
    /// `<home>/.carrion/packages`, `/usr/local/share/carrion/lib`.
    pub fn new(catalog: Arc<CatalogLoader>) -> Self {
        Self::with_search_paths(catalog, standard_search_paths())
    }

    pub fn with_search_paths(catalog: Arc<CatalogLoader>, search_paths: Vec<PathBuf>) -> Self {
        PackageProber {
            catalog,
            search_paths,
            loaded: Mutex::new(FxHashSet::default()),
        }
    }

    /// Scan the search paths into a name → directory map. The first
    /// occurrence of a name wins; nonexistent paths are skipped.
    pub fn discover(&self) -> FxHashMap<String, PathBuf> {
        let mut packages = FxHashMap::default();
        for search_path in &self.search_paths {
            let Ok(entries) = std::fs::read_dir(search_path) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    if let Some(name) = entry.file_name().to_str() {
                        packages
                            .entry(name.to_string())
                            .or_insert_with(|| path.clone());
                    }
                }
            }
        }
        packages
    }

    /// Load a package by name: locate its directory, probe the entry
    /// file, ingest it. Builtin modules and already-loaded packages are
    /// no-op successes. The loaded set guards the whole check-then-load.
    pub fn load(&self, name: &str) -> Result<(), PackageError> {
        if BUILTIN_MODULES.contains(&name) {
            return Ok(());
        }

        let mut loaded = self.loaded.lock();
        if loaded.contains(name) {
            return Ok(());
        }

        let dir = self
            .find_package(name)
            .ok_or_else(|| PackageError::NotFound(name.to_string()))?;
        let entry = self
            .find_entry_file(&dir, name)
            .ok_or_else(|| PackageError::NoEntryFile(name.to_string()))?;

        let source =
            std::fs::read_to_string(&entry).map_err(|err| PackageError::Io(entry.clone(), err))?;
        self.catalog.ingest(&source).map_err(PackageError::Ingest)?;

        tracing::info!("loaded package {name} from {}", entry.display());
        loaded.insert(name.to_string());
        Ok(())
    }

    /// Resolve an import path. Relative paths (`./`, `../`) resolve
    /// against the working directory: a `.crl` file ingests directly, a
    /// directory ingests its `main.crl`. Anything else takes its first
    /// segment as a package name.
    pub fn load_from_import(&self, import_path: &str) -> Result<(), PackageError> {
        if import_path.starts_with("./") || import_path.starts_with("../") {
            return self.load_relative(import_path);
        }
        let package = import_path.split('/').next().unwrap_or(import_path);
        self.load(package)
    }

    fn load_relative(&self, relative: &str) -> Result<(), PackageError> {
        let cwd = std::env::current_dir()
            .map_err(|err| PackageError::Io(PathBuf::from("."), err))?;
        let absolute = cwd.join(relative);

        if absolute
            .extension()
            .is_some_and(|ext| ext == SOURCE_EXTENSION)
        {
            return self.ingest_file(&absolute);
        }
        if absolute.is_dir() {
            let main = absolute.join(format!("main.{SOURCE_EXTENSION}"));
            if main.is_file() {
                return self.ingest_file(&main);
            }
        }
        Err(PackageError::NotFound(relative.to_string()))
    }

    fn ingest_file(&self, path: &Path) -> Result<(), PackageError> {
        let source = std::fs::read_to_string(path)
            .map_err(|err| PackageError::Io(path.to_path_buf(), err))?;
        self.catalog.ingest(&source).map_err(PackageError::Ingest)
    }

    /// Load every import a document declares. Failures are warnings;
    /// a missing package must never fail document analysis.
    pub fn auto_load_imports(&self, symbols: &SymbolTable) {
        for import in symbols.imports.values() {
            if import.path.is_empty() {
                continue;
            }
            if let Err(err) = self.load_from_import(&import.path) {
                tracing::warn!("failed to load import {}: {err}", import.path);
            }
        }
    }

    fn find_package(&self, name: &str) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .map(|base| base.join(name))
            .find(|candidate| candidate.is_dir())
    }

    /// Entry probe order: `src/main.crl`, `main.crl`, `<name>.crl`.
    fn find_entry_file(&self, dir: &Path, name: &str) -> Option<PathBuf> {
        [
            dir.join("src").join(format!("main.{SOURCE_EXTENSION}")),
            dir.join(format!("main.{SOURCE_EXTENSION}")),
            dir.join(format!("{name}.{SOURCE_EXTENSION}")),
        ]
        .into_iter()
        .find(|candidate| candidate.is_file())
    }
}

fn standard_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("carrion_modules"));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".carrion").join("packages"));
    }
    paths.push(PathBuf::from("/usr/local/share/carrion/lib"));
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn prober_in(dir: &Path) -> PackageProber {
        let catalog = Arc::new(CatalogLoader::new());
        PackageProber::with_search_paths(catalog, vec![dir.to_path_buf()])
    }

    #[test]
    fn discover_finds_package_directories() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("json-utils")).unwrap();
        fs::create_dir(temp.path().join("http-client")).unwrap();
        fs::write(temp.path().join("stray.txt"), "not a package").unwrap();

        let prober = prober_in(temp.path());
        let found = prober.discover();
        assert_eq!(found.len(), 2);
        assert!(found.contains_key("json-utils"));
        assert!(found.contains_key("http-client"));
    }

    #[test]
    fn discover_first_occurrence_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::create_dir(first.path().join("dup")).unwrap();
        fs::create_dir(second.path().join("dup")).unwrap();

        let catalog = Arc::new(CatalogLoader::new());
        let prober = PackageProber::with_search_paths(
            catalog,
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
        );
        let found = prober.discover();
        assert_eq!(found["dup"], first.path().join("dup"));
    }

    #[test]
    fn nonexistent_search_paths_are_skipped() {
        let catalog = Arc::new(CatalogLoader::new());
        let prober = PackageProber::with_search_paths(
            catalog,
            vec![PathBuf::from("/definitely/not/here")],
        );
        assert!(prober.discover().is_empty());
    }

    #[test]
    fn load_probes_entry_files_in_order() {
        let temp = tempfile::tempdir().unwrap();
        let pkg = temp.path().join("greeter");
        fs::create_dir_all(pkg.join("src")).unwrap();
        fs::write(
            pkg.join("src").join("main.crl"),
            "grim Greeter:\n    spell hello():\n        return \"hi\"\n",
        )
        .unwrap();

        let catalog = Arc::new(CatalogLoader::new());
        let prober =
            PackageProber::with_search_paths(catalog.clone(), vec![temp.path().to_path_buf()]);
        prober.load("greeter").expect("load succeeds");
        assert!(catalog.snapshot().classes.contains_key("Greeter"));
    }

    #[test]
    fn load_falls_back_to_package_named_file() {
        let temp = tempfile::tempdir().unwrap();
        let pkg = temp.path().join("tools");
        fs::create_dir(&pkg).unwrap();
        fs::write(
            pkg.join("tools.crl"),
            "spell sharpen(x):\n    return x\n",
        )
        .unwrap();

        let catalog = Arc::new(CatalogLoader::new());
        let prober =
            PackageProber::with_search_paths(catalog.clone(), vec![temp.path().to_path_buf()]);
        prober.load("tools").expect("load succeeds");
        assert!(catalog.snapshot().builtins.contains_key("sharpen"));
    }

    #[test]
    fn builtin_modules_are_noop_successes() {
        let temp = tempfile::tempdir().unwrap();
        let prober = prober_in(temp.path());
        for name in BUILTIN_MODULES {
            prober.load(name).expect("builtin module load is a no-op");
        }
    }

    #[test]
    fn second_load_is_a_noop() {
        let temp = tempfile::tempdir().unwrap();
        let pkg = temp.path().join("once");
        fs::create_dir(&pkg).unwrap();
        fs::write(pkg.join("main.crl"), "x = 1\n").unwrap();

        let prober = prober_in(temp.path());
        prober.load("once").unwrap();
        // Remove the entry file; a reload must still succeed.
        fs::remove_file(pkg.join("main.crl")).unwrap();
        prober.load("once").expect("already-loaded package is a no-op");
    }

    #[test]
    fn missing_package_errors() {
        let temp = tempfile::tempdir().unwrap();
        let prober = prober_in(temp.path());
        assert!(matches!(
            prober.load("ghost"),
            Err(PackageError::NotFound(_))
        ));
    }

    #[test]
    fn package_without_entry_errors() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("hollow")).unwrap();
        let prober = prober_in(temp.path());
        assert!(matches!(
            prober.load("hollow"),
            Err(PackageError::NoEntryFile(_))
        ));
    }

    #[test]
    fn import_path_first_segment_names_the_package() {
        let temp = tempfile::tempdir().unwrap();
        let pkg = temp.path().join("web");
        fs::create_dir(&pkg).unwrap();
        fs::write(pkg.join("main.crl"), "spell get(url):\n    return url\n").unwrap();

        let catalog = Arc::new(CatalogLoader::new());
        let prober =
            PackageProber::with_search_paths(catalog.clone(), vec![temp.path().to_path_buf()]);
        prober.load_from_import("web/request").expect("loads web");
        assert!(catalog.snapshot().builtins.contains_key("get"));
    }
}
