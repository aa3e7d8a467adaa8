//! Candidate providers for dynamic completion
//!
//! A provider is an opaque, named source of candidates for a slot (files,
//! directories, anything computed at completion time). The index only records
//! provider ids; this registry maps ids to implementations for the in-process
//! engine. Emitted scripts bind the same ids to shell functions instead.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::trace;

/// Provider id for filesystem paths.
pub const FILE_COMPLETER: &str = "file-completer";

/// Provider id for directories.
pub const DIRECTORY_COMPLETER: &str = "directory-completer";

/// Trait for providing completion candidates
pub trait CandidateProvider: Send + Sync {
    /// Candidates for the word under the cursor.
    ///
    /// Results may be a superset of what matches `word`; the engine filters.
    fn candidates(&self, word: &str) -> io::Result<Vec<String>>;
}

/// Filesystem paths relative to a base directory
#[derive(Debug, Clone)]
pub struct FileProvider {
    base: PathBuf,
    directories_only: bool,
}

impl FileProvider {
    /// Any entry, relative to the working directory
    pub fn files() -> Self {
        Self {
            base: PathBuf::from("."),
            directories_only: false,
        }
    }

    /// Directories only, relative to the working directory
    pub fn directories() -> Self {
        Self {
            base: PathBuf::from("."),
            directories_only: true,
        }
    }

    /// Resolve relative words against `base` instead of the working directory
    pub fn in_dir(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = base.into();
        self
    }
}

impl CandidateProvider for FileProvider {
    fn candidates(&self, word: &str) -> io::Result<Vec<String>> {
        // List the directory part of the word and keep it in the result. The
        // name part only decides whether dotfiles are listed; matching it is
        // left to the engine so the case policy applies.
        let (dir_part, name_part) = match word.rfind('/') {
            Some(i) => word.split_at(i + 1),
            None => ("", word),
        };
        let dir = if dir_part.is_empty() {
            self.base.clone()
        } else if Path::new(dir_part).is_absolute() {
            PathBuf::from(dir_part)
        } else {
            self.base.join(dir_part)
        };

        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir)?.flatten() {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with('.') != name_part.starts_with('.') {
                continue;
            }
            if self.directories_only && !entry.path().is_dir() {
                continue;
            }
            entries.push(format!("{dir_part}{name}"));
        }
        entries.sort();
        Ok(entries)
    }
}

/// A fixed candidate list
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    values: Vec<String>,
}

impl StaticProvider {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl CandidateProvider for StaticProvider {
    fn candidates(&self, _word: &str) -> io::Result<Vec<String>> {
        Ok(self.values.clone())
    }
}

/// Provider id → implementation
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn CandidateProvider>>,
}

impl ProviderRegistry {
    /// A registry with no providers
    pub fn new() -> Self {
        Self::default()
    }

    /// The file and directory providers, rooted at the working directory
    pub fn with_builtins() -> Self {
        Self::with_builtins_in(".")
    }

    /// The file and directory providers, rooted at `base`
    pub fn with_builtins_in(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        let mut registry = Self::new();
        registry.register(FILE_COMPLETER, Arc::new(FileProvider::files().in_dir(base.clone())));
        registry.register(
            DIRECTORY_COMPLETER,
            Arc::new(FileProvider::directories().in_dir(base)),
        );
        registry
    }

    /// Bind `id` to `provider`, replacing any previous binding
    pub fn register(
        &mut self,
        id: impl Into<String>,
        provider: Arc<dyn CandidateProvider>,
    ) -> &mut Self {
        self.providers.insert(id.into(), provider);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn CandidateProvider>> {
        self.providers.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Run provider `id`. Unknown ids and failures yield nothing.
    pub fn invoke(&self, id: &str, word: &str) -> Vec<String> {
        let Some(provider) = self.get(id) else {
            trace!(provider = id, "no provider registered");
            return Vec::new();
        };
        provider.candidates(word).unwrap_or_else(|e| {
            trace!(provider = id, word, error = %e, "provider failed");
            Vec::new()
        })
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("a.txt")).unwrap();
        File::create(dir.path().join("b.txt")).unwrap();
        File::create(dir.path().join(".hidden")).unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        File::create(dir.path().join("src").join("main.rs")).unwrap();
        dir
    }

    #[test]
    fn test_files_sorted_with_directory_part() {
        let dir = fixture();
        let provider = FileProvider::files().in_dir(dir.path());

        assert_eq!(
            provider.candidates("").unwrap(),
            vec!["a.txt", "b.txt", "src"]
        );
        assert_eq!(provider.candidates("src/").unwrap(), vec!["src/main.rs"]);
        assert_eq!(provider.candidates("src/M").unwrap(), vec!["src/main.rs"]);
    }

    #[test]
    fn test_name_part_is_not_matched() {
        let dir = fixture();
        let provider = FileProvider::files().in_dir(dir.path());
        assert_eq!(
            provider.candidates("A").unwrap(),
            vec!["a.txt", "b.txt", "src"]
        );
    }

    #[test]
    fn test_dotfiles_need_a_dot() {
        let dir = fixture();
        let provider = FileProvider::files().in_dir(dir.path());
        assert_eq!(provider.candidates(".").unwrap(), vec![".hidden"]);
        assert_eq!(provider.candidates(".h").unwrap(), vec![".hidden"]);
    }

    #[test]
    fn test_directories_only() {
        let dir = fixture();
        let provider = FileProvider::directories().in_dir(dir.path());
        assert_eq!(provider.candidates("").unwrap(), vec!["src"]);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = fixture();
        let provider = FileProvider::files().in_dir(dir.path());
        assert!(provider.candidates("nope/").is_err());
    }

    #[test]
    fn test_registry_degrades_to_empty() {
        let dir = fixture();
        let mut registry = ProviderRegistry::with_builtins_in(dir.path());
        registry.register("colors", Arc::new(StaticProvider::new(["red", "green"])));

        assert_eq!(registry.invoke("colors", ""), vec!["red", "green"]);
        assert!(registry.invoke("unknown", "").is_empty());
        assert!(registry.invoke(FILE_COMPLETER, "nope/").is_empty());
        assert_eq!(
            registry.ids().collect::<Vec<_>>(),
            vec!["colors", DIRECTORY_COMPLETER, FILE_COMPLETER]
        );
    }
}
