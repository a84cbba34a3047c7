use crate::errors::{FragmapError, Result};
use crate::extraction::SourceFile;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Enumerates readable source files under a root, skipping build and VCS directories.
pub struct FileWalker {
    root: PathBuf,
    extensions: Vec<String>,
    exclude_dirs: Vec<String>,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            extensions: vec!["py".to_string()],
            exclude_dirs: Vec::new(),
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_exclude_dirs(mut self, dirs: Vec<String>) -> Self {
        self.exclude_dirs = dirs;
        self
    }

    /// Walk the root and return files sorted by their source identifier.
    ///
    /// A root that is itself a file yields that single file, identified by
    /// its file name.
    pub fn walk(&self) -> Result<Vec<SourceFile>> {
        if !self.root.exists() {
            return Err(FragmapError::PathNotFound(self.root.clone()));
        }

        if self.root.is_file() {
            let source = self
                .root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            return Ok(vec![SourceFile {
                source,
                path: self.root.clone(),
            }]);
        }

        let exclude = self.exclude_dirs.clone();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && exclude.iter().any(|d| entry.file_name() == d.as_str()))
            })
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry under {}: {}", self.root.display(), e);
                    continue;
                }
            };
            let path = entry.path();

            if path.is_file() && self.should_process(path) {
                files.push(SourceFile {
                    source: relative_source(&self.root, path),
                    path: path.to_path_buf(),
                });
            }
        }

        files.sort_by(|a, b| a.source.cmp(&b.source));
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext.as_ref()))
    }
}

/// Forward-slash path of `path` relative to `root`
pub fn relative_source(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
