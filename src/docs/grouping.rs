//! Directory grouping and output file naming

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::constants::docs::{INDEX_STEM, OVERVIEW_STEM, ROOT_KEY};
use crate::types::ProcessedFile;

/// Parent directory of a group of files
///
/// Files at the repository root share [`DirectoryKey::Root`], which sorts
/// before every real directory and displays as `root`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DirectoryKey {
    Root,
    Path(String),
}

impl DirectoryKey {
    pub fn of(file: &ProcessedFile) -> Self {
        match file.parent_dir() {
            Some(dir) => Self::Path(dir.to_string()),
            None => Self::Root,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Root => ROOT_KEY,
            Self::Path(path) => path,
        }
    }
}

impl fmt::Display for DirectoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Files grouped by parent directory, iterated in key order.
/// Files keep their input order inside a group.
pub fn group_by_directory(files: Vec<ProcessedFile>) -> BTreeMap<DirectoryKey, Vec<ProcessedFile>> {
    let mut groups: BTreeMap<DirectoryKey, Vec<ProcessedFile>> = BTreeMap::new();
    for file in files {
        groups.entry(DirectoryKey::of(&file)).or_default().push(file);
    }
    groups
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Give every key a distinct file stem.
///
/// Keys are named in order. `index` and `overview` are reserved, and a stem
/// that is already taken gets `_2`, `_3`, ... appended. Comparison ignores
/// case so names stay distinct on case-insensitive file systems.
pub fn assign_file_names<'a, I>(keys: I) -> BTreeMap<DirectoryKey, String>
where
    I: IntoIterator<Item = &'a DirectoryKey>,
{
    let mut taken: HashSet<String> = [INDEX_STEM, OVERVIEW_STEM]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut names = BTreeMap::new();

    for key in keys {
        let base = sanitize(key.as_str());
        let mut stem = base.clone();
        let mut suffix = 2;
        while taken.contains(&stem.to_ascii_lowercase()) {
            stem = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        taken.insert(stem.to_ascii_lowercase());
        names.insert(key.clone(), stem);
    }

    names
}
