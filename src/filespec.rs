//! File specifications and ordered lists of them
//!
//! Used to hold search paths such as the local mirror roots. Every list
//! operation is a linear scan; lists are expected to stay small.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A path split into directory and filename, with its case sensitivity
#[derive(Debug, Clone)]
pub struct FileSpec {
    directory: Option<PathBuf>,
    filename: String,
    case_sensitive: bool,
}

impl FileSpec {
    /// Split `path` into directory and filename.
    ///
    /// Case sensitivity defaults to that of the host filesystem convention.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let (directory, filename) = match path.file_name() {
            Some(name) => (
                path.parent()
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .map(Path::to_path_buf),
                name.to_string_lossy().into_owned(),
            ),
            None if path.as_os_str().is_empty() => (None, String::new()),
            None => (Some(path.to_path_buf()), String::new()),
        };
        Self {
            directory,
            filename,
            case_sensitive: !cfg!(windows),
        }
    }

    /// Override case sensitivity
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Full path (directory joined with filename)
    pub fn path(&self) -> PathBuf {
        match &self.directory {
            Some(dir) if self.filename.is_empty() => dir.clone(),
            Some(dir) => dir.join(&self.filename),
            None => PathBuf::from(&self.filename),
        }
    }

    /// Compare two specs.
    ///
    /// With `full == false`, a side without a directory matches on filename
    /// alone. `remove_dots` normalizes `.` and `..` lexically first. The
    /// comparison is case sensitive if either side is.
    pub fn equal(a: &FileSpec, b: &FileSpec, full: bool, remove_dots: bool) -> bool {
        let case_sensitive = a.case_sensitive || b.case_sensitive;

        if !full && (a.directory.is_none() || b.directory.is_none()) {
            return names_equal(&a.filename, &b.filename, case_sensitive);
        }

        let (pa, pb) = if remove_dots {
            (normalize(&a.path()), normalize(&b.path()))
        } else {
            (a.path(), b.path())
        };
        names_equal(&pa.to_string_lossy(), &pb.to_string_lossy(), case_sensitive)
    }
}

impl PartialEq for FileSpec {
    fn eq(&self, other: &Self) -> bool {
        FileSpec::equal(self, other, true, false)
    }
}

impl fmt::Display for FileSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}

fn names_equal(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Ordered list of file specs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSpecList {
    files: Vec<FileSpec>,
}

impl FileSpecList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the end of the list
    pub fn append(&mut self, spec: FileSpec) {
        self.files.push(spec);
    }

    /// Append only if an equal spec is not already present.
    ///
    /// Returns true if the spec was added.
    pub fn append_if_unique(&mut self, spec: FileSpec) -> bool {
        if self.files.contains(&spec) {
            return false;
        }
        self.files.push(spec);
        true
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Write every path, separated by `separator` if given
    pub fn dump(&self, out: &mut impl fmt::Write, separator: Option<&str>) -> fmt::Result {
        for (i, spec) in self.files.iter().enumerate() {
            if i > 0 {
                if let Some(sep) = separator {
                    out.write_str(sep)?;
                }
            }
            write!(out, "{}", spec)?;
        }
        Ok(())
    }

    /// Index of the first entry at or after `start` matching `spec`.
    ///
    /// A `spec` without a directory matches on filename only.
    pub fn find_file_index(
        &self,
        start: usize,
        spec: &FileSpec,
        full: bool,
        remove_dots: bool,
    ) -> Option<usize> {
        let filename_only = spec.directory.is_none();
        self.files
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, candidate)| {
                if filename_only {
                    names_equal(
                        &candidate.filename,
                        &spec.filename,
                        spec.case_sensitive || candidate.case_sensitive,
                    )
                } else {
                    FileSpec::equal(candidate, spec, full, remove_dots)
                }
            })
            .map(|(idx, _)| idx)
    }

    pub fn get(&self, idx: usize) -> Option<&FileSpec> {
        self.files.get(idx)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileSpec> {
        self.files.iter()
    }
}

impl<'a> IntoIterator for &'a FileSpecList {
    type Item = &'a FileSpec;
    type IntoIter = std::slice::Iter<'a, FileSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<FileSpec> for FileSpecList {
    fn from_iter<I: IntoIterator<Item = FileSpec>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(paths: &[&str]) -> FileSpecList {
        paths.iter().map(FileSpec::new).collect()
    }

    #[test]
    fn filespec_splits_path() {
        let spec = FileSpec::new("/usr/lib/libc.so.6");
        assert_eq!(spec.directory(), Some(Path::new("/usr/lib")));
        assert_eq!(spec.filename(), "libc.so.6");
        assert_eq!(spec.path(), PathBuf::from("/usr/lib/libc.so.6"));

        let bare = FileSpec::new("libc.so.6");
        assert_eq!(bare.directory(), None);
    }

    #[test]
    fn append_if_unique_rejects_duplicates() {
        let mut files = FileSpecList::new();
        assert!(files.append_if_unique(FileSpec::new("/a/b")));
        assert!(!files.append_if_unique(FileSpec::new("/a/b")));
        assert!(files.append_if_unique(FileSpec::new("/a/c")));
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn append_keeps_duplicates() {
        let mut files = FileSpecList::new();
        files.append(FileSpec::new("/a/b"));
        files.append(FileSpec::new("/a/b"));
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn find_by_filename_only() {
        let files = list(&["/usr/lib/libm.so", "/lib/libc.so.6", "/opt/libc.so.6"]);
        let query = FileSpec::new("libc.so.6");

        assert_eq!(files.find_file_index(0, &query, false, false), Some(1));
        assert_eq!(files.find_file_index(2, &query, false, false), Some(2));
        assert_eq!(files.find_file_index(3, &query, false, false), None);
    }

    #[test]
    fn find_exact_path() {
        let files = list(&["/lib/libc.so.6", "/opt/libc.so.6"]);
        let query = FileSpec::new("/opt/libc.so.6");
        assert_eq!(files.find_file_index(0, &query, true, false), Some(1));
    }

    #[test]
    fn find_with_remove_dots() {
        let files = list(&["/opt/lib/../libc.so.6"]);
        let query = FileSpec::new("/opt/./libc.so.6");
        assert_eq!(files.find_file_index(0, &query, true, false), None);
        assert_eq!(files.find_file_index(0, &query, true, true), Some(0));
    }

    #[test]
    fn case_sensitivity_taken_from_either_side() {
        let mut files = FileSpecList::new();
        files.append(FileSpec::new("/Windows/KERNEL32.DLL").with_case_sensitive(false));

        let insensitive = FileSpec::new("kernel32.dll").with_case_sensitive(false);
        let sensitive = FileSpec::new("kernel32.dll").with_case_sensitive(true);

        assert_eq!(files.find_file_index(0, &insensitive, false, false), Some(0));
        assert_eq!(files.find_file_index(0, &sensitive, false, false), None);
    }

    #[test]
    fn get_out_of_range_is_none() {
        let files = list(&["/a"]);
        assert!(files.get(0).is_some());
        assert!(files.get(1).is_none());
    }

    #[test]
    fn dump_with_separator() {
        let files = list(&["/a/b", "/c/d"]);
        let mut out = String::new();
        files.dump(&mut out, Some(", ")).unwrap();
        assert_eq!(out, "/a/b, /c/d");
    }

    #[test]
    fn clear_empties_list() {
        let mut files = list(&["/a", "/b"]);
        files.clear();
        assert!(files.is_empty());
    }
}
