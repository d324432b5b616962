//! Install-tag predicates and the file filters built on them.
//!
//! Filters only touch the file list: chunks referenced solely by removed
//! files stay in the chunk list.

use crate::files::FileManifest;
use crate::manifest::Manifest;

/// `needle` equals some element of `haystack`.
pub fn contains_str<S: AsRef<str>>(haystack: &[S], needle: &str) -> bool {
    haystack.iter().any(|s| s.as_ref() == needle)
}

/// Some file tag equals some filter tag.
pub fn any_tag_matches<A: AsRef<str>, B: AsRef<str>>(file_tags: &[A], tags: &[B]) -> bool {
    file_tags.iter().any(|t| tags.iter().any(|x| t.as_ref() == x.as_ref()))
}

/// Some filter tag is a substring of some file tag.
pub fn any_tag_contains<A: AsRef<str>, B: AsRef<str>>(file_tags: &[A], tags: &[B]) -> bool {
    file_tags.iter().any(|t| tags.iter().any(|x| t.as_ref().contains(x.as_ref())))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagMatch {
    Exact,
    Substring,
}

impl TagMatch {
    pub fn matches<A: AsRef<str>, B: AsRef<str>>(self, file_tags: &[A], tags: &[B]) -> bool {
        match self {
            TagMatch::Exact => any_tag_matches(file_tags, tags),
            TagMatch::Substring => any_tag_contains(file_tags, tags),
        }
    }
}

/// Copy of `files` without the ones whose tags match.
pub fn filter_files<S: AsRef<str>>(
    files: &[FileManifest],
    tags: &[S],
    mode: TagMatch,
) -> Vec<FileManifest> {
    files.iter().filter(|f| !mode.matches(&f.install_tags, tags)).cloned().collect()
}

impl Manifest {
    /// Drop every file with a tag equal to one of `tags`. Returns how many went.
    pub fn remove_files_with_tags<S: AsRef<str>>(&mut self, tags: &[S]) -> usize {
        self.remove_tagged(tags, TagMatch::Exact)
    }

    /// Drop every file with a tag containing one of `tags`.
    pub fn remove_files_with_tag_substrings<S: AsRef<str>>(&mut self, tags: &[S]) -> usize {
        self.remove_tagged(tags, TagMatch::Substring)
    }

    pub fn remove_tagged<S: AsRef<str>>(&mut self, tags: &[S], mode: TagMatch) -> usize {
        let before = self.files.files.len();
        self.files.files.retain(|f| !mode.matches(&f.install_tags, tags));
        before - self.files.files.len()
    }
}
