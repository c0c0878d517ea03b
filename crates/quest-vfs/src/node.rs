//! Tree nodes.

use chrono::{DateTime, Local};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use quest_types::error::FsError;

use crate::path;
use crate::permission::Permission;

/// A file or directory in the tree.
///
/// Directories own their children outright; cloning a node deep-copies the
/// whole subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    /// Final path segment. The root is named `/`.
    pub name: String,
    pub is_dir: bool,
    pub permissions: Permission,
    pub owner: String,
    pub group: String,
    pub created: DateTime<Local>,
    pub modified: DateTime<Local>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    content: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    children: IndexMap<String, FileNode>,
}

impl FileNode {
    /// A regular file with mode 644, owned by `owner:owner`.
    pub fn file(name: impl Into<String>, content: impl Into<String>, owner: &str) -> Self {
        let now = Local::now();
        Self {
            name: name.into(),
            is_dir: false,
            permissions: Permission::FILE,
            owner: owner.to_string(),
            group: owner.to_string(),
            created: now,
            modified: now,
            content: content.into(),
            children: IndexMap::new(),
        }
    }

    /// An empty directory with mode 755, owned by `owner:owner`.
    pub fn dir(name: impl Into<String>, owner: &str) -> Self {
        let now = Local::now();
        Self {
            name: name.into(),
            is_dir: true,
            permissions: Permission::DIR,
            owner: owner.to_string(),
            group: owner.to_string(),
            created: now,
            modified: now,
            content: String::new(),
            children: IndexMap::new(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Byte length of the content. Directories report 0.
    pub fn size(&self) -> usize {
        if self.is_dir { 0 } else { self.content.len() }
    }

    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    /// Children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = &FileNode> {
        self.children.values()
    }

    pub fn child(&self, name: &str) -> Option<&FileNode> {
        self.children.get(name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut FileNode> {
        self.children.get_mut(name)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Insert or replace a child, keyed by its name.
    pub(crate) fn insert_child(&mut self, node: FileNode) {
        self.children.insert(node.name.clone(), node);
    }

    pub(crate) fn remove_child(&mut self, name: &str) -> Option<FileNode> {
        self.children.shift_remove(name)
    }

    pub(crate) fn clear_children(&mut self) {
        self.children.clear();
    }

    pub(crate) fn set_content(&mut self, content: &str, append: bool) {
        if append {
            self.content.push_str(content);
        } else {
            self.content = content.to_string();
        }
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.modified = Local::now();
    }

    /// Apply `f` to this node and, when `recursive`, every descendant.
    pub(crate) fn for_each_mut(&mut self, recursive: bool, f: &mut impl FnMut(&mut FileNode)) {
        f(self);
        if recursive {
            for child in self.children.values_mut() {
                child.for_each_mut(true, f);
            }
        }
    }

    /// Check a subtree built from outside data (a snapshot) for shapes the
    /// filesystem never produces: a file with children, or a child whose
    /// key and name disagree or are not a single path segment. `at` is this
    /// node's absolute path.
    pub(crate) fn check_shape(&self, at: &str) -> Result<(), FsError> {
        if !self.is_dir && self.has_children() {
            return Err(FsError::NotADirectory(at.to_string()));
        }
        for (key, child) in &self.children {
            let child_path = path::join(at, key);
            let bad_segment = matches!(key.as_str(), "" | "." | "..") || key.contains('/');
            if bad_segment || *key != child.name {
                return Err(FsError::InvalidArgument(child_path));
            }
            child.check_shape(&child_path)?;
        }
        Ok(())
    }

    /// Number of nodes in this subtree, including itself.
    pub fn count(&self) -> usize {
        1 + self.children.values().map(FileNode::count).sum::<usize>()
    }
}
