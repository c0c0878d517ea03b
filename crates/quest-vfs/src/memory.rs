//! The session filesystem.
//!
//! One owned tree rooted at `/`, plus the session state that path resolution
//! depends on (user, home, working directory). Every public operation takes
//! the path exactly as the user typed it and resolves it first; errors carry
//! that original text so commands can echo it back.

use chrono::{DateTime, Local};
use quest_types::error::FsError;

use crate::defaults::default_tree;
use crate::node::FileNode;
use crate::path;
use crate::permission::Permission;

/// Reading this file is refused regardless of its mode bits.
const PROTECTED_PATHS: &[&str] = &["/etc/shadow"];

/// Size reported for directories in detailed listings.
pub const DIR_LISTING_SIZE: usize = 4096;

/// One entry of a short listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// One entry of a detailed (`ls -l`) listing.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDetail {
    pub name: String,
    pub is_dir: bool,
    pub permissions: Permission,
    pub owner: String,
    pub group: String,
    pub size: usize,
    pub modified: DateTime<Local>,
}

#[derive(Debug, Clone)]
struct Checkpoint {
    root: FileNode,
    cwd: String,
}

/// An in-memory POSIX-like filesystem for one session.
#[derive(Debug, Clone)]
pub struct VirtualFileSystem {
    root: FileNode,
    username: String,
    hostname: String,
    home: String,
    cwd: String,
    previous_cwd: String,
    checkpoint: Option<Checkpoint>,
}

impl VirtualFileSystem {
    /// Create a filesystem populated with the default hierarchy, with the
    /// working directory at `/home/<username>`.
    pub fn new(username: &str, hostname: &str) -> Self {
        let home = format!("/home/{username}");
        Self {
            root: default_tree(username, hostname),
            username: username.to_string(),
            hostname: hostname.to_string(),
            cwd: home.clone(),
            previous_cwd: home.clone(),
            home,
            checkpoint: None,
        }
    }

    /// Assemble a filesystem from previously captured parts.
    pub(crate) fn from_parts(
        root: FileNode,
        username: String,
        hostname: String,
        cwd: String,
        previous_cwd: String,
    ) -> Self {
        Self {
            root,
            home: format!("/home/{username}"),
            username,
            hostname,
            cwd,
            previous_cwd,
            checkpoint: None,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn home(&self) -> &str {
        &self.home
    }

    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub fn previous_cwd(&self) -> &str {
        &self.previous_cwd
    }

    pub fn root(&self) -> &FileNode {
        &self.root
    }

    /// The working directory with the home prefix shown as `~`.
    pub fn prompt_path(&self) -> String {
        if self.cwd == self.home {
            return "~".to_string();
        }
        match self.cwd.strip_prefix(&self.home) {
            Some(rest) if rest.starts_with('/') => format!("~{rest}"),
            _ => self.cwd.clone(),
        }
    }

    // -- lookup -----------------------------------------------------------

    /// Resolve `path` against the current session state.
    pub fn resolve(&self, path: &str) -> String {
        path::resolve(path, &self.cwd, &self.home, &self.username)
    }

    /// The node at `path`, if any.
    pub fn node(&self, path: &str) -> Option<&FileNode> {
        self.node_at(&self.resolve(path))
    }

    fn node_at(&self, abs: &str) -> Option<&FileNode> {
        let mut current = &self.root;
        for part in path::components(abs) {
            if !current.is_dir {
                return None;
            }
            current = current.child(part)?;
        }
        Some(current)
    }

    fn node_at_mut(&mut self, abs: &str) -> Option<&mut FileNode> {
        let mut current = &mut self.root;
        for part in path::components(abs) {
            if !current.is_dir {
                return None;
            }
            current = current.child_mut(part)?;
        }
        Some(current)
    }

    /// The directory that would hold `abs`, plus the final component.
    ///
    /// `shown` is the caller's spelling of the path, used in errors.
    fn parent_dir_mut<'a>(
        &mut self,
        abs: &'a str,
        shown: &str,
    ) -> Result<(&mut FileNode, &'a str), FsError> {
        let (parent, name) = path::split_parent(abs)
            .ok_or_else(|| FsError::PermissionDenied(shown.to_string()))?;
        match self.node_at_mut(parent) {
            Some(dir) if dir.is_dir => Ok((dir, name)),
            Some(_) => Err(FsError::NotADirectory(shown.to_string())),
            None => Err(FsError::PathNotFound(shown.to_string())),
        }
    }

    pub fn exists(&self, path: &str) -> bool {
        self.node(path).is_some()
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.node(path).is_some_and(|n| n.is_dir)
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.node(path).is_some_and(|n| !n.is_dir)
    }

    // -- navigation -------------------------------------------------------

    /// Change the working directory. `-` returns to the previous one.
    pub fn cd(&mut self, path: &str) -> Result<(), FsError> {
        let target = if path == "-" {
            self.previous_cwd.clone()
        } else {
            self.resolve(path)
        };
        match self.node_at(&target) {
            Some(node) if node.is_dir => {},
            Some(_) => return Err(FsError::NotADirectory(path.to_string())),
            None => return Err(FsError::PathNotFound(path.to_string())),
        }
        log::debug!("cd {} -> {target}", self.cwd);
        self.previous_cwd = std::mem::replace(&mut self.cwd, target);
        Ok(())
    }

    /// List the immediate children of a directory, directories first, then
    /// by case-insensitive name. Listing a file yields just that file.
    pub fn ls(&self, path: &str, show_hidden: bool) -> Result<Vec<DirEntry>, FsError> {
        Ok(self
            .listing(path, show_hidden)?
            .into_iter()
            .map(|n| DirEntry {
                name: n.name.clone(),
                is_dir: n.is_dir,
            })
            .collect())
    }

    /// Like [`ls`](Self::ls) with the metadata `ls -l` shows.
    pub fn ls_detailed(&self, path: &str, show_hidden: bool) -> Result<Vec<EntryDetail>, FsError> {
        Ok(self
            .listing(path, show_hidden)?
            .into_iter()
            .map(|n| EntryDetail {
                name: n.name.clone(),
                is_dir: n.is_dir,
                permissions: n.permissions,
                owner: n.owner.clone(),
                group: n.group.clone(),
                size: if n.is_dir { DIR_LISTING_SIZE } else { n.size() },
                modified: n.modified,
            })
            .collect())
    }

    fn listing(&self, path: &str, show_hidden: bool) -> Result<Vec<&FileNode>, FsError> {
        let node = self
            .node(path)
            .ok_or_else(|| FsError::PathNotFound(path.to_string()))?;
        if !node.is_dir {
            return Ok(vec![node]);
        }
        let mut entries: Vec<&FileNode> = node
            .children()
            .filter(|c| show_hidden || !c.is_hidden())
            .collect();
        entries.sort_by(|a, b| {
            b.is_dir
                .cmp(&a.is_dir)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(entries)
    }

    // -- mutation ---------------------------------------------------------

    /// Create a directory. With `parents`, missing ancestors are created too.
    pub fn mkdir(&mut self, path: &str, parents: bool) -> Result<(), FsError> {
        let target = self.resolve(path);
        if self.node_at(&target).is_some() {
            return Err(FsError::AlreadyExists(path.to_string()));
        }
        let owner = self.username.clone();

        if parents {
            let mut current = &mut self.root;
            for part in path::components(&target) {
                if current.child(part).is_none() {
                    current.insert_child(FileNode::dir(part, &owner));
                }
                current = match current.child_mut(part) {
                    Some(next) if next.is_dir => next,
                    _ => return Err(FsError::NotADirectory(path.to_string())),
                };
            }
            return Ok(());
        }

        let (parent, name) = self.parent_dir_mut(&target, path)?;
        parent.insert_child(FileNode::dir(name, &owner));
        Ok(())
    }

    /// Create an empty file, or refresh the modification time of an
    /// existing node.
    pub fn touch(&mut self, path: &str) -> Result<(), FsError> {
        let target = self.resolve(path);
        if let Some(node) = self.node_at_mut(&target) {
            node.touch();
            return Ok(());
        }
        let owner = self.username.clone();
        let (parent, name) = self.parent_dir_mut(&target, path)?;
        parent.insert_child(FileNode::file(name, "", &owner));
        Ok(())
    }

    /// Remove a node. `rm("/", true, _)` empties the root in place.
    pub fn rm(&mut self, path: &str, recursive: bool, force: bool) -> Result<(), FsError> {
        let target = self.resolve(path);
        if target == "/" {
            if !recursive {
                return Err(FsError::IsADirectory(path.to_string()));
            }
            log::debug!("rm -r /: clearing {} nodes", self.root.count() - 1);
            self.root.clear_children();
            return Ok(());
        }

        match self.node_at(&target) {
            None if force => return Ok(()),
            None => return Err(FsError::PathNotFound(path.to_string())),
            Some(node) if node.is_dir && !recursive => {
                return Err(FsError::IsADirectory(path.to_string()));
            },
            Some(_) => {},
        }

        let (parent, name) = self.parent_dir_mut(&target, path)?;
        parent.remove_child(name);
        Ok(())
    }

    /// Remove an empty directory.
    pub fn rmdir(&mut self, path: &str) -> Result<(), FsError> {
        let target = self.resolve(path);
        match self.node_at(&target) {
            None => return Err(FsError::PathNotFound(path.to_string())),
            Some(node) if !node.is_dir => return Err(FsError::NotADirectory(path.to_string())),
            Some(node) if node.has_children() => {
                return Err(FsError::NotEmpty(path.to_string()));
            },
            Some(_) => {},
        }
        let (parent, name) = self.parent_dir_mut(&target, path)?;
        parent.remove_child(name);
        Ok(())
    }

    /// Read a file's content.
    pub fn cat(&self, path: &str) -> Result<&str, FsError> {
        let target = self.resolve(path);
        let node = self
            .node_at(&target)
            .ok_or_else(|| FsError::PathNotFound(path.to_string()))?;
        if node.is_dir {
            return Err(FsError::IsADirectory(path.to_string()));
        }
        if PROTECTED_PATHS.contains(&target.as_str()) {
            return Err(FsError::PermissionDenied(path.to_string()));
        }
        Ok(node.content())
    }

    /// Write `content` to a file, creating it when missing.
    pub fn write(&mut self, path: &str, content: &str, append: bool) -> Result<(), FsError> {
        let target = self.resolve(path);
        if self.node_at(&target).is_none() {
            self.touch(path)?;
        }
        match self.node_at_mut(&target) {
            Some(node) if node.is_dir => Err(FsError::IsADirectory(path.to_string())),
            Some(node) => {
                node.set_content(content, append);
                Ok(())
            },
            None => Err(FsError::PathNotFound(path.to_string())),
        }
    }

    /// Copy `src` to `dst`. An existing directory at `dst` receives the copy
    /// under the source name. A directory cannot be copied into itself.
    pub fn cp(&mut self, src: &str, dst: &str, recursive: bool) -> Result<(), FsError> {
        let src_abs = self.resolve(src);
        let source = self
            .node_at(&src_abs)
            .ok_or_else(|| FsError::PathNotFound(src.to_string()))?;
        if source.is_dir && !recursive {
            return Err(FsError::IsADirectory(src.to_string()));
        }
        let dst_abs = self.copy_destination(&source.name, dst);
        if source.is_dir && (dst_abs == src_abs || path::is_below(&dst_abs, &src_abs)) {
            return Err(FsError::InvalidArgument(dst.to_string()));
        }
        let mut copy = source.clone();

        let (parent, name) = self.parent_dir_mut(&dst_abs, dst)?;
        copy.name = name.to_string();
        parent.insert_child(copy);
        Ok(())
    }

    /// Move or rename `src` to `dst`.
    ///
    /// Moving a path onto itself is a no-op. Moving a directory below itself
    /// (the root included) fails before anything changes.
    pub fn mv(&mut self, src: &str, dst: &str) -> Result<(), FsError> {
        let src_abs = self.resolve(src);
        let Some(source) = self.node_at(&src_abs) else {
            return Err(FsError::PathNotFound(src.to_string()));
        };
        if self.resolve(dst) == src_abs {
            return Ok(());
        }
        let dst_abs = self.copy_destination(&source.name, dst);
        if dst_abs == src_abs {
            return Ok(());
        }
        if path::is_below(&dst_abs, &src_abs) {
            return Err(FsError::InvalidArgument(dst.to_string()));
        }
        self.cp(src, dst, true)?;
        let (parent, name) = self.parent_dir_mut(&src_abs, src)?;
        parent.remove_child(name);
        Ok(())
    }

    fn copy_destination(&self, src_name: &str, dst: &str) -> String {
        let dst_abs = self.resolve(dst);
        match self.node_at(&dst_abs) {
            Some(node) if node.is_dir => path::join(&dst_abs, src_name),
            _ => dst_abs,
        }
    }

    /// Replace the mode bits of a node.
    pub fn set_permissions(&mut self, path: &str, permissions: Permission) -> Result<(), FsError> {
        self.update_permissions(path, false, |_| permissions)
    }

    /// Rewrite the mode bits of a node (and, when `recursive`, its subtree)
    /// from their current value.
    pub fn update_permissions(
        &mut self,
        path: &str,
        recursive: bool,
        f: impl Fn(Permission) -> Permission,
    ) -> Result<(), FsError> {
        let target = self.resolve(path);
        let node = self
            .node_at_mut(&target)
            .ok_or_else(|| FsError::PathNotFound(path.to_string()))?;
        node.for_each_mut(recursive, &mut |n| n.permissions = f(n.permissions));
        Ok(())
    }

    /// Change the owner (and optionally the group) of a node.
    pub fn set_owner(
        &mut self,
        path: &str,
        owner: &str,
        group: Option<&str>,
        recursive: bool,
    ) -> Result<(), FsError> {
        let target = self.resolve(path);
        let node = self
            .node_at_mut(&target)
            .ok_or_else(|| FsError::PathNotFound(path.to_string()))?;
        node.for_each_mut(recursive, &mut |n| {
            n.owner = owner.to_string();
            if let Some(group) = group {
                n.group = group.to_string();
            }
        });
        Ok(())
    }

    // -- session state ----------------------------------------------------

    /// Snapshot the tree and working directory.
    pub fn save_checkpoint(&mut self) {
        log::debug!("checkpoint saved ({} nodes)", self.root.count());
        self.checkpoint = Some(Checkpoint {
            root: self.root.clone(),
            cwd: self.cwd.clone(),
        });
    }

    pub fn has_checkpoint(&self) -> bool {
        self.checkpoint.is_some()
    }

    /// Return to the last checkpoint. `false` when none was saved.
    pub fn restore_checkpoint(&mut self) -> bool {
        let Some(checkpoint) = &self.checkpoint else {
            return false;
        };
        self.root = checkpoint.root.clone();
        self.cwd = checkpoint.cwd.clone();
        log::info!("checkpoint restored, cwd {}", self.cwd);
        true
    }

    /// Rebuild the pristine default tree and return home.
    pub fn reset(&mut self) {
        self.root = default_tree(&self.username, &self.hostname);
        self.cwd = self.home.clone();
        self.previous_cwd = self.home.clone();
        log::info!("filesystem reset for {}", self.username);
    }
}

impl Default for VirtualFileSystem {
    fn default() -> Self {
        Self::new("user", "quest")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fs() -> VirtualFileSystem {
        VirtualFileSystem::default()
    }

    fn names(entries: &[DirEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn starts_at_home() {
        let fs = fs();
        assert_eq!(fs.cwd(), "/home/user");
        assert_eq!(fs.home(), "/home/user");
        assert_eq!(fs.prompt_path(), "~");
    }

    #[test]
    fn exists_never_errors() {
        let fs = fs();
        assert!(fs.exists("/etc"));
        assert!(fs.is_dir("/etc"));
        assert!(fs.is_file("/etc/passwd"));
        assert!(!fs.exists("/nope"));
        assert!(!fs.is_dir("/etc/passwd/x"));
        assert!(!fs.is_file("/etc"));
    }

    #[test]
    fn cd_and_back() {
        let mut fs = fs();
        fs.cd("Documents").unwrap();
        assert_eq!(fs.cwd(), "/home/user/Documents");
        assert_eq!(fs.prompt_path(), "~/Documents");
        fs.cd("..").unwrap();
        assert_eq!(fs.cwd(), "/home/user");
        fs.cd("/var/log").unwrap();
        fs.cd("-").unwrap();
        assert_eq!(fs.cwd(), "/home/user");
        fs.cd("-").unwrap();
        assert_eq!(fs.cwd(), "/var/log");
        assert_eq!(fs.prompt_path(), "/var/log");
    }

    #[test]
    fn cd_failures_leave_state() {
        let mut fs = fs();
        assert_eq!(fs.cd("nope"), Err(FsError::PathNotFound("nope".into())));
        assert_eq!(
            fs.cd("/etc/passwd"),
            Err(FsError::NotADirectory("/etc/passwd".into()))
        );
        assert_eq!(fs.cwd(), "/home/user");
        assert_eq!(fs.previous_cwd(), "/home/user");
    }

    #[test]
    fn prompt_path_does_not_match_sibling_prefix() {
        let mut fs = fs();
        fs.mkdir("/home/username", false).unwrap();
        fs.cd("/home/username").unwrap();
        assert_eq!(fs.prompt_path(), "/home/username");
    }

    #[test]
    fn ls_sorts_dirs_first_case_insensitive() {
        let mut fs = fs();
        fs.mkdir("/tmp/box", false).unwrap();
        fs.touch("/tmp/box/b.txt").unwrap();
        fs.touch("/tmp/box/A.txt").unwrap();
        fs.mkdir("/tmp/box/zdir", false).unwrap();
        fs.mkdir("/tmp/box/Cdir", false).unwrap();
        fs.touch("/tmp/box/.hidden").unwrap();

        let entries = fs.ls("/tmp/box", false).unwrap();
        assert_eq!(names(&entries), ["Cdir", "zdir", "A.txt", "b.txt"]);
        let all = fs.ls("/tmp/box", true).unwrap();
        assert_eq!(names(&all), ["Cdir", "zdir", ".hidden", "A.txt", "b.txt"]);
    }

    #[test]
    fn ls_file_and_missing() {
        let fs = fs();
        let entries = fs.ls("/etc/hosts", false).unwrap();
        assert_eq!(
            entries,
            [DirEntry {
                name: "hosts".into(),
                is_dir: false
            }]
        );
        assert_eq!(
            fs.ls("ghost", false),
            Err(FsError::PathNotFound("ghost".into()))
        );
    }

    #[test]
    fn ls_detailed_reports_dir_size() {
        let fs = fs();
        let entries = fs.ls_detailed("~", false).unwrap();
        let docs = entries.iter().find(|e| e.name == "Documents").unwrap();
        assert_eq!(docs.size, DIR_LISTING_SIZE);
        assert_eq!(docs.permissions, Permission::DIR);
        let etc = fs.ls_detailed("/etc", false).unwrap();
        let passwd = etc.iter().find(|e| e.name == "passwd").unwrap();
        assert_eq!(passwd.size, fs.cat("/etc/passwd").unwrap().len());
        assert_eq!(passwd.owner, "root");
    }

    #[test]
    fn mkdir_twice_fails_and_keeps_tree() {
        let mut fs = fs();
        fs.mkdir("proj", false).unwrap();
        fs.touch("proj/f").unwrap();
        assert_eq!(
            fs.mkdir("proj", false),
            Err(FsError::AlreadyExists("proj".into()))
        );
        assert!(fs.exists("proj/f"));
    }

    #[test]
    fn mkdir_missing_parent() {
        let mut fs = fs();
        assert_eq!(
            fs.mkdir("a/b", false),
            Err(FsError::PathNotFound("a/b".into()))
        );
        fs.mkdir("a/b/c", true).unwrap();
        let entries = fs.ls("a/b", false).unwrap();
        assert_eq!(names(&entries), ["c"]);
        assert_eq!(fs.node("a/b").unwrap().owner, "user");
    }

    #[test]
    fn mkdir_parents_through_file_fails() {
        let mut fs = fs();
        fs.touch("f").unwrap();
        assert_eq!(
            fs.mkdir("f/sub", true),
            Err(FsError::NotADirectory("f/sub".into()))
        );
    }

    #[test]
    fn touch_creates_and_refreshes() {
        let mut fs = fs();
        fs.write("note", "keep", false).unwrap();
        let before = fs.node("note").unwrap().modified;
        fs.touch("note").unwrap();
        let node = fs.node("note").unwrap();
        assert_eq!(node.content(), "keep");
        assert!(node.modified >= before);

        fs.touch("fresh").unwrap();
        assert_eq!(fs.cat("fresh").unwrap(), "");
        assert_eq!(
            fs.touch("no/such/file"),
            Err(FsError::PathNotFound("no/such/file".into()))
        );
    }

    #[test]
    fn rm_rules() {
        let mut fs = fs();
        assert_eq!(
            fs.rm("Documents", false, false),
            Err(FsError::IsADirectory("Documents".into()))
        );
        assert_eq!(
            fs.rm("ghost", false, false),
            Err(FsError::PathNotFound("ghost".into()))
        );
        fs.rm("ghost", false, true).unwrap();
        fs.rm("Documents", true, false).unwrap();
        assert!(!fs.exists("Documents"));
        fs.rm(".bashrc", false, false).unwrap();
        assert!(!fs.exists(".bashrc"));
    }

    #[test]
    fn rm_root_recursive_is_repeatable() {
        let mut fs = fs();
        fs.rm("/", true, true).unwrap();
        assert!(!fs.root().has_children());
        fs.rm("/", true, false).unwrap();
        assert!(!fs.root().has_children());
        assert!(fs.exists("/"));
    }

    #[test]
    fn rmdir_only_empty() {
        let mut fs = fs();
        fs.mkdir("empty", false).unwrap();
        fs.rmdir("empty").unwrap();
        assert!(!fs.exists("empty"));
        assert_eq!(
            fs.rmdir("Documents"),
            Err(FsError::NotEmpty("Documents".into()))
        );
        assert_eq!(
            fs.rmdir(".bashrc"),
            Err(FsError::NotADirectory(".bashrc".into()))
        );
    }

    #[test]
    fn cat_errors() {
        let fs = fs();
        assert_eq!(fs.cat("/etc"), Err(FsError::IsADirectory("/etc".into())));
        assert_eq!(fs.cat("nope"), Err(FsError::PathNotFound("nope".into())));
        assert_eq!(
            fs.cat("/etc/shadow"),
            Err(FsError::PermissionDenied("/etc/shadow".into()))
        );
        assert_eq!(
            fs.cat("../../etc/shadow"),
            Err(FsError::PermissionDenied("../../etc/shadow".into()))
        );
    }

    #[test]
    fn write_then_cat() {
        let mut fs = fs();
        fs.write("out.txt", "hello\n", false).unwrap();
        assert_eq!(fs.cat("out.txt").unwrap(), "hello\n");
        fs.write("out.txt", "world\n", true).unwrap();
        assert_eq!(fs.cat("out.txt").unwrap(), "hello\nworld\n");
        fs.write("out.txt", "reset", false).unwrap();
        assert_eq!(fs.cat("out.txt").unwrap(), "reset");
    }

    #[test]
    fn write_onto_dir_fails() {
        let mut fs = fs();
        assert_eq!(
            fs.write("Documents", "x", false),
            Err(FsError::IsADirectory("Documents".into()))
        );
        assert_eq!(
            fs.write("missing/dir/f", "x", false),
            Err(FsError::PathNotFound("missing/dir/f".into()))
        );
    }

    #[test]
    fn cp_file_and_into_dir() {
        let mut fs = fs();
        fs.cp("Documents/notes.txt", "copy.txt", false).unwrap();
        assert_eq!(
            fs.cat("copy.txt").unwrap(),
            fs.cat("Documents/notes.txt").unwrap()
        );
        fs.cp("copy.txt", "/tmp", false).unwrap();
        assert!(fs.is_file("/tmp/copy.txt"));
    }

    #[test]
    fn cp_dir_requires_recursive() {
        let mut fs = fs();
        assert_eq!(
            fs.cp("Documents", "Docs2", false),
            Err(FsError::IsADirectory("Documents".into()))
        );
        fs.cp("Documents", "Docs2", true).unwrap();
        assert!(fs.is_file("Docs2/notes.txt"));
        assert_eq!(fs.node("Docs2").unwrap().name, "Docs2");
    }

    #[test]
    fn cp_is_deep() {
        let mut fs = fs();
        fs.cp("Documents", "Docs2", true).unwrap();
        fs.write("Docs2/notes.txt", "changed", false).unwrap();
        assert_ne!(fs.cat("Documents/notes.txt").unwrap(), "changed");
    }

    #[test]
    fn cp_missing_destination_parent() {
        let mut fs = fs();
        assert_eq!(
            fs.cp(".bashrc", "nope/x", false),
            Err(FsError::PathNotFound("nope/x".into()))
        );
    }

    #[test]
    fn mv_renames_and_moves() {
        let mut fs = fs();
        fs.mv("Documents/notes.txt", "n.txt").unwrap();
        assert!(!fs.exists("Documents/notes.txt"));
        assert!(fs.is_file("n.txt"));
        fs.mv("n.txt", "Music").unwrap();
        assert!(fs.is_file("Music/n.txt"));
        assert_eq!(
            fs.mv("ghost", "x"),
            Err(FsError::PathNotFound("ghost".into()))
        );
    }

    #[test]
    fn mv_onto_itself_is_noop() {
        let mut fs = fs();
        fs.mv(".bashrc", ".bashrc").unwrap();
        assert!(fs.is_file(".bashrc"));
        fs.mv("Documents/notes.txt", "Documents").unwrap();
        assert!(fs.is_file("Documents/notes.txt"));
        fs.mv("Documents", "Documents").unwrap();
        fs.mv("Documents", "~/Documents/").unwrap();
        assert!(fs.is_file("Documents/notes.txt"));
        assert!(!fs.exists("Documents/Documents"));
    }

    #[test]
    fn mv_dir_below_itself_fails_untouched() {
        let mut fs = fs();
        let before = fs.root().count();
        assert_eq!(
            fs.mv("Documents", "Documents/sub"),
            Err(FsError::InvalidArgument("Documents/sub".into()))
        );
        fs.mkdir("Documents/inner", false).unwrap();
        assert_eq!(
            fs.mv("Documents", "Documents/inner"),
            Err(FsError::InvalidArgument("Documents/inner".into()))
        );
        fs.rmdir("Documents/inner").unwrap();
        assert!(fs.is_file("Documents/notes.txt"));
        assert_eq!(fs.root().count(), before);
    }

    #[test]
    fn mv_root_changes_nothing() {
        let mut fs = fs();
        let before = fs.root().count();
        assert_eq!(fs.mv("/", "x"), Err(FsError::InvalidArgument("x".into())));
        assert!(!fs.exists("x"));
        assert_eq!(fs.root().count(), before);
    }

    #[test]
    fn cp_dir_into_itself_fails() {
        let mut fs = fs();
        assert_eq!(
            fs.cp("Documents", "Documents", true),
            Err(FsError::InvalidArgument("Documents".into()))
        );
        assert!(!fs.exists("Documents/Documents"));
        fs.cp("Documents", "Music", true).unwrap();
        assert!(fs.is_file("Music/Documents/notes.txt"));
    }

    #[test]
    fn metadata_updates() {
        let mut fs = fs();
        fs.set_permissions(".bashrc", Permission::PRIVATE).unwrap();
        assert_eq!(fs.node(".bashrc").unwrap().permissions, Permission::PRIVATE);

        fs.set_owner("Documents", "root", Some("adm"), true).unwrap();
        let notes = fs.node("Documents/notes.txt").unwrap();
        assert_eq!((notes.owner.as_str(), notes.group.as_str()), ("root", "adm"));

        fs.set_owner("Music", "bob", None, false).unwrap();
        let music = fs.node("Music").unwrap();
        assert_eq!((music.owner.as_str(), music.group.as_str()), ("bob", "user"));

        assert!(fs.set_permissions("ghost", Permission::FILE).is_err());
    }

    #[test]
    fn update_permissions_recursive() {
        let mut fs = fs();
        fs.update_permissions("Documents", true, |p| p - Permission::OTHER_READ)
            .unwrap();
        assert_eq!(fs.node("Documents").unwrap().permissions.to_octal(), 0o751);
        assert_eq!(
            fs.node("Documents/notes.txt").unwrap().permissions.to_octal(),
            0o640
        );
        assert_eq!(fs.node("Music").unwrap().permissions, Permission::DIR);
    }

    #[test]
    fn checkpoint_round_trip() {
        let mut fs = fs();
        assert!(!fs.restore_checkpoint());
        fs.save_checkpoint();
        let listing = fs.ls("~", true).unwrap();
        let notes = fs.cat("Documents/notes.txt").unwrap().to_string();

        fs.rm("Documents", true, false).unwrap();
        fs.write("junk", "x", false).unwrap();
        fs.cd("/tmp").unwrap();

        assert!(fs.restore_checkpoint());
        assert_eq!(fs.cwd(), "/home/user");
        assert_eq!(fs.ls("~", true).unwrap(), listing);
        assert_eq!(fs.cat("Documents/notes.txt").unwrap(), notes);

        // The checkpoint survives a restore and stays independent.
        fs.rm("Documents", true, false).unwrap();
        assert!(fs.restore_checkpoint());
        assert!(fs.exists("Documents/notes.txt"));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut fs = fs();
        fs.rm("/", true, false).unwrap();
        fs.cd("/").unwrap();
        fs.reset();
        assert_eq!(fs.cwd(), "/home/user");
        assert_eq!(fs.previous_cwd(), "/home/user");
        assert!(fs.is_file("/etc/passwd"));
        let pristine = VirtualFileSystem::default();
        assert_eq!(fs.ls("/", true).unwrap(), pristine.ls("/", true).unwrap());
        assert_eq!(fs.root().count(), pristine.root().count());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn write_then_cat_roundtrips(
                name in "[a-z]{1,8}",
                content in "[ -~\n]{0,64}",
            ) {
                let mut fs = fs();
                fs.write(&name, &content, false).unwrap();
                prop_assert_eq!(fs.cat(&name).unwrap(), content.as_str());
            }

            #[test]
            fn mkdir_parents_then_exists(segments in proptest::collection::vec("[a-z]{1,6}", 1..5)) {
                let mut fs = fs();
                let p = format!("/tmp/{}", segments.join("/"));
                fs.mkdir(&p, true).unwrap();
                prop_assert!(fs.is_dir(&p));
            }

            #[test]
            fn cd_never_leaves_a_directory(path in "[a-z./]{0,20}") {
                let mut fs = fs();
                let _ = fs.cd(&path);
                prop_assert!(fs.is_dir(fs.cwd()));
            }
        }
    }
}
