//! JSON persistence for a whole session filesystem.

use quest_types::error::{FsError, Result};
use serde::{Deserialize, Serialize};

use crate::memory::VirtualFileSystem;
use crate::node::FileNode;

/// Serializable form of a [`VirtualFileSystem`]. The checkpoint is not
/// part of the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VfsSnapshot {
    pub username: String,
    pub hostname: String,
    pub cwd: String,
    /// Older snapshots may lack this; it then defaults to `cwd`.
    #[serde(default)]
    pub previous_cwd: Option<String>,
    pub root: FileNode,
}

impl From<&VirtualFileSystem> for VfsSnapshot {
    fn from(fs: &VirtualFileSystem) -> Self {
        Self {
            username: fs.username().to_string(),
            hostname: fs.hostname().to_string(),
            cwd: fs.cwd().to_string(),
            previous_cwd: Some(fs.previous_cwd().to_string()),
            root: fs.root().clone(),
        }
    }
}

impl TryFrom<VfsSnapshot> for VirtualFileSystem {
    type Error = FsError;

    fn try_from(snap: VfsSnapshot) -> std::result::Result<Self, FsError> {
        if !snap.root.is_dir {
            return Err(FsError::NotADirectory("/".to_string()));
        }
        snap.root.check_shape("/")?;
        let previous = snap.previous_cwd.unwrap_or_else(|| snap.cwd.clone());
        let mut fs = VirtualFileSystem::from_parts(
            snap.root,
            snap.username,
            snap.hostname,
            snap.cwd,
            previous,
        );
        // A snapshot taken after the working directory was deleted.
        if !fs.is_dir(fs.cwd()) {
            log::warn!("snapshot cwd {} is gone, starting at /", fs.cwd());
            fs.cd("/")?;
        }
        Ok(fs)
    }
}

impl VirtualFileSystem {
    /// Serialize the tree and session state as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&VfsSnapshot::from(self))?)
    }

    /// Rebuild a filesystem from [`to_json`](Self::to_json) output.
    pub fn from_json(json: &str) -> Result<Self> {
        let snap: VfsSnapshot = serde_json::from_str(json)?;
        log::debug!("loading snapshot for {}@{}", snap.username, snap.hostname);
        Ok(Self::try_from(snap)?)
    }
}

#[cfg(test)]
mod tests {
    use quest_types::error::QuestError;

    use super::*;
    use crate::permission::Permission;

    #[test]
    fn json_round_trip_is_lossless() {
        let mut fs = VirtualFileSystem::new("ali", "lab");
        fs.mkdir("project/src", true).unwrap();
        fs.write("project/src/main.rs", "fn main() {}\n", false).unwrap();
        fs.set_permissions("project/src/main.rs", Permission::from_octal(0o755))
            .unwrap();
        fs.cd("project").unwrap();

        let json = fs.to_json().unwrap();
        let back = VirtualFileSystem::from_json(&json).unwrap();

        assert_eq!(back.username(), "ali");
        assert_eq!(back.hostname(), "lab");
        assert_eq!(back.home(), "/home/ali");
        assert_eq!(back.cwd(), "/home/ali/project");
        assert_eq!(back.previous_cwd(), "/home/ali");
        assert_eq!(back.root(), fs.root());
        assert_eq!(
            back.node("src/main.rs").unwrap().permissions.to_octal(),
            0o755
        );
    }

    #[test]
    fn permissions_are_octal_strings() {
        let fs = VirtualFileSystem::default();
        let json = fs.to_json().unwrap();
        assert!(json.contains("\"permissions\": \"755\""));
        assert!(json.contains("\"permissions\": \"640\""));
    }

    #[test]
    fn missing_previous_cwd_defaults_to_cwd() {
        let fs = VirtualFileSystem::default();
        let mut value: serde_json::Value = serde_json::from_str(&fs.to_json().unwrap()).unwrap();
        value.as_object_mut().unwrap().remove("previous_cwd");
        let back = VirtualFileSystem::from_json(&value.to_string()).unwrap();
        assert_eq!(back.previous_cwd(), back.cwd());
    }

    #[test]
    fn invalid_json_is_json_error() {
        let err = VirtualFileSystem::from_json("{ nope").unwrap_err();
        assert!(matches!(err, QuestError::Json(_)));
    }

    #[test]
    fn dangling_cwd_falls_back_to_root() {
        let mut fs = VirtualFileSystem::default();
        fs.rm("/", true, false).unwrap();
        let back = VirtualFileSystem::from_json(&fs.to_json().unwrap()).unwrap();
        assert_eq!(back.cwd(), "/");
        assert!(!back.root().has_children());
    }

    #[test]
    fn file_with_children_rejected() {
        let fs = VirtualFileSystem::default();
        let mut value: serde_json::Value = serde_json::from_str(&fs.to_json().unwrap()).unwrap();
        let tmp_file = &mut value["root"]["children"]["tmp"]["children"]["test.txt"];
        let mut hidden = tmp_file.clone();
        hidden["name"] = "hidden".into();
        tmp_file["children"] = serde_json::json!({ "hidden": hidden });
        let err = VirtualFileSystem::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(
            err,
            QuestError::Fs(FsError::NotADirectory(ref p)) if p == "/tmp/test.txt"
        ));
    }

    #[test]
    fn mismatched_child_key_rejected() {
        let fs = VirtualFileSystem::default();
        let mut value: serde_json::Value = serde_json::from_str(&fs.to_json().unwrap()).unwrap();
        value["root"]["children"]["tmp"]["name"] = "temp".into();
        let err = VirtualFileSystem::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(
            err,
            QuestError::Fs(FsError::InvalidArgument(ref p)) if p == "/tmp"
        ));
    }

    #[test]
    fn file_root_rejected() {
        let fs = VirtualFileSystem::default();
        let mut snap = VfsSnapshot::from(&fs);
        snap.root = FileNode::file("/", "", "root");
        let json = serde_json::to_string(&snap).unwrap();
        let err = VirtualFileSystem::from_json(&json).unwrap_err();
        assert!(matches!(err, QuestError::Fs(FsError::NotADirectory(_))));
    }
}
