//! The pristine hierarchy every session starts from.

use crate::node::FileNode;
use crate::path;
use crate::permission::Permission;

const SYSTEM_DIRS: &[&str] = &[
    "/bin",
    "/boot",
    "/dev",
    "/etc",
    "/lib",
    "/lib64",
    "/media",
    "/mnt",
    "/opt",
    "/proc",
    "/root",
    "/run",
    "/sbin",
    "/srv",
    "/sys",
    "/tmp",
    "/usr",
    "/var",
    "/usr/bin",
    "/usr/lib",
    "/usr/local",
    "/usr/share",
    "/var/log",
    "/var/tmp",
    "/var/cache",
];

const HOME_DIRS: &[&str] = &[
    "Documents",
    "Downloads",
    "Music",
    "Pictures",
    "Videos",
    "Desktop",
    ".config",
    ".local/share",
];

/// Build the default tree for `username` on `hostname`.
pub(crate) fn default_tree(username: &str, hostname: &str) -> FileNode {
    let home = format!("/home/{username}");
    let mut root = FileNode::dir("/", "root");

    for dir in SYSTEM_DIRS {
        ensure(&mut root, dir, None, "root");
    }
    ensure(&mut root, "/home", None, "root");
    ensure(&mut root, &home, None, username);
    for dir in HOME_DIRS {
        ensure(&mut root, &format!("{home}/{dir}"), None, username);
    }

    let home_files = [
        (".bashrc", BASHRC.to_string()),
        (".profile", PROFILE.to_string()),
        ("Documents/notes.txt", NOTES.to_string()),
        ("Documents/code.py", CODE_PY.to_string()),
    ];
    for (rel, content) in home_files {
        ensure(&mut root, &format!("{home}/{rel}"), Some(content), username);
    }

    let system_files = [
        ("/etc/passwd", passwd(username)),
        ("/etc/hosts", hosts(hostname)),
        ("/etc/hostname", format!("{hostname}\n")),
        ("/etc/os-release", OS_RELEASE.to_string()),
        ("/var/log/syslog", syslog(hostname)),
        ("/var/log/auth.log", auth_log(hostname, username)),
        ("/tmp/test.txt", "This is a temporary file.\n".to_string()),
    ];
    for (p, content) in system_files {
        ensure(&mut root, p, Some(content), "root");
    }

    ensure(&mut root, "/etc/shadow", Some(shadow(username)), "root");
    if let Some(shadow) = root.child_mut("etc").and_then(|etc| etc.child_mut("shadow")) {
        shadow.permissions = Permission::from_octal(0o640);
        shadow.group = "shadow".to_string();
    }

    root
}

/// Create `abs` (and any missing parents) under `root`. `content` of
/// `None` makes a directory.
fn ensure(root: &mut FileNode, abs: &str, content: Option<String>, owner: &str) {
    let Some((parent, name)) = path::split_parent(abs) else {
        return;
    };
    let mut current = root;
    for part in path::components(parent) {
        if current.child(part).is_none() {
            current.insert_child(FileNode::dir(part, owner));
        }
        match current.child_mut(part) {
            Some(next) => current = next,
            None => return,
        }
    }
    if current.child(name).is_some() {
        return;
    }
    let node = match content {
        Some(text) => FileNode::file(name, text, owner),
        None => FileNode::dir(name, owner),
    };
    current.insert_child(node);
}

const BASHRC: &str = r#"# ~/.bashrc: executed by bash for non-login shells.

# If not running interactively, don't do anything
case $- in
    *i*) ;;
      *) return;;
esac

HISTCONTROL=ignoreboth
HISTSIZE=1000
HISTFILESIZE=2000

PS1='\u@\h:\w\$ '

alias ll='ls -la'
alias la='ls -A'
alias l='ls -CF'
alias ..='cd ..'
alias ...='cd ../..'

export PATH="$HOME/.local/bin:$PATH"
"#;

const PROFILE: &str = r#"# ~/.profile: executed by the command interpreter for login shells.

if [ -n "$BASH_VERSION" ]; then
    if [ -f "$HOME/.bashrc" ]; then
        . "$HOME/.bashrc"
    fi
fi

export EDITOR=nano
export LANG=en_US.UTF-8
"#;

const NOTES: &str = "# My notes\n\nThis is a sample text file.\nWelcome to the Linux command line!\n";

const CODE_PY: &str = "#!/usr/bin/env python3\n\nprint(\"Hello, Linux!\")\n";

const OS_RELEASE: &str = r#"PRETTY_NAME="Linux Command Quest OS"
NAME="LinuxQuest"
VERSION_ID="2.0"
VERSION="2.0 (Educational)"
ID=linuxquest
"#;

fn passwd(username: &str) -> String {
    format!(
        "root:x:0:0:root:/root:/bin/bash\n\
         daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin\n\
         bin:x:2:2:bin:/bin:/usr/sbin/nologin\n\
         sys:x:3:3:sys:/dev:/usr/sbin/nologin\n\
         {username}:x:1000:1000:{username}:/home/{username}:/bin/bash\n\
         nobody:x:65534:65534:nobody:/nonexistent:/usr/sbin/nologin\n"
    )
}

fn shadow(username: &str) -> String {
    format!(
        "root:*:19700:0:99999:7:::\n\
         daemon:*:19700:0:99999:7:::\n\
         {username}:$6$quest$Zm9yIHlvdXIgZXllcyBvbmx5:19700:0:99999:7:::\n"
    )
}

fn hosts(hostname: &str) -> String {
    format!(
        "127.0.0.1       localhost\n\
         127.0.1.1       {hostname}\n\
         ::1             localhost ip6-localhost ip6-loopback\n\
         ff02::1         ip6-allnodes\n\
         ff02::2         ip6-allrouters\n"
    )
}

fn syslog(hostname: &str) -> String {
    format!(
        "Dec 15 10:00:01 {hostname} systemd[1]: Started Daily apt download activities.\n\
         Dec 15 10:00:02 {hostname} systemd[1]: Starting Linux Command Quest...\n\
         Dec 15 10:00:03 {hostname} kernel: [    0.000000] Linux version 6.1.0-quest\n\
         Dec 15 10:00:04 {hostname} quest[1234]: Session started\n\
         Dec 15 10:00:05 {hostname} quest[1234]: Virtual filesystem initialized\n\
         Dec 15 10:00:06 {hostname} quest[1234]: Ready for commands\n"
    )
}

fn auth_log(hostname: &str, username: &str) -> String {
    format!(
        "Dec 15 08:23:01 {hostname} sshd[1001]: Accepted password for {username} from 192.168.1.100 port 52341\n\
         Dec 15 08:45:12 {hostname} sshd[1002]: Failed password for root from 10.0.0.50 port 43210\n\
         Dec 15 08:45:14 {hostname} sshd[1002]: Failed password for root from 10.0.0.50 port 43210\n\
         Dec 15 08:45:16 {hostname} sshd[1002]: Failed password for root from 10.0.0.50 port 43210\n\
         Dec 15 09:00:00 {hostname} CRON[1100]: pam_unix(cron:session): session opened for user root\n\
         Dec 15 09:15:22 {hostname} sudo[1150]: {username} : TTY=pts/0 ; PWD=/home/{username} ; USER=root ; COMMAND=/bin/ls\n\
         Dec 15 10:15:30 {hostname} sshd[1300]: Invalid user hacker from 185.220.101.1 port 12345\n\
         Dec 15 10:15:32 {hostname} sshd[1300]: Failed password for invalid user hacker from 185.220.101.1\n\
         Dec 15 11:00:00 {hostname} sshd[1400]: Accepted password for {username} from 192.168.1.105 port 60000\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(root: &'a FileNode, abs: &str) -> Option<&'a FileNode> {
        path::components(abs).try_fold(root, |node, part| node.child(part))
    }

    #[test]
    fn system_dirs_are_root_owned() {
        let root = default_tree("user", "quest");
        for dir in SYSTEM_DIRS {
            let node = lookup(&root, dir).unwrap_or_else(|| panic!("missing {dir}"));
            assert!(node.is_dir);
            assert_eq!(node.owner, "root");
        }
        assert_eq!(lookup(&root, "/home").unwrap().owner, "root");
    }

    #[test]
    fn home_is_user_owned() {
        let root = default_tree("ali", "quest");
        let home = lookup(&root, "/home/ali").unwrap();
        assert_eq!(home.owner, "ali");
        let share = lookup(&root, "/home/ali/.local/share").unwrap();
        assert!(share.is_dir);
        assert_eq!(share.owner, "ali");
        let notes = lookup(&root, "/home/ali/Documents/notes.txt").unwrap();
        assert_eq!(notes.owner, "ali");
        assert_eq!(notes.permissions, Permission::FILE);
    }

    #[test]
    fn passwd_lists_session_user() {
        let root = default_tree("ali", "lab");
        let passwd = lookup(&root, "/etc/passwd").unwrap();
        assert!(passwd.content().contains("ali:x:1000:1000"));
        let hostname = lookup(&root, "/etc/hostname").unwrap();
        assert_eq!(hostname.content(), "lab\n");
    }

    #[test]
    fn shadow_is_restricted() {
        let root = default_tree("user", "quest");
        let shadow = lookup(&root, "/etc/shadow").unwrap();
        assert_eq!(shadow.permissions.to_octal(), 0o640);
        assert_eq!(shadow.owner, "root");
        assert_eq!(shadow.group, "shadow");
    }

    #[test]
    fn seeded_files_present() {
        let root = default_tree("user", "quest");
        for p in [
            "/home/user/.bashrc",
            "/home/user/.profile",
            "/home/user/Documents/code.py",
            "/etc/os-release",
            "/var/log/syslog",
            "/var/log/auth.log",
            "/tmp/test.txt",
        ] {
            let node = lookup(&root, p).unwrap_or_else(|| panic!("missing {p}"));
            assert!(!node.is_dir, "{p} should be a file");
            assert!(!node.content().is_empty());
        }
    }
}
