//! Path resolution on plain strings.
//!
//! Nothing here touches the tree: `.` and `..` are collapsed lexically, so a
//! path through a missing directory still resolves to a well-formed absolute
//! path and the lookup decides whether it exists.

/// Variables expanded inside paths, in expansion order.
const VARIABLES: [&str; 4] = ["${HOME}", "${USER}", "$HOME", "$USER"];

/// Resolve `path` to a normalized absolute path.
///
/// Expands `~`, `$HOME`, `${HOME}`, `$USER`, and `${USER}`, joins relative
/// paths onto `cwd`, and collapses `.` and `..` (`..` at the root stays at
/// the root). An empty path resolves to `cwd`.
pub fn resolve(path: &str, cwd: &str, home: &str, username: &str) -> String {
    if path.is_empty() {
        return normalize(cwd);
    }

    let mut expanded = path.to_string();
    for var in VARIABLES {
        if expanded.contains(var) {
            let value = if var.contains("HOME") { home } else { username };
            expanded = expanded.replace(var, value);
        }
    }

    if expanded == "~" {
        return normalize(home);
    }
    if let Some(rest) = expanded.strip_prefix("~/") {
        expanded = format!("{home}/{rest}");
    }

    if expanded.starts_with('/') {
        normalize(&expanded)
    } else {
        normalize(&format!("{cwd}/{expanded}"))
    }
}

/// Collapse `.`, `..`, and repeated separators in an absolute path.
pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {},
            ".." => {
                parts.pop();
            },
            _ => parts.push(part),
        }
    }
    if parts.is_empty() {
        return "/".to_string();
    }
    let mut out = String::with_capacity(path.len());
    for part in parts {
        out.push('/');
        out.push_str(part);
    }
    out
}

/// Components of a normalized absolute path. The root has none.
pub fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|p| !p.is_empty())
}

/// Split a normalized absolute path into its parent and final component.
///
/// Returns `None` for the root.
pub fn split_parent(path: &str) -> Option<(&str, &str)> {
    if path == "/" {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some(("/", &path[1..])),
        Some(i) => Some((&path[..i], &path[i + 1..])),
        None => None,
    }
}

/// Join a child name onto a normalized absolute directory path.
pub fn join(dir: &str, name: &str) -> String {
    if dir == "/" {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Whether `path` lies strictly below `dir`. Both must be normalized.
pub fn is_below(path: &str, dir: &str) -> bool {
    if dir == "/" {
        return path != "/";
    }
    path.strip_prefix(dir).is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: &str = "/home/user";

    fn r(path: &str, cwd: &str) -> String {
        resolve(path, cwd, HOME, "user")
    }

    #[test]
    fn below() {
        assert!(is_below("/home/user/Documents", "/home/user"));
        assert!(is_below("/etc", "/"));
        assert!(!is_below("/", "/"));
        assert!(!is_below("/home/user", "/home/user"));
        assert!(!is_below("/home/username", "/home/user"));
    }

    #[test]
    fn empty_is_cwd() {
        assert_eq!(r("", "/etc"), "/etc");
    }

    #[test]
    fn tilde_forms() {
        assert_eq!(r("~", "/"), HOME);
        assert_eq!(r("~/Documents", "/"), "/home/user/Documents");
        // `~name` is an ordinary relative name.
        assert_eq!(r("~bob", "/tmp"), "/tmp/~bob");
    }

    #[test]
    fn variables_expand() {
        assert_eq!(r("$HOME/x", "/"), "/home/user/x");
        assert_eq!(r("${HOME}/x", "/"), "/home/user/x");
        assert_eq!(r("/home/$USER", "/"), HOME);
        assert_eq!(r("/home/${USER}/a", "/"), "/home/user/a");
    }

    #[test]
    fn relative_joins_cwd() {
        assert_eq!(r("Documents", HOME), "/home/user/Documents");
        assert_eq!(r("./a/./b", "/tmp"), "/tmp/a/b");
    }

    #[test]
    fn dotdot_collapses() {
        assert_eq!(r("..", HOME), "/home");
        assert_eq!(r("../../..", HOME), "/");
        assert_eq!(r("/a/b/../c", HOME), "/a/c");
    }

    #[test]
    fn dotdot_at_root_is_noop() {
        assert_eq!(r("/..", "/"), "/");
        assert_eq!(r("..", "/"), "/");
    }

    #[test]
    fn repeated_and_trailing_slashes() {
        assert_eq!(r("//etc//hosts/", "/"), "/etc/hosts");
        assert_eq!(r("/", HOME), "/");
    }

    #[test]
    fn split_parent_cases() {
        assert_eq!(split_parent("/"), None);
        assert_eq!(split_parent("/etc"), Some(("/", "etc")));
        assert_eq!(split_parent("/etc/hosts"), Some(("/etc", "hosts")));
    }

    #[test]
    fn join_cases() {
        assert_eq!(join("/", "tmp"), "/tmp");
        assert_eq!(join("/tmp", "a"), "/tmp/a");
    }

    #[test]
    fn components_of_root_is_empty() {
        assert_eq!(components("/").count(), 0);
        assert_eq!(components("/a/b").collect::<Vec<_>>(), vec!["a", "b"]);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn resolve_is_idempotent(path in "[a-z./~]{0,40}") {
                let once = r(&path, HOME);
                let twice = r(&once, HOME);
                prop_assert_eq!(&once, &twice, "resolve must be idempotent");
            }

            #[test]
            fn resolve_is_absolute_and_clean(path in "[a-z./~]{0,40}") {
                let resolved = r(&path, "/tmp");
                prop_assert!(resolved.starts_with('/'));
                prop_assert!(!resolved.contains("//"), "double slash in {resolved}");
                if resolved != "/" {
                    prop_assert!(!resolved.ends_with('/'), "trailing slash in {resolved}");
                }
                prop_assert!(
                    !components(&resolved).any(|c| c == "." || c == ".."),
                    "unresolved dot component in {resolved}"
                );
            }

            #[test]
            fn never_escapes_root(ups in 1usize..20) {
                let path = vec![".."; ups].join("/");
                prop_assert_eq!(r(&path, "/a/b"), if ups >= 2 { "/" } else { "/a" });
            }
        }
    }
}
