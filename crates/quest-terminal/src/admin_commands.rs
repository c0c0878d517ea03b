//! Identity, account and ownership commands: id, groups, chmod, chown,
//! useradd, passwd, su, sudo.
//!
//! Accounts come from `/etc/passwd` in the session filesystem, so a user
//! created or removed there is seen here too. The session user always
//! exists, even after the file is gone.

use quest_types::error::{QuestError, Result};
use quest_vfs::{Permission, VirtualFileSystem};

use crate::command::{Command, CommandResult, CompletionContext, Context, check_arity};
use crate::commands::{complete_command_name, invalid_option, is_short_flags, unrecognized_option};
use crate::shell::cause;

const PASSWD: &str = "/etc/passwd";

/// Login uid/gid of the session user.
const SESSION_ID: u32 = 1000;

/// Range `useradd` allocates new uids from.
const FIRST_USER_ID: u32 = 1000;
const LAST_USER_ID: u32 = 60000;

const DEFAULT_SHELL: &str = "/bin/bash";

/// Supplementary groups of the session user.
const SESSION_GROUPS: &[(u32, &str)] = &[
    (4, "adm"),
    (24, "cdrom"),
    (27, "sudo"),
    (30, "dip"),
    (46, "plugdev"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Account {
    name: String,
    uid: u32,
    gid: u32,
}

impl Account {
    /// Primary group first, then supplementary ones.
    fn groups(&self, fs: &VirtualFileSystem) -> Vec<(u32, String)> {
        let mut groups = vec![(self.gid, self.name.clone())];
        if self.name == fs.username() {
            groups.extend(SESSION_GROUPS.iter().map(|(gid, name)| (*gid, (*name).to_string())));
        }
        groups
    }
}

/// Look up `name` in the passwd file.
fn account(fs: &VirtualFileSystem, name: &str) -> Option<Account> {
    let from_passwd = fs.cat(PASSWD).ok().and_then(|text| {
        text.lines().find_map(|line| {
            let mut fields = line.split(':');
            let login = fields.next()?;
            if login != name {
                return None;
            }
            let _password = fields.next()?;
            Some(Account {
                name: login.to_string(),
                uid: fields.next()?.parse().ok()?,
                gid: fields.next()?.parse().ok()?,
            })
        })
    });
    from_passwd.or_else(|| {
        (name == fs.username()).then(|| Account {
            name: name.to_string(),
            uid: SESSION_ID,
            gid: SESSION_ID,
        })
    })
}

fn require_account(fs: &VirtualFileSystem, name: &str) -> Result<Account> {
    account(fs, name).ok_or_else(|| QuestError::Command(format!("'{name}': no such user")))
}

/// Lowest free uid in the regular user range.
fn next_uid(fs: &VirtualFileSystem) -> u32 {
    let taken: Vec<u32> = fs
        .cat(PASSWD)
        .map(|text| {
            text.lines()
                .filter_map(|line| line.split(':').nth(2)?.parse().ok())
                .collect()
        })
        .unwrap_or_default();
    (FIRST_USER_ID..=LAST_USER_ID)
        .find(|uid| !taken.contains(uid) && *uid != SESSION_ID)
        .unwrap_or(LAST_USER_ID)
}

/// Login names: a lowercase letter or underscore, then lowercase letters,
/// digits, underscores or dashes.
fn valid_login(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        && name.len() <= 32
}

// ---------------------------------------------------------------------------
// id
// ---------------------------------------------------------------------------

struct IdCmd;
impl Command for IdCmd {
    fn name(&self) -> &str {
        "id"
    }
    fn description(&self) -> &str {
        "Print user and group ids"
    }
    fn usage(&self) -> &str {
        "id [-ugGn] [user]"
    }
    fn category(&self) -> &str {
        "admin"
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let (mut user_only, mut group_only, mut all_groups, mut names) = (false, false, false, false);
        let mut user = None;
        for &arg in args {
            match arg {
                a if a.starts_with("--") => return Err(unrecognized_option(a)),
                a if is_short_flags(a) => {
                    for flag in a[1..].chars() {
                        match flag {
                            'u' => user_only = true,
                            'g' => group_only = true,
                            'G' => all_groups = true,
                            'n' => names = true,
                            other => return Err(invalid_option(other)),
                        }
                    }
                },
                a if user.is_none() => user = Some(a),
                a => return Err(QuestError::Command(format!("extra operand '{a}'"))),
            }
        }
        if [user_only, group_only, all_groups].iter().filter(|&&on| on).count() > 1 {
            return Err(QuestError::Command(
                "cannot print \"only\" of more than one choice".to_string(),
            ));
        }

        let fs = &*ctx.fs;
        let account = require_account(fs, user.unwrap_or(fs.username()))?;
        let groups = account.groups(fs);
        let out = if user_only {
            if names { account.name.clone() } else { account.uid.to_string() }
        } else if group_only {
            if names { account.name.clone() } else { account.gid.to_string() }
        } else if all_groups {
            let shown: Vec<String> = groups
                .iter()
                .map(|(gid, name)| if names { name.clone() } else { gid.to_string() })
                .collect();
            shown.join(" ")
        } else if names {
            return Err(QuestError::Command(
                "cannot print only names or real IDs in default format".to_string(),
            ));
        } else {
            let listed: Vec<String> = groups
                .iter()
                .map(|(gid, name)| format!("{gid}({name})"))
                .collect();
            format!(
                "uid={uid}({name}) gid={gid}({name}) groups={}",
                listed.join(","),
                uid = account.uid,
                gid = account.gid,
                name = account.name,
            )
        };
        Ok(CommandResult::ok(out))
    }
}

// ---------------------------------------------------------------------------
// groups
// ---------------------------------------------------------------------------

struct GroupsCmd;
impl Command for GroupsCmd {
    fn name(&self) -> &str {
        "groups"
    }
    fn description(&self) -> &str {
        "Print the groups a user is in"
    }
    fn usage(&self) -> &str {
        "groups [user]"
    }
    fn category(&self) -> &str {
        "admin"
    }
    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let fs = &*ctx.fs;
        let account = require_account(fs, args.first().copied().unwrap_or(fs.username()))?;
        let names: Vec<String> = account.groups(fs).into_iter().map(|(_, n)| n).collect();
        Ok(CommandResult::ok(format!("{} : {}", account.name, names.join(" "))))
    }
}

// ---------------------------------------------------------------------------
// chmod
// ---------------------------------------------------------------------------

/// Split `-R`/`--recursive` from the operands. Anything else starting with
/// a dash is an operand, so symbolic modes like `-x` pass through.
fn split_recursive<'a>(args: &[&'a str]) -> (bool, Vec<&'a str>) {
    let mut recursive = false;
    let mut operands = Vec::new();
    for &arg in args {
        match arg {
            "-R" | "--recursive" => recursive = true,
            a => operands.push(a),
        }
    }
    (recursive, operands)
}

enum ModeChange<'a> {
    Absolute(Permission),
    Symbolic(&'a str),
}

impl ModeChange<'_> {
    fn apply(&self, current: Permission) -> Permission {
        match self {
            Self::Absolute(p) => *p,
            Self::Symbolic(expr) => current.apply_symbolic(expr).unwrap_or(current),
        }
    }
}

struct ChmodCmd;
impl Command for ChmodCmd {
    fn name(&self) -> &str {
        "chmod"
    }
    fn description(&self) -> &str {
        "Change file mode bits"
    }
    fn usage(&self) -> &str {
        "chmod [-R] <mode> <file>..."
    }
    fn category(&self) -> &str {
        "admin"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let (recursive, operands) = split_recursive(args);
        let Some((&mode, files)) = operands.split_first() else {
            return Err(QuestError::Command("missing operand".to_string()));
        };
        if files.is_empty() {
            return Err(QuestError::Command(format!("missing operand after '{mode}'")));
        }

        let change = match Permission::parse_mode(mode) {
            Some(p) => ModeChange::Absolute(p),
            None if Permission::empty().apply_symbolic(mode).is_some() => ModeChange::Symbolic(mode),
            None => return Err(QuestError::Command(format!("invalid mode: '{mode}'"))),
        };

        let mut errors = Vec::new();
        for &file in files {
            if let Err(e) = ctx.fs.update_permissions(file, recursive, |p| change.apply(p)) {
                errors.push(format!("chmod: cannot access '{}': {}", e.path(), e.reason()));
            }
        }
        if errors.is_empty() {
            Ok(CommandResult::empty())
        } else {
            Ok(CommandResult::fail(errors.join("\n")))
        }
    }
}

// ---------------------------------------------------------------------------
// chown
// ---------------------------------------------------------------------------

struct ChownCmd;
impl Command for ChownCmd {
    fn name(&self) -> &str {
        "chown"
    }
    fn description(&self) -> &str {
        "Change file owner and group"
    }
    fn usage(&self) -> &str {
        "chown [-R] <owner>[:group] <file>..."
    }
    fn category(&self) -> &str {
        "admin"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let (recursive, operands) = split_recursive(args);
        let Some((&spec, files)) = operands.split_first() else {
            return Err(QuestError::Command("missing operand".to_string()));
        };
        if files.is_empty() {
            return Err(QuestError::Command(format!("missing operand after '{spec}'")));
        }

        let (owner, group) = match spec.split_once(':') {
            // `user:` means the user's login group.
            Some((owner, "")) => (owner, Some(owner)),
            Some((owner, group)) => (owner, Some(group)),
            None => (spec, None),
        };
        if owner.is_empty() || group.is_some_and(|g| g.contains(':')) {
            return Err(QuestError::Command(format!("invalid spec: '{spec}'")));
        }

        let mut errors = Vec::new();
        for &file in files {
            if let Err(e) = ctx.fs.set_owner(file, owner, group, recursive) {
                errors.push(format!("chown: cannot access '{}': {}", e.path(), e.reason()));
            }
        }
        if errors.is_empty() {
            Ok(CommandResult::empty())
        } else {
            Ok(CommandResult::fail(errors.join("\n")))
        }
    }
}

// ---------------------------------------------------------------------------
// useradd
// ---------------------------------------------------------------------------

struct UseraddCmd;
impl Command for UseraddCmd {
    fn name(&self) -> &str {
        "useradd"
    }
    fn aliases(&self) -> &'static [&'static str] {
        &["adduser"]
    }
    fn description(&self) -> &str {
        "Create a user account"
    }
    fn usage(&self) -> &str {
        "useradd [-m] [-d home] [-s shell] [-G groups] <user>"
    }
    fn category(&self) -> &str {
        "admin"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let mut create_home = false;
        let mut home = None;
        let mut shell = DEFAULT_SHELL;
        let mut login = None;
        let mut rest = args.iter().copied();
        while let Some(arg) = rest.next() {
            match arg {
                "-m" | "--create-home" => create_home = true,
                "-d" | "--home-dir" | "-s" | "--shell" | "-G" | "--groups" => {
                    let value = rest.next().ok_or_else(|| {
                        QuestError::Command(format!("option '{arg}' requires an argument"))
                    })?;
                    match arg {
                        "-d" | "--home-dir" => home = Some(value.to_string()),
                        "-s" | "--shell" => shell = value,
                        // Supplementary groups are not tracked per account.
                        _ => {},
                    }
                },
                a if a.starts_with("--") => return Err(unrecognized_option(a)),
                a if is_short_flags(a) => return Err(invalid_option(a[1..].chars().next().unwrap_or('-'))),
                a if login.is_none() => login = Some(a),
                a => return Err(QuestError::Command(format!("extra operand '{a}'"))),
            }
        }
        let login = login.ok_or_else(|| QuestError::Command("missing user name".to_string()))?;
        if !valid_login(login) {
            return Err(QuestError::Command(format!("invalid user name '{login}'")));
        }
        if account(ctx.fs, login).is_some() {
            return Err(QuestError::Command(format!("user '{login}' already exists")));
        }

        let uid = next_uid(ctx.fs);
        let home = home.unwrap_or_else(|| format!("/home/{login}"));
        let entry = format!("{login}:x:{uid}:{uid}:{login}:{home}:{shell}\n");
        ctx.fs.write(PASSWD, &entry, true)?;
        if create_home && !ctx.fs.exists(&home) {
            ctx.fs.mkdir(&home, true)?;
            ctx.fs.set_owner(&home, login, Some(login), false)?;
        }
        log::info!("created account {login} (uid {uid})");
        Ok(CommandResult::empty())
    }
}

// ---------------------------------------------------------------------------
// passwd
// ---------------------------------------------------------------------------

struct PasswdCmd;
impl Command for PasswdCmd {
    fn name(&self) -> &str {
        "passwd"
    }
    fn description(&self) -> &str {
        "Change a user's password"
    }
    fn usage(&self) -> &str {
        "passwd [user]"
    }
    fn category(&self) -> &str {
        "admin"
    }
    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let name = args.first().copied().unwrap_or(ctx.fs.username());
        if account(ctx.fs, name).is_none() {
            return Err(QuestError::Command(format!("user '{name}' does not exist")));
        }
        // Passwords are never read; the dialogue is replayed as typed.
        let lines = [
            format!("Changing password for {name}."),
            "Current password: ".to_string(),
            "New password: ".to_string(),
            "Retype new password: ".to_string(),
            "passwd: password updated successfully".to_string(),
        ];
        Ok(CommandResult::ok(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// su
// ---------------------------------------------------------------------------

struct SuCmd;
impl Command for SuCmd {
    fn name(&self) -> &str {
        "su"
    }
    fn description(&self) -> &str {
        "Switch to another user"
    }
    fn usage(&self) -> &str {
        "su [-] [user]"
    }
    fn category(&self) -> &str {
        "admin"
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let mut target = None;
        for &arg in args {
            match arg {
                "-" | "-l" | "--login" => {},
                a if a.starts_with("--") => return Err(unrecognized_option(a)),
                a if is_short_flags(a) => return Err(invalid_option(a[1..].chars().next().unwrap_or('-'))),
                a if target.is_none() => target = Some(a),
                a => return Err(QuestError::Command(format!("extra operand '{a}'"))),
            }
        }
        let target = target.unwrap_or("root");
        if account(ctx.fs, target).is_none() {
            return Err(QuestError::Command(format!("user {target} does not exist")));
        }
        if target == ctx.fs.username() {
            return Ok(CommandResult::empty());
        }
        // No other account has a known password; `sudo` is the way up.
        Ok(CommandResult::fail("Password: \nsu: Authentication failure"))
    }
    fn autocomplete(&self, _: &str, _: &[&str], _: &CompletionContext<'_>) -> Vec<String> {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// sudo
// ---------------------------------------------------------------------------

struct SudoCmd;
impl Command for SudoCmd {
    fn name(&self) -> &str {
        "sudo"
    }
    fn description(&self) -> &str {
        "Run a command as root"
    }
    fn usage(&self) -> &str {
        "sudo [-l] <command> [args...]"
    }
    fn category(&self) -> &str {
        "admin"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let Some((&name, rest)) = args.split_first() else {
            return Err(QuestError::Command("a command is required".to_string()));
        };
        match name {
            "-l" | "--list" => {
                let lines = [
                    format!(
                        "User {} may run the following commands on {}:",
                        ctx.fs.username(),
                        ctx.fs.hostname()
                    ),
                    "    (ALL : ALL) ALL".to_string(),
                ];
                return Ok(CommandResult::ok(lines.join("\n")));
            },
            "-i" | "-s" | "--login" | "--shell" => {
                return Err(QuestError::Command(
                    "interactive root shells are not available; use 'sudo <command>'".to_string(),
                ));
            },
            a if a.starts_with("--") => return Err(unrecognized_option(a)),
            a if is_short_flags(a) => return Err(invalid_option(a[1..].chars().next().unwrap_or('-'))),
            _ => {},
        }

        let registry = ctx.registry;
        let cmd = registry
            .get(name)
            .ok_or_else(|| QuestError::Command(format!("{name}: command not found")))?;
        // Identity queries report the elevated user.
        let mut inner: Vec<&str> = rest.to_vec();
        match cmd.name() {
            "whoami" if inner.is_empty() => return Ok(CommandResult::ok("root")),
            "id" | "groups" if inner.iter().all(|a| a.starts_with('-')) => inner.push("root"),
            _ => {},
        }
        if let Some(violation) = check_arity(cmd, &inner) {
            return Ok(CommandResult::fail(violation));
        }
        log::debug!("sudo {name} {}", inner.join(" "));
        match cmd.execute(&inner, ctx) {
            Ok(result) => Ok(result),
            Err(e) => Ok(CommandResult::fail(format!("{name}: {}", cause(&e)))),
        }
    }
    fn autocomplete(&self, partial: &str, args: &[&str], ctx: &CompletionContext<'_>) -> Vec<String> {
        if args.is_empty() {
            complete_command_name(partial, ctx)
        } else {
            crate::command::complete_path(ctx.fs, partial, false)
        }
    }
}

/// Register identity, account and ownership commands.
pub fn register_admin_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(IdCmd));
    reg.register(Box::new(GroupsCmd));
    reg.register(Box::new(ChmodCmd));
    reg.register(Box::new(ChownCmd));
    reg.register(Box::new(UseraddCmd));
    reg.register(Box::new(PasswdCmd));
    reg.register(Box::new(SuCmd));
    reg.register(Box::new(SudoCmd));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shell;

    fn setup() -> Shell {
        Shell::new(VirtualFileSystem::default())
    }

    fn exec(sh: &mut Shell, line: &str) -> String {
        let r = sh.execute(line);
        assert!(r.success, "`{line}` failed: {}", r.error);
        r.output
    }

    fn fail(sh: &mut Shell, line: &str) -> String {
        let r = sh.execute(line);
        assert!(!r.success, "`{line}` unexpectedly succeeded");
        r.error
    }

    fn mode(sh: &Shell, path: &str) -> u16 {
        sh.fs().node(path).unwrap().permissions.to_octal()
    }

    #[test]
    fn account_from_passwd() {
        let fs = VirtualFileSystem::default();
        assert_eq!(
            account(&fs, "root"),
            Some(Account { name: "root".into(), uid: 0, gid: 0 })
        );
        assert_eq!(account(&fs, "user").map(|a| a.uid), Some(1000));
        assert_eq!(account(&fs, "nobody").map(|a| a.gid), Some(65534));
        assert!(account(&fs, "mallory").is_none());
    }

    #[test]
    fn session_user_survives_missing_passwd() {
        let mut fs = VirtualFileSystem::default();
        fs.rm("/etc/passwd", false, false).unwrap();
        assert_eq!(account(&fs, "user").map(|a| a.uid), Some(1000));
        assert!(account(&fs, "root").is_none());
    }

    #[test]
    fn id_default() {
        let mut sh = setup();
        assert_eq!(
            exec(&mut sh, "id"),
            "uid=1000(user) gid=1000(user) groups=1000(user),4(adm),24(cdrom),27(sudo),30(dip),46(plugdev)"
        );
        assert_eq!(exec(&mut sh, "id root"), "uid=0(root) gid=0(root) groups=0(root)");
    }

    #[test]
    fn id_flags() {
        let mut sh = setup();
        assert_eq!(exec(&mut sh, "id -u"), "1000");
        assert_eq!(exec(&mut sh, "id -un"), "user");
        assert_eq!(exec(&mut sh, "id -g root"), "0");
        assert_eq!(exec(&mut sh, "id -Gn"), "user adm cdrom sudo dip plugdev");
        assert_eq!(
            fail(&mut sh, "id -n"),
            "id: cannot print only names or real IDs in default format"
        );
        assert_eq!(fail(&mut sh, "id ghost"), "id: 'ghost': no such user");
    }

    #[test]
    fn groups_output() {
        let mut sh = setup();
        assert_eq!(exec(&mut sh, "groups"), "user : user adm cdrom sudo dip plugdev");
        assert_eq!(exec(&mut sh, "groups daemon"), "daemon : daemon");
    }

    #[test]
    fn chmod_octal_and_symbolic() {
        let mut sh = setup();
        exec(&mut sh, "touch run.sh");
        exec(&mut sh, "chmod 755 run.sh");
        assert_eq!(mode(&sh, "run.sh"), 0o755);
        exec(&mut sh, "chmod go-rx run.sh");
        assert_eq!(mode(&sh, "run.sh"), 0o700);
        exec(&mut sh, "chmod -x run.sh");
        assert_eq!(mode(&sh, "run.sh"), 0o600);
        exec(&mut sh, "chmod a=r,u+w run.sh");
        assert_eq!(mode(&sh, "run.sh"), 0o644);
        let listing = exec(&mut sh, "ls -l run.sh");
        assert!(listing.lines().nth(1).unwrap().starts_with("-rw-r--r--"));
    }

    #[test]
    fn chmod_recursive() {
        let mut sh = setup();
        exec(&mut sh, "chmod -R 700 Documents");
        assert_eq!(mode(&sh, "Documents"), 0o700);
        assert_eq!(mode(&sh, "Documents/notes.txt"), 0o700);
        exec(&mut sh, "chmod 755 Documents");
        assert_eq!(mode(&sh, "Documents/notes.txt"), 0o700);
    }

    #[test]
    fn chmod_errors() {
        let mut sh = setup();
        assert_eq!(fail(&mut sh, "chmod 999 .bashrc"), "chmod: invalid mode: '999'");
        assert_eq!(fail(&mut sh, "chmod -R 755"), "chmod: missing operand after '755'");
        assert_eq!(
            fail(&mut sh, "chmod 644 ghost"),
            "chmod: cannot access 'ghost': No such file or directory"
        );
        assert_eq!(fail(&mut sh, "chmod 644"), "chmod: missing operand");
    }

    #[test]
    fn chown_owner_and_group() {
        let mut sh = setup();
        exec(&mut sh, "chown root .bashrc");
        let node = sh.fs().node(".bashrc").unwrap();
        assert_eq!((node.owner.as_str(), node.group.as_str()), ("root", "user"));

        exec(&mut sh, "chown -R root:staff Documents");
        let notes = sh.fs().node("Documents/notes.txt").unwrap();
        assert_eq!((notes.owner.as_str(), notes.group.as_str()), ("root", "staff"));

        exec(&mut sh, "chown user: Documents");
        let docs = sh.fs().node("Documents").unwrap();
        assert_eq!((docs.owner.as_str(), docs.group.as_str()), ("user", "user"));
    }

    #[test]
    fn useradd_appends_passwd_entry() {
        let mut sh = setup();
        assert_eq!(exec(&mut sh, "useradd -m testuser"), "");
        let passwd = sh.fs().cat("/etc/passwd").unwrap();
        assert!(passwd.ends_with("testuser:x:1001:1001:testuser:/home/testuser:/bin/bash\n"));
        let home = sh.fs().node("/home/testuser").unwrap();
        assert!(home.is_dir);
        assert_eq!((home.owner.as_str(), home.group.as_str()), ("testuser", "testuser"));
        assert_eq!(exec(&mut sh, "id testuser"), "uid=1001(testuser) gid=1001(testuser) groups=1001(testuser)");

        exec(&mut sh, "adduser -s /bin/sh web");
        assert_eq!(exec(&mut sh, "id -u web"), "1002");
        assert!(!sh.fs().exists("/home/web"));
    }

    #[test]
    fn useradd_errors() {
        let mut sh = setup();
        assert_eq!(fail(&mut sh, "useradd root"), "useradd: user 'root' already exists");
        assert_eq!(fail(&mut sh, "useradd Bad!Name"), "useradd: invalid user name 'Bad!Name'");
        assert_eq!(fail(&mut sh, "useradd -m"), "useradd: missing user name");
        assert_eq!(fail(&mut sh, "useradd -s"), "useradd: option '-s' requires an argument");
        assert_eq!(fail(&mut sh, "useradd -x bob"), "useradd: invalid option -- 'x'");
    }

    #[test]
    fn passwd_dialogue() {
        let mut sh = setup();
        let out = exec(&mut sh, "passwd");
        assert!(out.starts_with("Changing password for user."));
        assert!(out.ends_with("passwd: password updated successfully"));
        assert!(exec(&mut sh, "passwd root").starts_with("Changing password for root."));
        assert_eq!(fail(&mut sh, "passwd ghost"), "passwd: user 'ghost' does not exist");
    }

    #[test]
    fn su_needs_a_password() {
        let mut sh = setup();
        assert_eq!(exec(&mut sh, "su user"), "");
        assert_eq!(fail(&mut sh, "su -"), "Password: \nsu: Authentication failure");
        assert_eq!(fail(&mut sh, "su ghost"), "su: user ghost does not exist");
    }

    #[test]
    fn sudo_list_and_identity() {
        let mut sh = setup();
        assert_eq!(
            exec(&mut sh, "sudo -l"),
            "User user may run the following commands on quest:\n    (ALL : ALL) ALL"
        );
        assert_eq!(exec(&mut sh, "sudo whoami"), "root");
        assert_eq!(exec(&mut sh, "sudo id"), "uid=0(root) gid=0(root) groups=0(root)");
        assert_eq!(exec(&mut sh, "sudo id -u"), "0");
        assert_eq!(exec(&mut sh, "sudo id user"), exec(&mut sh, "id user"));
    }

    #[test]
    fn sudo_runs_the_named_command() {
        let mut sh = setup();
        exec(&mut sh, "sudo useradd -m testuser");
        assert!(sh.fs().is_dir("/home/testuser"));
        assert_eq!(exec(&mut sh, "sudo echo hi"), "hi");
        assert_eq!(fail(&mut sh, "sudo frob"), "sudo: frob: command not found");
        assert_eq!(fail(&mut sh, "sudo mkdir"), "mkdir: missing operand");
        assert_eq!(
            fail(&mut sh, "sudo cat /nope"),
            "cat: /nope: No such file or directory"
        );
        assert!(fail(&mut sh, "sudo -i").starts_with("sudo: interactive root shells"));
    }

    #[test]
    fn chown_errors() {
        let mut sh = setup();
        assert_eq!(fail(&mut sh, "chown :staff .bashrc"), "chown: invalid spec: ':staff'");
        assert_eq!(
            fail(&mut sh, "chown root ghost"),
            "chown: cannot access 'ghost': No such file or directory"
        );
    }
}
