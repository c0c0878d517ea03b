//! Process, service and resource commands: ps, kill, service, df, du,
//! free, top, uptime.
//!
//! There are no real processes behind the session. Process, service and
//! memory figures come from fixed tables so every run prints the same thing;
//! `du` is the exception and measures the session filesystem.

use chrono::Local;
use quest_types::error::{QuestError, Result};
use quest_vfs::{FileNode, VirtualFileSystem, path};

use crate::command::{Command, CommandResult, CompletionContext, Context};
use crate::commands::{invalid_option, is_short_flags, unrecognized_option};

/// Who a simulated process runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    Root,
    Session,
}

impl Owner {
    fn name<'a>(self, fs: &'a VirtualFileSystem) -> &'a str {
        match self {
            Self::Root => "root",
            Self::Session => fs.username(),
        }
    }
}

struct Process {
    pid: u32,
    ppid: u32,
    owner: Owner,
    tty: &'static str,
    cpu: &'static str,
    mem: &'static str,
    time: &'static str,
    comm: &'static str,
    cmdline: &'static str,
}

const PROCESSES: &[Process] = &[
    Process { pid: 1, ppid: 0, owner: Owner::Root, tty: "?", cpu: "0.0", mem: "0.1", time: "00:00:02", comm: "systemd", cmdline: "/sbin/init" },
    Process { pid: 2, ppid: 0, owner: Owner::Root, tty: "?", cpu: "0.0", mem: "0.0", time: "00:00:00", comm: "kthreadd", cmdline: "[kthreadd]" },
    Process { pid: 127, ppid: 1, owner: Owner::Root, tty: "?", cpu: "0.0", mem: "0.2", time: "00:00:01", comm: "systemd-journal", cmdline: "/lib/systemd/systemd-journald" },
    Process { pid: 298, ppid: 1, owner: Owner::Root, tty: "?", cpu: "0.0", mem: "0.3", time: "00:00:03", comm: "NetworkManager", cmdline: "/usr/sbin/NetworkManager --no-daemon" },
    Process { pid: 312, ppid: 1, owner: Owner::Root, tty: "?", cpu: "0.0", mem: "0.1", time: "00:00:00", comm: "sshd", cmdline: "/usr/sbin/sshd -D" },
    Process { pid: 456, ppid: 1, owner: Owner::Root, tty: "?", cpu: "0.0", mem: "0.1", time: "00:00:00", comm: "cron", cmdline: "/usr/sbin/cron -f" },
    Process { pid: 512, ppid: 312, owner: Owner::Session, tty: "pts/0", cpu: "0.1", mem: "1.2", time: "00:00:00", comm: "bash", cmdline: "-bash" },
    Process { pid: 1024, ppid: 512, owner: Owner::Session, tty: "pts/0", cpu: "0.2", mem: "0.8", time: "00:00:01", comm: "quest", cmdline: "quest" },
];

/// Pid reported for the `ps` invocation itself.
const PS_PID: u32 = 1025;

/// Unlisted pids at or above this belong to the session user's jobs.
const FIRST_JOB_PID: u32 = 1000;

const UPTIME: &str = "5 days,  2:30";
const LOAD_AVERAGE: &str = "0.15, 0.10, 0.05";

// ---------------------------------------------------------------------------
// ps
// ---------------------------------------------------------------------------

struct PsCmd;
impl Command for PsCmd {
    fn name(&self) -> &str {
        "ps"
    }
    fn description(&self) -> &str {
        "Report running processes"
    }
    fn usage(&self) -> &str {
        "ps [aux] [-ef]"
    }
    fn category(&self) -> &str {
        "process"
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        // BSD-style `aux`, or dash flags `-e` (every process) and `-f` (full).
        let (mut bsd, mut every, mut full) = (false, false, false);
        for &arg in args {
            if let Some(flags) = arg.strip_prefix('-').filter(|_| is_short_flags(arg)) {
                for flag in flags.chars() {
                    match flag {
                        'e' | 'A' => every = true,
                        'f' => full = true,
                        other => return Err(invalid_option(other)),
                    }
                }
            } else if arg.starts_with("--") {
                return Err(unrecognized_option(arg));
            } else if !arg.is_empty() && arg.chars().all(|c| matches!(c, 'a' | 'u' | 'x')) {
                bsd = true;
            } else {
                return Err(QuestError::Command(format!("unsupported option '{arg}'")));
            }
        }

        let fs = &*ctx.fs;
        let own_cmdline = std::iter::once("ps").chain(args.iter().copied()).collect::<Vec<_>>().join(" ");
        let ps = Process {
            pid: PS_PID,
            ppid: 512,
            owner: Owner::Session,
            tty: "pts/0",
            cpu: "0.0",
            mem: "0.1",
            time: "00:00:00",
            comm: "ps",
            cmdline: "",
        };
        let mut rows: Vec<(&Process, &str)> = PROCESSES.iter().map(|p| (p, p.cmdline)).collect();
        rows.push((&ps, own_cmdline.as_str()));
        if !(bsd || every) {
            rows.retain(|(p, _)| p.tty != "?");
        }

        let mut lines = Vec::new();
        if bsd {
            lines.push(format!("{:<10} {:>6} {:>4} {:>4} {:<8} COMMAND", "USER", "PID", "%CPU", "%MEM", "TTY"));
            for (p, cmdline) in &rows {
                lines.push(format!(
                    "{:<10} {:>6} {:>4} {:>4} {:<8} {cmdline}",
                    p.owner.name(fs),
                    p.pid,
                    p.cpu,
                    p.mem,
                    p.tty
                ));
            }
        } else if full {
            lines.push(format!("{:<8} {:>7} {:>7} {:<8} {:>8} CMD", "UID", "PID", "PPID", "TTY", "TIME"));
            for (p, cmdline) in &rows {
                lines.push(format!(
                    "{:<8} {:>7} {:>7} {:<8} {:>8} {cmdline}",
                    p.owner.name(fs),
                    p.pid,
                    p.ppid,
                    p.tty,
                    p.time
                ));
            }
        } else {
            lines.push(format!("{:>7} {:<8} {:>8} CMD", "PID", "TTY", "TIME"));
            for (p, _) in &rows {
                lines.push(format!("{:>7} {:<8} {:>8} {}", p.pid, p.tty, p.time, p.comm));
            }
        }
        Ok(CommandResult::ok(lines.join("\n")))
    }
    fn autocomplete(&self, _: &str, _: &[&str], _: &CompletionContext<'_>) -> Vec<String> {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// kill
// ---------------------------------------------------------------------------

const SIGNALS: &[(u32, &str)] = &[
    (1, "HUP"),
    (2, "INT"),
    (3, "QUIT"),
    (9, "KILL"),
    (15, "TERM"),
    (18, "CONT"),
    (19, "STOP"),
];

/// Signal named by `spec`: a number, a name, or a `SIG`-prefixed name.
fn signal(spec: &str) -> Option<(u32, &'static str)> {
    let upper = spec.to_ascii_uppercase();
    let name = upper.strip_prefix("SIG").unwrap_or(&upper);
    SIGNALS
        .iter()
        .copied()
        .find(|(num, sig)| *sig == name || spec.parse::<u32>().is_ok_and(|n| n == *num))
}

struct KillCmd;
impl Command for KillCmd {
    fn name(&self) -> &str {
        "kill"
    }
    fn description(&self) -> &str {
        "Send a signal to a process"
    }
    fn usage(&self) -> &str {
        "kill [-s signal | -signal] <pid>... | kill -l"
    }
    fn category(&self) -> &str {
        "process"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        if args == ["-l"] || args == ["-L"] {
            let listed: Vec<String> = SIGNALS
                .iter()
                .map(|(num, name)| format!("{num:>2}) SIG{name}"))
                .collect();
            return Ok(CommandResult::ok(listed.join("\n")));
        }

        let mut sig = (15, "TERM");
        let mut pids = Vec::new();
        let mut rest = args.iter().copied();
        while let Some(arg) = rest.next() {
            let spec = match arg {
                "-s" => Some(rest.next().ok_or_else(|| {
                    QuestError::Command("option requires an argument -- 's'".to_string())
                })?),
                a if a.len() > 1 && a.starts_with('-') => Some(&a[1..]),
                _ => None,
            };
            if let Some(spec) = spec {
                sig = signal(spec).ok_or_else(|| {
                    QuestError::Command(format!("{spec}: invalid signal specification"))
                })?;
                continue;
            }
            let pid = arg.parse::<u32>().map_err(|_| {
                QuestError::Command(format!("{arg}: arguments must be process or job IDs"))
            })?;
            pids.push(pid);
        }
        if pids.is_empty() {
            return Err(QuestError::Command(format!("usage: {}", self.usage())));
        }

        let (mut sent, mut errors) = (Vec::new(), Vec::new());
        for pid in pids {
            match PROCESSES.iter().find(|p| p.pid == pid) {
                Some(p) if p.owner == Owner::Root => {
                    errors.push(format!("kill: ({pid}) - Operation not permitted"));
                },
                None if pid < FIRST_JOB_PID => {
                    errors.push(format!("kill: ({pid}) - No such process"));
                },
                _ => sent.push(format!("[{pid}] SIG{}", sig.1)),
            }
        }
        log::debug!("kill by {}: sent {}, refused {}", ctx.fs.username(), sent.len(), errors.len());
        if errors.is_empty() {
            Ok(CommandResult::ok(sent.join("\n")))
        } else {
            Ok(CommandResult::fail(errors.join("\n")))
        }
    }
    fn autocomplete(&self, _: &str, _: &[&str], _: &CompletionContext<'_>) -> Vec<String> {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// service / systemctl
// ---------------------------------------------------------------------------

struct Service {
    names: &'static [&'static str],
    description: &'static str,
    /// Main process, for running services.
    main: Option<(u32, &'static str)>,
}

const SERVICES: &[Service] = &[
    Service { names: &["ssh", "sshd"], description: "OpenBSD Secure Shell server", main: Some((312, "sshd")) },
    Service { names: &["cron"], description: "Regular background program processing daemon", main: Some((456, "cron")) },
    Service { names: &["NetworkManager"], description: "Network Manager", main: Some((298, "NetworkManager")) },
    Service { names: &["nginx"], description: "A high performance web server and a reverse proxy server", main: None },
    Service { names: &["apache2"], description: "The Apache HTTP Server", main: None },
    Service { names: &["mysql"], description: "MySQL Community Server", main: None },
    Service { names: &["postgresql"], description: "PostgreSQL RDBMS", main: None },
];

const ACTIONS: &[&str] = &["start", "stop", "restart", "status"];

struct ServiceCmd;
impl Command for ServiceCmd {
    fn name(&self) -> &str {
        "service"
    }
    fn aliases(&self) -> &'static [&'static str] {
        &["systemctl"]
    }
    fn description(&self) -> &str {
        "Control system services"
    }
    fn usage(&self) -> &str {
        "service <name> start|stop|restart|status | systemctl <action> <name>"
    }
    fn category(&self) -> &str {
        "process"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
    fn execute(&self, args: &[&str], _ctx: &mut Context<'_>) -> Result<CommandResult> {
        // Both `service ssh status` and `systemctl status ssh` orders.
        let (action, name) = match args {
            [action, rest @ ..] if ACTIONS.contains(action) => (*action, rest.first().copied()),
            [name, action] => (*action, Some(*name)),
            [name] => ("status", Some(*name)),
            _ => return Err(QuestError::Command("missing service name".to_string())),
        };
        if !ACTIONS.contains(&action) {
            return Err(QuestError::Command(format!("unrecognized action '{action}'")));
        }
        let name = name.ok_or_else(|| QuestError::Command("missing service name".to_string()))?;
        let name = name.strip_suffix(".service").unwrap_or(name);
        let service = SERVICES
            .iter()
            .find(|s| s.names.contains(&name))
            .ok_or_else(|| QuestError::Command(format!("Unit {name}.service could not be found.")))?;
        let unit = service.names[0];

        let out = match (action, service.main) {
            ("status", main) => {
                let mut lines = vec![
                    format!("● {unit}.service - {}", service.description),
                    format!("     Loaded: loaded (/lib/systemd/system/{unit}.service; enabled)"),
                ];
                match main {
                    Some((pid, comm)) => {
                        lines.push("     Active: active (running)".to_string());
                        lines.push(format!("   Main PID: {pid} ({comm})"));
                    },
                    None => lines.push("     Active: inactive (dead)".to_string()),
                }
                lines.join("\n")
            },
            ("start", Some(_)) => format!("{unit} is already running"),
            ("stop", None) => format!("{unit} is not running"),
            ("start", None) => format!("Starting {unit}: done"),
            ("stop", Some(_)) => format!("Stopping {unit}: done"),
            _ => format!("Restarting {unit}: done"),
        };
        Ok(CommandResult::ok(out))
    }
    fn autocomplete(&self, partial: &str, _: &[&str], _: &CompletionContext<'_>) -> Vec<String> {
        SERVICES
            .iter()
            .flat_map(|s| s.names.iter())
            .chain(ACTIONS)
            .filter(|n| n.starts_with(partial))
            .map(|n| (*n).to_string())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// df / du / free
// ---------------------------------------------------------------------------

/// A size in KiB rendered the way `-h` does: one decimal below ten,
/// rounded up, with a unit suffix.
fn human_size(kib: u64) -> String {
    if kib == 0 {
        return "0".to_string();
    }
    let mut value = kib as f64;
    let mut units = ["K", "M", "G", "T"].iter();
    let mut unit = units.next().copied().unwrap_or("K");
    while value >= 1024.0 {
        match units.next() {
            Some(next) => {
                value /= 1024.0;
                unit = next;
            },
            None => break,
        }
    }
    let tenths = (value * 10.0).ceil() / 10.0;
    if tenths < 10.0 {
        format!("{tenths:.1}{unit}")
    } else {
        format!("{}{unit}", value.ceil())
    }
}

struct Mount {
    device: &'static str,
    size: u64,
    used: u64,
    avail: u64,
    target: &'static str,
}

impl Mount {
    /// Percent used, rounded up, the way `df` counts it.
    fn use_percent(&self) -> u64 {
        (self.used * 100).div_ceil(self.used + self.avail)
    }
}

/// Mounted filesystems, sizes in KiB.
const MOUNTS: &[Mount] = &[
    Mount { device: "/dev/sda1", size: 52_428_800, used: 12_582_912, avail: 36_700_160, target: "/" },
    Mount { device: "/dev/sda2", size: 209_715_200, used: 83_886_080, avail: 115_343_360, target: "/home" },
    Mount { device: "tmpfs", size: 4_194_304, used: 1_258_291, avail: 2_936_013, target: "/tmp" },
];

/// Collect single-letter flags, rejecting anything outside `allowed`.
fn short_flags(args: &[&str], allowed: &str) -> Result<(String, Vec<String>)> {
    let mut flags = String::new();
    let mut operands = Vec::new();
    for &arg in args {
        if arg.starts_with("--") {
            return Err(unrecognized_option(arg));
        } else if is_short_flags(arg) {
            for flag in arg[1..].chars() {
                if !allowed.contains(flag) {
                    return Err(invalid_option(flag));
                }
                flags.push(flag);
            }
        } else {
            operands.push(arg.to_string());
        }
    }
    Ok((flags, operands))
}

/// Map a long option onto its short letter.
fn long_to_short<'a>(args: &[&'a str], table: &[(&str, &'a str)]) -> Vec<&'a str> {
    args.iter()
        .map(|&arg| {
            table
                .iter()
                .find(|(long, _)| *long == arg)
                .map_or(arg, |(_, short)| *short)
        })
        .collect()
}

struct DfCmd;
impl Command for DfCmd {
    fn name(&self) -> &str {
        "df"
    }
    fn description(&self) -> &str {
        "Report filesystem disk space usage"
    }
    fn usage(&self) -> &str {
        "df [-h]"
    }
    fn category(&self) -> &str {
        "process"
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let args = long_to_short(args, &[("--human-readable", "-h")]);
        let (flags, operands) = short_flags(&args, "hk")?;
        let mounts: Vec<&Mount> = if operands.is_empty() {
            MOUNTS.iter().collect()
        } else {
            let mut picked = Vec::new();
            for operand in &operands {
                if !ctx.fs.exists(operand) {
                    return Err(QuestError::Command(format!("{operand}: No such file or directory")));
                }
                // The mount holding the path is the longest matching target.
                let abs = ctx.fs.resolve(operand);
                let mount = MOUNTS
                    .iter()
                    .filter(|m| abs == m.target || path::is_below(&abs, m.target))
                    .max_by_key(|m| m.target.len())
                    .ok_or_else(|| QuestError::Command(format!("{operand}: No such file or directory")))?;
                picked.push(mount);
            }
            picked
        };

        let human = flags.contains('h');
        let mut lines = Vec::new();
        if human {
            lines.push(format!("{:<14} {:>5} {:>5} {:>5} {:>4} Mounted on", "Filesystem", "Size", "Used", "Avail", "Use%"));
        } else {
            lines.push(format!("{:<14} {:>10} {:>10} {:>10} {:>4} Mounted on", "Filesystem", "1K-blocks", "Used", "Available", "Use%"));
        }
        for m in mounts {
            let pct = format!("{}%", m.use_percent());
            if human {
                lines.push(format!(
                    "{:<14} {:>5} {:>5} {:>5} {:>4} {}",
                    m.device,
                    human_size(m.size),
                    human_size(m.used),
                    human_size(m.avail),
                    pct,
                    m.target
                ));
            } else {
                lines.push(format!(
                    "{:<14} {:>10} {:>10} {:>10} {:>4} {}",
                    m.device, m.size, m.used, m.avail, pct, m.target
                ));
            }
        }
        Ok(CommandResult::ok(lines.join("\n")))
    }
}

/// Disk usage of a subtree in KiB: 4 per directory, files rounded up to
/// whole 4 KiB blocks. Directories are recorded in `rows` after their
/// contents, as `du` lists them.
fn disk_usage(node: &FileNode, shown: &str, rows: &mut Vec<(u64, String)>) -> u64 {
    if !node.is_dir {
        let blocks = (node.size() as u64).div_ceil(4096);
        return blocks * 4;
    }
    let mut total = 4;
    for child in node.children() {
        let child_shown = if shown.ends_with('/') {
            format!("{shown}{}", child.name)
        } else {
            format!("{shown}/{}", child.name)
        };
        total += disk_usage(child, &child_shown, rows);
    }
    rows.push((total, shown.to_string()));
    total
}

struct DuCmd;
impl Command for DuCmd {
    fn name(&self) -> &str {
        "du"
    }
    fn description(&self) -> &str {
        "Estimate file space usage"
    }
    fn usage(&self) -> &str {
        "du [-hs] [path]..."
    }
    fn category(&self) -> &str {
        "process"
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let args = long_to_short(args, &[("--human-readable", "-h"), ("--summarize", "-s")]);
        let (flags, mut operands) = short_flags(&args, "hsk")?;
        if operands.is_empty() {
            operands.push(".".to_string());
        }
        let human = flags.contains('h');
        let summarize = flags.contains('s');

        let mut out = Vec::new();
        let mut errors = Vec::new();
        for operand in &operands {
            let Some(node) = ctx.fs.node(operand) else {
                errors.push(format!("du: cannot access '{operand}': No such file or directory"));
                continue;
            };
            let mut rows = Vec::new();
            let total = disk_usage(node, operand, &mut rows);
            if summarize || !node.is_dir {
                rows = vec![(total, operand.clone())];
            }
            for (kib, shown) in rows {
                let size = if human { human_size(kib) } else { kib.to_string() };
                out.push(format!("{size}\t{shown}"));
            }
        }
        if errors.is_empty() {
            Ok(CommandResult::ok(out.join("\n")))
        } else {
            out.extend(errors);
            Ok(CommandResult::fail(out.join("\n")))
        }
    }
}

/// Memory figures in KiB: total, used, free, shared, buff/cache, available.
const MEMORY: [u64; 6] = [16_777_216, 8_601_804, 4_301_332, 524_288, 3_874_080, 7_340_032];
/// Swap figures in KiB: total, used, free.
const SWAP: [u64; 3] = [4_194_304, 524_288, 3_670_016];

struct FreeCmd;
impl Command for FreeCmd {
    fn name(&self) -> &str {
        "free"
    }
    fn description(&self) -> &str {
        "Display memory usage"
    }
    fn usage(&self) -> &str {
        "free [-h|-k|-m|-g]"
    }
    fn category(&self) -> &str {
        "process"
    }
    fn execute(&self, args: &[&str], _ctx: &mut Context<'_>) -> Result<CommandResult> {
        let args = long_to_short(args, &[("--human", "-h"), ("--mebi", "-m"), ("--gibi", "-g")]);
        let (flags, operands) = short_flags(&args, "hkmg")?;
        if let Some(extra) = operands.first() {
            return Err(QuestError::Command(format!("extra operand '{extra}'")));
        }
        let render = |kib: u64| match flags.chars().last() {
            Some('h') => format!("{}i", human_size(kib)),
            Some('m') => (kib / 1024).to_string(),
            Some('g') => (kib / (1024 * 1024)).to_string(),
            _ => kib.to_string(),
        };

        let row = |label: &str, cells: Vec<String>| {
            let cells: String = cells.iter().map(|c| format!("{c:>12}")).collect();
            format!("{label:<5}{cells}")
        };
        let headings = ["total", "used", "free", "shared", "buff/cache", "available"];
        let lines = [
            row("", headings.iter().map(|h| (*h).to_string()).collect()),
            row("Mem:", MEMORY.iter().map(|&kib| render(kib)).collect()),
            row("Swap:", SWAP.iter().map(|&kib| render(kib)).collect()),
        ];
        Ok(CommandResult::ok(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// top / uptime
// ---------------------------------------------------------------------------

fn uptime_line() -> String {
    format!(
        "{} up {UPTIME},  1 user,  load average: {LOAD_AVERAGE}",
        Local::now().format("%H:%M:%S")
    )
}

struct TopCmd;
impl Command for TopCmd {
    fn name(&self) -> &str {
        "top"
    }
    fn aliases(&self) -> &'static [&'static str] {
        &["htop"]
    }
    fn description(&self) -> &str {
        "Show a snapshot of system load and processes"
    }
    fn usage(&self) -> &str {
        "top"
    }
    fn category(&self) -> &str {
        "process"
    }
    fn max_args(&self) -> Option<usize> {
        Some(0)
    }
    fn execute(&self, _args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let [total, used, free, _, cache, avail] = MEMORY.map(|kib| kib as f64 / 1024.0);
        let [swap_total, swap_used, swap_free] = SWAP.map(|kib| kib as f64 / 1024.0);
        let mut lines = vec![
            format!("top - {}", uptime_line()),
            format!("Tasks: {} total,   1 running, {} sleeping,   0 stopped,   0 zombie", PROCESSES.len(), PROCESSES.len() - 1),
            "%Cpu(s):  2.5 us,  0.8 sy,  0.0 ni, 96.2 id,  0.3 wa,  0.0 hi,  0.2 si".to_string(),
            format!("MiB Mem : {total:8.1} total, {free:8.1} free, {used:8.1} used, {cache:8.1} buff/cache"),
            format!("MiB Swap: {swap_total:8.1} total, {swap_free:8.1} free, {swap_used:8.1} used. {avail:8.1} avail Mem"),
            String::new(),
            format!("{:>7} {:<9} {:>5} {:>5}  {:<8} COMMAND", "PID", "USER", "%CPU", "%MEM", "TIME"),
        ];
        let mut busiest: Vec<&Process> = PROCESSES.iter().collect();
        busiest.sort_by(|a, b| b.cpu.cmp(a.cpu).then(a.pid.cmp(&b.pid)));
        for p in busiest {
            lines.push(format!(
                "{:>7} {:<9} {:>5} {:>5}  {:<8} {}",
                p.pid,
                p.owner.name(ctx.fs),
                p.cpu,
                p.mem,
                p.time,
                p.comm
            ));
        }
        Ok(CommandResult::ok(lines.join("\n")))
    }
    fn autocomplete(&self, _: &str, _: &[&str], _: &CompletionContext<'_>) -> Vec<String> {
        Vec::new()
    }
}

struct UptimeCmd;
impl Command for UptimeCmd {
    fn name(&self) -> &str {
        "uptime"
    }
    fn description(&self) -> &str {
        "Tell how long the system has been running"
    }
    fn usage(&self) -> &str {
        "uptime"
    }
    fn category(&self) -> &str {
        "process"
    }
    fn max_args(&self) -> Option<usize> {
        Some(0)
    }
    fn execute(&self, _args: &[&str], _ctx: &mut Context<'_>) -> Result<CommandResult> {
        Ok(CommandResult::ok(format!(" {}", uptime_line())))
    }
    fn autocomplete(&self, _: &str, _: &[&str], _: &CompletionContext<'_>) -> Vec<String> {
        Vec::new()
    }
}

/// Register process, service and resource commands.
pub fn register_process_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(PsCmd));
    reg.register(Box::new(KillCmd));
    reg.register(Box::new(ServiceCmd));
    reg.register(Box::new(DfCmd));
    reg.register(Box::new(DuCmd));
    reg.register(Box::new(FreeCmd));
    reg.register(Box::new(TopCmd));
    reg.register(Box::new(UptimeCmd));
}
