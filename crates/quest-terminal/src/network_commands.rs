//! Simulated network commands: ping, ifconfig, ip, netstat, ss, curl,
//! wget, host, dig, nslookup, traceroute.
//!
//! Nothing leaves the process. Names resolve through `/etc/hosts` and a
//! small table of public hosts, and every timing is derived from the
//! address so repeated runs print the same figures.

use std::net::Ipv4Addr;

use chrono::{Local, Utc};
use quest_types::error::{QuestError, Result};
use quest_vfs::VirtualFileSystem;

use crate::command::{Command, CommandResult, CompletionContext, Context};
use crate::commands::{invalid_option, is_short_flags, unrecognized_option};

/// Replies sent by `ping` without `-c`.
const DEFAULT_COUNT: u32 = 4;

/// Largest `-c` value `ping` accepts.
const MAX_COUNT: u32 = 100;

const HOSTS_FILE: &str = "/etc/hosts";

/// Public names the simulated resolver knows besides `/etc/hosts`.
const KNOWN_HOSTS: &[(&str, &str)] = &[
    ("google.com", "142.250.185.78"),
    ("github.com", "140.82.121.4"),
    ("api.github.com", "140.82.121.6"),
    ("example.com", "93.184.216.34"),
    ("httpbin.org", "54.208.105.16"),
];

/// IPv6 addresses for names that have one.
const KNOWN_HOSTS_V6: &[(&str, &str)] = &[
    ("localhost", "::1"),
    ("google.com", "2607:f8b0:4004:800::200e"),
    ("example.com", "2606:2800:220:1:248:1893:25c8:1946"),
];

/// The resolver every lookup command claims to ask.
const NAMESERVER: &str = "8.8.8.8";

/// Address for `target`: a literal IPv4 address, an `/etc/hosts` entry, or
/// one of the known public names.
fn resolve_host(fs: &VirtualFileSystem, target: &str) -> Option<String> {
    if target.parse::<Ipv4Addr>().is_ok() {
        return Some(target.to_string());
    }
    let from_hosts = fs.cat(HOSTS_FILE).ok().and_then(|text| {
        text.lines()
            .map(|line| line.split('#').next().unwrap_or_default())
            .find_map(|line| {
                let mut fields = line.split_whitespace();
                let addr = fields.next()?;
                let ipv4 = addr.parse::<Ipv4Addr>().is_ok();
                (ipv4 && fields.any(|name| name == target)).then(|| addr.to_string())
            })
    });
    from_hosts.or_else(|| {
        KNOWN_HOSTS
            .iter()
            .find(|(name, _)| *name == target)
            .map(|(_, addr)| (*addr).to_string())
    })
}

fn resolve_host_v6(target: &str) -> Option<&'static str> {
    KNOWN_HOSTS_V6
        .iter()
        .find(|(name, _)| *name == target)
        .map(|(_, addr)| *addr)
}

/// A name for `addr` from `/etc/hosts` or the known public hosts.
fn reverse_lookup(fs: &VirtualFileSystem, addr: &str) -> Option<String> {
    let from_hosts = fs.cat(HOSTS_FILE).ok().and_then(|text| {
        text.lines()
            .map(|line| line.split('#').next().unwrap_or_default())
            .find_map(|line| {
                let mut fields = line.split_whitespace();
                if fields.next()? != addr {
                    return None;
                }
                fields.next().map(str::to_string)
            })
    });
    from_hosts.or_else(|| {
        KNOWN_HOSTS
            .iter()
            .find(|(_, a)| *a == addr)
            .map(|(name, _)| (*name).to_string())
    })
}

/// Stable hash of `text`, the source of every simulated figure.
fn seed(text: &str) -> u32 {
    text.bytes()
        .fold(7u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)))
}

/// Round-trip time in milliseconds for one reply. Stable for a given
/// address and sequence number.
fn round_trip(addr: &str, seq: u32) -> f64 {
    let jitter = seed(addr).wrapping_add(seq.wrapping_mul(2_654_435_761)) % 1000;
    if addr.starts_with("127.") {
        0.02 + f64::from(jitter) / 10_000.0
    } else {
        10.0 + f64::from(jitter) / 25.0
    }
}

fn parse_count(value: &str) -> Result<u32> {
    match value.parse::<u32>() {
        Ok(n) if n > MAX_COUNT => Err(QuestError::Command(format!(
            "invalid argument: '{value}': out of range: 1 <= value <= {MAX_COUNT}"
        ))),
        Ok(n) if n > 0 => Ok(n),
        _ => Err(QuestError::Command(format!(
            "invalid count of packets to transmit: '{value}'"
        ))),
    }
}

// ---------------------------------------------------------------------------
// ping
// ---------------------------------------------------------------------------

struct PingCmd;
impl Command for PingCmd {
    fn name(&self) -> &str {
        "ping"
    }
    fn description(&self) -> &str {
        "Send echo requests to a host"
    }
    fn usage(&self) -> &str {
        "ping [-c count] <host>"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let mut count = DEFAULT_COUNT;
        let mut target = None;
        let mut rest = args.iter().copied();
        while let Some(arg) = rest.next() {
            if arg == "-c" {
                let value = rest.next().ok_or_else(|| {
                    QuestError::Command("option requires an argument -- 'c'".to_string())
                })?;
                count = parse_count(value)?;
            } else if let Some(value) = arg.strip_prefix("-c") {
                count = parse_count(value)?;
            } else if arg.starts_with('-') && arg.len() > 1 {
                return Err(QuestError::Command(format!("invalid option '{arg}'")));
            } else {
                target = Some(arg);
            }
        }
        let target = target.ok_or_else(|| {
            QuestError::Command("usage error: Destination address required".to_string())
        })?;
        let addr = resolve_host(ctx.fs, target).ok_or_else(|| {
            QuestError::Command(format!("{target}: Name or service not known"))
        })?;

        let times: Vec<f64> = (1..=count).map(|seq| round_trip(&addr, seq)).collect();
        let mut lines = vec![format!("PING {target} ({addr}) 56(84) bytes of data.")];
        for (seq, time) in (1..).zip(&times) {
            lines.push(format!(
                "64 bytes from {addr}: icmp_seq={seq} ttl=64 time={time:.3} ms"
            ));
        }

        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(0.0, f64::max);
        let avg = times.iter().sum::<f64>() / f64::from(count);
        lines.push(String::new());
        lines.push(format!("--- {target} ping statistics ---"));
        lines.push(format!(
            "{count} packets transmitted, {count} received, 0% packet loss"
        ));
        lines.push(format!("rtt min/avg/max = {min:.3}/{avg:.3}/{max:.3} ms"));
        Ok(CommandResult::ok(lines.join("\n")))
    }
    fn autocomplete(&self, _: &str, _: &[&str], _: &CompletionContext<'_>) -> Vec<String> {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// ifconfig / ip
// ---------------------------------------------------------------------------

struct Interface {
    name: &'static str,
    index: u32,
    loopback: bool,
    mtu: u32,
    /// None for the loopback device.
    mac: Option<&'static str>,
    inet: Ipv4Addr,
    prefix: u32,
    inet6: &'static str,
    prefix6: u32,
    qdisc: &'static str,
    state: &'static str,
    rx: (u64, u64),
    tx: (u64, u64),
}

impl Interface {
    fn netmask(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::MAX.checked_shl(32 - self.prefix).unwrap_or(0))
    }

    fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.inet) & u32::from(self.netmask()))
    }

    fn broadcast(&self) -> Option<Ipv4Addr> {
        (!self.loopback).then(|| Ipv4Addr::from(u32::from(self.inet) | !u32::from(self.netmask())))
    }

    fn scope(&self) -> &'static str {
        if self.loopback { "host" } else { "global" }
    }

    fn scope6(&self) -> &'static str {
        if self.loopback { "host" } else { "link" }
    }

    fn ifconfig(&self) -> String {
        let mut lines = Vec::new();
        if self.loopback {
            lines.push(format!("{}: flags=73<UP,LOOPBACK,RUNNING>  mtu {}", self.name, self.mtu));
        } else {
            lines.push(format!(
                "{}: flags=4163<UP,BROADCAST,RUNNING,MULTICAST>  mtu {}",
                self.name, self.mtu
            ));
        }
        let mut inet = format!("        inet {}  netmask {}", self.inet, self.netmask());
        if let Some(brd) = self.broadcast() {
            inet.push_str(&format!("  broadcast {brd}"));
        }
        lines.push(inet);
        let scope_id = if self.loopback { "0x10" } else { "0x20" };
        lines.push(format!(
            "        inet6 {}  prefixlen {}  scopeid {scope_id}<{}>",
            self.inet6,
            self.prefix6,
            self.scope6()
        ));
        match self.mac {
            Some(mac) => lines.push(format!("        ether {mac}  txqueuelen 1000  (Ethernet)")),
            None => lines.push("        loop  txqueuelen 1000  (Local Loopback)".to_string()),
        }
        lines.push(format!("        RX packets {}  bytes {} ({})", self.rx.0, self.rx.1, iec_bytes(self.rx.1)));
        lines.push(format!("        TX packets {}  bytes {} ({})", self.tx.0, self.tx.1, iec_bytes(self.tx.1)));
        lines.join("\n")
    }

    fn ip_link(&self) -> Vec<String> {
        let flags = if self.loopback {
            "<LOOPBACK,UP,LOWER_UP>"
        } else {
            "<BROADCAST,MULTICAST,UP,LOWER_UP>"
        };
        let link = match self.mac {
            Some(mac) => format!("    link/ether {mac} brd ff:ff:ff:ff:ff:ff"),
            None => "    link/loopback 00:00:00:00:00:00 brd 00:00:00:00:00:00".to_string(),
        };
        vec![
            format!(
                "{}: {}: {flags} mtu {} qdisc {} state {} group default qlen 1000",
                self.index, self.name, self.mtu, self.qdisc, self.state
            ),
            link,
        ]
    }

    fn ip_addr(&self) -> Vec<String> {
        let mut lines = self.ip_link();
        let mut inet = format!("    inet {}/{}", self.inet, self.prefix);
        if let Some(brd) = self.broadcast() {
            inet.push_str(&format!(" brd {brd}"));
        }
        inet.push_str(&format!(" scope {} {}", self.scope(), self.name));
        lines.push(inet);
        lines.push(format!("    inet6 {}/{} scope {}", self.inet6, self.prefix6, self.scope6()));
        lines
    }
}

/// Network devices, in kernel index order.
const INTERFACES: &[Interface] = &[
    Interface {
        name: "lo",
        index: 1,
        loopback: true,
        mtu: 65536,
        mac: None,
        inet: Ipv4Addr::new(127, 0, 0, 1),
        prefix: 8,
        inet6: "::1",
        prefix6: 128,
        qdisc: "noqueue",
        state: "UNKNOWN",
        rx: (1024, 102_400),
        tx: (1024, 102_400),
    },
    Interface {
        name: "eth0",
        index: 2,
        loopback: false,
        mtu: 1500,
        mac: Some("02:42:ac:11:00:02"),
        inet: Ipv4Addr::new(192, 168, 1, 105),
        prefix: 24,
        inet6: "fe80::42:acff:fe11:2",
        prefix6: 64,
        qdisc: "fq_codel",
        state: "UP",
        rx: (15_243, 18_234_567),
        tx: (12_456, 1_234_567),
    },
];

const GATEWAY: &str = "192.168.1.1";

/// Byte count in the `(17.4 MiB)` form `ifconfig` appends.
fn iec_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in ["B", "KiB", "MiB"] {
        if value < 1024.0 {
            return format!("{value:.1} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.1} GiB")
}

fn interface(name: &str) -> Result<&'static Interface> {
    INTERFACES
        .iter()
        .find(|i| i.name == name)
        .ok_or_else(|| QuestError::Command(format!("{name}: error fetching interface information: Device not found")))
}

struct IfconfigCmd;
impl Command for IfconfigCmd {
    fn name(&self) -> &str {
        "ifconfig"
    }
    fn description(&self) -> &str {
        "Show network interfaces"
    }
    fn usage(&self) -> &str {
        "ifconfig [-a] [interface]"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn execute(&self, args: &[&str], _ctx: &mut Context<'_>) -> Result<CommandResult> {
        let mut shown = Vec::new();
        for &arg in args {
            match arg {
                "-a" => {},
                a if a.starts_with("--") => return Err(unrecognized_option(a)),
                a if is_short_flags(a) => return Err(invalid_option(a[1..].chars().next().unwrap_or('-'))),
                a => shown.push(interface(a)?),
            }
        }
        if shown.is_empty() {
            // eth0 before lo, as ifconfig lists them.
            shown = INTERFACES.iter().rev().collect();
        }
        let blocks: Vec<String> = shown.iter().map(|i| i.ifconfig()).collect();
        Ok(CommandResult::ok(blocks.join("\n\n")))
    }
    fn autocomplete(&self, partial: &str, _: &[&str], _: &CompletionContext<'_>) -> Vec<String> {
        INTERFACES
            .iter()
            .map(|i| i.name.to_string())
            .filter(|n| n.starts_with(partial))
            .collect()
    }
}

struct IpCmd;
impl Command for IpCmd {
    fn name(&self) -> &str {
        "ip"
    }
    fn description(&self) -> &str {
        "Show addresses, links and routes"
    }
    fn usage(&self) -> &str {
        "ip addr|link|route [show [dev] [interface]]"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn execute(&self, args: &[&str], _ctx: &mut Context<'_>) -> Result<CommandResult> {
        let (object, rest) = args.split_first().map_or(("addr", &[][..]), |(o, r)| (*o, r));
        if !matches!(object, "a" | "addr" | "address" | "l" | "link" | "r" | "route") {
            return Err(QuestError::Command(format!(
                "Object \"{object}\" is unknown, try \"ip help\"."
            )));
        }
        let mut rest = rest.iter().copied().peekable();
        if rest.next_if(|w| matches!(*w, "show" | "list" | "ls")).is_none()
            && let Some(&verb) = rest.peek()
            && verb != "dev"
            && INTERFACES.iter().all(|i| i.name != verb)
        {
            return Err(QuestError::Command(format!(
                "Command \"{verb}\" is unknown, try \"ip {object} help\"."
            )));
        }
        rest.next_if_eq(&"dev");
        let selected: Vec<&Interface> = match rest.next() {
            Some(name) => vec![INTERFACES.iter().find(|i| i.name == name).ok_or_else(|| {
                QuestError::Command(format!("Device \"{name}\" does not exist."))
            })?],
            None => INTERFACES.iter().collect(),
        };

        let lines: Vec<String> = match object {
            "a" | "addr" | "address" => selected.iter().flat_map(|i| i.ip_addr()).collect(),
            "l" | "link" => selected.iter().flat_map(|i| i.ip_link()).collect(),
            _ => INTERFACES
                .iter()
                .filter(|i| !i.loopback)
                .flat_map(|i| {
                    [
                        format!("default via {GATEWAY} dev {} proto dhcp metric 100", i.name),
                        format!(
                            "{}/{} dev {} proto kernel scope link src {} metric 100",
                            i.network(),
                            i.prefix,
                            i.name,
                            i.inet
                        ),
                    ]
                })
                .collect(),
        };
        Ok(CommandResult::ok(lines.join("\n")))
    }
    fn autocomplete(&self, partial: &str, args: &[&str], _: &CompletionContext<'_>) -> Vec<String> {
        let words: &[&str] = if args.is_empty() {
            &["addr", "link", "route"]
        } else {
            &["show", "dev", "lo", "eth0"]
        };
        words
            .iter()
            .filter(|w| w.starts_with(partial))
            .map(|w| (*w).to_string())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// netstat / ss
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SocketState {
    Listen,
    Established,
    TimeWait,
    /// A bound datagram socket.
    Unconnected,
}

impl SocketState {
    fn serving(self) -> bool {
        matches!(self, Self::Listen | Self::Unconnected)
    }
}

struct Socket {
    proto: &'static str,
    local: (&'static str, u16),
    /// `None` port is the `*` wildcard.
    peer: (&'static str, Option<u16>),
    state: SocketState,
    process: Option<(u32, &'static str)>,
}

const SOCKETS: &[Socket] = &[
    Socket { proto: "tcp", local: ("0.0.0.0", 22), peer: ("0.0.0.0", None), state: SocketState::Listen, process: Some((312, "sshd")) },
    Socket { proto: "tcp", local: ("127.0.0.1", 631), peer: ("0.0.0.0", None), state: SocketState::Listen, process: None },
    Socket { proto: "tcp", local: ("192.168.1.105", 22), peer: ("192.168.1.10", Some(52341)), state: SocketState::Established, process: Some((312, "sshd")) },
    Socket { proto: "tcp", local: ("192.168.1.105", 48522), peer: ("142.250.185.78", Some(443)), state: SocketState::TimeWait, process: None },
    Socket { proto: "udp", local: ("0.0.0.0", 68), peer: ("0.0.0.0", None), state: SocketState::Unconnected, process: Some((298, "NetworkManager")) },
];

/// Service names shown for well-known ports unless `-n` is given.
const SERVICES: &[(u16, &str)] = &[(22, "ssh"), (68, "bootpc"), (443, "https"), (631, "ipp")];

fn endpoint(host: &str, port: Option<u16>, numeric: bool) -> String {
    let port = match port {
        None => "*".to_string(),
        Some(p) if numeric => p.to_string(),
        Some(p) => SERVICES
            .iter()
            .find(|(num, _)| *num == p)
            .map_or_else(|| p.to_string(), |(_, name)| (*name).to_string()),
    };
    format!("{host}:{port}")
}

/// Socket listing flags shared by `netstat` and `ss`.
#[derive(Debug, Default)]
struct SocketQuery {
    tcp: bool,
    udp: bool,
    listening: bool,
    all: bool,
    numeric: bool,
    processes: bool,
}

impl SocketQuery {
    fn parse(args: &[&str]) -> Result<Self> {
        let mut query = Self::default();
        for &arg in args {
            let flags = match arg {
                "--tcp" => "t",
                "--udp" => "u",
                "--listening" => "l",
                "--all" => "a",
                "--numeric" => "n",
                "--program" | "--processes" => "p",
                a if a.starts_with("--") => return Err(unrecognized_option(a)),
                a if is_short_flags(a) => &a[1..],
                a => return Err(QuestError::Command(format!("extra operand '{a}'"))),
            };
            for flag in flags.chars() {
                match flag {
                    't' => query.tcp = true,
                    'u' => query.udp = true,
                    'l' => query.listening = true,
                    'a' => query.all = true,
                    'n' => query.numeric = true,
                    'p' => query.processes = true,
                    other => return Err(invalid_option(other)),
                }
            }
        }
        Ok(query)
    }

    fn matches(&self, socket: &Socket) -> bool {
        let proto = match socket.proto {
            "tcp" => self.tcp,
            _ => self.udp,
        };
        let state = if self.all {
            true
        } else {
            socket.state.serving() == self.listening
        };
        (proto || !(self.tcp || self.udp)) && state
    }
}

struct NetstatCmd;
impl Command for NetstatCmd {
    fn name(&self) -> &str {
        "netstat"
    }
    fn description(&self) -> &str {
        "Print network connections"
    }
    fn usage(&self) -> &str {
        "netstat [-tulanp]"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn execute(&self, args: &[&str], _ctx: &mut Context<'_>) -> Result<CommandResult> {
        let query = SocketQuery::parse(args)?;
        let title = match (query.all, query.listening) {
            (true, _) => "Active Internet connections (servers and established)",
            (false, true) => "Active Internet connections (only servers)",
            (false, false) => "Active Internet connections (w/o servers)",
        };
        let row = |cells: [&str; 6], process: Option<String>| {
            let mut line = format!(
                "{:<5} {:>6} {:>6} {:<23} {:<23} {:<11}",
                cells[0], cells[1], cells[2], cells[3], cells[4], cells[5]
            );
            if let Some(process) = process {
                line.push(' ');
                line.push_str(&process);
            }
            line.trim_end().to_string()
        };

        let mut lines = vec![title.to_string()];
        let heading = query.processes.then(|| "PID/Program name".to_string());
        lines.push(row(["Proto", "Recv-Q", "Send-Q", "Local Address", "Foreign Address", "State"], heading));
        for socket in SOCKETS.iter().filter(|s| query.matches(s)) {
            let local = endpoint(socket.local.0, Some(socket.local.1), query.numeric);
            let peer = endpoint(socket.peer.0, socket.peer.1, query.numeric);
            let state = match socket.state {
                SocketState::Listen => "LISTEN",
                SocketState::Established => "ESTABLISHED",
                SocketState::TimeWait => "TIME_WAIT",
                SocketState::Unconnected => "",
            };
            let process = query.processes.then(|| {
                socket
                    .process
                    .map_or_else(|| "-".to_string(), |(pid, name)| format!("{pid}/{name}"))
            });
            lines.push(row([socket.proto, "0", "0", local.as_str(), peer.as_str(), state], process));
        }
        Ok(CommandResult::ok(lines.join("\n")))
    }
    fn autocomplete(&self, _: &str, _: &[&str], _: &CompletionContext<'_>) -> Vec<String> {
        Vec::new()
    }
}

struct SsCmd;
impl Command for SsCmd {
    fn name(&self) -> &str {
        "ss"
    }
    fn description(&self) -> &str {
        "Print socket statistics"
    }
    fn usage(&self) -> &str {
        "ss [-tulanp]"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn execute(&self, args: &[&str], _ctx: &mut Context<'_>) -> Result<CommandResult> {
        let query = SocketQuery::parse(args)?;
        let row = |cells: [&str; 6], process: &str| {
            format!(
                "{:<6} {:<7} {:>6} {:>6} {:<22} {:<22} {process}",
                cells[0], cells[1], cells[2], cells[3], cells[4], cells[5]
            )
            .trim_end()
            .to_string()
        };

        let mut lines = vec![row(
            ["Netid", "State", "Recv-Q", "Send-Q", "Local Address:Port", "Peer Address:Port"],
            if query.processes { "Process" } else { "" },
        )];
        for socket in SOCKETS.iter().filter(|s| query.matches(s)) {
            let local = endpoint(socket.local.0, Some(socket.local.1), query.numeric);
            let peer = endpoint(socket.peer.0, socket.peer.1, query.numeric);
            let state = match socket.state {
                SocketState::Listen => "LISTEN",
                SocketState::Established => "ESTAB",
                SocketState::TimeWait => "TIME-WAIT",
                SocketState::Unconnected => "UNCONN",
            };
            let backlog = if socket.state == SocketState::Listen { "128" } else { "0" };
            let process = match (query.processes, socket.process) {
                (true, Some((pid, name))) => format!("users:((\"{name}\",pid={pid},fd=3))"),
                _ => String::new(),
            };
            lines.push(row([socket.proto, state, "0", backlog, local.as_str(), peer.as_str()], &process));
        }
        Ok(CommandResult::ok(lines.join("\n")))
    }
    fn autocomplete(&self, _: &str, _: &[&str], _: &CompletionContext<'_>) -> Vec<String> {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// curl / wget
// ---------------------------------------------------------------------------

/// Canned bodies keyed by host and path.
const PAGES: &[(&str, &str, &str)] = &[
    (
        "example.com",
        "/",
        "<!doctype html>\n<html>\n<head><title>Example Domain</title></head>\n<body>\n<h1>Example Domain</h1>\n<p>This domain is for use in illustrative examples in documents.</p>\n</body>\n</html>",
    ),
    (
        "api.github.com",
        "/",
        "{\n  \"current_user_url\": \"https://api.github.com/user\",\n  \"repository_url\": \"https://api.github.com/repos/{owner}/{repo}\"\n}",
    ),
    ("httpbin.org", "/ip", "{\n  \"origin\": \"192.168.1.105\"\n}"),
];

/// A simulated HTTP exchange.
struct Fetched {
    url: String,
    host: String,
    addr: String,
    port: u16,
    path: String,
    body: String,
}

impl Fetched {
    fn content_type(&self) -> &'static str {
        if self.body.starts_with('{') {
            "application/json; charset=utf-8"
        } else {
            "text/html; charset=UTF-8"
        }
    }

    fn headers(&self) -> Vec<String> {
        vec![
            "HTTP/1.1 200 OK".to_string(),
            format!("Content-Type: {}", self.content_type()),
            format!("Content-Length: {}", self.body.len()),
            "Server: nginx".to_string(),
            format!("Date: {}", Utc::now().format("%a, %d %b %Y %H:%M:%S GMT")),
        ]
    }

    /// Last path segment, the name a download is saved under.
    fn file_name(&self) -> Option<&str> {
        self.path.rsplit('/').next().filter(|name| !name.is_empty())
    }
}

/// Split `url` and resolve its host. The error text is curl's.
fn fetch(fs: &VirtualFileSystem, url: &str) -> Result<Fetched> {
    let (scheme, rest) = match url.split_once("://") {
        Some((scheme, rest)) => (scheme.to_ascii_lowercase(), rest),
        None => ("http".to_string(), url),
    };
    let default_port = match scheme.as_str() {
        "http" => 80,
        "https" => 443,
        other => {
            return Err(QuestError::Command(format!("(1) Protocol \"{other}\" not supported")));
        },
    };
    let (authority, path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, "/"),
    };
    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => (host, port.parse::<u16>().ok()),
        None => (authority, Some(default_port)),
    };
    let port = port.filter(|_| !host.is_empty()).ok_or_else(|| {
        QuestError::Command("(3) URL using bad/illegal format or missing URL".to_string())
    })?;
    let addr = resolve_host(fs, host)
        .ok_or_else(|| QuestError::Command(format!("(6) Could not resolve host: {host}")))?;

    let body = PAGES
        .iter()
        .find(|(h, p, _)| *h == host && *p == path)
        .map_or_else(
            || format!("<html><body>Response from {host}{path}</body></html>"),
            |(_, _, body)| (*body).to_string(),
        );
    Ok(Fetched {
        url: format!("{scheme}://{authority}{path}"),
        host: host.to_string(),
        addr,
        port,
        path: path.to_string(),
        body,
    })
}

struct CurlCmd;
impl Command for CurlCmd {
    fn name(&self) -> &str {
        "curl"
    }
    fn description(&self) -> &str {
        "Transfer a URL"
    }
    fn usage(&self) -> &str {
        "curl [-sIvLO] [-o file] <url>"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let (mut head, mut silent, mut verbose, mut remote_name) = (false, false, false, false);
        let mut output = None;
        let mut url = None;
        let mut rest = args.iter().copied();
        while let Some(arg) = rest.next() {
            let flags = match arg {
                "--head" => "I",
                "--silent" => "s",
                "--verbose" => "v",
                "--location" => "L",
                "--remote-name" => "O",
                "--output" => "o",
                a if a.starts_with("--") => return Err(unrecognized_option(a)),
                a if is_short_flags(a) => &a[1..],
                a => {
                    url = Some(a);
                    continue;
                },
            };
            for (i, flag) in flags.char_indices() {
                match flag {
                    'I' => head = true,
                    's' => silent = true,
                    'v' => verbose = true,
                    'L' => {},
                    'O' => remote_name = true,
                    'o' => {
                        let attached = &flags[i + 1..];
                        let value = if attached.is_empty() { rest.next() } else { Some(attached) };
                        output = Some(value.ok_or_else(|| {
                            QuestError::Command("option -o: requires parameter".to_string())
                        })?);
                        break;
                    },
                    other => return Err(invalid_option(other)),
                }
            }
        }
        let url = url.ok_or_else(|| QuestError::Command("no URL specified".to_string()))?;
        let fetched = fetch(ctx.fs, url)?;
        log::debug!("curl {} via {}", fetched.url, fetched.addr);

        let mut lines = Vec::new();
        if verbose {
            lines.push(format!("*   Trying {}:{}...", fetched.addr, fetched.port));
            lines.push(format!(
                "* Connected to {} ({}) port {}",
                fetched.host, fetched.addr, fetched.port
            ));
            let method = if head { "HEAD" } else { "GET" };
            lines.push(format!("> {method} {} HTTP/1.1", fetched.path));
            lines.push(format!("> Host: {}", fetched.host));
            lines.push("> User-Agent: curl/7.88.1".to_string());
            lines.push("> Accept: */*".to_string());
            lines.push(">".to_string());
            lines.extend(fetched.headers().into_iter().map(|h| format!("< {h}")));
            lines.push("<".to_string());
        }
        if head {
            if !verbose {
                lines.extend(fetched.headers());
            }
            return Ok(CommandResult::ok(lines.join("\n")));
        }

        let target = match (output, remote_name) {
            (Some(file), _) => Some(file.to_string()),
            (None, true) => Some(
                fetched
                    .file_name()
                    .ok_or_else(|| QuestError::Command("Remote file name has no length!".to_string()))?
                    .to_string(),
            ),
            (None, false) => None,
        };
        match target {
            Some(file) => {
                ctx.fs.write(&file, &fetched.body, false)?;
                if !silent && !verbose {
                    lines.push(format!("Saved {} bytes to '{file}'", fetched.body.len()));
                }
            },
            None => lines.push(fetched.body),
        }
        Ok(CommandResult::ok(lines.join("\n")))
    }
}

struct WgetCmd;
impl Command for WgetCmd {
    fn name(&self) -> &str {
        "wget"
    }
    fn description(&self) -> &str {
        "Download a file from the web"
    }
    fn usage(&self) -> &str {
        "wget [-q] [-O file] <url>"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let mut quiet = false;
        let mut output = None;
        let mut url = None;
        let mut rest = args.iter().copied();
        while let Some(arg) = rest.next() {
            match arg {
                "-q" | "--quiet" => quiet = true,
                "-c" | "--continue" => {},
                "-O" => {
                    output = Some(rest.next().ok_or_else(|| {
                        QuestError::Command("option requires an argument -- 'O'".to_string())
                    })?);
                },
                a if a.starts_with("--output-document=") => {
                    output = a.split_once('=').map(|(_, file)| file);
                },
                a if a.starts_with("-O") => output = Some(&a[2..]),
                a if a.starts_with("--") => return Err(unrecognized_option(a)),
                a if is_short_flags(a) => return Err(invalid_option(a[1..].chars().next().unwrap_or('-'))),
                a => url = Some(a),
            }
        }
        let url = url.ok_or_else(|| QuestError::Command("missing URL".to_string()))?;
        let fetched = fetch(ctx.fs, url).map_err(|_| {
            let host = url.split("://").last().unwrap_or(url);
            let host = host.split(['/', ':']).next().unwrap_or(host);
            QuestError::Command(format!("unable to resolve host address '{host}'"))
        })?;

        if output == Some("-") {
            return Ok(CommandResult::ok(fetched.body));
        }
        let file = match output {
            Some(file) => file.to_string(),
            None => {
                // Never clobber: a second download becomes `name.1`.
                let base = fetched.file_name().unwrap_or("index.html").to_string();
                let mut candidate = base.clone();
                let mut n = 1;
                while ctx.fs.exists(&candidate) {
                    candidate = format!("{base}.{n}");
                    n += 1;
                }
                candidate
            },
        };
        ctx.fs.write(&file, &fetched.body, false)?;
        if quiet {
            return Ok(CommandResult::empty());
        }

        let now = Local::now().format("%Y-%m-%d %H:%M:%S");
        let len = fetched.body.len();
        let lines = [
            format!("--{now}--  {}", fetched.url),
            format!("Resolving {} ({})... {}", fetched.host, fetched.host, fetched.addr),
            format!(
                "Connecting to {} ({})|{}|:{}... connected.",
                fetched.host, fetched.host, fetched.addr, fetched.port
            ),
            "HTTP request sent, awaiting response... 200 OK".to_string(),
            format!("Length: {len} [{}]", fetched.content_type().split(';').next().unwrap_or_default()),
            format!("Saving to: '{file}'"),
            String::new(),
            format!("{file:<20} 100%[===================>] {len:>6}  --.-KB/s    in 0s"),
            String::new(),
            format!("{now} (12.3 MB/s) - '{file}' saved [{len}/{len}]"),
        ];
        Ok(CommandResult::ok(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// host / dig / nslookup
// ---------------------------------------------------------------------------

/// Records of `rtype` for `name`. `None` when the name does not exist.
fn lookup(fs: &VirtualFileSystem, name: &str, rtype: &str) -> Option<Vec<String>> {
    let v4 = resolve_host(fs, name)?;
    Some(match rtype {
        "A" => vec![v4],
        "AAAA" => resolve_host_v6(name).map(str::to_string).into_iter().collect(),
        _ => Vec::new(),
    })
}

/// `d.c.b.a.in-addr.arpa` for `a.b.c.d`.
fn reverse_name(addr: Ipv4Addr) -> String {
    let [a, b, c, d] = addr.octets();
    format!("{d}.{c}.{b}.{a}.in-addr.arpa")
}

struct HostCmd;
impl Command for HostCmd {
    fn name(&self) -> &str {
        "host"
    }
    fn description(&self) -> &str {
        "Look up a name or address in DNS"
    }
    fn usage(&self) -> &str {
        "host <name|address>"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let name = args[0];
        if let Ok(addr) = name.parse::<Ipv4Addr>() {
            let reverse = reverse_name(addr);
            return match reverse_lookup(ctx.fs, name) {
                Some(host) => Ok(CommandResult::ok(format!("{reverse} domain name pointer {host}."))),
                None => Err(QuestError::Command(format!("Host {reverse}. not found: 3(NXDOMAIN)"))),
            };
        }
        let v4 = lookup(ctx.fs, name, "A")
            .ok_or_else(|| QuestError::Command(format!("Host {name} not found: 3(NXDOMAIN)")))?;
        let mut lines: Vec<String> = v4.iter().map(|a| format!("{name} has address {a}")).collect();
        if let Some(v6) = resolve_host_v6(name) {
            lines.push(format!("{name} has IPv6 address {v6}"));
        }
        Ok(CommandResult::ok(lines.join("\n")))
    }
    fn autocomplete(&self, _: &str, _: &[&str], _: &CompletionContext<'_>) -> Vec<String> {
        Vec::new()
    }
}

struct DigCmd;
impl Command for DigCmd {
    fn name(&self) -> &str {
        "dig"
    }
    fn description(&self) -> &str {
        "Query DNS records"
    }
    fn usage(&self) -> &str {
        "dig [@server] <name> [A|AAAA|MX|...] [+short]"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let mut server = NAMESERVER;
        let mut short = false;
        let mut name = None;
        let mut rtype = None;
        for &arg in args {
            if let Some(s) = arg.strip_prefix('@') {
                server = s;
            } else if arg == "+short" {
                short = true;
            } else if arg.starts_with('+') {
                // Other query options only change presentation.
            } else if name.is_none() {
                name = Some(arg);
            } else if rtype.is_none() {
                rtype = Some(arg);
            } else {
                return Err(QuestError::Command(format!("extra argument '{arg}'")));
            }
        }
        let name = name.ok_or_else(|| QuestError::Command("missing name".to_string()))?;
        let name = name.trim_end_matches('.');
        let rtype = rtype.map_or_else(|| "A".to_string(), str::to_ascii_uppercase);
        let answers = lookup(ctx.fs, name, &rtype);
        if short {
            return Ok(CommandResult::ok(answers.unwrap_or_default().join("\n")));
        }

        let status = if answers.is_some() { "NOERROR" } else { "NXDOMAIN" };
        let answers = answers.unwrap_or_default();
        let hash = seed(name);
        let mut lines = vec![
            format!("; <<>> DiG 9.18.18 <<>> {}", args.join(" ")),
            ";; global options: +cmd".to_string(),
            ";; Got answer:".to_string(),
            format!(";; ->>HEADER<<- opcode: QUERY, status: {status}, id: {}", hash % 65536),
            format!(
                ";; flags: qr rd ra; QUERY: 1, ANSWER: {}, AUTHORITY: 0, ADDITIONAL: 1",
                answers.len()
            ),
            String::new(),
            ";; QUESTION SECTION:".to_string(),
            format!(";{name}.\t\t\tIN\t{rtype}"),
        ];
        if !answers.is_empty() {
            lines.push(String::new());
            lines.push(";; ANSWER SECTION:".to_string());
            lines.extend(answers.iter().map(|a| format!("{name}.\t\t300\tIN\t{rtype}\t{a}")));
        }
        lines.push(String::new());
        lines.push(format!(";; Query time: {} msec", 8 + hash % 40));
        lines.push(format!(";; SERVER: {server}#53({server}) (UDP)"));
        lines.push(format!(";; WHEN: {}", Local::now().format("%a %b %d %H:%M:%S %Z %Y")));
        Ok(CommandResult::ok(lines.join("\n")))
    }
    fn autocomplete(&self, _: &str, _: &[&str], _: &CompletionContext<'_>) -> Vec<String> {
        Vec::new()
    }
}

struct NslookupCmd;
impl Command for NslookupCmd {
    fn name(&self) -> &str {
        "nslookup"
    }
    fn description(&self) -> &str {
        "Query a name server"
    }
    fn usage(&self) -> &str {
        "nslookup <name> [server]"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let name = args[0];
        let server = args.get(1).copied().unwrap_or(NAMESERVER);
        let mut lines = vec![
            format!("Server:\t\t{server}"),
            format!("Address:\t{server}#53"),
            String::new(),
        ];
        let Some(v4) = lookup(ctx.fs, name, "A") else {
            lines.push(format!("** server can't find {name}: NXDOMAIN"));
            return Ok(CommandResult::fail(lines.join("\n")));
        };
        lines.push("Non-authoritative answer:".to_string());
        let v6 = resolve_host_v6(name).map(str::to_string);
        for addr in v4.iter().chain(&v6) {
            lines.push(format!("Name:\t{name}"));
            lines.push(format!("Address: {addr}"));
        }
        Ok(CommandResult::ok(lines.join("\n")))
    }
    fn autocomplete(&self, _: &str, _: &[&str], _: &CompletionContext<'_>) -> Vec<String> {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// traceroute
// ---------------------------------------------------------------------------

/// Routers between the machine and any outside host.
const HOPS: &[(&str, &str)] = &[
    ("_gateway", GATEWAY),
    ("isp-router", "10.0.0.1"),
    ("edge-router", "72.14.215.85"),
];

struct TracerouteCmd;
impl Command for TracerouteCmd {
    fn name(&self) -> &str {
        "traceroute"
    }
    fn aliases(&self) -> &'static [&'static str] {
        &["tracepath"]
    }
    fn description(&self) -> &str {
        "Print the route packets take to a host"
    }
    fn usage(&self) -> &str {
        "traceroute <host>"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let target = args[0];
        if is_short_flags(target) {
            return Err(invalid_option(target[1..].chars().next().unwrap_or('-')));
        }
        let addr = resolve_host(ctx.fs, target)
            .ok_or_else(|| QuestError::Command(format!("{target}: Name or service not known")))?;

        let mut route: Vec<(&str, &str)> = Vec::new();
        if !addr.starts_with("127.") {
            route.extend(HOPS.iter().copied());
        }
        route.push((target, addr.as_str()));

        let total = route.len() as f64;
        let mut lines = vec![format!("traceroute to {target} ({addr}), 30 hops max, 60 byte packets")];
        for (hop, (name, hop_addr)) in (1u32..).zip(&route) {
            let scale = f64::from(hop) / total;
            let [t1, t2, t3] = [1, 2, 3].map(|attempt| round_trip(hop_addr, attempt) * scale);
            lines.push(format!(
                "{hop:>2}  {name} ({hop_addr})  {t1:.3} ms  {t2:.3} ms  {t3:.3} ms"
            ));
        }
        Ok(CommandResult::ok(lines.join("\n")))
    }
    fn autocomplete(&self, _: &str, _: &[&str], _: &CompletionContext<'_>) -> Vec<String> {
        Vec::new()
    }
}

/// Register simulated network commands.
pub fn register_network_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(PingCmd));
    reg.register(Box::new(IfconfigCmd));
    reg.register(Box::new(IpCmd));
    reg.register(Box::new(NetstatCmd));
    reg.register(Box::new(SsCmd));
    reg.register(Box::new(CurlCmd));
    reg.register(Box::new(WgetCmd));
    reg.register(Box::new(HostCmd));
    reg.register(Box::new(DigCmd));
    reg.register(Box::new(NslookupCmd));
    reg.register(Box::new(TracerouteCmd));
}
