//! Text commands: cat, echo, head, tail, grep, wc.

use quest_types::error::{QuestError, Result};
use regex::RegexBuilder;

use crate::command::{Command, CommandResult, Context};
use crate::commands::{invalid_option, is_short_flags, unrecognized_option};

/// Lines shown by `head` and `tail` without `-n`.
const DEFAULT_LINES: usize = 10;

/// Piped text, or the error a text command reports without a file operand.
fn piped<'a>(ctx: &Context<'a>) -> Result<&'a str> {
    ctx.stdin
        .ok_or_else(|| QuestError::Command("missing file operand".to_string()))
}

/// Read `file`, or the piped text when there is none.
fn read_input(file: Option<&str>, ctx: &Context<'_>) -> Result<String> {
    match file {
        Some(path) => Ok(ctx.fs.cat(path)?.to_string()),
        None => Ok(piped(ctx)?.to_string()),
    }
}

/// Split text into lines, dropping the empty piece after a final newline.
fn text_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}

// ---------------------------------------------------------------------------
// cat
// ---------------------------------------------------------------------------

struct CatCmd;
impl Command for CatCmd {
    fn name(&self) -> &str {
        "cat"
    }
    fn description(&self) -> &str {
        "Concatenate and print files"
    }
    fn usage(&self) -> &str {
        "cat [-n] <file>..."
    }
    fn category(&self) -> &str {
        "text"
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let mut number = false;
        let mut files = Vec::new();
        for &arg in args {
            match arg {
                "-n" | "--number" => number = true,
                a if a.starts_with("--") => return Err(unrecognized_option(a)),
                a if is_short_flags(a) => {
                    if let Some(bad) = a[1..].chars().find(|&c| c != 'n') {
                        return Err(invalid_option(bad));
                    }
                    number = true;
                },
                a => files.push(a),
            }
        }

        let mut texts = Vec::with_capacity(files.len().max(1));
        if files.is_empty() {
            texts.push(piped(ctx)?.to_string());
        }
        for file in files {
            texts.push(ctx.fs.cat(file)?.to_string());
        }

        let lines = texts.iter().flat_map(|t| text_lines(t));
        let out: Vec<String> = if number {
            lines
                .enumerate()
                .map(|(i, line)| format!("  {:4}  {line}", i + 1))
                .collect()
        } else {
            lines.map(str::to_string).collect()
        };
        Ok(CommandResult::ok(out.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// echo
// ---------------------------------------------------------------------------

struct EchoCmd;
impl Command for EchoCmd {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "Print text"
    }
    fn usage(&self) -> &str {
        "echo [-neE] [text]..."
    }
    fn category(&self) -> &str {
        "text"
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let mut escapes = false;
        let mut words = Vec::new();
        for &arg in args {
            let is_flag = words.is_empty()
                && is_short_flags(arg)
                && arg[1..].chars().all(|c| matches!(c, 'n' | 'e' | 'E'));
            if !is_flag {
                words.push(arg);
                continue;
            }
            for flag in arg[1..].chars() {
                match flag {
                    'e' => escapes = true,
                    'E' => escapes = false,
                    // Output never carries a trailing newline.
                    _ => {},
                }
            }
        }

        let text = words
            .join(" ")
            .replace("$HOME", ctx.fs.home())
            .replace("$USER", ctx.fs.username())
            .replace("$PWD", ctx.fs.cwd())
            .replace("$HOSTNAME", ctx.fs.hostname());
        let text = strip_quotes(&text);
        let text = if escapes { unescape(text) } else { text.to_string() };
        Ok(CommandResult::ok(text))
    }
}

/// Remove one pair of matching surrounding quotes.
fn strip_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2
            && let Some(inner) = text.strip_prefix(quote).and_then(|t| t.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

/// Interpret `\n`, `\t`, `\r` and `\\`. Other backslashes are kept.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            _ => {
                out.push('\\');
                continue;
            },
        }
        chars.next();
    }
    out
}

// ---------------------------------------------------------------------------
// head / tail
// ---------------------------------------------------------------------------

/// Parse `-n N`, `-nN` or `-N` plus an optional file.
fn parse_line_count<'a>(args: &[&'a str]) -> Result<(usize, Option<&'a str>)> {
    let mut n = DEFAULT_LINES;
    let mut file = None;
    let mut rest = args.iter().copied();
    while let Some(arg) = rest.next() {
        let value = if arg == "-n" {
            rest.next().ok_or_else(|| {
                QuestError::Command("option requires an argument -- 'n'".to_string())
            })?
        } else if let Some(v) = arg.strip_prefix("-n") {
            v
        } else if is_short_flags(arg) {
            &arg[1..]
        } else {
            file = Some(arg);
            continue;
        };
        n = value
            .parse()
            .map_err(|_| QuestError::Command(format!("invalid number of lines: '{value}'")))?;
    }
    Ok((n, file))
}

struct HeadCmd;
impl Command for HeadCmd {
    fn name(&self) -> &str {
        "head"
    }
    fn description(&self) -> &str {
        "Show first lines of a file"
    }
    fn usage(&self) -> &str {
        "head [-n N] <file>"
    }
    fn category(&self) -> &str {
        "text"
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let (n, file) = parse_line_count(args)?;
        let text = read_input(file, ctx)?;
        let lines = text_lines(&text);
        let shown = &lines[..n.min(lines.len())];
        Ok(CommandResult::ok(shown.join("\n")))
    }
}

struct TailCmd;
impl Command for TailCmd {
    fn name(&self) -> &str {
        "tail"
    }
    fn description(&self) -> &str {
        "Show last lines of a file"
    }
    fn usage(&self) -> &str {
        "tail [-n N] <file>"
    }
    fn category(&self) -> &str {
        "text"
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let (n, file) = parse_line_count(args)?;
        let text = read_input(file, ctx)?;
        let lines = text_lines(&text);
        let shown = &lines[lines.len().saturating_sub(n)..];
        Ok(CommandResult::ok(shown.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// grep
// ---------------------------------------------------------------------------

#[derive(Default)]
struct GrepOptions {
    ignore_case: bool,
    line_numbers: bool,
    invert: bool,
    count: bool,
}

struct GrepCmd;
impl Command for GrepCmd {
    fn name(&self) -> &str {
        "grep"
    }
    fn description(&self) -> &str {
        "Print lines matching a pattern"
    }
    fn usage(&self) -> &str {
        "grep [-invc] <pattern> <file>..."
    }
    fn category(&self) -> &str {
        "text"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let mut opts = GrepOptions::default();
        let mut operands = Vec::new();
        for &arg in args {
            match arg {
                "--ignore-case" => opts.ignore_case = true,
                "--line-number" => opts.line_numbers = true,
                "--invert-match" => opts.invert = true,
                "--count" => opts.count = true,
                a if a.starts_with("--") => return Err(unrecognized_option(a)),
                a if is_short_flags(a) => {
                    for flag in a[1..].chars() {
                        match flag {
                            'i' => opts.ignore_case = true,
                            'n' => opts.line_numbers = true,
                            'v' => opts.invert = true,
                            'c' => opts.count = true,
                            other => return Err(invalid_option(other)),
                        }
                    }
                },
                a => operands.push(a),
            }
        }
        let Some((&pattern, files)) = operands.split_first() else {
            return Err(QuestError::Command("missing pattern".to_string()));
        };

        let re = RegexBuilder::new(pattern)
            .case_insensitive(opts.ignore_case)
            .build()
            .map_err(|e| {
                log::debug!("grep pattern {pattern:?} rejected: {e}");
                QuestError::Command(format!("invalid regular expression '{pattern}'"))
            })?;

        let sources: Vec<(Option<&str>, String)> = if files.is_empty() {
            vec![(None, piped(ctx)?.to_string())]
        } else {
            files
                .iter()
                .map(|&f| -> Result<(Option<&str>, String)> {
                    Ok((Some(f), ctx.fs.cat(f)?.to_string()))
                })
                .collect::<Result<_>>()?
        };
        let label_files = sources.len() > 1;

        let mut out = Vec::new();
        for (file, text) in &sources {
            let prefix = match file {
                Some(f) if label_files => format!("{f}:"),
                _ => String::new(),
            };
            let hits = text_lines(text)
                .into_iter()
                .enumerate()
                .filter(|(_, line)| re.is_match(line) != opts.invert);
            if opts.count {
                out.push(format!("{prefix}{}", hits.count()));
                continue;
            }
            for (i, line) in hits {
                if opts.line_numbers {
                    out.push(format!("{prefix}{}:{line}", i + 1));
                } else {
                    out.push(format!("{prefix}{line}"));
                }
            }
        }
        Ok(CommandResult::ok(out.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// wc
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Default)]
struct Counts {
    lines: usize,
    words: usize,
    chars: usize,
    bytes: usize,
}

impl Counts {
    fn of(text: &str) -> Self {
        let unterminated = !text.is_empty() && !text.ends_with('\n');
        Self {
            lines: text.matches('\n').count() + usize::from(unterminated),
            words: text.split_whitespace().count(),
            chars: text.chars().count(),
            bytes: text.len(),
        }
    }

    fn add(self, other: Self) -> Self {
        Self {
            lines: self.lines + other.lines,
            words: self.words + other.words,
            chars: self.chars + other.chars,
            bytes: self.bytes + other.bytes,
        }
    }
}

#[derive(Default)]
struct WcColumns {
    lines: bool,
    words: bool,
    chars: bool,
    bytes: bool,
}

impl WcColumns {
    fn render(&self, counts: Counts, label: Option<&str>) -> String {
        let mut cells = Vec::new();
        for (on, value) in [
            (self.lines, counts.lines),
            (self.words, counts.words),
            (self.chars, counts.chars),
            (self.bytes, counts.bytes),
        ] {
            if on {
                cells.push(format!("{value:7}"));
            }
        }
        let mut row = cells.join(" ");
        if let Some(label) = label {
            row.push(' ');
            row.push_str(label);
        }
        row
    }
}

struct WcCmd;
impl Command for WcCmd {
    fn name(&self) -> &str {
        "wc"
    }
    fn description(&self) -> &str {
        "Count lines, words and bytes"
    }
    fn usage(&self) -> &str {
        "wc [-lwcm] <file>..."
    }
    fn category(&self) -> &str {
        "text"
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let mut cols = WcColumns::default();
        let mut files = Vec::new();
        for &arg in args {
            match arg {
                "--lines" => cols.lines = true,
                "--words" => cols.words = true,
                "--chars" => cols.chars = true,
                "--bytes" => cols.bytes = true,
                a if a.starts_with("--") => return Err(unrecognized_option(a)),
                a if is_short_flags(a) => {
                    for flag in a[1..].chars() {
                        match flag {
                            'l' => cols.lines = true,
                            'w' => cols.words = true,
                            'm' => cols.chars = true,
                            'c' => cols.bytes = true,
                            other => return Err(invalid_option(other)),
                        }
                    }
                },
                a => files.push(a),
            }
        }
        if !(cols.lines || cols.words || cols.chars || cols.bytes) {
            cols = WcColumns {
                lines: true,
                words: true,
                bytes: true,
                chars: false,
            };
        }

        if files.is_empty() {
            return Ok(CommandResult::ok(cols.render(Counts::of(piped(ctx)?), None)));
        }
        let mut rows = Vec::with_capacity(files.len() + 1);
        let mut total = Counts::default();
        for &file in &files {
            let counts = Counts::of(ctx.fs.cat(file)?);
            total = total.add(counts);
            rows.push(cols.render(counts, Some(file)));
        }
        if files.len() > 1 {
            rows.push(cols.render(total, Some("total")));
        }
        Ok(CommandResult::ok(rows.join("\n")))
    }
}

/// Register text processing commands.
pub fn register_text_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(CatCmd));
    reg.register(Box::new(EchoCmd));
    reg.register(Box::new(HeadCmd));
    reg.register(Box::new(TailCmd));
    reg.register(Box::new(GrepCmd));
    reg.register(Box::new(WcCmd));
}

#[cfg(test)]
mod tests {
    use quest_vfs::VirtualFileSystem;

    use super::*;
    use crate::Shell;

    fn setup() -> Shell {
        let mut sh = Shell::new(VirtualFileSystem::default());
        let numbers: String = (1..=15).map(|i| format!("line {i}\n")).collect();
        sh.fs_mut().write("nums.txt", &numbers, false).unwrap();
        sh
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

    #[test]
    fn text_lines_drops_one_trailing_newline() {
        assert_eq!(text_lines("a\nb\n"), vec!["a", "b"]);
        assert_eq!(text_lines("a\n\n"), vec!["a", ""]);
        assert_eq!(text_lines("a"), vec!["a"]);
        assert!(text_lines("").is_empty());
    }

    #[test]
    fn cat_file() {
        let mut sh = setup();
        assert_eq!(exec(&mut sh, "cat /tmp/test.txt"), "This is a temporary file.");
    }

    #[test]
    fn cat_numbered_across_files() {
        let mut sh = setup();
        sh.fs_mut().write("a", "x\ny\n", false).unwrap();
        sh.fs_mut().write("b", "z\n", false).unwrap();
        assert_eq!(exec(&mut sh, "cat a b"), "x\ny\nz");
        assert_eq!(
            exec(&mut sh, "cat -n a b"),
            "     1  x\n     2  y\n     3  z"
        );
    }

    #[test]
    fn cat_errors() {
        let mut sh = setup();
        assert_eq!(fail(&mut sh, "cat"), "cat: missing file operand");
        assert_eq!(fail(&mut sh, "cat Documents"), "cat: Documents: Is a directory");
        assert_eq!(fail(&mut sh, "cat /etc/shadow"), "cat: /etc/shadow: Permission denied");
        assert_eq!(fail(&mut sh, "cat nums.txt ghost"), "cat: ghost: No such file or directory");
    }

    #[test]
    fn echo_plain_and_flags() {
        let mut sh = setup();
        assert_eq!(exec(&mut sh, "echo hello   world"), "hello world");
        assert_eq!(exec(&mut sh, "echo -n hi"), "hi");
        assert_eq!(exec(&mut sh, "echo hi -n"), "hi -n");
        assert_eq!(exec(&mut sh, "echo"), "");
    }

    #[test]
    fn echo_variables() {
        let mut sh = setup();
        exec(&mut sh, "cd /tmp");
        assert_eq!(
            exec(&mut sh, "echo \"$USER@$HOSTNAME in $PWD, home $HOME\""),
            "user@quest in /tmp, home /home/user"
        );
    }

    #[test]
    fn echo_escapes() {
        let mut sh = setup();
        assert_eq!(exec(&mut sh, r#"echo -e "a\tb\nc""#), "a\tb\nc");
        assert_eq!(exec(&mut sh, r#"echo "a\nb""#), r"a\nb");
        assert_eq!(exec(&mut sh, r#"echo -ne 'x\\y\q'"#), r"x\y\q");
    }

    #[test]
    fn echo_strips_escaped_quotes() {
        let mut sh = setup();
        assert_eq!(exec(&mut sh, r#"echo \"quoted\""#), "quoted");
    }

    #[test]
    fn head_and_tail_defaults() {
        let mut sh = setup();
        let head = exec(&mut sh, "head nums.txt");
        assert_eq!(head.lines().count(), 10);
        assert!(head.ends_with("line 10"));
        let tail = exec(&mut sh, "tail nums.txt");
        assert!(tail.starts_with("line 6\n"));
        assert!(tail.ends_with("line 15"));
    }

    #[test]
    fn head_count_forms() {
        let mut sh = setup();
        for line in ["head -n 3 nums.txt", "head -n3 nums.txt", "head -3 nums.txt", "head nums.txt -n 3"] {
            assert_eq!(exec(&mut sh, line), "line 1\nline 2\nline 3", "{line}");
        }
        assert_eq!(exec(&mut sh, "tail -2 nums.txt"), "line 14\nline 15");
        assert_eq!(exec(&mut sh, "tail -n 0 nums.txt"), "");
        assert_eq!(exec(&mut sh, "head -n 99 /etc/hostname"), "quest");
    }

    #[test]
    fn head_count_errors() {
        let mut sh = setup();
        assert_eq!(
            fail(&mut sh, "head nums.txt -n"),
            "head: option requires an argument -- 'n'"
        );
        assert_eq!(
            fail(&mut sh, "tail -n ten nums.txt"),
            "tail: invalid number of lines: 'ten'"
        );
        assert_eq!(fail(&mut sh, "head"), "head: missing file operand");
    }

    #[test]
    fn grep_basic_and_regex() {
        let mut sh = setup();
        assert_eq!(
            exec(&mut sh, "grep Linux Documents/notes.txt"),
            "Welcome to the Linux command line!"
        );
        assert_eq!(exec(&mut sh, "grep '^line 1[0-2]$' nums.txt"), "line 10\nline 11\nline 12");
        assert_eq!(exec(&mut sh, "grep nothing nums.txt"), "");
    }

    #[test]
    fn grep_flags() {
        let mut sh = setup();
        assert_eq!(
            exec(&mut sh, "grep -in LINUX Documents/notes.txt"),
            "4:Welcome to the Linux command line!"
        );
        assert_eq!(exec(&mut sh, "grep -c line nums.txt"), "15");
        assert_eq!(exec(&mut sh, "grep -vc 1 nums.txt"), "8");
        assert_eq!(exec(&mut sh, "grep --count --invert-match e nums.txt"), "0");
    }

    #[test]
    fn grep_many_files_are_labelled() {
        let mut sh = setup();
        let out = exec(&mut sh, "grep -c root /etc/passwd /etc/hosts");
        assert_eq!(out, "/etc/passwd:1\n/etc/hosts:0");
    }

    #[test]
    fn grep_errors() {
        let mut sh = setup();
        assert_eq!(fail(&mut sh, "grep"), "grep: missing operand");
        assert_eq!(fail(&mut sh, "grep x"), "grep: missing file operand");
        assert_eq!(fail(&mut sh, "grep -q x nums.txt"), "grep: invalid option -- 'q'");
        assert_eq!(
            fail(&mut sh, "grep '(' nums.txt"),
            "grep: invalid regular expression '('"
        );
        assert_eq!(fail(&mut sh, "grep x ghost"), "grep: ghost: No such file or directory");
    }

    #[test]
    fn wc_counts() {
        let mut sh = setup();
        assert_eq!(
            exec(&mut sh, "wc Documents/notes.txt"),
            "      4      15      75 Documents/notes.txt"
        );
        assert_eq!(exec(&mut sh, "wc -l nums.txt"), "     15 nums.txt");
        assert_eq!(exec(&mut sh, "wc -wl /tmp/test.txt"), "      1       5 /tmp/test.txt");
    }

    #[test]
    fn wc_chars_versus_bytes() {
        let mut sh = setup();
        sh.fs_mut().write("u.txt", "ü", false).unwrap();
        assert_eq!(exec(&mut sh, "wc -m u.txt"), "      1 u.txt");
        assert_eq!(exec(&mut sh, "wc -c u.txt"), "      2 u.txt");
        assert_eq!(exec(&mut sh, "wc -l u.txt"), "      1 u.txt");
    }

    #[test]
    fn wc_total_row() {
        let mut sh = setup();
        let out = exec(&mut sh, "wc -l nums.txt /tmp/test.txt");
        assert_eq!(out, "     15 nums.txt\n      1 /tmp/test.txt\n     16 total");
    }
}
