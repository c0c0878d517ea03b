//! Line parsing: word splitting, pipes, and output redirection.

use quest_types::error::{QuestError, Result};

/// One pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Command word. Empty for a blank stage.
    pub name: String,
    pub args: Vec<String>,
    /// File receiving the stage output (`>` or `>>`).
    pub stdout_target: Option<String>,
    /// `>>` rather than `>`.
    pub append: bool,
    /// Stage receiving this one's output.
    pub next: Option<Box<ParsedCommand>>,
}

impl ParsedCommand {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Number of stages in the pipeline starting here.
    pub fn stages(&self) -> usize {
        1 + self.next.as_ref().map_or(0, |n| n.stages())
    }
}

/// Parse a raw line into a pipeline.
///
/// The line splits on its first unquoted `|`; the remainder is parsed the
/// same way, so `a | b | c` becomes a three-stage chain.
pub fn parse(line: &str) -> Result<ParsedCommand> {
    match find_unquoted(line, "|") {
        Some(pos) => {
            let mut left = parse_segment(&line[..pos])?;
            left.next = Some(Box::new(parse(&line[pos + 1..])?));
            Ok(left)
        },
        None => parse_segment(line),
    }
}

/// Parse one stage, splitting off a redirect. `>>` is looked for before
/// `>`. Words after the target are kept as arguments, as a shell would.
fn parse_segment(segment: &str) -> Result<ParsedCommand> {
    let (command, redirect) = match find_unquoted(segment, ">>") {
        Some(pos) => (&segment[..pos], Some((&segment[pos + 2..], true))),
        None => match find_unquoted(segment, ">") {
            Some(pos) => (&segment[..pos], Some((&segment[pos + 1..], false))),
            None => (segment, None),
        },
    };

    let mut words = tokenize(command)?;
    let mut parsed = ParsedCommand::default();
    if let Some((text, append)) = redirect {
        let mut target_words = tokenize(text)?.into_iter();
        let target = target_words
            .next()
            .ok_or_else(|| QuestError::Syntax("missing redirect target".to_string()))?;
        words.extend(target_words);
        parsed.stdout_target = Some(target);
        parsed.append = append;
    }

    let mut words = words.into_iter();
    parsed.name = words.next().unwrap_or_default();
    parsed.args = words.collect();
    Ok(parsed)
}

/// Split input into words, honoring quotes.
///
/// Single quotes are literal. Inside double quotes `\"`, `\\` and `\$`
/// escape; any other backslash is kept. Outside quotes a backslash escapes
/// the next character.
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // A quoted empty string is still a word.
    let mut quoted = false;
    let mut chars = input.chars().peekable();
    let mut in_single = false;
    let mut in_double = false;

    while let Some(ch) = chars.next() {
        if in_single {
            if ch == '\'' {
                in_single = false;
            } else {
                current.push(ch);
            }
        } else if in_double {
            match ch {
                '"' => in_double = false,
                '\\' => match chars.next_if(|c| matches!(c, '"' | '\\' | '$')) {
                    Some(escaped) => current.push(escaped),
                    None => current.push('\\'),
                },
                _ => current.push(ch),
            }
        } else {
            match ch {
                '\'' => {
                    in_single = true;
                    quoted = true;
                },
                '"' => {
                    in_double = true;
                    quoted = true;
                },
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                },
                c if c.is_whitespace() => {
                    if !current.is_empty() || quoted {
                        tokens.push(std::mem::take(&mut current));
                    }
                    quoted = false;
                },
                _ => current.push(ch),
            }
        }
    }

    if in_single {
        return Err(QuestError::Syntax("unterminated single quote".to_string()));
    }
    if in_double {
        return Err(QuestError::Syntax("unterminated double quote".to_string()));
    }

    if !current.is_empty() || quoted {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Byte offset of the first occurrence of `needle` outside quotes and not
/// escaped by a backslash.
fn find_unquoted(input: &str, needle: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    let needle = needle.as_bytes();
    let mut in_single = false;
    let mut in_double = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_single {
            if b == b'\'' {
                in_single = false;
            }
        } else if in_double {
            if b == b'"' {
                in_double = false;
            } else if b == b'\\' {
                i += 1; // skip next
            }
        } else {
            match b {
                b'\'' => in_single = true,
                b'"' => in_double = true,
                b'\\' => i += 1,
                _ if bytes[i..].starts_with(needle) => return Some(i),
                _ => {},
            }
        }
        i += 1;
    }
    None
}

/// Simple glob matching: `*` matches any string, `?` matches one char.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    glob_match_inner(&p, &t, 0, 0, 0)
}

/// Maximum recursion depth for glob matching to prevent stack overflow.
const GLOB_MAX_DEPTH: usize = 256;

fn glob_match_inner(p: &[char], t: &[char], pi: usize, ti: usize, depth: usize) -> bool {
    if depth >= GLOB_MAX_DEPTH {
        return false;
    }
    if pi == p.len() {
        return ti == t.len();
    }
    match p[pi] {
        // Collapse runs of `*` so `**` costs no more than `*`.
        '*' if p.get(pi + 1) == Some(&'*') => glob_match_inner(p, t, pi + 1, ti, depth),
        '*' => (ti..=t.len()).any(|next| glob_match_inner(p, t, pi + 1, next, depth + 1)),
        c if ti < t.len() && (c == '?' || c == t[ti]) => {
            glob_match_inner(p, t, pi + 1, ti + 1, depth + 1)
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<String> {
        tokenize(line).unwrap()
    }

    #[test]
    fn tokenize_simple() {
        assert_eq!(words("ls -la  /tmp"), vec!["ls", "-la", "/tmp"]);
    }

    #[test]
    fn tokenize_single_quotes_are_literal() {
        assert_eq!(words(r#"echo 'a "b" $HOME \n'"#), vec!["echo", r#"a "b" $HOME \n"#]);
    }

    #[test]
    fn tokenize_double_quote_escapes() {
        assert_eq!(words(r#"echo "say \"hi\" \\ \$x \n""#), vec![
            "echo",
            r#"say "hi" \ $x \n"#
        ]);
    }

    #[test]
    fn tokenize_backslash_outside_quotes() {
        assert_eq!(words(r"touch my\ file"), vec!["touch", "my file"]);
    }

    #[test]
    fn tokenize_adjacent_quotes_join() {
        assert_eq!(words(r#"echo a'b'"c""#), vec!["echo", "abc"]);
    }

    #[test]
    fn tokenize_empty_quotes_are_a_word() {
        assert_eq!(words("echo '' x"), vec!["echo", "", "x"]);
    }

    #[test]
    fn tokenize_empty() {
        assert!(words("   ").is_empty());
    }

    #[test]
    fn tokenize_unterminated() {
        let err = tokenize("echo 'oops").unwrap_err();
        assert!(matches!(err, QuestError::Syntax(ref m) if m == "unterminated single quote"));
        let err = tokenize("echo \"oops").unwrap_err();
        assert!(matches!(err, QuestError::Syntax(ref m) if m == "unterminated double quote"));
    }

    #[test]
    fn parse_plain() {
        let p = parse("mkdir -p a/b").unwrap();
        assert_eq!(p.name, "mkdir");
        assert_eq!(p.args, vec!["-p", "a/b"]);
        assert!(p.stdout_target.is_none());
        assert!(p.next.is_none());
    }

    #[test]
    fn parse_redirect_truncate_and_append() {
        let p = parse("echo hello > f.txt").unwrap();
        assert_eq!(p.args, vec!["hello"]);
        assert_eq!(p.stdout_target.as_deref(), Some("f.txt"));
        assert!(!p.append);

        let p = parse("echo more >> f.txt").unwrap();
        assert_eq!(p.stdout_target.as_deref(), Some("f.txt"));
        assert!(p.append);
    }

    #[test]
    fn parse_redirect_without_spaces() {
        let p = parse("echo hi>>log").unwrap();
        assert_eq!(p.args, vec!["hi"]);
        assert_eq!(p.stdout_target.as_deref(), Some("log"));
        assert!(p.append);
    }

    #[test]
    fn parse_words_after_target_are_args() {
        let p = parse("echo a > out.txt b").unwrap();
        assert_eq!(p.args, vec!["a", "b"]);
        assert_eq!(p.stdout_target.as_deref(), Some("out.txt"));
    }

    #[test]
    fn parse_missing_target() {
        let err = parse("echo hi >").unwrap_err();
        assert!(matches!(err, QuestError::Syntax(_)));
    }

    #[test]
    fn quoted_operators_are_text() {
        let p = parse("echo 'a | b > c'").unwrap();
        assert_eq!(p.args, vec!["a | b > c"]);
        assert!(p.next.is_none());
        assert!(p.stdout_target.is_none());

        let p = parse(r"echo a \> b").unwrap();
        assert_eq!(p.args, vec!["a", ">", "b"]);
    }

    #[test]
    fn parse_pipeline_chain() {
        let p = parse("cat notes.txt | grep -i linux | wc -l").unwrap();
        assert_eq!(p.stages(), 3);
        assert_eq!(p.name, "cat");
        let second = p.next.as_ref().unwrap();
        assert_eq!(second.name, "grep");
        assert_eq!(second.args, vec!["-i", "linux"]);
        assert_eq!(second.next.as_ref().unwrap().name, "wc");
    }

    #[test]
    fn redirect_detected_per_stage() {
        let p = parse("ls > a.txt | cat").unwrap();
        assert_eq!(p.stdout_target.as_deref(), Some("a.txt"));
        let p = parse("ls | grep x > b.txt").unwrap();
        assert!(p.stdout_target.is_none());
        assert_eq!(p.next.unwrap().stdout_target.as_deref(), Some("b.txt"));
    }

    #[test]
    fn empty_stage() {
        let p = parse("  ").unwrap();
        assert!(p.is_empty());
        let p = parse("ls |").unwrap();
        assert!(p.next.unwrap().is_empty());
    }

    #[test]
    fn glob_match_star() {
        assert!(glob_match("*.txt", "notes.txt"));
        assert!(glob_match("*", ""));
        assert!(!glob_match("*.txt", "notes.py"));
        assert!(glob_match("a*b*c", "aXXbYYc"));
    }

    #[test]
    fn glob_match_question() {
        assert!(glob_match("t?st", "test"));
        assert!(!glob_match("t?st", "tst"));
    }

    #[test]
    fn glob_match_repeated_stars() {
        let long = "a".repeat(300);
        assert!(glob_match("****a", &long));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn plain_words_round_trip(ws in proptest::collection::vec("[a-zA-Z0-9_./-]{1,8}", 0..6)) {
                let line = ws.join(" ");
                prop_assert_eq!(tokenize(&line).unwrap(), ws);
            }

            #[test]
            fn single_quoting_preserves_text(text in "[^']{0,30}") {
                let line = format!("echo '{text}'");
                let toks = tokenize(&line).unwrap();
                prop_assert_eq!(toks.len(), 2);
                prop_assert_eq!(&toks[1], &text);
            }

            #[test]
            fn star_matches_everything(text in ".{0,40}") {
                prop_assert!(glob_match("*", &text));
            }
        }
    }
}
