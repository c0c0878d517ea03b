//! Unix-style permission bits.

use std::fmt;

use bitflags::bitflags;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

bitflags! {
    /// The nine rwx bits for user, group, and other.
    ///
    /// Bit values match the classic octal mode, so `0o755` maps directly to
    /// `USER_READ | USER_WRITE | USER_EXEC | GROUP_READ | ...`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permission: u16 {
        const OTHER_EXEC = 0o001;
        const OTHER_WRITE = 0o002;
        const OTHER_READ = 0o004;
        const GROUP_EXEC = 0o010;
        const GROUP_WRITE = 0o020;
        const GROUP_READ = 0o040;
        const USER_EXEC = 0o100;
        const USER_WRITE = 0o200;
        const USER_READ = 0o400;
    }
}

impl Permission {
    /// `rw-r--r--`, the default for new files.
    pub const FILE: Self = Self::from_bits_truncate(0o644);
    /// `rwxr-xr-x`, the default for new directories.
    pub const DIR: Self = Self::from_bits_truncate(0o755);
    /// `rw-------`.
    pub const PRIVATE: Self = Self::from_bits_truncate(0o600);

    /// Build from an octal mode such as `0o755`. Bits above `0o777` are dropped.
    pub const fn from_octal(mode: u16) -> Self {
        Self::from_bits_truncate(mode)
    }

    /// The octal mode, always within `0o000..=0o777`.
    pub const fn to_octal(self) -> u16 {
        self.bits()
    }

    /// Parse a textual octal mode (`"755"`, `"0644"`).
    pub fn parse_mode(text: &str) -> Option<Self> {
        if text.is_empty() || text.len() > 4 || !text.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return None;
        }
        let mode = u16::from_str_radix(text, 8).ok()?;
        if mode > 0o777 {
            return None;
        }
        Some(Self::from_octal(mode))
    }

    /// Apply a symbolic mode expression (`+x`, `u+w`, `go-rwx`, `a=r,u+w`).
    ///
    /// Returns `None` when the expression is malformed.
    pub fn apply_symbolic(self, expr: &str) -> Option<Self> {
        let mut result = self;
        for clause in expr.split(',') {
            let op_pos = clause.find(['+', '-', '='])?;
            let (who, rest) = clause.split_at(op_pos);
            let mut rest = rest.chars();
            let op = rest.next()?;

            let mut mask = Self::empty();
            let who = if who.is_empty() { "a" } else { who };
            for c in who.chars() {
                mask |= match c {
                    'u' => Self::USER_READ | Self::USER_WRITE | Self::USER_EXEC,
                    'g' => Self::GROUP_READ | Self::GROUP_WRITE | Self::GROUP_EXEC,
                    'o' => Self::OTHER_READ | Self::OTHER_WRITE | Self::OTHER_EXEC,
                    'a' => Self::all(),
                    _ => return None,
                };
            }

            let mut bits = Self::empty();
            for c in rest {
                bits |= match c {
                    'r' => Self::USER_READ | Self::GROUP_READ | Self::OTHER_READ,
                    'w' => Self::USER_WRITE | Self::GROUP_WRITE | Self::OTHER_WRITE,
                    'x' => Self::USER_EXEC | Self::GROUP_EXEC | Self::OTHER_EXEC,
                    _ => return None,
                };
            }
            let bits = bits & mask;

            result = match op {
                '+' => result | bits,
                '-' => result - bits,
                _ => (result - mask) | bits,
            };
        }
        Some(result)
    }
}

impl fmt::Display for Permission {
    /// Renders the `ls -l` form, e.g. `rwxr-xr-x`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SLOTS: [(Permission, char); 9] = [
            (Permission::USER_READ, 'r'),
            (Permission::USER_WRITE, 'w'),
            (Permission::USER_EXEC, 'x'),
            (Permission::GROUP_READ, 'r'),
            (Permission::GROUP_WRITE, 'w'),
            (Permission::GROUP_EXEC, 'x'),
            (Permission::OTHER_READ, 'r'),
            (Permission::OTHER_WRITE, 'w'),
            (Permission::OTHER_EXEC, 'x'),
        ];
        for (flag, ch) in SLOTS {
            let c = if self.contains(flag) { ch } else { '-' };
            fmt::Write::write_char(f, c)?;
        }
        Ok(())
    }
}

impl Serialize for Permission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:03o}", self.to_octal()))
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse_mode(&text)
            .ok_or_else(|| de::Error::custom(format!("invalid permission mode: {text:?}")))
    }
}
