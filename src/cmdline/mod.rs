//! Command registry and dispatcher.
//!
//! ```text
//!  "start now" ──tokenize──▶ ["start", "now"] ──lookup──▶ start(ctx, argv) ──▶ ResultCode
//! ```
//!
//! The table is built once at startup and scanned linearly, first match
//! wins, so lookups are deterministic whatever the table size.  Handlers
//! receive the whole token list (`argv[0]` is the command name) and do
//! their own arity checks.  Every outcome, including "no such command",
//! comes back as a [`ResultCode`]; nothing escapes this boundary.

pub mod console;
pub mod line;

use core::fmt;

use log::{debug, warn};

use crate::error::RegistryError;

/// Upper bound on registered commands.
pub const MAX_COMMANDS: usize = 32;
/// Upper bound on tokens per line, command name included.
pub const MAX_ARGS: usize = 8;

/// Outcome of one command line, reported verbatim to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Ok,
    /// Argument-count contract violated.
    Syntax,
    /// No table entry matched the command name.
    UnknownCommand,
    /// Code defined by the handler's subsystem.
    Subsystem(u8),
}

impl ResultCode {
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Syntax => write!(f, "Syntax error"),
            Self::UnknownCommand => write!(f, "Unknown command"),
            Self::Subsystem(code) => write!(f, "Error {code}"),
        }
    }
}

/// Command handler.  `argv.len()` is the argument count.
pub type Handler<C> = fn(&mut C, &[&str]) -> ResultCode;

/// One row of the command table.
pub struct CommandEntry<C> {
    pub name: &'static str,
    pub handler: Handler<C>,
}

impl<C> CommandEntry<C> {
    pub const fn new(name: &'static str, handler: Handler<C>) -> Self {
        Self { name, handler }
    }
}

impl<C> Clone for CommandEntry<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for CommandEntry<C> {}

impl<C> fmt::Debug for CommandEntry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry").field("name", &self.name).finish()
    }
}

/// Split a line on ASCII whitespace.  `None` if it has more than
/// [`MAX_ARGS`] tokens.
pub fn tokenize(line: &str) -> Option<heapless::Vec<&str, MAX_ARGS>> {
    let mut argv = heapless::Vec::new();
    for token in line.split_ascii_whitespace() {
        argv.push(token).ok()?;
    }
    Some(argv)
}

// ───────────────────────────────────────────────────────────────
// Builder
// ───────────────────────────────────────────────────────────────

/// Collects entries before the table is frozen.
pub struct RegistryBuilder<C> {
    entries: heapless::Vec<CommandEntry<C>, MAX_COMMANDS>,
}

impl<C> RegistryBuilder<C> {
    pub fn new() -> Self {
        Self {
            entries: heapless::Vec::new(),
        }
    }

    /// Append one command.  A name that is already present is kept but
    /// can never be reached, since the earlier entry wins.
    pub fn register(&mut self, name: &'static str, handler: Handler<C>) -> Result<&mut Self, RegistryError> {
        if name.is_empty() || name.bytes().any(|b| b.is_ascii_whitespace()) {
            return Err(RegistryError::InvalidName);
        }
        if self.entries.iter().any(|e| e.name == name) {
            warn!("cmdline: '{}' registered twice, later entry is shadowed", name);
        }
        self.entries
            .push(CommandEntry::new(name, handler))
            .map_err(|_| RegistryError::TableFull)?;
        Ok(self)
    }

    /// Append a whole command set (e.g. from an external subsystem).
    pub fn extend(&mut self, set: &[CommandEntry<C>]) -> Result<&mut Self, RegistryError> {
        for entry in set {
            self.register(entry.name, entry.handler)?;
        }
        Ok(self)
    }

    pub fn build(self) -> CommandRegistry<C> {
        debug!("cmdline: {} commands registered", self.entries.len());
        CommandRegistry {
            entries: self.entries,
        }
    }
}

impl<C> Default for RegistryBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// Registry
// ───────────────────────────────────────────────────────────────

/// Immutable, ordered command table.
pub struct CommandRegistry<C> {
    entries: heapless::Vec<CommandEntry<C>, MAX_COMMANDS>,
}

impl<C> CommandRegistry<C> {
    pub fn builder() -> RegistryBuilder<C> {
        RegistryBuilder::new()
    }

    /// First entry whose name matches exactly (case-sensitive).
    pub fn lookup(&self, name: &str) -> Option<&CommandEntry<C>> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Tokenize `line`, look the command up, and run it.
    ///
    /// A blank line does nothing and reports `Ok`.
    pub fn dispatch(&self, ctx: &mut C, line: &str) -> ResultCode {
        let Some(argv) = tokenize(line) else {
            return ResultCode::Syntax;
        };
        let Some(&name) = argv.first() else {
            return ResultCode::Ok;
        };
        match self.lookup(name) {
            Some(entry) => (entry.handler)(ctx, &argv),
            None => ResultCode::UnknownCommand,
        }
    }

    /// Registered names in table order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
