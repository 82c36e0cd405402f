//! Built-in diagnostic commands.
//!
//! `start`, `setup` and `lock` take no arguments and replay the matching
//! button sequence on the appliance.  `echo` prints its arguments back.
//! External command sets (arm, dosage, tap, drain, …) register into the
//! same table through [`RegistryBuilder::extend`].

use crate::cmdline::console::{Reply, ReplySink};
use crate::cmdline::{CommandEntry, CommandRegistry, RegistryBuilder, ResultCode};
use crate::error::RegistryError;

use super::ports::ApplianceControl;

/// State the diagnostic commands act on.
pub struct DiagContext<A> {
    pub appliance: A,
    reply: Reply,
}

impl<A: ApplianceControl> DiagContext<A> {
    pub fn new(appliance: A) -> Self {
        Self {
            appliance,
            reply: Reply::new(),
        }
    }
}

impl<A> ReplySink for DiagContext<A> {
    fn reply_mut(&mut self) -> &mut Reply {
        &mut self.reply
    }
}

fn start<A: ApplianceControl>(ctx: &mut DiagContext<A>, argv: &[&str]) -> ResultCode {
    if argv.len() > 1 {
        return ResultCode::Syntax;
    }
    ctx.appliance.start_short();
    ResultCode::Ok
}

fn setup<A: ApplianceControl>(ctx: &mut DiagContext<A>, argv: &[&str]) -> ResultCode {
    if argv.len() > 1 {
        return ResultCode::Syntax;
    }
    ctx.appliance.setup_short();
    ResultCode::Ok
}

fn lock<A: ApplianceControl>(ctx: &mut DiagContext<A>, argv: &[&str]) -> ResultCode {
    if argv.len() > 1 {
        return ResultCode::Syntax;
    }
    ctx.appliance.both_long();
    ResultCode::Ok
}

fn echo<A>(ctx: &mut DiagContext<A>, argv: &[&str]) -> ResultCode {
    for (i, arg) in argv.iter().skip(1).enumerate() {
        if i > 0 {
            let _ = ctx.reply.push(' ');
        }
        // Truncated output is still a successful echo.
        let _ = ctx.reply.push_str(arg);
    }
    ResultCode::Ok
}

/// The commands this core provides, in table order.
pub fn builtin_commands<A: ApplianceControl>() -> [CommandEntry<DiagContext<A>>; 4] {
    [
        CommandEntry::new("echo", echo::<A>),
        CommandEntry::new("start", start::<A>),
        CommandEntry::new("setup", setup::<A>),
        CommandEntry::new("lock", lock::<A>),
    ]
}

/// Builder pre-loaded with the built-ins; callers add their own sets and
/// call `build()`.
pub fn diag_registry<A: ApplianceControl>() -> Result<RegistryBuilder<DiagContext<A>>, RegistryError> {
    let mut builder = CommandRegistry::builder();
    builder.extend(&builtin_commands::<A>())?;
    Ok(builder)
}
