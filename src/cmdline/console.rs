//! Console work function: bytes in, command results out.
//!
//! Each poll drains the receive side until one line completes or no byte
//! is waiting, dispatches that line, then writes the handler's reply (if
//! any) followed by the result indicator.  Later lines stay queued for the
//! next scheduler turn so one poll never runs more than one command.

use core::fmt;

use log::{debug, info};

use super::line::{Assembled, LineBuffer};
use super::{CommandRegistry, ResultCode};

/// Text a handler wants shown before the result indicator.
pub const REPLY_CAPACITY: usize = 128;
pub type Reply = heapless::String<REPLY_CAPACITY>;

/// Byte stream the console runs over.
pub trait ConsoleIo: fmt::Write {
    fn read_byte(&mut self) -> Option<u8>;
}

/// Command context that can carry a reply back to the console.
pub trait ReplySink {
    fn reply_mut(&mut self) -> &mut Reply;
}

#[derive(Debug, Default)]
pub struct Console {
    line: LineBuffer,
    executed: u32,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blocking.  Returns the result of the line run on this call.
    pub fn poll<C, IO>(
        &mut self,
        registry: &CommandRegistry<C>,
        ctx: &mut C,
        io: &mut IO,
    ) -> Option<ResultCode>
    where
        C: ReplySink,
        IO: ConsoleIo,
    {
        while let Some(byte) = io.read_byte() {
            let code = match self.line.push(byte) {
                None => continue,
                Some(Assembled::Overflow) => ResultCode::Syntax,
                Some(Assembled::Line) => {
                    debug!("console: '{}'", self.line.as_str());
                    registry.dispatch(ctx, self.line.as_str())
                }
            };
            self.executed = self.executed.wrapping_add(1);
            Self::report(ctx, io, code);
            return Some(code);
        }
        None
    }

    /// Lines handled since boot.
    pub fn executed(&self) -> u32 {
        self.executed
    }

    fn report<C: ReplySink, IO: ConsoleIo>(ctx: &mut C, io: &mut IO, code: ResultCode) {
        let reply = ctx.reply_mut();
        // A full transmit ring loses output; the command has already run.
        if !reply.is_empty() {
            let _ = writeln!(io, "{}", reply);
            reply.clear();
        }
        let _ = writeln!(io, "{}", code);
        if !code.is_ok() {
            info!("console: {}", code);
        }
    }
}
