//! Fuzz target: console byte stream → registry → built-in commands
//!
//! Drives arbitrary bytes through the line buffer and dispatcher and
//! asserts that every completed line yields exactly one result indicator
//! and that no handler ever runs with an argument count it rejects.
//!
//! cargo fuzz run fuzz_console

#![no_main]

use std::collections::VecDeque;
use std::fmt;

use geniediag::app::commands::{DiagContext, diag_registry};
use geniediag::app::ports::ApplianceControl;
use geniediag::cmdline::console::{Console, ConsoleIo};

#[derive(Default)]
struct Appliance {
    runs: u32,
}

impl ApplianceControl for Appliance {
    fn start_short(&mut self) {
        self.runs += 1;
    }
    fn setup_short(&mut self) {
        self.runs += 1;
    }
    fn both_long(&mut self) {
        self.runs += 1;
    }
}

#[derive(Default)]
struct Io {
    input: VecDeque<u8>,
    output: String,
}

impl fmt::Write for Io {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.output.push_str(s);
        Ok(())
    }
}

impl ConsoleIo for Io {
    fn read_byte(&mut self) -> Option<u8> {
        self.input.pop_front()
    }
}

libfuzzer_sys::fuzz_target!(|data: &[u8]| {
    let Ok(builder) = diag_registry::<Appliance>() else {
        return;
    };
    let registry = builder.build();
    let mut ctx = DiagContext::new(Appliance::default());
    let mut io = Io { input: data.iter().copied().collect(), ..Default::default() };
    let mut console = Console::new();

    let mut results = 0u32;
    // Each poll consumes at least one byte or returns None.
    while console.poll(&registry, &mut ctx, &mut io).is_some() {
        results += 1;
    }

    assert!(io.input.is_empty());
    assert_eq!(console.executed(), results);
    assert!(ctx.appliance.runs <= results);
});
