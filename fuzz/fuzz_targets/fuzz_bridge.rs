//! Fuzz target: `InterruptBridge::service`
//!
//! Each input byte pair is one invocation: the first byte is the pending
//! flag set, the second the port value.  Asserts that every pending flag
//! is serviced at most once and that the sensor callback fires exactly
//! when a masked port bit changed.
//!
//! cargo fuzz run fuzz_bridge

#![no_main]

use geniediag::app::ports::{FlagRegister, InterruptHandlers, PortRegister};
use geniediag::bridge::{InterruptBridge, IrqFlags};

struct Regs {
    flags: IrqFlags,
    port: u8,
}

impl FlagRegister for Regs {
    fn read(&self) -> IrqFlags {
        self.flags
    }
    fn clear(&mut self, flag: IrqFlags) {
        self.flags.remove(flag);
    }
}

impl PortRegister for Regs {
    fn read_port(&self) -> u8 {
        self.port
    }
}

#[derive(Default)]
struct Counts {
    calls: u32,
    edges: u32,
}

impl InterruptHandlers for Counts {
    fn timer_tick(&mut self) {
        self.calls += 1;
    }
    fn sample_tick(&mut self) {
        self.calls += 1;
    }
    fn sensor_edge(&mut self) {
        self.calls += 1;
        self.edges += 1;
    }
    fn byte_received(&mut self) {
        self.calls += 1;
    }
    fn byte_transmitted(&mut self) {
        self.calls += 1;
    }
}

libfuzzer_sys::fuzz_target!(|data: &[u8]| {
    let Some((&mask, rest)) = data.split_first() else {
        return;
    };
    let mut regs = Regs { flags: IrqFlags::empty(), port: 0 };
    let mut bridge = InterruptBridge::new(&regs, mask);
    let mut previous = 0u8;

    for pair in rest.chunks_exact(2) {
        let pending = IrqFlags::from_bits_truncate(pair[0]);
        regs.flags = pending;
        regs.port = pair[1];

        let mut counts = Counts::default();
        let serviced = bridge.service(&mut regs, &mut counts);

        assert!(serviced.len() <= pending.bits().count_ones() as usize);
        assert_eq!(serviced.len() as u32, counts.calls);
        if pending.contains(IrqFlags::PORT_CHANGE) {
            let changed = (pair[1] ^ previous) & mask;
            assert_eq!(counts.edges, u32::from(changed != 0));
            previous = pair[1];
        } else {
            assert_eq!(counts.edges, 0);
        }
    }
});
