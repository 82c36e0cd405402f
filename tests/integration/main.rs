//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a stage of the boot/run
//! core against mock hardware.  All tests run on the host with no real
//! hardware required.

mod boot_tests;
mod bridge_tests;
mod mock_hw;
mod service_tests;
