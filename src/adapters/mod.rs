//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter         | Implements                   | Connects to                |
//! |-----------------|------------------------------|----------------------------|
//! | `collaborators` | Subsystem, ApplianceControl  | Serial log (stand-ins)     |
//! | `irq_flags`     | FlagRegister, PortRegister   | Timer callbacks, GPIO      |
//! | `reset_latches` | ResetLatches                 | ESP32 reset reason         |
//! | `wireless`      | WirelessLink                 | AT-command BT module       |

pub mod collaborators;
pub mod irq_flags;
pub mod reset_latches;
pub mod wireless;
