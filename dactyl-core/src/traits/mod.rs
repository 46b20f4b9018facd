//! Hardware abstraction traits
//!
//! These traits define the interface between the sequencing logic and
//! hardware-specific implementations.

pub mod actuator;
pub mod bus;

pub use actuator::{ActuatorPort, DispatchError, ServoDrive, SwitchDrive};
pub use bus::{ChannelMux, SlaveSerial};
