//! Joint Bus Communication Protocol
//!
//! This crate defines the single-byte protocol spoken between the master
//! hand controller and the slave joint controllers. The physical layer is a
//! shared half-duplex serial line routed to one slave at a time by an
//! external multiplexer, so every exchange is one command byte out and at
//! most one reply byte back.
//!
//! # Protocol Overview
//!
//! | Byte          | Meaning                      | Reply                |
//! |---------------|------------------------------|----------------------|
//! | `'a'`..`'e'`  | seek setpoint slot 1-5       | none                 |
//! | `'S'`         | stop (disable drive)         | `'s'`                |
//! | `'G'`         | go (enable drive)            | `'g'`                |
//! | `'C'`         | toggle calibration           | `'c'`                |
//! | `'1'`-`'9'`,`'0'` | identify as motor 1-10   | `'!'`                |
//! | `'E'`         | read encoder count           | 1 byte, count / 4    |
//! | `'Q'`         | position-reached query       | reserved, none       |
//!
//! Setpoint selection was acknowledged with `'!'` in an earlier board
//! revision; the current slaves stay silent, and masters must tolerate
//! either.

#![no_std]
#![deny(unsafe_code)]

pub mod channel;
pub mod command;

pub use channel::{
    is_motor_channel, pack_count, unpack_count, MAX_CHANNEL, MOTOR_CHANNELS, SWITCH_CHANNEL,
    WRIST_FLEX_CHANNEL, WRIST_TWIST_CHANNEL,
};
pub use command::{Command, Reply, SETPOINT_SLOTS};
