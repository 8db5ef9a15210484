// SPDX-FileCopyrightText: 2026 Lockboot Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Secure serial bootloader core.
//!
//! This crate implements the firmware-side protocol engines:
//!
//! - Install: authenticate, decrypt and commit firmware frames to program
//!   memory, last page first, with rollback protection.
//! - Readback: stream an authenticated region of program memory to the
//!   host.
//! - Handoff: emit the release message and transfer control to the
//!   installed application.
//!
//! All hardware access goes through the [`hal::Hal`] trait so the engines
//! run unchanged on the target and under `cargo test` against an in-memory
//! board model. Every protocol error is terminal: the engine emits its
//! status byte and the device spins until the watchdog resets it.

#![no_std]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod boot;
pub mod hal;
pub mod install;
pub mod readback;

#[cfg(test)]
mod tests;

use consts::{CONFIGURED, MODE_BOOT, MODE_READBACK, MODE_UPDATE, WATCHDOG_TIMEOUT_MS};
use hal::{Channel, Hal, NvField};

/// The two secrets baked into the bootloader image at build time.
pub struct Keys {
    /// Authenticates and decrypts install frames.
    pub update: [u8; consts::KEY_BYTES],
    /// Authenticates readback requests.
    pub readback: [u8; consts::KEY_BYTES],
}

/// Terminal protocol errors.
///
/// By the time an engine returns one of these the corresponding status byte
/// has already been emitted on the host channel; the caller's only job is
/// to wait for the watchdog.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The received tag does not match the material it covers.
    Mac,
    /// Non-zero declared version lower than the installed version.
    Version,
    /// The first frame declares an image that does not fit in program
    /// memory, or a frame decodes to an impossible layout. Reported to the
    /// host as a tag failure.
    Malformed,
    /// Handoff requested with no installed image.
    NoImage,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Mac => write!(f, "tag verification failed"),
            Error::Version => write!(f, "version rollback refused"),
            Error::Malformed => write!(f, "frame outside program memory"),
            Error::NoImage => write!(f, "no image installed"),
        }
    }
}

/// Top-level controller: one-time configuration gate, mode selection,
/// dispatch.
///
/// Runs forever in the sense that every path out of it is a watchdog reset
/// or a jump into the application.
pub fn run<H: Hal>(hal: &mut H, keys: &Keys) -> ! {
    hal.serial_flush(Channel::Host);
    hal.watchdog_arm(WATCHDOG_TIMEOUT_MS);
    hal.watchdog_kick();

    // Nothing works until the one-time CONFIGURED byte has been seen. Any
    // other byte is consumed and ignored; the watchdog is kept alive while
    // waiting.
    while hal.kv_get(NvField::Configured) == 0 {
        while !hal.serial_data_available(Channel::Host) {
            hal.watchdog_kick();
        }
        if hal.serial_read_byte(Channel::Host) == CONFIGURED {
            hal.kv_update(NvField::Configured, 1);
            hal.watchdog_kick();
            hal.serial_write_byte(Channel::Host, CONFIGURED);
            hal.kv_update(NvField::FwVersion, 1);
            hal.watchdog_kick();
            info!("configured");
        }
    }

    let straps = hal.read_straps();
    hal.watchdog_kick();

    if straps.update {
        hal.serial_write_byte(Channel::Host, MODE_UPDATE);
        info!("entering install mode");
        match install::run(hal, keys) {
            Ok(()) => info!("install complete"),
            Err(e) => warn!("install failed: {}", e),
        }
        hal.halt()
    } else if straps.readback {
        hal.serial_write_byte(Channel::Host, MODE_READBACK);
        info!("entering readback mode");
        match readback::run(hal, keys) {
            Ok(()) => info!("readback complete"),
            Err(e) => warn!("readback failed: {}", e),
        }
        hal.halt()
    } else {
        hal.serial_write_byte(Channel::Host, MODE_BOOT);
        info!("entering boot mode");
        match boot::run(hal) {
            Ok(never) => match never {},
            Err(e) => {
                warn!("handoff refused: {}", e);
                hal.halt()
            }
        }
    }
}
