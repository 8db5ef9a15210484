// SPDX-FileCopyrightText: 2026 Lockboot Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Application handoff.
//!
//! Emits the release message stored directly above the installed image,
//! then disarms the watchdog and jumps to the reset vector at address 0.

use consts::{MESSAGE_END, WATCHDOG_TIMEOUT_MS};
use core::convert::Infallible;

use crate::hal::{Channel, Hal, NvField};
use crate::Error;

/// Hand control to the installed application.
///
/// Returns an error only when no image is installed; otherwise it never
/// returns.
pub fn run<H: Hal>(hal: &mut H) -> Result<Infallible, Error> {
    hal.watchdog_arm(WATCHDOG_TIMEOUT_MS);

    // The release message sits immediately after the image.
    let start = u32::from(hal.kv_get(NvField::FwBytes));
    let end = start + u32::from(hal.kv_get(NvField::MessageBytes));

    // Zero installed bytes means a factory-fresh or half-installed device.
    if start == 0 {
        return Err(Error::NoImage);
    }
    hal.watchdog_kick();

    for address in start..end {
        let byte = hal.far_read(address);
        hal.serial_write_byte(Channel::App, byte);
        hal.watchdog_kick();
    }
    hal.serial_write_byte(Channel::App, MESSAGE_END);

    hal.watchdog_kick();
    hal.watchdog_disarm();

    info!("jumping to application");
    hal.jump_to(0)
}
