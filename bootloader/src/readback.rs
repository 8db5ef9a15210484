// SPDX-FileCopyrightText: 2026 Lockboot Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Diagnostic readback engine.
//!
//! Streams a requested region of program memory to the host once the
//! request authenticates under the readback key. The reply carries no tag
//! and no framing: the host knows how many bytes it asked for. The tag
//! gates who may read, not what they see on the wire.

use consts::{
    MAC_ERROR, NONCE_BYTES, OK, REQUEST_SIZE, TAG_BYTES, TOTAL_PROG_MEM_BYTES,
    WATCHDOG_TIMEOUT_MS,
};
use host_protocol::{mac, ReadbackRequest};

use crate::hal::{Channel, Hal};
use crate::{Error, Keys};

/// Serve one readback request.
pub fn run<H: Hal>(hal: &mut H, keys: &Keys) -> Result<(), Error> {
    hal.watchdog_arm(WATCHDOG_TIMEOUT_MS);

    let mut tag = [0u8; TAG_BYTES];
    hal.read_exact(Channel::Host, &mut tag);
    hal.watchdog_kick();

    let mut mac_input = [0u8; NONCE_BYTES + REQUEST_SIZE];
    hal.read_exact(Channel::Host, &mut mac_input[..NONCE_BYTES]);
    hal.watchdog_kick();

    let mut request = [0u8; REQUEST_SIZE];
    hal.read_exact(Channel::Host, &mut request);
    mac_input[NONCE_BYTES..].copy_from_slice(&request);
    hal.watchdog_kick();

    hal.serial_write_byte(Channel::Host, OK);
    hal.watchdog_kick();

    let expected = mac::tag(&keys.readback, &mac_input);
    hal.watchdog_kick();
    if !mac::verify(&tag, &expected) {
        hal.serial_write_byte(Channel::Host, MAC_ERROR);
        return Err(Error::Mac);
    }
    hal.serial_write_byte(Channel::Host, OK);
    hal.watchdog_kick();

    let request = ReadbackRequest::decode(&request);
    debug!("readback of {} bytes from {:#x}", request.length, request.start_addr);

    // The end address is clamped to the end of physical flash, bootloader
    // section included, and the addition saturates, so an oversized or
    // wrapping request yields a short (or empty) reply instead of running
    // off the end.
    let end = request
        .start_addr
        .saturating_add(request.length)
        .min(TOTAL_PROG_MEM_BYTES);
    for address in request.start_addr..end {
        let byte = hal.far_read(address);
        hal.serial_write_byte(Channel::Host, byte);
        hal.watchdog_kick();
    }
    Ok(())
}
