// SPDX-FileCopyrightText: 2026 Lockboot Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Firmware install engine.
//!
//! Receives sealed frames on the host channel, authenticates and decrypts
//! each one, and commits it to program memory. The first frame carries the
//! highest page number and fixes the frame count; pages are programmed in
//! descending order so page 0, with the reset vector, is written last and a
//! half-finished install never yields a bootable image.

use consts::{
    BOX_ZERO_BYTES, FRAME_SIZE, MAC_ERROR, NONCE_BYTES, OK, PAGE_SIZE, PROG_MEM_BYTES,
    PROTECTED_SIZE, TAG_BYTES, VERSION_ERROR, WATCHDOG_TIMEOUT_MS, ZERO_BYTES,
};
use host_protocol::{mac, Frame};
use salsa20::cipher::{KeyIvInit, StreamCipher};
use salsa20::XSalsa20;

use crate::hal::{Channel, Hal, NvField};
use crate::{Error, Keys};

const MAC_INPUT_SIZE: usize = NONCE_BYTES + PROTECTED_SIZE;
const PADDED_SIZE: usize = ZERO_BYTES + FRAME_SIZE;

const PAGE: u32 = PAGE_SIZE as u32;

/// Receive and commit one complete image.
///
/// On any protocol error the corresponding status byte has been sent and
/// no further frame state is committed; the caller parks the device for
/// the watchdog.
pub fn run<H: Hal>(hal: &mut H, keys: &Keys) -> Result<(), Error> {
    let mut frames_received: u16 = 0;
    let mut num_frames: u16 = 0;
    let mut address: u32 = 0;

    hal.watchdog_arm(WATCHDOG_TIMEOUT_MS);

    while !hal.serial_data_available(Channel::Host) {
        hal.watchdog_kick();
    }

    loop {
        let mut tag = [0u8; TAG_BYTES];
        hal.read_exact(Channel::Host, &mut tag);
        hal.watchdog_kick();

        // The protected field feeds two buffers: the tag input, where it
        // sits behind the nonce, and the decryption buffer, where the
        // 16-byte zero prefix stripped on the wire is reconstructed.
        let mut mac_input = [0u8; MAC_INPUT_SIZE];
        let mut padded = [0u8; PADDED_SIZE];
        hal.read_exact(Channel::Host, &mut padded[BOX_ZERO_BYTES..]);
        mac_input[NONCE_BYTES..].copy_from_slice(&padded[BOX_ZERO_BYTES..]);
        hal.watchdog_kick();

        let mut nonce = [0u8; NONCE_BYTES];
        hal.read_exact(Channel::Host, &mut nonce);
        mac_input[..NONCE_BYTES].copy_from_slice(&nonce);
        hal.watchdog_kick();

        let expected = mac::tag(&keys.update, &mac_input);
        hal.watchdog_kick();
        if !mac::verify(&tag, &expected) {
            hal.serial_write_byte(Channel::Host, MAC_ERROR);
            return Err(Error::Mac);
        }
        hal.serial_write_byte(Channel::Host, OK);
        hal.watchdog_kick();

        // In-place stream decrypt. The first 32 plaintext bytes are the
        // secretbox padding and are discarded below.
        let mut cipher = XSalsa20::new((&keys.update).into(), (&nonce).into());
        cipher.apply_keystream(&mut padded);
        hal.serial_write_byte(Channel::Host, OK);

        let frame = match Frame::decode(&padded[ZERO_BYTES..]) {
            Ok(frame) => frame,
            Err(_) => {
                hal.serial_write_byte(Channel::Host, MAC_ERROR);
                return Err(Error::Malformed);
            }
        };
        hal.watchdog_kick();

        // Version policy, re-evaluated on every frame: a non-zero version
        // below the installed one is a rollback; version 0 pins the zero
        // flag without touching the installed version.
        let current = hal.kv_get(NvField::FwVersion);
        if frame.version != 0 && frame.version < current {
            hal.serial_write_byte(Channel::Host, VERSION_ERROR);
            return Err(Error::Version);
        } else if frame.version == 0 {
            hal.kv_update(NvField::FwZero, 1);
        } else {
            hal.kv_update(NvField::FwVersion, frame.version);
            hal.kv_update(NvField::FwZero, 0);
        }
        hal.watchdog_kick();

        // The first frame is the single source of truth for the frame
        // count and the top of the image.
        if frames_received == 0 {
            num_frames = u16::from(frame.frame_no) + 1;
            address = u32::from(frame.frame_no) * PAGE;
            if u32::from(num_frames) * PAGE > PROG_MEM_BYTES {
                hal.serial_write_byte(Channel::Host, MAC_ERROR);
                return Err(Error::Malformed);
            }
            debug!("first frame: {} pages ending at {:#x}", num_frames, address);

            hal.kv_update(NvField::MessageBytes, 0);
            hal.kv_update(NvField::FwBytes, 0);

            // Clear the page above the image so stale bytes of a larger
            // previous install cannot trail the new one. Skipped when the
            // image already ends at the top of program memory.
            let above = address + PAGE;
            if above < PROG_MEM_BYTES {
                hal.page_erase(above);
            }
        }

        write_page(hal, address, &frame.data[..usize::from(frame.data_size)]);
        hal.watchdog_kick();

        if frame.is_message {
            let bytes = hal.kv_get(NvField::MessageBytes);
            hal.kv_update(NvField::MessageBytes, bytes + frame.data_size);
        } else {
            let bytes = hal.kv_get(NvField::FwBytes);
            hal.kv_update(NvField::FwBytes, bytes + PAGE_SIZE as u16);
        }
        address = address.wrapping_sub(PAGE);
        hal.watchdog_kick();

        hal.serial_write_byte(Channel::Host, OK);
        frames_received += 1;
        trace!("frame {}/{} committed", frames_received, num_frames);
        if frames_received == num_frames {
            return Ok(());
        }
    }
}

/// Program one page: erase, stage `data` word by word, commit.
///
/// An odd trailing byte is staged with a zeroed high byte; the rest of the
/// page keeps its erased value.
fn write_page<H: Hal>(hal: &mut H, address: u32, data: &[u8]) {
    hal.page_erase(address);

    for (i, pair) in data.chunks(2).enumerate() {
        let lo = pair[0];
        let hi = if pair.len() == 2 { pair[1] } else { 0 };
        hal.page_fill_word(address + (i as u32) * 2, u16::from_le_bytes([lo, hi]));
    }
    hal.watchdog_kick();

    hal.page_commit(address);
}
