// SPDX-FileCopyrightText: 2026 Lockboot Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Host-side tests for the protocol engines, run against an in-memory
//! board model.


use consts::{KEY_BYTES, NONCE_BYTES, PAGE_SIZE};
use host_protocol::{seal, Frame};

use crate::Keys;
use mock::MockHal;

pub const UPDATE_KEY: [u8; KEY_BYTES] = [0xA5; KEY_BYTES];
pub const READBACK_KEY: [u8; KEY_BYTES] = [0x5A; KEY_BYTES];

pub fn keys() -> Keys {
    Keys {
        update: UPDATE_KEY,
        readback: READBACK_KEY,
    }
}

/// Build a frame whose page payload starts with `data` and is zero-filled
/// to the page size.
pub fn frame(frame_no: u8, version: u16, data: &[u8], is_message: bool) -> Frame {
    let mut page = [0u8; PAGE_SIZE];
    page[..data.len()].copy_from_slice(data);
    Frame {
        data: page,
        data_size: data.len() as u16,
        version,
        frame_no,
        is_message,
    }
}

/// Seal `frame` under the install key with a fixed per-frame nonce and
/// queue it on the host channel.
pub fn feed_frame(hal: &mut MockHal, frame: &Frame, nonce_seed: u8) {
    let nonce = [nonce_seed; NONCE_BYTES];
    hal.feed(&seal::seal_frame(frame, &UPDATE_KEY, &nonce));
}
