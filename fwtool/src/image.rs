// SPDX-FileCopyrightText: 2026 Lockboot Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Splits a raw image and its release message into install frames.

use anyhow::{bail, Result};
use consts::{PAGE_SIZE, PROG_MEM_BYTES};
use host_protocol::Frame;

/// Build the install frames for `image` and `message`, in the order the
/// device consumes them: highest page number first, page 0 last.
///
/// Application pages occupy pages `0..` and the release message the pages
/// directly above, so the device finds the message at the address its
/// `fw_bytes` counter ends on.
pub fn build_frames(image: &[u8], message: &[u8], version: u16) -> Result<Vec<Frame>> {
    if image.is_empty() {
        bail!("image is empty");
    }

    let fw_pages = image.len().div_ceil(PAGE_SIZE);
    let message_pages = message.len().div_ceil(PAGE_SIZE);
    let total_pages = fw_pages + message_pages;
    if total_pages > usize::from(u8::MAX) + 1 {
        bail!("image and message need {total_pages} frames, the frame number is a single byte");
    }
    if (total_pages * PAGE_SIZE) as u32 > PROG_MEM_BYTES {
        bail!(
            "image and message span {} bytes, program memory holds {}",
            total_pages * PAGE_SIZE,
            PROG_MEM_BYTES
        );
    }

    let mut frames = Vec::with_capacity(total_pages);
    for (page_no, chunk) in image.chunks(PAGE_SIZE).enumerate() {
        frames.push(frame_for(page_no as u8, version, chunk, false));
    }
    for (offset, chunk) in message.chunks(PAGE_SIZE).enumerate() {
        frames.push(frame_for((fw_pages + offset) as u8, version, chunk, true));
    }
    frames.reverse();
    Ok(frames)
}

fn frame_for(frame_no: u8, version: u16, chunk: &[u8], is_message: bool) -> Frame {
    let mut data = [0u8; PAGE_SIZE];
    data[..chunk.len()].copy_from_slice(chunk);
    Frame {
        data,
        data_size: chunk.len() as u16,
        version,
        frame_no,
        is_message,
    }
}
