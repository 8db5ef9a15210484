// SPDX-FileCopyrightText: 2026 Lockboot Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Wire format shared by the bootloader and the host tools.
//!
//! One source of truth for both ends of the serial link: the install frame
//! record and its exact byte layout, the readback request, the keyed-hash
//! authenticator, and the host-side sealing functions that produce the
//! streams the device consumes.

#![no_std]

use consts::{FRAME_SIZE, NONCE_BYTES, PAGE_SIZE, PROTECTED_SIZE, REQUEST_SIZE, TAG_BYTES};

pub mod mac;
pub mod seal;

#[cfg(test)]
mod tests;

/// Total on-wire size of one sealed install frame:
/// `tag ∥ protected ∥ nonce`.
pub const WIRE_FRAME_SIZE: usize = TAG_BYTES + PROTECTED_SIZE + NONCE_BYTES;

/// Total on-wire size of one signed readback request:
/// `tag ∥ nonce ∥ request`.
pub const WIRE_REQUEST_SIZE: usize = TAG_BYTES + NONCE_BYTES + REQUEST_SIZE;

/// Wire format errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// The buffer is shorter than one frame.
    FrameTooShort,
    /// The declared payload length exceeds the flash page size.
    DataSizeOutOfRange,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::FrameTooShort => write!(f, "buffer shorter than one frame"),
            Error::DataSizeOutOfRange => write!(f, "declared payload length exceeds the page size"),
        }
    }
}

/// One page-sized unit of install payload plus its header, in plaintext
/// form.
///
/// The first frame of an install carries the highest `frame_no`; the device
/// programs pages in descending order so that page 0, and with it the reset
/// vector, only becomes valid once the whole image is written.
#[derive(Clone)]
pub struct Frame {
    /// Raw flash bytes for page `frame_no`.
    pub data: [u8; PAGE_SIZE],
    /// Number of valid bytes in `data`.
    pub data_size: u16,
    /// Declared image version, identical in every frame of one image.
    pub version: u16,
    /// Page index this frame targets.
    pub frame_no: u8,
    /// Whether `data` holds release-message bytes instead of code.
    pub is_message: bool,
}

impl Frame {
    /// Size of the encoded frame in bytes.
    pub const SIZE: usize = FRAME_SIZE;

    /// Serialize the frame into its on-the-wire plaintext layout:
    /// `data[PAGE_SIZE] ∥ data_size:u16le ∥ version:u16le ∥ frame_no ∥ is_message`.
    pub fn encode(&self) -> [u8; FRAME_SIZE] {
        let mut buf = [0u8; FRAME_SIZE];
        buf[..PAGE_SIZE].copy_from_slice(&self.data);
        buf[PAGE_SIZE..PAGE_SIZE + 2].copy_from_slice(&self.data_size.to_le_bytes());
        buf[PAGE_SIZE + 2..PAGE_SIZE + 4].copy_from_slice(&self.version.to_le_bytes());
        buf[PAGE_SIZE + 4] = self.frame_no;
        buf[PAGE_SIZE + 5] = u8::from(self.is_message);
        buf
    }

    /// Deserialize a frame from its plaintext layout.
    ///
    /// Rejects a declared `data_size` larger than the page; an authentic
    /// host never produces one, so a decode failure is treated by the
    /// install engine the same way as a forged tag.
    pub fn decode(buf: &[u8]) -> Result<Self, Error> {
        if buf.len() < FRAME_SIZE {
            return Err(Error::FrameTooShort);
        }
        let mut data = [0u8; PAGE_SIZE];
        data.copy_from_slice(&buf[..PAGE_SIZE]);
        let data_size = u16::from_le_bytes([buf[PAGE_SIZE], buf[PAGE_SIZE + 1]]);
        if usize::from(data_size) > PAGE_SIZE {
            return Err(Error::DataSizeOutOfRange);
        }
        Ok(Frame {
            data,
            data_size,
            version: u16::from_le_bytes([buf[PAGE_SIZE + 2], buf[PAGE_SIZE + 3]]),
            frame_no: buf[PAGE_SIZE + 4],
            is_message: buf[PAGE_SIZE + 5] != 0,
        })
    }
}

/// A diagnostic readback request: stream `length` bytes of program memory
/// starting at `start_addr` back to the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReadbackRequest {
    pub start_addr: u32,
    pub length: u32,
}

impl ReadbackRequest {
    /// Size of the encoded request in bytes.
    pub const SIZE: usize = REQUEST_SIZE;

    /// Serialize as big-endian `start_addr ∥ length`.
    pub fn encode(&self) -> [u8; REQUEST_SIZE] {
        let mut buf = [0u8; REQUEST_SIZE];
        buf[..4].copy_from_slice(&self.start_addr.to_be_bytes());
        buf[4..].copy_from_slice(&self.length.to_be_bytes());
        buf
    }

    /// Deserialize from big-endian `start_addr ∥ length`.
    pub fn decode(buf: &[u8; REQUEST_SIZE]) -> Self {
        ReadbackRequest {
            start_addr: u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]),
            length: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
        }
    }
}
