// SPDX-FileCopyrightText: 2026 Lockboot Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

#![no_std]

/// Flash programming granule of the target part, in bytes.
/// Every install frame carries exactly one page of payload, and all page
/// operations (erase, fill, commit) work on this unit.
pub const PAGE_SIZE: usize = 128;

/// Bytes of program memory available to the application image and its
/// release message. The bootloader itself lives above this address and is
/// never written by the install engine.
pub const PROG_MEM_BYTES: u32 = 0x7000;

/// Total program memory on the part, bootloader section included. The
/// readback engine may stream any of it; only the install engine is
/// confined to the application region below [`PROG_MEM_BYTES`].
pub const TOTAL_PROG_MEM_BYTES: u32 = 0x8000;

/// Size of one plaintext install frame: a page of payload followed by the
/// 6-byte header (`data_size`, `version`, `frame_no`, `is_message`).
pub const FRAME_SIZE: usize = PAGE_SIZE + 6;

/// Length of the install and readback keys.
pub const KEY_BYTES: usize = 32;

/// XSalsa20 nonce length. The host picks a fresh nonce per frame and per
/// readback request.
pub const NONCE_BYTES: usize = 24;

/// Length of the keyed-hash authenticator that precedes every install frame
/// and readback request on the wire.
pub const TAG_BYTES: usize = 64;

/// Leading zero bytes of the secretbox-style plaintext buffer.
pub const ZERO_BYTES: usize = 32;

/// Leading zero bytes of the secretbox-style ciphertext buffer. These are
/// stripped before transmission and reconstructed by the receiver.
pub const BOX_ZERO_BYTES: usize = 16;

/// Ciphertext form of one frame as transmitted: the XSalsa20 ciphertext of
/// the zero-padded frame with its first [`BOX_ZERO_BYTES`] removed.
pub const PROTECTED_SIZE: usize = FRAME_SIZE + ZERO_BYTES - BOX_ZERO_BYTES;

/// Size of a readback request body: big-endian start address followed by
/// big-endian byte count.
pub const REQUEST_SIZE: usize = 8;

/// Watchdog timeout used by every mode. Any stall longer than this forces a
/// device reset.
pub const WATCHDOG_TIMEOUT_MS: u32 = 2000;

/// Phase acknowledge status byte.
pub const OK: u8 = 0x00;

/// Status byte for a failed tag verification. Terminal for the session.
pub const MAC_ERROR: u8 = 0x01;

/// Status byte for a refused version rollback. Terminal for the session.
pub const VERSION_ERROR: u8 = 0x02;

/// One-time configuration handshake byte, echoed back on acceptance.
pub const CONFIGURED: u8 = 0x43;

/// Mode status byte emitted when entering the install engine.
pub const MODE_UPDATE: u8 = b'U';

/// Mode status byte emitted when entering the readback engine.
pub const MODE_READBACK: u8 = b'R';

/// Mode status byte emitted when handing off to the application.
pub const MODE_BOOT: u8 = b'B';

/// Terminator emitted on the application channel after the release message.
pub const MESSAGE_END: u8 = 0x01;
