// SPDX-FileCopyrightText: 2026 Lockboot Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Host-side half of the framing: seal install frames and sign readback
//! requests in the exact byte order the device consumes.

use consts::{
    BOX_ZERO_BYTES, FRAME_SIZE, KEY_BYTES, NONCE_BYTES, PROTECTED_SIZE, REQUEST_SIZE, TAG_BYTES,
    ZERO_BYTES,
};
use salsa20::cipher::{KeyIvInit, StreamCipher};
use salsa20::XSalsa20;

use crate::{mac, Frame, ReadbackRequest, WIRE_FRAME_SIZE, WIRE_REQUEST_SIZE};

/// Seal one frame under the install key, producing the full on-wire record
/// `tag ∥ protected ∥ nonce`.
///
/// The plaintext is padded with 32 leading zero bytes before encryption and
/// the first 16 ciphertext bytes are stripped, so the transmitted
/// `protected` field is 16 bytes longer than the frame. The tag covers
/// `nonce ∥ protected` exactly as transmitted.
pub fn seal_frame(
    frame: &Frame,
    key: &[u8; KEY_BYTES],
    nonce: &[u8; NONCE_BYTES],
) -> [u8; WIRE_FRAME_SIZE] {
    let mut padded = [0u8; ZERO_BYTES + FRAME_SIZE];
    padded[ZERO_BYTES..].copy_from_slice(&frame.encode());

    let mut cipher = XSalsa20::new(key.into(), nonce.into());
    cipher.apply_keystream(&mut padded);
    let protected = &padded[BOX_ZERO_BYTES..];

    let mut mac_input = [0u8; NONCE_BYTES + PROTECTED_SIZE];
    mac_input[..NONCE_BYTES].copy_from_slice(nonce);
    mac_input[NONCE_BYTES..].copy_from_slice(protected);
    let tag = mac::tag(key, &mac_input);

    let mut wire = [0u8; WIRE_FRAME_SIZE];
    wire[..TAG_BYTES].copy_from_slice(&tag);
    wire[TAG_BYTES..TAG_BYTES + PROTECTED_SIZE].copy_from_slice(protected);
    wire[TAG_BYTES + PROTECTED_SIZE..].copy_from_slice(nonce);
    wire
}

/// Sign one readback request under the readback key, producing the full
/// on-wire record `tag ∥ nonce ∥ request`.
pub fn sign_request(
    request: &ReadbackRequest,
    key: &[u8; KEY_BYTES],
    nonce: &[u8; NONCE_BYTES],
) -> [u8; WIRE_REQUEST_SIZE] {
    let body = request.encode();

    let mut mac_input = [0u8; NONCE_BYTES + REQUEST_SIZE];
    mac_input[..NONCE_BYTES].copy_from_slice(nonce);
    mac_input[NONCE_BYTES..].copy_from_slice(&body);
    let tag = mac::tag(key, &mac_input);

    let mut wire = [0u8; WIRE_REQUEST_SIZE];
    wire[..TAG_BYTES].copy_from_slice(&tag);
    wire[TAG_BYTES..TAG_BYTES + NONCE_BYTES].copy_from_slice(nonce);
    wire[TAG_BYTES + NONCE_BYTES..].copy_from_slice(&body);
    wire
}
