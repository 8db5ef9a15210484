// SPDX-FileCopyrightText: 2026 Lockboot Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use super::*;

use consts::{BOX_ZERO_BYTES, KEY_BYTES, ZERO_BYTES};
use salsa20::cipher::{KeyIvInit, StreamCipher};
use salsa20::XSalsa20;
use sha2::{Digest, Sha512};

const KEY: [u8; KEY_BYTES] = [0x42; KEY_BYTES];
const NONCE: [u8; NONCE_BYTES] = [0x17; NONCE_BYTES];

fn sample_frame() -> Frame {
    let mut data = [0u8; PAGE_SIZE];
    for (i, b) in data.iter_mut().enumerate() {
        *b = i as u8;
    }
    Frame {
        data,
        data_size: 64,
        version: 0x0305,
        frame_no: 7,
        is_message: false,
    }
}

#[test]
fn mac_is_two_pass_keyed_sha512() {
    let msg = b"some authenticated bytes";

    // Reference computation over explicit key || message buffers.
    let mut inner_input = [0u8; KEY_BYTES + 24];
    inner_input[..KEY_BYTES].copy_from_slice(&KEY);
    inner_input[KEY_BYTES..].copy_from_slice(msg);
    let inner = Sha512::digest(inner_input);

    let mut outer_input = [0u8; KEY_BYTES + 64];
    outer_input[..KEY_BYTES].copy_from_slice(&KEY);
    outer_input[KEY_BYTES..].copy_from_slice(&inner);
    let expected = Sha512::digest(outer_input);

    assert_eq!(mac::tag(&KEY, msg)[..], expected[..]);
}

#[test]
fn mac_differs_per_key() {
    let other_key = [0x43; KEY_BYTES];
    assert_ne!(mac::tag(&KEY, b"msg"), mac::tag(&other_key, b"msg"));
}

#[test]
fn verify_checks_both_halves() {
    let tag = mac::tag(&KEY, b"msg");
    assert!(mac::verify(&tag, &tag));

    let mut first_half_bad = tag;
    first_half_bad[3] ^= 0x01;
    assert!(!mac::verify(&first_half_bad, &tag));

    let mut second_half_bad = tag;
    second_half_bad[55] ^= 0x80;
    assert!(!mac::verify(&second_half_bad, &tag));
}

#[test]
fn frame_wire_layout() {
    let frame = sample_frame();
    let buf = frame.encode();

    assert_eq!(buf.len(), Frame::SIZE);
    // Page payload.
    assert_eq!(buf[..PAGE_SIZE], frame.data);
    // data_size, little endian.
    assert_eq!(buf[PAGE_SIZE..PAGE_SIZE + 2], [64, 0]);
    // version, little endian.
    assert_eq!(buf[PAGE_SIZE + 2..PAGE_SIZE + 4], [0x05, 0x03]);
    // frame_no.
    assert_eq!(buf[PAGE_SIZE + 4], 7);
    // is_message.
    assert_eq!(buf[PAGE_SIZE + 5], 0);
}

#[test]
fn frame_roundtrip() {
    let mut frame = sample_frame();
    frame.is_message = true;
    frame.data_size = PAGE_SIZE as u16;

    let decoded = Frame::decode(&frame.encode()).unwrap();
    assert_eq!(decoded.data, frame.data);
    assert_eq!(decoded.data_size, frame.data_size);
    assert_eq!(decoded.version, frame.version);
    assert_eq!(decoded.frame_no, frame.frame_no);
    assert_eq!(decoded.is_message, frame.is_message);
}

#[test]
fn frame_decode_rejects_short_buffer() {
    let buf = [0u8; Frame::SIZE - 1];
    assert!(matches!(Frame::decode(&buf), Err(Error::FrameTooShort)));
}

#[test]
fn frame_decode_rejects_oversized_data_size() {
    let mut frame = sample_frame();
    frame.data_size = PAGE_SIZE as u16;
    let mut buf = frame.encode();
    buf[PAGE_SIZE..PAGE_SIZE + 2].copy_from_slice(&((PAGE_SIZE as u16) + 1).to_le_bytes());
    assert!(matches!(Frame::decode(&buf), Err(Error::DataSizeOutOfRange)));
}

#[test]
fn request_wire_layout() {
    let request = ReadbackRequest {
        start_addr: 0x0102_0304,
        length: 0x0A0B_0C0D,
    };
    let buf = request.encode();
    assert_eq!(buf, [0x01, 0x02, 0x03, 0x04, 0x0A, 0x0B, 0x0C, 0x0D]);
    assert_eq!(ReadbackRequest::decode(&buf), request);
}

#[test]
fn sealed_frame_opens_on_the_device_side() {
    let frame = sample_frame();
    let wire = seal::seal_frame(&frame, &KEY, &NONCE);
    assert_eq!(wire.len(), WIRE_FRAME_SIZE);

    let tag: &[u8; TAG_BYTES] = wire[..TAG_BYTES].try_into().unwrap();
    let protected = &wire[TAG_BYTES..TAG_BYTES + PROTECTED_SIZE];
    let nonce = &wire[TAG_BYTES + PROTECTED_SIZE..];
    assert_eq!(nonce, NONCE);

    // The tag covers nonce || protected as transmitted.
    let mut mac_input = [0u8; NONCE_BYTES + PROTECTED_SIZE];
    mac_input[..NONCE_BYTES].copy_from_slice(nonce);
    mac_input[NONCE_BYTES..].copy_from_slice(protected);
    assert!(mac::verify(tag, &mac::tag(&KEY, &mac_input)));

    // Reconstruct the stripped zero prefix and decrypt the way the device
    // does; the frame follows 32 bytes of padding.
    let mut padded = [0u8; ZERO_BYTES + FRAME_SIZE];
    padded[BOX_ZERO_BYTES..].copy_from_slice(protected);
    let mut cipher = XSalsa20::new((&KEY).into(), (&NONCE).into());
    cipher.apply_keystream(&mut padded);
    assert_eq!(padded[BOX_ZERO_BYTES..ZERO_BYTES], [0u8; BOX_ZERO_BYTES]);
    assert_eq!(padded[ZERO_BYTES..], frame.encode());
}

#[test]
fn signed_request_layout_and_tag() {
    let request = ReadbackRequest {
        start_addr: 0x0100,
        length: 8,
    };
    let wire = seal::sign_request(&request, &KEY, &NONCE);

    let tag: &[u8; TAG_BYTES] = wire[..TAG_BYTES].try_into().unwrap();
    assert_eq!(wire[TAG_BYTES..TAG_BYTES + NONCE_BYTES], NONCE);
    assert_eq!(wire[TAG_BYTES + NONCE_BYTES..], request.encode());

    let mut mac_input = [0u8; NONCE_BYTES + REQUEST_SIZE];
    mac_input.copy_from_slice(&wire[TAG_BYTES..]);
    assert!(mac::verify(tag, &mac::tag(&KEY, &mac_input)));
}
