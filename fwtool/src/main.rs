// SPDX-FileCopyrightText: 2026 Lockboot Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Host-side companion of the bootloader.
//!
//! `protect` turns a raw application image plus release message into the
//! sealed frame stream the install engine consumes; `readback` signs a
//! diagnostic readback request; `genkey` produces a fresh device secret.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use rand::RngCore;

use consts::{KEY_BYTES, NONCE_BYTES};
use host_protocol::{seal, ReadbackRequest, WIRE_FRAME_SIZE};

mod image;

#[derive(Parser)]
#[command(name = "fwtool", version, about = "Seal firmware streams and sign readback requests")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seal an image and its release message into an update stream.
    Protect {
        /// Raw application image.
        #[arg(long)]
        image: PathBuf,
        /// Release message placed directly above the image.
        #[arg(long)]
        message: Option<PathBuf>,
        /// Declared image version. 0 installs without touching the version
        /// stored on the device.
        #[arg(long)]
        version: u16,
        /// Hex-encoded 32-byte install key.
        #[arg(long)]
        key: PathBuf,
        /// Where to write the sealed stream.
        #[arg(long)]
        output: PathBuf,
    },
    /// Sign a readback request for a region of program memory.
    Readback {
        /// Hex-encoded 32-byte readback key.
        #[arg(long)]
        key: PathBuf,
        /// First program-memory address to read, decimal or 0x-prefixed.
        #[arg(long, value_parser = parse_u32)]
        start: u32,
        /// Number of bytes to read, decimal or 0x-prefixed.
        #[arg(long, value_parser = parse_u32)]
        length: u32,
        /// Where to write the signed request.
        #[arg(long)]
        output: PathBuf,
    },
    /// Generate a fresh hex-encoded 32-byte key.
    Genkey {
        /// Where to write the key.
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Protect {
            image,
            message,
            version,
            key,
            output,
        } => {
            let key = read_key(&key)?;
            let image_bytes =
                fs::read(&image).with_context(|| format!("reading image {}", image.display()))?;
            let message_bytes = match &message {
                Some(path) => fs::read(path)
                    .with_context(|| format!("reading release message {}", path.display()))?,
                None => Vec::new(),
            };

            let frames = image::build_frames(&image_bytes, &message_bytes, version)?;
            let mut stream = Vec::with_capacity(frames.len() * WIRE_FRAME_SIZE);
            for frame in &frames {
                let mut nonce = [0u8; NONCE_BYTES];
                rand::thread_rng().fill_bytes(&mut nonce);
                stream.extend_from_slice(&seal::seal_frame(frame, &key, &nonce));
            }

            fs::write(&output, &stream)
                .with_context(|| format!("writing stream {}", output.display()))?;
            println!(
                "sealed {} frames, {} bytes, version {version} -> {}",
                frames.len(),
                stream.len(),
                output.display()
            );
        }
        Command::Readback {
            key,
            start,
            length,
            output,
        } => {
            let key = read_key(&key)?;
            let mut nonce = [0u8; NONCE_BYTES];
            rand::thread_rng().fill_bytes(&mut nonce);

            let request = ReadbackRequest {
                start_addr: start,
                length,
            };
            let wire = seal::sign_request(&request, &key, &nonce);

            fs::write(&output, wire)
                .with_context(|| format!("writing request {}", output.display()))?;
            println!("signed readback of {length} bytes from {start:#06x} -> {}", output.display());
        }
        Command::Genkey { output } => {
            let mut key = [0u8; KEY_BYTES];
            rand::thread_rng().fill_bytes(&mut key);

            fs::write(&output, hex::encode(key))
                .with_context(|| format!("writing key {}", output.display()))?;
            println!("wrote new key -> {}", output.display());
        }
    }
    Ok(())
}

/// Parse a decimal or 0x-prefixed address argument.
fn parse_u32(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| e.to_string())
}

/// Read a hex-encoded 32-byte key file.
fn read_key(path: &Path) -> Result<[u8; KEY_BYTES]> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading key {}", path.display()))?;
    let bytes = hex::decode(text.trim())
        .with_context(|| format!("key {} is not valid hex", path.display()))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| anyhow!("key {} must be {KEY_BYTES} bytes, got {}", path.display(), bytes.len()))
}
