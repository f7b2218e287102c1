//! Header-region framing around the scrambled payload.
//!
//! The bootrom clocks its descrambler over the whole flash stream, header
//! region included, so both pipelines must frame the image at the same
//! keystream offset the hardware uses before applying the cipher.

/// Alignment granularity of the flashed payload (in bytes)
pub const ALIGNMENT: usize = 1024;

/// Pattern flushed after the 0x700-byte header to pad the payload start
pub const FLUSH_PATTERN: [u8; 32] = [
    0x81, 0x4A, 0xE6, 0xC8, 0x00, 0x04, 0xC5, 0x77, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
];

/// How the header region ahead of the image is laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramingMode {
    /// 0x700 zero bytes followed by the flush pattern (encode side); the
    /// pattern stays with the payload when the header region is dropped
    Patterned,
    /// A single 0x720-byte zero block (decode side)
    Zeroed,
}

impl FramingMode {
    /// Size of the header region dropped by [`unwrap`]
    pub fn header_size(self) -> usize {
        match self {
            FramingMode::Patterned => 0x700,
            FramingMode::Zeroed => 0x720,
        }
    }
}

/// Prepend the header region for `mode` to `image`.
pub fn wrap(image: &[u8], mode: FramingMode) -> Vec<u8> {
    let mut framed = vec![0u8; mode.header_size()];

    if mode == FramingMode::Patterned {
        framed.extend_from_slice(&FLUSH_PATTERN);
    }

    framed.extend_from_slice(image);
    framed
}

/// Pad `framed` with zeros until `declared_size` reaches the next 1K
/// multiple.
///
/// `declared_size` counts the image plus the 32-byte metadata that sits
/// outside the framing region, so the pad is computed against it rather
/// than against the framed length. Never truncates.
pub fn align(framed: &mut Vec<u8>, declared_size: usize) {
    let target = declared_size.next_multiple_of(ALIGNMENT);
    let pad = target - declared_size;
    framed.resize(framed.len() + pad, 0);
}

/// Drop the header region produced by [`wrap`] with the same `mode`.
///
/// `framed` must be at least `mode.header_size()` bytes long.
pub fn unwrap(mut framed: Vec<u8>, mode: FramingMode) -> Vec<u8> {
    framed.split_off(mode.header_size())
}
