use byteorder::ByteOrder;

use crate::error::ExecutableError;

/// Size of the DOL header (64 big-endian 32-bit words, in bytes)
pub const HEADER_SIZE: usize = 256;
/// Number of section slots in the header
pub const SECTION_COUNT: usize = 18;

/// A DOL executable flattened into one contiguous memory image.
#[derive(Debug)]
pub struct FlatImage {
    /// Program entry point
    pub entry: u32,
    /// Lowest nonzero section load address
    pub base: u32,
    /// Contiguous image covering `base .. max(address + size)`
    pub data: Vec<u8>,
}

#[derive(Debug)]
struct DolHeader {
    /// File offset of each section
    offsets: [u32; SECTION_COUNT],
    /// Load address of each section
    addresses: [u32; SECTION_COUNT],
    /// Size of each section (zero marks an unused slot)
    sizes: [u32; SECTION_COUNT],
    /// Program entry point
    entry: u32,
}

/// Parse a DOL executable and flatten its sections into a single image.
pub fn flatten(raw: &[u8]) -> Result<FlatImage, ExecutableError> {
    let header = read_header(raw)?;

    let base = header
        .addresses
        .iter()
        .copied()
        .filter(|&address| address != 0)
        .min()
        .ok_or(ExecutableError::MalformedHeader)?;

    let extent = header
        .addresses
        .iter()
        .zip(&header.sizes)
        .map(|(&address, &size)| u64::from(address) + u64::from(size))
        .max()
        .unwrap_or(0);

    let mut data = vec![0u8; (extent - u64::from(base)) as usize];

    for index in 0..SECTION_COUNT {
        let size = header.sizes[index] as usize;
        if size == 0 {
            continue;
        }

        let offset = header.offsets[index] as usize;
        let end = offset
            .checked_add(size)
            .filter(|&end| end <= raw.len())
            .ok_or(ExecutableError::SectionOutOfBounds {
                offset,
                size,
                file_len: raw.len(),
            })?;

        // A populated section below the base would have been skipped by the
        // base scan, so its address cannot be trusted.
        let start = header.addresses[index]
            .checked_sub(base)
            .ok_or(ExecutableError::MalformedHeader)? as usize;

        data[start..start + size].copy_from_slice(&raw[offset..end]);
    }

    log::debug!(
        "flattened DOL: base 0x{:08X}, entry 0x{:08X}, {} bytes",
        base,
        header.entry,
        data.len()
    );

    Ok(FlatImage {
        entry: header.entry,
        base,
        data,
    })
}

/// Build a minimal DOL header describing a single section.
///
/// Only section slot 0 is populated; BSS and the remaining 17 slots stay
/// zeroed. `flatten` applied to this header followed by the section data
/// reproduces the original image.
pub fn build_header(file_offset: u32, load_address: u32, data_size: u32, entry: u32) -> [u8; HEADER_SIZE] {
    let mut words = [0u32; 64];

    words[0] = file_offset;
    words[SECTION_COUNT] = load_address;
    words[SECTION_COUNT * 2] = data_size;
    words[56] = entry;

    let mut header = [0u8; HEADER_SIZE];
    byteorder::BigEndian::write_u32_into(&words, &mut header);
    header
}

fn read_header(raw: &[u8]) -> Result<DolHeader, ExecutableError> {
    if raw.len() < HEADER_SIZE {
        return Err(ExecutableError::MalformedHeader);
    }

    let mut words = [0u32; 64];
    byteorder::BigEndian::read_u32_into(&raw[..HEADER_SIZE], &mut words);

    let mut offsets = [0u32; SECTION_COUNT];
    let mut addresses = [0u32; SECTION_COUNT];
    let mut sizes = [0u32; SECTION_COUNT];

    offsets.copy_from_slice(&words[0..SECTION_COUNT]);
    addresses.copy_from_slice(&words[SECTION_COUNT..SECTION_COUNT * 2]);
    sizes.copy_from_slice(&words[SECTION_COUNT * 2..SECTION_COUNT * 3]);

    // Words 54 and 55 describe the BSS segment; neither matters for
    // flattening. Words 57..64 are reserved.
    Ok(DolHeader {
        offsets,
        addresses,
        sizes,
        entry: words[56],
    })
}
