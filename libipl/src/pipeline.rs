use byteorder::ByteOrder;

use crate::error::{ContainerError, PipelineError};
use crate::framing::{self, FramingMode};
use crate::scramble::Scrambler;
use crate::{dol, uf2};

/// Entry point the bootrom jumps to
pub const ENTRY_ADDRESS: u32 = 0x8130_0000;
/// Load address of the payload image
pub const LOAD_ADDRESS: u32 = 0x0130_0000;
/// File offset of the single section in a rebuilt DOL
pub const DOL_FILE_OFFSET: u32 = 0x100;

/// Physical-address mask applied before validating entry and base
const ADDRESS_MASK: u32 = 0x01FF_FFFF;

/// DOL header bytes counted by the declared payload size but living
/// outside the framing region
const TRAILING_METADATA: usize = 0x20;

/// Result of scrambling an executable into a flashable payload.
#[derive(Debug)]
pub struct Encoded {
    /// Scrambled bytes retained after the header region is dropped
    pub scrambled: Vec<u8>,
    /// Masked entry point
    pub entry: u32,
    /// Masked base load address
    pub base: u32,
    /// Size of the flattened image before padding
    pub image_size: usize,
    /// Padded payload size (1K multiple)
    pub padded_size: usize,
}

/// Result of recovering an executable from a flashed container.
#[derive(Debug)]
pub struct Decoded {
    /// Reconstructed DOL: minimal header followed by the image
    pub dol: Vec<u8>,
    /// Number of valid UF2 records in the container
    pub block_count: usize,
    /// Size of the assembled firmware blob
    pub extracted_size: usize,
    /// Size of the recovered image
    pub image_size: usize,
}

/// Scramble a DOL executable into the payload flashed to the device.
pub fn encode(executable: &[u8]) -> Result<Encoded, PipelineError> {
    let image = dol::flatten(executable)?;

    let entry = (image.entry & ADDRESS_MASK) | 0x8000_0000;
    let base = image.base & ADDRESS_MASK;

    if entry != ENTRY_ADDRESS || base != LOAD_ADDRESS {
        return Err(PipelineError::InvalidAddressRange { entry, base });
    }

    let image_size = image.data.len();
    let declared_size = image_size + TRAILING_METADATA;

    let mut framed = framing::wrap(&image.data, FramingMode::Patterned);
    framing::align(&mut framed, declared_size);

    let padded_size = framed.len() - FramingMode::Patterned.header_size();

    log::info!(
        "encoding {} image bytes into a {} byte payload",
        image_size,
        padded_size
    );

    Scrambler::apply(&mut framed);
    let scrambled = framing::unwrap(framed, FramingMode::Patterned);

    Ok(Encoded {
        scrambled,
        entry,
        base,
        image_size,
        padded_size,
    })
}

/// Recover a DOL executable from a flashed UF2 container.
pub fn decode(container: &[u8]) -> Result<Decoded, PipelineError> {
    let blocks = uf2::parse(container)?;
    let block_count = blocks.len();

    let firmware = uf2::assemble(blocks)?;
    let extracted_size = firmware.len();

    let declared = declared_total_size(&firmware)?;
    let scrambled = &firmware[32..declared - 4];

    log::info!(
        "decoding {} scrambled bytes from {} records",
        scrambled.len(),
        block_count
    );

    let mut framed = framing::wrap(scrambled, FramingMode::Zeroed);
    Scrambler::apply(&mut framed);
    let image = framing::unwrap(framed, FramingMode::Zeroed);

    let header = dol::build_header(
        DOL_FILE_OFFSET,
        LOAD_ADDRESS,
        image.len() as u32,
        ENTRY_ADDRESS,
    );

    let image_size = image.len();
    let mut dol = Vec::with_capacity(header.len() + image.len());
    dol.extend_from_slice(&header);
    dol.extend_from_slice(&image);

    Ok(Decoded {
        dol,
        block_count,
        extracted_size,
        image_size,
    })
}

/// Read and bounds-check the big-endian total-size field at offset 8 of
/// the assembled firmware. The scrambled image sits between the 32-byte
/// IPLBOOT header and a 4-byte trailer inside that span.
fn declared_total_size(firmware: &[u8]) -> Result<usize, ContainerError> {
    if firmware.len() < 36 {
        return Err(ContainerError::DeclaredSizeOutOfBounds {
            declared: 0,
            available: firmware.len(),
        });
    }

    let declared = byteorder::BigEndian::read_u32(&firmware[8..12]) as usize;

    if declared < 36 || declared > firmware.len() {
        return Err(ContainerError::DeclaredSizeOutOfBounds {
            declared,
            available: firmware.len(),
        });
    }

    Ok(declared)
}
