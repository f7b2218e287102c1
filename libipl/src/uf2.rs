use std::collections::BTreeMap;

use byteorder::ByteOrder;

use crate::error::ContainerError;

/// First magic word of a UF2 record ("UF2\n")
pub const MAGIC_START0: u32 = 0x0A32_4655;
/// Second magic word of a UF2 record
pub const MAGIC_START1: u32 = 0x9E5D_5157;
/// Trailing magic word of a UF2 record
pub const MAGIC_END: u32 = 0x0AB1_6F30;

/// Size of one UF2 record (in bytes)
pub const RECORD_SIZE: usize = 512;
/// Size of the payload area inside a record (in bytes)
pub const DATA_AREA_SIZE: usize = 476;

/// Signature expected at the start of the assembled firmware
pub const BOOT_SIGNATURE: &[u8; 8] = b"IPLBOOT ";

/// One accepted UF2 record.
#[derive(Debug)]
pub struct Block {
    /// Target flash address
    pub address: u32,
    /// Payload bytes kept from the record's data area
    pub payload: Vec<u8>,
}

/// Extract the valid records from a UF2 container.
///
/// A record is accepted only if both leading magic words and the trailing
/// magic word match. A trailing partial record is dropped silently; a
/// container yielding zero valid records is an error.
pub fn parse(raw: &[u8]) -> Result<Vec<Block>, ContainerError> {
    let mut blocks: Vec<Block> = Vec::new();

    for record in raw.chunks_exact(RECORD_SIZE) {
        let magic_start0 = byteorder::LittleEndian::read_u32(&record[0..4]);
        let magic_start1 = byteorder::LittleEndian::read_u32(&record[4..8]);
        let magic_end = byteorder::LittleEndian::read_u32(&record[508..512]);

        if magic_start0 != MAGIC_START0 || magic_start1 != MAGIC_START1 || magic_end != MAGIC_END {
            continue;
        }

        let address = byteorder::LittleEndian::read_u32(&record[12..16]);
        let size = byteorder::LittleEndian::read_u32(&record[16..20]) as usize;
        let kept = size.min(DATA_AREA_SIZE);

        blocks.push(Block {
            address,
            payload: record[32..32 + kept].to_vec(),
        });
    }

    if blocks.is_empty() {
        return Err(ContainerError::TruncatedContainer {
            file_len: raw.len(),
        });
    }

    log::debug!("parsed {} UF2 records", blocks.len());

    Ok(blocks)
}

/// Concatenate block payloads in ascending address order.
///
/// A later record at an already-seen address replaces the earlier one.
/// Gaps and overlaps between addresses are not validated; garbage in means
/// garbage out for containers that were never produced by a flasher.
pub fn assemble(blocks: Vec<Block>) -> Result<Vec<u8>, ContainerError> {
    let mut ordered: BTreeMap<u32, Vec<u8>> = BTreeMap::new();

    for block in blocks {
        ordered.insert(block.address, block.payload);
    }

    let mut firmware: Vec<u8> = Vec::new();

    for payload in ordered.values() {
        firmware.extend_from_slice(payload);
    }

    if !firmware.starts_with(BOOT_SIGNATURE) {
        return Err(ContainerError::MissingMarker);
    }

    log::debug!("assembled {} bytes of firmware", firmware.len());

    Ok(firmware)
}
