use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};

use super::error::StoreError;
use crate::record::{Record, RecordRef, StoredRecord};

/// Size of the big-endian length prefix
pub const LENGTH_PREFIX: u64 = 4;

fn bincode_config() -> bincode::config::Configuration {
    bincode::config::standard()
}

/// Encode `record` as a complete frame into `buf`, replacing its contents
pub(crate) fn encode_frame(record: RecordRef<'_>, buf: &mut Vec<u8>) -> Result<(), StoreError> {
    buf.clear();
    buf.extend_from_slice(&[0u8; LENGTH_PREFIX as usize]);
    bincode::serde::encode_into_std_write(record, buf, bincode_config())?;

    let payload_len = buf.len() - LENGTH_PREFIX as usize;
    let prefix = u32::try_from(payload_len).map_err(|_| StoreError::FrameTooLarge(payload_len))?;
    BigEndian::write_u32(&mut buf[..LENGTH_PREFIX as usize], prefix);
    Ok(())
}

/// Length of the payload `record` encodes to, excluding the length prefix
pub fn encoded_len<R: StoredRecord>(record: &R) -> Result<usize, StoreError> {
    Ok(bincode::serde::encode_to_vec(record.to_ref(), bincode_config())?.len())
}

/// Decode a frame payload into a record of any kind
pub(crate) fn decode_payload(payload: &[u8]) -> Result<Record, StoreError> {
    let (record, _) = bincode::serde::decode_from_slice(payload, bincode_config())?;
    Ok(record)
}

/// Read the length prefix of the frame at `offset` and check it fits the file
///
/// Leaves the cursor at the start of the payload.
pub(crate) fn read_frame_len(
    file: &mut File,
    offset: u64,
    file_len: u64,
) -> Result<u32, StoreError> {
    if offset + LENGTH_PREFIX > file_len {
        return Err(StoreError::TruncatedFrame { offset });
    }
    file.seek(SeekFrom::Start(offset))?;
    let len = file.read_u32::<BigEndian>()?;
    if offset + LENGTH_PREFIX + u64::from(len) > file_len {
        return Err(StoreError::TruncatedFrame { offset });
    }
    Ok(len)
}

/// Read the payload of the frame starting at `offset`
pub(crate) fn read_frame_at(file: &mut File, offset: u64) -> Result<Vec<u8>, StoreError> {
    let file_len = file.metadata()?.len();
    let len = read_frame_len(file, offset, file_len)?;
    let mut payload = vec![0u8; len as usize];
    file.read_exact(&mut payload)?;
    Ok(payload)
}
