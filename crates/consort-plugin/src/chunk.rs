//! Chunk state text codec.
//!
//! Chunks cross the host API as standard Base64 so front-ends can store them
//! in text-based session files.

use crate::error::{PluginError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Chunks smaller than this are treated as invalid plugin output.
pub const MIN_CHUNK_SIZE: usize = 4;

fn check_size(len: usize) -> Result<()> {
    if len < MIN_CHUNK_SIZE {
        return Err(PluginError::InvalidChunk(format!(
            "{len} bytes, expected at least {MIN_CHUNK_SIZE}"
        )));
    }
    Ok(())
}

pub fn encode_chunk(data: &[u8]) -> Result<String> {
    check_size(data.len())?;
    Ok(STANDARD.encode(data))
}

pub fn decode_chunk(text: &str) -> Result<Vec<u8>> {
    let data = STANDARD
        .decode(text.trim())
        .map_err(|e| PluginError::InvalidChunk(e.to_string()))?;
    check_size(data.len())?;
    Ok(data)
}
