use model::{OptimizerState, Params};
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};
use zstd::{Decoder, Encoder};

/// Everything needed to resume training at `frame`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CheckpointRecord {
    pub frame: u64,
    pub epsilon: f64,
    pub model: Params,
    pub optimizer: OptimizerState,
}

pub fn serialize_into<W: Write>(writer: W, record: &CheckpointRecord) -> io::Result<()> {
    let mut encoder = Encoder::new(writer, 0)?;
    bincode::serialize_into(&mut encoder, record).map_err(io::Error::other)?;
    encoder.finish()?;
    Ok(())
}

pub fn deserialize_from<R: Read>(reader: R) -> bincode::Result<CheckpointRecord> {
    let decoder = Decoder::new(reader)?;
    bincode::deserialize_from(decoder)
}
