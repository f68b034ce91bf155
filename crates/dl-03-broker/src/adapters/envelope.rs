//! Default frame codec: a bincode-serialized `(id, body)` envelope.

use bytes::Bytes;
use dl_01_correlation::CorrelationId;
use serde::{Deserialize, Serialize};

use crate::domain::CodecError;
use crate::ports::FrameCodec;

/// On-wire envelope. The body is opaque command bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: [u8; 16],
    pub body: Vec<u8>,
}

/// [`FrameCodec`] writing [`Envelope`]s with bincode's default options.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvelopeCodec;

impl FrameCodec for EnvelopeCodec {
    fn encode(&self, id: CorrelationId, body: &[u8]) -> Result<Vec<u8>, CodecError> {
        let envelope = Envelope {
            id: *id.as_bytes(),
            body: body.to_vec(),
        };
        bincode::serialize(&envelope).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(&self, frame: &[u8]) -> Result<(CorrelationId, Bytes), CodecError> {
        let envelope: Envelope =
            bincode::deserialize(frame).map_err(|e| CodecError::Decode(e.to_string()))?;
        Ok((CorrelationId::from_bytes(envelope.id), Bytes::from(envelope.body)))
    }
}
