mod byte_reader;
mod event;
mod replay;

pub use byte_reader::{ByteReader, ByteParseable};
pub use event::model::{
    EventType, EventRecord, EventRecordV1, EventRecordV2,
    SpecIdHeader, SpecIdAlgorithm,
    TCG_EVENT_LEN_MAX, SHA1_DIGEST_SIZE, MAX_DIGEST_COUNT, MAX_SPEC_ID_ALGORITHMS,
    SPEC_ID_SIGNATURE_SIZE, SPEC_ID_EVENT_SIGNATURE_03,
};
pub use event::parser::{
    TcgDigestParse, TcgDigestParseV1, TcgDigestParseV2, DecoderLimits,
    decode_v1, decode_v2, decode_spec_id, is_spec_id_event,
};
pub use event::log::{EventLog, EventLogDecoder};
pub use replay::{PcrReplayPolicy, PcrReplayEngine, REFERENCE_PCR_MAX};
