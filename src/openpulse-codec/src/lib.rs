#[macro_use]
extern crate serde;

mod assembler;
pub use assembler::FrameAssembler;

mod error;
pub use error::CodecError;

mod record;
pub use record::{ImuRecord, PpgRecord, Record, StreamProtocol};
