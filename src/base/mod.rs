mod channel;
mod error;
mod message;
mod ring_byte_buffer;
mod traits;

pub use self::channel::*;
pub use self::error::{Error, Result};
pub use self::message::Message;
pub use self::ring_byte_buffer::RingByteBuffer;
pub use self::traits::{ProtocolDecoder, ProtocolEncoder};
