pub mod bitio;
pub mod block;
pub mod codec;
pub mod consts;
pub mod dct;
pub mod entropy;
pub mod error;
pub mod frame;
pub mod motion;
pub mod partition;
pub mod quality;

pub use codec::{Decoder, Encoder};
pub use error::{CodecError, Result};
pub use frame::{Frame, FrameSink, FrameSource};
pub use quality::Quality;
