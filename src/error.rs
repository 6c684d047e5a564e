use thiserror::Error;

/// Fatal decode/encode errors. There is no local recovery at the codec
/// core: any of these abort the current encode/decode and propagate to the
/// calling binary, which reports them on stderr and exits nonzero.
#[derive(Error, Debug)]
pub enum CodecError {
  #[error("truncated input: bit source ran out mid-frame")]
  TruncatedInput,

  #[error("invalid header: quality bits are reserved (0b11)")]
  InvalidHeader,

  #[error("undecodable huffman symbol: no match after {0} bits")]
  UndecodableSymbol(u32),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;
