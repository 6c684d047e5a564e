use std::fmt;
use std::str::FromStr;

/// The coarse three-level quality knob. Scales both the luminance and
/// chrominance quantization tables, with separate scaling for I- and
/// P-blocks (see `consts::LUMA_MULTIPLIER` / `consts::CHROMA_MULTIPLIER`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
  Low,
  Medium,
  High,
}

impl Quality {
  /// 2-bit header field: 00=low, 01=medium, 10=high (11 is reserved).
  pub fn from_bits(bits: u8) -> Option<Quality> {
    match bits {
      0 => Some(Quality::Low),
      1 => Some(Quality::Medium),
      2 => Some(Quality::High),
      _ => None,
    }
  }

  pub fn to_bits(self) -> u8 {
    match self {
      Quality::Low => 0,
      Quality::Medium => 1,
      Quality::High => 2,
    }
  }

  pub(crate) fn index(self) -> usize {
    match self {
      Quality::Low => 0,
      Quality::Medium => 1,
      Quality::High => 2,
    }
  }
}

impl FromStr for Quality {
  type Err = String;

  fn from_str(s: &str) -> Result<Quality, String> {
    match s {
      "low" => Ok(Quality::Low),
      "medium" => Ok(Quality::Medium),
      "high" => Ok(Quality::High),
      other => Err(format!("unknown quality '{}' (expected low, medium, or high)", other)),
    }
  }
}

impl fmt::Display for Quality {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let s = match self {
      Quality::Low => "low",
      Quality::Medium => "medium",
      Quality::High => "high",
    };
    write!(f, "{}", s)
  }
}
