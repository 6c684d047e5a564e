// Global, read-only tables used by the transform, quantization, and entropy
// stages. All values here come straight from the JPEG baseline tables and
// from the fixed Huffman alphabet defined by the bitstream format -- none of
// them are derived at runtime, so bit-exactness doesn't depend on the order
// libm evaluates `cos` in.

use crate::block::Block8x8;

/// 8-point DCT-II basis matrix, `C`, as used by `C * A * C^T`.
///
/// This is the literal result of evaluating
/// `C[r][c] = sqrt(1/8)` for `r == 0`, else `sqrt(2/8) * cos((2c+1) r pi / 16)`.
/// It's embedded as a constant rather than computed at startup so that the
/// encoder's forward transform and the decoder's inverse transform are
/// guaranteed to run the exact same floating point operations in the exact
/// same order -- see the drift-free reconstruction invariant.
pub const DCT_MATRIX: Block8x8 = [
  [0.353553, 0.353553, 0.353553, 0.353553, 0.353553, 0.353553, 0.353553, 0.353553],
  [0.490393, 0.415735, 0.277785, 0.0975452, -0.0975452, -0.277785, -0.415735, -0.490393],
  [0.46194, 0.191342, -0.191342, -0.46194, -0.46194, -0.191342, 0.191342, 0.46194],
  [0.415735, -0.0975452, -0.490393, -0.277785, 0.277785, 0.490393, 0.0975452, -0.415735],
  [0.353553, -0.353553, -0.353553, 0.353553, 0.353553, -0.353553, -0.353553, 0.353553],
  [0.277785, -0.490393, 0.0975452, 0.415735, -0.415735, -0.0975452, 0.490393, -0.277785],
  [0.191342, -0.46194, 0.46194, -0.191342, -0.191342, 0.46194, -0.46194, 0.191342],
  [0.0975452, -0.277785, 0.415735, -0.490393, 0.490393, -0.415735, 0.277785, -0.0975452],
];

/// Transpose of [`DCT_MATRIX`], used by both the forward and inverse transform.
pub const DCT_MATRIX_TRANSPOSE: Block8x8 = [
  [0.353553, 0.490393, 0.46194, 0.415735, 0.353553, 0.277785, 0.191342, 0.0975452],
  [0.353553, 0.415735, 0.191342, -0.0975452, -0.353553, -0.490393, -0.46194, -0.277785],
  [0.353553, 0.277785, -0.191342, -0.490393, -0.353553, 0.0975452, 0.46194, 0.415735],
  [0.353553, 0.0975452, -0.46194, -0.277785, 0.353553, 0.415735, -0.191342, -0.490393],
  [0.353553, -0.0975452, -0.46194, 0.277785, 0.353553, -0.415735, -0.191342, 0.490393],
  [0.353553, -0.277785, -0.191342, 0.490393, -0.353553, -0.0975452, 0.46194, -0.415735],
  [0.353553, -0.415735, 0.191342, 0.0975452, -0.353553, 0.490393, -0.46194, 0.277785],
  [0.353553, -0.490393, 0.46194, -0.415735, 0.353553, -0.277785, 0.191342, -0.0975452],
];

/// Baseline JPEG luminance quantization table.
pub const LUMINANCE_TABLE: Block8x8 = [
  [16.0, 11.0, 10.0, 16.0, 24.0, 40.0, 51.0, 61.0],
  [12.0, 12.0, 14.0, 19.0, 26.0, 58.0, 60.0, 55.0],
  [14.0, 13.0, 16.0, 24.0, 40.0, 57.0, 69.0, 56.0],
  [14.0, 17.0, 22.0, 29.0, 51.0, 87.0, 80.0, 62.0],
  [18.0, 22.0, 37.0, 56.0, 68.0, 109.0, 103.0, 77.0],
  [24.0, 35.0, 55.0, 64.0, 81.0, 104.0, 113.0, 92.0],
  [49.0, 64.0, 78.0, 87.0, 103.0, 121.0, 120.0, 101.0],
  [72.0, 92.0, 95.0, 98.0, 112.0, 100.0, 103.0, 99.0],
];

/// Baseline JPEG chrominance quantization table.
pub const CHROMINANCE_TABLE: Block8x8 = [
  [17.0, 18.0, 24.0, 47.0, 99.0, 99.0, 99.0, 99.0],
  [18.0, 21.0, 26.0, 66.0, 99.0, 99.0, 99.0, 99.0],
  [24.0, 26.0, 56.0, 99.0, 99.0, 99.0, 99.0, 99.0],
  [47.0, 99.0, 99.0, 99.0, 99.0, 99.0, 99.0, 99.0],
  [99.0, 99.0, 99.0, 99.0, 99.0, 99.0, 99.0, 99.0],
  [99.0, 99.0, 99.0, 99.0, 99.0, 99.0, 99.0, 99.0],
  [99.0, 99.0, 99.0, 99.0, 99.0, 99.0, 99.0, 99.0],
  [99.0, 99.0, 99.0, 99.0, 99.0, 99.0, 99.0, 99.0],
];

/// Per-path quality multipliers: `[quality][is_p_block]`.
pub const LUMA_MULTIPLIER: [[f64; 2]; 3] = [
  // I-block, P-block
  [4.0, 6.0], // low
  [3.0, 5.0], // medium
  [1.0, 2.0], // high
];

pub const CHROMA_MULTIPLIER: [[f64; 2]; 3] = [
  [6.0, 10.0], // low
  [5.0, 8.0],  // medium
  [2.0, 3.0],  // high
];

/// Huffman symbols for the residual delta codec. Literal values are in
/// `[-5, 5]` excluding 0; `Zero` is the single-zero code; `Z8` is a run of
/// exactly 8 zeros; `Eob` fills the rest of the array with zeros; the escape
/// symbols introduce a trailing unary-coded magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoeffSymbol {
  Literal(i32),
  NegEsc,
  PosEsc,
  Z8,
  Eob,
}

/// `(symbol, code length in bits, code value, MSB first)`.
///
/// This table is verbatim from the bitstream format -- it is not derived
/// from a canonical-Huffman construction at runtime, so lengths and codes
/// are listed explicitly rather than built from a frequency table.
pub const HUFFMAN_TABLE: [(CoeffSymbol, u32, u16); 15] = [
  (CoeffSymbol::NegEsc, 9, 500),
  (CoeffSymbol::Literal(-5), 9, 501),
  (CoeffSymbol::Literal(-4), 8, 248),
  (CoeffSymbol::Literal(-3), 7, 122),
  (CoeffSymbol::Literal(-2), 5, 28),
  (CoeffSymbol::Literal(-1), 2, 1),
  (CoeffSymbol::Literal(0), 2, 0),
  (CoeffSymbol::Literal(1), 3, 6),
  (CoeffSymbol::Literal(2), 6, 60),
  (CoeffSymbol::Literal(3), 7, 123),
  (CoeffSymbol::Literal(4), 8, 249),
  (CoeffSymbol::Literal(5), 9, 502),
  (CoeffSymbol::PosEsc, 9, 503),
  (CoeffSymbol::Z8, 5, 29),
  (CoeffSymbol::Eob, 2, 2),
];

pub fn huffman_code_for(symbol: CoeffSymbol) -> (u32, u16) {
  for &(sym, len, code) in HUFFMAN_TABLE.iter() {
    if sym == symbol {
      return (len, code);
    }
  }
  unreachable!("no huffman code for symbol {:?}", symbol);
}

/// Look up a symbol by `(length, code)`, used while decoding bit-by-bit.
pub fn huffman_symbol_for(len: u32, code: u16) -> Option<CoeffSymbol> {
  for &(sym, l, c) in HUFFMAN_TABLE.iter() {
    if l == len && c == code {
      return Some(sym);
    }
  }
  None
}

/// Longest code in [`HUFFMAN_TABLE`], used to bound decode lookahead.
pub const HUFFMAN_MAX_BITS: u32 = 9;
