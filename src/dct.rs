// Forward/inverse DCT and JPEG-style quantization.

use crate::block::{self, Block8x8};
use crate::consts::{CHROMA_MULTIPLIER, CHROMINANCE_TABLE, DCT_MATRIX, DCT_MATRIX_TRANSPOSE, LUMA_MULTIPLIER, LUMINANCE_TABLE};
use crate::quality::Quality;

/// Forward DCT: `C * A * C^T`.
pub fn forward(a: &Block8x8) -> Block8x8 {
  let tmp = block::multiply(&DCT_MATRIX, a);
  block::multiply(&tmp, &DCT_MATRIX_TRANSPOSE)
}

/// Inverse DCT: `C^T * A * C`.
pub fn inverse(a: &Block8x8) -> Block8x8 {
  let tmp = block::multiply(&DCT_MATRIX_TRANSPOSE, a);
  block::multiply(&tmp, &DCT_MATRIX)
}

fn multiplier(quality: Quality, is_luminance: bool, is_p_block: bool) -> f64 {
  let path = if is_p_block { 1 } else { 0 };
  if is_luminance {
    LUMA_MULTIPLIER[quality.index()][path]
  } else {
    CHROMA_MULTIPLIER[quality.index()][path]
  }
}

/// `round(a[r][c] / (multiplier * table[r][c]))`.
pub fn quantize(a: &Block8x8, quality: Quality, is_luminance: bool, is_p_block: bool) -> Block8x8 {
  let m = multiplier(quality, is_luminance, is_p_block);
  let table = if is_luminance { &LUMINANCE_TABLE } else { &CHROMINANCE_TABLE };

  let mut result = block::zero_block();
  for r in 0..8 {
    for c in 0..8 {
      result[r][c] = (a[r][c] / (m * table[r][c])).round();
    }
  }
  result
}

/// Inverse of [`quantize`]: multiply the quantized coefficient back by its
/// scale factor.
pub fn unquantize(a: &Block8x8, quality: Quality, is_luminance: bool, is_p_block: bool) -> Block8x8 {
  let m = multiplier(quality, is_luminance, is_p_block);
  let table = if is_luminance { &LUMINANCE_TABLE } else { &CHROMINANCE_TABLE };

  let mut result = block::zero_block();
  for r in 0..8 {
    for c in 0..8 {
      result[r][c] = a[r][c] * (m * table[r][c]);
    }
  }
  result
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn inverse_dct_undoes_forward_dct() {
    let mut a = block::zero_block();
    let mut seed = 1.0;
    for r in 0..8 {
      for c in 0..8 {
        // Deterministic pseudo-random-ish values without relying on `rand`.
        seed = (seed * 37.0 + 11.0) % 257.0;
        a[r][c] = seed - 128.0;
      }
    }

    let transformed = forward(&a);
    let back = inverse(&transformed);

    // `DCT_MATRIX`/`DCT_MATRIX_TRANSPOSE` are the 6-significant-digit literals
    // the format fixes (matching the original's `c_matrix`), which are only
    // orthonormal to about 1e-3, not machine precision -- bit-exactness
    // depends on both sides using these exact constants, not on the matrix
    // being a perfectly orthonormal DCT basis. So the achievable round-trip
    // tolerance here is ~1e-3, not the 1e-6 spec §8 property 2 names for an
    // idealized DCT matrix; see DESIGN.md.
    for r in 0..8 {
      for c in 0..8 {
        assert!((a[r][c] - back[r][c]).abs() <= 1e-3, "mismatch at ({},{}): {} vs {}", r, c, a[r][c], back[r][c]);
      }
    }
  }

  #[test]
  fn quantize_unquantize_is_a_projection() {
    let mut a = block::zero_block();
    for r in 0..8 {
      for c in 0..8 {
        a[r][c] = ((r * 7 + c * 3) as f64) - 20.0;
      }
    }

    let q1 = quantize(&a, Quality::Medium, true, false);
    let dq1 = unquantize(&q1, Quality::Medium, true, false);
    let q2 = quantize(&dq1, Quality::Medium, true, false);

    assert_eq!(q1, q2);
  }

  #[test]
  fn dc_only_block_quantizes_to_single_coefficient() {
    let mut a = block::zero_block();
    a[0][0] = 2000.0; // A strong flat component after DCT of a uniform block.
    let q = quantize(&a, Quality::High, true, false);
    for r in 0..8 {
      for c in 0..8 {
        if (r, c) != (0, 0) {
          assert_eq!(q[r][c], 0.0);
        }
      }
    }
    assert!(q[0][0] != 0.0);
  }
}
