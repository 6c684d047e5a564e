// Serializes a zig-zag-ordered quantized coefficient array (Array64) as a
// delta stream entropy-coded with a fixed Huffman alphabet plus escape and
// run-length codes, and serializes the per-frame motion-vector list as
// first-vector-absolute + signed-unary-delta chain.

use std::io::{Read, Write};

use crate::block::Array64;
use crate::bitio::{BitReader, BitWriter};
use crate::consts::{huffman_code_for, huffman_symbol_for, CoeffSymbol, HUFFMAN_MAX_BITS};
use crate::error::{CodecError, Result};
use crate::motion::MotionVector;

/// `delta[0] = q[0]`, `delta[1] = q[1]`, `delta[i>=2] = q[i] - q[i-1]`.
pub fn quantized_to_delta(q: &Array64) -> Array64 {
  let mut delta = [0i32; 64];
  delta[0] = q[0];
  delta[1] = q[1];
  for i in 2..64 {
    delta[i] = q[i] - q[i - 1];
  }
  delta
}

/// Inverse of [`quantized_to_delta`].
pub fn delta_to_quantized(delta: &Array64) -> Array64 {
  let mut q = [0i32; 64];
  q[0] = delta[0];
  q[1] = delta[1];
  for i in 2..64 {
    q[i] = q[i - 1] + delta[i];
  }
  q
}

fn zero_run_len(delta: &Array64, start: usize) -> usize {
  let mut idx = start;
  while idx < 64 && delta[idx] == 0 {
    idx += 1;
  }
  idx - start
}

fn write_symbol<W: Write>(w: &mut BitWriter<W>, symbol: CoeffSymbol) -> std::io::Result<()> {
  let (len, code) = huffman_code_for(symbol);
  w.write_bits(code as u64, len)
}

/// Write `n` one-bits followed by a terminating zero-bit.
fn write_unary<W: Write>(w: &mut BitWriter<W>, n: u32) -> std::io::Result<()> {
  for _ in 0..n {
    w.write_bit(1)?;
  }
  w.write_bit(0)
}

/// Read a run of one-bits up to (and consuming) the terminating zero-bit;
/// returns the count of one-bits read.
fn read_unary<R: Read>(r: &mut BitReader<R>) -> Result<u32> {
  let mut n = 0u32;
  while r.read_bit()? == 1 {
    n += 1;
  }
  Ok(n)
}

/// Encode one coefficient array per the delta + Huffman + RLE scheme.
pub fn encode_array64<W: Write>(w: &mut BitWriter<W>, q: &Array64) -> std::io::Result<()> {
  let delta = quantized_to_delta(q);

  w.write_signed(delta[0], 16)?;
  w.write_signed(delta[1], 16)?;

  let mut idx = 2;
  while idx < 64 {
    let v = delta[idx];
    if v != 0 && (-5..=5).contains(&v) {
      write_symbol(w, CoeffSymbol::Literal(v))?;
      idx += 1;
    } else if v < -5 {
      write_symbol(w, CoeffSymbol::NegEsc)?;
      write_unary(w, (-v) as u32)?;
      idx += 1;
    } else if v > 5 {
      write_symbol(w, CoeffSymbol::PosEsc)?;
      write_unary(w, v as u32)?;
      idx += 1;
    } else {
      let run = zero_run_len(&delta, idx);
      idx += run;
      if idx == 64 {
        write_symbol(w, CoeffSymbol::Eob)?;
        return Ok(());
      }
      let mut remaining = run;
      while remaining >= 8 {
        write_symbol(w, CoeffSymbol::Z8)?;
        remaining -= 8;
      }
      for _ in 0..remaining {
        write_symbol(w, CoeffSymbol::Literal(0))?;
      }
    }
  }
  Ok(())
}

fn read_symbol<R: Read>(r: &mut BitReader<R>) -> Result<CoeffSymbol> {
  let mut value: u16 = 0;
  for len in 1..=(HUFFMAN_MAX_BITS + 1) {
    let bit = r.read_bit()?;
    value = (value << 1) | bit as u16;
    if let Some(sym) = huffman_symbol_for(len, value) {
      return Ok(sym);
    }
  }
  Err(CodecError::UndecodableSymbol(HUFFMAN_MAX_BITS + 1))
}

/// Decode one coefficient array, mirroring [`encode_array64`].
pub fn decode_array64<R: Read>(r: &mut BitReader<R>) -> Result<Array64> {
  let mut delta = [0i32; 64];
  delta[0] = r.read_signed(16)?;
  delta[1] = r.read_signed(16)?;

  let mut idx = 2;
  while idx < 64 {
    match read_symbol(r)? {
      CoeffSymbol::Literal(v) => {
        delta[idx] = v;
        idx += 1;
      }
      CoeffSymbol::NegEsc => {
        let magnitude = read_unary(r)?;
        delta[idx] = -(magnitude as i32);
        idx += 1;
      }
      CoeffSymbol::PosEsc => {
        let magnitude = read_unary(r)?;
        delta[idx] = magnitude as i32;
        idx += 1;
      }
      CoeffSymbol::Z8 => {
        for _ in 0..8 {
          delta[idx] = 0;
          idx += 1;
        }
      }
      CoeffSymbol::Eob => {
        while idx < 64 {
          delta[idx] = 0;
          idx += 1;
        }
      }
    }
  }

  Ok(delta_to_quantized(&delta))
}

/// Signed unary delta code used for the motion-vector chain: `0` for a zero
/// delta; otherwise a `1` bit, a sign bit, then `|d|-1` one-bits and a
/// terminating zero-bit.
fn write_mv_delta<W: Write>(w: &mut BitWriter<W>, d: i32) -> std::io::Result<()> {
  if d == 0 {
    return w.write_bit(0);
  }
  w.write_bit(1)?;
  w.write_bit(if d < 0 { 1 } else { 0 })?;
  write_unary(w, (d.abs() - 1) as u32)
}

fn read_mv_delta<R: Read>(r: &mut BitReader<R>) -> Result<i32> {
  if r.read_bit()? == 0 {
    return Ok(0);
  }
  let sign = r.read_bit()?;
  let magnitude = read_unary(r)? as i32 + 1;
  Ok(if sign == 1 { -magnitude } else { magnitude })
}

/// Write the per-frame motion-vector list: a 16-bit count, then the first
/// vector as two 5-bit signed fields, then the rest as delta-coded pairs.
pub fn encode_mv_list<W: Write>(w: &mut BitWriter<W>, mvs: &[MotionVector]) -> std::io::Result<()> {
  w.write_bits(mvs.len() as u64, 16)?;
  if mvs.is_empty() {
    return Ok(());
  }

  w.write_signed(mvs[0].dx, 4)?;
  w.write_signed(mvs[0].dy, 4)?;

  let mut prev = (mvs[0].dx, mvs[0].dy);
  for mv in &mvs[1..] {
    write_mv_delta(w, mv.dx - prev.0)?;
    write_mv_delta(w, mv.dy - prev.1)?;
    prev = (mv.dx, mv.dy);
  }
  Ok(())
}

/// Read the per-frame motion-vector list.
pub fn decode_mv_list<R: Read>(r: &mut BitReader<R>) -> Result<Vec<MotionVector>> {
  let count = r.read_bits(16)? as usize;
  let mut result = Vec::with_capacity(count);
  if count == 0 {
    return Ok(result);
  }

  let first_dx = r.read_signed(4)?;
  let first_dy = r.read_signed(4)?;
  result.push(MotionVector { dx: first_dx, dy: first_dy });

  let mut prev = (first_dx, first_dy);
  for _ in 1..count {
    let dx = prev.0 + read_mv_delta(r)?;
    let dy = prev.1 + read_mv_delta(r)?;
    result.push(MotionVector { dx, dy });
    prev = (dx, dy);
  }
  Ok(result)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn round_trip(q: &Array64) -> Array64 {
    let mut buf = Vec::new();
    {
      let mut w = BitWriter::new(&mut buf);
      encode_array64(&mut w, q).unwrap();
      w.flush_to_byte().unwrap();
    }
    let mut r = BitReader::new(&buf[..]);
    decode_array64(&mut r).unwrap()
  }

  #[test]
  fn delta_round_trip_is_identity() {
    let mut q = [0i32; 64];
    for (i, slot) in q.iter_mut().enumerate() {
      *slot = (i as i32) * 3 - 90;
    }
    let delta = quantized_to_delta(&q);
    assert_eq!(delta_to_quantized(&delta), q);
  }

  #[test]
  fn all_zero_array_encodes_and_decodes() {
    let q = [0i32; 64];
    assert_eq!(round_trip(&q), q);
  }

  #[test]
  fn single_dc_coefficient_then_eob() {
    let mut q = [0i32; 64];
    q[0] = 12;
    assert_eq!(round_trip(&q), q);
  }

  #[test]
  fn literal_and_escape_values_round_trip() {
    let mut q = [0i32; 64];
    q[0] = -200;
    q[1] = 7;
    q[2] = 7 + 3; // delta[2] = 3 (literal)
    q[3] = q[2] - 9; // delta[3] = -9 (negative escape)
    q[4] = q[3] + 40; // delta[4] = 40 (positive escape)
    // leave the rest as a run of zeros (same value as q[4]) to exercise Z8/EOB
    for i in 5..64 {
      q[i] = q[4];
    }
    assert_eq!(round_trip(&q), q);
  }

  #[test]
  fn zero_run_exactly_crossing_z8_boundary() {
    let mut q = [5i32; 64];
    // Make positions 2..=17 (16 zeros) in the delta domain, then a literal.
    q[0] = 1;
    q[1] = 1;
    for i in 2..18 {
      q[i] = q[i - 1]; // delta = 0
    }
    q[18] = q[17] + 2; // delta = 2 literal
    for i in 19..64 {
      q[i] = q[18];
    }
    assert_eq!(round_trip(&q), q);
  }

  #[test]
  fn mv_list_round_trips_with_deltas() {
    let mvs = vec![
      MotionVector { dx: 3, dy: -2 },
      MotionVector { dx: 3, dy: -2 }, // zero delta
      MotionVector { dx: -5, dy: 8 },
      MotionVector { dx: 8, dy: 8 },
    ];

    let mut buf = Vec::new();
    {
      let mut w = BitWriter::new(&mut buf);
      encode_mv_list(&mut w, &mvs).unwrap();
      w.flush_to_byte().unwrap();
    }
    let mut r = BitReader::new(&buf[..]);
    let decoded = decode_mv_list(&mut r).unwrap();

    assert_eq!(decoded.len(), mvs.len());
    for (a, b) in decoded.iter().zip(mvs.iter()) {
      assert_eq!((a.dx, a.dy), (b.dx, b.dy));
    }
  }

  #[test]
  fn empty_mv_list_round_trips() {
    let mut buf = Vec::new();
    {
      let mut w = BitWriter::new(&mut buf);
      encode_mv_list(&mut w, &[]).unwrap();
      w.flush_to_byte().unwrap();
    }
    let mut r = BitReader::new(&buf[..]);
    assert!(decode_mv_list(&mut r).unwrap().is_empty());
  }
}
