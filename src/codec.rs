// The frame coordinator: the encoder and decoder state machines that drive
// per-frame coding. Both sides share one reconstruction routine so that the
// encoder's local reference frame and the decoder's output are built by
// running the exact same arithmetic.

use std::io::{Read, Write};

use crate::bitio::{BitReader, BitWriter};
use crate::block::{self, Array64, Block8x8};
use crate::dct;
use crate::entropy;
use crate::error::{CodecError, Result};
use crate::frame::{Frame, Plane};
use crate::motion::{self, MotionVector};
use crate::partition;
use crate::quality::Quality;

/// Frames idle this long without a scene change before the reset rule is
/// even considered (see `Encoder::encode_frame`).
const RESET_FRAME_THRESHOLD: u32 = 175;
/// Fraction of rejected macroblocks in a frame that triggers the reset rule.
const RESET_REJECTION_FRACTION: f64 = 0.35;

fn macroblocks_wide(chroma_width: usize) -> usize {
  partition::div_ceil(chroma_width, 8)
}

/// Clamp `(x, y)` into `plane`'s bounds and read the pixel there. Used for
/// the motion-compensated reference fetch, whose offset can run past the
/// frame edge near boundary macroblocks.
fn sample(plane: &Plane, x: i32, y: i32) -> u8 {
  let cx = x.clamp(0, plane.width as i32 - 1) as usize;
  let cy = y.clamp(0, plane.height as i32 - 1) as usize;
  plane.at(cx, cy)
}

/// Gather the six 8x8 reference blocks (Y-TL, Y-TR, Y-BL, Y-BR, Cb, Cr) for
/// macroblock `macro_idx` from `prev`, offset by `mv`. The chroma blocks use
/// the exact-reference rule: each of the 64 positions samples
/// `Cb((P_x+c)/2, (P_y+r)/2)`, i.e. the luma-space offset halved by integer
/// division rather than scaled -- duplicate chroma samples are expected.
fn gather_reference_blocks(prev: &Frame, macro_idx: usize, wide: usize, mv: MotionVector) -> [Block8x8; 6] {
  let b_x = (macro_idx % wide) * 16;
  let b_y = (macro_idx / wide) * 16;
  let p_x = b_x as i32 + mv.dx;
  let p_y = b_y as i32 + mv.dy;

  let y = prev.y();
  let cb = prev.cb();
  let cr = prev.cr();

  let mut tl = block::zero_block();
  let mut tr = block::zero_block();
  let mut bl = block::zero_block();
  let mut br = block::zero_block();
  let mut cb_block = block::zero_block();
  let mut cr_block = block::zero_block();

  for r in 0..8i32 {
    for c in 0..8i32 {
      tl[r as usize][c as usize] = sample(y, p_x + c, p_y + r) as f64;
      tr[r as usize][c as usize] = sample(y, p_x + 8 + c, p_y + r) as f64;
      bl[r as usize][c as usize] = sample(y, p_x + c, p_y + 8 + r) as f64;
      br[r as usize][c as usize] = sample(y, p_x + 8 + c, p_y + 8 + r) as f64;

      let cx = (p_x + c).div_euclid(2);
      let cy = (p_y + r).div_euclid(2);
      cb_block[r as usize][c as usize] = sample(cb, cx, cy) as f64;
      cr_block[r as usize][c as usize] = sample(cr, cx, cy) as f64;
    }
  }

  [tl, tr, bl, br, cb_block, cr_block]
}

/// Inverse-quantize and inverse-transform one coefficient array, adding back
/// `reference` when this is a predicted (P) block. Shared by the encoder's
/// local reconstruction and the decoder's frame reconstruction so the two
/// sides run identical arithmetic.
fn reconstruct(array: &Array64, quality: Quality, is_luma: bool, reference: Option<&Block8x8>) -> Block8x8 {
  let quantized = block::array_to_block(array);
  let unquantized = dct::unquantize(&quantized, quality, is_luma, reference.is_some());
  let residual = dct::inverse(&unquantized);
  match reference {
    Some(r) => block::add(r, &residual),
    None => residual,
  }
}

/// Forward transform, quantize and serialize one block, also returning its
/// locally reconstructed pixels. `reference` is `None` for an I-block and
/// `Some` (the co-located reference block) for a P-block.
fn encode_block(active: &Block8x8, quality: Quality, is_luma: bool, reference: Option<&Block8x8>) -> (Array64, Block8x8) {
  let is_p = reference.is_some();
  let source = match reference {
    Some(r) => block::delta(active, r),
    None => *active,
  };
  let transformed = dct::forward(&source);
  let quantized = dct::quantize(&transformed, quality, is_luma, is_p);
  let array = block::block_to_array(&quantized);
  let reconstructed = reconstruct(&array, quality, is_luma, reference);
  (array, reconstructed)
}

/// Drives per-frame encoding: classifies macroblocks as I or P, emits the
/// compressed bitstream, and maintains the reconstructed reference frame
/// the next call's motion estimation and P-path prediction read from.
pub struct Encoder<W> {
  writer: BitWriter<W>,
  width: usize,
  height: usize,
  quality: Quality,
  previous_frame: Option<Frame>,
  frame_number: u32,
}

impl<W: Write> Encoder<W> {
  /// Writes the stream header (`quality`, `height`, `width`) immediately.
  pub fn new(inner: W, width: usize, height: usize, quality: Quality) -> std::io::Result<Self> {
    let mut writer = BitWriter::new(inner);
    writer.write_bits(quality.to_bits() as u64, 2)?;
    writer.write_bits(height as u64, 16)?;
    writer.write_bits(width as u64, 16)?;
    Ok(Self { writer, width, height, quality, previous_frame: None, frame_number: 0 })
  }

  /// Encode one frame: partition, classify, transform/quantize, entropy
  /// code, and rebuild the reference frame for the next call.
  pub fn encode_frame(&mut self, frame: &Frame) -> Result<()> {
    self.writer.write_bit(1)?;

    let y_blocks = partition::partition_luma(frame.y());
    let cb_blocks = partition::partition_chroma(frame.cb());
    let cr_blocks = partition::partition_chroma(frame.cr());

    let cb_width = frame.cb().width;
    let cb_height = frame.cb().height;
    let macroblock_count = partition::macroblock_count(cb_width, cb_height);
    let wide = macroblocks_wide(cb_width);

    let mut is_p_block = Vec::with_capacity(macroblock_count);
    let mut motion_vectors = Vec::new();
    let mut rejected = 0usize;
    let mut arrays_per_macroblock = Vec::with_capacity(macroblock_count);

    let mut recon_y = Vec::with_capacity(macroblock_count * 4);
    let mut recon_cb = Vec::with_capacity(macroblock_count);
    let mut recon_cr = Vec::with_capacity(macroblock_count);

    for m in 0..macroblock_count {
      let tl = y_blocks[m * 4];
      let tr = y_blocks[m * 4 + 1];
      let bl = y_blocks[m * 4 + 2];
      let br = y_blocks[m * 4 + 3];
      let active_macroblock = block::make_macroblock(&tl, &tr, &bl, &br);

      let (mv, good) = match &self.previous_frame {
        Some(prev) => motion::estimate(&active_macroblock, prev.y(), m, wide),
        None => (MotionVector { dx: 0, dy: 0 }, false),
      };
      if !good {
        rejected += 1;
      }

      let is_p = self.frame_number != 0 && good;
      is_p_block.push(is_p);

      let references = if is_p {
        motion_vectors.push(MotionVector { dx: mv.dx, dy: mv.dy });
        Some(gather_reference_blocks(self.previous_frame.as_ref().unwrap(), m, wide, mv))
      } else {
        None
      };

      let active_blocks = [tl, tr, bl, br, cb_blocks[m], cr_blocks[m]];
      let mut arrays: [Array64; 6] = [[0i32; 64]; 6];
      for i in 0..6 {
        let is_luma = i < 4;
        let reference = references.as_ref().map(|r| &r[i]);
        let (array, recon) = encode_block(&active_blocks[i], self.quality, is_luma, reference);
        arrays[i] = array;
        match i {
          0 | 1 | 2 | 3 => recon_y.push(recon),
          4 => recon_cb.push(recon),
          _ => recon_cr.push(recon),
        }
      }
      arrays_per_macroblock.push(arrays);
    }

    entropy::encode_mv_list(&mut self.writer, &motion_vectors)?;

    for m in 0..macroblock_count {
      self.writer.write_bit(if is_p_block[m] { 1 } else { 0 })?;
      for array in &arrays_per_macroblock[m] {
        entropy::encode_array64(&mut self.writer, array)?;
      }
    }

    let mut reconstructed = Frame::new(self.width, self.height);
    partition::undo_partition_luma(reconstructed.y_mut(), &recon_y);
    partition::undo_partition_chroma(reconstructed.cb_mut(), &recon_cb);
    partition::undo_partition_chroma(reconstructed.cr_mut(), &recon_cr);
    self.previous_frame = Some(reconstructed);

    let rejection_fraction = rejected as f64 / macroblock_count as f64;
    if self.frame_number > RESET_FRAME_THRESHOLD && rejection_fraction >= RESET_REJECTION_FRACTION {
      self.frame_number = 0;
    } else {
      self.frame_number += 1;
    }

    Ok(())
  }

  /// Emit the end-of-stream flag and flush the final partial byte. Consumes
  /// the encoder since no further frames may follow.
  pub fn finish(mut self) -> std::io::Result<()> {
    self.writer.write_bit(0)?;
    self.writer.flush_to_byte()
  }
}

/// The inverse state machine: reads the header once, then one frame at a
/// time, reconstructing each from the previous reconstructed frame exactly
/// as the encoder did.
pub struct Decoder<R> {
  reader: BitReader<R>,
  width: usize,
  height: usize,
  quality: Quality,
  previous_frame: Option<Frame>,
}

impl<R: Read> Decoder<R> {
  /// Reads and validates the stream header.
  pub fn new(inner: R) -> Result<Self> {
    let mut reader = BitReader::new(inner);
    let quality_bits = reader.read_bits(2)? as u8;
    let quality = Quality::from_bits(quality_bits).ok_or(CodecError::InvalidHeader)?;
    let height = reader.read_bits(16)? as usize;
    let width = reader.read_bits(16)? as usize;
    Ok(Self { reader, width, height, quality, previous_frame: None })
  }

  pub fn width(&self) -> usize {
    self.width
  }

  pub fn height(&self) -> usize {
    self.height
  }

  pub fn quality(&self) -> Quality {
    self.quality
  }

  /// Decode the next frame, or `Ok(None)` at the end-of-stream flag.
  pub fn decode_frame(&mut self) -> Result<Option<Frame>> {
    if self.reader.read_bit()? == 0 {
      return Ok(None);
    }

    let cb_width = (self.width + 1) / 2;
    let cb_height = (self.height + 1) / 2;
    let macroblock_count = partition::macroblock_count(cb_width, cb_height);
    let wide = macroblocks_wide(cb_width);

    let motion_vectors = entropy::decode_mv_list(&mut self.reader)?;
    let mut next_mv = motion_vectors.into_iter();

    let mut recon_y = Vec::with_capacity(macroblock_count * 4);
    let mut recon_cb = Vec::with_capacity(macroblock_count);
    let mut recon_cr = Vec::with_capacity(macroblock_count);

    for m in 0..macroblock_count {
      let is_p = self.reader.read_bit()? == 1;

      let mut arrays: [Array64; 6] = [[0i32; 64]; 6];
      for slot in arrays.iter_mut() {
        *slot = entropy::decode_array64(&mut self.reader)?;
      }

      let references = if is_p {
        let mv = next_mv.next().ok_or(CodecError::TruncatedInput)?;
        let prev = self.previous_frame.as_ref().ok_or(CodecError::TruncatedInput)?;
        Some(gather_reference_blocks(prev, m, wide, mv))
      } else {
        None
      };

      for i in 0..6 {
        let is_luma = i < 4;
        let reference = references.as_ref().map(|r| &r[i]);
        let recon = reconstruct(&arrays[i], self.quality, is_luma, reference);
        match i {
          0 | 1 | 2 | 3 => recon_y.push(recon),
          4 => recon_cb.push(recon),
          _ => recon_cr.push(recon),
        }
      }
    }

    let mut frame = Frame::new(self.width, self.height);
    partition::undo_partition_luma(frame.y_mut(), &recon_y);
    partition::undo_partition_chroma(frame.cb_mut(), &recon_cb);
    partition::undo_partition_chroma(frame.cr_mut(), &recon_cr);

    self.previous_frame = Some(frame.clone());
    Ok(Some(frame))
  }
}
