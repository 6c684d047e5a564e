// Raw YCbCr 4:2:0 frame storage and I/O. Frame source/sink are external
// collaborators per the format's scope, but their contract (pixel
// accessors keyed by coordinate, plus frame dimensions) is implemented here
// since the rest of the codec is built directly against it.

use std::io::{self, Read, Write};

#[derive(Clone)]
pub struct Plane {
  pub width: usize,
  pub height: usize,
  pub stride: usize,
  pub data: Box<[u8]>,
}

impl Plane {
  pub fn new(width: usize, height: usize) -> Self {
    Self {
      width,
      height,
      stride: width,
      data: vec![0u8; width * height].into_boxed_slice(),
    }
  }

  #[inline]
  pub fn at(&self, x: usize, y: usize) -> u8 {
    self.data[y * self.stride + x]
  }

  #[inline]
  pub fn set(&mut self, x: usize, y: usize, value: u8) {
    self.data[y * self.stride + x] = value;
  }
}

/// A full YCbCr 4:2:0 frame: a full-resolution Y plane plus half-resolution
/// (rounded up) Cb and Cr planes.
#[derive(Clone)]
pub struct Frame {
  planes: [Plane; 3],
}

impl Frame {
  pub fn new(y_width: usize, y_height: usize) -> Self {
    let uv_width = (y_width + 1) / 2;
    let uv_height = (y_height + 1) / 2;

    Self {
      planes: [Plane::new(y_width, y_height), Plane::new(uv_width, uv_height), Plane::new(uv_width, uv_height)],
    }
  }

  pub fn y(&self) -> &Plane {
    &self.planes[0]
  }

  pub fn y_mut(&mut self) -> &mut Plane {
    &mut self.planes[0]
  }

  pub fn cb(&self) -> &Plane {
    &self.planes[1]
  }

  pub fn cb_mut(&mut self) -> &mut Plane {
    &mut self.planes[1]
  }

  pub fn cr(&self) -> &Plane {
    &self.planes[2]
  }

  pub fn cr_mut(&mut self) -> &mut Plane {
    &mut self.planes[2]
  }

  /// `Y(x,y)` accessor from the frame source/sink contract.
  #[inline]
  pub fn y_at(&self, x: usize, y: usize) -> u8 {
    self.planes[0].at(x, y)
  }

  #[inline]
  pub fn cb_at(&self, x: usize, y: usize) -> u8 {
    self.planes[1].at(x, y)
  }

  #[inline]
  pub fn cr_at(&self, x: usize, y: usize) -> u8 {
    self.planes[2].at(x, y)
  }
}

/// Reads successive raw YCbCr 4:2:0 frames (planar Y, Cb, Cr, one byte per
/// sample, no framing) from an inner reader.
pub struct FrameSource<R> {
  inner: R,
  width: usize,
  height: usize,
}

impl<R: Read> FrameSource<R> {
  pub fn new(inner: R, width: usize, height: usize) -> Self {
    Self { inner, width, height }
  }

  /// Reads the next frame, or `Ok(None)` at a clean end-of-stream (no bytes
  /// at all were read for this frame). A frame that starts but runs out of
  /// data partway through is an I/O error, not an `Ok(None)`.
  pub fn read_frame(&mut self) -> io::Result<Option<Frame>> {
    let mut frame = Frame::new(self.width, self.height);

    if !read_exact_or_eof(&mut self.inner, &mut frame.y_mut().data)? {
      return Ok(None);
    }
    self.inner.read_exact(&mut frame.cb_mut().data)?;
    self.inner.read_exact(&mut frame.cr_mut().data)?;

    Ok(Some(frame))
  }
}

/// Like `Read::read_exact`, but a zero-byte read at the very start of the
/// buffer is reported as `Ok(false)` (clean EOF) rather than an error.
fn read_exact_or_eof<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<bool> {
  let mut filled = 0;
  while filled < buf.len() {
    match r.read(&mut buf[filled..]) {
      Ok(0) => {
        if filled == 0 {
          return Ok(false);
        }
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated frame"));
      }
      Ok(n) => filled += n,
      Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
      Err(e) => return Err(e),
    }
  }
  Ok(true)
}

/// Writes raw YCbCr 4:2:0 frames (planar Y, Cb, Cr) to an inner writer.
pub struct FrameSink<W> {
  inner: W,
}

impl<W: Write> FrameSink<W> {
  pub fn new(inner: W) -> Self {
    Self { inner }
  }

  pub fn write_frame(&mut self, frame: &Frame) -> io::Result<()> {
    self.inner.write_all(&frame.y().data)?;
    self.inner.write_all(&frame.cb().data)?;
    self.inner.write_all(&frame.cr().data)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trips_a_frame_through_source_and_sink() {
    let width = 4;
    let height = 4;
    let y_len = width * height;
    let uv_len = 2 * 2;

    let mut bytes = Vec::new();
    bytes.extend((0..y_len).map(|i| i as u8));
    bytes.extend((0..uv_len).map(|i| 100 + i as u8));
    bytes.extend((0..uv_len).map(|i| 200 + i as u8));

    let mut source = FrameSource::new(&bytes[..], width, height);
    let frame = source.read_frame().unwrap().expect("one frame available");
    assert_eq!(frame.y_at(0, 0), 0);
    assert_eq!(frame.y_at(3, 3), 15);
    assert_eq!(frame.cb_at(0, 0), 100);
    assert_eq!(frame.cr_at(0, 0), 200);

    let mut out = Vec::new();
    {
      let mut sink = FrameSink::new(&mut out);
      sink.write_frame(&frame).unwrap();
    }
    assert_eq!(out, bytes);

    // A second read should cleanly report end of stream.
    assert!(source.read_frame().unwrap().is_none());
  }

  #[test]
  fn truncated_frame_is_an_io_error() {
    let width = 4;
    let height = 4;
    let bytes = vec![0u8; width * height - 1]; // short by one byte
    let mut source = FrameSource::new(&bytes[..], width, height);
    assert!(source.read_frame().is_err());
  }
}
