// Reads raw YCbCr 4:2:0 from stdin and writes a compressed bitstream to
// stdout. `<width> <height> <low|medium|high>` on the command line; clap
// rejects anything else with its own usage message and nonzero exit.

use std::io::{self, BufReader, BufWriter};
use std::process::ExitCode;

use clap::Parser;

use tinyvidc::{Encoder, FrameSource, Quality};

#[derive(Parser)]
#[command(name = "encoder", about = "Compress raw YCbCr 4:2:0 video from stdin to stdout")]
struct Args {
  /// Frame width in pixels (must match the raw input).
  width: usize,
  /// Frame height in pixels (must match the raw input).
  height: usize,
  /// Compression quality.
  quality: Quality,
}

fn run(args: Args) -> tinyvidc::Result<()> {
  let stdin = io::stdin();
  let stdout = io::stdout();

  let mut source = FrameSource::new(BufReader::new(stdin.lock()), args.width, args.height);
  let mut encoder = Encoder::new(BufWriter::new(stdout.lock()), args.width, args.height, args.quality)?;

  while let Some(frame) = source.read_frame()? {
    encoder.encode_frame(&frame)?;
  }
  encoder.finish()?;
  Ok(())
}

fn main() -> ExitCode {
  let args = Args::parse();
  match run(args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("encoder: {}", err);
      ExitCode::FAILURE
    }
  }
}
