// Reads a compressed bitstream from stdin and writes raw YCbCr 4:2:0 to
// stdout. Dimensions and quality come from the stream header; this binary
// takes no arguments (clap still rejects stray ones and provides --help).

use std::io::{self, BufReader, BufWriter};
use std::process::ExitCode;

use clap::Parser;

use tinyvidc::{Decoder, FrameSink};

#[derive(Parser)]
#[command(name = "decoder", about = "Decompress a bitstream from stdin to raw YCbCr 4:2:0 on stdout")]
struct Args;

fn run(_args: Args) -> tinyvidc::Result<()> {
  let stdin = io::stdin();
  let stdout = io::stdout();

  let mut decoder = Decoder::new(BufReader::new(stdin.lock()))?;
  let mut sink = FrameSink::new(BufWriter::new(stdout.lock()));

  while let Some(frame) = decoder.decode_frame()? {
    sink.write_frame(&frame)?;
  }
  Ok(())
}

fn main() -> ExitCode {
  let args = Args::parse();
  match run(args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("decoder: {}", err);
      ExitCode::FAILURE
    }
  }
}
