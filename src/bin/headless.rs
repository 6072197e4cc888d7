//! Headless emulator runner
//!
//! Feeds a byte stream through the emulator without a GUI and prints the
//! final frame. Useful for testing and for generating deterministic
//! frame dumps.
//!
//! # Usage
//!
//! ```bash
//! # Frame JSON from stdin bytes
//! printf 'Hello \x1b[31mRed\x1b[0m' | herminal-headless
//!
//! # Plain text from a capture file, custom grid
//! herminal-headless --input capture.bin --text --cols 80 --rows 24
//! ```

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use herminal::core::{DEFAULT_COLS, DEFAULT_ROWS};
use herminal::Emulator;

struct Args {
    /// Input file (stdin if not specified)
    input: Option<PathBuf>,
    /// Output file (stdout if not specified)
    output: Option<PathBuf>,
    /// Output as text instead of JSON
    text: bool,
    cols: usize,
    rows: usize,
    help: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            text: false,
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            help: false,
        }
    }
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let mut i = 0;
    while i < argv.len() {
        match argv[i].as_str() {
            "-h" | "--help" => {
                args.help = true;
            }
            "-i" | "--input" => {
                i += 1;
                if i < argv.len() {
                    args.input = Some(PathBuf::from(&argv[i]));
                }
            }
            "-o" | "--output" => {
                i += 1;
                if i < argv.len() {
                    args.output = Some(PathBuf::from(&argv[i]));
                }
            }
            "-t" | "--text" => {
                args.text = true;
            }
            "-c" | "--cols" => {
                i += 1;
                if i < argv.len() {
                    args.cols = argv[i].parse().unwrap_or(DEFAULT_COLS);
                }
            }
            "-r" | "--rows" => {
                i += 1;
                if i < argv.len() {
                    args.rows = argv[i].parse().unwrap_or(DEFAULT_ROWS);
                }
            }
            _ => {}
        }
        i += 1;
    }

    args
}

fn print_help() {
    eprintln!(
        r#"herminal-headless - run the terminal emulator without a GUI

USAGE:
    herminal-headless [OPTIONS]

OPTIONS:
    -h, --help              Show this help message
    -i, --input <FILE>      Input file (stdin if not specified)
    -o, --output <FILE>     Output file (stdout if not specified)
    -t, --text              Output as plain text instead of JSON
    -c, --cols <N>          Terminal columns (default: 100)
    -r, --rows <N>          Terminal rows (default: 30)

EXAMPLES:
    # Escape sequences in, frame JSON out
    printf 'Hello \x1b[31mWorld\x1b[0m' | herminal-headless

    # Capture file in, plain text out
    herminal-headless -i capture.bin -t

    # Custom grid size
    herminal-headless -c 80 -r 24 -i capture.bin -o frame.json
"#
    );
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = parse_args();

    if args.help {
        print_help();
        return Ok(());
    }

    let input_data = if let Some(path) = &args.input {
        std::fs::read(path)?
    } else {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data)?;
        data
    };

    let mut emulator = Emulator::new(args.cols, args.rows);
    emulator.feed(&input_data);
    let frame = emulator.frame();

    let output_data = if args.text {
        frame.to_text()
    } else {
        frame.to_json().map_err(io::Error::other)?
    };

    if let Some(path) = &args.output {
        let mut file = File::create(path)?;
        file.write_all(output_data.as_bytes())?;
    } else {
        io::stdout().write_all(output_data.as_bytes())?;
    }

    Ok(())
}
