use clap::{Args, Parser, Subcommand};
use pixfrag::locate::find_encapsulated_pixel_data;
use pixfrag::writer::write_frames;
use pixfrag::{FragmentError, ItemParser, ParseOptions, SegmentMapper};
use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, SeekFrom};
use std::ops::Range;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pixfrag", about = "Inspect encapsulated DICOM pixel data fragments")]
struct Cli {
    /// Log discovery and segment resolution (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Source {
    input: PathBuf,
    /// Byte position of the Basic Offset Table item; located automatically
    /// when omitted
    #[arg(long)]
    offset: Option<u64>,
    /// Number of Frames (0028,0008)
    #[arg(long)]
    frames: Option<u32>,
    /// Transfer Syntax UID
    #[arg(long)]
    transfer_syntax: Option<String>,
    /// JSON file with parse options; flags take precedence
    #[arg(long)]
    options: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show frame and fragment summary
    Info {
        #[command(flatten)]
        source: Source,
    },
    /// List every fragment
    Fragments {
        #[command(flatten)]
        source: Source,
        /// Print physical extents as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write frames to files
    Extract {
        #[command(flatten)]
        source: Source,
        #[arg(short, long)]
        output_dir: PathBuf,
        /// Frame index (0-based); all frames when omitted
        #[arg(long)]
        frame: Option<u32>,
    },
    /// Resolve a virtual byte range to a physical segment
    Segment {
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        pos: u64,
        #[arg(long)]
        len: usize,
        /// Make this frame current before resolving
        #[arg(long)]
        frame: Option<u32>,
    },
    /// Wrap files as frames of a fragment sequence
    Encapsulate {
        #[arg(short, long)]
        output: PathBuf,
        /// Write a Basic Offset Table
        #[arg(long)]
        table: bool,
        /// Split frames into fragments of at most this many bytes
        #[arg(long)]
        fragment_size: Option<usize>,
        #[arg(required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { source } => {
            let mut parser = open_parser(&source)?;
            let fragments = parser.number_of_fragments()?;
            println!("── Encapsulated Pixel Data ──────────────────────────────");
            println!("  Path           {}", source.input.display());
            println!("  Codec          {}", parser.codec().name());
            println!("  Frames         {}", parser.number_of_frames());
            println!("  Frames found   {}", parser.frames_found());
            println!("  Fragments      {}", fragments);
            match parser.offset_table() {
                Some(table) => println!("  Offset table   {} entries", table.len()),
                None        => println!("  Offset table   none"),
            }
            println!("  Anomalies ({}):", parser.anomalies().len());
            for anomaly in parser.anomalies() {
                println!("    {}", anomaly);
            }
        }

        // ── Fragments ────────────────────────────────────────────────────────
        Commands::Fragments { source, json } => {
            let mut parser = open_parser(&source)?;
            if json {
                let extents = parser.fragment_extents()?;
                println!("{}", serde_json::to_string_pretty(&extents)?);
            } else {
                parser.discover_all()?;
                println!("{:>6} {:>12} {:>12} {:>10}", "#", "Offset", "Position", "Length");
                for (i, item) in parser.fragments().iter().enumerate() {
                    println!("{:>6} {:>12} {:>12} {:>10}",
                        i + 1, item.offset, item.start_pos, item.length);
                }
            }
        }

        // ── Extract ──────────────────────────────────────────────────────────
        Commands::Extract { source, output_dir, frame } => {
            let mut parser = open_parser(&source)?;
            std::fs::create_dir_all(&output_dir)?;
            for index in frames_to_extract(frame, parser.number_of_frames()) {
                let f = u32::try_from(index)?;
                let data = match parser.read_frame(f) {
                    Ok(data) => data,
                    Err(e @ FragmentError::FrameNotFound { .. }) if frame.is_none() => {
                        eprintln!("{}", e);
                        break;
                    }
                    Err(e) => return Err(e.into()),
                };
                let number = index + 1;
                let path = output_dir.join(format!("frame_{:04}.bin", number));
                std::fs::write(&path, &data)?;
                println!("  frame {:>4}  {:>10} B  crc32={:08x}  lead={}  {}",
                    number,
                    data.len(),
                    crc32fast::hash(&data),
                    hex::encode(&data[..data.len().min(8)]),
                    path.display());
            }
        }

        // ── Segment ──────────────────────────────────────────────────────────
        Commands::Segment { source, pos, len, frame } => {
            let mut parser = open_parser(&source)?;
            if let Some(f) = frame {
                parser.seek_frame(f)?;
            }
            let seg = parser.stream_segment(pos, len)?;
            if seg.is_end_of_data() {
                println!("end of data");
            } else {
                println!("start_pos={} length={}", seg.start_pos, seg.length);
            }
        }

        // ── Encapsulate ──────────────────────────────────────────────────────
        Commands::Encapsulate { output, table, fragment_size, input } => {
            let mut frames = Vec::with_capacity(input.len());
            for path in &input {
                let data = std::fs::read(path)?;
                frames.push(split_fragments(data, fragment_size));
                println!("  added  {}", path.display());
            }
            write_frames(BufWriter::new(File::create(&output)?), &frames, table)?;
            println!("Created: {}", output.display());
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_options(source: &Source) -> Result<ParseOptions, Box<dyn std::error::Error>> {
    let mut opts = match &source.options {
        Some(path) => ParseOptions::from_json(&std::fs::read(path)?)?,
        None       => ParseOptions::default(),
    };
    if let Some(frames) = source.frames {
        opts.number_of_frames = frames;
    }
    if let Some(ts) = &source.transfer_syntax {
        opts.transfer_syntax = ts.clone();
    }
    Ok(opts)
}

fn open_parser(source: &Source) -> Result<ItemParser<BufReader<File>>, Box<dyn std::error::Error>> {
    let opts = parse_options(source)?;
    let mut reader = BufReader::new(File::open(&source.input)?);
    let offset = match source.offset {
        Some(offset) => offset,
        None => find_encapsulated_pixel_data(&mut reader)?
            .ok_or("no encapsulated Pixel Data element found; pass --offset")?,
    };
    reader.seek(SeekFrom::Start(offset))?;
    Ok(ItemParser::new(reader, &opts)?)
}

/// Frame indices for `extract`: the one requested, or every frame.
fn frames_to_extract(frame: Option<u32>, total: u32) -> Range<u64> {
    match frame {
        Some(f) => u64::from(f)..u64::from(f) + 1,
        None    => 0..u64::from(total),
    }
}

fn split_fragments(data: Vec<u8>, fragment_size: Option<usize>) -> Vec<Vec<u8>> {
    match fragment_size {
        Some(size) if size > 0 && data.len() > size => {
            data.chunks(size).map(<[u8]>::to_vec).collect()
        }
        _ => vec![data],
    }
}
