//! Retrodec CLI - inspect and extract chunked game resource archives.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use retrodec_anim::{Codec37Decoder, FrameHeader};
use retrodec_container::{crypt, element, infer_schema, Indexer, ScanConfig, Schema};

/// Inspect and extract chunked game resource archives.
#[derive(Parser)]
#[command(name = "retrodec", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the element tree of an archive.
    Tree(TreeArgs),
    /// Infer the nesting schema of an archive and print it as JSON.
    Schema(ArchiveArgs),
    /// Extract the payload of one element to a file.
    Extract(ExtractArgs),
    /// Decode the video frames of an animation stream and report on them.
    Frames(FramesArgs),
}

/// Archive family selector.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Family {
    /// Big-endian resource archive.
    Resource,
    /// Little-endian animation/audio stream.
    Stream,
    /// Legacy archive with two-character tags.
    Legacy,
}

#[derive(Args)]
struct ArchiveArgs {
    /// Archive file.
    file: PathBuf,

    /// Archive family.
    #[arg(long, value_enum, default_value = "resource")]
    family: Family,

    /// Alignment boundary override.
    #[arg(long)]
    boundary: Option<u64>,

    /// XOR key the archive is masked with (hex), e.g. 69.
    #[arg(long)]
    key: Option<String>,

    /// Tolerate a single stray byte of this value (hex) ahead of chunk
    /// headers.
    #[arg(long)]
    stray_byte: Option<String>,
}

#[derive(Args)]
struct TreeArgs {
    #[command(flatten)]
    archive: ArchiveArgs,

    /// Schema file; inferred from the archive when omitted.
    #[arg(long)]
    schema: Option<PathBuf>,
}

#[derive(Args)]
struct ExtractArgs {
    #[command(flatten)]
    tree: TreeArgs,

    /// Slash-separated tag path, e.g. LECF/LFLF/ROOM.
    path: String,

    /// Output file; defaults to the last path segment.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct FramesArgs {
    #[command(flatten)]
    archive: ArchiveArgs,

    /// Frame width in pixels.
    #[arg(long)]
    width: u32,

    /// Frame height in pixels.
    #[arg(long)]
    height: u32,
}

impl ArchiveArgs {
    fn scan_config(&self) -> anyhow::Result<ScanConfig> {
        let mut config = match self.family {
            Family::Resource => ScanConfig::resource(),
            Family::Stream => ScanConfig::stream(),
            Family::Legacy => ScanConfig::legacy(),
        };
        if let Some(boundary) = self.boundary {
            if boundary == 0 {
                bail!("alignment boundary must be at least 1");
            }
            config = config.with_boundary(boundary);
        }
        if let Some(stray) = &self.stray_byte {
            config = config.with_stray_byte(parse_hex_byte(stray)?);
        }
        Ok(config)
    }

    fn read(&self) -> anyhow::Result<Vec<u8>> {
        let mut data = fs::read(&self.file)
            .with_context(|| format!("reading {}", self.file.display()))?;
        if let Some(key) = &self.key {
            crypt::decrypt_in_place(&mut data, parse_hex_byte(key)?);
        }
        Ok(data)
    }
}

fn parse_hex_byte(text: &str) -> anyhow::Result<u8> {
    u8::from_str_radix(text.trim_start_matches("0x"), 16)
        .with_context(|| format!("'{text}' is not a hex byte"))
}

fn load_schema(buf: &[u8], config: ScanConfig, path: Option<&PathBuf>) -> anyhow::Result<Schema> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading schema {}", path.display()))?;
            Ok(Schema::from_json(&text)?)
        }
        None => {
            info!("no schema given, inferring from the archive");
            Ok(infer_schema(buf, config, Schema::new())?)
        }
    }
}

fn cmd_tree(args: &TreeArgs) -> anyhow::Result<()> {
    let buf = args.archive.read()?;
    let config = args.archive.scan_config()?;
    let schema = load_schema(&buf, config, args.schema.as_ref())?;

    let roots = Indexer::new(&schema, config).index(&buf, None)?;
    for root in &roots {
        print!("{}", root.dump());
    }
    Ok(())
}

fn cmd_schema(args: &ArchiveArgs) -> anyhow::Result<()> {
    let buf = args.read()?;
    let config = args.scan_config()?;
    let schema = infer_schema(&buf, config, Schema::new())?;
    println!("{}", schema.to_json());
    Ok(())
}

fn cmd_extract(args: &ExtractArgs) -> anyhow::Result<()> {
    let buf = args.tree.archive.read()?;
    let config = args.tree.archive.scan_config()?;
    let schema = load_schema(&buf, config, args.tree.schema.as_ref())?;

    let roots = Indexer::new(&schema, config).index(&buf, None)?;
    let Some(element) = element::find_path(&roots, &args.path) else {
        bail!("path '{}' does not resolve to an element", args.path);
    };

    let output = args.output.clone().unwrap_or_else(|| {
        let name = args.path.rsplit('/').next().unwrap_or("chunk");
        PathBuf::from(name.trim().to_lowercase())
    });
    fs::write(&output, element.chunk.slice())
        .with_context(|| format!("writing {}", output.display()))?;
    info!(
        path = %args.path,
        bytes = element.chunk.len(),
        out = %output.display(),
        "extracted element payload"
    );
    Ok(())
}

fn cmd_frames(args: &FramesArgs) -> anyhow::Result<()> {
    let buf = args.archive.read()?;
    let config = args.archive.scan_config()?;
    let schema = infer_schema(&buf, config, Schema::new())?;
    let roots = Indexer::new(&schema, config).index(&buf, None)?;

    let mut decoder = Codec37Decoder::new(args.width, args.height)?;
    let mut count = 0usize;
    for root in &roots {
        visit_frames(root, &mut decoder, &mut count)?;
    }
    if count == 0 {
        bail!("no video frames found in the archive");
    }
    println!("{count} frames decoded");
    Ok(())
}

fn visit_frames(
    element: &element::Element<'_>,
    decoder: &mut Codec37Decoder,
    count: &mut usize,
) -> anyhow::Result<()> {
    if element.tag() == retrodec_anim::tags::FOBJ {
        let header = FrameHeader::parse(element.chunk.slice())?;
        let frame = decoder.decode_frame(element.chunk.slice())?;
        println!(
            "frame {:>4}  opcode {}  {} bytes{}",
            header.seq,
            header.opcode,
            frame.data.len(),
            if header.seq == 0 { "  (scene start)" } else { "" },
        );
        *count += 1;
    }
    for child in &element.children {
        visit_frames(child, decoder, count)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Command::Tree(args) => cmd_tree(args),
        Command::Schema(args) => cmd_schema(args),
        Command::Extract(args) => cmd_extract(args),
        Command::Frames(args) => cmd_frames(args),
    }
}
