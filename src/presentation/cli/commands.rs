//! CLI commands using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// rabbit - signature-based file carver
///
/// Recovers files embedded in raw disk and memory images by pairing known
/// header and footer signatures.
#[derive(Parser, Debug)]
#[command(name = "rabbit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Carve files out of raw images by header/footer signatures", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Carve files out of an image into a directory
    Carve {
        #[command(flatten)]
        scan: ScanArgs,

        /// Output directory for carved files
        #[arg(short, long)]
        output: PathBuf,

        /// Abort on the first file that cannot be written
        #[arg(long)]
        fail_fast: bool,
    },

    /// List carve jobs as JSON lines without writing files
    Scan {
        #[command(flatten)]
        scan: ScanArgs,
    },

    /// List the signatures a run would look for
    Signatures {
        /// JSON signature catalog (defaults to the built-in table)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Flags shared by `carve` and `scan`
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Path to the image file or device (e.g., disk.img, /dev/sdb)
    #[arg(short, long)]
    pub input: PathBuf,

    /// JSON signature catalog (defaults to the built-in table)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Extensions to carve (e.g. jpg,png); built-in bmp and tif only run when named
    #[arg(short = 't', long = "types", value_delimiter = ',')]
    pub types: Vec<String>,

    /// Read size per chunk; accepts K, M and G suffixes
    #[arg(long, default_value = "4M", value_parser = parse_size)]
    pub chunk_size: usize,

    /// Worker threads; 1 scans sequentially
    #[arg(long, default_value_t = 1)]
    pub threads: usize,

    /// Stop after this many files
    #[arg(long)]
    pub limit: Option<u64>,

    /// Read the image through a memory map
    #[arg(long)]
    pub mmap: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Parses a byte count such as `65536`, `64K` or `4M`
pub fn parse_size(text: &str) -> Result<usize, String> {
    let text = text.trim();
    let (digits, multiplier) = match text.char_indices().last() {
        Some((at, 'k' | 'K')) => (&text[..at], 1024),
        Some((at, 'm' | 'M')) => (&text[..at], 1024 * 1024),
        Some((at, 'g' | 'G')) => (&text[..at], 1024 * 1024 * 1024),
        _ => (text, 1),
    };
    let value: usize = digits
        .trim()
        .parse()
        .map_err(|_| format!("invalid size: '{}'", text))?;
    match value.checked_mul(multiplier) {
        Some(0) => Err("size must be greater than zero".to_string()),
        Some(bytes) => Ok(bytes),
        None => Err(format!("size too large: '{}'", text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("4096"), Ok(4096));
        assert_eq!(parse_size("64K"), Ok(64 * 1024));
        assert_eq!(parse_size("4m"), Ok(4 * 1024 * 1024));
        assert!(parse_size("0").is_err());
        assert!(parse_size("lots").is_err());
    }

    #[test]
    fn test_carve_command_parses() {
        let cli = Cli::try_parse_from([
            "rabbit", "-vv", "carve", "-i", "disk.img", "-o", "out", "-t", "jpg,png", "--threads",
            "4", "--chunk-size", "1M",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Carve { scan, output, fail_fast } => {
                assert_eq!(scan.types, vec!["jpg", "png"]);
                assert_eq!(scan.threads, 4);
                assert_eq!(scan.chunk_size, 1024 * 1024);
                assert_eq!(output, PathBuf::from("out"));
                assert!(!fail_fast);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
