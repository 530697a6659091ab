//! CLI argument parsing for the os2iot-editor binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "os2iot-editor", about = "Update OS2IoT devices from a CSV file")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare the CSV file with the registry and show what would change
    Preview {
        #[command(flatten)]
        input: InputArgs,

        /// Write the update payload as JSON to this file
        #[arg(long)]
        payload_out: Option<PathBuf>,
    },
    /// Preview, ask for confirmation and update the changed devices
    Apply {
        #[command(flatten)]
        input: InputArgs,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Args)]
pub struct InputArgs {
    /// CSV file with columns name,id,latitude,longitude[,metadata]
    pub file: PathBuf,

    /// Field delimiter
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Print the full update payload as JSON
    #[arg(long)]
    pub show_payload: bool,
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value.as_bytes() {
        [b] if b.is_ascii() && !b.is_ascii_alphanumeric() && *b != b'"' => Ok(*b),
        _ if value == "\\t" => Ok(b'\t'),
        _ => Err(format!("delimiter must be a single punctuation character, got '{}'", value)),
    }
}
