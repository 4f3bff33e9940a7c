//! pillboot CLI - command-line tool for the BluePill serial bootloader.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use env_logger::Env;
use std::path::PathBuf;

mod commands;

/// pillboot - drive the BluePill serial bootloader from the command line.
#[derive(Parser)]
#[command(name = "pillboot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Serial port to use (first detected if not specified).
    #[arg(short, long, env = "PILLBOOT_PORT")]
    port: Option<String>,

    /// Baud rate.
    #[arg(short, long, default_value = "115200", env = "PILLBOOT_BAUD")]
    baud: u32,

    /// Verbose output level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Read the bootloader version byte.
    Version,

    /// Put the target into command mode.
    Enter,

    /// Leave the bootloader and start the application.
    Jump,

    /// Branch the bootloader to an address.
    Goto {
        /// Target address (hexadecimal, e.g. 0x08004000).
        #[arg(value_parser = parse_hex_u32)]
        address: u32,
    },

    /// Erase flash pages.
    Erase {
        /// First page to erase.
        #[arg(long)]
        page: u32,

        /// Number of pages to erase.
        #[arg(long, default_value_t = 1)]
        count: u32,

        /// Skip the confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Write a raw binary to target memory.
    Write {
        /// Binary file to write.
        file: PathBuf,

        /// Destination address (hexadecimal, e.g. 0x0800F800).
        #[arg(short, long, value_parser = parse_hex_u32)]
        address: u32,
    },

    /// Read target memory into a file.
    Read {
        /// Source address (hexadecimal, e.g. 0x08000000).
        #[arg(short, long, value_parser = parse_hex_u32)]
        address: u32,

        /// Number of bytes to read.
        #[arg(short, long)]
        length: u32,

        /// Output file.
        output: PathBuf,
    },

    /// List available serial ports.
    ListPorts {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Parse hexadecimal address.
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    let s = s.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(s, 16).map_err(|e| format!("Invalid hex address: {e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Ctrl-C cancels the in-flight operation via the global interrupt flag
    ctrlc::set_handler(pillboot::set_interrupt_flag).context("Failed to set Ctrl-C handler")?;

    match &cli.command {
        Commands::Version => commands::device::cmd_version(&cli),
        Commands::Enter => commands::device::cmd_enter(&cli),
        Commands::Jump => commands::device::cmd_jump(&cli),
        Commands::Goto { address } => commands::device::cmd_goto(&cli, *address),
        Commands::Erase { page, count, yes } => {
            commands::device::cmd_erase(&cli, *page, *count, *yes)
        },
        Commands::Write { file, address } => commands::device::cmd_write(&cli, file, *address),
        Commands::Read {
            address,
            length,
            output,
        } => commands::device::cmd_read(&cli, *address, *length, output),
        Commands::ListPorts { json } => commands::device::cmd_list_ports(*json),
        Commands::Completions { shell } => {
            commands::completions::cmd_completions(*shell);
            Ok(())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_u32_with_prefix() {
        assert_eq!(parse_hex_u32("0x08000000").unwrap(), 0x0800_0000);
        assert_eq!(parse_hex_u32("0X0800F800").unwrap(), 0x0800_F800);
    }

    #[test]
    fn test_parse_hex_u32_without_prefix() {
        assert_eq!(parse_hex_u32("20000000").unwrap(), 0x2000_0000);
    }

    #[test]
    fn test_parse_hex_u32_rejects_garbage() {
        assert!(parse_hex_u32("not-an-address").is_err());
        assert!(parse_hex_u32("").is_err());
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
