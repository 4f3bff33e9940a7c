//! Device-facing subcommand implementations.

use crate::Cli;
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use pillboot::{BootloaderHost, SerialTransport, cancel_context_from_global};
use std::fs;
use std::path::Path;

/// Get serial port from CLI args or pick the first detected one.
fn resolve_port(cli: &Cli) -> Result<String> {
    match &cli.port {
        Some(p) => Ok(p.clone()),
        None => pillboot::find_port(None)
            .context("No serial port specified and none detected. Use -p to specify a port."),
    }
}

/// Open the transport, create the engine and run the sync handshake.
fn open_host(cli: &Cli) -> Result<BootloaderHost<SerialTransport>> {
    let port = resolve_port(cli)?;
    println!(
        "{} Using port: {} @ {} baud",
        style("•").cyan(),
        style(&port).cyan(),
        cli.baud
    );

    let transport = SerialTransport::open(&port, cli.baud)
        .with_context(|| format!("Failed to open {port}"))?
        .with_cancel(cancel_context_from_global());
    let mut host = BootloaderHost::new(transport);

    println!(
        "{} Waiting for target... (reset the board to enter the bootloader)",
        style("⏳").yellow()
    );
    host.connect()?;
    println!("{} Connected!", style("✓").green());

    Ok(host)
}

/// Version command implementation.
pub(crate) fn cmd_version(cli: &Cli) -> Result<()> {
    let mut host = open_host(cli)?;

    let version = host
        .version()
        .with_context(|| nack_context("Version query failed", &host))?;
    println!(
        "{} Bootloader version: {}",
        style("✓").green(),
        style(format!("{version:#04x}")).cyan().bold()
    );

    Ok(())
}

/// Enter command mode implementation.
pub(crate) fn cmd_enter(cli: &Cli) -> Result<()> {
    let mut host = open_host(cli)?;

    host.enter_cmd_mode()
        .with_context(|| nack_context("Enter command mode failed", &host))?;
    println!("{} Target is in command mode", style("✓").green());

    Ok(())
}

/// Jump to application implementation.
pub(crate) fn cmd_jump(cli: &Cli) -> Result<()> {
    let mut host = open_host(cli)?;

    host.jump_to_app()
        .with_context(|| nack_context("Jump to application failed", &host))?;
    println!("{} Application started", style("✓").green());

    Ok(())
}

/// Goto address implementation.
pub(crate) fn cmd_goto(cli: &Cli, address: u32) -> Result<()> {
    let mut host = open_host(cli)?;

    host.goto_addr(address)
        .with_context(|| nack_context("Goto failed", &host))?;
    println!(
        "{} Target branched to {address:#010x}",
        style("✓").green()
    );

    Ok(())
}

/// Erase command implementation.
pub(crate) fn cmd_erase(cli: &Cli, page: u32, count: u32, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Erase {count} page(s) starting at page {page}?"))
            .default(false)
            .interact()
            .context("Confirmation prompt failed (use --yes in scripts)")?;
        if !confirmed {
            println!("{} Aborted", style("✗").yellow());
            return Ok(());
        }
    }

    let mut host = open_host(cli)?;

    println!(
        "{} Erasing {count} page(s) starting at page {page}... This may take a while.",
        style("•").red()
    );
    host.flash_erase(page, count)
        .with_context(|| nack_context("Erase failed", &host))?;

    println!("{} Erase completed!", style("✓").green().bold());
    Ok(())
}

/// Write command implementation.
#[allow(clippy::cast_possible_truncation)] // Firmware images are < 4 GB
pub(crate) fn cmd_write(cli: &Cli, file: &Path, address: u32) -> Result<()> {
    let data =
        fs::read(file).with_context(|| format!("Failed to read binary: {}", file.display()))?;
    println!(
        "{} Loaded {} ({} bytes)",
        style("•").cyan(),
        file.display(),
        data.len()
    );

    let mut host = open_host(cli)?;

    let pb = progress_bar(data.len() as u64);
    let result = host.mem_write_with_progress(address, &data, |sent, _total| {
        pb.set_position(sent as u64);
    });
    pb.finish_and_clear();
    result.with_context(|| nack_context("Write failed", &host))?;

    println!(
        "{} Wrote {} bytes to {address:#010x}",
        style("✓").green().bold(),
        data.len()
    );
    Ok(())
}

/// Read command implementation.
pub(crate) fn cmd_read(cli: &Cli, address: u32, length: u32, output: &Path) -> Result<()> {
    let mut host = open_host(cli)?;

    let mut data = vec![0u8; length as usize];
    let result = host.mem_read(address, length, &mut data);
    result.with_context(|| nack_context("Read failed", &host))?;

    fs::write(output, &data)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;
    println!(
        "{} Read {length} bytes from {address:#010x} into {}",
        style("✓").green().bold(),
        output.display()
    );
    Ok(())
}

/// List ports command implementation.
pub(crate) fn cmd_list_ports(json: bool) -> Result<()> {
    let ports = pillboot::list_ports()?;

    if json {
        let entries: Vec<serde_json::Value> = ports
            .iter()
            .map(|p| match &p.port_type {
                serialport::SerialPortType::UsbPort(usb) => serde_json::json!({
                    "name": p.port_name,
                    "vid": usb.vid,
                    "pid": usb.pid,
                    "product": usb.product,
                }),
                _ => serde_json::json!({ "name": p.port_name }),
            })
            .collect();
        println!("{}", serde_json::Value::Array(entries));
        return Ok(());
    }

    println!("{}", style("Available Serial Ports").bold().underlined());
    if ports.is_empty() {
        println!("  {}", style("No serial ports found").dim());
        return Ok(());
    }

    for p in &ports {
        match &p.port_type {
            serialport::SerialPortType::UsbPort(usb) => {
                let product = usb
                    .product
                    .as_deref()
                    .map(|s| format!(" - {}", style(s).dim()))
                    .unwrap_or_default();
                println!(
                    "  {} {} ({:04X}:{:04X}){}",
                    style("•").green(),
                    style(&p.port_name).cyan(),
                    usb.vid,
                    usb.pid,
                    product
                );
            },
            _ => println!("  {} {}", style("•").green(), style(&p.port_name).cyan()),
        }
    }

    Ok(())
}

/// Attach the last NACK diagnostic to an error context line.
fn nack_context(what: &str, host: &BootloaderHost<SerialTransport>) -> String {
    format!("{what} (last NACK field {:#04x})", host.last_nack_field())
}

/// Progress bar in the house style.
fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    #[allow(clippy::unwrap_used)] // Static template string, unwrap is safe
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}",
            )
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}
