//! Bootloader host engine: session state machine and command operations.
//!
//! [`BootloaderHost`] owns a [`Transport`] exclusively and drives one
//! command at a time: encode, send, await the 3-byte ACK, then run the
//! operation-specific follow-up (a RESPONSE frame for version, a second ACK
//! for erase, a DATA_PACKET stream for memory reads and writes). Any
//! failure drops the session back to [`HostState::Sync`], so the next
//! operation re-establishes the handshake before transmitting.

use crate::error::{Error, Result};
use crate::protocol::frame::{
    self, Ack, Command, DataPacket, Header, Response, DATA_BLOCK_SIZE, DATA_PACKET_OVERHEAD,
    ENTER_CMD_MODE_KEY, HEADER_LEN, JUMP_APP_KEY, MAX_FRAME_LEN, SYNC_BYTE,
};
use crate::transport::Transport;
use log::{debug, info, trace};
use std::thread;
use std::time::Duration;

/// Session state of the host engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    /// No established session; the next send will handshake first.
    Sync,
    /// Handshake done, a command may be sent.
    ReadyToSendCommand,
    /// A DATA_PACKET is being transmitted.
    SendingData,
    /// A frame was sent and its ACK is outstanding.
    WaitingForAck,
}

/// Tunable timing and retry parameters.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Deadline for the ACK following a command or data packet.
    pub ack_timeout: Duration,
    /// Deadline for RESPONSE and DATA_PACKET frames from the target.
    pub response_timeout: Duration,
    /// Deadline for the erase-completion ACK; page erases are slow.
    pub erase_timeout: Duration,
    /// Per-attempt wait for the sync byte echo.
    pub sync_reply_timeout: Duration,
    /// Retry budget per data packet beyond the first attempt.
    pub max_retries: u32,
    /// Pause after the last write ACK so the target can finish its flush.
    pub write_settle_delay: Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            ack_timeout: Duration::from_millis(1000),
            response_timeout: Duration::from_millis(1000),
            erase_timeout: Duration::from_secs(10),
            sync_reply_timeout: Duration::from_millis(500),
            max_retries: 3,
            write_settle_delay: Duration::from_millis(10),
        }
    }
}

/// Host-side engine for one bootloader session.
///
/// Owns its transport exclusively; callers must serialize operations on a
/// single instance. Independent engines on distinct transports may run in
/// parallel.
pub struct BootloaderHost<T: Transport> {
    transport: T,
    config: HostConfig,
    state: HostState,
    last_nack: u8,
}

impl<T: Transport> BootloaderHost<T> {
    /// Create an engine with default timing parameters.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, HostConfig::default())
    }

    /// Create an engine with custom timing parameters.
    pub fn with_config(transport: T, config: HostConfig) -> Self {
        Self {
            transport,
            config,
            state: HostState::Sync,
            last_nack: frame::NACK_NONE,
        }
    }

    /// Current session state.
    pub fn state(&self) -> HostState {
        self.state
    }

    /// Reason field of the most recently received ACK.
    ///
    /// [`frame::NACK_NONE`] when the last exchange succeeded.
    pub fn last_nack_field(&self) -> u8 {
        self.last_nack
    }

    /// Consume the engine and return its transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Establish the session handshake without sending a command.
    pub fn connect(&mut self) -> Result<()> {
        self.run(Self::synchronize)
    }

    /// Query the bootloader version byte.
    pub fn version(&mut self) -> Result<u8> {
        info!("querying bootloader version");
        self.run(|h| {
            h.send_command(&Command::Version)?;
            h.expect_ack(h.config.ack_timeout)?;

            let raw = h.read_frame(h.config.response_timeout)?;
            let response = Response::decode(&raw)?;
            // Bytes 1..8 of the payload are reserved
            Ok(response.data[0])
        })
    }

    /// Put the target into command mode.
    pub fn enter_cmd_mode(&mut self) -> Result<()> {
        info!("entering command mode");
        self.run(|h| {
            h.send_command(&Command::EnterCmdMode {
                key: ENTER_CMD_MODE_KEY,
            })?;
            h.expect_ack(h.config.ack_timeout)?;
            Ok(())
        })
    }

    /// Leave the bootloader and start the application.
    pub fn jump_to_app(&mut self) -> Result<()> {
        info!("jumping to application");
        self.run(|h| {
            h.send_command(&Command::JumpToApp { key: JUMP_APP_KEY })?;
            h.expect_ack(h.config.ack_timeout)?;
            Ok(())
        })
    }

    /// Branch the bootloader to `address`.
    pub fn goto_addr(&mut self, address: u32) -> Result<()> {
        info!("branching target to {address:#010x}");
        self.run(|h| {
            h.send_command(&Command::GotoAddr { address })?;
            h.expect_ack(h.config.ack_timeout)?;
            Ok(())
        })
    }

    /// Erase `page_count` flash pages starting at `page_number`.
    ///
    /// Two ACKs are expected: one for command receipt, one once the erase
    /// finished. The second gets the longer [`HostConfig::erase_timeout`].
    pub fn flash_erase(&mut self, page_number: u32, page_count: u32) -> Result<()> {
        info!("erasing {page_count} page(s) starting at page {page_number}");
        self.run(|h| {
            h.send_command(&Command::FlashErase {
                page_number,
                page_count,
            })?;
            h.expect_ack(h.config.ack_timeout)?;

            h.state = HostState::WaitingForAck;
            h.expect_ack(h.config.erase_timeout)?;
            debug!("erase complete");
            Ok(())
        })
    }

    /// Read `length` bytes starting at `start_addr` into `out`.
    ///
    /// The target streams DATA_PACKET frames; each one is CRC-checked and
    /// ACKed. A CRC failure is NACKed once and aborts the operation.
    pub fn mem_read(&mut self, start_addr: u32, length: u32, out: &mut [u8]) -> Result<()> {
        if (out.len() as u64) < u64::from(length) {
            return Err(Error::InvalidInput(format!(
                "output buffer of {} bytes cannot hold {length} bytes",
                out.len()
            )));
        }

        info!("reading {length} bytes from {start_addr:#010x}");
        self.run(|h| {
            h.send_command(&Command::MemRead { start_addr, length })?;
            h.expect_ack(h.config.ack_timeout)?;

            let mut offset = 0usize;
            loop {
                let raw = h.read_frame(h.config.response_timeout)?;
                let packet = match DataPacket::decode(&raw) {
                    Ok(packet) => packet,
                    Err(e @ Error::BadCrc { .. }) => {
                        debug!("data packet failed CRC check, NACKing");
                        h.send_ack(Ack::new(false, frame::NACK_INVALID_CRC))?;
                        return Err(e);
                    },
                    Err(e) => return Err(e),
                };

                let end = offset + packet.data.len();
                if end > out.len() {
                    return Err(Error::FieldOutOfRange(format!(
                        "target streamed {end} bytes into a {}-byte buffer",
                        out.len()
                    )));
                }
                out[offset..end].copy_from_slice(packet.data);
                offset = end;

                h.send_ack(Ack::new(true, frame::NACK_NONE))?;
                trace!("acknowledged {} byte packet, {offset} total", packet.data.len());

                if packet.end_flag {
                    break;
                }
            }

            debug!("read stream complete, {offset} bytes");
            Ok(())
        })
    }

    /// Write `data` to target memory starting at `start_address`.
    pub fn mem_write(&mut self, start_address: u32, data: &[u8]) -> Result<()> {
        self.mem_write_with_progress(start_address, data, |_, _| {})
    }

    /// Write `data` to target memory, reporting `(bytes_sent, total)` after
    /// every acknowledged packet.
    ///
    /// The buffer is streamed in [`DATA_BLOCK_SIZE`] blocks; a NACKed or
    /// timed-out packet is replayed up to [`HostConfig::max_retries`] times
    /// before the operation fails.
    pub fn mem_write_with_progress<F>(
        &mut self,
        start_address: u32,
        data: &[u8],
        mut progress: F,
    ) -> Result<()>
    where
        F: FnMut(usize, usize),
    {
        let blocks = data.len() / DATA_BLOCK_SIZE;
        let remainder = data.len() % DATA_BLOCK_SIZE;
        info!(
            "writing {} bytes to {start_address:#010x} ({blocks} full block(s), {remainder} remainder)",
            data.len()
        );

        self.run(|h| {
            h.send_command(&Command::MemWrite { start_address })?;
            h.expect_ack(h.config.ack_timeout)?;

            for i in 0..blocks {
                let chunk = &data[i * DATA_BLOCK_SIZE..(i + 1) * DATA_BLOCK_SIZE];
                let is_last = (i + 1) * DATA_BLOCK_SIZE == data.len();
                // next_len carries the full frame length of the upcoming
                // packet, not its payload length
                let next_data = if i + 1 == blocks {
                    remainder
                } else {
                    DATA_BLOCK_SIZE
                };
                let next_len = if is_last {
                    0
                } else {
                    (DATA_PACKET_OVERHEAD + next_data) as u32
                };

                h.send_data_packet(chunk, next_len, is_last)?;
                progress((i + 1) * DATA_BLOCK_SIZE, data.len());
            }

            if remainder != 0 {
                h.send_data_packet(&data[blocks * DATA_BLOCK_SIZE..], 0, true)?;
                progress(data.len(), data.len());
            }

            if !data.is_empty() {
                // Let the target finish flushing the final block
                thread::sleep(h.config.write_settle_delay);
            }

            debug!("write stream complete");
            Ok(())
        })
    }

    /// Run an operation body; any failure drops the session to `Sync` so
    /// the next operation re-handshakes.
    fn run<R>(&mut self, op: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        let result = op(self);
        if result.is_err() {
            self.state = HostState::Sync;
        }
        result
    }

    /// Encode and send a command frame, handshaking first if the session
    /// is not ready.
    fn send_command(&mut self, command: &Command<'_>) -> Result<()> {
        if self.state != HostState::ReadyToSendCommand {
            self.synchronize()?;
        }
        let bytes = command.encode()?;
        debug!("sending {:?} ({} bytes)", command.id(), bytes.len());
        self.transport.write_all(&bytes)?;
        self.state = HostState::WaitingForAck;
        Ok(())
    }

    /// Drive the sync handshake: emit the marker, then drain incoming bytes
    /// until the target echoes it back.
    ///
    /// The loop has no iteration cap; termination relies on the
    /// cancellation signal threaded through the transport.
    fn synchronize(&mut self) -> Result<()> {
        debug!("synchronizing with target on {}", self.transport.name());
        let mut byte = [0u8; 1];
        loop {
            self.transport.write_all(&[SYNC_BYTE])?;
            match self.transport.read_exact(&mut byte, self.config.sync_reply_timeout) {
                Ok(()) => loop {
                    if byte[0] == SYNC_BYTE {
                        debug!("target in sync");
                        self.state = HostState::ReadyToSendCommand;
                        return Ok(());
                    }
                    trace!("discarding {:#04x} while waiting for sync echo", byte[0]);
                    match self
                        .transport
                        .read_exact(&mut byte, self.config.sync_reply_timeout)
                    {
                        Ok(()) => {},
                        Err(Error::Timeout(_)) => break,
                        Err(e) => return Err(e),
                    }
                },
                Err(Error::Timeout(_)) => trace!("no sync reply, resending"),
                Err(e) => return Err(e),
            }
        }
    }

    /// Read the 3-byte ACK token and record its reason field.
    fn read_ack(&mut self, deadline: Duration) -> Result<Ack> {
        let mut raw = [0u8; frame::ACK_LEN];
        self.transport.read_exact(&mut raw, deadline)?;
        let ack = Ack::parse(&raw)?;
        trace!("received {ack:?}");
        self.last_nack = ack.field;
        Ok(ack)
    }

    /// Await a positive ACK; a NACK surfaces its reason field.
    fn expect_ack(&mut self, deadline: Duration) -> Result<u8> {
        let ack = self.read_ack(deadline)?;
        if !ack.ack {
            return Err(Error::Nack(ack.field));
        }
        self.state = HostState::ReadyToSendCommand;
        Ok(ack.field)
    }

    /// Send the raw ACK token.
    fn send_ack(&mut self, ack: Ack) -> Result<()> {
        self.transport.write_all(&ack.to_bytes())
    }

    /// Send one DATA_PACKET, replaying it on NACK or ACK timeout until the
    /// retry budget runs out.
    fn send_data_packet(&mut self, chunk: &[u8], next_len: u32, end_flag: bool) -> Result<()> {
        let packet = Command::DataPacket {
            data: chunk,
            next_len,
            end_flag,
        }
        .encode()?;

        let mut attempts = 0u32;
        loop {
            attempts += 1;
            self.state = HostState::SendingData;
            trace!("sending {} byte data packet (attempt {attempts})", packet.len());
            self.transport.write_all(&packet)?;
            self.state = HostState::WaitingForAck;

            match self.read_ack(self.config.ack_timeout) {
                Ok(ack) if ack.ack => {
                    self.state = HostState::ReadyToSendCommand;
                    return Ok(());
                },
                Ok(ack) => {
                    debug!("data packet NACKed with field {:#04x}", ack.field);
                },
                Err(Error::Timeout(_)) => {
                    debug!("timed out waiting for data packet ACK");
                },
                Err(e) => return Err(e),
            }

            if attempts > self.config.max_retries {
                return Err(Error::TooManyRetries { attempts });
            }
        }
    }

    /// Read one headered frame: the 9-byte header first, then the rest as
    /// declared by `payload_size`.
    fn read_frame(&mut self, deadline: Duration) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; MAX_FRAME_LEN];
        self.transport.read_exact(&mut buf[..HEADER_LEN], deadline)?;

        let header = Header::parse(&buf[..HEADER_LEN])?;
        let total = header.payload_size as usize;
        if !(HEADER_LEN..=MAX_FRAME_LEN).contains(&total) {
            return Err(Error::FieldOutOfRange(format!(
                "frame length {total} outside {HEADER_LEN}..={MAX_FRAME_LEN}"
            )));
        }

        self.transport.read_exact(&mut buf[HEADER_LEN..total], deadline)?;
        buf.truncate(total);
        Ok(buf)
    }
}
