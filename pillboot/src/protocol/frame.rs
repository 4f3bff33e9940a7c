//! Bootloader command frames and their on-wire layout.
//!
//! Every headered frame shares the same 9-byte prefix, followed by a
//! command-specific trailer:
//!
//! ```text
//! +--------------+--------+-------+-----------------+
//! | payload_size | cmd_id | CRC32 |     trailer     |
//! +--------------+--------+-------+-----------------+
//! |   4 bytes    | 1 byte | 4 B   |    variable     |
//! +--------------+--------+-------+-----------------+
//! ```
//!
//! `payload_size` counts the whole serialized frame, itself included. The
//! CRC32 covers the whole frame with the 4 bytes of the CRC field skipped
//! from accumulation. All multi-byte integers are little-endian, packed.
//!
//! The ACK token is the one exception: a raw 3-byte `[cmd_id, ack, field]`
//! sequence with no header and no CRC.

use crate::error::{Error, Result};
use crate::protocol::crc::crc32_excluding;
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

/// Marker byte exchanged during the synchronization handshake.
pub const SYNC_BYTE: u8 = 0xA5;

/// Magic key carried by ENTER_CMD_MODE.
pub const ENTER_CMD_MODE_KEY: u32 = 0x09B21FFC;

/// Magic key carried by JUMP_TO_APP.
pub const JUMP_APP_KEY: u32 = 0x4032AFE5;

/// Maximum data bytes carried by a single DATA_PACKET.
pub const DATA_BLOCK_SIZE: usize = 256;

/// Serialized length of the command header.
pub const HEADER_LEN: usize = 9;

/// Byte offset of the CRC32 field inside the header.
pub const CRC_OFFSET: usize = 5;

/// Width of the CRC32 field.
pub const CRC_LEN: usize = 4;

/// DATA_PACKET metadata after the header: `data_len`, `next_len`, `end_flag`.
pub const DATA_PACKET_META_LEN: usize = 9;

/// Serialized bytes of a DATA_PACKET before its data block.
pub const DATA_PACKET_OVERHEAD: usize = HEADER_LEN + DATA_PACKET_META_LEN;

/// Largest frame the protocol can produce (a full DATA_PACKET).
pub const MAX_FRAME_LEN: usize = DATA_PACKET_OVERHEAD + DATA_BLOCK_SIZE;

/// Payload bytes of a RESPONSE frame.
pub const RESPONSE_PAYLOAD_LEN: usize = 8;

/// Serialized length of a RESPONSE frame.
pub const RESPONSE_LEN: usize = HEADER_LEN + RESPONSE_PAYLOAD_LEN;

/// Serialized length of the raw ACK token.
pub const ACK_LEN: usize = 3;

/// ACK reason field meaning "no reason / success".
pub const NACK_NONE: u8 = 0xFF;

/// ACK reason field the host sends back on a CRC-invalid data packet.
pub const NACK_INVALID_CRC: u8 = 0x01;

/// Command IDs as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandId {
    /// Branch the bootloader to an address (0x01).
    GotoAddr = 0x01,
    /// Start a memory write stream (0x02).
    MemWrite = 0x02,
    /// Request a memory read stream (0x03).
    MemRead = 0x03,
    /// Query the bootloader version (0x04).
    Version = 0x04,
    /// Erase flash pages (0x05).
    FlashErase = 0x05,
    /// The 3-byte acknowledgement token (0x06).
    Ack = 0x06,
    /// Enter command mode (0x07).
    EnterCmdMode = 0x07,
    /// Leave the bootloader and start the application (0x08).
    JumpToApp = 0x08,
    /// Streaming data carrier (0x09).
    DataPacket = 0x09,
    /// Target response frame (0xFF).
    Response = 0xFF,
}

impl CommandId {
    /// Map a wire byte back to a command ID.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::GotoAddr),
            0x02 => Some(Self::MemWrite),
            0x03 => Some(Self::MemRead),
            0x04 => Some(Self::Version),
            0x05 => Some(Self::FlashErase),
            0x06 => Some(Self::Ack),
            0x07 => Some(Self::EnterCmdMode),
            0x08 => Some(Self::JumpToApp),
            0x09 => Some(Self::DataPacket),
            0xFF => Some(Self::Response),
            _ => None,
        }
    }
}

/// Parsed command header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Full serialized frame length in bytes.
    pub payload_size: u32,
    /// Raw command ID byte.
    pub cmd_id: u8,
    /// CRC32 carried by the frame.
    pub crc32: u32,
}

impl Header {
    /// Parse the leading header from a raw buffer.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_LEN {
            return Err(Error::ShortFrame {
                expected: HEADER_LEN,
                actual: buf.len(),
            });
        }
        Ok(Self {
            payload_size: LittleEndian::read_u32(&buf[0..4]),
            cmd_id: buf[4],
            crc32: LittleEndian::read_u32(&buf[CRC_OFFSET..CRC_OFFSET + CRC_LEN]),
        })
    }
}

/// Verify a frame's CRC32 against its header field.
///
/// The CRC is computed over the whole frame with the 4 CRC bytes skipped.
pub fn verify_crc(frame: &[u8]) -> Result<()> {
    let header = Header::parse(frame)?;
    let computed = crc32_excluding(frame, CRC_OFFSET, CRC_LEN);
    if computed != header.crc32 {
        return Err(Error::BadCrc {
            expected: computed,
            actual: header.crc32,
        });
    }
    Ok(())
}

/// Common validation for headered frames: length, command ID, CRC.
///
/// Returns the trailer after the header on success.
fn frame_body(buf: &[u8], expected: CommandId) -> Result<&[u8]> {
    let header = Header::parse(buf)?;
    if header.cmd_id != expected as u8 {
        return Err(Error::UnexpectedFrame {
            expected: expected as u8,
            actual: header.cmd_id,
        });
    }
    if header.payload_size as usize != buf.len() {
        return Err(Error::ShortFrame {
            expected: header.payload_size as usize,
            actual: buf.len(),
        });
    }
    verify_crc(buf)?;
    Ok(&buf[HEADER_LEN..])
}

fn expect_trailer_len(body: &[u8], want: usize) -> Result<()> {
    if body.len() != want {
        return Err(Error::ShortFrame {
            expected: HEADER_LEN + want,
            actual: HEADER_LEN + body.len(),
        });
    }
    Ok(())
}

/// A bootloader command frame, one variant per wire layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// Version query; header only.
    Version,
    /// Branch the bootloader to `address`.
    GotoAddr {
        /// Target address.
        address: u32,
    },
    /// Announce a write stream destined for `start_address`.
    MemWrite {
        /// Destination base address.
        start_address: u32,
    },
    /// Request `length` bytes starting at `start_addr`.
    MemRead {
        /// Source base address.
        start_addr: u32,
        /// Number of bytes to read.
        length: u32,
    },
    /// Erase `page_count` flash pages starting at `page_number`.
    FlashErase {
        /// First page to erase.
        page_number: u32,
        /// Number of pages.
        page_count: u32,
    },
    /// Enter command mode; gated by a magic key.
    EnterCmdMode {
        /// Must be [`ENTER_CMD_MODE_KEY`].
        key: u32,
    },
    /// Start the application; gated by a magic key.
    JumpToApp {
        /// Must be [`JUMP_APP_KEY`].
        key: u32,
    },
    /// Streaming data carrier, up to [`DATA_BLOCK_SIZE`] bytes.
    DataPacket {
        /// Data block contents.
        data: &'a [u8],
        /// Full frame length of the next packet, or 0 when this is the last.
        next_len: u32,
        /// Whether this packet ends the stream.
        end_flag: bool,
    },
    /// Target response payload.
    Response {
        /// Fixed 8-byte payload; semantics are command-specific.
        data: [u8; RESPONSE_PAYLOAD_LEN],
    },
}

impl Command<'_> {
    /// The command ID this variant serializes with.
    pub fn id(&self) -> CommandId {
        match self {
            Command::Version => CommandId::Version,
            Command::GotoAddr { .. } => CommandId::GotoAddr,
            Command::MemWrite { .. } => CommandId::MemWrite,
            Command::MemRead { .. } => CommandId::MemRead,
            Command::FlashErase { .. } => CommandId::FlashErase,
            Command::EnterCmdMode { .. } => CommandId::EnterCmdMode,
            Command::JumpToApp { .. } => CommandId::JumpToApp,
            Command::DataPacket { .. } => CommandId::DataPacket,
            Command::Response { .. } => CommandId::Response,
        }
    }

    /// Serialized length of this frame.
    pub fn wire_len(&self) -> usize {
        HEADER_LEN
            + match self {
                Command::Version => 0,
                Command::GotoAddr { .. }
                | Command::MemWrite { .. }
                | Command::EnterCmdMode { .. }
                | Command::JumpToApp { .. } => 4,
                Command::MemRead { .. } | Command::FlashErase { .. } => 8,
                Command::DataPacket { data, .. } => DATA_PACKET_META_LEN + data.len(),
                Command::Response { .. } => RESPONSE_PAYLOAD_LEN,
            }
    }

    /// Serialize the frame: fields at their exact offsets, `payload_size`
    /// stamped with the transmitted length, CRC computed with its own field
    /// excluded.
    #[allow(clippy::cast_possible_truncation)] // Frame lengths are < 4 GB
    #[allow(clippy::unwrap_used)] // Writing to Vec<u8> cannot fail
    pub fn encode(&self) -> Result<Vec<u8>> {
        if let Command::DataPacket { data, .. } = self {
            if data.len() > DATA_BLOCK_SIZE {
                return Err(Error::InvalidInput(format!(
                    "data block of {} bytes exceeds {DATA_BLOCK_SIZE}",
                    data.len()
                )));
            }
        }

        let len = self.wire_len();
        let mut buf = Vec::with_capacity(len);

        buf.write_u32::<LittleEndian>(len as u32).unwrap();
        buf.push(self.id() as u8);
        // CRC placeholder, patched once the trailer is in place
        buf.write_u32::<LittleEndian>(0).unwrap();

        match *self {
            Command::Version => {},
            Command::GotoAddr { address } => {
                buf.write_u32::<LittleEndian>(address).unwrap();
            },
            Command::MemWrite { start_address } => {
                buf.write_u32::<LittleEndian>(start_address).unwrap();
            },
            Command::MemRead { start_addr, length } => {
                buf.write_u32::<LittleEndian>(start_addr).unwrap();
                buf.write_u32::<LittleEndian>(length).unwrap();
            },
            Command::FlashErase {
                page_number,
                page_count,
            } => {
                buf.write_u32::<LittleEndian>(page_number).unwrap();
                buf.write_u32::<LittleEndian>(page_count).unwrap();
            },
            Command::EnterCmdMode { key } | Command::JumpToApp { key } => {
                buf.write_u32::<LittleEndian>(key).unwrap();
            },
            Command::DataPacket {
                data,
                next_len,
                end_flag,
            } => {
                buf.write_u32::<LittleEndian>(data.len() as u32).unwrap();
                buf.write_u32::<LittleEndian>(next_len).unwrap();
                buf.push(u8::from(end_flag));
                buf.extend_from_slice(data);
            },
            Command::Response { data } => {
                buf.extend_from_slice(&data);
            },
        }

        let crc = crc32_excluding(&buf, CRC_OFFSET, CRC_LEN);
        LittleEndian::write_u32(&mut buf[CRC_OFFSET..CRC_OFFSET + CRC_LEN], crc);

        Ok(buf)
    }

    /// Decode a raw frame as the expected variant.
    ///
    /// Validates total length against `payload_size`, the command ID, the
    /// CRC, and every variant-specific field range before yielding a typed
    /// view. [`CommandId::Ack`] is rejected here; the ACK token is not a
    /// headered frame and goes through [`Ack::parse`].
    pub fn decode(buf: &[u8], expected: CommandId) -> Result<Command<'_>> {
        if expected == CommandId::Ack {
            return Err(Error::FieldOutOfRange(
                "ACK is a raw token, not a headered frame".into(),
            ));
        }

        let body = frame_body(buf, expected)?;
        let cmd = match expected {
            CommandId::Version => {
                expect_trailer_len(body, 0)?;
                Command::Version
            },
            CommandId::GotoAddr => {
                expect_trailer_len(body, 4)?;
                Command::GotoAddr {
                    address: LittleEndian::read_u32(body),
                }
            },
            CommandId::MemWrite => {
                expect_trailer_len(body, 4)?;
                Command::MemWrite {
                    start_address: LittleEndian::read_u32(body),
                }
            },
            CommandId::MemRead => {
                expect_trailer_len(body, 8)?;
                Command::MemRead {
                    start_addr: LittleEndian::read_u32(&body[0..4]),
                    length: LittleEndian::read_u32(&body[4..8]),
                }
            },
            CommandId::FlashErase => {
                expect_trailer_len(body, 8)?;
                Command::FlashErase {
                    page_number: LittleEndian::read_u32(&body[0..4]),
                    page_count: LittleEndian::read_u32(&body[4..8]),
                }
            },
            CommandId::EnterCmdMode => {
                expect_trailer_len(body, 4)?;
                Command::EnterCmdMode {
                    key: LittleEndian::read_u32(body),
                }
            },
            CommandId::JumpToApp => {
                expect_trailer_len(body, 4)?;
                Command::JumpToApp {
                    key: LittleEndian::read_u32(body),
                }
            },
            CommandId::DataPacket => {
                let packet = DataPacket::decode(buf)?;
                Command::DataPacket {
                    data: packet.data,
                    next_len: packet.next_len,
                    end_flag: packet.end_flag,
                }
            },
            CommandId::Response => {
                let response = Response::decode(buf)?;
                Command::Response {
                    data: response.data,
                }
            },
            CommandId::Ack => unreachable!("rejected above"),
        };
        Ok(cmd)
    }
}

/// Decoded DATA_PACKET view borrowing the receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataPacket<'a> {
    /// The `data_len` bytes actually carried.
    pub data: &'a [u8],
    /// Full frame length of the next packet, 0 if this one is last.
    pub next_len: u32,
    /// Whether this packet ends the stream.
    pub end_flag: bool,
}

impl<'a> DataPacket<'a> {
    /// Decode and validate a DATA_PACKET frame.
    pub fn decode(buf: &'a [u8]) -> Result<Self> {
        let body = frame_body(buf, CommandId::DataPacket)?;
        if body.len() < DATA_PACKET_META_LEN {
            return Err(Error::ShortFrame {
                expected: DATA_PACKET_OVERHEAD,
                actual: buf.len(),
            });
        }

        let data_len = LittleEndian::read_u32(&body[0..4]) as usize;
        if data_len > DATA_BLOCK_SIZE {
            return Err(Error::FieldOutOfRange(format!(
                "data_len {data_len} exceeds the {DATA_BLOCK_SIZE}-byte block limit"
            )));
        }
        if body.len() != DATA_PACKET_META_LEN + data_len {
            return Err(Error::FieldOutOfRange(format!(
                "data_len {data_len} disagrees with a {}-byte frame",
                buf.len()
            )));
        }

        let next_len = LittleEndian::read_u32(&body[4..8]);
        let end_flag = match body[8] {
            0 => false,
            1 => true,
            other => {
                return Err(Error::FieldOutOfRange(format!(
                    "end_flag must be 0 or 1, got {other:#04x}"
                )));
            },
        };

        Ok(Self {
            data: &body[DATA_PACKET_META_LEN..],
            next_len,
            end_flag,
        })
    }
}

/// Decoded RESPONSE frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    /// Fixed 8-byte payload.
    pub data: [u8; RESPONSE_PAYLOAD_LEN],
}

impl Response {
    /// Decode and validate a RESPONSE frame.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let body = frame_body(buf, CommandId::Response)?;
        expect_trailer_len(body, RESPONSE_PAYLOAD_LEN)?;
        let mut data = [0u8; RESPONSE_PAYLOAD_LEN];
        data.copy_from_slice(body);
        Ok(Self { data })
    }
}

/// The raw 3-byte acknowledgement token.
///
/// No header, no CRC: its fixed length and fixed leading byte are the whole
/// framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    /// True when the target accepted the exchange.
    pub ack: bool,
    /// Reason field; [`NACK_NONE`] on success.
    pub field: u8,
}

impl Ack {
    /// Build an ACK token.
    pub fn new(ack: bool, field: u8) -> Self {
        Self { ack, field }
    }

    /// Serialize to the 3-byte wire form.
    pub fn to_bytes(self) -> [u8; ACK_LEN] {
        [CommandId::Ack as u8, u8::from(self.ack), self.field]
    }

    /// Parse the 3-byte wire form.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < ACK_LEN {
            return Err(Error::ShortFrame {
                expected: ACK_LEN,
                actual: buf.len(),
            });
        }
        if buf[0] != CommandId::Ack as u8 {
            return Err(Error::UnexpectedFrame {
                expected: CommandId::Ack as u8,
                actual: buf[0],
            });
        }
        Ok(Self {
            ack: buf[1] == 1,
            field: buf[2],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::crc::crc32_excluding;

    #[test]
    fn test_version_frame_layout() {
        let frame = Command::Version.encode().unwrap();
        assert_eq!(frame.len(), HEADER_LEN);
        // payload_size = 9, little-endian
        assert_eq!(&frame[0..4], &[0x09, 0x00, 0x00, 0x00]);
        assert_eq!(frame[4], 0x04);
        assert!(verify_crc(&frame).is_ok());
    }

    #[test]
    fn test_enter_cmd_mode_frame_layout() {
        let frame = Command::EnterCmdMode {
            key: ENTER_CMD_MODE_KEY,
        }
        .encode()
        .unwrap();
        assert_eq!(frame.len(), 13);
        assert_eq!(&frame[0..4], &[0x0D, 0x00, 0x00, 0x00]);
        assert_eq!(frame[4], 0x07);
        // key = 0x09B21FFC, little-endian
        assert_eq!(&frame[9..13], &[0xFC, 0x1F, 0xB2, 0x09]);
    }

    #[test]
    fn test_mem_read_frame_layout() {
        let frame = Command::MemRead {
            start_addr: 0x08000000,
            length: 400,
        }
        .encode()
        .unwrap();
        assert_eq!(frame.len(), 17);
        assert_eq!(frame[4], 0x03);
        assert_eq!(&frame[9..13], &[0x00, 0x00, 0x00, 0x08]);
        assert_eq!(&frame[13..17], &[0x90, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_flash_erase_frame_layout() {
        let frame = Command::FlashErase {
            page_number: 62,
            page_count: 2,
        }
        .encode()
        .unwrap();
        assert_eq!(frame.len(), 17);
        assert_eq!(frame[4], 0x05);
        assert_eq!(&frame[9..13], &[62, 0, 0, 0]);
        assert_eq!(&frame[13..17], &[2, 0, 0, 0]);
    }

    #[test]
    fn test_data_packet_payload_size_tracks_data_len() {
        let data = [0xABu8; 44];
        let frame = Command::DataPacket {
            data: &data,
            next_len: 0,
            end_flag: true,
        }
        .encode()
        .unwrap();
        assert_eq!(frame.len(), DATA_PACKET_OVERHEAD + 44);
        assert_eq!(u32::from_le_bytes(frame[0..4].try_into().unwrap()), 62);
        // data_len field
        assert_eq!(u32::from_le_bytes(frame[9..13].try_into().unwrap()), 44);
        // end_flag
        assert_eq!(frame[17], 1);
    }

    #[test]
    fn test_full_data_packet_is_max_frame() {
        let data = [0x5Au8; DATA_BLOCK_SIZE];
        let frame = Command::DataPacket {
            data: &data,
            next_len: 0,
            end_flag: true,
        }
        .encode()
        .unwrap();
        assert_eq!(frame.len(), MAX_FRAME_LEN);
        assert_eq!(frame.len(), 274);
    }

    #[test]
    fn test_oversized_data_block_rejected() {
        let data = [0u8; DATA_BLOCK_SIZE + 1];
        let result = Command::DataPacket {
            data: &data,
            next_len: 0,
            end_flag: true,
        }
        .encode();
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_crc_excludes_its_own_field() {
        let frame = Command::GotoAddr {
            address: 0x08004000,
        }
        .encode()
        .unwrap();
        let header = Header::parse(&frame).unwrap();
        assert_eq!(
            header.crc32,
            crc32_excluding(&frame, CRC_OFFSET, CRC_LEN)
        );
    }

    #[test]
    fn test_roundtrip_all_variants() {
        let block = [0x11u8; 100];
        let commands = [
            Command::Version,
            Command::GotoAddr {
                address: 0x08001234,
            },
            Command::MemWrite {
                start_address: 0x2000_0000,
            },
            Command::MemRead {
                start_addr: 0x0800_0000,
                length: 1024,
            },
            Command::FlashErase {
                page_number: 10,
                page_count: 4,
            },
            Command::EnterCmdMode {
                key: ENTER_CMD_MODE_KEY,
            },
            Command::JumpToApp { key: JUMP_APP_KEY },
            Command::DataPacket {
                data: &block,
                next_len: 118,
                end_flag: false,
            },
            Command::Response {
                data: [1, 2, 3, 4, 5, 6, 7, 8],
            },
        ];

        for cmd in &commands {
            let frame = cmd.encode().unwrap();
            let decoded = Command::decode(&frame, cmd.id()).unwrap();
            assert_eq!(&decoded, cmd);
        }
    }

    #[test]
    fn test_decode_short_frame() {
        let result = Command::decode(&[0x09, 0x00], CommandId::Version);
        assert!(matches!(result, Err(Error::ShortFrame { .. })));
    }

    #[test]
    fn test_decode_wrong_cmd_id() {
        let frame = Command::Version.encode().unwrap();
        let result = Command::decode(&frame, CommandId::GotoAddr);
        assert!(matches!(
            result,
            Err(Error::UnexpectedFrame {
                expected: 0x01,
                actual: 0x04
            })
        ));
    }

    #[test]
    fn test_decode_corrupted_crc() {
        let mut frame = Command::JumpToApp { key: JUMP_APP_KEY }.encode().unwrap();
        frame[CRC_OFFSET] ^= 0xFF;
        let result = Command::decode(&frame, CommandId::JumpToApp);
        assert!(matches!(result, Err(Error::BadCrc { .. })));
    }

    #[test]
    fn test_decode_payload_size_mismatch() {
        let mut frame = Command::Version.encode().unwrap();
        frame.push(0x00);
        let result = Command::decode(&frame, CommandId::Version);
        assert!(matches!(result, Err(Error::ShortFrame { .. })));
    }

    #[test]
    fn test_data_packet_bad_end_flag() {
        let data = [0u8; 4];
        let mut frame = Command::DataPacket {
            data: &data,
            next_len: 0,
            end_flag: false,
        }
        .encode()
        .unwrap();
        frame[17] = 2;
        // Re-stamp the CRC so only the flag is wrong
        let crc = crc32_excluding(&frame, CRC_OFFSET, CRC_LEN);
        frame[CRC_OFFSET..CRC_OFFSET + CRC_LEN].copy_from_slice(&crc.to_le_bytes());
        let result = DataPacket::decode(&frame);
        assert!(matches!(result, Err(Error::FieldOutOfRange(_))));
    }

    #[test]
    fn test_ack_roundtrip() {
        for (ack, field) in [(true, NACK_NONE), (false, 0x02), (true, 0x00)] {
            let token = Ack::new(ack, field);
            let parsed = Ack::parse(&token.to_bytes()).unwrap();
            assert_eq!(parsed, token);
        }
    }

    #[test]
    fn test_ack_wire_form() {
        assert_eq!(Ack::new(true, NACK_NONE).to_bytes(), [0x06, 0x01, 0xFF]);
        assert_eq!(
            Ack::new(false, NACK_INVALID_CRC).to_bytes(),
            [0x06, 0x00, 0x01]
        );
    }

    #[test]
    fn test_ack_rejects_wrong_leading_byte() {
        let result = Ack::parse(&[0x07, 0x01, 0xFF]);
        assert!(matches!(
            result,
            Err(Error::UnexpectedFrame {
                expected: 0x06,
                actual: 0x07
            })
        ));
    }

    #[test]
    fn test_sync_byte_is_no_command_id() {
        assert!(CommandId::from_u8(SYNC_BYTE).is_none());
    }
}
