//! Source RCON packet framing.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! i32 length | i32 request id | i32 type | body | 0x00 | 0x00
//! ```
//!
//! `length` counts everything after itself.

use std::io::{self, Read, Write};

pub const PACKET_LOGIN: i32 = 3;
pub const PACKET_COMMAND: i32 = 2;
pub const PACKET_AUTH_RESPONSE: i32 = 2;
pub const PACKET_RESPONSE_VALUE: i32 = 0;

/// Largest command body the server accepts.
pub const MAX_COMMAND_BYTES: usize = 1446;

/// Largest response body the server sends in one frame.
pub const MAX_RESPONSE_BYTES: usize = 4096;

/// Request id + type.
const HEADER_LEN: usize = 8;
/// Body terminator + empty string terminator.
const PADDING_LEN: usize = 2;
const MIN_FRAME_LEN: usize = HEADER_LEN + PADDING_LEN;
const MAX_FRAME_LEN: usize = MIN_FRAME_LEN + MAX_RESPONSE_BYTES;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub request_id: i32,
    pub kind: i32,
    pub body: Vec<u8>,
}

impl Packet {
    pub fn new(request_id: i32, kind: i32, body: impl Into<Vec<u8>>) -> Self {
        Self {
            request_id,
            kind,
            body: body.into(),
        }
    }

    /// Serialize including the leading length field.
    pub fn encode(&self) -> Vec<u8> {
        let frame_len = MIN_FRAME_LEN + self.body.len();
        let mut buf = Vec::with_capacity(4 + frame_len);
        buf.extend_from_slice(&(frame_len as i32).to_le_bytes());
        buf.extend_from_slice(&self.request_id.to_le_bytes());
        buf.extend_from_slice(&self.kind.to_le_bytes());
        buf.extend_from_slice(&self.body);
        buf.extend_from_slice(&[0, 0]);
        buf
    }

    /// Body decoded as UTF-8, invalid sequences replaced.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub fn write_packet<W: Write>(writer: &mut W, packet: &Packet) -> io::Result<()> {
    writer.write_all(&packet.encode())?;
    writer.flush()
}

/// Read exactly one frame. Malformed frames surface as `InvalidData`.
pub fn read_packet<R: Read>(reader: &mut R) -> io::Result<Packet> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let frame_len = i32::from_le_bytes(len_buf);

    let frame_len = usize::try_from(frame_len)
        .ok()
        .filter(|len| (MIN_FRAME_LEN..=MAX_FRAME_LEN).contains(len))
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("frame length {frame_len} out of range"),
            )
        })?;

    let mut frame = vec![0u8; frame_len];
    reader.read_exact(&mut frame)?;

    let request_id = i32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]);
    let kind = i32::from_le_bytes([frame[4], frame[5], frame[6], frame[7]]);
    let body_end = frame_len - PADDING_LEN;
    if frame[body_end..] != [0, 0] {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "frame is missing its terminating nulls",
        ));
    }
    let body = frame[HEADER_LEN..body_end].to_vec();

    Ok(Packet {
        request_id,
        kind,
        body,
    })
}
