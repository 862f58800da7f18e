/*!
Frame encoding and decoding.

## Frame Format

| Field         | Size (bytes) | Description                                          |
|---------------|--------------|------------------------------------------------------|
| start marker  | 2            | Always `FD FD`                                       |
| packet type   | 1            | Always `02`                                          |
| id length     | 1            | Always 16 on outbound frames                         |
| device id     | id length    | ASCII device identifier                              |
| pass length   | 1            | Password length                                      |
| password      | pass length  | ASCII password                                       |
| function      | 1            | See [`Function`]                                     |
| parameters    | variable     | Escape-coded parameter stream                        |
| checksum      | 2            | Additive checksum from packet type to end of params  |

## Parameter Stream

| Lead byte | Meaning                 | Consumes next                         |
|-----------|-------------------------|---------------------------------------|
| `FC`      | change function         | nothing                               |
| `FD`      | parameter not supported | 1 byte (the address)                  |
| `FE`      | explicit value length   | length, address, then `length` bytes  |
| `FF`      | high byte change        | nothing                               |
| other     | parameter address       | exactly 1 value byte                  |
*/

use crate::catalog::Catalog;
use crate::checksum;
use crate::error::{ProtocolError, Result};
use crate::protocol::{
    DEVICE_ID_LEN, ESC_CHANGE_FUNCTION, ESC_HIGH_BYTE, ESC_NOT_SUPPORTED, ESC_VALUE_LENGTH,
    MAX_PASSWORD_LEN, PACKET_TYPE, PREAMBLE_LEN, START_MARKER,
};
use crate::value::ParameterValue;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Function codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Function {
    Read = 0x01,
    Write = 0x02,
    WriteReturn = 0x03,
    Increase = 0x04,
    Decrease = 0x05,
    Response = 0x06,
}

impl Function {
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Read),
            0x02 => Some(Self::Write),
            0x03 => Some(Self::WriteReturn),
            0x04 => Some(Self::Increase),
            0x05 => Some(Self::Decrease),
            0x06 => Some(Self::Response),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether this function carries a value for every address
    pub fn carries_values(self) -> bool {
        matches!(self, Self::Write | Self::WriteReturn | Self::Response)
    }
}

/// Device identifier and password sent with every command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub device_id: String,
    pub password: String,
}

impl Credentials {
    pub fn new(device_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            password: password.into(),
        }
    }
}

/// Whether the checksum of an inbound frame is recomputed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumPolicy {
    /// Accept frames without looking at the checksum, as the controllers'
    /// own clients do
    #[default]
    Ignore,
    /// Drop frames whose checksum does not match
    Verify,
}

/// Outbound command: a function and the addresses it targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    pub function: Function,
    pub targets: Vec<(u8, Option<Vec<u8>>)>,
}

impl CommandFrame {
    /// Command that only lists addresses (read, increase, decrease)
    pub fn new(function: Function, addresses: &[u8]) -> Self {
        Self {
            function,
            targets: addresses.iter().map(|&a| (a, None)).collect(),
        }
    }

    pub fn read(addresses: &[u8]) -> Self {
        Self::new(Function::Read, addresses)
    }

    /// Command pairing every address with a value.
    ///
    /// Fails when the two lists differ in length.
    pub fn with_values(function: Function, addresses: &[u8], values: &[Vec<u8>]) -> Result<Self> {
        if addresses.len() != values.len() {
            return Err(ProtocolError::value_count_mismatch(addresses.len(), values.len()));
        }

        Ok(Self {
            function,
            targets: addresses
                .iter()
                .zip(values)
                .map(|(&a, v)| (a, Some(v.clone())))
                .collect(),
        })
    }
}

/// One decoded item of the parameter stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEntry {
    /// Value for a catalog address
    Value(ParameterValue),
    /// `FC` marker, no operand
    ChangeFunction,
    /// `FD` marker with the address the controller does not support
    Unsupported(u8),
    /// `FF` marker, no operand
    HighByteChange,
    /// Well-formed entry for an address outside the catalog
    UnknownAddress(u8),
    /// Entry whose value runs past the end of the stream
    Truncated(u8),
}

/// Decoded inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    pub device_id: String,
    pub password: String,
    pub function: u8,
    pub entries: Vec<StreamEntry>,
    pub checksum: [u8; 2],
}

impl ResponseFrame {
    /// Decoded values in stream order
    pub fn parameters(&self) -> impl Iterator<Item = &ParameterValue> {
        self.entries.iter().filter_map(|entry| match entry {
            StreamEntry::Value(value) => Some(value),
            _ => None,
        })
    }

    pub fn into_parameters(self) -> Vec<ParameterValue> {
        self.entries
            .into_iter()
            .filter_map(|entry| match entry {
                StreamEntry::Value(value) => Some(value),
                _ => None,
            })
            .collect()
    }

    pub fn parameter(&self, address: u8) -> Option<&ParameterValue> {
        self.parameters().find(|p| p.address == address)
    }

    pub fn function(&self) -> Option<Function> {
        Function::from_byte(self.function)
    }
}

/// Encoder/decoder bound to a parameter catalog
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    catalog: &'static Catalog,
    checksum_policy: ChecksumPolicy,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(Catalog::standard())
    }
}

impl FrameCodec {
    pub fn new(catalog: &'static Catalog) -> Self {
        Self {
            catalog,
            checksum_policy: ChecksumPolicy::default(),
        }
    }

    pub fn with_checksum_policy(mut self, policy: ChecksumPolicy) -> Self {
        self.checksum_policy = policy;
        self
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    pub fn checksum_policy(&self) -> ChecksumPolicy {
        self.checksum_policy
    }

    /// Encode a command into a complete datagram.
    ///
    /// The device identifier is sent as-is: callers must supply exactly 16
    /// characters or the frame will not be understood by the controller.
    pub fn encode(&self, credentials: &Credentials, command: &CommandFrame) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(START_MARKER.len() + 24 + command.targets.len() * 2);
        write_header(&mut buf, credentials, command.function)?;

        for (address, value) in &command.targets {
            buf.push(*address);
            let value = match value {
                Some(value) => value.as_slice(),
                None => continue,
            };
            match value.len() {
                0 => {}
                1 => buf.push(value[0]),
                len => {
                    buf.push(ESC_VALUE_LENGTH);
                    buf.push(value_len(*address, len)?);
                    buf.extend_from_slice(value);
                }
            }
        }

        let sum = checksum::checksum(&buf[START_MARKER.len()..]);
        buf.extend_from_slice(&sum);

        Ok(buf)
    }

    /// Encode a controller-side response carrying `values`.
    ///
    /// Unlike [`encode`](Self::encode), multi-byte values use the inbound
    /// layout `FE len addr bytes` (empty values too, as `FE 00 addr`), so the
    /// result decodes back to `values`.
    /// Useful for simulating a controller.
    pub fn encode_response(
        &self,
        credentials: &Credentials,
        values: &[ParameterValue],
    ) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(START_MARKER.len() + 24 + values.len() * 3);
        write_header(&mut buf, credentials, Function::Response)?;

        for value in values {
            match value.raw.as_slice() {
                [byte] => {
                    buf.push(value.address);
                    buf.push(*byte);
                }
                raw => {
                    buf.push(ESC_VALUE_LENGTH);
                    buf.push(value_len(value.address, raw.len())?);
                    buf.push(value.address);
                    buf.extend_from_slice(raw);
                }
            }
        }

        let sum = checksum::checksum(&buf[START_MARKER.len()..]);
        buf.extend_from_slice(&sum);

        Ok(buf)
    }

    /// Encode a read request for `addresses`
    pub fn encode_read(&self, credentials: &Credentials, addresses: &[u8]) -> Result<Vec<u8>> {
        self.encode(credentials, &CommandFrame::read(addresses))
    }

    /// Encode a write request pairing each address with a value
    pub fn encode_write(
        &self,
        credentials: &Credentials,
        function: Function,
        addresses: &[u8],
        values: &[Vec<u8>],
    ) -> Result<Vec<u8>> {
        let command = CommandFrame::with_values(function, addresses, values)?;
        self.encode(credentials, &command)
    }

    /// Decode an inbound datagram.
    ///
    /// Returns `None` when the frame is too short to hold its header fields
    /// (or fails checksum verification under [`ChecksumPolicy::Verify`]).
    /// Problems inside the parameter stream never fail the whole frame.
    pub fn decode(&self, data: &[u8]) -> Option<ResponseFrame> {
        if data.len() <= PREAMBLE_LEN {
            debug!("Frame of {} bytes has no header, ignoring", data.len());
            return None;
        }

        let mut pos = PREAMBLE_LEN;
        let device_id = read_field(data, &mut pos, "device id")?;
        let password = read_field(data, &mut pos, "password")?;

        let function = *data.get(pos).or_else(|| {
            debug!("Frame ends before function byte");
            None
        })?;
        pos += 1;

        if data.len() < pos + 2 {
            debug!("Frame ends before checksum");
            return None;
        }
        let checksum_start = data.len() - 2;
        let checksum = [data[checksum_start], data[checksum_start + 1]];

        if self.checksum_policy == ChecksumPolicy::Verify {
            let covered = &data[START_MARKER.len()..checksum_start];
            if !checksum::verify(covered, checksum) {
                warn!(
                    "Checksum mismatch: received {}, computed {}",
                    hex::encode(checksum),
                    hex::encode(checksum::checksum(covered))
                );
                return None;
            }
        }

        let entries = self.decode_stream(&data[pos..checksum_start]);

        Some(ResponseFrame {
            device_id,
            password,
            function,
            entries,
            checksum,
        })
    }

    /// Decode the escape-coded parameter stream of a response.
    pub fn decode_stream(&self, stream: &[u8]) -> Vec<StreamEntry> {
        let mut entries = Vec::new();
        let mut pos = 0;

        while pos < stream.len() {
            let lead = stream[pos];
            pos += 1;

            let (address, value_len) = match lead {
                ESC_CHANGE_FUNCTION => {
                    debug!("Change function marker");
                    entries.push(StreamEntry::ChangeFunction);
                    continue;
                }
                ESC_NOT_SUPPORTED => {
                    match stream.get(pos) {
                        Some(&address) => {
                            pos += 1;
                            warn!("Parameter ({:02x}) not supported", address);
                            entries.push(StreamEntry::Unsupported(address));
                        }
                        None => debug!("Not-supported marker at end of stream"),
                    }
                    continue;
                }
                ESC_VALUE_LENGTH => match (stream.get(pos), stream.get(pos + 1)) {
                    (Some(&len), Some(&address)) => {
                        pos += 2;
                        (address, usize::from(len))
                    }
                    _ => {
                        debug!("Length marker at end of stream");
                        break;
                    }
                },
                ESC_HIGH_BYTE => {
                    debug!("High byte change marker");
                    entries.push(StreamEntry::HighByteChange);
                    continue;
                }
                address => (address, 1),
            };

            // A short record is dropped; decoding resumes right after its address.
            if stream.len() < pos + value_len {
                debug!("Parameter ({:02x}) has no value", address);
                entries.push(StreamEntry::Truncated(address));
                continue;
            }

            let raw = &stream[pos..pos + value_len];
            pos += value_len;

            if self.catalog.contains(address) {
                entries.push(StreamEntry::Value(ParameterValue::new(address, raw.to_vec())));
            } else {
                warn!("Parameter ({:02x}) not found", address);
                entries.push(StreamEntry::UnknownAddress(address));
            }
        }

        entries
    }
}

/// Read a length-prefixed ASCII field, advancing `pos`
fn read_field(data: &[u8], pos: &mut usize, name: &str) -> Option<String> {
    let len = usize::from(*data.get(*pos)?);
    let start = *pos + 1;
    let field = data.get(start..start + len).or_else(|| {
        debug!("Frame ends inside {} field", name);
        None
    })?;
    *pos = start + len;
    Some(
        field
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { '?' })
            .collect(),
    )
}

/// ASCII bytes of `text`, non-ASCII characters become `?`
fn ascii_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .collect()
}

fn value_len(address: u8, len: usize) -> Result<u8> {
    u8::try_from(len).map_err(|_| ProtocolError::ValueTooLong { address, len })
}

/// Write everything up to and including the function byte
fn write_header(buf: &mut Vec<u8>, credentials: &Credentials, function: Function) -> Result<()> {
    let password = ascii_bytes(&credentials.password);
    if password.len() > MAX_PASSWORD_LEN {
        return Err(ProtocolError::PasswordTooLong(password.len()));
    }

    let device_id = ascii_bytes(&credentials.device_id);
    if device_id.len() != DEVICE_ID_LEN {
        warn!(
            "Device id '{}' is {} bytes long, expected {}",
            credentials.device_id,
            device_id.len(),
            DEVICE_ID_LEN
        );
    }

    buf.extend_from_slice(&START_MARKER);
    buf.push(PACKET_TYPE);
    buf.push(DEVICE_ID_LEN as u8);
    buf.extend_from_slice(&device_id);
    buf.push(password.len() as u8);
    buf.extend_from_slice(&password);
    buf.push(function.code());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::address;

    fn credentials() -> Credentials {
        Credentials::new("1234567890123456", "1111")
    }

    /// Hand-built response frame around a raw parameter stream
    fn response_frame(stream: &[u8]) -> Vec<u8> {
        let mut frame = vec![0xFD, 0xFD, 0x02, 0x10];
        frame.extend_from_slice(b"1234567890123456");
        frame.push(0x04);
        frame.extend_from_slice(b"1111");
        frame.push(0x06);
        frame.extend_from_slice(stream);
        let sum = checksum::checksum(&frame[2..]);
        frame.extend_from_slice(&sum);
        frame
    }

    fn values(entries: &[StreamEntry]) -> Vec<ParameterValue> {
        entries
            .iter()
            .filter_map(|e| match e {
                StreamEntry::Value(v) => Some(v.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_function_codes() {
        assert_eq!(Function::from_byte(0x06), Some(Function::Response));
        assert_eq!(Function::from_byte(0x07), None);
        assert_eq!(Function::WriteReturn.code(), 0x03);
    }

    #[test]
    fn test_encode_read_layout() {
        let codec = FrameCodec::default();
        let frame = codec
            .encode_read(&Credentials::new("DEFAULT_DEVICEID", "1111"), &[address::DEVICE_ID])
            .unwrap();

        let expected: Vec<u8> = vec![
            0xFD, 0xFD, 0x02, 0x10, 0x44, 0x45, 0x46, 0x41, 0x55, 0x4C, 0x54, 0x5F, 0x44, 0x45,
            0x56, 0x49, 0x43, 0x45, 0x49, 0x44, 0x04, 0x31, 0x31, 0x31, 0x31, 0x01, 0x7C, 0xF8,
            0x05,
        ];
        assert_eq!(frame, expected);
    }

    #[test]
    fn test_encode_write_value_widths() {
        let codec = FrameCodec::default();
        let frame = codec
            .encode_write(
                &credentials(),
                Function::Write,
                &[0x01, 0x05, 0x86],
                &[vec![], vec![0x01], vec![0xAA, 0xBB, 0xCC]],
            )
            .unwrap();

        // 2 marker + 1 type + 1 + 16 id + 1 + 4 password = 25, then function
        assert_eq!(frame[25], Function::Write.code());
        assert_eq!(
            &frame[26..frame.len() - 2],
            &[0x01, 0x05, 0x01, 0x86, 0xFE, 0x03, 0xAA, 0xBB, 0xCC]
        );
        let sum = checksum::checksum(&frame[2..frame.len() - 2]);
        assert_eq!(&frame[frame.len() - 2..], &sum);
    }

    #[test]
    fn test_write_count_mismatch_is_an_error() {
        let codec = FrameCodec::default();
        let err = codec
            .encode_write(&credentials(), Function::Write, &[0x01, 0x05], &[vec![0x01]])
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::ValueCountMismatch { addresses: 2, values: 1 }
        ));
    }

    #[test]
    fn test_password_length_limit() {
        let codec = FrameCodec::default();
        let creds = Credentials::new("1234567890123456", "x".repeat(100));
        assert!(matches!(
            codec.encode_read(&creds, &[0x01]),
            Err(ProtocolError::PasswordTooLong(100))
        ));
    }

    #[test]
    fn test_device_id_is_not_padded() {
        let codec = FrameCodec::default();
        let frame = codec
            .encode_read(&Credentials::new("SHORT", "1111"), &[0x01])
            .unwrap();
        // Length field still claims 16, id is sent unpadded
        assert_eq!(frame[3], 0x10);
        assert_eq!(&frame[4..9], b"SHORT");
        assert_eq!(frame[9], 0x04);
    }

    #[test]
    fn test_credentials_are_ascii() {
        let codec = FrameCodec::default();
        let frame = codec
            .encode_read(&Credentials::new("1234567890123456", "pä"), &[0x01])
            .unwrap();
        assert_eq!(frame[20], 0x02);
        assert_eq!(&frame[21..23], &[0x70, 0x3F]);
    }

    #[test]
    fn test_decode_non_ascii_header_bytes() {
        let mut frame = vec![0xFD, 0xFD, 0x02, 0x02, b'A', 0xC3, 0x00, 0x06, 0x00, 0x00];
        let sum = checksum::checksum(&frame[2..8]);
        frame[8..].copy_from_slice(&sum);

        let decoded = FrameCodec::default().decode(&frame).unwrap();
        assert_eq!(decoded.device_id, "A?");
        assert_eq!(decoded.password, "");
    }

    #[test]
    fn test_decode_too_short() {
        let codec = FrameCodec::default();
        assert!(codec.decode(&[]).is_none());
        assert!(codec.decode(&[0xFD, 0xFD, 0x02]).is_none());
    }

    #[test]
    fn test_decode_header_fields() {
        let codec = FrameCodec::default();
        let frame = codec.decode(&response_frame(&[0x01, 0x01])).unwrap();

        assert_eq!(frame.device_id, "1234567890123456");
        assert_eq!(frame.password, "1111");
        assert_eq!(frame.function(), Some(Function::Response));
        assert_eq!(frame.parameter(0x01).unwrap().raw, vec![0x01]);
    }

    #[test]
    fn test_decode_truncated_header() {
        let codec = FrameCodec::default();
        let mut frame = vec![0xFD, 0xFD, 0x02, 0x10];
        frame.extend_from_slice(b"12345");
        assert!(codec.decode(&frame).is_none());
    }

    #[test]
    fn test_escape_length_entry() {
        let codec = FrameCodec::default();
        let entries = codec.decode_stream(&[0xFE, 0x02, 0x86, 0x01, 0x02]);
        assert_eq!(
            entries,
            vec![StreamEntry::Value(ParameterValue::new(0x86, vec![0x01, 0x02]))]
        );
    }

    #[test]
    fn test_unsupported_marker_continues() {
        let codec = FrameCodec::default();
        let entries = codec.decode_stream(&[0xFD, 0x99, 0x04, 0x20]);
        assert_eq!(
            entries,
            vec![
                StreamEntry::Unsupported(0x99),
                StreamEntry::Value(ParameterValue::new(0x04, vec![0x20])),
            ]
        );
        assert_eq!(values(&codec.decode_stream(&[0xFD, 0x99])).len(), 0);
    }

    #[test]
    fn test_unknown_address_dropped() {
        let codec = FrameCodec::default();
        let entries = codec.decode_stream(&[0x02, 0x01, 0x01, 0x01]);
        assert_eq!(entries[0], StreamEntry::UnknownAddress(0x02));
        assert_eq!(values(&entries), vec![ParameterValue::new(0x01, vec![0x01])]);
    }

    #[test]
    fn test_truncated_value_dropped() {
        let codec = FrameCodec::default();
        let entries = codec.decode_stream(&[0x01, 0x01, 0x04]);
        assert_eq!(
            entries,
            vec![
                StreamEntry::Value(ParameterValue::new(0x01, vec![0x01])),
                StreamEntry::Truncated(0x04),
            ]
        );
    }

    #[test]
    fn test_truncated_explicit_length_resumes_after_address() {
        let codec = FrameCodec::default();
        // Declares 5 bytes but only 2 follow; the remaining 01 02 are re-read
        // as an ordinary entry.
        let entries = codec.decode_stream(&[0xFE, 0x05, 0x86, 0x01, 0x02]);
        assert_eq!(
            entries,
            vec![
                StreamEntry::Truncated(0x86),
                StreamEntry::Value(ParameterValue::new(0x01, vec![0x02])),
            ]
        );
    }

    #[test]
    fn test_marker_only_variants() {
        let codec = FrameCodec::default();
        let entries = codec.decode_stream(&[0xFC, 0xFF, 0x05, 0x00]);
        assert_eq!(
            entries,
            vec![
                StreamEntry::ChangeFunction,
                StreamEntry::HighByteChange,
                StreamEntry::Value(ParameterValue::new(0x05, vec![0x00])),
            ]
        );
    }

    #[test]
    fn test_dangling_escape_bytes() {
        let codec = FrameCodec::default();
        assert!(codec.decode_stream(&[0xFD]).is_empty());
        assert!(codec.decode_stream(&[0xFE, 0x02]).is_empty());
    }

    #[test]
    fn test_read_round_trip_keeps_stream_order() {
        let codec = FrameCodec::default();
        let request = codec.encode_read(&credentials(), &[0x04, 0x2E]).unwrap();
        assert_eq!(&request[26..28], &[0x04, 0x2E]);

        // Controller answers in its own order
        let response = response_frame(&[0x2E, 0x37, 0x04, 0x10]);
        let frame = codec.decode(&response).unwrap();
        let addresses: Vec<u8> = frame.parameters().map(|p| p.address).collect();
        assert_eq!(addresses, vec![0x2E, 0x04]);
    }

    #[test]
    fn test_end_to_end_read() {
        let codec = FrameCodec::default();
        let request = codec.encode_read(&credentials(), &[0x01, 0x04]).unwrap();
        assert_eq!(&request[25..28], &[0x01, 0x01, 0x04]);

        let mut response = vec![0xFD, 0xFD, 0x02, 0x10];
        response.extend_from_slice(b"1234567890123456");
        response.extend_from_slice(&[0x04, b'1', b'1', b'1', b'1', 0x06]);
        response.extend_from_slice(&[0x01, 0x01, 0xFE, 0x02, 0x04, 0x64, 0x00]);
        response.extend_from_slice(&[0x00, 0x00]);

        let frame = codec.decode(&response).unwrap();
        assert!(frame.parameter(0x01).unwrap().as_bool());
        assert_eq!(frame.parameter(0x04).unwrap().as_int(), 100);
    }

    #[test]
    fn test_checksum_policy() {
        let mut response = response_frame(&[0x01, 0x01]);
        let last = response.len() - 1;
        response[last] ^= 0xFF;

        let lenient = FrameCodec::default();
        assert_eq!(lenient.decode(&response).unwrap().parameters().count(), 1);

        let strict = FrameCodec::default().with_checksum_policy(ChecksumPolicy::Verify);
        assert!(strict.decode(&response).is_none());
        assert!(strict.decode(&response_frame(&[0x01, 0x01])).is_some());
    }

    #[test]
    fn test_response_encoding_decodes() {
        let values = vec![
            ParameterValue::new(address::FAN_ON, vec![0x01]),
            ParameterValue::new(address::FAN_SPEED, vec![0x64, 0x00]),
            ParameterValue::new(address::DEVICE_ID, b"1234567890123456".to_vec()),
            ParameterValue::new(address::HUMIDITY, vec![]),
        ];
        let bytes = FrameCodec::default()
            .encode_response(&credentials(), &values)
            .unwrap();

        // Inbound layout: length escape comes before the address
        assert_eq!(&bytes[26..32], &[0x01, 0x01, 0xFE, 0x02, 0x04, 0x64]);

        let strict = FrameCodec::default().with_checksum_policy(ChecksumPolicy::Verify);
        let frame = strict.decode(&bytes).unwrap();
        assert_eq!(frame.function(), Some(Function::Response));
        assert_eq!(frame.parameters().cloned().collect::<Vec<_>>(), values);
        assert_eq!(frame.parameter(address::FAN_SPEED).unwrap().as_int(), 100);
        assert_eq!(
            frame.parameter(address::DEVICE_ID).unwrap().as_text(),
            "1234567890123456"
        );
    }

    #[test]
    fn test_response_value_too_long() {
        let values = [ParameterValue::new(address::DEVICE_ID, vec![0x41; 256])];
        assert!(matches!(
            FrameCodec::default().encode_response(&credentials(), &values),
            Err(ProtocolError::ValueTooLong { address: 0x7C, len: 256 })
        ));
    }
}
