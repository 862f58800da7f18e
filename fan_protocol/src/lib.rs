/*!
# Fan Protocol

Wire types and codec for the UDP protocol spoken by Smart Wi-Fi ventilation
fan controllers.

## Core Types

- [`Catalog`] - The closed set of parameter addresses this client understands
- [`ParameterValue`] - Raw value bytes for one parameter, with typed views
- [`FrameCodec`] - Command frame encoding and response frame decoding
- [`FanStatus`] - Typed status snapshot projected from decoded parameters

## Modules

- [`catalog`] - Static parameter catalog
- [`value`] - Parameter values and their integer/boolean/text views
- [`checksum`] - Additive frame checksum
- [`codec`] - Frame encoding and escape-coded response decoding
- [`status`] - Status projection
- [`error`] - Common error types
*/

pub mod catalog;
pub mod checksum;
pub mod codec;
pub mod error;
pub mod status;
pub mod value;

// Re-export commonly used types
pub use catalog::{Catalog, ParameterDefinition};
pub use checksum::checksum;
pub use codec::{ChecksumPolicy, Credentials, FrameCodec, Function, ResponseFrame, StreamEntry};
pub use error::{ProtocolError, Result};
pub use status::FanStatus;
pub use value::ParameterValue;

/// Version information for the protocol library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol constants
pub mod protocol {
    /// Start-of-frame marker preceding every datagram
    pub const START_MARKER: [u8; 2] = [0xFD, 0xFD];

    /// Packet type byte following the start marker
    pub const PACKET_TYPE: u8 = 0x02;

    /// Length of start marker plus packet type, skipped when decoding
    pub const PREAMBLE_LEN: usize = 3;

    /// Fixed length of the device identifier field
    pub const DEVICE_ID_LEN: usize = 16;

    /// Largest password length that fits the two-digit length field
    pub const MAX_PASSWORD_LEN: usize = 99;

    /// Identifier a factory-fresh controller (and the discovery probe) uses
    pub const DEFAULT_DEVICE_ID: &str = "DEFAULT_DEVICEID";

    /// Factory password
    pub const DEFAULT_PASSWORD: &str = "1111";

    /// UDP port controllers listen on
    pub const DEFAULT_PORT: u16 = 4000;

    /// Parameter stream escape bytes
    pub const ESC_CHANGE_FUNCTION: u8 = 0xFC;
    pub const ESC_NOT_SUPPORTED: u8 = 0xFD;
    pub const ESC_VALUE_LENGTH: u8 = 0xFE;
    pub const ESC_HIGH_BYTE: u8 = 0xFF;
}
