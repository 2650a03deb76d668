//! APDU command definitions and traits
//!
//! This module provides types and traits for working with short APDU commands
//! according to ISO/IEC 7816-4.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use zeroize::Zeroize;

use crate::Response;
use crate::response::error::ResponseError;

/// Expected length type for APDU commands (`0` requests up to 256 bytes)
pub type ExpectedLength = u8;

/// Largest data field a short APDU can carry
pub const MAX_SHORT_DATA_LENGTH: usize = 255;

/// Errors raised while building or parsing command bytes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The raw bytes do not form a valid short APDU
    #[error("Invalid command length: {0}")]
    InvalidLength(usize),

    /// The data field does not fit in a short APDU
    #[error("Command data too long for a short APDU: {0} bytes")]
    DataTooLong(usize),

    /// A present but empty data field would encode `Lc = 00`
    #[error("Command data field is empty")]
    EmptyData,
}

/// Core trait for APDU commands
pub trait ApduCommand {
    /// Success response type
    type Success;

    /// Error response type
    type Error: From<ResponseError> + fmt::Debug;

    /// Human readable name of the command, used in logs and errors
    const NAME: &'static str;

    /// Command class (CLA)
    fn class(&self) -> u8 {
        0x00
    }

    /// Instruction code (INS)
    fn instruction(&self) -> u8;

    /// First parameter (P1)
    fn p1(&self) -> u8;

    /// Second parameter (P2)
    fn p2(&self) -> u8;

    /// Command payload data (optional)
    fn data(&self) -> Option<&[u8]>;

    /// Expected response length (optional)
    fn expected_length(&self) -> Option<ExpectedLength>;

    /// Convert to raw APDU bytes
    fn to_bytes(&self) -> Bytes {
        let mut buffer = BytesMut::with_capacity(self.command_length());

        // Header: CLA, INS, P1, P2
        buffer.put_u8(self.class());
        buffer.put_u8(self.instruction());
        buffer.put_u8(self.p1());
        buffer.put_u8(self.p2());

        // Add Lc and data if present
        if let Some(data) = self.data() {
            buffer.put_u8(data.len() as u8);
            buffer.put_slice(data);
        }

        // Add Le if present
        if let Some(le) = self.expected_length() {
            buffer.put_u8(le);
        }

        buffer.freeze()
    }

    /// Calculate length of serialized command
    fn command_length(&self) -> usize {
        // Header (CLA, INS, P1, P2) is always 4 bytes
        let mut length = 4;

        if let Some(data) = self.data() {
            length += 1 + data.len();
        }

        if self.expected_length().is_some() {
            length += 1;
        }

        length
    }

    /// Convert to a generic Command
    fn to_command(&self) -> Command {
        Command {
            cla: self.class(),
            ins: self.instruction(),
            p1: self.p1(),
            p2: self.p2(),
            data: self.data().map(Bytes::copy_from_slice),
            le: self.expected_length(),
        }
    }

    /// Parse response into the command's response type
    fn parse_response(&self, response: Response) -> Result<Self::Success, Self::Error>;
}

/// Generic APDU command structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
    /// Command data (optional)
    pub data: Option<Bytes>,
    /// Expected length (optional)
    pub le: Option<ExpectedLength>,
}

impl Command {
    /// Create a new command with just the header bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: None,
        }
    }

    /// Create a new command with expected response length (Le)
    pub const fn new_with_le(cla: u8, ins: u8, p1: u8, p2: u8, le: ExpectedLength) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: Some(le),
        }
    }

    /// Create a new command with data payload
    pub fn new_with_data<T: Into<Bytes>>(cla: u8, ins: u8, p1: u8, p2: u8, data: T) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Some(data.into()),
            le: None,
        }
    }

    /// Create a new command with both data and expected length
    pub fn new_with_data_and_le<T: Into<Bytes>>(
        cla: u8,
        ins: u8,
        p1: u8,
        p2: u8,
        data: T,
        le: ExpectedLength,
    ) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Some(data.into()),
            le: Some(le),
        }
    }

    /// Set the data field
    pub fn with_data<T: Into<Bytes>>(mut self, data: T) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the expected length field
    pub const fn with_le(mut self, le: ExpectedLength) -> Self {
        self.le = Some(le);
        self
    }

    /// Check that the command can be encoded as a short APDU
    pub fn validate(&self) -> Result<(), CommandError> {
        match &self.data {
            Some(data) if data.is_empty() => Err(CommandError::EmptyData),
            Some(data) if data.len() > MAX_SHORT_DATA_LENGTH => {
                Err(CommandError::DataTooLong(data.len()))
            }
            _ => Ok(()),
        }
    }

    /// Drop the data field, zeroing it when no other handle shares the buffer
    pub fn wipe_data(&mut self) {
        if let Some(data) = self.data.take() {
            wipe(data);
        }
    }

    /// Parse a command from raw bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self, CommandError> {
        if data.len() < 4 {
            return Err(CommandError::InvalidLength(data.len()));
        }

        let mut command = Self::new(data[0], data[1], data[2], data[3]);

        if data.len() == 4 {
            return Ok(command);
        }

        if data.len() == 5 {
            // Only Le present, no data
            command.le = Some(data[4]);
            return Ok(command);
        }

        // Lc of zero followed by more bytes would be an extended APDU
        let lc = data[4] as usize;
        if lc == 0 || data.len() < 5 + lc {
            return Err(CommandError::InvalidLength(data.len()));
        }

        command.data = Some(Bytes::copy_from_slice(&data[5..5 + lc]));

        match data.len() - (5 + lc) {
            0 => {}
            1 => command.le = Some(data[5 + lc]),
            _ => return Err(CommandError::InvalidLength(data.len())),
        }

        Ok(command)
    }
}

/// Zero a buffer once nothing else holds it
pub(crate) fn wipe(bytes: Bytes) {
    if let Ok(mut bytes) = bytes.try_into_mut() {
        bytes[..].zeroize();
    }
}

impl ApduCommand for Command {
    type Success = Response;
    type Error = ResponseError;

    const NAME: &'static str = "RAW";

    fn class(&self) -> u8 {
        self.cla
    }

    fn instruction(&self) -> u8 {
        self.ins
    }

    fn p1(&self) -> u8 {
        self.p1
    }

    fn p2(&self) -> u8 {
        self.p2
    }

    fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        self.le
    }

    fn parse_response(&self, response: Response) -> Result<Self::Success, Self::Error> {
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let data = Bytes::from_static(&[0xD2, 0x76, 0x00, 0x01, 0x24, 0x01]);
        let cmd = Command::new_with_data_and_le(0x00, 0xA4, 0x04, 0x00, data, 0);
        let bytes = cmd.to_bytes();

        assert_eq!(
            bytes.as_ref(),
            &[
                0x00, 0xA4, 0x04, 0x00, // header
                0x06, // Lc
                0xD2, 0x76, 0x00, 0x01, 0x24, 0x01, // data
                0x00  // Le
            ]
        );
    }

    #[test]
    fn test_command_length() {
        let cmd1 = Command::new(0x00, 0xB0, 0x00, 0x00);
        assert_eq!(cmd1.command_length(), 4);

        let cmd2 = Command::new_with_le(0x00, 0xB0, 0x00, 0x00, 0xFF);
        assert_eq!(cmd2.command_length(), 5);

        let data = Bytes::from_static(&[0x01, 0x02, 0x03]);
        let cmd3 = Command::new_with_data(0x00, 0xD6, 0x00, 0x00, data.clone());
        assert_eq!(cmd3.command_length(), 8);

        let cmd4 = Command::new_with_data_and_le(0x00, 0xD6, 0x00, 0x00, data, 0xFF);
        assert_eq!(cmd4.command_length(), 9);
    }

    #[test]
    fn test_command_from_bytes() {
        // Header only
        let cmd = Command::from_bytes(&[0x00, 0xA4, 0x04, 0x00]).unwrap();
        assert_eq!((cmd.cla, cmd.ins, cmd.p1, cmd.p2), (0x00, 0xA4, 0x04, 0x00));
        assert!(cmd.data.is_none());
        assert!(cmd.le.is_none());

        // Data but no Le
        let cmd = Command::from_bytes(&[0x00, 0xA4, 0x04, 0x00, 0x03, 0x01, 0x02, 0x03]).unwrap();
        assert_eq!(cmd.data.as_deref(), Some(&[0x01, 0x02, 0x03][..]));
        assert!(cmd.le.is_none());

        // Data and Le
        let cmd =
            Command::from_bytes(&[0x00, 0xA4, 0x04, 0x00, 0x03, 0x01, 0x02, 0x03, 0xFF]).unwrap();
        assert_eq!(cmd.data.as_deref(), Some(&[0x01, 0x02, 0x03][..]));
        assert_eq!(cmd.le, Some(0xFF));

        // Le only, zero means 256
        let cmd = Command::from_bytes(&[0x00, 0xB0, 0x00, 0x00, 0x00]).unwrap();
        assert!(cmd.data.is_none());
        assert_eq!(cmd.le, Some(0));
    }

    #[test]
    fn test_command_from_bytes_rejects_malformed() {
        assert_eq!(
            Command::from_bytes(&[0x00, 0xA4]),
            Err(CommandError::InvalidLength(2))
        );
        // Lc promises more data than present
        assert!(Command::from_bytes(&[0x00, 0xA4, 0x04, 0x00, 0x05, 0x01]).is_err());
        // Trailing bytes after Le
        assert!(Command::from_bytes(&[0x00, 0xA4, 0x04, 0x00, 0x01, 0x01, 0x00, 0x00]).is_err());
        // Extended length marker
        assert!(Command::from_bytes(&[0x00, 0xA4, 0x04, 0x00, 0x00, 0x00, 0x01]).is_err());
    }

    #[test]
    fn test_validate_data_length() {
        let cmd = Command::new_with_data(0x00, 0x2A, 0x9E, 0x9A, vec![0u8; 256]);
        assert_eq!(cmd.validate(), Err(CommandError::DataTooLong(256)));

        let cmd = Command::new_with_data(0x00, 0x2A, 0x9E, 0x9A, vec![0u8; 255]);
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_data() {
        let cmd = Command::new_with_data(0x00, 0x20, 0x00, 0x81, Vec::new());
        assert_eq!(cmd.validate(), Err(CommandError::EmptyData));
        assert!(Command::new(0x00, 0x20, 0x00, 0x81).validate().is_ok());
    }

    #[test]
    fn test_wipe_data_clears_field() {
        let mut cmd = Command::new_with_data(0x00, 0x20, 0x00, 0x81, b"123456".to_vec());
        cmd.wipe_data();
        assert!(cmd.data.is_none());
        assert_eq!(cmd.to_bytes().as_ref(), &[0x00, 0x20, 0x00, 0x81]);
    }
}
