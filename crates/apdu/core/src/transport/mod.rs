//! Transport layer for APDU exchanges
//!
//! A transport moves raw command bytes to a card and returns the raw
//! response bytes, status word included. It knows nothing about chaining
//! or command semantics.

mod error;

pub use error::TransportError;

use bytes::Bytes;
use tracing::trace;

/// Trait for card transports
pub trait CardTransport: Send {
    /// Send raw command bytes and return the raw response
    ///
    /// Only the command header and body length are traced. The body may hold
    /// a PIN.
    fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        let (header, body) = command.split_at(command.len().min(4));
        trace!(
            header = %hex::encode_upper(header),
            body_len = body.len(),
            "Transmitting APDU"
        );
        let response = self.do_transmit_raw(command)?;
        trace!(response = %hex::encode_upper(&response), "Received APDU");
        Ok(response)
    }

    /// Transport specific transmit implementation
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError>;

    /// Answer To Reset of the connected card
    fn atr(&self) -> Result<Bytes, TransportError>;
}

impl<T: CardTransport + ?Sized> CardTransport for Box<T> {
    fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        (**self).transmit_raw(command)
    }

    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        (**self).do_transmit_raw(command)
    }

    fn atr(&self) -> Result<Bytes, TransportError> {
        (**self).atr()
    }
}

/// Scripted transport for unit tests
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    /// Responses returned in order
    pub(crate) responses: std::collections::VecDeque<Bytes>,
    /// Commands received in order
    pub(crate) commands: Vec<Bytes>,
}

#[cfg(test)]
impl MockTransport {
    pub(crate) fn with_responses<I, B>(responses: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            commands: Vec::new(),
        }
    }

    pub(crate) fn with_response(response: impl Into<Bytes>) -> Self {
        Self::with_responses([response.into()])
    }
}

#[cfg(test)]
impl CardTransport for MockTransport {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        self.commands.push(Bytes::copy_from_slice(command));
        self.responses
            .pop_front()
            .ok_or_else(|| TransportError::Transmission("no scripted response".into()))
    }

    fn atr(&self) -> Result<Bytes, TransportError> {
        Ok(Bytes::from_static(&[0x3B, 0x00]))
    }
}
