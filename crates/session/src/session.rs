//! Exclusive card sessions and the command exchange path

use std::fmt;

use bytes::Bytes;
use parking_lot::Mutex;
use smartcard_apdu_core::{
    ApduCommand, ApduResponse, CardTransport, Command, GetResponseProcessor, ProcessorError,
    Response, TransportError,
};
use tracing::{debug, instrument, trace, warn};

use crate::{
    Error, ProtocolError, Result,
    commands::{GetDataCommand, SelectCommand, Selection},
    config::SessionConfig,
    manager::Lease,
    types::{AlgorithmAttributes, ApplicationId, ApplicationRelatedData, CardId, KeySlot},
};

/// Observable state of a [`Session`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The card is connected and the OpenPGP application is selected
    Open,
    /// The session was closed or the card went away; no transition leaves this state
    Closed,
}

/// Live connection state, dropped as a unit on close
struct Channel<T> {
    transport: T,
    processor: GetResponseProcessor,
    _lease: Lease,
}

/// Exclusive session on one card
///
/// All exchanges, including their GET RESPONSE chains, run under one lock, so
/// a session can be shared between threads and commands never interleave.
pub struct Session<T: CardTransport> {
    id: CardId,
    atr: Bytes,
    application_data: ApplicationRelatedData,
    config: SessionConfig,
    channel: Mutex<Option<Channel<T>>>,
}

impl<T: CardTransport> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("atr", &hex::encode_upper(&self.atr))
            .field("aid", &self.application_data.aid)
            .field("key_slot", &self.config.key_slot)
            .field("state", &self.state())
            .finish()
    }
}

impl<T: CardTransport> Session<T> {
    /// Run the open handshake on a freshly connected transport
    ///
    /// Any failure drops the transport and the lease.
    pub(crate) fn open(
        id: CardId,
        transport: T,
        lease: Lease,
        config: SessionConfig,
    ) -> Result<Self> {
        let atr = transport.atr().map_err(|e| {
            if e.is_card_gone() {
                Error::CardNotFound(id.clone())
            } else {
                Error::CardCommunication(e)
            }
        })?;
        if atr.is_empty() {
            debug!(card = %id, "Card returned an empty ATR");
            return Err(Error::CardCommunication(
                TransportError::Connection("empty ATR".to_string()),
            ));
        }
        trace!(card = %id, atr = %hex::encode_upper(&atr), "Card answered reset");

        let mut channel = Some(Channel {
            transport,
            processor: config.processor(),
            _lease: lease,
        });

        if execute_on(&id, &mut channel, &SelectCommand::openpgp())? == Selection::NotPresent {
            debug!(card = %id, "No OpenPGP application on card");
            return Err(Error::CardNotFound(id));
        }
        let data = execute_on(&id, &mut channel, &GetDataCommand::application_related_data())?;
        let application_data = ApplicationRelatedData::from_bytes(&data)?;

        debug!(
            card = %id,
            aid = %application_data.aid,
            ident = %application_data.aid.ident(),
            "Opened session"
        );

        Ok(Self {
            id,
            atr,
            application_data,
            config,
            channel: Mutex::new(channel),
        })
    }

    /// Card id the session is bound to
    pub const fn id(&self) -> &CardId {
        &self.id
    }

    /// Answer To Reset read at open
    pub const fn atr(&self) -> &Bytes {
        &self.atr
    }

    /// OpenPGP application identifier
    pub const fn application_id(&self) -> &ApplicationId {
        &self.application_data.aid
    }

    /// Application related data read at open
    pub const fn application_data(&self) -> &ApplicationRelatedData {
        &self.application_data
    }

    /// Algorithm attributes of the key in `slot`, if the card reports them
    pub const fn algorithm_attributes(&self, slot: KeySlot) -> Option<&AlgorithmAttributes> {
        self.application_data.attributes(slot)
    }

    /// Key slot used for public key retrieval and signing
    pub const fn key_slot(&self) -> KeySlot {
        self.config.key_slot
    }

    /// Configuration the session was opened with
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        if self.channel.lock().is_some() {
            SessionState::Open
        } else {
            SessionState::Closed
        }
    }

    /// Whether the session is open
    pub fn is_open(&self) -> bool {
        self.state() == SessionState::Open
    }

    /// Close the session, releasing the card; closing twice is a no-op
    pub fn close(&self) {
        if self.channel.lock().take().is_some() {
            debug!(card = %self.id, "Closed session");
        }
    }

    /// Send a command and return the reassembled response
    ///
    /// A final status other than `90 00` is a [`ProtocolError::UnexpectedStatus`].
    pub fn exchange(&self, command: &Command) -> Result<Response> {
        let response = self.execute(command)?;
        if !response.is_success() {
            return Err(Error::unexpected_status(Command::NAME, response.status()));
        }
        Ok(response)
    }

    /// Send raw command bytes and return `payload || SW1 SW2`
    ///
    /// Any final status word is returned to the caller. Malformed command
    /// bytes fail before the card is contacted.
    #[instrument(skip_all, fields(card = %self.id))]
    pub fn transmit(&self, command: &[u8]) -> Result<Bytes> {
        let command = Command::from_bytes(command)?;
        self.execute(&command).map(Bytes::from)
    }

    /// Send a typed command and parse its response
    pub fn execute<C>(&self, command: &C) -> Result<C::Success>
    where
        C: ApduCommand,
        Error: From<C::Error>,
    {
        let mut channel = self.channel.lock();
        execute_on(&self.id, &mut *channel, command)
    }
}

/// Exchange `command` on `channel`, closing it on transport failure
fn execute_on<T, C>(id: &CardId, channel: &mut Option<Channel<T>>, command: &C) -> Result<C::Success>
where
    T: CardTransport,
    C: ApduCommand,
    Error: From<C::Error>,
{
    let Some(open) = channel.as_mut() else {
        return Err(Error::SessionClosed(id.clone()));
    };

    let mut raw = command.to_command();
    let result = open.processor.process_command(&raw, &mut open.transport);
    raw.wipe_data();

    let response = match result {
        Ok(response) => response,
        Err(ProcessorError::Transport(e)) => {
            *channel = None;
            return Err(if e.is_card_gone() {
                warn!(card = %id, "Card removed, session closed");
                Error::CardRemoved(id.clone())
            } else {
                debug!(card = %id, error = %e, "Transport failed, session closed");
                Error::CardCommunication(e)
            });
        }
        Err(ProcessorError::Response(e)) => return Err(e.into()),
        Err(ProcessorError::Command(e)) => return Err(e.into()),
        Err(ProcessorError::ChainLimitExceeded(limit)) => {
            return Err(ProtocolError::ChainLimitExceeded(limit).into());
        }
    };
    trace!(command = C::NAME, status = %response.status(), "Command completed");

    Ok(command.parse_response(response)?)
}
