//! In-memory OpenPGP card and reader backend for integration tests

#![allow(dead_code, unreachable_pub)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use bytes::Bytes;
use p256::ecdsa::{SigningKey, VerifyingKey, signature::hazmat::PrehashSigner};
use parking_lot::Mutex;
use smartcard_apdu_core::{CardTransport, Command, TransportError};
use smartcard_session::{CardBackend, CardId};

/// Id the default backend reports
pub const CARD_ID: &str = "reader0:card-ABC";

/// AID of the virtual card: version 3.4, manufacturer 0006, serial 12345678
pub const AID: [u8; 16] = [
    0xD2, 0x76, 0x00, 0x01, 0x24, 0x01, 0x03, 0x04, 0x00, 0x06, 0x12, 0x34, 0x56, 0x78, 0x00, 0x00,
];

const P256_OID: [u8; 8] = [0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x03, 0x01, 0x07];
const PIN: &[u8] = b"123456";

/// Mutable state of a virtual card
#[derive(Debug)]
pub struct CardState {
    pub signing_key: Option<SigningKey>,
    pub has_openpgp: bool,
    pub removed: bool,
    /// Another process holds the reader exclusively
    pub held_elsewhere: bool,
    pub atr: Vec<u8>,
    /// Largest payload returned per response before chaining with `61xx`
    pub chunk_size: usize,
    pub require_pin: bool,
    pub pin_verified: bool,
    pub pin_retries: u8,
    /// Error every transmit fails with while set
    pub transport_failure: Option<TransportError>,
    /// Remaining bytes of a chained response
    pub pending: Option<Vec<u8>>,
    pub commands: Vec<Vec<u8>>,
}

/// Handle on a virtual card shared between the test and its transports
#[derive(Debug, Clone)]
pub struct VirtualCard {
    state: Arc<Mutex<CardState>>,
    transmits: Arc<AtomicUsize>,
}

impl Default for VirtualCard {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualCard {
    /// Card with a P-256 signing key and no PIN requirement
    pub fn new() -> Self {
        let signing_key = SigningKey::from_slice(&[0x42; 32]).unwrap();
        Self {
            state: Arc::new(Mutex::new(CardState {
                signing_key: Some(signing_key),
                has_openpgp: true,
                removed: false,
                held_elsewhere: false,
                atr: vec![0x3B, 0xDA, 0x18, 0xFF, 0x81, 0xB1, 0xFE, 0x75],
                chunk_size: 255,
                require_pin: false,
                pin_verified: false,
                pin_retries: 3,
                transport_failure: None,
                pending: None,
                commands: Vec::new(),
            })),
            transmits: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Chain every response longer than `chunk_size`
    pub fn with_chunk_size(self, chunk_size: usize) -> Self {
        self.state.lock().chunk_size = chunk_size;
        self
    }

    /// Require VERIFY before signing
    pub fn with_pin_required(self) -> Self {
        self.state.lock().require_pin = true;
        self
    }

    /// Card without a signing key
    pub fn without_key(self) -> Self {
        self.state.lock().signing_key = None;
        self
    }

    /// Card without the OpenPGP application
    pub fn without_openpgp(self) -> Self {
        self.state.lock().has_openpgp = false;
        self
    }

    pub fn with_atr(self, atr: &[u8]) -> Self {
        self.state.lock().atr = atr.to_vec();
        self
    }

    pub fn remove(&self) {
        self.state.lock().removed = true;
    }

    pub fn hold_elsewhere(&self, held: bool) {
        self.state.lock().held_elsewhere = held;
    }

    /// Make every following transmit fail with `error`, e.g. a reader timeout
    pub fn fail_transport(&self, error: TransportError) {
        self.state.lock().transport_failure = Some(error);
    }

    /// Number of APDUs the card received
    pub fn transmit_count(&self) -> usize {
        self.transmits.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> Vec<Vec<u8>> {
        self.state.lock().commands.clone()
    }

    pub fn pin_retries(&self) -> u8 {
        self.state.lock().pin_retries
    }

    /// Uncompressed public point of the signing key
    pub fn public_point(&self) -> Vec<u8> {
        let state = self.state.lock();
        let key = state.signing_key.as_ref().unwrap();
        key.verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.state.lock().signing_key.as_ref().unwrap().verifying_key().clone()
    }

    fn is_removed(&self) -> bool {
        self.state.lock().removed
    }

    fn transmit(&self, raw: &[u8]) -> Result<Bytes, TransportError> {
        self.transmits.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        if state.removed {
            return Err(TransportError::CardRemoved);
        }
        if let Some(error) = &state.transport_failure {
            return Err(error.clone());
        }
        state.commands.push(raw.to_vec());

        let command = match Command::from_bytes(raw) {
            Ok(command) => command,
            Err(_) => return Ok(status(0x67, 0x00)),
        };

        if command.ins == 0xC0 {
            return Ok(state.get_response(command.le));
        }
        // Any other command abandons a pending chain
        state.pending = None;

        let (payload, sw1, sw2) = state.process(&command);
        Ok(state.respond(payload, sw1, sw2))
    }
}

impl CardState {
    fn process(&mut self, command: &Command) -> (Vec<u8>, u8, u8) {
        let data = command.data.as_deref().unwrap_or_default();
        match (command.ins, command.p1, command.p2) {
            (0xA4, 0x04, 0x00) => {
                if self.has_openpgp && AID.starts_with(data) && !data.is_empty() {
                    (Vec::new(), 0x90, 0x00)
                } else {
                    (Vec::new(), 0x6A, 0x82)
                }
            }
            (0xCA, 0x00, 0x6E) => (application_related_data(), 0x90, 0x00),
            (0xCA, 0x00, 0xC4) => (
                vec![0x00, 0x20, 0x20, 0x20, self.pin_retries, 0x00, 0x03],
                0x90,
                0x00,
            ),
            (0x47, 0x81, 0x00) => match (data, &self.signing_key) {
                ([0xB6, 0x00], Some(key)) => {
                    let point = key.verifying_key().to_encoded_point(false);
                    (public_key_template(point.as_bytes()), 0x90, 0x00)
                }
                _ => (Vec::new(), 0x6A, 0x88),
            },
            (0x20, 0x00, 0x81) => self.verify(data),
            (0x2A, 0x9E, 0x9A) => self.sign(data),
            (0x88, 0x00, 0x00) => (Vec::new(), 0x6A, 0x88),
            _ => (Vec::new(), 0x6D, 0x00),
        }
    }

    fn verify(&mut self, pin: &[u8]) -> (Vec<u8>, u8, u8) {
        if self.pin_retries == 0 {
            return (Vec::new(), 0x69, 0x83);
        }
        if pin == PIN {
            self.pin_retries = 3;
            self.pin_verified = true;
            (Vec::new(), 0x90, 0x00)
        } else {
            self.pin_retries -= 1;
            self.pin_verified = false;
            if self.pin_retries == 0 {
                (Vec::new(), 0x69, 0x83)
            } else {
                (Vec::new(), 0x63, 0xC0 | self.pin_retries)
            }
        }
    }

    fn sign(&mut self, digest: &[u8]) -> (Vec<u8>, u8, u8) {
        if self.require_pin && !self.pin_verified {
            return (Vec::new(), 0x69, 0x82);
        }
        let Some(key) = &self.signing_key else {
            return (Vec::new(), 0x6A, 0x88);
        };
        if digest.len() != 32 {
            return (Vec::new(), 0x6A, 0x80);
        }
        let signature: p256::ecdsa::Signature = key.sign_prehash(digest).unwrap();
        (signature.to_bytes().to_vec(), 0x90, 0x00)
    }

    fn respond(&mut self, payload: Vec<u8>, sw1: u8, sw2: u8) -> Bytes {
        if payload.len() <= self.chunk_size {
            let mut out = payload;
            out.extend_from_slice(&[sw1, sw2]);
            return Bytes::from(out);
        }
        let mut first = payload;
        let rest = first.split_off(self.chunk_size);
        let remaining = chain_length(rest.len());
        self.pending = Some(rest);
        first.extend_from_slice(&[0x61, remaining]);
        Bytes::from(first)
    }

    fn get_response(&mut self, le: Option<u8>) -> Bytes {
        let Some(mut pending) = self.pending.take() else {
            return status(0x69, 0x85);
        };
        let wanted = match le {
            Some(0) | None => 256,
            Some(le) => usize::from(le),
        };
        let take = wanted.min(self.chunk_size).min(pending.len());
        let rest = pending.split_off(take);
        let mut out = pending;
        if rest.is_empty() {
            out.extend_from_slice(&[0x90, 0x00]);
        } else {
            out.extend_from_slice(&[0x61, chain_length(rest.len())]);
            self.pending = Some(rest);
        }
        Bytes::from(out)
    }
}

const fn chain_length(len: usize) -> u8 {
    if len > 0xFF { 0x00 } else { len as u8 }
}

fn status(sw1: u8, sw2: u8) -> Bytes {
    Bytes::from(vec![sw1, sw2])
}

/// Encode one BER-TLV object with a single byte tag
pub fn tlv(tag: &[u8], value: &[u8]) -> Vec<u8> {
    let mut out = tag.to_vec();
    match value.len() {
        len @ 0..=0x7F => out.push(len as u8),
        len @ 0x80..=0xFF => out.extend_from_slice(&[0x81, len as u8]),
        len => out.extend_from_slice(&[0x82, (len >> 8) as u8, len as u8]),
    }
    out.extend_from_slice(value);
    out
}

/// `6E` with the AID and ECDSA P-256 attributes for the signing key
pub fn application_related_data() -> Vec<u8> {
    let mut c1 = vec![0x13];
    c1.extend_from_slice(&P256_OID);
    let discretionary = tlv(&[0x73], &tlv(&[0xC1], &c1));

    let mut body = tlv(&[0x4F], &AID);
    body.extend_from_slice(&discretionary);
    tlv(&[0x6E], &body)
}

/// `7F49` holding an ECC point
pub fn public_key_template(point: &[u8]) -> Vec<u8> {
    tlv(&[0x7F, 0x49], &tlv(&[0x86], point))
}

/// Transport over a [`VirtualCard`]
#[derive(Debug)]
pub struct VirtualTransport {
    card: VirtualCard,
}

impl CardTransport for VirtualTransport {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        self.card.transmit(command)
    }

    fn atr(&self) -> Result<Bytes, TransportError> {
        let state = self.card.state.lock();
        if state.removed {
            return Err(TransportError::CardRemoved);
        }
        Ok(Bytes::from(state.atr.clone()))
    }
}

impl Drop for VirtualTransport {
    fn drop(&mut self) {
        // Disconnecting resets the card, as the PC/SC backend does
        let mut state = self.card.state.lock();
        state.pin_verified = false;
        state.pending = None;
    }
}

/// Backend over a fixed set of virtual cards
#[derive(Debug, Default)]
pub struct MockBackend {
    cards: Vec<(CardId, VirtualCard)>,
    unavailable: bool,
}

impl MockBackend {
    /// Backend with one default card under [`CARD_ID`]
    pub fn single() -> (Self, VirtualCard) {
        let card = VirtualCard::new();
        (Self::with_card(CARD_ID, card.clone()), card)
    }

    pub fn with_card(id: &str, card: VirtualCard) -> Self {
        Self {
            cards: vec![(CardId::from(id), card)],
            unavailable: false,
        }
    }

    pub fn and_card(mut self, id: &str, card: VirtualCard) -> Self {
        self.cards.push((CardId::from(id), card));
        self
    }

    /// Reader subsystem that is not running
    pub fn unavailable() -> Self {
        Self {
            cards: Vec::new(),
            unavailable: true,
        }
    }
}

impl CardBackend for MockBackend {
    type Transport = VirtualTransport;

    fn list_card_ids(&self) -> Result<Vec<CardId>, TransportError> {
        if self.unavailable {
            return Err(TransportError::ServiceUnavailable);
        }
        Ok(self
            .cards
            .iter()
            .filter(|(_, card)| !card.is_removed())
            .map(|(id, _)| id.clone())
            .collect())
    }

    fn connect(&self, id: &CardId) -> Result<Self::Transport, TransportError> {
        let Some((_, card)) = self.cards.iter().find(|(card_id, _)| card_id == id) else {
            return Err(TransportError::ReaderNotFound(id.to_string()));
        };
        if card.is_removed() {
            return Err(TransportError::NoCard(id.to_string()));
        }
        if card.state.lock().held_elsewhere {
            return Err(TransportError::Busy(id.to_string()));
        }
        Ok(VirtualTransport { card: card.clone() })
    }
}

/// Install a test subscriber once, honouring `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
