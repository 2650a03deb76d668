//! Lists OpenPGP cards, prints the public key of the first one and optionally signs

use clap::Parser;
use sha2::{Digest, Sha256};
use smartcard_session::{AlgorithmId, CardId, CardManager, KeySlot, PcscBackend, SessionConfig};
use tracing::info;

#[derive(Parser)]
#[command(version, about = "Read the public key of an OpenPGP card and sign a digest")]
struct Cli {
    /// Reader to use (defaults to the first one holding a card)
    #[arg(short, long)]
    reader: Option<String>,

    /// Key slot: signing or authentication
    #[arg(short, long, default_value = "signing")]
    slot: KeySlot,

    /// Signature algorithm, e.g. ECDSA-SHA256 or RSA-SHA256
    #[arg(short, long, default_value = "ECDSA-SHA256")]
    algorithm: AlgorithmId,

    /// Hex encoded digest to sign
    #[arg(long, conflicts_with = "message")]
    digest: Option<String>,

    /// Message to hash with SHA-256 and sign
    #[arg(long)]
    message: Option<String>,

    /// PW1 to verify before signing
    #[arg(long)]
    pin: Option<String>,

    /// Debug output
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(true)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = SessionConfig::default().with_key_slot(cli.slot);
    let manager = CardManager::with_config(PcscBackend::new()?, config);

    let ids = manager.list_ids()?;
    info!("Found {} card(s)", ids.len());
    for id in &ids {
        println!("{id}");
    }

    let id = match cli.reader {
        Some(reader) => CardId::from(reader),
        None => match ids.into_iter().next() {
            Some(id) => id,
            None => return Ok(()),
        },
    };

    let session = manager.open(&id)?;
    println!("Card: {}", session.application_id().ident());
    println!("{}", session.public_key()?.to_openssh()?);

    let digest = match (cli.digest, cli.message) {
        (Some(digest), _) => hex::decode(digest)?,
        (None, Some(message)) => Sha256::digest(message.as_bytes()).to_vec(),
        (None, None) => return Ok(()),
    };

    if let Some(pin) = cli.pin {
        session.verify_pin(pin.as_bytes())?;
    }
    let signature = session.sign(cli.algorithm, &digest)?;
    println!("{}", hex::encode(signature.as_bytes()));

    session.close();
    Ok(())
}
