//! OpenPGP card constants

/// OpenPGP card application identifier (RID + PIX prefix)
pub const OPENPGP_AID: &[u8] = b"\xD2\x76\x00\x01\x24\x01";

/// DigestInfo prefix for SHA-256 in PKCS#1 v1.5 signatures
pub const DIGEST_INFO_SHA256: &[u8] =
    b"\x30\x31\x30\x0d\x06\x09\x60\x86\x48\x01\x65\x03\x04\x02\x01\x05\x00\x04\x20";
/// DigestInfo prefix for SHA-384 in PKCS#1 v1.5 signatures
pub const DIGEST_INFO_SHA384: &[u8] =
    b"\x30\x41\x30\x0d\x06\x09\x60\x86\x48\x01\x65\x03\x04\x02\x02\x05\x00\x04\x30";
/// DigestInfo prefix for SHA-512 in PKCS#1 v1.5 signatures
pub const DIGEST_INFO_SHA512: &[u8] =
    b"\x30\x51\x30\x0d\x06\x09\x60\x86\x48\x01\x65\x03\x04\x02\x03\x05\x00\x04\x40";

/// Shortest PW1 the OpenPGP application accepts
pub const PIN_MIN_LENGTH: usize = 6;
/// Longest PIN that fits the VERIFY data field
pub const PIN_MAX_LENGTH: usize = 127;

/// Instruction bytes of the OpenPGP card commands
pub mod ins {
    /// SELECT
    pub const SELECT: u8 = 0xA4;
    /// GET DATA
    pub const GET_DATA: u8 = 0xCA;
    /// VERIFY
    pub const VERIFY: u8 = 0x20;
    /// GENERATE ASYMMETRIC KEY PAIR, used here only to read public keys
    pub const GENERATE_ASYMMETRIC_KEY_PAIR: u8 = 0x47;
    /// PERFORM SECURITY OPERATION
    pub const PERFORM_SECURITY_OPERATION: u8 = 0x2A;
    /// INTERNAL AUTHENTICATE
    pub const INTERNAL_AUTHENTICATE: u8 = 0x88;
}

/// Data object tags
pub mod tags {
    /// Application related data
    pub const APPLICATION_RELATED_DATA: u8 = 0x6E;
    /// Full application identifier
    pub const APPLICATION_IDENTIFIER: u8 = 0x4F;
    /// Discretionary data objects
    pub const DISCRETIONARY_DATA: u8 = 0x73;
    /// Algorithm attributes, signature key
    pub const ALGORITHM_ATTRIBUTES_SIGNING: u8 = 0xC1;
    /// Algorithm attributes, decryption key
    pub const ALGORITHM_ATTRIBUTES_DECRYPTION: u8 = 0xC2;
    /// Algorithm attributes, authentication key
    pub const ALGORITHM_ATTRIBUTES_AUTHENTICATION: u8 = 0xC3;
    /// PW status bytes
    pub const PW_STATUS: u8 = 0xC4;
    /// Public key template
    pub const PUBLIC_KEY_TEMPLATE: u16 = 0x7F49;
    /// RSA modulus inside the public key template
    pub const RSA_MODULUS: u8 = 0x81;
    /// RSA public exponent inside the public key template
    pub const RSA_EXPONENT: u8 = 0x82;
    /// ECC public point inside the public key template
    pub const ECC_POINT: u8 = 0x86;
}

/// Algorithm identifiers used in algorithm attributes
pub mod algorithm {
    /// RSA
    pub const RSA: u8 = 0x01;
    /// ECDH
    pub const ECDH: u8 = 0x12;
    /// ECDSA
    pub const ECDSA: u8 = 0x13;
    /// EdDSA
    pub const EDDSA: u8 = 0x16;
}
