use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use once_cell::sync::Lazy;
use ring::digest::{Context, SHA256};
use secp256k1::ecdsa::Signature;
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};

use crate::error::{LedgerError, Result};

/// Length of an address: hex of the raw 64-byte X||Y public key point
pub const ADDRESS_HEX_LEN: usize = 128;

/// Tag byte of an uncompressed SEC1 point. Addresses are stored without it.
const UNCOMPRESSED_TAG: u8 = 0x04;

static SECP: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

pub fn sha256_digest(data: &[u8]) -> Vec<u8> {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    digest.as_ref().to_vec()
}

pub fn sha256_hex(data: &[u8]) -> String {
    HEXLOWER.encode(&sha256_digest(data))
}

/// Generate a fresh raw 32-byte secp256k1 private key
pub fn generate_private_key() -> [u8; 32] {
    let secret_key = SecretKey::new(&mut rand::thread_rng());
    secret_key.secret_bytes()
}

fn parse_secret_key(private_key: &[u8]) -> Result<SecretKey> {
    SecretKey::from_slice(private_key)
        .map_err(|e| LedgerError::Crypto(format!("Invalid secp256k1 private key: {e}")))
}

/// Hex address of the public key belonging to `private_key`
pub fn derive_public_address(private_key: &[u8]) -> Result<String> {
    let secret_key = parse_secret_key(private_key)?;
    let public_key = PublicKey::from_secret_key(&*SECP, &secret_key);
    let uncompressed = public_key.serialize_uncompressed();
    // drop the 0x04 tag, only X||Y goes into the address
    Ok(HEXLOWER.encode(&uncompressed[1..]))
}

/// An address is exactly 128 hex characters
pub fn is_valid_address(address: &str) -> bool {
    address.len() == ADDRESS_HEX_LEN && address.bytes().all(|b| b.is_ascii_hexdigit())
}

fn decode_address(address: &str) -> Option<PublicKey> {
    if !is_valid_address(address) {
        return None;
    }
    let raw = HEXLOWER_PERMISSIVE.decode(address.as_bytes()).ok()?;
    let mut point = Vec::with_capacity(raw.len() + 1);
    point.push(UNCOMPRESSED_TAG);
    point.extend_from_slice(&raw);
    PublicKey::from_slice(&point).ok()
}

fn message_digest(message: &[u8]) -> Result<Message> {
    Message::from_digest_slice(&sha256_digest(message))
        .map_err(|e| LedgerError::Crypto(format!("Failed to build message digest: {e}")))
}

/// Sign `message` and return the hex of the 64-byte compact signature.
///
/// The signed digest is SHA-256 of `message` (for inputs, the UTF-8 transaction
/// id). Signatures are deterministic (RFC 6979) and low-S.
pub fn secp256k1_sign(message: &[u8], private_key: &[u8]) -> Result<String> {
    let secret_key = parse_secret_key(private_key)?;
    let digest = message_digest(message)?;
    let signature = SECP.sign_ecdsa(&digest, &secret_key);
    Ok(HEXLOWER.encode(&signature.serialize_compact()))
}

/// Verify a hex signature over `message` against a hex address.
/// Both low-S and high-S forms of a signature are accepted. Any decoding
/// problem is reported as a failed verification.
pub fn secp256k1_verify(message: &[u8], signature: &str, address: &str) -> bool {
    let public_key = match decode_address(address) {
        Some(key) => key,
        None => {
            log::debug!("Cannot decode address into a secp256k1 public key: {address}");
            return false;
        }
    };
    let mut signature = match HEXLOWER_PERMISSIVE
        .decode(signature.as_bytes())
        .ok()
        .and_then(|raw| Signature::from_compact(&raw).ok())
    {
        Some(sig) => sig,
        None => return false,
    };
    // libsecp256k1 only verifies the low-S form
    signature.normalize_s();
    let digest = match message_digest(message) {
        Ok(digest) => digest,
        Err(_) => return false,
    };
    SECP.verify_ecdsa(&digest, &signature, &public_key).is_ok()
}
