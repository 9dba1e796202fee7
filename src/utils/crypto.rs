use ring::digest::{Context, SHA256};
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, KeyPair, UnparsedPublicKey};

use crate::error::{LedgerError, Result};
use crate::wallet::Curve;
use std::time::{SystemTime, UNIX_EPOCH};

// Uncompressed SEC1 point marker
const UNCOMPRESSED_POINT_TAG: u8 = 0x04;

const DER_SEQUENCE: u8 = 0x30;
const DER_INTEGER: u8 = 0x02;
const DER_OCTET_STRING: u8 = 0x04;

/// Raw key material for one curve: the private scalar and the affine public point.
pub struct RawKeyMaterial {
    pub scalar: zeroize::Zeroizing<Vec<u8>>,
    pub x: Vec<u8>,
    pub y: Vec<u8>,
}

/// Seconds since the Unix epoch, as stored in block and transaction headers
pub fn current_timestamp() -> Result<u32> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LedgerError::InvalidTransaction(format!("System time error: {e}")))?
        .as_secs();

    u32::try_from(secs)
        .map_err(|_| LedgerError::InvalidTransaction("Timestamp overflow".to_string()))
}

pub fn sha256_digest(data: &[u8]) -> Vec<u8> {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    digest.as_ref().to_vec()
}

/// Draw a fresh key pair on `curve` from the system random source
pub fn new_key_material(curve: Curve) -> Result<RawKeyMaterial> {
    let rng = SystemRandom::new();
    let pkcs8 = EcdsaKeyPair::generate_pkcs8(curve.signing_algorithm(), &rng)
        .map_err(|e| LedgerError::KeyGen(format!("Failed to generate ECDSA key pair: {e}")))?;
    let key_pair = EcdsaKeyPair::from_pkcs8(curve.signing_algorithm(), pkcs8.as_ref(), &rng)
        .map_err(|e| LedgerError::KeyGen(format!("Failed to load generated key pair: {e}")))?;

    let scalar = pkcs8_private_scalar(pkcs8.as_ref())
        .filter(|scalar| scalar.len() == curve.field_size())
        .ok_or_else(|| {
            LedgerError::KeyGen("Generated PKCS8 document has no field-size private scalar".to_string())
        })?;
    let (x, y) = split_public_point(curve, key_pair.public_key().as_ref())
        .ok_or_else(|| LedgerError::KeyGen("Generated public point is malformed".to_string()))?;

    Ok(RawKeyMaterial {
        scalar: zeroize::Zeroizing::new(scalar.to_vec()),
        x,
        y,
    })
}

/// Sign `message` with the scalar/point pair, returning the fixed-width `r || s`
pub fn ecdsa_sign(
    curve: Curve,
    scalar: &[u8],
    public_point: &[u8],
    message: &[u8],
) -> Result<Vec<u8>> {
    let rng = SystemRandom::new();
    let key_pair = EcdsaKeyPair::from_private_key_and_public_key(
        curve.signing_algorithm(),
        scalar,
        public_point,
        &rng,
    )
    .map_err(|e| LedgerError::Decode(format!("Stored key material rejected: {e}")))?;
    let signature = key_pair
        .sign(&rng, message)
        .map_err(|e| LedgerError::Sign(format!("Failed to sign message: {e}")))?
        .as_ref()
        .to_vec();
    Ok(signature)
}

pub fn ecdsa_verify(curve: Curve, public_point: &[u8], signature: &[u8], message: &[u8]) -> bool {
    let peer_public_key = UnparsedPublicKey::new(curve.verification_algorithm(), public_point);
    peer_public_key.verify(message, signature).is_ok()
}

/// Build the uncompressed SEC1 encoding `04 || X || Y`
pub fn uncompressed_point(curve: Curve, x: &[u8], y: &[u8]) -> Vec<u8> {
    let width = curve.field_size();
    let mut point = Vec::with_capacity(1 + 2 * width);
    point.push(UNCOMPRESSED_POINT_TAG);
    point.extend(crate::utils::left_pad(x, width));
    point.extend(crate::utils::left_pad(y, width));
    point
}

fn split_public_point(curve: Curve, point: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
    let width = curve.field_size();
    if point.len() != 1 + 2 * width || point[0] != UNCOMPRESSED_POINT_TAG {
        return None;
    }
    Some((point[1..1 + width].to_vec(), point[1 + width..].to_vec()))
}

/// Read one DER element, returning its tag, contents and the remaining input
fn der_next(input: &[u8]) -> Option<(u8, &[u8], &[u8])> {
    let (&tag, rest) = input.split_first()?;
    let (&first, rest) = rest.split_first()?;
    let (length, rest) = if first & 0x80 == 0 {
        (first as usize, rest)
    } else {
        let count = (first & 0x7f) as usize;
        if count == 0 || count > 2 || rest.len() < count {
            return None;
        }
        let length = rest[..count]
            .iter()
            .fold(0usize, |acc, b| (acc << 8) | *b as usize);
        (length, &rest[count..])
    };
    if rest.len() < length {
        return None;
    }
    Some((tag, &rest[..length], &rest[length..]))
}

fn der_expect(input: &[u8], tag: u8) -> Option<(&[u8], &[u8])> {
    let (found, contents, rest) = der_next(input)?;
    (found == tag).then_some((contents, rest))
}

/// Pull the private scalar out of the PKCS#8 v1 document ring generates:
///
/// ```text
/// SEQUENCE {                      -- PrivateKeyInfo
///   INTEGER 0
///   SEQUENCE { OID ecPublicKey, OID curve }
///   OCTET STRING {
///     SEQUENCE {                  -- ECPrivateKey (RFC 5915)
///       INTEGER 1
///       OCTET STRING scalar       -- field-size bytes, big-endian
///       [1] { BIT STRING point }
///     }
///   }
/// }
/// ```
///
/// Any other layout yields `None`, and `new_key_material` also rejects a
/// scalar that is not exactly field-size bytes.
fn pkcs8_private_scalar(pkcs8: &[u8]) -> Option<&[u8]> {
    let (private_key_info, _) = der_expect(pkcs8, DER_SEQUENCE)?;
    let (_, rest) = der_expect(private_key_info, DER_INTEGER)?;
    let (_, rest) = der_expect(rest, DER_SEQUENCE)?;
    let (wrapped, _) = der_expect(rest, DER_OCTET_STRING)?;

    let (ec_private_key, _) = der_expect(wrapped, DER_SEQUENCE)?;
    let (_, rest) = der_expect(ec_private_key, DER_INTEGER)?;
    let (scalar, _) = der_expect(rest, DER_OCTET_STRING)?;
    Some(scalar)
}
