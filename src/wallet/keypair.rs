use crate::error::{LedgerError, Result};
use crate::utils::{
    base58_decode, base58_encode, decode_big_uints, ecdsa_sign, ecdsa_verify, encode_big_uints,
    left_pad, natural_bytes, new_key_material, uncompressed_point,
};
use crate::wallet::Curve;
use log::info;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use zeroize::{ZeroizeOnDrop, Zeroizing};

// A leading value more than one byte short of the stride cannot be split back
// out of its blob, so such draws are discarded. Each happens with p = 2^-16.
const MAX_DRAWS: usize = 8;

/// An ECDSA key pair held only in its text-encoded form.
///
/// `public` is base58 over `encode(field_size, [X, Y])`, `private` is base58
/// over `encode(field_size, [D])`. Neither field is ever logged.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, ZeroizeOnDrop)]
pub struct Keypair {
    public: String,
    private: String,
    #[serde(default)]
    #[zeroize(skip)]
    curve: Curve,
}

impl Keypair {
    /// Generate a fresh key pair on `curve` using the system random source
    pub fn generate(curve: Curve) -> Result<Keypair> {
        let stride = curve.field_size();
        for _ in 0..MAX_DRAWS {
            let material = new_key_material(curve)?;
            let x = BigUint::from_bytes_be(&material.x);
            if !splits_cleanly(&x, stride) {
                continue;
            }
            let y = BigUint::from_bytes_be(&material.y);
            let d = BigUint::from_bytes_be(&material.scalar);

            let public = base58_encode(&encode_big_uints(stride, &[x, y]));
            let private_blob = Zeroizing::new(encode_big_uints(stride, &[d]));
            let private = base58_encode(&private_blob);

            info!("Generated new {curve} key pair");
            return Ok(Keypair {
                public,
                private,
                curve,
            });
        }
        Err(LedgerError::KeyGen(format!(
            "No encodable {curve} key pair after {MAX_DRAWS} draws"
        )))
    }

    /// Sign `hash` and return the base58 text of `encode(field_size, [r, s])`.
    ///
    /// The hash is used as the ECDSA message, so the curve's own digest is
    /// applied on top of it. Every call draws a fresh nonce.
    pub fn sign(&self, hash: &[u8]) -> Result<String> {
        let stride = self.curve.field_size();
        let scalar = self.private_scalar()?;
        let point = self.public_point()?;

        for _ in 0..MAX_DRAWS {
            let signature = ecdsa_sign(self.curve, &scalar, &point, hash)?;
            let r = BigUint::from_bytes_be(&signature[..stride]);
            let s = BigUint::from_bytes_be(&signature[stride..]);
            if !splits_cleanly(&r, stride) {
                continue;
            }
            return Ok(base58_encode(&encode_big_uints(stride, &[r, s])));
        }
        Err(LedgerError::Sign(format!(
            "No encodable signature after {MAX_DRAWS} draws"
        )))
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn public_key(&self) -> &str {
        self.public.as_str()
    }

    pub fn private_key(&self) -> &str {
        self.private.as_str()
    }

    /// Uncompressed SEC1 encoding of the public point, for curve-standard verification
    pub fn public_point(&self) -> Result<Vec<u8>> {
        let (x, y) = decode_public(self.curve, &self.public)?;
        Ok(uncompressed_point(self.curve, &x, &y))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load a key pair from JSON, rejecting fields that do not decode on its curve
    pub fn from_json(json: &str) -> Result<Keypair> {
        let keypair: Keypair = serde_json::from_str(json)?;
        keypair.public_point()?;
        keypair.private_scalar()?;
        Ok(keypair)
    }

    fn private_scalar(&self) -> Result<Zeroizing<Vec<u8>>> {
        let blob = Zeroizing::new(base58_decode(&self.private)?);
        let values = decode_values(&blob, 1)?;
        let bytes = Zeroizing::new(natural_bytes(&values[0]));
        checked_width(self.curve, &bytes, "private scalar")?;
        Ok(Zeroizing::new(left_pad(&bytes, self.curve.field_size())))
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("curve", &self.curve)
            .field("public", &self.public)
            .field("private", &"<redacted>")
            .finish()
    }
}

/// Check an encoded signature over `hash` against an encoded public key.
///
/// Malformed text is an error; a well-formed signature that does not match
/// is `Ok(false)`.
pub fn verify_signature(curve: Curve, public: &str, hash: &[u8], signature: &str) -> Result<bool> {
    let (x, y) = decode_public(curve, public)?;
    let point = uncompressed_point(curve, &x, &y);

    let blob = base58_decode(signature)?;
    let values = decode_values(&blob, 2)?;
    let mut fixed = Vec::with_capacity(2 * curve.field_size());
    for (value, name) in values.iter().zip(["r", "s"]) {
        let bytes = natural_bytes(value);
        checked_width(curve, &bytes, name)?;
        fixed.extend(left_pad(&bytes, curve.field_size()));
    }

    Ok(ecdsa_verify(curve, &point, &fixed, hash))
}

fn decode_public(curve: Curve, public: &str) -> Result<(Vec<u8>, Vec<u8>)> {
    let blob = base58_decode(public)?;
    let values = decode_values(&blob, 2)?;
    let x = natural_bytes(&values[0]);
    let y = natural_bytes(&values[1]);
    checked_width(curve, &x, "public X")?;
    checked_width(curve, &y, "public Y")?;
    Ok((x, y))
}

fn decode_values(blob: &[u8], parts: usize) -> Result<Vec<BigUint>> {
    decode_big_uints(blob, parts).map_err(|e| LedgerError::Decode(e.to_string()))
}

fn checked_width(curve: Curve, bytes: &[u8], name: &str) -> Result<()> {
    if bytes.len() > curve.field_size() {
        return Err(LedgerError::Decode(format!(
            "{name} is {} bytes, wider than the {curve} field",
            bytes.len()
        )));
    }
    Ok(())
}

fn splits_cleanly(leading: &BigUint, stride: usize) -> bool {
    natural_bytes(leading).len() + 1 >= stride
}
