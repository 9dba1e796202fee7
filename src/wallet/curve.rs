use crate::error::LedgerError;
use ring::signature::{
    EcdsaSigningAlgorithm, EcdsaVerificationAlgorithm, ECDSA_P256_SHA256_FIXED,
    ECDSA_P256_SHA256_FIXED_SIGNING, ECDSA_P384_SHA384_FIXED, ECDSA_P384_SHA384_FIXED_SIGNING,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named elliptic curve used for key generation and signing.
///
/// The field size doubles as the codec stride for every key and signature
/// produced on the curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Curve {
    #[default]
    P256,
    P384,
}

impl Curve {
    /// Byte width of a coordinate or scalar
    pub fn field_size(&self) -> usize {
        match self {
            Curve::P256 => 32,
            Curve::P384 => 48,
        }
    }

    pub(crate) fn signing_algorithm(&self) -> &'static EcdsaSigningAlgorithm {
        match self {
            Curve::P256 => &ECDSA_P256_SHA256_FIXED_SIGNING,
            Curve::P384 => &ECDSA_P384_SHA384_FIXED_SIGNING,
        }
    }

    pub(crate) fn verification_algorithm(&self) -> &'static EcdsaVerificationAlgorithm {
        match self {
            Curve::P256 => &ECDSA_P256_SHA256_FIXED,
            Curve::P384 => &ECDSA_P384_SHA384_FIXED,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Curve::P256 => write!(f, "P-256"),
            Curve::P384 => write!(f, "P-384"),
        }
    }
}

impl FromStr for Curve {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "").as_str() {
            "p256" | "secp256r1" => Ok(Curve::P256),
            "p384" | "secp384r1" => Ok(Curve::P384),
            _ => Err(LedgerError::Config(format!(
                "Unsupported curve: {s}. Valid options: p256, p384"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_sizes() {
        assert_eq!(Curve::P256.field_size(), 32);
        assert_eq!(Curve::P384.field_size(), 48);
    }

    #[test]
    fn test_parse_curve_names() {
        assert_eq!("p256".parse::<Curve>().unwrap(), Curve::P256);
        assert_eq!("P-256".parse::<Curve>().unwrap(), Curve::P256);
        assert_eq!(" P-384 ".parse::<Curve>().unwrap(), Curve::P384);
        assert_eq!("secp384r1".parse::<Curve>().unwrap(), Curve::P384);
        assert!("p224".parse::<Curve>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for curve in [Curve::P256, Curve::P384] {
            assert_eq!(curve.to_string().parse::<Curve>().unwrap(), curve);
        }
    }

    #[test]
    fn test_default_is_p256() {
        assert_eq!(Curve::default(), Curve::P256);
    }
}
