use std::any::Any;

use crate::error::{FieldError, TypeError};
use crate::field::{Field, LabelledField};

/// Maximum number of feature codes a token may carry: the codes are
/// right-aligned in the 32-byte second half of the leaf preimage.
pub const MAX_FEATURES: usize = 32;

/// A collection token: its id and the enumerated codes of its features.
///
/// `features[i]` is the index of the token's value in the `i`-th feature
/// group, where `0` always means "absent".
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub token_id: u16,
    pub features: Vec<u8>,
}

impl Token {
    pub fn new(token_id: u16, features: Vec<u8>) -> Self {
        Self { token_id, features }
    }

    /// The 64-byte Merkle leaf preimage.
    ///
    /// `| 0..0 (30 bytes) | token id (u16 BE) | 0..0 | features (right-aligned) |`
    pub fn leaf_preimage(&self) -> Result<[u8; 64], TypeError> {
        if self.features.len() > MAX_FEATURES {
            return Err(TypeError::TooManyFeatures {
                token_id: self.token_id,
                actual: self.features.len(),
                max: MAX_FEATURES,
            });
        }

        let mut buf = [0u8; 64];
        buf[30..32].copy_from_slice(&self.token_id.to_be_bytes());
        buf[64 - self.features.len()..].copy_from_slice(&self.features);
        Ok(buf)
    }

    /// Content equality against a value of unknown type.
    pub fn equals_any(&self, other: &dyn Any) -> Result<bool, TypeError> {
        match other.downcast_ref::<Token>() {
            Some(o) => Ok(self == o),
            None => Err(TypeError::Comparison {
                expected: std::any::type_name::<Token>(),
                actual: "non-token value",
            }),
        }
    }
}

/// Tokens are stored as their raw feature codes.
impl Field for Token {
    fn encode(&self) -> Result<Vec<u8>, FieldError> {
        Ok(self.features.clone())
    }
}

impl LabelledField for Token {
    fn label(&self) -> u16 {
        self.token_id
    }
}
