use crate::error::FieldError;

/// Arbitrary data that can be represented in a binary format.
///
/// Encoding is expected to be a pure function of the value: buckets may call
/// [`Field::encode`] once on insertion and rely on the result from then on.
pub trait Field {
    fn encode(&self) -> Result<Vec<u8>, FieldError>;
}

/// A [`Field`] carrying a label (usually a token id), for buckets that are
/// searched by label on-chain.
pub trait LabelledField: Field {
    fn label(&self) -> u16;
}

impl<F: Field + ?Sized> Field for &F {
    fn encode(&self) -> Result<Vec<u8>, FieldError> {
        (**self).encode()
    }
}

impl<F: LabelledField + ?Sized> LabelledField for &F {
    fn label(&self) -> u16 {
        (**self).label()
    }
}

impl Field for [u8] {
    fn encode(&self) -> Result<Vec<u8>, FieldError> {
        Ok(self.to_vec())
    }
}

impl Field for Vec<u8> {
    fn encode(&self) -> Result<Vec<u8>, FieldError> {
        Ok(self.clone())
    }
}

/// UTF-8 text as a [`Field`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringField(pub String);

impl StringField {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StringField {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for StringField {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Field for StringField {
    fn encode(&self) -> Result<Vec<u8>, FieldError> {
        Ok(self.0.as_bytes().to_vec())
    }
}

/// A named run of consecutive fields, such as the values of one trait type.
///
/// Groups are laid out back to back over the buckets of a storage run; see
/// `solidify_pack::sequential_mapping`.
pub trait FieldsGroup {
    fn name(&self) -> &str;
    fn num_fields(&self) -> usize;
}

impl<G: FieldsGroup + ?Sized> FieldsGroup for &G {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn num_fields(&self) -> usize {
        (**self).num_fields()
    }
}
