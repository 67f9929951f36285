use serde::{Deserialize, Serialize};
use solidify_types::{FieldsGroup, StringField};

/// Zero value used when a group does not define its own.
pub const DEFAULT_ZERO_VALUE: &str = "None";

/// Values a group can hold, zero value included, with one-byte codes.
pub const MAX_GROUP_VALUES: usize = 256;

/// A feature type and the values it can take.
///
/// The zero value (a token without this feature) always has code 0; the
/// non-zero values follow in order, starting at code 1.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureGroup {
    /// Name of the type, e.g. `"Background"`.
    #[serde(rename = "type")]
    pub type_name: String,
    pub non_zero_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zero_value: Option<String>,
}

impl FeatureGroup {
    pub fn new(type_name: impl Into<String>, non_zero_values: Vec<String>) -> Self {
        Self {
            type_name: type_name.into(),
            non_zero_values,
            zero_value: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.type_name
    }

    /// Override the zero value (defaults to `"None"`).
    pub fn set_zero_value(&mut self, zero: impl Into<String>) {
        self.zero_value = Some(zero.into());
    }

    pub fn zero_value(&self) -> &str {
        self.zero_value.as_deref().unwrap_or(DEFAULT_ZERO_VALUE)
    }

    /// Number of values including the zero value.
    pub fn num_values(&self) -> usize {
        self.non_zero_values.len() + 1
    }

    /// All values, zero value first.
    pub fn values(&self) -> Vec<&str> {
        std::iter::once(self.zero_value())
            .chain(self.non_zero_values.iter().map(String::as_str))
            .collect()
    }

    /// The non-zero values as fields, in code order starting at 1.
    pub fn value_fields(&self) -> Vec<StringField> {
        self.non_zero_values
            .iter()
            .map(|v| StringField::new(v.as_str()))
            .collect()
    }

    /// Code of `value` within this group. `None` for unknown values and for
    /// positions past [`MAX_GROUP_VALUES`].
    pub fn code_of(&self, value: &str) -> Option<u8> {
        self.values()
            .iter()
            .position(|v| *v == value)
            .and_then(|i| u8::try_from(i).ok())
    }
}

/// A group's stored fields are its non-zero values; the zero value is
/// implied by code 0.
impl FieldsGroup for FeatureGroup {
    fn name(&self) -> &str {
        &self.type_name
    }

    fn num_fields(&self) -> usize {
        self.non_zero_values.len()
    }
}
