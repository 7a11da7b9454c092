use super::{Adapter, AdapterArgs};
use crate::{FieldRole, FieldValue, Result};

/// One half of an external-data field: the `<field>_ID` part holding the
/// external key, or the `<field>` part holding its display value.
///
/// An empty native value reads as `None`.
#[derive(Debug)]
pub struct ExternalAdapter {
    role: FieldRole,
}

impl ExternalAdapter {
    pub fn id() -> Self {
        Self {
            role: FieldRole::ExternalId,
        }
    }

    pub fn value() -> Self {
        Self {
            role: FieldRole::ExternalValue,
        }
    }

    /// Name of the native field holding the external key of `field`.
    pub fn id_field(field: &str) -> String {
        format!("{field}_ID")
    }
}

impl Adapter<Option<String>> for ExternalAdapter {
    fn to_property(&self, _args: &AdapterArgs<'_>, value: FieldValue) -> Result<Option<String>> {
        match value {
            FieldValue::Null => Ok(None),
            FieldValue::Text(text) if text.is_empty() => Ok(None),
            value => String::try_from(value).map(Some),
        }
    }

    fn to_field(&self, _args: &AdapterArgs<'_>, value: &Option<String>) -> Result<FieldValue> {
        Ok(match value.as_deref() {
            None | Some("") => FieldValue::Null,
            Some(text) => FieldValue::Text(text.to_string()),
        })
    }

    fn role(&self) -> FieldRole {
        self.role
    }
}
