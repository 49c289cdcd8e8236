//! Declarative per-field rules.
//!
//! A dataset's cleanup is a list of [`FieldPolicy`] values applied in order to
//! each record. A policy can mark a field as required (records without it are
//! dropped), fill it when missing, transform its value, or compute it from
//! another field. Later policies see the output of earlier ones.

use chrono::NaiveDate;
use deal_etl_catalog::{LinkIdError, RawRecord};
use serde_json::Value;

/// Inputs a rule may depend on besides the value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleContext {
    /// The date offer countdown text is resolved against.
    pub today: NaiveDate,
}

/// A value rule. Only link parsing can fail.
pub type Transform = fn(&Value, &RuleContext) -> Result<Value, LinkIdError>;

/// What to put in a missing field.
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    /// A fixed placeholder string.
    Text(&'static str),
    /// Derived from another field of the same record.
    From {
        source: &'static str,
        derive: Transform,
    },
}

/// The rule set for one field.
#[derive(Debug, Clone, Copy)]
pub struct FieldPolicy {
    pub field: &'static str,
    /// Records where the field is missing or null are dropped.
    pub required: bool,
    pub default: Option<DefaultValue>,
    /// Applied to the (possibly defaulted) value when the field is present.
    pub transform: Option<Transform>,
    /// When set, the field is always recomputed from this source field with
    /// `transform`, replacing whatever the record held.
    pub computed_from: Option<&'static str>,
}

impl FieldPolicy {
    pub const fn new(field: &'static str) -> Self {
        Self {
            field,
            required: false,
            default: None,
            transform: None,
            computed_from: None,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn default_text(mut self, text: &'static str) -> Self {
        self.default = Some(DefaultValue::Text(text));
        self
    }

    pub const fn default_from(mut self, source: &'static str, derive: Transform) -> Self {
        self.default = Some(DefaultValue::From { source, derive });
        self
    }

    pub const fn transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub const fn computed_from(mut self, source: &'static str, transform: Transform) -> Self {
        self.computed_from = Some(source);
        self.transform = Some(transform);
        self
    }
}

/// Replace spaces in a field name with underscores.
pub fn canonical_field_name(name: &str) -> String {
    name.replace(' ', "_")
}

/// Rebuild a record with canonical field names.
pub fn canonicalize_fields(record: RawRecord) -> RawRecord {
    record
        .into_iter()
        .map(|(key, value)| (canonical_field_name(&key), value))
        .collect()
}

fn is_missing(record: &RawRecord, field: &str) -> bool {
    record.get(field).is_none_or(Value::is_null)
}

/// Apply `policies` to one record.
///
/// Returns `Ok(None)` when a required field is missing. The record is taken
/// by value, so callers always get a fresh record back.
pub fn apply_policies(
    mut record: RawRecord,
    policies: &[FieldPolicy],
    ctx: &RuleContext,
) -> Result<Option<RawRecord>, LinkIdError> {
    for policy in policies {
        if let (Some(source), Some(transform)) = (policy.computed_from, policy.transform) {
            let input = record.get(source).cloned().unwrap_or(Value::Null);
            let value = transform(&input, ctx)?;
            record.insert(policy.field.to_string(), value);
            continue;
        }

        if is_missing(&record, policy.field) {
            if policy.required {
                return Ok(None);
            }
            match policy.default {
                Some(DefaultValue::Text(text)) => {
                    record.insert(policy.field.to_string(), Value::from(text));
                }
                Some(DefaultValue::From { source, derive }) => {
                    let input = record.get(source).cloned().unwrap_or(Value::Null);
                    let value = derive(&input, ctx)?;
                    record.insert(policy.field.to_string(), value);
                }
                None => {}
            }
        }

        if let Some(transform) = policy.transform
            && let Some(current) = record.get(policy.field)
        {
            let value = transform(current, ctx)?;
            record.insert(policy.field.to_string(), value);
        }
    }
    Ok(Some(record))
}
