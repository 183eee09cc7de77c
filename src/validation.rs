//! Request validation against the feature schema.
//!
//! Validation is pure: it inspects the raw JSON body, reports every violated
//! constraint in schema order, and only yields a [`ValidatedRecord`] when the
//! body satisfies all of them. Categorical values are accepted as any string;
//! whether a category is known is decided by the model's encoder.
use crate::models::IncidentRecord;
use crate::schema::{self, FieldSpec};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::fmt;
use std::ops::Deref;
use thiserror::Error;

/// A single violated constraint
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "constraint", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("field `{field}` is required")]
    MissingField { field: &'static str },

    #[error("field `{field}` must be {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field `{field}` must be between {min} and {max}, got {got}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        got: Number,
    },
}

impl ValidationError {
    /// Offending field, if the error is tied to one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::NotAnObject => None,
            ValidationError::MissingField { field }
            | ValidationError::TypeMismatch { field, .. }
            | ValidationError::OutOfRange { field, .. } => Some(field),
        }
    }
}

/// Every violation found in one request body, in schema order
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.0
    }

    pub fn first(&self) -> Option<&ValidationError> {
        self.0.first()
    }

    /// Violations reported against `field`
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.0.iter().filter(move |e| e.field() == Some(field))
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(err: ValidationError) -> Self {
        ValidationErrors(vec![err])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// An incident record that passed validation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecord(IncidentRecord);

impl ValidatedRecord {
    pub fn into_inner(self) -> IncidentRecord {
        self.0
    }
}

impl Deref for ValidatedRecord {
    type Target = IncidentRecord;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Canonicalize a binary signal.
///
/// Only 0 and 1 are accepted; anything else is out of range. Clients must not
/// coerce other values to 1 and treat the result as validated.
pub fn canonical_flag(field: &'static str, value: i64) -> Result<u8, ValidationError> {
    match value {
        0 => Ok(0),
        1 => Ok(1),
        other => Err(ValidationError::OutOfRange {
            field,
            min: 0,
            max: 1,
            got: Number::from(other),
        }),
    }
}

/// Validate a raw request body into an incident record
pub fn validate(raw: &Value) -> Result<ValidatedRecord, ValidationErrors> {
    let body = raw.as_object().ok_or(ValidationError::NotAnObject)?;
    let mut reader = FieldReader::new(body);

    // Read in schema order so errors come out in column order.
    let record = IncidentRecord {
        neighborhood: reader.text(&schema::NEIGHBORHOOD),
        animal_type: reader.text(&schema::ANIMAL_TYPE),
        age_group: reader.text(&schema::AGE_GROUP),
        behavior: reader.text(&schema::BEHAVIOR),
        mobility: reader.text(&schema::MOBILITY),
        traffic_risk: reader.text(&schema::TRAFFIC_RISK),
        weather: reader.text(&schema::WEATHER),
        report_channel: reader.text(&schema::REPORT_CHANNEL),
        visible_injury: reader.text(&schema::VISIBLE_INJURY),
        animal_count: reader.bounded(&schema::ANIMAL_COUNT),
        near_traffic: reader.flag(&schema::NEAR_TRAFFIC),
        near_school: reader.flag(&schema::NEAR_SCHOOL),
        very_thin: reader.flag(&schema::VERY_THIN),
        bleeding: reader.flag(&schema::BLEEDING),
        open_wound: reader.flag(&schema::OPEN_WOUND),
        pregnant_or_nursing: reader.flag(&schema::PREGNANT_OR_NURSING),
        has_collar: reader.flag(&schema::HAS_COLLAR),
        reporter_confidence: reader.bounded(&schema::REPORTER_CONFIDENCE),
        report_hour: reader.bounded(&schema::REPORT_HOUR),
        report_dayofweek: reader.bounded(&schema::REPORT_DAYOFWEEK),
        report_month: reader.bounded(&schema::REPORT_MONTH),
    };

    reader.finish()?;
    Ok(ValidatedRecord(record))
}

/// Pulls typed fields out of a JSON object, accumulating violations.
/// Placeholders are returned for failed fields; the record is discarded
/// whenever any violation was recorded.
struct FieldReader<'a> {
    body: &'a Map<String, Value>,
    errors: Vec<ValidationError>,
}

impl<'a> FieldReader<'a> {
    fn new(body: &'a Map<String, Value>) -> Self {
        Self {
            body,
            errors: Vec::new(),
        }
    }

    fn present(&mut self, spec: &FieldSpec) -> Option<&'a Value> {
        match self.body.get(spec.name) {
            None | Some(Value::Null) => {
                self.errors
                    .push(ValidationError::MissingField { field: spec.name });
                None
            }
            Some(value) => Some(value),
        }
    }

    fn text(&mut self, spec: &FieldSpec) -> String {
        match self.present(spec) {
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                self.errors.push(ValidationError::TypeMismatch {
                    field: spec.name,
                    expected: "a string",
                });
                String::new()
            }
            None => String::new(),
        }
    }

    fn integer(&mut self, spec: &FieldSpec) -> Option<i64> {
        let number = match self.present(spec)? {
            Value::Number(n) => n,
            _ => {
                self.errors.push(ValidationError::TypeMismatch {
                    field: spec.name,
                    expected: "an integer",
                });
                return None;
            }
        };

        match integral(number) {
            Integral::Exact(value) => Some(value),
            Integral::TooLarge => {
                if let Some((min, max)) = spec.bounds() {
                    self.errors.push(ValidationError::OutOfRange {
                        field: spec.name,
                        min,
                        max,
                        got: number.clone(),
                    });
                }
                None
            }
            Integral::Fractional => {
                self.errors.push(ValidationError::TypeMismatch {
                    field: spec.name,
                    expected: "an integer",
                });
                None
            }
        }
    }

    fn bounded(&mut self, spec: &FieldSpec) -> u8 {
        let Some(value) = self.integer(spec) else {
            return 0;
        };
        let Some((min, max)) = spec.bounds() else {
            return 0;
        };

        if !spec.admits(value) {
            self.errors.push(ValidationError::OutOfRange {
                field: spec.name,
                min,
                max,
                got: Number::from(value),
            });
            return 0;
        }

        u8::try_from(value).unwrap_or_default()
    }

    fn flag(&mut self, spec: &FieldSpec) -> u8 {
        let Some(value) = self.integer(spec) else {
            return 0;
        };

        canonical_flag(spec.name, value).unwrap_or_else(|err| {
            self.errors.push(err);
            0
        })
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

enum Integral {
    Exact(i64),
    TooLarge,
    Fractional,
}

/// Integers arrive either as JSON integers or as floats with no fractional
/// part (`3.0`); anything else is a type error.
fn integral(number: &Number) -> Integral {
    if let Some(value) = number.as_i64() {
        return Integral::Exact(value);
    }
    if number.is_u64() {
        return Integral::TooLarge;
    }

    match number.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => {
            if f.abs() < i64::MAX as f64 {
                Integral::Exact(f as i64)
            } else {
                Integral::TooLarge
            }
        }
        _ => Integral::Fractional,
    }
}
