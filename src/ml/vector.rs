use crate::schema::{FieldSpec, FEATURE_COUNT, FEATURE_SCHEMA};
use crate::validation::ValidatedRecord;
use serde::Serialize;
use thiserror::Error;

/// A single raw feature value, before any model-side encoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Categorical(String),
    Numeric(i64),
}

/// The 21 raw features of one record, in model column order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureVector {
    values: Vec<FeatureValue>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[FeatureValue] {
        &self.values
    }

    /// Pairs each value with its column spec
    pub fn columns(&self) -> impl Iterator<Item = (&'static FieldSpec, &FeatureValue)> {
        FEATURE_SCHEMA.iter().zip(self.values.iter())
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.columns()
            .find(|(spec, _)| spec.name == column)
            .map(|(_, value)| value)
    }
}

/// A validated record that does not satisfy the schema. Indicates a
/// validator bug, never a caller error.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("internal contract violation on `{field}`: {reason}")]
pub struct ContractViolation {
    pub field: &'static str,
    pub reason: String,
}

/// Project a validated record into the fixed column order.
///
/// Values are selected and reordered only; encoding categories is the
/// model's concern.
pub fn vectorize(record: &ValidatedRecord) -> Result<FeatureVector, ContractViolation> {
    let mut values = Vec::with_capacity(FEATURE_COUNT);

    for spec in FEATURE_SCHEMA.iter() {
        let value = select(record, spec.name).ok_or_else(|| ContractViolation {
            field: spec.name,
            reason: "column has no counterpart on the incident record".to_string(),
        })?;

        match (&value, spec.is_categorical()) {
            (FeatureValue::Categorical(_), true) => {}
            (FeatureValue::Numeric(n), false) if spec.admits(*n) => {}
            (FeatureValue::Numeric(n), false) => {
                return Err(ContractViolation {
                    field: spec.name,
                    reason: format!("value {} escaped validation", n),
                })
            }
            _ => {
                return Err(ContractViolation {
                    field: spec.name,
                    reason: "value kind does not match the schema".to_string(),
                })
            }
        }

        values.push(value);
    }

    Ok(FeatureVector { values })
}

fn select(record: &ValidatedRecord, column: &str) -> Option<FeatureValue> {
    use FeatureValue::{Categorical, Numeric};

    let value = match column {
        "neighborhood" => Categorical(record.neighborhood.clone()),
        "animal_type" => Categorical(record.animal_type.clone()),
        "age_group" => Categorical(record.age_group.clone()),
        "behavior" => Categorical(record.behavior.clone()),
        "mobility" => Categorical(record.mobility.clone()),
        "traffic_risk" => Categorical(record.traffic_risk.clone()),
        "weather" => Categorical(record.weather.clone()),
        "report_channel" => Categorical(record.report_channel.clone()),
        "visible_injury" => Categorical(record.visible_injury.clone()),
        "animal_count" => Numeric(record.animal_count.into()),
        "near_traffic" => Numeric(record.near_traffic.into()),
        "near_school" => Numeric(record.near_school.into()),
        "very_thin" => Numeric(record.very_thin.into()),
        "bleeding" => Numeric(record.bleeding.into()),
        "open_wound" => Numeric(record.open_wound.into()),
        "pregnant_or_nursing" => Numeric(record.pregnant_or_nursing.into()),
        "has_collar" => Numeric(record.has_collar.into()),
        "reporter_confidence" => Numeric(record.reporter_confidence.into()),
        "report_hour" => Numeric(record.report_hour.into()),
        "report_dayofweek" => Numeric(record.report_dayofweek.into()),
        "report_month" => Numeric(record.report_month.into()),
        _ => return None,
    };

    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IncidentRecord, Preset};
    use crate::schema::feature_columns;
    use crate::validation::validate;

    fn validated(preset: Preset) -> ValidatedRecord {
        validate(&serde_json::to_value(IncidentRecord::preset(preset)).unwrap()).unwrap()
    }

    #[test]
    fn test_vector_order_and_length() {
        let vector = vectorize(&validated(Preset::Low)).unwrap();

        assert_eq!(vector.len(), FEATURE_COUNT);
        let columns: Vec<&str> = vector.columns().map(|(spec, _)| spec.name).collect();
        assert_eq!(columns, feature_columns().collect::<Vec<_>>());

        assert_eq!(
            vector.values()[0],
            FeatureValue::Categorical("Kombinat".to_string())
        );
        assert_eq!(vector.values()[9], FeatureValue::Numeric(1)); // animal_count
        assert_eq!(vector.values()[16], FeatureValue::Numeric(1)); // has_collar
        assert_eq!(vector.values()[20], FeatureValue::Numeric(5)); // report_month
    }

    #[test]
    fn test_values_are_not_transformed() {
        let vector = vectorize(&validated(Preset::High)).unwrap();

        assert_eq!(
            vector.get("weather"),
            Some(&FeatureValue::Categorical("Heatwave".to_string()))
        );
        assert_eq!(vector.get("report_hour"), Some(&FeatureValue::Numeric(21)));
        assert!(vector.get("colour").is_none());
    }

    #[test]
    fn test_vectorize_is_stable() {
        let record = validated(Preset::Medium);
        assert_eq!(vectorize(&record).unwrap(), vectorize(&record).unwrap());
    }

    #[test]
    fn test_serializes_as_plain_values() {
        let vector = vectorize(&validated(Preset::Low)).unwrap();
        let value = serde_json::to_value(&vector).unwrap();
        assert_eq!(value["values"][1], "Cat");
        assert_eq!(value["values"][17], 3);
    }
}
