use crate::ml::error::{InferenceError, ModelLoadError};
use crate::ml::vector::{FeatureValue, FeatureVector};
use crate::schema;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// How an encoder treats categories it was not fit on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    /// Encode as all zeros
    #[default]
    Ignore,
    /// Fail the request
    Error,
}

/// Per-column encoding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ColumnEncoding {
    /// One indicator column per known category
    OneHot {
        categories: Vec<String>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
    },

    /// `(x - mean) / scale`
    Standard {
        #[serde(default)]
        mean: f64,
        #[serde(default = "default_scale")]
        scale: f64,
    },

    /// Numeric value used as-is
    Passthrough,
}

fn default_scale() -> f64 {
    1.0
}

impl ColumnEncoding {
    /// Number of encoded columns this encoding emits
    pub fn width(&self) -> usize {
        match self {
            ColumnEncoding::OneHot { categories, .. } => categories.len(),
            ColumnEncoding::Standard { .. } | ColumnEncoding::Passthrough => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub encoding: ColumnEncoding,
}

/// Column transformer fit alongside an estimator.
///
/// Its input columns are exactly the feature schema, in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnPreprocessor {
    pub columns: Vec<ColumnSpec>,
}

impl ColumnPreprocessor {
    /// Check the column list against the schema and the encodings for sanity
    pub fn check(&self, artifact: &str) -> Result<(), ModelLoadError> {
        let names: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        let expected: Vec<&str> = schema::feature_columns().collect();

        if names != expected {
            return Err(ModelLoadError::invalid(
                artifact,
                format!(
                    "preprocessor columns {:?} do not match the feature schema {:?}",
                    names, expected
                ),
            ));
        }

        for column in &self.columns {
            match &column.encoding {
                ColumnEncoding::OneHot { categories, .. } => {
                    if categories.is_empty() {
                        return Err(ModelLoadError::invalid(
                            artifact,
                            format!("column `{}` has no categories", column.name),
                        ));
                    }
                    let mut seen = std::collections::HashSet::new();
                    if let Some(dup) = categories.iter().find(|c| !seen.insert(c.as_str())) {
                        return Err(ModelLoadError::invalid(
                            artifact,
                            format!("column `{}` repeats category {:?}", column.name, dup),
                        ));
                    }
                }
                ColumnEncoding::Standard { mean, scale } => {
                    if !mean.is_finite() || !scale.is_finite() || *scale == 0.0 {
                        return Err(ModelLoadError::invalid(
                            artifact,
                            format!("column `{}` has an unusable scaler", column.name),
                        ));
                    }
                }
                ColumnEncoding::Passthrough => {}
            }
        }

        Ok(())
    }

    /// Total width of the encoded vector
    pub fn output_width(&self) -> usize {
        self.columns.iter().map(|c| c.encoding.width()).sum()
    }

    /// Encode a raw feature vector into the estimator's input space
    pub fn transform(&self, vector: &FeatureVector) -> Result<Array1<f64>, InferenceError> {
        let mut encoded = Array1::zeros(self.output_width());
        let mut offset = 0;

        for (column, value) in self.columns.iter().zip(vector.values()) {
            match (&column.encoding, value) {
                (ColumnEncoding::OneHot { categories, handle_unknown }, value) => {
                    let key = match value {
                        FeatureValue::Categorical(s) => s.clone(),
                        FeatureValue::Numeric(n) => n.to_string(),
                    };

                    match categories.iter().position(|c| *c == key) {
                        Some(idx) => encoded[offset + idx] = 1.0,
                        None if *handle_unknown == HandleUnknown::Ignore => {}
                        None => {
                            return Err(InferenceError::UnknownCategory {
                                field: column.name.clone(),
                                value: key,
                            })
                        }
                    }
                }
                (ColumnEncoding::Standard { mean, scale }, FeatureValue::Numeric(n)) => {
                    encoded[offset] = (*n as f64 - mean) / scale;
                }
                (ColumnEncoding::Passthrough, FeatureValue::Numeric(n)) => {
                    encoded[offset] = *n as f64;
                }
                (_, FeatureValue::Categorical(_)) => {
                    return Err(InferenceError::FeatureMismatch {
                        field: column.name.clone(),
                        expected: "a numeric value",
                    })
                }
            }

            offset += column.encoding.width();
        }

        Ok(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IncidentRecord, Preset};
    use crate::ml::vector::vectorize;
    use crate::validation::validate;

    fn vector(record: IncidentRecord) -> FeatureVector {
        vectorize(&validate(&serde_json::to_value(record).unwrap()).unwrap()).unwrap()
    }

    fn passthrough_preprocessor() -> ColumnPreprocessor {
        ColumnPreprocessor {
            columns: schema::FEATURE_SCHEMA
                .iter()
                .map(|spec| ColumnSpec {
                    name: spec.name.to_string(),
                    encoding: match spec.name {
                        "animal_type" => ColumnEncoding::OneHot {
                            categories: vec!["Dog".to_string(), "Cat".to_string()],
                            handle_unknown: HandleUnknown::Error,
                        },
                        "report_month" => ColumnEncoding::Standard {
                            mean: 6.5,
                            scale: 3.5,
                        },
                        _ if spec.is_categorical() => ColumnEncoding::OneHot {
                            categories: vec!["Kombinat".to_string()],
                            handle_unknown: HandleUnknown::Ignore,
                        },
                        _ => ColumnEncoding::Passthrough,
                    },
                })
                .collect(),
        }
    }

    #[test]
    fn test_check_accepts_schema_columns() {
        let pre = passthrough_preprocessor();
        assert!(pre.check("test").is_ok());
        // 8 single-category columns + 2 animal types + 12 numerics
        assert_eq!(pre.output_width(), 8 + 2 + 12);
    }

    #[test]
    fn test_check_rejects_reordered_columns() {
        let mut pre = passthrough_preprocessor();
        pre.columns.swap(0, 1);

        let err = pre.check("test").unwrap_err();
        assert!(err.to_string().contains("do not match the feature schema"));
    }

    #[test]
    fn test_check_rejects_zero_scale() {
        let mut pre = passthrough_preprocessor();
        pre.columns[20].encoding = ColumnEncoding::Standard {
            mean: 0.0,
            scale: 0.0,
        };
        assert!(pre.check("test").is_err());
    }

    #[test]
    fn test_transform_encodes_columns() {
        let pre = passthrough_preprocessor();
        let encoded = pre.transform(&vector(IncidentRecord::preset(Preset::Low))).unwrap();

        assert_eq!(encoded.len(), pre.output_width());
        assert_eq!(encoded[0], 1.0); // neighborhood = Kombinat
        assert_eq!(encoded[1], 0.0); // animal_type = Dog
        assert_eq!(encoded[2], 1.0); // animal_type = Cat
        assert_eq!(encoded[3], 0.0); // age_group "Adult" unknown, ignored
        let month = encoded[encoded.len() - 1];
        assert!((month - (5.0 - 6.5) / 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_category_fails_when_configured() {
        let mut record = IncidentRecord::preset(Preset::Low);
        record.animal_type = "Horse".to_string();

        let err = passthrough_preprocessor()
            .transform(&vector(record))
            .unwrap_err();
        assert_eq!(
            err,
            InferenceError::UnknownCategory {
                field: "animal_type".to_string(),
                value: "Horse".to_string(),
            }
        );
    }

    #[test]
    fn test_encoding_deserializes() {
        let json = r#"{"one_hot": {"categories": ["Low", "High"]}}"#;
        let encoding: ColumnEncoding = serde_json::from_str(json).unwrap();
        assert_eq!(
            encoding,
            ColumnEncoding::OneHot {
                categories: vec!["Low".to_string(), "High".to_string()],
                handle_unknown: HandleUnknown::Ignore,
            }
        );

        let encoding: ColumnEncoding = serde_json::from_str(r#""passthrough""#).unwrap();
        assert_eq!(encoding, ColumnEncoding::Passthrough);
    }
}
