//! Feature vector assembly for the nine-field prediction form
//!
//! One entity lives here: the ordered tuple of nine real numbers fed to the
//! scaler and model. The positional order is fixed and must match the order
//! the artifacts were fitted with; the crate has no way to verify that, so
//! the order is pinned in a single place ([`FIELDS`]) and every consumer
//! (HTML form, JSON API, CLI flags, vector assembly) is generated from it.
//!
//! Categorical fields (fat content, item type, outlet size/location/type)
//! arrive pre-encoded as floats. The encoding scheme is an external contract
//! owned by the training pipeline that produced the artifacts; it is not
//! validated or decoded here.

use serde::{Deserialize, Serialize};

use crate::error::{PredecirError, Result};

/// Number of features in one prediction request
pub const FEATURE_COUNT: usize = 9;

/// Declarative description of one input field: name, UI label, default and
/// the bounds enforced by the input widget.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Wire/flag name (snake_case)
    pub name: &'static str,
    /// Human-readable label for the form
    pub label: &'static str,
    /// Default value shown before the user edits anything
    pub default: f64,
    /// Inclusive lower bound
    pub min: f64,
    /// Inclusive upper bound, if the field has one
    pub max: Option<f64>,
    /// Step/precision hint for the input widget
    pub step: f64,
}

/// The nine fields, in the exact positional order the artifacts expect.
pub const FIELDS: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec {
        name: "item_weight",
        label: "Item weight",
        default: 10.0,
        min: 0.0,
        max: None,
        step: 0.1,
    },
    FieldSpec {
        name: "item_fat_content",
        label: "Item fat content (encoded)",
        default: 0.0,
        min: 0.0,
        max: None,
        step: 0.1,
    },
    FieldSpec {
        name: "item_visibility",
        label: "Item visibility",
        default: 0.05,
        min: 0.0,
        max: None,
        step: 0.0001,
    },
    FieldSpec {
        name: "item_type",
        label: "Item type (encoded)",
        default: 1.0,
        min: 0.0,
        max: None,
        step: 1.0,
    },
    FieldSpec {
        name: "item_mrp",
        label: "Item MRP",
        default: 100.0,
        min: 0.0,
        max: None,
        step: 0.1,
    },
    FieldSpec {
        name: "outlet_establishment_year",
        label: "Outlet establishment year",
        default: 1999.0,
        min: 1900.0,
        max: Some(2100.0),
        step: 1.0,
    },
    FieldSpec {
        name: "outlet_size",
        label: "Outlet size (encoded)",
        default: 1.0,
        min: 0.0,
        max: None,
        step: 1.0,
    },
    FieldSpec {
        name: "outlet_location_type",
        label: "Outlet location type (encoded)",
        default: 1.0,
        min: 0.0,
        max: None,
        step: 1.0,
    },
    FieldSpec {
        name: "outlet_type",
        label: "Outlet type (encoded)",
        default: 1.0,
        min: 0.0,
        max: None,
        step: 1.0,
    },
];

fn default_item_weight() -> f64 {
    FIELDS[0].default
}
fn default_item_fat_content() -> f64 {
    FIELDS[1].default
}
fn default_item_visibility() -> f64 {
    FIELDS[2].default
}
fn default_item_type() -> f64 {
    FIELDS[3].default
}
fn default_item_mrp() -> f64 {
    FIELDS[4].default
}
fn default_outlet_establishment_year() -> f64 {
    FIELDS[5].default
}
fn default_outlet_size() -> f64 {
    FIELDS[6].default
}
fn default_outlet_location_type() -> f64 {
    FIELDS[7].default
}
fn default_outlet_type() -> f64 {
    FIELDS[8].default
}

/// One prediction request: the nine numeric inputs.
///
/// Fields omitted on the wire take the same defaults the form shows.
/// No inter-field consistency checks exist; [`FeatureInput::validate`]
/// enforces per-field bounds only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureInput {
    /// Item weight (non-negative)
    #[serde(default = "default_item_weight")]
    pub item_weight: f64,
    /// Item fat content, pre-encoded category
    #[serde(default = "default_item_fat_content")]
    pub item_fat_content: f64,
    /// Item visibility (non-negative fraction)
    #[serde(default = "default_item_visibility")]
    pub item_visibility: f64,
    /// Item type, pre-encoded category
    #[serde(default = "default_item_type")]
    pub item_type: f64,
    /// Item maximum retail price (non-negative)
    #[serde(default = "default_item_mrp")]
    pub item_mrp: f64,
    /// Outlet establishment year (1900-2100)
    #[serde(default = "default_outlet_establishment_year")]
    pub outlet_establishment_year: f64,
    /// Outlet size, pre-encoded category
    #[serde(default = "default_outlet_size")]
    pub outlet_size: f64,
    /// Outlet location type, pre-encoded category
    #[serde(default = "default_outlet_location_type")]
    pub outlet_location_type: f64,
    /// Outlet type, pre-encoded category
    #[serde(default = "default_outlet_type")]
    pub outlet_type: f64,
}

impl Default for FeatureInput {
    fn default() -> Self {
        Self {
            item_weight: FIELDS[0].default,
            item_fat_content: FIELDS[1].default,
            item_visibility: FIELDS[2].default,
            item_type: FIELDS[3].default,
            item_mrp: FIELDS[4].default,
            outlet_establishment_year: FIELDS[5].default,
            outlet_size: FIELDS[6].default,
            outlet_location_type: FIELDS[7].default,
            outlet_type: FIELDS[8].default,
        }
    }
}

impl FeatureInput {
    /// Assemble the single-row feature vector in the fixed positional order.
    ///
    /// `vector[i]` corresponds to `FIELDS[i]` regardless of the order the
    /// fields were edited or deserialized.
    #[must_use]
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            self.item_weight,
            self.item_fat_content,
            self.item_visibility,
            self.item_type,
            self.item_mrp,
            self.outlet_establishment_year,
            self.outlet_size,
            self.outlet_location_type,
            self.outlet_type,
        ]
    }

    /// Build an input from a vector in the fixed positional order.
    #[must_use]
    pub fn from_vector(v: [f64; FEATURE_COUNT]) -> Self {
        Self {
            item_weight: v[0],
            item_fat_content: v[1],
            item_visibility: v[2],
            item_type: v[3],
            item_mrp: v[4],
            outlet_establishment_year: v[5],
            outlet_size: v[6],
            outlet_location_type: v[7],
            outlet_type: v[8],
        }
    }

    /// Check every field against its declared bounds and reject non-finite
    /// values. Returns the first violation in positional order.
    ///
    /// # Errors
    ///
    /// [`PredecirError::InvalidFeature`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        let values = self.to_vector();
        for (spec, value) in FIELDS.iter().zip(values.iter()) {
            if !value.is_finite() {
                return Err(PredecirError::InvalidFeature {
                    field: spec.name,
                    reason: format!("must be a finite number, got {value}"),
                });
            }
            if *value < spec.min {
                return Err(PredecirError::InvalidFeature {
                    field: spec.name,
                    reason: format!("must be >= {}, got {value}", spec.min),
                });
            }
            if let Some(max) = spec.max {
                if *value > max {
                    return Err(PredecirError::InvalidFeature {
                        field: spec.name,
                        reason: format!("must be <= {max}, got {value}"),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_count_matches_table() {
        assert_eq!(FIELDS.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_defaults_match_table() {
        let input = FeatureInput::default();
        let vector = input.to_vector();
        for (i, spec) in FIELDS.iter().enumerate() {
            assert!(
                (vector[i] - spec.default).abs() < f64::EPSILON,
                "default for {} drifted from the table",
                spec.name
            );
        }
    }

    #[test]
    fn test_vector_positional_order() {
        let input = FeatureInput {
            item_weight: 1.0,
            item_fat_content: 2.0,
            item_visibility: 3.0,
            item_type: 4.0,
            item_mrp: 5.0,
            outlet_establishment_year: 1906.0,
            outlet_size: 7.0,
            outlet_location_type: 8.0,
            outlet_type: 9.0,
        };
        assert_eq!(
            input.to_vector(),
            [1.0, 2.0, 3.0, 4.0, 5.0, 1906.0, 7.0, 8.0, 9.0]
        );
    }

    #[test]
    fn test_vector_roundtrip() {
        let v = [10.0, 0.0, 0.05, 1.0, 100.0, 1999.0, 1.0, 1.0, 1.0];
        assert_eq!(FeatureInput::from_vector(v).to_vector(), v);
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(FeatureInput::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_weight() {
        let input = FeatureInput {
            item_weight: -1.0,
            ..FeatureInput::default()
        };
        let err = input.validate().unwrap_err();
        assert!(matches!(
            err,
            PredecirError::InvalidFeature {
                field: "item_weight",
                ..
            }
        ));
    }

    #[test]
    fn test_validate_rejects_year_out_of_range() {
        let low = FeatureInput {
            outlet_establishment_year: 1899.0,
            ..FeatureInput::default()
        };
        assert!(low.validate().is_err());

        let high = FeatureInput {
            outlet_establishment_year: 2101.0,
            ..FeatureInput::default()
        };
        assert!(high.validate().is_err());

        let boundary = FeatureInput {
            outlet_establishment_year: 2100.0,
            ..FeatureInput::default()
        };
        assert!(boundary.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_nan() {
        let input = FeatureInput {
            item_mrp: f64::NAN,
            ..FeatureInput::default()
        };
        let err = input.validate().unwrap_err();
        assert!(matches!(
            err,
            PredecirError::InvalidFeature {
                field: "item_mrp",
                ..
            }
        ));
    }

    #[test]
    fn test_validate_rejects_infinity() {
        let input = FeatureInput {
            item_visibility: f64::INFINITY,
            ..FeatureInput::default()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_serde_fills_missing_fields_with_defaults() {
        let input: FeatureInput = serde_json::from_str(r#"{"item_mrp": 250.0}"#)
            .expect("partial input should deserialize");
        assert!((input.item_mrp - 250.0).abs() < f64::EPSILON);
        assert!((input.item_weight - 10.0).abs() < f64::EPSILON);
        assert!((input.outlet_establishment_year - 1999.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_serde_roundtrip() {
        let input = FeatureInput {
            item_weight: 12.5,
            ..FeatureInput::default()
        };
        let json = serde_json::to_string(&input).expect("serialize");
        let parsed: FeatureInput = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, input);
    }

    #[test]
    fn test_field_names_unique() {
        for (i, a) in FIELDS.iter().enumerate() {
            for b in FIELDS.iter().skip(i + 1) {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
