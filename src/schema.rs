//! Canonical feature schema shared by the priority and severity models.
//!
//! Both models were fit on exactly this column order; any reordering is a
//! breaking change to the inference contract.
use serde::Serialize;

/// Legal value domain of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Free-form or enumerated string. `known` lists the values offered by the
    /// operator form; it is informational and never enforced at validation.
    Categorical { known: &'static [&'static str] },

    /// Integer with inclusive bounds
    Bounded { min: i64, max: i64 },

    /// Integer flag, 0 or 1
    Flag,
}

/// A named field of the incident record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn categorical(name: &'static str, known: &'static [&'static str]) -> Self {
        Self {
            name,
            kind: FieldKind::Categorical { known },
        }
    }

    const fn bounded(name: &'static str, min: i64, max: i64) -> Self {
        Self {
            name,
            kind: FieldKind::Bounded { min, max },
        }
    }

    const fn flag(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Flag,
        }
    }

    /// Inclusive integer bounds, `None` for categorical fields
    pub fn bounds(&self) -> Option<(i64, i64)> {
        match self.kind {
            FieldKind::Categorical { .. } => None,
            FieldKind::Bounded { min, max } => Some((min, max)),
            FieldKind::Flag => Some((0, 1)),
        }
    }

    /// Whether `value` lies inside this field's integer domain
    pub fn admits(&self, value: i64) -> bool {
        self.bounds()
            .map_or(false, |(min, max)| (min..=max).contains(&value))
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self.kind, FieldKind::Categorical { .. })
    }
}

pub const NEIGHBORHOOD: FieldSpec = FieldSpec::categorical("neighborhood", &[]);
pub const ANIMAL_TYPE: FieldSpec = FieldSpec::categorical("animal_type", &["Dog", "Cat"]);
pub const AGE_GROUP: FieldSpec = FieldSpec::categorical(
    "age_group",
    &["Puppy/Kitten", "Adult", "Senior", "Unknown"],
);
pub const BEHAVIOR: FieldSpec = FieldSpec::categorical(
    "behavior",
    &["Calm", "Fearful", "Aggressive", "Weak", "Unknown"],
);
pub const MOBILITY: FieldSpec =
    FieldSpec::categorical("mobility", &["Normal", "Limping", "Immobile", "Unknown"]);
pub const TRAFFIC_RISK: FieldSpec =
    FieldSpec::categorical("traffic_risk", &["Low", "Medium", "High"]);
pub const WEATHER: FieldSpec =
    FieldSpec::categorical("weather", &["Clear", "Rain", "Heatwave", "Cold"]);
pub const REPORT_CHANNEL: FieldSpec = FieldSpec::categorical(
    "report_channel",
    &["Call", "WhatsApp", "App", "Walk-in", "Email"],
);
pub const VISIBLE_INJURY: FieldSpec = FieldSpec::categorical("visible_injury", &["Yes", "No"]);

pub const ANIMAL_COUNT: FieldSpec = FieldSpec::bounded("animal_count", 1, 10);

pub const NEAR_TRAFFIC: FieldSpec = FieldSpec::flag("near_traffic");
pub const NEAR_SCHOOL: FieldSpec = FieldSpec::flag("near_school");
pub const VERY_THIN: FieldSpec = FieldSpec::flag("very_thin");
pub const BLEEDING: FieldSpec = FieldSpec::flag("bleeding");
pub const OPEN_WOUND: FieldSpec = FieldSpec::flag("open_wound");
pub const PREGNANT_OR_NURSING: FieldSpec = FieldSpec::flag("pregnant_or_nursing");
pub const HAS_COLLAR: FieldSpec = FieldSpec::flag("has_collar");

pub const REPORTER_CONFIDENCE: FieldSpec = FieldSpec::bounded("reporter_confidence", 1, 5);

pub const REPORT_HOUR: FieldSpec = FieldSpec::bounded("report_hour", 0, 23);
pub const REPORT_DAYOFWEEK: FieldSpec = FieldSpec::bounded("report_dayofweek", 0, 6);
pub const REPORT_MONTH: FieldSpec = FieldSpec::bounded("report_month", 1, 12);

/// Number of features presented to each model
pub const FEATURE_COUNT: usize = 21;

/// The schema in model column order
pub const FEATURE_SCHEMA: [FieldSpec; FEATURE_COUNT] = [
    NEIGHBORHOOD,
    ANIMAL_TYPE,
    AGE_GROUP,
    BEHAVIOR,
    MOBILITY,
    TRAFFIC_RISK,
    WEATHER,
    REPORT_CHANNEL,
    VISIBLE_INJURY,
    ANIMAL_COUNT,
    NEAR_TRAFFIC,
    NEAR_SCHOOL,
    VERY_THIN,
    BLEEDING,
    OPEN_WOUND,
    PREGNANT_OR_NURSING,
    HAS_COLLAR,
    REPORTER_CONFIDENCE,
    REPORT_HOUR,
    REPORT_DAYOFWEEK,
    REPORT_MONTH,
];

/// Ordered column names, as consumed by the vectorizer and artifact checks
pub fn feature_columns() -> impl ExactSizeIterator<Item = &'static str> {
    FEATURE_SCHEMA.iter().map(|spec| spec.name)
}

/// Look up a field by name
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FEATURE_SCHEMA.iter().find(|spec| spec.name == name)
}
