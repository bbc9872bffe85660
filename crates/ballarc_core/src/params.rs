//! Arc parameters (SSOT for gravity, ascent floor, lateral curve and floor policy).
//!
//! The embedded table `arc_params_v1.yaml` is parsed once and validated on first use.
//! Hosts can also load their own table from YAML; it goes through the same validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::ParamsError;

const ARC_PARAMS_YAML: &str = include_str!("arc_params_v1.yaml");
static ARC_PARAMS: OnceLock<ParamsTable> = OnceLock::new();

/// Highest table version this build understands.
pub const PARAMS_VERSION: u8 = 1;

// ============================================================================
// Floor policy
// ============================================================================

/// What `prepare` does when the endpoint-matching launch speed is below the ascent floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AscentFloorPolicy {
    /// Launch at the floor and lengthen the flight until it lands exactly on the end point.
    #[default]
    StretchDuration,
    /// Launch at the floor and keep the duration. The end y becomes a target only;
    /// the state reports where the ball actually lands.
    KeepDuration,
    /// Refuse to prepare and report the duration that would work.
    Reject,
}

impl AscentFloorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AscentFloorPolicy::StretchDuration => "stretch_duration",
            AscentFloorPolicy::KeepDuration => "keep_duration",
            AscentFloorPolicy::Reject => "reject",
        }
    }
}

impl std::str::FromStr for AscentFloorPolicy {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stretch_duration" | "stretch" => Ok(AscentFloorPolicy::StretchDuration),
            "keep_duration" | "keep" => Ok(AscentFloorPolicy::KeepDuration),
            "reject" => Ok(AscentFloorPolicy::Reject),
            other => Err(ParamsError::Invalid(format!("unknown floor policy {}", other))),
        }
    }
}

// ============================================================================
// ArcParams
// ============================================================================

/// Physical tuning for one trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcParams {
    /// Downward acceleration (px/s²).
    pub gravity: f64,
    /// Minimum initial upward velocity (px/s).
    pub min_ascent_velocity: f64,
    /// Peak-ish magnitude of the sideways wobble added to x (px). 0 disables it.
    #[serde(default)]
    pub lateral_curve: f64,
    #[serde(default)]
    pub floor_policy: AscentFloorPolicy,
}

impl Default for ArcParams {
    fn default() -> Self {
        Self {
            gravity: 500.0,
            min_ascent_velocity: 150.0,
            lateral_curve: 0.0,
            floor_policy: AscentFloorPolicy::StretchDuration,
        }
    }
}

impl ArcParams {
    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_min_ascent_velocity(mut self, floor: f64) -> Self {
        self.min_ascent_velocity = floor;
        self
    }

    pub fn with_lateral_curve(mut self, curve: f64) -> Self {
        self.lateral_curve = curve;
        self
    }

    pub fn with_floor_policy(mut self, policy: AscentFloorPolicy) -> Self {
        self.floor_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(self.gravity.is_finite() && self.gravity > 0.0) {
            return Err(ParamsError::Invalid(format!("gravity must be positive, got {}", self.gravity)));
        }
        if !(self.min_ascent_velocity.is_finite() && self.min_ascent_velocity >= 0.0) {
            return Err(ParamsError::Invalid(format!(
                "min_ascent_velocity must be >= 0, got {}",
                self.min_ascent_velocity
            )));
        }
        if !self.lateral_curve.is_finite() {
            return Err(ParamsError::Invalid(format!(
                "lateral_curve must be finite, got {}",
                self.lateral_curve
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Parameter table
// ============================================================================

/// On-disk shape of a parameter table, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ParamsFile {
    pub version: u8,
    pub default_profile: String,
    pub profiles: BTreeMap<String, ArcParams>,
}

/// Named parameter profiles with one default.
#[derive(Debug, Clone)]
pub struct ParamsTable {
    pub version: u8,
    pub default_profile: String,
    pub profiles: BTreeMap<String, ArcParams>,
}

impl ParamsTable {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ParamsError> {
        let file: ParamsFile = serde_yaml::from_str(yaml)?;
        Self::try_from(file)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn profile(&self, name: &str) -> Result<&ArcParams, ParamsError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ParamsError::UnknownProfile { name: name.to_string() })
    }

    pub fn default_params(&self) -> &ArcParams {
        // Presence checked during validation.
        &self.profiles[&self.default_profile]
    }

    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(|k| k.as_str())
    }

    fn validate(&self) -> Result<(), ParamsError> {
        if self.version == 0 || self.version > PARAMS_VERSION {
            return Err(ParamsError::Invalid(format!("unsupported version {}", self.version)));
        }
        if self.profiles.is_empty() {
            return Err(ParamsError::Invalid("profiles is empty".to_string()));
        }
        if !self.profiles.contains_key(&self.default_profile) {
            return Err(ParamsError::Invalid(format!(
                "default profile {} is not defined",
                self.default_profile
            )));
        }
        for (name, params) in &self.profiles {
            params
                .validate()
                .map_err(|e| ParamsError::Invalid(format!("profile {}: {}", name, e)))?;
        }
        Ok(())
    }
}

impl TryFrom<ParamsFile> for ParamsTable {
    type Error = ParamsError;

    fn try_from(file: ParamsFile) -> Result<Self, Self::Error> {
        let table = Self {
            version: file.version,
            default_profile: file.default_profile,
            profiles: file.profiles,
        };
        table.validate()?;
        Ok(table)
    }
}

/// The embedded parameter table.
pub fn default_table() -> &'static ParamsTable {
    ARC_PARAMS.get_or_init(|| {
        ParamsTable::from_yaml_str(ARC_PARAMS_YAML).expect("embedded arc params invalid")
    })
}

/// Raw text of the embedded table.
pub fn default_table_yaml() -> &'static str {
    ARC_PARAMS_YAML
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_table_loads() {
        let table = default_table();
        assert_eq!(table.version, 1);
        assert_eq!(table.default_profile, "standard");
        assert_eq!(*table.default_params(), ArcParams::default());
    }

    #[test]
    fn test_embedded_profiles_cover_every_policy() {
        let table = default_table();
        assert_eq!(table.profile("swerve").unwrap().floor_policy, AscentFloorPolicy::KeepDuration);
        assert_eq!(table.profile("strict").unwrap().floor_policy, AscentFloorPolicy::Reject);
        assert!(table.profile("swerve").unwrap().lateral_curve > 0.0);
    }

    #[test]
    fn test_unknown_profile() {
        let err = default_table().profile("nope").unwrap_err();
        assert!(matches!(err, ParamsError::UnknownProfile { ref name } if name == "nope"));
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let yaml = r#"
version: 1
default_profile: a
profiles:
  a:
    gravity: 10.0
    min_ascent_velocity: 1.0
"#;
        let table = ParamsTable::from_yaml_str(yaml).unwrap();
        let a = table.profile("a").unwrap();
        assert_eq!(a.lateral_curve, 0.0);
        assert_eq!(a.floor_policy, AscentFloorPolicy::StretchDuration);
    }

    #[test]
    fn test_rejects_non_positive_gravity() {
        let yaml = r#"
version: 1
default_profile: a
profiles:
  a:
    gravity: 0.0
    min_ascent_velocity: 1.0
"#;
        let err = ParamsTable::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("gravity"), "{err}");
    }

    #[test]
    fn test_rejects_missing_default_profile() {
        let yaml = r#"
version: 1
default_profile: b
profiles:
  a:
    gravity: 1.0
    min_ascent_velocity: 1.0
"#;
        assert!(matches!(ParamsTable::from_yaml_str(yaml), Err(ParamsError::Invalid(_))));
    }

    #[test]
    fn test_rejects_future_version() {
        let yaml = r#"
version: 9
default_profile: a
profiles:
  a:
    gravity: 1.0
    min_ascent_velocity: 1.0
"#;
        assert!(matches!(ParamsTable::from_yaml_str(yaml), Err(ParamsError::Invalid(_))));
    }

    #[test]
    fn test_parse_error_surfaces() {
        assert!(matches!(ParamsTable::from_yaml_str("version: [1"), Err(ParamsError::Parse(_))));
    }

    #[test]
    fn test_policy_serializes_snake_case() {
        let json = serde_json::to_string(&AscentFloorPolicy::KeepDuration).unwrap();
        assert_eq!(json, "\"keep_duration\"");
        let back: ArcParams = serde_json::from_str(
            r#"{"gravity": 9.8, "min_ascent_velocity": 2.0, "floor_policy": "reject"}"#,
        )
        .unwrap();
        assert_eq!(back.floor_policy, AscentFloorPolicy::Reject);
        assert_eq!(back.lateral_curve, 0.0);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("keep".parse::<AscentFloorPolicy>().unwrap(), AscentFloorPolicy::KeepDuration);
        assert_eq!(
            "stretch_duration".parse::<AscentFloorPolicy>().unwrap(),
            AscentFloorPolicy::StretchDuration
        );
        assert!("bounce".parse::<AscentFloorPolicy>().is_err());
        for p in [AscentFloorPolicy::StretchDuration, AscentFloorPolicy::KeepDuration, AscentFloorPolicy::Reject] {
            assert_eq!(p.as_str().parse::<AscentFloorPolicy>().unwrap(), p);
        }
    }
}
