// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animatable parameters and the collaborator contracts around them.
//!
//! The parameter names of a session are declared once by its
//! [`ParameterSchema`]. Live values, keyframe snapshots and rendered values
//! all share that vocabulary.

use crate::error::{Result, TimelineError};
use crate::keyframe::Frame;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Declaration of a single animatable parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name (e.g. `tilesX`)
    pub name: String,
    /// Initial live value
    pub default: f64,
    /// Lower bound of the authoring range (advisory)
    pub min: f64,
    /// Upper bound of the authoring range (advisory)
    pub max: f64,
}

impl ParameterSpec {
    /// Create a new parameter declaration
    pub fn new(name: impl Into<String>, default: f64, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            default,
            min,
            max,
        }
    }

    /// Whether a value lies inside the advisory range
    pub fn in_range(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Ordered set of parameter declarations for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSchema {
    specs: Vec<ParameterSpec>,
}

impl ParameterSchema {
    /// Create a schema from declarations, dropping repeated names
    pub fn new(specs: impl IntoIterator<Item = ParameterSpec>) -> Self {
        let mut unique: Vec<ParameterSpec> = Vec::new();
        for spec in specs {
            if !unique.iter().any(|s| s.name == spec.name) {
                unique.push(spec);
            }
        }
        Self { specs: unique }
    }

    /// The parameter set driving the tile-warp typography sketch
    pub fn kinetic_type() -> Self {
        Self::new([
            ParameterSpec::new("tilesX", 16.0, 1.0, 80.0),
            ParameterSpec::new("tilesY", 16.0, 1.0, 80.0),
            ParameterSpec::new("speed", 0.01, 0.0, 0.2),
            ParameterSpec::new("dispX", 0.1, 0.0, 0.5),
            ParameterSpec::new("dispY", 0.1, 0.0, 0.5),
            ParameterSpec::new("offset", 20.0, 0.0, 200.0),
            ParameterSpec::new("fontSize", 150.0, 10.0, 400.0),
            ParameterSpec::new("lineHeight", 120.0, 10.0, 400.0),
            ParameterSpec::new("fontWeight", 400.0, 100.0, 900.0),
        ])
    }

    /// Declared names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|s| s.name.as_str())
    }

    /// Look up a declaration
    pub fn spec(&self, name: &str) -> Option<&ParameterSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// Whether the schema declares `name`
    pub fn contains(&self, name: &str) -> bool {
        self.spec(name).is_some()
    }

    /// All declarations
    pub fn specs(&self) -> &[ParameterSpec] {
        &self.specs
    }

    /// Number of declared parameters
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether no parameters are declared
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Parameter set holding every default value
    pub fn defaults(&self) -> ParameterSet {
        self.specs
            .iter()
            .map(|s| (s.name.clone(), s.default))
            .collect()
    }
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self::kinetic_type()
    }
}

/// Ordered mapping from parameter name to value.
///
/// Used both for live values and for keyframe snapshots. A snapshot is an
/// owned copy; mutating the live set never reaches a stored keyframe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: IndexMap<String, f64>,
}

impl ParameterSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Insert or replace a value
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Builder form of [`ParameterSet::set`]
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    /// Remove a value
    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.values.shift_remove(name)
    }

    /// Whether a value is present
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterate over `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy of this set restricted to the given names
    pub fn subset<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Self {
        names
            .into_iter()
            .filter_map(|name| self.get(name).map(|v| (name.to_string(), v)))
            .collect()
    }
}

impl FromIterator<(String, f64)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, f64)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}

/// Supplies the current live parameter values
pub trait ParameterSource {
    /// Current values, read on every capture and every evaluation
    fn current(&self) -> ParameterSet;
}

/// Consumes one interpolated parameter set per animation tick
pub trait Renderer {
    /// Produce the frame for `parameters`
    fn render(&mut self, parameters: &ParameterSet, frame: Frame);
}

/// Live parameter values, restricted to the names of a schema
#[derive(Debug, Clone)]
pub struct LiveParameters {
    schema: ParameterSchema,
    values: ParameterSet,
}

impl LiveParameters {
    /// Create live values initialized to the schema defaults
    pub fn new(schema: ParameterSchema) -> Self {
        let values = schema.defaults();
        Self { schema, values }
    }

    /// The schema these values follow
    pub fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    /// Current value of a parameter
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name)
    }

    /// Set a parameter. Out-of-range values are stored as-is.
    pub fn set(&mut self, name: &str, value: f64) -> Result<()> {
        let Some(spec) = self.schema.spec(name) else {
            return Err(TimelineError::UnknownParameter(name.to_string()));
        };
        if !spec.in_range(value) {
            tracing::debug!(name, value, "Parameter set outside its authoring range");
        }
        self.values.set(name, value);
        Ok(())
    }

    /// Reset every parameter to its default
    pub fn reset(&mut self) {
        self.values = self.schema.defaults();
    }
}

impl ParameterSource for LiveParameters {
    fn current(&self) -> ParameterSet {
        self.values.clone()
    }
}
