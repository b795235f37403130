use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::HashMap;

/// Static description of one model parameter: its name, a human-readable
/// label, its default value and the range the interactive controls span.
/// Values outside `[min, max]` are not rejected (see `SimulationSession`);
/// the range is metadata for frontends and for the accept-with-warning
/// policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub default: f64,
    pub min: f64,
    pub max: f64,
}

impl ParamSpec {
    pub const fn new(
        name: &'static str,
        label: &'static str,
        default: f64,
        min: f64,
        max: f64,
    ) -> Self {
        Self {
            name,
            label,
            default,
            min,
            max,
        }
    }
}

/// Named parameter values for the active model.
///
/// Parameters live in a fixed order with a name-to-index map so that models
/// resolve names once at construction and read by index afterwards. The set
/// is threaded explicitly through every derivative evaluation; nothing in the
/// engine reads parameters from ambient state.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSet {
    specs: Vec<ParamSpec>,
    values: Vec<f64>,
    #[serde(skip)]
    index: HashMap<&'static str, usize>,
}

impl ParameterSet {
    /// Builds a set holding each spec's default value.
    pub fn from_specs(specs: &[ParamSpec]) -> Self {
        let mut index = HashMap::new();
        for (i, spec) in specs.iter().enumerate() {
            index.insert(spec.name, i);
        }
        Self {
            specs: specs.to_vec(),
            values: specs.iter().map(|spec| spec.default).collect(),
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Resolves a name to its index, failing on unknown names. Models use
    /// this at construction to cache indices.
    pub fn require(&self, name: &str) -> Result<usize> {
        match self.index_of(name) {
            Some(idx) => Ok(idx),
            None => bail!("unknown parameter \"{name}\""),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.index_of(name).map(|idx| self.values[idx])
    }

    /// Reads by cached index. Indices come from `require`/`index_of` and are
    /// stable for the life of the set.
    pub fn value_at(&self, idx: usize) -> f64 {
        self.values[idx]
    }

    /// Overwrites one entry by name, returning the previous value, or `None`
    /// if the name is unknown (the set is left unchanged).
    pub fn set(&mut self, name: &str, value: f64) -> Option<f64> {
        let idx = self.index_of(name)?;
        Some(std::mem::replace(&mut self.values[idx], value))
    }

    /// Overwrites one entry by cached index, returning the previous value.
    pub fn set_at(&mut self, idx: usize, value: f64) -> f64 {
        std::mem::replace(&mut self.values[idx], value)
    }

    pub fn spec_at(&self, idx: usize) -> &ParamSpec {
        &self.specs[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParamSpec, f64)> {
        self.specs.iter().zip(self.values.iter().copied())
    }
}
