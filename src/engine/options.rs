// src/engine/options.rs

use serde::{Deserialize, Serialize};

use crate::engine::error::Result;

/// How the pair (start, end) of a window is turned into a return.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnConvention {
    /// `end / start - 1`
    #[default]
    Simple,
    /// `ln(end / start)`
    Log,
}

impl ReturnConvention {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "simple" => Some(ReturnConvention::Simple),
            "log" => Some(ReturnConvention::Log),
            _ => None,
        }
    }

    /// `None` when the pair has no defined, finite return.
    pub fn apply(self, start: f64, end: f64) -> Option<f64> {
        if start == 0.0 {
            return None;
        }
        let ratio = end / start;
        let r = match self {
            ReturnConvention::Simple => ratio - 1.0,
            ReturnConvention::Log if ratio > 0.0 => ratio.ln(),
            ReturnConvention::Log => return None,
        };
        if r.is_finite() {
            Some(r)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RollingOptions {
    pub window: i64,
    #[serde(default)]
    pub convention: ReturnConvention,
    /// Defaults to `{column}_rolling_return_{window}`.
    #[serde(default)]
    pub output_name: Option<String>,
}

impl RollingOptions {
    pub fn new(window: i64) -> Self {
        Self {
            window,
            convention: ReturnConvention::default(),
            output_name: None,
        }
    }

    pub fn with_convention(mut self, convention: ReturnConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn output_name_for(&self, column: &str) -> String {
        match &self.output_name {
            Some(name) => name.clone(),
            None => default_output_name(column, self.window),
        }
    }
}

pub fn default_output_name(column: &str, window: i64) -> String {
    format!("{}_rolling_return_{}", column, window)
}
