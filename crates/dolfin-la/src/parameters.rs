//! Linear algebra parameters.
//!
//! The backend is chosen by name, either explicitly or through the
//! `DOLFIN_LA_BACKEND` environment variable.

use crate::backend::{self, BackendFactory, BackendKind};
use crate::error::Result;
use serde::{Deserialize, Serialize};

pub const BACKEND_ENV_VAR: &str = "DOLFIN_LA_BACKEND";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Backend name ("default", "sparse" or "dense")
    pub linear_algebra_backend: String,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            linear_algebra_backend: "default".to_string(),
        }
    }
}

impl Parameters {
    pub fn with_backend(name: impl Into<String>) -> Self {
        Self {
            linear_algebra_backend: name.into(),
        }
    }

    /// Defaults, overridden by `DOLFIN_LA_BACKEND` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Parameters::from_env`], reading variables through `lookup`.
    /// An empty value counts as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(BACKEND_ENV_VAR) {
            Some(name) if !name.is_empty() => Self::with_backend(name),
            _ => Self::default(),
        }
    }

    pub fn backend_kind(&self) -> Result<BackendKind> {
        self.linear_algebra_backend.parse()
    }

    pub fn factory(&self) -> Result<Box<dyn BackendFactory>> {
        let kind = self.backend_kind()?;
        tracing::debug!(backend = %kind, "selected linear algebra backend");
        Ok(backend::factory(kind))
    }
}
