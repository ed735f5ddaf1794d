//! # Documentation
//!
//! Two outputs, both derived from the `module.json` snapshots of existing
//! modules:
//!
//! - [`markdown`]: `Modules/<Name>/docs/API.md` per module
//! - [`openapi`]: one OpenAPI 3.0 document for every module of the app

pub mod markdown;
pub mod openapi;

pub use markdown::{DOCS_FILE, render_module_docs, write_module_docs};
pub use openapi::{DEFAULT_OPENAPI_PATH, build_openapi, write_openapi};

use crate::GeneratorConfig;
use crate::generator::is_module_dir;
use blueprint_core::{EngineError, EngineResult};
use blueprint_ir::{Blueprint, load_snapshot};

/// Load the snapshot of an existing module
pub fn load_module(config: &GeneratorConfig, module: &str) -> EngineResult<Blueprint> {
    let dir = config.module_dir(module);
    if !is_module_dir(&dir) {
        return Err(EngineError::ModuleNotFound(module.to_string()));
    }
    load_snapshot(&dir)
}
