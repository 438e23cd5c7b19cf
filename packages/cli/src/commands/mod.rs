pub mod apply;
pub mod blocks;
pub mod init;
pub mod render;
pub mod versions;

pub use apply::{apply, ApplyArgs};
pub use blocks::{blocks, BlocksArgs};
pub use init::{init, InitArgs};
pub use render::{render, RenderArgs};
pub use versions::{versions, VersionsArgs};

use anyhow::{Context, Result};
use pagecraft_blocks::{IdSource, LandingPage};
use std::path::Path;

/// Read and normalize a landing page JSON file
pub fn load_page(path: &Path, ids: &mut impl IdSource) -> Result<LandingPage> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    LandingPage::from_json(&content, ids).with_context(|| format!("Invalid landing page {}", path.display()))
}
