//! Files shipped with the cookbook

use crate::error::{Error, Result};

/// SysV init script for the preview service
pub const PREVIEW_INIT: &str = "preview";

const PREVIEW_INIT_SOURCE: &str = include_str!("../files/preview.init");

/// Contents of a bundled file by name
pub fn bundled(name: &str) -> Result<&'static str> {
    match name {
        PREVIEW_INIT => Ok(PREVIEW_INIT_SOURCE),
        other => Err(Error::UnknownFile(other.to_string())),
    }
}
