//! Layered deep merge of configuration trees

use crate::error::{Error, Result};
use crate::node::{ConfigNode, ConfigValue};

/// Resolve the effective configuration from a base tree and ordered override layers.
///
/// Layers are applied first to last, so the last write wins for each leaf.
/// The base is never modified; on error no partial result is returned.
///
/// # Errors
///
/// Returns [`Error::SchemaViolation`] if any layer replaces a value with a
/// value of a different kind.
pub fn resolve(base: &ConfigNode, overrides: &[ConfigNode]) -> Result<ConfigNode> {
    let mut effective = base.clone();
    for layer in overrides {
        merge_into(&mut effective, layer, "")?;
    }
    Ok(effective)
}

/// Deep-merge `layer` into `target`.
///
/// `prefix` is the dotted path of `target` within the full tree and is only
/// used for error reporting. On error, keys merged before the failing key
/// remain in `target`.
pub fn merge_into(target: &mut ConfigNode, layer: &ConfigNode, prefix: &str) -> Result<()> {
    for (key, incoming) in layer.iter() {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match target.get_mut(key) {
            None => {
                target.insert(key.clone(), incoming.clone());
            }
            Some(ConfigValue::Map(existing)) => match incoming {
                ConfigValue::Map(child) => merge_into(existing, child, &path)?,
                other => {
                    return Err(Error::SchemaViolation {
                        path,
                        expected: crate::node::Kind::Map,
                        found: other.kind(),
                    });
                }
            },
            Some(existing) => {
                if existing.kind() != incoming.kind() {
                    return Err(Error::SchemaViolation {
                        path,
                        expected: existing.kind(),
                        found: incoming.kind(),
                    });
                }
                *existing = incoming.clone();
            }
        }
    }
    Ok(())
}
