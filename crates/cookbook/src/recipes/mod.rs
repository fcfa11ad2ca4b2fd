//! Named recipes and the node they are planned for

pub mod app;
pub mod build;
pub mod deploy;

use crate::attributes::Attributes;
use crate::error::{Error, Result};
use crate::install::{InstallSpec, PlatformFamily};
use crate::production::ProductionAttributes;
use configtree::ConfigNode;
use declarative::ExecutionPlan;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named plan builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipe {
    /// Service account, service install, config and render toolchain
    App,
    /// Init script and service start
    Deploy,
    /// `app` then `deploy`
    Default,
    /// Go toolchain for a build host
    Build,
    /// Production overrides, then `default`
    Node,
}

impl Recipe {
    pub const ALL: [Recipe; 5] = [
        Recipe::App,
        Recipe::Deploy,
        Recipe::Default,
        Recipe::Build,
        Recipe::Node,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Recipe::App => "app",
            Recipe::Deploy => "deploy",
            Recipe::Default => "default",
            Recipe::Build => "build",
            Recipe::Node => "node",
        }
    }

    /// Whether the rendered configuration carries production overrides
    pub fn is_production(&self) -> bool {
        matches!(self, Recipe::Node)
    }

    /// Build the ordered plan for `node` on a host of `platform_family`
    ///
    /// # Errors
    ///
    /// Fails before any step exists when the configuration does not resolve,
    /// production attributes are missing, or the install spec is invalid.
    pub fn plan(&self, node: &Node, platform_family: PlatformFamily) -> Result<ExecutionPlan> {
        let plan = match self {
            Recipe::App => {
                let effective = node.effective_config(false)?;
                app::plan(&node.install_spec(platform_family), &effective)?
            }
            Recipe::Deploy => deploy::plan(),
            Recipe::Default | Recipe::Node => {
                let effective = node.effective_config(self.is_production())?;
                let mut plan = ExecutionPlan::new(self.name());
                plan.append(app::plan(&node.install_spec(platform_family), &effective)?);
                plan.append(deploy::plan());
                plan
            }
            Recipe::Build => build::plan(&node.attributes.cache_dir),
        };
        log::info!("recipe {} planned {} steps", self.name(), plan.len());
        Ok(plan)
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Recipe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Recipe::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownRecipe(s.to_string()))
    }
}

/// Everything known about the host being converged
///
/// Deserializes from the node file: a `[preview]` attribute table, an
/// optional `[preview_prod]` table and a free-form `[config]` override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    #[serde(rename = "preview")]
    pub attributes: Attributes,
    #[serde(rename = "preview_prod", skip_serializing_if = "Option::is_none")]
    pub production: Option<ProductionAttributes>,
    /// Applied last, over defaults and production overrides
    pub config: ConfigNode,
}

impl Node {
    /// Explicit platform family from the attributes, else whatever `detect` finds
    pub fn platform_family(&self, detect: impl FnOnce() -> PlatformFamily) -> PlatformFamily {
        self.attributes.platform_family.unwrap_or_else(detect)
    }

    pub fn install_spec(&self, platform_family: PlatformFamily) -> InstallSpec {
        self.attributes.install_spec(platform_family)
    }

    /// Default configuration with the override layers applied
    ///
    /// With `production` set, the `[preview_prod]` layer is required and
    /// every attribute in it must be present.
    pub fn effective_config(&self, production: bool) -> Result<ConfigNode> {
        let base = self.attributes.default_config();
        let mut layers = Vec::new();

        if production {
            let prod = self.production.clone().unwrap_or_default();
            layers.push(prod.to_override()?);
        }
        if !self.config.is_empty() {
            layers.push(self.config.clone());
        }

        log::debug!("resolving configuration with {} override layers", layers.len());
        Ok(configtree::resolve(&base, &layers)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use configtree::ConfigValue;
    use declarative::ProvisionStep;

    fn production() -> ProductionAttributes {
        ProductionAttributes {
            node_id: Some("NODE01".into()),
            cassandra_hosts: Some(vec!["10.0.0.5".into()]),
            edge_host: Some("https://edge".into()),
            s3_key: Some("k".into()),
            s3_secret: Some("s".into()),
            s3_host: Some("h".into()),
            s3_buckets: Some(vec!["b".into()]),
        }
    }

    fn str_at<'a>(node: &'a ConfigNode, path: &str) -> Option<&'a str> {
        node.get_path(path).and_then(ConfigValue::as_str)
    }

    #[test]
    fn test_recipe_from_str() {
        assert_eq!("default".parse::<Recipe>().unwrap(), Recipe::Default);
        assert_eq!("Build".parse::<Recipe>().unwrap(), Recipe::Build);
        assert!(matches!(
            "database".parse::<Recipe>(),
            Err(Error::UnknownRecipe(ref name)) if name == "database"
        ));
    }

    #[test]
    fn test_recipe_names_round_trip() {
        for recipe in Recipe::ALL {
            assert_eq!(recipe.to_string().parse::<Recipe>().unwrap(), recipe);
        }
    }

    #[test]
    fn test_default_is_app_then_deploy() {
        let node = Node::default();
        let app = Recipe::App.plan(&node, PlatformFamily::Debian).unwrap();
        let deploy = Recipe::Deploy.plan(&node, PlatformFamily::Debian).unwrap();
        let default = Recipe::Default.plan(&node, PlatformFamily::Debian).unwrap();

        assert_eq!(default.name, "default");
        assert_eq!(default.len(), app.len() + deploy.len());
        assert_eq!(&default.steps()[..app.len()], app.steps());
        assert_eq!(&default.steps()[app.len()..], deploy.steps());
    }

    #[test]
    fn test_node_recipe_requires_production_attributes() {
        let node = Node::default();
        assert!(matches!(
            Recipe::Node.plan(&node, PlatformFamily::Rhel),
            Err(Error::MissingRequiredAttribute(ref name)) if name == "preview_prod/node_id"
        ));
    }

    #[test]
    fn test_node_recipe_renders_production_config() {
        let node = Node {
            production: Some(production()),
            ..Default::default()
        };
        let plan = Recipe::Node.plan(&node, PlatformFamily::Debian).unwrap();
        let json = plan
            .iter()
            .find_map(|step| match step {
                ProvisionStep::RenderTemplate { variables, .. } => variables.get("json").cloned(),
                _ => None,
            })
            .unwrap();
        assert!(json.contains("\"engine\": \"cassandra\""));
        assert!(json.contains("\"nodeId\": \"NODE01\""));
    }

    #[test]
    fn test_production_leaves_other_defaults() {
        let node = Node {
            production: Some(production()),
            ..Default::default()
        };
        let config = node.effective_config(true).unwrap();
        assert_eq!(str_at(&config, "storage.engine"), Some("cassandra"));
        assert_eq!(str_at(&config, "uploader.engine"), Some("s3"));
        assert_eq!(str_at(&config, "http.listen"), Some(":8080"));
        assert_eq!(str_at(&config, "simpleApi.baseUrl"), Some("/api"));
        assert_eq!(str_at(&config, "simpleApi.edgeBaseUrl"), Some("https://edge"));
    }

    #[test]
    fn test_config_layer_applies_last() {
        let node = Node {
            production: Some(production()),
            config: ConfigNode::new().with("storage", ConfigNode::new().with("engine", "memory")),
            ..Default::default()
        };
        let config = node.effective_config(true).unwrap();
        assert_eq!(str_at(&config, "storage.engine"), Some("memory"));
        assert_eq!(str_at(&config, "storage.cassandraKeyspace"), Some("preview"));
    }

    #[test]
    fn test_config_layer_kind_mismatch() {
        let node = Node {
            config: ConfigNode::new().with("storage", "memory"),
            ..Default::default()
        };
        assert!(matches!(
            node.effective_config(false),
            Err(Error::Schema(configtree::Error::SchemaViolation { .. }))
        ));
    }

    #[test]
    fn test_platform_family_prefers_attribute() {
        let mut node = Node::default();
        assert_eq!(node.platform_family(|| PlatformFamily::Rhel), PlatformFamily::Rhel);
        node.attributes.platform_family = Some(PlatformFamily::Debian);
        assert_eq!(
            node.platform_family(|| panic!("detection must not run")),
            PlatformFamily::Debian
        );
    }

    #[test]
    fn test_node_from_toml() {
        let node: Node = toml::from_str(
            r#"
            [preview]
            install_type = "none"
            port = 9000

            [preview_prod]
            node_id = "N"

            [config.downloader]
            tramEnabled = true
            "#,
        )
        .unwrap();
        assert_eq!(node.attributes.port, 9000);
        assert_eq!(
            node.production.as_ref().and_then(|p| p.node_id.as_deref()),
            Some("N")
        );
        let config = node.effective_config(false).unwrap();
        assert_eq!(
            config
                .get_path("downloader.tramEnabled")
                .and_then(ConfigValue::as_bool),
            Some(true)
        );
    }

    #[test]
    fn test_build_recipe_uses_cache_dir() {
        let mut node = Node::default();
        node.attributes.cache_dir = "/srv/cache".into();
        let plan = Recipe::Build.plan(&node, PlatformFamily::Other).unwrap();
        assert!(
            plan.iter()
                .any(|s| s.id() == "/srv/cache/go1.2.linux-amd64.tar.gz")
        );
    }
}
