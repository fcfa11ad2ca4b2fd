//! Production node overrides (Cassandra storage, S3 uploads)

use crate::error::{Error, Result};
use configtree::ConfigNode;
use serde::{Deserialize, Serialize};

/// Attributes a production node must supply
///
/// Names follow the `preview_prod/*` attribute names; the camel-case S3
/// spellings are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionAttributes {
    pub node_id: Option<String>,
    pub cassandra_hosts: Option<Vec<String>>,
    pub edge_host: Option<String>,
    #[serde(alias = "s3Key")]
    pub s3_key: Option<String>,
    #[serde(alias = "s3Secret")]
    pub s3_secret: Option<String>,
    #[serde(alias = "s3Host")]
    pub s3_host: Option<String>,
    #[serde(alias = "s3Buckets")]
    pub s3_buckets: Option<Vec<String>>,
}

fn required_str<'a>(value: Option<&'a String>, name: &str) -> Result<&'a str> {
    match value.map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::MissingRequiredAttribute(format!("preview_prod/{name}"))),
    }
}

fn required_list<'a>(value: Option<&'a Vec<String>>, name: &str) -> Result<&'a [String]> {
    match value {
        Some(items) if !items.is_empty() && items.iter().all(|i| !i.trim().is_empty()) => {
            Ok(items)
        }
        _ => Err(Error::MissingRequiredAttribute(format!("preview_prod/{name}"))),
    }
}

impl ProductionAttributes {
    /// Check that every required attribute is present and non-empty
    pub fn validate(&self) -> Result<()> {
        self.to_override().map(|_| ())
    }

    /// Build the override layer applied on top of the default configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRequiredAttribute`] naming the first missing
    /// attribute.
    pub fn to_override(&self) -> Result<ConfigNode> {
        let node_id = required_str(self.node_id.as_ref(), "node_id")?;
        let cassandra_hosts = required_list(self.cassandra_hosts.as_ref(), "cassandra_hosts")?;
        let edge_host = required_str(self.edge_host.as_ref(), "edge_host")?;
        let s3_key = required_str(self.s3_key.as_ref(), "s3Key")?;
        let s3_secret = required_str(self.s3_secret.as_ref(), "s3Secret")?;
        let s3_host = required_str(self.s3_host.as_ref(), "s3Host")?;
        let s3_buckets = required_list(self.s3_buckets.as_ref(), "s3Buckets")?;

        let mut layer = ConfigNode::new();
        layer.set_path("common.nodeId", node_id)?;
        layer.set_path("storage.engine", "cassandra")?;
        layer.set_path("storage.cassandraKeyspace", "preview")?;
        layer.set_path("storage.cassandraHosts", cassandra_hosts.to_vec())?;
        layer.set_path("simpleApi.edgeBaseUrl", edge_host)?;
        layer.set_path("uploader.engine", "s3")?;
        layer.set_path("uploader.s3Key", s3_key)?;
        layer.set_path("uploader.s3Secret", s3_secret)?;
        layer.set_path("uploader.s3Host", s3_host)?;
        layer.set_path("uploader.s3Buckets", s3_buckets.to_vec())?;
        Ok(layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use configtree::ConfigValue;

    fn complete() -> ProductionAttributes {
        ProductionAttributes {
            node_id: Some("A1B2C3D4E5F6".into()),
            cassandra_hosts: Some(vec!["10.0.0.1".into(), "10.0.0.2".into()]),
            edge_host: Some("https://edge.example.com".into()),
            s3_key: Some("AKIA".into()),
            s3_secret: Some("secret".into()),
            s3_host: Some("s3.amazonaws.com".into()),
            s3_buckets: Some(vec!["preview-assets".into()]),
        }
    }

    #[test]
    fn test_override_sets_cluster_backends() {
        let layer = complete().to_override().unwrap();
        assert_eq!(
            layer.get_path("storage.engine").and_then(ConfigValue::as_str),
            Some("cassandra")
        );
        assert_eq!(
            layer
                .get_path("storage.cassandraKeyspace")
                .and_then(ConfigValue::as_str),
            Some("preview")
        );
        assert_eq!(
            layer
                .get_path("storage.cassandraHosts")
                .and_then(ConfigValue::as_list)
                .map(<[ConfigValue]>::len),
            Some(2)
        );
        assert_eq!(
            layer.get_path("uploader.engine").and_then(ConfigValue::as_str),
            Some("s3")
        );
        assert_eq!(
            layer.get_path("common.nodeId").and_then(ConfigValue::as_str),
            Some("A1B2C3D4E5F6")
        );
    }

    #[test]
    fn test_missing_node_id() {
        let attrs = ProductionAttributes {
            node_id: None,
            ..complete()
        };
        match attrs.to_override() {
            Err(Error::MissingRequiredAttribute(name)) => {
                assert_eq!(name, "preview_prod/node_id");
            }
            other => panic!("Expected MissingRequiredAttribute, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let attrs = ProductionAttributes {
            s3_secret: Some("   ".into()),
            ..complete()
        };
        assert!(matches!(
            attrs.validate(),
            Err(Error::MissingRequiredAttribute(ref name)) if name == "preview_prod/s3Secret"
        ));

        let attrs = ProductionAttributes {
            cassandra_hosts: Some(Vec::new()),
            ..complete()
        };
        assert!(matches!(
            attrs.validate(),
            Err(Error::MissingRequiredAttribute(ref name)) if name == "preview_prod/cassandra_hosts"
        ));
    }

    #[test]
    fn test_empty_attributes_report_first_missing() {
        assert!(matches!(
            ProductionAttributes::default().validate(),
            Err(Error::MissingRequiredAttribute(ref name)) if name == "preview_prod/node_id"
        ));
    }

    #[test]
    fn test_camel_case_aliases() {
        let attrs: ProductionAttributes = toml::from_str(
            r#"
            node_id = "N1"
            cassandra_hosts = ["c1"]
            edge_host = "http://edge"
            s3Key = "k"
            s3Secret = "s"
            s3Host = "h"
            s3Buckets = ["b"]
            "#,
        )
        .unwrap();
        assert!(attrs.validate().is_ok());
    }
}
