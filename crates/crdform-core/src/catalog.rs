//! Registry of CRD descriptors
//!
//! The built-in catalog covers the Loki operator (`loki.grafana.com`) and the
//! chisel operator (`chisel-operator.io`). More kinds can be registered at
//! runtime, typically from a YAML file with a list of descriptors.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{CoreError, Result};
use crate::schema::{FieldKind, FieldSchema, ResourceDescriptor};

/// Descriptors keyed by resource type name
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    descriptors: BTreeMap<String, ResourceDescriptor>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every built-in CRD registered
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for descriptor in builtin_descriptors() {
            // Built-in type names are unique
            catalog
                .descriptors
                .insert(descriptor.type_name(), descriptor);
        }
        catalog
    }

    /// Register a descriptor; type names must be unique
    pub fn register(&mut self, descriptor: ResourceDescriptor) -> Result<()> {
        let name = descriptor.type_name();
        if self.descriptors.contains_key(&name) {
            return Err(CoreError::DuplicateResource { name });
        }
        self.descriptors.insert(name, descriptor);
        Ok(())
    }

    /// Register every descriptor from a YAML list
    pub fn extend_from_yaml(&mut self, yaml: &str) -> Result<usize> {
        let descriptors: Vec<ResourceDescriptor> = serde_yaml::from_str(yaml)?;
        let count = descriptors.len();
        for descriptor in descriptors {
            self.register(descriptor)?;
        }
        Ok(count)
    }

    pub fn extend_from_file(&mut self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)?;
        self.extend_from_yaml(&content)
    }

    /// Look up by type name; the `_manifest` data source suffix is accepted
    pub fn get(&self, type_name: &str) -> Result<&ResourceDescriptor> {
        let base = type_name.strip_suffix("_manifest").unwrap_or(type_name);
        self.descriptors
            .get(base)
            .ok_or_else(|| CoreError::UnknownResource {
                name: type_name.to_string(),
            })
    }

    /// Look up by `apiVersion` and `kind`
    pub fn find_kind(&self, api_version: &str, kind: &str) -> Option<&ResourceDescriptor> {
        self.descriptors
            .values()
            .find(|d| d.kind == kind && d.api_version() == api_version)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.descriptors.values()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

fn builtin_descriptors() -> Vec<ResourceDescriptor> {
    vec![
        loki_ruler_config(),
        loki_alerting_rule(),
        chisel_exit_node(),
        chisel_exit_node_provisioner(),
    ]
}

fn tls_config() -> FieldSchema {
    FieldSchema::object(
        "tls_config",
        vec![
            FieldSchema::string("ca_path"),
            FieldSchema::string("cert_path"),
            FieldSchema::string("key_path"),
            FieldSchema::string("server_name"),
            FieldSchema::bool("insecure_skip_verify"),
        ],
    )
}

fn client_config() -> FieldSchema {
    FieldSchema::object(
        "client",
        vec![
            tls_config(),
            FieldSchema::object(
                "header_auth",
                vec![
                    FieldSchema::string("type"),
                    FieldSchema::string("credentials"),
                    FieldSchema::string("credentials_file"),
                ],
            ),
            FieldSchema::object(
                "basic_auth",
                vec![
                    FieldSchema::string("username"),
                    FieldSchema::string("password"),
                ],
            ),
        ],
    )
}

fn loki_ruler_config() -> ResourceDescriptor {
    ResourceDescriptor::new("loki.grafana.com", "v1", "RulerConfig", "rulerconfigs")
        .describe("Ruler configuration of a LokiStack")
        .with_field(
            FieldSchema::object(
                "spec",
                vec![
                    FieldSchema::string("evaluation_interval")
                        .describe("Interval between rule evaluations"),
                    FieldSchema::string("poll_interval")
                        .describe("Interval between checks for rule changes"),
                    FieldSchema::object(
                        "alertmanager",
                        vec![
                            FieldSchema::list("endpoints", FieldKind::String).required(),
                            FieldSchema::bool("enable_v2"),
                            FieldSchema::string("external_url"),
                            FieldSchema::map("external_labels", FieldKind::String),
                            FieldSchema::object(
                                "discovery",
                                vec![
                                    FieldSchema::bool("enable_srv").with_key("enableSRV"),
                                    FieldSchema::string("refresh_interval"),
                                ],
                            ),
                            FieldSchema::object(
                                "notification_queue",
                                vec![
                                    FieldSchema::int64("capacity"),
                                    FieldSchema::string("timeout"),
                                    FieldSchema::string("for_outage_tolerance"),
                                    FieldSchema::string("for_grace_period"),
                                    FieldSchema::string("resend_delay"),
                                ],
                            ),
                            client_config(),
                        ],
                    ),
                    FieldSchema::object(
                        "remote_write",
                        vec![
                            FieldSchema::bool("enabled"),
                            FieldSchema::string("refresh_period"),
                            FieldSchema::object(
                                "client",
                                vec![
                                    FieldSchema::string("name").required(),
                                    FieldSchema::string("url").required(),
                                    FieldSchema::string("timeout"),
                                    FieldSchema::string("authorization").required(),
                                    FieldSchema::string("authorization_secret_name").required(),
                                    FieldSchema::map("additional_headers", FieldKind::String),
                                    FieldSchema::bool("follow_redirects"),
                                    FieldSchema::string("proxy_url"),
                                ],
                            ),
                        ],
                    ),
                    FieldSchema::map(
                        "overrides",
                        FieldKind::Object {
                            fields: vec![FieldSchema::object(
                                "alertmanager",
                                vec![
                                    FieldSchema::list("endpoints", FieldKind::String),
                                    FieldSchema::bool("enable_v2"),
                                    FieldSchema::string("external_url"),
                                    FieldSchema::map("external_labels", FieldKind::String),
                                ],
                            )],
                        },
                    ),
                ],
            )
            .required(),
        )
}

fn loki_alerting_rule() -> ResourceDescriptor {
    let rule = FieldKind::Object {
        fields: vec![
            FieldSchema::string("alert"),
            FieldSchema::string("expr").required(),
            FieldSchema::string("for"),
            FieldSchema::map("annotations", FieldKind::String),
            FieldSchema::map("labels", FieldKind::String),
        ],
    };
    let group = FieldKind::Object {
        fields: vec![
            FieldSchema::string("name").required(),
            FieldSchema::string("interval"),
            FieldSchema::int64("limit"),
            FieldSchema::list("rules", rule).required(),
        ],
    };

    ResourceDescriptor::new("loki.grafana.com", "v1", "AlertingRule", "alertingrules")
        .describe("Loki alerting rules for a tenant")
        .with_field(
            FieldSchema::object(
                "spec",
                vec![
                    FieldSchema::string("tenant_id").with_key("tenantID").required(),
                    FieldSchema::list("groups", group),
                ],
            )
            .required(),
        )
}

fn chisel_exit_node() -> ResourceDescriptor {
    // The chisel operator serializes its spec in snake_case
    ResourceDescriptor::new("chisel-operator.io", "v1", "ExitNode", "exitnodes")
        .describe("A chisel server used as a tunnel exit")
        .with_field(
            FieldSchema::object(
                "spec",
                vec![
                    FieldSchema::string("host").required(),
                    FieldSchema::int64("port").required(),
                    FieldSchema::string("external_host").with_key("external_host"),
                    FieldSchema::bool("default_route").with_key("default_route"),
                    FieldSchema::string("fingerprint"),
                    FieldSchema::string("auth").describe("Name of the secret holding credentials"),
                    FieldSchema::string("chisel_image")
                        .with_key("chisel_image")
                        .nullable(),
                ],
            )
            .required(),
        )
        .with_field(FieldSchema::dynamic("status").computed())
}

fn chisel_exit_node_provisioner() -> ResourceDescriptor {
    let cloud = |extra: Vec<FieldSchema>| {
        let mut fields = vec![
            FieldSchema::string("auth").required(),
            FieldSchema::string("region").required(),
            FieldSchema::string("size"),
        ];
        fields.extend(extra);
        fields
    };

    ResourceDescriptor::new(
        "chisel-operator.io",
        "v1",
        "ExitNodeProvisioner",
        "exitnodeprovisioners",
    )
    .describe("Cloud provisioner that creates exit nodes on demand")
    .with_field(
        FieldSchema::object(
            "spec",
            vec![
                FieldSchema::object(
                    "digital_ocean",
                    cloud(vec![FieldSchema::list("ssh_fingerprints", FieldKind::String)]),
                )
                .with_key("DigitalOcean"),
                FieldSchema::object("linode", cloud(Vec::new())).with_key("Linode"),
                FieldSchema::object(
                    "aws",
                    cloud(vec![FieldSchema::string("security_group")]),
                )
                .with_key("AWS"),
            ],
        )
        .required(),
    )
}
