//! Stack configuration: optional file, then `RESTKIT__*` environment, then
//! the legacy CI switches.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use restkit_auth::Verifier;
use restkit_openapi::RestApiOptions;

pub const CONFIG_PATH_ENV: &str = "RESTKIT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "restkit.toml";
pub const ENV_PREFIX: &str = "RESTKIT";

pub const DEFAULT_STACK_NAME: &str = "TemplateApiStack";
pub const DEFAULT_SERVICE_BUCKET_NAME: &str = "template-api-service-data-bucket";
pub const DEFAULT_OUTPUT_DIR: &str = "cdk.out";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub verifiers: Vec<Verifier>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StackParameters {
    pub hosted_zone_domain: String,
    pub service_data_bucket_name: String,
    pub identity: IdentityConfig,
}

impl Default for StackParameters {
    fn default() -> Self {
        Self {
            hosted_zone_domain: String::new(),
            service_data_bucket_name: DEFAULT_SERVICE_BUCKET_NAME.to_string(),
            identity: IdentityConfig::default(),
        }
    }
}

/// Everything the definition pass needs, loaded from file + environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    pub stack_name: String,
    pub account: Option<String>,
    pub region: Option<String>,
    pub parameters: StackParameters,

    /// Provision the vanity domain (`CREATE_CNAME_RECORD=true`).
    pub create_cname_record: bool,

    /// Job summary file (`GITHUB_STEP_SUMMARY`).
    pub step_summary: Option<PathBuf>,

    /// Fixed deployment time for reproducible templates (`USE_MOCK_TIME`).
    pub mock_time: Option<String>,

    pub output_dir: PathBuf,

    /// Answers for definition-time lookups, e.g.
    /// `hosted-zone:domainName=example.com = "Z0123"`.
    pub context: BTreeMap<String, String>,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            stack_name: DEFAULT_STACK_NAME.to_string(),
            account: None,
            region: None,
            parameters: StackParameters::default(),
            create_cname_record: false,
            step_summary: None,
            mock_time: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            context: BTreeMap::new(),
        }
    }
}

impl StackConfig {
    /// Load configuration from disk and the process environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load_from(Some(Path::new(&config_path)), None)?;
        config.apply_legacy_env(|key| env::var(key).ok());
        Ok(config)
    }

    /// Load from an optional file and an environment map (the process
    /// environment when `environment` is `None`).
    pub fn load_from(
        path: Option<&Path>,
        environment: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path.filter(|p| p.exists()) {
            builder = builder.add_source(config::File::from(path.to_path_buf()));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(environment),
        );

        builder.build()?.try_deserialize()
    }

    /// Apply the switches CI pipelines set directly.
    pub fn apply_legacy_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("CREATE_CNAME_RECORD") {
            self.create_cname_record = value == "true";
        }
        if let Some(path) = lookup("GITHUB_STEP_SUMMARY").filter(|p| !p.trim().is_empty()) {
            self.step_summary = Some(PathBuf::from(path));
        }
        if let Some(name) = lookup("SERVICE_BUCKET_NAME").filter(|n| !n.trim().is_empty()) {
            self.parameters.service_data_bucket_name = name;
        }
        if let Some(time) = lookup("USE_MOCK_TIME").filter(|t| !t.trim().is_empty()) {
            self.mock_time = Some(time);
        }
    }

    pub fn rest_api_options(&self) -> RestApiOptions {
        RestApiOptions {
            create_cname_record: self.create_cname_record,
            step_summary: self.step_summary.clone(),
            ..RestApiOptions::default()
        }
    }

    /// Timestamp recorded in the status endpoint's environment.
    pub fn deployment_time(&self) -> String {
        self.mock_time
            .clone()
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
    }
}
