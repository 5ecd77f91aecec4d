//! The Template API stack.
//!
//! Add endpoints under `endpoints/`, shared resources to [`Resources`], and
//! API-specific models to `models`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use restkit_core::{BuildResult, Stack, StackEnv, Template};
use restkit_openapi::{RestApi, RestApiProps};

use crate::config::StackConfig;
use crate::endpoints;
use crate::resources::Resources;

pub const API_NAME: &str = "Template API";
pub const API_DESCRIPTION: &str = "Template API - https://github.com/connected-web/template-api";
pub const SUB_DOMAIN: &str = "template-api";

pub const OPENAPI_PREVIEW_FILE: &str = "openapi.json";

pub struct ApiStack {
    pub stack: Stack,
    pub api: RestApi<Resources>,
}

impl ApiStack {
    /// Resources, then the API, then its endpoints and models; one pass.
    pub fn build(config: &StackConfig) -> BuildResult<Self> {
        let env = StackEnv {
            account: config.account.clone(),
            region: config.region.clone(),
        };
        let mut stack = Stack::new(config.stack_name.as_str())
            .with_description(API_DESCRIPTION)
            .with_env(env);
        for (key, value) in &config.context {
            stack = stack.with_context(key.as_str(), value.as_str());
        }

        let resources = Resources::create(&mut stack, &config.parameters.service_data_bucket_name)?;

        let props = RestApiProps {
            description: API_DESCRIPTION.to_string(),
            sub_domain: SUB_DOMAIN.to_string(),
            hosted_zone_domain: config.parameters.hosted_zone_domain.clone(),
            verifiers: config.parameters.identity.verifiers.clone(),
            ..RestApiProps::default()
        };
        let mut api = RestApi::new(&mut stack, API_NAME, props, resources, config.rest_api_options())?;

        api.register_endpoints(&mut stack, &endpoints::all(&config.deployment_time()));
        api.setup_basic_models(&mut stack)?;
        api.report();

        Ok(Self { stack, api })
    }

    pub fn template(&self) -> Template {
        self.stack.synth()
    }

    pub fn openapi_document(&self) -> Value {
        self.api.openapi_document()
    }

    /// Write `{stack}.template.json` and the OpenAPI preview into `dir`.
    pub fn write_outputs(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;

        let template_path = dir.join(format!("{}.template.json", self.stack.name()));
        fs::write(&template_path, self.template().to_pretty_string()?)?;

        let openapi_path = dir.join(OPENAPI_PREVIEW_FILE);
        fs::write(&openapi_path, serde_json::to_string_pretty(&self.openapi_document())?)?;

        Ok(vec![template_path, openapi_path])
    }
}
