//! The REST API composite: gateway, authorizer, execution role, routes.
//!
//! `R` is the shared-resources type handed to every route's grant callback;
//! it can be anything the API defines (buckets, tables, ...).

use std::path::PathBuf;
use std::time::Duration;

use serde_json::{Map, Value, json};

use restkit_auth::{AUTH_VERIFIERS_ENV, Verifier, verifiers_to_env};
use restkit_core::{
    BuildError, BuildResult, DeployedFunction, FunctionConfig, LambdaFunction, LogicalId,
    PolicyStatement, Resource, ResourceRef, Role, ServicePrincipal, Stack,
};

use crate::domain::{VanityDomain, create_vanity_domain};
use crate::endpoint::{Endpoint, OpenApiFunction, ResolvedMethodResponse};
use crate::model_factory::{ModelFactory, ModelHandle};
use crate::report::{NO_DESCRIPTION, append_step_summary, summary_markdown};
use crate::route_tree::{RouteNode, RouteTree, check_path};
use crate::routes::{HttpMethod, MethodResponse, ModelSpec, RouteMetadata, parse_signature};

pub const DEFAULT_AUTHORIZER_ENTRY: &str = "authorizer-handler";
pub const DEFAULT_STAGE_NAME: &str = "v1";

const AUTHORIZER_MEMORY_SIZE: u32 = 256;
const AUTHORIZER_TIMEOUT: Duration = Duration::from_secs(5);
const IDENTITY_SOURCE: &str = "method.request.header.Authorization";

const CORS_ALLOW_HEADERS: &str = "'Authorization,content-type'";
const CORS_ALLOW_METHODS: &str = "'OPTIONS,GET,PUT,POST,DELETE,PATCH,HEAD'";

/// What the API is and how callers authenticate.
#[derive(Debug, Clone, Default)]
pub struct RestApiProps {
    pub description: String,
    pub sub_domain: String,
    pub hosted_zone_domain: String,
    pub verifiers: Vec<Verifier>,
    /// Entry of a custom authorizer function, replacing the default one.
    pub authorizer_path: Option<String>,
    /// Existing authorizer function, used as-is.
    pub authorizer_arn: Option<String>,
}

/// Switches that used to come from the process environment.
#[derive(Debug, Clone)]
pub struct RestApiOptions {
    /// Provision the vanity domain and its DNS record.
    pub create_cname_record: bool,
    /// Job summary file the route report is appended to.
    pub step_summary: Option<PathBuf>,
    /// Handler binary of the default authorizer.
    pub authorizer_entry: String,
    pub stage_name: String,
}

impl Default for RestApiOptions {
    fn default() -> Self {
        Self {
            create_cname_record: false,
            step_summary: None,
            authorizer_entry: DEFAULT_AUTHORIZER_ENTRY.to_string(),
            stage_name: DEFAULT_STAGE_NAME.to_string(),
        }
    }
}

/// An endpoint that could not be registered, kept for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationFailure {
    pub operation_id: String,
    pub rest_signature: String,
    pub error: BuildError,
}

enum AuthorizerFunction {
    Imported(String),
    Deployed(DeployedFunction),
}

impl AuthorizerFunction {
    fn arn(&self) -> Value {
        match self {
            Self::Imported(arn) => Value::String(arn.clone()),
            Self::Deployed(function) => function.arn(),
        }
    }

    /// ARN as a `Fn::Sub` fragment.
    fn sub_arn(&self) -> String {
        match self {
            Self::Imported(arn) => arn.clone(),
            Self::Deployed(function) => function.handle().sub_attr("Arn"),
        }
    }
}

fn invocation_uri(function_arn: &str) -> Value {
    json!({
        "Fn::Sub": format!(
            "arn:${{AWS::Partition}}:apigateway:${{AWS::Region}}:lambda:path/2015-03-31/functions/{function_arn}/invocations"
        )
    })
}

fn validate_props(props: &RestApiProps) -> BuildResult<()> {
    if props.authorizer_arn.is_some() && props.authorizer_path.is_some() {
        return Err(BuildError::configuration(
            "AuthorizerARN and AuthorizerPath are mutually exclusive; please specify only one.",
        ));
    }
    if props.authorizer_arn.is_some() && !props.verifiers.is_empty() {
        return Err(BuildError::configuration(
            "AuthorizerARN and configurable Verifiers are mutually exclusive; please exclude Verifiers from your config or switch to the default authorizer by clearing the AuthorizerARN property.",
        ));
    }
    Ok(())
}

/// A REST API, its routes, and the role that invokes them.
pub struct RestApi<R> {
    id: LogicalId,
    name: String,
    description: String,
    handle: ResourceRef,
    authorizer: ResourceRef,
    authorizer_function: AuthorizerFunction,
    deployment: ResourceRef,
    stage: ResourceRef,
    execution_role: Role,
    models: ModelFactory,
    tree: RouteTree,
    endpoints: Vec<Endpoint>,
    failures: Vec<RegistrationFailure>,
    vanity_domain: Option<VanityDomain>,
    options: RestApiOptions,
    shared_resources: R,
}

impl<R> RestApi<R> {
    /// Create the API and its singletons.
    ///
    /// Authentication settings are validated before any resource exists.
    pub fn new(
        stack: &mut Stack,
        name: &str,
        props: RestApiProps,
        shared_resources: R,
        options: RestApiOptions,
    ) -> BuildResult<Self> {
        validate_props(&props)?;
        let id: LogicalId = name.parse()?;
        let verifiers_json = verifiers_to_env(&props.verifiers)
            .map_err(|e| BuildError::configuration(format!("unable to serialise verifiers: {e}")))?;

        let authorizer_function = match &props.authorizer_arn {
            Some(arn) => AuthorizerFunction::Imported(arn.clone()),
            None => {
                let entry = props
                    .authorizer_path
                    .clone()
                    .unwrap_or_else(|| options.authorizer_entry.clone());
                let config = FunctionConfig::default()
                    .with_memory_size(AUTHORIZER_MEMORY_SIZE)
                    .with_timeout(AUTHORIZER_TIMEOUT)
                    .with_env(AUTH_VERIFIERS_ENV, verifiers_json);
                let function = LambdaFunction::new(
                    LogicalId::from_parts(&[id.as_str(), "PrivateAPIAuthorizer"]),
                    entry,
                    config,
                );
                AuthorizerFunction::Deployed(function.materialise(stack)?)
            }
        };

        let description = if props.description.trim().is_empty() {
            NO_DESCRIPTION.to_string()
        } else {
            props.description.clone()
        };
        let handle = stack.add(
            id.clone(),
            Resource::new(
                "AWS::ApiGateway::RestApi",
                json!({ "Name": name, "Description": description }),
            ),
        )?;

        let authorizer = stack.add(
            LogicalId::from_parts(&[id.as_str(), "PrivateApiRequestAuthorizer"]),
            Resource::new(
                "AWS::ApiGateway::Authorizer",
                json!({
                    "Name": format!("{id}PrivateApiRequestAuthorizer"),
                    "RestApiId": handle.reference(),
                    "Type": "REQUEST",
                    "IdentitySource": IDENTITY_SOURCE,
                    "AuthorizerUri": invocation_uri(&authorizer_function.sub_arn()),
                }),
            ),
        )?;
        stack.add(
            LogicalId::from_parts(&[id.as_str(), "AuthorizerPermission"]),
            Resource::new(
                "AWS::Lambda::Permission",
                json!({
                    "Action": "lambda:InvokeFunction",
                    "FunctionName": authorizer_function.arn(),
                    "Principal": ServicePrincipal::api_gateway().as_str(),
                    "SourceArn": {
                        "Fn::Sub": format!(
                            "arn:${{AWS::Partition}}:execute-api:${{AWS::Region}}:${{AWS::AccountId}}:${{{}}}/authorizers/${{{}}}",
                            handle.id(),
                            authorizer.id()
                        )
                    },
                }),
            ),
        )?;

        let deployment = stack.add(
            LogicalId::from_parts(&[id.as_str(), "Deployment"]),
            Resource::new(
                "AWS::ApiGateway::Deployment",
                json!({ "RestApiId": handle.reference(), "Description": description }),
            ),
        )?;
        let stage = stack.add(
            LogicalId::from_parts(&[id.as_str(), "DeploymentStage", options.stage_name.as_str()]),
            Resource::new(
                "AWS::ApiGateway::Stage",
                json!({
                    "RestApiId": handle.reference(),
                    "DeploymentId": deployment.reference(),
                    "StageName": options.stage_name,
                }),
            ),
        )?;
        stack.add_output(
            format!("{id}Endpoint"),
            json!({
                "Fn::Sub": format!(
                    "https://${{{}}}.execute-api.${{AWS::Region}}.${{AWS::URLSuffix}}/{}/",
                    handle.id(),
                    options.stage_name
                )
            }),
            "Invoke URL of the deployed stage",
        );

        let execution_role = Role::create(
            stack,
            LogicalId::from_parts(&[id.as_str(), "ApiExecutionRole"]),
            &ServicePrincipal::api_gateway(),
            Vec::new(),
        )?;

        let mut api = Self {
            id,
            name: name.to_string(),
            description,
            models: ModelFactory::new(handle.clone()),
            tree: RouteTree::new(handle.clone()),
            handle,
            authorizer,
            authorizer_function,
            deployment,
            stage,
            execution_role,
            endpoints: Vec::new(),
            failures: Vec::new(),
            vanity_domain: None,
            options,
            shared_resources,
        };

        let root = api.tree.root().clone();
        api.add_cors_preflight(stack, &root)?;

        if api.options.create_cname_record {
            let vanity = create_vanity_domain(
                stack,
                &api.handle,
                &api.stage,
                &props.sub_domain,
                &props.hosted_zone_domain,
            )?;
            let url = format!("https://{}", vanity.domain_name);
            stack.add_output("ApiUrl", Value::String(url.clone()), "The registered URL of the API");
            tracing::info!(%url, "Registered URL of the API");
            api.vanity_domain = Some(vanity);
        }

        Ok(api)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn handle(&self) -> &ResourceRef {
        &self.handle
    }

    pub fn authorizer(&self) -> &ResourceRef {
        &self.authorizer
    }

    pub fn authorizer_arn(&self) -> Value {
        self.authorizer_function.arn()
    }

    pub fn stage(&self) -> &ResourceRef {
        &self.stage
    }

    pub fn stage_name(&self) -> &str {
        &self.options.stage_name
    }

    pub fn execution_role(&self) -> &Role {
        &self.execution_role
    }

    pub fn models(&self) -> &ModelFactory {
        &self.models
    }

    pub fn route_tree(&self) -> &RouteTree {
        &self.tree
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Endpoints `register_endpoints` skipped, with why.
    pub fn failures(&self) -> &[RegistrationFailure] {
        &self.failures
    }

    pub fn vanity_domain(&self) -> Option<&str> {
        self.vanity_domain.as_ref().map(|v| v.domain_name.as_str())
    }

    pub fn shared_resources(&self) -> &R {
        &self.shared_resources
    }

    /// Resolve a model through the API's factory.
    pub fn model(&mut self, stack: &mut Stack, spec: &ModelSpec) -> BuildResult<ModelHandle> {
        self.models.create_spec(stack, spec)
    }

    /// Ensure the models every API shares.
    pub fn setup_basic_models(&mut self, stack: &mut Stack) -> BuildResult<Vec<ModelHandle>> {
        crate::basic_models::register(&mut self.models, stack)
    }

    pub fn get(&mut self, stack: &mut Stack, path: &str, function: OpenApiFunction) -> BuildResult<&mut Self> {
        self.route(stack, HttpMethod::Get, path, function)
    }

    pub fn post(&mut self, stack: &mut Stack, path: &str, function: OpenApiFunction) -> BuildResult<&mut Self> {
        self.route(stack, HttpMethod::Post, path, function)
    }

    pub fn put(&mut self, stack: &mut Stack, path: &str, function: OpenApiFunction) -> BuildResult<&mut Self> {
        self.route(stack, HttpMethod::Put, path, function)
    }

    pub fn delete(&mut self, stack: &mut Stack, path: &str, function: OpenApiFunction) -> BuildResult<&mut Self> {
        self.route(stack, HttpMethod::Delete, path, function)
    }

    fn route(
        &mut self,
        stack: &mut Stack,
        method: HttpMethod,
        path: &str,
        function: OpenApiFunction,
    ) -> BuildResult<&mut Self> {
        if !path.starts_with('/') {
            return Err(BuildError::invalid_path(path));
        }
        check_path(path)?;
        self.check_unique(function.operation_id(), method, path)?;
        self.add_endpoint(stack, Endpoint::new(method, path, function))?;
        Ok(self)
    }

    /// Register every route, isolating failures.
    ///
    /// A route that fails is logged with its operation id and signature and
    /// recorded in [`RestApi::failures`]; the remaining routes still register.
    pub fn register_endpoints(&mut self, stack: &mut Stack, routes: &[RouteMetadata<R>]) -> &mut Self {
        for metadata in routes {
            if let Err(error) = self.register_endpoint(stack, metadata) {
                tracing::error!(
                    operation_id = %metadata.operation_id,
                    signature = %metadata.rest_signature,
                    error = %error,
                    "Unable to create endpoint"
                );
                self.failures.push(RegistrationFailure {
                    operation_id: metadata.operation_id.clone(),
                    rest_signature: metadata.rest_signature.clone(),
                    error,
                });
            }
        }
        self
    }

    /// Translate one route into a function, a tree node and a bound method.
    pub fn register_endpoint(&mut self, stack: &mut Stack, metadata: &RouteMetadata<R>) -> BuildResult<()> {
        let endpoint = self.create_endpoint_from_metadata(stack, metadata)?;
        self.add_endpoint(stack, endpoint)
    }

    /// Materialise the route's function and resolve its models.
    ///
    /// Everything that can reject the route is checked before the first
    /// resource is added, so a failed route leaves the stack as it was.
    pub fn create_endpoint_from_metadata(
        &mut self,
        stack: &mut Stack,
        metadata: &RouteMetadata<R>,
    ) -> BuildResult<Endpoint> {
        let (method, path) = parse_signature(&metadata.rest_signature)?;
        check_path(&path)?;
        let function_id: LogicalId = metadata.operation_id.parse()?;
        self.check_unique(&metadata.operation_id, method, &path)?;

        let mut function = LambdaFunction::new(
            function_id,
            metadata.route_entry_point.as_str(),
            metadata.lambda_config.clone(),
        );
        function.check_available(stack)?;
        (metadata.grant_permissions)(&mut function, &self.shared_resources);

        let responses = metadata
            .method_responses
            .iter()
            .map(|response| self.resolve_response(stack, response))
            .collect::<BuildResult<Vec<_>>>()?;
        let request_models = metadata
            .method_request_models
            .iter()
            .map(|(content_type, spec)| Ok((content_type.clone(), self.models.create_spec(stack, spec)?)))
            .collect::<BuildResult<Vec<_>>>()?;

        let mut value = OpenApiFunction::new(metadata.operation_id.as_str(), function.materialise(stack)?);
        for response in responses {
            value.add_method_response(response);
        }
        for (content_type, model) in request_models {
            value.add_request_model(model, content_type);
        }
        for (parameter, required) in &metadata.request_parameters {
            value.add_request_parameter(parameter.as_str(), *required);
        }

        Ok(Endpoint::new(method, path, value))
    }

    fn resolve_response(&mut self, stack: &mut Stack, response: &MethodResponse) -> BuildResult<ResolvedMethodResponse> {
        let response_models = response
            .response_models
            .iter()
            .map(|(content_type, spec)| Ok((content_type.clone(), self.models.create_spec(stack, spec)?)))
            .collect::<BuildResult<_>>()?;
        Ok(ResolvedMethodResponse {
            status_code: response.status_code.clone(),
            response_parameters: response.response_parameters.clone(),
            response_models,
        })
    }

    fn check_unique(&self, operation_id: &str, method: HttpMethod, path: &str) -> BuildResult<()> {
        if self.endpoints.iter().any(|e| e.operation_id() == operation_id) {
            return Err(BuildError::DuplicateResource(format!("operation {operation_id}")));
        }
        if self.endpoints.iter().any(|e| e.http_method == method && e.path == path) {
            return Err(BuildError::DuplicateResource(format!("{method} {path}")));
        }
        Ok(())
    }

    fn add_endpoint(&mut self, stack: &mut Stack, endpoint: Endpoint) -> BuildResult<()> {
        let node = self.ensure_node(stack, &endpoint.path)?;

        self.execution_role.add_to_policy(
            stack,
            PolicyStatement::allow()
                .action("lambda:InvokeFunction")
                .resource(endpoint.value.function().arn()),
        )?;

        let function_arn = endpoint.value.function().handle().sub_attr("Arn");
        let mut properties = Map::new();
        properties.insert("HttpMethod".to_string(), json!(endpoint.http_method.as_str()));
        properties.insert("ResourceId".to_string(), self.tree.resource_id(&node));
        properties.insert("RestApiId".to_string(), self.handle.reference());
        properties.insert("AuthorizationType".to_string(), json!("CUSTOM"));
        properties.insert("AuthorizerId".to_string(), self.authorizer.reference());
        properties.insert("OperationName".to_string(), json!(endpoint.operation_id()));
        properties.insert(
            "Integration".to_string(),
            json!({
                "Type": "AWS_PROXY",
                "IntegrationHttpMethod": "POST",
                "Uri": invocation_uri(&function_arn),
                "Credentials": self.execution_role.arn(),
            }),
        );
        properties.extend(endpoint.value.method_options().to_properties());

        let method = self.add_method(stack, &node, endpoint.http_method.as_str(), Value::Object(properties))?;
        tracing::debug!(
            operation_id = %endpoint.operation_id(),
            method = %endpoint.http_method,
            path = %endpoint.path,
            logical_id = %method.id(),
            "endpoint bound"
        );
        self.endpoints.push(endpoint);
        Ok(())
    }

    fn ensure_node(&mut self, stack: &mut Stack, path: &str) -> BuildResult<RouteNode> {
        let node = self.tree.ensure_resource(stack, path)?;
        for created in self.tree.drain_created() {
            self.add_cors_preflight(stack, &created)?;
        }
        Ok(node)
    }

    fn add_method(
        &mut self,
        stack: &mut Stack,
        node: &RouteNode,
        verb: &str,
        properties: Value,
    ) -> BuildResult<ResourceRef> {
        let id = stack.unique_id(&LogicalId::from_parts(&[self.id.as_str(), node.path(), verb]));
        let method = stack.add(id, Resource::new("AWS::ApiGateway::Method", properties))?;
        stack.add_dependency(&self.deployment, &method);
        Ok(method)
    }

    /// Answer `OPTIONS` on `node` for every origin.
    fn add_cors_preflight(&mut self, stack: &mut Stack, node: &RouteNode) -> BuildResult<()> {
        let header = |name: &str| format!("method.response.header.Access-Control-Allow-{name}");
        let properties = json!({
            "HttpMethod": "OPTIONS",
            "ResourceId": self.tree.resource_id(node),
            "RestApiId": self.handle.reference(),
            "AuthorizationType": "NONE",
            "Integration": {
                "Type": "MOCK",
                "RequestTemplates": { "application/json": "{ statusCode: 200 }" },
                "IntegrationResponses": [{
                    "StatusCode": "204",
                    "ResponseParameters": {
                        header("Headers"): CORS_ALLOW_HEADERS,
                        header("Origin"): "'*'",
                        header("Methods"): CORS_ALLOW_METHODS,
                        header("Credentials"): "'true'",
                    },
                }],
            },
            "MethodResponses": [{
                "StatusCode": "204",
                "ResponseParameters": {
                    header("Headers"): true,
                    header("Origin"): true,
                    header("Methods"): true,
                    header("Credentials"): true,
                },
            }],
        });
        self.add_method(stack, node, "OPTIONS", properties)?;
        Ok(())
    }

    /// Markdown route summary for CI job pages.
    pub fn summary_markdown(&self) -> String {
        summary_markdown(&self.name, Some(&self.description), self.vanity_domain(), &self.endpoints)
    }

    /// Log the resolved routes and append the job summary when configured.
    ///
    /// A summary that cannot be written is logged, never fatal.
    pub fn report(&self) {
        let routes: Vec<&str> = self.tree.paths().collect();
        tracing::info!(api = %self.name, ?routes, "OpenAPIRestAPI routes");

        let Some(path) = &self.options.step_summary else {
            return;
        };
        let markdown = self.summary_markdown();
        tracing::debug!(%markdown, "Markdown for job summary");
        if let Err(e) = append_step_summary(path, &markdown) {
            tracing::warn!(path = %path.display(), error = %e, "Unable to produce job step summary");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_models::basic_object;
    use crate::domain::hosted_zone_context_key;
    use restkit_auth::TokenUse;

    #[derive(Debug)]
    struct Shared {
        bucket_arn: String,
    }

    fn shared() -> Shared {
        Shared {
            bucket_arn: "arn:aws:s3:::service-data".to_string(),
        }
    }

    fn grant_read(function: &mut LambdaFunction, shared: &Shared) {
        function.add_to_role_policy(
            PolicyStatement::allow()
                .action("s3:GetObject")
                .resource(json!(format!("{}/*", shared.bucket_arn))),
        );
    }

    fn props() -> RestApiProps {
        RestApiProps {
            description: "Template API - example".to_string(),
            sub_domain: "template-api".to_string(),
            hosted_zone_domain: "example.com".to_string(),
            ..RestApiProps::default()
        }
    }

    fn verifier() -> Verifier {
        Verifier {
            name: "ExamplePool".to_string(),
            user_pool_id: "eu-west-2_abc".to_string(),
            token_use: TokenUse::Access,
            client_id: "client".to_string(),
            oauth_url: "https://auth.example.com".to_string(),
        }
    }

    fn api(stack: &mut Stack) -> RestApi<Shared> {
        RestApi::new(stack, "Template API", props(), shared(), RestApiOptions::default()).unwrap()
    }

    #[test]
    fn registers_routes_and_binds_methods() {
        let mut stack = Stack::new("TestStack");
        let mut api = api(&mut stack);
        api.register_endpoints(
            &mut stack,
            &[
                RouteMetadata::new("getStatus", "GET /status", "status-handler").with_grants(grant_read),
                RouteMetadata::new("getOpenAPISpec", "GET /openapi", "openapi-handler"),
            ],
        );

        assert!(api.failures().is_empty());
        assert_eq!(api.endpoints().len(), 2);

        let template = stack.synth();
        assert_eq!(template.count_of_type("AWS::ApiGateway::Resource"), 2);
        // two bound methods plus a preflight on the root and each node
        assert_eq!(template.count_of_type("AWS::ApiGateway::Method"), 5);
        assert!(template.has_resource_properties(
            "AWS::ApiGateway::Method",
            &json!({
                "HttpMethod": "GET",
                "OperationName": "getStatus",
                "AuthorizationType": "CUSTOM",
                "Integration": { "Type": "AWS_PROXY", "IntegrationHttpMethod": "POST" },
            })
        ));
        assert!(template.has_resource_properties(
            "AWS::ApiGateway::RestApi",
            &json!({ "Name": "Template API", "Description": "Template API - example" })
        ));
    }

    #[test]
    fn grants_and_invoke_permission_reach_policies() {
        let mut stack = Stack::new("TestStack");
        let mut api = api(&mut stack);
        api.register_endpoints(
            &mut stack,
            &[RouteMetadata::new("getStatus", "GET /status", "status-handler").with_grants(grant_read)],
        );

        let template = stack.synth();
        assert!(template.has_resource_properties(
            "AWS::IAM::Policy",
            &json!({
                "PolicyDocument": { "Statement": [{ "Action": "s3:GetObject", "Effect": "Allow" }] }
            })
        ));
        let invoke = api.execution_role().statements();
        assert_eq!(invoke.len(), 1);
        assert_eq!(invoke[0].actions, vec!["lambda:InvokeFunction".to_string()]);
    }

    #[test]
    fn unsupported_method_is_skipped_and_the_batch_continues() {
        let mut stack = Stack::new("TestStack");
        let mut api = api(&mut stack);
        api.register_endpoints(
            &mut stack,
            &[
                RouteMetadata::new("patchItem", "PATCH /items", "items-handler"),
                RouteMetadata::new("getStatus", "GET /status", "status-handler"),
            ],
        );

        assert_eq!(api.endpoints().len(), 1);
        assert_eq!(api.failures().len(), 1);
        let failure = &api.failures()[0];
        assert_eq!(failure.operation_id, "patchItem");
        assert!(matches!(failure.error, BuildError::UnsupportedMethod { ref method, .. } if method == "PATCH"));
        assert!(!stack.contains(&LogicalId::from("PatchItem")));
    }

    #[test]
    fn rejected_routes_leave_no_resources_behind() {
        let mut stack = Stack::new("TestStack");
        let mut api = api(&mut stack);
        let before = stack.resource_count();

        api.register_endpoints(
            &mut stack,
            &[
                RouteMetadata::new("getBad", "GET //", "bad-handler"),
                RouteMetadata::new("", "GET /x", "x-handler"),
                RouteMetadata::new("Template API", "GET /clash", "clash-handler"),
            ],
        );

        assert!(api.endpoints().is_empty());
        assert_eq!(api.failures().len(), 3);
        assert_eq!(api.failures()[0].error, BuildError::invalid_path("//"));
        assert!(matches!(api.failures()[1].error, BuildError::Configuration(_)));
        assert_eq!(
            api.failures()[2].error,
            BuildError::DuplicateResource("TemplateAPI".to_string())
        );
        assert_eq!(stack.resource_count(), before);
        assert!(!stack.contains(&LogicalId::from("GetBad")));
        assert!(!stack.contains(&LogicalId::from("ServiceRole")));
    }

    #[test]
    fn bad_path_next_to_a_good_route_only_adds_the_good_one() {
        let mut stack = Stack::new("TestStack");
        let mut api = api(&mut stack);
        let before = stack.resource_count();

        api.register_endpoints(
            &mut stack,
            &[
                RouteMetadata::new("getBad", "GET //", "bad-handler"),
                RouteMetadata::new("getStatus", "GET /status", "status-handler"),
            ],
        );

        assert_eq!(api.endpoints().len(), 1);
        assert_eq!(api.endpoints()[0].operation_id(), "getStatus");
        assert_eq!(api.failures().len(), 1);
        assert_eq!(api.failures()[0].operation_id, "getBad");
        // function, its service role, the path resource, its preflight,
        // the bound method and the execution role's first policy
        assert_eq!(stack.resource_count(), before + 6);
        assert!(stack.contains(&LogicalId::from("GetStatus")));
    }

    #[test]
    fn authorizer_arn_with_verifiers_fails_before_any_resource() {
        let mut stack = Stack::new("TestStack");
        let props = RestApiProps {
            verifiers: vec![verifier()],
            authorizer_arn: Some("arn:aws:lambda:eu-west-2:123:function:auth".to_string()),
            ..props()
        };

        let result = RestApi::new(&mut stack, "Template API", props, shared(), RestApiOptions::default());

        assert!(matches!(result, Err(BuildError::Configuration(_))));
        assert_eq!(stack.resource_count(), 0);
    }

    #[test]
    fn authorizer_arn_with_path_is_rejected() {
        let mut stack = Stack::new("TestStack");
        let props = RestApiProps {
            authorizer_path: Some("custom-authorizer".to_string()),
            authorizer_arn: Some("arn:aws:lambda:eu-west-2:123:function:auth".to_string()),
            ..props()
        };

        let result = RestApi::new(&mut stack, "Template API", props, shared(), RestApiOptions::default());
        assert!(matches!(result, Err(BuildError::Configuration(_))));
    }

    #[test]
    fn default_authorizer_carries_the_verifiers() {
        let mut stack = Stack::new("TestStack");
        let props = RestApiProps {
            verifiers: vec![verifier()],
            ..props()
        };
        let api = RestApi::new(&mut stack, "Template API", props, shared(), RestApiOptions::default()).unwrap();

        let expected = verifiers_to_env(&[verifier()]).unwrap();
        let template = stack.synth();
        assert!(template.has_resource_properties(
            "AWS::Lambda::Function",
            &json!({
                "MemorySize": 256,
                "Timeout": 5,
                "Environment": { "Variables": { AUTH_VERIFIERS_ENV: expected } },
            })
        ));
        assert!(template.has_resource_properties(
            "AWS::ApiGateway::Authorizer",
            &json!({ "Type": "REQUEST", "IdentitySource": IDENTITY_SOURCE })
        ));
        assert_eq!(api.stage_name(), "v1");
    }

    #[test]
    fn imported_authorizer_creates_no_function() {
        let mut stack = Stack::new("TestStack");
        let arn = "arn:aws:lambda:eu-west-2:123:function:auth";
        let props = RestApiProps {
            authorizer_arn: Some(arn.to_string()),
            ..props()
        };
        let api = RestApi::new(&mut stack, "Template API", props, shared(), RestApiOptions::default()).unwrap();

        assert_eq!(stack.synth().count_of_type("AWS::Lambda::Function"), 0);
        assert_eq!(api.authorizer_arn(), json!(arn));
    }

    #[test]
    fn nested_paths_share_their_parents() {
        let mut stack = Stack::new("TestStack");
        let mut api = api(&mut stack);
        api.register_endpoints(
            &mut stack,
            &[
                RouteMetadata::new("getC", "GET /a/b/c", "c-handler"),
                RouteMetadata::new("postB", "POST /a/b", "b-handler"),
            ],
        );

        assert!(api.failures().is_empty());
        assert_eq!(api.route_tree().node_count(), 3);
        assert_eq!(stack.synth().count_of_type("AWS::ApiGateway::Resource"), 3);
    }

    #[test]
    fn duplicate_method_and_path_is_recorded() {
        let mut stack = Stack::new("TestStack");
        let mut api = api(&mut stack);
        api.register_endpoints(
            &mut stack,
            &[
                RouteMetadata::new("getStatus", "GET /status", "status-handler"),
                RouteMetadata::new("getStatusAgain", "GET /status", "status-handler"),
            ],
        );

        assert_eq!(api.endpoints().len(), 1);
        assert_eq!(
            api.failures()[0].error,
            BuildError::DuplicateResource("GET /status".to_string())
        );
    }

    #[test]
    fn shared_models_are_created_once() {
        let mut stack = Stack::new("TestStack");
        let mut api = api(&mut stack);
        let ok = MethodResponse::new(200).with_model("application/json", basic_object());
        api.register_endpoints(
            &mut stack,
            &[
                RouteMetadata::new("getOne", "GET /one", "one-handler").with_response(ok.clone()),
                RouteMetadata::new("getTwo", "GET /two", "two-handler").with_response(ok),
            ],
        );
        api.setup_basic_models(&mut stack).unwrap();

        assert_eq!(api.models().len(), 3);
        assert_eq!(stack.synth().count_of_type("AWS::ApiGateway::Model"), 3);
    }

    #[test]
    fn direct_routes_validate_the_path() {
        let mut stack = Stack::new("TestStack");
        let mut api = api(&mut stack);
        let function = LambdaFunction::new("getThing", "thing-handler", FunctionConfig::default())
            .materialise(&mut stack)
            .unwrap();

        let err = api
            .get(&mut stack, "thing", OpenApiFunction::new("getThing", function.clone()))
            .err();
        assert_eq!(err, Some(BuildError::invalid_path("thing")));
        let before = stack.resource_count();
        let err = api
            .get(&mut stack, "//", OpenApiFunction::new("getThing", function.clone()))
            .err();
        assert_eq!(err, Some(BuildError::invalid_path("//")));
        assert_eq!(stack.resource_count(), before);

        api.get(&mut stack, "/thing", OpenApiFunction::new("getThing", function)).unwrap();
        assert_eq!(api.endpoints()[0].path, "/thing");
    }

    #[test]
    fn vanity_domain_needs_the_zone() {
        let mut stack = Stack::new("TestStack");
        let options = RestApiOptions {
            create_cname_record: true,
            ..RestApiOptions::default()
        };
        let result = RestApi::new(&mut stack, "Template API", props(), shared(), options.clone());
        assert!(matches!(result, Err(BuildError::ExternalProvider(_))));

        let mut stack = Stack::new("TestStack").with_context(hosted_zone_context_key("example.com"), "Z123");
        let api = RestApi::new(&mut stack, "Template API", props(), shared(), options).unwrap();
        assert_eq!(api.vanity_domain(), Some("template-api.example.com"));
        assert!(api.summary_markdown().contains("https://template-api.example.com"));
    }

    #[test]
    fn report_appends_the_route_table() {
        let dir = tempfile::tempdir().unwrap();
        let summary = dir.path().join("summary.md");
        let mut stack = Stack::new("TestStack");
        let options = RestApiOptions {
            step_summary: Some(summary.clone()),
            ..RestApiOptions::default()
        };
        let mut api = RestApi::new(&mut stack, "Template API", props(), shared(), options).unwrap();
        api.register_endpoints(
            &mut stack,
            &[
                RouteMetadata::new("getStatus", "GET /status", "status-handler"),
                RouteMetadata::new("getOpenAPISpec", "GET /openapi", "openapi-handler"),
            ],
        );

        api.report();

        let written = std::fs::read_to_string(summary).unwrap();
        assert!(written.starts_with("# Template API"));
        assert!(written.contains("| getStatus | GET | /status |"));
        assert!(written.contains("no-vanity-url-registered"));
        let rows: Vec<&str> = written
            .lines()
            .skip_while(|line| !line.starts_with("| ---"))
            .skip(1)
            .filter(|line| line.starts_with('|'))
            .collect();
        assert_eq!(rows.len(), 2);
    }
}
