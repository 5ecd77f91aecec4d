use lambda_runtime::{Error, LambdaEvent, service_fn};

use restkit_api::handlers::authorizer::AuthorizerHandler;
use restkit_auth::{AuthorizerRequest, JwksTokenVerifier};

#[tokio::main]
async fn main() -> Result<(), Error> {
    restkit_observability::init_for_lambda();

    let handler = AuthorizerHandler::from_env(JwksTokenVerifier::new(reqwest::Client::new()))?;
    tracing::info!(verifiers = handler.verifiers().len(), "authorizer ready");
    let handler = &handler;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<AuthorizerRequest>| async move {
        Ok::<_, Error>(handler.handle(&event.payload).await)
    }))
    .await
}
