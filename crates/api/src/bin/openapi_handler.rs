use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;

use restkit_api::handlers::openapi::{self, GatewayExporter};

#[tokio::main]
async fn main() -> Result<(), Error> {
    restkit_observability::init_for_lambda();

    let exporter = GatewayExporter::from_env().await;
    let exporter = &exporter;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        Ok::<_, Error>(openapi::respond(exporter, event.payload).await)
    }))
    .await
}
