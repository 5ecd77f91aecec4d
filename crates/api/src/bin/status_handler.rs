use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;

use restkit_api::handlers::status::{self, STATUS_INFO_ENV};

#[tokio::main]
async fn main() -> Result<(), Error> {
    restkit_observability::init_for_lambda();

    let status_info = std::env::var(STATUS_INFO_ENV).ok();
    let status_info = status_info.as_deref();

    lambda_runtime::run(service_fn(move |_event: LambdaEvent<Value>| async move {
        Ok::<_, Error>(status::respond(status_info))
    }))
    .await
}
