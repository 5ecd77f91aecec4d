//! Resources shared between routes, handed to every grant callback.

use serde_json::json;

use restkit_core::{BuildResult, LambdaFunction, PolicyStatement, RemovalPolicy, Resource, ResourceRef, Stack};

pub const SERVICE_BUCKET_ID: &str = "ServiceDataBucket";

const S3_READ_ACTIONS: [&str; 3] = ["s3:GetObject*", "s3:GetBucket*", "s3:List*"];

/// Created once per stack; routes only borrow it.
#[derive(Debug, Clone)]
pub struct Resources {
    service_bucket: ResourceRef,
    service_bucket_name: String,
}

impl Resources {
    pub fn create(stack: &mut Stack, service_bucket_name: &str) -> BuildResult<Self> {
        let service_bucket = stack.add(
            SERVICE_BUCKET_ID,
            Resource::new(
                "AWS::S3::Bucket",
                json!({
                    "BucketName": service_bucket_name,
                    "VersioningConfiguration": { "Status": "Enabled" },
                }),
            )
            .with_removal_policy(RemovalPolicy::Delete),
        )?;

        Ok(Self {
            service_bucket,
            service_bucket_name: service_bucket_name.to_string(),
        })
    }

    pub fn service_bucket(&self) -> &ResourceRef {
        &self.service_bucket
    }

    pub fn service_bucket_name(&self) -> &str {
        &self.service_bucket_name
    }

    /// Let `function` read the bucket and its objects.
    pub fn grant_read(&self, function: &mut LambdaFunction) {
        let bucket_arn = self.service_bucket.attr("Arn");
        function.add_to_role_policy(
            PolicyStatement::allow()
                .actions(S3_READ_ACTIONS)
                .resource(bucket_arn.clone())
                .resource(json!({ "Fn::Join": ["", [bucket_arn, "/*"]] })),
        );
    }
}

#[cfg(test)]
mod tests {
    use restkit_core::FunctionConfig;

    use super::*;

    #[test]
    fn bucket_is_versioned_and_destroyed_with_the_stack() {
        let mut stack = Stack::new("TestStack");
        let resources = Resources::create(&mut stack, "test-stack-stub-bucket-name").unwrap();

        let template = stack.synth();
        assert!(template.has_resource_properties(
            "AWS::S3::Bucket",
            &json!({
                "BucketName": "test-stack-stub-bucket-name",
                "VersioningConfiguration": { "Status": "Enabled" },
            })
        ));
        assert_eq!(template.as_json()["Resources"][SERVICE_BUCKET_ID]["DeletionPolicy"], "Delete");
        assert_eq!(resources.service_bucket_name(), "test-stack-stub-bucket-name");
    }

    #[test]
    fn created_once_per_stack() {
        let mut stack = Stack::new("TestStack");
        Resources::create(&mut stack, "bucket").unwrap();
        assert!(Resources::create(&mut stack, "bucket").is_err());
    }

    #[test]
    fn grant_read_covers_bucket_and_objects() {
        let mut stack = Stack::new("TestStack");
        let resources = Resources::create(&mut stack, "bucket").unwrap();
        let mut function = LambdaFunction::new("GetStatus", "status-handler", FunctionConfig::default());

        resources.grant_read(&mut function);

        let statement = &function.statements()[0];
        assert_eq!(statement.actions.len(), 3);
        assert_eq!(statement.resources.len(), 2);
        assert_eq!(statement.resources[0], json!({ "Fn::GetAtt": [SERVICE_BUCKET_ID, "Arn"] }));
    }
}
