//! Synthesised template plus the assertions tests use against it.

use serde_json::Value;

/// A synthesised stack template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template(Value);

impl Template {
    pub(crate) fn new(doc: Value) -> Self {
        Self(doc)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }

    pub fn to_pretty_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.0)
    }

    /// All `(logical id, resource)` pairs of one resource type.
    pub fn resources_of_type(&self, kind: &str) -> Vec<(&str, &Value)> {
        self.0
            .get("Resources")
            .and_then(Value::as_object)
            .map(|resources| {
                resources
                    .iter()
                    .filter(|(_, r)| r.get("Type").and_then(Value::as_str) == Some(kind))
                    .map(|(id, r)| (id.as_str(), r))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn count_of_type(&self, kind: &str) -> usize {
        self.resources_of_type(kind).len()
    }

    /// True if some resource of `kind` has properties matching `expected`.
    ///
    /// Objects match when every expected key matches (extra keys are
    /// ignored); arrays and scalars must match element for element.
    pub fn has_resource_properties(&self, kind: &str, expected: &Value) -> bool {
        self.resources_of_type(kind).into_iter().any(|(_, resource)| {
            resource
                .get("Properties")
                .is_some_and(|actual| object_like(expected, actual))
        })
    }
}

fn object_like(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(exp), Value::Object(act)) => exp
            .iter()
            .all(|(key, value)| act.get(key).is_some_and(|a| object_like(value, a))),
        (Value::Array(exp), Value::Array(act)) => {
            exp.len() == act.len() && exp.iter().zip(act).all(|(e, a)| object_like(e, a))
        }
        _ => expected == actual,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Template {
        Template::new(json!({
            "Resources": {
                "GetStatusMethod": {
                    "Type": "AWS::ApiGateway::Method",
                    "Properties": {
                        "HttpMethod": "GET",
                        "OperationName": "getStatus",
                        "Integration": { "Type": "AWS_PROXY", "IntegrationHttpMethod": "POST" }
                    }
                },
                "Bucket": { "Type": "AWS::S3::Bucket", "Properties": {} }
            }
        }))
    }

    #[test]
    fn partial_property_match_ignores_extra_keys() {
        let template = sample();
        assert!(template.has_resource_properties(
            "AWS::ApiGateway::Method",
            &json!({ "OperationName": "getStatus", "Integration": { "Type": "AWS_PROXY" } })
        ));
        assert!(!template.has_resource_properties(
            "AWS::ApiGateway::Method",
            &json!({ "OperationName": "getOpenAPISpec" })
        ));
    }

    #[test]
    fn resources_are_filtered_by_type() {
        let template = sample();
        assert_eq!(template.count_of_type("AWS::S3::Bucket"), 1);
        assert_eq!(template.count_of_type("AWS::Lambda::Function"), 0);
    }
}
