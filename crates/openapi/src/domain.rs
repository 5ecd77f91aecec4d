//! Optional vanity domain: certificate, custom domain, DNS record.

use serde_json::json;

use restkit_core::{BuildResult, LogicalId, Resource, ResourceRef, Stack};

/// Record TTL, in seconds.
pub const CNAME_TTL_SECS: u64 = 300;

/// Context key answering the hosted zone lookup for `domain`.
pub fn hosted_zone_context_key(domain: &str) -> String {
    format!("hosted-zone:domainName={domain}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VanityDomain {
    pub domain_name: String,
    pub certificate: ResourceRef,
    pub domain: ResourceRef,
    pub cname_record: ResourceRef,
}

/// Bind `{sub_domain}.{hosted_zone_domain}` to the API's stage.
///
/// The zone lookup is answered from the stack context; a miss is an
/// external provider failure and aborts the build.
pub fn create_vanity_domain(
    stack: &mut Stack,
    rest_api: &ResourceRef,
    stage: &ResourceRef,
    sub_domain: &str,
    hosted_zone_domain: &str,
) -> BuildResult<VanityDomain> {
    let domain_name = format!("{sub_domain}.{hosted_zone_domain}");
    let zone_id = stack
        .lookup_context(&hosted_zone_context_key(hosted_zone_domain))?
        .to_string();

    let certificate = stack.add(
        LogicalId::from_parts(&[domain_name.as_str(), "Certificate"]),
        Resource::new(
            "AWS::CertificateManager::Certificate",
            json!({
                "DomainName": domain_name,
                "DomainValidationOptions": [{
                    "DomainName": domain_name,
                    "HostedZoneId": zone_id,
                }],
                "ValidationMethod": "DNS",
            }),
        ),
    )?;

    let domain = stack.add(
        LogicalId::from_parts(&[sub_domain, "domain-name"]),
        Resource::new(
            "AWS::ApiGateway::DomainName",
            json!({
                "DomainName": domain_name,
                "RegionalCertificateArn": certificate.reference(),
                "EndpointConfiguration": { "Types": ["REGIONAL"] },
            }),
        ),
    )?;

    stack.add(
        LogicalId::from_parts(&[sub_domain, "domain-name", "Mapping"]),
        Resource::new(
            "AWS::ApiGateway::BasePathMapping",
            json!({
                "DomainName": domain.reference(),
                "RestApiId": rest_api.reference(),
                "Stage": stage.reference(),
            }),
        ),
    )?;

    let cname_record = stack.add(
        "cname-record",
        Resource::new(
            "AWS::Route53::RecordSet",
            json!({
                "Name": format!("{domain_name}."),
                "Type": "CNAME",
                "HostedZoneId": zone_id,
                "ResourceRecords": [domain.attr("RegionalDomainName")],
                "TTL": CNAME_TTL_SECS.to_string(),
            }),
        ),
    )?;

    Ok(VanityDomain {
        domain_name,
        certificate,
        domain,
        cname_record,
    })
}
