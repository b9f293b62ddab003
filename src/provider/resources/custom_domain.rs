use crate::provider::{
    ensure_unchanged, props::without_nulls, Context, HandlerError, Resource, Response,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDomainProps {
    pub domain: String,
    #[serde(default = "default_domain_type")]
    pub domain_type: String,
    #[serde(default)]
    pub verification_method: Option<String>,
    #[serde(default = "default_tls_policy")]
    pub tls_policy: String,
    #[serde(default)]
    pub custom_client_ip_header: Option<String>,
}

fn default_domain_type() -> String {
    "auth0_managed_certs".to_string()
}

fn default_tls_policy() -> String {
    "recommended".to_string()
}

#[derive(Debug, Deserialize)]
struct DomainRecord {
    custom_domain_id: String,
    domain: String,
    #[serde(default)]
    verification: Option<Verification>,
}

#[derive(Debug, Deserialize)]
struct Verification {
    #[serde(default)]
    methods: Vec<VerificationMethod>,
}

#[derive(Debug, Deserialize)]
struct VerificationMethod {
    #[serde(default)]
    record: Option<String>,
}

impl DomainRecord {
    /// Record of the first verification method, empty once verified.
    fn record_value(&self) -> String {
        self.verification
            .as_ref()
            .and_then(|v| v.methods.first())
            .and_then(|m| m.record.clone())
            .unwrap_or_default()
    }

    fn into_response(self, physical_id: &str) -> Response {
        let record = self.record_value();
        Response::new(physical_id)
            .with("customDomainId", physical_id)
            .with("customDomainDomain", self.domain)
            .with("customDomainRecordValue", record)
    }
}

pub struct CustomDomain;

#[async_trait]
impl Resource for CustomDomain {
    const RESOURCE_TYPE: &'static str = "Custom::Auth0CustomDomain";
    type Props = CustomDomainProps;

    #[instrument(skip_all, fields(domain = %props.domain))]
    async fn create(
        &self,
        ctx: &Context<'_>,
        props: &CustomDomainProps,
    ) -> Result<Response, HandlerError> {
        let record: DomainRecord = ctx
            .management()
            .await?
            .post(
                &["custom-domains"],
                &without_nulls(json!({
                    "domain": props.domain,
                    "type": props.domain_type,
                    "verification_method": props.verification_method,
                    "tls_policy": props.tls_policy,
                    "custom_client_ip_header": props.custom_client_ip_header,
                })),
            )
            .await?;

        let id = record.custom_domain_id.clone();
        Ok(record.into_response(&id))
    }

    #[instrument(skip_all, fields(custom_domain_id = %id))]
    async fn update(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &CustomDomainProps,
        old: &CustomDomainProps,
    ) -> Result<Response, HandlerError> {
        ensure_unchanged("CustomDomain", "domain", &props.domain, &old.domain)?;
        ensure_unchanged(
            "CustomDomain",
            "domainType",
            &props.domain_type,
            &old.domain_type,
        )?;

        let record: DomainRecord = ctx
            .management()
            .await?
            .patch(
                &["custom-domains", id],
                &without_nulls(json!({
                    "tls_policy": props.tls_policy,
                    "custom_client_ip_header": props.custom_client_ip_header,
                })),
            )
            .await?;

        Ok(record.into_response(id))
    }

    #[instrument(skip_all, fields(custom_domain_id = %id))]
    async fn delete(
        &self,
        ctx: &Context<'_>,
        id: &str,
        _props: &CustomDomainProps,
    ) -> Result<Response, HandlerError> {
        ctx.management().await?.delete(&["custom-domains", id]).await?;

        Ok(Response::new(id))
    }
}
