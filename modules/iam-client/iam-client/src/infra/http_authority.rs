//! [`RemoteAuthority`] over the IAM server HTTP API.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, Request, StatusCode, header};
use http_body_util::{BodyExt, Full};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use iam_client_sdk::{
    AllowedAndDeniedIrns, AuthorizationHeader, IamError, Irn, ResourceLocator, ResourceTypeInfo,
    ResourceTypeSpec,
};
use iam_irn::join_path;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::IamClientConfig;
use crate::domain::authority::{RemoteAuthority, ResourceTypePage, TypeGrantQuery};
use crate::infra::dto::{
    AttachPrincipalsRequest, CreateResourceRequest, CreateResourceTypeRequest, DataEnvelope,
    DatabaseQueryFilterRequest, ErrorEnvelope, EvaluateActionsRequest,
    EvaluateOnResourceTypeRequest, EvaluateRequest, PagedEnvelope,
};

const USER_IRN_PATH: &str = "/api/v1/users/me/irn";
const EVALUATE_PATH: &str = "/api/v1/evaluate";
const EVALUATE_RESOURCES_PATH: &str = "/api/v1/evaluate/resources";
const EVALUATE_ACTIONS_PATH: &str = "/api/v1/evaluate/irns/actions";
const DATABASE_QUERY_FILTER_PATH: &str = "/api/v1/evaluate/database-query-filter";
const RESOURCES_PATH: &str = "/api/v1/resources";
const APPLICATIONS_PATH: &str = "/api/v1/applications";
const POLICIES_PATH: &str = "/api/v1/policies";

type HttpsClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// HTTP client of the IAM server.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct HttpAuthority {
    client: HttpsClient,
    base_url: String,
    timeout: Duration,
}

impl HttpAuthority {
    /// Build a client for the configured server. TLS uses the bundled webpki roots.
    #[must_use]
    pub fn new(config: &IamClientConfig) -> Self {
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();

        Self {
            client: Client::builder(TokioExecutor::new()).build(connector),
            base_url: config.base_url().to_owned(),
            timeout: config.request_timeout,
        }
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        credential: &AuthorizationHeader,
        body: Option<Vec<u8>>,
    ) -> Result<Bytes, IamError> {
        let has_body = body.is_some();
        let mut request = Request::builder()
            .method(method)
            .uri(format!("{}{path}", self.base_url))
            .body(Full::new(Bytes::from(body.unwrap_or_default())))
            .map_err(|e| IamError::Unknown(format!("failed to build IAM server request: {e}")))?;

        credential.apply_to(request.headers_mut());
        request.headers_mut().insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        if has_body {
            request.headers_mut().insert(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static("application/json"),
            );
        }

        let exchange = async {
            let response = self.client.request(request).await.map_err(|e| {
                tracing::error!(error = %e, path, "IAM server request failed");
                IamError::Unknown(format!("IAM server request failed: {e}"))
            })?;
            let status = response.status();
            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, path, "failed to read IAM server response");
                    IamError::Unknown(format!("failed to read IAM server response: {e}"))
                })?
                .to_bytes();
            Ok::<_, IamError>((status, body))
        };

        let (status, body) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| {
                tracing::error!(path, timeout = ?self.timeout, "IAM server request timed out");
                IamError::Unknown(format!(
                    "IAM server request timed out after {}",
                    humantime::format_duration(self.timeout)
                ))
            })??;

        check_status(status, &body)?;
        Ok(body)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        credential: &AuthorizationHeader,
    ) -> Result<T, IamError> {
        let body = self.call(Method::GET, path, credential, None).await?;
        decode(&body)
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        credential: &AuthorizationHeader,
        request: &B,
    ) -> Result<T, IamError> {
        let body = self
            .call(Method::POST, path, credential, Some(encode(request)?))
            .await?;
        decode(&body)
    }

    async fn post_no_content<B: Serialize + Sync>(
        &self,
        path: &str,
        credential: &AuthorizationHeader,
        request: &B,
    ) -> Result<(), IamError> {
        self.call(Method::POST, path, credential, Some(encode(request)?))
            .await
            .map(drop)
    }
}

/// Map a non-2xx answer to its error kind, keeping the server's message.
fn check_status(status: StatusCode, body: &[u8]) -> Result<(), IamError> {
    if status.is_success() {
        return Ok(());
    }
    let message = serde_json::from_slice::<ErrorEnvelope>(body).map_or_else(
        |_| status.canonical_reason().unwrap_or("unexpected status").to_owned(),
        |envelope| envelope.message,
    );
    tracing::debug!(status = status.as_u16(), %message, "IAM server rejected request");
    Err(IamError::from_status(status, message))
}

fn encode<B: Serialize>(request: &B) -> Result<Vec<u8>, IamError> {
    serde_json::to_vec(request)
        .map_err(|e| IamError::Unknown(format!("failed to encode IAM server request: {e}")))
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, IamError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::error!(error = %e, "malformed IAM server response");
        IamError::Unknown(format!("malformed IAM server response: {e}"))
    })
}

#[async_trait]
impl RemoteAuthority for HttpAuthority {
    #[tracing::instrument(skip_all)]
    async fn principal_irn(&self, header: &AuthorizationHeader) -> Result<Irn, IamError> {
        let envelope: DataEnvelope<Irn> = self.get(USER_IRN_PATH, header).await?;
        Ok(envelope.data)
    }

    #[tracing::instrument(skip_all, fields(action = %action, resources = resources.len()))]
    async fn evaluate_on_resources(
        &self,
        header: &AuthorizationHeader,
        action: &str,
        resources: &[Irn],
    ) -> Result<(), IamError> {
        self.post_no_content(
            EVALUATE_PATH,
            header,
            &EvaluateRequest { resources, action },
        )
        .await
    }

    #[tracing::instrument(
        skip_all,
        fields(action = query.action, resource_type = query.resource_type)
    )]
    async fn authorized_on_resource_type(
        &self,
        header: &AuthorizationHeader,
        query: TypeGrantQuery<'_>,
        page_size: u32,
    ) -> Result<Vec<Irn>, IamError> {
        let request = EvaluateOnResourceTypeRequest {
            action: query.action,
            resource_type: query.resource_type,
            application: query.application,
            tenant_id: query.tenant_id,
        };
        let path = format!("{EVALUATE_RESOURCES_PATH}?pageSize={page_size}");
        let envelope: DataEnvelope<Option<Vec<Irn>>> = self.post(&path, header, &request).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    #[tracing::instrument(skip_all, fields(actions = actions.len(), irns = irns.len()))]
    async fn evaluate_actions_on_irns(
        &self,
        header: &AuthorizationHeader,
        actions: &[String],
        irns: &[Irn],
    ) -> Result<HashMap<String, AllowedAndDeniedIrns>, IamError> {
        let envelope: DataEnvelope<Option<HashMap<String, AllowedAndDeniedIrns>>> = self
            .post(
                EVALUATE_ACTIONS_PATH,
                header,
                &EvaluateActionsRequest { irns, actions },
            )
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    #[tracing::instrument(skip_all, fields(action = %action, database = %database))]
    async fn database_query_filter(
        &self,
        header: &AuthorizationHeader,
        action: &str,
        database: &str,
    ) -> Result<String, IamError> {
        let envelope: DataEnvelope<String> = self
            .post(
                DATABASE_QUERY_FILTER_PATH,
                header,
                &DatabaseQueryFilterRequest { action, database },
            )
            .await?;
        Ok(envelope.data)
    }

    #[tracing::instrument(skip_all, fields(resource_type = %resource.resource_type, resource_id = %resource.resource_id))]
    async fn create_resource(
        &self,
        header: &AuthorizationHeader,
        resource: &ResourceLocator,
    ) -> Result<(), IamError> {
        let path = join_path(&iam_irn::split_path(&resource.resource_path));
        let request = CreateResourceRequest {
            name: &resource.resource_id,
            application: &resource.application,
            path: &path,
            resource_type: &resource.resource_type,
            enabled: true,
            tenant_id: resource.tenant_id.as_deref().filter(|t| !t.is_empty()),
        };
        self.post_no_content(RESOURCES_PATH, header, &request).await
    }

    #[tracing::instrument(skip_all, fields(irn = %irn))]
    async fn delete_resource(
        &self,
        header: &AuthorizationHeader,
        irn: &Irn,
    ) -> Result<(), IamError> {
        let path = format!("{RESOURCES_PATH}/{}", irn.encode());
        self.call(Method::DELETE, &path, header, None)
            .await
            .map(drop)
    }

    #[tracing::instrument(skip_all, fields(application = %application, resource_type = %spec.resource_type))]
    async fn create_resource_type(
        &self,
        header: &AuthorizationHeader,
        application: &Irn,
        spec: &ResourceTypeSpec,
    ) -> Result<(), IamError> {
        let path = format!("{APPLICATIONS_PATH}/{}/resource-types", application.encode());
        let request = CreateResourceTypeRequest {
            resource_type: &spec.resource_type,
            action_prefix: &spec.action_prefix,
            operations: &spec.operations,
        };
        self.post_no_content(&path, header, &request).await
    }

    #[tracing::instrument(skip_all, fields(application = %application, page = page))]
    async fn resource_types_page(
        &self,
        header: &AuthorizationHeader,
        application: &Irn,
        page: u32,
        page_size: u32,
    ) -> Result<ResourceTypePage, IamError> {
        let path = format!(
            "{APPLICATIONS_PATH}/{}/resource-types?page={page}&pageSize={page_size}",
            application.encode()
        );
        let envelope: PagedEnvelope<ResourceTypeInfo> = self.get(&path, header).await?;
        Ok(ResourceTypePage {
            items: envelope.data,
            total: envelope.count,
        })
    }

    #[tracing::instrument(skip_all, fields(policy = %policy))]
    async fn attach_policy(
        &self,
        header: &AuthorizationHeader,
        policy: &Irn,
        principals: &[Irn],
    ) -> Result<(), IamError> {
        let path = format!("{POLICIES_PATH}/{}/principals/attach", policy.encode());
        self.post_no_content(
            &path,
            header,
            &AttachPrincipalsRequest {
                principal_irns: principals,
            },
        )
        .await
    }
}
