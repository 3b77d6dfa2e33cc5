//! In-memory [`RemoteAuthority`] for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use iam_client_sdk::{
    AllowedAndDeniedIrns, AuthorizationHeader, IamError, Irn, ResourceLocator, ResourceTypeInfo,
    ResourceTypeSpec,
};

use crate::domain::authority::{RemoteAuthority, ResourceTypePage, TypeGrantQuery};

/// A recorded remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    PrincipalIrn,
    EvaluateOnResources {
        action: String,
        resources: Vec<Irn>,
    },
    AuthorizedOnResourceType {
        action: String,
        tenant_id: Option<String>,
        page_size: u32,
    },
    EvaluateActionsOnIrns {
        actions: Vec<String>,
        irns: Vec<Irn>,
    },
    DatabaseQueryFilter {
        action: String,
        database: String,
    },
    CreateResource(ResourceLocator),
    DeleteResource(Irn),
    CreateResourceType {
        application: Irn,
        spec: ResourceTypeSpec,
    },
    ResourceTypesPage {
        page: u32,
        page_size: u32,
    },
    AttachPolicy {
        policy: Irn,
        principals: Vec<Irn>,
    },
}

pub struct MockAuthority {
    pub principal: Irn,
    pub principal_error: Option<IamError>,
    /// Actions for which `evaluate_on_resources` answers `Forbidden`.
    pub denied_actions: HashSet<String>,
    /// Answer of `authorized_on_resource_type`, per action.
    pub type_grants: HashMap<String, Vec<Irn>>,
    /// Raw answer of `evaluate_actions_on_irns`.
    pub batch_answer: HashMap<String, AllowedAndDeniedIrns>,
    pub db_filter: String,
    pub resource_types: Vec<ResourceTypeInfo>,
    /// Leave `total` out of resource type pages.
    pub omit_total: bool,
    /// Returned by every call except `principal_irn`.
    pub remote_error: Option<IamError>,
    /// Every call, in order. Tests read it through [`MockAuthority::recorded`].
    pub calls: Mutex<Vec<Call>>,
    /// Credential presented on each recorded call.
    pub headers: Mutex<Vec<AuthorizationHeader>>,
}

impl Default for MockAuthority {
    fn default() -> Self {
        Self {
            principal: irn("irn:acme:iamcore:t-1::user/ops/alice"),
            principal_error: None,
            denied_actions: HashSet::new(),
            type_grants: HashMap::new(),
            batch_answer: HashMap::new(),
            db_filter: String::new(),
            resource_types: Vec::new(),
            omit_total: false,
            remote_error: None,
            calls: Mutex::new(Vec::new()),
            headers: Mutex::new(Vec::new()),
        }
    }
}

pub fn irn(s: &str) -> Irn {
    s.parse().unwrap()
}

impl MockAuthority {
    pub fn failing_principal(err: IamError) -> Self {
        Self {
            principal_error: Some(err),
            ..Self::default()
        }
    }

    pub fn failing(err: IamError) -> Self {
        Self {
            remote_error: Some(err),
            ..Self::default()
        }
    }

    pub fn recorded(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn seen_headers(&self) -> Vec<AuthorizationHeader> {
        self.headers.lock().unwrap().clone()
    }

    fn record(&self, header: &AuthorizationHeader, call: Call) -> Result<(), IamError> {
        self.calls.lock().unwrap().push(call);
        self.headers.lock().unwrap().push(header.clone());
        match &self.remote_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteAuthority for MockAuthority {
    async fn principal_irn(&self, header: &AuthorizationHeader) -> Result<Irn, IamError> {
        self.calls.lock().unwrap().push(Call::PrincipalIrn);
        self.headers.lock().unwrap().push(header.clone());
        match &self.principal_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.principal.clone()),
        }
    }

    async fn evaluate_on_resources(
        &self,
        header: &AuthorizationHeader,
        action: &str,
        resources: &[Irn],
    ) -> Result<(), IamError> {
        self.record(
            header,
            Call::EvaluateOnResources {
                action: action.to_owned(),
                resources: resources.to_vec(),
            },
        )?;
        if self.denied_actions.contains(action) {
            return Err(IamError::Forbidden(format!("{action} denied")));
        }
        Ok(())
    }

    async fn authorized_on_resource_type(
        &self,
        header: &AuthorizationHeader,
        query: TypeGrantQuery<'_>,
        page_size: u32,
    ) -> Result<Vec<Irn>, IamError> {
        self.record(
            header,
            Call::AuthorizedOnResourceType {
                action: query.action.to_owned(),
                tenant_id: query.tenant_id.map(ToOwned::to_owned),
                page_size,
            },
        )?;
        Ok(self
            .type_grants
            .get(query.action)
            .cloned()
            .unwrap_or_default())
    }

    async fn evaluate_actions_on_irns(
        &self,
        header: &AuthorizationHeader,
        actions: &[String],
        irns: &[Irn],
    ) -> Result<HashMap<String, AllowedAndDeniedIrns>, IamError> {
        self.record(
            header,
            Call::EvaluateActionsOnIrns {
                actions: actions.to_vec(),
                irns: irns.to_vec(),
            },
        )?;
        Ok(self.batch_answer.clone())
    }

    async fn database_query_filter(
        &self,
        header: &AuthorizationHeader,
        action: &str,
        database: &str,
    ) -> Result<String, IamError> {
        self.record(
            header,
            Call::DatabaseQueryFilter {
                action: action.to_owned(),
                database: database.to_owned(),
            },
        )?;
        Ok(self.db_filter.clone())
    }

    async fn create_resource(
        &self,
        header: &AuthorizationHeader,
        resource: &ResourceLocator,
    ) -> Result<(), IamError> {
        self.record(header, Call::CreateResource(resource.clone()))
    }

    async fn delete_resource(
        &self,
        header: &AuthorizationHeader,
        irn: &Irn,
    ) -> Result<(), IamError> {
        self.record(header, Call::DeleteResource(irn.clone()))
    }

    async fn create_resource_type(
        &self,
        header: &AuthorizationHeader,
        application: &Irn,
        spec: &ResourceTypeSpec,
    ) -> Result<(), IamError> {
        self.record(
            header,
            Call::CreateResourceType {
                application: application.clone(),
                spec: spec.clone(),
            },
        )
    }

    async fn resource_types_page(
        &self,
        header: &AuthorizationHeader,
        _application: &Irn,
        page: u32,
        page_size: u32,
    ) -> Result<ResourceTypePage, IamError> {
        self.record(header, Call::ResourceTypesPage { page, page_size })?;
        let start = (page.saturating_sub(1) * page_size) as usize;
        let items = self
            .resource_types
            .iter()
            .skip(start)
            .take(page_size as usize)
            .cloned()
            .collect();
        Ok(ResourceTypePage {
            items,
            total: (!self.omit_total).then_some(self.resource_types.len() as u64),
        })
    }

    async fn attach_policy(
        &self,
        header: &AuthorizationHeader,
        policy: &Irn,
        principals: &[Irn],
    ) -> Result<(), IamError> {
        self.record(
            header,
            Call::AttachPolicy {
                policy: policy.clone(),
                principals: principals.to_vec(),
            },
        )
    }
}
