use axum::{extract::FromRequestParts, http::request::Parts};

use crate::errors::ServiceError;

pub const TENANT_HEADER: &str = "x-tenant-id";

/// Resolved tenant context for a request.
///
/// Tenant resolution itself (sessions, API keys) lives in the gateway in
/// front of this service; by the time a request reaches a handler the
/// tenant id is expected in the `X-Tenant-Id` header. Services never
/// read ambient state: the context is passed explicitly to every core
/// operation, and every query it issues is scoped to `tenant_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    pub tenant_id: i64,
}

impl TenantContext {
    pub fn new(tenant_id: i64) -> Self {
        Self { tenant_id }
    }
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ServiceError::Unauthorized(format!("missing {TENANT_HEADER} header"))
            })?;

        let tenant_id: i64 = raw.parse().map_err(|_| {
            ServiceError::Unauthorized(format!("invalid {TENANT_HEADER} header"))
        })?;
        if tenant_id <= 0 {
            return Err(ServiceError::Unauthorized(format!(
                "invalid {TENANT_HEADER} header"
            )));
        }

        Ok(TenantContext::new(tenant_id))
    }
}
