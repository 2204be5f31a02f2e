use crate::override_tracking::services::SecurityOverrideDetail;
use crate::shared::Result;
use async_trait::async_trait;

/// A package/version pair to query a vulnerability database for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageQuery {
    pub name: String,
    pub version: String,
}

impl PackageQuery {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// SecurityProvider port for fetching vulnerability metadata.
///
/// Lookups complete or fail independently per package: a provider returns
/// the records it could resolve and never fails the whole batch because one
/// package errored.
#[async_trait]
pub trait SecurityProvider {
    async fn fetch_override_details(
        &self,
        packages: Vec<PackageQuery>,
    ) -> Result<Vec<SecurityOverrideDetail>>;

    /// Short provider name recorded in ledgers (e.g. `"osv"`).
    fn provider_name(&self) -> &str;
}
