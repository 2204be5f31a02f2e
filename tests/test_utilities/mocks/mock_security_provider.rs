use async_trait::async_trait;
use pastoralist::override_tracking::services::SecurityOverrideDetail;
use pastoralist::prelude::*;

/// Mock SecurityProvider returning preconfigured vulnerability records.
#[derive(Default, Clone)]
pub struct MockSecurityProvider {
    details: Vec<SecurityOverrideDetail>,
}

impl MockSecurityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detail(mut self, package: &str, reason: &str, cve: Option<&str>) -> Self {
        self.details.push(SecurityOverrideDetail {
            package_name: package.to_string(),
            reason: reason.to_string(),
            provider: Some("osv".to_string()),
            cve: cve.map(|c| c.to_string()),
            severity: None,
            description: None,
            url: None,
        });
        self
    }
}

#[async_trait]
impl SecurityProvider for MockSecurityProvider {
    async fn fetch_override_details(
        &self,
        packages: Vec<PackageQuery>,
    ) -> Result<Vec<SecurityOverrideDetail>> {
        Ok(self
            .details
            .iter()
            .filter(|detail| packages.iter().any(|query| query.name == detail.package_name))
            .cloned()
            .collect())
    }

    fn provider_name(&self) -> &str {
        "osv"
    }
}
