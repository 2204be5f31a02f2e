use crate::override_tracking::services::SecurityOverrideDetail;
use crate::ports::outbound::{PackageQuery, SecurityProvider};
use crate::shared::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OSV API client for fetching vulnerability data for overridden packages.
///
/// Uses the OSV.dev Batch Query API with the npm ecosystem. A package whose
/// detail lookup fails is skipped with a warning; the batch as a whole only
/// fails when the batch endpoint itself is unreachable.
pub struct OsvSecurityProvider {
    client: Client,
    api_url: String,
}

impl OsvSecurityProvider {
    const API_ENDPOINT: &'static str = "https://api.osv.dev/v1/querybatch";
    const DETAIL_ENDPOINT: &'static str = "https://api.osv.dev/v1/vulns";
    const TIMEOUT_SECONDS: u64 = 30;
    const MAX_BATCH_SIZE: usize = 100; // OSV API limit

    pub fn new() -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("pastoralist/{}", version);
        let client = Client::builder()
            .timeout(Duration::from_secs(Self::TIMEOUT_SECONDS))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            api_url: Self::API_ENDPOINT.to_string(),
        })
    }

    /// Strips range sigils so `^4.0.1` queries as `4.0.1`. OSV matches
    /// concrete versions, not ranges.
    fn query_version(version: &str) -> &str {
        version.trim_start_matches(['^', '~', '=', 'v', '>', '<', ' '])
    }

    async fn fetch_batch(&self, packages: &[PackageQuery]) -> Result<Vec<OsvResult>> {
        let queries: Vec<OsvQuery> = packages
            .iter()
            .map(|pkg| OsvQuery {
                package: OsvPackage {
                    name: pkg.name.clone(),
                    ecosystem: "npm".to_string(),
                },
                version: Self::query_version(&pkg.version).to_string(),
            })
            .collect();

        let response = self
            .client
            .post(&self.api_url)
            .json(&OsvBatchQuery { queries })
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("OSV API returned status code {}", response.status());
        }

        let batch_response: OsvBatchResponse = response.json().await?;
        Ok(batch_response.results)
    }

    /// The batch API returns minimal records; severity and references need
    /// a per-vulnerability detail lookup.
    async fn fetch_detail(&self, vuln_id: &str) -> Result<OsvVulnerability> {
        let url = format!(
            "{}/{}",
            Self::DETAIL_ENDPOINT,
            urlencoding::encode(vuln_id)
        );
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!(
                "OSV API returned status code {} for vulnerability {}",
                response.status(),
                vuln_id
            );
        }

        Ok(response.json().await?)
    }

    fn convert(package_name: &str, vuln: &OsvVulnerability) -> SecurityOverrideDetail {
        let cve = if vuln.id.starts_with("CVE-") {
            Some(vuln.id.clone())
        } else {
            vuln.aliases
                .iter()
                .find(|alias| alias.starts_with("CVE-"))
                .cloned()
        };
        let severity = vuln
            .database_specific
            .as_ref()
            .and_then(|db| db.severity.as_ref())
            .map(|s| s.to_lowercase());

        SecurityOverrideDetail {
            package_name: package_name.to_string(),
            reason: format!("Security fix for {}", vuln.id),
            provider: Some("osv".to_string()),
            cve,
            severity,
            description: vuln.summary.clone(),
            url: Some(format!("https://osv.dev/vulnerability/{}", vuln.id)),
        }
    }
}

#[async_trait]
impl SecurityProvider for OsvSecurityProvider {
    async fn fetch_override_details(
        &self,
        packages: Vec<PackageQuery>,
    ) -> Result<Vec<SecurityOverrideDetail>> {
        let mut details = Vec::new();

        for chunk in packages.chunks(Self::MAX_BATCH_SIZE) {
            let results = self.fetch_batch(chunk).await?;

            for (package, result) in chunk.iter().zip(results) {
                let Some(first_vuln) = result.vulns.first() else {
                    continue;
                };
                match self.fetch_detail(&first_vuln.id).await {
                    Ok(vuln) => details.push(Self::convert(&package.name, &vuln)),
                    Err(e) => {
                        // One failed lookup never sinks the batch.
                        eprintln!(
                            "⚠️  Warning: Failed to fetch details for {}: {}",
                            first_vuln.id, e
                        );
                    }
                }
            }
        }

        Ok(details)
    }

    fn provider_name(&self) -> &str {
        "osv"
    }
}

// OSV API request/response structures

#[derive(Debug, Serialize)]
struct OsvBatchQuery {
    queries: Vec<OsvQuery>,
}

#[derive(Debug, Serialize)]
struct OsvQuery {
    package: OsvPackage,
    version: String,
}

#[derive(Debug, Serialize)]
struct OsvPackage {
    name: String,
    ecosystem: String, // "npm"
}

#[derive(Debug, Deserialize)]
struct OsvBatchResponse {
    results: Vec<OsvResult>,
}

#[derive(Debug, Deserialize)]
struct OsvResult {
    #[serde(default)]
    vulns: Vec<OsvVulnRef>,
}

#[derive(Debug, Deserialize)]
struct OsvVulnRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct OsvVulnerability {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    database_specific: Option<DatabaseSpecific>,
}

#[derive(Debug, Deserialize)]
struct DatabaseSpecific {
    #[serde(default)]
    severity: Option<String>, // "CRITICAL", "HIGH", "MODERATE", "LOW"
}
