use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use thiserror::Error;

use crate::{
    configuration::Settings,
    domain::{AnalysisResult, CompanyRecord},
};

use super::{ContentExtractor, DomainScraper, Fetcher, LlmAnalyzer};

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("Company name is empty")]
    EmptyName,
}

/// Discovery, extraction and analysis for one company at a time.
pub struct LeadEnricher {
    discoverer: DomainScraper,
    extractor: ContentExtractor,
    analyzer: LlmAnalyzer,
    settings: Arc<Settings>,
}

impl LeadEnricher {
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: Arc<Settings>) -> Self {
        LeadEnricher {
            discoverer: DomainScraper::new(fetcher.clone(), settings.clone()),
            extractor: ContentExtractor::new(fetcher.clone(), settings.clone()),
            analyzer: LlmAnalyzer::new(fetcher, settings.clone()),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn enrich_one(&self, company_name: &str) -> Result<CompanyRecord, EnrichError> {
        let name = company_name.trim();
        if name.is_empty() {
            return Err(EnrichError::EmptyName);
        }
        log::info!("=== Starting enrichment for: {} ===", name);

        let mut company = CompanyRecord::new(name);

        match self.discoverer.discover(name).await {
            None => {
                log::warn!("No website found for {}", name);
                let context = format!("Company name: {}", name);
                let analysis = self.analyzer.analyze(name, &context).await;
                company.apply(self.or_defaults(name, analysis));
            }
            Some(candidate) => {
                company.website = candidate.url;

                let mut content = self.extractor.extract(&company.website).await;
                if content.is_empty() {
                    log::warn!("No content scraped from {}", company.website);
                    content = format!("Company website: {}", company.website);
                }

                let analysis = self.analyzer.analyze(name, &content).await;
                company.apply(analysis);
            }
        }

        log::info!(
            "Analysis complete for {} | industry: {} | website: {}",
            name,
            company.industry,
            company.website
        );

        tokio::time::sleep(self.settings.scraping.request_delay()).await;

        log::info!("=== Completed enrichment for: {} ===", name);
        Ok(company)
    }

    /// One record per non-blank name, in input order. A company that fails
    /// in any way yields an error record instead of stopping the batch.
    pub async fn enrich_batch(&self, company_names: &[String]) -> Vec<CompanyRecord> {
        let names: Vec<&str> = company_names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .collect();
        let total = names.len();
        let mut records = Vec::with_capacity(total);

        for (idx, name) in names.into_iter().enumerate() {
            log::info!("Processing {}/{}: {}", idx + 1, total, name);

            let record = match AssertUnwindSafe(self.enrich_one(name)).catch_unwind().await {
                Ok(Ok(record)) => record,
                Ok(Err(e)) => {
                    log::error!("Error during enrichment of {}: {}", name, e);
                    CompanyRecord::failed(name, &e.to_string())
                }
                Err(panic) => {
                    let reason = panic_message(panic.as_ref());
                    log::error!("Critical error processing {}: {}", name, reason);
                    CompanyRecord::failed(name, &reason)
                }
            };
            records.push(record);
        }

        records
    }

    fn or_defaults(&self, company_name: &str, analysis: AnalysisResult) -> AnalysisResult {
        if !analysis.is_empty() {
            return analysis;
        }

        let defaults = &self.settings.defaults;
        AnalysisResult {
            summary: defaults.summary.replace("{company_name}", company_name),
            industry: defaults.industry.clone(),
            automation_pitch: defaults.automation_pitch.clone(),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    match payload.downcast_ref::<&str>() {
        Some(message) => message.to_string(),
        None => match payload.downcast_ref::<String>() {
            Some(message) => message.clone(),
            None => "unexpected failure".to_string(),
        },
    }
}
