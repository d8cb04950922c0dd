use serde::Serialize;

/// Upper bound, in characters, for every text field an analysis produces.
pub const MAX_FIELD_CHARS: usize = 500;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyRecord {
    pub name: String,
    pub website: String,
    pub industry: String,
    pub summary: String,
    pub automation_pitch: String,
}

impl CompanyRecord {
    pub fn new(name: &str) -> Self {
        CompanyRecord {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Record emitted when a company could not be processed at all.
    pub fn failed(name: &str, reason: &str) -> Self {
        CompanyRecord {
            name: name.to_string(),
            summary: format!("Processing error: {}", reason),
            ..Default::default()
        }
    }

    pub fn apply(&mut self, analysis: AnalysisResult) {
        self.summary = analysis.summary;
        self.industry = analysis.industry;
        self.automation_pitch = analysis.automation_pitch;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisResult {
    pub summary: String,
    pub industry: String,
    pub automation_pitch: String,
}

impl AnalysisResult {
    /// An empty summary is how callers learn that the analysis failed.
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
    }

    pub fn truncated(self) -> Self {
        AnalysisResult {
            summary: truncate_chars(&self.summary, MAX_FIELD_CHARS),
            industry: truncate_chars(&self.industry, MAX_FIELD_CHARS),
            automation_pitch: truncate_chars(&self.automation_pitch, MAX_FIELD_CHARS),
        }
    }
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// One output row, columns in the order the output file requires.
#[derive(Debug, Serialize)]
pub struct EnrichedRow<'a> {
    pub company_name: &'a str,
    pub website: &'a str,
    pub industry: &'a str,
    pub summary_from_llm: &'a str,
    pub automation_pitch_from_llm: &'a str,
}

impl<'a> From<&'a CompanyRecord> for EnrichedRow<'a> {
    fn from(record: &'a CompanyRecord) -> Self {
        EnrichedRow {
            company_name: &record.name,
            website: &record.website,
            industry: &record.industry,
            summary_from_llm: &record.summary,
            automation_pitch_from_llm: &record.automation_pitch,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrichmentStats {
    pub total: usize,
    pub websites_found: usize,
}

impl EnrichmentStats {
    pub fn from_records(records: &[CompanyRecord]) -> Self {
        EnrichmentStats {
            total: records.len(),
            websites_found: records.iter().filter(|r| !r.website.is_empty()).count(),
        }
    }

    pub fn success_rate(&self) -> f64 {
        match self.total {
            0 => 0.0,
            total => self.websites_found as f64 / total as f64 * 100.0,
        }
    }
}
