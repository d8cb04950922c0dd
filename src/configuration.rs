use std::time::Duration;

use serde::Deserialize;

const CONFIGURATION_FILE: &str = "configuration.yaml";

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub api_keys: ApiKeySettings,
    pub groq: GroqSettings,
    pub gemini: GeminiSettings,
    pub scraping: ScrapingSettings,
    pub discovery: DiscoverySettings,
    pub prompts: PromptSettings,
    pub defaults: FallbackSettings,
    pub files: FileSettings,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Blank keys are treated the same as missing ones.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct ApiKeySettings {
    pub groq: Option<String>,
    pub gemini: Option<String>,
}

impl ApiKeySettings {
    pub fn groq(&self) -> Option<&str> {
        non_blank(self.groq.as_deref())
    }

    pub fn gemini(&self) -> Option<&str> {
        non_blank(self.gemini.as_deref())
    }
}

fn non_blank(key: Option<&str>) -> Option<&str> {
    key.map(str::trim).filter(|k| !k.is_empty())
}

/// OpenAI compatible chat completions endpoint, Groq by default.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct GroqSettings {
    pub url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub timeout_secs: u64,
    pub content_limit: usize,
}

impl Default for GroqSettings {
    fn default() -> Self {
        GroqSettings {
            url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama3-8b-8192".to_string(),
            temperature: 0.3,
            max_tokens: 1000,
            top_p: 1.0,
            timeout_secs: 30,
            content_limit: 3000,
        }
    }
}

impl GroqSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct GeminiSettings {
    pub url: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
    pub content_limit: usize,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        GeminiSettings {
            url: "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
                .to_string(),
            temperature: 0.3,
            max_output_tokens: 1000,
            timeout_secs: 30,
            content_limit: 2000,
        }
    }
}

impl GeminiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ScrapingSettings {
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub request_delay_ms: u64,
    pub max_content_length: usize,
    pub min_content_length: usize,
    pub remove_elements: Vec<String>,
    pub content_selectors: Vec<String>,
}

impl Default for ScrapingSettings {
    fn default() -> Self {
        ScrapingSettings {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            request_timeout_secs: 20,
            request_delay_ms: 500,
            max_content_length: 4000,
            min_content_length: 50,
            remove_elements: to_strings(&[
                "script", "style", "nav", "footer", "header", "aside", "iframe", "noscript",
            ]),
            content_selectors: to_strings(&[
                "main",
                r#"[role="main"]"#,
                ".main-content",
                "#main-content",
                ".content",
                ".hero",
                ".hero-section",
                ".banner",
                ".jumbotron",
                ".about",
                ".about-us",
                ".company",
                ".overview",
                ".description",
                ".intro",
                ".mission",
                ".vision",
                "article",
                "section",
                "h1",
                "h2",
                "h3",
                "p",
            ]),
        }
    }
}

impl ScrapingSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Candidate url templates, `{company}` is replaced by a name variant.
    pub domain_patterns: Vec<String>,
    pub parked_indicators: Vec<String>,
    pub min_body_bytes: usize,
    pub skip_domains: Vec<String>,
    pub search_url: String,
    pub search_query_suffix: String,
    pub redirect_param: String,
    pub min_token_len: usize,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        DiscoverySettings {
            domain_patterns: to_strings(&[
                "https://www.{company}.com",
                "https://{company}.com",
                "https://www.{company}.io",
                "https://{company}.io",
                "https://www.{company}.co",
                "https://{company}.co",
                "https://www.{company}.net",
                "https://{company}.net",
                "https://www.{company}.org",
                "https://{company}.org",
            ]),
            parked_indicators: to_strings(&[
                "domain for sale",
                "parked domain",
                "buy this domain",
                "domain expired",
            ]),
            min_body_bytes: 1000,
            skip_domains: to_strings(&[
                "facebook.com",
                "twitter.com",
                "linkedin.com",
                "instagram.com",
                "youtube.com",
                "crunchbase.com",
                "wikipedia.org",
                "github.com",
                "reddit.com",
                "medium.com",
                "bloomberg.com",
                "forbes.com",
                "bing.com",
                "google.com",
                "yahoo.com",
                "pinterest.com",
            ]),
            search_url: "https://duckduckgo.com/html/".to_string(),
            search_query_suffix: "official website".to_string(),
            redirect_param: "uddg".to_string(),
            min_token_len: 4,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct PromptSettings {
    pub groq_system: String,
    pub groq_template: String,
    pub gemini_template: String,
}

impl Default for PromptSettings {
    fn default() -> Self {
        PromptSettings {
            groq_system: "You are a business intelligence expert who provides accurate, structured analysis of companies. Always respond with valid JSON only.".to_string(),
            groq_template: r#"You are a business intelligence expert. Analyze the company information below and provide insights.

Company: {company_name}
Website Content: {website_content}

Provide a JSON response with exactly these fields:
- "summary": 2-3 sentences describing what the company does, their main products/services
- "industry": Primary industry sector (e.g., Technology, Healthcare, Finance, Manufacturing)
- "automation_pitch": 2-3 sentences describing a specific AI automation solution for this company

Respond only with valid JSON, no additional text:"#
                .to_string(),
            gemini_template: r#"
Analyze the following company information:

Company Name: {company_name}
Website Content: {website_content}

Please provide:
1. A brief summary (2-3 sentences) of what this company does
2. The industry this company operates in (one or two words)
3. A custom AI automation idea that could be pitched to this company (2-3 sentences focusing on their specific business needs)

Format your response as JSON:
{
    "summary": "Brief company summary here",
    "industry": "Industry name",
    "automation_pitch": "Custom AI automation pitch here"
}
"#
            .to_string(),
        }
    }
}

/// Used only when no website was found and both providers came back empty.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct FallbackSettings {
    pub summary: String,
    pub industry: String,
    pub automation_pitch: String,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        FallbackSettings {
            summary: "Company information for {company_name} not available".to_string(),
            industry: "Unknown".to_string(),
            automation_pitch: "Contact us for custom AI automation solutions".to_string(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct FileSettings {
    pub input: String,
    pub output: String,
    pub sample: String,
    pub name_column: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        FileSettings {
            input: "sample_companies.csv".to_string(),
            output: "enriched_companies.csv".to_string(),
            sample: "sample_companies.csv".to_string(),
            name_column: "company_name".to_string(),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(
            config::File::new(CONFIGURATION_FILE, config::FileFormat::Yaml).required(false),
        )
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
