pub mod analyzer;
pub mod content_extractor;
pub mod data_persistance;
pub mod domain_scraper;
pub mod gemini_client;
pub mod http_client;
pub mod lead_enricher;
pub mod openai_client;
pub mod response_parser;
pub mod search_scraper;

pub use analyzer::*;
pub use content_extractor::*;
pub use data_persistance::*;
pub use domain_scraper::*;
pub use gemini_client::*;
pub use http_client::*;
pub use lead_enricher::*;
pub use openai_client::*;
pub use response_parser::*;
pub use search_scraper::*;
