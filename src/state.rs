// src/state.rs
use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::config::AppConfig;
use crate::ingest::IngestJob;
use crate::services::{
    FakeNewsDetector, HuggingFaceSummarizer, MyMemoryTranslator, RandomDetector, Summarizer,
    Translator,
};
use crate::store::{ArticleStore, Stores, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub articles: Arc<dyn ArticleStore>,
    pub users: Arc<dyn UserStore>,
    pub jwt: JwtKeys,
    pub ingest: Arc<IngestJob>,
    pub summarizer: Arc<dyn Summarizer>,
    pub translator: Arc<dyn Translator>,
    pub detector: Arc<dyn FakeNewsDetector>,
}

impl AppState {
    /// Production wiring: real providers and text services from `config`.
    pub fn new(config: AppConfig, stores: Stores) -> Self {
        let ingest = Arc::new(IngestJob::from_config(stores.articles.clone(), &config));
        let summarizer = Arc::new(HuggingFaceSummarizer::new(config.hf_token.clone()));
        Self {
            jwt: JwtKeys::from_config(&config.jwt),
            articles: stores.articles,
            users: stores.users,
            ingest,
            summarizer,
            translator: Arc::new(MyMemoryTranslator::new()),
            detector: Arc::new(RandomDetector),
            config: Arc::new(config),
        }
    }

    /// In-memory stores, test config, no configured providers.
    pub fn for_tests() -> Self {
        Self::new(AppConfig::for_tests(), Stores::memory())
    }

    pub fn with_ingest_job(mut self, job: IngestJob) -> Self {
        self.ingest = Arc::new(job);
        self
    }

    pub fn with_summarizer(mut self, s: Arc<dyn Summarizer>) -> Self {
        self.summarizer = s;
        self
    }

    pub fn with_translator(mut self, t: Arc<dyn Translator>) -> Self {
        self.translator = t;
        self
    }

    pub fn with_detector(mut self, d: Arc<dyn FakeNewsDetector>) -> Self {
        self.detector = d;
        self
    }
}
