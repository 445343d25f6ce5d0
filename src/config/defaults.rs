//! Default values for configuration

/// Default chat completion endpoint (OpenAI-compatible)
pub fn default_chat_base_url() -> String {
    std::env::var("STAMPY_CHAT_URL").unwrap_or_else(|_| "https://openrouter.ai/api".to_string())
}

/// Default chat model
pub fn default_chat_model() -> String {
    "google/gemini-2.5-flash-lite".to_string()
}

/// Default environment variable name for the chat API key
pub fn default_chat_api_key_env() -> String {
    "STAMPY_API_KEY".to_string()
}

/// Default connect timeout for chat requests, in seconds
pub fn default_chat_connect_timeout() -> u64 {
    10
}

/// Default overall timeout for chat requests, in seconds
pub fn default_chat_timeout() -> u64 {
    120
}

/// Default user agent
pub fn default_crawl_user_agent() -> String {
    format!("stampy/{} (Site Indexer)", env!("CARGO_PKG_VERSION"))
}

/// Default request timeout in seconds
pub fn default_crawl_timeout() -> u64 {
    30
}

/// Default maximum pages fetched per sitemap
pub fn default_crawl_max_pages() -> u32 {
    1000
}

/// Default number of passages retrieved per search
pub fn default_search_top_k() -> usize {
    5
}
