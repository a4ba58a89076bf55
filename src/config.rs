use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub nlu_provider: String,
    pub luis_app_id: String,
    pub luis_api_key: String,
    pub luis_api_host_name: String,
    pub luis_slot: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub groq_api_key: String,
    pub groq_model: String,
    pub conversation_ttl_minutes: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "flightbook.db".to_string()),
            nlu_provider: env::var("NLU_PROVIDER")
                .map(|v| v.to_lowercase())
                .unwrap_or_else(|_| "luis".to_string()),
            luis_app_id: env::var("LUIS_APP_ID").unwrap_or_default(),
            luis_api_key: env::var("LUIS_API_KEY").unwrap_or_default(),
            luis_api_host_name: env::var("LUIS_API_HOST_NAME").unwrap_or_default(),
            luis_slot: env::var("LUIS_SLOT").unwrap_or_else(|_| "production".to_string()),
            ollama_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ollama_model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string()),
            groq_api_key: env::var("GROQ_API_KEY").unwrap_or_default(),
            groq_model: env::var("GROQ_MODEL")
                .unwrap_or_else(|_| "llama-3.1-8b-instant".to_string()),
            conversation_ttl_minutes: env::var("CONVERSATION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|m: &i64| *m > 0)
                .unwrap_or(30),
        }
    }

    pub fn nlu_configured(&self) -> bool {
        match self.nlu_provider.as_str() {
            "luis" => {
                !self.luis_app_id.is_empty()
                    && !self.luis_api_key.is_empty()
                    && !self.luis_api_host_name.is_empty()
            }
            "groq" => !self.groq_api_key.is_empty(),
            "ollama" => !self.ollama_url.is_empty(),
            _ => false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            database_url: ":memory:".to_string(),
            nlu_provider: "none".to_string(),
            luis_app_id: String::new(),
            luis_api_key: String::new(),
            luis_api_host_name: String::new(),
            luis_slot: "production".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2".to_string(),
            groq_api_key: String::new(),
            groq_model: "llama-3.1-8b-instant".to_string(),
            conversation_ttl_minutes: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luis_needs_all_credentials() {
        let mut config = AppConfig {
            nlu_provider: "luis".to_string(),
            luis_app_id: "app".to_string(),
            luis_api_key: "key".to_string(),
            ..Default::default()
        };
        assert!(!config.nlu_configured());
        config.luis_api_host_name = "westeurope.api.cognitive.microsoft.com".to_string();
        assert!(config.nlu_configured());
    }

    #[test]
    fn test_none_is_never_configured() {
        assert!(!AppConfig::default().nlu_configured());
    }
}
