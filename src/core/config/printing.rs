use crate::core::config::data::{mask_secret, Config};

impl Config {
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec!["Current configuration:".to_string()];
        match &self.openai.api_key {
            Some(key) => lines.push(format!("  api-key: {}", mask_secret(key))),
            None => lines.push("  api-key: (unset, using $OPENAI_API_KEY)".to_string()),
        }
        match &self.openai.base_url {
            Some(url) => lines.push(format!("  base-url: {url}")),
            None => lines.push("  base-url: (default)".to_string()),
        }
        lines.push(format!("  model: {}", self.session.model));
        match self.session.max_tokens {
            0 => lines.push("  max-tokens: (unset)".to_string()),
            n => lines.push(format!("  max-tokens: {n}")),
        }
        lines.push(format!(
            "  store-replies: {}",
            if self.session.store_replies { "on" } else { "off" }
        ));
        lines.push(format!(
            "  request-timeout: {}s",
            self.session.request_timeout_secs
        ));
        match self.clipboard.chunk_size() {
            Some(size) => lines.push(format!("  clipboard: split into {size}-byte parts")),
            None => lines.push("  clipboard: whole reply".to_string()),
        }
        if self.scenarios.is_empty() {
            lines.push("  scenarios: (none configured)".to_string());
        } else {
            lines.push("  scenarios:".to_string());
            for scenario in &self.scenarios {
                lines.push(format!("    {}", scenario.name));
            }
        }
        lines
    }
}
