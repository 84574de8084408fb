//! Process configuration, read once at startup from `GRADESCALED_*` variables:
//! - `GRADESCALED_LOG` - tracing filter directive (default `info`)
//! - `GRADESCALED_SEED_TEMPLATES` - comma list of template ids seeded into each new school

use crate::scale::templates::get_template;

pub const ENV_LOG: &str = "GRADESCALED_LOG";
pub const ENV_SEED_TEMPLATES: &str = "GRADESCALED_SEED_TEMPLATES";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub log_filter: String,
    pub seed_templates: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            seed_templates: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(filter) = lookup(ENV_LOG) {
            let filter = filter.trim();
            if !filter.is_empty() {
                config.log_filter = filter.to_string();
            }
        }
        if let Some(raw) = lookup(ENV_SEED_TEMPLATES) {
            for part in raw.split(',') {
                let id = part.trim().to_ascii_lowercase();
                if id.is_empty() {
                    continue;
                }
                if get_template(&id).is_err() {
                    anyhow::bail!("{}: unknown template id {:?}", ENV_SEED_TEMPLATES, id);
                }
                if !config.seed_templates.contains(&id) {
                    config.seed_templates.push(id);
                }
            }
        }
        Ok(config)
    }
}
