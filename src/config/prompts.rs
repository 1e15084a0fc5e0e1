//! Prompt templates for Fortell.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub summary: SummaryPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for podcast-style summary generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub system: String,
    pub user: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            system: "You are a professional podcast editor. Your task is to create a \
                     15-20 minute podcast summary script. Use a natural tone with \
                     storytelling flow."
                .to_string(),

            user: r#"Generate part {{part}} of {{total_parts}} of a full 15-20 minute detailed podcast summary. This part should sound natural and continuous. Focus on a detailed summary of the following segment:

{{chunk}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        // Store custom variables
        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            // Load summary prompts if file exists
            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template, substituting `{{key}}` placeholders.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        // Start with custom variables, then override with provided vars
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.summary.system.is_empty());
        assert!(prompts.summary.user.contains("{{part}}"));
        assert!(prompts.summary.user.contains("{{chunk}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Generate part {{part}} of {{total_parts}}: {{chunk}}";
        let mut vars = std::collections::HashMap::new();
        vars.insert("part".to_string(), "1".to_string());
        vars.insert("total_parts".to_string(), "3".to_string());
        vars.insert("chunk".to_string(), "some transcript".to_string());

        let rendered = Prompts::render(template, &vars);
        assert_eq!(rendered, "Generate part 1 of 3: some transcript");
    }

    #[test]
    fn test_custom_variables_are_overridden() {
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("part".to_string(), "custom".to_string());

        let mut vars = std::collections::HashMap::new();
        vars.insert("part".to_string(), "2".to_string());

        let rendered = prompts.render_with_custom("part {{part}}", &vars);
        assert_eq!(rendered, "part 2");
    }
}
