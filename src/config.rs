//! Configuration for the extraction pipeline.
//!
//! All per-request tunables live in one [`ExtractionConfig`] built via its
//! builder. The external collaborators (storage, layout service, completion
//! service, audit store) are configured separately at client construction
//! time — client handles are long-lived and process-wide, while this struct
//! only holds the knobs the pipeline logic itself reads.

use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The sentence the layout service emits under the energy-consumption table
/// in intervenor templates. A line matching this exactly has the rendered
/// table block spliced in before it.
///
/// Matching is byte-exact by design: the same fragile-but-faithful rule the
/// deployed pipeline uses. A rephrased sentence means no splice.
pub const DEFAULT_TABLE_TRIGGER: &str = "This table shows the percentage increase in energy consumption by various countries over the last five years.";

/// Configuration for one extraction pipeline.
///
/// # Example
/// ```rust
/// use regdoc_extract::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .temperature(0.1)
///     .max_tokens(8192)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Storage container holding submitted documents. Default: "documents".
    pub documents_container: String,

    /// Storage container figure images are uploaded to. Default: "images".
    pub images_container: String,

    /// Trigger sentence for table splicing. Default: [`DEFAULT_TABLE_TRIGGER`].
    pub table_trigger: String,

    /// Sampling temperature for the completion. Default: 0.1.
    ///
    /// Low temperature keeps the structured-extraction output consistent
    /// across runs of the same document.
    pub temperature: f32,

    /// Nucleus-sampling threshold. Default: 0.95.
    pub top_p: f32,

    /// Output-token ceiling for the completion. Default: 11 576.
    ///
    /// Large because the model echoes question text back verbatim inside the
    /// JSON; a dense multi-page data request can approach this.
    pub max_tokens: u32,

    /// Interval between layout-analysis status polls, in milliseconds.
    /// Default: 2000.
    pub analysis_poll_interval_ms: u64,

    /// Overall ceiling on layout-analysis polling, in seconds. Default: 300.
    /// Exceeding it is an analysis failure, never a silent empty result.
    pub analysis_timeout_secs: u64,

    /// Override for the default extraction system prompt.
    pub system_prompt: Option<String>,

    /// Per-document system-prompt overrides, keyed by document name. Checked
    /// before `system_prompt`. Lets one known template get a tuned prompt
    /// without forking the pipeline.
    pub prompt_overrides: HashMap<String, String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            documents_container: "documents".to_string(),
            images_container: "images".to_string(),
            table_trigger: DEFAULT_TABLE_TRIGGER.to_string(),
            temperature: 0.1,
            top_p: 0.95,
            max_tokens: 11_576,
            analysis_poll_interval_ms: 2000,
            analysis_timeout_secs: 300,
            system_prompt: None,
            prompt_overrides: HashMap::new(),
        }
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn documents_container(mut self, name: impl Into<String>) -> Self {
        self.config.documents_container = name.into();
        self
    }

    pub fn images_container(mut self, name: impl Into<String>) -> Self {
        self.config.images_container = name.into();
        self
    }

    pub fn table_trigger(mut self, sentence: impl Into<String>) -> Self {
        self.config.table_trigger = sentence.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn top_p(mut self, p: f32) -> Self {
        self.config.top_p = p.clamp(0.0, 1.0);
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn analysis_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.analysis_poll_interval_ms = ms.max(100);
        self
    }

    pub fn analysis_timeout_secs(mut self, secs: u64) -> Self {
        self.config.analysis_timeout_secs = secs;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn prompt_override(
        mut self,
        document_name: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        self.config
            .prompt_overrides
            .insert(document_name.into(), prompt.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if c.documents_container.is_empty() || c.images_container.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "container names must be non-empty".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(ExtractError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.analysis_timeout_secs == 0 {
            return Err(ExtractError::InvalidConfig(
                "analysis_timeout_secs must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
