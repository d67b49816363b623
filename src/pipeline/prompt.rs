//! Prompt assembly: wrap linearized document text into the bounded few-shot
//! message sequence sent to the completion endpoint.
//!
//! The sequence is always exactly six messages (system, two exemplar pairs,
//! the live document), so prompt size scales only with the document itself.

use crate::config::ExtractionConfig;
use crate::model::{CompletionRequest, PromptMessage};
use crate::prompts;

/// Build the completion request for one document.
///
/// The system message resolves in precedence order: a per-document override
/// from the config, then the config-wide system prompt, then the built-in
/// default. The linearized text goes into the final user message verbatim.
pub fn build_request(
    linearized: &str,
    config: &ExtractionConfig,
    document_name: &str,
) -> CompletionRequest {
    let system = config
        .prompt_overrides
        .get(document_name)
        .map(String::as_str)
        .or(config.system_prompt.as_deref())
        .unwrap_or(prompts::SYSTEM_PROMPT);

    CompletionRequest {
        messages: vec![
            PromptMessage::system(system),
            PromptMessage::user(prompts::EXEMPLAR_1_INPUT),
            PromptMessage::assistant(prompts::EXEMPLAR_1_OUTPUT),
            PromptMessage::user(prompts::EXEMPLAR_2_INPUT),
            PromptMessage::assistant(prompts::EXEMPLAR_2_OUTPUT),
            PromptMessage::user(linearized),
        ],
        temperature: config.temperature,
        top_p: config.top_p,
        max_tokens: config.max_tokens,
    }
}
