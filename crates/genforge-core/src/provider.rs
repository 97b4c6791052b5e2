//! AI provider seam and a prompt-driven stage executor

use crate::executor::{StageContext, StageExecutor};
use anyhow::Context as _;
use genforge_artifact::{GeneratedFile, Language, StageName};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Provider call options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompletionOptions {
    /// Provider-specific model identifier
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// System instructions sent ahead of the prompt
    pub system: Option<String>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.2,
            max_tokens: 8192,
            system: None,
        }
    }
}

/// Text completion backend
#[async_trait::async_trait]
pub trait AiProvider: Send + Sync {
    /// Complete `prompt`
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> anyhow::Result<String>;
}

/// Stage executor that asks an [`AiProvider`] for files
///
/// The response must contain fenced code blocks whose info string carries
/// the target path, e.g. a block opened with ```` ```ts src/app.ts ````.
/// Blocks without a path are ignored; a response with no usable block is a
/// stage error.
pub struct PromptStageExecutor {
    provider: Arc<dyn AiProvider>,
    instructions: String,
    options: CompletionOptions,
}

impl PromptStageExecutor {
    /// Create executor with stage-specific instructions
    #[must_use]
    pub fn new(provider: Arc<dyn AiProvider>, instructions: impl Into<String>) -> Self {
        Self {
            provider,
            instructions: instructions.into(),
            options: CompletionOptions::default(),
        }
    }

    /// Set provider options
    #[inline]
    #[must_use]
    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    /// Prompt sent to the provider for `ctx`
    #[must_use]
    pub fn build_prompt(&self, ctx: &StageContext<'_>) -> String {
        let request = ctx.request;
        let mut prompt = format!(
            "# Stage: {}\n{}\n\n## Project {}\n{}\n\n",
            ctx.stage, self.instructions, request.project_id, request.prompt
        );
        if let Some(language) = &request.language {
            prompt.push_str(&format!("Target language: {language}\n"));
        }
        if let Some(framework) = &request.framework {
            prompt.push_str(&format!("Target framework: {framework}\n"));
        }
        if let Some(database) = &request.requirements.database {
            prompt.push_str(&format!(
                "Database: {} ({})\n",
                database.engine.as_deref().unwrap_or("any"),
                database.entities.join(", ")
            ));
        }

        let mut previous = ctx.previous_files().peekable();
        if previous.peek().is_some() {
            prompt.push_str("\n## Files from earlier stages\n");
            for file in previous {
                prompt.push_str(&format!(
                    "```{} {}\n{}\n```\n",
                    file.language.name(),
                    file.path,
                    file.content.trim_end()
                ));
            }
        }

        prompt.push_str(
            "\nReply with one fenced code block per file; put the language and the file path on the opening fence.\n",
        );
        prompt
    }
}

#[async_trait::async_trait]
impl StageExecutor for PromptStageExecutor {
    async fn execute(&self, ctx: StageContext<'_>) -> anyhow::Result<Vec<GeneratedFile>> {
        let prompt = self.build_prompt(&ctx);
        let response = self
            .provider
            .complete(&prompt, &self.options)
            .await
            .with_context(|| format!("provider call for {} failed", ctx.stage))?;

        let files = extract_files(ctx.stage, &response);
        if files.is_empty() {
            anyhow::bail!("provider response for {} contained no file blocks", ctx.stage);
        }
        tracing::debug!(stage = %ctx.stage, files = files.len(), "extracted files from completion");
        Ok(files)
    }
}

fn clean_path(token: &str) -> &str {
    token
        .strip_prefix("path=")
        .or_else(|| token.strip_prefix("file="))
        .unwrap_or(token)
}

fn looks_like_path(token: &str) -> bool {
    token.contains('/') || token.contains('.')
}

/// Split a fence info string into (language hint, path)
fn parse_fence_info(info: &str) -> Option<(Option<&str>, &str)> {
    let tokens: Vec<&str> = info.split_whitespace().collect();
    match tokens.as_slice() {
        [] => None,
        [only] => {
            let only = clean_path(*only);
            looks_like_path(only).then_some((None, only))
        }
        [lang, rest @ ..] => rest
            .iter()
            .map(|t| clean_path(*t))
            .find(|t| looks_like_path(t))
            .map(|path| (Some(*lang), path)),
    }
}

/// Extract path-tagged fenced code blocks from a completion
#[must_use]
pub fn extract_files(stage: StageName, response: &str) -> Vec<GeneratedFile> {
    let mut files = Vec::new();
    let mut lines = response.lines();

    while let Some(line) = lines.next() {
        let Some(info) = line.trim_start().strip_prefix("```") else {
            continue;
        };
        let target = parse_fence_info(info);

        let mut body = Vec::new();
        for inner in lines.by_ref() {
            if inner.trim() == "```" {
                break;
            }
            body.push(inner);
        }

        let Some((hint, path)) = target else {
            continue;
        };
        let mut content = body.join("\n");
        content.push('\n');

        let mut file = GeneratedFile::new(stage, path, content);
        if file.language == Language::Plaintext {
            if let Some(hint) = hint {
                file = file.with_language(Language::from_name(hint));
            }
        }
        files.push(file);
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::GenerationRequest;
    use tokio_util::sync::CancellationToken;

    const RESPONSE: &str = "Here is the backend:\n\n```ts src/server.ts\nexport const port: number = 3000;\n```\n\n```json\n{\"ignored\": true}\n```\n\n```sql path=db/schema.sql\ncreate table users (id int);\n```\n";

    #[test]
    fn extracts_only_path_tagged_blocks() {
        let files = extract_files(StageName::BackendGeneration, RESPONSE);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "src/server.ts");
        assert_eq!(files[0].language, Language::TypeScript);
        assert_eq!(files[0].content, "export const port: number = 3000;\n");
        assert_eq!(files[1].path, "db/schema.sql");
        assert_eq!(files[1].language, Language::Sql);
    }

    #[test]
    fn language_hint_fills_unknown_extension() {
        let files = extract_files(
            StageName::ArchitectureDesign,
            "```markdown docs/ARCHITECTURE\n# Overview\n```",
        );
        assert_eq!(files[0].language, Language::Markdown);
    }

    #[test]
    fn unterminated_block_runs_to_end() {
        let files = extract_files(StageName::UiGeneration, "```css app/site.css\nbody {}\n");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].content, "body {}\n");
    }

    struct Echo(String);

    #[async_trait::async_trait]
    impl AiProvider for Echo {
        async fn complete(&self, _prompt: &str, _options: &CompletionOptions) -> anyhow::Result<String> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn executor_errors_without_file_blocks() {
        let executor = PromptStageExecutor::new(Arc::new(Echo("no code here".into())), "Design it");
        let request = GenerationRequest::new("p1", "todo app");
        let token = CancellationToken::new();
        let ctx = StageContext {
            stage: StageName::ArchitectureDesign,
            request: &request,
            previous: &[],
            cancellation: &token,
        };

        let err = executor.execute(ctx).await.unwrap_err();
        assert!(err.to_string().contains("no file blocks"));

        let prompt = executor.build_prompt(&ctx);
        assert!(prompt.contains("# Stage: architecture-design"));
        assert!(prompt.contains("todo app"));
    }

    #[test]
    fn prompt_lists_hints_and_earlier_files() {
        use crate::execution::StageRecord;
        use crate::plan::Requirement;

        let executor = PromptStageExecutor::new(Arc::new(Echo(String::new())), "Write the API");
        let request = GenerationRequest::new("p9", "orders").with_language("typescript");
        let mut design = StageRecord::pending(StageName::ArchitectureDesign, Requirement::Required);
        design.start();
        design.complete(vec![GeneratedFile::new(
            StageName::ArchitectureDesign,
            "docs/design.md",
            "# Orders\n",
        )]);
        let previous = [design];
        let token = CancellationToken::new();
        let ctx = StageContext {
            stage: StageName::ApiGeneration,
            request: &request,
            previous: &previous,
            cancellation: &token,
        };

        let prompt = executor.build_prompt(&ctx);
        assert!(prompt.starts_with("# Stage: api-generation\nWrite the API\n\n## Project p9\norders\n\n"));
        assert!(prompt.contains("Target language: typescript\n"));
        assert!(prompt.contains("## Files from earlier stages\n```markdown docs/design.md\n# Orders\n```\n"));
        assert!(prompt.ends_with("opening fence.\n"));
    }

    #[tokio::test]
    async fn executor_returns_extracted_files() {
        let executor = PromptStageExecutor::new(Arc::new(Echo(RESPONSE.into())), "Build it");
        let request = GenerationRequest::new("p1", "api");
        let token = CancellationToken::new();
        let ctx = StageContext {
            stage: StageName::BackendGeneration,
            request: &request,
            previous: &[],
            cancellation: &token,
        };
        let files = executor.execute(ctx).await.unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.stage == StageName::BackendGeneration));
    }
}
