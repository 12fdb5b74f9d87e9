//! Prompt Templates
//!
//! Every tutoring task is driven by a Markdown template with a single
//! placeholder. Built-in templates are compiled into the binary and any
//! `*.md` file in an override directory replaces the template sharing its
//! file stem.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::{error::TutorError, messages::RequestKind};

/// A task the tutor can build a prompt for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptTask {
    Curriculum,
    Socratic,
    Quiz,
    Project,
    /// Free-form chat that did not match a command.
    General,
}

impl PromptTask {
    pub const ALL: [PromptTask; 5] = [
        PromptTask::Curriculum,
        PromptTask::Socratic,
        PromptTask::Quiz,
        PromptTask::Project,
        PromptTask::General,
    ];

    /// File stem of the template for this task.
    pub fn key(self) -> &'static str {
        match self {
            PromptTask::Curriculum => "curriculum",
            PromptTask::Socratic => "socratic",
            PromptTask::Quiz => "quiz",
            PromptTask::Project => "project",
            PromptTask::General => "general",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            PromptTask::Socratic => "{concept}",
            PromptTask::General => "{message}",
            _ => "{topic}",
        }
    }
}

impl From<RequestKind> for PromptTask {
    fn from(kind: RequestKind) -> Self {
        match kind {
            RequestKind::Curriculum => PromptTask::Curriculum,
            RequestKind::Socratic => PromptTask::Socratic,
            RequestKind::Quiz => PromptTask::Quiz,
            RequestKind::Project => PromptTask::Project,
        }
    }
}

/// The set of templates the tutor renders prompts from.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    templates: HashMap<String, String>,
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptLibrary {
    /// Templates shipped with the crate.
    pub fn builtin() -> Self {
        let templates = [
            ("curriculum", include_str!("../prompts/curriculum.md")),
            ("socratic", include_str!("../prompts/socratic.md")),
            ("quiz", include_str!("../prompts/quiz.md")),
            ("project", include_str!("../prompts/project.md")),
            ("general", include_str!("../prompts/general.md")),
        ]
        .into_iter()
        .map(|(key, body)| (key.to_string(), body.to_string()))
        .collect();

        Self { templates }
    }

    /// Builds a library from an explicit map, e.g. for tests.
    pub fn from_templates(templates: HashMap<String, String>) -> Self {
        Self { templates }
    }

    /// Replaces built-in templates with every `*.md` file found in `dir`.
    pub fn with_overrides_from(mut self, dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read prompts directory {}", dir.display()))?;

        for entry in entries {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
                let key = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .context("Could not get file stem")?
                    .to_string();
                let body = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read prompt {}", path.display()))?;
                info!(prompt = %key, path = %path.display(), "Loaded prompt override");
                self.templates.insert(key, body);
            }
        }

        Ok(self)
    }

    /// Renders the template for `task`, substituting `value` for its placeholder.
    pub fn render(&self, task: PromptTask, value: &str) -> Result<String, TutorError> {
        let template = self
            .templates
            .get(task.key())
            .ok_or_else(|| TutorError::MissingPrompt(task.key().to_string()))?;
        debug!(prompt = task.key(), "Rendering prompt");
        Ok(template.replace(task.placeholder(), value))
    }
}
