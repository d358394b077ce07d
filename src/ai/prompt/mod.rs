//! Prompt Builder System
//!
//! Prompt construction for the summary and translation requests. Prompts are
//! plain text; code is embedded verbatim so small completion models see the
//! function exactly as written.

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Instruction line(s)
    Text(String),
    /// Labeled single-line fact, e.g. `Language: Rust`
    Fact { label: String, value: String },
    /// Code embedded without fences
    Code(String),
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text(content.to_string()));
        self
    }

    pub fn fact(mut self, label: &str, value: &str) -> Self {
        self.sections.push(PromptSection::Fact {
            label: label.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn code(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Code(content.to_string()));
        self
    }

    /// Sections joined by blank lines; consecutive facts share a block
    pub fn build(self) -> String {
        let mut prompt = String::new();
        let mut previous_fact = false;

        for section in self.sections {
            let is_fact = matches!(section, PromptSection::Fact { .. });
            if !prompt.is_empty() {
                prompt.push_str(if is_fact && previous_fact { "\n" } else { "\n\n" });
            }
            match section {
                PromptSection::Text(content) => prompt.push_str(content.trim_end()),
                PromptSection::Fact { label, value } => {
                    prompt.push_str(&format!("{}: {}", label, value))
                }
                PromptSection::Code(content) => prompt.push_str(content.trim_end_matches('\n')),
            }
            previous_fact = is_fact;
        }

        prompt
    }
}

/// Preset prompt templates
pub struct PromptTemplates;

impl PromptTemplates {
    /// One-sentence description of a function
    pub fn summary(name: &str, language: &str, code: &str) -> String {
        PromptBuilder::new()
            .text(&format!(
                "Describe what a function named '{}' likely does in 1 sentence.",
                name
            ))
            .fact("Language", language)
            .code(code)
            .build()
    }

    /// Convert a function between languages, code only
    pub fn translation(from: &str, to: &str, code: &str) -> String {
        PromptBuilder::new()
            .text(&format!(
                "Convert this {} function to {}. Keep the same logic and functionality:",
                from, to
            ))
            .code(code)
            .text("Provide only the converted code without explanations.")
            .build()
    }
}

/// Drop a surrounding markdown code fence if the model added one anyway
pub fn strip_code_fence(output: &str) -> &str {
    let trimmed = output.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // First line after the opening fence is the info string
    match body.split_once('\n') {
        Some((_, code)) => code.trim_matches('\n'),
        None => body.trim(),
    }
}
