// file: src/llm/prompt.rs
// description: prompt templates for grounded question answering
// reference: placeholder substitution in the style of langchain PromptTemplate

use crate::models::SearchResult;
use std::collections::HashMap;

const HR_ASSISTANT_TEMPLATE: &str = "
You are an HR assistant. Answer based only on the resume information provided.

Resume Information:
{context}

Question: {input}

Answer clearly and concisely. If information is not available, say \"I don't have that information.\"

Answer: ";

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn hr_assistant() -> Self {
        Self::with_custom_template(HR_ASSISTANT_TEMPLATE.to_string())
    }

    pub fn with_custom_template(template: String) -> Self {
        Self { template }
    }

    pub fn render(&self, context: &str, input: &str) -> String {
        let mut values = HashMap::new();
        values.insert("context", context);
        values.insert("input", input);
        self.render_with_map(&values)
    }

    /// Substitute `{key}` placeholders in one pass, so braces inside the
    /// substituted values are never expanded again. Unknown placeholders are
    /// left as they are.
    pub fn render_with_map(&self, values: &HashMap<&str, &str>) -> String {
        let mut result = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find('{') {
            result.push_str(&rest[..open]);
            let after = &rest[open + 1..];

            match after.find('}') {
                Some(close) if values.contains_key(&after[..close]) => {
                    result.push_str(values[&after[..close]]);
                    rest = &after[close + 1..];
                }
                _ => {
                    result.push('{');
                    rest = after;
                }
            }
        }

        result.push_str(rest);
        result
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::hr_assistant()
    }
}

/// Concatenate retrieved resume texts into one context block.
pub fn stuff_documents(documents: &[SearchResult]) -> String {
    documents
        .iter()
        .map(|doc| doc.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
