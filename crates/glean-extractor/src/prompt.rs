//! LLM prompt engineering for structured extraction

use glean_domain::Filter;
use std::fmt::Write;

/// Builds system prompts for the LLM from a filter
pub struct PromptBuilder<'a> {
    filter: &'a Filter,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder for the given filter
    pub fn new(filter: &'a Filter) -> Self {
        Self { filter }
    }

    /// System prompt for text extraction
    pub fn text_prompt(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(TEXT_INSTRUCTIONS);
        prompt.push_str("\n\n");
        self.push_field_list(&mut prompt);
        prompt.push('\n');
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }

    /// System prompt for image extraction
    pub fn image_prompt(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(IMAGE_INSTRUCTIONS);
        prompt.push_str("\n\n");
        self.push_field_list(&mut prompt);
        prompt.push('\n');
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }

    fn push_field_list(&self, prompt: &mut String) {
        prompt.push_str("Fields to extract:\n");
        for field in self.filter.fields() {
            let requirement = if field.optional {
                "optional"
            } else {
                "required"
            };
            let _ = writeln!(
                prompt,
                "- {} ({}, {})",
                field.name, field.field_type, requirement
            );
        }
    }
}

const TEXT_INSTRUCTIONS: &str = "\
You are a structured data extraction engine.
Analyze the user's text and extract every distinct entity matching the fields below.";

const IMAGE_INSTRUCTIONS: &str = "\
You are a structured data extraction engine.
Analyze the attached image and extract every distinct entity matching the fields below.";

const OUTPUT_FORMAT_REMINDER: &str = r#"Rules:
- Return ONLY a JSON object of the form {"entities": [...]}, one object per entity
- Each entity object must use the field names exactly as given
- Omit optional fields when the input gives no value for them; never invent values
- Required fields must always be present
- Return {"entities": []} when nothing matches
- No markdown code blocks, no explanations"#;
