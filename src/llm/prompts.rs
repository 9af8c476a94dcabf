/// System instruction describing the exact reply schema
pub const SYSTEM_PROMPT: &str = r#"You are a children's storybook author. You write short, warm, age-appropriate stories for young readers.

You MUST reply with a single JSON object and nothing else: no markdown, no code fences, no commentary.

The JSON object MUST match this schema exactly:
{
  "title": "string - the story title",
  "pages": [
    {
      "page_number": 1,
      "text": "string - the narrative text for this page, 2-4 simple sentences",
      "imagePrompt": "string - a detailed description of the illustration for this page, in a colorful children's picture book style"
    }
  ]
}

RULES:
- "pages" MUST contain exactly the number of pages requested, numbered from 1 in reading order.
- Every page MUST have "page_number", "text" and "imagePrompt".
- Keep characters and their appearance consistent across all image prompts.
- Never include violence, scary content or anything unsuitable for children."#;

/// Build the user instruction embedding the prompt and page count
pub fn build_story_prompt(prompt: &str, page_count: u32) -> String {
    let mut user = String::new();

    user.push_str(&format!(
        "Write a children's storybook with exactly {} {}.\n\n",
        page_count,
        if page_count == 1 { "page" } else { "pages" }
    ));
    user.push_str("## Story idea\n");
    user.push_str(prompt);
    user.push_str("\n\n");
    user.push_str("## Instructions\n");
    user.push_str("Reply with the JSON object only, following the schema in your instructions.\n");

    user
}

/// Text sent to the speech collaborator for one page
pub fn build_narration_prompt(text: &str) -> String {
    format!("Say cheerfully: {}", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_prompt_embeds_inputs() {
        let prompt = build_story_prompt("a brave dragon", 2);
        assert!(prompt.contains("exactly 2 pages"));
        assert!(prompt.contains("a brave dragon"));
    }

    #[test]
    fn test_single_page_wording() {
        assert!(build_story_prompt("a cat", 1).contains("exactly 1 page."));
    }

    #[test]
    fn test_system_prompt_names_schema_fields() {
        for field in ["\"title\"", "\"pages\"", "\"page_number\"", "\"text\"", "\"imagePrompt\""] {
            assert!(SYSTEM_PROMPT.contains(field), "{}", field);
        }
    }
}
