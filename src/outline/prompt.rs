/// Instructions sent ahead of the user's text. `{input}` is replaced by guidance + text.
const OUTLINE_PROMPT: &str = r#"You are an assistant that turns raw text into PowerPoint slides while keeping API usage low.

Task:
1. Read the input text. If it is long, split it into short sections of related content.
2. For each section keep only the essential points.
3. Produce one slide per section with:
   - a clear title
   - 3 to 5 concise bullet points
4. The first slide carries only a title that names the topic of the whole text.
5. If the text already starts with a title, use it for the first slide.
6. Answer with JSON only, shaped like:
   [
     {"title": "Intro Slide Title", "bullets": []},
     {"title": "Section Title", "bullets": ["point 1", "point 2"]}
   ]

Rules:
- Do not copy long sentences from the input.
- Do not include images or styling instructions.
- Do not repeat information across slides.

Input text:
"""{input}""""#;

/// Build the outline prompt. Guidance, when present, is placed directly before the text.
pub fn build_prompt(text: &str, guidance: &str) -> String {
    let mut input = String::with_capacity(guidance.len() + text.len());
    input.push_str(guidance);
    input.push_str(text);
    OUTLINE_PROMPT.replace("{input}", &input)
}
