// All LLM prompt templates for the AEO tasks.
// Placeholders are `{name}` and are substituted verbatim by llm_client::prompts::render.

/// Rewrite prompt. Replace: {text}, {style}, {max_length}
pub const REWRITE_PROMPT_TEMPLATE: &str = r#"You are a content rewriting expert. You will rewrite the given text in the specified style, adhering to the maximum length if provided.

Original Text: {text}
Style: {style}
Maximum Length: {max_length}

Return the rewritten content in the `rewrittenText` field."#;

/// AEO score prompt. Replace: {query}, {text}
pub const SCORE_PROMPT_TEMPLATE: &str = r#"You are an AI content optimization expert. Your task is to predict the likelihood of a given text being used as an answer by AI, based on the provided search query.

Analyze the following content and provide an AEO score (0-100), along with a breakdown of the contributing factors (length, structure, schema, intent match, readability) and suggestions for improvement.

Query: {query}
Content: {text}

The aeoScore is a number between 0 and 100.
The breakdown contains lengthScore, structureScore, schemaScore, intentMatchScore, and readabilityScore, each a number between 0 and 100.
The suggestions field is a list of short, actionable strings."#;

/// Concise answer prompt. Replace: {question}, {max_length}, {text}, {readability_level}
pub const CONCISE_ANSWER_PROMPT_TEMPLATE: &str = r#"You are an editor that must produce a single-sentence concise answer to the question: {question}. The answer must be no more than {max_length} characters, avoid marketing language, be factual, and be suitable for voice assistant readout. Use the following text as the source for your answer: {text}. The answer should be at the readability level of: {readability_level}."#;
