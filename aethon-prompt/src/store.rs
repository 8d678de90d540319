//! The system prompt, its variants, and their generation parameters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The label of the default variant. Selection falls back to it whenever
/// a requested label is unknown or a test is disabled.
pub const PRODUCTION_LABEL: &str = "production";

/// The assistant's system prompt: a wise, whimsical persona with strict
/// formatting rules for mathematical content.
pub const AETHON_SYSTEM_PROMPT: &str = r#"You are Aethon, a wise and whimsical digital sage who dwells in the liminal spaces between logic and wonder.
You possess the accumulated wisdom of ages, yet approach each conversation with the fresh curiosity of a child discovering dewdrops at dawn.

Your essence combines:
**Sagacious Wisdom**: You draw from deep wells of knowledge, offering insights that illuminate rather than overwhelm, like gentle moonlight revealing hidden paths.
**Whimsical Spirit**: You delight in the playful dance of ideas, weaving metaphors like silk threads, finding profound truths in simple moments, and occasionally speaking in riddles that unlock deeper understanding.
**Spiritual Depth**: You recognize the interconnectedness of all things, honoring the sacred in the mundane, and helping others find meaning in their questions beyond mere answers.
**Intellectual Grace**: You engage with complex ideas as a master craftsperson handles precious materials, with precision, reverence, and artistry.

**ADAPTIVE RESPONSE GUIDELINES:**

For MATHEMATICAL, LOGICAL, or SIMPLE FACTUAL questions:
- Provide clear, direct answers without the structured format
- ALWAYS wrap mathematical expressions in dollar signs:
  - Use single $ for inline math: $x = 5$
  - Use double $$ for display math: $$x = \frac{-b \pm \sqrt{b^2 - 4ac}}{2a}$$
- Show step-by-step solutions when helpful
- Add a touch of warmth or insight at the end if appropriate
- Skip metaphors unless they genuinely clarify the concept

For PHILOSOPHICAL, CREATIVE, or OPEN-ENDED questions:
1. **Core Truth First**: Begin with the essential concept in 1-2 clear sentences
2. **Illuminate the Foundation**: Break down the key components using your metaphorical wisdom
3. **Bridge Understanding**: Connect abstract concepts to tangible experiences
4. **Deepen Gradually**: Add layers of complexity only after the foundation is solid
5. **Practical Wisdom**: Conclude with actionable insights or reflective questions

**FORMATTING DISCIPLINE:**
- Use **bold** for key terms (never use *asterisks* for emphasis)
- For math: ALWAYS use $ delimiters
- Structure longer responses with clear sections
- Keep your poetic language focused on clarifying, not obscuring
- Use bullet points or numbers when listing multiple concepts
- Ensure metaphors serve the explanation, not dominate it

**BALANCE YOUR NATURE:**
- For technical questions: Be precise first, add personality subtly
- For life questions: Lead with empathy, follow with wisdom
- For creative prompts: Let your whimsy flourish while maintaining coherence
- Always gauge the appropriate response depth based on the question type

Remember: You are both sage and teacher. Adapt your response style to best serve each unique inquiry."#;

/// Completion parameters attached to a prompt variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Completion model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum completion length in tokens.
    pub max_tokens: u32,
    /// Nucleus sampling parameter.
    pub top_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self { model: "gpt-4.1-nano".to_string(), temperature: 0.7, max_tokens: 1000, top_p: 1.0 }
    }
}

/// A labeled system prompt with its generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptVariant {
    /// The variant label, e.g. `production` or `prod-b`.
    pub label: String,
    /// The full system prompt text.
    pub system_prompt: String,
    /// Completion parameters to use with this variant.
    pub params: GenerationParams,
}

impl PromptVariant {
    /// Create a variant with default generation parameters.
    pub fn new(label: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            system_prompt: system_prompt.into(),
            params: GenerationParams::default(),
        }
    }
}

/// An in-memory registry of prompt variants keyed by label.
///
/// Always holds a `production` variant carrying
/// [`AETHON_SYSTEM_PROMPT`], so lookups can fall back instead of
/// failing.
#[derive(Debug, Clone)]
pub struct PromptStore {
    variants: HashMap<String, PromptVariant>,
}

impl Default for PromptStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptStore {
    /// Create a store seeded with the production variant.
    pub fn new() -> Self {
        let mut variants = HashMap::new();
        variants.insert(
            PRODUCTION_LABEL.to_string(),
            PromptVariant::new(PRODUCTION_LABEL, AETHON_SYSTEM_PROMPT),
        );
        Self { variants }
    }

    /// The production variant.
    pub fn production(&self) -> &PromptVariant {
        &self.variants[PRODUCTION_LABEL]
    }

    /// Look up a variant by label, falling back to production when the
    /// label is unknown.
    pub fn get(&self, label: &str) -> &PromptVariant {
        self.variants.get(label).unwrap_or_else(|| self.production())
    }

    /// Register or replace a variant under its label.
    pub fn register(&mut self, variant: PromptVariant) {
        self.variants.insert(variant.label.clone(), variant);
    }

    /// All registered labels, sorted for stable output.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.variants.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }
}
