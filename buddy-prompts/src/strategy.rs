//! The two strategy prompts: initial generation and alternative regeneration.

use buddy_primitives::StrategyRequest;
use tracing::debug;

use crate::template::{PromptTemplate, TemplateResult};

const IDEA_VAR: &str = "startupIdea";
const MARKET_VAR: &str = "market";

/// JSON shape the model must return; shared by both prompts.
pub const OUTPUT_FORMAT: &str = r#"{
  "gtmStrategy": {
    "targetUsers": "Description of the target users.",
    "acquisitionChannels": "List of acquisition channels.",
    "monetizationModel": "Description of the monetization model.",
    "positioningStatement": "The positioning statement."
  },
  "featureRoadmap": {
    "mvpFeatures": "List of MVP features.",
    "v1Improvements": "List of v1.0 improvements.",
    "stretchFeatures": "List of future or stretch features."
  },
  "swotAnalysis": {
    "strengths": "List of strengths.",
    "weaknesses": "List of weaknesses.",
    "opportunities": "List of opportunities.",
    "threats": "List of threats."
  }
}"#;

const INITIAL_PERSONA: &str = "You are a startup strategy expert. Given a startup idea and market, \
you produce a go-to-market strategy, a feature roadmap, and a SWOT analysis.";

const REGENERATE_PERSONA: &str = "You are a strategic advisor for early stage startups. Your goal \
is to provide an alternative perspective to an existing analysis.";

const INITIAL_BODY: &str = "Startup Idea: {{startupIdea}}
Market: {{#if market}}{{market}}{{else}}General{{/if}}

Output the go-to-market strategy, feature roadmap, and SWOT analysis in JSON format.

Make the SWOT, GTM and feature roadmap specific and relevant to the provided idea.
Every field must be a non-empty string; write lists as plain text.

Here's the format:
";

const REGENERATE_BODY: &str = "You will regenerate a go-to-market strategy, feature roadmap, and \
SWOT analysis for the given startup idea.

Startup Idea: {{startupIdea}}
Market: {{#if market}}{{market}}{{else}}General{{/if}}

Provide an alternative analysis to what might have been generated before. Think outside the box.

Output the go-to-market strategy, feature roadmap, and SWOT analysis in JSON format.
Every field must be a non-empty string; write lists as plain text.

Here's the format:
";

/// Which instructional framing to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// First-pass generation.
    Initial,
    /// Alternative-perspective regeneration for the same input.
    Regenerate,
}

impl PromptKind {
    /// Stable prompt name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Initial => "generateStrategyPrompt",
            Self::Regenerate => "regenerateAnalysisPrompt",
        }
    }
}

/// A fully interpolated prompt ready for an inference request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPrompt {
    /// Persona / steering instruction.
    pub system: String,
    /// The interpolated user prompt, including the output format.
    pub user: String,
}

/// A strategy prompt: persona plus a parsed body template.
#[derive(Clone, Debug)]
pub struct StrategyPrompt {
    kind: PromptKind,
    persona: &'static str,
    template: PromptTemplate,
}

impl StrategyPrompt {
    /// Builds the prompt for the supplied kind.
    ///
    /// # Errors
    ///
    /// Returns a template error if the built-in template fails to parse.
    pub fn new(kind: PromptKind) -> TemplateResult<Self> {
        let (persona, body) = match kind {
            PromptKind::Initial => (INITIAL_PERSONA, INITIAL_BODY),
            PromptKind::Regenerate => (REGENERATE_PERSONA, REGENERATE_BODY),
        };

        let template =
            PromptTemplate::parse(format!("{body}{OUTPUT_FORMAT}\n"))?.require(IDEA_VAR);

        Ok(Self {
            kind,
            persona,
            template,
        })
    }

    /// Returns which framing this prompt uses.
    #[must_use]
    pub const fn kind(&self) -> PromptKind {
        self.kind
    }

    /// Interpolates a validated request into the prompt.
    ///
    /// # Errors
    ///
    /// Returns a template error if rendering fails.
    pub fn render(&self, request: &StrategyRequest) -> TemplateResult<RenderedPrompt> {
        let user = self.template.render(&[
            (IDEA_VAR, request.startup_idea()),
            (MARKET_VAR, request.market().unwrap_or_default()),
        ])?;
        debug!(prompt = self.kind.name(), chars = user.len(), "rendered strategy prompt");

        Ok(RenderedPrompt {
            system: self.persona.to_owned(),
            user,
        })
    }
}
