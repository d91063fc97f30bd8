// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Manipulation Pattern Table
// ─────────────────────────────────────────────────────────────────────
//! Static catalog of manipulation pattern definitions.
//!
//! Every detector is the same generic matcher parameterized by one row
//! of this table; a new pattern is a data change. Severity bands are
//! authored per category and are intentionally not uniform.

use serde::{Deserialize, Serialize};

use rhetoric_types::{Category, GuardError, GuardResult, MatchMode, Severity};

use crate::matcher::PhraseMatcher;

/// Base confidence per severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBands {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl ConfidenceBands {
    pub const fn new(high: f64, medium: f64, low: f64) -> Self {
        Self { high, medium, low }
    }

    pub fn for_severity(&self, severity: Severity) -> f64 {
        match severity {
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    /// Authored bands for a category.
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::VagueAuthority
            | Category::DataLessClaim
            | Category::FalseUrgency
            | Category::Scarcity
            | Category::EmotionalPressure => Self::new(0.85, 0.7, 0.55),
            Category::Hallucination | Category::FearMongering | Category::ConspiracyFraming => {
                Self::new(0.9, 0.75, 0.6)
            }
            _ => Self::new(0.8, 0.65, 0.5),
        }
    }
}

/// Immutable description of one manipulation pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternDefinition {
    pub id: String,
    pub category: Category,
    pub severity: Severity,
    pub indicator_phrases: Vec<String>,
    #[serde(default)]
    pub context_clues: Vec<String>,
    /// Defaults to the category's authored bands when omitted.
    #[serde(default)]
    pub bands: Option<ConfidenceBands>,
    /// `{phrase}` and `{count}` are substituted at render time.
    pub rationale_template: String,
    #[serde(default)]
    pub psychological_mechanism: String,
}

impl PatternDefinition {
    pub fn bands(&self) -> ConfidenceBands {
        self.bands
            .unwrap_or_else(|| ConfidenceBands::for_category(self.category))
    }

    pub fn base_confidence(&self) -> f64 {
        self.bands().for_severity(self.severity)
    }

    pub fn render_rationale(&self, phrase: &str, count: usize) -> String {
        self.rationale_template
            .replace("{phrase}", phrase)
            .replace("{count}", &count.to_string())
    }
}

/// A definition with its phrases compiled for the active match mode.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub definition: PatternDefinition,
    pub indicators: Vec<PhraseMatcher>,
    pub clues: Vec<PhraseMatcher>,
}

impl CompiledPattern {
    fn compile(definition: PatternDefinition, mode: MatchMode) -> GuardResult<Self> {
        if definition.indicator_phrases.is_empty() {
            return Err(GuardError::Pattern {
                pattern_id: definition.id.clone(),
                reason: "no indicator phrases".to_string(),
            });
        }
        let wrap = |e: GuardError| GuardError::Pattern {
            pattern_id: definition.id.clone(),
            reason: e.to_string(),
        };
        let indicators = definition
            .indicator_phrases
            .iter()
            .map(|p| PhraseMatcher::new(p, mode))
            .collect::<GuardResult<Vec<_>>>()
            .map_err(wrap)?;
        let clues = definition
            .context_clues
            .iter()
            .map(|p| PhraseMatcher::new(p, mode))
            .collect::<GuardResult<Vec<_>>>()
            .map_err(wrap)?;
        Ok(Self {
            definition,
            indicators,
            clues,
        })
    }
}

/// The loaded pattern catalog.
#[derive(Debug, Clone)]
pub struct PatternTable {
    patterns: Vec<CompiledPattern>,
    mode: MatchMode,
}

impl PatternTable {
    pub fn from_definitions(defs: Vec<PatternDefinition>, mode: MatchMode) -> GuardResult<Self> {
        let mut seen = std::collections::HashSet::new();
        let mut patterns = Vec::with_capacity(defs.len());
        for def in defs {
            if !seen.insert(def.id.clone()) {
                return Err(GuardError::Pattern {
                    pattern_id: def.id,
                    reason: "duplicate pattern id".to_string(),
                });
            }
            if let Some(b) = def.bands {
                for v in [b.high, b.medium, b.low] {
                    if !(0.0..=1.0).contains(&v) {
                        return Err(GuardError::Pattern {
                            pattern_id: def.id,
                            reason: format!("band value {v} outside [0, 1]"),
                        });
                    }
                }
            }
            patterns.push(CompiledPattern::compile(def, mode)?);
        }
        Ok(Self { patterns, mode })
    }

    /// The built-in catalog.
    pub fn builtin(mode: MatchMode) -> GuardResult<Self> {
        Self::from_definitions(builtin_definitions(), mode)
    }

    /// Load definitions from a JSON array.
    pub fn from_json(json: &str, mode: MatchMode) -> GuardResult<Self> {
        let defs: Vec<PatternDefinition> = serde_json::from_str(json)
            .map_err(|e| GuardError::Config(format!("pattern table JSON: {e}")))?;
        Self::from_definitions(defs, mode)
    }

    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    pub fn get(&self, id: &str) -> Option<&PatternDefinition> {
        self.patterns
            .iter()
            .map(|p| &p.definition)
            .find(|d| d.id == id)
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

struct Row {
    id: &'static str,
    category: Category,
    severity: Severity,
    indicators: &'static [&'static str],
    clues: &'static [&'static str],
    rationale: &'static str,
    mechanism: &'static str,
}

const BUILTIN: &[Row] = &[
    Row {
        id: "urgency-deadline",
        category: Category::FalseUrgency,
        severity: Severity::High,
        indicators: &[
            "act now",
            "before it's too late",
            "last chance",
            "time is running out",
            "don't wait",
        ],
        clues: &["limited time", "today only", "expires"],
        rationale: "\"{phrase}\" manufactures a deadline to cut deliberation short ({count} urgency cue(s)).",
        mechanism: "Time pressure shifts decisions from analysis to reflex.",
    },
    Row {
        id: "urgency-pressure",
        category: Category::FalseUrgency,
        severity: Severity::Medium,
        indicators: &["hurry", "urgent", "right now", "as soon as possible", "don't delay"],
        clues: &["deadline", "immediately"],
        rationale: "\"{phrase}\" pushes for immediate action without stating why it is needed.",
        mechanism: "Urgency framing raises arousal and lowers scrutiny.",
    },
    Row {
        id: "scarcity-limited",
        category: Category::Scarcity,
        severity: Severity::Medium,
        indicators: &[
            "limited time",
            "only a few left",
            "while supplies last",
            "exclusive offer",
            "today only",
            "selling out",
        ],
        clues: &["act now", "last chance"],
        rationale: "\"{phrase}\" implies scarcity that is not demonstrated.",
        mechanism: "Perceived scarcity inflates perceived value (loss aversion).",
    },
    Row {
        id: "authority-anonymous",
        category: Category::VagueAuthority,
        severity: Severity::Medium,
        indicators: &[
            "experts say",
            "experts agree",
            "sources say",
            "officials say",
            "insiders say",
            "many doctors",
        ],
        clues: &["everyone knows", "trust me"],
        rationale: "\"{phrase}\" invokes authority without naming who or citing what they found.",
        mechanism: "Deference to authority substitutes for evaluating evidence.",
    },
    Row {
        id: "authority-appeal",
        category: Category::VagueAuthority,
        severity: Severity::Low,
        indicators: &[
            "according to experts",
            "top scientists",
            "leading experts",
            "a well-known expert",
        ],
        clues: &["trust me"],
        rationale: "\"{phrase}\" leans on unnamed credentials.",
        mechanism: "Credential signalling borrows credibility without accountability.",
    },
    Row {
        id: "dataless-attribution",
        category: Category::DataLessClaim,
        severity: Severity::High,
        indicators: &[
            "scientists claim",
            "studies show",
            "research proves",
            "research shows",
            "science says",
            "data proves",
        ],
        clues: &["it is proven", "undeniable"],
        rationale: "\"{phrase}\" attributes a claim to research without citing any data.",
        mechanism: "Vague attribution to science lends unearned certainty.",
    },
    Row {
        id: "dataless-statistic",
        category: Category::DataLessClaim,
        severity: Severity::Medium,
        indicators: &[
            "most people",
            "countless",
            "the majority of",
            "numerous studies",
            "statistics show",
        ],
        clues: &["undeniable"],
        rationale: "\"{phrase}\" implies a quantity that is never measured.",
        mechanism: "Implied statistics exploit the credibility of numbers.",
    },
    Row {
        id: "false-claim",
        category: Category::Hallucination,
        severity: Severity::High,
        indicators: &[
            "the earth is flat",
            "vaccines cause autism",
            "the moon landing was faked",
            "5g causes",
            "chemtrails",
        ],
        clues: &["proven", "the truth"],
        rationale: "\"{phrase}\" contradicts well-established evidence.",
        mechanism: "Confident repetition of false claims builds familiarity, not truth.",
    },
    Row {
        id: "fabricated-certainty",
        category: Category::Hallucination,
        severity: Severity::Medium,
        indicators: &[
            "it is a proven fact",
            "100% proven",
            "scientifically proven fact",
            "undisputed fact",
        ],
        clues: &["everyone knows"],
        rationale: "\"{phrase}\" asserts certainty that no evidence is offered for.",
        mechanism: "Certainty markers discourage questioning.",
    },
    Row {
        id: "emotional-guilt",
        category: Category::EmotionalPressure,
        severity: Severity::Medium,
        indicators: &[
            "if you really cared",
            "you should be ashamed",
            "think of the children",
            "how could you",
            "you'll regret",
        ],
        clues: &["your family"],
        rationale: "\"{phrase}\" uses guilt in place of an argument.",
        mechanism: "Guilt and shame compel compliance to restore self-image.",
    },
    Row {
        id: "emotional-blame",
        category: Category::EmotionalPressure,
        severity: Severity::High,
        indicators: &[
            "blood on your hands",
            "you'll never forgive yourself",
            "you will regret this forever",
        ],
        clues: &["your family", "your children"],
        rationale: "\"{phrase}\" assigns moral blame to coerce a decision.",
        mechanism: "Anticipated regret overrides deliberate reasoning.",
    },
    Row {
        id: "fear-catastrophe",
        category: Category::FearMongering,
        severity: Severity::High,
        indicators: &[
            "end of the world",
            "total collapse",
            "you could die",
            "deadly threat",
            "disaster is coming",
        ],
        clues: &["catastrophic", "no one is safe"],
        rationale: "\"{phrase}\" predicts catastrophe without support.",
        mechanism: "Fear narrows attention and favours the offered escape route.",
    },
    Row {
        id: "fear-threat",
        category: Category::FearMongering,
        severity: Severity::Medium,
        indicators: &["threat to your family", "you are at risk", "dangerous", "be afraid"],
        clues: &["warning"],
        rationale: "\"{phrase}\" frames an unquantified risk as a personal threat.",
        mechanism: "Personalised threat inflates perceived probability.",
    },
    Row {
        id: "speculation-possibility",
        category: Category::SpeculativeClaim,
        severity: Severity::Medium,
        indicators: &[
            "could potentially",
            "might lead to",
            "it is possible that",
            "some believe",
            "what if",
        ],
        clues: &["could be", "may be"],
        rationale: "\"{phrase}\" presents a possibility as if it were likely.",
        mechanism: "Speculation anchors belief before evidence arrives.",
    },
    Row {
        id: "speculation-prediction",
        category: Category::SpeculativeClaim,
        severity: Severity::Low,
        indicators: &[
            "will inevitably",
            "only a matter of time",
            "mark my words",
            "soon everyone will",
        ],
        clues: &["inevitable"],
        rationale: "\"{phrase}\" states an unsupported prediction as certain.",
        mechanism: "Confident forecasting exploits the availability heuristic.",
    },
    Row {
        id: "bandwagon-popularity",
        category: Category::Bandwagon,
        severity: Severity::Medium,
        indicators: &[
            "everyone knows",
            "everyone agrees",
            "join millions",
            "don't be left behind",
            "everybody is",
        ],
        clues: &["millions", "trending"],
        rationale: "\"{phrase}\" treats popularity as proof.",
        mechanism: "Social proof replaces individual evaluation.",
    },
    Row {
        id: "false-dichotomy",
        category: Category::FalseDichotomy,
        severity: Severity::Medium,
        indicators: &[
            "you're either with us",
            "there is no middle ground",
            "only two options",
            "if you're not with us",
            "either you",
        ],
        clues: &["against us"],
        rationale: "\"{phrase}\" reduces a complex question to two options.",
        mechanism: "Binary framing hides alternatives and forces a side.",
    },
    Row {
        id: "absolutism",
        category: Category::Absolutism,
        severity: Severity::Low,
        indicators: &[
            "without exception",
            "100% of the time",
            "absolutely everyone",
            "no one can deny",
            "never ever",
        ],
        clues: &["always"],
        rationale: "\"{phrase}\" admits no exceptions where exceptions are likely.",
        mechanism: "Absolute language shuts down nuance.",
    },
    Row {
        id: "conspiracy-framing",
        category: Category::ConspiracyFraming,
        severity: Severity::High,
        indicators: &[
            "deep state",
            "the elites",
            "mainstream media lies",
            "secret plan",
            "they are hiding",
        ],
        clues: &["cover-up", "wake up"],
        rationale: "\"{phrase}\" attributes events to hidden coordinated actors.",
        mechanism: "Conspiracy framing makes any counter-evidence part of the plot.",
    },
    Row {
        id: "ad-hominem",
        category: Category::AdHominem,
        severity: Severity::Medium,
        indicators: &["only an idiot", "anyone who disagrees is", "sheeple", "paid shill"],
        clues: &["stupid"],
        rationale: "\"{phrase}\" attacks people instead of their arguments.",
        mechanism: "Discrediting the speaker avoids engaging the claim.",
    },
    Row {
        id: "loaded-language",
        category: Category::LoadedLanguage,
        severity: Severity::Low,
        indicators: &["propaganda", "brainwashed", "regime", "extremist"],
        clues: &["radical"],
        rationale: "\"{phrase}\" carries a verdict inside a description.",
        mechanism: "Emotionally loaded terms pre-judge the subject.",
    },
];

/// Owned copies of the built-in catalog, in evaluation order.
pub fn builtin_definitions() -> Vec<PatternDefinition> {
    BUILTIN
        .iter()
        .map(|row| PatternDefinition {
            id: row.id.to_string(),
            category: row.category,
            severity: row.severity,
            indicator_phrases: row.indicators.iter().map(|s| s.to_string()).collect(),
            context_clues: row.clues.iter().map(|s| s.to_string()).collect(),
            bands: Some(ConfidenceBands::for_category(row.category)),
            rationale_template: row.rationale.to_string(),
            psychological_mechanism: row.mechanism.to_string(),
        })
        .collect()
}
