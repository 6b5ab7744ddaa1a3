//! Writing prompts shown during practice, grouped by part of speech.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::model::PartOfSpeech;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Basic,
    Medium,
}

/// A writing situation that nudges the learner towards a natural sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scenario {
    pub id: &'static str,
    pub category: &'static str,
    pub prompt: &'static str,
    pub difficulty: Difficulty,
}

const fn scenario(
    id: &'static str,
    category: &'static str,
    prompt: &'static str,
    difficulty: Difficulty,
) -> Scenario {
    Scenario {
        id,
        category,
        prompt,
        difficulty,
    }
}

use Difficulty::{Basic, Medium};

const VERB: &[Scenario] = &[
    scenario(
        "work-process",
        "Workplace Communication",
        "Describe how you use this verb in your daily work routine or in a specific project task.",
        Basic,
    ),
    scenario(
        "tech-explanation",
        "Technical Explanation",
        "Explain how this action is performed in software development or technical implementation.",
        Basic,
    ),
    scenario(
        "problem-solving",
        "Problem Solving",
        "Describe how you would use this verb to solve a specific technical problem or challenge.",
        Medium,
    ),
    scenario(
        "email-writing",
        "Professional Email",
        "Write a sentence using this verb as if you were composing a professional email to a colleague.",
        Basic,
    ),
    scenario(
        "presentation",
        "Presentation",
        "Use this verb in a sentence you might say during a technical presentation or demo.",
        Medium,
    ),
    scenario(
        "documentation",
        "Documentation",
        "Write a sentence using this verb as it might appear in technical documentation or a README file.",
        Basic,
    ),
    scenario(
        "code-review",
        "Code Review",
        "Use this verb in a sentence you might write when reviewing someone's code or pull request.",
        Medium,
    ),
    scenario(
        "learning-experience",
        "Learning Experience",
        "Describe a past experience where you learned to use this verb in a technical context.",
        Basic,
    ),
];

const NOUN: &[Scenario] = &[
    scenario(
        "concept-definition",
        "Concept Definition",
        "Define or explain this noun as if teaching it to someone unfamiliar with the term.",
        Basic,
    ),
    scenario(
        "concept-comparison",
        "Comparison",
        "Compare this noun with a similar concept, highlighting the differences.",
        Medium,
    ),
    scenario(
        "real-example",
        "Real-World Example",
        "Give a concrete example of this noun from your work or a project you've seen.",
        Basic,
    ),
    scenario(
        "system-architecture",
        "System Architecture",
        "Describe the role of this noun in a software system or technical architecture.",
        Medium,
    ),
    scenario(
        "data-explanation",
        "Data & Metrics",
        "Use this noun in a sentence that involves data, statistics, or measurable outcomes.",
        Basic,
    ),
    scenario(
        "team-discussion",
        "Team Discussion",
        "Use this noun in a sentence you might say during a team meeting or brainstorming session.",
        Basic,
    ),
    scenario(
        "technical-challenge",
        "Technical Challenge",
        "Describe a challenge or limitation related to this noun in technical work.",
        Medium,
    ),
    scenario(
        "best-practice",
        "Best Practice",
        "Mention this noun in the context of a best practice or recommendation.",
        Basic,
    ),
];

const ADJECTIVE: &[Scenario] = &[
    scenario(
        "product-review",
        "Product Review",
        "Use this adjective to describe a product, tool, or technology you've used.",
        Basic,
    ),
    scenario(
        "technical-feature",
        "Technical Feature",
        "Describe a technical feature or characteristic using this adjective.",
        Basic,
    ),
    scenario(
        "personal-opinion",
        "Personal Opinion",
        "Express your subjective opinion about something technical using this adjective.",
        Basic,
    ),
    scenario(
        "trend-description",
        "Trend & Development",
        "Use this adjective to describe a trend or development in technology.",
        Medium,
    ),
    scenario(
        "detail-description",
        "Detailed Description",
        "Provide a precise, detailed description of something using this adjective.",
        Medium,
    ),
    scenario(
        "comparison-quality",
        "Quality Comparison",
        "Compare two things using this adjective to highlight their qualities.",
        Medium,
    ),
    scenario(
        "user-experience",
        "User Experience",
        "Describe a user experience or interface using this adjective.",
        Basic,
    ),
    scenario(
        "performance",
        "Performance",
        "Use this adjective to describe the performance or efficiency of a system.",
        Basic,
    ),
];

const ADVERB: &[Scenario] = &[
    scenario(
        "method-description",
        "Method Description",
        "Describe how a technical process or method is performed using this adverb.",
        Basic,
    ),
    scenario(
        "frequency",
        "Frequency",
        "Use this adverb to describe how often something happens in your work.",
        Basic,
    ),
    scenario(
        "manner",
        "Manner",
        "Describe the manner or way something is done using this adverb.",
        Basic,
    ),
    scenario(
        "degree",
        "Degree/Extent",
        "Use this adverb to express the degree or extent of something.",
        Basic,
    ),
    scenario(
        "workflow",
        "Workflow",
        "Describe a step in your workflow or process using this adverb.",
        Medium,
    ),
];

const PHRASAL_VERB: &[Scenario] = &[
    scenario(
        "operation",
        "Operation",
        "Explain how to perform a specific operation or action using this phrasal verb.",
        Basic,
    ),
    scenario(
        "debugging",
        "Debugging",
        "Describe a debugging or troubleshooting situation using this phrasal verb.",
        Medium,
    ),
    scenario(
        "tech-docs",
        "Technical Writing",
        "Use this phrasal verb in a sentence that might appear in technical documentation.",
        Basic,
    ),
    scenario(
        "casual-conversation",
        "Casual Conversation",
        "Use this phrasal verb in a casual conversation with a colleague about work.",
        Basic,
    ),
    scenario(
        "project-management",
        "Project Management",
        "Describe a project management task or situation using this phrasal verb.",
        Medium,
    ),
    scenario(
        "code-action",
        "Code Action",
        "Describe an action you take when writing or reviewing code using this phrasal verb.",
        Basic,
    ),
];

const PHRASE: &[Scenario] = &[
    scenario(
        "context-usage",
        "Contextual Usage",
        "Use this phrase in a natural context from your work or technical discussion.",
        Basic,
    ),
    scenario(
        "explanation",
        "Explanation",
        "Explain when and why you would use this phrase.",
        Basic,
    ),
    scenario(
        "practical-example",
        "Practical Example",
        "Give a practical example of using this phrase in a real work situation.",
        Basic,
    ),
    scenario(
        "professional-setting",
        "Professional Setting",
        "Use this phrase in a professional or formal context.",
        Medium,
    ),
    scenario(
        "informal-setting",
        "Informal Setting",
        "Use this phrase in an informal conversation with teammates.",
        Basic,
    ),
];

const GENERAL: &[Scenario] = &[
    scenario(
        "general-usage",
        "General Usage",
        "Write a sentence using this word in a context that demonstrates its meaning.",
        Basic,
    ),
    scenario(
        "technical-context",
        "Technical Context",
        "Use this word in a technical or professional context.",
        Basic,
    ),
    scenario(
        "real-situation",
        "Real Situation",
        "Describe a real situation where you might use this word.",
        Basic,
    ),
];

/// All scenarios for a part of speech. `Other` uses the general list.
pub fn scenarios_for(part_of_speech: PartOfSpeech) -> &'static [Scenario] {
    match part_of_speech {
        PartOfSpeech::Verb => VERB,
        PartOfSpeech::Noun => NOUN,
        PartOfSpeech::Adjective => ADJECTIVE,
        PartOfSpeech::Adverb => ADVERB,
        PartOfSpeech::PhrasalVerb => PHRASAL_VERB,
        PartOfSpeech::Phrase => PHRASE,
        PartOfSpeech::Other => GENERAL,
    }
}

/// Pick a scenario at random, avoiding `exclude_id` when another is available.
pub fn pick_scenario<R: Rng + ?Sized>(
    part_of_speech: PartOfSpeech,
    exclude_id: Option<&str>,
    rng: &mut R,
) -> &'static Scenario {
    let all = scenarios_for(part_of_speech);
    let candidates: Vec<&'static Scenario> = all
        .iter()
        .filter(|s| exclude_id != Some(s.id))
        .collect();

    candidates
        .choose(rng)
        .copied()
        .unwrap_or(&all[0])
}

/// [`pick_scenario`] with the thread-local generator.
pub fn random_scenario(
    part_of_speech: PartOfSpeech,
    exclude_id: Option<&str>,
) -> &'static Scenario {
    pick_scenario(part_of_speech, exclude_id, &mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn every_part_of_speech_has_scenarios() {
        for pos in PartOfSpeech::ALL {
            assert!(!scenarios_for(pos).is_empty(), "{pos} has no scenarios");
        }
    }

    #[test]
    fn scenario_ids_are_unique_per_list() {
        for pos in PartOfSpeech::ALL {
            let ids: HashSet<_> = scenarios_for(pos).iter().map(|s| s.id).collect();
            assert_eq!(ids.len(), scenarios_for(pos).len());
        }
    }

    #[test]
    fn pick_never_returns_excluded_when_alternatives_exist() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let s = pick_scenario(PartOfSpeech::Adverb, Some("frequency"), &mut rng);
            assert_ne!(s.id, "frequency");
        }
    }

    #[test]
    fn pick_comes_from_the_matching_list() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let s = pick_scenario(PartOfSpeech::Noun, None, &mut rng);
            assert!(NOUN.iter().any(|n| n.id == s.id));
        }
    }

    #[test]
    fn unknown_exclusion_is_ignored() {
        let s = random_scenario(PartOfSpeech::Other, Some("no-such-id"));
        assert!(GENERAL.contains(s));
    }
}
