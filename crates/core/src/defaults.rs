//! Built-in configuration used when no stored configuration is available.

use crate::model::{
    OptionDraft, QuestionDraft, QuizConfiguration, QuizConfigurationDraft, TierDraft,
};

type OptionRow = (&'static str, &'static str, f64);

const QUESTIONS: &[(&str, &str, [OptionRow; 5])] = &[
    (
        "q1",
        "How do you feel about your current direction in life?",
        [
            ("a", "I'm exploring different possibilities and seeking advice or mentorship to figure out what path is right for me.", 1.0),
            ("b", "I'm actively putting in effort, experimenting, and trying to make progress, even if it feels scattered at times.", 2.0),
            ("c", "I've built a stable foundation, and I want to step further while maintaining security.", 3.0),
            ("d", "I know my strengths and experience, and I'm ready to express myself authentically to create meaningful results.", 4.0),
            ("e", "I'm fully living my purpose and focused on using my skills and influence to impact others.", 5.0),
        ],
    ),
    (
        "q2",
        "What are you struggling with currently?",
        [
            ("a", "Being unsure which advice, mentor, or opportunities to follow.", 1.0),
            ("b", "Overworking, lacking boundaries, or losing focus on priorities.", 2.0),
            ("c", "Feeling the pull to do more, worrying about falling behind, or comparing yourself to others.", 3.0),
            ("d", "Feeling complacent about what you've accomplished and unsure how to evolve meaningfully.", 4.0),
            ("e", "Risk of burnout or over-identifying with your role or legacy.", 5.0),
        ],
    ),
    (
        "q3",
        "What motivates you most right now?",
        [
            ("a", "Understanding what's possible for me, finding mentors, and exploring different paths.", 1.0),
            ("b", "Making consistent progress and seeing tangible results from my efforts.", 2.0),
            ("c", "Strengthening my foundation while exploring ways to grow beyond comfort zones.", 3.0),
            ("d", "Expressing my authentic self and leveraging my strengths for meaningful impact.", 4.0),
            ("e", "Expanding influence, mentoring others, and leaving a lasting mark through my work.", 5.0),
        ],
    ),
    (
        "q4",
        "How do you approach new opportunities?",
        [
            ("a", "I explore them cautiously, seeking guidance and learning from others before committing.", 1.0),
            ("b", "I try different approaches, learning by doing, and gradually building momentum.", 2.0),
            ("c", "I evaluate opportunities carefully, balancing potential growth with stability.", 3.0),
            ("d", "If it's worth my time, I take bold steps based on my expertise and values, expressing my unique voice confidently.", 4.0),
            ("e", "I select opportunities that amplify impact, mentor others, and leave a lasting legacy.", 5.0),
        ],
    ),
    (
        "q5",
        "How do you handle uncertainty or change?",
        [
            ("a", "I seek advice, gather information, and explore before acting.", 1.0),
            ("b", "I experiment, adjust as I go, and learn from trial and error.", 2.0),
            ("c", "I plan carefully to maintain stability while cautiously stepping outside my comfort zone.", 3.0),
            ("d", "I act confidently, trusting my experience and authenticity.", 4.0),
            ("e", "I embrace transformative change that strengthens my impact and benefits others.", 5.0),
        ],
    ),
    (
        "q6",
        "How do you think about risk?",
        [
            ("a", "I'm cautious but curious, seeking guidance before making moves.", 1.0),
            ("b", "I take small calculated risks to test and learn.", 2.0),
            ("c", "I prefer measured steps that protect my stability while allowing growth.", 3.0),
            ("d", "I step confidently into opportunities that reflect my authentic self. Otherwise, I can pass.", 4.0),
            ("e", "I embrace transformative risks that amplify impact for myself and others.", 5.0),
        ],
    ),
    (
        "q7",
        "How do you spend your energy day-to-day?",
        [
            ("a", "Exploring possibilities, connecting with mentors, and testing new ideas.", 1.0),
            ("b", "Building momentum, putting effort into tasks, and creating structure.", 2.0),
            ("c", "Maintaining routines, systems, and stability while considering new challenges.", 3.0),
            ("d", "Expressing yourself, sharing ideas, and applying your expertise for success.", 4.0),
            ("e", "Leading, mentoring, and creating systems to sustain long-term impact.", 5.0),
        ],
    ),
    (
        "q8",
        "How do you measure progress or fulfillment right now?",
        [
            ("a", "By exploring possibilities, gaining clarity, and learning from guidance.", 1.0),
            ("b", "By momentum, consistency, and seeing tangible results.", 2.0),
            ("c", "By stability, competence, and building a reliable foundation.", 3.0),
            ("d", "By authentic expression, influence, and meaningful outcomes.", 4.0),
            ("e", "By impact, legacy, and how I elevate others while living purposefully.", 5.0),
        ],
    ),
    (
        "q9",
        "What do you feel you're good at in this stage of your journey?",
        [
            ("a", "Curiosity, learning from others, and exploring possibilities.", 1.0),
            ("b", "Putting in effort, building momentum, and taking action.", 2.0),
            ("c", "Maintaining stability, reliability, and consistency.", 3.0),
            ("d", "Expressing your authentic self, applying expertise meaningfully, and inspiring confidence.", 4.0),
            ("e", "Leading, mentoring, and creating lasting impact through purpose and influence.", 5.0),
        ],
    ),
    (
        "q10",
        "What do you feel is blocking you from success right now?",
        [
            ("a", "So many possibilities that it's hard to choose a direction.", 1.0),
            ("b", "Too much effort without clear systems or focus.", 2.0),
            ("c", "Comparing yourself to others, overworking to maintain stability, or feeling hesitant to grow.", 3.0),
            ("d", "Comfortable with your level of mastery but unsure how to evolve meaningfully.", 4.0),
            ("e", "Feeling like everything depends on you and taking it all on.", 5.0),
        ],
    ),
    (
        "q11",
        "What excites you most about the future?",
        [
            ("a", "Learning from mentors, exploring paths, and discovering where I belong.", 1.0),
            ("b", "Turning effort into progress and seeing results from my work.", 2.0),
            ("c", "Expanding beyond my comfort zone while staying grounded in stability.", 3.0),
            ("d", "Expressing your authentic self and making meaningful contributions.", 4.0),
            ("e", "Leaving a legacy, mentoring others, and creating lasting impact.", 5.0),
        ],
    ),
];

const TIERS: &[(&str, &str, f64, f64, &str)] = &[
    ("seeking", "Seeking", 1.0, 1.5, "Exploring, curious, discovering what lights you up."),
    ("striving", "Striving", 1.6, 2.5, "Working hard, building momentum, seeking focus."),
    ("steadfast", "Steadfast", 2.6, 3.5, "Stable, competent, ready for deeper meaning and authentic growth."),
    ("shining", "Shining", 3.6, 4.5, "Experienced, aligned, mastering skills, stepping into authentic expression."),
    ("significance", "Significance", 4.6, 5.0, "Fully living purpose, mentoring, leaving lasting impact."),
];

/// The shipped default quiz in its editable form.
#[must_use]
pub fn default_draft() -> QuizConfigurationDraft {
    let questions = QUESTIONS
        .iter()
        .map(|(id, question, options)| QuestionDraft {
            id: (*id).to_string(),
            question: (*question).to_string(),
            options: options
                .iter()
                .map(|(id, text, value)| OptionDraft {
                    id: (*id).to_string(),
                    text: (*text).to_string(),
                    value: *value,
                })
                .collect(),
        })
        .collect();

    let results = TIERS
        .iter()
        .map(|(id, name, min, max, description)| TierDraft {
            id: (*id).to_string(),
            name: (*name).to_string(),
            min_score: *min,
            max_score: *max,
            description: (*description).to_string(),
            embed_html: None,
            redirect_url: None,
        })
        .collect();

    QuizConfigurationDraft { questions, results }
}

/// The shipped default quiz.
///
/// # Panics
///
/// Panics if the built-in tables are not a valid configuration.
#[must_use]
pub fn default_configuration() -> QuizConfiguration {
    default_draft()
        .validate()
        .expect("built-in quiz configuration should be valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TierId;
    use crate::resolver::resolve_tier;

    #[test]
    fn default_configuration_is_valid() {
        let config = default_configuration();
        assert_eq!(config.question_count(), 11);
        assert_eq!(config.results().len(), 5);
        assert!(config.questions().iter().all(|q| q.options().len() == 5));
    }

    #[test]
    fn default_tiers_cover_whole_tenths() {
        let config = default_configuration();
        let seeking = TierId::new("seeking").unwrap();
        let significance = TierId::new("significance").unwrap();
        assert_eq!(resolve_tier(1.0, config.results()).unwrap().id(), &seeking);
        assert_eq!(
            resolve_tier(5.0, config.results()).unwrap().id(),
            &significance
        );
        assert_eq!(
            resolve_tier(3.0, config.results()).unwrap().name(),
            "Steadfast"
        );
    }

    #[test]
    fn default_tiers_leave_gaps_between_tenths() {
        let config = default_configuration();
        let gaps = config.coverage_gaps(1.0, 5.0);
        assert_eq!(gaps.len(), 4);
        assert!(resolve_tier(1.55, config.results()).is_none());
    }
}
