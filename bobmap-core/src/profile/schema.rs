//! Static questionnaire schema.
//!
//! Each option contributes fixed weights to one or more archetypes and fixed
//! affinities to one or more taste categories. The schema is data, not
//! behavior: changing a weight must never require touching the calculator.

use crate::models::{Archetype, Category};

pub struct Question {
    pub id: &'static str,
    pub prompt: &'static str,
    pub required: bool,
    pub options: &'static [AnswerOption],
}

pub struct AnswerOption {
    pub value: &'static str,
    pub label: &'static str,
    /// (archetype, score weight) contributions.
    pub weights: &'static [(Archetype, u32)],
    /// (category, affinity) contributions, saturating at the vector bound.
    pub taste: &'static [(Category, u8)],
}

pub const QUESTIONS: &[Question] = &[
    Question {
        id: "food_style",
        prompt: "What kind of food do you reach for first?",
        required: true,
        options: &[
            AnswerOption {
                value: "adventure",
                label: "Something I've never tried",
                weights: &[(Archetype::Adventurer, 5), (Archetype::Trendsetter, 2)],
                taste: &[(Category::Exotic, 5), (Category::Spicy, 3)],
            },
            AnswerOption {
                value: "classic",
                label: "A dependable classic",
                weights: &[(Archetype::ComfortSeeker, 5), (Archetype::Gourmet, 1)],
                taste: &[(Category::Comfort, 5), (Category::Savory, 3)],
            },
            AnswerOption {
                value: "trendy",
                label: "Whatever everyone is posting about",
                weights: &[(Archetype::Trendsetter, 5), (Archetype::Adventurer, 1)],
                taste: &[(Category::Trendy, 5), (Category::Sweet, 2)],
            },
            AnswerOption {
                value: "light",
                label: "Something fresh and light",
                weights: &[(Archetype::HealthNut, 5)],
                taste: &[(Category::Healthy, 5)],
            },
        ],
    },
    Question {
        id: "price_range",
        prompt: "How do you feel about the bill?",
        required: true,
        options: &[
            AnswerOption {
                value: "value",
                label: "Best value wins",
                weights: &[(Archetype::ComfortSeeker, 3), (Archetype::HealthNut, 1)],
                taste: &[(Category::Budget, 5)],
            },
            AnswerOption {
                value: "mid",
                label: "Reasonable for a good night",
                weights: &[(Archetype::Trendsetter, 2), (Archetype::ComfortSeeker, 2)],
                taste: &[(Category::Budget, 2)],
            },
            AnswerOption {
                value: "premium",
                label: "Worth paying for the best",
                weights: &[(Archetype::Gourmet, 5), (Archetype::Trendsetter, 1)],
                taste: &[(Category::Trendy, 3), (Category::Savory, 2)],
            },
        ],
    },
    Question {
        id: "dining_vibe",
        prompt: "Your ideal table looks like...",
        required: true,
        options: &[
            AnswerOption {
                value: "social",
                label: "A big loud group",
                weights: &[(Archetype::Trendsetter, 3), (Archetype::Adventurer, 2)],
                taste: &[(Category::Trendy, 3)],
            },
            AnswerOption {
                value: "quiet",
                label: "A quiet corner with one friend",
                weights: &[(Archetype::ComfortSeeker, 3), (Archetype::Gourmet, 2)],
                taste: &[(Category::Comfort, 3)],
            },
            AnswerOption {
                value: "solo",
                label: "Just me and my plate",
                weights: &[(Archetype::HealthNut, 2), (Archetype::Gourmet, 2)],
                taste: &[(Category::Healthy, 2)],
            },
        ],
    },
    Question {
        id: "flavor_profile",
        prompt: "Pick a flavor lane",
        required: false,
        options: &[
            AnswerOption {
                value: "spicy",
                label: "Bring the heat",
                weights: &[(Archetype::Adventurer, 3)],
                taste: &[(Category::Spicy, 5)],
            },
            AnswerOption {
                value: "sweet",
                label: "Dessert first",
                weights: &[(Archetype::ComfortSeeker, 2), (Archetype::Trendsetter, 1)],
                taste: &[(Category::Sweet, 5)],
            },
            AnswerOption {
                value: "balanced",
                label: "Balanced and seasonal",
                weights: &[(Archetype::Gourmet, 3), (Archetype::HealthNut, 2)],
                taste: &[(Category::Savory, 3), (Category::Healthy, 2)],
            },
        ],
    },
    Question {
        id: "discovery_style",
        prompt: "How do you find new places?",
        required: false,
        options: &[
            AnswerOption {
                value: "wander",
                label: "Wander in somewhere random",
                weights: &[(Archetype::Adventurer, 4)],
                taste: &[(Category::Exotic, 3)],
            },
            AnswerOption {
                value: "reviews",
                label: "Read every review first",
                weights: &[(Archetype::Gourmet, 3)],
                taste: &[(Category::Savory, 1)],
            },
            AnswerOption {
                value: "friends",
                label: "Go where my friends go",
                weights: &[(Archetype::Trendsetter, 3)],
                taste: &[(Category::Trendy, 2)],
            },
        ],
    },
];

pub fn question(id: &str) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.id == id)
}

pub fn required_ids() -> impl Iterator<Item = &'static str> {
    QUESTIONS.iter().filter(|q| q.required).map(|q| q.id)
}
