use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use bobmap_shared::errors::{AppError, AppResult, ErrorCode};

use super::schema;
use crate::models::{Archetype, TasteVector};

/// One answered question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub option_value: String,
}

impl Answer {
    pub fn new(question_id: impl Into<String>, option_value: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            option_value: option_value.into(),
        }
    }
}

/// Result of scoring a completed questionnaire.
#[derive(Debug, Clone)]
pub struct ProfileScore {
    pub scores: BTreeMap<Archetype, u32>,
    pub primary: Archetype,
    pub taste: TasteVector,
}

/// Score a set of answers against the static schema.
///
/// Pure function: same answers, same result. Missing required questions are
/// a hard failure, not a zero default; the error details list the missing
/// ids so the UI can re-prompt.
pub fn evaluate(answers: &[Answer]) -> AppResult<ProfileScore> {
    let mut scores: BTreeMap<Archetype, u32> =
        Archetype::ALL.iter().map(|a| (*a, 0)).collect();
    let mut taste = TasteVector::new();
    let mut answered: HashSet<&str> = HashSet::new();

    for answer in answers {
        let question = schema::question(&answer.question_id).ok_or_else(|| {
            AppError::new(
                ErrorCode::UnknownQuestion,
                format!("unknown question: {}", answer.question_id),
            )
        })?;

        if !answered.insert(question.id) {
            return Err(AppError::new(
                ErrorCode::DuplicateAnswer,
                format!("question answered twice: {}", question.id),
            ));
        }

        let option = question
            .options
            .iter()
            .find(|o| o.value == answer.option_value)
            .ok_or_else(|| {
                AppError::new(
                    ErrorCode::UnknownOption,
                    format!(
                        "unknown option '{}' for question {}",
                        answer.option_value, question.id
                    ),
                )
            })?;

        for (archetype, weight) in option.weights {
            *scores.entry(*archetype).or_insert(0) += weight;
        }
        for (category, affinity) in option.taste {
            taste.saturating_add(*category, *affinity);
        }
    }

    let missing: Vec<&str> = schema::required_ids()
        .filter(|id| !answered.contains(id))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::with_details(
            ErrorCode::IncompleteAnswers,
            "required questions unanswered",
            serde_json::json!({ "missing": missing }),
        ));
    }

    // Strictly highest score wins; ties resolve to the earliest archetype in
    // the fixed priority order, independent of map iteration order.
    let mut primary = Archetype::ALL[0];
    let mut best = 0u32;
    for archetype in Archetype::ALL {
        let score = scores[&archetype];
        if score > best {
            best = score;
            primary = archetype;
        }
    }

    Ok(ProfileScore {
        scores,
        primary,
        taste,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn base_answers() -> Vec<Answer> {
        vec![
            Answer::new("food_style", "adventure"),
            Answer::new("price_range", "value"),
            Answer::new("dining_vibe", "social"),
        ]
    }

    #[test]
    fn evaluates_deterministically() {
        let answers = base_answers();
        let first = evaluate(&answers).unwrap();
        let second = evaluate(&answers).unwrap();
        assert_eq!(first.primary, second.primary);
        assert_eq!(first.scores, second.scores);
        assert_eq!(first.primary, Archetype::Adventurer);
    }

    #[test]
    fn accumulates_weights_across_answers() {
        let score = evaluate(&base_answers()).unwrap();
        // adventure: Adventurer 5 + social: Adventurer 2
        assert_eq!(score.scores[&Archetype::Adventurer], 7);
        // adventure: Trendsetter 2 + social: Trendsetter 3
        assert_eq!(score.scores[&Archetype::Trendsetter], 5);
        assert_eq!(score.scores[&Archetype::Gourmet], 0);
    }

    #[test]
    fn derives_taste_vector() {
        let score = evaluate(&base_answers()).unwrap();
        assert_eq!(score.taste.get(Category::Exotic), 5);
        assert_eq!(score.taste.get(Category::Budget), 5);
        assert_eq!(score.taste.get(Category::Healthy), 0);
    }

    #[test]
    fn taste_saturates_at_bound() {
        let answers = vec![
            Answer::new("food_style", "trendy"),
            Answer::new("price_range", "premium"),
            Answer::new("dining_vibe", "social"),
            Answer::new("discovery_style", "friends"),
        ];
        let score = evaluate(&answers).unwrap();
        // trendy 5 + premium 3 + social 3 + friends 2 saturates at 5.
        assert_eq!(score.taste.get(Category::Trendy), 5);
    }

    #[test]
    fn missing_required_answers_fail_with_ids() {
        let answers = vec![Answer::new("food_style", "classic")];
        let err = evaluate(&answers).unwrap_err();
        assert!(err.is_code(ErrorCode::IncompleteAnswers));
        match err {
            AppError::Known { details: Some(d), .. } => {
                let missing = d["missing"].as_array().unwrap();
                assert!(missing.iter().any(|v| *v == "price_range"));
                assert!(missing.iter().any(|v| *v == "dining_vibe"));
            }
            other => panic!("unexpected error shape: {other:?}"),
        }
    }

    #[test]
    fn unknown_question_and_option_fail() {
        let err = evaluate(&[Answer::new("star_sign", "leo")]).unwrap_err();
        assert!(err.is_code(ErrorCode::UnknownQuestion));

        let err = evaluate(&[Answer::new("food_style", "molecular")]).unwrap_err();
        assert!(err.is_code(ErrorCode::UnknownOption));
    }

    #[test]
    fn duplicate_answer_fails() {
        let mut answers = base_answers();
        answers.push(Answer::new("food_style", "classic"));
        let err = evaluate(&answers).unwrap_err();
        assert!(err.is_code(ErrorCode::DuplicateAnswer));
    }

    #[test]
    fn tie_breaks_by_priority_order() {
        // quiet contributes ComfortSeeker 3 / Gourmet 2; value adds
        // ComfortSeeker 3; balanced adds Gourmet 3 -> 6 vs 5.
        let answers = vec![
            Answer::new("food_style", "classic"),
            Answer::new("price_range", "premium"),
            Answer::new("dining_vibe", "quiet"),
        ];
        let score = evaluate(&answers).unwrap();
        // classic: ComfortSeeker 5, Gourmet 1; premium: Gourmet 5,
        // Trendsetter 1; quiet: ComfortSeeker 3, Gourmet 2.
        assert_eq!(score.scores[&Archetype::ComfortSeeker], 8);
        assert_eq!(score.scores[&Archetype::Gourmet], 8);
        // Equal top scores: ComfortSeeker precedes Gourmet in priority order.
        assert_eq!(score.primary, Archetype::ComfortSeeker);
    }

    #[test]
    fn optional_questions_extend_scores() {
        let mut answers = base_answers();
        answers.push(Answer::new("flavor_profile", "spicy"));
        let score = evaluate(&answers).unwrap();
        assert_eq!(score.scores[&Archetype::Adventurer], 10);
        assert_eq!(score.taste.get(Category::Spicy), 5);
    }
}
