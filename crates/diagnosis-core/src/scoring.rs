use indexmap::IndexMap;
use tracing::debug;

use crate::catalogue::Catalogue;
use crate::error::CoreError;
use crate::model::{Answer, CategoryMap, Scorecard};

/// Maturity bands as (name, exclusive upper bound). The last band is open-ended.
const LEVEL_BANDS: [(&str, f64); 5] = [
    ("Level 0", 550.0),
    ("Level 1", 650.0),
    ("Level 2", 750.0),
    ("Level 3", 850.0),
    ("Level 4", 950.0),
];
const TOP_LEVEL: &str = "Level 5";

#[derive(Debug, Default, Clone, Copy)]
struct CategoryAggregate {
    score: f64,
    level_index_sum: u64,
    question_count: u32,
}

/// Reduce a submission to per-category and total scores.
///
/// Every catalogue category appears in the output, in catalogue order, even when
/// none of its questions were answered. Answers for unknown question ids are skipped.
pub fn score(catalogue: &Catalogue, answers: &IndexMap<String, Answer>) -> Scorecard {
    let mut aggregates: IndexMap<&str, CategoryAggregate> = catalogue
        .categories()
        .iter()
        .map(|c| (c.as_str(), CategoryAggregate::default()))
        .collect();
    let mut total_score = 0.0;

    for (no, answer) in answers {
        let Some(question) = catalogue.question(no) else {
            debug!(question = %no, "answer for unknown question skipped");
            continue;
        };
        let agg = aggregates.entry(question.category.as_str()).or_default();
        agg.score += answer.value;
        agg.level_index_sum += u64::from(answer.level_index);
        agg.question_count += 1;
        total_score += answer.value;
    }

    let category_scores: CategoryMap = aggregates
        .iter()
        .map(|(c, agg)| (c.to_string(), agg.score))
        .collect();
    let category_levels: CategoryMap = aggregates
        .iter()
        .map(|(c, agg)| (c.to_string(), average_level(agg)))
        .collect();
    let category_score_allocations: CategoryMap = aggregates
        .keys()
        .map(|c| (c.to_string(), catalogue.allocation(c).unwrap_or(0.0)))
        .collect();

    Scorecard {
        total_score,
        category_scores,
        category_levels,
        category_score_allocations,
    }
}

/// Check the required submission fields and hand back the surveyor name.
pub fn validate_submission<'a>(
    surveyor_name: Option<&'a str>,
    answers: Option<&IndexMap<String, Answer>>,
) -> Result<&'a str, CoreError> {
    match (surveyor_name, answers) {
        (Some(name), Some(answers)) if !name.is_empty() && !answers.is_empty() => Ok(name),
        _ => Err(CoreError::InvalidSubmission(
            "Missing surveyorName or answers".to_string(),
        )),
    }
}

/// Name of the maturity band a total score falls in.
pub fn level_name(total_score: f64) -> &'static str {
    LEVEL_BANDS
        .iter()
        .find(|(_, upper)| total_score < *upper)
        .map(|(name, _)| *name)
        .unwrap_or(TOP_LEVEL)
}

fn average_level(agg: &CategoryAggregate) -> f64 {
    if agg.question_count == 0 {
        return 0.0;
    }
    round2(agg.level_index_sum as f64 / f64::from(agg.question_count))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::tests::SAMPLE;

    fn answers(items: &[(&str, f64, u32)]) -> IndexMap<String, Answer> {
        items
            .iter()
            .map(|&(no, value, level_index)| (no.to_string(), Answer { value, level_index }))
            .collect()
    }

    #[test]
    fn worked_example() {
        let catalogue = Catalogue::parse(SAMPLE).unwrap();
        let card = score(&catalogue, &answers(&[("A1", 30.0, 2), ("B1", 40.0, 4)]));

        assert_eq!(card.total_score, 70.0);
        assert_eq!(card.category_scores["A"], 30.0);
        assert_eq!(card.category_scores["B"], 40.0);
        assert_eq!(card.category_levels["A"], 2.0);
        assert_eq!(card.category_levels["B"], 4.0);
        assert_eq!(card.category_score_allocations["A"], 100.0);
        assert_eq!(card.category_score_allocations["B"], 50.0);
    }

    #[test]
    fn total_equals_sum_of_categories() {
        let catalogue = Catalogue::parse(SAMPLE).unwrap();
        let card = score(
            &catalogue,
            &answers(&[("A1", 12.5, 1), ("A2", 7.25, 3), ("B1", 40.0, 4), ("Z9", 99.0, 5)]),
        );
        let sum: f64 = card.category_scores.values().sum();
        assert_eq!(card.total_score, sum);
        assert_eq!(card.total_score, 59.75);
    }

    #[test]
    fn answers_keyed_by_served_numeric_id_are_scored() {
        let catalogue = Catalogue::parse("No,대분류,배점\n01,A,100\n").unwrap();
        let served = catalogue.records()[0]["No"].to_string();
        let card = score(&catalogue, &answers(&[(served.as_str(), 30.0, 2)]));
        assert_eq!(card.total_score, 30.0);
        assert_eq!(card.category_levels["A"], 2.0);
    }

    #[test]
    fn unanswered_category_reports_level_zero() {
        let catalogue = Catalogue::parse(SAMPLE).unwrap();
        let card = score(&catalogue, &answers(&[("A1", 10.0, 3)]));
        assert_eq!(card.category_levels["B"], 0.0);
        assert_eq!(card.category_scores["B"], 0.0);
        assert_eq!(card.category_score_allocations["B"], 50.0);
    }

    #[test]
    fn level_is_mean_over_answered_questions_rounded() {
        let catalogue = Catalogue::parse(SAMPLE).unwrap();
        let card = score(&catalogue, &answers(&[("A1", 1.0, 1), ("A2", 1.0, 2)]));
        assert_eq!(card.category_levels["A"], 1.5);

        let catalogue = Catalogue::parse(
            "No,대분류,배점\n1,C,10\n2,C,10\n3,C,10\n",
        )
        .unwrap();
        let card = score(&catalogue, &answers(&[("1", 0.0, 1), ("2", 0.0, 1), ("3", 0.0, 2)]));
        assert_eq!(card.category_levels["C"], 1.33);
    }

    #[test]
    fn output_follows_catalogue_order() {
        let catalogue = Catalogue::parse(SAMPLE).unwrap();
        let card = score(&catalogue, &answers(&[("B1", 1.0, 1), ("A1", 1.0, 1)]));
        let order: Vec<&str> = card.category_levels.keys().map(String::as_str).collect();
        assert_eq!(order, ["A", "B"]);
    }

    #[test]
    fn level_bands_are_exclusive_on_upper_edge() {
        assert_eq!(level_name(0.0), "Level 0");
        assert_eq!(level_name(549.9), "Level 0");
        assert_eq!(level_name(550.0), "Level 1");
        assert_eq!(level_name(650.0), "Level 2");
        assert_eq!(level_name(849.0), "Level 3");
        assert_eq!(level_name(949.99), "Level 4");
        assert_eq!(level_name(950.0), "Level 5");
        assert_eq!(level_name(1000.0), "Level 5");
        assert_eq!(level_name(5000.0), "Level 5");
        assert_eq!(level_name(-3.0), "Level 0");
    }

    #[test]
    fn submission_requires_name_and_answers() {
        let some = answers(&[("A1", 1.0, 1)]);
        let empty = IndexMap::new();
        assert!(validate_submission(None, Some(&some)).is_err());
        assert!(validate_submission(Some(""), Some(&some)).is_err());
        assert!(validate_submission(Some("김철수"), None).is_err());
        assert!(validate_submission(Some("김철수"), Some(&empty)).is_err());
        assert_eq!(validate_submission(Some("김철수"), Some(&some)).unwrap(), "김철수");
    }
}
