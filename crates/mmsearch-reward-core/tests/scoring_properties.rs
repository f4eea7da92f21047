use mmsearch_reward_core::{
    compute_score, exact_match, normalize_answer, score, score_breakdown, substring_match,
    validate_transcript, ContractViolation, Episode, GoldAnswerSet, RewardMode, ScoringConfig,
    TranscriptShape,
};
use serde_json::json;

const DIRECT: &str = "<think>t</think><answer>42</answer>";
const SEARCH: &str = "<think>t</think><text_search>q</text_search>";
const ANSWER_AFTER_SEARCH: &str = "<think>t2</think><answer>42</answer>";

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-12,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn normalization_is_idempotent() {
    let samples = [
        "The Cat!",
        "  An apple,  a day... ",
        "THE END of the Line",
        "Mont-Saint-Michel",
        "l'Arc de Triomphe",
        "\u{00a0}Zürich\u{2003}",
    ];
    for s in samples {
        let once = normalize_answer(s);
        assert_eq!(normalize_answer(&once), once, "sample {s:?}");
    }
}

#[test]
fn normalization_ignores_case_and_punctuation() {
    assert_eq!(normalize_answer("The Cat!"), normalize_answer("cat"));
}

#[test]
fn exact_match_implies_substring_match() {
    let golds = GoldAnswerSet::new(["Eiffel Tower", "la tour Eiffel"]);
    for prediction in ["the Eiffel tower", "La Tour Eiffel!", "tower", "Eiffel"] {
        if exact_match(prediction, &golds) {
            assert!(substring_match(prediction, &golds), "{prediction:?}");
        }
    }
}

#[test]
fn shape_a_is_compliant_without_search() {
    let report = validate_transcript(&[DIRECT]).expect("one turn is supported");
    assert!(report.format_compliant());
    assert!(!report.search_invoked());
}

#[test]
fn shape_b_is_compliant_with_search() {
    let report = validate_transcript(&[SEARCH, ANSWER_AFTER_SEARCH]).expect("two turns");
    assert!(report.format_compliant());
    assert!(report.search_invoked());
    assert_eq!(report.shape, TranscriptShape::SearchThenAnswer);
}

#[test]
fn answer_and_search_in_one_turn_is_not_compliant() {
    let report =
        validate_transcript(&["<think>t</think><text_search>q</text_search><answer>42</answer>"])
            .expect("one turn");
    assert!(!report.format_compliant());
}

#[test]
fn search_then_malformed_answer_is_not_compliant() {
    let golds = GoldAnswerSet::from("42");
    let config = ScoringConfig::default();

    let turns = [SEARCH, "<think>t</think><text_search>q</text_search><answer>42</answer>"];
    let breakdown = score_breakdown(&turns, &golds, &config).unwrap();
    assert_eq!(breakdown.shape, TranscriptShape::Invalid);
    assert_eq!(breakdown.search_count, 1);
    // Correct answer pays the search penalty but earns no format credit.
    assert_close(breakdown.reward, 0.9 * 0.9);

    let report = validate_transcript(&[SEARCH, "<think>t</think>no answer"]).unwrap();
    assert_eq!(report.shape, TranscriptShape::Invalid);
    assert!(report.search_invoked());
    assert_close(score(&[SEARCH, "<think>t</think>no answer"], &golds, &config).unwrap(), 0.0);
}

#[test]
fn three_turns_raise_instead_of_scoring_zero() {
    let err = validate_transcript(&[SEARCH, SEARCH, DIRECT]).unwrap_err();
    assert_eq!(err, ContractViolation::UnsupportedTurnCount { turns: 3 });

    let err = score(
        &[SEARCH, SEARCH, DIRECT],
        &GoldAnswerSet::from("42"),
        &ScoringConfig::default(),
    )
    .unwrap_err();
    assert!(err.as_contract_violation().is_some());
}

#[test]
fn em_rejects_sentence_answer_but_subem_accepts_it() {
    let turns = ["<think>x</think><answer>The capital is Paris.</answer>"];
    let golds = GoldAnswerSet::from("Paris");

    let em = score_breakdown(&turns, &golds, &ScoringConfig::default()).unwrap();
    assert_eq!(em.correct, 0.0);

    let subem_config = ScoringConfig::default().with_reward_mode(RewardMode::SubstringMatch);
    let subem = score_breakdown(&turns, &golds, &subem_config).unwrap();
    assert_eq!(subem.correct, 1.0);
    assert_eq!(subem.answer.as_deref(), Some("The capital is Paris."));
}

#[test]
fn search_then_correct_answer_with_defaults_scores_0_91() {
    let reward = score(
        &[SEARCH, ANSWER_AFTER_SEARCH],
        &GoldAnswerSet::from("42"),
        &ScoringConfig::default(),
    )
    .unwrap();
    assert_close(reward, 0.9 * (1.0 * 0.9) + 0.1 * 1.0);
    assert_close(reward, 0.91);
}

#[test]
fn empty_transcript_raises_contract_violation() {
    let turns: Vec<String> = vec![];
    let err = score(&turns, &GoldAnswerSet::from("42"), &ScoringConfig::default()).unwrap_err();
    assert_eq!(
        err.as_contract_violation(),
        Some(&ContractViolation::EmptyTranscript)
    );

    let err = compute_score(&turns, &GoldAnswerSet::from("42"), None).unwrap_err();
    assert_eq!(
        err.as_contract_violation(),
        Some(&ContractViolation::EmptyTranscript)
    );
}

#[test]
fn empty_transcript_checked_before_config() {
    let turns: Vec<String> = vec![];
    let info = json!({ "reward_mode": "BLEU" });
    let err = compute_score(&turns, &GoldAnswerSet::from("42"), Some(&info)).unwrap_err();
    assert_eq!(
        err.as_contract_violation(),
        Some(&ContractViolation::EmptyTranscript)
    );
}

#[test]
fn rewards_stay_in_unit_interval() {
    let golds = GoldAnswerSet::new(["42", "forty-two"]);
    let transcripts: Vec<Vec<&str>> = vec![
        vec![DIRECT],
        vec!["garbage"],
        vec!["<answer>42</answer>"],
        vec![SEARCH, ANSWER_AFTER_SEARCH],
        vec![SEARCH, "<think>t</think><answer>wrong</answer>"],
        vec!["<think>t</think><text_search>q</text_search><answer>42</answer>"],
        vec![DIRECT, DIRECT],
    ];
    let configs = [
        ScoringConfig::default(),
        ScoringConfig::default()
            .with_reward_mode(RewardMode::SubstringMatch)
            .with_search_count_penalty(true),
        ScoringConfig::default()
            .with_search_penalty(1.0)
            .with_format_penalty(1.0),
        ScoringConfig::default()
            .with_search_penalty(0.0)
            .with_format_penalty(0.0),
    ];

    for turns in &transcripts {
        for config in &configs {
            let reward = score(turns, &golds, config).unwrap();
            assert!((0.0..=1.0).contains(&reward), "{turns:?} -> {reward}");
        }
    }
}

#[test]
fn scoring_is_deterministic_across_threads() {
    let episode = Episode::new(
        vec![SEARCH.to_string(), ANSWER_AFTER_SEARCH.to_string()],
        vec!["42".to_string()],
    );
    let expected = episode.score(&ScoringConfig::default()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let episode = episode.clone();
            std::thread::spawn(move || episode.score(&ScoringConfig::default()).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn episode_json_with_list_ground_truth() {
    let episode = Episode::from_json(
        &json!({
            "responses": [SEARCH, "<think>t</think><answer>forty two</answer>"],
            "ground_truth": ["42", "Forty-Two"],
            "extra_info": { "search_penalty": 0.5, "unrelated": [1, 2, 3] }
        })
        .to_string(),
    )
    .unwrap();

    // "Forty-Two" normalizes to "fortytwo", which differs from "forty two".
    let breakdown = episode.score_breakdown(&ScoringConfig::default()).unwrap();
    assert_eq!(breakdown.correct, 0.0);
    assert_close(breakdown.reward, 0.1);

    let episode = Episode {
        responses: vec![SEARCH.to_string(), ANSWER_AFTER_SEARCH.to_string()],
        ..episode
    };
    let breakdown = episode.score_breakdown(&ScoringConfig::default()).unwrap();
    assert_close(breakdown.correct, 0.5);
    assert_close(breakdown.reward, 0.9 * 0.5 + 0.1);
}
