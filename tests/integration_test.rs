// Integration tests for nutrank
use nutrank::prelude::*;
use nutrank::{AdaptiveWeightEngine, ConstraintExtractor, GuidelineIndex, NutrientMap, ScoredCandidate};
use nutrank_guideline::{condition_constraints, SODIUM_NUTRIENT};
use nutrank_ranking::rank::AVOID_PENALTY;
use nutrank_ranking::ProfileSynthesizer;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn reference_data() -> Arc<ReferenceData> {
    Arc::new(ReferenceData::load(data_path("recipes.json"), data_path("guidelines.json")).unwrap())
}

fn profiles() -> Vec<UserProfile> {
    let text = std::fs::read_to_string(data_path("profiles.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn seeded_config() -> RecommenderConfig {
    let mut config = RecommenderConfig::default();
    config.synthesizer.seed = Some(11);
    config
}

fn assert_well_formed(ranked: &[ScoredCandidate], top_n: usize) {
    assert!(ranked.len() <= top_n);
    for pair in ranked.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    for r in ranked {
        assert!(r.score_min >= 0.0 && r.score_min <= r.score);
        assert!(r.score <= r.score_max && r.score_max <= 1.0);
    }
}

#[test]
fn test_scenario_a_payload_ranking() {
    let text = std::fs::read_to_string(data_path("payload.json")).unwrap();
    let payload: SearchQueryPayload = serde_json::from_str(&text).unwrap();
    let request = RankRequest::from_payload(&payload).unwrap();

    let candidates = ReferenceDataset::load(data_path("candidates.json")).unwrap();
    let aligned = request.align(&candidates).unwrap();
    let ranked = request.rank(&aligned, RankerConfig::default()).unwrap();

    let titles: Vec<&str> = ranked.iter().map(|r| r.item.title.as_str()).collect();
    assert_eq!(titles[0], "Vegan Quinoa Salad");
    assert_eq!(titles[2], "Salt Soup");
    // non-vegan and avoided-ingredient titles sink to the bottom
    let bottom: Vec<&str> = titles[3..].to_vec();
    assert!(bottom.contains(&"Chicken Salad"));
    assert!(bottom.contains(&"Peanut Soup"));
    assert_well_formed(&ranked, 5);
}

#[test]
fn test_scenario_b_insufficient_data() {
    let data = reference_data();
    let mut profile = profiles().remove(0);
    profile.regions = Some(vec!["Japanese".to_string()]);

    let rec = Recommender::new(data, seeded_config()).recommend(&profile).unwrap();
    // vegan Japanese dishes: Miso Soup and Tofu Vegetable Stir Fry
    assert_eq!(rec.summary.filtered_count, 2);
    assert_eq!(
        rec.synthesis,
        SynthesisOutcome::InsufficientData { available: 2, required: 5 }
    );
}

#[test]
fn test_scenario_c_static_condition_table() {
    let both = condition_constraints(&["Diabetes Type 2", "Hypertension"]);
    assert_eq!(both.medical_limits.max_sugar, Some(25.0));
    assert_eq!(both.medical_limits.max_sodium, Some(1500.0));

    let data = reference_data();
    let profile = profiles().remove(0);
    let rec = Recommender::new(data, seeded_config()).recommend(&profile).unwrap();
    assert_eq!(rec.payload.constraints.medical_limits.max_sugar, Some(25.0));
    assert_eq!(rec.payload.constraints.medical_limits.max_sodium, Some(1500.0));
}

#[test]
fn test_scenario_d_low_sodium_guideline() {
    let corpus = vec![
        GuidelineRecord::new("Hypertension", "Hypertension: follow a low sodium diet."),
        GuidelineRecord::new("Anemia", "Anemia: eat iron rich foods."),
    ];
    let index = GuidelineIndex::build(corpus, Arc::new(HashEmbedder::default())).unwrap();
    let retrieved = index.retrieve(&["Hypertension"], 1).unwrap();
    let constraints = ConstraintExtractor::default().extract(retrieved.iter().copied());

    assert_eq!(constraints.nutrient_thresholds.get(SODIUM_NUTRIENT), Some(&1500.0));
    // the static table is a separate tier
    assert!(constraints.medical_limits.is_empty());
}

#[test]
fn test_recommend_from_data_files() {
    let data = reference_data();
    let recommender = Recommender::new(data.clone(), seeded_config());

    for profile in profiles() {
        let rec = recommender.recommend(&profile).unwrap();
        assert_eq!(rec.user_id, profile.user_id);
        assert_eq!(rec.retrieved_guidelines.len(), 3);
        assert_well_formed(&rec.top_candidates, 5);

        assert_eq!(rec.payload.metadata.scoring_mode, "adaptive_relu_cosine");
        assert_eq!(rec.payload.target_nutrients.len(), data.schema().len());
        for (_, weight) in rec.payload.weights.iter() {
            assert!(weight >= 0.1);
        }
    }
}

#[test]
fn test_vegan_user_filters_and_penalties() {
    let data = reference_data();
    let profile = profiles().remove(0);
    let rec = Recommender::new(data, seeded_config()).recommend(&profile).unwrap();

    let titles: Vec<&str> = rec.top_candidates.iter().map(|c| c.item.title.as_str()).collect();
    for non_vegan in ["Palak Paneer", "Butter Chicken", "Salmon Teriyaki Bowl", "Chicken Enchiladas"] {
        assert!(!titles.contains(&non_vegan));
    }
    // peanut allergy is a hard filter
    assert!(!titles.contains(&"Peanut Noodle Salad"));

    // six vegan, peanut-free dishes survive
    assert_eq!(rec.summary.filtered_count, 6);
    assert_eq!(rec.synthesis.profiles().len(), 6);
    assert!(!rec.nutrient_ranges.is_empty());

    // Miso Soup breaks the sodium limit, so it is the one left out of the top 5
    assert!(!titles.contains(&"Miso Soup"));
}

#[test]
fn test_avoided_titles_score_below_penalty() {
    let data = reference_data();
    let mut config = seeded_config();
    config.ranker.top_n = 100;

    let mut profile = profiles().remove(1);
    profile.dietary_preference = String::new();
    profile.allergies.clear();
    let recommender = Recommender::new(data, config);
    let rec = recommender.recommend(&profile).unwrap();

    let avoid = &rec.payload.constraints.avoid_ingredients;
    assert!(!avoid.is_empty());
    for candidate in &rec.top_candidates {
        if avoid.matches(&candidate.item.title) {
            assert!(candidate.score <= AVOID_PENALTY);
        }
    }
}

#[test]
fn test_preferred_region_ranks_higher() {
    let data = reference_data();
    let mut config = seeded_config();
    config.ranker.top_n = 100;
    let recommender = Recommender::new(data, config);

    let mut profile = profiles().remove(1);
    profile.preferred_region = None;
    let neutral = recommender.recommend(&profile).unwrap();
    profile.preferred_region = Some("Italian".to_string());
    let italian = recommender.recommend(&profile).unwrap();

    let score = |rec: &Recommendation, title: &str| {
        rec.top_candidates
            .iter()
            .find(|c| c.item.title == title)
            .map(|c| c.score)
            .unwrap()
    };
    assert!(score(&italian, "Lentil Minestrone") > score(&neutral, "Lentil Minestrone"));
    assert!(score(&italian, "Chana Masala") < score(&neutral, "Chana Masala"));
}

#[test]
fn test_idempotent_recommendations() {
    let data = reference_data();
    let recommender = Recommender::new(data, seeded_config());
    let profile = profiles().remove(0);

    let a = recommender.recommend(&profile).unwrap();
    let b = recommender.recommend(&profile).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_concurrent_requests_share_reference_data() {
    let data = reference_data();
    let recommender = Recommender::new(data, seeded_config());
    let expected: Vec<Recommendation> = profiles()
        .iter()
        .map(|p| recommender.recommend(p).unwrap())
        .collect();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let recommender = recommender.clone();
            let profile = profiles().remove(i % 2);
            std::thread::spawn(move || recommender.recommend(&profile).unwrap())
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), expected[i % 2]);
    }
}

#[test]
fn test_denormalization_round_trip() {
    let data = reference_data();
    let stats = data.stats();
    for candidate in data.dataset().candidates() {
        let z = stats.normalize(&candidate.nutrients).unwrap();
        let back = stats.denormalize(&z).unwrap();
        for (a, b) in back.iter().zip(&candidate.nutrients) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}

#[test]
fn test_weight_floor_over_reference_population() {
    let data = reference_data();
    let weights = AdaptiveWeightEngine::new().base_weights(data.stats().stds());
    assert!(weights.iter().all(|w| *w >= 0.1));
    assert!(weights.iter().any(|w| (*w - 1.0).abs() < 1e-12));
}

#[test]
fn test_synthesizer_over_reference_population() {
    let data = reference_data();
    let ranker = nutrank::CandidateRanker::new(data.schema(), data.stats(), RankerConfig::default());
    let target = data.stats().means().to_vec();
    let ranked = ranker
        .rank_all(
            &target,
            data.base_weights(),
            &ConstraintSet::new(),
            &UserFilters::default(),
            data.dataset().candidates(),
        )
        .unwrap();

    let config = nutrank::SynthesizerConfig { seed: Some(3), ..Default::default() };
    let outcome = ProfileSynthesizer::new(data.schema(), data.stats(), config)
        .synthesize(&ranked)
        .unwrap();
    let profiles = outcome.profiles();
    assert_eq!(profiles.len(), 6);
    for profile in profiles {
        let dense = profile.nutrients.to_dense(data.schema()).unwrap();
        assert!(dense.iter().all(|v| *v >= 0.0));
    }
}

#[test]
fn test_recommendation_json_round_trip() {
    let data = reference_data();
    let rec = Recommender::new(data, seeded_config())
        .recommend(&profiles().remove(0))
        .unwrap();

    let json = serde_json::to_value(&rec).unwrap();
    assert_eq!(json["synthesis"]["status"], "profiles");
    assert!(json["top_candidates"][0]["score_min"].is_number());
    assert!(json["payload"]["target_nutrients"]["Energy (kcal)"].is_number());

    let back: Recommendation = serde_json::from_value(json).unwrap();
    assert_eq!(back.top_candidates.len(), rec.top_candidates.len());
}

#[test]
fn test_missing_reference_files() {
    let dir = tempfile::tempdir().unwrap();
    let result = ReferenceData::load(dir.path().join("nope.json"), data_path("guidelines.json"));
    assert!(matches!(result, Err(Error::ReferenceData(_))));

    let result = ReferenceData::load(data_path("recipes.json"), dir.path().join("nope.json"));
    assert!(matches!(result, Err(Error::ReferenceData(_))));
}

#[test]
fn test_malformed_reference_files() {
    let mut corpus = tempfile::NamedTempFile::new().unwrap();
    write!(corpus, "[]").unwrap();
    let result = ReferenceData::load(data_path("recipes.json"), corpus.path());
    assert!(matches!(result, Err(Error::ReferenceData(_))));

    let mut dataset = tempfile::NamedTempFile::new().unwrap();
    write!(dataset, r#"[{{"Recipe_title": "Water", "Region": "Anywhere"}}]"#).unwrap();
    let result = ReferenceData::load(dataset.path(), data_path("guidelines.json"));
    assert!(matches!(result, Err(Error::ReferenceData(_))));
}

#[test]
fn test_payload_keys_validated() {
    let mut target = NutrientMap::new();
    target.insert("Calories", 2000.0);
    let mut weights = NutrientMap::new();
    weights.insert("Calories", 1.0);
    weights.insert("Caffeine (mg)", 1.0);

    let payload = SearchQueryPayload {
        target_nutrients: target,
        weights,
        constraints: ConstraintSet::new(),
        dietary_preference: String::new(),
        metadata: Default::default(),
    };
    assert!(matches!(RankRequest::from_payload(&payload), Err(Error::UnknownNutrient(_))));
}
