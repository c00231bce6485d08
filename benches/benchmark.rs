// Ranking pipeline benchmarks
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nutrank::prelude::*;
use nutrank::{CandidateRanker, GuidelineIndex};
use rand::prelude::*;
use std::sync::Arc;

const NUTRIENTS: [&str; 7] = [
    "Energy (kcal)",
    "Protein (g)",
    "Carbohydrate, by difference (g)",
    "Total lipid (fat) (g)",
    "Fiber, total dietary (g)",
    "Sugars, total (g)",
    "Sodium, Na (mg)",
];

const REGIONS: [&str; 5] = ["Indian", "Italian", "Japanese", "Mexican", "Thai"];

fn generate_candidate(rng: &mut StdRng, id: usize) -> CandidateItem {
    let nutrients = vec![
        rng.random_range(50.0..900.0),
        rng.random_range(0.0..60.0),
        rng.random_range(0.0..120.0),
        rng.random_range(0.0..50.0),
        rng.random_range(0.0..20.0),
        rng.random_range(0.0..40.0),
        rng.random_range(0.0..2500.0),
    ];
    CandidateItem::new(id as u64, format!("Recipe number {}", id), nutrients)
        .with_region(REGIONS[id % REGIONS.len()])
        .with_flag("vegan", rng.random_bool(0.4))
}

fn generate_dataset(size: usize) -> ReferenceDataset {
    let mut rng = StdRng::seed_from_u64(42);
    let schema = NutrientSchema::new(NUTRIENTS).unwrap();
    let candidates = (0..size).map(|i| generate_candidate(&mut rng, i)).collect();
    ReferenceDataset::new(schema, candidates).unwrap()
}

fn corpus() -> Vec<GuidelineRecord> {
    vec![
        GuidelineRecord::new("Diabetes Type 2", "Diabetes type 2: limit added sugar; prefer a low sugar diet."),
        GuidelineRecord::new("Hypertension", "Hypertension: follow a low sodium diet and limit salt."),
        GuidelineRecord::new("High Cholesterol", "High cholesterol: limit saturated fat and fried oil."),
        GuidelineRecord::new("Celiac Disease", "Celiac disease: avoid gluten."),
    ]
}

fn profile() -> UserProfile {
    serde_json::from_value(serde_json::json!({
        "userId": "bench",
        "age": 35,
        "gender": "male",
        "weight": 72,
        "height": 178,
        "activityLevel": "active",
        "dietaryPreference": "vegan",
        "medicalHistory": ["Hypertension", "Diabetes Type 2"]
    }))
    .unwrap()
}

fn benchmark_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");

    for size in [1_000, 10_000, 100_000].iter() {
        let dataset = generate_dataset(*size);
        let ranker = CandidateRanker::new(dataset.schema(), dataset.stats(), RankerConfig::default());
        let target = vec![2500.0, 86.0, 200.0, 60.0, 30.0, 25.0, 1500.0];
        let weights = vec![1.0; NUTRIENTS.len()];
        let mut constraints = ConstraintSet::new();
        constraints.avoid_ingredients.extend(["sugar", "salt"]);
        constraints.add_threshold("Sodium, Na (mg)", 1500.0);
        let filters = UserFilters {
            dietary_preference: Some("vegan".to_string()),
            ..UserFilters::default()
        };

        group.bench_with_input(BenchmarkId::new("nutrank", size), size, |b, _| {
            b.iter(|| {
                let results = ranker
                    .rank(black_box(&target), &weights, &constraints, &filters, dataset.candidates())
                    .unwrap();
                black_box(results);
            });
        });
    }

    group.finish();
}

fn benchmark_retrieve(c: &mut Criterion) {
    let mut group = c.benchmark_group("retrieve");

    let index = GuidelineIndex::build(corpus(), Arc::new(HashEmbedder::default())).unwrap();
    let conditions = ["Hypertension", "Diabetes Type 2"];

    group.bench_function("guideline_top3", |b| {
        b.iter(|| {
            let results = index.retrieve(black_box(&conditions), 3).unwrap();
            black_box(results);
        });
    });

    group.finish();
}

fn benchmark_recommend(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommend");

    let data = ReferenceData::new(generate_dataset(10_000), corpus(), Arc::new(HashEmbedder::default())).unwrap();
    let mut config = RecommenderConfig::default();
    config.synthesizer.seed = Some(7);
    let recommender = Recommender::new(Arc::new(data), config);
    let profile = profile();

    group.bench_function("end_to_end", |b| {
        b.iter(|| {
            let rec = recommender.recommend(black_box(&profile)).unwrap();
            black_box(rec);
        });
    });

    group.bench_function("concurrent", |b| {
        b.iter(|| {
            use std::thread;
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let recommender = recommender.clone();
                    let profile = profile.clone();
                    thread::spawn(move || recommender.recommend(&profile))
                })
                .collect();

            for handle in handles {
                black_box(handle.join().unwrap().unwrap());
            }
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_rank, benchmark_retrieve, benchmark_recommend);
criterion_main!(benches);
