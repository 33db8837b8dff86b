//! Sample Questionnaire Generator
//!
//! Generates random questionnaires inside the input form's accepted ranges
//! and either prints them as JSON or, when a model path is given, runs each
//! one through the screening engine.
//!
//! Usage: sample-questionnaire [COUNT] [SYMPTOMATIC_RATE] [MODEL_PATH]

use parkinsons_screening::config::AppConfig;
use parkinsons_screening::{InferenceEngine, Questionnaire};
use rand::Rng;
use tracing::{info, warn};

/// Questionnaire generator for manual testing
struct QuestionnaireGenerator {
    rng: rand::rngs::ThreadRng,
}

impl QuestionnaireGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// Generate a response with few motor symptoms
    fn generate_typical(&mut self) -> Questionnaire {
        let mut q = self.generate_base();
        q.updrs = self.rng.gen_range(0.0..60.0);
        q.moca = self.rng.gen_range(22.0..30.0);
        q.tremor = self.rng.gen_bool(0.1);
        q.rigidity = self.rng.gen_bool(0.1);
        q.bradykinesia = self.rng.gen_bool(0.1);
        q.postural_instability = self.rng.gen_bool(0.05);
        q
    }

    /// Generate a response with pronounced motor and cognitive symptoms
    fn generate_symptomatic(&mut self) -> Questionnaire {
        let mut q = self.generate_base();
        q.age = self.rng.gen_range(60.0..90.0);
        q.updrs = self.rng.gen_range(100.0..200.0);
        q.moca = self.rng.gen_range(5.0..20.0);
        q.functional_assessment = self.rng.gen_range(0.0..4.0);
        q.tremor = self.rng.gen_bool(0.8);
        q.rigidity = self.rng.gen_bool(0.6);
        q.bradykinesia = self.rng.gen_bool(0.6);
        q.postural_instability = self.rng.gen_bool(0.5);
        q.family_history_parkinsons = self.rng.gen_bool(0.4);
        q
    }

    fn generate_base(&mut self) -> Questionnaire {
        let rng = &mut self.rng;
        Questionnaire {
            age: rng.gen_range(18.0..120.0_f64).round(),
            gender: f64::from(rng.gen_range(0..=1u8)),
            ethnicity: f64::from(rng.gen_range(0..=3u8)),
            education_level: f64::from(rng.gen_range(0..=3u8)),
            bmi: rng.gen_range(15.0..40.0),
            smoking: rng.gen_bool(0.3),
            alcohol_consumption: rng.gen_range(0.0..20.0),
            physical_activity: rng.gen_range(0.0..10.0),
            diet_quality: rng.gen_range(1.0..10.0),
            sleep_quality: rng.gen_range(4.0..10.0),
            family_history_parkinsons: rng.gen_bool(0.15),
            traumatic_brain_injury: rng.gen_bool(0.1),
            hypertension: rng.gen_bool(0.15),
            diabetes: rng.gen_bool(0.15),
            depression: rng.gen_bool(0.2),
            stroke: rng.gen_bool(0.05),
            systolic_bp: rng.gen_range(90.0..180.0_f64).round(),
            diastolic_bp: rng.gen_range(60.0..120.0_f64).round(),
            cholesterol_total: rng.gen_range(150.0..300.0),
            cholesterol_ldl: rng.gen_range(50.0..200.0),
            cholesterol_hdl: rng.gen_range(20.0..100.0),
            cholesterol_triglycerides: rng.gen_range(50.0..400.0),
            updrs: rng.gen_range(0.0..200.0),
            moca: rng.gen_range(0.0..30.0),
            functional_assessment: rng.gen_range(0.0..10.0),
            tremor: rng.gen_bool(0.4),
            rigidity: rng.gen_bool(0.25),
            bradykinesia: rng.gen_bool(0.2),
            postural_instability: rng.gen_bool(0.15),
            speech_problems: rng.gen_bool(0.3),
            sleep_disorders: rng.gen_bool(0.25),
            constipation: rng.gen_bool(0.3),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sample_questionnaire=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let count: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(10);
    let symptomatic_rate: f64 = args
        .get(2)
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.3)
        .clamp(0.0, 1.0);
    let model_path = args.get(3);

    info!(count, symptomatic_rate, model = ?model_path, "Configuration loaded");

    let mut generator = QuestionnaireGenerator::new();
    let mut rng = rand::thread_rng();
    let samples: Vec<(bool, Questionnaire)> = (0..count)
        .map(|_| {
            if rng.gen_bool(symptomatic_rate) {
                (true, generator.generate_symptomatic())
            } else {
                (false, generator.generate_typical())
            }
        })
        .collect();

    let Some(model_path) = model_path else {
        for (_, q) in &samples {
            println!("{}", serde_json::to_string(q)?);
        }
        return Ok(());
    };

    let mut config = AppConfig::default();
    config.model.path = model_path.clone();
    let engine = InferenceEngine::new(&config);
    engine.load().await?;

    let mut positives = 0;
    for (i, (symptomatic, q)) in samples.iter().enumerate() {
        match engine.assess(q).await {
            Ok(assessment) => {
                if assessment.outcome == parkinsons_screening::Outcome::Positive {
                    positives += 1;
                }
                info!(
                    sample = i + 1,
                    symptomatic = *symptomatic,
                    probability = assessment.probability,
                    outcome = ?assessment.outcome,
                    "Sample assessed"
                );
            }
            Err(e) => warn!(sample = i + 1, error = %e, "Sample assessment failed"),
        }
    }

    info!("Completed! {} of {} samples assessed positive", positives, count);

    Ok(())
}
