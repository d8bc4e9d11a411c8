use rand::{rngs::StdRng, Rng, SeedableRng};

use super::model::{Question, QuizConfig};

/// Build a batch of `question_count` problems for `config`
pub fn generate<R: Rng + ?Sized>(config: &QuizConfig, rng: &mut R) -> Vec<Question> {
    let range_a = config.digits_a.range();
    let range_b = config.digits_b.range();

    (0..config.question_count.get())
        .map(|_| {
            let a = rng.gen_range(range_a.clone());
            let b = rng.gen_range(range_b.clone());
            Question::new(config.operation, a, b)
        })
        .collect()
}

/// Random source for question batches
#[derive(Debug, Clone)]
pub struct QuestionSource {
    seed: Option<u64>,
    rng: StdRng,
}

impl QuestionSource {
    pub fn entropy() -> Self {
        Self {
            seed: None,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::entropy, Self::seeded)
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn generate(&mut self, config: &QuizConfig) -> Vec<Question> {
        generate(config, &mut self.rng)
    }
}
