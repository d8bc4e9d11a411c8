use std::ops::RangeInclusive;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Arithmetic operation drilled in a batch
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    #[default]
    Add,
    Sub,
    Mul,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::Add, Operation::Sub, Operation::Mul];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Sub => "-",
            Operation::Mul => "×",
        }
    }

    /// Subtraction is not clamped, so results may be negative.
    pub fn apply(&self, a: i64, b: i64) -> i64 {
        match self {
            Operation::Add => a + b,
            Operation::Sub => a - b,
            Operation::Mul => a * b,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Operation::Add => Operation::Sub,
            Operation::Sub => Operation::Mul,
            Operation::Mul => Operation::Add,
        }
    }
}

/// Number of digits in an operand, always within 1..=3
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Digits(u8);

impl Digits {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 3;

    pub fn new(n: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&n).then_some(Self(n))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Operands with this many digits: `[10^(d-1), 10^d - 1]`.
    /// One digit gives 1..=9, zero is never drawn.
    pub fn range(&self) -> RangeInclusive<i64> {
        let exp = u32::from(self.0);
        10_i64.pow(exp - 1)..=10_i64.pow(exp) - 1
    }

    pub fn next(&self) -> Self {
        if self.0 >= Self::MAX {
            Self(Self::MIN)
        } else {
            Self(self.0 + 1)
        }
    }
}

impl Default for Digits {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u8> for Digits {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Digits::new(n).ok_or_else(|| {
            format!(
                "digit count must be between {} and {}, got {}",
                Digits::MIN,
                Digits::MAX,
                n
            )
        })
    }
}

impl From<Digits> for u8 {
    fn from(d: Digits) -> Self {
        d.0
    }
}

/// Size of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(try_from = "usize", into = "usize")]
pub enum QuestionCount {
    #[default]
    #[value(name = "5")]
    Five,
    #[value(name = "15")]
    Fifteen,
    #[value(name = "25")]
    TwentyFive,
    #[value(name = "50")]
    Fifty,
}

impl QuestionCount {
    pub const ALL: [QuestionCount; 4] = [
        QuestionCount::Five,
        QuestionCount::Fifteen,
        QuestionCount::TwentyFive,
        QuestionCount::Fifty,
    ];

    pub fn get(&self) -> usize {
        match self {
            QuestionCount::Five => 5,
            QuestionCount::Fifteen => 15,
            QuestionCount::TwentyFive => 25,
            QuestionCount::Fifty => 50,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            QuestionCount::Five => QuestionCount::Fifteen,
            QuestionCount::Fifteen => QuestionCount::TwentyFive,
            QuestionCount::TwentyFive => QuestionCount::Fifty,
            QuestionCount::Fifty => QuestionCount::Five,
        }
    }
}

impl TryFrom<usize> for QuestionCount {
    type Error = String;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        QuestionCount::ALL
            .into_iter()
            .find(|c| c.get() == n)
            .ok_or_else(|| format!("question count must be one of 5, 15, 25, 50, got {}", n))
    }
}

impl From<QuestionCount> for usize {
    fn from(c: QuestionCount) -> Self {
        c.get()
    }
}

/// Settings for one batch. Changing any field invalidates the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    pub operation: Operation,
    pub digits_a: Digits,
    pub digits_b: Digits,
    pub question_count: QuestionCount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub a: i64,
    pub b: i64,
    pub answer: i64,
    pub symbol: &'static str,
}

impl Question {
    pub fn new(operation: Operation, a: i64, b: i64) -> Self {
        Self {
            a,
            b,
            answer: operation.apply(a, b),
            symbol: operation.symbol(),
        }
    }

    pub fn prompt(&self) -> String {
        format!("{} {} {} =", self.a, self.symbol, self.b)
    }
}

/// Summary of a graded batch, handed to a result sink exactly once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub date: String,
    pub operation: Operation,
    pub elapsed_secs: f64,
    pub correct: usize,
    pub total: usize,
    pub accuracy_percent: f64,
}
