use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Both supported games draw exactly 5 main numbers.
pub const MAIN_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LotteryType {
    Powerball,
    MegaMillions,
}

impl LotteryType {
    pub fn config(&self) -> VariantConfig {
        match self {
            LotteryType::Powerball => VariantConfig {
                main_max: 69,
                special_max: 26,
            },
            LotteryType::MegaMillions => VariantConfig {
                main_max: 70,
                special_max: 25,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LotteryType::Powerball => "powerball",
            LotteryType::MegaMillions => "mega-millions",
        }
    }
}

impl std::fmt::Display for LotteryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-game number ranges. Main numbers are 1..=main_max, the special
/// ball (Powerball / Mega Ball) is 1..=special_max.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantConfig {
    pub main_max: u8,
    pub special_max: u8,
}

impl VariantConfig {
    pub fn validate_main_numbers(&self, numbers: &[u8; MAIN_COUNT]) -> Result<(), Error> {
        for &n in numbers {
            if n < 1 || n > self.main_max {
                return Err(Error::InvalidRange {
                    number: n,
                    max: self.main_max,
                });
            }
        }
        for i in 0..numbers.len() {
            for j in (i + 1)..numbers.len() {
                if numbers[i] == numbers[j] {
                    return Err(Error::DuplicateNumber(numbers[i]));
                }
            }
        }
        Ok(())
    }

    pub fn validate_special_ball(&self, n: u8) -> Result<(), Error> {
        if n < 1 || n > self.special_max {
            return Err(Error::InvalidRange {
                number: n,
                max: self.special_max,
            });
        }
        Ok(())
    }
}

/// One historical drawing. Never mutated after ingestion; a data refresh
/// replaces the whole snapshot it lives in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawRecord {
    pub lottery_type: LotteryType,
    pub draw_date: String,
    pub main_numbers: [u8; MAIN_COUNT],
    pub special_ball: u8,
    pub multiplier: Option<u32>,
    pub prize: Option<String>,
}

impl DrawRecord {
    /// Canonical index key: the main numbers in ascending order.
    pub fn sorted_key(&self) -> [u8; MAIN_COUNT] {
        let mut key = self.main_numbers;
        key.sort_unstable();
        key
    }

    /// A draw without a recorded multiplier counts as 1x.
    pub fn effective_multiplier(&self) -> u32 {
        self.multiplier.unwrap_or(1)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let config = self.lottery_type.config();
        config.validate_main_numbers(&self.main_numbers)?;
        config.validate_special_ball(self.special_ball)
    }
}
