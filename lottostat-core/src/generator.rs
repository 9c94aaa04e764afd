use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::frequency::FrequencyTable;
use crate::index::CombinationIndex;
use crate::models::{VariantConfig, MAIN_COUNT};

/// Retry ceiling before a generation call gives up with
/// `GenerationExhausted`.
pub const MAX_ATTEMPTS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    Random,
    Optimized,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedCombination {
    pub main_numbers: [u8; MAIN_COUNT],
    pub special_ball: u8,
    pub attempts: u32,
    /// Historical percentage of the number chosen for each position,
    /// only present in optimized mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_percentages: Option<[f64; MAIN_COUNT]>,
}

pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Uniform draw of 5 distinct main numbers plus an independent special
/// ball, retried until the main-number key is absent from the index.
/// Uniqueness is defined on the main numbers only.
pub fn generate_random(
    config: VariantConfig,
    index: &CombinationIndex,
    rng: &mut StdRng,
) -> Result<GeneratedCombination, Error> {
    for attempt in 1..=MAX_ATTEMPTS {
        let main_numbers = sample_uniform(config, rng);
        if index.contains(&main_numbers) {
            continue;
        }
        let special_ball = rng.random_range(1..=config.special_max);
        return Ok(GeneratedCombination {
            main_numbers,
            special_ball,
            attempts: attempt,
            position_percentages: None,
        });
    }
    Err(Error::GenerationExhausted {
        attempts: MAX_ATTEMPTS,
    })
}

/// Same uniqueness/retry contract as `generate_random`, but each position's
/// candidate is drawn with probability proportional to that position's
/// historical frequency, and the special ball proportional to its overall
/// frequency.
pub fn generate_optimized(
    config: VariantConfig,
    frequencies: &FrequencyTable,
    index: &CombinationIndex,
    rng: &mut StdRng,
) -> Result<GeneratedCombination, Error> {
    for attempt in 1..=MAX_ATTEMPTS {
        let (main_numbers, position_percentages) = sample_weighted(config, frequencies, rng)?;
        if index.contains(&main_numbers) {
            continue;
        }
        let special_ball = sample_special(config, frequencies, rng)?;
        return Ok(GeneratedCombination {
            main_numbers,
            special_ball,
            attempts: attempt,
            position_percentages: Some(position_percentages),
        });
    }
    Err(Error::GenerationExhausted {
        attempts: MAX_ATTEMPTS,
    })
}

fn sample_uniform(config: VariantConfig, rng: &mut StdRng) -> [u8; MAIN_COUNT] {
    let picked = rand::seq::index::sample(rng, config.main_max as usize, MAIN_COUNT);
    let mut numbers = [0u8; MAIN_COUNT];
    for (slot, i) in numbers.iter_mut().zip(picked.iter()) {
        *slot = (i + 1) as u8;
    }
    numbers.sort_unstable();
    numbers
}

/// Cumulative-weight selection without replacement: the chosen candidate is
/// removed from the pool before the next position is sampled, so the 5 main
/// numbers are distinct by construction.
fn sample_weighted(
    config: VariantConfig,
    frequencies: &FrequencyTable,
    rng: &mut StdRng,
) -> Result<([u8; MAIN_COUNT], [f64; MAIN_COUNT]), Error> {
    let mut available: Vec<u8> = (1..=config.main_max).collect();
    let mut numbers = [0u8; MAIN_COUNT];

    for pos in 0..MAIN_COUNT {
        let weights: Vec<f64> = available
            .iter()
            .map(|&n| frequencies.position_count(pos, n) as f64)
            .collect();

        let idx = if weights.iter().sum::<f64>() > 0.0 {
            WeightedIndex::new(&weights)?.sample(rng)
        } else {
            // every remaining candidate is unseen at this position
            rng.random_range(0..available.len())
        };

        numbers[pos] = available.remove(idx);
    }

    numbers.sort_unstable();
    // percentages are read off the sorted array so percentages[i] always
    // describes main_numbers[i] at rank i+1
    let mut percentages = [0.0f64; MAIN_COUNT];
    for (pos, &n) in numbers.iter().enumerate() {
        percentages[pos] = frequencies.position_percentage(pos, n);
    }
    Ok((numbers, percentages))
}

fn sample_special(
    config: VariantConfig,
    frequencies: &FrequencyTable,
    rng: &mut StdRng,
) -> Result<u8, Error> {
    let weights: Vec<f64> = (1..=config.special_max)
        .map(|n| frequencies.special_count(n) as f64)
        .collect();

    if weights.iter().sum::<f64>() > 0.0 {
        let idx = WeightedIndex::new(&weights)?.sample(rng);
        Ok((idx + 1) as u8)
    } else {
        Ok(rng.random_range(1..=config.special_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DrawRecord, LotteryType};

    fn draw(main_numbers: [u8; 5], special_ball: u8) -> DrawRecord {
        DrawRecord {
            lottery_type: LotteryType::Powerball,
            draw_date: "2024-01-01".to_string(),
            main_numbers,
            special_ball,
            multiplier: None,
            prize: None,
        }
    }

    fn powerball() -> VariantConfig {
        LotteryType::Powerball.config()
    }

    #[test]
    fn test_generate_random_valid_and_unique() {
        let draws = vec![draw([1, 2, 3, 4, 5], 10), draw([6, 7, 8, 9, 10], 11)];
        let index = CombinationIndex::build(&draws);
        let config = powerball();
        let mut rng = make_rng(Some(42));

        for _ in 0..50 {
            let combo = generate_random(config, &index, &mut rng).unwrap();
            config.validate_main_numbers(&combo.main_numbers).unwrap();
            config.validate_special_ball(combo.special_ball).unwrap();
            assert!(!index.contains(&combo.main_numbers));
            assert!(combo.attempts >= 1);
            assert!(combo.position_percentages.is_none());
        }
    }

    #[test]
    fn test_generate_random_exhausts_on_full_range() {
        // main range 1-6 has exactly six 5-number combinations
        let config = VariantConfig {
            main_max: 6,
            special_max: 4,
        };
        let draws = vec![
            draw([1, 2, 3, 4, 5], 1),
            draw([1, 2, 3, 4, 6], 1),
            draw([1, 2, 3, 5, 6], 1),
            draw([1, 2, 4, 5, 6], 1),
            draw([1, 3, 4, 5, 6], 1),
            draw([2, 3, 4, 5, 6], 1),
        ];
        let index = CombinationIndex::build(&draws);
        let mut rng = make_rng(Some(7));

        match generate_random(config, &index, &mut rng) {
            Err(Error::GenerationExhausted { attempts }) => assert_eq!(attempts, MAX_ATTEMPTS),
            other => panic!("expected GenerationExhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_generate_optimized_valid_unique_with_percentages() {
        let draws = vec![
            draw([1, 2, 3, 4, 5], 10),
            draw([1, 2, 3, 4, 6], 10),
            draw([10, 20, 30, 40, 50], 12),
        ];
        let config = powerball();
        let frequencies = FrequencyTable::build(&draws, config).unwrap();
        let index = CombinationIndex::build(&draws);
        let mut rng = make_rng(Some(1234));

        for _ in 0..50 {
            let combo = generate_optimized(config, &frequencies, &index, &mut rng).unwrap();
            config.validate_main_numbers(&combo.main_numbers).unwrap();
            config.validate_special_ball(combo.special_ball).unwrap();
            assert!(!index.contains(&combo.main_numbers));

            let percentages = combo.position_percentages.unwrap();
            for pct in percentages {
                assert!((0.0..=100.0).contains(&pct));
            }
        }
    }

    #[test]
    fn test_generate_optimized_exhausts_on_full_range() {
        let config = VariantConfig {
            main_max: 6,
            special_max: 4,
        };
        let draws = vec![
            draw([1, 2, 3, 4, 5], 1),
            draw([1, 2, 3, 4, 6], 2),
            draw([1, 2, 3, 5, 6], 3),
            draw([1, 2, 4, 5, 6], 4),
            draw([1, 3, 4, 5, 6], 1),
            draw([2, 3, 4, 5, 6], 2),
        ];
        let frequencies = FrequencyTable::build(&draws, config).unwrap();
        let index = CombinationIndex::build(&draws);
        let mut rng = make_rng(Some(99));

        assert!(matches!(
            generate_optimized(config, &frequencies, &index, &mut rng),
            Err(Error::GenerationExhausted { .. })
        ));
    }

    #[test]
    fn test_weighted_sampling_favors_frequent_numbers() {
        // number 1 dominates position 1 of the history
        let mut draws = vec![draw([2, 10, 20, 30, 40], 5)];
        for _ in 0..99 {
            draws.push(draw([1, 10, 20, 30, 40], 5));
        }
        let config = powerball();
        let frequencies = FrequencyTable::build(&draws, config).unwrap();
        let mut rng = make_rng(Some(5));

        let mut ones = 0;
        for _ in 0..200 {
            let (numbers, _) = sample_weighted(config, &frequencies, &mut rng).unwrap();
            if numbers.contains(&1) {
                ones += 1;
            }
        }
        // 1 carries 99% of the position-1 weight
        assert!(ones > 150, "number 1 picked only {} / 200 times", ones);
    }

    #[test]
    fn test_position_percentages_describe_the_number_at_that_rank() {
        // two draws with disjoint upper halves, so weighted picks routinely
        // come out of sampling in non-ascending order
        let draws = vec![draw([5, 6, 62, 63, 64], 10), draw([1, 2, 66, 67, 68], 11)];
        let config = powerball();
        let frequencies = FrequencyTable::build(&draws, config).unwrap();
        let mut rng = make_rng(Some(0));

        for _ in 0..100 {
            let (numbers, percentages) = sample_weighted(config, &frequencies, &mut rng).unwrap();
            for (pos, (&n, &pct)) in numbers.iter().zip(percentages.iter()).enumerate() {
                assert_eq!(
                    pct,
                    frequencies.position_percentage(pos, n),
                    "percentage at index {} does not describe number {}",
                    pos,
                    n
                );
            }
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let draws = vec![draw([1, 2, 3, 4, 5], 10)];
        let index = CombinationIndex::build(&draws);
        let config = powerball();

        let a = generate_random(config, &index, &mut make_rng(Some(42))).unwrap();
        let b = generate_random(config, &index, &mut make_rng(Some(42))).unwrap();
        assert_eq!(a.main_numbers, b.main_numbers);
        assert_eq!(a.special_ball, b.special_ball);
    }
}
