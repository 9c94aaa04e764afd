use serde::Serialize;

use crate::error::Error;
use crate::models::{DrawRecord, VariantConfig, MAIN_COUNT};

#[derive(Debug, Clone, Serialize)]
pub struct NumberFrequency {
    pub number: u8,
    pub count: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionFrequency {
    pub position: u8,
    pub number: u8,
    pub count: u32,
    pub percentage: f64,
}

/// Derived frequency statistics for one variant's draw history. Rebuilt
/// from scratch whenever the underlying draws change, never updated in place.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    overall: Vec<NumberFrequency>,
    by_position: Vec<Vec<NumberFrequency>>,
    special: Vec<NumberFrequency>,
}

impl FrequencyTable {
    pub fn build(draws: &[DrawRecord], config: VariantConfig) -> Result<Self, Error> {
        Ok(Self {
            overall: compute_overall(draws, config)?,
            by_position: compute_by_position(draws, config)?,
            special: compute_special_ball(draws, config)?,
        })
    }

    /// Main-number frequencies over every drawn slot, ascending by number.
    /// Numbers never drawn are present with count 0.
    pub fn overall(&self) -> &[NumberFrequency] {
        &self.overall
    }

    /// Special-ball frequencies, ascending by number.
    pub fn special(&self) -> &[NumberFrequency] {
        &self.special
    }

    /// Frequencies for one position (1..=5), or `None` out of that range.
    pub fn position(&self, position: u8) -> Option<&[NumberFrequency]> {
        if (1..=MAIN_COUNT as u8).contains(&position) {
            self.by_position
                .get(position as usize - 1)
                .map(|v| v.as_slice())
        } else {
            None
        }
    }

    /// Flattened (position, number) rows, optionally filtered to one
    /// position, ordered by position then number.
    pub fn position_rows(&self, position: Option<u8>) -> Vec<PositionFrequency> {
        let mut rows = Vec::new();
        for (i, table) in self.by_position.iter().enumerate() {
            let pos = (i + 1) as u8;
            if let Some(wanted) = position {
                if pos != wanted {
                    continue;
                }
            }
            for entry in table {
                rows.push(PositionFrequency {
                    position: pos,
                    number: entry.number,
                    count: entry.count,
                    percentage: entry.percentage,
                });
            }
        }
        rows
    }

    pub(crate) fn position_count(&self, position_idx: usize, number: u8) -> u32 {
        self.by_position
            .get(position_idx)
            .and_then(|table| table.get(number as usize - 1))
            .map_or(0, |entry| entry.count)
    }

    pub(crate) fn position_percentage(&self, position_idx: usize, number: u8) -> f64 {
        self.by_position
            .get(position_idx)
            .and_then(|table| table.get(number as usize - 1))
            .map_or(0.0, |entry| entry.percentage)
    }

    pub(crate) fn special_count(&self, number: u8) -> u32 {
        self.special
            .get(number as usize - 1)
            .map_or(0, |entry| entry.count)
    }
}

/// Counts each main number across all draws. The percentage denominator is
/// the total number of main slots (draws x 5), so percentages sum to 100.
pub fn compute_overall(
    draws: &[DrawRecord],
    config: VariantConfig,
) -> Result<Vec<NumberFrequency>, Error> {
    if draws.is_empty() {
        return Err(Error::EmptyDataset);
    }

    let mut counts = vec![0u32; config.main_max as usize];
    for draw in draws {
        for &n in &draw.main_numbers {
            if let Some(slot) = counts.get_mut(n as usize - 1) {
                *slot += 1;
            }
        }
    }

    let slots = (draws.len() * MAIN_COUNT) as f64;
    Ok(table_from_counts(&counts, slots))
}

/// Position 1..5 is the rank in the ascending sort of a draw's main
/// numbers, not the order the numbers were reported in the source data.
/// Each draw contributes exactly one tally per position, so the
/// denominator is the draw count.
pub fn compute_by_position(
    draws: &[DrawRecord],
    config: VariantConfig,
) -> Result<Vec<Vec<NumberFrequency>>, Error> {
    if draws.is_empty() {
        return Err(Error::EmptyDataset);
    }

    let mut counts = vec![vec![0u32; config.main_max as usize]; MAIN_COUNT];
    for draw in draws {
        for (pos, &n) in draw.sorted_key().iter().enumerate() {
            if let Some(slot) = counts[pos].get_mut(n as usize - 1) {
                *slot += 1;
            }
        }
    }

    let denominator = draws.len() as f64;
    Ok(counts
        .iter()
        .map(|position_counts| table_from_counts(position_counts, denominator))
        .collect())
}

/// Same shape as the overall table, over the single special-ball field.
pub fn compute_special_ball(
    draws: &[DrawRecord],
    config: VariantConfig,
) -> Result<Vec<NumberFrequency>, Error> {
    if draws.is_empty() {
        return Err(Error::EmptyDataset);
    }

    let mut counts = vec![0u32; config.special_max as usize];
    for draw in draws {
        if let Some(slot) = counts.get_mut(draw.special_ball as usize - 1) {
            *slot += 1;
        }
    }

    Ok(table_from_counts(&counts, draws.len() as f64))
}

fn table_from_counts(counts: &[u32], denominator: f64) -> Vec<NumberFrequency> {
    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| NumberFrequency {
            number: (i + 1) as u8,
            count,
            percentage: count as f64 / denominator * 100.0,
        })
        .collect()
}
