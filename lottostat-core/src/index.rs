use std::collections::HashMap;

use serde::Serialize;

use crate::models::{DrawRecord, MAIN_COUNT};

#[derive(Debug, Clone, Serialize)]
pub struct MatchDetail {
    pub date: String,
    pub special_ball: u8,
    pub prize: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub exists: bool,
    pub frequency: u32,
    pub matches: Vec<MatchDetail>,
}

/// Lookup structure over one variant's history: draws grouped by their
/// sorted main-number key. Values are positions into the snapshot's draw
/// vector, kept in store order (no chronological guarantee beyond what the
/// loader produced).
#[derive(Debug, Clone, Default)]
pub struct CombinationIndex {
    buckets: HashMap<[u8; MAIN_COUNT], Vec<usize>>,
}

impl CombinationIndex {
    pub fn build(draws: &[DrawRecord]) -> Self {
        let mut buckets: HashMap<[u8; MAIN_COUNT], Vec<usize>> = HashMap::new();
        for (i, draw) in draws.iter().enumerate() {
            buckets.entry(draw.sorted_key()).or_default().push(i);
        }
        Self { buckets }
    }

    /// Whether any historical draw shares these 5 main numbers, in any order.
    pub fn contains(&self, main_numbers: &[u8; MAIN_COUNT]) -> bool {
        let mut key = *main_numbers;
        key.sort_unstable();
        self.buckets.contains_key(&key)
    }

    /// All draws matching the main numbers; a supplied special ball narrows
    /// the bucket to exact matches. Inputs must already be validated.
    pub fn lookup(
        &self,
        draws: &[DrawRecord],
        main_numbers: &[u8; MAIN_COUNT],
        special_ball: Option<u8>,
    ) -> MatchResult {
        let mut key = *main_numbers;
        key.sort_unstable();

        let matches: Vec<MatchDetail> = self
            .buckets
            .get(&key)
            .map(|indices| {
                indices
                    .iter()
                    .filter_map(|&i| draws.get(i))
                    .filter(|d| special_ball.map_or(true, |s| d.special_ball == s))
                    .map(|d| MatchDetail {
                        date: d.draw_date.clone(),
                        special_ball: d.special_ball,
                        prize: d.prize.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        MatchResult {
            exists: !matches.is_empty(),
            frequency: matches.len() as u32,
            matches,
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
