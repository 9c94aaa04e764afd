use std::sync::Arc;

use arc_swap::ArcSwapOption;
use rand::rngs::StdRng;

use crate::error::Error;
use crate::frequency::FrequencyTable;
use crate::generator::{self, GeneratedCombination, GenerationMode};
use crate::index::{CombinationIndex, MatchResult};
use crate::models::{DrawRecord, LotteryType, VariantConfig, MAIN_COUNT};

/// Immutable view over one variant's draw history plus the derived
/// frequency table and combination index. All queries validate their
/// input before touching the derived structures.
#[derive(Debug)]
pub struct LotterySnapshot {
    lottery_type: LotteryType,
    config: VariantConfig,
    draws: Vec<DrawRecord>,
    frequencies: FrequencyTable,
    index: CombinationIndex,
}

impl LotterySnapshot {
    /// Validates every draw, then derives the frequency table and index.
    /// Draw order is preserved as loaded (the db loader produces
    /// newest-first).
    pub fn build(lottery_type: LotteryType, draws: Vec<DrawRecord>) -> Result<Self, Error> {
        if draws.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let config = lottery_type.config();
        for draw in &draws {
            config.validate_main_numbers(&draw.main_numbers)?;
            config.validate_special_ball(draw.special_ball)?;
        }
        let frequencies = FrequencyTable::build(&draws, config)?;
        let index = CombinationIndex::build(&draws);
        Ok(Self {
            lottery_type,
            config,
            draws,
            frequencies,
            index,
        })
    }

    pub fn lottery_type(&self) -> LotteryType {
        self.lottery_type
    }

    pub fn config(&self) -> VariantConfig {
        self.config
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn check_combination(
        &self,
        main_numbers: &[u8; MAIN_COUNT],
        special_ball: Option<u8>,
    ) -> Result<MatchResult, Error> {
        self.config.validate_main_numbers(main_numbers)?;
        if let Some(s) = special_ball {
            self.config.validate_special_ball(s)?;
        }
        Ok(self.index.lookup(&self.draws, main_numbers, special_ball))
    }

    pub fn generate(
        &self,
        mode: GenerationMode,
        rng: &mut StdRng,
    ) -> Result<GeneratedCombination, Error> {
        match mode {
            GenerationMode::Random => generator::generate_random(self.config, &self.index, rng),
            GenerationMode::Optimized => {
                generator::generate_optimized(self.config, &self.frequencies, &self.index, rng)
            }
        }
    }

    /// A page of draws in store order (newest first when loaded from the db).
    pub fn latest(&self, offset: usize, limit: usize) -> &[DrawRecord] {
        let end = offset.saturating_add(limit).min(self.draws.len());
        let start = offset.min(end);
        &self.draws[start..end]
    }
}

/// Swappable publication point for a variant's snapshot. Readers clone an
/// `Arc` and keep using it even while a rebuild publishes a replacement;
/// they never observe a partially rebuilt snapshot.
#[derive(Debug, Default)]
pub struct SnapshotHandle {
    inner: ArcSwapOption<LotterySnapshot>,
}

impl SnapshotHandle {
    pub fn empty() -> Self {
        Self {
            inner: ArcSwapOption::empty(),
        }
    }

    pub fn new(snapshot: LotterySnapshot) -> Self {
        Self {
            inner: ArcSwapOption::from(Some(Arc::new(snapshot))),
        }
    }

    /// Current snapshot, or `EmptyDataset` if none has been published yet.
    pub fn load(&self) -> Result<Arc<LotterySnapshot>, Error> {
        self.inner.load_full().ok_or(Error::EmptyDataset)
    }

    pub fn replace(&self, snapshot: LotterySnapshot) {
        self.inner.store(Some(Arc::new(snapshot)));
    }

    /// Builds a fresh snapshot off to the side and swaps it in atomically.
    /// Returns the number of draws published.
    pub fn rebuild(&self, lottery_type: LotteryType, draws: Vec<DrawRecord>) -> Result<usize, Error> {
        let snapshot = LotterySnapshot::build(lottery_type, draws)?;
        let published = snapshot.len();
        self.replace(snapshot);
        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(date: &str, main_numbers: [u8; 5], special_ball: u8) -> DrawRecord {
        DrawRecord {
            lottery_type: LotteryType::Powerball,
            draw_date: date.to_string(),
            main_numbers,
            special_ball,
            multiplier: Some(2),
            prize: None,
        }
    }

    #[test]
    fn test_build_rejects_empty_history() {
        assert!(matches!(
            LotterySnapshot::build(LotteryType::Powerball, vec![]),
            Err(Error::EmptyDataset)
        ));
    }

    #[test]
    fn test_build_rejects_invalid_draw() {
        let draws = vec![draw("2024-01-01", [1, 2, 3, 4, 99], 10)];
        assert!(matches!(
            LotterySnapshot::build(LotteryType::Powerball, draws),
            Err(Error::InvalidRange { number: 99, .. })
        ));
    }

    #[test]
    fn test_round_trip_check_combination() {
        let draws = vec![
            draw("2020-01-01", [1, 2, 3, 4, 5], 10),
            draw("2021-03-15", [1, 2, 3, 4, 5], 12),
        ];
        let snapshot = LotterySnapshot::build(LotteryType::Powerball, draws).unwrap();

        let result = snapshot.check_combination(&[1, 2, 3, 4, 5], None).unwrap();
        assert!(result.exists);
        assert_eq!(result.frequency, 2);

        let result = snapshot
            .check_combination(&[1, 2, 3, 4, 5], Some(10))
            .unwrap();
        assert_eq!(result.frequency, 1);

        let result = snapshot
            .check_combination(&[6, 7, 8, 9, 10], None)
            .unwrap();
        assert!(!result.exists);
        assert_eq!(result.frequency, 0);
    }

    #[test]
    fn test_check_combination_validates_input() {
        let draws = vec![draw("2020-01-01", [1, 2, 3, 4, 5], 10)];
        let snapshot = LotterySnapshot::build(LotteryType::Powerball, draws).unwrap();

        assert!(matches!(
            snapshot.check_combination(&[1, 2, 3, 4, 70], None),
            Err(Error::InvalidRange { number: 70, .. })
        ));
        assert!(matches!(
            snapshot.check_combination(&[1, 1, 3, 4, 5], None),
            Err(Error::DuplicateNumber(1))
        ));
        assert!(matches!(
            snapshot.check_combination(&[1, 2, 3, 4, 5], Some(0)),
            Err(Error::InvalidRange { number: 0, .. })
        ));
    }

    #[test]
    fn test_check_combination_is_idempotent() {
        let draws = vec![draw("2020-01-01", [1, 2, 3, 4, 5], 10)];
        let snapshot = LotterySnapshot::build(LotteryType::Powerball, draws).unwrap();

        let a = snapshot.check_combination(&[1, 2, 3, 4, 5], None).unwrap();
        let b = snapshot.check_combination(&[1, 2, 3, 4, 5], None).unwrap();
        assert_eq!(a.frequency, b.frequency);
        assert_eq!(a.matches.len(), b.matches.len());
        assert_eq!(a.matches[0].date, b.matches[0].date);
    }

    #[test]
    fn test_latest_pagination() {
        let draws = vec![
            draw("2024-03-01", [1, 2, 3, 4, 5], 1),
            draw("2024-02-01", [6, 7, 8, 9, 10], 2),
            draw("2024-01-01", [11, 12, 13, 14, 15], 3),
        ];
        let snapshot = LotterySnapshot::build(LotteryType::Powerball, draws).unwrap();

        let page = snapshot.latest(0, 2);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].draw_date, "2024-03-01");

        let page = snapshot.latest(2, 2);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].draw_date, "2024-01-01");

        assert!(snapshot.latest(10, 5).is_empty());
    }

    #[test]
    fn test_handle_new_starts_published() {
        let snapshot = LotterySnapshot::build(
            LotteryType::Powerball,
            vec![draw("2020-01-01", [1, 2, 3, 4, 5], 10)],
        )
        .unwrap();
        let handle = SnapshotHandle::new(snapshot);
        assert_eq!(handle.load().unwrap().len(), 1);
    }

    #[test]
    fn test_handle_swap_publishes_atomically() {
        let handle = SnapshotHandle::empty();
        assert!(matches!(handle.load(), Err(Error::EmptyDataset)));

        let old = vec![draw("2020-01-01", [1, 2, 3, 4, 5], 10)];
        handle.rebuild(LotteryType::Powerball, old).unwrap();

        // a reader holding the old snapshot is unaffected by a rebuild
        let reader = handle.load().unwrap();
        assert_eq!(reader.len(), 1);

        let new = vec![
            draw("2020-01-01", [1, 2, 3, 4, 5], 10),
            draw("2021-01-01", [6, 7, 8, 9, 10], 11),
        ];
        handle.rebuild(LotteryType::Powerball, new).unwrap();

        assert_eq!(reader.len(), 1);
        assert_eq!(handle.load().unwrap().len(), 2);
    }

    #[test]
    fn test_rebuild_failure_keeps_old_snapshot() {
        let handle = SnapshotHandle::empty();
        handle
            .rebuild(
                LotteryType::Powerball,
                vec![draw("2020-01-01", [1, 2, 3, 4, 5], 10)],
            )
            .unwrap();

        assert!(handle.rebuild(LotteryType::Powerball, vec![]).is_err());
        assert_eq!(handle.load().unwrap().len(), 1);
    }
}
