use anyhow::{bail, Context, Result};
use lottostat_db::rusqlite::Connection;
use std::path::Path;

use lottostat_core::models::{DrawRecord, LotteryType, MAIN_COUNT};
use lottostat_db::db::insert_draw;

/// Accepts ISO dates as-is and normalizes the scraper's MM/DD/YYYY form.
pub fn parse_date(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.len() == 10 && raw.as_bytes()[4] == b'-' {
        return Ok(raw.to_string());
    }
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 {
        bail!("invalid date format: '{}'", raw);
    }
    Ok(format!("{}-{}-{}", parts[2], parts[0], parts[1]))
}

pub fn parse_main_numbers(raw: &str) -> Result<[u8; MAIN_COUNT]> {
    let numbers: Vec<u8> = raw
        .split_whitespace()
        .map(|s| {
            s.parse::<u8>()
                .with_context(|| format!("could not parse number '{}'", s))
        })
        .collect::<Result<_>>()?;
    if numbers.len() != MAIN_COUNT {
        bail!(
            "expected {} main numbers, got {} in '{}'",
            MAIN_COUNT,
            numbers.len(),
            raw
        );
    }
    let mut arr = [0u8; MAIN_COUNT];
    arr.copy_from_slice(&numbers);
    Ok(arr)
}

fn parse_record(record: &csv::StringRecord, lottery_type: LotteryType) -> Result<DrawRecord> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("missing field at index {}", idx))
    };

    let draw_date = parse_date(&get(0)?)?;
    let main_numbers = parse_main_numbers(&get(1)?)?;
    let special_raw = get(2)?;
    let special_ball: u8 = special_raw
        .parse()
        .with_context(|| format!("could not parse special ball '{}'", special_raw))?;

    let multiplier = match get(3) {
        Ok(s) if !s.is_empty() => Some(
            s.parse::<u32>()
                .with_context(|| format!("could not parse multiplier '{}'", s))?,
        ),
        _ => None,
    };
    let prize = match get(4) {
        Ok(s) if !s.is_empty() => Some(s),
        _ => None,
    };

    let draw = DrawRecord {
        lottery_type,
        draw_date,
        main_numbers,
        special_ball,
        multiplier,
        prize,
    };
    draw.validate()?;
    Ok(draw)
}

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

/// Imports scraper-format CSV rows:
/// draw_date, winning_numbers (5 space-separated), special_ball, multiplier[, prize]
pub fn import_csv(conn: &Connection, path: &Path, lottery_type: LotteryType) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("could not open {:?}", path))?;

    let tx = conn
        .unchecked_transaction()
        .context("could not start transaction")?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        errors: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        match record_result {
            Ok(record) => match parse_record(&record, lottery_type) {
                Ok(draw) => match insert_draw(&tx, &draw) {
                    Ok(true) => result.inserted += 1,
                    Ok(false) => result.skipped += 1,
                    Err(e) => {
                        eprintln!("insert error on row {}: {}", result.total_records, e);
                        result.errors += 1;
                    }
                },
                Err(e) => {
                    eprintln!("parse error on row {}: {}", result.total_records, e);
                    result.errors += 1;
                }
            },
            Err(e) => {
                eprintln!("read error on row {}: {}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("commit failed")?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-17").unwrap(), "2024-01-17");
        assert_eq!(parse_date("01/17/2024").unwrap(), "2024-01-17");
        assert_eq!(parse_date("12/31/2019").unwrap(), "2019-12-31");
        assert!(parse_date("17 January 2024").is_err());
    }

    #[test]
    fn test_parse_main_numbers() {
        assert_eq!(parse_main_numbers("1 2 3 4 5").unwrap(), [1, 2, 3, 4, 5]);
        assert_eq!(
            parse_main_numbers(" 12  34 56 7 8 ").unwrap(),
            [12, 34, 56, 7, 8]
        );
        assert!(parse_main_numbers("1 2 3 4").is_err());
        assert!(parse_main_numbers("1 2 3 4 5 6").is_err());
        assert!(parse_main_numbers("1 2 x 4 5").is_err());
    }

    #[test]
    fn test_parse_record_validates_ranges() {
        let record = csv::StringRecord::from(vec!["2024-01-01", "1 2 3 4 99", "10", "2"]);
        assert!(parse_record(&record, LotteryType::Powerball).is_err());

        let record = csv::StringRecord::from(vec!["2024-01-01", "1 2 3 4 5", "10", "2"]);
        let draw = parse_record(&record, LotteryType::Powerball).unwrap();
        assert_eq!(draw.main_numbers, [1, 2, 3, 4, 5]);
        assert_eq!(draw.special_ball, 10);
        assert_eq!(draw.multiplier, Some(2));
        assert!(draw.prize.is_none());
    }

    #[test]
    fn test_parse_record_rejects_bad_multiplier() {
        let record = csv::StringRecord::from(vec!["2024-01-01", "1 2 3 4 5", "10", "x2"]);
        assert!(parse_record(&record, LotteryType::Powerball).is_err());
    }

    #[test]
    fn test_parse_record_optional_fields() {
        let record = csv::StringRecord::from(vec!["01/01/2024", "1 2 3 4 5", "10"]);
        let draw = parse_record(&record, LotteryType::Powerball).unwrap();
        assert_eq!(draw.draw_date, "2024-01-01");
        assert_eq!(draw.multiplier, None);
        assert_eq!(draw.effective_multiplier(), 1);
    }
}
