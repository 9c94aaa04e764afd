use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::import::ImportResult;
use lottostat_core::frequency::{NumberFrequency, PositionFrequency};
use lottostat_core::generator::GeneratedCombination;
use lottostat_core::index::MatchResult;
use lottostat_core::models::{DrawRecord, MAIN_COUNT};

fn numbers_str(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn display_draws(draws: &[DrawRecord]) {
    if draws.is_empty() {
        println!("No draws to display.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Date", "Main numbers", "Special", "Multiplier", "Prize"]);

    for draw in draws {
        table.add_row(vec![
            draw.draw_date.clone(),
            numbers_str(&draw.sorted_key()),
            format!("{:2}", draw.special_ball),
            format!("{}x", draw.effective_multiplier()),
            draw.prize.clone().unwrap_or_else(|| "—".to_string()),
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import finished:");
    println!("  Rows read          : {}", result.total_records);
    println!("  Inserted           : {}", result.inserted);
    println!("  Duplicates skipped : {}", result.skipped);
    if result.errors > 0 {
        println!("  Errors             : {}", result.errors);
    }
}

pub fn display_frequencies(frequencies: &[NumberFrequency], title: &str, draw_count: usize) {
    println!("\n{} ({} draws)\n", title, draw_count);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Number", "Count", "Percentage"]);

    let mut sorted = frequencies.to_vec();
    sorted.sort_by(|a, b| b.count.cmp(&a.count).then(a.number.cmp(&b.number)));

    for entry in &sorted {
        table.add_row(vec![
            format!("{:2}", entry.number),
            entry.count.to_string(),
            format!("{:.2} %", entry.percentage),
        ]);
    }
    println!("{table}");
}

pub fn display_position_frequencies(rows: &[PositionFrequency]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Position", "Number", "Count", "Percentage"]);

    for row in rows.iter().filter(|r| r.count > 0) {
        table.add_row(vec![
            row.position.to_string(),
            format!("{:2}", row.number),
            row.count.to_string(),
            format!("{:.2} %", row.percentage),
        ]);
    }
    println!("{table}");
}

pub fn display_match(
    result: &MatchResult,
    main_numbers: &[u8; MAIN_COUNT],
    special_ball: Option<u8>,
) {
    let mut sorted = *main_numbers;
    sorted.sort_unstable();

    match special_ball {
        Some(s) => println!(
            "\nCombination {} + {} — drawn {} time(s)\n",
            numbers_str(&sorted),
            s,
            result.frequency
        ),
        None => println!(
            "\nCombination {} — drawn {} time(s)\n",
            numbers_str(&sorted),
            result.frequency
        ),
    }

    if result.matches.is_empty() {
        println!("Never drawn in the recorded history.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Date", "Special", "Prize"]);

    for detail in &result.matches {
        table.add_row(vec![
            detail.date.clone(),
            format!("{:2}", detail.special_ball),
            detail.prize.clone().unwrap_or_else(|| "—".to_string()),
        ]);
    }
    println!("{table}");
}

pub fn display_combinations(combinations: &[GeneratedCombination]) {
    println!("\nGenerated combinations (never drawn before)\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Main numbers", "Special", "Attempts", "Position %"]);

    for (i, combo) in combinations.iter().enumerate() {
        let percentages = match &combo.position_percentages {
            Some(p) => p
                .iter()
                .map(|pct| format!("{:.1}", pct))
                .collect::<Vec<_>>()
                .join(" / "),
            None => "—".to_string(),
        };
        table.add_row(vec![
            (i + 1).to_string(),
            numbers_str(&combo.main_numbers),
            format!("{:2}", combo.special_ball),
            combo.attempts.to_string(),
            percentages,
        ]);
    }
    println!("{table}");
}
