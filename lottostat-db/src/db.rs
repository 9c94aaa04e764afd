use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use lottostat_core::models::{DrawRecord, LotteryType};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    lottery_type  TEXT NOT NULL,
    draw_date     TEXT NOT NULL,
    number_1      INTEGER NOT NULL,
    number_2      INTEGER NOT NULL,
    number_3      INTEGER NOT NULL,
    number_4      INTEGER NOT NULL,
    number_5      INTEGER NOT NULL,
    special_ball  INTEGER NOT NULL,
    multiplier    INTEGER,
    prize         TEXT,
    PRIMARY KEY (lottery_type, draw_date)
);
CREATE INDEX IF NOT EXISTS idx_draws_date ON draws (draw_date);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("lottostat.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("could not create directory {:?}", parent))?;
    }
    let conn =
        Connection::open(path).with_context(|| format!("could not open database {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA).context("migration failed")?;
    Ok(())
}

/// Inserts one draw, ignoring duplicates on (lottery_type, draw_date).
/// Returns whether a row was actually written.
pub fn insert_draw(conn: &Connection, draw: &DrawRecord) -> Result<bool> {
    let changed = conn
        .execute(
            "INSERT OR IGNORE INTO draws (lottery_type, draw_date, number_1, number_2, number_3, number_4, number_5, special_ball, multiplier, prize)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                draw.lottery_type.as_str(),
                draw.draw_date,
                draw.main_numbers[0],
                draw.main_numbers[1],
                draw.main_numbers[2],
                draw.main_numbers[3],
                draw.main_numbers[4],
                draw.special_ball,
                draw.multiplier,
                draw.prize,
            ],
        )
        .context("insert failed")?;
    Ok(changed > 0)
}

/// The authoritative snapshot source: every draw for one variant,
/// newest first.
pub fn load_draws(conn: &Connection, lottery_type: LotteryType) -> Result<Vec<DrawRecord>> {
    let mut stmt = conn.prepare(
        "SELECT draw_date, number_1, number_2, number_3, number_4, number_5, special_ball, multiplier, prize
         FROM draws WHERE lottery_type = ?1 ORDER BY draw_date DESC",
    )?;
    let draws = stmt
        .query_map([lottery_type.as_str()], |row| {
            Ok(DrawRecord {
                lottery_type,
                draw_date: row.get(0)?,
                main_numbers: [
                    row.get::<_, u8>(1)?,
                    row.get::<_, u8>(2)?,
                    row.get::<_, u8>(3)?,
                    row.get::<_, u8>(4)?,
                    row.get::<_, u8>(5)?,
                ],
                special_ball: row.get(6)?,
                multiplier: row.get(7)?,
                prize: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn count_draws(conn: &Connection, lottery_type: LotteryType) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM draws WHERE lottery_type = ?1",
        [lottery_type.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}
