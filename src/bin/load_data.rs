// src/bin/load_data.rs
// DOCUMENTATION: Reference data loader
// PURPOSE: Bulk-import ingredients or tags from a CSV file into the database
//
// Usage:
//   load_data ingredients data/ingredients.csv
//   load_data tags data/tags.csv

use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::io::Read;
use std::process;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Ingredients,
    Tags,
}

impl Kind {
    fn parse(raw: &str) -> Option<Kind> {
        match raw {
            "ingredients" => Some(Kind::Ingredients),
            "tags" => Some(Kind::Tags),
            _ => None,
        }
    }

    fn columns(self) -> usize {
        match self {
            Kind::Ingredients => 2,
            Kind::Tags => 3,
        }
    }
}

fn usage() -> ! {
    eprintln!("Usage: load_data <ingredients|tags> <file.csv>");
    process::exit(2);
}

fn database_url() -> String {
    if let Ok(url) = env::var("DATABASE_URL") {
        if !url.trim().is_empty() {
            return url;
        }
    }
    let var = |name: &str, default: &str| env::var(name).unwrap_or_else(|_| default.to_string());
    format!(
        "postgres://{}:{}@{}:{}/{}",
        var("POSTGRES_USER", "foodgram"),
        var("POSTGRES_PASSWORD", "foodgram"),
        var("DB_HOST", "db"),
        var("DB_PORT", "5432"),
        var("DB_NAME", "foodgram"),
    )
}

/// `#RRGGBB`
fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Reads CSV rows with exactly `kind.columns()` fields.
/// A first row starting with "name" is treated as a header.
fn read_rows<R: Read>(reader: R, kind: Kind) -> Result<Vec<Vec<String>>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("line {}", index + 1))?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        if index == 0 && record.get(0).map(|f| f.eq_ignore_ascii_case("name")) == Some(true) {
            continue;
        }
        if record.len() != kind.columns() {
            bail!(
                "line {}: expected {} columns, found {}",
                index + 1,
                kind.columns(),
                record.len()
            );
        }
        if kind == Kind::Tags && !is_hex_color(&record[1]) {
            bail!("line {}: color {:?} is not #RRGGBB", index + 1, &record[1]);
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

async fn insert_rows(pool: &sqlx::PgPool, kind: Kind, rows: &[Vec<String>]) -> Result<u64> {
    let column = |i: usize| rows.iter().map(|r| r[i].clone()).collect::<Vec<String>>();
    let result = match kind {
        Kind::Ingredients => {
            sqlx::query(
                r#"
                INSERT INTO ingredients (name, measurement_unit)
                SELECT * FROM UNNEST($1::TEXT[], $2::TEXT[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(column(0))
            .bind(column(1))
            .execute(pool)
            .await
        }
        Kind::Tags => {
            sqlx::query(
                r#"
                INSERT INTO tags (name, color, slug)
                SELECT * FROM UNNEST($1::TEXT[], $2::TEXT[], $3::TEXT[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(column(0))
            .bind(column(1))
            .bind(column(2))
            .execute(pool)
            .await
        }
    }
    .context("insert failed")?;
    Ok(result.rows_affected())
}

async fn run(kind: Kind, path: &str) -> Result<()> {
    let file = std::fs::File::open(path).with_context(|| format!("cannot open {}", path))?;
    let rows = read_rows(file, kind)?;
    log::info!("Read {} rows from {}", rows.len(), path);

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url())
        .await
        .context("cannot connect to database")?;

    let inserted = insert_rows(&pool, kind, &rows).await?;
    println!(
        "Loaded {} of {} {} ({} already present)",
        inserted,
        rows.len(),
        match kind {
            Kind::Ingredients => "ingredients",
            Kind::Tags => "tags",
        },
        rows.len() as u64 - inserted
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        usage();
    }
    let Some(kind) = Kind::parse(&args[1]) else {
        usage();
    };

    if let Err(e) = run(kind, &args[2]).await {
        eprintln!("load_data failed: {:#}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredients_without_header() {
        let data = "абрикосовое варенье,г\nагар-агар,г\n";
        let rows = read_rows(data.as_bytes(), Kind::Ingredients).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["агар-агар".to_string(), "г".to_string()]);
    }

    #[test]
    fn test_header_is_skipped() {
        let data = "name,measurement_unit\nsalt,g\n\n";
        let rows = read_rows(data.as_bytes(), Kind::Ingredients).unwrap();
        assert_eq!(rows, vec![vec!["salt".to_string(), "g".to_string()]]);
    }

    #[test]
    fn test_tags_need_three_columns() {
        let rows = read_rows("Breakfast,#E26C2D,breakfast\n".as_bytes(), Kind::Tags).unwrap();
        assert_eq!(rows[0][2], "breakfast");
        assert!(read_rows("Breakfast,#E26C2D\n".as_bytes(), Kind::Tags).is_err());
    }

    #[test]
    fn test_tag_color_is_checked() {
        assert!(read_rows("Lunch,green,lunch\n".as_bytes(), Kind::Tags).is_err());
        assert!(is_hex_color("#49b64e"));
        assert!(!is_hex_color("#E26C2"));
        assert!(!is_hex_color("#GGGGGG"));
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(Kind::parse("tags"), Some(Kind::Tags));
        assert_eq!(Kind::parse("recipes"), None);
    }
}
