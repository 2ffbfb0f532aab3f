//! File exports: ranked tables as CSV or JSON, scan rows as JSON chunks.

use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use navrank_pipeline::LumpsumRow;
use navrank_traits::ScoredTable;
use polars::prelude::*;
use serde::Serialize;

/// Write the ranked table as CSV with a header row.
pub(crate) fn write_csv(table: &ScoredTable, path: &Path) -> Result<()> {
    let mut df = table.to_dataframe()?;
    let mut file =
        File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}

/// Write any serializable value as pretty-printed JSON.
pub(crate) fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}

/// `nav_data_{first}_{last}.json` for a non-empty chunk.
pub(crate) fn chunk_file_name(rows: &[LumpsumRow]) -> Option<String> {
    let (first, last) = (rows.first()?, rows.last()?);
    Some(format!("nav_data_{}_{}.json", first.code, last.code))
}

/// Persist `rows` in chunks of `chunk_size`, keeping their order.
///
/// Returns the written paths.
pub(crate) fn write_chunks(
    rows: &[LumpsumRow],
    chunk_size: usize,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    let mut written = Vec::new();
    for chunk in rows.chunks(chunk_size.max(1)) {
        let Some(name) = chunk_file_name(chunk) else {
            continue;
        };
        let path = dir.join(name);
        write_json(chunk, &path)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(code: &str) -> LumpsumRow {
        let day = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        LumpsumRow {
            code: code.into(),
            name: format!("Scheme {code}"),
            xirr: 0.12,
            fund_house: None,
            scheme_type: None,
            scheme_category: None,
            isin_growth: None,
            isin_div_reinvestment: None,
            latest_nav: 11.2,
            latest_nav_date: day,
            prev_year_nav: 10.0,
            prev_year_nav_date: day,
        }
    }

    #[test]
    fn test_chunk_file_name() {
        let rows = vec![row("100027"), row("100033"), row("100047")];
        assert_eq!(
            chunk_file_name(&rows).as_deref(),
            Some("nav_data_100027_100047.json")
        );
        assert!(chunk_file_name(&[]).is_none());
    }

    #[test]
    fn test_write_chunks() {
        let dir = std::env::temp_dir().join(format!("navrank-chunks-{}", std::process::id()));
        let rows: Vec<LumpsumRow> = (1..=5).map(|i| row(&i.to_string())).collect();

        let paths = write_chunks(&rows, 2, &dir).unwrap();
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            ["nav_data_1_2.json", "nav_data_3_4.json", "nav_data_5_5.json"]
        );

        let text = fs::read_to_string(&paths[0]).unwrap();
        let back: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0]["code"], "1");
        assert_eq!(back[0]["latest_nav_date"], "2024-06-28");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_write_csv() {
        let path = std::env::temp_dir().join(format!("navrank-empty-{}.csv", std::process::id()));
        write_csv(&ScoredTable::default(), &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.lines().next().unwrap_or_default().contains("rank"));
        fs::remove_file(&path).unwrap();
    }
}
