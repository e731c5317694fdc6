//! CSV-based rate table loader
//!
//! Tables are one row per attained age: an age column followed by one column
//! per duration bucket. Ages must be contiguous and ascending; a malformed
//! table invalidates the whole run and fails immediately.

use super::table::{RateTable, DURATION_BUCKETS};
use std::error::Error;
use std::path::Path;

/// Load a rate table from a CSV file
pub fn load_rate_table<P: AsRef<Path>>(path: P) -> Result<RateTable, Box<dyn Error>> {
    let file = std::fs::File::open(path)?;
    load_rate_table_from_reader(file)
}

/// Load a rate table from any reader
pub fn load_rate_table_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<RateTable, Box<dyn Error>> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let mut min_age: Option<u32> = None;
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for result in csv_reader.records() {
        let record = result?;
        if record.is_empty() {
            continue;
        }

        let age: u32 = record[0].parse()?;
        let expected = min_age.unwrap_or(age) + rows.len() as u32;
        if age != expected {
            return Err(format!("rate table ages must be contiguous: expected {}, found {}", expected, age).into());
        }
        min_age.get_or_insert(age);

        let rates = record
            .iter()
            .skip(1)
            .take(DURATION_BUCKETS)
            .map(|cell| cell.parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()?;
        rows.push(rates);
    }

    let min_age = min_age.ok_or("rate table file contains no rows")?;
    Ok(RateTable::new(min_age, rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_rate_table() {
        let data = "\
age,d0,d1,d2,d3,d4,d5
40,0.001,0.002,0.003,0.004,0.005,0.006
41,0.002,0.003,0.004,0.005,0.006,0.007
";
        let table = load_rate_table_from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.min_age(), 40);
        assert_eq!(table.rate(41, 2), 0.004);
    }

    #[test]
    fn test_short_row_rejected() {
        let data = "\
age,d0,d1
40,0.001,0.002
";
        assert!(load_rate_table_from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_age_gap_rejected() {
        let data = "\
age,d0,d1,d2,d3,d4,d5
40,0.001,0.002,0.003,0.004,0.005,0.006
43,0.002,0.003,0.004,0.005,0.006,0.007
";
        assert!(load_rate_table_from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_empty_file_rejected() {
        let data = "age,d0,d1,d2,d3,d4,d5\n";
        assert!(load_rate_table_from_reader(data.as_bytes()).is_err());
    }
}
