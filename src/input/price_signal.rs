//! Code for reading the electricity price signals CSV file.
use super::input_err_msg;
use crate::units::MoneyPerMWh;
use anyhow::{Context, Result, ensure};
use std::io::Read;
use std::path::Path;

const PRICE_SIGNAL_FILE_NAME: &str = "price_signals.csv";

/// Read one named price signal from `price_signals.csv`.
///
/// The file has one column per signal and one row per hour. Rows with an empty cell in any
/// column are dropped, as signals of different lengths are padded with empty cells.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `signal` - Name of the column to read
pub fn read_price_signal(model_dir: &Path, signal: &str) -> Result<Vec<MoneyPerMWh>> {
    let file_path = model_dir.join(PRICE_SIGNAL_FILE_NAME);
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&file_path)
        .with_context(|| input_err_msg(&file_path))?;

    read_price_signal_from_reader(reader, signal).with_context(|| input_err_msg(&file_path))
}

fn read_price_signal_from_reader<R: Read>(
    mut reader: csv::Reader<R>,
    signal: &str,
) -> Result<Vec<MoneyPerMWh>> {
    let headers = reader.headers()?.clone();
    let column = headers
        .iter()
        .position(|header| header == signal)
        .with_context(|| {
            format!(
                "Price signal {signal} not found. Available signals: {}",
                headers.iter().collect::<Vec<_>>().join(", ")
            )
        })?;

    let mut prices = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().any(str::is_empty) {
            continue;
        }

        let value: f64 = record[column]
            .parse()
            .with_context(|| format!("Invalid price on row {}: {}", row + 1, &record[column]))?;
        ensure!(value.is_finite(), "Non-finite price on row {}", row + 1);
        prices.push(MoneyPerMWh(value));
    }

    ensure!(!prices.is_empty(), "Price signal {signal} has no complete rows");

    Ok(prices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;

    fn reader(contents: &'static str) -> csv::Reader<&'static [u8]> {
        csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(contents.as_bytes())
    }

    #[test]
    fn read_named_column() {
        let prices = read_price_signal_from_reader(
            reader("flat_40,diurnal\n40,20\n40,35.5\n40,60\n"),
            "diurnal",
        )
        .unwrap();
        assert_eq!(
            prices,
            [MoneyPerMWh(20.0), MoneyPerMWh(35.5), MoneyPerMWh(60.0)]
        );
    }

    #[test]
    fn drops_incomplete_rows() {
        let prices =
            read_price_signal_from_reader(reader("a,b\n1,2\n3,\n5,6\n"), "a").unwrap();
        assert_eq!(prices, [MoneyPerMWh(1.0), MoneyPerMWh(5.0)]);
    }

    #[test]
    fn unknown_signal() {
        assert_error!(
            read_price_signal_from_reader(reader("a,b\n1,2\n"), "c"),
            "Price signal c not found. Available signals: a, b"
        );
    }

    #[test]
    fn bad_value() {
        assert!(read_price_signal_from_reader(reader("a\nforty\n"), "a").is_err());
    }
}
