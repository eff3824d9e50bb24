use csv::Writer;
use itertools::Itertools;
use nalgebra::{DMatrix, DVector};
use std::error::Error;
use std::path::Path;
use tabled::{builder::Builder, settings::Style};

/// Augmented matrix [A | b] as a table, entries with `precision` decimals
pub fn format_system(A: &DMatrix<f64>, b: &DVector<f64>, precision: usize) -> String {
    let mut builder = Builder::default();
    let mut header: Vec<String> = (0..A.ncols()).map(|j| format!("x{}", j + 1)).collect();
    header.push("b".to_string());
    builder.push_record(header);
    for (i, row) in A.row_iter().enumerate() {
        let mut record: Vec<String> = row
            .iter()
            .map(|v| format!("{:.*}", precision, v))
            .collect();
        record.push(b.get(i).map_or(String::new(), |v| format!("{:.*}", precision, v)));
        builder.push_record(record);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

/// one-line rendering of a vector, e.g. "[1.0000, 2.0000]"
pub fn format_vector(v: &DVector<f64>, precision: usize) -> String {
    format!(
        "[{}]",
        v.iter().map(|x| format!("{:.*}", precision, x)).join(", ")
    )
}

/// (iteration, error) pairs of an iterative solve as a table
pub fn iteration_table(history: &[(usize, f64)]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["iteration".to_string(), "error".to_string()]);
    for (iteration, error) in history {
        builder.push_record([iteration.to_string(), format!("{:e}", error)]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

pub fn save_history_to_csv<P: AsRef<Path>>(
    history: &[(usize, f64)],
    path: P,
) -> Result<(), Box<dyn Error>> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(["iteration", "error"])?;
    for (iteration, error) in history {
        writer.write_record(&[iteration.to_string(), error.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}
