// crates/provstat-core/src/loader/common_io.rs
use crate::error::{Result, StatError};
use crate::table::{Cell, Table};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Opens a source file. A missing file is [`StatError::NotFound`].
pub fn open_stream(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| {
        StatError::NotFound(format!("Dataset not found at {}: {}", path.display(), e))
    })?;
    Ok(BufReader::new(file))
}

/// Reads a delimited file into a [`Table`].
pub fn read_csv_table(path: &Path, delimiter: u8) -> Result<Table> {
    let reader = open_stream(path)?;
    read_csv_from(reader, delimiter)
}

/// Reads delimited text into a [`Table`].
///
/// The first record is the header. Blank header cells are named
/// `Unnamed: <index>` and repeated names get a `.<n>` suffix, so every
/// column stays addressable. Short rows are padded with missing cells.
pub fn read_csv_from<R: Read>(reader: R, delimiter: u8) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut names: Vec<String> = Vec::new();
    for (i, h) in rdr.headers()?.iter().enumerate() {
        let h = h.trim();
        let base = if h.is_empty() {
            format!("Unnamed: {i}")
        } else {
            h.to_string()
        };
        let mut name = base.clone();
        let mut n = 1;
        while names.contains(&name) {
            name = format!("{base}.{n}");
            n += 1;
        }
        names.push(name);
    }

    let mut table = Table::new(names);
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        table.push_row(record.iter().map(Cell::from_raw).collect());
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_headers_become_unnamed_columns() {
        let data = ",Provinsi,,2021\nx,ACEH,y,10\n";
        let t = read_csv_from(data.as_bytes(), b',').unwrap();
        assert_eq!(t.columns(), &["Unnamed: 0", "Provinsi", "Unnamed: 2", "2021"]);
        assert_eq!(t.cell(0, "Provinsi"), Some(&Cell::from("ACEH")));
    }

    #[test]
    fn duplicate_headers_are_suffixed() {
        let t = read_csv_from("a;a;a\n1;2;3\n".as_bytes(), b';').unwrap();
        assert_eq!(t.columns(), &["a", "a.1", "a.2"]);
    }

    #[test]
    fn short_rows_are_padded_and_blank_rows_skipped() {
        let t = read_csv_from("a,b,c\n1\n,,\n4,5,6\n".as_bytes(), b',').unwrap();
        assert_eq!(t.len(), 2);
        assert!(t.cell(0, "c").unwrap().is_missing());
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = read_csv_table(Path::new("/definitely/not/here.csv"), b',').unwrap_err();
        assert!(matches!(err, StatError::NotFound(_)));
    }
}
