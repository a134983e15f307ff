//! Functions for reading/writing CSV format.
pub use csv::Error;
use csv::{ReaderBuilder, Writer};
use serde::{de::DeserializeOwned, Serialize};
use std::io::{Read, Write};

/// Parse CSV rows with a header line.
pub fn parse_csv<D, R>(r: R) -> Result<Vec<D>, Error>
where
    D: DeserializeOwned,
    R: Read,
{
    ReaderBuilder::new()
        .comment(Some(b'#'))
        .from_reader(r)
        .deserialize()
        .collect()
}

/// Write CSV rows with a header line.
pub fn write_csv<W, I>(w: W, rows: I) -> Result<(), Error>
where
    W: Write,
    I: IntoIterator,
    I::Item: Serialize,
{
    let mut w = Writer::from_writer(w);
    rows.into_iter().try_for_each(|row| w.serialize(row))?;
    w.flush()?;
    Ok(())
}

/// Dump CSV rows to string.
pub fn dump_csv<I>(rows: I) -> Result<String, Box<dyn std::error::Error>>
where
    I: IntoIterator,
    I::Item: Serialize,
{
    let mut buf = Vec::new();
    write_csv(&mut buf, rows)?;
    Ok(String::from_utf8(buf)?)
}
