//! Loading state samples from JSON files

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use super::{PositionDocument, PositionRecord};

/// Load position records from a JSON file (`-` reads stdin)
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<PositionRecord>> {
    let path = path.as_ref();

    let records = if path == Path::new("-") {
        log::info!("Reading state samples from stdin");
        read_records(io::stdin().lock()).with_context(|| "Failed to read samples from stdin")?
    } else {
        log::info!("Loading state samples from {:?}", path);
        let file = File::open(path)
            .with_context(|| format!("Failed to open state sample file: {:?}", path))?;
        read_records(BufReader::new(file))
            .with_context(|| format!("Failed to load state samples from {:?}", path))?
    };

    log::info!("Loaded {} state samples", records.len());
    Ok(records)
}

/// Parse position records from a JSON string
pub fn parse_records(json: &str) -> Result<Vec<PositionRecord>> {
    read_records(json.as_bytes())
}

fn read_records(reader: impl Read) -> Result<Vec<PositionRecord>> {
    let document: PositionDocument =
        serde_json::from_reader(reader).with_context(|| "Failed to parse state sample JSON")?;

    let records = document.into_records()?;
    if records.is_empty() {
        return Err(anyhow!("Document contains no state samples"));
    }
    Ok(records)
}
