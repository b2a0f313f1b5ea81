// Sample source
// Loads labelled beats from CSV and hands them out in a repeating cycle

use std::path::Path;
use thiserror::Error;

use crate::classify::BeatClass;
use crate::samples::types::Sample;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read sample file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Sample file has no data rows")]
    Empty,

    #[error("Row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },
}

/// Load every sample from a CSV file
///
/// The first row is a header and is skipped. Each data row holds the feature
/// values followed by an integer label in 0..=4. Any unparseable row fails the
/// whole load.
pub fn load_samples(path: &Path) -> Result<Vec<Sample>, LoadError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    read_samples(reader)
}

/// Load samples from any CSV reader (header row expected)
pub fn read_samples<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<Sample>, LoadError> {
    let mut samples = Vec::new();

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        samples.push(parse_row(i + 1, &record)?);
    }

    if samples.is_empty() {
        return Err(LoadError::Empty);
    }

    Ok(samples)
}

fn parse_row(row: usize, record: &csv::StringRecord) -> Result<Sample, LoadError> {
    let malformed = |reason: String| LoadError::MalformedRow { row, reason };

    if record.len() < 2 {
        return Err(malformed(format!(
            "expected at least 2 fields, found {}",
            record.len()
        )));
    }

    let label_field = &record[record.len() - 1];
    let label = parse_label(label_field)
        .ok_or_else(|| malformed(format!("invalid label '{}'", label_field)))?;

    let features = record
        .iter()
        .take(record.len() - 1)
        .enumerate()
        .map(|(col, field)| {
            field
                .parse::<f32>()
                .map_err(|_| malformed(format!("column {}: '{}' is not a number", col + 1, field)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Sample::new(features, label))
}

// Labels are usually written as integers, but float exports ("2.0") are
// accepted as long as they are whole numbers.
fn parse_label(field: &str) -> Option<BeatClass> {
    let index = match field.parse::<usize>() {
        Ok(i) => i,
        Err(_) => {
            let value = field.parse::<f64>().ok()?;
            if value.fract() != 0.0 || value < 0.0 {
                return None;
            }
            value as usize
        }
    };
    BeatClass::from_index(index)
}

/// Cyclic cursor over the loaded samples
#[derive(Debug, Clone, Default)]
pub struct SampleSource {
    samples: Vec<Sample>,
    cursor: Option<usize>,
}

impl SampleSource {
    pub fn new(samples: Vec<Sample>) -> Self {
        SampleSource {
            samples,
            cursor: None,
        }
    }

    /// Load from disk, degrading to an empty source on failure
    pub fn open(path: &Path) -> Self {
        match load_samples(path) {
            Ok(samples) => {
                log::info!("Loaded {} samples from {}", samples.len(), path.display());
                Self::new(samples)
            }
            Err(e) => {
                log::error!("Failed to load samples from {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Advance the cursor and return the sample under it
    ///
    /// Wraps to the first sample after the last. Returns `None` forever when
    /// there are no samples.
    pub fn next(&mut self) -> Option<&Sample> {
        if self.samples.is_empty() {
            return None;
        }

        let next = match self.cursor {
            Some(i) => (i + 1) % self.samples.len(),
            None => 0,
        };
        self.cursor = Some(next);
        self.samples.get(next)
    }

    /// Index of the most recently returned sample, `None` before the first
    /// call or when empty
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
