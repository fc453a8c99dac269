//! Rich interval records built from columnar track lines.
//!
//! Flat formats (plain intervals, BED, genePred) become a
//! [`RichIntervalRecord`] in one step through [`parse_line`]. GFF and GTF go
//! through the two-phase build in [`gff`]: parse every line, absorb child
//! features into their parents, then freeze.

pub mod gff;
mod mapping;

pub use mapping::{ColumnMapping, TrackFormat};

use std::fmt::Write as _;
use std::str::FromStr;

use thiserror::Error;

use crate::interval::{Block, BlockError, Interval};

/// Errors raised while turning a text line into a record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The line has fewer columns than the mapping requires.
    #[error("missing column {column} ({field}) in line: {line}")]
    MissingColumn {
        /// 0-based column index.
        column: usize,
        /// Field the column was mapped to.
        field: &'static str,
        /// Offending line.
        line: String,
    },

    /// A numeric column could not be parsed.
    #[error("invalid {field} value {value:?}")]
    BadNumber {
        /// Field being parsed.
        field: &'static str,
        /// Raw text.
        value: String,
    },

    /// A colour column was not `r,g,b`.
    #[error("invalid item RGB {0:?}")]
    BadColor(String),

    /// Packed block columns were malformed.
    #[error(transparent)]
    Blocks(#[from] BlockError),
}

/// Feature orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strand {
    /// Forward strand; also used when the strand is unspecified.
    #[default]
    Forward,
    /// Reverse strand; only produced by an explicit `-`.
    Reverse,
}

impl Strand {
    /// `-` is reverse, anything else (including `.`, `?` or nothing) is forward.
    pub fn from_marker(marker: Option<&str>) -> Self {
        match marker.map(str::trim) {
            Some("-") => Strand::Reverse,
            _ => Strand::Forward,
        }
    }

    /// `+` or `-`.
    pub fn as_char(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

/// BED `itemRgb` colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemRgb {
    /// Red.
    pub red: u8,
    /// Green.
    pub green: u8,
    /// Blue.
    pub blue: u8,
}

impl FromStr for ItemRgb {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(',').collect();
        let channel = |text: &str| text.trim().parse::<u8>().map_err(|_| RecordError::BadColor(s.to_string()));
        match parts[..] {
            [r, g, b] => Ok(ItemRgb {
                red: channel(r)?,
                green: channel(g)?,
                blue: channel(b)?,
            }),
            _ => Err(RecordError::BadColor(s.to_string())),
        }
    }
}

/// An interval feature with optional sub-blocks, score, strand, coding region,
/// colour and names.
///
/// Records are immutable once built. GFF/GTF transcripts receive their blocks
/// and coding region from [`gff::GffRecordBuilder`] before they are frozen.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RichIntervalRecord {
    reference: String,
    interval: Interval,
    blocks: Option<Vec<Block>>,
    score: f32,
    strand: Strand,
    thick_start: Option<i64>,
    thick_end: Option<i64>,
    item_rgb: Option<ItemRgb>,
    name: Option<String>,
    alternate_name: Option<String>,
    feature_type: Option<String>,
}

impl RichIntervalRecord {
    /// Minimal record: no blocks, no score, forward strand.
    pub fn new(reference: impl Into<String>, interval: Interval) -> Self {
        Self {
            reference: reference.into(),
            interval,
            blocks: None,
            score: f32::NAN,
            strand: Strand::Forward,
            thick_start: None,
            thick_end: None,
            item_rgb: None,
            name: None,
            alternate_name: None,
            feature_type: None,
        }
    }

    /// Set sub-blocks.
    pub fn with_blocks(mut self, blocks: Option<Vec<Block>>) -> Self {
        self.blocks = blocks;
        self
    }

    /// Set the score (NaN for absent).
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Set the strand.
    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = strand;
        self
    }

    /// Set the coding region; `None` falls back to the interval bounds.
    pub fn with_thick(mut self, thick_start: Option<i64>, thick_end: Option<i64>) -> Self {
        self.thick_start = thick_start;
        self.thick_end = thick_end;
        self
    }

    /// Set the colour.
    pub fn with_item_rgb(mut self, item_rgb: Option<ItemRgb>) -> Self {
        self.item_rgb = item_rgb;
        self
    }

    /// Set the primary and alternate names.
    pub fn with_names(mut self, name: Option<String>, alternate_name: Option<String>) -> Self {
        self.name = name;
        self.alternate_name = alternate_name;
        self
    }

    /// Set the GFF/GTF feature type.
    pub fn with_feature_type(mut self, feature_type: Option<String>) -> Self {
        self.feature_type = feature_type;
        self
    }

    /// Reference sequence name.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Feature extent (1-based, closed).
    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Sub-blocks in file/absorption order, if any.
    pub fn blocks(&self) -> Option<&[Block]> {
        self.blocks.as_deref()
    }

    /// Score, NaN when the file had none.
    pub fn score(&self) -> f32 {
        self.score
    }

    /// Orientation.
    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// Start of the coding region; the interval start when unspecified.
    pub fn thick_start(&self) -> i64 {
        self.thick_start.unwrap_or(self.interval.start())
    }

    /// End of the coding region; the interval end when unspecified.
    pub fn thick_end(&self) -> i64 {
        self.thick_end.unwrap_or(self.interval.end())
    }

    /// Display colour.
    pub fn item_rgb(&self) -> Option<ItemRgb> {
        self.item_rgb
    }

    /// Primary name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Secondary name (gene symbol, GFF3 `Alias`, ...).
    pub fn alternate_name(&self) -> Option<&str> {
        self.alternate_name.as_deref()
    }

    /// GFF/GTF feature type such as `mRNA`.
    pub fn feature_type(&self) -> Option<&str> {
        self.feature_type.as_deref()
    }
}

/// Tab-split view of a line with mapping-aware accessors.
pub(crate) struct Columns<'a> {
    line: &'a str,
    cols: Vec<&'a str>,
}

impl<'a> Columns<'a> {
    pub(crate) fn split(line: &'a str) -> Self {
        let line = line.trim_end_matches(['\n', '\r']);
        Self {
            line,
            cols: line.split('\t').collect(),
        }
    }

    pub(crate) fn required(&self, column: usize, field: &'static str) -> Result<&'a str, RecordError> {
        self.cols.get(column).copied().ok_or_else(|| RecordError::MissingColumn {
            column,
            field,
            line: self.line.to_string(),
        })
    }

    /// Absent, empty and `.` all read as `None`.
    pub(crate) fn optional(&self, column: Option<usize>) -> Option<&'a str> {
        let value = self.cols.get(column?)?.trim();
        if value.is_empty() || value == "." {
            None
        } else {
            Some(value)
        }
    }

    pub(crate) fn integer(&self, column: usize, field: &'static str) -> Result<i64, RecordError> {
        parse_integer(self.required(column, field)?, field)
    }

    pub(crate) fn optional_integer(
        &self,
        column: Option<usize>,
        field: &'static str,
    ) -> Result<Option<i64>, RecordError> {
        self.optional(column).map(|v| parse_integer(v, field)).transpose()
    }

    pub(crate) fn score(&self, column: Option<usize>) -> Result<f32, RecordError> {
        match self.optional(column) {
            None => Ok(f32::NAN),
            Some(v) => v.parse::<f32>().map_err(|_| RecordError::BadNumber {
                field: "score",
                value: v.to_string(),
            }),
        }
    }
}

fn parse_integer(value: &str, field: &'static str) -> Result<i64, RecordError> {
    value.trim().parse::<i64>().map_err(|_| RecordError::BadNumber {
        field,
        value: value.to_string(),
    })
}

/// Parse one line of a columnar track into a record.
///
/// GFF/GTF lines are parsed as standalone features; use
/// [`gff::HierarchyAssembler`] to fold children into their transcripts.
pub fn parse_line(line: &str, mapping: &ColumnMapping) -> Result<RichIntervalRecord, RecordError> {
    if mapping.format.is_hierarchical() {
        return gff::GffRecord::parse(line, mapping).map(gff::GffRecord::into_standalone);
    }

    let cols = Columns::split(line);
    let reference = cols.required(mapping.chrom, "chrom")?;
    let start = mapping.to_one_based(cols.integer(mapping.start, "start")?);
    let end = cols.integer(mapping.end, "end")?;
    let interval = Interval::new(start, end);

    let thick_start = cols
        .optional_integer(mapping.thick_start, "thickStart")?
        .map(|v| mapping.to_one_based(v));
    let thick_end = cols.optional_integer(mapping.thick_end, "thickEnd")?;

    let item_rgb = match cols.optional(mapping.item_rgb) {
        None | Some("0") => None,
        Some(v) => Some(v.parse::<ItemRgb>()?),
    };

    let blocks = read_blocks(&cols, mapping, start)?;

    Ok(RichIntervalRecord::new(reference, interval)
        .with_blocks(blocks)
        .with_score(cols.score(mapping.score)?)
        .with_strand(Strand::from_marker(cols.optional(mapping.strand)))
        .with_thick(thick_start, thick_end)
        .with_item_rgb(item_rgb)
        .with_names(
            cols.optional(mapping.name).map(str::to_string),
            cols.optional(mapping.alternate_name).map(str::to_string),
        ))
}

fn read_blocks(
    cols: &Columns<'_>,
    mapping: &ColumnMapping,
    start: i64,
) -> Result<Option<Vec<Block>>, RecordError> {
    let Some(starts) = cols.optional(mapping.block_starts) else {
        return Ok(None);
    };
    let starts = Block::extract_blocks(starts)?;

    if let Some(sizes) = cols.optional(mapping.block_sizes) {
        let sizes = Block::extract_blocks(sizes)?;
        return Ok(Some(Block::from_starts_and_sizes(&starts, &sizes)?));
    }
    if let Some(ends) = cols.optional(mapping.block_ends) {
        let ends = Block::extract_blocks(ends)?;
        // Absolute block starts share the file's convention; re-anchor them on
        // the 0-based feature start.
        let origin = start - 1;
        return Ok(Some(Block::from_starts_and_ends(origin, &starts, &ends)?));
    }
    Ok(None)
}

/// Render records as BED12 lines (0-based starts).
pub fn render_bed(records: &[RichIntervalRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let interval = record.interval();
        let score = if record.score().is_nan() {
            "0".to_string()
        } else {
            record.score().to_string()
        };
        let rgb = record
            .item_rgb()
            .map(|c| format!("{},{},{}", c.red, c.green, c.blue))
            .unwrap_or_else(|| "0".to_string());
        let whole = [Block::new(0, interval.length())];
        let blocks = record.blocks().filter(|b| !b.is_empty()).unwrap_or(&whole[..]);

        let mut sizes = String::new();
        let mut starts = String::new();
        for block in blocks {
            let _ = write!(sizes, "{},", block.size());
            let _ = write!(starts, "{},", block.position());
        }

        let _ = writeln!(
            out,
            "{chrom}\t{start}\t{end}\t{name}\t{score}\t{strand}\t{thick_start}\t{thick_end}\t{rgb}\t{count}\t{sizes}\t{starts}",
            chrom = record.reference(),
            start = interval.start() - 1,
            end = interval.end(),
            name = record.name().unwrap_or("."),
            strand = record.strand().as_char(),
            thick_start = record.thick_start() - 1,
            thick_end = record.thick_end(),
            count = blocks.len(),
        );
    }
    out
}
