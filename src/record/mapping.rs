use std::fmt;
use std::str::FromStr;

/// Layout family of a columnar track file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackFormat {
    /// Bare chrom/start/end with optional extras.
    Interval,
    /// UCSC BED (up to BED12).
    Bed,
    /// UCSC genePred/refGene tables with packed exon lists.
    GenePred,
    /// GFF3 or plain GFF.
    Gff,
    /// GTF (GFF2 with `key "value"` attributes).
    Gtf,
}

impl TrackFormat {
    /// Whether records of this format go through hierarchy assembly.
    pub fn is_hierarchical(self) -> bool {
        matches!(self, TrackFormat::Gff | TrackFormat::Gtf)
    }
}

impl fmt::Display for TrackFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrackFormat::Interval => "interval",
            TrackFormat::Bed => "bed",
            TrackFormat::GenePred => "genepred",
            TrackFormat::Gff => "gff",
            TrackFormat::Gtf => "gtf",
        };
        write!(f, "{s}")
    }
}

impl FromStr for TrackFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "interval" => Ok(TrackFormat::Interval),
            "bed" => Ok(TrackFormat::Bed),
            "genepred" | "refgene" | "knowngene" => Ok(TrackFormat::GenePred),
            "gff" | "gff3" => Ok(TrackFormat::Gff),
            "gtf" => Ok(TrackFormat::Gtf),
            other => Err(format!("unknown track format '{other}'")),
        }
    }
}

/// Which column carries which field, and how coordinates are numbered.
///
/// Column indices are 0-based. `None` means the field is absent from the file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnMapping {
    /// Layout family.
    pub format: TrackFormat,
    /// Whether the start column is already 1-based.
    pub one_based: bool,
    /// Reference name column.
    pub chrom: usize,
    /// Start column.
    pub start: usize,
    /// End column.
    pub end: usize,
    /// Feature name column.
    pub name: Option<usize>,
    /// Score column.
    pub score: Option<usize>,
    /// Strand column.
    pub strand: Option<usize>,
    /// Coding start column.
    pub thick_start: Option<usize>,
    /// Coding end column.
    pub thick_end: Option<usize>,
    /// `r,g,b` colour column.
    pub item_rgb: Option<usize>,
    /// Packed block starts (relative for BED, absolute for genePred).
    pub block_starts: Option<usize>,
    /// Packed block sizes (BED).
    pub block_sizes: Option<usize>,
    /// Packed absolute block ends (genePred).
    pub block_ends: Option<usize>,
    /// Secondary name column (e.g. gene symbol).
    pub alternate_name: Option<usize>,
    /// Feature type column (GFF/GTF).
    pub feature: Option<usize>,
    /// Attributes column (GFF/GTF).
    pub attributes: Option<usize>,
}

impl ColumnMapping {
    /// chrom, start, end (0-based start), nothing else.
    pub fn interval() -> Self {
        Self {
            format: TrackFormat::Interval,
            one_based: false,
            chrom: 0,
            start: 1,
            end: 2,
            name: None,
            score: None,
            strand: None,
            thick_start: None,
            thick_end: None,
            item_rgb: None,
            block_starts: None,
            block_sizes: None,
            block_ends: None,
            alternate_name: None,
            feature: None,
            attributes: None,
        }
    }

    /// UCSC BED, all twelve columns mapped; shorter lines leave the extras absent.
    pub fn bed() -> Self {
        Self {
            format: TrackFormat::Bed,
            name: Some(3),
            score: Some(4),
            strand: Some(5),
            thick_start: Some(6),
            thick_end: Some(7),
            item_rgb: Some(8),
            block_sizes: Some(10),
            block_starts: Some(11),
            ..Self::interval()
        }
    }

    /// UCSC refGene-style genePred with a leading `bin` column.
    pub fn gene_pred() -> Self {
        Self {
            format: TrackFormat::GenePred,
            one_based: false,
            name: Some(1),
            chrom: 2,
            strand: Some(3),
            start: 4,
            end: 5,
            thick_start: Some(6),
            thick_end: Some(7),
            block_starts: Some(9),
            block_ends: Some(10),
            score: Some(11),
            alternate_name: Some(12),
            ..Self::interval()
        }
    }

    /// GFF3 / plain GFF.
    pub fn gff() -> Self {
        Self {
            format: TrackFormat::Gff,
            one_based: true,
            chrom: 0,
            feature: Some(2),
            start: 3,
            end: 4,
            score: Some(5),
            strand: Some(6),
            attributes: Some(8),
            ..Self::interval()
        }
    }

    /// GTF; same columns as GFF.
    pub fn gtf() -> Self {
        Self {
            format: TrackFormat::Gtf,
            ..Self::gff()
        }
    }

    /// Preset for a format.
    pub fn for_format(format: TrackFormat) -> Self {
        match format {
            TrackFormat::Interval => Self::interval(),
            TrackFormat::Bed => Self::bed(),
            TrackFormat::GenePred => Self::gene_pred(),
            TrackFormat::Gff => Self::gff(),
            TrackFormat::Gtf => Self::gtf(),
        }
    }

    /// Override the coordinate convention.
    pub fn with_one_based(mut self, one_based: bool) -> Self {
        self.one_based = one_based;
        self
    }

    /// Override the name column.
    pub fn with_name(mut self, column: Option<usize>) -> Self {
        self.name = column;
        self
    }

    /// Override the score column.
    pub fn with_score(mut self, column: Option<usize>) -> Self {
        self.score = column;
        self
    }

    /// Override the strand column.
    pub fn with_strand(mut self, column: Option<usize>) -> Self {
        self.strand = column;
        self
    }

    /// Convert a start coordinate read from the file to 1-based.
    pub(crate) fn to_one_based(&self, start: i64) -> i64 {
        if self.one_based {
            start
        } else {
            start + 1
        }
    }
}
