//! GFF/GTF features and the parent/child assembly that turns exon, CDS and
//! intron lines into blocked transcript records.
//!
//! Assembly is a two-phase build. Every line of a batch is first parsed into a
//! [`GffRecord`]; the [`HierarchyAssembler`] then lets each parent's
//! [`GffRecordBuilder`] absorb its children and only afterwards freezes the
//! surviving builders into immutable [`RichIntervalRecord`]s.

use std::collections::HashMap;

use tracing::debug;

use super::{ColumnMapping, Columns, RecordError, RichIntervalRecord, Strand};
use crate::interval::{Block, Interval};

/// Attribute syntax detected in the ninth column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeDialect {
    /// `key=value;key=value`.
    Gff3,
    /// `key "value"; key "value";`.
    Gtf,
    /// Anything else: the whole column is one implicit `Group` value.
    Group,
}

/// Parsed attributes column.
///
/// Lookups return the first matching key, in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GffAttributes {
    dialect: AttributeDialect,
    pairs: Vec<(String, String)>,
}

impl GffAttributes {
    /// Key used for the implicit attribute of plain GFF files.
    pub const GROUP: &'static str = "Group";

    /// Parse an attributes column.
    pub fn parse(raw: &str) -> Self {
        let segments: Vec<&str> = raw
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        // GTF first: quoted values may themselves contain `=`.
        let gtf: Option<Vec<(String, String)>> = segments.iter().map(|s| gtf_pair(s)).collect();
        if let Some(pairs) = gtf.filter(|_| segments.iter().any(|s| s.contains('"'))) {
            return Self {
                dialect: AttributeDialect::Gtf,
                pairs,
            };
        }

        let gff3: Vec<(String, String)> = segments.iter().filter_map(|s| gff3_pair(s)).collect();
        if !gff3.is_empty() {
            return Self {
                dialect: AttributeDialect::Gff3,
                pairs: gff3,
            };
        }

        let group = raw.trim();
        let pairs = if group.is_empty() {
            Vec::new()
        } else {
            vec![(Self::GROUP.to_string(), group.to_string())]
        };
        Self {
            dialect: AttributeDialect::Group,
            pairs,
        }
    }

    /// Detected syntax.
    pub fn dialect(&self) -> AttributeDialect {
        self.dialect
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// GFF3 `ID`.
    pub fn id(&self) -> Option<&str> {
        self.get("ID")
    }

    /// GFF3 `Parent`, as written (may list several IDs).
    pub fn parent(&self) -> Option<&str> {
        self.get("Parent")
    }

    /// Individual IDs listed in `Parent`.
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        self.parent()
            .into_iter()
            .flat_map(|p| p.split(','))
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// GFF3 `Name`.
    pub fn name(&self) -> Option<&str> {
        self.get("Name")
    }

    /// GFF3 `Alias`.
    pub fn alias(&self) -> Option<&str> {
        self.get("Alias")
    }

    /// Implicit group of plain GFF.
    pub fn group(&self) -> Option<&str> {
        self.get(Self::GROUP)
    }

    /// GTF `transcript_id`.
    pub fn transcript_id(&self) -> Option<&str> {
        self.get("transcript_id")
    }

    /// GTF `gene_id`.
    pub fn gene_id(&self) -> Option<&str> {
        self.get("gene_id")
    }

    /// GTF `gene_name`.
    pub fn gene_name(&self) -> Option<&str> {
        self.get("gene_name")
    }
}

/// `key "value"` or `key value`; quotes are stripped.
fn gtf_pair(segment: &str) -> Option<(String, String)> {
    let (key, value) = segment.split_once(char::is_whitespace)?;
    let value = value.trim().trim_matches('"');
    if key.is_empty() || key.contains(['=', '"']) || value.is_empty() {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}

/// `key=value`, where the key holds no whitespace or quote.
fn gff3_pair(segment: &str) -> Option<(String, String)> {
    let (key, value) = segment.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || key.contains(|c: char| c.is_whitespace() || c == '"') {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}

fn is_type(feature_type: &str, expected: &str) -> bool {
    feature_type.eq_ignore_ascii_case(expected)
}

/// One GFF/GTF line before hierarchy assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct GffRecord {
    reference: String,
    interval: Interval,
    score: f32,
    strand: Strand,
    feature_type: String,
    attributes: GffAttributes,
}

impl GffRecord {
    /// Build a record directly.
    pub fn new(
        reference: impl Into<String>,
        interval: Interval,
        feature_type: impl Into<String>,
        attributes: &str,
    ) -> Self {
        Self {
            reference: reference.into(),
            interval,
            score: f32::NAN,
            strand: Strand::Forward,
            feature_type: feature_type.into(),
            attributes: GffAttributes::parse(attributes),
        }
    }

    /// Set the strand.
    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = strand;
        self
    }

    /// Set the score.
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Parse a GFF/GTF line using the mapping's columns.
    pub fn parse(line: &str, mapping: &ColumnMapping) -> Result<Self, RecordError> {
        let cols = Columns::split(line);
        let reference = cols.required(mapping.chrom, "seqid")?;
        let start = mapping.to_one_based(cols.integer(mapping.start, "start")?);
        let end = cols.integer(mapping.end, "end")?;
        let feature_type = cols.optional(mapping.feature).unwrap_or_default();
        let attributes = mapping
            .attributes
            .and_then(|c| cols.required(c, "attributes").ok())
            .unwrap_or_default();

        Ok(Self::new(reference, Interval::new(start, end), feature_type, attributes)
            .with_score(cols.score(mapping.score)?)
            .with_strand(Strand::from_marker(cols.optional(mapping.strand))))
    }

    /// Reference sequence name.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Feature extent.
    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Score, NaN when absent.
    pub fn score(&self) -> f32 {
        self.score
    }

    /// Orientation.
    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// Column 3, e.g. `exon`.
    pub fn feature_type(&self) -> &str {
        &self.feature_type
    }

    /// Parsed column 9.
    pub fn attributes(&self) -> &GffAttributes {
        &self.attributes
    }

    /// `transcript` or `mRNA`; the only types that collect exon blocks.
    pub fn is_transcript(&self) -> bool {
        is_type(&self.feature_type, "transcript") || is_type(&self.feature_type, "mRNA")
    }

    /// Whether `child` names this record as its parent.
    ///
    /// Parent and child must sit on the same reference. GFF3 parents need
    /// both `ID` and `Name`; nameless records are treated as plain GFF and
    /// never match through `Parent=`. GTF and plain-GFF children attach to a
    /// transcript sharing their `transcript_id` or implicit group.
    pub fn is_parent_of(&self, child: &GffRecord) -> bool {
        if std::ptr::eq(self, child)
            || self.reference != child.reference
            || self.attributes.dialect != child.attributes.dialect
        {
            return false;
        }
        match self.attributes.dialect {
            AttributeDialect::Gff3 => match (self.attributes.name(), self.attributes.id()) {
                (Some(_), Some(id)) => child.attributes.parents().any(|p| p == id),
                _ => false,
            },
            AttributeDialect::Gtf => {
                self.is_transcript()
                    && self.attributes.transcript_id().is_some()
                    && self.attributes.transcript_id() == child.attributes.transcript_id()
            }
            AttributeDialect::Group => {
                self.is_transcript()
                    && self.attributes.group().is_some()
                    && self.attributes.group() == child.attributes.group()
            }
        }
    }

    /// Range to refetch so that every child of this transcript is seen.
    ///
    /// Returns `None` for non-transcripts and for transcripts already inside
    /// `query`.
    pub fn expanded_range(&self, query: Interval) -> Option<Interval> {
        if !self.is_transcript() || query.contains(&self.interval) {
            return None;
        }
        Some(Interval::new(
            self.interval.start().min(query.start()),
            self.interval.end().max(query.end()),
        ))
    }

    /// Freeze without absorbing anything.
    pub fn into_standalone(self) -> RichIntervalRecord {
        GffRecordBuilder::new(self).build()
    }

    fn display_names(&self) -> (Option<String>, Option<String>) {
        let attrs = &self.attributes;
        let (name, alternate) = match attrs.dialect {
            AttributeDialect::Gff3 => (attrs.name().or(attrs.id()), attrs.alias()),
            AttributeDialect::Gtf => (
                attrs.transcript_id().or(attrs.gene_id()),
                attrs.gene_name().or(attrs.gene_id()),
            ),
            AttributeDialect::Group => (attrs.group(), None),
        };
        (name.map(str::to_string), alternate.map(str::to_string))
    }
}

/// Widest range any transcript in `records` needs, or `None` when the query
/// already covers all of them.
pub fn expanded_range(records: &[GffRecord], query: Interval) -> Option<Interval> {
    records.iter().fold(None, |acc, record| {
        record.expanded_range(acc.unwrap_or(query)).or(acc)
    })
}

/// Mutable accumulation state for one parent feature.
///
/// This is the only place a record's blocks and coding region change after
/// parsing; consumers only ever see the result of [`GffRecordBuilder::build`].
#[derive(Debug, Clone)]
pub struct GffRecordBuilder {
    record: GffRecord,
    blocks: Vec<Block>,
    thick_start: Option<i64>,
    thick_end: Option<i64>,
}

impl GffRecordBuilder {
    /// Start accumulating on top of a parsed parent.
    pub fn new(record: GffRecord) -> Self {
        Self {
            record,
            blocks: Vec::new(),
            thick_start: None,
            thick_end: None,
        }
    }

    /// The underlying parsed record.
    pub fn record(&self) -> &GffRecord {
        &self.record
    }

    /// Blocks absorbed so far.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Coding region absorbed so far.
    pub fn thick_region(&self) -> (Option<i64>, Option<i64>) {
        (self.thick_start, self.thick_end)
    }

    /// Fold `child` into this feature. Returns whether it was absorbed.
    ///
    /// Exons add a block (transcripts and mRNAs only). CDS lines widen the
    /// coding region: the first CDS fixes `thick_start`, `thick_end` tracks
    /// the largest end seen. Introns are swallowed without effect. Any other
    /// type, or a child of some other parent, is left alone.
    pub fn absorb_record(&mut self, child: &GffRecord) -> bool {
        if !self.record.is_parent_of(child) {
            return false;
        }

        let kind = child.feature_type();
        if is_type(kind, "exon") {
            if !self.record.is_transcript() {
                return false;
            }
            let position = child.interval().start() - self.record.interval().start();
            self.blocks.push(Block::new(position, child.interval().length()));
            true
        } else if is_type(kind, "CDS") {
            if self.thick_start.is_none() {
                self.thick_start = Some(child.interval().start());
            }
            let end = child.interval().end();
            self.thick_end = Some(self.thick_end.map_or(end, |current| current.max(end)));
            true
        } else {
            is_type(kind, "intron")
        }
    }

    /// Freeze into an immutable record.
    pub fn build(self) -> RichIntervalRecord {
        let (name, alternate_name) = self.record.display_names();
        let blocks = (!self.blocks.is_empty()).then_some(self.blocks);
        let GffRecord {
            reference,
            interval,
            score,
            strand,
            feature_type,
            ..
        } = self.record;

        RichIntervalRecord::new(reference, interval)
            .with_blocks(blocks)
            .with_score(score)
            .with_strand(strand)
            .with_thick(self.thick_start, self.thick_end)
            .with_names(name, alternate_name)
            .with_feature_type(Some(feature_type))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyKind {
    Id(String),
    Transcript(String),
    Group(String),
}

/// Parent lookup key, scoped to one reference sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ParentKey {
    reference: String,
    kind: KeyKind,
}

impl ParentKey {
    fn new(record: &GffRecord, kind: KeyKind) -> Self {
        Self {
            reference: record.reference().to_string(),
            kind,
        }
    }

    /// Key under which `record` can be found as a parent.
    fn as_parent(record: &GffRecord) -> Option<ParentKey> {
        let attrs = record.attributes();
        let kind = match attrs.dialect() {
            AttributeDialect::Gff3 => {
                attrs.name()?;
                KeyKind::Id(attrs.id()?.to_string())
            }
            AttributeDialect::Gtf if record.is_transcript() => {
                KeyKind::Transcript(attrs.transcript_id()?.to_string())
            }
            AttributeDialect::Group if record.is_transcript() => {
                KeyKind::Group(attrs.group()?.to_string())
            }
            _ => return None,
        };
        Some(Self::new(record, kind))
    }

    /// Keys under which `record` looks for its parents.
    fn as_child(record: &GffRecord) -> Vec<ParentKey> {
        let attrs = record.attributes();
        let kinds: Vec<KeyKind> = match attrs.dialect() {
            AttributeDialect::Gff3 => attrs.parents().map(|p| KeyKind::Id(p.to_string())).collect(),
            AttributeDialect::Gtf => attrs
                .transcript_id()
                .map(|t| KeyKind::Transcript(t.to_string()))
                .into_iter()
                .collect(),
            AttributeDialect::Group => attrs
                .group()
                .map(|g| KeyKind::Group(g.to_string()))
                .into_iter()
                .collect(),
        };
        kinds.into_iter().map(|kind| Self::new(record, kind)).collect()
    }
}

/// Collects a batch of GFF/GTF records and assembles transcripts from them.
///
/// Nothing is emitted until [`HierarchyAssembler::finish`] has absorbed every
/// child in the batch.
#[derive(Debug, Default)]
pub struct HierarchyAssembler {
    records: Vec<GffRecord>,
}

impl HierarchyAssembler {
    /// Empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parsed record to the batch.
    pub fn push(&mut self, record: GffRecord) {
        self.records.push(record);
    }

    /// Records collected so far.
    pub fn records(&self) -> &[GffRecord] {
        &self.records
    }

    /// Number of records collected.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// See [`expanded_range`].
    pub fn expanded_range(&self, query: Interval) -> Option<Interval> {
        expanded_range(&self.records, query)
    }

    /// Absorb children into parents and freeze the remaining records.
    ///
    /// Children are absorbed in input order, into every matching parent (a
    /// GFF3 exon may list several). Records that no parent absorbs, including
    /// orphans, are emitted on their own. Output keeps input order.
    pub fn finish(self) -> Vec<RichIntervalRecord> {
        let total = self.records.len();
        let mut parents: HashMap<ParentKey, Vec<usize>> = HashMap::new();
        for (idx, record) in self.records.iter().enumerate() {
            if let Some(key) = ParentKey::as_parent(record) {
                parents.entry(key).or_default().push(idx);
            }
        }

        let mut builders: Vec<GffRecordBuilder> =
            self.records.into_iter().map(GffRecordBuilder::new).collect();
        let mut absorbed = vec![false; total];

        for child_idx in 0..total {
            let candidates: Vec<usize> = ParentKey::as_child(builders[child_idx].record())
                .iter()
                .filter_map(|key| parents.get(key))
                .flatten()
                .copied()
                .filter(|&p| p != child_idx)
                .collect();
            if candidates.is_empty() {
                continue;
            }

            let child = builders[child_idx].record().clone();
            for parent_idx in candidates {
                if builders[parent_idx].absorb_record(&child) {
                    absorbed[child_idx] = true;
                }
            }
        }

        let output: Vec<RichIntervalRecord> = builders
            .into_iter()
            .zip(absorbed)
            .filter(|(_, was_absorbed)| !was_absorbed)
            .map(|(builder, _)| builder.build())
            .collect();

        debug!(
            records = total,
            absorbed = total - output.len(),
            emitted = output.len(),
            "assembled feature hierarchy"
        );
        output
    }
}
