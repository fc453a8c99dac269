//! Region queries against bgzip-compressed, tabix-indexed text files.
//!
//! [`LineSource`] is the seam between raw line retrieval and record
//! building: [`interval_records`] runs the fetch, expand, refetch protocol
//! over any source, and [`TabixSource`] is the htslib-backed source.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_htslib::tbx::{self, Read as _};
use tracing::{debug, warn};

use crate::interval::Region;
use crate::record::gff::{GffRecord, HierarchyAssembler};
use crate::record::{parse_line, ColumnMapping, RichIntervalRecord};
use crate::variant::{VariantRecord, VcfVariantRecord};

/// Anything that can hand back the raw data lines overlapping a region.
pub trait LineSource {
    /// Data lines overlapping `region`, in file order. Header lines are not
    /// returned; an unknown reference yields no lines.
    fn fetch_lines(&mut self, region: &Region) -> Result<Vec<String>>;
}

/// Pick the name `reference` is stored under in `known`, trying it as given
/// and then with the `chr` prefix added or removed.
pub fn resolve_reference<'a>(known: &'a [String], reference: &str) -> Option<&'a str> {
    let alternate = match reference.strip_prefix("chr") {
        Some(bare) => bare.to_string(),
        None => format!("chr{reference}"),
    };
    let resolved = [reference, alternate.as_str()]
        .into_iter()
        .find_map(|name| known.iter().find(|k| k.as_str() == name))
        .map(String::as_str);
    resolved
}

/// Records sharing at least one base with `region`.
///
/// For GFF/GTF the query is widened to cover any transcript that spills
/// over its edges and fetched again, so that every child of those
/// transcripts is present before assembly. Malformed lines are skipped.
pub fn interval_records<S: LineSource + ?Sized>(
    source: &mut S,
    mapping: &ColumnMapping,
    region: &Region,
) -> Result<Vec<RichIntervalRecord>> {
    let records = if mapping.format.is_hierarchical() {
        let mut assembler = gff_records(source, mapping, region)?;
        if let Some(expanded) = assembler.expanded_range(region.interval) {
            debug!(query = %region, expanded = %expanded, "refetching widened range");
            assembler = gff_records(source, mapping, &region.with_interval(expanded))?;
        }
        assembler.finish()
    } else {
        source
            .fetch_lines(region)?
            .iter()
            .filter_map(|line| match parse_line(line, mapping) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(%err, "skipping malformed line");
                    None
                }
            })
            .collect()
    };

    Ok(records
        .into_iter()
        .filter(|record| record.interval().shares_base(&region.interval))
        .collect())
}

fn gff_records<S: LineSource + ?Sized>(
    source: &mut S,
    mapping: &ColumnMapping,
    region: &Region,
) -> Result<HierarchyAssembler> {
    let mut assembler = HierarchyAssembler::new();
    for line in source.fetch_lines(region)? {
        match GffRecord::parse(&line, mapping) {
            Ok(record) => assembler.push(record),
            Err(err) => warn!(%err, "skipping malformed line"),
        }
    }
    Ok(assembler)
}

/// VCF records whose position lies in `region`. Malformed lines are skipped.
pub fn variant_records<S: LineSource + ?Sized>(
    source: &mut S,
    region: &Region,
) -> Result<Vec<VcfVariantRecord>> {
    Ok(source
        .fetch_lines(region)?
        .iter()
        .filter_map(|line| match VcfVariantRecord::parse(line) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(%err, "skipping malformed variant line");
                None
            }
        })
        .filter(|record| {
            let position = record.position();
            region.interval.start() <= position && position <= region.interval.end()
        })
        .collect())
}

/// A tabix-indexed track opened for region queries.
pub struct TabixSource {
    path: PathBuf,
    reader: tbx::Reader,
    mapping: ColumnMapping,
}

impl fmt::Debug for TabixSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabixSource")
            .field("path", &self.path)
            .field("mapping", &self.mapping)
            .finish_non_exhaustive()
    }
}

impl TabixSource {
    /// Open `path` (its `.tbi` must sit alongside) with the given column layout.
    pub fn open<P: AsRef<Path>>(path: P, mapping: ColumnMapping) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let reader = tbx::Reader::from_path(&path)
            .with_context(|| format!("failed to open tabix file {}", path.display()))?;
        Ok(Self {
            path,
            reader,
            mapping,
        })
    }

    /// Column layout used by [`TabixSource::interval_records`]. Variant
    /// queries parse VCF columns directly and ignore it.
    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    /// Reference names present in the index.
    pub fn references(&self) -> Vec<String> {
        self.reader.seqnames()
    }

    /// See [`interval_records`].
    pub fn interval_records(&mut self, region: &Region) -> Result<Vec<RichIntervalRecord>> {
        let mapping = self.mapping.clone();
        interval_records(self, &mapping, region)
    }

    /// See [`variant_records`].
    pub fn variant_records(&mut self, region: &Region) -> Result<Vec<VcfVariantRecord>> {
        variant_records(self, region)
    }
}

impl LineSource for TabixSource {
    fn fetch_lines(&mut self, region: &Region) -> Result<Vec<String>> {
        let known = self.reader.seqnames();
        let Some(tid) = resolve_reference(&known, &region.reference)
            .and_then(|name| self.reader.tid(name).ok())
        else {
            debug!(reference = %region.reference, "reference not in index");
            return Ok(Vec::new());
        };
        let begin = (region.interval.start() - 1).max(0) as u64;
        let end = region.interval.end().max(0) as u64;
        self.reader
            .fetch(tid, begin, end)
            .with_context(|| format!("failed to fetch {region} from {}", self.path.display()))?;

        let mut lines = Vec::new();
        for raw in self.reader.records() {
            let raw = raw.with_context(|| format!("failed to read {}", self.path.display()))?;
            let line = String::from_utf8_lossy(&raw).into_owned();
            if !line.starts_with('#') {
                lines.push(line);
            }
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::{Block, Interval};

    /// In-memory GFF-layout source that records every query it serves.
    struct MemorySource {
        references: Vec<String>,
        lines: Vec<&'static str>,
        queries: Vec<Region>,
    }

    impl MemorySource {
        fn new(lines: Vec<&'static str>) -> Self {
            let mut references: Vec<String> = lines
                .iter()
                .filter_map(|line| line.split('\t').next())
                .map(str::to_string)
                .collect();
            references.dedup();
            Self {
                references,
                lines,
                queries: Vec::new(),
            }
        }
    }

    impl LineSource for MemorySource {
        fn fetch_lines(&mut self, region: &Region) -> Result<Vec<String>> {
            self.queries.push(region.clone());
            let Some(reference) = resolve_reference(&self.references, &region.reference) else {
                return Ok(Vec::new());
            };
            Ok(self
                .lines
                .iter()
                .filter(|line| {
                    let cols: Vec<&str> = line.split('\t').collect();
                    let start: i64 = cols[3].parse().unwrap();
                    let end: i64 = cols[4].parse().unwrap();
                    cols[0] == reference
                        && start <= region.interval.end()
                        && region.interval.start() <= end
                })
                .map(|line| line.to_string())
                .collect())
        }
    }

    fn transcripts() -> MemorySource {
        MemorySource::new(vec![
            "chr1\tt\tgene\t1000\t5000\t.\t+\t.\tID=gene1;Name=GENE1",
            "chr1\tt\tmRNA\t1000\t5000\t.\t+\t.\tID=tx1;Name=TX1;Parent=gene1",
            "chr1\tt\texon\t1000\t1200\t.\t+\t.\tID=ex1;Parent=tx1",
            "chr1\tt\tCDS\t1100\t1200\t.\t+\t0\tID=cds1;Parent=tx1",
            "chr1\tt\texon\t3000\t3200\t.\t+\t.\tID=ex2;Parent=tx1",
            "chr1\tt\tCDS\t3000\t3100\t.\t+\t0\tID=cds2;Parent=tx1",
            "chr1\tt\texon\t4800\t5000\t.\t+\t.\tID=ex3;Parent=tx1",
            "chr1\tt\tmRNA\t8000\t9000\t.\t-\t.\tID=tx2;Name=TX2",
            "chr1\tt\texon\t8000\t9000\t.\t-\t.\tID=ex4;Parent=tx2",
        ])
    }

    #[test]
    fn reference_names_fall_back_across_chr_prefix() {
        let known = vec!["chr1".to_string(), "2".to_string()];
        assert_eq!(resolve_reference(&known, "chr1"), Some("chr1"));
        assert_eq!(resolve_reference(&known, "1"), Some("chr1"));
        assert_eq!(resolve_reference(&known, "chr2"), Some("2"));
        assert_eq!(resolve_reference(&known, "chr3"), None);
    }

    #[test]
    fn window_inside_one_exon_returns_the_whole_transcript() {
        let mut source = transcripts();
        let region: Region = "1:3050-3060".parse().unwrap();
        let records = interval_records(&mut source, &ColumnMapping::gff(), &region).unwrap();

        assert_eq!(
            source.queries,
            vec![region.clone(), region.with_interval(Interval::new(1000, 5000))]
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name(), Some("GENE1"));
        assert_eq!(records[0].blocks(), None);
        assert_eq!(records[1].name(), Some("TX1"));
        assert_eq!(
            records[1].blocks(),
            Some(&[Block::new(0, 201), Block::new(2000, 201), Block::new(3800, 201)][..])
        );
        assert_eq!((records[1].thick_start(), records[1].thick_end()), (1100, 3100));
    }

    #[test]
    fn contained_transcripts_are_fetched_once() {
        let mut source = transcripts();
        let region: Region = "chr1:7000-9500".parse().unwrap();
        let records = interval_records(&mut source, &ColumnMapping::gff(), &region).unwrap();
        assert_eq!(source.queries.len(), 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), Some("TX2"));
    }

    #[test]
    fn records_outside_the_query_are_dropped_after_assembly() {
        let mut source = MemorySource::new(vec![
            "chr1\tt\tmRNA\t100\t900\t.\t+\t.\tID=a;Name=A",
            "chr1\tt\texon\t100\t200\t.\t+\t.\tID=e1;Parent=a",
            "chr1\tt\tgene\t150\t250\t.\t+\t.\tID=far",
        ]);
        let region: Region = "chr1:800-850".parse().unwrap();
        let records = interval_records(&mut source, &ColumnMapping::gff(), &region).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), Some("A"));
    }

    #[test]
    fn unknown_reference_yields_nothing() {
        let mut source = transcripts();
        let region: Region = "chrUn:1-100".parse().unwrap();
        assert!(interval_records(&mut source, &ColumnMapping::gff(), &region)
            .unwrap()
            .is_empty());
    }
}
