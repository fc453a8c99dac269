//! # savant
//!
//! Genomic track records and pairwise linkage disequilibrium.
//!
//! ## Layout
//!
//! 1. [`interval`]: 1-based closed intervals, regions and packed block lists
//! 2. [`record`]: rich interval records from BED, genePred, GFF and GTF lines,
//!    including the two-phase GFF hierarchy build
//! 3. [`variant`]: per-locus genotype records behind the [`VariantRecord`] trait
//! 4. [`ld`]: D′ and r² over every pair of loci, with progress and cancellation
//! 5. [`io`]: region queries against tabix-indexed files
//!
//! ## Usage Example
//!
//! ```
//! use savant::{CancellationToken, LdCalculator, LdConfig, NoProgress, VcfVariantRecord};
//!
//! let records = vec![
//!     VcfVariantRecord::parse("chr1\t10\t.\tA\tG\t.\t.\t.\tGT\t1|1\t0|0").unwrap(),
//!     VcfVariantRecord::parse("chr1\t20\t.\tC\tT\t.\t.\t.\tGT\t1|1\t0|0").unwrap(),
//! ];
//! let calc = LdCalculator::new(LdConfig::detect(&records));
//! let ld = calc.calculate(&records, &NoProgress, &CancellationToken::new()).unwrap();
//! assert!((ld.r_squared.get(0, 1) - 1.0).abs() < 1e-6);
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

pub mod interval; // Coordinates, regions, blocks
pub mod io; // Tabix-backed data source
pub mod ld; // Linkage disequilibrium
pub mod record; // Interval records and GFF assembly
pub mod variant; // Genotype records

// Re-exports for convenience
pub use interval::{Block, Interval, Region};
pub use io::{LineSource, TabixSource};
pub use ld::{
    CancellationToken, ChannelProgress, LdCalculator, LdConfig, LdError, LdMatrices, LdMatrix,
    LdTask, NoProgress, ProgressSink,
};
pub use record::gff::{GffRecord, GffRecordBuilder, HierarchyAssembler};
pub use record::{parse_line, render_bed, ColumnMapping, RichIntervalRecord, Strand, TrackFormat};
pub use variant::{PaddedVariantRecord, VariantRecord, VariantType, VcfVariantRecord};
