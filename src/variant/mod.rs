//! Per-locus genotype records.
//!
//! [`VariantRecord`] is the read-only view the LD calculator works against.
//! [`VcfVariantRecord`] is the concrete VCF-backed record and
//! [`PaddedVariantRecord`] shifts a record's participants to the right so that
//! records from sources with fewer participants line up with the others.

mod padded;
mod vcf;

pub use padded::PaddedVariantRecord;
pub use vcf::VcfVariantRecord;

use std::fmt;

use thiserror::Error;

/// Errors raised while parsing variant lines.
#[derive(Debug, Error)]
pub enum VariantError {
    /// The line has fewer than the eight fixed VCF columns.
    #[error("expected at least 8 VCF columns, found {found}: {line}")]
    MissingColumns {
        /// Number of columns present.
        found: usize,
        /// Offending line.
        line: String,
    },

    /// POS was not an integer.
    #[error("invalid position {0:?}")]
    BadPosition(String),

    /// A GT value could not be read.
    #[error("invalid genotype {value:?} for participant {participant}")]
    BadGenotype {
        /// 0-based sample index.
        participant: usize,
        /// Raw GT text.
        value: String,
    },
}

/// Kind of change an allele makes relative to the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VariantType {
    /// Reference allele / no call.
    None,
    /// Single-base substitution to A.
    SnpA,
    /// Single-base substitution to C.
    SnpC,
    /// Single-base substitution to G.
    SnpG,
    /// Single-base substitution to T.
    SnpT,
    /// Bases removed.
    Deletion,
    /// Bases added.
    Insertion,
    /// Anything else (MNPs, unknown symbolic alleles, `*`).
    Other,
}

impl VariantType {
    /// Classify `alt` against `reference`.
    pub fn classify(reference: &str, alt: &str) -> Self {
        match alt {
            "" | "." => return VariantType::None,
            "<DEL>" => return VariantType::Deletion,
            "<INS>" => return VariantType::Insertion,
            _ if alt.starts_with('<') || alt == "*" => return VariantType::Other,
            _ => {}
        }

        match (reference.len(), alt.len()) {
            (1, 1) => match alt.as_bytes()[0].to_ascii_uppercase() {
                b'A' => VariantType::SnpA,
                b'C' => VariantType::SnpC,
                b'G' => VariantType::SnpG,
                b'T' => VariantType::SnpT,
                _ => VariantType::Other,
            },
            (r, a) if a < r => VariantType::Deletion,
            (r, a) if a > r => VariantType::Insertion,
            _ => VariantType::Other,
        }
    }

    /// Anything but [`VariantType::None`].
    pub fn is_variant(self) -> bool {
        self != VariantType::None
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VariantType::None => "NONE",
            VariantType::SnpA => "SNP_A",
            VariantType::SnpC => "SNP_C",
            VariantType::SnpG => "SNP_G",
            VariantType::SnpT => "SNP_T",
            VariantType::Deletion => "DELETION",
            VariantType::Insertion => "INSERTION",
            VariantType::Other => "OTHER",
        };
        write!(f, "{s}")
    }
}

/// Genotype data for one locus across a fixed set of participants.
///
/// Per-participant calls hold one entry (homozygous, or haploid) or two
/// entries (one per chromosome). Participant indices must be below
/// [`VariantRecord::participant_count`]; implementations may panic otherwise.
pub trait VariantRecord {
    /// Reference sequence name.
    fn reference_name(&self) -> &str;

    /// 1-based position of the first reference base.
    fn position(&self) -> i64;

    /// Identifier, if any.
    fn name(&self) -> Option<&str>;

    /// Type of the first alternate allele.
    fn variant_type(&self) -> VariantType;

    /// Reference bases.
    fn ref_bases(&self) -> &str;

    /// Alternate alleles; allele index `k > 0` refers to `alt_alleles()[k - 1]`.
    fn alt_alleles(&self) -> &[String];

    /// Number of participants with a call slot.
    fn participant_count(&self) -> usize;

    /// Called variant type(s) for a participant.
    fn variants_for_participant(&self, index: usize) -> Vec<VariantType>;

    /// Called allele indices for a participant; 0 is the reference.
    fn alleles_for_participant(&self, index: usize) -> Vec<usize>;

    /// Whether genotype phase is known.
    fn is_phased(&self) -> bool;
}

impl<T: VariantRecord + ?Sized> VariantRecord for &T {
    fn reference_name(&self) -> &str {
        (**self).reference_name()
    }
    fn position(&self) -> i64 {
        (**self).position()
    }
    fn name(&self) -> Option<&str> {
        (**self).name()
    }
    fn variant_type(&self) -> VariantType {
        (**self).variant_type()
    }
    fn ref_bases(&self) -> &str {
        (**self).ref_bases()
    }
    fn alt_alleles(&self) -> &[String] {
        (**self).alt_alleles()
    }
    fn participant_count(&self) -> usize {
        (**self).participant_count()
    }
    fn variants_for_participant(&self, index: usize) -> Vec<VariantType> {
        (**self).variants_for_participant(index)
    }
    fn alleles_for_participant(&self, index: usize) -> Vec<usize> {
        (**self).alleles_for_participant(index)
    }
    fn is_phased(&self) -> bool {
        (**self).is_phased()
    }
}

impl<T: VariantRecord + ?Sized> VariantRecord for Box<T> {
    fn reference_name(&self) -> &str {
        (**self).reference_name()
    }
    fn position(&self) -> i64 {
        (**self).position()
    }
    fn name(&self) -> Option<&str> {
        (**self).name()
    }
    fn variant_type(&self) -> VariantType {
        (**self).variant_type()
    }
    fn ref_bases(&self) -> &str {
        (**self).ref_bases()
    }
    fn alt_alleles(&self) -> &[String] {
        (**self).alt_alleles()
    }
    fn participant_count(&self) -> usize {
        (**self).participant_count()
    }
    fn variants_for_participant(&self, index: usize) -> Vec<VariantType> {
        (**self).variants_for_participant(index)
    }
    fn alleles_for_participant(&self, index: usize) -> Vec<usize> {
        (**self).alleles_for_participant(index)
    }
    fn is_phased(&self) -> bool {
        (**self).is_phased()
    }
}
