//! Pairwise linkage disequilibrium (D′ and r²) over a list of loci.
//!
//! Every unordered pair `i < j` is visited once, so the cost is
//! `O(N² · P)` for `N` loci and `P` participants. Per-locus quantities are
//! computed before the pair loop; the inner loop only accumulates the joint
//! terms. Results land in the upper triangle of two `N × N` matrices.

mod progress;
mod task;

pub use progress::{CancellationToken, ChannelProgress, NoProgress, ProgressSink};
pub use task::LdTask;

use std::io::{self, Write};

use thiserror::Error;
use tracing::{debug, info};

use crate::variant::VariantRecord;

/// Errors that stop an LD computation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LdError {
    /// The cancellation token was set; partial results were dropped.
    #[error("linkage disequilibrium calculation cancelled")]
    Cancelled,

    /// Loci were supplied but the participant count is zero.
    #[error("no participants to compute linkage disequilibrium over")]
    NoParticipants,

    /// A record has fewer participants than configured.
    #[error("locus {locus} has {found} participants, expected {expected}")]
    ParticipantMismatch {
        /// Index of the offending record.
        locus: usize,
        /// Configured participant count.
        expected: usize,
        /// Participants the record reports.
        found: usize,
    },

    /// The background worker panicked.
    #[error("linkage disequilibrium worker panicked")]
    WorkerPanicked,
}

/// Parameters of an LD run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LdConfig {
    /// Participants to read from every record.
    pub participant_count: usize,
    /// Use haplotype-level D′/r² (phased) or dosage r² (unphased).
    pub phased: bool,
}

impl LdConfig {
    /// Configuration for `participant_count` phased participants.
    pub fn new(participant_count: usize) -> Self {
        Self {
            participant_count,
            phased: true,
        }
    }

    /// Derive settings from the records: the largest participant count, and
    /// phased only if every record is phased.
    pub fn detect<R: VariantRecord>(records: &[R]) -> Self {
        let participant_count = records
            .iter()
            .map(VariantRecord::participant_count)
            .max()
            .unwrap_or(0);
        let phased = !records.is_empty() && records.iter().all(VariantRecord::is_phased);
        Self {
            participant_count,
            phased,
        }
    }

    /// Select the algorithm.
    pub fn with_phased(mut self, phased: bool) -> Self {
        self.phased = phased;
        self
    }
}

/// Square matrix of `f32`, zero-initialised.
#[derive(Debug, Clone, PartialEq)]
pub struct LdMatrix {
    size: usize,
    values: Vec<f32>,
}

impl LdMatrix {
    fn zeroed(size: usize) -> Self {
        Self {
            size,
            values: vec![0.0; size * size],
        }
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Value at row `i`, column `j`.
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.values[i * self.size + j]
    }

    fn set(&mut self, i: usize, j: usize, value: f32) {
        self.values[i * self.size + j] = value;
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[f32] {
        &self.values[i * self.size..(i + 1) * self.size]
    }
}

/// D′ and r² for every pair `i < j`.
///
/// The diagonal and lower triangle are left at 0.0. In unphased mode D′ is
/// not computed and its matrix stays all zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct LdMatrices {
    /// Normalised disequilibrium.
    pub d_prime: LdMatrix,
    /// Squared correlation.
    pub r_squared: LdMatrix,
    /// Whether the phased algorithm produced these values.
    pub phased: bool,
}

impl LdMatrices {
    fn zeroed(size: usize, phased: bool) -> Self {
        Self {
            d_prime: LdMatrix::zeroed(size),
            r_squared: LdMatrix::zeroed(size),
            phased,
        }
    }

    /// Number of loci.
    pub fn size(&self) -> usize {
        self.r_squared.size()
    }

    /// Tab-separated dump with one labelled section per computed matrix.
    pub fn write_tsv<W: Write>(&self, writer: &mut W, labels: &[String]) -> io::Result<()> {
        if self.phased {
            write_section(writer, "D'", &self.d_prime, labels)?;
        }
        write_section(writer, "r2", &self.r_squared, labels)?;
        writer.flush()
    }
}

fn write_section<W: Write>(
    writer: &mut W,
    title: &str,
    matrix: &LdMatrix,
    labels: &[String],
) -> io::Result<()> {
    writeln!(writer, "## {title}")?;
    writeln!(writer, "\t{}", labels.join("\t"))?;
    for i in 0..matrix.size() {
        let label = labels.get(i).map(String::as_str).unwrap_or(".");
        let row: Vec<String> = matrix.row(i).iter().map(|v| format!("{v:.4}")).collect();
        writeln!(writer, "{label}\t{}", row.join("\t"))?;
    }
    Ok(())
}

/// Per-participant chromosome flags: does each haplotype carry a variant?
fn haplotypes<R: VariantRecord + ?Sized>(record: &R, participant: usize) -> [bool; 2] {
    match record.variants_for_participant(participant).as_slice() {
        [] => [false, false],
        [only] => [only.is_variant(); 2],
        [first, second, ..] => [first.is_variant(), second.is_variant()],
    }
}

fn is_degenerate(frequency: f64) -> bool {
    frequency == 0.0 || frequency == 1.0
}

/// Computes pairwise LD for a fixed participant set.
#[derive(Debug, Clone)]
pub struct LdCalculator {
    config: LdConfig,
}

impl LdCalculator {
    /// Calculator for the given configuration.
    pub fn new(config: LdConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &LdConfig {
        &self.config
    }

    /// Run the phased or unphased algorithm according to the configuration.
    pub fn calculate<R: VariantRecord>(
        &self,
        records: &[R],
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<LdMatrices, LdError> {
        info!(
            loci = records.len(),
            participants = self.config.participant_count,
            phased = self.config.phased,
            "computing linkage disequilibrium"
        );
        let result = if self.config.phased {
            self.calculate_phased(records, progress, cancel)
        } else {
            self.calculate_unphased(records, progress, cancel)
        };
        match &result {
            Ok(_) => debug!(loci = records.len(), "linkage disequilibrium complete"),
            Err(err) => debug!(%err, "linkage disequilibrium stopped"),
        }
        result
    }

    fn validate<R: VariantRecord>(&self, records: &[R]) -> Result<(), LdError> {
        let expected = self.config.participant_count;
        if !records.is_empty() && expected == 0 {
            return Err(LdError::NoParticipants);
        }
        for (locus, record) in records.iter().enumerate() {
            let found = record.participant_count();
            if found < expected {
                return Err(LdError::ParticipantMismatch {
                    locus,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }

    /// Haplotype-level D′ and r².
    ///
    /// Pairs where either locus has variant frequency exactly 0 or 1 get NaN
    /// in both matrices.
    pub fn calculate_phased<R: VariantRecord>(
        &self,
        records: &[R],
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<LdMatrices, LdError> {
        self.validate(records)?;
        let n = records.len();
        let participants = self.config.participant_count;
        let chromosomes = (2 * participants) as f64;
        let mut out = LdMatrices::zeroed(n, true);

        let haps: Vec<Vec<[bool; 2]>> = records
            .iter()
            .map(|record| (0..participants).map(|p| haplotypes(record, p)).collect())
            .collect();
        let frequencies: Vec<f64> = haps
            .iter()
            .map(|locus| {
                let carriers: usize = locus.iter().map(|h| h[0] as usize + h[1] as usize).sum();
                carriers as f64 / chromosomes
            })
            .collect();

        for i in 0..n {
            if cancel.is_cancelled() {
                debug!(locus = i, "cancellation requested");
                return Err(LdError::Cancelled);
            }

            let p1 = frequencies[i];
            let p2 = 1.0 - p1;
            for j in i + 1..n {
                let q1 = frequencies[j];
                let q2 = 1.0 - q1;
                if is_degenerate(p1) || is_degenerate(q1) {
                    out.d_prime.set(i, j, f32::NAN);
                    out.r_squared.set(i, j, f32::NAN);
                    continue;
                }

                let both: usize = haps[i]
                    .iter()
                    .zip(&haps[j])
                    .map(|(a, b)| (a[0] && b[0]) as usize + (a[1] && b[1]) as usize)
                    .sum();
                let x11 = both as f64 / chromosomes;

                let d = x11 - p1 * q1;
                let d_max = if d < 0.0 {
                    -(p1 * q1).min(p2 * q2)
                } else {
                    (p1 * q2).min(p2 * q1)
                };
                out.d_prime.set(i, j, (d / d_max) as f32);
                out.r_squared.set(i, j, (d * d / (p1 * p2 * q1 * q2)) as f32);
            }
            progress.report(i as f64 / n as f64);
        }

        Ok(out)
    }

    /// Dosage correlation r² when phase is unknown. D′ is not computed.
    ///
    /// Pairs involving a locus with zero dosage variance get NaN.
    pub fn calculate_unphased<R: VariantRecord>(
        &self,
        records: &[R],
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<LdMatrices, LdError> {
        self.validate(records)?;
        let n = records.len();
        let participants = self.config.participant_count;
        let mut out = LdMatrices::zeroed(n, false);

        // Centred dosages and population variance per locus.
        let loci: Vec<(Vec<f64>, f64)> = records
            .iter()
            .map(|record| {
                let dosages: Vec<f64> = (0..participants)
                    .map(|p| {
                        let [a, b] = haplotypes(record, p);
                        (a as u8 + b as u8) as f64
                    })
                    .collect();
                let mean = dosages.iter().sum::<f64>() / participants as f64;
                let centred: Vec<f64> = dosages.iter().map(|x| x - mean).collect();
                let variance = centred.iter().map(|x| x * x).sum::<f64>() / participants as f64;
                (centred, variance)
            })
            .collect();

        for i in 0..n {
            if cancel.is_cancelled() {
                debug!(locus = i, "cancellation requested");
                return Err(LdError::Cancelled);
            }

            let (centred_i, var_i) = &loci[i];
            for j in i + 1..n {
                let (centred_j, var_j) = &loci[j];
                if *var_i == 0.0 || *var_j == 0.0 {
                    out.r_squared.set(i, j, f32::NAN);
                    continue;
                }
                let covariance = centred_i
                    .iter()
                    .zip(centred_j)
                    .map(|(x, y)| x * y)
                    .sum::<f64>()
                    / participants as f64;
                out.r_squared
                    .set(i, j, (covariance * covariance / (var_i * var_j)) as f32);
            }
            progress.report(i as f64 / n as f64);
        }

        Ok(out)
    }
}
