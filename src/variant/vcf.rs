use super::{VariantError, VariantRecord, VariantType};

const FIXED_COLUMNS: usize = 8;
const FORMAT_COLUMN: usize = 8;

/// A VCF data line with its `GT` calls.
///
/// Missing alleles (`.`) are reported as the reference allele. The record is
/// phased when no genotype uses the unphased `/` separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VcfVariantRecord {
    reference_name: String,
    position: i64,
    name: Option<String>,
    ref_bases: String,
    alt_alleles: Vec<String>,
    alt_types: Vec<VariantType>,
    genotypes: Vec<Vec<usize>>,
    phased: bool,
}

impl VcfVariantRecord {
    /// Build a record from already-decoded genotypes.
    pub fn new(
        reference_name: impl Into<String>,
        position: i64,
        ref_bases: impl Into<String>,
        alt_alleles: Vec<String>,
        genotypes: Vec<Vec<usize>>,
        phased: bool,
    ) -> Self {
        let ref_bases = ref_bases.into();
        let alt_types = alt_alleles
            .iter()
            .map(|alt| VariantType::classify(&ref_bases, alt))
            .collect();
        Self {
            reference_name: reference_name.into(),
            position,
            name: None,
            ref_bases,
            alt_alleles,
            alt_types,
            genotypes,
            phased,
        }
    }

    /// Set the identifier.
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Parse one tab-separated VCF data line.
    pub fn parse(line: &str) -> Result<Self, VariantError> {
        let line = line.trim_end_matches(['\n', '\r']);
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < FIXED_COLUMNS {
            return Err(VariantError::MissingColumns {
                found: cols.len(),
                line: line.to_string(),
            });
        }

        let position = cols[1]
            .trim()
            .parse::<i64>()
            .map_err(|_| VariantError::BadPosition(cols[1].to_string()))?;
        let name = match cols[2] {
            "." | "" => None,
            id => Some(id.to_string()),
        };
        let alt_alleles: Vec<String> = match cols[4] {
            "." | "" => Vec::new(),
            alts => alts.split(',').map(str::to_string).collect(),
        };

        let samples = cols.get(FORMAT_COLUMN + 1..).unwrap_or_default();
        let gt_index = cols
            .get(FORMAT_COLUMN)
            .and_then(|format| format.split(':').position(|key| key == "GT"));

        let mut phased = true;
        let mut genotypes = Vec::with_capacity(samples.len());
        for (participant, sample) in samples.iter().enumerate() {
            let Some(gt) = gt_index.and_then(|idx| sample.split(':').nth(idx)) else {
                genotypes.push(vec![0]);
                continue;
            };
            if gt.contains('/') {
                phased = false;
            }
            genotypes.push(parse_genotype(gt, participant)?);
        }

        Ok(Self::new(cols[0], position, cols[3], alt_alleles, genotypes, phased).with_name(name))
    }
}

fn parse_genotype(gt: &str, participant: usize) -> Result<Vec<usize>, VariantError> {
    gt.split(['/', '|'])
        .map(|allele| match allele {
            "." => Ok(0),
            index => index.parse::<usize>().map_err(|_| VariantError::BadGenotype {
                participant,
                value: gt.to_string(),
            }),
        })
        .collect()
}

impl VariantRecord for VcfVariantRecord {
    fn reference_name(&self) -> &str {
        &self.reference_name
    }

    fn position(&self) -> i64 {
        self.position
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn variant_type(&self) -> VariantType {
        self.alt_types.first().copied().unwrap_or(VariantType::None)
    }

    fn ref_bases(&self) -> &str {
        &self.ref_bases
    }

    fn alt_alleles(&self) -> &[String] {
        &self.alt_alleles
    }

    fn participant_count(&self) -> usize {
        self.genotypes.len()
    }

    fn variants_for_participant(&self, index: usize) -> Vec<VariantType> {
        self.genotypes[index]
            .iter()
            .map(|&allele| match allele {
                0 => VariantType::None,
                k => self.alt_types.get(k - 1).copied().unwrap_or(VariantType::Other),
            })
            .collect()
    }

    fn alleles_for_participant(&self, index: usize) -> Vec<usize> {
        self.genotypes[index].clone()
    }

    fn is_phased(&self) -> bool {
        self.phased
    }
}
