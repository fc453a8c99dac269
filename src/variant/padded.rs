use std::hash::{Hash, Hasher};

use super::{VariantRecord, VariantType};

/// Borrowing wrapper that prepends `padding` reference-only participants.
///
/// Participant `k < padding` reports `[None]` / allele `[0]`; participant
/// `k >= padding` is participant `k - padding` of the wrapped record.
/// Equality and hashing look only at the wrapped record.
#[derive(Debug)]
pub struct PaddedVariantRecord<'a, R: ?Sized> {
    original: &'a R,
    padding: usize,
}

impl<R: ?Sized> Clone for PaddedVariantRecord<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: ?Sized> Copy for PaddedVariantRecord<'_, R> {}

impl<'a, R: VariantRecord + ?Sized> PaddedVariantRecord<'a, R> {
    /// Wrap `original` behind `padding` empty participants.
    pub fn new(original: &'a R, padding: usize) -> Self {
        Self { original, padding }
    }

    /// The wrapped record.
    pub fn original(&self) -> &'a R {
        self.original
    }

    /// Number of synthetic participants in front.
    pub fn padding(&self) -> usize {
        self.padding
    }
}

impl<R: VariantRecord + ?Sized> VariantRecord for PaddedVariantRecord<'_, R> {
    fn reference_name(&self) -> &str {
        self.original.reference_name()
    }

    fn position(&self) -> i64 {
        self.original.position()
    }

    fn name(&self) -> Option<&str> {
        self.original.name()
    }

    fn variant_type(&self) -> VariantType {
        self.original.variant_type()
    }

    fn ref_bases(&self) -> &str {
        self.original.ref_bases()
    }

    fn alt_alleles(&self) -> &[String] {
        self.original.alt_alleles()
    }

    fn participant_count(&self) -> usize {
        self.padding + self.original.participant_count()
    }

    fn variants_for_participant(&self, index: usize) -> Vec<VariantType> {
        if index < self.padding {
            vec![VariantType::None]
        } else {
            self.original.variants_for_participant(index - self.padding)
        }
    }

    fn alleles_for_participant(&self, index: usize) -> Vec<usize> {
        if index < self.padding {
            vec![0]
        } else {
            self.original.alleles_for_participant(index - self.padding)
        }
    }

    fn is_phased(&self) -> bool {
        self.original.is_phased()
    }
}

impl<R: PartialEq + ?Sized> PartialEq for PaddedVariantRecord<'_, R> {
    fn eq(&self, other: &Self) -> bool {
        self.original == other.original
    }
}

impl<R: Eq + ?Sized> Eq for PaddedVariantRecord<'_, R> {}

impl<R: Hash + ?Sized> Hash for PaddedVariantRecord<'_, R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.original.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::VcfVariantRecord;

    fn five_participants() -> VcfVariantRecord {
        VcfVariantRecord::parse("chr1\t10\t.\tA\tT\t.\t.\t.\tGT\t0|0\t1|1\t0|1\t1|0\t0|0").unwrap()
    }

    #[test]
    fn padding_shifts_participants() {
        let original = five_participants();
        let padded = PaddedVariantRecord::new(&original, 3);
        assert_eq!(padded.participant_count(), 8);
        assert_eq!(padded.variants_for_participant(1), vec![VariantType::None]);
        assert_eq!(padded.alleles_for_participant(2), vec![0]);
        assert_eq!(
            padded.variants_for_participant(4),
            original.variants_for_participant(1)
        );
    }

    #[test]
    fn equality_ignores_padding() {
        let original = five_participants();
        assert_eq!(
            PaddedVariantRecord::new(&original, 1),
            PaddedVariantRecord::new(&original, 4)
        );
    }
}
