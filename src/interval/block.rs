use thiserror::Error;

/// Errors produced while decoding packed block lists.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlockError {
    /// A token in a comma-separated integer list was empty or not an integer.
    #[error("malformed block token {token:?} at position {index}")]
    BadToken {
        /// 0-based position of the token in the list.
        index: usize,
        /// Offending text.
        token: String,
    },

    /// Paired lists (starts/sizes or starts/ends) have different lengths.
    #[error("block list length mismatch: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first list.
        left: usize,
        /// Length of the second list.
        right: usize,
    },
}

/// Sub-feature (e.g. an exon) expressed relative to its parent's start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    position: i64,
    size: i64,
}

impl Block {
    /// Create a block at `position` (relative to the parent) spanning `size` bases.
    pub const fn new(position: i64, size: i64) -> Self {
        Self { position, size }
    }

    /// Offset from the parent start.
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Number of bases covered.
    pub fn size(&self) -> i64 {
        self.size
    }

    /// `position + size`.
    pub fn end(&self) -> i64 {
        self.position + self.size
    }

    /// Decode a UCSC-style packed integer list such as `"3,8,15,"`.
    ///
    /// A single trailing empty token (from a trailing comma) is dropped. Any
    /// other empty or non-numeric token is an error.
    pub fn extract_blocks(packed: &str) -> Result<Vec<i64>, BlockError> {
        let mut tokens: Vec<&str> = packed.split(',').collect();
        if tokens.last() == Some(&"") {
            tokens.pop();
        }

        tokens
            .into_iter()
            .enumerate()
            .map(|(index, token)| {
                token.parse::<i64>().map_err(|_| BlockError::BadToken {
                    index,
                    token: token.to_string(),
                })
            })
            .collect()
    }

    /// Zip BED12 `blockStarts` (already relative) with `blockSizes`.
    pub fn from_starts_and_sizes(starts: &[i64], sizes: &[i64]) -> Result<Vec<Block>, BlockError> {
        if starts.len() != sizes.len() {
            return Err(BlockError::LengthMismatch {
                left: starts.len(),
                right: sizes.len(),
            });
        }
        Ok(starts
            .iter()
            .zip(sizes)
            .map(|(&position, &size)| Block::new(position, size))
            .collect())
    }

    /// Build blocks from absolute half-open exon starts/ends (genePred style),
    /// re-expressed relative to `origin`.
    pub fn from_starts_and_ends(
        origin: i64,
        starts: &[i64],
        ends: &[i64],
    ) -> Result<Vec<Block>, BlockError> {
        if starts.len() != ends.len() {
            return Err(BlockError::LengthMismatch {
                left: starts.len(),
                right: ends.len(),
            });
        }
        Ok(starts
            .iter()
            .zip(ends)
            .map(|(&start, &end)| Block::new(start - origin, end - start))
            .collect())
    }
}
