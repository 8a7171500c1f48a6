//! Errors surfaced for invalid extraction inputs.
//!
//! Numeric trouble inside the engine (unresolved rays, degenerate fits,
//! unstable roots) is recovered locally and never reaches this type.

/// Error returned by the extraction pipelines.
#[derive(Debug, Clone, PartialEq)]
pub enum ContourError {
    /// The image has zero width or height.
    EmptyImage,
    /// Mask and intensity image differ in size.
    DimensionMismatch {
        /// Mask dimensions `(width, height)`.
        mask: (u32, u32),
        /// Intensity image dimensions `(width, height)`.
        image: (u32, u32),
    },
    /// Angular sampling needs at least three angles.
    TooFewAngles {
        /// Required minimum.
        needed: usize,
        /// Configured count.
        got: usize,
    },
    /// No foreground component survived mask cleaning.
    EmptyMask,
    /// A configuration value is out of range.
    InvalidConfig(String),
}

impl std::fmt::Display for ContourError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyImage => write!(f, "image has zero width or height"),
            Self::DimensionMismatch { mask, image } => write!(
                f,
                "mask is {}x{} but intensity image is {}x{}",
                mask.0, mask.1, image.0, image.1
            ),
            Self::TooFewAngles { needed, got } => {
                write!(f, "too few angles: need {}, got {}", needed, got)
            }
            Self::EmptyMask => write!(f, "mask has no foreground after cleaning"),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ContourError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_offending_values() {
        let e = ContourError::DimensionMismatch {
            mask: (10, 20),
            image: (10, 21),
        };
        assert_eq!(e.to_string(), "mask is 10x20 but intensity image is 10x21");
        let e = ContourError::TooFewAngles { needed: 3, got: 2 };
        assert_eq!(e.to_string(), "too few angles: need 3, got 2");
    }
}
