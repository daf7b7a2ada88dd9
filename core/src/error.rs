use thiserror::Error;

/// Error type for dive planning, gas parsing and parameter validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecoError {
    #[error("invalid {field}: {value} ({reason})")]
    InvalidParameter {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("gradient factor low ({gf_low}) is higher than gradient factor high ({gf_high})")]
    GradientFactorOrder { gf_low: f64, gf_high: f64 },

    #[error("depth {depth_m} m exceeds the bottom gas maximum operating depth of {mod_m:.1} m")]
    DepthExceedsMod { depth_m: f64, mod_m: f64 },

    #[error(
        "decompression incomplete after {elapsed_min:.1} min: still at {depth_m:.1} m with ceiling {ceiling_m:.1} m"
    )]
    IncompleteDecompression {
        elapsed_min: f64,
        depth_m: f64,
        ceiling_m: f64,
    },

    #[error("gas parse error at position {position}: {message}")]
    GasParse { position: usize, message: String },
}

impl DecoError {
    pub(crate) fn invalid(field: &'static str, value: f64, reason: &'static str) -> Self {
        DecoError::InvalidParameter {
            field,
            value,
            reason,
        }
    }
}
