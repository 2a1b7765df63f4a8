use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("wholesale price for '{supplier_product_id}' is negative: {price}")]
    NegativeWholesalePrice {
        supplier_product_id: String,
        price: String,
    },

    #[error("EAN for '{supplier_product_id}' contains non-digit characters: \"{ean}\"")]
    MalformedEan {
        supplier_product_id: String,
        ean: String,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read source catalog at {path}: {source}")]
    SourceFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse source catalog: {0}")]
    SourceFileParse(#[from] serde_yaml::Error),

    #[error("source catalog validation failed: {0}")]
    Validation(String),
}
