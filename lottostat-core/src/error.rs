use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("number {number} out of range (1-{max})")]
    InvalidRange { number: u8, max: u8 },

    #[error("duplicate number: {0}")]
    DuplicateNumber(u8),

    #[error("no historical draws available")]
    EmptyDataset,

    #[error("could not generate a unique combination after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },

    #[error("weighted sampling failed: {0}")]
    Sampling(#[from] rand::distr::weighted::Error),
}
