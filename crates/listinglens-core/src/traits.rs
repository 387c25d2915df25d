/// Computes fixed-dimension embeddings. Treated as a pure function of
/// the input text; implementations must return one vector per input,
/// all of dimensionality `dim()`.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Produces natural-language text for a prompt. The output has no
/// guaranteed format; callers must treat it as untrusted.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}
