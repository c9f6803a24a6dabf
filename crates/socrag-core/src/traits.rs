use anyhow::Result;

/// Text-to-vector backend. Implementations must return unit-length vectors
/// so downstream cosine scoring reduces to a dot product, and must be
/// deterministic for a fixed model configuration.
pub trait Embedder: Send + Sync {
    /// Embedding dimensionality (D).
    fn dim(&self) -> usize;
    /// Maximum token length fed to the model before truncation.
    fn max_len(&self) -> usize;
    /// Embed a batch of texts. Output has the same length and order as the
    /// input.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Single-text convenience used at query time. Delegates to
    /// `embed_batch` so query vectors get the identical normalization as
    /// indexed documents.
    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vecs = self.embed_batch(&[text.to_string()])?;
        anyhow::ensure!(vecs.len() == 1, "embed_batch returned {} vectors for one input", vecs.len());
        Ok(vecs.remove(0))
    }
}
