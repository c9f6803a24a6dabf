//! Embedding providers: a candle-backed sentence-embedding model for real
//! runs and a hash-based fake for tests and model-free development.

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;

use socrag_core::error::Error as CoreError;
use socrag_core::traits::Embedder;

pub mod device;
pub mod pool;
pub mod tokenize;

pub use pool::masked_mean_l2;

/// Output width of the default sentence-embedding model.
pub const EMBEDDING_DIM: usize = 384;
/// Token limit per text; longer inputs are truncated.
pub const MAX_TOKENS: usize = 256;
/// Documented default model. The local directory layout must contain
/// `tokenizer.json`, `config.json`, and `pytorch_model.bin`.
pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

fn model_unavailable(msg: String) -> anyhow::Error {
    anyhow::Error::new(CoreError::ModelUnavailable(msg))
}

pub struct EmbeddingModel {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl EmbeddingModel {
    pub fn new() -> Result<Self> {
        let model_dir = resolve_model_dir()?;
        Self::load_from_dir(&model_dir)
    }

    /// Load tokenizer + config + weights from a local model directory. Every
    /// failure here means the embedding backend cannot start, so all of them
    /// surface as `ModelUnavailable`.
    pub fn load_from_dir(model_dir: &Path) -> Result<Self> {
        let device = device::select_device();
        println!("🔄 Loading embedding model from {}", model_dir.display());

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            model_unavailable(format!("tokenizer {}: {}", tokenizer_path.display(), e))
        })?;

        let config_path = model_dir.join("config.json");
        let config_raw = std::fs::read_to_string(&config_path)
            .map_err(|e| model_unavailable(format!("config {}: {}", config_path.display(), e)))?;
        let config: BertConfig = serde_json::from_str(&config_raw)
            .map_err(|e| model_unavailable(format!("config {}: {}", config_path.display(), e)))?;

        let weights_path = model_dir.join("pytorch_model.bin");
        let weights = candle_core::pickle::read_all(&weights_path)
            .map_err(|e| model_unavailable(format!("weights {}: {}", weights_path.display(), e)))?;
        let weights_map: HashMap<String, Tensor> = weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);
        let model = BertModel::load(vb, &config)
            .map_err(|e| model_unavailable(format!("model {}: {}", weights_path.display(), e)))?;

        println!("✅ Embedding model ready ({}d)", EMBEDDING_DIM);
        Ok(Self { model, tokenizer, device })
    }

    fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let (input_ids, attention_mask) =
            tokenize::tokenize_on_device(&self.tokenizer, text, MAX_TOKENS, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let vec: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        anyhow::ensure!(
            vec.len() == EMBEDDING_DIM,
            "unexpected embedding width {}",
            vec.len()
        );
        Ok(vec)
    }
}

impl Embedder for EmbeddingModel {
    fn dim(&self) -> usize {
        EMBEDDING_DIM
    }

    fn max_len(&self) -> usize {
        MAX_TOKENS
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed_text(text)?);
        }
        Ok(out)
    }
}

/// Deterministic stand-in embedder: each whitespace token bumps one
/// hash-selected dimension, then the vector is L2-normalized. Texts sharing
/// tokens get positive cosine similarity, which is all the pipeline tests
/// need. Empty input yields the zero vector.
pub struct FakeEmbedder {
    dim: usize,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;

        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let idx = (hasher.finish() as usize) % self.dim;
            v[idx] += 1.0 + (i as f32 % 3.0) * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        MAX_TOKENS
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

/// Default provider selection: `APP_USE_FAKE_EMBEDDINGS=1` (or `true`) picks
/// the fake, anything else loads the real model.
pub fn get_default_embedder() -> Result<Box<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        println!("🧪 Using fake embeddings (APP_USE_FAKE_EMBEDDINGS)");
        return Ok(Box::new(FakeEmbedder::new(EMBEDDING_DIM)));
    }
    Ok(Box::new(EmbeddingModel::new()?))
}

fn resolve_model_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("APP_MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            println!("📦 Using APP_MODEL_DIR: {}", p.display());
            return Ok(p);
        }
    }
    if let Ok(dir) = std::env::var("MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            println!("📦 Using MODEL_DIR: {}", p.display());
            return Ok(p);
        }
    }
    let local = Path::new("models/all-MiniLM-L6-v2");
    if local.exists() {
        println!("📦 Using model dir: {}", local.display());
        return Ok(local.to_path_buf());
    }
    let parent = Path::new("../models/all-MiniLM-L6-v2");
    if parent.exists() {
        println!("📦 Using model dir: {}", parent.display());
        return Ok(parent.to_path_buf());
    }
    Err(model_unavailable(format!(
        "could not locate a local {} directory; set APP_MODEL_DIR",
        DEFAULT_MODEL_ID
    )))
}
