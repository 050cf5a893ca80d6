use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{Device, Tensor, DType};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;

use specsense_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_batch;

/// Sentence-transformer encoder (MiniLM / BERT family) with mean pooling.
/// Expects `tokenizer.json`, `config.json` and either `model.safetensors` or
/// `pytorch_model.bin` in the model directory.
pub struct SentenceEmbedder { model: BertModel, tokenizer: Tokenizer, device: Device, dim: usize, max_len: usize, pad_id: u32, name: String }

impl SentenceEmbedder {
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = select_device();
        tracing::info!(dir = %model_dir.display(), "loading sentence embedder");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let config_path = model_dir.join("config.json");
        let config: BertConfig = serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;
        let weights = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = BertModel::load(vb, &config)?;
        let pad_id = tokenizer.get_padding().map_or(0, |p| p.pad_id);
        let name = model_dir.file_name().map_or_else(|| "sentence-embedder".to_string(), |n| n.to_string_lossy().to_string());
        tracing::info!(model = %name, dim = config.hidden_size, "sentence embedder ready");
        Ok(Self { model, tokenizer, device, dim: config.hidden_size, max_len, pad_id, name })
    }

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() { return Ok(Vec::new()); }
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize_batch(&self.tokenizer, texts, self.max_len, self.pad_id, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let rows: Vec<Vec<f32>> = pooled.to_device(&Device::Cpu)?.to_dtype(DType::F32)?.to_vec2()?;
        tracing::debug!(texts = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "encoded batch");
        Ok(rows)
    }
}

impl Embedder for SentenceEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> { self.encode(texts) }
    fn name(&self) -> &str { &self.name }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() { return Ok(candle_core::safetensors::load(&safetensors, device)?); }
    let pickle = model_dir.join("pytorch_model.bin");
    if pickle.exists() { return Ok(candle_core::pickle::read_all(&pickle)?.into_iter().collect()); }
    Err(anyhow!("No model weights (model.safetensors or pytorch_model.bin) in {}", model_dir.display()))
}

/// Configured directory first, then `SPECSENSE_MODEL_DIR`, then the
/// conventional local checkouts.
pub fn resolve_model_dir(configured: Option<&str>) -> Result<PathBuf> {
    if let Some(dir) = configured {
        let p = specsense_core::config::expand_path(dir);
        if p.exists() { return Ok(p); }
        return Err(anyhow!("Configured model directory does not exist: {}", p.display()));
    }
    if let Ok(dir) = std::env::var("SPECSENSE_MODEL_DIR") { let p = PathBuf::from(&dir); if p.exists() { return Ok(p); } }
    for candidate in ["models/all-MiniLM-L6-v2", "../models/all-MiniLM-L6-v2"] {
        let p = Path::new(candidate); if p.exists() { return Ok(p.to_path_buf()); }
    }
    Err(anyhow!("Could not locate the sentence embedder model directory; set embedding.model_dir or use embedding.backend = \"hashing\""))
}
