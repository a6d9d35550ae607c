// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text recognition model
//!
//! This module provides the text recognition component of PaddleOCR.
//! It recognizes text content from cropped text regions.

use anyhow::{Context, Result};
use ndarray::{ArrayViewD, IxDyn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;


/// Recognized text with confidence score
#[derive(Debug, Clone)]
pub struct RecognizedText {
    /// The recognized text content
    pub text: String,
    /// Mean per-character probability (0.0-1.0)
    pub confidence: f32,
    pub char_confidences: Vec<f32>,
}

impl RecognizedText {
    pub fn new(text: String, confidence: f32) -> Self {
        Self {
            text,
            confidence,
            char_confidences: Vec::new(),
        }
    }

    /// Check if the text is empty or whitespace only
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Load a PaddleOCR character dictionary
///
/// One character per line. Index 0 is reserved for the CTC blank token and a
/// trailing space class is appended, matching `use_space_char=True` exports.
pub fn load_dictionary<P: AsRef<Path>>(path: P) -> Result<Vec<char>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open dictionary: {}", path.display()))?;

    let mut dictionary = vec!['\0'];
    for line in BufReader::new(file).lines() {
        let line = line.context("Failed to read dictionary line")?;
        if let Some(ch) = line.chars().next() {
            dictionary.push(ch);
        }
    }
    dictionary.push(' ');

    Ok(dictionary)
}

/// CTC greedy (best path) decoding
///
/// `output` is `[1, T, C]` or `[T, C]`. Repeats collapse, blanks (index 0)
/// are removed. Probabilities are assumed to be softmax outputs.
pub fn ctc_greedy_decode(output: ArrayViewD<f32>, dictionary: &[char]) -> Result<RecognizedText> {
    let shape = output.shape();
    let (seq_len, num_classes, batched) = match shape.len() {
        3 => (shape[1], shape[2], true),
        2 => (shape[0], shape[1], false),
        _ => anyhow::bail!("Unexpected recognition output shape: {:?}", shape),
    };

    let mut text = String::new();
    let mut char_confidences = Vec::new();
    let mut prev_index: Option<usize> = None;

    for t in 0..seq_len {
        let (max_index, max_prob) = (0..num_classes)
            .map(|c| {
                let prob = if batched {
                    output[IxDyn(&[0, t, c])]
                } else {
                    output[IxDyn(&[t, c])]
                };
                (c, prob)
            })
            .fold((0usize, f32::NEG_INFINITY), |best, cur| {
                if cur.1 > best.1 {
                    cur
                } else {
                    best
                }
            });

        if max_index != 0 && Some(max_index) != prev_index {
            if let Some(&ch) = dictionary.get(max_index) {
                text.push(ch);
                char_confidences.push(max_prob);
            }
        }

        prev_index = (max_index != 0).then_some(max_index);
    }

    let confidence = if char_confidences.is_empty() {
        0.0
    } else {
        let mean = char_confidences.iter().sum::<f32>() / char_confidences.len() as f32;
        mean.clamp(0.0, 1.0)
    };

    Ok(RecognizedText {
        text: text.trim().to_string(),
        confidence,
        char_confidences,
    })
}

#[cfg(feature = "backend-paddle")]
pub use model::OcrRecognitionModel;

#[cfg(feature = "backend-paddle")]
mod model {
    use anyhow::{Context, Result};
    use ndarray::Array4;
    use ort::execution_providers::CPUExecutionProvider;
    use ort::session::builder::GraphOptimizationLevel;
    use ort::session::Session;
    use ort::value::Value;
    use std::path::Path;
    use std::sync::Mutex;
    use tracing::{debug, info};

    use super::{ctc_greedy_decode, load_dictionary, RecognizedText};
    use crate::vision::ocr::preprocessing::REC_INPUT_HEIGHT;

    /// PP-OCR recognition model, CPU only
    pub struct OcrRecognitionModel {
        session: Mutex<Session>,
        dictionary: Vec<char>,
        input_name: String,
    }

    impl std::fmt::Debug for OcrRecognitionModel {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("OcrRecognitionModel")
                .field("dictionary_size", &self.dictionary.len())
                .field("input_name", &self.input_name)
                .finish_non_exhaustive()
        }
    }

    impl OcrRecognitionModel {
        /// Load the recognition model (`rec_model.onnx`) and its dictionary
        pub fn new<P: AsRef<Path>>(model_path: P, dict_path: P) -> Result<Self> {
            let model_path = model_path.as_ref();
            let dict_path = dict_path.as_ref();

            if !model_path.exists() {
                anyhow::bail!("OCR recognition model not found: {}", model_path.display());
            }
            if !dict_path.exists() {
                anyhow::bail!(
                    "OCR character dictionary not found: {}",
                    dict_path.display()
                );
            }

            let dictionary = load_dictionary(dict_path)?;
            info!(
                "Loaded character dictionary with {} characters",
                dictionary.len()
            );

            let session = Session::builder()
                .context("Failed to create session builder")?
                .with_execution_providers([CPUExecutionProvider::default().build()])
                .context("Failed to set CPU execution provider")?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .context("Failed to set optimization level")?
                .with_intra_threads(4)
                .context("Failed to set intra threads")?
                .commit_from_file(model_path)
                .with_context(|| {
                    format!(
                        "Failed to load OCR recognition model from {}",
                        model_path.display()
                    )
                })?;

            let input_name = session
                .inputs
                .first()
                .map(|input| input.name.clone())
                .unwrap_or_else(|| "x".to_string());
            debug!("Recognition model input: {}", input_name);

            Ok(Self {
                session: Mutex::new(session),
                dictionary,
                input_name,
            })
        }

        /// Recognize text from a `[1, 3, 48, W]` tensor from `preprocess_for_recognition`
        pub fn recognize(&self, input: &Array4<f32>) -> Result<RecognizedText> {
            let shape = input.shape();
            if shape[0] != 1
                || shape[1] != 3
                || shape[2] != REC_INPUT_HEIGHT as usize
                || shape[3] < 4
            {
                anyhow::bail!(
                    "Invalid input shape: {:?}, expected [1, 3, {}, W>=4]",
                    shape,
                    REC_INPUT_HEIGHT
                );
            }

            let mut session = self
                .session
                .lock()
                .map_err(|_| anyhow::anyhow!("OCR recognition session poisoned"))?;

            let input_value =
                Value::from_array(input.to_owned()).context("Failed to create input tensor")?;
            let outputs = session
                .run(ort::inputs![&self.input_name => input_value])
                .context("Recognition inference failed")?;

            let output_tensor = outputs[0]
                .try_extract_array::<f32>()
                .context("Failed to extract output tensor")?;

            ctc_greedy_decode(output_tensor.view(), &self.dictionary)
        }
    }

}
