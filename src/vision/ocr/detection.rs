// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text detection model
//!
//! The detection model emits a per-pixel text probability map. Connected
//! regions above the threshold become `TextBox`es in preprocessed space.

use ndarray::{ArrayViewD, IxDyn};

/// Default probability threshold for text pixels
pub const DEFAULT_DETECTION_THRESHOLD: f32 = 0.3;

/// Regions smaller than this many pixels are treated as noise
pub const MIN_REGION_PIXELS: usize = 10;

/// Box growth applied to shrunk DB regions (PaddleOCR's `unclip_ratio`)
pub const UNCLIP_RATIO: f32 = 1.5;

/// A detected text box with location and confidence
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    /// X coordinate of top-left corner (in preprocessed image space)
    pub x: f32,
    /// Y coordinate of top-left corner (in preprocessed image space)
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Mean probability over the region's pixels
    pub confidence: f32,
}

impl TextBox {
    /// Check if this text box is valid (reasonable dimensions)
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.confidence > 0.0
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Corners clockwise from top-left
    pub fn corners(&self) -> [[f32; 2]; 4] {
        let (x2, y2) = (self.x + self.width, self.y + self.height);
        [[self.x, self.y], [x2, self.y], [x2, y2], [self.x, y2]]
    }

    /// Grow the box by `area * ratio / perimeter` on every side, clamped to
    /// `[0, bound]`
    pub fn unclip(&self, ratio: f32, bound: f32) -> TextBox {
        let perimeter = 2.0 * (self.width + self.height);
        if perimeter <= 0.0 {
            return self.clone();
        }
        let distance = self.area() * ratio / perimeter;

        let x1 = (self.x - distance).max(0.0);
        let y1 = (self.y - distance).max(0.0);
        let x2 = (self.x + self.width + distance).min(bound);
        let y2 = (self.y + self.height + distance).min(bound);

        TextBox {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
            confidence: self.confidence,
        }
    }
}

/// Read-only view over a `[1, 1, H, W]` or `[1, H, W]` probability map
struct ProbabilityMap<'a> {
    data: ArrayViewD<'a, f32>,
    height: usize,
    width: usize,
    is_4d: bool,
}

impl<'a> ProbabilityMap<'a> {
    fn new(data: ArrayViewD<'a, f32>) -> Option<Self> {
        let shape = data.shape().to_vec();
        let (height, width, is_4d) = match shape.len() {
            4 => (shape[2], shape[3], true),
            3 => (shape[1], shape[2], false),
            _ => return None,
        };
        Some(Self {
            data,
            height,
            width,
            is_4d,
        })
    }

    fn get(&self, x: usize, y: usize) -> f32 {
        if self.is_4d {
            self.data[IxDyn(&[0, 0, y, x])]
        } else {
            self.data[IxDyn(&[0, y, x])]
        }
    }
}

struct Region {
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
    count: usize,
    sum_conf: f32,
}

/// Turn a detection probability map into text boxes
///
/// Boxes are scaled from map resolution to `input_height` x `input_width`,
/// unclipped, and sorted top-to-bottom then left-to-right. Returns an empty
/// list for maps with an unexpected rank.
pub fn boxes_from_probability_map(
    output: ArrayViewD<f32>,
    threshold: f32,
    input_height: usize,
    input_width: usize,
) -> Vec<TextBox> {
    let Some(map) = ProbabilityMap::new(output) else {
        return Vec::new();
    };
    if map.height == 0 || map.width == 0 {
        return Vec::new();
    }

    let scale_y = input_height as f32 / map.height as f32;
    let scale_x = input_width as f32 / map.width as f32;
    let bound = input_width.max(input_height) as f32;

    let mut visited = vec![false; map.height * map.width];
    let mut text_boxes = Vec::new();

    for y in 0..map.height {
        for x in 0..map.width {
            if visited[y * map.width + x] || map.get(x, y) < threshold {
                continue;
            }

            let region = flood_fill(&map, &mut visited, x, y, threshold);
            if region.count <= MIN_REGION_PIXELS {
                continue;
            }

            let text_box = TextBox {
                x: region.min_x as f32 * scale_x,
                y: region.min_y as f32 * scale_y,
                width: (region.max_x - region.min_x + 1) as f32 * scale_x,
                height: (region.max_y - region.min_y + 1) as f32 * scale_y,
                confidence: region.sum_conf / region.count as f32,
            };
            text_boxes.push(text_box.unclip(UNCLIP_RATIO, bound));
        }
    }

    text_boxes.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));
    text_boxes
}

/// 4-connected flood fill from `(start_x, start_y)`
fn flood_fill(
    map: &ProbabilityMap,
    visited: &mut [bool],
    start_x: usize,
    start_y: usize,
    threshold: f32,
) -> Region {
    let mut region = Region {
        min_x: start_x,
        max_x: start_x,
        min_y: start_y,
        max_y: start_y,
        count: 0,
        sum_conf: 0.0,
    };
    let mut stack = vec![(start_x, start_y)];

    while let Some((x, y)) = stack.pop() {
        let idx = y * map.width + x;
        if visited[idx] {
            continue;
        }
        let prob = map.get(x, y);
        if prob < threshold {
            continue;
        }

        visited[idx] = true;
        region.count += 1;
        region.sum_conf += prob;
        region.min_x = region.min_x.min(x);
        region.max_x = region.max_x.max(x);
        region.min_y = region.min_y.min(y);
        region.max_y = region.max_y.max(y);

        if x > 0 {
            stack.push((x - 1, y));
        }
        if x + 1 < map.width {
            stack.push((x + 1, y));
        }
        if y > 0 {
            stack.push((x, y - 1));
        }
        if y + 1 < map.height {
            stack.push((x, y + 1));
        }
    }

    region
}

#[cfg(feature = "backend-paddle")]
pub use model::OcrDetectionModel;

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

    use super::{boxes_from_probability_map, TextBox, DEFAULT_DETECTION_THRESHOLD};

    /// PP-OCR detection model, CPU only
    pub struct OcrDetectionModel {
        session: Mutex<Session>,
        input_name: String,
        confidence_threshold: f32,
    }

    impl std::fmt::Debug for OcrDetectionModel {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("OcrDetectionModel")
                .field("input_name", &self.input_name)
                .field("confidence_threshold", &self.confidence_threshold)
                .finish_non_exhaustive()
        }
    }

    impl OcrDetectionModel {
        /// Load the detection model (`det_model.onnx`)
        pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
            let model_path = model_path.as_ref();
            if !model_path.exists() {
                anyhow::bail!("OCR detection model not found: {}", model_path.display());
            }

            info!("Loading OCR detection model from {}", model_path.display());

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
                        "Failed to load OCR detection model from {}",
                        model_path.display()
                    )
                })?;

            let input_name = session
                .inputs
                .first()
                .map(|input| input.name.clone())
                .unwrap_or_else(|| "x".to_string());
            debug!("Detection model input: {}", input_name);

            Ok(Self {
                session: Mutex::new(session),
                input_name,
                confidence_threshold: DEFAULT_DETECTION_THRESHOLD,
            })
        }

        pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
            self.confidence_threshold = threshold.clamp(0.0, 1.0);
            self
        }

        /// Run detection on a `[1, 3, H, W]` tensor from `preprocess_for_detection`
        pub fn detect(&self, input: &Array4<f32>) -> Result<Vec<TextBox>> {
            let shape = input.shape();
            if shape[0] != 1 || shape[1] != 3 {
                anyhow::bail!("Invalid input shape: {:?}, expected [1, 3, H, W]", shape);
            }
            let (height, width) = (shape[2], shape[3]);

            let mut session = self
                .session
                .lock()
                .map_err(|_| anyhow::anyhow!("OCR detection session poisoned"))?;

            let input_value =
                Value::from_array(input.to_owned()).context("Failed to create input tensor")?;
            let outputs = session
                .run(ort::inputs![&self.input_name => input_value])
                .context("Detection inference failed")?;

            let probability_map = outputs[0]
                .try_extract_array::<f32>()
                .context("Failed to extract output tensor")?;
            debug!("Detection output shape: {:?}", probability_map.shape());

            let boxes = boxes_from_probability_map(
                probability_map.view(),
                self.confidence_threshold,
                height,
                width,
            );
            debug!("Detected {} text regions", boxes.len());
            Ok(boxes)
        }
    }

}
