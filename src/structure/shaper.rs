// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shaping of recognized fragments into the structured response

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::categorize::{categorize, Category};
use super::portable::NativeValue;
use crate::backend::{Layout, TextFragment};

/// Label/price/button buckets plus every line in `raw`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorizedResult {
    pub title: String,
    pub labels: Vec<String>,
    pub prices: Vec<String>,
    pub buttons: Vec<String>,
    pub raw: Vec<String>,
}

/// Joined text and its lines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinesResult {
    pub title: String,
    pub text: String,
    pub lines: Vec<String>,
}

/// Raw fragments with geometry, already converted to portable JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionsResult {
    pub title: String,
    pub raw: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Structured {
    Categorized(CategorizedResult),
    Lines(LinesResult),
    Regions(RegionsResult),
}

impl Structured {
    pub fn title(&self) -> &str {
        match self {
            Structured::Categorized(r) => &r.title,
            Structured::Lines(r) => &r.title,
            Structured::Regions(r) => &r.title,
        }
    }
}

/// Text of the first non-empty fragment, or `""`
pub fn extract_title(fragments: &[TextFragment]) -> String {
    fragments
        .iter()
        .find(|f| !f.is_blank())
        .map(|f| f.text.clone())
        .unwrap_or_default()
}

/// Drop blank fragments and shape the rest for `layout`
pub fn shape(fragments: Vec<TextFragment>, layout: Layout) -> Structured {
    let fragments: Vec<TextFragment> = fragments.into_iter().filter(|f| !f.is_blank()).collect();
    let title = extract_title(&fragments);

    match layout {
        Layout::Categorized => Structured::Categorized(categorized(title, fragments)),
        Layout::Lines => {
            let lines: Vec<String> = fragments.into_iter().map(|f| f.text).collect();
            Structured::Lines(LinesResult {
                title,
                text: lines.join("\n"),
                lines,
            })
        }
        Layout::Regions => Structured::Regions(RegionsResult {
            title,
            raw: fragments.iter().map(|f| region_value(f).to_portable()).collect(),
        }),
    }
}

fn categorized(title: String, fragments: Vec<TextFragment>) -> CategorizedResult {
    let mut result = CategorizedResult {
        title,
        ..Default::default()
    };

    for fragment in fragments {
        match categorize(&fragment.text) {
            Category::Label => result.labels.push(fragment.text.clone()),
            Category::Price => result.prices.push(fragment.text.clone()),
            Category::Button => result.buttons.push(fragment.text.clone()),
            Category::Text => {}
        }
        result.raw.push(fragment.text);
    }

    result
}

fn region_value(fragment: &TextFragment) -> NativeValue {
    let bbox = fragment
        .bbox
        .as_ref()
        .map(|points| NativeValue::from(Array2::from(points.clone()).into_dyn()));

    NativeValue::map([
        ("text", NativeValue::from(fragment.text.as_str())),
        ("bbox", NativeValue::from(bbox)),
        ("confidence", NativeValue::from(fragment.confidence)),
    ])
}
