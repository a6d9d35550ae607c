// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Categorization and response shaping of recognized text

pub mod categorize;
pub mod portable;
pub mod shaper;

pub use categorize::{categorize, Category};
pub use portable::NativeValue;
pub use shaper::{
    extract_title, shape, CategorizedResult, LinesResult, RegionsResult, Structured,
};
