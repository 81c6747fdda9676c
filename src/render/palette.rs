//! Distribution colors for the comparison chart.
//!
//! Colors are positional: the i-th distribution the loader met gets the i-th
//! color. The primary palette is tab20c; past 20 distributions the tail of
//! tab20b is appended.

use std::collections::HashMap;

use plotters::style::RGBColor;

use crate::error::{FigureError, Result};

pub const TAB20C: [RGBColor; 20] = [
    RGBColor(0x31, 0x82, 0xbd),
    RGBColor(0x6b, 0xae, 0xd6),
    RGBColor(0x9e, 0xca, 0xe1),
    RGBColor(0xc6, 0xdb, 0xef),
    RGBColor(0xe6, 0x55, 0x0d),
    RGBColor(0xfd, 0x8d, 0x3c),
    RGBColor(0xfd, 0xae, 0x6b),
    RGBColor(0xfd, 0xd0, 0xa2),
    RGBColor(0x31, 0xa3, 0x54),
    RGBColor(0x74, 0xc4, 0x76),
    RGBColor(0xa1, 0xd9, 0x9b),
    RGBColor(0xc7, 0xe9, 0xc0),
    RGBColor(0x75, 0x6b, 0xb1),
    RGBColor(0x9e, 0x9a, 0xc8),
    RGBColor(0xbc, 0xbd, 0xdc),
    RGBColor(0xda, 0xda, 0xeb),
    RGBColor(0x63, 0x63, 0x63),
    RGBColor(0x96, 0x96, 0x96),
    RGBColor(0xbd, 0xbd, 0xbd),
    RGBColor(0xd9, 0xd9, 0xd9),
];

pub const TAB20B: [RGBColor; 20] = [
    RGBColor(0x39, 0x3b, 0x79),
    RGBColor(0x52, 0x54, 0xa3),
    RGBColor(0x6b, 0x6e, 0xcf),
    RGBColor(0x9c, 0x9e, 0xde),
    RGBColor(0x63, 0x79, 0x39),
    RGBColor(0x8c, 0xa2, 0x52),
    RGBColor(0xb5, 0xcf, 0x6b),
    RGBColor(0xce, 0xdb, 0x9c),
    RGBColor(0x8c, 0x6d, 0x31),
    RGBColor(0xbd, 0x9e, 0x39),
    RGBColor(0xe7, 0xba, 0x52),
    RGBColor(0xe7, 0xcb, 0x94),
    RGBColor(0x84, 0x3c, 0x39),
    RGBColor(0xad, 0x49, 0x4a),
    RGBColor(0xd6, 0x61, 0x6b),
    RGBColor(0xe7, 0x96, 0x9c),
    RGBColor(0x7b, 0x41, 0x73),
    RGBColor(0xa5, 0x51, 0x94),
    RGBColor(0xce, 0x6d, 0xbd),
    RGBColor(0xde, 0x9e, 0xd6),
];

/// Colors for `needed` distributions.
pub fn palette_for(needed: usize) -> Result<Vec<RGBColor>> {
    let mut colors = TAB20C.to_vec();
    if needed > TAB20C.len() {
        let extra = (needed - TAB20C.len()).min(TAB20B.len());
        colors.extend_from_slice(&TAB20B[TAB20B.len() - extra..]);
    }
    if needed > colors.len() {
        return Err(FigureError::PaletteExhaustion {
            needed,
            available: TAB20C.len() + TAB20B.len(),
        });
    }
    colors.truncate(needed);
    Ok(colors)
}

/// `distribution -> index`, fixed from encounter order.
#[derive(Clone, Debug, Default)]
pub struct ColorAssignment {
    order: Vec<String>,
    index: HashMap<String, usize>,
}

impl ColorAssignment {
    pub fn from_encounter_order<S: AsRef<str>>(distributions: &[S]) -> Self {
        let mut out = Self::default();
        for d in distributions {
            let d = d.as_ref();
            if !out.index.contains_key(d) {
                out.index.insert(d.to_string(), out.order.len());
                out.order.push(d.to_string());
            }
        }
        out
    }

    pub fn index_of(&self, distribution: &str) -> Option<usize> {
        self.index.get(distribution).copied()
    }

    pub fn distributions(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
