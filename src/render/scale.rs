//! Horizontal axis transforms for bound diagrams.
//!
//! Charts are drawn in transformed coordinates; tick labels are mapped back
//! with `inverse`. The data itself is never altered.

use serde::{Deserialize, Serialize};

use crate::load::bounds::{BoundRow, StageKind};

const BASE: f64 = 10.0;
const LINSCALE: f64 = 1.0;
const MAX_TICKS: usize = 9;

/// Which stages take part in the log / symlog decision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleProbe {
    /// Reference, CDF and SF lower bounds; the DDF stage is not inspected.
    #[default]
    WithoutDdf,
    AllStages,
}

impl ScaleProbe {
    pub fn stages(self) -> &'static [StageKind] {
        match self {
            ScaleProbe::WithoutDdf => &[StageKind::Reference, StageKind::Cdf, StageKind::Sf],
            ScaleProbe::AllStages => &StageKind::ALL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisScale {
    Log,
    /// Linear within `linthresh` of zero, log10 outside.
    SymLog { linthresh: f64 },
}

impl AxisScale {
    fn linscale_adj() -> f64 {
        LINSCALE / (1.0 - 1.0 / BASE)
    }

    /// Screen-space position of `x`, or `None` when the scale cannot place it.
    pub fn forward(&self, x: f64) -> Option<f64> {
        if !x.is_finite() {
            return None;
        }
        match *self {
            AxisScale::Log => (x > 0.0).then(|| x.log10()),
            AxisScale::SymLog { linthresh } => {
                let adj = Self::linscale_adj();
                let abs = x.abs();
                Some(if abs > linthresh {
                    x.signum() * linthresh * (adj + (abs / linthresh).log10())
                } else {
                    x * adj
                })
            }
        }
    }

    pub fn inverse(&self, t: f64) -> f64 {
        match *self {
            AxisScale::Log => BASE.powf(t),
            AxisScale::SymLog { linthresh } => {
                let adj = Self::linscale_adj();
                let abs = t.abs();
                if abs > linthresh * adj {
                    t.signum() * linthresh * BASE.powf(abs / linthresh - adj)
                } else {
                    t / adj
                }
            }
        }
    }

    pub fn is_symlog(&self) -> bool {
        matches!(self, AxisScale::SymLog { .. })
    }

    /// Tick values (in data space) at powers of ten inside `[lo, hi]`,
    /// plus zero for symlog. Wide ranges keep every n-th decade so at most
    /// nine ticks remain.
    pub fn ticks(&self, lo: f64, hi: f64) -> Vec<f64> {
        if !(lo.is_finite() && hi.is_finite()) || lo > hi {
            return Vec::new();
        }
        let mut out = Vec::new();
        let decades = |a: f64, b: f64| -> Vec<f64> {
            if b <= 0.0 {
                return Vec::new();
            }
            let a = a.max(f64::MIN_POSITIVE);
            let k0 = a.log10().ceil() as i32;
            let k1 = b.log10().floor() as i32;
            (k0..=k1).map(|k| BASE.powi(k)).collect()
        };
        match *self {
            AxisScale::Log => out.extend(decades(lo, hi)),
            AxisScale::SymLog { linthresh } => {
                if lo < 0.0 {
                    let neg = decades(linthresh.max(-hi), -lo);
                    out.extend(neg.into_iter().rev().map(|v| -v));
                }
                if lo <= 0.0 && hi >= 0.0 {
                    out.push(0.0);
                }
                if hi > 0.0 {
                    out.extend(decades(linthresh.max(lo), hi));
                }
            }
        }
        thin_decades(out)
    }
}

/// Keeps zero and the decades whose exponent is a multiple of the smallest
/// stride that fits `MAX_TICKS`.
fn thin_decades(ticks: Vec<f64>) -> Vec<f64> {
    let mut stride = 1i32;
    loop {
        let kept: Vec<f64> = ticks
            .iter()
            .copied()
            .filter(|v| *v == 0.0 || (v.abs().log10().round() as i32).rem_euclid(stride) == 0)
            .collect();
        if kept.len() <= MAX_TICKS || stride as usize >= ticks.len() {
            return kept;
        }
        stride += 1;
    }
}

/// Pure log unless an inspected stage has a lower bound `<= 0`.
pub fn select_scale(row: &BoundRow, probe: ScaleProbe, linthresh: f64) -> AxisScale {
    let needs_symlog = probe
        .stages()
        .iter()
        .any(|kind| row.stage(*kind).interval.lo <= 0.0);
    if needs_symlog {
        AxisScale::SymLog { linthresh }
    } else {
        AxisScale::Log
    }
}
