// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::{CategoryAggregate, fmt_pct, pct};
use comfy_table::{Cell, Color, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

pub const PALETTE: [&str; 8] = [
    "#7c3aed", "#06b6d4", "#10b981", "#f59e0b", "#ef4444", "#0ea5e9", "#a78bfa", "#f97316",
];

pub const EMPTY_PLACEHOLDER: &str = "No allocation yet";

const BAR_WIDTH: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub name: String,
    pub value: Decimal,
    pub color: &'static str,
    pub share_pct: Decimal,
}

pub fn segments(aggregates: &[CategoryAggregate]) -> Vec<Segment> {
    let total = aggregates
        .iter()
        .fold(Decimal::ZERO, |acc, a| acc.saturating_add(a.value()));
    aggregates
        .iter()
        .enumerate()
        .map(|(i, a)| Segment {
            name: a.category.label().to_string(),
            value: a.value(),
            color: PALETTE[i % PALETTE.len()],
            share_pct: pct(a.value(), total),
        })
        .collect()
}

fn hex_to_color(hex: &str) -> Option<Color> {
    let h = hex.strip_prefix('#')?;
    if h.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&h[0..2], 16).ok()?;
    let g = u8::from_str_radix(&h[2..4], 16).ok()?;
    let b = u8::from_str_radix(&h[4..6], 16).ok()?;
    Some(Color::Rgb { r, g, b })
}

fn bar(share_pct: Decimal) -> String {
    let filled = share_pct
        .min(Decimal::ONE_HUNDRED)
        .checked_mul(Decimal::from(BAR_WIDTH))
        .map(|d| d / Decimal::ONE_HUNDRED)
        .and_then(|d| d.round().to_usize())
        .unwrap_or(0)
        .min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Legend with proportional bars, or the placeholder when there is nothing to draw.
pub fn render(segments: &[Segment]) -> String {
    if segments.is_empty() {
        return EMPTY_PLACEHOLDER.to_string();
    }
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(["Category", "Value", "Share", ""].map(Cell::new));
    for s in segments {
        let swatch = match hex_to_color(s.color) {
            Some(c) => Cell::new(bar(s.share_pct)).fg(c),
            None => Cell::new(bar(s.share_pct)),
        };
        t.add_row(vec![
            Cell::new(&s.name),
            Cell::new(format!("₹{}", s.value.round_dp(2))),
            Cell::new(fmt_pct(s.share_pct)),
            swatch,
        ]);
    }
    t.to_string()
}
