// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.
//
// Grouped bar chart of AUC values, built on plotters' SVG backend.  There is one group per
// peptide (the AVERAGED group last) and, within each group, one bar per series.  A series is
// a configuration when charting one model, or a model when comparing models.
// The y axis is fixed to [0, 1.05] so that charts for different runs can be compared.

use crate::summary::{AucEntry, AVERAGED};
use itertools::Itertools;
use plotters::prelude::*;

// Bar colors for the first series; later ones draw from Palette99.

const BAR_COLORS: [(u8, u8, u8); 6] = [
    (249, 203, 182),
    (243, 171, 194),
    (215, 176, 210),
    (194, 186, 220),
    (163, 199, 235),
    (119, 203, 218),
];

fn bar_color(k: usize) -> RGBAColor {
    if k < BAR_COLORS.len() {
        let (r, g, b) = BAR_COLORS[k];
        RGBColor(r, g, b).to_rgba()
    } else {
        Palette99::pick(k).to_rgba()
    }
}

pub fn configuration_series(e: &AucEntry) -> &str {
    &e.configuration
}

pub fn model_series(e: &AucEntry) -> &str {
    &e.model
}

pub fn bar_chart(
    entries: &[AucEntry],
    series: fn(&AucEntry) -> &str,
    value: fn(&AucEntry) -> f64,
    title: &str,
    ylabel: &str,
    svg: &mut String,
) -> Result<(), String> {
    if entries.is_empty() {
        return Err(format!(
            "\nThe chart \"{}\" can't be drawn because there are no AUC values.\n",
            title
        ));
    }
    let groups = entries
        .iter()
        .map(|e| e.peptide.clone())
        .unique()
        .sorted_by_key(|p| p == AVERAGED)
        .collect::<Vec<String>>();
    let names = entries
        .iter()
        .map(|e| series(e).to_string())
        .unique()
        .collect::<Vec<String>>();
    let (n, m) = (groups.len(), names.len());

    // Geometry: the x axis is cut into slots.  Each group has a gap slot on either side and
    // two slots per bar, and its label sits on the middle slot.

    let slots = 2 * m + 2;
    let total = n * slots;
    let label_slot = |s: usize| {
        if s % slots == m && s / slots < n {
            Some(groups[s / slots].clone())
        } else {
            None
        }
    };
    let width = (160 + 40 * n * m).clamp(640, 2400) as u32;
    let height = 600;
    let font = "sans-serif";

    let root = SVGBackend::with_string(svg, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, (font, 24).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((0..total).into_segmented(), 0f64..1.05f64)
        .map_err(|e| e.to_string())?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(total)
        .label_style((font, 14).into_font())
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(s) => label_slot(*s).unwrap_or_default(),
            _ => String::new(),
        })
        .y_label_formatter(&|y| format!("{:.1}", y))
        .x_desc("peptide")
        .y_desc(ylabel)
        .draw()
        .map_err(|e| e.to_string())?;

    for (k, name) in names.iter().enumerate() {
        let color = bar_color(k);
        let mut bars = Vec::new();
        for (i, g) in groups.iter().enumerate() {
            if let Some(e) = entries
                .iter()
                .find(|e| &e.peptide == g && series(e) == name.as_str())
            {
                let x0 = i * slots + 1 + 2 * k;
                bars.push(Rectangle::new(
                    [
                        (SegmentValue::Exact(x0), 0.0),
                        (SegmentValue::Exact(x0 + 2), value(e).clamp(0.0, 1.05)),
                    ],
                    color.filled(),
                ));
            }
        }
        chart
            .draw_series(bars)
            .map_err(|e| e.to_string())?
            .label(name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((font, 12).into_font())
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| e.to_string())?;
    root.present().map_err(|e| e.to_string())?;
    Ok(())
}

pub fn auc_value(e: &AucEntry) -> f64 {
    e.auc
}

pub fn partial_auc_value(e: &AucEntry) -> f64 {
    e.auc_partial
}
