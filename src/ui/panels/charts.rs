// LogPulse - ui/panels/charts.rs
//
// Level bar chart and level share (pie) chart.
// Both draw the same `ChartDatum` array with the egui painter.

use crate::core::stats::{shares, ChartDatum};
use egui::{Color32, Pos2, Rect, Sense, Shape, Stroke};
use std::f32::consts::TAU;

/// Largest arc covered by one pie triangle; keeps slices smooth.
const PIE_SEGMENT_RADIANS: f32 = 0.08;

fn colour(datum: &ChartDatum) -> Color32 {
    let [r, g, b] = datum.color;
    Color32::from_rgb(r, g, b)
}

/// Vertical bars, one per datum, scaled to the largest count.
pub fn bar_chart(ui: &mut egui::Ui, data: &[ChartDatum], size: egui::Vec2) {
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    let text_colour = ui.visuals().text_color();

    let max = data.iter().map(|d| d.count).max().unwrap_or(0).max(1);
    let label_h = 16.0;
    let plot = Rect::from_min_max(rect.min, Pos2::new(rect.max.x, rect.max.y - label_h));
    let slot = plot.width() / data.len().max(1) as f32;
    let bar_w = slot * 0.6;

    for (i, datum) in data.iter().enumerate() {
        let h = plot.height() * (datum.count as f32 / max as f32);
        let x = plot.min.x + slot * i as f32 + (slot - bar_w) / 2.0;
        let bar = Rect::from_min_max(Pos2::new(x, plot.max.y - h), Pos2::new(x + bar_w, plot.max.y));
        painter.rect_filled(bar, 2.0, colour(datum));

        let centre_x = x + bar_w / 2.0;
        painter.text(
            Pos2::new(centre_x, (plot.max.y - h - 2.0).max(plot.min.y + 10.0)),
            egui::Align2::CENTER_BOTTOM,
            datum.count.to_string(),
            egui::FontId::proportional(11.0),
            text_colour,
        );
        painter.text(
            Pos2::new(centre_x, rect.max.y),
            egui::Align2::CENTER_BOTTOM,
            datum.name,
            egui::FontId::proportional(11.0),
            text_colour,
        );
    }
}

/// Pie of each datum's share of the total, with a legend on the right.
pub fn pie_chart(ui: &mut egui::Ui, data: &[ChartDatum], size: egui::Vec2) {
    let fractions = shares(data);
    ui.horizontal(|ui| {
        let diameter = size.y.min(size.x * 0.6);
        let (rect, _) = ui.allocate_exact_size(egui::vec2(diameter, diameter), Sense::hover());
        let painter = ui.painter_at(rect);
        let centre = rect.center();
        let radius = diameter / 2.0 - 2.0;

        if fractions.iter().all(|f| *f == 0.0) {
            painter.circle_stroke(centre, radius, Stroke::new(1.0, ui.visuals().weak_text_color()));
        } else {
            let mut start = -TAU / 4.0;
            for (datum, fraction) in data.iter().zip(&fractions) {
                let sweep = fraction * TAU;
                for shape in slice_shapes(centre, radius, start, sweep, colour(datum)) {
                    painter.add(shape);
                }
                start += sweep;
            }
        }

        ui.vertical(|ui| {
            for (datum, fraction) in data.iter().zip(&fractions) {
                ui.horizontal(|ui| {
                    let (swatch, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), Sense::hover());
                    ui.painter().rect_filled(swatch, 2.0, colour(datum));
                    ui.label(format!("{} {:.0}%", datum.name, fraction * 100.0));
                });
            }
        });
    });
}

/// Triangles approximating one pie slice.
fn slice_shapes(centre: Pos2, radius: f32, start: f32, sweep: f32, fill: Color32) -> Vec<Shape> {
    if sweep <= 0.0 {
        return Vec::new();
    }
    let segments = (sweep / PIE_SEGMENT_RADIANS).ceil().max(1.0) as usize;
    let step = sweep / segments as f32;
    let point = |angle: f32| centre + radius * egui::vec2(angle.cos(), angle.sin());
    (0..segments)
        .map(|i| {
            let a0 = start + step * i as f32;
            Shape::convex_polygon(vec![centre, point(a0), point(a0 + step)], fill, Stroke::NONE)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_circle_is_split_into_small_segments() {
        let shapes = slice_shapes(Pos2::ZERO, 10.0, 0.0, TAU, Color32::RED);
        assert_eq!(shapes.len(), (TAU / PIE_SEGMENT_RADIANS).ceil() as usize);
    }

    #[test]
    fn test_empty_slice_draws_nothing() {
        assert!(slice_shapes(Pos2::ZERO, 10.0, 0.0, 0.0, Color32::RED).is_empty());
    }
}
