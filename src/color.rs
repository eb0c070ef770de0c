use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Hue level → Color32
// ---------------------------------------------------------------------------

/// Colours for the levels of a hue column, in level order.
#[derive(Debug, Clone)]
pub struct HueColors {
    pub column: String,
    labels: Vec<String>,
    colors: Vec<Color32>,
    default_color: Color32,
}

impl HueColors {
    pub fn new(column: &str, labels: &[String]) -> Self {
        HueColors {
            column: column.to_string(),
            labels: labels.to_vec(),
            colors: generate_palette(labels.len()),
            default_color: Color32::GRAY,
        }
    }

    /// Colour of the level at `index`.
    pub fn color_at(&self, index: usize) -> Color32 {
        self.colors
            .get(index)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (level label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.labels
            .iter()
            .cloned()
            .zip(self.colors.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_distinct_colours() {
        let colors = generate_palette(4);
        assert_eq!(colors.len(), 4);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_level_falls_back_to_gray() {
        let hue = HueColors::new("city", &["A".to_string(), "B".to_string()]);
        assert_eq!(hue.legend_entries().len(), 2);
        assert_eq!(hue.color_at(1), hue.legend_entries()[1].1);
        assert_eq!(hue.color_at(5), Color32::GRAY);
    }
}
