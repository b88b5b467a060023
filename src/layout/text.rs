use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::text_metrics;
use crate::theme::Theme;

use super::types::TextBlock;

/// Measures node labels for one layout call. Results are memoised by label text, so a label that
/// occurs on many nodes is measured once.
#[derive(Debug)]
pub struct LabelMeasurer<'t> {
    theme: &'t Theme,
    fast_metrics: bool,
    width_step: f32,
    line_height: f32,
    cache: HashMap<String, TextBlock>,
}

impl<'t> LabelMeasurer<'t> {
    pub fn new(theme: &'t Theme, config: &LayoutConfig) -> Self {
        Self {
            theme,
            fast_metrics: config.fast_text_metrics,
            width_step: config.label_width_step,
            line_height: config.line_height(theme),
            cache: HashMap::new(),
        }
    }

    pub fn measure(&mut self, label: &str) -> TextBlock {
        if let Some(block) = self.cache.get(label) {
            return block.clone();
        }
        let lines = split_lines(label);
        let widest = lines
            .iter()
            .map(|line| {
                round_up(
                    text_width(
                        line,
                        self.theme.font_size,
                        &self.theme.font_family,
                        self.fast_metrics,
                    ),
                    self.width_step,
                )
            })
            .fold(0.0, f32::max);
        let block = TextBlock {
            height: lines.len() as f32 * self.line_height,
            width: widest,
            lines,
        };
        self.cache.insert(label.to_string(), block.clone());
        block
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn cached_labels(&self) -> usize {
        self.cache.len()
    }
}

/// Label lines are separated by `\n` (or an HTML `<br>`). An empty label is one empty line.
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    text.replace("<br/>", "\n")
        .replace("<br>", "\n")
        .split('\n')
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

fn round_up(width: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return width.ceil();
    }
    (width / step).ceil() * step
}

pub(crate) fn text_width(text: &str, font_size: f32, font_family: &str, fast_metrics: bool) -> f32 {
    if text.is_empty() {
        return 0.0;
    }
    if fast_metrics && text.is_ascii() {
        return fallback_text_width(text, font_size);
    }
    text_metrics::measure_text_width(text, font_size, font_family)
        .unwrap_or_else(|| fallback_text_width(text, font_size))
}

fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

/// Approximate advance of `ch` in em units for a Helvetica-like sans-serif face.
fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.278,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '\'' => 0.278,
        '(' | ')' | '[' | ']' | '{' | '}' | '-' => 0.333,
        'i' | 'j' | 'l' => 0.222,
        'f' | 't' | 'I' => 0.278,
        'r' => 0.333,
        'm' => 0.833,
        'w' => 0.722,
        'M' => 0.833,
        'W' => 0.944,
        'A'..='Z' => 0.667,
        'a'..='z' => 0.556,
        '0'..='9' => 0.556,
        '@' => 1.015,
        '#' | '$' | '_' => 0.556,
        '%' => 0.889,
        '&' => 0.667,
        _ => 0.6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_handles_newlines_and_br_tags() {
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a<br/>b<br>c"), vec!["a", "b", "c"]);
        assert_eq!(split_lines(""), vec![""]);
    }

    #[test]
    fn widths_round_up_to_the_step() {
        assert_eq!(round_up(41.0, 10.0), 50.0);
        assert_eq!(round_up(40.0, 10.0), 40.0);
        assert_eq!(round_up(0.0, 10.0), 0.0);
    }

    #[test]
    fn fallback_width_scales_with_font_size() {
        let w10 = fallback_text_width("Hello", 10.0);
        let w20 = fallback_text_width("Hello", 20.0);
        assert!((w20 - w10 * 2.0).abs() < 0.01);
    }

    #[test]
    fn measurer_memoises_labels() {
        let theme = Theme::classic();
        let config = LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        };
        let mut measurer = LabelMeasurer::new(&theme, &config);
        let first = measurer.measure("Hello world");
        let second = measurer.measure("Hello world");
        measurer.measure("other");
        assert_eq!(first, second);
        assert_eq!(measurer.cached_labels(), 2);
        assert_eq!(first.width % 10.0, 0.0);
        assert!(first.width > 0.0);
    }

    #[test]
    fn block_height_counts_lines() {
        let theme = Theme::classic();
        let config = LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        };
        let mut measurer = LabelMeasurer::new(&theme, &config);
        let one = measurer.measure("x");
        let two = measurer.measure("x\ny");
        assert_eq!(two.lines.len(), 2);
        assert!((two.height - one.height - config.line_height(&theme)).abs() < 1e-4);
    }
}
