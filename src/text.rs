//! Word wrapping and ellipsis truncation against a pixel budget.
//!
//! Measurement is injected through [`TextMeasurer`] so the same code runs
//! against egui galleys at runtime and a fixed-advance measurer in tests.

const ELLIPSIS: &str = "...";

/// Typeface a piece of text is set in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontFace {
    Bold,
    Regular,
    /// Icon glyphs for buttons and the cover placeholder.
    Symbol,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSpec {
    pub face: FontFace,
    pub size: f32,
}

impl FontSpec {
    pub fn new(face: FontFace, size: f32) -> Self {
        Self { face, size }
    }

    pub fn bold(size: f32) -> Self {
        Self::new(FontFace::Bold, size)
    }

    pub fn regular(size: f32) -> Self {
        Self::new(FontFace::Regular, size)
    }

    pub fn symbol(size: f32) -> Self {
        Self::new(FontFace::Symbol, size)
    }
}

pub trait TextMeasurer {
    /// Advance width of `text` set in `font`, in pixels.
    fn text_width(&self, font: &FontSpec, text: &str) -> i32;

    /// Distance between consecutive baselines for `font`.
    fn line_height(&self, font: &FontSpec) -> i32;
}

/// Greedy word wrap. Words wider than `max_width` get a line of their own and
/// overflow it rather than being split.
pub fn wrap(
    measurer: &(impl TextMeasurer + ?Sized),
    font: &FontSpec,
    text: &str,
    max_width: i32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if measurer.text_width(font, &candidate) <= max_width {
            current = candidate;
        } else if current.is_empty() {
            lines.push(word.to_string());
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Shorten `text` to the longest prefix that still fits with a trailing
/// `"..."`.
///
/// Assumes width grows monotonically with prefix length. Only prefixes that
/// were measured to fit are ever kept, so shaping that breaks this can cost
/// characters but never width.
pub fn truncate_with_ellipsis(
    measurer: &(impl TextMeasurer + ?Sized),
    font: &FontSpec,
    text: &str,
    max_width: i32,
) -> String {
    if measurer.text_width(font, text) <= max_width {
        return text.to_string();
    }

    // Byte offsets of every character boundary, so prefixes never split a
    // multi-byte character.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(text.len()))
        .collect();

    let mut best: Option<String> = None;
    let (mut low, mut high) = (0_usize, boundaries.len() - 1);
    while low <= high {
        let mid = (low + high) / 2;
        let candidate = format!("{}{ELLIPSIS}", &text[..boundaries[mid]]);
        if measurer.text_width(font, &candidate) <= max_width {
            best = Some(candidate);
            low = mid + 1;
        } else if mid == 0 {
            break;
        } else {
            high = mid - 1;
        }
    }

    best.unwrap_or_else(|| ELLIPSIS.to_string())
}

/// Wrap to at most `max_lines`; when text is cut, the last visible line holds
/// all remaining words truncated with an ellipsis.
pub fn wrap_and_cap(
    measurer: &(impl TextMeasurer + ?Sized),
    font: &FontSpec,
    text: &str,
    max_width: i32,
    max_lines: usize,
) -> Vec<String> {
    if max_lines == 0 {
        return Vec::new();
    }

    let mut lines = wrap(measurer, font, text, max_width);
    if lines.len() > max_lines {
        let overflow = lines.split_off(max_lines - 1).join(" ");
        lines.push(truncate_with_ellipsis(measurer, font, &overflow, max_width));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MonospaceMeasurer;

    const FONT: FontSpec = FontSpec {
        face: FontFace::Regular,
        size: 48.0,
    };

    fn measurer() -> MonospaceMeasurer {
        MonospaceMeasurer::new(40)
    }

    #[test]
    fn test_wrap_scenario_two_lines() {
        let m = measurer();
        let width = m.text_width(&FONT, "Never Gonna");
        assert_eq!(
            wrap(&m, &FONT, "Never Gonna Give You Up", width),
            vec!["Never Gonna", "Give You Up"]
        );
    }

    #[test]
    fn test_wrap_empty_input() {
        assert!(wrap(&measurer(), &FONT, "", 500).is_empty());
        assert!(wrap(&measurer(), &FONT, "   \t ", 500).is_empty());
    }

    #[test]
    fn test_wrap_keeps_overlong_word_on_its_own_line() {
        let m = measurer();
        let lines = wrap(&m, &FONT, "a Supercalifragilistic b", 200);
        assert_eq!(lines, vec!["a", "Supercalifragilistic", "b"]);
    }

    #[test]
    fn test_wrap_reconstructs_normalized_text() {
        let m = measurer();
        let text = "  The   quick brown\tfox jumps over\nthe lazy dog  ";
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        for width in [200, 240, 400, 1000, 5000] {
            let lines = wrap(&m, &FONT, text, width);
            assert_eq!(lines.join(" "), normalized, "width {width}");
            for line in &lines {
                assert!(m.text_width(&FONT, line) <= width);
            }
        }
    }

    #[test]
    fn test_truncate_scenario() {
        let m = measurer();
        let width = m.text_width(&FONT, "Whenever You...");
        assert_eq!(
            truncate_with_ellipsis(&m, &FONT, "Whenever You Need Somebody", width),
            "Whenever You..."
        );
    }

    #[test]
    fn test_truncate_returns_fitting_text_unchanged() {
        let m = measurer();
        let text = "Rick Astley";
        let width = m.text_width(&FONT, text);
        assert_eq!(truncate_with_ellipsis(&m, &FONT, text, width), text);
        assert_eq!(truncate_with_ellipsis(&m, &FONT, text, width + 100), text);
    }

    #[test]
    fn test_truncate_never_exceeds_budget() {
        let m = measurer();
        let text = "Together Forever (Lew Reed Remix)";
        let ellipsis_width = m.text_width(&FONT, ELLIPSIS);
        for width in (ellipsis_width..m.text_width(&FONT, text) + 80).step_by(13) {
            let result = truncate_with_ellipsis(&m, &FONT, text, width);
            assert!(m.text_width(&FONT, &result) <= width, "width {width}: {result}");
        }
    }

    #[test]
    fn test_truncate_falls_back_to_bare_ellipsis() {
        let m = measurer();
        assert_eq!(truncate_with_ellipsis(&m, &FONT, "Whenever", 10), "...");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let m = measurer();
        let result = truncate_with_ellipsis(&m, &FONT, "Motörhead Überlänge", 280);
        assert_eq!(result, "Motö...");
    }

    #[test]
    fn test_wrap_and_cap_within_limit() {
        let m = measurer();
        let lines = wrap_and_cap(&m, &FONT, "Never Gonna Give You Up", 440, 2);
        assert_eq!(lines, vec!["Never Gonna", "Give You Up"]);
    }

    #[test]
    fn test_wrap_and_cap_truncates_last_line_with_overflow() {
        let m = measurer();
        let text = "Never Gonna Give You Up Never Gonna Let You Down";
        let lines = wrap_and_cap(&m, &FONT, text, 440, 2);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Never Gonna");
        assert_eq!(lines[1], "Give You...");
        assert!(m.text_width(&FONT, &lines[1]) <= 440);
    }

    #[test]
    fn test_wrap_and_cap_single_line() {
        let m = measurer();
        let lines = wrap_and_cap(&m, &FONT, "Whenever You Need Somebody", 600, 1);
        assert_eq!(lines, vec!["Whenever You..."]);
    }

    #[test]
    fn test_wrap_and_cap_zero_lines() {
        assert!(wrap_and_cap(&measurer(), &FONT, "anything", 600, 0).is_empty());
    }
}
