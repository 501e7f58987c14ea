use ratatui::style::Color;

/// Theme color names, their terminal color and an approximate RGB for contrast checks.
const NAMED: &[(&str, Color, (u8, u8, u8))] = &[
    ("black", Color::Black, (0, 0, 0)),
    ("red", Color::Red, (255, 0, 0)),
    ("green", Color::Green, (0, 255, 0)),
    ("yellow", Color::Yellow, (255, 255, 0)),
    ("blue", Color::Blue, (0, 0, 255)),
    ("magenta", Color::Magenta, (255, 0, 255)),
    ("cyan", Color::Cyan, (0, 255, 255)),
    ("white", Color::White, (255, 255, 255)),
    ("gray", Color::Gray, (128, 128, 128)),
    ("darkgray", Color::DarkGray, (64, 64, 64)),
    ("lightred", Color::LightRed, (255, 128, 128)),
    ("lightgreen", Color::LightGreen, (128, 255, 128)),
    ("lightyellow", Color::LightYellow, (255, 255, 128)),
    ("lightblue", Color::LightBlue, (128, 128, 255)),
    ("lightmagenta", Color::LightMagenta, (255, 128, 255)),
    ("lightcyan", Color::LightCyan, (128, 255, 255)),
];

/// Parse a theme color: a name from the table above ("grey" spellings accepted),
/// `#RRGGBB`, `#RGB` or `rgb(r, g, b)`. Anything else falls back to white.
pub fn parse_color(color_str: &str) -> Color {
    let s = color_str.trim().to_lowercase().replace("grey", "gray");
    let s = if s == "lightgray" { "gray".to_string() } else { s };

    if let Some((_, color, _)) = NAMED.iter().find(|(name, _, _)| *name == s) {
        return *color;
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex).unwrap_or(Color::White);
    }
    if let Some(body) = s.strip_prefix("rgb(").and_then(|rest| rest.strip_suffix(')')) {
        return parse_rgb_color(body).unwrap_or(Color::White);
    }
    Color::White
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    match hex.len() {
        6 => Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => {
            // #abc expands to #aabbcc
            let (r, g, b) = (channel(0..1)?, channel(1..2)?, channel(2..3)?);
            Some(Color::Rgb(r * 17, g * 17, b * 17))
        }
        _ => None,
    }
}

fn parse_rgb_color(body: &str) -> Option<Color> {
    let parts: Vec<u8> = body
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [r, g, b] => Some(Color::Rgb(*r, *g, *b)),
        _ => None,
    }
}

/// Theme-file spelling of a color; RGB colors become `#RRGGBB`.
pub fn format_color_for_display(color: &Color) -> String {
    if let Color::Rgb(r, g, b) = color {
        return format!("#{:02X}{:02X}{:02X}", r, g, b);
    }
    NAMED
        .iter()
        .find(|(_, named, _)| named == color)
        .map(|(name, _, _)| name.to_string())
        .unwrap_or_else(|| "reset".to_string())
}

/// WCAG relative luminance, 0.0 (dark) to 1.0 (light)
fn calculate_luminance(r: u8, g: u8, b: u8) -> f64 {
    let linear = |channel: u8| {
        let c = channel as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * linear(r) + 0.7152 * linear(g) + 0.0722 * linear(b)
}

/// Black or white text, whichever reads better on `background`.
/// Named colors use a fixed dark set since terminals render them differently.
pub fn get_contrast_text_color(background: Color) -> Color {
    let dark = match background {
        Color::Rgb(r, g, b) => calculate_luminance(r, g, b) < 0.5,
        other => matches!(other, Color::Black | Color::Blue | Color::Magenta | Color::Red),
    };
    if dark { Color::White } else { Color::Black }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_hex_and_rgb() {
        assert_eq!(parse_color(" DarkGrey "), Color::DarkGray);
        assert_eq!(parse_color("lightgray"), Color::Gray);
        assert_eq!(parse_color("#f0a"), Color::Rgb(255, 0, 170));
        assert_eq!(parse_color("#102030"), Color::Rgb(16, 32, 48));
        assert_eq!(parse_color("rgb(1, 2, 3)"), Color::Rgb(1, 2, 3));
        assert_eq!(parse_color("rgb(1,2)"), Color::White);
        assert_eq!(parse_color("chartreuse"), Color::White);
    }

    #[test]
    fn display_round_trips_theme_spellings() {
        assert_eq!(format_color_for_display(&Color::LightCyan), "lightcyan");
        assert_eq!(format_color_for_display(&Color::Rgb(255, 0, 170)), "#FF00AA");
        assert_eq!(format_color_for_display(&Color::Reset), "reset");
    }

    #[test]
    fn contrast_picks_readable_text() {
        assert_eq!(get_contrast_text_color(Color::Blue), Color::White);
        assert_eq!(get_contrast_text_color(Color::Yellow), Color::Black);
        assert_eq!(get_contrast_text_color(Color::Rgb(20, 20, 20)), Color::White);
        assert_eq!(get_contrast_text_color(Color::Rgb(240, 240, 240)), Color::Black);
    }
}
