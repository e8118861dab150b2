use regex::Regex;

use crate::geom::PxSize;

fn leading_int_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid regex"))
}

fn leading_number_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+))").expect("valid regex"))
}

fn img_width_placeholder_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\{\{img_width\}\}").expect("valid regex"))
}

fn img_height_placeholder_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\{\{img_height\}\}").expect("valid regex"))
}

/// Base-10 integer prefix of `input`, the way `parseInt(input, 10)` reads it: leading
/// whitespace is skipped and anything after the digits is ignored.
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let caps = leading_int_regex().captures(input)?;
    caps.get(1)?.as_str().parse::<i64>().ok()
}

/// Numeric prefix of a CSS length such as `120px` or `12.5`, rounded to whole pixels.
pub fn parse_px_prefix(input: &str) -> Option<i64> {
    let caps = leading_number_regex().captures(input)?;
    let value = caps.get(1)?.as_str().parse::<f64>().ok()?;
    value.is_finite().then(|| value.round() as i64)
}

/// Value of `property` in an inline `style` attribute, last declaration wins.
pub fn inline_style_value<'a>(style: &'a str, property: &str) -> Option<&'a str> {
    style
        .split(';')
        .rev()
        .filter_map(|decl| decl.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case(property))
        .map(|(_, value)| value.trim())
}

pub fn has_size_placeholder(template: &str) -> bool {
    img_width_placeholder_regex().is_match(template)
        || img_height_placeholder_regex().is_match(template)
}

/// Replaces every `{{img_width}}` / `{{img_height}}` token (case-insensitive) with the
/// image size in pixels.
pub fn substitute_size_placeholders(template: &str, size: PxSize) -> String {
    let width = size.width.to_string();
    let height = size.height.to_string();
    let out = img_width_placeholder_regex().replace_all(template, width.as_str());
    img_height_placeholder_regex()
        .replace_all(&out, height.as_str())
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::size;

    #[test]
    fn int_prefix_follows_parse_int() {
        assert_eq!(parse_int_prefix("42"), Some(42));
        assert_eq!(parse_int_prefix(" 7"), Some(7));
        assert_eq!(parse_int_prefix("-3"), Some(-3));
        assert_eq!(parse_int_prefix("10px"), Some(10));
        assert_eq!(parse_int_prefix("12.9"), Some(12));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
    }

    #[test]
    fn px_prefix_rounds() {
        assert_eq!(parse_px_prefix("120px"), Some(120));
        assert_eq!(parse_px_prefix(" 12.5px"), Some(13));
        assert_eq!(parse_px_prefix("auto"), None);
    }

    #[test]
    fn inline_style_lookup() {
        let style = "display:block; WIDTH: 30px;width:40px ; height :12px";
        assert_eq!(inline_style_value(style, "width"), Some("40px"));
        assert_eq!(inline_style_value(style, "height"), Some("12px"));
        assert_eq!(inline_style_value(style, "top"), None);
    }

    #[test]
    fn placeholders_are_replaced_everywhere() {
        let t = "w:{{img_width}}px; h:{{IMG_HEIGHT}}px; again {{img_width}}";
        assert!(has_size_placeholder(t));
        assert_eq!(
            substitute_size_placeholders(t, size(300, 200)),
            "w:300px; h:200px; again 300"
        );
        assert!(!has_size_placeholder("<div></div>"));
    }
}
