use super::*;

fn locate(text: &str, offset: usize) -> Option<MathRegion> {
    locate_math_region(text, offset, &LocatorConfig::default())
}

fn region_text(text: &str, offset: usize) -> Option<String> {
    locate(text, offset).map(|r| r.text)
}

#[test]
fn test_inline_dollar() {
    let text = "Let $x + y$ be given.";
    let region = locate(text, 6).unwrap();
    assert_eq!(region.text, "$x + y$");
    assert_eq!(region.kind, RegionKind::InlineDollar);
    assert_eq!(&text[region.start_offset..region.end_offset], region.text);
}

#[test]
fn test_bounds_are_inclusive() {
    let text = "a $x$ b";
    assert_eq!(region_text(text, 2).as_deref(), Some("$x$"));
    assert_eq!(region_text(text, 5).as_deref(), Some("$x$"));
    assert_eq!(region_text(text, 1), None);
    assert_eq!(region_text(text, 6), None);
}

#[test]
fn test_display_dollar_preferred_over_inline() {
    let text = "$$a = b$$";
    let region = locate(text, 4).unwrap();
    assert_eq!(region.text, text);
    assert_eq!(region.kind, RegionKind::DisplayDollar);
}

#[test]
fn test_bracket_and_paren() {
    let text = r"\[ x^2 \] and \( y \)";
    assert_eq!(region_text(text, 3).as_deref(), Some(r"\[ x^2 \]"));
    let region = locate(text, 17).unwrap();
    assert_eq!(region.text, r"\( y \)");
    assert_eq!(region.kind, RegionKind::InlineParen);
}

#[test]
fn test_every_offset_in_span_finds_region() {
    let text = r"before \[ \frac{a}{b} \] after";
    let start = text.find(r"\[").unwrap();
    let end = text.find(r"\]").unwrap() + 2;
    for offset in start..=end {
        assert_eq!(
            region_text(text, offset).as_deref(),
            Some(r"\[ \frac{a}{b} \]"),
            "offset {}",
            offset
        );
    }
}

#[test]
fn test_whitelisted_environment() {
    let text = "x \\begin{align*}\n a &= b\n\\end{align*} y";
    let region = locate(text, 20).unwrap();
    assert_eq!(region.text, "\\begin{align*}\n a &= b\n\\end{align*}");
    assert_eq!(region.kind, RegionKind::Environment("align*".to_string()));
    assert_eq!(region.content(), "\n a &= b\n");
}

#[test]
fn test_unlisted_environment_needs_arbitrary_names() {
    let text = r"\begin{cases} a \end{cases}";
    assert_eq!(locate(text, 14), None);

    let region = locate_math_region(text, 14, &LocatorConfig::any_environment()).unwrap();
    assert_eq!(region.text, text);
}

#[test]
fn test_same_named_environments_nest() {
    let config = LocatorConfig::any_environment();
    let text = r"\begin{array} \begin{array} a \end{array} b \end{array}";
    let region = locate_math_region(text, 44, &config).unwrap();
    assert_eq!(region.text, text);
}

#[test]
fn test_outer_region_wins_over_nested_math() {
    let text = r"\begin{equation} x = \text{$y$} \end{equation}";
    let region = locate(text, 28).unwrap();
    assert_eq!(region.kind, RegionKind::Environment("equation".to_string()));
}

#[test]
fn test_escaped_dollar_is_not_a_delimiter() {
    let text = r"costs \$5 and $x$";
    assert_eq!(locate(text, 8), None);
    assert_eq!(region_text(text, 15).as_deref(), Some("$x$"));
}

#[test]
fn test_escaped_dollar_inside_math() {
    let text = r"$a \$ b$";
    assert_eq!(region_text(text, 3).as_deref(), Some(text));
}

#[test]
fn test_row_break_is_not_a_bracket() {
    let text = r"\begin{align} a \\[2pt] b \end{align}";
    let region = locate(text, 18).unwrap();
    assert_eq!(region.text, text);
}

#[test]
fn test_comments_hide_delimiters() {
    let text = "% $not math$\n$x$";
    assert_eq!(locate(text, 4), None);
    assert_eq!(region_text(text, 14).as_deref(), Some("$x$"));
}

#[test]
fn test_unterminated_regions() {
    assert_eq!(locate("$x + y", 2), None);
    assert_eq!(locate(r"\[ x", 2), None);
    assert_eq!(locate(r"\begin{equation} x", 17), None);
}

#[test]
fn test_empty_content_does_not_match() {
    // `$$` followed by `x$` is not display math; the second `$` opens inline math.
    let text = "$$x$";
    let region = locate(text, 2).unwrap();
    assert_eq!(region.text, "$x$");
    assert_eq!(region.start_offset, 1);
}

#[test]
fn test_offset_past_end() {
    assert_eq!(locate("$x$", 4), None);
}

#[test]
fn test_consecutive_regions() {
    let text = "$a$ and $b$";
    assert_eq!(region_text(text, 1).as_deref(), Some("$a$"));
    assert_eq!(region_text(text, 9).as_deref(), Some("$b$"));
    assert_eq!(region_text(text, 5), None);
}

#[test]
fn test_window_finds_nearby_region() {
    let filler = "lorem ipsum dolor sit amet\n".repeat(1000);
    let text = format!("{filler}\n\nthen $z = 1$ end\n\n{filler}");
    let offset = text.find("z =").unwrap();
    let config = LocatorConfig {
        window: 100,
        ..LocatorConfig::default()
    };
    let region = locate_math_region(&text, offset, &config).unwrap();
    assert_eq!(region.text, "$z = 1$");
}

#[test]
fn test_window_falls_back_for_large_regions() {
    let body = "a + ".repeat(200);
    let filler = "x\n".repeat(500);
    let text = format!("{filler}\\[{body}b\\]{filler}");
    let offset = text.find(r"\[").unwrap() + 10;
    let config = LocatorConfig {
        window: 50,
        ..LocatorConfig::default()
    };
    let region = locate_math_region(&text, offset, &config).unwrap();
    assert_eq!(region.text, format!("\\[{body}b\\]"));
    assert_eq!(
        Some(region),
        locate_math_region(&text, offset, &LocatorConfig { window: 0, ..config })
    );
}

#[test]
fn test_window_edge_inside_closing_display_dollar() {
    let filler = "x".repeat(1000);
    let text = format!("{filler}$${}b$${filler}", "a + ".repeat(20));
    let close = text.rfind("$$").unwrap();
    let config = LocatorConfig {
        window: 50,
        ..LocatorConfig::default()
    };
    // The window ends between the two `$` of the closer.
    let region = locate_math_region(&text, close + 1 - 50, &config).unwrap();
    assert_eq!(region.kind, RegionKind::DisplayDollar);
    assert_eq!((region.start_offset, region.end_offset), (1000, 1085));
}

fn assert_window_agrees_with_full_scan(text: &str, window: usize) {
    let windowed = LocatorConfig {
        window,
        ..LocatorConfig::default()
    };
    let unbounded = LocatorConfig {
        window: 0,
        ..LocatorConfig::default()
    };
    for offset in 0..=text.len() {
        assert_eq!(
            locate_math_region(text, offset, &windowed),
            locate_math_region(text, offset, &unbounded),
            "offset {offset}"
        );
    }
}

#[test]
fn test_window_never_changes_the_result() {
    let filler = "x".repeat(1000);
    let body = "a + ".repeat(20);
    for region in [
        format!("$${body}b$$"),
        format!(r"\[{body}b\]"),
        format!(r"\({body}b\)"),
        format!(r"\begin{{align}}{body}b\end{{align}}"),
        format!("${body}b$ and $c$"),
        format!("$${body}b % $$ hidden\n$$"),
    ] {
        let text = format!("{filler}{region}{filler}");
        assert_window_agrees_with_full_scan(&text, 50);
    }
}

#[test]
fn test_window_on_multi_byte_text() {
    let filler = "αβγ ".repeat(300);
    let text = format!("{filler}$ω$ {filler}");
    let offset = text.find('ω').unwrap();
    let config = LocatorConfig {
        window: 7,
        ..LocatorConfig::default()
    };
    let region = locate_math_region(&text, offset, &config).unwrap();
    assert_eq!(region.text, "$ω$");
}

#[test]
fn test_paragraph_start() {
    let text = "one\n\ntwo\nthree";
    assert_eq!(paragraph_start(text, text.len()), 5);
    assert_eq!(paragraph_start(text, 3), 0);
}
