use ferromath_syntax::{TokenKind, scan};

#[test]
fn test_unterminated_environment() {
    let input = r"\begin{align x = y";
    let tokens: Vec<_> = scan(input).collect();

    // Should not panic and should cover all text.
    let covered: usize = tokens.iter().map(|t| t.len).sum();
    assert_eq!(covered, input.len());
    assert_eq!(tokens[0].kind, TokenKind::Command("begin".to_string()));
}

#[test]
fn test_stray_closers_go_negative() {
    let mut scanner = scan(r"a } ) \right. \end{cases}");
    scanner.by_ref().for_each(drop);
    assert_eq!(scanner.depth(), -4);
}

#[test]
fn test_unclosed_groups_stay_positive() {
    let mut scanner = scan(r"\frac{a}{\left( b");
    scanner.by_ref().for_each(drop);
    assert_eq!(scanner.depth(), 3);
}

#[test]
fn test_tokens_are_contiguous() {
    let input = "f(x) = \\begin{cases} 1 & x>0 \\\\ 0 \\end{cases} % tail\n+ \\{y\\}_{\u{3b1}}";
    let mut expected = 0;
    for token in scan(input) {
        assert_eq!(token.position, expected);
        assert!(input.is_char_boundary(token.end()));
        expected = token.end();
    }
    assert_eq!(expected, input.len());
}

#[test]
fn test_rescan_starts_over() {
    let input = "{ {";
    let first: Vec<_> = scan(input).collect();
    let second: Vec<_> = scan(input).collect();
    assert_eq!(first, second);
}
