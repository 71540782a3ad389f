#![no_main]
use ferromath_core::{LocatorConfig, MathSession, compute_jump_points, locate_math_region};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Panic freedom on arbitrary, mostly broken, LaTeX.
    // The first byte picks the cursor; the rest is the document.
    let Some((&cursor, rest)) = data.split_first() else {
        return;
    };
    let text = String::from_utf8_lossy(rest);
    let offset = (cursor as usize * text.len()) / 255;

    let _ = ferromath_syntax::scan(&text).count();
    let _ = ferromath_core::build_reference_graph(&text);

    let config = LocatorConfig::default();
    if let Some(region) = locate_math_region(&text, offset, &config) {
        assert!(region.start_offset <= offset && offset <= region.end_offset);
        let points = compute_jump_points(&region.text);
        assert!(points.windows(2).all(|w| w[0] < w[1]));
    }

    let mut session = MathSession::default();
    let _ = session.split_equation(&text);
    let _ = session.split_at(&text, offset);
    let _ = session.next_structural_position(&text, offset);
    let _ = session.previous_structural_position(&text, offset);
    let _ = session.on_character_inserted(&text, offset);
});
