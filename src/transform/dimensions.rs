//! Output dimension policy per action.

use crate::models::Action;

/// Resolve the output size for `action`.
///
/// Zero targets are treated as absent. Every axis of the result is at least 1.
pub fn resolve(
    orig_width: u32,
    orig_height: u32,
    target_width: Option<u32>,
    target_height: Option<u32>,
    action: Action,
) -> (u32, u32) {
    let target_width = target_width.filter(|w| *w > 0);
    let target_height = target_height.filter(|h| *h > 0);

    let (width, height) = match action {
        Action::Resize => match (target_width, target_height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, scale(orig_height, w, orig_width)),
            (None, Some(h)) => (scale(orig_width, h, orig_height), h),
            (None, None) => (orig_width, orig_height),
        },
        Action::Compress => (shrink(orig_width), shrink(orig_height)),
        Action::Convert => (orig_width, orig_height),
    };

    (width.max(1), height.max(1))
}

/// `floor(value * 0.9)` in integer arithmetic.
fn shrink(value: u32) -> u32 {
    (u64::from(value) * 9 / 10) as u32
}

/// `round(value * numerator / denominator)`, halves rounding up.
fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return value;
    }
    let (value, numerator, denominator) = (
        u128::from(value),
        u128::from(numerator),
        u128::from(denominator),
    );
    let scaled = (2 * value * numerator + denominator) / (2 * denominator);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_width_only_keeps_aspect() {
        assert_eq!(resolve(1000, 500, Some(400), None, Action::Resize), (400, 200));
    }

    #[test]
    fn test_resize_height_only_keeps_aspect() {
        assert_eq!(resolve(1000, 500, None, Some(100), Action::Resize), (200, 100));
    }

    #[test]
    fn test_resize_both_verbatim() {
        assert_eq!(resolve(1000, 500, Some(10), Some(300), Action::Resize), (10, 300));
    }

    #[test]
    fn test_resize_neither_is_identity() {
        assert_eq!(resolve(640, 480, None, None, Action::Resize), (640, 480));
        assert_eq!(resolve(640, 480, Some(0), Some(0), Action::Resize), (640, 480));
    }

    #[test]
    fn test_resize_width_only_matches_rounding_rule() {
        for orig_width in [1u32, 3, 7, 100, 333, 1920] {
            for orig_height in [1u32, 2, 5, 99, 1080] {
                for target in [1u32, 2, 50, 401, 4000] {
                    let (w, h) = resolve(orig_width, orig_height, Some(target), None, Action::Resize);
                    let expected =
                        (orig_height as f64 * target as f64 / orig_width as f64).round() as u32;
                    assert_eq!(w, target);
                    assert_eq!(h, expected.max(1), "{}x{} -> {}", orig_width, orig_height, target);
                }
            }
        }
    }

    #[test]
    fn test_resize_never_produces_zero() {
        assert_eq!(resolve(10000, 1, Some(1), None, Action::Resize), (1, 1));
        assert_eq!(resolve(1, 10000, None, Some(1), Action::Resize), (1, 1));
    }

    #[test]
    fn test_compress_shrinks_by_ten_percent() {
        assert_eq!(resolve(1000, 500, None, None, Action::Compress), (900, 450));
        assert_eq!(resolve(11, 19, None, None, Action::Compress), (9, 17));
    }

    #[test]
    fn test_compress_ignores_targets() {
        assert_eq!(resolve(1000, 500, Some(10), Some(10), Action::Compress), (900, 450));
    }

    #[test]
    fn test_compress_clamps_to_one_pixel() {
        assert_eq!(resolve(1, 1, None, None, Action::Compress), (1, 1));
    }

    #[test]
    fn test_compress_matches_floor_rule() {
        for orig in [2u32, 10, 17, 255, 1023, 4096, u32::MAX] {
            let (w, h) = resolve(orig, orig, None, None, Action::Compress);
            let expected = ((orig as f64) * 0.9).floor() as u32;
            assert_eq!(w, expected.max(1));
            assert_eq!(h, expected.max(1));
        }
    }

    #[test]
    fn test_recompress_keeps_shrinking() {
        let first = resolve(1000, 1000, None, None, Action::Compress);
        let second = resolve(first.0, first.1, None, None, Action::Compress);
        assert_eq!(second, (810, 810));
    }

    #[test]
    fn test_convert_is_identity() {
        assert_eq!(resolve(123, 45, Some(10), Some(10), Action::Convert), (123, 45));
    }
}
