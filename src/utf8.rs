//! UTF-8 판별 모듈
//!
//! 바이트 버퍼가 이미 UTF-8인지 판단합니다. BOM 검사가 먼저 수행되고,
//! BOM이 없을 때만 전체 유효성 검사를 수행합니다.

/// UTF-8 BOM (Byte Order Mark)
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// 연속 바이트 범위 (10xxxxxx)
const CONT_MIN: u8 = 0x80;
const CONT_MAX: u8 = 0xBF;

#[inline]
fn in_range(byte: u8, min: u8, max: u8) -> bool {
    (min..=max).contains(&byte)
}

/// 버퍼가 UTF-8 BOM (`EF BB BF`)으로 시작하는지 확인
///
/// # Examples
/// ```
/// use utf8ify::utf8::has_utf8_bom;
///
/// assert!(has_utf8_bom(&[0xEF, 0xBB, 0xBF, b'a']));
/// assert!(!has_utf8_bom(b"abc"));
/// ```
pub fn has_utf8_bom(buffer: &[u8]) -> bool {
    buffer.starts_with(&UTF8_BOM)
}

/// 바이트 버퍼가 유효한 UTF-8 인지 검사
///
/// 선행 바이트 종류에 따라 연속 바이트 개수와 범위를 확인하는 단일 전진 패스입니다.
/// 잘못된 바이트를 만나면 즉시 `false`를 반환합니다.
///
/// - `0xC0`, `0xC1` 선행 바이트는 overlong 이므로 항상 무효
/// - `0xE0` 다음 바이트는 `A0..=BF`, `0xED` 다음 바이트는 `80..=9F` (서로게이트 제외)
/// - `0xF0` 다음 바이트는 `90..=BF`, `0xF4` 다음 바이트는 `80..=8F` (U+10FFFF 초과 제외)
///
/// # Examples
/// ```
/// use utf8ify::utf8::is_valid_utf8;
///
/// assert!(is_valid_utf8("안녕하세요".as_bytes()));
/// assert!(!is_valid_utf8(&[0xC0, 0x80]));
/// ```
pub fn is_valid_utf8(buffer: &[u8]) -> bool {
    let len = buffer.len();
    let mut i = 0;

    while i < len {
        let lead = buffer[i];

        // 단일 바이트 ASCII
        if lead <= 0x7F {
            i += 1;
            continue;
        }

        let (width, first_min, first_max) = match lead {
            0xC2..=0xDF => (2, CONT_MIN, CONT_MAX),
            0xE0 => (3, 0xA0, CONT_MAX),
            0xED => (3, CONT_MIN, 0x9F),
            0xE1..=0xEF => (3, CONT_MIN, CONT_MAX),
            0xF0 => (4, 0x90, CONT_MAX),
            0xF4 => (4, CONT_MIN, 0x8F),
            0xF1..=0xF3 => (4, CONT_MIN, CONT_MAX),
            // 0x80..=0xC1, 0xF5..=0xFF
            _ => return false,
        };

        if i + width > len {
            return false;
        }

        if !in_range(buffer[i + 1], first_min, first_max) {
            return false;
        }

        if !buffer[i + 2..i + width]
            .iter()
            .all(|&b| in_range(b, CONT_MIN, CONT_MAX))
        {
            return false;
        }

        i += width;
    }

    true
}

/// 버퍼를 이미 UTF-8 로 취급할 수 있는지 판정
///
/// BOM이 있으면 나머지 내용과 무관하게 UTF-8 로 간주합니다.
pub fn is_utf8(buffer: &[u8]) -> bool {
    has_utf8_bom(buffer) || is_valid_utf8(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_is_valid() {
        let all_ascii: Vec<u8> = (0x00..=0x7F).collect();
        assert!(is_valid_utf8(&all_ascii));
        assert!(is_valid_utf8(b""));
    }

    #[test]
    fn test_two_byte_sequences() {
        for lead in 0xC2..=0xDFu8 {
            for cont in 0x00..=0xFFu8 {
                let expected = (0x80..=0xBF).contains(&cont);
                assert_eq!(is_valid_utf8(&[lead, cont]), expected, "{lead:02X} {cont:02X}");
            }
        }
    }

    #[test]
    fn test_overlong_two_byte_leads() {
        for cont in 0x00..=0xFFu8 {
            assert!(!is_valid_utf8(&[0xC0, cont]));
            assert!(!is_valid_utf8(&[0xC1, cont]));
        }
    }

    #[test]
    fn test_three_byte_special_cases() {
        // E0: overlong 제외
        assert!(!is_valid_utf8(&[0xE0, 0x80, 0x80]));
        assert!(!is_valid_utf8(&[0xE0, 0x9F, 0xBF]));
        assert!(is_valid_utf8(&[0xE0, 0xA0, 0x80]));

        // ED: 서로게이트 제외
        for second in 0xA0..=0xBFu8 {
            assert!(!is_valid_utf8(&[0xED, second, 0x80]));
        }
        for second in 0x80..=0x9Fu8 {
            assert!(is_valid_utf8(&[0xED, second, 0x80]));
        }

        assert!(is_valid_utf8("한".as_bytes()));
        assert!(!is_valid_utf8(&[0xE1, 0x80, 0x7F]));
    }

    #[test]
    fn test_four_byte_special_cases() {
        assert!(!is_valid_utf8(&[0xF0, 0x8F, 0xBF, 0xBF]));
        assert!(is_valid_utf8(&[0xF0, 0x90, 0x80, 0x80]));

        for second in 0x90..=0xBFu8 {
            assert!(!is_valid_utf8(&[0xF4, second, 0x80, 0x80]));
        }
        assert!(is_valid_utf8(&[0xF4, 0x8F, 0xBF, 0xBF]));

        assert!(is_valid_utf8("😀".as_bytes()));
        assert!(!is_valid_utf8(&[0xF5, 0x80, 0x80, 0x80]));
    }

    #[test]
    fn test_truncated_sequences() {
        assert!(!is_valid_utf8(&[0xC3]));
        assert!(!is_valid_utf8(&[0xE4, 0xB8]));
        assert!(!is_valid_utf8(&[0xF0, 0x9F, 0x98]));
        assert!(!is_valid_utf8(&[b'a', b'b', 0xE4]));
    }

    #[test]
    fn test_stray_continuation_byte() {
        assert!(!is_valid_utf8(&[0x80]));
        assert!(!is_valid_utf8(&[b'a', 0xBF, b'b']));
    }

    #[test]
    fn test_agrees_with_std() {
        let samples: [&[u8]; 6] = [
            "混合 text ✓ 😀".as_bytes(),
            &[0xA4, 0xA4, 0xA4, 0xE5],
            &[0xED, 0xA0, 0x80],
            &[0xF4, 0x90, 0x80, 0x80],
            &[0xEF, 0xBF, 0xBF],
            &[0xE2, 0x82],
        ];
        for sample in samples {
            assert_eq!(is_valid_utf8(sample), std::str::from_utf8(sample).is_ok());
        }
    }

    #[test]
    fn test_bom_trusted_without_validation() {
        let with_bom = [0xEF, 0xBB, 0xBF, 0xFF, 0xFE];
        assert!(has_utf8_bom(&with_bom));
        assert!(!is_valid_utf8(&with_bom[3..]));
        assert!(is_utf8(&with_bom));

        assert!(!has_utf8_bom(&[0xEF, 0xBB]));
        assert!(!is_utf8(&[0xA4, 0xA4]));
    }
}
