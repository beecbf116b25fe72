use unicode_segmentation::UnicodeSegmentation;

/// Lower-case, punctuation to spaces, whitespace collapsed, trimmed.
///
/// Works on grapheme clusters, so combining marks stay attached to the letter
/// they modify ("cafe\u{301}", Devanagari vowel signs). A cluster is kept when
/// its base character is alphanumeric.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;

    for grapheme in lowered.graphemes(true) {
        if grapheme.chars().next().is_some_and(char::is_alphanumeric) {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push_str(grapheme);
        } else {
            pending_space = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_collapses_whitespace() {
        assert_eq!(normalize("  Make   the\tThing\nWORK  "), "make the thing work");
    }

    #[test]
    fn punctuation_becomes_single_spaces() {
        assert_eq!(normalize("fix the error!!!"), "fix the error");
        assert_eq!(normalize("it doesn't work..."), "it doesn t work");
        assert_eq!(normalize("ui/ux -- asap?"), "ui ux asap");
    }

    #[test]
    fn keeps_non_latin_letters_and_digits() {
        assert_eq!(normalize("Исправь ошибку #42"), "исправь ошибку 42");
    }

    #[test]
    fn combining_marks_stay_with_their_letter() {
        assert_eq!(normalize("Cafe\u{301} menu!"), "cafe\u{301} menu");
        assert_eq!(normalize("हिन्दी पेज"), "हिन्दी पेज");
    }

    #[test]
    fn stray_marks_without_a_letter_are_dropped() {
        assert_eq!(normalize("\u{301} fix"), "fix");
    }

    #[test]
    fn punctuation_only_input_is_empty() {
        assert_eq!(normalize("?!... ---"), "");
        assert_eq!(normalize(""), "");
    }
}
