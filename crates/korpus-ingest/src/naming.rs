// Filename normalization.
//
// Incoming documents arrive with names in any script; inside the corpus
// every filename is ASCII-safe: `[a-z0-9._-]` only. Normalization is
// deterministic and keeps the extension recognizable; it does not try
// to be unique — collision handling happens at placement time.

use std::borrow::Cow;

use deunicode::deunicode_char;
use percent_encoding::percent_decode_str;
use unicode_normalization::UnicodeNormalization;

/// Script-specific substitutions observed in the archive, checked before
/// the generic transliteration fallback. Keys are lowercase.
const TRANSLITERATIONS: &[(char, &str)] = &[
    ('á', "a"),
    ('à', "a"),
    ('ä', "a"),
    ('å', "ay-"),
    ('æ', "ae"),
    ('č', "c"),
    ('đ', "d"),
    ('é', "e"),
    ('è', "e"),
    ('ŋ', "n"),
    ('ö', "o"),
    ('ø', "o"),
    ('š', "s"),
    ('ŧ', "t"),
    ('ü', "u"),
    ('ž', "z"),
];

/// Turn an arbitrary original filename into an ASCII-safe corpus name.
///
/// Percent-escapes are decoded first (names often come off URLs), the
/// result is NFC-composed so combining marks hit the transliteration
/// table, then lower-cased, transliterated and scrubbed down to
/// `[a-z0-9._-]`. The final extension survives apart from case-folding.
pub fn normalize(original_name: &str) -> String {
    let decoded: Cow<'_, str> = percent_decode_str(original_name).decode_utf8_lossy();
    let composed: String = decoded.nfc().collect();

    let (stem, extension) = split_extension(&composed);
    let mut name = scrub(&transliterate(stem));
    while name.starts_with(['-', '_']) {
        name.remove(0);
    }
    if let Some(extension) = extension {
        name.push('.');
        name.push_str(&scrub(&transliterate(extension)));
    }
    name
}

/// Split off the text after the last `.`, if it looks like an extension.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < name.len() => (&name[..dot], Some(&name[dot + 1..])),
        _ => (name, None),
    }
}

/// Lower-case and map every character to an ASCII approximation.
/// Unmappable characters become `_`.
fn transliterate(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for ch in part.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii() {
            out.push(ch);
        } else if let Some(sub) = TRANSLITERATIONS
            .iter()
            .find_map(|(from, to)| (*from == ch).then_some(*to))
        {
            out.push_str(sub);
        } else if let Some(sub) = deunicode_char(ch) {
            for c in sub.chars().flat_map(char::to_lowercase) {
                out.push(c);
            }
        } else {
            out.push('_');
        }
    }
    out
}

/// Replace runs of characters outside `[a-z0-9._-]` with a single `_`.
fn scrub(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    let mut run = false;
    for ch in part.chars() {
        if matches!(ch, 'a'..='z' | '0'..='9' | '.' | '_' | '-') {
            if run {
                out.push('_');
                run = false;
            }
            out.push(ch);
        } else {
            run = true;
        }
    }
    if run {
        out.push('_');
    }
    out
}
