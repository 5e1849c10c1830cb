//! String utilities shared by the heuristic library and the mapper.
//!
//! Everything here is pure: token splitting, edit distance, common
//! prefix/suffix computation, and boundary-aware token replacement.

use once_cell::sync::Lazy;
use regex::Regex;

/// Splits a string-concatenation expression into its operand tokens.
pub static CONCAT_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\s)*(\+)(\s)*").expect("invalid concat split pattern"));

/// Splits a boolean expression on its conditional operators.
pub static CONDITIONAL_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\|\|)|(&&)|(\?)|(:)").expect("invalid conditional split pattern"));

/// Levenshtein distance between two strings, computed over chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut matrix = vec![vec![0usize; b_chars.len() + 1]; a_chars.len() + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b_chars.len() {
        matrix[0][j] = j;
    }

    for i in 1..=a_chars.len() {
        for j in 1..=b_chars.len() {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            matrix[i][j] = std::cmp::min(
                std::cmp::min(matrix[i - 1][j] + 1, matrix[i][j - 1] + 1),
                matrix[i - 1][j - 1] + cost,
            );
        }
    }

    matrix[a_chars.len()][b_chars.len()]
}

/// Edit distance normalized by the longer string's length, in [0, 1].
/// Identical strings score 0.0, fully different strings approach 1.0.
pub fn normalized_distance(a: &str, b: &str) -> f64 {
    let max_len = std::cmp::max(a.chars().count(), b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    edit_distance(a, b) as f64 / max_len as f64
}

/// Longest common prefix of two strings, as a char count.
pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// Longest common suffix of two strings, as a char count. Never overlaps
/// the common prefix.
pub fn common_suffix_len(a: &str, b: &str, prefix_len: usize) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let limit = std::cmp::min(a_chars.len(), b_chars.len()) - prefix_len;
    a_chars
        .iter()
        .rev()
        .zip(b_chars.iter().rev())
        .take(limit)
        .take_while(|(x, y)| x == y)
        .count()
}

/// The prefix shared by `a` and `b`.
pub fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = common_prefix_len(a, b);
    let byte_end = a
        .char_indices()
        .nth(len)
        .map(|(i, _)| i)
        .unwrap_or(a.len());
    &a[..byte_end]
}

/// The suffix shared by `a` and `b`, excluding anything already counted
/// in the common prefix.
pub fn common_suffix<'a>(a: &'a str, b: &str) -> &'a str {
    let prefix_len = common_prefix_len(a, b);
    let len = common_suffix_len(a, b, prefix_len);
    let total = a.chars().count();
    let byte_start = a
        .char_indices()
        .nth(total - len)
        .map(|(i, _)| i)
        .unwrap_or(a.len());
    &a[byte_start..]
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Replaces whole-token occurrences of `from` with `to`.
///
/// An occurrence only counts when it is not embedded in a longer
/// identifier, so replacing `x` inside `max` is not possible.
pub fn replace_token(text: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return text.to_string();
    }
    let mut result = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < text.len() {
        if text[i..].starts_with(from) {
            let before_ok = i == 0 || !is_ident_char(text[..i].chars().next_back().unwrap_or(' '));
            let end = i + from.len();
            let after_ok = end >= text.len() || !is_ident_char(text[end..].chars().next().unwrap_or(' '));
            // Only token boundaries count when the token itself is identifier-like.
            let from_is_ident = from.chars().all(is_ident_char);
            if !from_is_ident || (before_ok && after_ok) {
                result.push_str(to);
                i = end;
                continue;
            }
        }
        let ch_len = utf8_len(bytes[i]);
        result.push_str(&text[i..i + ch_len]);
        i += ch_len;
    }
    result
}

fn utf8_len(first_byte: u8) -> usize {
    match first_byte {
        b if b < 0x80 => 1,
        b if b >= 0xF0 => 4,
        b if b >= 0xE0 => 3,
        _ => 2,
    }
}

/// True when `token` occurs in `text` at identifier boundaries.
pub fn contains_token(text: &str, token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    let mut start = 0;
    while let Some(pos) = text[start..].find(token) {
        let abs = start + pos;
        let before_ok = abs == 0 || !is_ident_char(text[..abs].chars().next_back().unwrap_or(' '));
        let end = abs + token.len();
        let after_ok = end >= text.len() || !is_ident_char(text[end..].chars().next().unwrap_or(' '));
        if before_ok && after_ok {
            return true;
        }
        start = abs + token.len();
        if start >= text.len() {
            break;
        }
    }
    false
}

/// Splits an identifier on camel-case humps, underscores, and digits.
///
/// `getFullName` yields `["get", "Full", "Name"]`; `HTTPClient` yields
/// `["HTTP", "Client"]`; `max_value2` yields `["max", "value", "2"]`.
pub fn camel_case_tokens(name: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = name.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '$' {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            continue;
        }
        let boundary = if current.is_empty() {
            false
        } else if c.is_uppercase() {
            let prev = chars[i - 1];
            // Start of a new hump, or end of an acronym run (HTTPClient).
            !prev.is_uppercase() || chars.get(i + 1).is_some_and(|n| n.is_lowercase())
        } else if c.is_ascii_digit() {
            !chars[i - 1].is_ascii_digit()
        } else {
            chars[i - 1].is_ascii_digit()
        };
        if boundary {
            tokens.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Splits a concatenation expression into trimmed operand tokens.
pub fn concat_tokens(expression: &str) -> Vec<String> {
    CONCAT_SPLIT
        .split(expression)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits a boolean expression into trimmed sub-conditions.
pub fn conditional_tokens(expression: &str) -> Vec<String> {
    CONDITIONAL_SPLIT
        .split(expression)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extracts lower-cased words from free text, such as a log message.
pub fn extract_words(sentence: &str) -> Vec<String> {
    sentence
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Removes generic type arguments appearing after a dot, so that
/// `list.<String>stream()` compares equal to `list.stream()`.
pub fn strip_generics_after_dot(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '.' && chars.get(i + 1) == Some(&'<') {
            result.push('.');
            let mut depth = 0;
            let mut j = i + 1;
            while j < chars.len() {
                match chars[j] {
                    '<' => depth += 1,
                    '>' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                j += 1;
            }
            i = j + 1;
            continue;
        }
        result.push(chars[i]);
        i += 1;
    }
    result
}

/// Strips one layer of matched outer parentheses, repeatedly.
pub fn strip_parentheses(text: &str) -> &str {
    let mut current = text.trim();
    while current.starts_with('(') && current.ends_with(')') && balanced_without_outer(current) {
        current = current[1..current.len() - 1].trim();
    }
    current
}

fn balanced_without_outer(text: &str) -> bool {
    let mut depth = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 && i < text.len() - 1 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Splits a comma-separated argument list, respecting nesting depth of
/// parentheses, brackets, braces, angle brackets, and string literals.
/// A `<` only opens an angle level when it directly follows an
/// identifier character, so comparison operators inside an argument do
/// not swallow later commas.
pub fn split_arguments(list: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut angle = 0i32;
    let mut in_string = false;
    let mut in_char = false;
    let mut prev = '\0';
    for c in list.chars() {
        match c {
            '"' if !in_char && prev != '\\' => in_string = !in_string,
            '\'' if !in_string && prev != '\\' => in_char = !in_char,
            '(' | '[' | '{' if !in_string && !in_char => depth += 1,
            ')' | ']' | '}' if !in_string && !in_char => depth -= 1,
            '<' if !in_string && !in_char => {
                if prev.is_alphanumeric() || prev == '_' {
                    angle += 1;
                }
            }
            '>' if !in_string && !in_char => {
                if angle > 0 {
                    angle -= 1;
                }
            }
            ',' if depth == 0 && angle == 0 && !in_string && !in_char => {
                let trimmed = current.trim().to_string();
                if !trimmed.is_empty() {
                    args.push(trimmed);
                }
                current.clear();
                prev = c;
                continue;
            }
            _ => {}
        }
        current.push(c);
        prev = c;
    }
    let trimmed = current.trim().to_string();
    if !trimmed.is_empty() {
        args.push(trimmed);
    }
    args
}

/// Intersection size of two token lists treated as multisets.
pub fn multiset_intersection_size(a: &[String], b: &[String]) -> usize {
    let mut remaining: Vec<&String> = b.iter().collect();
    let mut count = 0;
    for token in a {
        if let Some(pos) = remaining.iter().position(|t| *t == token) {
            remaining.remove(pos);
            count += 1;
        }
    }
    count
}
