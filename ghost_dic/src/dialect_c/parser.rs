//! Entry parser: turns entry lines into functions, dropping crypt regions

use super::lexer::LineToken;
use super::DialectCError;
use crate::config::constants::compile_time::dialect_c::MAX_ALIASES_PER_ENTRY;
use crate::config::runtime::DialectCPreferences;
use crate::model::{DicFunction, Dialogue};
use crate::utils::split_unquoted;

/// One parsed `names : variants` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub line: usize,
    pub names: Vec<String>,
    pub variants: Vec<String>,
}

/// Parse entry lines, skipping those lexed inside a crypt region
pub fn parse_entries(
    tokens: &[LineToken<'_>],
    preferences: &DialectCPreferences,
) -> Result<Vec<Entry>, DialectCError> {
    let mut in_crypt = false;
    let mut entries = Vec::new();

    for token in tokens {
        match *token {
            LineToken::CryptStart { .. } => in_crypt = true,
            LineToken::CryptEnd { .. } => in_crypt = false,
            LineToken::Entry { .. } if in_crypt => {}
            LineToken::Entry { line, text, colon } => {
                if let Some(entry) = parse_entry(line, text, colon, preferences)? {
                    entries.push(entry);
                }
            }
        }
    }

    Ok(entries)
}

fn parse_entry(
    line: usize,
    text: &str,
    colon: usize,
    preferences: &DialectCPreferences,
) -> Result<Option<Entry>, DialectCError> {
    let (name_segment, body_segment) = (&text[..colon], &text[colon + 1..]);

    let names: Vec<String> = split_unquoted(name_segment, ',')
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    if names.is_empty() {
        return Ok(None);
    }
    if names.len() > MAX_ALIASES_PER_ENTRY {
        return Err(DialectCError::TooManyAliases {
            line,
            count: names.len(),
            limit: MAX_ALIASES_PER_ENTRY,
        });
    }

    let variants = split_unquoted(body_segment, ',')
        .into_iter()
        .map(str::trim)
        .map(|variant| {
            if preferences.strip_variant_quotes {
                strip_enclosing_quotes(variant)
            } else {
                variant
            }
        })
        .filter(|variant| !variant.is_empty())
        .map(str::to_string)
        .collect();

    Ok(Some(Entry {
        line,
        names,
        variants,
    }))
}

fn strip_enclosing_quotes(variant: &str) -> &str {
    if variant.len() >= 2 && variant.starts_with('"') && variant.ends_with('"') {
        &variant[1..variant.len() - 1]
    } else {
        variant
    }
}

/// One function per alias, all sharing the entry's dialogues
pub fn build_functions(file_path: &str, entries: Vec<Entry>) -> Vec<DicFunction> {
    let mut functions = Vec::new();

    for entry in entries {
        let dialogues: Vec<Dialogue> = entry
            .variants
            .iter()
            .map(|variant| Dialogue::on_line(variant.as_str(), entry.line))
            .collect();

        for name in entry.names {
            functions.push(DicFunction::new(
                name,
                file_path,
                entry.line,
                entry.line,
                dialogues.clone(),
            ));
        }
    }

    functions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect_c::lexer::lex;
    use assert_matches::assert_matches;

    fn entries(source: &str) -> Vec<Entry> {
        let preferences = DialectCPreferences::default();
        parse_entries(&lex(source, &preferences), &preferences).unwrap()
    }

    #[test]
    fn test_aliases_share_variants() {
        let parsed = entries("a, b : 1, 2");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].names, vec!["a", "b"]);
        assert_eq!(parsed[0].variants, vec!["1", "2"]);
    }

    #[test]
    fn test_quoted_variant_keeps_commas() {
        let parsed = entries(r#"word : "hello, world", plain , "" , """#);
        assert_eq!(parsed[0].variants, vec!["hello, world", "plain", "", "\""]);
    }

    #[test]
    fn test_empty_quoted_variant_dropped() {
        let parsed = entries(r#"w : "", hi, "#);
        assert_eq!(parsed[0].variants, vec!["hi"]);

        let preferences = DialectCPreferences {
            strip_variant_quotes: false,
            ..DialectCPreferences::default()
        };
        let kept = parse_entries(&lex(r#"w : "", hi"#, &preferences), &preferences).unwrap();
        assert_eq!(kept[0].variants, vec![r#""""#, "hi"]);
    }

    #[test]
    fn test_empty_names_dropped() {
        assert!(entries(" , : orphan").is_empty());
    }

    #[test]
    fn test_colon_in_body_kept() {
        let parsed = entries("time : 12:30");
        assert_eq!(parsed[0].variants, vec!["12:30"]);
    }

    #[test]
    fn test_too_many_aliases() {
        let names = vec!["n"; MAX_ALIASES_PER_ENTRY + 1].join(",");
        let source = format!("{} : v", names);
        let preferences = DialectCPreferences::default();
        let result = parse_entries(&lex(&source, &preferences), &preferences);
        assert_matches!(result, Err(DialectCError::TooManyAliases { line: 0, .. }));
    }

    #[test]
    fn test_functions_per_alias() {
        let functions = build_functions("a.txt", entries("x,y : hi"));
        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].dialogues, functions[1].dialogues);
        assert_eq!(functions[1].name, "y");
        assert_eq!(functions[1].file_path, "a.txt");
    }
}
