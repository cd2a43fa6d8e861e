use super::types::Token;

/// Split a message into tokens.
///
/// Words are separated by whitespace. A word starting with `"` or `'` runs to
/// the matching quote and is marked `quoted`; an unterminated quote swallows
/// the rest of the input. `$(...)` spans inside unquoted words are kept
/// verbatim in `content` (whitespace included) and their bodies recorded in
/// `inters`.
pub fn tokenize(input: &str) -> Vec<Token> {
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < len {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }

        let mut content = String::new();
        let mut inters = Vec::new();
        let quoted = chars[i] == '"' || chars[i] == '\'';

        if quoted {
            let quote = chars[i];
            i += 1;
            while i < len && chars[i] != quote {
                content.push(chars[i]);
                i += 1;
            }
            // skip closing quote
            if i < len {
                i += 1;
            }
        } else {
            while i < len && !chars[i].is_whitespace() {
                if chars[i] == '$' && i + 1 < len && chars[i + 1] == '(' {
                    let (span, inner, next) = interpolation(&chars, i);
                    content.push_str(&span);
                    inters.push(inner);
                    i = next;
                    continue;
                }
                content.push(chars[i]);
                i += 1;
            }
        }

        let terminator = match chars.get(i) {
            Some(c) if c.is_whitespace() => c.to_string(),
            _ => String::new(),
        };

        tokens.push(Token {
            content,
            quoted,
            terminator,
            inters,
        });
    }

    tokens
}

/// Read a balanced `$(...)` span starting at `start`.
/// Returns the literal span, its body, and the index just past it.
fn interpolation(chars: &[char], start: usize) -> (String, String, usize) {
    let mut depth: u32 = 1;
    let mut inner = String::new();
    let mut i = start + 2;
    while i < chars.len() {
        match chars[i] {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
        inner.push(chars[i]);
        i += 1;
    }
    // step over the closing paren when present
    let end = (i + 1).min(chars.len());
    let span: String = chars[start..end].iter().collect();
    (span, inner, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(input: &str) -> Vec<String> {
        tokenize(input).into_iter().map(|t| t.content).collect()
    }

    #[test]
    fn tokenize_simple() {
        assert_eq!(contents("zab foo bar"), vec!["zab", "foo", "bar"]);
    }

    #[test]
    fn tokenize_collapses_whitespace() {
        assert_eq!(contents("  zab \t  foo  "), vec!["zab", "foo"]);
    }

    #[test]
    fn tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn tokenize_quoted() {
        let tokens = tokenize("echo 'hello world' \"a b\"");
        assert_eq!(tokens[1].content, "hello world");
        assert!(tokens[1].quoted);
        assert_eq!(tokens[2].content, "a b");
        assert!(tokens[2].quoted);
        assert!(!tokens[0].quoted);
    }

    #[test]
    fn tokenize_unterminated_quote_takes_rest() {
        let tokens = tokenize("say \"never closed");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].content, "never closed");
    }

    #[test]
    fn tokenize_terminators() {
        let tokens = tokenize("a b");
        assert_eq!(tokens[0].terminator, " ");
        assert_eq!(tokens[1].terminator, "");
    }

    #[test]
    fn tokenize_interpolation() {
        let tokens = tokenize("echo $(roll 1 d6)x next");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].content, "$(roll 1 d6)x");
        assert_eq!(tokens[1].inters, vec!["roll 1 d6"]);
    }

    #[test]
    fn tokenize_nested_interpolation() {
        let tokens = tokenize("$(a $(b))");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].inters, vec!["a $(b)"]);
    }
}
