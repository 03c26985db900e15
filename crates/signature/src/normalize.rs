//! 소스 정규화 -- 언어별 주석 제거와 공백 축약
//!
//! 정규화 결과는 결정적이며 같은 입력에 대해 항상 같은 문자열을 반환합니다.
//! 문자열/문자 리터럴 내부는 그대로 보존합니다.
//!
//! 공백 규칙: 리터럴 밖의 공백 연속은 양쪽이 모두 식별자 문자이거나, 붙였을 때
//! 다른 연산자 토큰이 되는 두 연산자 문자(`+ +`, `> >=` 등) 사이에서만 공백 하나로
//! 남기고, 그 외에는 제거합니다. 따라서 `foo( a , b )`와 `foo(a,b)`는 같은 결과가 되지만
//! `a++ + b`와 `a + ++b`는 구분됩니다.

/// 공백 축약 출력 버퍼
#[derive(Default)]
struct Collapser {
    out: String,
    pending_space: bool,
}

impl Collapser {
    fn space(&mut self) {
        self.pending_space = true;
    }

    fn push_code(&mut self, c: char) {
        if c.is_whitespace() {
            self.pending_space = true;
            return;
        }
        if self.pending_space {
            if self
                .out
                .chars()
                .next_back()
                .is_some_and(|prev| needs_separator(prev, c))
            {
                self.out.push(' ');
            }
            self.pending_space = false;
        }
        self.out.push(c);
    }

    fn push_raw(&mut self, chars: &[char]) {
        self.out.extend(chars);
    }

    fn new_line(&mut self, depth: usize) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        for _ in 0..depth {
            self.out.push('\t');
        }
        self.pending_space = false;
    }

    fn finish(self) -> String {
        self.out
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// 붙이면 하나의 연산자(또는 주석 시작)로 읽히는 문자 쌍
const FUSING_PAIRS: [[char; 2]; 23] = [
    ['+', '+'], ['-', '-'], ['&', '&'], ['|', '|'], ['=', '='], ['!', '='],
    ['<', '='], ['>', '='], ['<', '<'], ['>', '>'], ['+', '='], ['-', '='],
    ['*', '='], ['/', '='], ['%', '='], ['&', '='], ['|', '='], ['^', '='],
    ['-', '>'], [':', ':'], [':', '='], ['*', '*'], ['/', '/'],
];

fn needs_separator(prev: char, next: char) -> bool {
    (is_word_char(prev) && is_word_char(next))
        || (prev == '/' && next == '*')
        || FUSING_PAIRS.contains(&[prev, next])
}

/// `from` 이후 처음 나오는 `c`의 위치
fn find_char(chars: &[char], from: usize, c: char) -> Option<usize> {
    chars
        .get(from..)?
        .iter()
        .position(|&ch| ch == c)
        .map(|p| from + p)
}

/// `from` 이후 처음 나오는 `seq`의 위치
fn find_seq(chars: &[char], from: usize, seq: &[char]) -> Option<usize> {
    if from > chars.len() {
        return None;
    }
    chars[from..]
        .windows(seq.len())
        .position(|w| w == seq)
        .map(|p| from + p)
}

/// `start`의 따옴표로 시작하는 한 줄 리터럴의 끝(닫는 따옴표 다음) 위치
///
/// 닫히지 않은 리터럴은 줄 끝에서 끝납니다.
fn quoted_end(chars: &[char], start: usize, quote: char) -> usize {
    let mut j = start + 1;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            '\n' => return j,
            c if c == quote => return j + 1,
            _ => j += 1,
        }
    }
    chars.len()
}

/// `start`의 삼중 따옴표 리터럴의 끝 위치
fn triple_quoted_end(chars: &[char], start: usize, quote: char) -> usize {
    let closing = [quote; 3];
    let mut j = start + 3;
    while j < chars.len() {
        if chars[j] == '\\' {
            j += 2;
        } else if chars[j..].starts_with(&closing) {
            return j + 3;
        } else {
            j += 1;
        }
    }
    chars.len()
}

fn is_triple(chars: &[char], i: usize, quote: char) -> bool {
    chars.get(i..i + 3).is_some_and(|w| w == [quote; 3])
}

/// Java 소스 본문을 정규화합니다.
///
/// `//`, `/* */` 주석을 제거하고(`strip_comments`가 참일 때) 공백을 축약합니다.
/// 문자열, 문자 리터럴, 텍스트 블록(`"""`) 내부는 보존합니다.
pub fn normalize_java(body: &str, strip_comments: bool) -> String {
    let chars: Vec<char> = body.chars().collect();
    let mut out = Collapser::default();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        let end = match (c, next) {
            ('/', Some('/')) => find_char(&chars, i, '\n').unwrap_or(chars.len()),
            ('/', Some('*')) => find_seq(&chars, i + 2, &['*', '/']).map_or(chars.len(), |p| p + 2),
            ('"', _) if is_triple(&chars, i, '"') => {
                let end = triple_quoted_end(&chars, i, '"');
                out.push_code(c);
                out.push_raw(&chars[i + 1..end]);
                i = end;
                continue;
            }
            ('"' | '\'', _) => {
                let end = quoted_end(&chars, i, c);
                out.push_code(c);
                out.push_raw(&chars[i + 1..end]);
                i = end;
                continue;
            }
            _ => {
                out.push_code(c);
                i += 1;
                continue;
            }
        };

        // 주석
        if strip_comments {
            out.space();
        } else {
            out.push_code(c);
            out.push_raw(&chars[i + 1..end]);
        }
        i = end;
    }

    out.finish()
}

/// Python 소스 본문을 정규화합니다.
///
/// `#` 주석과 빈 줄을 제거하고, 각 줄의 들여쓰기를 중첩 깊이(탭 문자 개수)로
/// 바꿉니다. 괄호 안의 줄바꿈과 `\` 줄 이음은 한 줄로 합칩니다.
/// 문자열 리터럴(삼중 따옴표 포함) 내부는 보존합니다.
pub fn normalize_python(body: &str, strip_comments: bool) -> String {
    let chars: Vec<char> = body.chars().collect();
    let mut out = Collapser::default();
    let mut indents: Vec<usize> = vec![0];
    let mut line_start = true;
    let mut indent = 0usize;
    let mut bracket_depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if line_start {
            match c {
                ' ' => {
                    indent += 1;
                    i += 1;
                    continue;
                }
                '\t' => {
                    indent += 8 - indent % 8;
                    i += 1;
                    continue;
                }
                '\n' | '\r' | '\x0c' => {
                    indent = 0;
                    i += 1;
                    continue;
                }
                '#' if strip_comments => {
                    i = find_char(&chars, i, '\n').unwrap_or(chars.len());
                    continue;
                }
                _ => {
                    line_start = false;
                    let depth = indent_depth(&mut indents, indent);
                    out.new_line(depth);
                }
            }
        }

        match c {
            '\n' => {
                if bracket_depth == 0 {
                    line_start = true;
                    indent = 0;
                } else {
                    out.space();
                }
                i += 1;
            }
            '\\' if matches!(chars.get(i + 1), Some('\n' | '\r')) => {
                // 줄 이음
                out.space();
                i = find_char(&chars, i, '\n').map_or(chars.len(), |p| p + 1);
            }
            '#' => {
                let end = find_char(&chars, i, '\n').unwrap_or(chars.len());
                if strip_comments {
                    out.space();
                } else {
                    out.push_code(c);
                    out.push_raw(&chars[i + 1..end]);
                }
                i = end;
            }
            '"' | '\'' => {
                let end = if is_triple(&chars, i, c) {
                    triple_quoted_end(&chars, i, c)
                } else {
                    quoted_end(&chars, i, c)
                };
                out.push_code(c);
                out.push_raw(&chars[i + 1..end]);
                i = end;
            }
            '(' | '[' | '{' => {
                bracket_depth += 1;
                out.push_code(c);
                i += 1;
            }
            ')' | ']' | '}' => {
                bracket_depth = bracket_depth.saturating_sub(1);
                out.push_code(c);
                i += 1;
            }
            _ => {
                out.push_code(c);
                i += 1;
            }
        }
    }

    out.finish()
}

/// 들여쓰기 폭을 중첩 깊이로 변환합니다.
fn indent_depth(indents: &mut Vec<usize>, indent: usize) -> usize {
    while indents.len() > 1 && indents.last().is_some_and(|&top| indent < top) {
        indents.pop();
    }
    if indents.last().is_some_and(|&top| indent > top) {
        indents.push(indent);
    }
    indents.len() - 1
}

/// 공백만 축약합니다 (주석 인식 없음).
pub fn collapse_whitespace(body: &str) -> String {
    let mut out = Collapser::default();
    for c in body.chars() {
        out.push_code(c);
    }
    out.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn java_strips_line_and_block_comments() {
        let body = "int x = 1; // one\n/* block\n comment */ return x;";
        assert_eq!(normalize_java(body, true), "int x=1;return x;");
    }

    #[test]
    fn java_comment_between_words_keeps_separator() {
        assert_eq!(normalize_java("return/* c */x;", true), "return x;");
    }

    #[test]
    fn java_keeps_comment_markers_inside_literals() {
        let body = r#"String s = "http://a/*b*/"; char c = '/';"#;
        assert_eq!(
            normalize_java(body, true),
            r#"String s="http://a/*b*/";char c='/';"#
        );
    }

    #[test]
    fn java_handles_escaped_quote() {
        let body = r#"s = "a\"//b"; // tail"#;
        assert_eq!(normalize_java(body, true), r#"s="a\"//b";"#);
    }

    #[test]
    fn java_text_block_is_preserved() {
        let body = "String q = \"\"\"\n  select * // not a comment\n\"\"\";";
        assert_eq!(
            normalize_java(body, true),
            "String q=\"\"\"\n  select * // not a comment\n\"\"\";"
        );
    }

    #[test]
    fn java_whitespace_layout_is_irrelevant() {
        let a = "public int add(int a, int b) {\n    return a + b;\n}";
        let b = "public int add( int a,int b ){ return a+b; }";
        assert_eq!(normalize_java(a, true), normalize_java(b, true));
    }

    #[test]
    fn java_operator_spacing_that_changes_tokens_is_kept() {
        let post = normalize_java("return a++ + b;", true);
        let pre = normalize_java("return a + ++b;", true);
        assert_eq!(post, "return a++ +b;");
        assert_eq!(pre, "return a+ ++b;");
        assert_ne!(post, pre);

        assert_eq!(normalize_java("x = a - -b;", true), "x=a- -b;");
        assert_eq!(normalize_java("if (a > >= b)", true), "if(a> >=b)");
    }

    #[test]
    fn java_operator_spacing_that_does_not_fuse_is_dropped() {
        assert_eq!(normalize_java("x = -1;", true), normalize_java("x=-1;", true));
        assert_eq!(normalize_java("a = b ? -c : d;", true), "a=b?-c:d;");
        assert_eq!(normalize_java("if (!done && n < -1)", true), "if(!done&&n<-1)");
    }

    #[test]
    fn java_keeps_comments_when_disabled() {
        let out = normalize_java("x = 1; // note", false);
        assert_eq!(out, "x=1;// note");
    }

    #[test]
    fn java_unterminated_block_comment_runs_to_end() {
        assert_eq!(normalize_java("a; /* open", true), "a;");
    }

    #[test]
    fn python_strips_comments_and_blank_lines() {
        let body = "def f(x):\n    # comment\n\n    return x  # trailing\n";
        assert_eq!(normalize_python(body, true), "def f(x):\n\treturn x");
    }

    #[test]
    fn python_indent_width_does_not_matter() {
        let two = "if a:\n  b()\n  if c:\n    d()\ne()";
        let four = "if a:\n    b()\n    if c:\n        d()\ne()";
        assert_eq!(normalize_python(two, true), normalize_python(four, true));
        assert_eq!(normalize_python(two, true), "if a:\n\tb()\n\tif c:\n\t\td()\ne()");
    }

    #[test]
    fn python_hash_inside_string_is_not_comment() {
        let body = "s = '#not'  # yes";
        assert_eq!(normalize_python(body, true), "s='#not'");
    }

    #[test]
    fn python_triple_quoted_string_spans_lines() {
        let body = "x = \"\"\"a\n# b\n\"\"\"\ny = 1";
        assert_eq!(normalize_python(body, true), "x=\"\"\"a\n# b\n\"\"\"\ny=1");
    }

    #[test]
    fn python_brackets_join_lines() {
        let body = "call(a,\n     b)\nz = 2";
        assert_eq!(normalize_python(body, true), "call(a,b)\nz=2");
    }

    #[test]
    fn python_backslash_continuation() {
        let body = "x = a + \\\n    b\ny = 1";
        assert_eq!(normalize_python(body, true), "x=a+b\ny=1");
    }

    #[test]
    fn python_keeps_comments_when_disabled() {
        assert_eq!(normalize_python("# head\nx = 1", false), "# head\nx=1");
    }

    #[test]
    fn normalization_is_idempotent() {
        let java = "class A { /* c */ void m() { return; } }";
        let once = normalize_java(java, true);
        assert_eq!(normalize_java(&once, true), once);

        let py = "def f():\n    return 1\n";
        let once = normalize_python(py, true);
        assert_eq!(normalize_python(&once, true), once);
    }

    #[test]
    fn collapse_whitespace_only() {
        assert_eq!(collapse_whitespace("  a   b\n\tc  "), "a b c");
        assert_eq!(collapse_whitespace("a = b"), "a=b");
        assert_eq!(collapse_whitespace("a * *b"), "a* *b");
    }
}
