//! Helpers for hosts that feed source text to the interpreter

/// Remove `#` comments
///
/// A `#` inside a string literal is kept. Line structure is preserved so parse error offsets
/// still point into the right line.
pub fn strip_comments(input: &str) -> String {
    let mut stripped = String::with_capacity(input.len());
    for line in input.split('\n') {
        let mut in_string = false;
        for c in line.chars() {
            if c == '"' {
                in_string = !in_string;
            } else if c == '#' && !in_string {
                // Rest of the line is a comment
                break;
            }

            stripped.push(c);
        }

        stripped.push('\n');
    }

    // Remove extra newline
    stripped.pop();

    stripped
}

/// Whether `input` is an unfinished statement: a trailing `\`, or an unclosed `{`, `(` or `[`
pub fn needs_more_input(input: &str) -> bool {
    if input.trim_end().ends_with('\\') {
        return true;
    }

    let mut depth: i64 = 0;
    let mut in_string = false;
    for c in strip_comments(input).chars() {
        match c {
            '"' => in_string = !in_string,
            '{' | '(' | '[' if !in_string => depth += 1,
            '}' | ')' | ']' if !in_string => depth -= 1,
            _ => (),
        }
    }

    // Unbalanced the other way is a syntax error, let the parser report it
    depth > 0 || in_string
}

/// Fixup input so the parser is happy
///
/// Removes the multiline escape (`\` followed by a newline)
pub fn fixup_input(input: &str) -> String {
    input.replace("\\\n", "\n")
}

#[test]
fn test_strip_comments() {
    let data = vec![
        (r#"asdf"#, r#"asdf"#),
        (r#"asdf #comment"#, r#"asdf "#),
        (r#"asdf#comment"#, r#"asdf"#),
        (r#""string#notcomment""#, r#""string#notcomment""#),
        ("x = 1 # one\ny = 2", "x = 1 \ny = 2"),
        ("# header\nদেখাও(1)", "\nদেখাও(1)"),
    ];

    for (input, expected) in data {
        assert_eq!(strip_comments(input), expected);
    }
}

#[test]
fn test_needs_more_input() {
    let data = vec![
        ("দেখাও(1)", false),
        ("ফাংশন f() {", true),
        ("ফাংশন f() {\n রিটার্ন 1\n}", false),
        ("যদি(x < 1) { দেখাও(\"}\")", true),
        ("x = [1 +", true),
        ("x = 1 + \\", true),
        ("x = \"open", true),
        ("} }", false),
        ("x = 1 # {", false),
    ];

    for (input, expected) in data {
        assert_eq!(needs_more_input(input), expected, "input: {}", input);
    }
}

#[test]
fn test_fixup_input() {
    assert_eq!(fixup_input("x = 1 + \\\n2"), "x = 1 + \n2");
    assert_eq!(fixup_input("asdf \\ \nme"), "asdf \\ \nme");
    assert_eq!(fixup_input("দেখাও(1)"), "দেখাও(1)");
}
