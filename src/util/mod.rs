/// Prints a `[debug]` trace line to stderr when `$enabled` is true.
#[macro_export]
macro_rules! println_debug {
    ($enabled:expr, $($x:tt)*) => {{
        if $enabled {
            eprint!("[debug] ");
            eprintln!($($x)*);
        }
    }}
}

/// Reports a recoverable condition. Only visible in debug mode.
#[macro_export]
macro_rules! log_warning {
    ($enabled:expr, $row:expr, $($x:tt)*) => {{
        if $enabled {
            eprint!("[row {}] Warning: ", $row);
            eprintln!($($x)*);
        }
    }}
}

#[inline]
pub fn is_alphabetic(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
pub fn is_numeric(c: char) -> bool {
    c.is_ascii_digit()
}

#[inline]
pub fn is_alphanumeric(c: char) -> bool {
    is_alphabetic(c) || is_numeric(c)
}

/// Renders `rows` as a fixed-width table below a header line.
pub fn format_table(headers: [&str; 3], rows: &[[String; 3]]) -> String {
    const WIDTH: usize = 16;

    let mut out = String::new();
    let separator = "-".repeat(WIDTH * 3);

    out.push_str(&separator);
    out.push('\n');
    out.push_str(&format!("{:<w$}{:<w$}{}\n", headers[0], headers[1], headers[2], w = WIDTH));
    out.push_str(&separator);
    out.push('\n');

    for [name, kind, value] in rows {
        out.push_str(&format!("{:<w$}{:<w$}{}\n", name, kind, value, w = WIDTH));
    }

    out.push_str(&separator);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_classes() {
        assert!(is_alphabetic('_'));
        assert!(!is_alphabetic('$'));
        assert!(is_numeric('9'));
        assert!(!is_numeric(')'));
        assert!(is_alphanumeric('a'));
    }

    #[test]
    fn table_is_fixed_width() {
        let table = format_table(["name", "type", "value"], &[
            [String::from("x"), String::from("INT"), String::from("1")],
        ]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], format!("{:<16}{:<16}value", "name", "type"));
        assert_eq!(lines[3], format!("{:<16}{:<16}1", "x", "INT"));
    }
}
