//! POSIX-shell quoting for process arguments.
//!
//! Arguments are always handed to the OS as a real argument vector; nothing
//! here is ever passed to a shell. The quoted rendering is what gets logged,
//! so an audit line can be pasted into a terminal and mean exactly the argv
//! that ran.

/// Quote one argument so a POSIX shell would read it back as a single word.
pub fn quote(arg: &str) -> String {
    if !arg.is_empty() && arg.chars().all(is_plain) {
        return arg.to_string();
    }
    let mut out = String::with_capacity(arg.len() + 2);
    out.push('\'');
    for c in arg.chars() {
        if c == '\'' {
            out.push_str(r"'\''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}

/// Render `command` and `args` as one quoted command line.
pub fn render_command_line<S: AsRef<str>>(command: &str, args: &[S]) -> String {
    std::iter::once(quote(command))
        .chain(args.iter().map(|a| quote(a.as_ref())))
        .collect::<Vec<_>>()
        .join(" ")
}

/// NUL cannot be carried in an argv entry.
pub fn has_nul(arg: &str) -> bool {
    arg.contains('\0')
}

fn is_plain(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ',' | ':' | '=' | '+' | '@' | '%')
}
