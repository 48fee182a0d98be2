//! Message templates with positional arguments.
//!
//! `{}` takes the next argument, `{N}` takes argument `N`, `{{` and `}}`
//! are literal braces. A placeholder without an argument renders as
//! `{!missing}`; arguments no placeholder used are appended as
//! ` {!extra: a, b}` so nothing the caller passed is silently lost.

use super::loggable::Loggable;

/// Positional template argument.
pub type Arg<'a> = &'a dyn Loggable;

/// Append `template` with its placeholders substituted.
pub fn format_into(buf: &mut String, template: &str, args: &[Arg<'_>]) {
    let mut used = vec![false; args.len()];
    let mut next = 0usize;
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        buf.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") {
            buf.push('{');
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with("}}") {
            buf.push('}');
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            buf.push('}');
            rest = &tail[1..];
            continue;
        }

        let Some(close) = tail.find('}') else {
            buf.push_str(tail);
            return;
        };
        let spec = &tail[1..close];
        let index = if spec.is_empty() {
            let i = next;
            next += 1;
            Some(i)
        } else {
            spec.trim().parse::<usize>().ok()
        };

        match index {
            Some(i) if i < args.len() => {
                used[i] = true;
                args[i].write_body(buf);
            }
            Some(_) => buf.push_str("{!missing}"),
            // Not a placeholder; keep it verbatim.
            None => buf.push_str(&tail[..=close]),
        }
        rest = &tail[close + 1..];
    }
    buf.push_str(rest);

    let mut extras = args
        .iter()
        .zip(&used)
        .filter(|(_, used)| !**used)
        .map(|(arg, _)| *arg)
        .peekable();
    if extras.peek().is_some() {
        buf.push_str(" {!extra: ");
        for (i, arg) in extras.enumerate() {
            if i > 0 {
                buf.push_str(", ");
            }
            arg.write_body(buf);
        }
        buf.push('}');
    }
}

/// Substitute `args` into `template`.
pub fn format(template: &str, args: &[Arg<'_>]) -> String {
    let mut buf = String::with_capacity(template.len() + 16 * args.len());
    format_into(&mut buf, template, args);
    buf
}
