//! Small shared helpers: text measuring, price formatting, durations, and
//! best-effort clipboard access.
use std::io::Write;
use std::process::{Command, Stdio};

/// Truncate `s` to at most `max_width` terminal cells, appending `…` when
/// anything was cut. Width-aware so CJK names don't overflow their column.
pub fn ellipsize(s: &str, max_width: usize) -> String {
    use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0usize;
    for ch in s.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Render an optional price as `$129.99`, or `n/a` when unknown.
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(v) => format!("${v:.2}"),
        None => "n/a".to_string(),
    }
}

/// Compact human form of a duration: `42s`, `5m`, `3h`, `2d`.
pub fn human_age(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86_400)
    }
}

/// Pipe `payload` into the first available clipboard tool.
///
/// Wayland sessions try `wl-copy` first, everything else prefers `xclip`.
/// Returns a user-facing guidance message when no tool is installed.
pub fn copy_to_clipboard(payload: &str) -> Result<(), String> {
    let wayland = std::env::var("WAYLAND_DISPLAY").is_ok();
    let candidates: [(&str, &[&str]); 2] = if wayland {
        [("wl-copy", &[]), ("xclip", &["-selection", "clipboard"])]
    } else {
        [("xclip", &["-selection", "clipboard"]), ("wl-copy", &[])]
    };
    for (program, args) in candidates {
        if which::which(program).is_err() {
            continue;
        }
        let spawned = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(mut child) => {
                if let Some(mut sin) = child.stdin.take() {
                    let _ = sin.write_all(payload.as_bytes());
                }
                let _ = child.wait();
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(program, error = %e, "clipboard tool failed to start");
            }
        }
    }
    Err(if wayland {
        "Clipboard tool not found. Install 'wl-clipboard' (provides wl-copy) or 'xclip'.".into()
    } else {
        "Clipboard tool not found. Install 'xclip' or 'wl-clipboard' (wl-copy).".into()
    })
}
