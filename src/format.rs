use std::time::Duration;

/// Human-readable byte count: `512.0 B`, `1.5 KB`, … `2.0 TB`.
pub fn file_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} TB")
}

/// Human-readable duration: `250ms`, `2.50s`, `3m 4.0s`, `1h 2m`.
pub fn duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.2}s")
    } else if secs < 3600.0 {
        let minutes = (secs / 60.0).floor();
        format!("{}m {:.1}s", minutes as u64, secs - minutes * 60.0)
    } else {
        let hours = (secs / 3600.0).floor() as u64;
        let minutes = ((secs % 3600.0) / 60.0).floor() as u64;
        format!("{hours}h {minutes}m")
    }
}

/// Truncate `s` to at most `width` characters, marking the cut with `...`.
pub fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    if width <= 3 {
        return s.chars().take(width).collect();
    }
    let mut out: String = s.chars().take(width - 3).collect();
    out.push_str("...");
    out
}
