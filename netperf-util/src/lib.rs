// Copyright (c) Facebook, Inc. and its affiliates.
use chrono::{DateTime, Local};
use simplelog as sl;

pub mod json_file;

pub use json_file::{JsonArgs, JsonArgsHelper, JsonConfigFile, JsonLoad, JsonSave};

pub const TO_PCT: f64 = 100.0;

/// Placeholder shown in report cells whose value couldn't be computed.
pub const NA: &str = "n/a";

pub fn custom_underline(content: &str, line_char: &str) -> String {
    let nr_spaces = content.chars().take_while(|c| *c == ' ').count();
    let len = content.chars().count() - nr_spaces;
    format!(
        "{}\n{}{}\n",
        content,
        " ".repeat(nr_spaces),
        line_char.repeat(len)
    )
}

pub fn underline(content: &str) -> String {
    custom_underline(content, "-")
}

/// Centers `title` in a rule of dashes `width` characters wide. The title
/// is always surrounded by at least one dash and a space on each side.
pub fn format_banner(title: &str, width: usize) -> String {
    let title_len = title.chars().count() + 2;
    let dashes = width.saturating_sub(title_len).max(2);
    let left = dashes / 2;
    let right = dashes - left;
    format!("{} {} {}", "-".repeat(left), title, "-".repeat(right))
}

pub fn format_rule(width: usize) -> String {
    "-".repeat(width)
}

/// Truncates to at most `max` characters, never splitting a character.
pub fn truncate_str(input: &str, max: usize) -> &str {
    match input.char_indices().nth(max) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

pub fn format_bool(val: bool) -> &'static str {
    if val {
        "true"
    } else {
        "false"
    }
}

pub fn format_percentile(pct: &str) -> String {
    match pct.parse::<f64>() {
        Ok(pctf) => {
            if pctf == 0.0 {
                "min".to_string()
            } else if pctf == 100.0 {
                "max".to_string()
            } else {
                format!("p{}", pct)
            }
        }
        _ => pct.to_string(),
    }
}

/// Compact rendering of a measurement for the percentile tables, never
/// wider than five characters. Values past 9999t are shown as "INF".
pub fn format_value(val: f64) -> String {
    if val < 0.0 {
        return "NEG".into();
    } else if val == 0.0 {
        return "0".into();
    } else if val < 9.995 {
        return format!("{:.2}", val);
    } else if val < 99.95 {
        return format!("{:.1}", val);
    } else if val < 99999.5 {
        return format!("{:.0}", val);
    }

    let mut scaled = val;
    for suffix in &["k", "m", "g", "t"] {
        scaled /= 1000.0;
        if scaled < 99.95 {
            return format!("{:.1}{}", scaled, suffix);
        } else if scaled < 9999.5 {
            return format!("{:.0}{}", scaled, suffix);
        }
    }
    "INF".into()
}

pub fn format_time(at: &DateTime<Local>) -> String {
    at.format("%x %T").to_string()
}

pub fn format_period(start: &DateTime<Local>, end: &DateTime<Local>) -> String {
    format!(
        "{} - {} ({:.1}s)",
        format_time(start),
        format_time(end),
        (*end - *start).num_milliseconds() as f64 / 1000.0
    )
}

pub fn init_logging(verbosity: u32) {
    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
    } else {
        let sl_level = match verbosity {
            0 | 1 => sl::LevelFilter::Info,
            2 => sl::LevelFilter::Debug,
            _ => sl::LevelFilter::Trace,
        };
        let mut lcfg = sl::ConfigBuilder::new();
        lcfg.set_time_level(sl::LevelFilter::Off)
            .set_location_level(sl::LevelFilter::Off)
            .set_target_level(sl::LevelFilter::Off)
            .set_thread_level(sl::LevelFilter::Off);
        if !console::user_attended_stderr()
            || sl::TermLogger::init(
                sl_level,
                lcfg.build(),
                sl::TerminalMode::Stderr,
                sl::ColorChoice::Auto,
            )
            .is_err()
        {
            let _ = sl::SimpleLogger::init(sl_level, lcfg.build());
        }
    }
}
