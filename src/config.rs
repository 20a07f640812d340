//! Run configuration and the optional user settings file.
//!
//! A [`RunConfig`] is fixed before a run starts and never mutated during it.
//! Defaults can be adjusted system-wide through `<config_home>/bfrun.toml`;
//! command-line flags override the file.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use cross_xdg::BaseDirs;
use nu_ansi_term::Color;

use crate::theme::catppuccin::Macchiato as P;

/// Tape cells allocated when nothing else is configured.
pub const DEFAULT_TAPE_LENGTH: usize = 30_000;

/// Options fixing one run: tape size and the cosmetic per-step delay.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub tape_length: usize,
    pub step_delay: Option<Duration>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tape_length: DEFAULT_TAPE_LENGTH,
            step_delay: None,
        }
    }
}

impl RunConfig {
    pub fn with_tape_length(mut self, tape_length: usize) -> Self {
        self.tape_length = tape_length;
        self
    }

    pub fn with_step_delay(mut self, step_delay: Option<Duration>) -> Self {
        self.step_delay = step_delay;
        self
    }
}

/// Per-instruction styling for the REPL highlighter.
#[derive(Debug, Clone)]
pub struct Palette {
    pub op_right: Color,   // '>'
    pub op_left: Color,    // '<'
    pub op_inc: Color,     // '+'
    pub op_dec: Color,     // '-'
    pub op_output: Color,  // '.'
    pub op_input: Color,   // ','
    pub op_bracket: Color, // '[' and ']'
    pub op_other: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            op_right: P::SKY,
            op_left: P::TEAL,
            op_inc: P::GREEN,
            op_dec: P::RED,
            op_output: P::YELLOW,
            op_input: P::PEACH,
            op_bracket: P::MAUVE,
            op_other: P::SURFACE2,
        }
    }
}

/// Settings loaded once from the user's config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub tape_length: usize,
    pub delay_ms: Option<u64>,
    pub palette: Palette,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tape_length: DEFAULT_TAPE_LENGTH,
            delay_ms: None,
            palette: Palette::default(),
        }
    }
}

static SETTINGS: OnceLock<Settings> = OnceLock::new();

pub fn settings() -> &'static Settings {
    SETTINGS.get_or_init(|| load_from_toml().unwrap_or_default())
}

fn parse_color(value: &str) -> Option<Color> {
    let s = value.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Some(Color::Rgb(r, g, b));
            }
        }
        return None;
    }

    // Named colors matching nu_ansi_term::Color variants
    let name = s.to_ascii_lowercase();
    Some(match name.as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" | "purple" => Color::Purple,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::DarkGray,
        "lightred" | "light_red" => Color::LightRed,
        "lightgreen" | "light_green" => Color::LightGreen,
        "lightblue" | "light_blue" => Color::LightBlue,
        "lightmagenta" | "light_magenta" | "lightpurple" | "light_purple" => Color::LightPurple,
        "lightcyan" | "light_cyan" => Color::LightCyan,
        "white" => Color::White,
        _ => return None,
    })
}

fn load_from_toml() -> Option<Settings> {
    let base_dirs = BaseDirs::new().ok()?;

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bfrun.toml");

    let content = fs::read_to_string(path).ok()?;
    Some(parse_settings(&content))
}

/// Very small hand-rolled parser: `[section]` headers and `key = value`
/// pairs, values optionally double-quoted. Unknown keys are ignored.
fn parse_settings(content: &str) -> Settings {
    let mut section = String::new();
    let mut map: HashMap<String, String> = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            section = line[1..line.len() - 1].to_string();
            continue;
        }
        if let Some(eq) = line.find('=') {
            let key = line[..eq].trim();
            let val_raw = line[eq + 1..].trim();
            // Accept quoted or unquoted
            let val = if val_raw.starts_with('"') && val_raw.ends_with('"') && val_raw.len() >= 2 {
                val_raw[1..val_raw.len() - 1].to_string()
            } else {
                val_raw.to_string()
            };
            map.insert(format!("{section}.{key}"), val);
        }
    }

    let mut cfg = Settings::default();

    if let Some(n) = map.get("run.tape_length").and_then(|s| s.parse::<usize>().ok()) {
        if n >= 1 {
            cfg.tape_length = n;
        }
    }
    if let Some(ms) = map.get("run.delay_ms").and_then(|s| s.parse::<u64>().ok()) {
        cfg.delay_ms = Some(ms);
    }

    macro_rules! set {
        ($field:ident, $key:literal) => {
            if let Some(v) = map.get($key).and_then(|s| parse_color(s)) {
                cfg.palette.$field = v;
            }
        };
    }

    set!(op_right, "colors.op_right");
    set!(op_left, "colors.op_left");
    set!(op_inc, "colors.op_inc");
    set!(op_dec, "colors.op_dec");
    set!(op_output, "colors.op_output");
    set!(op_input, "colors.op_input");
    set!(op_bracket, "colors.op_bracket");
    set!(op_other, "colors.op_other");

    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_is_empty() {
        let cfg = parse_settings("");
        assert_eq!(cfg.tape_length, DEFAULT_TAPE_LENGTH);
        assert_eq!(cfg.delay_ms, None);
    }

    #[test]
    fn run_section_overrides_defaults() {
        let cfg = parse_settings("[run]\ntape_length = 64\ndelay_ms = 5\n");
        assert_eq!(cfg.tape_length, 64);
        assert_eq!(cfg.delay_ms, Some(5));
    }

    #[test]
    fn zero_tape_length_in_file_is_ignored() {
        let cfg = parse_settings("[run]\ntape_length = 0\n");
        assert_eq!(cfg.tape_length, DEFAULT_TAPE_LENGTH);
    }

    #[test]
    fn colors_accept_hex_and_names() {
        let cfg = parse_settings("[colors]\nop_inc = \"#00ff00\"\nop_dec = red\n");
        assert_eq!(cfg.palette.op_inc, Color::Rgb(0, 255, 0));
        assert_eq!(cfg.palette.op_dec, Color::Red);
    }

    #[test]
    fn keys_outside_their_section_are_ignored() {
        let cfg = parse_settings("tape_length = 64\n[colors]\ndelay_ms = 5\n");
        assert_eq!(cfg.tape_length, DEFAULT_TAPE_LENGTH);
        assert_eq!(cfg.delay_ms, None);
    }
}
