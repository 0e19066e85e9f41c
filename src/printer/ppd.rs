//! # Printer Options
//!
//! A flat keyword → choice map built the way CUPS marks a PPD: start from the
//! PPD defaults, then apply the options given on the filter command line.
//!
//! ## Sources
//!
//! | Source | Syntax | Example |
//! |--------|--------|---------|
//! | PPD | `*DefaultKeyword: choice` | `*DefaultGap: 30` |
//! | Job options | `key=value` | `teGraphicsMode=2` |
//! | Job options | `key="quoted value"` | `Title="My Label"` |
//! | Job options | `key` | `teHexCompression` (= `True`) |
//! | Job options | `nokey` | `noteHexCompression` (= `False`) |
//!
//! Keywords are case-sensitive, later values replace earlier ones.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::TecError;

/// Marked option choices, keyed by PPD keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    choices: BTreeMap<String, String>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the `*Default` choices of a PPD.
    ///
    /// ## Example
    ///
    /// ```
    /// use tecraster::printer::ppd::OptionSet;
    ///
    /// let ppd = "*PPD-Adobe: \"4.3\"\n*DefaultGap: 30\n*Gap 30/3.0 mm: \"\"\n";
    /// let options = OptionSet::from_ppd(ppd);
    /// assert_eq!(options.get("Gap"), Some("30"));
    /// assert_eq!(options.len(), 1);
    /// ```
    pub fn from_ppd(text: &str) -> Self {
        let mut options = Self::new();
        for line in text.lines() {
            let Some(rest) = line.strip_prefix("*Default") else {
                continue;
            };
            let Some((keyword, choice)) = rest.split_once(':') else {
                continue;
            };
            let keyword = keyword.trim();
            let choice = choice.trim();
            if keyword.is_empty() || choice.is_empty() {
                continue;
            }
            options.set(keyword, choice);
        }
        options
    }

    /// Read a PPD file and collect its defaults.
    pub fn load_ppd(path: impl AsRef<Path>) -> Result<Self, TecError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let options = Self::from_ppd(&String::from_utf8_lossy(&bytes));
        log::debug!(
            "Loaded {} defaults from {}",
            options.len(),
            path.display()
        );
        Ok(options)
    }

    /// Apply a CUPS job options string on top of the current choices.
    ///
    /// ## Example
    ///
    /// ```
    /// use tecraster::printer::ppd::OptionSet;
    ///
    /// let mut options = OptionSet::new();
    /// options.apply_job_options("teGraphicsMode=2 Title='Box 12' teHexCompression nomirror");
    /// assert_eq!(options.get("teGraphicsMode"), Some("2"));
    /// assert_eq!(options.get("Title"), Some("Box 12"));
    /// assert_eq!(options.get("teHexCompression"), Some("True"));
    /// assert_eq!(options.get("mirror"), Some("False"));
    /// ```
    pub fn apply_job_options(&mut self, options: &str) {
        for (key, value) in parse_job_options(options) {
            self.set(&key, &value);
        }
    }

    /// Set one choice, replacing any previous one.
    pub fn set(&mut self, keyword: &str, choice: &str) {
        self.choices.insert(keyword.to_string(), choice.to_string());
    }

    /// Choice for `keyword`, if marked.
    pub fn get(&self, keyword: &str) -> Option<&str> {
        self.choices.get(keyword).map(String::as_str)
    }

    /// Numeric value of a choice, read like C `atoi`.
    pub fn int(&self, keyword: &str) -> Option<i32> {
        self.get(keyword).map(atoi)
    }

    /// Whether `keyword` is marked with exactly `choice`.
    pub fn is_marked(&self, keyword: &str, choice: &str) -> bool {
        self.get(keyword) == Some(choice)
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.choices.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Split a job options string into `(key, value)` pairs.
fn parse_job_options(input: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(c) = chars.next_if(|&c| !c.is_whitespace() && c != '=') {
            key.push(c);
        }

        if chars.next_if_eq(&'=').is_none() {
            match key.strip_prefix("no").or_else(|| key.strip_prefix("No")) {
                Some(rest) if !rest.is_empty() => pairs.push((rest.to_string(), "False".into())),
                _ => pairs.push((key, "True".into())),
            }
            continue;
        }

        let mut value = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                break;
            }
            chars.next();
            match c {
                '\'' | '"' => {
                    for q in chars.by_ref() {
                        if q == c {
                            break;
                        }
                        value.push(q);
                    }
                }
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        value.push(escaped);
                    }
                }
                _ => value.push(c),
            }
        }

        if !key.is_empty() {
            pairs.push((key, value));
        }
    }

    pairs
}

/// C `atoi`: optional whitespace and sign, then leading digits. Anything
/// unparsable reads as 0.
///
/// ## Example
///
/// ```
/// use tecraster::printer::ppd::atoi;
///
/// assert_eq!(atoi("30"), 30);
/// assert_eq!(atoi(" -5mm"), -5);
/// assert_eq!(atoi("True"), 0);
/// ```
pub fn atoi(s: &str) -> i32 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i32 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i32::from(b - b'0'));
    }
    if negative { -value } else { value }
}

// ============================================================================
// TESTS
// ============================================================================
