use std::collections::BTreeMap;
use std::fmt;

/// Letter and digit frequencies of a byte stream.
///
/// Input is decoded as UTF-8 line by line. Each byte that is not part of a
/// valid sequence counts as one unreadable character. Line terminators are
/// not counted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CharReport {
    /// Decimal digits (any script) as they appear
    pub digits: BTreeMap<char, usize>,
    /// Alphabetic characters, lower-cased
    pub letters: BTreeMap<char, usize>,
    /// Every decoded character plus every unreadable byte
    pub processed: usize,
    pub unreadable: usize,
}

impl CharReport {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut report = Self::default();
        for line in bytes.split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            report.count_line(line);
        }
        report
    }

    pub fn total_letters(&self) -> usize {
        self.letters.values().sum()
    }

    pub fn total_digits(&self) -> usize {
        self.digits.values().sum()
    }

    fn count_line(&mut self, mut rest: &[u8]) {
        while !rest.is_empty() {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    self.count_str(valid);
                    return;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    if let Ok(valid) = std::str::from_utf8(valid) {
                        self.count_str(valid);
                    }
                    // None means a truncated sequence at the end of the line
                    let bad = e.error_len().unwrap_or(after.len());
                    for _ in 0..bad {
                        self.processed += 1;
                        self.unreadable += 1;
                        tracing::warn!(position = self.processed, "Unreadable character, continuing");
                    }
                    rest = &after[bad..];
                }
            }
        }
    }

    fn count_str(&mut self, text: &str) {
        for c in text.chars() {
            self.processed += 1;
            if c.is_alphabetic() {
                let lower = c.to_lowercase().next().unwrap_or(c);
                *self.letters.entry(lower).or_default() += 1;
            } else if is_decimal_digit(c) {
                *self.digits.entry(c).or_default() += 1;
            }
        }
    }
}

/// First code point of every run of ten decimal digits (general category Nd)
const DECIMAL_DIGIT_ZEROS: &[u32] = &[
    0x0030, 0x0660, 0x06F0, 0x07C0, 0x0966, 0x09E6, 0x0A66, 0x0AE6, 0x0B66, 0x0BE6, 0x0C66,
    0x0CE6, 0x0D66, 0x0DE6, 0x0E50, 0x0ED0, 0x0F20, 0x1040, 0x1090, 0x17E0, 0x1810, 0x1946,
    0x19D0, 0x1A80, 0x1A90, 0x1B50, 0x1BB0, 0x1C40, 0x1C50, 0xA620, 0xA8D0, 0xA900, 0xA9D0,
    0xA9F0, 0xAA50, 0xABF0, 0xFF10, 0x104A0, 0x10D30, 0x11066, 0x110F0, 0x11136, 0x111D0,
    0x112F0, 0x11450, 0x114D0, 0x11650, 0x116C0, 0x11730, 0x118E0, 0x11950, 0x11C50, 0x11D50,
    0x11DA0, 0x11F50, 0x16A60, 0x16AC0, 0x16B50, 0x1D7CE, 0x1D7D8, 0x1D7E2, 0x1D7EC, 0x1D7F6,
    0x1E140, 0x1E2F0, 0x1E4F0, 0x1E950, 0x1FBF0,
];

/// Decimal digit in any script. Superscripts, fractions and other numerals
/// (`²`, `½`, `Ⅻ`) are not digits.
fn is_decimal_digit(c: char) -> bool {
    let cp = c as u32;
    let runs_started = DECIMAL_DIGIT_ZEROS.partition_point(|&zero| zero <= cp);
    runs_started > 0 && cp < DECIMAL_DIGIT_ZEROS[runs_started - 1] + 10
}

impl fmt::Display for CharReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Character Count Results ===")?;
        if self.letters.is_empty() {
            writeln!(f, "No alphabet characters found in the file.")?;
        }
        for (c, n) in &self.letters {
            writeln!(f, "{c} = {n}")?;
        }

        writeln!(f)?;
        writeln!(f, "=== Number Count Results ===")?;
        if self.digits.is_empty() {
            writeln!(f, "No numbers found in the file.")?;
        }
        for (c, n) in &self.digits {
            writeln!(f, "{c} = {n}")?;
        }

        writeln!(f)?;
        writeln!(f, "=== Summary ===")?;
        writeln!(f, "Total alphabet characters: {}", self.total_letters())?;
        writeln!(f, "Total numbers: {}", self.total_digits())?;
        writeln!(f, "Unreadable characters: {}", self.unreadable)?;
        write!(f, "Total characters processed: {}", self.processed)
    }
}
