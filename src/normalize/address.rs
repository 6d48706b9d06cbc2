use std::sync::LazyLock;

use regex::Regex;

use super::{normalize_state, normalize_zip, state_code};

/// `<line1>, <city>[,] <ST> <ZIP[-ZIP4]>`
static FULL_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?),\s*([^,]+?),?\s+([A-Za-z]{2})\.?\s+(\d{5}(?:-?\d{4})?)$").unwrap()
});
static STATE_ZIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s+(\d{5}(?:-?\d{4})?)$").unwrap());
static ZIP_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}(?:-?\d{4})?$").unwrap());

/// A combined address string broken into record fields. Parts that could
/// not be recovered are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressParts {
    pub line1: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl AddressParts {
    fn line_only(raw: &str) -> Self {
        Self {
            line1: raw.trim().to_string(),
            ..Default::default()
        }
    }

    /// Number of components beyond `line1` that were recovered.
    pub fn components_found(&self) -> usize {
        [&self.city, &self.state, &self.zip]
            .iter()
            .filter(|s| !s.is_empty())
            .count()
    }
}

/// Decompose `"567 Cedar Ln, Miami, FL 33101"` into line1/city/state/zip.
///
/// Tries the full pattern first, then a positional comma split that also
/// accepts spelled-out state names. When neither works the whole string is
/// returned as `line1`.
pub fn split_address(raw: &str) -> AddressParts {
    let trimmed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if trimmed.is_empty() {
        return AddressParts::default();
    }

    if let Some(caps) = FULL_ADDRESS.captures(&trimmed) {
        return AddressParts {
            line1: caps[1].trim().to_string(),
            city: caps[2].trim().to_string(),
            state: normalize_state(&caps[3]),
            zip: normalize_zip(&caps[4]),
        };
    }

    split_positional(&trimmed).unwrap_or_else(|| AddressParts::line_only(&trimmed))
}

fn split_positional(address: &str) -> Option<AddressParts> {
    let parts: Vec<&str> = address
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    let n = parts.len();
    if n < 3 {
        return None;
    }

    let tail = parts[n - 1];

    // "..., City, Florida 33101"
    if let Some(caps) = STATE_ZIP.captures(tail) {
        if let Some(state) = as_state(&caps[1]) {
            return Some(AddressParts {
                line1: parts[..n - 2].join(", "),
                city: parts[n - 2].to_string(),
                state,
                zip: normalize_zip(&caps[2]),
            });
        }
    }

    // "..., City, FL, 33101"
    if ZIP_ONLY.is_match(tail) && n >= 4 {
        if let Some(state) = as_state(parts[n - 2]) {
            return Some(AddressParts {
                line1: parts[..n - 3].join(", "),
                city: parts[n - 3].to_string(),
                state,
                zip: normalize_zip(tail),
            });
        }
    }

    // "..., City, Florida"
    as_state(tail).map(|state| AddressParts {
        line1: parts[..n - 2].join(", "),
        city: parts[n - 2].to_string(),
        state,
        zip: String::new(),
    })
}

fn as_state(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('.');
    if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(trimmed.to_ascii_uppercase());
    }
    state_code(trimmed).map(str::to_string)
}
