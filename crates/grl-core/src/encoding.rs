use crate::error::CoreError;
use crate::shortcode::ShortCode;
use std::fmt::Display;
use std::str::FromStr;

/// How a sequence id is rendered into the external id of a short link.
///
/// The same encoding must be used for minting and for lookups: the external id
/// is stored verbatim as the key, so a hex-minted store never answers decimal
/// lookups and vice versa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum IdEncoding {
    /// Lowercase hexadecimal without leading zeros (`26` -> `1a`).
    #[default]
    Hex,
    /// Base-10 without leading zeros (`26` -> `26`).
    Decimal,
}

impl IdEncoding {
    /// Encodes a sequence id as a short code.
    pub fn encode(self, id: u64) -> ShortCode {
        let code = match self {
            IdEncoding::Hex => format!("{id:x}"),
            IdEncoding::Decimal => id.to_string(),
        };
        ShortCode::new_unchecked(code)
    }

    /// Returns `true` when `code` could have been produced by [`IdEncoding::encode`].
    ///
    /// Lookups use this to skip the store for paths that can never match.
    pub fn accepts(self, code: &str) -> bool {
        if code.is_empty() || (code.len() > 1 && code.starts_with('0')) {
            return false;
        }

        match self {
            IdEncoding::Hex => code
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)),
            IdEncoding::Decimal => code.bytes().all(|b| b.is_ascii_digit()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IdEncoding::Hex => "hex",
            IdEncoding::Decimal => "decimal",
        }
    }
}

impl Display for IdEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdEncoding {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hex" => Ok(IdEncoding::Hex),
            "decimal" | "dec" => Ok(IdEncoding::Decimal),
            other => Err(CoreError::UnknownEncoding(other.to_string())),
        }
    }
}
