//! Devnet token registry and address parsing.

use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;

use crate::error::{Error, Result};

/// Devnet tokens addressable by symbol.
pub const KNOWN_TOKENS: &[(&str, &str)] = &[
    ("SOL",  "So11111111111111111111111111111111111111112"),
    ("USDC", "Gh9ZwEmdLJ8DscKNTkTqPbNwLNNBjuSzaG9Vp2KGtKJr"),
];

/// Parse a base-58 address, reporting the offending input on failure.
pub fn parse_pubkey(input: &str) -> Result<Pubkey> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidAddress { input: input.into(), reason: "empty".into() });
    }
    Pubkey::from_str(trimmed).map_err(|e| Error::InvalidAddress {
        input:  input.into(),
        reason: e.to_string(),
    })
}

/// Resolve a symbol (SOL, USDC) or raw base-58 mint address to a Pubkey.
pub fn resolve_mint(symbol_or_address: &str) -> Result<Pubkey> {
    let upper = symbol_or_address.trim().to_uppercase();
    for (sym, addr) in KNOWN_TOKENS {
        if upper == *sym {
            return parse_pubkey(addr);
        }
    }
    parse_pubkey(symbol_or_address).map_err(|_| Error::InvalidAddress {
        input:  symbol_or_address.into(),
        reason: format!(
            "not a base-58 address or a known symbol ({})",
            KNOWN_TOKENS.iter().map(|(s, _)| *s).collect::<Vec<_>>().join(", ")
        ),
    })
}

/// Symbol for a known mint, otherwise `TOKEN-abcd...wxyz`.
pub fn display_name(mint: &Pubkey) -> String {
    let addr = mint.to_string();
    for (sym, known) in KNOWN_TOKENS {
        if addr == *known {
            return sym.to_string();
        }
    }
    format!("TOKEN-{}...{}", &addr[..4], &addr[addr.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_resolve_case_insensitively() {
        assert_eq!(resolve_mint("sol").unwrap(), spl_token::native_mint::id());
        assert_eq!(resolve_mint(" USDC ").unwrap().to_string(), KNOWN_TOKENS[1].1);
    }

    #[test]
    fn raw_addresses_pass_through() {
        let key = Pubkey::new_unique();
        assert_eq!(resolve_mint(&key.to_string()).unwrap(), key);
    }

    #[test]
    fn bad_input_is_an_invalid_address() {
        for input in ["", "not-a-key", "0OIl"] {
            let err = resolve_mint(input).unwrap_err();
            assert!(matches!(err, Error::InvalidAddress { .. }), "{input}");
        }
    }

    #[test]
    fn unknown_mints_are_abbreviated() {
        let key = Pubkey::new_unique();
        let s = key.to_string();
        assert_eq!(display_name(&key), format!("TOKEN-{}...{}", &s[..4], &s[s.len() - 4..]));
        assert_eq!(display_name(&spl_token::native_mint::id()), "SOL");
    }
}
