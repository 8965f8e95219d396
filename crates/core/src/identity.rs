//! Ledger-native item identity derived from the human-facing item code (UPC).

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DomainError, DomainResult};
use crate::hex;
use crate::value_object::ValueObject;

/// Width of the ledger's native unsigned word.
pub const WORD_BYTES: usize = 32;

/// Ledger-native numeric identity of an item: an unsigned 256-bit big-endian word.
///
/// Equality is exact integer equality. Two decodes of the same code always compare
/// equal, and distinct numeric values never collide.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemIdentity([u8; WORD_BYTES]);

impl ValueObject for ItemIdentity {}

impl ItemIdentity {
    pub const ZERO: ItemIdentity = ItemIdentity([0u8; WORD_BYTES]);

    pub fn from_word(word: [u8; WORD_BYTES]) -> Self {
        Self(word)
    }

    pub fn from_u128(value: u128) -> Self {
        let mut word = [0u8; WORD_BYTES];
        word[WORD_BYTES - 16..].copy_from_slice(&value.to_be_bytes());
        Self(word)
    }

    /// Big-endian word as stored in an event payload.
    pub fn as_bytes(&self) -> &[u8; WORD_BYTES] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Decode an item code into its ledger identity.
    ///
    /// Accepts a decimal digit string (the UPC as printed) or a `0x`-prefixed hex
    /// string. Leading zeros are numerically insignificant, exactly as on the ledger.
    pub fn decode(code: &str) -> DomainResult<Self> {
        if code.is_empty() {
            return Err(DomainError::invalid_item_code("empty item code"));
        }
        if code.starts_with("0x") || code.starts_with("0X") {
            Self::decode_hex(code)
        } else {
            Self::decode_decimal(code)
        }
    }

    /// Resolve an optional selection: the empty code means "no item selected".
    pub fn from_item_code(code: &str) -> DomainResult<Option<Self>> {
        if code.is_empty() {
            return Ok(None);
        }
        Self::decode(code).map(Some)
    }

    fn decode_decimal(code: &str) -> DomainResult<Self> {
        let mut word = [0u8; WORD_BYTES];
        for c in code.chars() {
            let digit = c.to_digit(10).ok_or_else(|| {
                DomainError::invalid_item_code(format!("unexpected character '{c}' in {code:?}"))
            })?;
            let mut carry = digit;
            for byte in word.iter_mut().rev() {
                let v = u32::from(*byte) * 10 + carry;
                *byte = v as u8;
                carry = v >> 8;
            }
            if carry != 0 {
                return Err(DomainError::invalid_item_code(format!(
                    "{code:?} exceeds 256 bits"
                )));
            }
        }
        Ok(Self(word))
    }

    fn decode_hex(code: &str) -> DomainResult<Self> {
        if hex::strip_prefix(code).is_empty() {
            return Err(DomainError::invalid_item_code(format!("no digits in {code:?}")));
        }
        let bytes = hex::decode(code)
            .map_err(|e| DomainError::invalid_item_code(format!("{code:?}: {e}")))?;
        let significant: &[u8] = match bytes.iter().position(|b| *b != 0) {
            Some(first) => &bytes[first..],
            None => &[],
        };
        if significant.len() > WORD_BYTES {
            return Err(DomainError::invalid_item_code(format!(
                "{code:?} exceeds 256 bits"
            )));
        }
        let mut word = [0u8; WORD_BYTES];
        word[WORD_BYTES - significant.len()..].copy_from_slice(significant);
        Ok(Self(word))
    }

    fn to_decimal(&self) -> String {
        let mut word = self.0;
        let mut digits = Vec::new();
        while word.iter().any(|b| *b != 0) {
            let mut rem = 0u32;
            for byte in word.iter_mut() {
                let cur = (rem << 8) | u32::from(*byte);
                *byte = (cur / 10) as u8;
                rem = cur % 10;
            }
            digits.push(b'0' + rem as u8);
        }
        if digits.is_empty() {
            return "0".to_string();
        }
        digits.reverse();
        String::from_utf8_lossy(&digits).into_owned()
    }
}

impl core::fmt::Display for ItemIdentity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.to_decimal())
    }
}

impl core::str::FromStr for ItemIdentity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl From<u128> for ItemIdentity {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl Serialize for ItemIdentity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for ItemIdentity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_code_decodes_to_numeric_word() {
        let id = ItemIdentity::decode("123456789012").unwrap();
        assert_eq!(id, ItemIdentity::from_u128(123_456_789_012));
        assert_eq!(id.to_string(), "123456789012");
    }

    #[test]
    fn hex_and_decimal_forms_agree() {
        assert_eq!(
            ItemIdentity::decode("0xABC").unwrap(),
            ItemIdentity::decode("2748").unwrap()
        );
        assert_eq!(
            ItemIdentity::decode("0x0000000abc").unwrap(),
            ItemIdentity::from_u128(0xabc)
        );
    }

    #[test]
    fn leading_zeros_are_insignificant() {
        assert_eq!(
            ItemIdentity::decode("000042").unwrap(),
            ItemIdentity::decode("42").unwrap()
        );
        assert_eq!(ItemIdentity::decode("0").unwrap(), ItemIdentity::ZERO);
        assert_eq!(ItemIdentity::ZERO.to_string(), "0");
    }

    #[test]
    fn empty_code_is_no_selection() {
        assert_eq!(ItemIdentity::from_item_code("").unwrap(), None);
        assert!(matches!(
            ItemIdentity::decode(""),
            Err(DomainError::InvalidItemCode(_))
        ));
    }

    #[test]
    fn malformed_codes_are_rejected() {
        for code in ["12a4", " 12", "12 ", "-5", "+5", "1.5", "0x", "0xg1"] {
            assert!(
                matches!(ItemIdentity::decode(code), Err(DomainError::InvalidItemCode(_))),
                "{code:?} should be rejected"
            );
        }
    }

    #[test]
    fn max_word_decodes_and_overflow_is_rejected() {
        let max = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        let id = ItemIdentity::decode(max).unwrap();
        assert_eq!(id.as_bytes(), &[0xffu8; WORD_BYTES]);
        assert_eq!(id.to_string(), max);

        let over = "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert!(ItemIdentity::decode(over).is_err());

        let wide_hex = format!("0x01{}", "00".repeat(WORD_BYTES));
        assert!(ItemIdentity::decode(&wide_hex).is_err());
    }

    #[test]
    fn serializes_as_decimal_string() {
        let id = ItemIdentity::from_u128(987_654_321);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"987654321\"");
        let back: ItemIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: decoding is referentially transparent.
            #[test]
            fn decode_is_deterministic(code in "[0-9]{1,40}") {
                let a = ItemIdentity::decode(&code).unwrap();
                let b = ItemIdentity::decode(&code).unwrap();
                prop_assert_eq!(a, b);
            }

            /// Property: distinct fixed-width UPC codes never collide.
            #[test]
            fn distinct_upcs_map_to_distinct_identities(
                a in "[0-9]{12}",
                b in "[0-9]{12}"
            ) {
                prop_assume!(a != b);
                prop_assert_ne!(
                    ItemIdentity::decode(&a).unwrap(),
                    ItemIdentity::decode(&b).unwrap()
                );
            }

            /// Property: decimal rendering matches the native integer value.
            #[test]
            fn display_matches_u128(value in any::<u128>()) {
                let id = ItemIdentity::from_u128(value);
                prop_assert_eq!(id.to_string(), value.to_string());
                prop_assert_eq!(ItemIdentity::decode(&value.to_string()).unwrap(), id);
                prop_assert_eq!(ItemIdentity::decode(&format!("0x{value:x}")).unwrap(), id);
            }
        }
    }
}
