//! Domain models and value objects

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

use crate::error::InputError;

/// A character class that a policy can enable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharClass {
    Lowercase,
    Uppercase,
    Numbers,
    Symbols,
}

impl CharClass {
    /// All classes in their fixed order. The order decides both the
    /// character-set concatenation and the repair positions.
    pub const ALL: [CharClass; 4] = [
        CharClass::Lowercase,
        CharClass::Uppercase,
        CharClass::Numbers,
        CharClass::Symbols,
    ];

    /// Literal repertoire of the class
    pub const fn repertoire(self) -> &'static str {
        match self {
            CharClass::Lowercase => "abcdefghijklmnopqrstuvwxyz",
            CharClass::Uppercase => "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            CharClass::Numbers => "0123456789",
            CharClass::Symbols => "!@#$%&*()?=",
        }
    }

    /// Whether `c` belongs to this class
    pub fn contains(self, c: char) -> bool {
        self.repertoire().contains(c)
    }

    pub const fn name(self) -> &'static str {
        match self {
            CharClass::Lowercase => "lowercase",
            CharClass::Uppercase => "uppercase",
            CharClass::Numbers => "numbers",
            CharClass::Symbols => "symbols",
        }
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which character classes may appear in a generated password
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicyFlags {
    pub lowercase: bool,
    pub uppercase: bool,
    pub numbers: bool,
    pub symbols: bool,
}

impl PolicyFlags {
    pub const fn new(lowercase: bool, uppercase: bool, numbers: bool, symbols: bool) -> Self {
        Self {
            lowercase,
            uppercase,
            numbers,
            symbols,
        }
    }

    /// Every class enabled
    pub const fn all() -> Self {
        Self::new(true, true, true, true)
    }

    /// No class enabled (never valid for derivation)
    pub const fn none() -> Self {
        Self::new(false, false, false, false)
    }

    pub const fn is_enabled(&self, class: CharClass) -> bool {
        match class {
            CharClass::Lowercase => self.lowercase,
            CharClass::Uppercase => self.uppercase,
            CharClass::Numbers => self.numbers,
            CharClass::Symbols => self.symbols,
        }
    }

    /// Enabled classes in fixed order
    pub fn enabled_classes(&self) -> impl Iterator<Item = CharClass> + '_ {
        CharClass::ALL
            .into_iter()
            .filter(move |class| self.is_enabled(*class))
    }

    pub fn is_empty(&self) -> bool {
        self.enabled_classes().next().is_none()
    }

    /// Four-character `1`/`0` encoding of the flags, e.g. `"1010"` for
    /// lowercase plus numbers. Part of the hashed seed material.
    pub fn usage_fingerprint(&self) -> String {
        CharClass::ALL
            .iter()
            .map(|class| if self.is_enabled(*class) { '1' } else { '0' })
            .collect()
    }

    /// Concatenated repertoires of the enabled classes
    pub fn character_set(&self) -> String {
        self.enabled_classes().map(CharClass::repertoire).collect()
    }
}

impl fmt::Display for PolicyFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.usage_fingerprint())
    }
}

/// Validated input to a derivation
pub struct DerivationInput {
    tag: String,
    passphrase: SecretString,
    flags: PolicyFlags,
}

impl DerivationInput {
    /// Check the preconditions (non-empty tag, non-empty passphrase, at
    /// least one class) in that order and build the input.
    pub fn new(
        tag: impl Into<String>,
        passphrase: SecretString,
        flags: PolicyFlags,
    ) -> Result<Self, InputError> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(InputError::EmptyTag);
        }
        if passphrase.expose_secret().is_empty() {
            return Err(InputError::EmptyPassphrase);
        }
        if flags.is_empty() {
            return Err(InputError::NoClassSelected);
        }

        Ok(Self {
            tag,
            passphrase,
            flags,
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn passphrase(&self) -> &SecretString {
        &self.passphrase
    }

    pub fn flags(&self) -> PolicyFlags {
        self.flags
    }
}

impl fmt::Debug for DerivationInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivationInput")
            .field("tag", &self.tag)
            .field("passphrase", &"[REDACTED]")
            .field("flags", &self.flags)
            .finish()
    }
}

/// Digest bytes that drive character selection
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Seed([u8; Seed::LEN]);

impl Seed {
    pub const LEN: usize = 20;

    pub const fn from_bytes(bytes: [u8; Seed::LEN]) -> Self {
        Self(bytes)
    }

    /// Unsigned value at `index`
    pub fn at(&self, index: usize) -> usize {
        usize::from(self.0[index])
    }

    pub fn as_bytes(&self) -> &[u8; Seed::LEN] {
        &self.0
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed([REDACTED])")
    }
}

/// A derived password of exactly [`crate::engine::PASSWORD_LENGTH`] characters
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub(crate) fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

/// A tag remembered for auto-completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    /// The tag as entered
    pub tag: String,
    /// When the tag was first used
    #[serde(with = "time::serde::rfc3339")]
    pub first_used: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn test_usage_fingerprint_order() {
        assert_eq!(PolicyFlags::new(true, false, true, false).usage_fingerprint(), "1010");
        assert_eq!(PolicyFlags::all().usage_fingerprint(), "1111");
        assert_eq!(PolicyFlags::new(false, false, false, true).usage_fingerprint(), "0001");
    }

    #[test]
    fn test_character_set_concatenation() {
        let flags = PolicyFlags::new(false, true, true, false);
        assert_eq!(
            flags.character_set(),
            "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789"
        );
        assert_eq!(PolicyFlags::all().character_set().len(), 26 + 26 + 10 + 11);
        assert!(PolicyFlags::none().character_set().is_empty());
    }

    #[test]
    fn test_enabled_classes_in_fixed_order() {
        let flags = PolicyFlags::new(true, false, true, true);
        let classes: Vec<_> = flags.enabled_classes().collect();
        assert_eq!(
            classes,
            vec![CharClass::Lowercase, CharClass::Numbers, CharClass::Symbols]
        );
    }

    #[test]
    fn test_input_rejects_empty_tag() {
        let result = DerivationInput::new("", secret("pw"), PolicyFlags::all());
        assert!(matches!(result, Err(InputError::EmptyTag)));
    }

    #[test]
    fn test_input_rejects_empty_passphrase() {
        let result = DerivationInput::new("email", secret(""), PolicyFlags::all());
        assert!(matches!(result, Err(InputError::EmptyPassphrase)));
    }

    #[test]
    fn test_input_rejects_empty_policy() {
        let result = DerivationInput::new("email", secret("pw"), PolicyFlags::none());
        assert!(matches!(result, Err(InputError::NoClassSelected)));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let input = DerivationInput::new("email", secret("hunter2"), PolicyFlags::all()).unwrap();
        let rendered = format!("{:?}", input);
        assert!(rendered.contains("email"));
        assert!(!rendered.contains("hunter2"));

        let password = Password::new("abcdefghij".to_string());
        assert_eq!(format!("{:?}", password), "Password([REDACTED])");
        assert_eq!(password.to_string(), "abcdefghij");
    }
}
