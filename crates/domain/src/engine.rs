//! Derivation engine
//!
//! Maps `(policy, tag, passphrase)` to a fixed-length password:
//!
//! 1. The policy fingerprint, the tag and the passphrase are each hashed
//!    with SHA-1 and the digests are read back as single-byte characters.
//! 2. The three digest strings are joined with `+` and hashed again; the
//!    20 resulting bytes are the seed.
//! 3. `seed[i]` picks output character `i` from the concatenated repertoires
//!    of the enabled classes.
//! 4. Each enabled class missing from the candidate is repaired in place at
//!    position `(k + 2) * 2`, using `seed[10 + k]`, where `k` counts enabled
//!    classes only.
//!
//! Every step is fixed. Changing the digest, the encoding or the join format
//! changes every password ever derived.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::{EngineError, InputError};
use crate::model::{DerivationInput, Password, PolicyFlags, Seed};

/// Number of characters in every derived password
pub const PASSWORD_LENGTH: usize = 10;

/// Number of seed bytes (one SHA-1 digest)
pub const SEED_LENGTH: usize = Seed::LEN;

/// The working buffer carries one trailing delimiter slot past the output
/// window. A repair aimed at that slot is discarded on truncation.
const WORKING_LENGTH: usize = PASSWORD_LENGTH + 1;
const WORKING_DELIMITER: char = ' ';

const SELF_TEST_INPUT: &[u8] = b"abc";
const SELF_TEST_DIGEST: &str = "a9993e364706816aba3e25717850c26c9cd0d89d";

/// Byte encoding applied to text before each digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    /// One byte per character; code points above U+00FF become `?`
    #[default]
    Latin1,
    /// UTF-8, as produced by platforms whose default charset is UTF-8.
    /// Digest characters `0x80..=0xFF` expand to two bytes in the outer hash.
    Utf8,
}

impl TextEncoding {
    fn encode(self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TextEncoding::Latin1 => "latin1",
            TextEncoding::Utf8 => "utf8",
        }
    }
}

impl std::str::FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "latin1" | "iso-8859-1" => Ok(TextEncoding::Latin1),
            "utf8" | "utf-8" => Ok(TextEncoding::Utf8),
            other => Err(format!("Unknown encoding '{}': expected latin1 or utf8", other)),
        }
    }
}

/// Deterministic password derivation
#[derive(Debug, Clone, Copy, Default)]
pub struct Engine {
    encoding: TextEncoding,
}

impl Engine {
    pub fn new(encoding: TextEncoding) -> Self {
        Self { encoding }
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Verify the SHA-1 primitive against the FIPS 180 "abc" vector.
    /// Meant to run once at startup; per-call digesting cannot fail.
    pub fn self_test() -> Result<(), EngineError> {
        let actual = format!("{:x}", Sha1::digest(SELF_TEST_INPUT));
        if actual != SELF_TEST_DIGEST {
            return Err(EngineError::DigestMismatch {
                expected: SELF_TEST_DIGEST.to_string(),
                actual,
            });
        }
        Ok(())
    }

    /// Build the seed from the policy fingerprint, tag and passphrase
    pub fn derive_seed(&self, input: &DerivationInput) -> Seed {
        let usage = input.flags().usage_fingerprint();
        let joined = format!(
            "{}+{}+{}",
            self.digest_text(&usage),
            self.digest_text(input.tag()),
            self.digest_text(input.passphrase().expose_secret()),
        );

        Seed::from_bytes(self.digest(&joined))
    }

    /// Derive the password for a validated input
    pub fn generate(&self, input: &DerivationInput) -> Password {
        let flags = input.flags();
        let seed = self.derive_seed(input);
        let full_set = flags.character_set();
        let full_set = full_set.as_bytes();

        let mut buffer = [WORKING_DELIMITER; WORKING_LENGTH];
        for (i, slot) in buffer.iter_mut().take(PASSWORD_LENGTH).enumerate() {
            *slot = char::from(full_set[seed.at(i) % full_set.len()]);
        }

        let mut repairs = 0;
        for (k, class) in flags.enabled_classes().enumerate() {
            if buffer.iter().any(|c| class.contains(*c)) {
                continue;
            }

            let repertoire = class.repertoire().as_bytes();
            let position = repair_position(k);
            let pick = seed.at(PASSWORD_LENGTH + k) % repertoire.len();
            buffer[position] = char::from(repertoire[pick]);
            repairs += 1;

            tracing::trace!(
                class = %class,
                position,
                discarded = position >= PASSWORD_LENGTH,
                "Repaired missing character class"
            );
        }

        tracing::debug!(
            policy = %flags,
            classes = flags.enabled_classes().count(),
            repairs,
            encoding = self.encoding.as_str(),
            "Derived password"
        );

        Password::new(buffer[..PASSWORD_LENGTH].iter().collect())
    }

    /// Hash `text` and read the digest bytes back as single-byte characters
    fn digest_text(&self, text: &str) -> String {
        self.digest(text).iter().copied().map(char::from).collect()
    }

    fn digest(&self, text: &str) -> [u8; SEED_LENGTH] {
        let digest = Sha1::digest(self.encoding.encode(text));
        let mut bytes = [0u8; SEED_LENGTH];
        bytes.copy_from_slice(&digest);
        bytes
    }
}

/// Repair slot for the `k`-th enabled class. With four classes enabled the
/// last slot is the delimiter, so a symbol repair never reaches the output.
const fn repair_position(k: usize) -> usize {
    (k + 2) * 2
}

/// Validate the raw inputs and derive with the default (Latin-1) engine
pub fn generate(flags: PolicyFlags, tag: &str, passphrase: &str) -> Result<Password, InputError> {
    let input = DerivationInput::new(tag, SecretString::from(passphrase.to_string()), flags)?;
    Ok(Engine::default().generate(&input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CharClass;

    const LOWER_NUM: PolicyFlags = PolicyFlags::new(true, false, true, false);

    fn input(flags: PolicyFlags, tag: &str, passphrase: &str) -> DerivationInput {
        DerivationInput::new(tag, SecretString::from(passphrase.to_string()), flags)
            .expect("valid input")
    }

    fn latin1(flags: PolicyFlags, tag: &str, passphrase: &str) -> String {
        Engine::default()
            .generate(&input(flags, tag, passphrase))
            .into_string()
    }

    fn all_policies() -> impl Iterator<Item = PolicyFlags> {
        (1u8..16).map(|bits| {
            PolicyFlags::new(bits & 8 != 0, bits & 4 != 0, bits & 2 != 0, bits & 1 != 0)
        })
    }

    fn has_class(password: &str, class: CharClass) -> bool {
        password.chars().any(|c| class.contains(c))
    }

    #[test]
    fn test_self_test_passes() {
        Engine::self_test().unwrap();
    }

    #[test]
    fn test_seed_known_answer() {
        let seed = Engine::default().derive_seed(&input(LOWER_NUM, "email", "correcthorse"));
        assert_eq!(
            seed.as_bytes(),
            &[
                123, 57, 164, 87, 68, 199, 89, 237, 55, 60, 94, 4, 9, 105, 174, 114, 250, 187, 42,
                150
            ]
        );
    }

    #[test]
    fn test_known_answers_single_and_paired_classes() {
        let cases = [
            (PolicyFlags::new(true, false, true, false), "pvup6trvty"),
            (PolicyFlags::new(true, false, false, false), "gppgihkfvt"),
            (PolicyFlags::new(false, true, false, false), "MPFVSRETKY"),
            (PolicyFlags::new(false, false, true, false), "6251202828"),
            (PolicyFlags::new(false, false, false, true), "?#@=?!@?)?"),
            (PolicyFlags::new(true, true, false, false), "rihqSQcNel"),
            (PolicyFlags::new(false, false, true, true), "50*0!30878"),
        ];

        for (flags, expected) in cases {
            assert_eq!(latin1(flags, "email", "correcthorse"), expected, "policy {}", flags);
        }
    }

    #[test]
    fn test_known_answers_other_inputs() {
        assert_eq!(
            latin1(PolicyFlags::new(true, true, false, true), "github", "hunter2"),
            "J!TxqEPIvx"
        );
        assert_eq!(latin1(PolicyFlags::all(), "github", "hunter2"), "hCZ?x&P5h!");
        assert_eq!(latin1(PolicyFlags::all(), "café", "pässwörd"), "Zr7cvw!qWA");
    }

    #[test]
    fn test_repair_inserts_missing_class() {
        // Primary pass gives "zwqianadcq"; the digit lands at position 6.
        let password = latin1(LOWER_NUM, "site21", "correcthorse");
        assert_eq!(password, "zwqian7dcq");
        assert!(has_class(&password, CharClass::Numbers));
    }

    #[test]
    fn test_third_class_repair_at_position_eight() {
        // Primary pass gives "SH8FX08529"; the symbol lands at position 8.
        let password = latin1(PolicyFlags::new(false, true, true, true), "site1", "correcthorse");
        assert_eq!(password, "SH8FX085$9");
        for class in [CharClass::Uppercase, CharClass::Numbers, CharClass::Symbols] {
            assert!(has_class(&password, class));
        }
    }

    #[test]
    fn test_repair_collision_overwrites_earlier_class() {
        // Primary pass gives "THALQGPLlI". The only lowercase letter sits at
        // position 8, which is exactly where the numbers repair goes.
        let password = latin1(PolicyFlags::new(true, true, true, false), "site900", "correcthorse");
        assert_eq!(password, "THALQGPL4I");
        assert!(!has_class(&password, CharClass::Lowercase));
        assert!(has_class(&password, CharClass::Numbers));
    }

    #[test]
    fn test_symbol_repair_outside_window_is_dropped() {
        // With all four classes the symbol repair targets position 10.
        for tag in ["site11", "email"] {
            let password = latin1(PolicyFlags::all(), tag, "correcthorse");
            assert!(!has_class(&password, CharClass::Symbols), "{}", password);
        }
        assert_eq!(latin1(PolicyFlags::all(), "site11", "correcthorse"), "0hYcAcLztX");
        assert_eq!(latin1(PolicyFlags::all(), "email", "correcthorse"), "7zWKr8EV63");
    }

    #[test]
    fn test_utf8_encoding_known_answers() {
        let engine = Engine::new(TextEncoding::Utf8);
        assert_eq!(engine.encoding(), TextEncoding::Utf8);
        assert_eq!(Engine::default().encoding(), TextEncoding::Latin1);

        let password = engine.generate(&input(LOWER_NUM, "email", "correcthorse"));
        assert_eq!(password.as_str(), "wruw2sbo3v");

        let password = engine.generate(&input(PolicyFlags::all(), "café", "pässwörd"));
        assert_eq!(password.as_str(), "hH48)qCcfq");
    }

    #[test]
    fn test_latin1_replaces_unmappable_characters() {
        let engine = Engine::default();
        let snowman = engine.generate(&input(PolicyFlags::all(), "ca\u{2603}", "pw"));
        let question = engine.generate(&input(PolicyFlags::all(), "ca?", "pw"));
        assert_eq!(snowman, question);

        let engine = Engine::new(TextEncoding::Utf8);
        let snowman = engine.generate(&input(PolicyFlags::all(), "ca\u{2603}", "pw"));
        let question = engine.generate(&input(PolicyFlags::all(), "ca?", "pw"));
        assert_ne!(snowman, question);
    }

    #[test]
    fn test_deterministic() {
        for flags in all_policies() {
            let first = latin1(flags, "bank", "open sesame");
            let second = latin1(flags, "bank", "open sesame");
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_length_is_always_ten() {
        for flags in all_policies() {
            for tag in ["a", "email", "site900", "a much longer tag with spaces"] {
                let password = Engine::default().generate(&input(flags, tag, "x"));
                assert_eq!(password.len(), PASSWORD_LENGTH);
                assert!(!password.is_empty());
                assert_eq!(password.as_str().chars().count(), PASSWORD_LENGTH);
            }
        }
    }

    #[test]
    fn test_output_restricted_to_enabled_classes() {
        for flags in all_policies() {
            for i in 0..20 {
                let password = latin1(flags, &format!("site{}", i), "correcthorse");
                for c in password.chars() {
                    assert!(
                        flags.enabled_classes().any(|class| class.contains(c)),
                        "{:?} not allowed by policy {}",
                        c,
                        flags
                    );
                }
            }
        }
    }

    #[test]
    fn test_coverage_holds_for_two_classes() {
        // A repair only happens when the other class fills all ten slots,
        // so overwriting one of them cannot remove that class.
        for i in 0..50 {
            let password = latin1(LOWER_NUM, &format!("site{}", i), "correcthorse");
            assert!(has_class(&password, CharClass::Lowercase), "{}", password);
            assert!(has_class(&password, CharClass::Numbers), "{}", password);
        }
    }

    #[test]
    fn test_sensitivity_to_every_input() {
        let engine = Engine::default();
        let base = engine.derive_seed(&input(LOWER_NUM, "email", "correcthorse"));

        let tag_changed = engine.derive_seed(&input(LOWER_NUM, "emaim", "correcthorse"));
        let passphrase_changed = engine.derive_seed(&input(LOWER_NUM, "email", "correcthorsf"));
        let flag_toggled = engine.derive_seed(&input(
            PolicyFlags::new(true, true, true, false),
            "email",
            "correcthorse",
        ));

        assert_ne!(base, tag_changed);
        assert_ne!(base, passphrase_changed);
        assert_ne!(base, flag_toggled);
    }

    #[test]
    fn test_different_tags_give_different_passwords() {
        let a = latin1(PolicyFlags::all(), "github", "correcthorse");
        let b = latin1(PolicyFlags::all(), "gitlab", "correcthorse");
        assert_ne!(a, b);
    }

    #[test]
    fn test_free_function_validates_before_hashing() {
        assert_eq!(
            generate(PolicyFlags::none(), "email", "pw"),
            Err(InputError::NoClassSelected)
        );
        assert_eq!(
            generate(PolicyFlags::all(), "", "pw"),
            Err(InputError::EmptyTag)
        );
        assert_eq!(
            generate(PolicyFlags::all(), "email", ""),
            Err(InputError::EmptyPassphrase)
        );

        let password = generate(LOWER_NUM, "email", "correcthorse").unwrap();
        assert_eq!(password.as_str(), "pvup6trvty");
    }

    #[test]
    fn test_encoding_from_str() {
        assert_eq!("latin1".parse::<TextEncoding>(), Ok(TextEncoding::Latin1));
        assert_eq!("UTF-8".parse::<TextEncoding>(), Ok(TextEncoding::Utf8));
        assert!("ascii".parse::<TextEncoding>().is_err());
    }
}
