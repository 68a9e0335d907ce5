//! FriendlyName composition
//!
//! Windows shows the FriendlyName in Device Manager and most port pickers.
//! Names are capped at [`MAX_NAME_LENGTH`] characters; when a port suffix
//! such as `" (COM7)"` is requested, the name is cut short so that the
//! suffix always survives intact.

use crate::error::NameError;

/// Maximum FriendlyName length written to the registry, in characters
pub const MAX_NAME_LENGTH: usize = 40;

/// A requested name plus optional port suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCandidate {
    pub text: String,
    pub port_suffix: Option<String>,
}

impl NameCandidate {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            port_suffix: None,
        }
    }

    /// Append `" (<port>)"` to the composed name. An empty port adds nothing.
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        let port = port.into();
        self.port_suffix = (!port.is_empty()).then_some(port);
        self
    }

    /// Build the final value: truncated name followed by the port suffix
    pub fn compose(&self) -> Result<String, NameError> {
        let suffix = match &self.port_suffix {
            Some(port) => format!(" ({})", port),
            None => String::new(),
        };

        let suffix_len = suffix.chars().count();
        if suffix_len > MAX_NAME_LENGTH {
            return Err(NameError::SuffixTooLong {
                suffix,
                max: MAX_NAME_LENGTH,
            });
        }

        let mut name: String = self
            .text
            .chars()
            .take(MAX_NAME_LENGTH - suffix_len)
            .collect();
        name.push_str(&suffix);
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_name_unchanged() {
        let name = NameCandidate::new("USB-SERIAL CH340").compose().unwrap();
        assert_eq!(name, "USB-SERIAL CH340");
    }

    #[test]
    fn test_port_suffix_appended() {
        let name = NameCandidate::new("USB-SERIAL CH340")
            .with_port("COM7")
            .compose()
            .unwrap();
        assert_eq!(name, "USB-SERIAL CH340 (COM7)");
    }

    #[test]
    fn test_empty_port_adds_nothing() {
        let candidate = NameCandidate::new("abc").with_port("");
        assert_eq!(candidate.port_suffix, None);
        assert_eq!(candidate.compose().unwrap(), "abc");
    }

    #[test]
    fn test_truncation_boundaries_without_suffix() {
        let forty = "a".repeat(40);
        let forty_one = "b".repeat(41);
        let fifty = "c".repeat(50);

        assert_eq!(NameCandidate::new(forty.clone()).compose().unwrap(), forty);
        assert_eq!(
            NameCandidate::new(forty_one).compose().unwrap(),
            "b".repeat(40)
        );
        assert_eq!(NameCandidate::new(fifty).compose().unwrap(), "c".repeat(40));
    }

    #[test]
    fn test_truncation_keeps_suffix() {
        // " (COM7)" is 7 characters, leaving 33 for the name
        let name = NameCandidate::new("x".repeat(50))
            .with_port("COM7")
            .compose()
            .unwrap();
        assert_eq!(name.chars().count(), 40);
        assert_eq!(name, format!("{} (COM7)", "x".repeat(33)));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let name = NameCandidate::new("é".repeat(45)).compose().unwrap();
        assert_eq!(name.chars().count(), 40);
    }

    #[test]
    fn test_oversized_suffix_rejected() {
        let err = NameCandidate::new("name")
            .with_port("P".repeat(40))
            .compose()
            .unwrap_err();
        assert!(matches!(err, NameError::SuffixTooLong { max: 40, .. }));
    }

    proptest! {
        #[test]
        fn composed_name_never_exceeds_limit(
            text in "\\PC{0,80}",
            port in proptest::option::of("COM[0-9]{1,3}"),
        ) {
            let mut candidate = NameCandidate::new(text.clone());
            if let Some(port) = &port {
                candidate = candidate.with_port(port.clone());
            }
            let name = candidate.compose().unwrap();

            prop_assert!(name.chars().count() <= MAX_NAME_LENGTH);

            let head = match &port {
                Some(port) => {
                    let suffix = format!(" ({})", port);
                    prop_assert!(name.ends_with(&suffix));
                    &name[..name.len() - suffix.len()]
                }
                None => name.as_str(),
            };
            prop_assert!(text.starts_with(head));
        }

        #[test]
        fn name_is_kept_whole_when_it_fits(text in "[ -~]{0,33}") {
            let name = NameCandidate::new(text.clone()).with_port("COM7").compose().unwrap();
            prop_assert_eq!(name, format!("{} (COM7)", text));
        }
    }
}
