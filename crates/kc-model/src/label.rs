use std::fmt;

/// Separator between namespace and instance name inside an [`EntityLabel`].
pub const LABEL_SEPARATOR: char = '_';

/// Display name of a game-world entity standing for one workload instance.
///
/// The label is `namespace + "_" + name`. Decoding is only unambiguous when neither half
/// contains the separator; [`EntityLabel::decode`] refuses to guess in that case.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct EntityLabel(String);

impl EntityLabel {
    /// Build the label for `(namespace, name)`. Never fails.
    pub fn encode(namespace: &str, name: &str) -> Self {
        let mut label = String::with_capacity(namespace.len() + name.len() + 1);
        label.push_str(namespace);
        label.push(LABEL_SEPARATOR);
        label.push_str(name);
        Self(label)
    }

    /// Split a label back into `(namespace, name)`.
    ///
    /// Returns `None` unless the label contains exactly one separator with a non-empty side on
    /// each end of it.
    pub fn decode(label: &str) -> Option<(&str, &str)> {
        let mut parts = label.split(LABEL_SEPARATOR);
        let namespace = parts.next()?;
        let name = parts.next()?;
        if parts.next().is_some() || namespace.is_empty() || name.is_empty() {
            return None;
        }
        Some((namespace, name))
    }

    /// Like [`EntityLabel::decode`], for a label that is already typed.
    #[inline]
    pub fn parts(&self) -> Option<(&str, &str)> {
        Self::decode(&self.0)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_joins_with_separator() {
        assert_eq!(EntityLabel::encode("default", "nginx").as_str(), "default_nginx");
    }

    #[test]
    fn decode_inverts_encode_for_identifier_alphabet() {
        let pairs = [
            ("ns1", "a"),
            ("foo-bar", "baz-1"),
            ("kube-system", "coredns-5d78c9869d-x2x7q"),
            ("0", "9-9"),
        ];
        for (ns, name) in pairs {
            let label = EntityLabel::encode(ns, name);
            assert_eq!(label.parts(), Some((ns, name)), "label {label}");
        }
    }

    #[test]
    fn decode_rejects_missing_separator() {
        assert_eq!(EntityLabel::decode("nginx"), None);
    }

    #[test]
    fn decode_rejects_ambiguous_split() {
        assert_eq!(EntityLabel::decode("a_b_c"), None);
        assert_eq!(EntityLabel::encode("my_ns", "pod").parts(), None);
    }

    #[test]
    fn decode_rejects_empty_halves() {
        assert_eq!(EntityLabel::decode("_pod"), None);
        assert_eq!(EntityLabel::decode("ns_"), None);
        assert_eq!(EntityLabel::decode("_"), None);
    }
}
