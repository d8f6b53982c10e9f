use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Numeric identifier of a gene in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneId(pub i64);

impl GeneId {
    /// Parse a path segment into a gene id.
    /// Returns None for anything that is not a base-10 integer.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        s.trim().parse::<i64>().ok().map(Self)
    }
}

impl std::fmt::Display for GeneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declares a UUID-backed identifier newtype.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random (v4) identifier
            #[must_use]
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse a textual UUID (hyphenated or simple form)
            #[must_use]
            pub fn parse(s: &str) -> Option<Self> {
                Uuid::parse_str(s.trim()).ok().map(Self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0.hyphenated())
            }
        }
    };
}

uuid_id!(
    /// Identifier of a genetic variant
    VariantId
);
uuid_id!(
    /// Identifier of a patient variant report
    ReportId
);
uuid_id!(
    /// Opaque patient identity, owned by the clinical service
    PatientId
);

/// Functional consequence classification of a variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Impact {
    Missense,
    Nonsense,
    Frameshift,
    Silent,
    #[serde(rename = "Splice Site")]
    SpliceSite,
    Otros,
}

impl Impact {
    /// Every accepted impact, in display order
    pub const ALL: [Impact; 6] = [
        Impact::Missense,
        Impact::Nonsense,
        Impact::Frameshift,
        Impact::Silent,
        Impact::SpliceSite,
        Impact::Otros,
    ];

    /// The stored and rendered label
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Missense => "Missense",
            Self::Nonsense => "Nonsense",
            Self::Frameshift => "Frameshift",
            Self::Silent => "Silent",
            Self::SpliceSite => "Splice Site",
            Self::Otros => "Otros",
        }
    }

    /// Exact, case-sensitive label match
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|impact| impact.as_str() == s)
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gene_id_parse() {
        assert_eq!(GeneId::parse("42"), Some(GeneId(42)));
        assert_eq!(GeneId::parse(" 7 "), Some(GeneId(7)));
        assert_eq!(GeneId::parse("abc"), None);
        assert_eq!(GeneId::parse("1.5"), None);
        assert_eq!(GeneId::parse(""), None);
    }

    #[test]
    fn test_uuid_ids_parse() {
        let id = VariantId::new_v4();
        assert_eq!(VariantId::parse(&id.to_string()), Some(id));
        assert!(VariantId::parse("not-a-uuid").is_none());
        assert!(ReportId::parse("12345").is_none());

        // Simple (non-hyphenated) form is accepted and rendered hyphenated
        let simple = "a1a2a3a4b1b2c1c2d1d2d3d4d5d6d7d8";
        let parsed = PatientId::parse(simple).unwrap();
        assert_eq!(parsed.to_string(), "a1a2a3a4-b1b2-c1c2-d1d2-d3d4d5d6d7d8");
    }

    #[test]
    fn test_impact_labels() {
        for impact in Impact::ALL {
            assert_eq!(Impact::parse(impact.as_str()), Some(impact));
        }
        assert_eq!(Impact::parse("Splice Site"), Some(Impact::SpliceSite));
        assert_eq!(Impact::parse("missense"), None);
        assert_eq!(Impact::parse("SpliceSite"), None);
        assert_eq!(Impact::parse("Synonymous"), None);
    }

    #[test]
    fn test_impact_serde() {
        let json = serde_json::to_string(&Impact::SpliceSite).unwrap();
        assert_eq!(json, "\"Splice Site\"");
        let back: Impact = serde_json::from_str("\"Otros\"").unwrap();
        assert_eq!(back, Impact::Otros);
    }
}
