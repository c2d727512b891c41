//! IP address families and the derived family set.

use std::fmt;

/// An IP address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Afi {
    Ipv4,
    Ipv6,
}

impl Afi {
    /// The DNS record type queried for this family.
    pub fn record_type(self) -> &'static str {
        match self {
            Afi::Ipv4 => "A",
            Afi::Ipv6 => "AAAA",
        }
    }

    /// The conventional family number (4 or 6).
    pub fn number(self) -> u8 {
        match self {
            Afi::Ipv4 => 4,
            Afi::Ipv6 => 6,
        }
    }
}

impl fmt::Display for Afi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Afi::Ipv4 => f.write_str("IPv4"),
            Afi::Ipv6 => f.write_str("IPv6"),
        }
    }
}

/// The set of address families usable for the current location selection.
///
/// Derived from the VRF intersection, never persisted. Empty only when no
/// intersecting VRF supports either family (or no intersection exists).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FamilySet {
    ipv4: bool,
    ipv6: bool,
}

impl FamilySet {
    pub const EMPTY: Self = Self {
        ipv4: false,
        ipv6: false,
    };
    pub const IPV4: Self = Self {
        ipv4: true,
        ipv6: false,
    };
    pub const IPV6: Self = Self {
        ipv4: false,
        ipv6: true,
    };
    pub const DUAL: Self = Self {
        ipv4: true,
        ipv6: true,
    };

    /// Derive the family set from capability counts over a VRF
    /// intersection.
    ///
    /// Both counts nonzero and equal yields both families; otherwise the
    /// larger nonzero count wins; two zero counts yield the empty set.
    pub fn from_counts(ipv4: usize, ipv6: usize) -> Self {
        if ipv4 != 0 && ipv4 == ipv6 {
            Self::DUAL
        } else if ipv4 > ipv6 {
            Self::IPV4
        } else if ipv6 > ipv4 {
            Self::IPV6
        } else {
            Self::EMPTY
        }
    }

    pub fn contains(self, afi: Afi) -> bool {
        match afi {
            Afi::Ipv4 => self.ipv4,
            Afi::Ipv6 => self.ipv6,
        }
    }

    pub fn is_empty(self) -> bool {
        !self.ipv4 && !self.ipv6
    }

    /// Iterate the contained families, IPv4 first.
    pub fn iter(self) -> impl Iterator<Item = Afi> {
        self.ipv4
            .then_some(Afi::Ipv4)
            .into_iter()
            .chain(self.ipv6.then_some(Afi::Ipv6))
    }
}

impl fmt::Display for FamilySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, afi) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", afi.number())?;
        }
        f.write_str("}")
    }
}
