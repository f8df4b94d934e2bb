//! Access and property modifier bits
//!
//! Bit values follow the JVM access-flag layout so that corpora extracted
//! from class files or dex files can be loaded without translation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// Modifier bit set of an entity
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modifiers(u32);

impl Modifiers {
    pub const NONE: Self = Self(0);
    pub const PUBLIC: Self = Self(0x0001);
    pub const PRIVATE: Self = Self(0x0002);
    pub const PROTECTED: Self = Self(0x0004);
    pub const STATIC: Self = Self(0x0008);
    pub const FINAL: Self = Self(0x0010);
    pub const SYNCHRONIZED: Self = Self(0x0020);
    pub const VOLATILE: Self = Self(0x0040);
    /// Shares its bit with [`Modifiers::VARARGS`]; meaning depends on the entity kind
    pub const TRANSIENT: Self = Self(0x0080);
    pub const VARARGS: Self = Self(0x0080);
    pub const NATIVE: Self = Self(0x0100);
    pub const INTERFACE: Self = Self(0x0200);
    pub const ABSTRACT: Self = Self(0x0400);
    pub const STRICT: Self = Self(0x0800);
    pub const SYNTHETIC: Self = Self(0x1000);
    pub const ANNOTATION: Self = Self(0x2000);
    pub const ENUM: Self = Self(0x4000);

    /// public | private | protected
    pub const ACCESS: Self = Self(0x0007);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// All bits of `other` are set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// At least one bit of `other` is set
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Modifiers {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for Modifiers {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Modifiers({:#06x})", self.0)
    }
}

/// Include/exclude filter over [`Modifiers`]
///
/// A candidate passes when every `include` bit is present, no `exclude` bit
/// is present, and (if `any_of` is non-empty) at least one `any_of` bit is
/// present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierMask {
    pub include: Modifiers,
    pub exclude: Modifiers,
    pub any_of: Modifiers,
}

impl ModifierMask {
    /// Require (`true`) or forbid (`false`) the given bits
    ///
    /// Setting a bit on one side clears it from the other, so the last call wins.
    pub fn set(&mut self, bits: Modifiers, present: bool) {
        if present {
            self.include |= bits;
            self.exclude = self.exclude & !bits;
        } else {
            self.exclude |= bits;
            self.include = self.include & !bits;
        }
    }

    /// Package-private means no access bit; `false` asks for any access bit
    pub fn set_package(&mut self, package: bool) {
        if package {
            self.any_of = Modifiers::NONE;
            self.set(Modifiers::ACCESS, false);
        } else {
            self.exclude = self.exclude & !Modifiers::ACCESS;
            self.any_of = Modifiers::ACCESS;
        }
    }

    pub fn matches(&self, modifiers: Modifiers) -> bool {
        modifiers.contains(self.include)
            && !modifiers.intersects(self.exclude)
            && (self.any_of.is_empty() || modifiers.intersects(self.any_of))
    }
}
