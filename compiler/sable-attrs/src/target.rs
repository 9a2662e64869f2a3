//! Defines the declaration kinds that attributes can be applied to.

use std::fmt;

use sable_utils::{bitflags::bitflags, printing::SequenceDisplay};

bitflags! {
    /// The subject mask of an attribute. Registrations carry the mask of
    /// declaration kinds they accept, and an attachment is rejected when
    /// the subject declaration falls outside of it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AttrTarget: u32 {
        const Fn = 1 << 1;
        const Const = 1 << 2;
        const TyDef = 1 << 3;

        const Item = Self::Fn.bits() | Self::Const.bits() | Self::TyDef.bits();
    }
}

impl fmt::Display for AttrTarget {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        let mut names = vec![];

        if self.contains(AttrTarget::Fn) {
            names.push("function");
        }
        if self.contains(AttrTarget::Const) {
            names.push("constant");
        }
        if self.contains(AttrTarget::TyDef) {
            names.push("type definition");
        }

        write!(out, "{}", SequenceDisplay::either(&names))
    }
}

#[cfg(test)]
mod test_super {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn targets_display_as_alternatives() {
        assert_eq!(format!("{}", AttrTarget::Fn), "a `function`");
        assert_eq!(
            format!("{}", AttrTarget::Fn | AttrTarget::Const),
            "either a `function` or `constant`"
        );
        assert_eq!(
            format!("{}", AttrTarget::Item),
            "either a `function`, `constant` or `type definition`"
        );
    }

    #[test]
    fn item_covers_every_kind() {
        assert!(AttrTarget::Item.contains(AttrTarget::Fn));
        assert!(AttrTarget::Item.contains(AttrTarget::Const));
        assert!(AttrTarget::Item.contains(AttrTarget::TyDef));
    }
}
