//! Which members survive into the API-only class
//!
//! The rules, in priority order:
//!
//!   1. the static initializer is always dropped (its effects on `static
//!      final` values are implementation, not API);
//!   2. bridge and synthetic members are always dropped (the compiler that
//!      consumes the output will regenerate its own);
//!   3. with `remove_non_public`, members without `ACC_PUBLIC` are dropped;
//!   4. everything else is kept.
//!
//! Both functions are total over the flag bit-set and have no side effects.

use crate::jvm::{FieldAccessFlags, MethodAccessFlags, Name, UnqualifiedName};

/// Should this field appear in the output class?
pub fn keep_field(access_flags: FieldAccessFlags, remove_non_public: bool) -> bool {
    if access_flags.intersects(FieldAccessFlags::SYNTHETIC) {
        return false;
    }
    if remove_non_public && !access_flags.contains(FieldAccessFlags::PUBLIC) {
        return false;
    }
    true
}

/// Should this method appear in the output class?
pub fn keep_method(name: &str, access_flags: MethodAccessFlags, remove_non_public: bool) -> bool {
    if name == UnqualifiedName::CLINIT.as_str() {
        return false;
    }
    if access_flags.intersects(MethodAccessFlags::BRIDGE | MethodAccessFlags::SYNTHETIC) {
        return false;
    }
    if remove_non_public && !access_flags.contains(MethodAccessFlags::PUBLIC) {
        return false;
    }
    true
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn static_initializer_always_dropped() {
        let flags = MethodAccessFlags::STATIC;
        assert!(!keep_method("<clinit>", flags, false));
        assert!(!keep_method("<clinit>", flags | MethodAccessFlags::PUBLIC, true));
    }

    #[test]
    fn bridge_and_synthetic_always_dropped() {
        let public = MethodAccessFlags::PUBLIC;
        assert!(!keep_method("get", public | MethodAccessFlags::BRIDGE, false));
        assert!(!keep_method("get", public | MethodAccessFlags::SYNTHETIC, false));
        assert!(!keep_field(
            FieldAccessFlags::PUBLIC | FieldAccessFlags::SYNTHETIC,
            false
        ));
    }

    #[test]
    fn non_public_dropped_only_on_request() {
        let package_private = MethodAccessFlags::empty();
        assert!(keep_method("helper", package_private, false));
        assert!(!keep_method("helper", package_private, true));

        assert!(keep_field(FieldAccessFlags::PRIVATE, false));
        assert!(!keep_field(FieldAccessFlags::PRIVATE, true));
        assert!(keep_field(FieldAccessFlags::PUBLIC, true));
    }

    #[test]
    fn constructors_follow_the_ordinary_rules() {
        assert!(keep_method("<init>", MethodAccessFlags::PUBLIC, true));
        assert!(!keep_method("<init>", MethodAccessFlags::PRIVATE, true));
    }
}
