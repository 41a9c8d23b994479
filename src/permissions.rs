//! PDF permission keywords (`print,no-copy,...`) and the permission bitmask.

use serde::Serialize;

/// A single grantable PDF permission. Values are the PDF `/P` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Print = 4,
    Modify = 8,
    Copy = 16,
    Annotate = 32,
}

/// The PDF `/P` value: every permission granted.
pub const ALL: i32 = -4;
/// The PDF `/P` value: no permission granted.
pub const NONE: i32 = -64;

/// Permission bitmask as stored in the PDF `/P` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Permissions(pub i32);

impl Default for Permissions {
    fn default() -> Self {
        Permissions(ALL)
    }
}

impl Permissions {
    pub fn allows(self, p: Permission) -> bool {
        self.0 & p as i32 != 0
    }

    pub fn is_all(self) -> bool {
        self.0 == ALL
    }

    /// Apply a comma-separated keyword list left to right.
    ///
    /// `all` and `none` reset the mask outright; `<perm>` grants and `no-<perm>` revokes.
    /// Keywords are case-insensitive. Unknown keywords are logged and skipped.
    pub fn apply(&mut self, list: &str) {
        for keyword in list.split(',') {
            let keyword = keyword.trim();
            if keyword.is_empty() {
                continue;
            }
            let lower = keyword.to_ascii_lowercase();
            match lower.as_str() {
                "all" => self.0 = ALL,
                "none" => self.0 = NONE,
                other => {
                    let (revoke, name) = match other.strip_prefix("no-") {
                        Some(name) => (true, name),
                        None => (false, other),
                    };
                    match permission_named(name) {
                        Some(p) if revoke => self.0 &= !(p as i32),
                        Some(p) => self.0 |= p as i32,
                        None => tracing::warn!("Unknown permission \"{}\" ignored.", keyword),
                    }
                }
            }
        }
    }
}

fn permission_named(name: &str) -> Option<Permission> {
    match name {
        "print" => Some(Permission::Print),
        "modify" => Some(Permission::Modify),
        "copy" => Some(Permission::Copy),
        "annotate" => Some(Permission::Annotate),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVERY: [Permission; 4] = [
        Permission::Print,
        Permission::Modify,
        Permission::Copy,
        Permission::Annotate,
    ];

    #[test]
    fn default_grants_everything() {
        let p = Permissions::default();
        assert!(p.is_all());
        assert!(EVERY.iter().all(|x| p.allows(*x)));
    }

    #[test]
    fn all_then_no_print_clears_only_print() {
        let mut p = Permissions(NONE);
        p.apply("all,no-print");
        assert_eq!(p.0, ALL & !(Permission::Print as i32));
        assert!(!p.allows(Permission::Print));
        assert!(p.allows(Permission::Modify));
        assert!(p.allows(Permission::Copy));
        assert!(p.allows(Permission::Annotate));
    }

    #[test]
    fn none_then_print_grants_only_print() {
        let mut p = Permissions::default();
        p.apply("none,print");
        assert_eq!(p.0, NONE | Permission::Print as i32);
        assert!(p.allows(Permission::Print));
        assert!(!p.allows(Permission::Modify));
        assert!(!p.allows(Permission::Copy));
        assert!(!p.allows(Permission::Annotate));
    }

    #[test]
    fn absorbing_tokens_reset_previous_grants() {
        let mut p = Permissions::default();
        p.apply("no-copy,no-modify,all");
        assert!(p.is_all());
        p.apply("print,copy,none");
        assert_eq!(p.0, NONE);
    }

    #[test]
    fn unknown_keywords_are_ignored() {
        let mut p = Permissions::default();
        p.apply("fly,NO-ANNOTATE,,teleport");
        assert_eq!(p.0, ALL & !(Permission::Annotate as i32));
    }
}
