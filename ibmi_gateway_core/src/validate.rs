//! Lexical command classification
//!
//! The validator is a positive-security (default-deny) classifier layered
//! with an explicit metacharacter denylist. It performs no parsing of the
//! CL language; matching is anchored at the start of the normalized
//! command, and the remote interpreter is relied upon to reject malformed
//! trailing arguments.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Outcome of classifying one command string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum Verdict {
    Allowed,
    Rejected { reason: String },
}

impl Verdict {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// What a matched rule decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Deny,
    Allow,
}

/// One entry in the ordered classification table.
struct Rule {
    id: &'static str,
    action: Action,
    test: Regex,
    reason: &'static str,
}

const POLICY_MESSAGE: &str = "SECURITY VIOLATION: Command blocked by allowlist policy. \
    Permitted: DSP*, WRK*, RTV*, SELECT, CRTBNDCL, CRTBNDRPG, CRTBNDCBL, CRTSRVPGM.";

/// The fixed, user-visible rejection notice.
///
/// Textually stable: callers and the test suite treat it as part of the
/// observable contract.
#[must_use]
pub const fn policy_message() -> &'static str {
    POLICY_MESSAGE
}

/// Rules are evaluated in table order. Deny rules come first and cannot
/// be overridden by a later allow match: a command with an allowed prefix
/// and a chained payload (`DSPJOB; DLTLIB X`) is still an injection
/// attempt.
fn rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            Rule {
                id: "deny:metacharacter",
                action: Action::Deny,
                test: Regex::new(r"[;|]").expect("hardcoded pattern"),
                reason: "contains forbidden metacharacter",
            },
            Rule {
                id: "allow:prefix",
                action: Action::Allow,
                test: Regex::new(
                    r"^(DSP[A-Z0-9]+|WRK[A-Z0-9]+|RTV[A-Z0-9]+|SELECT\s|CRT(BNDCL|BNDRPG|BNDCBL|SRVPGM)\s)",
                )
                .expect("hardcoded pattern"),
                reason: "",
            },
        ]
    })
}

/// Classify one raw command string.
///
/// Pure and total: never fails, always returns a verdict. The input is
/// trimmed and upper-cased before matching, so classification is
/// case-insensitive and ignores surrounding whitespace.
#[must_use]
pub fn validate(command: &str) -> Verdict {
    let normalized = command.trim().to_uppercase();
    for rule in rules() {
        if rule.test.is_match(&normalized) {
            return match rule.action {
                Action::Deny => Verdict::Rejected {
                    reason: rule.reason.to_string(),
                },
                Action::Allow => Verdict::Allowed,
            };
        }
    }
    Verdict::Rejected {
        reason: "not in allowlist".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{policy_message, rules, validate, Action, Verdict};
    use rstest::rstest;

    #[rstest]
    #[case("DSPSYSSTS")]
    #[case("DSPJOB JOB(123456/QUSER/QPADEV0001)")]
    #[case("WRKACTJOB")]
    #[case("RTVJOBA USRLIBL(&LIBL)")]
    #[case("SELECT * FROM QSYS2.SYSTABLES")]
    #[case("CRTBNDCL PGM(DEVLIB/TEST) SRCFILE(DEVLIB/QCLSRC)")]
    #[case("CRTBNDRPG PGM(DEVLIB/TEST)")]
    #[case("CRTBNDCBL PGM(DEVLIB/TEST)")]
    #[case("CRTSRVPGM SRVPGM(DEVLIB/TEST)")]
    #[case("dspsyssts")]
    #[case("WrKaCtJoB")]
    #[case("SeLeCt * FrOm TaBle")]
    #[case("  DSPSYSSTS  ")]
    #[case("\tWRKACTJOB\n")]
    fn allows(#[case] command: &str) {
        assert_eq!(validate(command), Verdict::Allowed, "command: {command:?}");
    }

    #[rstest]
    #[case("DLTLIB TESTLIB")]
    #[case("DLTF FILE(LIB/F)")]
    #[case("CLRPFM FILE(LIB/F)")]
    #[case("CHGUSRPRF USRPRF(QSECOFR)")]
    #[case("CALL PGM(LIB/PGM)")]
    #[case("CRTUSRPRF USRPRF(HACKER)")]
    #[case("CRTLIB LIB(EVIL)")]
    #[case("CRTAUTL AUTL(EVIL)")]
    #[case("rm -rf /")]
    #[case("DSP")]
    #[case("SELECT")]
    #[case("")]
    #[case("   ")]
    fn rejects_not_in_allowlist(#[case] command: &str) {
        assert_eq!(
            validate(command),
            Verdict::Rejected {
                reason: "not in allowlist".to_string()
            },
            "command: {command:?}"
        );
    }

    // The deny rule wins even when the command also matches an allowed
    // prefix.
    #[rstest]
    #[case("DSPSYSSTS; DLTLIB TESTLIB")]
    #[case("WRKACTJOB | CALL PGM")]
    #[case("SELECT * FROM T; DROP TABLE T")]
    #[case("RTVJOBA;")]
    #[case(";")]
    #[case("|")]
    fn rejects_metacharacters(#[case] command: &str) {
        assert_eq!(
            validate(command),
            Verdict::Rejected {
                reason: "contains forbidden metacharacter".to_string()
            },
            "command: {command:?}"
        );
    }

    #[test]
    fn deny_rules_precede_allow_rules() {
        let table = rules();
        let first_allow = table
            .iter()
            .position(|r| r.action == Action::Allow)
            .expect("table has an allow rule");
        assert!(table[..first_allow]
            .iter()
            .all(|r| r.action == Action::Deny));
    }

    #[test]
    fn policy_message_is_stable() {
        let message = policy_message();
        for fragment in [
            "DSP*", "WRK*", "RTV*", "SELECT", "CRTBNDCL", "CRTBNDRPG", "CRTBNDCBL", "CRTSRVPGM",
        ] {
            assert!(message.contains(fragment), "missing {fragment}");
        }
        assert!(!message.contains('\n'), "message must be a single line");
    }
}
