// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::env;

/// Overrides the name this machine answers to.
const HOSTNAME_VAR: &str = "CPUEARS_HOSTNAME";

/// Names that always refer to this machine.
const LOOPBACK_NAMES: [&str; 4] = ["localhost", ".", "127.0.0.1", "::1"];

/// Where the counter for a machine name is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Local,
    Mock(String),
    Remote(String),
}

impl Target {
    /// Classifies the machine name against the name of this machine.
    pub fn resolve(machine: Option<&str>) -> Target {
        Target::classify(machine, &this_machine())
    }

    /// Classifies the machine name against the given local hostname. The local name matches with
    /// or without its domain, ignoring case.
    pub fn classify(machine: Option<&str>, local: &str) -> Target {
        let machine = match machine.map(str::trim).filter(|machine| !machine.is_empty()) {
            Some(machine) => machine,
            None => return Target::Local,
        };

        if machine.starts_with("mock") {
            return Target::Mock(machine.to_string());
        }

        if LOOPBACK_NAMES
            .iter()
            .any(|name| machine.eq_ignore_ascii_case(name))
            || same_host(machine, local)
        {
            Target::Local
        } else {
            Target::Remote(machine.to_string())
        }
    }
}

/// Compares host names, allowing either side to omit its domain.
fn same_host(machine: &str, local: &str) -> bool {
    if local.is_empty() {
        return false;
    }
    if machine.eq_ignore_ascii_case(local) {
        return true;
    }

    let short = |name: &str| name.split('.').next().unwrap_or_default().to_ascii_lowercase();
    let (machine_short, local_short) = (short(machine), short(local));
    let either_unqualified = !machine.contains('.') || !local.contains('.');
    either_unqualified && !machine_short.is_empty() && machine_short == local_short
}

/// The name of this machine, preferring the override variable when set.
fn this_machine() -> String {
    env::var(HOSTNAME_VAR)
        .ok()
        .filter(|name| !name.is_empty())
        .or_else(|| hostname::get().ok().and_then(|name| name.into_string().ok()))
        .unwrap_or_default()
}

#[cfg(test)]
mod test {
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_unnamed_is_local() {
        assert_eq!(Target::Local, Target::classify(None, "monitor-host"));
        assert_eq!(Target::Local, Target::classify(Some("  "), "monitor-host"));
    }

    #[test]
    fn test_loopback_names() {
        for name in ["localhost", "LocalHost", ".", "127.0.0.1", "::1"] {
            assert_eq!(Target::Local, Target::classify(Some(name), "monitor-host"));
        }
    }

    #[test]
    fn test_local_hostname_matches() {
        let local = "monitor-host.corp.example";
        assert_eq!(Target::Local, Target::classify(Some("MONITOR-HOST"), local));
        assert_eq!(
            Target::Local,
            Target::classify(Some("monitor-host.corp.example"), local)
        );
        assert_eq!(
            Target::Local,
            Target::classify(Some("monitor-host.corp.example"), "monitor-host")
        );
    }

    #[test]
    fn test_remote_names() {
        let local = "monitor-host.corp.example";
        assert_eq!(
            Target::Remote("build-server".to_string()),
            Target::classify(Some("build-server"), local)
        );
        assert_eq!(
            Target::Remote("monitor-host.other.example".to_string()),
            Target::classify(Some("monitor-host.other.example"), local)
        );
        assert_eq!(
            Target::Remote("monitor".to_string()),
            Target::classify(Some("monitor"), local)
        );
        // An unknown local name only matches loopback names.
        assert_eq!(
            Target::Remote("monitor-host".to_string()),
            Target::classify(Some("monitor-host"), "")
        );
    }

    #[test]
    fn test_mock_names() {
        assert_eq!(
            Target::Mock("mock:5,95".to_string()),
            Target::classify(Some(" mock:5,95 "), "monitor-host")
        );
    }

    #[test]
    #[serial]
    fn test_resolve_uses_hostname_override() {
        env::set_var(HOSTNAME_VAR, "studio-7");
        let local = Target::resolve(Some("Studio-7"));
        let remote = Target::resolve(Some("studio-8"));
        env::remove_var(HOSTNAME_VAR);

        assert_eq!(Target::Local, local);
        assert_eq!(Target::Remote("studio-8".to_string()), remote);
    }
}
