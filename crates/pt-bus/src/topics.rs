//! Topic namespace.
//!
//! State topics are `{kind}/{id}/{field}`; command topics are the same path
//! prefixed with `set/`.

/// Prefix of every inbound command topic.
pub const SET_PREFIX: &str = "set";

/// Topic carrying supervisor alerts raised by rule effects.
pub const SUPERVISOR_ALERTS: &str = "supervisor/alerts";

pub fn tank_volume(id: &str) -> String {
    format!("tank/{id}/volume")
}

pub fn tank_max_capacity(id: &str) -> String {
    format!("tank/{id}/max_capacity")
}

pub fn tank_overflow(id: &str) -> String {
    format!("tank/{id}/overflow")
}

pub fn pump_rate(id: &str) -> String {
    format!("pump/{id}/rate")
}

pub fn pump_state(id: &str) -> String {
    format!("pump/{id}/state")
}

pub fn splitter_status(id: &str) -> String {
    format!("splitter/{id}/status")
}

pub fn set_pump_rate(id: &str) -> String {
    format!("{SET_PREFIX}/pump/{id}/rate")
}

pub fn set_pump_state(id: &str) -> String {
    format!("{SET_PREFIX}/pump/{id}/state")
}

pub fn set_tank_max_capacity(id: &str) -> String {
    format!("{SET_PREFIX}/tank/{id}/max_capacity")
}

/// Split a topic into `(kind, id, field)`, ignoring an optional `set/` prefix.
///
/// Returns the prefix flag alongside so callers can tell commands apart.
pub fn split(topic: &str) -> Option<(bool, &str, &str, &str)> {
    let mut parts: Vec<&str> = topic.split('/').collect();
    let is_command = parts.first() == Some(&SET_PREFIX) && parts.len() == 4;
    if is_command {
        parts.remove(0);
    }
    match parts.as_slice() {
        [kind, id, field] if !id.is_empty() => Some((is_command, kind, id, field)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_topics() {
        assert_eq!(tank_volume("t1"), "tank/t1/volume");
        assert_eq!(tank_overflow("t1"), "tank/t1/overflow");
        assert_eq!(pump_state("p1"), "pump/p1/state");
        assert_eq!(splitter_status("s1"), "splitter/s1/status");
    }

    #[test]
    fn split_command_and_state_topics() {
        assert_eq!(
            split("set/pump/p1/rate"),
            Some((true, "pump", "p1", "rate"))
        );
        assert_eq!(
            split("tank/t1/volume"),
            Some((false, "tank", "t1", "volume"))
        );
        assert_eq!(split("tank//volume"), None);
        assert_eq!(split("dos/attack"), None);
    }
}
