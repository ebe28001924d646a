// Policy Table
//
// Fixed presentation policy per notification type, lowest priority first:
// preaviso < llamada_mesa < turno_listo. Everything unrecognized gets the
// generic restaurant policy.

use crate::payload::NotificationKind;

pub const TAG_PREAVISO: &str = "preaviso-turno";
pub const TAG_LLAMADA: &str = "llamada-mesa";
pub const TAG_TURNO: &str = "turno-mesa";
pub const TAG_GENERIC: &str = "restaurant-notification";

/// Vibration energy of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Urgency {
    Low,
    High,
    Maximum,
}

impl Urgency {
    /// Alternating vibrate/pause durations (ms); total duration grows with urgency
    pub fn vibration_pattern(&self) -> Vec<u32> {
        match self {
            Urgency::Low => vec![200, 100, 200],
            Urgency::High => vec![300, 100, 300, 100, 300],
            Urgency::Maximum => vec![500, 200, 500, 200, 500, 200, 500],
        }
    }
}

/// One row of the policy table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindPolicy {
    pub tag: &'static str,
    pub urgency: Urgency,
    /// Stay on screen until the user dismisses it
    pub require_interaction: bool,
}

/// Look up the policy row for a notification type
pub fn policy_for(kind: NotificationKind) -> KindPolicy {
    match kind {
        NotificationKind::Preaviso => KindPolicy {
            tag: TAG_PREAVISO,
            urgency: Urgency::Low,
            require_interaction: false,
        },
        NotificationKind::LlamadaMesa => KindPolicy {
            tag: TAG_LLAMADA,
            urgency: Urgency::High,
            require_interaction: true,
        },
        NotificationKind::TurnoListo => KindPolicy {
            tag: TAG_TURNO,
            urgency: Urgency::Maximum,
            require_interaction: true,
        },
        NotificationKind::Other => KindPolicy {
            tag: TAG_GENERIC,
            urgency: Urgency::Low,
            require_interaction: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy(urgency: Urgency) -> u32 {
        urgency.vibration_pattern().iter().sum()
    }

    #[test]
    fn test_vibration_energy_grows_with_urgency() {
        assert!(energy(Urgency::Low) < energy(Urgency::High));
        assert!(energy(Urgency::High) < energy(Urgency::Maximum));
    }

    #[test]
    fn test_patterns_alternate_vibrate_and_pause() {
        for urgency in [Urgency::Low, Urgency::High, Urgency::Maximum] {
            // odd length: starts and ends with a vibration
            assert_eq!(urgency.vibration_pattern().len() % 2, 1);
        }
    }

    #[test]
    fn test_priority_order_of_table() {
        let preaviso = policy_for(NotificationKind::Preaviso);
        let llamada = policy_for(NotificationKind::LlamadaMesa);
        let turno = policy_for(NotificationKind::TurnoListo);

        assert!(preaviso.urgency < llamada.urgency);
        assert!(llamada.urgency < turno.urgency);
        assert!(!preaviso.require_interaction);
        assert!(llamada.require_interaction && turno.require_interaction);
    }

    #[test]
    fn test_other_uses_generic_row() {
        let other = policy_for(NotificationKind::Other);
        assert_eq!(other.tag, TAG_GENERIC);
        assert_eq!(other.urgency, Urgency::Low);
        assert!(!other.require_interaction);
    }
}
