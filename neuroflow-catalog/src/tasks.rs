//! Task catalog - user intents mapped 1:1 to target states

/// A user intent with its target state and timing recommendations
#[derive(Debug, Clone, Copy)]
pub struct Task {
    pub id: &'static str,
    pub label: &'static str,
    /// Id of the target state this task drives toward
    pub target_state_id: &'static str,
    /// Suggested session length in minutes
    pub recommended_minutes: u32,
    /// Length of the matching-to-target transition in minutes
    pub transition_minutes: u32,
}

static TASKS: &[Task] = &[
    Task {
        id: "ESTUDAR",
        label: "Estudar/Trabalhar",
        target_state_id: "FOCO",
        recommended_minutes: 25,
        transition_minutes: 5,
    },
    Task {
        id: "CRIAR",
        label: "Criar/Brainstorm",
        target_state_id: "CRIATIVIDADE",
        recommended_minutes: 30,
        transition_minutes: 8,
    },
    Task {
        id: "RELAXAR",
        label: "Relaxar",
        target_state_id: "RELAXAMENTO",
        recommended_minutes: 15,
        transition_minutes: 10,
    },
    Task {
        id: "MEDITAR",
        label: "Meditar",
        target_state_id: "MEDITACAO",
        recommended_minutes: 20,
        transition_minutes: 12,
    },
    Task {
        id: "DORMIR",
        label: "Dormir",
        target_state_id: "SONO",
        recommended_minutes: 60,
        transition_minutes: 15,
    },
    Task {
        id: "ENERGIZAR",
        label: "Energizar",
        target_state_id: "ENERGIA",
        recommended_minutes: 10,
        transition_minutes: 5,
    },
];

/// All tasks, in presentation order
pub fn tasks() -> &'static [Task] {
    TASKS
}

/// Look up a task by id
pub fn task(id: &str) -> Option<&'static Task> {
    TASKS.iter().find(|t| t.id == id)
}

/// Look up the task that drives toward a target state
pub fn task_for_target(target_state_id: &str) -> Option<&'static Task> {
    TASKS.iter().find(|t| t.target_state_id == target_state_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::states::target_state;

    #[test]
    fn test_every_task_targets_a_known_state() {
        for t in tasks() {
            assert!(
                target_state(t.target_state_id).is_some(),
                "{} targets unknown state {}",
                t.id,
                t.target_state_id
            );
            assert!(t.recommended_minutes > 0);
            assert!(t.transition_minutes > 0);
        }
    }

    #[test]
    fn test_task_lookup() {
        assert_eq!(task("DORMIR").unwrap().target_state_id, "SONO");
        assert!(task("NOPE").is_none());
    }

    #[test]
    fn test_task_lookup_by_target_state() {
        assert_eq!(task_for_target("FOCO").unwrap().id, "ESTUDAR");
        assert_eq!(task_for_target("SONO").unwrap().id, "DORMIR");
        assert!(task_for_target("RAIVA").is_none());
    }
}
