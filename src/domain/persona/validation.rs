//! Reference checks for dialogue trees.
//!
//! The dialogue engine tolerates dangling step references at runtime, but a
//! persona author wants to hear about them when the file is loaded.

use thiserror::Error;

use super::config::{PersonaConfig, START_STEP};

/// A broken reference inside a persona's dialogue trees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceIssue {
    #[error("tree '{tree}' has no 'start' step")]
    MissingStartStep { tree: String },

    #[error("tree '{tree}' step '{step}' option '{option}' points to missing step '{target}'")]
    DanglingOption {
        tree: String,
        step: String,
        option: String,
        target: String,
    },

    #[error("tree '{tree}' step '{step}' defaultNext points to missing step '{target}'")]
    DanglingDefault {
        tree: String,
        step: String,
        target: String,
    },
}

/// Lists every dangling reference in the persona's dialogue trees.
///
/// Issues are reported in tree, step and option order.
pub fn check_references(persona: &PersonaConfig) -> Vec<ReferenceIssue> {
    let mut issues = Vec::new();

    for (tree_name, tree) in persona.dialogue_trees.iter() {
        if !tree.steps.contains_key(START_STEP) {
            issues.push(ReferenceIssue::MissingStartStep {
                tree: tree_name.to_string(),
            });
        }

        for (step_key, step) in tree.steps.iter() {
            for (option, branch) in step.options.iter() {
                if !tree.steps.contains_key(&branch.next_step) {
                    issues.push(ReferenceIssue::DanglingOption {
                        tree: tree_name.to_string(),
                        step: step_key.to_string(),
                        option: option.to_string(),
                        target: branch.next_step.clone(),
                    });
                }
            }

            if let Some(target) = &step.default_next {
                if !tree.steps.contains_key(target) {
                    issues.push(ReferenceIssue::DanglingDefault {
                        tree: tree_name.to_string(),
                        step: step_key.to_string(),
                        target: target.clone(),
                    });
                }
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::persona::{DialogueTree, StepDefinition};

    fn persona_with(tree: DialogueTree) -> PersonaConfig {
        let mut persona = PersonaConfig::default();
        persona.dialogue_trees.insert("quest", tree);
        persona
    }

    #[test]
    fn consistent_tree_has_no_issues() {
        let tree = DialogueTree::default()
            .with_trigger("quest")
            .with_step("start", StepDefinition::new("Go?").with_option("yes", "end"))
            .with_step("end", StepDefinition::terminal("Done"));

        assert!(check_references(&persona_with(tree)).is_empty());
    }

    #[test]
    fn reports_missing_start_step() {
        let tree = DialogueTree::default().with_step("middle", StepDefinition::new("Hm"));

        assert_eq!(
            check_references(&persona_with(tree)),
            vec![ReferenceIssue::MissingStartStep {
                tree: "quest".to_string()
            }]
        );
    }

    #[test]
    fn reports_dangling_option_and_default() {
        let tree = DialogueTree::default().with_step(
            "start",
            StepDefinition::new("Go?")
                .with_option("yes", "nowhere")
                .with_default_next("void"),
        );

        let issues = check_references(&persona_with(tree));

        assert_eq!(issues.len(), 2);
        assert!(matches!(&issues[0], ReferenceIssue::DanglingOption { target, .. } if target == "nowhere"));
        assert!(matches!(&issues[1], ReferenceIssue::DanglingDefault { target, .. } if target == "void"));
    }

    #[test]
    fn issue_messages_name_the_tree_and_step() {
        let issue = ReferenceIssue::DanglingDefault {
            tree: "quest".to_string(),
            step: "start".to_string(),
            target: "void".to_string(),
        };

        assert_eq!(
            issue.to_string(),
            "tree 'quest' step 'start' defaultNext points to missing step 'void'"
        );
    }
}
