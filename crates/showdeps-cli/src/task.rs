use std::process::Command;

use tracing::debug;

use showdeps_core::{Classification, ShowdepsError, ShowdepsResult};

/// Runs the task tool with already-built arguments (program name excluded).
pub trait TaskRunner {
    fn run(&self, args: &[String]) -> ShowdepsResult<()>;
}

/// Arguments for the task tool, or `None` when there is nothing to run.
///
/// Report: the whole list as one filter string. Command at `p`: the first
/// `p` tokens verbatim, then everything after the command as one string.
pub fn task_args(classification: Classification, args: &[String]) -> Option<Vec<String>> {
    match classification {
        Classification::Report => Some(vec![args.join(" ")]),
        Classification::Command { at: 0 } => None,
        Classification::Command { at } => {
            let at = at.min(args.len());
            let (command, rest) = args.split_at(at);
            let mut out = command.to_vec();
            // An empty trailing argument would reach Taskwarrior as a blank
            // filter word, so a bare command (`12 done`) ends at the command.
            if !rest.is_empty() {
                out.push(rest.join(" "));
            }
            Some(out)
        }
    }
}

/// Spawns the task program and waits for it. Its own stdout/stderr go
/// straight to the terminal.
pub struct ProcessTaskRunner {
    program: String,
}

impl ProcessTaskRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl TaskRunner for ProcessTaskRunner {
    fn run(&self, args: &[String]) -> ShowdepsResult<()> {
        debug!("running {} {args:?}", self.program);
        let status = Command::new(&self.program).args(args).status().map_err(|e| {
            ShowdepsError::Collaborator(format!("failed to spawn '{}': {e}", self.program))
        })?;
        if !status.success() {
            return Err(ShowdepsError::Collaborator(format!(
                "'{}' exited with {status}",
                self.program
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_report_joins_everything() {
        let a = args(&["pro:work", "+PENDING"]);
        assert_eq!(
            task_args(Classification::Report, &a),
            Some(vec!["pro:work +PENDING".to_string()])
        );
    }

    #[test]
    fn test_command_keeps_leading_tokens_discrete() {
        let a = args(&["5", "mod", "depends:4", "pri:H"]);
        assert_eq!(
            task_args(Classification::Command { at: 2 }, &a),
            Some(args(&["5", "mod", "depends:4 pri:H"]))
        );
    }

    #[test]
    fn test_command_without_trailing_tokens() {
        let a = args(&["12", "done"]);
        assert_eq!(
            task_args(Classification::Command { at: 2 }, &a),
            Some(args(&["12", "done"]))
        );
    }

    #[test]
    fn test_command_first_token() {
        let a = args(&["add", "write", "docs", "pro:work"]);
        assert_eq!(
            task_args(Classification::Command { at: 1 }, &a),
            Some(args(&["add", "write docs pro:work"]))
        );
    }

    #[test]
    fn test_reuse_runs_nothing() {
        assert_eq!(task_args(Classification::Command { at: 0 }, &[]), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_collaborator_failure() {
        let runner = ProcessTaskRunner::new("false");
        assert!(matches!(runner.run(&[]), Err(ShowdepsError::Collaborator(_))));
    }

    #[test]
    fn test_missing_program_is_collaborator_failure() {
        let runner = ProcessTaskRunner::new("showdeps-test-no-such-program");
        assert!(matches!(
            runner.run(&args(&["list"])),
            Err(ShowdepsError::Collaborator(_))
        ));
    }
}
