use std::path::{Path, PathBuf};

use tracing::info;

use showdeps_core::{
    classify, effective_query, Classification, CommandTable, Query, QueryStore, Renderer,
    ShowdepsError, ShowdepsResult,
};

use crate::task::{task_args, TaskRunner};

pub struct PipelineOptions {
    pub output: PathBuf,
    pub show_deleted: bool,
    pub verbose: bool,
    pub run_task: bool,
    /// Set in `--all-projects` mode: one artifact per project.
    pub projects: Option<Vec<String>>,
}

/// Result of one invocation, before anything is shown to the user.
#[derive(Debug)]
pub struct RunSummary {
    pub classification: Classification,
    pub query: Query,
    pub artifacts: Vec<PathBuf>,
}

/// Classify, persist or recall the query, run the task tool, render.
pub struct Pipeline<'a> {
    pub table: &'a CommandTable,
    pub store: &'a dyn QueryStore,
    pub task: &'a dyn TaskRunner,
    pub renderer: &'a dyn Renderer,
}

impl Pipeline<'_> {
    pub fn run(&self, args: &[String], opts: &PipelineOptions) -> ShowdepsResult<RunSummary> {
        let classification = classify(self.table, args);

        let query = match classification {
            Classification::Report => {
                info!("Running new filter to create dependency tree");
                if args.iter().all(|arg| arg.is_empty()) {
                    return Err(ShowdepsError::InvalidInput(
                        "filter is empty; pass at least one non-empty token".into(),
                    ));
                }
                let query = Query::new(args.iter().cloned());
                self.store.save(&query)?;
                query
            }
            Classification::Command { at } => {
                info!("Rerunning last filter to create dependency tree");
                match self.store.load() {
                    Ok(q) => q,
                    Err(ShowdepsError::MissingState(path)) if at == 0 => {
                        return Err(ShowdepsError::InvalidInput(format!(
                            "argument required: no previous filter saved at {}",
                            path.display()
                        )));
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        if opts.run_task {
            if let Some(task_argv) = task_args(classification, args) {
                if let Err(e) = self.task.run(&task_argv) {
                    info!("{e}");
                }
            }
        }

        let effective = effective_query(&query, opts.show_deleted);
        let artifacts = match &opts.projects {
            None => {
                self.renderer.render(&effective, &opts.output, opts.verbose)?;
                vec![opts.output.clone()]
            }
            Some(projects) => {
                if projects.is_empty() {
                    return Err(ShowdepsError::InvalidInput(
                        "--all-projects needs at least one name under [projects] in the config"
                            .into(),
                    ));
                }
                let mut artifacts = Vec::with_capacity(projects.len());
                for project in projects {
                    let project_query = effective.with(format!("pro:{project}"));
                    let path = project_output(&opts.output, project);
                    self.renderer.render(&project_query, &path, opts.verbose)?;
                    artifacts.push(path);
                }
                artifacts
            }
        };

        Ok(RunSummary {
            classification,
            query,
            artifacts,
        })
    }
}

/// `deps.png` + `work` -> `deps-work.png`.
pub fn project_output(output: &Path, project: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = match output.extension() {
        Some(ext) => format!("{stem}-{project}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{project}"),
    };
    output.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct FakeStore {
        record: RefCell<Option<Query>>,
        saves: RefCell<usize>,
    }

    impl QueryStore for FakeStore {
        fn save(&self, query: &Query) -> ShowdepsResult<()> {
            *self.record.borrow_mut() = Some(query.clone());
            *self.saves.borrow_mut() += 1;
            Ok(())
        }

        fn load(&self) -> ShowdepsResult<Query> {
            self.record
                .borrow()
                .clone()
                .ok_or_else(|| ShowdepsError::MissingState(PathBuf::from("fake.cfg")))
        }
    }

    #[derive(Default)]
    struct FakeTask {
        fail: bool,
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl TaskRunner for FakeTask {
        fn run(&self, args: &[String]) -> ShowdepsResult<()> {
            self.calls.borrow_mut().push(args.to_vec());
            if self.fail {
                return Err(ShowdepsError::Collaborator("exited with 1".into()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeRenderer {
        fail: bool,
        calls: RefCell<Vec<(Query, PathBuf)>>,
    }

    impl Renderer for FakeRenderer {
        fn render(&self, query: &Query, output: &Path, _verbose: bool) -> ShowdepsResult<()> {
            if self.fail {
                return Err(ShowdepsError::Render("bad filter".into()));
            }
            self.calls
                .borrow_mut()
                .push((query.clone(), output.to_path_buf()));
            Ok(())
        }
    }

    struct Harness {
        table: CommandTable,
        store: FakeStore,
        task: FakeTask,
        renderer: FakeRenderer,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                table: CommandTable::new(["add", "delete", "modify"]),
                store: FakeStore::default(),
                task: FakeTask::default(),
                renderer: FakeRenderer::default(),
            }
        }

        fn with_record(tokens: &[&str]) -> Self {
            let h = Self::new();
            *h.store.record.borrow_mut() = Some(Query::new(tokens.iter().copied()));
            h
        }

        fn run(&self, list: &[&str], opts: &PipelineOptions) -> ShowdepsResult<RunSummary> {
            let pipeline = Pipeline {
                table: &self.table,
                store: &self.store,
                task: &self.task,
                renderer: &self.renderer,
            };
            pipeline.run(&args(list), opts)
        }

        fn rendered(&self, idx: usize) -> Vec<String> {
            self.renderer.calls.borrow()[idx].0.tokens().to_vec()
        }
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn opts() -> PipelineOptions {
        PipelineOptions {
            output: PathBuf::from("deps.png"),
            show_deleted: false,
            verbose: false,
            run_task: true,
            projects: None,
        }
    }

    #[test]
    fn test_report_saves_and_renders() {
        let h = Harness::new();
        let summary = h.run(&["pro:work", "+PENDING"], &opts()).unwrap();

        assert_eq!(summary.classification, Classification::Report);
        assert_eq!(
            h.store.record.borrow().as_ref().unwrap().tokens(),
            ["pro:work", "+PENDING"]
        );
        assert_eq!(h.task.calls.borrow()[0], args(&["pro:work +PENDING"]));
        assert_eq!(h.rendered(0), ["pro:work", "+PENDING", "-DELETED"]);
        assert_eq!(h.renderer.calls.borrow()[0].1, PathBuf::from("deps.png"));
    }

    #[test]
    fn test_command_reuses_saved_query() {
        let h = Harness::with_record(&["pro:work"]);
        let summary = h.run(&["5", "mod", "depends:4"], &opts()).unwrap();

        assert_eq!(summary.classification, Classification::Command { at: 2 });
        assert_eq!(*h.store.saves.borrow(), 0);
        assert_eq!(h.task.calls.borrow()[0], args(&["5", "mod", "depends:4"]));
        assert_eq!(h.rendered(0), ["pro:work", "-DELETED"]);
    }

    #[test]
    fn test_empty_args_reuse_without_task() {
        let h = Harness::with_record(&["pro:work"]);
        let summary = h.run(&[], &opts()).unwrap();

        assert_eq!(summary.classification, Classification::Command { at: 0 });
        assert!(h.task.calls.borrow().is_empty());
        assert_eq!(h.rendered(0), ["pro:work", "-DELETED"]);
    }

    #[test]
    fn test_empty_args_without_record_is_invalid_input() {
        let h = Harness::new();
        let err = h.run(&[], &opts()).unwrap_err();
        assert!(matches!(err, ShowdepsError::InvalidInput(_)));
        assert!(h.renderer.calls.borrow().is_empty());
    }

    #[test]
    fn test_blank_filter_is_rejected_before_save() {
        let h = Harness::with_record(&["pro:work"]);
        let err = h.run(&[""], &opts()).unwrap_err();
        assert!(matches!(err, ShowdepsError::InvalidInput(_)));
        assert!(h.task.calls.borrow().is_empty());

        // the previous filter is still there for the next command
        h.run(&["add", "x"], &opts()).unwrap();
        assert_eq!(h.rendered(0), ["pro:work", "-DELETED"]);
    }

    #[test]
    fn test_command_without_record_is_missing_state() {
        let h = Harness::new();
        let err = h.run(&["add", "thing"], &opts()).unwrap_err();
        assert!(matches!(err, ShowdepsError::MissingState(_)));
        assert!(h.task.calls.borrow().is_empty());
    }

    #[test]
    fn test_task_failure_is_not_fatal() {
        let mut h = Harness::new();
        h.task.fail = true;
        let summary = h.run(&["pro:work"], &opts()).unwrap();
        assert_eq!(summary.artifacts, vec![PathBuf::from("deps.png")]);
        assert_eq!(h.renderer.calls.borrow().len(), 1);
    }

    #[test]
    fn test_render_failure_is_fatal() {
        let mut h = Harness::new();
        h.renderer.fail = true;
        let err = h.run(&["pro:work"], &opts()).unwrap_err();
        assert!(matches!(err, ShowdepsError::Render(_)));
    }

    #[test]
    fn test_show_deleted_and_no_task() {
        let h = Harness::new();
        let options = PipelineOptions {
            show_deleted: true,
            run_task: false,
            ..opts()
        };
        h.run(&["pro:work"], &options).unwrap();
        assert!(h.task.calls.borrow().is_empty());
        assert_eq!(h.rendered(0), ["pro:work"]);
    }

    #[test]
    fn test_repeated_report_keeps_same_record() {
        let h = Harness::new();
        h.run(&["pro:work", "+PENDING"], &opts()).unwrap();
        let first = h.store.record.borrow().clone();
        h.run(&["pro:work", "+PENDING"], &opts()).unwrap();
        assert_eq!(*h.store.record.borrow(), first);
    }

    #[test]
    fn test_all_projects_renders_each() {
        let h = Harness::new();
        let options = PipelineOptions {
            projects: Some(vec!["home".into(), "work".into()]),
            ..opts()
        };
        let summary = h.run(&["+PENDING"], &options).unwrap();
        assert_eq!(
            summary.artifacts,
            vec![PathBuf::from("deps-home.png"), PathBuf::from("deps-work.png")]
        );
        assert_eq!(h.rendered(1), ["+PENDING", "-DELETED", "pro:work"]);
    }

    #[test]
    fn test_all_projects_requires_names() {
        let h = Harness::new();
        let options = PipelineOptions {
            projects: Some(Vec::new()),
            ..opts()
        };
        let err = h.run(&["+PENDING"], &options).unwrap_err();
        assert!(matches!(err, ShowdepsError::InvalidInput(_)));
    }

    #[test]
    fn test_project_output_names() {
        assert_eq!(
            project_output(Path::new("/tmp/cache/last_deps_image.png"), "work"),
            PathBuf::from("/tmp/cache/last_deps_image-work.png")
        );
        assert_eq!(
            project_output(Path::new("deps"), "home"),
            PathBuf::from("deps-home")
        );
    }
}
