use crate::script::{Dispatch, Interpreter, ScriptError, is_script_line};
use crate::shell::ast::{ParsedCommand, Pipeline};
use crate::shell::context::CancelToken;
use crate::shell::error::ShellError;
use anyhow::Result;
use std::fs;
use std::sync::{Arc, Mutex};

/// Records every dispatched pipeline and every reported error. `false`
/// fails quietly, `boom` loudly, `nosuch` is unknown and `exit` ends the
/// run. A redirected copy tags its entries with the output file.
#[derive(Default)]
struct Recorder {
    seen: Arc<Mutex<Vec<String>>>,
    target: Option<String>,
}

impl Recorder {
    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl Dispatch for Recorder {
    fn dispatch(&self, _cancel: &CancelToken, pipeline: &Pipeline) -> Result<()> {
        let entry = match &self.target {
            Some(target) => format!("[{}] {}", target, pipeline),
            None => pipeline.to_string(),
        };
        self.seen.lock().unwrap().push(entry);
        match pipeline.commands[0].command.as_str() {
            "false" => Err(ShellError::Status(1).into()),
            "boom" => anyhow::bail!("boom failed"),
            "nosuch" => Err(ShellError::UnknownCommand("nosuch".into()).into()),
            "exit" => Err(ShellError::Exit(3).into()),
            _ => Ok(()),
        }
    }

    fn redirected(&self, stage: &ParsedCommand) -> Result<Arc<dyn Dispatch>> {
        Ok(Arc::new(Recorder {
            seen: self.seen.clone(),
            target: stage.redirect_out.clone(),
        }))
    }

    fn report(&self, err: &anyhow::Error) {
        self.seen.lock().unwrap().push(format!("reported: {:#}", err));
    }
}

fn interpreter() -> (Interpreter, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    (Interpreter::new(recorder.clone()), recorder)
}

fn run(src: &str) -> (Interpreter, Vec<String>) {
    let (mut interp, recorder) = interpreter();
    interp
        .execute_source(&CancelToken::new(), src)
        .unwrap_or_else(|e| panic!("script failed: {:#}", e));
    (interp, recorder.seen())
}

#[test]
fn test_function_writes_stay_in_its_frame() {
    let (interp, seen) = run("x=outer\nfunction f() {\n  x=inner\n  echo $x $1\n}\nf arg\necho $x");
    assert_eq!(seen, vec!["echo inner arg", "echo outer"]);
    assert_eq!(interp.get_var("x").as_deref(), Some("outer"));
    assert_eq!(interp.get_var("1"), None);
}

#[test]
fn test_function_reads_caller_variables() {
    let (_, seen) = run("greeting=hello\nsay() { echo $greeting $0 $#; }\nsay a b");
    assert_eq!(seen, vec!["echo hello say 2"]);
}

#[test]
fn test_break_stops_loop() {
    let (_, seen) = run("for i in 1 2 3 4 5; do\n  if [ $i -eq 3 ]; then\n    break\n  fi\n  echo $i\ndone");
    assert_eq!(seen, vec!["echo 1", "echo 2"]);
}

#[test]
fn test_continue_skips_iteration() {
    let (_, seen) = run("for i in a b c; do if [ $i == b ]; then continue; fi; echo $i; done");
    assert_eq!(seen, vec!["echo a", "echo c"]);
}

#[test]
fn test_while_loop_with_string_growth() {
    let (interp, seen) = run("s=\nwhile [ \"$s\" != xxx ]; do\n  s=${s}x\n  echo $s\ndone");
    assert_eq!(seen, vec!["echo x", "echo xx", "echo xxx"]);
    assert_eq!(interp.get_var("s").as_deref(), Some("xxx"));
}

#[test]
fn test_for_splits_unquoted_variables_only() {
    let (_, seen) = run("list=\"a b\"\nfor w in $list \"$list\"; do echo $w; done");
    assert_eq!(seen, vec!["echo a", "echo b", "echo 'a b'"]);
}

#[test]
fn test_numeric_test_with_text_is_false() {
    let (_, seen) = run("if [ abc -eq abc ]; then echo yes; else echo no; fi");
    assert_eq!(seen, vec!["echo no"]);
}

#[test]
fn test_empty_string_tests() {
    let (_, seen) = run(concat!(
        "if [ -z \"\" ]; then echo z; fi\n",
        "if [ -n \"\" ]; then echo n; fi\n",
        "if [ -z $unset_var_for_lish_tests ]; then echo unset; fi\n",
    ));
    assert_eq!(seen, vec!["echo z", "echo unset"]);
}

#[test]
fn test_file_tests() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, "x").unwrap();

    let (mut interp, recorder) = interpreter();
    interp.set_var("dir", dir.path().display().to_string());
    interp.set_var("file", file.display().to_string());
    interp
        .execute_source(
            &CancelToken::new(),
            concat!(
                "if [ -f $dir ]; then echo dir-is-file; fi\n",
                "if [ -d $dir ]; then echo dir-is-dir; fi\n",
                "if [ -f $file ] && [ -e $file ]; then echo file-is-file; fi\n",
                "if ! [ -e $dir/missing ]; then echo missing; fi\n",
            ),
        )
        .unwrap();
    assert_eq!(recorder.seen(), vec!["echo dir-is-dir", "echo file-is-file", "echo missing"]);
}

#[test]
fn test_logic_short_circuits() {
    let (_, seen) = run("if true || [ -x nothing ]; then echo ok; fi\nif false && [ -x nothing ]; then echo bad; fi");
    assert_eq!(seen, vec!["echo ok"]);
}

#[test]
fn test_functions_shadow_commands() {
    let (_, seen) = run("function ls() { echo shadowed $1; }\nls -l");
    assert_eq!(seen, vec!["echo shadowed -l"]);
}

#[test]
fn test_return_value_sets_exit_code() {
    let (interp, seen) = run("f() { return 7; echo unreachable; }\nf\necho $?");
    assert_eq!(seen, vec!["echo 7"]);
    assert_eq!(interp.last_return_value(), Some("7"));
    assert_eq!(interp.last_exit_code(), 0);
}

#[test]
fn test_return_at_top_level_stops_program() {
    let (interp, seen) = run("echo before\nreturn 4\necho after");
    assert_eq!(seen, vec!["echo before"]);
    assert_eq!(interp.last_exit_code(), 4);
}

#[test]
fn test_stray_break_is_ignored() {
    let (_, seen) = run("break\necho still-running");
    assert_eq!(seen, vec!["echo still-running"]);
}

#[test]
fn test_failed_command_stops_script() {
    let (mut interp, recorder) = interpreter();
    let err = interp
        .execute_source(&CancelToken::new(), "echo one\nboom\necho two")
        .unwrap_err();
    assert!(err.to_string().contains("boom failed"));
    assert_eq!(recorder.seen(), vec!["echo one", "boom"]);
    assert_eq!(interp.last_exit_code(), 1);

    let err = interp.execute_source(&CancelToken::new(), "false").unwrap_err();
    assert!(matches!(err.downcast_ref::<ShellError>(), Some(ShellError::Status(1))));
    assert_eq!(interp.get_var("?").as_deref(), Some("1"));
}

#[test]
fn test_pipeline_statement_dispatches_once() {
    let (_, seen) = run("v=needle\necho $v | grep ne > out.txt");
    assert_eq!(seen, vec!["echo needle | grep ne > out.txt"]);
}

#[test]
fn test_command_substitution_is_unsupported() {
    let (mut interp, recorder) = interpreter();
    let err = interp
        .execute_source(&CancelToken::new(), "x=$(date)")
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScriptError>(),
        Some(ScriptError::Unsupported(_))
    ));
    assert!(recorder.seen().is_empty());
}

#[test]
fn test_parse_errors_prevent_execution() {
    let (mut interp, recorder) = interpreter();
    let err = interp
        .execute_source(&CancelToken::new(), "echo first\nif true; then echo x")
        .unwrap_err();
    let Some(ScriptError::Parse { errors, .. }) = err.downcast_ref::<ScriptError>() else {
        panic!("expected parse error, got {:#}", err);
    };
    assert!(!errors.is_empty());
    assert!(recorder.seen().is_empty());
}

#[test]
fn test_cancelled_script_is_interrupted() {
    let (mut interp, recorder) = interpreter();
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = interp
        .execute_source(&cancel, "while true; do echo spin; done")
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScriptError>(),
        Some(ScriptError::Interrupted)
    ));
    assert!(recorder.seen().is_empty());
}

#[test]
fn test_execute_file_binds_positionals() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("args.lsh");
    fs::write(&script, "# prints its arguments\necho $1 $2 $#\necho \"$@\"\n").unwrap();

    let (mut interp, recorder) = interpreter();
    interp
        .execute_file(&CancelToken::new(), &script, &["a".to_string(), "b c".to_string()])
        .unwrap();
    assert_eq!(recorder.seen(), vec!["echo a 'b c' 2", "echo 'a b c'"]);
}

#[test]
fn test_nested_source_keeps_definitions() {
    let dir = tempfile::tempdir().unwrap();
    let lib = dir.path().join("lib.lsh");
    fs::write(&lib, "prefix=hi\ngreet() { echo $prefix $1; }\n").unwrap();

    let (mut interp, recorder) = interpreter();
    interp.set_var("lib", lib.display().to_string());
    interp
        .execute_source(&CancelToken::new(), "source $lib\ngreet bob\n. $lib")
        .unwrap();
    assert_eq!(recorder.seen(), vec!["echo hi bob"]);
    assert!(interp.has_function("greet"));
    assert_eq!(interp.get_var("prefix").as_deref(), Some("hi"));
}

#[test]
fn test_single_quotes_are_not_expanded() {
    let (_, seen) = run("name=x\necho '$name' \"$name\"");
    assert_eq!(seen, vec!["echo '$name' x"]);
}

#[test]
fn test_and_or_chains_run_in_order() {
    let (interp, seen) = run("true && x=5\nboom || echo recovered\nfalse && echo no || echo yes\necho $x");
    assert_eq!(
        seen,
        vec![
            "true",
            "boom",
            "reported: boom failed",
            "echo recovered",
            "false",
            "reported: exit status 1",
            "echo yes",
            "echo 5",
        ]
    );
    assert_eq!(interp.get_var("x").as_deref(), Some("5"));
}

#[test]
fn test_skipped_operand_keeps_failure_status() {
    let (interp, seen) = run("false && echo no\necho $?");
    assert_eq!(seen, vec!["false", "reported: exit status 1", "echo 1"]);
    assert_eq!(interp.last_exit_code(), 0);
}

#[test]
fn test_last_operand_failure_stops_script() {
    let (mut interp, recorder) = interpreter();
    let err = interp
        .execute_source(&CancelToken::new(), "true && boom\necho after")
        .unwrap_err();
    assert!(err.to_string().contains("boom failed"));
    assert_eq!(recorder.seen(), vec!["true", "boom"]);
}

#[test]
fn test_exit_is_not_consumed_by_or() {
    let (mut interp, recorder) = interpreter();
    let err = interp
        .execute_source(&CancelToken::new(), "exit || echo no")
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<ShellError>(), Some(ShellError::Exit(3))));
    assert_eq!(recorder.seen(), vec!["exit"]);
}

#[test]
fn test_any_failure_sets_status_one() {
    let (_, seen) = run("nosuch || echo $?");
    assert_eq!(seen, vec!["nosuch", "reported: unknown command: nosuch", "echo 1"]);
}

#[test]
fn test_empty_unquoted_variable_is_dropped() {
    let (_, seen) = run("empty=\necho a $empty \"$empty\" b $never_set_in_lish_tests");
    assert_eq!(seen, vec!["echo a '' b"]);
}

#[test]
fn test_function_call_honors_redirection() {
    let (_, seen) = run("f() { echo in f; }\nf > out.txt\necho after");
    assert_eq!(seen, vec!["[out.txt] echo in f", "echo after"]);
}

#[test]
fn test_source_honors_redirection() {
    let dir = tempfile::tempdir().unwrap();
    let lib = dir.path().join("noisy.lsh");
    fs::write(&lib, "echo loading\n").unwrap();

    let (mut interp, recorder) = interpreter();
    interp.set_var("lib", lib.display().to_string());
    interp
        .execute_source(&CancelToken::new(), "source $lib > load.log\necho done")
        .unwrap();
    assert_eq!(recorder.seen(), vec!["[load.log] echo loading", "echo done"]);
}

#[test]
fn test_script_lines_are_found_at_any_command_position() {
    let none = |_: &str| false;
    assert!(is_script_line("echo start; for i in 1 2; do echo $i; done", none));
    assert!(is_script_line("true && x=5", none));
    assert!(is_script_line("ls | while true; do break; done", none));
    assert!(is_script_line("greet() { echo hi; }", none));
    assert!(!is_script_line("echo for done x=5", none));
    assert!(!is_script_line("ls -l | wc -l && echo ok", none));
    assert!(!is_script_line("x = 5", none));

    let greet = |name: &str| name == "greet";
    assert!(is_script_line("cd /tmp && greet bob", greet));
    assert!(!is_script_line("echo greet", greet));
}
