use crate::config::LishConfig;
use crate::history::History;
use crate::shell::Shell;
use crate::shell::ast::{ParsedCommand, Pipeline};
use crate::shell::commands::builtins::register_all_builtins;
use crate::shell::commands::{Command, Registry};
use crate::shell::context::{CancelToken, CommandContext, SharedBuffer, SharedReader};
use crate::shell::error::ShellError;
use crate::shell::executor::Executor;
use crate::shell::parser::parse_line;
use anyhow::Result;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Writes `count` numbered lines, pausing now and then.
struct Produce;

impl Command for Produce {
    fn name(&self) -> &str {
        "produce"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let count: usize = args.first().map(|a| a.parse()).transpose()?.unwrap_or(500);
        for i in 0..count {
            writeln!(ctx.stdout, "line {:04}", i)?;
            if i % 100 == 0 {
                thread::sleep(Duration::from_millis(5));
            }
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "produce [N]"
    }

    fn short_help(&self) -> &str {
        "emit numbered lines"
    }
}

/// Copies stdin to stdout line by line, slower than the producer.
struct Dawdle;

impl Command for Dawdle {
    fn name(&self) -> &str {
        "dawdle"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, _args: &[String]) -> Result<()> {
        let stdin = std::mem::replace(&mut ctx.stdin, Box::new(std::io::empty()));
        for (i, line) in BufReader::new(stdin).lines().enumerate() {
            writeln!(ctx.stdout, "{}", line?)?;
            if i % 50 == 0 {
                thread::sleep(Duration::from_millis(2));
            }
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "dawdle"
    }

    fn short_help(&self) -> &str {
        "slow copy"
    }
}

/// Writes to its stderr handle.
struct Warn;

impl Command for Warn {
    fn name(&self) -> &str {
        "warn"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        writeln!(ctx.stderr, "warning: {}", args.join(" "))?;
        Ok(())
    }

    fn help(&self) -> &str {
        "warn MSG"
    }

    fn short_help(&self) -> &str {
        "complain"
    }
}

struct Harness {
    executor: Executor,
    stdout: SharedBuffer,
    stderr: SharedBuffer,
}

fn harness() -> Harness {
    let registry = Arc::new(Registry::new());
    register_all_builtins(&registry).unwrap();
    registry.register(Arc::new(Produce)).unwrap();
    registry.register(Arc::new(Dawdle)).unwrap();
    registry.register(Arc::new(Warn)).unwrap();

    let stdout = SharedBuffer::new();
    let stderr = SharedBuffer::new();
    let executor = Executor::new(registry, SharedReader::empty(), stdout.writer(), stderr.writer());
    Harness {
        executor,
        stdout,
        stderr,
    }
}

impl Harness {
    fn run(&self, line: &str) -> Result<()> {
        let statement = parse_line(line);
        assert_eq!(statement.pipelines.len(), 1, "one pipeline per test line");
        self.executor
            .execute_pipeline(&CancelToken::new(), &statement.pipelines[0])
    }
}

fn shell() -> (Shell, SharedBuffer, SharedBuffer) {
    shell_with(LishConfig::default())
}

fn shell_with(config: LishConfig) -> (Shell, SharedBuffer, SharedBuffer) {
    let stdout = SharedBuffer::new();
    let stderr = SharedBuffer::new();
    let shell = Shell::new(
        config,
        Arc::new(History::new(100)),
        SharedReader::empty(),
        stdout.writer(),
        stderr.writer(),
    )
    .unwrap();
    (shell, stdout, stderr)
}

fn path_arg(path: &std::path::Path) -> String {
    shell_words::quote(&path.display().to_string()).into_owned()
}

// ---- executor ----

#[test]
fn test_three_stage_pipeline_keeps_every_byte_in_order() {
    let h = harness();
    h.run("produce 2000 | dawdle | cat").unwrap();

    let expected: String = (0..2000).map(|i| format!("line {:04}\n", i)).collect();
    assert_eq!(h.stdout.contents(), expected);
    assert_eq!(h.stderr.contents(), "");
}

#[test]
fn test_early_reader_exit_is_not_reported() {
    let h = harness();
    h.run("produce 100000 | head -n 3").unwrap();
    assert_eq!(h.stdout.contents(), "line 0000\nline 0001\nline 0002\n");
    assert_eq!(h.stderr.contents(), "");
}

#[test]
fn test_unknown_middle_stage_does_not_break_siblings() {
    let h = harness();
    h.run("produce 10 | nosuch | wc -l").unwrap();
    assert_eq!(h.stdout.contents().trim(), "0");
    assert!(h.stderr.contents().contains("unknown command: nosuch"));
}

#[test]
fn test_unknown_last_stage_is_returned() {
    let h = harness();
    let err = h.run("echo hi | nosuch").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ShellError>(),
        Some(ShellError::UnknownCommand(name)) if name == "nosuch"
    ));
}

#[test]
fn test_single_stage_uses_session_stdio() {
    let h = harness();
    let pipeline = Pipeline::single(ParsedCommand::new("echo", vec!["hello".into(), "world".into()]));
    h.executor.execute_pipeline(&CancelToken::new(), &pipeline).unwrap();
    assert_eq!(h.stdout.contents(), "hello world\n");
}

#[test]
fn test_redirections() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.txt");
    let err = dir.path().join("err.txt");
    let h = harness();

    h.run(&format!("echo first > {}", path_arg(&out))).unwrap();
    h.run(&format!("echo second >> {}", path_arg(&out))).unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap(), "first\nsecond\n");

    h.run(&format!("sort -r < {} | cat", path_arg(&out))).unwrap();
    assert_eq!(h.stdout.contents(), "second\nfirst\n");

    h.run(&format!("warn careful 2> {}", path_arg(&err))).unwrap();
    assert_eq!(fs::read_to_string(&err).unwrap(), "warning: careful\n");
    assert_eq!(h.stderr.contents(), "");
}

#[test]
fn test_missing_input_file_aborts_stage() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness();
    let err = h
        .run(&format!("cat < {}", path_arg(&dir.path().join("missing"))))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ShellError>(),
        Some(ShellError::Redirect { purpose: "input", .. })
    ));
}

#[test]
fn test_status_of_upstream_stage_is_quiet() {
    let h = harness();
    h.run("exit 0 | echo after").unwrap();
    h.run("false | echo again").unwrap();
    assert_eq!(h.stdout.contents(), "after\nagain\n");
    assert_eq!(h.stderr.contents(), "");
}

#[test]
fn test_cancelled_sleep_is_interrupted() {
    let h = harness();
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        trigger.cancel();
    });
    let pipeline = parse_line("sleep 30").pipelines.remove(0);
    let err = h.executor.execute_pipeline(&cancel, &pipeline).unwrap_err();
    canceller.join().unwrap();
    assert!(matches!(err.downcast_ref::<ShellError>(), Some(ShellError::Interrupted)));
}

// ---- session ----

#[test]
fn test_and_or_semicolon() {
    let (shell, out, _) = shell();
    shell.run_line("true && echo and-ran").unwrap();
    shell.run_line("false || echo or-ran").unwrap();
    shell.run_line("true || echo skipped; echo after").unwrap();
    let err = shell.run_line("false && echo never").unwrap_err();
    assert!(matches!(err.downcast_ref::<ShellError>(), Some(ShellError::Status(1))));
    assert_eq!(out.contents(), "and-ran\nor-ran\nafter\n");
    assert_eq!(shell.last_status(), 1);
}

#[test]
fn test_earlier_failures_are_reported() {
    let (shell, out, err) = shell();
    shell.run_line("ecoh hi ; echo next").unwrap();
    assert_eq!(out.contents(), "next\n");
    let err = err.contents();
    assert!(err.contains("unknown command: ecoh"), "{}", err);
    assert!(err.contains("echo"), "{}", err);
    assert_eq!(shell.last_status(), 0);
}

#[test]
fn test_variables_persist_between_lines() {
    let (shell, out, _) = shell();
    shell.run_line("greeting=hello").unwrap();
    shell.run_line("echo $greeting ${greeting}!").unwrap();
    shell.run_line("false || echo $?").unwrap();
    assert_eq!(out.contents(), "hello hello!\n1\n");
    assert_eq!(shell.get_var("greeting").as_deref(), Some("hello"));
}

#[test]
fn test_session_functions_shadow_commands() {
    let (shell, out, _) = shell();
    shell.run_line("ls() { echo mine $1; }").unwrap();
    shell.run_line("ls -l").unwrap();
    assert_eq!(out.contents(), "mine -l\n");
}

#[test]
fn test_script_lines_with_redirection() {
    let dir = tempfile::tempdir().unwrap();
    let (shell, _, _) = shell();
    let target = dir.path().join("out.txt");
    shell
        .run_line(&format!("for w in a b; do echo $w >> {}; done", path_arg(&target)))
        .unwrap();
    shell
        .run_line(&format!("if true; then echo hi > {}.2; fi", path_arg(&target)))
        .unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "a\nb\n");
    assert_eq!(
        fs::read_to_string(dir.path().join("out.txt.2")).unwrap(),
        "hi\n"
    );
}

#[test]
fn test_source_keeps_variables_and_exec_does_not() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("vars.lsh");
    fs::write(&script, "from_script=yes\nhelper() { echo helped; }\necho ran $1\n").unwrap();

    let (shell, out, _) = shell();
    shell.run_line(&format!("exec {} arg", path_arg(&script))).unwrap();
    assert_eq!(shell.get_var("from_script"), None);

    shell.run_line(&format!("source {}", path_arg(&script))).unwrap();
    assert_eq!(shell.get_var("from_script").as_deref(), Some("yes"));
    shell.run_line("helper").unwrap();

    assert_eq!(out.contents(), "ran arg\nran\nhelped\n");
}

#[test]
fn test_exit_inside_exec_only_ends_the_script() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("quit.lsh");
    fs::write(&script, "echo before\nexit 3\necho after\n").unwrap();

    let (shell, out, _) = shell();
    let err = shell.run_line(&format!("exec {}", path_arg(&script))).unwrap_err();
    assert!(matches!(err.downcast_ref::<ShellError>(), Some(ShellError::Status(3))));
    assert_eq!(out.contents(), "before\n");

    let err = shell.run_line("exit 4").unwrap_err();
    assert!(matches!(err.downcast_ref::<ShellError>(), Some(ShellError::Exit(4))));
}

#[test]
fn test_aliases_and_config_env() {
    let mut config = LishConfig::default();
    config.aliases.insert("greet".into(), "echo hello".into());
    config.env.insert("NAME".into(), "lish".into());

    let (shell, out, _) = shell_with(config);
    shell.run_line("greet $NAME").unwrap();
    assert_eq!(out.contents(), "hello lish\n");
}

#[test]
fn test_script_errors_do_not_kill_the_session() {
    let (shell, out, _) = shell();
    assert!(shell.run_line("if true; then echo x").is_err());
    assert!(shell.run_line("x=$(date)").is_err());
    shell.run_line("echo alive").unwrap();
    assert_eq!(out.contents(), "alive\n");
}

#[test]
fn test_session_builtins_are_registered() {
    let (shell, _, _) = shell();
    for name in [
        "source", ".", "exec", "history", "help", "exit", "true", "false", "alias", "unalias", "which", "clear",
    ] {
        assert!(shell.registry().contains(name), "{} missing", name);
    }
}

#[test]
fn test_failure_status_is_one() {
    let (shell, out, _) = shell();
    shell.run_line("nosuch; echo $?").unwrap();
    shell.run_line("exit 3 | cat; false; echo $?").unwrap();
    assert_eq!(out.contents(), "1\n1\n");
}

#[test]
fn test_empty_unquoted_words_are_dropped() {
    let (shell, out, _) = shell();
    shell.run_line("echo [$nothing_here] a $nothing_here \"\" b").unwrap();
    shell.run_line("$nothing_here").unwrap();
    assert_eq!(out.contents(), "[] a  b\n");
}

#[test]
fn test_script_constructs_after_separators() {
    let (shell, out, _) = shell();
    shell.run_line("echo start; for i in 1 2; do echo $i; done").unwrap();
    shell.run_line("true && x=5").unwrap();
    shell.run_line("false || echo x is $x").unwrap();
    assert_eq!(out.contents(), "start\n1\n2\nx is 5\n");
    assert_eq!(shell.get_var("x").as_deref(), Some("5"));
}

#[test]
fn test_exec_output_follows_redirection() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("say.lsh");
    let target = dir.path().join("out.txt");
    fs::write(&script, "echo from script $1\n").unwrap();

    let (shell, out, _) = shell();
    shell
        .run_line(&format!("exec {} x > {}", path_arg(&script), path_arg(&target)))
        .unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "from script x\n");
    assert_eq!(out.contents(), "");
}

#[test]
fn test_source_output_feeds_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("lines.lsh");
    fs::write(&script, "echo one\necho two\nsourced=yes\n").unwrap();

    let (shell, out, _) = shell();
    shell.run_line(&format!("source {} | sort -r", path_arg(&script))).unwrap();
    assert_eq!(out.contents(), "two\none\n");
    assert_eq!(shell.get_var("sourced").as_deref(), Some("yes"));
}

#[test]
fn test_alias_and_unalias() {
    let (shell, out, err) = shell();
    shell.run_line("alias say='echo said'").unwrap();
    shell.run_line("say hi").unwrap();
    shell.run_line("alias").unwrap();
    shell.run_line("unalias say").unwrap();
    assert!(shell.run_line("say hi").is_err());
    assert!(shell.run_line("unalias say").is_err());

    assert_eq!(out.contents(), "said hi\nalias say='echo said'\n");
    assert!(err.contents().contains("unalias: say: not found"));
    assert!(shell.aliases().get("say").is_none());
}

#[test]
fn test_which_names_what_runs() {
    let mut config = LishConfig::default();
    config.aliases.insert("ll".into(), "ls -l".into());
    let (shell, out, err) = shell_with(config);
    shell.run_line("greet() { echo hi; }").unwrap();

    let result = shell.run_line("which ll greet echo nosuch");
    assert!(matches!(
        result.unwrap_err().downcast_ref::<ShellError>(),
        Some(ShellError::Status(1))
    ));
    assert_eq!(
        out.contents(),
        "ll: aliased to ls -l\ngreet: shell function\necho: lish builtin\n"
    );
    assert_eq!(err.contents(), "nosuch: not found\n");
}

#[test]
fn test_clear_writes_escape_sequence() {
    let (shell, out, _) = shell();
    shell.run_line("clear").unwrap();
    assert_eq!(out.contents(), "\x1b[2J\x1b[H");
}
