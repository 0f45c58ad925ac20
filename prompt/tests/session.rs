use std::time::Duration;

use switchbind_core::{
    Binder, ExposeSecret, FieldDescriptor, ParserSettings, PromptOutcome, PromptRequest,
    Prompter, Response, Schema, ValueKind,
};
use switchbind_prompt::{
    Key, MASK_CHAR, PromptSession, ScriptedKeys, SessionState, Spinner, TerminalPrompter,
};

const FAST: Duration = Duration::from_millis(5);

fn run(request: &PromptRequest, mut keys: ScriptedKeys) -> (PromptOutcome, String) {
    let mut screen = Vec::new();
    let outcome = PromptSession::new(request)
        .with_poll_interval(FAST)
        .run(&mut keys, &mut screen)
        .unwrap();
    (outcome, String::from_utf8_lossy(&screen).into_owned())
}

fn completed(text: &str) -> PromptOutcome {
    PromptOutcome::Completed(Response::Plain(text.to_string()))
}

fn yes_no() -> PromptRequest {
    PromptRequest::new("Proceed? ")
        .with_candidates(["Yes", "No"])
        .forced()
}

#[test]
fn test_forced_shortcuts_commit_immediately() {
    let (outcome, screen) = run(&yes_no(), ScriptedKeys::new([Key::Char('y')]));
    assert_eq!(outcome, completed("Yes"));
    assert!(screen.contains("Proceed? [Y]es / [N]o"));

    let (outcome, _) = run(&yes_no(), ScriptedKeys::new([Key::Char('N')]));
    assert_eq!(outcome, completed("No"));
}

#[test]
fn test_escape_cancels_forced_prompt() {
    let (outcome, _) = run(&yes_no(), ScriptedKeys::new([Key::Escape]));
    assert_eq!(outcome, PromptOutcome::Cancelled);
}

#[test]
fn test_secure_input_is_masked() {
    let request = PromptRequest::new("Password: ").secure();
    let (outcome, screen) = run(&request, ScriptedKeys::typed("hunter2"));

    assert!(!screen.contains("hunter2"));
    assert!(screen.contains(&MASK_CHAR.to_string().repeat(7)));
    match outcome {
        PromptOutcome::Completed(Response::Secure(secret)) => {
            assert_eq!(secret.expose_secret(), "hunter2");
        }
        other => panic!("expected secure response, got {other:?}"),
    }
}

#[test]
fn test_secure_prompt_ignores_tab() {
    let request = PromptRequest::new("Token: ")
        .with_candidates(["abc"])
        .secure();
    let keys = ScriptedKeys::new([Key::Char('x'), Key::Tab, Key::Enter]);
    let (outcome, screen) = run(&request, keys);

    assert!(!screen.contains("abc"));
    match outcome {
        PromptOutcome::Completed(Response::Secure(secret)) => {
            assert_eq!(secret.expose_secret(), "x");
        }
        other => panic!("expected secure response, got {other:?}"),
    }
}

#[test]
fn test_tab_cycles_and_wraps() {
    let request = PromptRequest::new("Profile: ").with_candidates(["debug", "dev", "release"]);
    let keys = ScriptedKeys::new([Key::Char('d'), Key::Tab, Key::Tab, Key::Tab, Key::Enter]);
    let (outcome, _) = run(&request, keys);
    assert_eq!(outcome, completed("debug"));
}

#[test]
fn test_typing_after_tab_starts_new_seed() {
    let request = PromptRequest::new("Profile: ").with_candidates(["debug", "dev", "release"]);
    let keys = ScriptedKeys::new([Key::Tab, Key::Backspace, Key::Char('r'), Key::Tab, Key::Enter]);
    let (outcome, _) = run(&request, keys);
    // "debu" + 'r' matches nothing, so the buffer is kept
    assert_eq!(outcome, completed("debur"));
}

#[test]
fn test_idle_input_times_out() {
    let request = PromptRequest::new("Name: ").with_timeout(Some(Duration::from_millis(30)));
    let keys = ScriptedKeys::new([]).then_idle();
    let (outcome, screen) = run(&request, keys);
    assert_eq!(outcome, PromptOutcome::TimedOut);
    assert!(screen.ends_with("\r\n"));
}

#[test]
fn test_first_key_disarms_timeout() {
    let request = PromptRequest::new("Name: ").with_timeout(Some(Duration::from_millis(20)));
    let keys = ScriptedKeys::new([Key::Char('a')])
        .then_pause(Duration::from_millis(80))
        .then_keys([Key::Enter]);
    let (outcome, _) = run(&request, keys);
    assert_eq!(outcome, completed("a"));
}

#[test]
fn test_session_state_reaches_terminal() {
    assert!(SessionState::TimedOut.is_terminal());
    assert!(SessionState::Completed.is_terminal());
    assert!(!SessionState::Reading.is_terminal());
}

#[test]
fn test_terminal_prompter_drives_binder() {
    let schema = Schema::new("deploy")
        .with_field(FieldDescriptor::required("Target", ValueKind::String))
        .with_field(FieldDescriptor::required("Confirm", ValueKind::Bool));
    let keys = ScriptedKeys::typed("staging").then_keys([Key::Char('y')]);
    let prompter = TerminalPrompter::new(keys, Vec::new()).with_poll_interval(FAST);

    let settings = ParserSettings::default().prompt_for_missing_required(true);
    let mut binder = Binder::new(settings).with_prompter(prompter);
    let args: [&str; 0] = [];
    let result = binder.parse(&args, &schema).unwrap();

    assert_eq!(result.values.get_str("target"), Some("staging"));
    assert_eq!(result.values.get_bool("confirm"), Some(true));
    assert!(result.is_clean());
}

#[test]
fn test_terminal_prompter_reports_closed_input() {
    let mut prompter = TerminalPrompter::new(ScriptedKeys::new([]), Vec::new());
    let err = prompter.prompt(&PromptRequest::new("> ")).unwrap_err();
    assert_eq!(err.to_string(), "input closed while prompting");
}

#[test]
fn test_spinner_returns_action_result() {
    let spinner = Spinner::new("Binding").with_interval(FAST);
    let value = spinner.run(Vec::new(), || {
        std::thread::sleep(Duration::from_millis(15));
        "done"
    });
    assert_eq!(value, "done");
}
