use traverse_core::{ActionOptions, DryRunEngine, Executor, ModifierFlags, PrimaryAction};

#[tokio::main]
async fn main() {
    let executor = Executor::spawn(Box::new(DryRunEngine)).expect("engine thread");

    let options = ActionOptions {
        pid_for_traversal: Some(501),
        show_diff: true,
        ..Default::default()
    };

    for action in [
        PrimaryAction::click(10.5, 20.0),
        PrimaryAction::press("a", ModifierFlags::COMMAND | ModifierFlags::SHIFT),
        PrimaryAction::TraverseOnly,
    ] {
        println!("=== {} ===", action.label());
        let result = executor
            .execute(action, options.clone())
            .await
            .expect("engine running");
        println!("{}", result.to_canonical_json().expect("serializable"));
    }
}
